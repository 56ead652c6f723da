//! Property-based tests for rule compilation using proptest.
//!
//! These check invariants that should hold for any structurally valid
//! policy, not just the fixed scenarios in `scenarios.rs`.

use proptest::prelude::*;
use u_shift::decode::decode;
use u_shift::model::Model;
use u_shift::models::{Configuration, DisplayOptions, Horizon, Weekday, WeekdayNames, WorkerId};
use u_shift::rules::{compile, Policy, Rule, Scoped};
use u_shift::solver::Assignment;
use u_shift::validation::{validate_config, ValidationErrorKind};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_weekday() -> impl Strategy<Value = Weekday> {
    (0usize..7).prop_map(Weekday::from_index)
}

fn arb_horizon() -> impl Strategy<Value = Horizon> {
    (1usize..=31, arb_weekday()).prop_map(|(days, first)| Horizon::new(days, first))
}

/// A horizon and a random 0/1 row for one worker.
fn arb_row() -> impl Strategy<Value = (Horizon, Vec<bool>)> {
    arb_horizon().prop_flat_map(|h| (Just(h), prop::collection::vec(any::<bool>(), h.num_days())))
}

fn arb_symbol() -> impl Strategy<Value = String> {
    "[A-Z〇－×休出]{1,2}"
}

/// Display options with two distinct, non-empty symbols.
fn arb_display() -> impl Strategy<Value = DisplayOptions> {
    (arb_symbol(), arb_symbol(), any::<bool>())
        .prop_filter("symbols must differ", |(work, off, _)| work != off)
        .prop_map(|(work_symbol, off_symbol, japanese)| DisplayOptions {
            work_symbol,
            off_symbol,
            weekday_names: if japanese {
                WeekdayNames::Japanese
            } else {
                WeekdayNames::English
            },
        })
}

fn longest_run(row: &[bool]) -> usize {
    row.split(|&v| !v).map(<[bool]>::len).max().unwrap_or(0)
}

/// Work values followed by weekend flags set to the AND of each pair.
fn with_linked_flags(model: &Model, row: &[bool]) -> Vec<bool> {
    let mut values = row.to_vec();
    for (_, sat, sun) in model.horizon().weekend_blocks() {
        values.push(!row[sat] && !row[sun]);
    }
    values
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn work_variable_per_cell(workers in 1usize..=26, h in arb_horizon(), quota in any::<bool>()) {
        let mut policy = Policy::new(workers, h);
        if quota {
            policy = policy.with_rule(Rule::WeekendOffQuota(Scoped::new().with_all(1)));
        }
        let model = compile(&policy).unwrap();
        let blocks = if quota { h.weekend_blocks().count() } else { 0 };
        prop_assert_eq!(model.registry().work_count(), workers * h.num_days());
        prop_assert_eq!(model.variable_count(), workers * (h.num_days() + blocks));
        for w in 0..workers {
            for d in 0..h.num_days() {
                prop_assert!(model.registry().work(WorkerId(w), d).is_ok());
            }
        }
    }

    #[test]
    fn streak_model_matches_longest_run((h, row) in arb_row(), k in 3u32..=6) {
        let model = compile(
            &Policy::new(1, h).with_rule(Rule::ConsecutiveWork(Scoped::new().with_all(k))),
        )
        .unwrap();
        prop_assert_eq!(model.is_feasible(&row), longest_run(&row) <= k as usize);
    }

    #[test]
    fn weekend_linkage_is_exact((h, row) in arb_row()) {
        let model = compile(
            &Policy::new(1, h).with_rule(Rule::WeekendOffQuota(Scoped::new().with_all(1))),
        )
        .unwrap();
        let work_count = model.registry().work_count();
        let values = with_linked_flags(&model, &row);
        let links: Vec<_> = model
            .constraints()
            .iter()
            .filter(|c| c.terms().iter().any(|&(v, _)| v.index() < work_count))
            .collect();
        let holds = |values: &[bool]| {
            links
                .iter()
                .all(|c| c.is_satisfied(|v| i64::from(values[v.index()])))
        };

        prop_assert!(holds(&values));
        for flag in work_count..values.len() {
            let mut flipped = values.clone();
            flipped[flag] = !flipped[flag];
            prop_assert!(!holds(&flipped));
        }
    }

    #[test]
    fn weekends_off_forbids_weekend_work((h, row) in arb_row()) {
        let model = compile(
            &Policy::new(1, h).with_rule(Rule::WeekendsOff(Scoped::new().with_all(()))),
        )
        .unwrap();
        let works_weekend = h.days().any(|d| h.is_weekend(d) && row[d]);
        prop_assert_eq!(model.is_feasible(&row), !works_weekend);
    }

    #[test]
    fn selected_scope_takes_precedence(
        all in 3u32..=6,
        selected in 3u32..=6,
        members in prop::collection::btree_set(0usize..10, 1..5),
    ) {
        let scoped = Scoped::new()
            .with_all(all)
            .with_selected(members.iter().map(|&w| WorkerId(w)), selected);
        for w in 0..10 {
            let expected = if members.contains(&w) { selected } else { all };
            prop_assert_eq!(scoped.resolve(WorkerId(w)), Some(&expected));
        }
    }

    #[test]
    fn decode_round_trip(
        workers in 1usize..=5,
        h in arb_horizon(),
        seed in prop::collection::vec(any::<bool>(), 155),
        display in arb_display(),
    ) {
        let model = compile(&Policy::new(workers, h)).unwrap();
        let values: Vec<bool> = seed.iter().copied().cycle().take(model.variable_count()).collect();
        let assignment = Assignment::from_values(model.registry(), &values);
        let schedule = decode(&model, &assignment, &display).unwrap();
        for w in 0..workers {
            for d in 0..h.num_days() {
                let working = values[w * h.num_days() + d];
                prop_assert_eq!(schedule.is_working(WorkerId(w), d), Some(working));
                let symbol = if working { &display.work_symbol } else { &display.off_symbol };
                prop_assert_eq!(schedule.symbol(WorkerId(w), d), Some(symbol.as_str()));
            }
        }
    }

    #[test]
    fn equal_symbols_are_rejected(symbol in arb_symbol(), workers in 1usize..=26, h in arb_horizon()) {
        let display = DisplayOptions {
            work_symbol: symbol.clone(),
            off_symbol: symbol,
            ..DisplayOptions::default()
        };
        let cfg = Configuration::new(workers, h.num_days(), h.first_weekday()).with_display(display);
        let errors = validate_config(&cfg).unwrap_err();
        prop_assert!(errors.has(ValidationErrorKind::InvalidDisplay));
    }

    #[test]
    fn distinct_symbols_are_accepted(display in arb_display(), workers in 1usize..=26, h in arb_horizon()) {
        let cfg = Configuration::new(workers, h.num_days(), h.first_weekday()).with_display(display);
        prop_assert!(validate_config(&cfg).is_ok());
    }

    #[test]
    fn compile_is_deterministic(h in arb_horizon(), k in 3u32..=6, m in 1u32..=4) {
        let policy = Policy::new(3, h)
            .with_rule(Rule::ConsecutiveWork(Scoped::new().with_all(k)))
            .with_rule(Rule::WeekendOffQuota(Scoped::new().with_all(m)))
            .with_rule(Rule::NoSteppingStone(Scoped::new().with_all(())));
        let a = compile(&policy).unwrap();
        let b = compile(&policy).unwrap();
        prop_assert_eq!(a.to_lp(), b.to_lp());
    }
}
