//! Configuration validation.
//!
//! Turns a label-based [`Configuration`] into an id-based [`Policy`].
//! Every check runs; all problems are reported together. Detects:
//! - Workforce size outside `1..=26`, empty horizon, non-positive budget
//! - Display symbols that are empty or identical
//! - Rule parameters outside their ranges
//! - Unknown worker labels and labels beyond the workforce
//! - Day numbers outside the horizon
//! - Unknown weekday names and weekdays that never occur in the horizon
//! - More than three groups per grouping rule
//! - Selected scopes without workers
//!
//! Structurally valid but arithmetically impossible settings (for example a
//! staffing minimum above the workforce) pass; the solver reports them as
//! infeasible.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::RangeInclusive;
use std::time::Duration;

use crate::models::{
    Configuration, DisplayOptions, FixedDatesBlock, FixedWeekdaysBlock, FlagBlock, GroupsBlock,
    Horizon, ScopedBlock, StaffingBlock, Weekday, WorkerId, MAX_WORKERS,
};
use crate::rules::{Policy, Rule, RuleKind, RuleSet, Scoped};

/// Longest run of work days.
pub const STREAK_RANGE: RangeInclusive<u32> = 3..=6;
/// Weekend blocks fully off.
pub const WEEKEND_QUOTA_RANGE: RangeInclusive<u32> = 1..=4;
/// Days off over the horizon.
pub const MONTHLY_DAYS_OFF_RANGE: RangeInclusive<u32> = 4..=10;
/// Days off per week.
pub const WEEKLY_DAYS_OFF_RANGE: RangeInclusive<u32> = 1..=6;
/// Staff on duty per day.
pub const STAFFING_RANGE: RangeInclusive<u32> = 1..=26;
/// Work days over the horizon.
pub const MONTHLY_WORK_DAYS_RANGE: RangeInclusive<u32> = 4..=24;
/// Work days per week.
pub const WEEKLY_WORK_DAYS_RANGE: RangeInclusive<u32> = 1..=6;
/// Groups per grouping rule.
pub const MAX_GROUPS: usize = 3;

/// Validation result.
pub type ValidationResult<T> = Result<T, ValidationErrors>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Workforce size outside `1..=26`.
    InvalidWorkforce,
    /// Horizon of zero days.
    InvalidHorizon,
    /// Time budget not a positive, finite number of seconds.
    InvalidTimeBudget,
    /// Work/off symbols that are empty or cannot be told apart.
    InvalidDisplay,
    /// A rule parameter outside its range.
    ParameterOutOfRange,
    /// A worker label that does not name a worker of the workforce.
    UnknownWorker,
    /// A day number outside `1..=num_days`.
    DayOutOfRange,
    /// A weekday name that cannot be parsed or never occurs in the horizon.
    UnknownWeekday,
    /// More groups than a grouping rule accepts.
    TooManyGroups,
    /// A selected scope that names no worker.
    EmptySelection,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Every problem found in one configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any error has the given kind.
    pub fn has(&self, kind: ValidationErrorKind) -> bool {
        self.0.iter().any(|e| e.kind == kind)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Validates a configuration and resolves it into a [`Policy`].
///
/// Checks:
/// 1. Workforce, horizon and time budget
/// 2. Every enabled rule's parameters, worker labels, days and weekdays
///
/// # Returns
/// The resolved policy, or `Err(errors)` with all detected issues.
pub fn validate_config(config: &Configuration) -> ValidationResult<Policy> {
    let mut v = Validator {
        num_workers: config.num_workers,
        horizon: Horizon::new(config.num_days, config.first_weekday),
        errors: Vec::new(),
    };

    if config.num_workers == 0 || config.num_workers > MAX_WORKERS {
        v.push(
            ValidationErrorKind::InvalidWorkforce,
            format!(
                "num_workers must be in 1..={MAX_WORKERS}, got {}",
                config.num_workers
            ),
        );
    }
    if config.num_days == 0 {
        v.push(ValidationErrorKind::InvalidHorizon, "num_days must be at least 1");
    }
    let time_budget = match Duration::try_from_secs_f64(config.time_budget_secs) {
        Ok(d) if !d.is_zero() => d,
        _ => {
            v.push(
                ValidationErrorKind::InvalidTimeBudget,
                format!(
                    "time_budget_secs must be a positive number, got {}",
                    config.time_budget_secs
                ),
            );
            Duration::ZERO
        }
    };

    v.display(&config.display);

    let r = &config.rules;
    let mut rules = RuleSet::new();
    let mut enable = |rule: Option<Rule>| {
        if let Some(rule) = rule {
            rules.insert(rule);
        }
    };

    enable(
        v.scoped(RuleKind::ConsecutiveWork, &r.consecutive_work, STREAK_RANGE)
            .map(Rule::ConsecutiveWork),
    );
    enable(
        v.scoped(RuleKind::WeekendOffQuota, &r.weekend_off_quota, WEEKEND_QUOTA_RANGE)
            .map(Rule::WeekendOffQuota),
    );
    enable(v.flag(RuleKind::WeekendsOff, &r.weekends_off).map(Rule::WeekendsOff));
    enable(
        v.scoped(RuleKind::MonthlyDaysOff, &r.monthly_days_off, MONTHLY_DAYS_OFF_RANGE)
            .map(Rule::MonthlyDaysOff),
    );
    enable(
        v.flag(RuleKind::NoSteppingStone, &r.no_stepping_stone)
            .map(Rule::NoSteppingStone),
    );
    enable(
        v.scoped(RuleKind::WeeklyDaysOff, &r.weekly_days_off, WEEKLY_DAYS_OFF_RANGE)
            .map(Rule::WeeklyDaysOff),
    );
    enable(v.staffing(&r.daily_staffing));
    enable(
        v.scoped(RuleKind::MonthlyWorkDays, &r.monthly_work_days, MONTHLY_WORK_DAYS_RANGE)
            .map(Rule::MonthlyWorkDays),
    );
    enable(
        v.scoped(RuleKind::WeeklyWorkDays, &r.weekly_work_days, WEEKLY_WORK_DAYS_RANGE)
            .map(Rule::WeeklyWorkDays),
    );
    enable(
        v.groups(RuleKind::WorkTogether, &r.work_together)
            .map(Rule::WorkTogether),
    );
    enable(v.groups(RuleKind::WorkApart, &r.work_apart).map(Rule::WorkApart));
    enable(v.fixed_dates(&r.fixed_dates_off));
    enable(v.fixed_weekdays(&r.fixed_weekdays_off));

    if !v.errors.is_empty() {
        return Err(ValidationErrors(v.errors));
    }

    Ok(Policy {
        num_workers: config.num_workers,
        horizon: v.horizon,
        objective: config.objective,
        time_budget,
        backend: config.backend,
        display: config.display.clone(),
        rules,
    })
}

struct Validator {
    num_workers: usize,
    horizon: Horizon,
    errors: Vec<ValidationError>,
}

impl Validator {
    fn push(&mut self, kind: ValidationErrorKind, message: impl Into<String>) {
        self.errors.push(ValidationError::new(kind, message));
    }

    fn display(&mut self, display: &DisplayOptions) {
        if display.work_symbol.is_empty() || display.off_symbol.is_empty() {
            self.push(
                ValidationErrorKind::InvalidDisplay,
                "display: work and off symbols must not be empty",
            );
        } else if display.work_symbol == display.off_symbol {
            self.push(
                ValidationErrorKind::InvalidDisplay,
                format!(
                    "display: work and off symbols are both '{}'",
                    display.work_symbol
                ),
            );
        }
    }

    fn check_range(&mut self, rule: RuleKind, value: u32, range: &RangeInclusive<u32>) {
        if !range.contains(&value) {
            self.push(
                ValidationErrorKind::ParameterOutOfRange,
                format!(
                    "{}: value {value} outside {}..={}",
                    rule.name(),
                    range.start(),
                    range.end()
                ),
            );
        }
    }

    /// Resolves labels to ids; reports unknown labels and empty lists.
    fn workers(&mut self, rule: RuleKind, labels: &[String]) -> BTreeSet<WorkerId> {
        if labels.is_empty() {
            self.push(
                ValidationErrorKind::EmptySelection,
                format!("{}: no workers selected", rule.name()),
            );
        }
        let mut ids = BTreeSet::new();
        for label in labels {
            match WorkerId::from_label(label) {
                Some(id) if id.index() < self.num_workers => {
                    ids.insert(id);
                }
                _ => self.push(
                    ValidationErrorKind::UnknownWorker,
                    format!(
                        "{}: '{label}' is not a worker of a workforce of {}",
                        rule.name(),
                        self.num_workers
                    ),
                ),
            }
        }
        ids
    }

    fn scoped(
        &mut self,
        rule: RuleKind,
        block: &ScopedBlock<u32>,
        range: RangeInclusive<u32>,
    ) -> Option<Scoped<u32>> {
        if !block.is_enabled() {
            return None;
        }
        let mut scoped = Scoped::new();
        if let Some(value) = block.all {
            self.check_range(rule, value, &range);
            scoped = scoped.with_all(value);
        }
        if let Some(selected) = &block.selected {
            self.check_range(rule, selected.value, &range);
            let ids = self.workers(rule, &selected.workers);
            scoped = scoped.with_selected(ids, selected.value);
        }
        Some(scoped)
    }

    fn flag(&mut self, rule: RuleKind, block: &FlagBlock) -> Option<Scoped<()>> {
        if !block.is_enabled() {
            return None;
        }
        let mut scoped = Scoped::new();
        if block.all {
            scoped = scoped.with_all(());
        }
        if let Some(labels) = &block.selected {
            let ids = self.workers(rule, labels);
            scoped = scoped.with_selected(ids, ());
        }
        Some(scoped)
    }

    fn staffing(&mut self, block: &StaffingBlock) -> Option<Rule> {
        if block.weekday_min.is_none() && block.weekend_min.is_none() {
            return None;
        }
        for min in [block.weekday_min, block.weekend_min].into_iter().flatten() {
            self.check_range(RuleKind::DailyStaffing, min, &STAFFING_RANGE);
        }
        Some(Rule::DailyStaffing {
            weekday_min: block.weekday_min,
            weekend_min: block.weekend_min,
        })
    }

    fn groups(&mut self, rule: RuleKind, block: &GroupsBlock) -> Option<Vec<BTreeSet<WorkerId>>> {
        if block.groups.is_empty() {
            return None;
        }
        if block.groups.len() > MAX_GROUPS {
            self.push(
                ValidationErrorKind::TooManyGroups,
                format!(
                    "{}: {} groups given, at most {MAX_GROUPS} allowed",
                    rule.name(),
                    block.groups.len()
                ),
            );
        }
        Some(
            block
                .groups
                .iter()
                .map(|labels| self.workers(rule, labels))
                .collect(),
        )
    }

    fn fixed_dates(&mut self, block: &FixedDatesBlock) -> Option<Rule> {
        if block.workers.is_empty() && block.days.is_empty() {
            return None;
        }
        let rule = RuleKind::FixedDatesOff;
        let workers = self.workers(rule, &block.workers);
        let mut days = BTreeSet::new();
        for &day in &block.days {
            if day == 0 || day > self.horizon.num_days() {
                self.push(
                    ValidationErrorKind::DayOutOfRange,
                    format!(
                        "{}: day {day} outside 1..={}",
                        rule.name(),
                        self.horizon.num_days()
                    ),
                );
            } else {
                days.insert(day - 1);
            }
        }
        Some(Rule::FixedDatesOff { workers, days })
    }

    fn fixed_weekdays(&mut self, block: &FixedWeekdaysBlock) -> Option<Rule> {
        if block.workers.is_empty() && block.weekdays.is_empty() {
            return None;
        }
        let rule = RuleKind::FixedWeekdaysOff;
        let workers = self.workers(rule, &block.workers);
        let mut weekdays = BTreeSet::new();
        for name in &block.weekdays {
            match name.parse::<Weekday>() {
                Ok(wd) if self.horizon.contains_weekday(wd) => {
                    weekdays.insert(wd);
                }
                Ok(wd) => self.push(
                    ValidationErrorKind::UnknownWeekday,
                    format!(
                        "{}: {wd} does not occur in a {}-day horizon",
                        rule.name(),
                        self.horizon.num_days()
                    ),
                ),
                Err(e) => self.push(
                    ValidationErrorKind::UnknownWeekday,
                    format!("{}: {e}", rule.name()),
                ),
            }
        }
        Some(Rule::FixedWeekdaysOff { workers, weekdays })
    }
}
