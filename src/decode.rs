//! Assignment → shift calendar.

use tracing::info;

use crate::error::{Result, ShiftError};
use crate::model::Model;
use crate::models::{workforce, DisplayOptions, Shift, ShiftSchedule};
use crate::solver::Assignment;

/// Decodes the `work` variables of an assignment into a schedule grid.
///
/// Rows are workers (`A`, `B`, ...), columns are days labelled
/// `"{day} ({weekday})"`. Auxiliary variables are ignored.
///
/// # Errors
/// [`ShiftError::IncompleteAssignment`] if a `work` variable has no value.
pub fn decode(model: &Model, assignment: &Assignment, display: &DisplayOptions) -> Result<ShiftSchedule> {
    let registry = model.registry();
    let horizon = model.horizon();

    let mut shifts = Vec::with_capacity(registry.num_workers());
    for worker in workforce(registry.num_workers()) {
        let mut row = Vec::with_capacity(horizon.num_days());
        for d in horizon.days() {
            let var = registry.work(worker, d)?;
            let name = registry
                .get(var)
                .map(|v| v.name.as_str())
                .unwrap_or_default();
            let working = assignment
                .get(name)
                .ok_or_else(|| ShiftError::IncompleteAssignment {
                    variable: name.to_string(),
                })?;
            row.push(Shift::from_working(working));
        }
        shifts.push(row);
    }

    let columns = horizon
        .days()
        .map(|d| horizon.column_label(d, display.weekday_names))
        .collect();
    let schedule = ShiftSchedule::new(columns, &shifts, display);
    info!(
        workers = schedule.num_workers(),
        days = schedule.num_days(),
        "decoded schedule"
    );
    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Horizon, Weekday, WeekdayNames, WorkerId};
    use crate::rules::{compile, Policy};

    fn model() -> Model {
        compile(&Policy::new(2, Horizon::new(3, Weekday::Sat))).unwrap()
    }

    #[test]
    fn test_decode_grid() {
        let m = model();
        let a = Assignment::from_values(m.registry(), &[true, false, true, false, false, true]);
        let s = decode(&m, &a, &DisplayOptions::default()).unwrap();
        assert_eq!(s.row_labels(), &["A".to_string(), "B".to_string()]);
        assert_eq!(
            s.column_labels(),
            &["1 (Sat)".to_string(), "2 (Sun)".to_string(), "3 (Mon)".to_string()]
        );
        assert_eq!(s.symbol(WorkerId(0), 0), Some("〇"));
        assert_eq!(s.symbol(WorkerId(0), 1), Some("－"));
        assert_eq!(s.is_working(WorkerId(1), 2), Some(true));
    }

    #[test]
    fn test_decode_japanese_labels() {
        let m = model();
        let a = Assignment::from_values(m.registry(), &[false; 6]);
        let display = DisplayOptions {
            weekday_names: WeekdayNames::Japanese,
            ..DisplayOptions::default()
        };
        let s = decode(&m, &a, &display).unwrap();
        assert_eq!(s.column_labels()[0], "1 (土)");
    }

    #[test]
    fn test_decode_round_trip() {
        let m = model();
        let values = [true, true, false, false, true, false];
        let a = Assignment::from_values(m.registry(), &values);
        let s = decode(&m, &a, &DisplayOptions::default()).unwrap();
        for w in 0..2 {
            for d in 0..3 {
                assert_eq!(s.is_working(WorkerId(w), d), Some(values[w * 3 + d]));
            }
        }
    }

    #[test]
    fn test_decode_missing_value() {
        let m = model();
        let mut a = Assignment::new();
        a.insert("work_w0_d0", true);
        assert!(matches!(
            decode(&m, &a, &DisplayOptions::default()),
            Err(ShiftError::IncompleteAssignment { .. })
        ));
    }
}
