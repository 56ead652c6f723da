//! Shift calendar (decoded solution).
//!
//! A worker × day grid of display symbols. The grid is a view of an
//! assignment: it holds no state beyond what the symbols encode, and the
//! work/off value of every cell can be read back from its symbol.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::config::DisplayOptions;
use super::worker::WorkerId;

/// Status of one worker on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shift {
    /// Scheduled to work.
    Work,
    /// Day off.
    Off,
}

impl Shift {
    /// From a solver value (1 = work).
    #[inline]
    pub fn from_working(working: bool) -> Self {
        if working {
            Shift::Work
        } else {
            Shift::Off
        }
    }

    /// Whether this is a work day.
    #[inline]
    pub fn is_work(self) -> bool {
        self == Shift::Work
    }
}

/// A worker × day shift calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftSchedule {
    /// Row labels: worker display labels.
    row_labels: Vec<String>,
    /// Column labels: `"{day_number} ({weekday})"`.
    column_labels: Vec<String>,
    /// Symbols, `cells[worker][day]`.
    cells: Vec<Vec<String>>,
    work_symbol: String,
    off_symbol: String,
}

impl ShiftSchedule {
    /// Builds a schedule from shifts, `shifts[worker][day]`.
    pub fn new(column_labels: Vec<String>, shifts: &[Vec<Shift>], display: &DisplayOptions) -> Self {
        let cells = shifts
            .iter()
            .map(|row| {
                row.iter()
                    .map(|s| match s {
                        Shift::Work => display.work_symbol.clone(),
                        Shift::Off => display.off_symbol.clone(),
                    })
                    .collect()
            })
            .collect();
        Self {
            row_labels: (0..shifts.len()).map(|w| WorkerId(w).label()).collect(),
            column_labels,
            cells,
            work_symbol: display.work_symbol.clone(),
            off_symbol: display.off_symbol.clone(),
        }
    }

    /// Worker labels.
    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    /// Day labels.
    pub fn column_labels(&self) -> &[String] {
        &self.column_labels
    }

    /// Number of workers.
    pub fn num_workers(&self) -> usize {
        self.row_labels.len()
    }

    /// Number of days.
    pub fn num_days(&self) -> usize {
        self.column_labels.len()
    }

    /// Display symbol of a cell.
    pub fn symbol(&self, worker: WorkerId, day: usize) -> Option<&str> {
        self.cells
            .get(worker.index())
            .and_then(|row| row.get(day))
            .map(String::as_str)
    }

    /// Shift of a cell, read back from its symbol.
    ///
    /// Returns `None` if the cell is out of range or holds an unknown symbol.
    pub fn shift(&self, worker: WorkerId, day: usize) -> Option<Shift> {
        let symbol = self.symbol(worker, day)?;
        if symbol == self.work_symbol {
            Some(Shift::Work)
        } else if symbol == self.off_symbol {
            Some(Shift::Off)
        } else {
            None
        }
    }

    /// Whether `worker` works on `day`.
    pub fn is_working(&self, worker: WorkerId, day: usize) -> Option<bool> {
        self.shift(worker, day).map(Shift::is_work)
    }

    /// Work days of one worker.
    pub fn work_days(&self, worker: WorkerId) -> usize {
        (0..self.num_days())
            .filter(|&d| self.is_working(worker, d) == Some(true))
            .count()
    }

    /// Workers on duty on one day.
    pub fn staff_on(&self, day: usize) -> usize {
        (0..self.num_workers())
            .filter(|&w| self.is_working(WorkerId(w), day) == Some(true))
            .count()
    }
}

impl fmt::Display for ShiftSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths: Vec<usize> = self
            .column_labels
            .iter()
            .map(|c| c.chars().count())
            .collect();
        let row_width = self
            .row_labels
            .iter()
            .map(|r| r.chars().count())
            .max()
            .unwrap_or(0);

        write!(f, "{:row_width$}", "")?;
        for label in &self.column_labels {
            write!(f, " {label}")?;
        }
        writeln!(f)?;

        for (label, row) in self.row_labels.iter().zip(&self.cells) {
            write!(f, "{label:row_width$}")?;
            for (symbol, width) in row.iter().zip(&widths) {
                let pad = width.saturating_sub(symbol.chars().count());
                write!(f, " {}{symbol}", " ".repeat(pad))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ShiftSchedule {
        let shifts = vec![
            vec![Shift::Work, Shift::Off, Shift::Work],
            vec![Shift::Off, Shift::Off, Shift::Work],
        ];
        let columns = vec!["1 (Mon)".into(), "2 (Tue)".into(), "3 (Wed)".into()];
        ShiftSchedule::new(columns, &shifts, &DisplayOptions::default())
    }

    #[test]
    fn test_labels() {
        let s = sample();
        assert_eq!(s.row_labels(), ["A", "B"]);
        assert_eq!(s.column_labels()[2], "3 (Wed)");
        assert_eq!(s.num_workers(), 2);
        assert_eq!(s.num_days(), 3);
    }

    #[test]
    fn test_symbols_read_back() {
        let s = sample();
        assert_eq!(s.symbol(WorkerId(0), 0), Some("〇"));
        assert_eq!(s.symbol(WorkerId(0), 1), Some("－"));
        assert_eq!(s.is_working(WorkerId(1), 2), Some(true));
        assert_eq!(s.is_working(WorkerId(1), 0), Some(false));
        assert_eq!(s.is_working(WorkerId(2), 0), None);
        assert_eq!(s.is_working(WorkerId(0), 3), None);
    }

    #[test]
    fn test_counts() {
        let s = sample();
        assert_eq!(s.work_days(WorkerId(0)), 2);
        assert_eq!(s.work_days(WorkerId(1)), 1);
        assert_eq!(s.staff_on(2), 2);
        assert_eq!(s.staff_on(1), 0);
    }

    #[test]
    fn test_custom_symbols() {
        let display = DisplayOptions {
            work_symbol: "W".into(),
            off_symbol: ".".into(),
            ..DisplayOptions::default()
        };
        let columns = vec!["1 (Mon)".into(), "2 (Tue)".into()];
        let s = ShiftSchedule::new(columns, &[vec![Shift::Work, Shift::Off]], &display);
        assert_eq!(s.symbol(WorkerId(0), 0), Some("W"));
        assert_eq!(s.symbol(WorkerId(0), 1), Some("."));
        assert_eq!(s.shift(WorkerId(0), 0), Some(Shift::Work));
        assert_eq!(s.shift(WorkerId(0), 1), Some(Shift::Off));
    }

    #[test]
    fn test_display_grid() {
        let text = sample().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("1 (Mon)"));
        assert!(lines[1].starts_with('A'));
        assert!(lines[2].starts_with('B'));
    }
}
