//! Shift calendar metrics.
//!
//! Summary indicators computed from a decoded schedule.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Work days | Days on duty per worker |
//! | Days off | Days off per worker |
//! | Longest streak | Longest run of consecutive work days per worker |
//! | Staff on duty | Workers on duty per day |
//! | Min / max staffing | Extremes of staff on duty over the horizon |
//! | Work ratio | Work cells / all cells (0.0..1.0) |

use serde::{Deserialize, Serialize};

use crate::models::{ShiftSchedule, WorkerId};

/// Schedule summary indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftKpi {
    /// Work days per worker.
    pub work_days_by_worker: Vec<usize>,
    /// Days off per worker.
    pub days_off_by_worker: Vec<usize>,
    /// Longest run of consecutive work days per worker.
    pub longest_streak_by_worker: Vec<usize>,
    /// Workers on duty per day.
    pub staff_by_day: Vec<usize>,
    /// Fewest workers on duty on any day.
    pub min_daily_staff: usize,
    /// Most workers on duty on any day.
    pub max_daily_staff: usize,
    /// Work cells over the whole grid.
    pub total_work_days: usize,
    /// `total_work_days / (workers * days)`.
    pub work_ratio: f64,
}

impl ShiftKpi {
    /// Computes metrics from a schedule.
    pub fn calculate(schedule: &ShiftSchedule) -> Self {
        let num_workers = schedule.num_workers();
        let num_days = schedule.num_days();

        let mut work_days_by_worker = Vec::with_capacity(num_workers);
        let mut longest_streak_by_worker = Vec::with_capacity(num_workers);
        for w in 0..num_workers {
            let worker = WorkerId(w);
            work_days_by_worker.push(schedule.work_days(worker));

            let mut longest = 0;
            let mut run = 0;
            for d in 0..num_days {
                if schedule.is_working(worker, d) == Some(true) {
                    run += 1;
                    longest = longest.max(run);
                } else {
                    run = 0;
                }
            }
            longest_streak_by_worker.push(longest);
        }
        let days_off_by_worker = work_days_by_worker.iter().map(|&n| num_days - n).collect();

        let staff_by_day: Vec<usize> = (0..num_days).map(|d| schedule.staff_on(d)).collect();
        let min_daily_staff = staff_by_day.iter().copied().min().unwrap_or(0);
        let max_daily_staff = staff_by_day.iter().copied().max().unwrap_or(0);

        let total_work_days: usize = work_days_by_worker.iter().sum();
        let cells = num_workers * num_days;
        let work_ratio = if cells == 0 {
            0.0
        } else {
            total_work_days as f64 / cells as f64
        };

        Self {
            work_days_by_worker,
            days_off_by_worker,
            longest_streak_by_worker,
            staff_by_day,
            min_daily_staff,
            max_daily_staff,
            total_work_days,
            work_ratio,
        }
    }

    /// Whether every day has at least `min_staff` on duty and no worker
    /// works more than `max_streak` days in a row.
    pub fn meets_thresholds(&self, min_staff: usize, max_streak: usize) -> bool {
        self.min_daily_staff >= min_staff
            && self.longest_streak_by_worker.iter().all(|&s| s <= max_streak)
    }
}
