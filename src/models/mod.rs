//! Shift-scheduling domain models.
//!
//! Provides the data types on both ends of the compiler: the policy
//! configuration coming in, and the shift calendar going out.
//!
//! | Type | Role |
//! |------|------|
//! | `Horizon` | Days in the plan and their weekdays |
//! | `WorkerId` | Stable worker identity (letter label for display) |
//! | `Configuration` | One request's policy, as produced by a form or file |
//! | `ShiftSchedule` | Worker × day calendar of work/off symbols |

mod calendar;
mod config;
mod schedule;
mod worker;

pub use calendar::{Horizon, ParseWeekdayError, Weekday, WeekdayNames, MAX_WEEKEND_BLOCKS};
pub use config::{
    Configuration, DisplayOptions, FixedDatesBlock, FixedWeekdaysBlock, FlagBlock, GroupsBlock,
    ObjectiveSense, RuleConfig, ScopedBlock, SelectedBlock, SolverBackend, StaffingBlock,
};
pub use schedule::{Shift, ShiftSchedule};
pub use worker::{workforce, WorkerId, MAX_WORKERS};
