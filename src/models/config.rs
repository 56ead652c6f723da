//! Policy configuration record.
//!
//! A `Configuration` is what an external form or file produces: workforce
//! size, horizon, objective, solver settings and thirteen optional rule
//! blocks. It references workers by display label, days by 1-based day
//! number and weekdays by name. Nothing here is trusted until
//! [`validate_config`](crate::validation::validate_config) has resolved it
//! into a [`Policy`](crate::rules::Policy).
//!
//! # JSON shape
//! ```json
//! {
//!   "num_workers": 5,
//!   "num_days": 30,
//!   "first_weekday": "mon",
//!   "objective": "maximize_work",
//!   "time_budget_secs": 60,
//!   "rules": {
//!     "consecutive_work": { "all": 5, "selected": { "workers": ["A"], "value": 3 } },
//!     "weekends_off": { "all": false, "selected": ["B"] },
//!     "daily_staffing": { "weekday_min": 2 },
//!     "work_apart": { "groups": [["A", "C"]] },
//!     "fixed_dates_off": { "workers": ["D"], "days": [3, 17] }
//!   }
//! }
//! ```

use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::calendar::{Weekday, WeekdayNames};
use super::worker::WorkerId;
use crate::error::Result;

/// Direction of the objective.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveSense {
    /// Schedule as many work days as possible.
    #[default]
    MaximizeWork,
    /// Schedule as many days off as possible.
    MaximizeOff,
}

impl ObjectiveSense {
    /// Coefficient applied to every `work` variable in the minimized objective.
    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            ObjectiveSense::MaximizeWork => -1,
            ObjectiveSense::MaximizeOff => 1,
        }
    }
}

/// Which solver backend handles the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverBackend {
    /// Built-in exact branch-and-bound search.
    #[default]
    BranchAndBound,
    /// External `cbc` executable fed with an LP file.
    Cbc,
}

/// How the decoded schedule is labelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    /// Symbol for a work day.
    pub work_symbol: String,
    /// Symbol for a day off.
    pub off_symbol: String,
    /// Weekday naming in column labels.
    pub weekday_names: WeekdayNames,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            work_symbol: "〇".to_string(),
            off_symbol: "－".to_string(),
            weekday_names: WeekdayNames::English,
        }
    }
}

/// A rule parameter for a selected subset of workers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedBlock<P> {
    /// Worker labels.
    pub workers: Vec<String>,
    /// Parameter applied to those workers.
    pub value: P,
}

/// A numeric rule that can apply to all workers, a selection, or both.
///
/// When both are set, the selection governs its workers and `all` governs
/// everyone else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopedBlock<P> {
    /// Parameter for every worker.
    pub all: Option<P>,
    /// Parameter for selected workers.
    pub selected: Option<SelectedBlock<P>>,
}

impl<P> Default for ScopedBlock<P> {
    fn default() -> Self {
        Self {
            all: None,
            selected: None,
        }
    }
}

impl<P> ScopedBlock<P> {
    /// Enabled for every worker.
    pub fn all(value: P) -> Self {
        Self {
            all: Some(value),
            selected: None,
        }
    }

    /// Enabled for the given worker labels only.
    pub fn selected(workers: &[&str], value: P) -> Self {
        Self::default().with_selected(workers, value)
    }

    /// Adds a selected scope.
    pub fn with_selected(mut self, workers: &[&str], value: P) -> Self {
        self.selected = Some(SelectedBlock {
            workers: workers.iter().map(|w| w.to_string()).collect(),
            value,
        });
        self
    }

    /// Whether any scope is enabled.
    pub fn is_enabled(&self) -> bool {
        self.all.is_some() || self.selected.is_some()
    }
}

/// A parameterless rule for all workers and/or a selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagBlock {
    /// Enabled for every worker.
    pub all: bool,
    /// Enabled for these worker labels.
    pub selected: Option<Vec<String>>,
}

impl FlagBlock {
    /// Enabled for every worker.
    pub fn all() -> Self {
        Self {
            all: true,
            selected: None,
        }
    }

    /// Enabled for the given worker labels.
    pub fn selected(workers: &[&str]) -> Self {
        Self {
            all: false,
            selected: Some(workers.iter().map(|w| w.to_string()).collect()),
        }
    }

    /// Whether any scope is enabled.
    pub fn is_enabled(&self) -> bool {
        self.all || self.selected.is_some()
    }
}

/// Minimum staff on duty per day, by day type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffingBlock {
    /// Minimum on Monday..Friday.
    pub weekday_min: Option<u32>,
    /// Minimum on Saturday and Sunday.
    pub weekend_min: Option<u32>,
}

/// Named worker groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupsBlock {
    /// Each group is a list of worker labels.
    pub groups: Vec<Vec<String>>,
}

/// Explicit days off for a set of workers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedDatesBlock {
    /// Worker labels.
    pub workers: Vec<String>,
    /// 1-based day numbers.
    pub days: Vec<usize>,
}

/// Recurring weekdays off for a set of workers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedWeekdaysBlock {
    /// Worker labels.
    pub workers: Vec<String>,
    /// Weekday names (`Mon`, `monday`, `月`, ...).
    pub weekdays: Vec<String>,
}

/// The thirteen rule blocks. A block left at its default is disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Longest allowed run of work days (3..=6).
    pub consecutive_work: ScopedBlock<u32>,
    /// Minimum fully-free weekends (1..=4).
    pub weekend_off_quota: ScopedBlock<u32>,
    /// Saturdays and Sundays always off.
    pub weekends_off: FlagBlock,
    /// Minimum days off over the horizon (4..=10).
    pub monthly_days_off: ScopedBlock<u32>,
    /// Forbid off/work/off patterns.
    pub no_stepping_stone: FlagBlock,
    /// Minimum days off per complete week (1..=6).
    pub weekly_days_off: ScopedBlock<u32>,
    /// Minimum staff per day.
    pub daily_staffing: StaffingBlock,
    /// Minimum work days over the horizon (4..=24).
    pub monthly_work_days: ScopedBlock<u32>,
    /// Minimum work days per complete week (1..=6).
    pub weekly_work_days: ScopedBlock<u32>,
    /// Groups that always share the same days (at most three).
    pub work_together: GroupsBlock,
    /// Groups of which at most one member works a day (at most three).
    pub work_apart: GroupsBlock,
    /// Fixed dates off.
    pub fixed_dates_off: FixedDatesBlock,
    /// Fixed weekdays off.
    pub fixed_weekdays_off: FixedWeekdaysBlock,
}

/// One solve request's policy configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Workforce size (1..=26).
    pub num_workers: usize,
    /// Horizon length in days.
    pub num_days: usize,
    /// Weekday of day 1.
    pub first_weekday: Weekday,
    /// Objective direction.
    #[serde(default)]
    pub objective: ObjectiveSense,
    /// Solver time budget in seconds.
    #[serde(default = "default_time_budget_secs")]
    pub time_budget_secs: f64,
    /// Solver backend.
    #[serde(default)]
    pub backend: SolverBackend,
    /// Output labelling.
    #[serde(default)]
    pub display: DisplayOptions,
    /// Rule blocks.
    #[serde(default)]
    pub rules: RuleConfig,
}

fn default_time_budget_secs() -> f64 {
    120.0
}

impl Configuration {
    /// Creates a configuration with no rules enabled.
    pub fn new(num_workers: usize, num_days: usize, first_weekday: Weekday) -> Self {
        Self {
            num_workers,
            num_days,
            first_weekday,
            objective: ObjectiveSense::default(),
            time_budget_secs: default_time_budget_secs(),
            backend: SolverBackend::default(),
            display: DisplayOptions::default(),
            rules: RuleConfig::default(),
        }
    }

    /// Sets the objective direction.
    pub fn with_objective(mut self, objective: ObjectiveSense) -> Self {
        self.objective = objective;
        self
    }

    /// Sets the solver time budget.
    pub fn with_time_budget_secs(mut self, secs: f64) -> Self {
        self.time_budget_secs = secs;
        self
    }

    /// Sets the solver backend.
    pub fn with_backend(mut self, backend: SolverBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Sets the display options.
    pub fn with_display(mut self, display: DisplayOptions) -> Self {
        self.display = display;
        self
    }

    /// Sets the rule blocks.
    pub fn with_rules(mut self, rules: RuleConfig) -> Self {
        self.rules = rules;
        self
    }

    /// Parses a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Generates a random, structurally valid configuration.
    ///
    /// 5..=26 workers over 28..=31 days, with a consecutive-work limit for
    /// everybody and, half of the time, a weekend-off quota.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let num_workers = rng.random_range(5..=26);
        let num_days = rng.random_range(28..=31);
        let first_weekday = Weekday::from_index(rng.random_range(0..7));

        let mut rules = RuleConfig {
            consecutive_work: ScopedBlock::all(rng.random_range(3..=6)),
            ..RuleConfig::default()
        };
        if rng.random_bool(0.5) {
            rules.weekend_off_quota = ScopedBlock::all(rng.random_range(1..=2));
        }
        if rng.random_bool(0.5) {
            let staff = rng.random_range(1..=(num_workers as u32 / 2).max(1));
            rules.daily_staffing = StaffingBlock {
                weekday_min: Some(staff),
                weekend_min: None,
            };
        }

        Self::new(num_workers, num_days, first_weekday).with_rules(rules)
    }

    /// Display labels of every worker.
    pub fn worker_labels(&self) -> Vec<String> {
        (0..self.num_workers).map(|w| WorkerId(w).label()).collect()
    }
}
