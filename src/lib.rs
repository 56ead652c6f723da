//! Workforce shift-policy compiler for the U-Engine ecosystem.
//!
//! Compiles a declarative staffing policy (up to thirteen independently
//! toggled, optionally scoped rules) into a binary linear model, hands it to
//! a pluggable solver, and decodes the answer into a worker × day shift
//! calendar.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Configuration`, `Horizon`, `Weekday`,
//!   `WorkerId`, `ShiftSchedule`
//! - **`validation`**: Configuration checks and label → id resolution
//! - **`rules`**: `Policy`, `Scope`, `RuleSet` and the rule compiler
//! - **`model`**: Variables, linear constraints, LP text encoding
//! - **`objective`**: Work/off maximization objective
//! - **`solver`**: Solver boundary, built-in branch-and-bound, CBC backend
//! - **`decode`**: Assignment → shift calendar
//! - **`kpi`**: Calendar summary metrics
//! - **`planner`**: The end-to-end pipeline
//!
//! # Example
//!
//! ```
//! use u_shift::models::{Configuration, FlagBlock, RuleConfig, ScopedBlock, Weekday, WorkerId};
//! use u_shift::planner::ShiftPlanner;
//!
//! let config = Configuration::new(3, 7, Weekday::Mon)
//!     .with_time_budget_secs(10.0)
//!     .with_rules(RuleConfig {
//!         consecutive_work: ScopedBlock::all(4),
//!         weekends_off: FlagBlock::selected(&["C"]),
//!         ..RuleConfig::default()
//!     });
//!
//! let plan = ShiftPlanner::new().plan(&config).unwrap();
//! assert_eq!(plan.schedule.is_working(WorkerId(2), 5), Some(false));
//! println!("{}", plan.schedule);
//! ```
//!
//! # References
//!
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of
//!   applications, methods and models"
//! - Wolsey (1998), "Integer Programming", Ch. 1.3 (logical conditions)

pub mod decode;
pub mod error;
pub mod kpi;
pub mod model;
pub mod models;
pub mod objective;
pub mod planner;
pub mod rules;
pub mod solver;
pub mod validation;

pub use error::{InternalError, Result, ShiftError};
pub use planner::{Plan, ShiftPlanner};
