//! Decision variable registry.
//!
//! Owns every binary variable of a model and its stable name. Ids are dense:
//! `work[w, d]` first (worker-major), then `weekend_off[w, we]` when weekend
//! reasoning is enabled.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::expr::VarId;
use crate::error::InternalError;
use crate::models::{Horizon, WorkerId};

/// What a variable means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VarKind {
    /// 1 = `worker` works on `day`.
    Work { worker: WorkerId, day: usize },
    /// 1 = `worker` has both days of weekend block `block` off.
    WeekendOff { worker: WorkerId, block: usize },
}

/// A binary decision variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// Stable, solver-safe name.
    pub name: String,
    /// Semantics.
    pub kind: VarKind,
}

/// Registry of decision variables for one model.
#[derive(Debug, Clone)]
pub struct VariableRegistry {
    num_workers: usize,
    num_days: usize,
    num_weekend_blocks: usize,
    variables: Vec<Variable>,
    by_name: HashMap<String, VarId>,
}

impl VariableRegistry {
    /// Creates `work[w, d]` for the whole horizon and, if requested,
    /// `weekend_off[w, we]` for every complete weekend block.
    pub fn new(num_workers: usize, horizon: &Horizon, weekend_vars: bool) -> Self {
        let num_days = horizon.num_days();
        let num_weekend_blocks = if weekend_vars {
            horizon.weekend_blocks().count()
        } else {
            0
        };

        let mut variables =
            Vec::with_capacity(num_workers * (num_days + num_weekend_blocks));
        for w in 0..num_workers {
            for d in 0..num_days {
                variables.push(Variable {
                    name: format!("work_w{w}_d{d}"),
                    kind: VarKind::Work {
                        worker: WorkerId(w),
                        day: d,
                    },
                });
            }
        }
        for w in 0..num_workers {
            for we in 0..num_weekend_blocks {
                variables.push(Variable {
                    name: format!("weekend_off_w{w}_b{we}"),
                    kind: VarKind::WeekendOff {
                        worker: WorkerId(w),
                        block: we,
                    },
                });
            }
        }

        let by_name = variables
            .iter()
            .enumerate()
            .map(|(i, v)| (v.name.clone(), VarId(i)))
            .collect();

        Self {
            num_workers,
            num_days,
            num_weekend_blocks,
            variables,
            by_name,
        }
    }

    /// `work[worker, day]`.
    pub fn work(&self, worker: WorkerId, day: usize) -> Result<VarId, InternalError> {
        if worker.index() >= self.num_workers || day >= self.num_days {
            return Err(InternalError::UnknownVariable {
                family: "work",
                worker: worker.index(),
                index: day,
            });
        }
        Ok(VarId(worker.index() * self.num_days + day))
    }

    /// `weekend_off[worker, block]`.
    pub fn weekend_off(&self, worker: WorkerId, block: usize) -> Result<VarId, InternalError> {
        if worker.index() >= self.num_workers || block >= self.num_weekend_blocks {
            return Err(InternalError::UnknownVariable {
                family: "weekend_off",
                worker: worker.index(),
                index: block,
            });
        }
        let offset = self.num_workers * self.num_days;
        Ok(VarId(
            offset + worker.index() * self.num_weekend_blocks + block,
        ))
    }

    /// Work variables of one worker, in day order.
    pub fn work_row(&self, worker: WorkerId) -> Result<Vec<VarId>, InternalError> {
        (0..self.num_days).map(|d| self.work(worker, d)).collect()
    }

    /// Every `work` variable id.
    pub fn work_vars(&self) -> impl Iterator<Item = VarId> {
        (0..self.num_workers * self.num_days).map(VarId)
    }

    /// Variable by id.
    pub fn get(&self, id: VarId) -> Option<&Variable> {
        self.variables.get(id.index())
    }

    /// Variable id by name.
    pub fn lookup(&self, name: &str) -> Option<VarId> {
        self.by_name.get(name).copied()
    }

    /// All variables in id order.
    pub fn iter(&self) -> impl Iterator<Item = (VarId, &Variable)> {
        self.variables.iter().enumerate().map(|(i, v)| (VarId(i), v))
    }

    /// Total number of variables.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Whether the registry holds no variables.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Number of `work` variables.
    pub fn work_count(&self) -> usize {
        self.num_workers * self.num_days
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    pub fn num_days(&self) -> usize {
        self.num_days
    }

    /// Weekend blocks with `weekend_off` variables (0 if disabled).
    pub fn num_weekend_blocks(&self) -> usize {
        self.num_weekend_blocks
    }
}
