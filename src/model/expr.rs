//! Integer linear expressions and constraints over binary variables.
//!
//! Expressions are built with ordinary operators:
//!
//! ```
//! use u_shift::model::{Constraint, LinearExpr, Relation, VarId};
//!
//! let (a, b) = (VarId(0), VarId(1));
//! // 2a <= (1 - a) + (1 - b)
//! let c = Constraint::new(
//!     "demo",
//!     LinearExpr::from(a) * 2,
//!     Relation::Le,
//!     (LinearExpr::constant(1) - a) + (LinearExpr::constant(1) - b),
//! );
//! assert_eq!(c.terms(), &[(a, 3), (b, 1)]);
//! assert_eq!(c.rhs(), 2);
//! ```

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Index of a decision variable in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VarId(pub usize);

impl VarId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// `sum(coeff * var) + constant`.
///
/// Terms keep first-appearance order; repeated variables are merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpr {
    terms: Vec<(VarId, i64)>,
    constant: i64,
}

impl LinearExpr {
    /// The zero expression.
    pub fn zero() -> Self {
        Self::default()
    }

    /// A constant expression.
    pub fn constant(value: i64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    /// `coeff * var`.
    pub fn term(var: VarId, coeff: i64) -> Self {
        let mut e = Self::zero();
        e.add_term(var, coeff);
        e
    }

    /// Sum of variables, each with coefficient 1.
    pub fn sum<I: IntoIterator<Item = VarId>>(vars: I) -> Self {
        let mut e = Self::zero();
        for v in vars {
            e.add_term(v, 1);
        }
        e
    }

    /// Adds `coeff * var` in place.
    pub fn add_term(&mut self, var: VarId, coeff: i64) {
        match self.terms.iter_mut().find(|(v, _)| *v == var) {
            Some((_, c)) => *c += coeff,
            None => self.terms.push((var, coeff)),
        }
    }

    /// Terms in first-appearance order (zero coefficients included).
    pub fn terms(&self) -> &[(VarId, i64)] {
        &self.terms
    }

    /// Constant part.
    pub fn constant_part(&self) -> i64 {
        self.constant
    }

    /// Evaluates with a variable value lookup.
    pub fn evaluate<F: Fn(VarId) -> i64>(&self, value: F) -> i64 {
        self.constant + self.terms.iter().map(|&(v, c)| c * value(v)).sum::<i64>()
    }
}

impl From<VarId> for LinearExpr {
    fn from(var: VarId) -> Self {
        Self::term(var, 1)
    }
}

impl From<i64> for LinearExpr {
    fn from(value: i64) -> Self {
        LinearExpr::constant(value)
    }
}

impl<R: Into<LinearExpr>> Add<R> for LinearExpr {
    type Output = LinearExpr;

    fn add(mut self, rhs: R) -> LinearExpr {
        let rhs: LinearExpr = rhs.into();
        self.constant += rhs.constant;
        for (v, c) in rhs.terms {
            self.add_term(v, c);
        }
        self
    }
}

impl<R: Into<LinearExpr>> Sub<R> for LinearExpr {
    type Output = LinearExpr;

    fn sub(self, rhs: R) -> LinearExpr {
        let rhs: LinearExpr = rhs.into();
        self + (-rhs)
    }
}

impl Neg for LinearExpr {
    type Output = LinearExpr;

    fn neg(self) -> LinearExpr {
        self * -1
    }
}

impl Mul<i64> for LinearExpr {
    type Output = LinearExpr;

    fn mul(mut self, k: i64) -> LinearExpr {
        self.constant *= k;
        for (_, c) in &mut self.terms {
            *c *= k;
        }
        self
    }
}

/// Relational operator of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `==`
    Eq,
}

impl Relation {
    /// LP-format symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Relation::Le => "<=",
            Relation::Ge => ">=",
            Relation::Eq => "=",
        }
    }

    /// Whether `lhs (op) rhs` holds.
    #[inline]
    pub fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Relation::Le => lhs <= rhs,
            Relation::Ge => lhs >= rhs,
            Relation::Eq => lhs == rhs,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// `sum(coeff * var) (op) rhs`, constants folded into `rhs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    label: String,
    terms: Vec<(VarId, i64)>,
    relation: Relation,
    rhs: i64,
}

impl Constraint {
    /// Builds `lhs (op) rhs` and moves every constant to the right-hand side.
    pub fn new(
        label: impl Into<String>,
        lhs: impl Into<LinearExpr>,
        relation: Relation,
        rhs: impl Into<LinearExpr>,
    ) -> Self {
        let lhs: LinearExpr = lhs.into();
        let rhs: LinearExpr = rhs.into();
        let diff = lhs - rhs;
        Self {
            label: label.into(),
            rhs: -diff.constant,
            terms: diff.terms,
            relation,
        }
    }

    /// Constraint name.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Variable terms.
    pub fn terms(&self) -> &[(VarId, i64)] {
        &self.terms
    }

    /// Relational operator.
    pub fn relation(&self) -> Relation {
        self.relation
    }

    /// Right-hand side constant.
    pub fn rhs(&self) -> i64 {
        self.rhs
    }

    /// Left-hand side value under a variable value lookup.
    pub fn activity<F: Fn(VarId) -> i64>(&self, value: F) -> i64 {
        self.terms.iter().map(|&(v, c)| c * value(v)).sum()
    }

    /// Whether the constraint holds under a variable value lookup.
    pub fn is_satisfied<F: Fn(VarId) -> i64>(&self, value: F) -> bool {
        self.relation.holds(self.activity(value), self.rhs)
    }
}
