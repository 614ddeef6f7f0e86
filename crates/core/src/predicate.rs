//! Target predicate: the comparison a scan filters per-nonce metrics through.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Default tolerance for float-valued game metrics (Limbo, Dice).
pub const DEFAULT_TOLERANCE_FLOAT: f64 = 1e-9;

/// Default tolerance for integer-valued game metrics (Roulette).
pub const DEFAULT_TOLERANCE_INTEGER: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateOp {
    Ge,
    Gt,
    Eq,
    Le,
    Lt,
    Between,
    Outside,
}

impl PredicateOp {
    pub fn parse(s: &str) -> Result<Self, EngineError> {
        match s {
            "ge" => Ok(PredicateOp::Ge),
            "gt" => Ok(PredicateOp::Gt),
            "eq" => Ok(PredicateOp::Eq),
            "le" => Ok(PredicateOp::Le),
            "lt" => Ok(PredicateOp::Lt),
            "between" => Ok(PredicateOp::Between),
            "outside" => Ok(PredicateOp::Outside),
            other => Err(EngineError::invalid_params(format!("unknown predicate op: {other}"))
                .with_context("op", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TargetPredicate {
    pub op: PredicateOp,
    pub val1: f64,
    pub val2: Option<f64>,
    pub tolerance: f64,
}

impl TargetPredicate {
    pub fn new(op: PredicateOp, val1: f64, val2: Option<f64>, tolerance: f64) -> Result<Self, EngineError> {
        if tolerance < 0.0 {
            return Err(EngineError::invalid_params("tolerance must be >= 0")
                .with_context("tolerance", tolerance));
        }
        if matches!(op, PredicateOp::Between | PredicateOp::Outside) {
            let v2 = val2.ok_or_else(|| {
                EngineError::invalid_params("val2 is required for between/outside predicates")
            })?;
            if val1 > v2 {
                return Err(EngineError::invalid_params("val1 must be <= val2")
                    .with_context("val1", val1)
                    .with_context("val2", v2));
            }
        }
        Ok(Self {
            op,
            val1,
            val2,
            tolerance,
        })
    }

    /// Evaluate the predicate against a metric. NaN never matches.
    pub fn matches(&self, metric: f64) -> bool {
        if metric.is_nan() {
            return false;
        }
        let tol = self.tolerance;
        match self.op {
            PredicateOp::Eq => (metric - self.val1).abs() <= tol,
            PredicateOp::Ge => metric >= self.val1 - tol,
            PredicateOp::Gt => metric > self.val1 + tol,
            PredicateOp::Le => metric <= self.val1 + tol,
            PredicateOp::Lt => metric < self.val1 - tol,
            PredicateOp::Between => {
                let v2 = self.val2.expect("validated at construction");
                metric >= self.val1 - tol && metric <= v2 + tol
            }
            PredicateOp::Outside => {
                let v2 = self.val2.expect("validated at construction");
                metric < self.val1 - tol || metric > v2 + tol
            }
        }
    }
}
