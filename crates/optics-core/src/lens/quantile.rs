//! Constant-memory stochastic quantile estimator.
//!
//! The estimate is `original_estimate + multiplier * adjustment_value`. Every
//! observation nudges `multiplier` by at most one step: an observation below
//! the estimate steps down with probability `1 - q`, any other observation
//! steps up with probability `q`. The expected drift is `q - F(estimate)`, so
//! the estimate settles where a fraction `q` of the stream lies below it.
//!
//! `multiplier` is the only mutable field and is touched with relaxed atomics
//! only. Racing writers may compute their step from a slightly stale estimate,
//! which slows convergence a little but never loses or tears a step.

use std::sync::atomic::{AtomicI64, Ordering};

use rand::Rng;

use crate::error::{OpticsError, Result};
use crate::poll::{NormalizeFn, PollRecord};

#[derive(Debug)]
pub struct QuantileLens {
    target_quantile: f64,
    original_estimate: f64,
    adjustment_value: f64,
    multiplier: AtomicI64,
}

impl QuantileLens {
    /// `target_quantile` must lie strictly inside (0, 1) and `adjustment_value`
    /// must be a positive finite step.
    pub fn new(target_quantile: f64, original_estimate: f64, adjustment_value: f64) -> Result<Self> {
        if !(target_quantile > 0.0 && target_quantile < 1.0) {
            return Err(OpticsError::Alloc(format!(
                "quantile target must be in (0, 1): {target_quantile}"
            )));
        }
        if !original_estimate.is_finite() {
            return Err(OpticsError::Alloc(format!(
                "quantile estimate must be finite: {original_estimate}"
            )));
        }
        if !(adjustment_value.is_finite() && adjustment_value > 0.0) {
            return Err(OpticsError::Alloc(format!(
                "quantile adjustment must be positive: {adjustment_value}"
            )));
        }

        Ok(Self {
            target_quantile,
            original_estimate,
            adjustment_value,
            multiplier: AtomicI64::new(0),
        })
    }

    pub fn multiplier(&self) -> i64 {
        self.multiplier.load(Ordering::Relaxed)
    }

    /// Current estimate.
    #[inline]
    pub fn estimate(&self) -> f64 {
        self.original_estimate + self.multiplier() as f64 * self.adjustment_value
    }

    /// Feed one observation.
    pub fn update(&self, value: f64) -> bool {
        let trial = rand::thread_rng().gen_bool(self.target_quantile);
        self.adjust(value, trial);
        true
    }

    /// Apply the update rule for `value` given the outcome of the Bernoulli
    /// trial with success probability `target_quantile`. Returns the step
    /// applied to the multiplier.
    pub fn adjust(&self, value: f64, trial: bool) -> i64 {
        let delta = if value < self.estimate() {
            if trial {
                0
            } else {
                -1
            }
        } else if trial {
            1
        } else {
            0
        };

        if delta != 0 {
            self.multiplier.fetch_add(delta, Ordering::Relaxed);
        }
        delta
    }

    pub fn read(&self) -> f64 {
        self.estimate()
    }
}

pub fn normalize(poll: &PollRecord, value: f64, cb: NormalizeFn<'_>) -> bool {
    cb(poll.ts, &poll.key, value)
}
