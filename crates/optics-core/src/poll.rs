//! One poll cycle's observation for one fully-qualified key.

use serde::Serialize;

use crate::lens::{counter, dist, gauge, histo, quantile, LensType, LensValue};
use crate::Ts;

/// Scalar sink used by [`PollRecord::normalize`]: `(ts, key, value) -> keep going`.
pub type NormalizeFn<'a> = &'a mut dyn FnMut(Ts, &str, f64) -> bool;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollRecord {
    pub host: String,
    pub prefix: String,
    pub source: String,
    pub key: String,
    #[serde(rename = "type")]
    pub lens_type: LensType,
    pub ts: Ts,
    pub elapsed: Ts,
    pub value: LensValue,
}

impl PollRecord {
    /// Flatten the value into scalar points. Returns false as soon as `cb` does.
    pub fn normalize(&self, cb: NormalizeFn<'_>) -> bool {
        match &self.value {
            LensValue::Counter(v) => counter::normalize(self, *v, cb),
            LensValue::Gauge(v) => gauge::normalize(self, *v, cb),
            LensValue::Dist(v) => dist::normalize(self, v, cb),
            LensValue::Histo(v) => histo::normalize(self, v, cb),
            LensValue::Quantile(v) => quantile::normalize(self, *v, cb),
        }
    }
}
