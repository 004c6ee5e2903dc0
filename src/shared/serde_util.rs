//! Custom serde helpers for backend wire formats.

/// Deserializes a nullable JSON number into `f64`, mapping `null` to `0.0`.
///
/// The quote feed reports `null` for metrics it has not computed yet
/// (e.g. `percent_change_7d` on a freshly listed asset).
pub mod null_as_zero {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
    }
}
