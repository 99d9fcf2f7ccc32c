//! Fixed-point math utilities for deterministic planning.
//!
//! Resource balances, health and damage all use fixed-point arithmetic so that
//! the same turn snapshot always yields the same plan and the same simulated
//! outcome, independent of the host CPU.

use fixed::types::I32F32;

/// Fixed-point number type for all planning math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Converts a count into a fixed-point multiplier.
#[must_use]
pub fn from_count(count: u32) -> Fixed {
    Fixed::saturating_from_num(count)
}

/// Whole number of items of `unit_cost` that `balance` can pay for.
///
/// Returns zero for a non-positive cost or balance.
#[must_use]
pub fn affordable_count(balance: Fixed, unit_cost: Fixed) -> u32 {
    if unit_cost <= Fixed::ZERO || balance <= Fixed::ZERO {
        return 0;
    }
    (balance / unit_cost).floor().saturating_to_num::<u32>()
}

/// Serde support for fixed-point numbers.
///
/// Configuration files and engine payloads carry plain decimal numbers
/// (`60`, `0.5`), so values cross the serialization boundary as `f64` and are
/// rejected when they do not fit the fixed-point range.
pub mod fixed_serde {
    use super::Fixed;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as a decimal.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_num::<f64>().serialize(serializer)
    }

    /// Deserialize a fixed-point number from a decimal.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        if !value.is_finite() {
            return Err(D::Error::custom(format!(
                "expected a finite number, got {value}"
            )));
        }
        Fixed::checked_from_num(value)
            .ok_or_else(|| D::Error::custom(format!("{value} is out of fixed-point range")))
    }
}
