//! Deterministic fixed-point mathematics.
//!
//! Every path cost, arc weight and movement-cost multiplier in the pathfinding
//! core is a fixed-point number, so that two machines searching the same world
//! produce bit-identical costs and therefore the same tie-breaks.

use fixed::types::I48F16;

/// Fixed-point number type used for all costs.
///
/// Uses I48F16 format: 48 bits for the integer part, 16 bits for the fractional part.
/// This provides a range of approximately ±140 trillion with a precision of ~0.000015.
pub type FixedNum = I48F16;

/// Cost of an unreached search node.
pub const UNREACHED: FixedNum = FixedNum::MAX;

/// Convert a cost back to `f32` for presentation (timers, logs).
#[inline]
pub fn to_f32(value: FixedNum) -> f32 {
    value.to_num()
}
