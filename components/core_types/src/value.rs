//! Machine word representation.
//!
//! The machine has exactly one value type: a signed 32-bit integer. Booleans
//! produced by comparisons are the words `1` and `0`.

/// A single machine word
pub type Word = i32;

/// Word pushed by comparisons that hold
pub const TRUE: Word = 1;

/// Word pushed by comparisons that do not hold
pub const FALSE: Word = 0;

/// Convert a Rust boolean into a machine word
pub fn flag(condition: bool) -> Word {
    if condition {
        TRUE
    } else {
        FALSE
    }
}

/// Check whether a popped branch condition selects `JMPT`
///
/// Only the exact word `1` counts as true.
pub fn is_exactly_true(value: Word) -> bool {
    value == TRUE
}

/// Check whether a popped branch condition selects `JMPF`
///
/// Only the exact word `0` counts as false.
pub fn is_exactly_false(value: Word) -> bool {
    value == FALSE
}
