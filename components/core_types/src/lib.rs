//! Core machine types and error handling.
//!
//! This crate provides the foundational types shared by every component of
//! the VMES bytecode machine: the machine word and the fatal error taxonomy.
//!
//! # Overview
//!
//! - [`Word`] - The integer value every stack slot, store slot and code word holds
//! - [`VmError`] - Fatal conditions that stop a run
//! - [`VmResult`] - Result alias used across the interpreter
//!
//! # Examples
//!
//! ```
//! use core_types::{flag, is_exactly_true, VmError};
//!
//! assert_eq!(flag(3 < 5), 1);
//! assert!(is_exactly_true(1));
//! assert!(!is_exactly_true(2));
//!
//! let error = VmError::StackUnderflow { pc: 4 };
//! assert_eq!(error.to_string(), "stack underflow at pc 4");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod value;

pub use error::{VmError, VmResult};
pub use value::{flag, is_exactly_false, is_exactly_true, Word, FALSE, TRUE};
