//! Call frame view over the call stack
//!
//! `CALL` leaves three bookkeeping words under the callee's frame base:
//!
//! ```text
//! fp - 3 - i   argument (argc - 1 - i)
//! fp - 2       argc
//! fp - 1       caller's fp
//! fp           return address
//! fp + 1 ..    callee temporaries
//! ```
//!
//! A [`CallFrame`] is a decoded copy of those words. Frames are never stored
//! anywhere else; the stack is the only source of truth.

use core_types::Word;

/// Offset of the last pushed argument relative to the frame base
pub const LAST_ARG_OFFSET: Word = -3;

/// `LOAD`/`STORE` offset of argument `index` in a procedure taking `argc`
/// arguments
///
/// ```
/// use interpreter::call_frame::argument_offset;
///
/// assert_eq!(argument_offset(1, 0), -3);
/// assert_eq!(argument_offset(2, 0), -4);
/// assert_eq!(argument_offset(2, 1), -3);
/// ```
pub fn argument_offset(argc: Word, index: Word) -> Word {
    LAST_ARG_OFFSET - (argc - 1 - index)
}

/// Call frame representing a procedure invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFrame {
    /// Stack slot holding the return address (the frame pointer value)
    pub base: usize,
    /// Instruction pointer to return to after the procedure completes
    pub return_address: Word,
    /// Caller's frame pointer
    pub saved_fp: Word,
    /// Number of arguments the caller pushed
    pub argc: Word,
}

impl CallFrame {
    /// Decode the frame whose base is `fp`
    ///
    /// Returns `None` when the slots below `fp` cannot hold a frame.
    pub fn read(stack: &[Word], fp: usize) -> Option<Self> {
        if fp < 2 || fp >= stack.len() {
            return None;
        }
        Some(Self {
            base: fp,
            return_address: stack[fp],
            saved_fp: stack[fp - 1],
            argc: stack[fp - 2],
        })
    }

    /// The caller's argument words, first argument first
    pub fn arguments<'a>(&self, stack: &'a [Word]) -> Option<&'a [Word]> {
        let argc = usize::try_from(self.argc).ok()?;
        let end = self.base.checked_sub(2)?;
        let start = end.checked_sub(argc)?;
        stack.get(start..end)
    }

    /// Walk the saved frame pointer chain from `fp` outwards
    ///
    /// Stops at top level (`fp == 0`) or at the first slot that does not
    /// decode into a frame. Each step must move strictly down the stack.
    pub fn backtrace(stack: &[Word], fp: usize) -> Vec<CallFrame> {
        let mut frames = Vec::new();
        let mut cursor = fp;
        while let Some(frame) = CallFrame::read(stack, cursor) {
            let next = match usize::try_from(frame.saved_fp) {
                Ok(next) if next < cursor => next,
                _ => {
                    frames.push(frame);
                    break;
                }
            };
            frames.push(frame);
            cursor = next;
        }
        frames
    }
}
