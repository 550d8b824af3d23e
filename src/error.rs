//! Diagnostic records for assembly and disassembly.
//!
//! Every reportable problem is an [`Error`] carrying a 1-based source line
//! number and a human-readable message. Passes accumulate errors into an
//! [`Errors`] vector so the caller sees as many diagnostics as possible from
//! a single run; programming errors (malformed descriptor tables, link
//! requests outside the image) panic instead.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// A single diagnostic tied to a source line.
///
/// For disassembly, where there is no source text, `line` is the 1-based
/// index of the 32-bit word within the input image.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Error {
    /// 1-based source line (or word index, for disassembly errors).
    pub line: u32,
    /// Human-readable description of the problem.
    pub message: String,
}

impl Error {
    /// Create an error for the given 1-based source line.
    #[must_use]
    pub fn new(line: u32, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Errors accumulated by one assembler pass.
pub type Errors = Vec<Error>;
