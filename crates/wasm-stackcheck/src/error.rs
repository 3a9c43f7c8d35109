/* Copyright 2026 The Stackcheck Project Developers
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use crate::ValType;
use std::fmt;

/// A validation failure: what constraint was violated and at which operator.
#[derive(Debug, Clone)]
pub struct ValidationError {
    // Wrap the actual error data in a `Box` so that the error is just one
    // word. This means that we can continue returning small `Result`s in
    // registers.
    inner: Box<ValidationErrorInner>,
}

#[derive(Debug, Clone)]
struct ValidationErrorInner {
    kind: ErrorKind,
    offset: usize,
}

/// The result type used throughout this crate.
pub type Result<T, E = ValidationError> = std::result::Result<T, E>;

impl std::error::Error for ValidationError {}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at offset 0x{:x})", self.inner.kind, self.inner.offset)
    }
}

impl ValidationError {
    /// Creates a new error of the given `kind` positioned at `offset`.
    #[cold]
    pub fn new(kind: ErrorKind, offset: usize) -> Self {
        ValidationError {
            inner: Box::new(ValidationErrorInner { kind, offset }),
        }
    }

    /// Get the kind of error that this is.
    pub fn kind(&self) -> &ErrorKind {
        &self.inner.kind
    }

    /// Get the offset where the error occurred.
    ///
    /// For operators this is the index of the failing operator in its
    /// function body.
    pub fn offset(&self) -> usize {
        self.inner.offset
    }
}

/// The constraint that a function body violated.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A pop was attempted at the current frame's height while reachable.
    #[error("type mismatch: expected {} but nothing on stack", expected_desc(.expected))]
    StackUnderflow {
        /// The type that was expected, if any.
        expected: Option<ValType>,
    },

    /// A popped type did not equal the expected type.
    #[error("type mismatch: expected {expected}, found {actual}")]
    TypeMismatch {
        /// The type the operator required.
        expected: ValType,
        /// The type found on the operand stack.
        actual: ValType,
    },

    /// An `end` or `else` had no open frame to close, or an operator
    /// followed the end of the function.
    #[error("{0}")]
    UnbalancedControl(&'static str),

    /// An `else` closed a frame that was not opened by `if`.
    #[error("else found outside of an `if` block")]
    MalformedElse,

    /// Operands remained above a frame's height once its results were popped.
    #[error("type mismatch: values remaining on stack at end of block")]
    StackHeightMismatch,

    /// A branch targeted a depth beyond the open frames.
    #[error("unknown label {0}: branch depth too large")]
    InvalidLabel(u32),

    /// The targets of a `br_table` disagree on their label types.
    #[error("type mismatch: br_table target labels have different types")]
    InconsistentBranchTargets,

    /// A local index out of bounds.
    #[error("unknown local {0}: local index out of bounds")]
    UnknownLocal(u32),

    /// A global index out of bounds.
    #[error("unknown global {0}: global index out of bounds")]
    UnknownGlobal(u32),

    /// `global.set` on an immutable global.
    #[error("global is immutable: cannot modify it with `global.set`")]
    ImmutableGlobal,

    /// A function index out of bounds.
    #[error("unknown function {0}: function index out of bounds")]
    UnknownFunction(u32),

    /// A type index out of bounds.
    #[error("unknown type {0}: type index out of bounds")]
    UnknownType(u32),

    /// A memory index out of bounds.
    #[error("unknown memory {0}")]
    UnknownMemory(u32),

    /// A table index out of bounds.
    #[error("unknown table {0}: table index out of bounds")]
    UnknownTable(u32),

    /// A memory access claimed more than its natural alignment.
    #[error("alignment must not be larger than natural")]
    InvalidAlignment,

    /// A static offset that does not fit the memory's index type.
    #[error("offset out of range: must be <= 2**32")]
    OffsetOutOfRange,

    /// Local declarations overflowed or exceeded the implementation limit.
    #[error("too many locals: locals exceed maximum")]
    TooManyLocals,

    /// An operator or signature needs a proposal that is not enabled.
    #[error("{0} support is not enabled")]
    FeatureDisabled(&'static str),
}

fn expected_desc(expected: &Option<ValType>) -> String {
    match expected {
        Some(ty) => ty.to_string(),
        None => "a type".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_offset() {
        let err = ValidationError::new(
            ErrorKind::TypeMismatch {
                expected: ValType::I32,
                actual: ValType::F64,
            },
            0x1a,
        );
        assert_eq!(
            err.to_string(),
            "type mismatch: expected i32, found f64 (at offset 0x1a)"
        );
        assert_eq!(err.offset(), 0x1a);
    }

    #[test]
    fn underflow_message() {
        let kind = ErrorKind::StackUnderflow { expected: None };
        assert_eq!(
            kind.to_string(),
            "type mismatch: expected a type but nothing on stack"
        );
        let kind = ErrorKind::StackUnderflow {
            expected: Some(ValType::I64),
        };
        assert_eq!(
            kind.to_string(),
            "type mismatch: expected i64 but nothing on stack"
        );
    }

    #[test]
    fn error_is_one_word() {
        assert_eq!(
            std::mem::size_of::<ValidationError>(),
            std::mem::size_of::<usize>()
        );
    }
}
