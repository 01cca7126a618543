// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025 Bradley M. Bell
// ---------------------------------------------------------------------------
//
//! The recoverable error conditions spec §7 calls out explicitly.
//!
//! Contract violations the spec calls "undefined" (stale references,
//! indexing with a garbage id produced outside the public API) remain
//! `assert!`/`panic!`, matching `bradbell-rustad`'s own choice not to
//! wrap every precondition in a `Result`.
//!
//! Link to [parent module](super)
// ---------------------------------------------------------------------------
//
use std::fmt;
//
// TapeError
/// A recoverable failure from the tape API (spec §7).
#[derive(Debug, Clone, PartialEq)]
pub enum TapeError {
    //
    // TapeError::ShapeMismatch
    /// `inputs!` was called with a value count that conflicts with the
    /// tape's declared arity and the tape is not vararg.
    ShapeMismatch { expected : usize, actual : usize },
    //
    // TapeError::OutOfRange
    /// A [crate::variable::Variable] addressed a position outside
    /// `1 ..= tape.len()`.
    OutOfRange { id : usize, len : usize },
    //
    // TapeError::BranchViolation
    /// `should_assert_branches!` is set and re-execution observed a
    /// branch-condition Call return a different value than it did at
    /// trace time (spec §7).
    BranchViolation { op_id : usize },
    //
    // TapeError::InvariantViolation
    /// Raised by [crate::tape::Tape::verify_invariants] findings when
    /// surfaced through a `Result`-returning caller.
    InvariantViolation(String),
}
//
impl fmt::Display for TapeError {
    fn fmt(&self, f : &mut fmt::Formatter) -> fmt::Result {
        match self {
            TapeError::ShapeMismatch { expected, actual } => write!(
                f, "inputs!: expected {expected} values, got {actual}"
            ),
            TapeError::OutOfRange { id, len } => write!(
                f, "variable %{id} is out of range for a tape of length {len}"
            ),
            TapeError::BranchViolation { op_id } => write!(
                f, "play!: branch condition at %{op_id} took a different \
                    path than it did when traced"
            ),
            TapeError::InvariantViolation(msg) => write!( f, "{msg}" ),
        }
    }
}
//
impl std::error::Error for TapeError {}
