// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025 Bradley M. Bell
// ---------------------------------------------------------------------------
//
//! Tracing options.
//!
//! Spec §7/§9 describes two process-wide global toggles,
//! `should_trace_loops!` and `should_assert_branches!`. Per the REDESIGN
//! FLAG in spec §9 ("re-express as an explicit options struct threaded
//! through the tracer, with a process-level default for compatibility"),
//! those are [TraceOptions] fields here. A process-level default is kept
//! as a `static` behind a `Mutex`, the same idiom `bradbell-rustad` uses
//! for its own process-wide `NEXT_TAPE_ID` counter (`src/tape.rs`).
//!
//! Link to [parent module](super)
// ---------------------------------------------------------------------------
//
use std::sync::{LazyLock, Mutex};
//
// TraceOptions
/// Options threaded explicitly through tracing and re-execution, in
/// place of the original's global toggles.
#[derive(Clone, Copy, Debug)]
pub struct TraceOptions {
    //
    // TraceOptions::trace_loops
    /// If true, the (out-of-scope) tracer frontend records loops
    /// structurally as a single [crate::operation::OpKind::Loop]
    /// operation. If false, it unrolls them; re-executing an unrolled
    /// tape against a different iteration count then silently returns
    /// the wrong answer (documented behavior, not an error: spec §7).
    pub trace_loops     : bool,
    //
    // TraceOptions::assert_branches
    /// If true, [crate::interpreter::play] checks every Call flagged as
    /// a branch condition (`Operation::is_branch`, SPEC_FULL §3) still
    /// returns the value it returned at trace time, failing with
    /// [crate::error::TapeError::BranchViolation] otherwise.
    pub assert_branches : bool,
}
//
impl Default for TraceOptions {
    fn default() -> Self {
        Self { trace_loops : true, assert_branches : false }
    }
}
//
// DEFAULT_TRACE_OPTIONS
/// Process-level default, mutated by [should_trace_loops] /
/// [should_assert_branches] for code that wants "just flip a global and
/// go" compatibility with the original toggle-based API.
static DEFAULT_TRACE_OPTIONS : LazyLock<Mutex<TraceOptions>> =
    LazyLock::new( || Mutex::new( TraceOptions::default() ) );
//
// current_trace_options
/// Read the process-level default [TraceOptions].
pub fn current_trace_options() -> TraceOptions {
    *DEFAULT_TRACE_OPTIONS.lock().unwrap()
}
//
// should_trace_loops
/// Get or set the process-level default for [TraceOptions::trace_loops].
pub fn should_trace_loops(new_value : Option<bool>) -> bool {
    let mut options = DEFAULT_TRACE_OPTIONS.lock().unwrap();
    if let Some(value) = new_value {
        options.trace_loops = value;
    }
    options.trace_loops
}
//
// should_assert_branches
/// Get or set the process-level default for [TraceOptions::assert_branches].
pub fn should_assert_branches(new_value : Option<bool>) -> bool {
    let mut options = DEFAULT_TRACE_OPTIONS.lock().unwrap();
    if let Some(value) = new_value {
        options.assert_branches = value;
    }
    options.assert_branches
}
