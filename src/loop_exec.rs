// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025 Bradley M. Bell
// ---------------------------------------------------------------------------
//
//! Execution of a Loop operation's sub-tape: iterate until the condition
//! variable reads `false`.
//!
//! Link to [parent module](super)
// ---------------------------------------------------------------------------
//
use crate::error::TapeError;
use crate::operation::LoopOp;
use crate::options::TraceOptions;
use crate::tape::Tape;
use crate::value::Value;
use crate::variable::Variable;
//
// run
/// Execute `l`'s sub-tape to completion and return the exit tuple.
/// Requires at least one full pass through the sub-tape, both while
/// tracing and while executing.
pub fn run(l : &mut LoopOp, options : TraceOptions) -> Result<Value, TapeError> {
    let seed : Vec<Value> = l.parent_inputs.iter().map( resolve_bound ).collect();
    crate::interpreter::set_inputs( &mut l.subtape, &seed )?;
    //
    let vi0       = crate::interpreter::inputs( &l.subtape ).len() + 1;
    let condition = l.condition.id();
    let mut vi    = vi0;
    //
    loop {
        crate::interpreter::exec_op( &l.subtape, vi, options )?;
        //
        if vi == condition {
            let cond_val = crate::interpreter::resolve_var( &l.subtape, &l.condition )?;
            let is_true  = cond_val.downcast_ref::<bool>().copied()
                .expect( "Loop: condition value must be bool" );
            if ! is_true {
                let mut exit_vals = Vec::with_capacity( l.exit_vars.len() );
                for idx in 0 .. l.exit_vars.len() {
                    exit_vals.push( loop_exit_vars_at_point(idx, &l.cont_vars, &l.subtape, vi)? );
                }
                return Ok( Value::new(exit_vals) );
            }
        }
        //
        vi += 1;
        if vi > l.subtape.len() {
            vi = vi0;
            let next : Vec<Value> = l.cont_vars.iter()
                .map( |v| crate::interpreter::resolve_var( &l.subtape, v ) )
                .collect::<Result<_, _>>()?;
            crate::interpreter::set_inputs( &mut l.subtape, &next )?;
        }
    }
}
//
// resolve_bound
/// Read the current value of a variable known to be bound (the
/// `parent_inputs` of a Loop always are, by construction).
fn resolve_bound(v : &Variable) -> Value {
    let cell = v.op().expect( "Loop: parent_inputs must be bound" );
    let op   = cell.borrow();
    if op.val.is_unknown() {
        panic!( "Loop: %{} has no value at execution time", op.id );
    }
    op.val.value().clone()
}
//
// loop_exit_vars_at_point
/// The value to report for the carried variable at `idx` when the loop
/// exits with `vi`: if this iteration has already advanced past
/// `cont_vars[idx]`'s defining op (`vi > cont_vars[idx].id()`), read that
/// fresh value; otherwise -- including when `cont_vars[idx]` is defined
/// by the very op just evaluated at `vi` -- the corresponding input slot
/// still holds the value from the prior iteration's seeding (spec §9).
fn loop_exit_vars_at_point(
    idx       : usize,
    cont_vars : &[Variable],
    subtape   : &Tape,
    vi        : usize,
) -> Result<Value, TapeError> {
    let cv = &cont_vars[idx];
    if cv.id() < vi {
        crate::interpreter::resolve_var(subtape, cv)
    } else {
        let input_vars = crate::interpreter::inputs(subtape);
        crate::interpreter::resolve_var( subtape, &input_vars[idx] )
    }
}
