// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025 Bradley M. Bell
// ---------------------------------------------------------------------------
//
//! `inputs`, `inputs!`, and [play] : populate a tape's Input slots and
//! re-execute it (spec §4.7, §6).
//!
//! Link to [parent module](super)
// ---------------------------------------------------------------------------
//
use crate::error::TapeError;
use crate::operation::{CallArg, CallFn, OpKind, Operation};
use crate::options::TraceOptions;
use crate::tape::{MetaValue, Tape};
use crate::value::{CallableValue, FnRef, Value};
use crate::variable::Variable;
//
// inputs
/// Bound variables for every Input operation, in tape order (spec §6).
pub fn inputs(tape : &Tape) -> Vec<Variable> {
    tape.iter()
        .filter( |cell| matches!( cell.borrow().kind, OpKind::Input ) )
        .map( |cell| Variable::bound( cell.clone() ) )
        .collect()
}
//
// set_inputs
/// `inputs!(tape, vals...)` (spec §6): if `tape` is empty, push one
/// Input per value. Otherwise overwrite the existing Input slots'
/// `val`s, honoring `tape.meta["isva"]` (the last declared input
/// absorbs the tail of `vals` as a tuple).
pub fn set_inputs(tape : &mut Tape, vals : &[Value]) -> Result<(), TapeError> {
    if tape.is_empty() {
        for v in vals {
            tape.push( Operation::input_with( v.clone() ) );
        }
        return Ok(());
    }
    let input_vars = inputs(tape);
    let n          = input_vars.len();
    let is_vararg  = tape.meta.get("isva").map( MetaValue::as_bool ).unwrap_or(false);
    //
    if is_vararg && n >= 1 {
        if vals.len() < n - 1 {
            return Err( TapeError::ShapeMismatch { expected : n - 1, actual : vals.len() } );
        }
        for (v, val) in input_vars[ .. n - 1 ].iter().zip( vals.iter() ) {
            write_input(v, val.clone());
        }
        let tail = Value::new( vals[ n - 1 .. ].to_vec() );
        write_input( &input_vars[n - 1], tail );
    } else {
        if vals.len() != n {
            return Err( TapeError::ShapeMismatch { expected : n, actual : vals.len() } );
        }
        for (v, val) in input_vars.iter().zip( vals.iter() ) {
            write_input(v, val.clone());
        }
    }
    Ok(())
}
//
fn write_input(v : &Variable, val : Value) {
    let cell    = v.op().expect("inputs!: Input variable must be bound");
    let mut op  = cell.borrow_mut();
    op.typ = Some( val.type_tag() );
    op.val = val.into();
}
//
// play
/// `play!(tape, args...; debug)` (spec §4.7): populate inputs, execute
/// every operation in ascending position order, and return the value at
/// `tape.result`. Mutates every operation's `val` in place; re-running
/// two `play!`s against the same tape concurrently is a data race (§5) --
/// `Tape::deep_clone` exists for callers that need to parallelize.
pub fn play(tape : &mut Tape, args : &[Value], debug : bool) -> Result<Value, TapeError> {
    set_inputs(tape, args)?;
    let options = crate::options::current_trace_options();
    if debug {
        println!( "-- Begin Trace (tape {}) --", tape.tape_id() );
    }
    for id in 1 ..= tape.len() {
        if debug {
            println!( "  {}", crate::display::format_op( &tape.cell_at(id)?.borrow() ) );
        }
        exec_op(tape, id, options)?;
    }
    if debug {
        println!( "-- End Trace --" );
    }
    let result = tape.result()
        .ok_or( TapeError::InvariantViolation( "play!: tape has no result".to_string() ) )?
        .clone();
    resolve_var(tape, &result)
}
//
// exec_op
/// Dispatch execution of the operation at `id` (spec §4.7 step 2).
pub(crate) fn exec_op(tape : &Tape, id : usize, options : TraceOptions) -> Result<(), TapeError> {
    let cell = tape.cell_at(id)?.clone();
    //
    let is_loop = matches!( cell.borrow().kind, OpKind::Loop(_) );
    if is_loop {
        let new_val = {
            let mut op = cell.borrow_mut();
            match &mut op.kind {
                OpKind::Loop(l) => crate::loop_exec::run(l, options)?,
                _               => unreachable!(),
            }
        };
        let mut op = cell.borrow_mut();
        op.typ = Some( new_val.type_tag() );
        op.val = new_val.into();
        return Ok(());
    }
    //
    let is_call = matches!( cell.borrow().kind, OpKind::Call { .. } );
    if ! is_call {
        return Ok(());
    }
    //
    let (resolved_fn, resolved_args, is_branch) = {
        let op                        = cell.borrow();
        let (func, args, is_branch)   = op.as_call().expect("exec_op: Call");
        let resolved_fn               = resolve_fn(tape, func)?;
        let resolved_args : Vec<Value> = args.iter()
            .map( |a| resolve_arg(tape, a) )
            .collect::<Result<_, _>>()?;
        (resolved_fn, resolved_args, is_branch)
    };
    let new_val = resolved_fn.call(&resolved_args);
    //
    if is_branch && options.assert_branches {
        if let Some(prev) = cell.borrow().val.clone().into_value() {
            let prev_bool = prev.downcast_ref::<bool>().copied();
            let new_bool  = new_val.downcast_ref::<bool>().copied();
            if prev_bool.is_some() && prev_bool != new_bool {
                return Err( TapeError::BranchViolation { op_id : id } );
            }
        }
    }
    //
    let mut op = cell.borrow_mut();
    op.typ = Some( new_val.type_tag() );
    op.val = new_val.into();
    Ok(())
}
//
// resolve_var
pub(crate) fn resolve_var(tape : &Tape, v : &Variable) -> Result<Value, TapeError> {
    let op = tape.get(v)?;
    if op.val.is_unknown() {
        panic!( "resolve_var: %{} has no value at execution time", v.id() );
    }
    Ok( op.val.value().clone() )
}
//
fn resolve_arg(tape : &Tape, a : &CallArg) -> Result<Value, TapeError> {
    match a {
        CallArg::Lit(v) => Ok( v.clone() ),
        CallArg::Var(v) => resolve_var(tape, v),
    }
}
//
fn resolve_fn(tape : &Tape, f : &CallFn) -> Result<FnRef, TapeError> {
    match f {
        CallFn::Fn(f)  => Ok( f.clone() ),
        CallFn::Var(v) => {
            let val = resolve_var(tape, v)?;
            Ok( val.downcast_ref::<CallableValue>()
                .expect( "exec: fn variable's value is not callable" )
                .0.clone() )
        }
    }
}
