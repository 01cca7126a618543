// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025 Bradley M. Bell
// ---------------------------------------------------------------------------
//
//! A function-execution tracer and linearized-IR toolkit.
//!
//! An external tracer (out of scope here) records a host computation as
//! a [Tape]: an ordered list of [Operation]s with `Input`, `Constant`,
//! `Call`, and structured `Loop` variants. The crate owns everything
//! downstream of that recording:
//!
//! * the [Tape] mutation algebra ([Tape::push], [Tape::insert],
//!   [Tape::set], [Tape::replace], [Tape::deleteat]) that keeps
//!   `op.id == position` and every bound [Variable] valid across edits,
//! * [rebind::rebind], the substitution engine those mutations build on,
//! * [interpreter::play], which re-executes a tape against new inputs,
//! * [primitivize::primitivize], which inlines non-primitive calls by
//!   splicing in a traced sub-tape,
//! * [resolver::FunctionResolver], a most-specific-first dispatch table
//!   used to decide whether a call is primitive,
//! * [loop_exec], Loop sub-tape execution.
//!
//! There is no wire protocol, no persistence, and no concurrency: a
//! tape is a mutable, single-threaded container. Clone it
//! ([Tape::deep_clone]) to run it from more than one place at once.
// ---------------------------------------------------------------------------
//
pub mod context;
pub mod display;
pub mod error;
pub mod interpreter;
pub mod loop_exec;
pub mod operation;
pub mod options;
pub mod primitivize;
pub mod rebind;
pub mod resolver;
pub mod tape;
pub mod types;
pub mod value;
pub mod variable;
//
pub use context::{Context, DictContext};
pub use error::TapeError;
pub use interpreter::play;
pub use operation::{CallArg, CallFn, LoopOp, OpKind, Operation};
pub use options::TraceOptions;
pub use primitivize::{primitivize, Tracer};
pub use resolver::FunctionResolver;
pub use tape::{MetaValue, Tape};
pub use types::{Signature, Type};
pub use value::{Callable, CallableValue, FnCallable, FnRef, Slot, Value};
pub use variable::{OpCell, Variable};
//
// mkcall
/// Construct a Call operation, eagerly evaluating it when possible
/// (spec §4.2).
///
/// The call is *calculable* iff every argument is either a literal or a
/// bound variable whose operation already has a known `val`; an unbound
/// variable argument is never calculable, since there is no tape to
/// resolve it against at this point. When `val` is [Slot::Unknown] and
/// the call is calculable, `func` is invoked eagerly against the
/// resolved argument values and the result becomes `val`; otherwise
/// `val` is stored verbatim. The returned [Operation] is un-adopted
/// (`id == 0`); [Tape::push] / [Tape::insert] assign its real id.
pub fn mkcall(func : CallFn, args : Vec<CallArg>, val : Slot) -> Operation {
    let calculable = fn_is_calculable(&func) && args.iter().all(arg_is_calculable);
    if val.is_unknown() && calculable {
        let resolved_fn   = resolve_fn_eagerly(&func);
        let resolved_args : Vec<Value> = args.iter().map(resolve_arg_eagerly).collect();
        let result        = resolved_fn.call(&resolved_args);
        return Operation::call( func, args, Slot::Known(result) );
    }
    Operation::call(func, args, val)
}
//
fn fn_is_calculable(func : &CallFn) -> bool {
    match func {
        CallFn::Fn(_)  => true,
        CallFn::Var(v) => v.op().map( |cell| ! cell.borrow().val.is_unknown() ).unwrap_or(false),
    }
}
//
fn arg_is_calculable(arg : &CallArg) -> bool {
    match arg {
        CallArg::Lit(_) => true,
        CallArg::Var(v) => v.op().map( |cell| ! cell.borrow().val.is_unknown() ).unwrap_or(false),
    }
}
//
fn resolve_fn_eagerly(func : &CallFn) -> FnRef {
    match func {
        CallFn::Fn(f)  => f.clone(),
        CallFn::Var(v) => {
            let cell = v.op().expect( "mkcall: calculable implies a bound fn variable" );
            let op   = cell.borrow();
            op.val.value().downcast_ref::<CallableValue>()
                .expect( "mkcall: fn variable's value is not callable" )
                .0.clone()
        }
    }
}
//
fn resolve_arg_eagerly(arg : &CallArg) -> Value {
    match arg {
        CallArg::Lit(v) => v.clone(),
        CallArg::Var(v) => {
            let cell = v.op().expect( "mkcall: calculable implies a bound arg variable" );
            cell.borrow().val.value().clone()
        }
    }
}
//
// call_signature
/// Build the [Signature] a [crate::resolver::FunctionResolver] query
/// uses for the Call `(func, args)` currently recorded on `tape` (spec
/// §6 `call_signature(tape, call)`).
pub fn call_signature(
    tape : &Tape,
    func : &CallFn,
    args : &[CallArg],
) -> Result<Signature, TapeError> {
    let function_type = match func {
        CallFn::Fn(f)  => f.type_tag(),
        CallFn::Var(v) => interpreter::resolve_var(tape, v)?.callable_type_tag(),
    };
    let mut arg_types = Vec::with_capacity( args.len() );
    for a in args {
        let t = match a {
            CallArg::Lit(v) => v.type_tag(),
            CallArg::Var(v) => interpreter::resolve_var(tape, v)?.type_tag(),
        };
        arg_types.push(t);
    }
    Ok( Signature::new(function_type, arg_types) )
}
//
// call_signature_of_values
/// Build the [Signature] for applying `func` to `args` directly, before
/// either has been recorded on any tape (spec §6 `call_signature(fn,
/// args…)`) -- what [primitivize::primitivize] uses to decide whether a
/// call it is about to trace through is already primitive.
pub fn call_signature_of_values(func : &Value, args : &[Value]) -> Signature {
    Signature::new( func.callable_type_tag(), args.iter().map( Value::type_tag ).collect() )
}
//
// bound
/// Promote `v` to a bound reference into `tape` (spec §6 `bound(tape,
/// v)`); thin sugar over [Tape::bound].
pub fn bound(tape : &Tape, v : &Variable) -> Result<Variable, TapeError> {
    tape.bound(v)
}
//
#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FnCallable;
    //
    fn mul() -> FnRef {
        std::rc::Rc::new( FnCallable::new( "*", |args : &[Value]| {
            let a = *args[0].downcast_ref::<f64>().unwrap();
            let b = *args[1].downcast_ref::<f64>().unwrap();
            Value::new(a * b)
        } ) )
    }
    //
    #[test]
    fn mkcall_eager_eval() {
        let mut tape = Tape::new();
        let v1 = tape.push( Operation::input_with( Value::new(3.0_f64) ) );
        let call = mkcall(
            CallFn::Fn( mul() ),
            vec![ CallArg::Lit( Value::new(2.0_f64) ), CallArg::Var(v1) ],
            Slot::Unknown,
        );
        let val = call.val.value().downcast_ref::<f64>().copied().unwrap();
        assert_eq!(val, 6.0);
    }
    //
    #[test]
    fn mkcall_unbound_arg_is_unknown() {
        let call = mkcall(
            CallFn::Fn( mul() ),
            vec![ CallArg::Lit( Value::new(2.0_f64) ), CallArg::Var( Variable::unbound(100) ) ],
            Slot::Unknown,
        );
        assert!( call.val.is_unknown() );
    }
    //
    #[test]
    fn mkcall_explicit_val_is_kept_verbatim() {
        let call = mkcall(
            CallFn::Fn( mul() ),
            vec![ CallArg::Lit( Value::new(2.0_f64) ), CallArg::Lit( Value::new(3.0_f64) ) ],
            Slot::Known( Value::new(10.0_f64) ),
        );
        assert_eq!( call.val.value().downcast_ref::<f64>().copied(), Some(10.0) );
    }
}
