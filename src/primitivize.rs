// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025 Bradley M. Bell
// ---------------------------------------------------------------------------
//
//! `primitivize!` : replace every non-primitive Call with the sub-tape
//! produced by tracing it (spec §4.6).
//!
//! Link to [parent module](super)
// ---------------------------------------------------------------------------
//
use std::collections::HashMap;
//
use crate::error::TapeError;
use crate::operation::{CallArg, CallFn, Operation, OpKind};
use crate::resolver::FunctionResolver;
use crate::tape::Tape;
use crate::value::{CallableValue, Value};
use crate::variable::Variable;
//
// Tracer
/// The seam an external tracer frontend implements to supply a
/// sub-tape for a non-primitive call. Out of scope for this crate
/// (spec §1's "external tracer"): callers provide their own
/// implementation that records `callee(args...)`.
pub trait Tracer {
    //
    // Tracer::trace
    /// Produce a tape recording `callee` applied to `args`, with one
    /// Input op per argument followed by the recorded body.
    fn trace(&self, callee : &Value, args : &[Value]) -> Tape;
}
//
// primitivize
/// `primitivize!(tape; is_primitive)` (spec §4.6): every Call whose
/// signature is absent from `is_primitive` is replaced by the sub-tape
/// `tracer` produces for it, spliced in via [Tape::replace]. Does not
/// descend into Loop sub-tapes or the tape's context (spec §4.5, §9).
pub fn primitivize(
    tape         : &mut Tape,
    is_primitive : &FunctionResolver<()>,
    tracer       : &dyn Tracer,
) -> Result<(), TapeError> {
    let snapshot : Vec<Variable> = tape.iter().map( |c| Variable::bound( c.clone() ) ).collect();
    for v in snapshot {
        let target = {
            let op = tape.get(&v)?;
            match op.as_call() {
                Some((func, args, _)) => {
                    let sig = crate::call_signature(tape, func, args)?;
                    is_primitive.get(&sig).is_none()
                }
                None => false,
            }
        };
        if target {
            primitivize_one(tape, v.id(), tracer)?;
        }
    }
    Ok(())
}
//
// ArgSource
/// What a sub-tape input position (1..=n_inputs) should become once its
/// defining Input op is dropped from the spliced body: either a
/// reference to the outer tape's argument variable, or the literal
/// value that argument was (a sub-tape Input exists for *every*
/// argument per spec §4.6 step 2-3, whether or not the outer call
/// passed a variable).
enum ArgSource {
    OuterVar(usize),
    Literal(Value),
}
//
// primitivize_one
fn primitivize_one(tape : &mut Tape, idx : usize, tracer : &dyn Tracer) -> Result<(), TapeError> {
    let (func, args) = {
        let op            = tape.get( &Variable::unbound(idx) )?;
        let (func, args, _) = op.as_call().expect( "primitivize: target must be a Call" );
        ( func.clone(), args.to_vec() )
    };
    //
    // old_new : sub-tape input position -> this argument's source in the
    // outer tape (spec §4.6 step 4). The tracer's sub-tape carries one
    // Input per *argument* only -- the callee is resolved to a concrete
    // value up front and never itself becomes a sub-tape input.
    let mut old_new = HashMap::new();
    let callee_val = match &func {
        CallFn::Fn(f)  => Value::new( CallableValue( f.clone() ) ),
        CallFn::Var(v) => crate::interpreter::resolve_var(tape, v)?,
    };
    let mut arg_vals = Vec::with_capacity( args.len() );
    for (i, a) in args.iter().enumerate() {
        let pos = i + 1;
        match a {
            CallArg::Lit(v) => {
                old_new.insert( pos, ArgSource::Literal( v.clone() ) );
                arg_vals.push( v.clone() );
            }
            CallArg::Var(v) => {
                old_new.insert( pos, ArgSource::OuterVar( v.id() ) );
                arg_vals.push( crate::interpreter::resolve_var(tape, v)? );
            }
        }
    }
    //
    let sub      = tracer.trace(&callee_val, &arg_vals);
    let n_inputs = crate::interpreter::inputs(&sub).len();
    if sub.len() <= n_inputs {
        return Ok(());
    }
    let body      = extract_body(&sub, n_inputs, idx, &old_new);
    let rebind_to = body.len() - 1;
    //
    // `old_new`'s redirections target references *inside* `body` itself
    // (a dropped sub-tape Input), not references in the tape's tail --
    // `extract_body` has already resolved every one of them while
    // building `body`, so there is nothing left for `Tape::replace`'s
    // own `old_new` parameter to do here; it is passed empty.
    tape.replace(idx, body, rebind_to, HashMap::new())?;
    Ok(())
}
//
// extract_body
/// Drop `sub`'s inputs and return its remaining operations as
/// un-adopted [Operation] values whose variable references are
/// rewritten to their final position once spliced into the outer tape
/// at `idx` -- either an outer-tape argument variable, the argument's
/// literal value inlined directly (via `old_new`, for references to a
/// dropped input), or another body op (by position arithmetic, since
/// body occupies `idx ..= idx + body.len() - 1`).
fn extract_body(
    sub      : &Tape,
    n_inputs : usize,
    idx      : usize,
    old_new  : &HashMap<usize, ArgSource>,
) -> Vec<Operation> {
    let translate_var = |id : usize| -> CallArg {
        if id <= n_inputs {
            match old_new.get(&id).expect( "primitivize: old_new missing a sub-tape input mapping" ) {
                ArgSource::OuterVar(outer_id) => CallArg::Var( Variable::unbound(*outer_id) ),
                ArgSource::Literal(v)         => CallArg::Lit( v.clone() ),
            }
        } else {
            CallArg::Var( Variable::unbound( idx + (id - n_inputs) - 1 ) )
        }
    };
    let translate_fn = |id : usize| -> CallFn {
        if id <= n_inputs {
            match old_new.get(&id).expect( "primitivize: old_new missing a sub-tape input mapping" ) {
                ArgSource::OuterVar(outer_id) => CallFn::Var( Variable::unbound(*outer_id) ),
                ArgSource::Literal(_)         => panic!(
                    "primitivize: callee resolved from a literal-sourced sub-tape input"
                ),
            }
        } else {
            CallFn::Var( Variable::unbound( idx + (id - n_inputs) - 1 ) )
        }
    };
    let mut body = Vec::with_capacity( sub.len() - n_inputs );
    for p in (n_inputs + 1) ..= sub.len() {
        let cell = sub.cell_at(p).expect( "extract_body: position in range" );
        let op   = cell.borrow();
        let kind = match &op.kind {
            OpKind::Input    => OpKind::Input,
            OpKind::Constant => OpKind::Constant,
            OpKind::Call { func, args, is_branch } => OpKind::Call {
                func : match func {
                    CallFn::Fn(f)  => CallFn::Fn( f.clone() ),
                    CallFn::Var(v) => translate_fn( v.id() ),
                },
                args : args.iter().map( |a| match a {
                    CallArg::Lit(v) => CallArg::Lit( v.clone() ),
                    CallArg::Var(v) => translate_var( v.id() ),
                } ).collect(),
                is_branch : *is_branch,
            },
            OpKind::Loop(_) => panic!(
                "primitivize: tracing into a call whose body contains a Loop is not supported"
            ),
        };
        body.push( Operation {
            id : 0, tape_id : None, val : op.val.clone(), typ : op.typ, kind,
        } );
    }
    body
}
