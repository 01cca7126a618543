// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025 Bradley M. Bell
// ---------------------------------------------------------------------------
//
//! The substitution engine: rewrite variable references across a tape
//! and its context (spec §4.5).
//!
//! Link to [parent module](super)
// ---------------------------------------------------------------------------
//
use std::collections::HashMap;
//
use crate::error::TapeError;
use crate::operation::{CallArg, CallFn, OpKind};
use crate::tape::Tape;
use crate::variable::Variable;
//
// rebind
/// Rewrite every variable reference in `tape`'s operations `from ..= to`
/// (1-indexed, inclusive) according to `substitution`, then `tape.result`,
/// then invoke `tape.c.rebind_context` (spec §4.5).
///
/// Per operation class:
/// * Input, Constant : no-op.
/// * Call : `fn` and every variable-valued `args[i]` are rewritten.
/// * Loop : `parent_inputs` are rewritten (they live in *this* tape); the
///   sub-tape itself is left untouched -- "the baseline pass does not
///   descend into sub-tapes automatically" (spec §4.5). Primitivization
///   never touches Loops (spec §4.6), so this is never a gap in practice.
pub fn rebind(
    tape         : &mut Tape,
    substitution : &HashMap<usize, usize>,
    from         : usize,
    to           : usize,
) -> Result<(), TapeError> {
    if ! substitution.is_empty() {
        for id in from ..= to {
            let cell = match tape.cell_at(id) {
                Ok(cell) => cell.clone(),
                Err(_)   => continue,
            };
            let mut op = cell.borrow_mut();
            match &mut op.kind {
                OpKind::Input | OpKind::Constant => {}
                OpKind::Call { func, args, .. } => {
                    if let CallFn::Var(v) = func {
                        rebind_variable(v, substitution, tape)?;
                    }
                    for a in args.iter_mut() {
                        if let CallArg::Var(v) = a {
                            rebind_variable(v, substitution, tape)?;
                        }
                    }
                }
                OpKind::Loop(l) => {
                    for v in l.parent_inputs.iter_mut() {
                        rebind_variable(v, substitution, tape)?;
                    }
                }
            }
        }
    }
    //
    // tape.result
    if let Some(result) = tape.result().cloned() {
        let mut result = result;
        rebind_variable(&mut result, substitution, tape)?;
        tape.set_result(result);
    }
    //
    // rebind_context hook (spec §4.5, §9)
    tape.c.rebind_context(substitution);
    Ok(())
}
//
// rebind_variable
/// Rewrite a single variable reference per spec §4.5:
/// * unbound and its id is in `substitution` -> replace the id.
/// * bound and the substitution contains its *current* id -> re-point
///   it at `tape[new_id]`, converting the effect into a new binding.
fn rebind_variable(
    v            : &mut Variable,
    substitution : &HashMap<usize, usize>,
    tape         : &Tape,
) -> Result<(), TapeError> {
    match v {
        Variable::Unbound(id) => {
            if let Some(&new_id) = substitution.get(id) {
                *id = new_id;
            }
        }
        Variable::Bound(cell) => {
            let current_id = cell.borrow().id;
            if let Some(&new_id) = substitution.get(&current_id) {
                *v = Variable::bound( tape.cell_at(new_id)?.clone() );
            }
        }
    }
    Ok(())
}
//
#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{CallArg, CallFn, Operation};
    use crate::value::{FnCallable, Slot, Value};
    //
    fn add_fn() -> CallFn {
        CallFn::Fn( std::rc::Rc::new( FnCallable::new( "+", |args : &[Value]| {
            let a = *args[0].downcast_ref::<f64>().unwrap();
            let b = *args[1].downcast_ref::<f64>().unwrap();
            Value::new(a + b)
        } ) ) )
    }
    //
    fn two_input_tape() -> (Tape, Variable, Variable) {
        let mut tape = Tape::new();
        let v1 = tape.push( Operation::input_with( Value::new(1.0_f64) ) );
        let v2 = tape.push( Operation::input_with( Value::new(2.0_f64) ) );
        let call = Operation::call(
            add_fn(), vec![ CallArg::Var( v1.clone() ) ], Slot::Unknown,
        );
        let v3 = tape.push(call);
        tape.set_result(v3);
        (tape, v1, v2)
    }
    //
    #[test]
    fn empty_substitution_is_a_fixpoint() {
        let (mut tape, v1, _v2) = two_input_tape();
        let before = tape.get( &Variable::unbound(3) ).unwrap().as_call().unwrap().1[0]
            .as_var().unwrap().id();
        rebind( &mut tape, &HashMap::new(), 1, tape.len() ).unwrap();
        let after = tape.get( &Variable::unbound(3) ).unwrap().as_call().unwrap().1[0]
            .as_var().unwrap().id();
        assert_eq!( before, after );
        assert_eq!( before, v1.id() );
    }
    //
    #[test]
    fn sequential_rebinds_compose_over_disjoint_supports() {
        // Two tapes built identically; one gets two sequential rebinds
        // with disjoint supports, the other gets their union in one call.
        let mut sequential = two_input_tape().0;
        let mut composed    = two_input_tape().0;
        //
        let a = HashMap::from( [ (1usize, 2usize) ] );
        let b = HashMap::from( [ (4usize, 5usize) ] );
        //
        rebind( &mut sequential, &a, 1, sequential.len() ).unwrap();
        rebind( &mut sequential, &b, 1, sequential.len() ).unwrap();
        //
        let mut union = a.clone();
        union.extend(b);
        rebind( &mut composed, &union, 1, composed.len() ).unwrap();
        //
        let seq_arg = sequential.get( &Variable::unbound(3) ).unwrap()
            .as_call().unwrap().1[0].as_var().unwrap().id();
        let comp_arg = composed.get( &Variable::unbound(3) ).unwrap()
            .as_call().unwrap().1[0].as_var().unwrap().id();
        assert_eq!( seq_arg, comp_arg );
    }
}
