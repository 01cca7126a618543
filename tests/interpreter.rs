// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025 Bradley M. Bell

use std::rc::Rc;

use tapeir::interpreter::{inputs, set_inputs};
use tapeir::{mkcall, play, CallArg, CallFn, FnCallable, MetaValue, Operation, Slot, Tape, TapeError, Value};

fn gt_callable() -> CallFn {
    CallFn::Fn( Rc::new( FnCallable::new( ">", |args : &[Value]| {
        let a = *args[0].downcast_ref::<f64>().unwrap();
        let b = *args[1].downcast_ref::<f64>().unwrap();
        Value::new(a > b)
    } ) ) )
}

#[test]
fn set_inputs_vararg_absorbs_the_tail() {
    let mut tape = Tape::new();
    let _fixed = tape.push( Operation::input_with( Value::new(1.0_f64) ) );
    let _tail  = tape.push( Operation::input_with( Value::new(Vec::<Value>::new()) ) );
    tape.meta.insert( "isva".to_string(), MetaValue::Bool(true) );

    set_inputs( &mut tape, &[ Value::new(9.0_f64), Value::new(1.0_f64), Value::new(2.0_f64), Value::new(3.0_f64) ] ).unwrap();

    let vars = inputs(&tape);
    assert_eq!( tape.get( &vars[0] ).unwrap().val.value().downcast_ref::<f64>().copied(), Some(9.0) );
    let tail = tape.get( &vars[1] ).unwrap().val.value().downcast_ref::<Vec<Value>>().unwrap().clone();
    assert_eq!( tail.len(), 3 );
    assert_eq!( tail[0].downcast_ref::<f64>().copied(), Some(1.0) );
}

#[test]
fn set_inputs_rejects_a_mismatched_count() {
    let mut tape = Tape::new();
    let _a = tape.push( Operation::input_with( Value::new(1.0_f64) ) );
    let _b = tape.push( Operation::input_with( Value::new(2.0_f64) ) );

    let err = set_inputs( &mut tape, &[ Value::new(1.0_f64) ] ).unwrap_err();
    assert_eq!( err, TapeError::ShapeMismatch { expected : 2, actual : 1 } );
}

/// Sets `should_assert_branches` for the duration of the test, restoring
/// the prior process-level default on drop -- the global toggle is a
/// deliberate compatibility shim (spec §7/§9 REDESIGN FLAG), so tests
/// that flip it must not leak the change to others.
struct AssertBranchesGuard(bool);
impl AssertBranchesGuard {
    fn enable() -> Self {
        let prior = tapeir::options::should_assert_branches(Some(true));
        Self(prior)
    }
}
impl Drop for AssertBranchesGuard {
    fn drop(&mut self) {
        tapeir::options::should_assert_branches(Some(self.0));
    }
}

#[test]
fn branch_violation_is_detected_on_replay() {
    let _guard = AssertBranchesGuard::enable();

    let mut tape = Tape::new();
    let n = tape.push( Operation::input() );
    let cond = mkcall( gt_callable(), vec![ CallArg::Var(n), CallArg::Lit( Value::new(0.0_f64) ) ], Slot::Unknown );
    let cond = tape.push(cond);
    tape.get_mut(&cond).unwrap().mark_branch();
    tape.set_result( cond.clone() );

    let out = play( &mut tape, &[ Value::new(5.0_f64) ], false ).unwrap();
    assert_eq!( out.downcast_ref::<bool>().copied(), Some(true) );

    let err = play( &mut tape, &[ Value::new(-5.0_f64) ], false ).unwrap_err();
    assert_eq!( err, TapeError::BranchViolation { op_id : cond.id() } );
}
