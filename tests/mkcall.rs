// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025 Bradley M. Bell

use std::rc::Rc;

use tapeir::{mkcall, CallArg, CallFn, FnCallable, Operation, Slot, Tape, Value, Variable};

fn mul_callable() -> CallFn {
    CallFn::Fn( Rc::new( FnCallable::new( "*", |args : &[Value]| {
        let a = *args[0].downcast_ref::<f64>().unwrap();
        let b = *args[1].downcast_ref::<f64>().unwrap();
        Value::new(a * b)
    } ) ) )
}

#[test]
fn mkcall_evaluates_eagerly_when_all_args_are_known() {
    let mut tape = Tape::new();
    let _nothing = tape.push( Operation::input_with( Value::new(()) ) );
    let v2       = tape.push( Operation::input_with( Value::new(3.0_f64) ) );

    let call = mkcall(
        mul_callable(),
        vec![ CallArg::Lit( Value::new(2.0_f64) ), CallArg::Var(v2) ],
        Slot::Unknown,
    );
    assert_eq!( call.val.value().downcast_ref::<f64>().copied(), Some(6.0) );
}

#[test]
fn mkcall_with_unbound_arg_stays_unknown() {
    let call = mkcall(
        mul_callable(),
        vec![ CallArg::Lit( Value::new(2.0_f64) ), CallArg::Var( Variable::unbound(100) ) ],
        Slot::Unknown,
    );
    assert!( call.val.is_unknown() );
}

#[test]
fn mkcall_with_explicit_val_skips_evaluation() {
    let mut tape = Tape::new();
    let v2 = tape.push( Operation::input_with( Value::new(3.0_f64) ) );

    let call = mkcall(
        mul_callable(),
        vec![ CallArg::Lit( Value::new(2.0_f64) ), CallArg::Var(v2) ],
        Slot::Known( Value::new(10.0_f64) ),
    );
    assert_eq!( call.val.value().downcast_ref::<f64>().copied(), Some(10.0) );
}
