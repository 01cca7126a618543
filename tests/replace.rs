// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025 Bradley M. Bell

use std::collections::HashMap;
use std::rc::Rc;

use tapeir::{mkcall, CallArg, CallFn, FnCallable, Operation, Slot, Tape, Value, Variable};

fn add_callable() -> CallFn {
    CallFn::Fn( Rc::new( FnCallable::new( "+", |args : &[Value]| {
        let a = *args[0].downcast_ref::<f64>().unwrap();
        let b = *args[1].downcast_ref::<f64>().unwrap();
        Value::new(a + b)
    } ) ) )
}

fn mul_callable() -> CallFn {
    CallFn::Fn( Rc::new( FnCallable::new( "*", |args : &[Value]| {
        let a = *args[0].downcast_ref::<f64>().unwrap();
        let b = *args[1].downcast_ref::<f64>().unwrap();
        Value::new(a * b)
    } ) ) )
}

/// Builds `(nothing, 2.0, 5.0)` as Input ops at positions 1..3, then
/// `v4 = v2 * v3` at position 4.
fn build_tape() -> (Tape, Variable, Variable, Variable) {
    let mut tape = Tape::new();
    let _v1 = tape.push( Operation::input_with( Value::new(()) ) );
    let v2  = tape.push( Operation::input_with( Value::new(2.0_f64) ) );
    let v3  = tape.push( Operation::input_with( Value::new(5.0_f64) ) );
    let call = mkcall(
        mul_callable(),
        vec![ CallArg::Var( v2.clone() ), CallArg::Var( v3.clone() ) ],
        Slot::Unknown,
    );
    let v4 = tape.push(call);
    (tape, v2, v3, v4)
}

#[test]
fn insert_then_set_then_replace() {
    let (mut tape, v2, v3, v4) = build_tape();
    assert_eq!( tape.get(&v4).unwrap().val.value().downcast_ref::<f64>().copied(), Some(10.0) );

    // insert [v2+1, v3+1] ahead of v4, pushing v4 from position 4 to 6.
    let op1 = mkcall( add_callable(), vec![ CallArg::Var( v2.clone() ), CallArg::Lit( Value::new(1.0_f64) ) ], Slot::Unknown );
    let op2 = mkcall( add_callable(), vec![ CallArg::Var( v3.clone() ), CallArg::Lit( Value::new(1.0_f64) ) ], Slot::Unknown );
    let inserted = tape.insert(4, vec![op1, op2]).unwrap();
    let v_ins1 = inserted[0].clone();
    let v_ins2 = inserted[1].clone();
    assert_eq!( v_ins1.id(), 4 );
    assert_eq!( v_ins2.id(), 5 );
    assert_eq!( v4.id(), 6 );

    // tape[v4] = v_ins1 * v_ins2  ==  3.0 * 6.0
    let new_call = mkcall(
        mul_callable(),
        vec![ CallArg::Var( v_ins1.clone() ), CallArg::Var( v_ins2.clone() ) ],
        Slot::Unknown,
    );
    let v4 = tape.set(&v4, new_call).unwrap();
    assert_eq!( tape.get(&v4).unwrap().val.value().downcast_ref::<f64>().copied(), Some(18.0) );

    // replace position 4 (v_ins1) with two ops, rebinding its users to the
    // second -- every later reference to v_ins1 must now read through that
    // second op instead.
    let new_op_a = mkcall( mul_callable(), vec![ CallArg::Var( Variable::unbound(2) ), CallArg::Lit( Value::new(2.0_f64) ) ], Slot::Unknown );
    let new_op_b = mkcall( add_callable(), vec![ CallArg::Var( Variable::unbound(4) ), CallArg::Lit( Value::new(1.0_f64) ) ], Slot::Unknown );
    tape.replace(4, vec![new_op_a, new_op_b], 1, HashMap::new()).unwrap();

    // v4 (the multiply referencing v_ins1 and v_ins2) now sits one
    // position later, at 7, and its first argument must have followed
    // the redirect onto the replacement's second op.
    let v4_op = tape.get( &Variable::unbound(7) ).unwrap();
    let (_, args, _) = v4_op.as_call().unwrap();
    assert_eq!( args[0].as_var().unwrap().id(), 5 );

    for problem in tape.verify_invariants() {
        panic!("{problem}");
    }
}

/// `Tape::replace`'s own `old_new` parameter, exercised directly with a
/// redirection unrelated to the implicit `idx -> rebind_to` one: replacing
/// position 4 also redirects every tail reference to v3 (id 3) onto v2
/// (id 2), at the same time the tail's references to the replaced op (v4,
/// id 4) follow the usual `idx -> rebind_to` redirection.
#[test]
fn replace_applies_caller_supplied_old_new_alongside_idx_redirect() {
    let (mut tape, v2, v3, v4) = build_tape();
    assert_eq!( v2.id(), 2 );
    assert_eq!( v3.id(), 3 );
    assert_eq!( v4.id(), 4 );

    // v5 = v4 + v3, referencing both the op being replaced and the one
    // the caller wants redirected.
    let v5_call = mkcall( add_callable(), vec![ CallArg::Var( v4.clone() ), CallArg::Var( v3.clone() ) ], Slot::Unknown );
    let v5 = tape.push(v5_call);
    assert_eq!( v5.id(), 5 );

    // replace position 4 (v4 = v2*v3) with a single equivalent op, and
    // additionally redirect old id 3 (v3) onto id 2 (v2) throughout the
    // tail.
    let mut old_new = HashMap::new();
    old_new.insert( v3.id(), v2.id() );
    let new_head = mkcall( mul_callable(), vec![ CallArg::Var( v2.clone() ), CallArg::Var( v3.clone() ) ], Slot::Unknown );
    let rebind_var = tape.replace(4, vec![new_head], 0, old_new).unwrap();
    assert_eq!( rebind_var.id(), 4 );

    let v5_op = tape.get( &Variable::unbound(5) ).unwrap();
    let (_, args, _) = v5_op.as_call().unwrap();
    // first arg followed the implicit idx -> rebind_to redirection.
    assert_eq!( args[0].as_var().unwrap().id(), 4 );
    // second arg followed the caller-supplied old_new redirection.
    assert_eq!( args[1].as_var().unwrap().id(), 2 );

    for problem in tape.verify_invariants() {
        panic!("{problem}");
    }
}
