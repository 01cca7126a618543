// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025 Bradley M. Bell

use std::rc::Rc;

use tapeir::{mkcall, CallArg, CallFn, FnCallable, Operation, Slot, Tape, Value};

fn add_callable() -> CallFn {
    CallFn::Fn( Rc::new( FnCallable::new( "+", |args : &[Value]| {
        let a = *args[0].downcast_ref::<f64>().unwrap();
        let b = *args[1].downcast_ref::<f64>().unwrap();
        Value::new(a + b)
    } ) ) )
}

/// Six ops: three Inputs, then `v4 = v2 + v3`, and two further calls
/// (`v5`, `v6`) that both read `v4`.
fn build_tape() -> Tape {
    let mut tape = Tape::new();
    let _v1 = tape.push( Operation::input_with( Value::new(()) ) );
    let v2  = tape.push( Operation::input_with( Value::new(1.0_f64) ) );
    let v3  = tape.push( Operation::input_with( Value::new(2.0_f64) ) );
    let v4  = tape.push( mkcall( add_callable(), vec![ CallArg::Var(v2), CallArg::Var(v3) ], Slot::Unknown ) );
    let v5  = tape.push( mkcall( add_callable(), vec![ CallArg::Var( v4.clone() ), CallArg::Lit( Value::new(10.0_f64) ) ], Slot::Unknown ) );
    let _v6 = tape.push( mkcall( add_callable(), vec![ CallArg::Var( v4.clone() ), CallArg::Lit( Value::new(20.0_f64) ) ], Slot::Unknown ) );
    tape.set_result(v5);
    tape
}

#[test]
fn deleteat_rebinds_downstream_references() {
    let mut tape = build_tape();
    assert_eq!( tape.len(), 6 );

    // delete v4 (position 4) redirecting its readers to v2 (position 1).
    // v5 and v6 (originally positions 5 and 6) shift down to 4 and 5.
    tape.deleteat(4, Some(1)).unwrap();
    assert_eq!( tape.len(), 5 );

    let op4 = tape.cell_at(4).unwrap().borrow();
    let (_, args4, _) = op4.as_call().unwrap();
    assert_eq!( args4[0].as_var().unwrap().id(), 1 );
    drop(op4);

    let op5 = tape.cell_at(5).unwrap().borrow();
    let (_, args5, _) = op5.as_call().unwrap();
    assert_eq!( args5[0].as_var().unwrap().id(), 1 );
    drop(op5);

    for problem in tape.verify_invariants() {
        panic!("{problem}");
    }
}

#[test]
fn deleteat_without_rebind_leaves_position_and_ids_consistent() {
    let mut tape = build_tape();
    tape.deleteat(2, None).unwrap();
    assert_eq!( tape.len(), 5 );
    for (index, cell) in tape.iter().enumerate() {
        assert_eq!( cell.borrow().id, index + 1 );
    }
}
