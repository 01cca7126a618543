// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025 Bradley M. Bell
// ---------------------------------------------------------------------------
//
//! Textual rendering of a tape, used by tests and the `debug` trace of
//! [crate::interpreter::play] (spec §6). There is no wire protocol and
//! no file format here, only a human-readable form.
//!
//! Link to [parent module](super)
// ---------------------------------------------------------------------------
//
use std::fmt::Write as _;
//
use crate::operation::{CallArg, CallFn, Operation, OpKind};
use crate::tape::Tape;
//
// format_tape
/// Render a whole tape: a `Tape{<context-type>}` header followed by one
/// line per operation, in position order (spec §6).
pub fn format_tape(tape : &Tape) -> String {
    let mut out = format!( "Tape{{{}}}\n", tape.c.context_type_name() );
    for cell in tape.iter() {
        let _ = writeln!( out, "  {}", format_op( &cell.borrow() ) );
    }
    out
}
//
// format_op
/// Render a single operation as spec §6 describes:
/// * `inp %<id>::<type>`
/// * `const %<id> = <val>::<type>`
/// * `%<id> = <fn>(<arg0>, <arg1>, …)::<type>`
/// * `%<id> = Loop(<parent_inputs…>)`
pub fn format_op(op : &Operation) -> String {
    let ty = match &op.typ {
        Some(t) => format!( "{t:?}" ),
        None    => "?".to_string(),
    };
    match &op.kind {
        OpKind::Input => format!( "inp %{}::{ty}", op.id ),
        OpKind::Constant => format!(
            "const %{} = {}::{ty}", op.id, op.val.value()
        ),
        OpKind::Call { func, args, .. } => {
            let fn_name = format_call_fn(func);
            let arg_list = args.iter().map(format_call_arg).collect::<Vec<_>>().join(", ");
            format!( "%{} = {fn_name}({arg_list})::{ty}", op.id )
        }
        OpKind::Loop(l) => {
            let parents = l.parent_inputs.iter()
                .map( |v| format!( "%{}", v.id() ) )
                .collect::<Vec<_>>()
                .join(", ");
            format!( "%{} = Loop({parents})", op.id )
        }
    }
}
//
fn format_call_fn(func : &CallFn) -> String {
    match func {
        CallFn::Fn(f)  => format!( "{f:?}" ),
        CallFn::Var(v) => format!( "%{}", v.id() ),
    }
}
//
fn format_call_arg(arg : &CallArg) -> String {
    match arg {
        CallArg::Var(v) => format!( "%{}", v.id() ),
        CallArg::Lit(v) => format!( "{v}" ),
    }
}
