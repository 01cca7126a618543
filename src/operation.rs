// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025 Bradley M. Bell
// ---------------------------------------------------------------------------
//
//! [Operation] : the recorded units a [crate::tape::Tape] holds
//! (Input, Constant, Call, Loop).
//!
//! Link to [parent module](super)
// ---------------------------------------------------------------------------
//
use crate::tape::Tape;
use crate::types::Type;
use crate::value::{FnRef, Slot, Value};
use crate::variable::Variable;
//
// CallArg
/// One argument of a Call: either a reference into the tape, or a
/// literal value baked in at construction time.
#[derive(Clone)]
pub enum CallArg {
    Var(Variable),
    Lit(Value),
}
//
impl CallArg {
    pub fn as_var(&self) -> Option<&Variable> {
        match self {
            CallArg::Var(v) => Some(v),
            CallArg::Lit(_) => None,
        }
    }
    pub fn as_var_mut(&mut self) -> Option<&mut Variable> {
        match self {
            CallArg::Var(v) => Some(v),
            CallArg::Lit(_) => None,
        }
    }
}
//
impl From<Value> for CallArg {
    fn from(v : Value) -> Self { CallArg::Lit(v) }
}
impl From<Variable> for CallArg {
    fn from(v : Variable) -> Self { CallArg::Var(v) }
}
//
// CallFn
/// The callee of a Call: either a plain callable, or a variable whose
/// bound operation evaluates to one.
#[derive(Clone)]
pub enum CallFn {
    Fn(FnRef),
    Var(Variable),
}
//
// LoopOp
/// The sub-IR owned by a Loop operation.
pub struct LoopOp {
    //
    // LoopOp::parent_inputs
    /// Variables in the *enclosing* tape feeding the loop's sub-tape.
    pub parent_inputs : Vec<Variable>,
    //
    // LoopOp::condition
    /// Variable inside the sub-tape whose boolean value controls
    /// whether the loop continues.
    pub condition      : Variable,
    //
    // LoopOp::cont_vars
    /// Sub-tape variables supplying the next iteration's inputs.
    pub cont_vars      : Vec<Variable>,
    //
    // LoopOp::exit_vars
    /// Sub-tape variables whose values are returned, as a tuple, on exit.
    pub exit_vars      : Vec<Variable>,
    //
    // LoopOp::subtape
    /// The loop body, traced once: every run executes at least one full
    /// pass before the condition is first checked.
    pub subtape        : Tape,
}
//
// OpKind
/// The tagged payload distinguishing the four operation variants.
pub enum OpKind {
    //
    // OpKind::Input
    /// A tape argument slot; `val` is supplied externally before
    /// execution.
    Input,
    //
    // OpKind::Constant
    /// A compile-time value fixed at construction.
    Constant,
    //
    // OpKind::Call
    /// A function application.
    Call {
        func       : CallFn,
        args       : Vec<CallArg>,
        //
        // is_branch
        /// Set by the tracer when this call's boolean result steered a
        /// Loop's condition elsewhere on the same tape; consulted when
        /// branch assertions are enabled.
        is_branch  : bool,
    },
    //
    // OpKind::Loop
    /// A structured loop.
    Loop(LoopOp),
}
//
// Operation
/// One node in a [Tape].
///
/// `tape_id` is a lightweight, non-owning back-reference: it names the
/// tape this operation was adopted into (see [Tape::tape_id]), used only
/// to assert that a variable is being used against the tape it was
/// produced for. It deliberately is not a pointer/`Rc` back into the
/// tape itself, so operations never form a reference cycle with their
/// owning tape.
pub struct Operation {
    pub id       : usize,
    pub tape_id  : Option<u64>,
    pub val      : Slot,
    pub typ      : Option<Type>,
    pub kind     : OpKind,
}
//
impl Operation {
    //
    // Operation::input
    pub fn input() -> Self {
        Self { id : 0, tape_id : None, val : Slot::Unknown, typ : None, kind : OpKind::Input }
    }
    //
    // Operation::input_with
    pub fn input_with(val : Value) -> Self {
        let typ = Some( val.type_tag() );
        Self { id : 0, tape_id : None, val : Slot::Known(val), typ, kind : OpKind::Input }
    }
    //
    // Operation::constant
    pub fn constant(val : Value) -> Self {
        let typ = Some( val.type_tag() );
        Self { id : 0, tape_id : None, val : Slot::Known(val), typ, kind : OpKind::Constant }
    }
    //
    // Operation::call
    pub fn call(func : CallFn, args : Vec<CallArg>, val : Slot) -> Self {
        let typ = match &val {
            Slot::Known(v) => Some( v.type_tag() ),
            Slot::Unknown  => None,
        };
        Self {
            id : 0, tape_id : None, val, typ,
            kind : OpKind::Call { func, args, is_branch : false },
        }
    }
    //
    // Operation::loop_op
    pub fn loop_op(loop_op : LoopOp) -> Self {
        Self { id : 0, tape_id : None, val : Slot::Unknown, typ : None, kind : OpKind::Loop(loop_op) }
    }
    //
    // Operation::is_primitive_kind
    pub fn is_call(&self) -> bool {
        matches!( self.kind, OpKind::Call { .. } )
    }
    //
    // Operation::as_call
    pub fn as_call(&self) -> Option<(&CallFn, &[CallArg], bool)> {
        match &self.kind {
            OpKind::Call { func, args, is_branch } => Some( (func, args.as_slice(), *is_branch) ),
            _ => None,
        }
    }
    //
    // Operation::as_call_mut
    pub fn as_call_mut(&mut self) -> Option<(&mut CallFn, &mut Vec<CallArg>)> {
        match &mut self.kind {
            OpKind::Call { func, args, .. } => Some( (func, args) ),
            _ => None,
        }
    }
    //
    // Operation::as_loop
    pub fn as_loop(&self) -> Option<&LoopOp> {
        match &self.kind {
            OpKind::Loop(l) => Some(l),
            _ => None,
        }
    }
    //
    // Operation::as_loop_mut
    pub fn as_loop_mut(&mut self) -> Option<&mut LoopOp> {
        match &mut self.kind {
            OpKind::Loop(l) => Some(l),
            _ => None,
        }
    }
    //
    // Operation::mark_branch
    /// Flag a Call as a branch condition for `should_assert_branches!`.
    pub fn mark_branch(&mut self) {
        if let OpKind::Call { is_branch, .. } = &mut self.kind {
            *is_branch = true;
        }
    }
}
