// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025 Bradley M. Bell
// ---------------------------------------------------------------------------
//
//! [Variable] : a reference into a tape, positional or identity-bound.
//!
//! Link to [parent module](super)
// ---------------------------------------------------------------------------
//
use std::cell::RefCell;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
//
use crate::operation::Operation;
//
// OpCell
/// The shared, stable allocation an [Operation] lives behind once it has
/// been adopted by a [crate::tape::Tape]. A bound [Variable] holds one of
/// these, so its identity survives renumbering (spec §3).
pub type OpCell = Rc<RefCell<Operation>>;
//
// Variable
/// A handle on an operation (spec §3, §4.1).
///
/// * `Unbound` : holds a plain index. Its meaning is "whatever operation
///   is at this position now" -- used as an index into a tape.
/// * `Bound` : holds the operation's own allocation. Its `id()` always
///   reads through to the operation's current id, so it survives
///   renumbering caused by [crate::tape::Tape::insert] /
///   [crate::tape::Tape::deleteat].
#[derive(Clone)]
pub enum Variable {
    Unbound(usize),
    Bound(OpCell),
}
//
impl Variable {
    //
    // Variable::unbound
    /// Construct a positional reference to tape position `id` (1-indexed).
    pub fn unbound(id : usize) -> Self {
        Variable::Unbound(id)
    }
    //
    // Variable::bound
    /// Construct an identity-preserving reference to `op`.
    pub fn bound(op : OpCell) -> Self {
        Variable::Bound(op)
    }
    //
    // Variable::id
    /// The current tape position this variable addresses.
    pub fn id(&self) -> usize {
        match self {
            Variable::Unbound(id) => *id,
            Variable::Bound(op)   => op.borrow().id,
        }
    }
    //
    // Variable::set_id
    /// Write through to the bound operation's id, or update the stored
    /// position if this variable is unbound.
    pub fn set_id(&mut self, id : usize) {
        match self {
            Variable::Unbound(stored) => *stored = id,
            Variable::Bound(op)       => op.borrow_mut().id = id,
        }
    }
    //
    // Variable::is_bound
    pub fn is_bound(&self) -> bool {
        matches!( self, Variable::Bound(_) )
    }
    //
    // Variable::op
    /// The bound operation cell, if this variable is bound.
    pub fn op(&self) -> Option<&OpCell> {
        match self {
            Variable::Bound(op) => Some(op),
            Variable::Unbound(_) => None,
        }
    }
}
//
/// Equality per spec §3: either both bound to the same operation
/// instance, or both unbound with equal ids.
impl PartialEq for Variable {
    fn eq(&self, other : &Self) -> bool {
        match (self, other) {
            (Variable::Bound(a), Variable::Bound(b))     => Rc::ptr_eq(a, b),
            (Variable::Unbound(a), Variable::Unbound(b)) => a == b,
            _                                             => false,
        }
    }
}
impl Eq for Variable {}
//
/// Hashing is consistent with equality by hashing a bound variable off
/// the stable *address* of its operation cell rather than its (mutable)
/// id -- this is the identity-based resolution of the open question in
/// spec §9/§3, chosen over the original's cached-first-id approach so
/// that a bound variable's hash never goes stale across renumbering.
impl Hash for Variable {
    fn hash<H : Hasher>(&self, state : &mut H) {
        match self {
            Variable::Bound(op) => {
                0u8.hash(state);
                ( Rc::as_ptr(op) as usize ).hash(state);
            }
            Variable::Unbound(id) => {
                1u8.hash(state);
                id.hash(state);
            }
        }
    }
}
//
impl std::fmt::Debug for Variable {
    fn fmt(&self, f : &mut std::fmt::Formatter) -> std::fmt::Result {
        write!( f, "%{}", self.id() )
    }
}
