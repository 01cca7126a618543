// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025 Bradley M. Bell
// ---------------------------------------------------------------------------
//
//! [Tape] : an ordered, addressable list of operations and the mutation
//! algebra that preserves referential integrity across rewrites
//! (spec §3, §4.4).
//!
//! Link to [parent module](super)
// ---------------------------------------------------------------------------
//
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Mutex;
//
use rustc_hash::FxHashMap;
//
use crate::context::{Context, DictContext};
use crate::error::TapeError;
use crate::operation::{CallArg, CallFn, LoopOp, OpKind, Operation};
use crate::variable::{OpCell, Variable};
//
// NEXT_TAPE_ID
/// A different tape_id is allocated for every [Tape] constructed; mirrors
/// `bradbell-rustad`'s own `static NEXT_TAPE_ID : Mutex<usize>`
/// (`src/tape.rs`), used there to distinguish recordings.
static NEXT_TAPE_ID : Mutex<u64> = Mutex::new(1);
//
fn next_tape_id() -> u64 {
    let mut guard = NEXT_TAPE_ID.lock().unwrap();
    let id = *guard;
    *guard += 1;
    id
}
//
// MetaValue
/// A value in [Tape::meta]. The `isva` key (spec §6, `inputs!`) is the
/// first concrete consumer, but application code may stash anything
/// else it needs alongside a tape here too.
#[derive(Clone, Debug, PartialEq)]
pub enum MetaValue {
    Bool(bool),
    Int(i64),
    Str(String),
}
//
impl MetaValue {
    pub fn as_bool(&self) -> bool {
        matches!( self, MetaValue::Bool(true) )
    }
}
//
// Tape
/// An ordered container of operations, owning their identity
/// (spec §3). Every mutation goes through `push`/`insert`/`set`/
/// `replace`/`deleteat`, which jointly maintain:
///
/// 1. `op.id == position` for every operation.
/// 2. every bound [Variable] referenced inside the tape still addresses
///    the operation it was bound to.
/// 3. `tape.result()` still addresses a real operation.
pub struct Tape {
    ops      : Vec<OpCell>,
    result   : Option<Variable>,
    //
    // parent
    /// Set when this tape is a Loop's sub-tape (spec §3).
    parent   : Option<u64>,
    //
    // meta
    /// Application-visible metadata dictionary (spec §3).
    pub meta : FxHashMap<String, MetaValue>,
    //
    // c
    /// Application-defined context object (spec §3).
    pub c    : Box<dyn Context>,
    //
    tape_id  : u64,
}
//
impl Tape {
    //
    // Tape::new
    /// Construct an empty tape with the default [DictContext].
    pub fn new() -> Self {
        Self::with_context( Box::new( DictContext::new() ) )
    }
    //
    // Tape::with_context
    /// Construct an empty tape with an application-supplied [Context].
    pub fn with_context(c : Box<dyn Context>) -> Self {
        Self {
            ops     : Vec::new(),
            result  : None,
            parent  : None,
            meta    : FxHashMap::default(),
            c,
            tape_id : next_tape_id(),
        }
    }
    //
    // Tape::sub_tape
    /// Construct an empty tape marked as the sub-tape of `parent_tape_id`.
    pub fn sub_tape(parent_tape_id : u64) -> Self {
        let mut tape = Self::new();
        tape.parent = Some(parent_tape_id);
        tape
    }
    //
    // Tape::tape_id
    pub fn tape_id(&self) -> u64 {
        self.tape_id
    }
    //
    // Tape::parent
    pub fn parent(&self) -> Option<u64> {
        self.parent
    }
    //
    // Tape::len
    pub fn len(&self) -> usize {
        self.ops.len()
    }
    //
    // Tape::is_empty
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
    //
    // Tape::result
    pub fn result(&self) -> Option<&Variable> {
        self.result.as_ref()
    }
    //
    // Tape::set_result
    pub fn set_result(&mut self, v : Variable) {
        self.result = Some(v);
    }
    //
    // Tape::cell_at
    /// The operation cell currently at position `id` (1-indexed).
    pub fn cell_at(&self, id : usize) -> Result<&OpCell, TapeError> {
        if id == 0 || id > self.ops.len() {
            return Err( TapeError::OutOfRange { id, len : self.ops.len() } );
        }
        Ok( &self.ops[id - 1] )
    }
    //
    // Tape::get
    /// Borrow the operation `v` addresses (§4.4's `tape[V]` read).
    pub fn get(&self, v : &Variable) -> Result<Ref<'_, Operation>, TapeError> {
        Ok( self.cell_at( v.id() )?.borrow() )
    }
    //
    // Tape::get_mut
    pub fn get_mut(&self, v : &Variable) -> Result<RefMut<'_, Operation>, TapeError> {
        Ok( self.cell_at( v.id() )?.borrow_mut() )
    }
    //
    // Tape::bound
    /// Promote `v` to a bound variable addressing whatever operation
    /// currently sits at `v.id()` (spec §6 `bound(tape, v)`).
    pub fn bound(&self, v : &Variable) -> Result<Variable, TapeError> {
        Ok( Variable::bound( self.cell_at( v.id() )?.clone() ) )
    }
    //
    // Tape::adopt
    /// Give `op` its permanent id and this tape's `tape_id`, allocate a
    /// stable cell for it, and append.
    fn adopt(&mut self, mut op : Operation, id : usize) -> OpCell {
        op.id      = id;
        op.tape_id = Some(self.tape_id);
        Rc::new( RefCell::new(op) )
    }
    //
    // Tape::renumber
    /// Restore `op.id == position` for every operation (called after
    /// every structural insert/delete).
    fn renumber(&mut self) {
        for (index, cell) in self.ops.iter().enumerate() {
            cell.borrow_mut().id = index + 1;
        }
    }
    //
    // Tape::push
    /// Append `op`, assigning it the next id (spec §4.4 `push`).
    pub fn push(&mut self, op : Operation) -> Variable {
        let id   = self.ops.len() + 1;
        let cell = self.adopt(op, id);
        self.ops.push( cell.clone() );
        Variable::bound(cell)
    }
    //
    // Tape::insert
    /// Insert `ops` at position `idx` (1-indexed; `idx == len()+1`
    /// appends), shifting every later operation right and renumbering
    /// everything so `op.id == position` again (spec §4.4 `insert`).
    pub fn insert(&mut self, idx : usize, ops : Vec<Operation>) -> Result<Vec<Variable>, TapeError> {
        if idx == 0 || idx > self.ops.len() + 1 {
            return Err( TapeError::OutOfRange { id : idx, len : self.ops.len() } );
        }
        let cells : Vec<OpCell> = ops.into_iter()
            .map( |op| Rc::new( RefCell::new(op) ) )
            .collect();
        let result = cells.iter().cloned().map( Variable::bound ).collect();
        let tail   = self.ops.split_off(idx - 1);
        self.ops.extend(cells);
        self.ops.extend(tail);
        for cell in self.ops.iter() {
            cell.borrow_mut().tape_id = Some(self.tape_id);
        }
        self.renumber();
        Ok(result)
    }
    //
    // Tape::set
    /// Write `new_op` at the position `v` addresses; `new_op.id` becomes
    /// that position, and the return value is `v` re-bound to address
    /// it -- the "setitem" primitive of spec §4.4 (`tape[v] = new_op`).
    pub fn set(&mut self, v : &Variable, mut new_op : Operation) -> Result<Variable, TapeError> {
        let id   = v.id();
        let cell = self.cell_at(id)?.clone();
        new_op.id      = id;
        new_op.tape_id = Some(self.tape_id);
        *cell.borrow_mut() = new_op;
        Ok( Variable::bound(cell) )
    }
    //
    // Tape::replace
    /// Replace the operation at `idx` with `new_ops`, then rebind every
    /// later reference in the tape (spec §4.4 `replace`): the implicit
    /// `idx -> new_ops[rebind_to].id` redirection, plus whatever
    /// additional `old_id -> new_id` redirections the caller supplies in
    /// `old_new`, are all applied in one pass over the tail of the tape
    /// (positions after the spliced block).
    ///
    /// [crate::primitivize::primitivize] does *not* thread its sub-tape's
    /// dropped-input redirections through this parameter: those
    /// redirections target references *inside* the spliced block itself
    /// (a body op's argument pointing at one of the sub-tape's own
    /// discarded Input ops), which sit before `from` and are therefore
    /// out of reach of the rebind pass below -- so it resolves them
    /// while building `new_ops`, before ever calling `replace`, and
    /// always passes an empty map here. `old_new` is for a caller that
    /// wants to redirect references to some *other*, already-existing
    /// tape position at the same time it replaces `idx` (see
    /// `tests/replace.rs`).
    pub fn replace(
        &mut self,
        idx        : usize,
        new_ops    : Vec<Operation>,
        rebind_to  : usize,
        old_new    : HashMap<usize, usize>,
    ) -> Result<Variable, TapeError> {
        if new_ops.is_empty() {
            return Err( TapeError::OutOfRange { id : idx, len : self.ops.len() } );
        }
        if rebind_to >= new_ops.len() {
            return Err( TapeError::OutOfRange { id : rebind_to, len : new_ops.len() } );
        }
        let mut new_ops = new_ops;
        let head        = new_ops.remove(0);
        let head_var     = self.set( &Variable::unbound(idx), head )?;
        let head_cell    = head_var.op().unwrap().clone();
        //
        let rest_cells : Vec<OpCell> = if new_ops.is_empty() {
            Vec::new()
        } else {
            self.insert(idx + 1, new_ops)?
                .into_iter()
                .map( |v| v.op().unwrap().clone() )
                .collect()
        };
        //
        let rebind_var = if rebind_to == 0 {
            Variable::bound(head_cell.clone())
        } else {
            Variable::bound( rest_cells[rebind_to - 1].clone() )
        };
        //
        let n_new = 1 + rest_cells.len();
        let mut substitution = old_new;
        substitution.insert( idx, rebind_var.id() );
        let from = idx + n_new;
        let to   = self.len();
        crate::rebind::rebind(self, &substitution, from, to)?;
        Ok(rebind_var)
    }
    //
    // Tape::deleteat
    /// Delete the operation at `idx`, optionally redirecting later
    /// references to it at `rebind_to`, and renumber (spec §4.4
    /// `deleteat`). Deleting an operation with downstream users without
    /// supplying `rebind_to` leaves a dangling reference -- the caller's
    /// contract to honor, per spec §7.
    pub fn deleteat(&mut self, idx : usize, rebind_to : Option<usize>) -> Result<(), TapeError> {
        if idx == 0 || idx > self.ops.len() {
            return Err( TapeError::OutOfRange { id : idx, len : self.ops.len() } );
        }
        self.ops.remove(idx - 1);
        if let Some(target) = rebind_to {
            let substitution = HashMap::from( [ (idx, target) ] );
            crate::rebind::rebind(self, &substitution, 1, self.ops.len())?;
        }
        self.renumber();
        Ok(())
    }
    //
    // Tape::iter
    /// Iterate operation cells in tape order.
    pub fn iter(&self) -> impl Iterator<Item = &OpCell> {
        self.ops.iter()
    }
    //
    // Tape::verify_invariants
    /// A non-panicking checker for the §8 invariants, usable in tests or
    /// as a debug-mode verifier after mutation-heavy passes (spec §7).
    pub fn verify_invariants(&self) -> Vec<TapeError> {
        let mut problems = Vec::new();
        for (index, cell) in self.ops.iter().enumerate() {
            let op = cell.borrow();
            if op.id != index + 1 {
                problems.push( TapeError::InvariantViolation( format!(
                    "operation at position {} has id {}", index + 1, op.id
                ) ) );
            }
            self.verify_op_refs(&op, &mut problems);
        }
        if let Some(result) = &self.result {
            if result.id() == 0 || result.id() > self.ops.len() {
                problems.push( TapeError::InvariantViolation( format!(
                    "tape.result addresses %{} which is out of range", result.id()
                ) ) );
            }
        } else if ! self.ops.is_empty() {
            problems.push( TapeError::InvariantViolation(
                "tape has operations but no result".to_string()
            ) );
        }
        problems
    }
    //
    fn verify_op_refs(&self, op : &Operation, problems : &mut Vec<TapeError>) {
        let check = |v : &Variable, problems : &mut Vec<TapeError>| {
            if v.id() == 0 || v.id() > self.ops.len() {
                problems.push( TapeError::InvariantViolation( format!(
                    "operation %{} references out-of-range %{}", op.id, v.id()
                ) ) );
            }
        };
        match &op.kind {
            OpKind::Input | OpKind::Constant => {}
            OpKind::Call { func, args, .. } => {
                if let CallFn::Var(v) = func {
                    check(v, problems);
                }
                for a in args {
                    if let CallArg::Var(v) = a {
                        check(v, problems);
                    }
                }
            }
            OpKind::Loop(l) => {
                for v in &l.parent_inputs {
                    check(v, problems);
                }
            }
        }
    }
    //
    // Tape::deep_clone
    /// A structural copy whose bound variables address *this copy's*
    /// operations, not the original's -- the spec §5 mechanism callers
    /// use to parallelize `play!`, since re-executing a tape mutates its
    /// `val` fields in place and is therefore a data race across
    /// concurrent calls on the same tape.
    pub fn deep_clone(&self) -> Tape {
        let new_cells : Vec<OpCell> = (0 .. self.ops.len())
            .map( |_| Rc::new( RefCell::new( Operation::input() ) ) )
            .collect();
        for (index, old_cell) in self.ops.iter().enumerate() {
            let old      = old_cell.borrow();
            let new_kind = match &old.kind {
                OpKind::Input    => OpKind::Input,
                OpKind::Constant => OpKind::Constant,
                OpKind::Call { func, args, is_branch } => OpKind::Call {
                    func : match func {
                        CallFn::Fn(f)  => CallFn::Fn( f.clone() ),
                        CallFn::Var(v) => CallFn::Var( remap(v, &new_cells) ),
                    },
                    args : args.iter().map( |a| match a {
                        CallArg::Lit(v) => CallArg::Lit( v.clone() ),
                        CallArg::Var(v) => CallArg::Var( remap(v, &new_cells) ),
                    } ).collect(),
                    is_branch : *is_branch,
                },
                OpKind::Loop(l) => {
                    let subtape = l.subtape.deep_clone();
                    OpKind::Loop( LoopOp {
                        parent_inputs : l.parent_inputs.iter()
                            .map( |v| remap(v, &new_cells) ).collect(),
                        condition : remap_in( &l.condition, &subtape ),
                        cont_vars : l.cont_vars.iter()
                            .map( |v| remap_in(v, &subtape) ).collect(),
                        exit_vars : l.exit_vars.iter()
                            .map( |v| remap_in(v, &subtape) ).collect(),
                        subtape,
                    } )
                }
            };
            *new_cells[index].borrow_mut() = Operation {
                id      : old.id,
                tape_id : old.tape_id,
                val     : old.val.clone(),
                typ     : old.typ,
                kind    : new_kind,
            };
        }
        Tape {
            ops     : new_cells.clone(),
            result  : self.result.as_ref().map( |v| remap(v, &new_cells) ),
            parent  : self.parent,
            meta    : self.meta.clone(),
            c       : self.c.clone_context(),
            tape_id : next_tape_id(),
        }
    }
}
//
impl Default for Tape {
    fn default() -> Self {
        Self::new()
    }
}
//
// remap
/// Rebind `v` (addressing a position in the *original* tape) against the
/// corresponding cell in `new_cells`, leaving unbound variables as-is
/// (their numeric id is already correct: positions are preserved 1:1).
fn remap(v : &Variable, new_cells : &[OpCell]) -> Variable {
    match v {
        Variable::Unbound(id) => Variable::Unbound(*id),
        Variable::Bound(cell) => {
            let id = cell.borrow().id;
            Variable::Bound( new_cells[id - 1].clone() )
        }
    }
}
//
// remap_in
/// As [remap], but resolves against an already-built [Tape] (used for a
/// Loop's sub-tape variables, which address cells of the *sub*-tape).
fn remap_in(v : &Variable, tape : &Tape) -> Variable {
    match v {
        Variable::Unbound(id) => Variable::Unbound(*id),
        Variable::Bound(cell) => {
            let id = cell.borrow().id;
            Variable::bound( tape.cell_at(id).expect("deep_clone: id in range").clone() )
        }
    }
}
