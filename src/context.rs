// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025 Bradley M. Bell
// ---------------------------------------------------------------------------
//
//! The tape's user-attached context payload and its rebind hook.
//!
//! Link to [parent module](super)
// ---------------------------------------------------------------------------
//
use rustc_hash::FxHashMap;
use std::collections::HashMap;
//
use crate::value::Value;
//
// Context
/// Opaque payload a [crate::tape::Tape] carries on behalf of its producer,
/// with a single extension point: [Context::rebind_context], invoked by
/// [crate::rebind::rebind] after it finishes rewriting a tape's operations.
/// The default implementation is a no-op. Applications provide their own
/// implementor when they need to keep externally held variables
/// consistent across a rebind, in place of a hard-wired global hook.
pub trait Context {
    //
    // Context::rebind_context
    /// Called once per [crate::rebind::rebind] invocation, after every
    /// operation and `tape.result` in range has been rewritten. Contexts
    /// that hold their own variables into the tape should use this to
    /// keep them consistent with the substitution just applied.
    fn rebind_context(&mut self, substitution : &HashMap<usize, usize>) {
        let _ = substitution;
    }
    //
    // Context::as_dict
    /// Downcast to [DictContext], when this is the default context.
    fn as_dict(&mut self) -> Option<&mut DictContext> {
        None
    }
    //
    // Context::clone_context
    /// Produce an independent copy of this context, for
    /// [crate::tape::Tape::deep_clone]. The default returns a fresh,
    /// empty [DictContext]; implementors with state worth preserving
    /// across a clone should override this.
    fn clone_context(&self) -> Box<dyn Context> {
        Box::new( DictContext::new() )
    }
    //
    // Context::context_type_name
    /// Name shown in a rendered tape's `Tape{<context-type>}` header.
    fn context_type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
//
// DictContext
/// The default context: a generic string-keyed dictionary of [Value]s.
#[derive(Default)]
pub struct DictContext {
    pub entries : FxHashMap<String, Value>,
}
//
impl DictContext {
    pub fn new() -> Self {
        Self { entries : FxHashMap::default() }
    }
}
//
impl Context for DictContext {
    fn as_dict(&mut self) -> Option<&mut DictContext> {
        Some(self)
    }
    fn clone_context(&self) -> Box<dyn Context> {
        Box::new( DictContext { entries : self.entries.clone() } )
    }
}
