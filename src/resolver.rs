// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025 Bradley M. Bell
// ---------------------------------------------------------------------------
//
//! [FunctionResolver] : most-specific-first signature-to-value lookup
//! (spec §4.3). The baseline instantiation (`FunctionResolver<()>`) is
//! what [crate::primitivize::primitivize] consults to decide "is this
//! call primitive?"
//!
//! Link to [parent module](super)
// ---------------------------------------------------------------------------
//
use rustc_hash::FxHashMap;
//
use crate::types::{Signature, Type};
//
// FunctionResolver
/// Groups registered [Signature]s by their `function` type tag, kept
/// ordered most-specific-first within each group (spec §4.3).
pub struct FunctionResolver<V> {
    groups : FxHashMap<Type, Vec< (Signature, V) >>,
}
//
impl<V> FunctionResolver<V> {
    //
    // FunctionResolver::new
    pub fn new() -> Self {
        Self { groups : FxHashMap::default() }
    }
    //
    // FunctionResolver::len
    /// Total number of registered signatures across every function group.
    pub fn len(&self) -> usize {
        self.groups.values().map( Vec::len ).sum()
    }
    //
    // FunctionResolver::is_empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    //
    // FunctionResolver::set
    /// Insert `signature -> value`, or override the prior value if
    /// `signature` is already registered (spec §4.3 "a second set with
    /// the same signature replaces the prior entry; it must not create
    /// a duplicate"). Otherwise insert keeping the group ordered
    /// most-specific-first.
    pub fn set(&mut self, signature : Signature, value : V) {
        let group = self.groups.entry( signature.function ).or_default();
        if let Some(slot) = group.iter_mut().find( |(s, _)| *s == signature ) {
            slot.1 = value;
            return;
        }
        let pos = group.iter()
            .position( |(s, _)| signature.specificity() < s.specificity() )
            .unwrap_or( group.len() );
        group.insert( pos, (signature, value) );
    }
    //
    // FunctionResolver::get
    /// The value attached to the first registered signature, within
    /// `query.function`'s group, that `query` is a subtype of -- "this
    /// call matches that entry's argument shape" (spec §4.3). Absent
    /// function group or no matching entry both yield `None`.
    pub fn get(&self, query : &Signature) -> Option<&V> {
        let group = self.groups.get( &query.function )?;
        group.iter()
            .find( |(s, _)| query.is_subtype(s) )
            .map( |(_, v)| v )
    }
}
//
impl<V> Default for FunctionResolver<V> {
    fn default() -> Self {
        Self::new()
    }
}
//
#[cfg(test)]
mod tests {
    use super::*;
    //
    fn ty<T : 'static>() -> Type {
        Type::of::<T>()
    }
    //
    #[test]
    fn most_specific_wins() {
        let mut r : FunctionResolver<&'static str> = FunctionResolver::new();
        let f = ty::<fn()>();
        r.set( Signature::new( f, vec![ ty::<f64>() ] ), "exact" );
        r.set( Signature::new( f, vec![ Type::Any ] ), "wildcard" );
        let query = Signature::new( f, vec![ ty::<f64>() ] );
        assert_eq!( r.get(&query), Some(&"exact") );
    }
    //
    #[test]
    fn override_does_not_duplicate() {
        let mut r : FunctionResolver<i32> = FunctionResolver::new();
        let f   = ty::<fn()>();
        let sig = Signature::new( f, vec![ ty::<f64>() ] );
        r.set( sig.clone(), 1 );
        r.set( sig, 2 );
        assert_eq!( r.len(), 1 );
    }
    //
    #[test]
    fn absent_is_none() {
        let r : FunctionResolver<i32> = FunctionResolver::new();
        let query = Signature::new( ty::<fn()>(), vec![] );
        assert_eq!( r.get(&query), None );
    }
    //
    #[test]
    fn fixed_arity_beats_a_variadic_entry() {
        let mut r : FunctionResolver<&'static str> = FunctionResolver::new();
        let f = ty::<fn()>();
        r.set( Signature::with_variadic( f, vec![], Type::Any ), "variadic" );
        r.set( Signature::new( f, vec![ ty::<f64>(), ty::<f64>() ] ), "fixed" );
        let query = Signature::new( f, vec![ ty::<f64>(), ty::<f64>() ] );
        assert_eq!( r.get(&query), Some(&"fixed") );
        //
        // a query with a different fixed arity only matches the variadic entry
        let query3 = Signature::new( f, vec![ ty::<f64>(), ty::<f64>(), ty::<f64>() ] );
        assert_eq!( r.get(&query3), Some(&"variadic") );
    }
}
