// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025 Bradley M. Bell
// ---------------------------------------------------------------------------
//
//! Type tags and call signatures used by [crate::resolver::FunctionResolver].
//!
//! Link to [parent module](super)
// ---------------------------------------------------------------------------
//
use std::any::{Any, TypeId};
use std::fmt;
//
// Type
/// A type tag: either the exact type of some Rust value, or the `Any`
/// wildcard that matches every type.
///
/// The wildcard is what lets a [crate::resolver::FunctionResolver] entry
/// say "matches any argument here" the way a dynamically typed host
/// language's unannotated parameter does.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    //
    // Type::Exact
    /// The exact Rust type of some value, named for display purposes.
    Exact(TypeId, &'static str),
    //
    // Type::Any
    /// Matches any type; least specific.
    Any,
}
//
impl Type {
    //
    // Type::of_any
    /// The [Type] of a live, type-erased value.
    pub fn of_any(value : &dyn Any) -> Self {
        Type::Exact( value.type_id(), std::any::type_name_of_val(value) )
    }
    //
    // Type::of_sized
    /// The [Type] of `T`, without needing a live instance.
    pub fn of_sized<T : 'static>(name : &'static str) -> Self {
        Type::Exact( TypeId::of::<T>(), name )
    }
    //
    // Type::of
    /// The [Type] of `T`, named from [std::any::type_name].
    pub fn of<T : 'static>() -> Self {
        Type::Exact( TypeId::of::<T>(), std::any::type_name::<T>() )
    }
    //
    // Type::is_subtype
    /// `self <: other` : every value matching `self` also matches `other`.
    pub fn is_subtype(&self, other : &Type) -> bool {
        match (self, other) {
            (_, Type::Any)                     => true,
            (Type::Any, Type::Exact(..))        => false,
            (Type::Exact(a, _), Type::Exact(b, _)) => a == b,
        }
    }
    //
    // Type::specificity
    /// Lower is more specific; used to order a [crate::resolver::FunctionResolver]
    /// group most-specific-first.
    fn specificity(&self) -> u8 {
        match self {
            Type::Exact(..) => 0,
            Type::Any       => 1,
        }
    }
}
//
impl fmt::Debug for Type {
    fn fmt(&self, f : &mut fmt::Formatter) -> fmt::Result {
        match self {
            Type::Exact(_, name) => write!( f, "{name}" ),
            Type::Any            => write!( f, "Any" ),
        }
    }
}
//
// Signature
/// A call signature: the function's own type, followed by the type of
/// each argument, with an optional variadic tail type that matches any
/// number of trailing arguments (spec §4.3).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    //
    // Signature::function
    /// Type tag of the callable being invoked.
    pub function  : Type,
    //
    // Signature::args
    /// Type tag of each fixed-position argument.
    pub args      : Vec<Type>,
    //
    // Signature::variadic
    /// If present, the type that matches every argument past `args.len()`.
    pub variadic  : Option<Type>,
}
//
impl Signature {
    //
    // Signature::new
    pub fn new(function : Type, args : Vec<Type>) -> Self {
        Self { function, args, variadic : None }
    }
    //
    // Signature::with_variadic
    pub fn with_variadic(function : Type, args : Vec<Type>, tail : Type) -> Self {
        Self { function, args, variadic : Some(tail) }
    }
    //
    // Signature::n_fixed
    pub fn n_fixed(&self) -> usize {
        self.args.len()
    }
    //
    // Signature::is_subtype
    /// `self <: other` : every call matching `self`'s argument shape also
    /// matches `other`'s (§4.3 "argument-tuple matching, with variadic
    /// tail if present").
    pub fn is_subtype(&self, other : &Signature) -> bool {
        if self.function != other.function {
            return false;
        }
        match &other.variadic {
            None => {
                if self.variadic.is_some() || self.args.len() != other.args.len() {
                    return false;
                }
                self.args.iter().zip( other.args.iter() )
                    .all( |(a, b)| a.is_subtype(b) )
            }
            Some(other_tail) => {
                if self.args.len() < other.args.len() {
                    return false;
                }
                let fixed_ok = self.args.iter().zip( other.args.iter() )
                    .all( |(a, b)| a.is_subtype(b) );
                if ! fixed_ok {
                    return false;
                }
                let self_tail : Vec<&Type> = match &self.variadic {
                    Some(t) => vec![t],
                    None    => self.args[ other.args.len() .. ].iter().collect(),
                };
                self_tail.iter().all( |a| a.is_subtype(other_tail) )
            }
        }
    }
    //
    // Signature::specificity
    /// Sort key used so a [crate::resolver::FunctionResolver] group is
    /// ordered most-specific-first: exact-typed args and the absence of
    /// a variadic tail both count as more specific.
    pub(crate) fn specificity(&self) -> (u8, Vec<u8>) {
        let tail_cost = if self.variadic.is_some() { 1u8 } else { 0u8 };
        let arg_cost  = self.args.iter().map( |t| t.specificity() ).collect();
        (tail_cost, arg_cost)
    }
}
