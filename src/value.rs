// SPDX-License-Identifier: EPL-2.0 OR GPL-2.0-or-later
// SPDX-FileCopyrightText: Bradley M. Bell <bradbell@seanet.com>
// SPDX-FileContributor: 2025 Bradley M. Bell
// ---------------------------------------------------------------------------
//
//! Dynamic value and callable objects used by the tape IR.
//!
//! The host language being traced is dynamically typed: a `val` field on
//! an operation, and the `fn` field of a [crate::operation::Operation::Call],
//! hold values whose concrete Rust type is not known to the tape itself.
//! [Value] and [Callable] are the opaque, type-erased stand-ins for those
//! slots; the tape never inspects their contents except through
//! [Value::downcast_ref] / [Callable::call] / [Value::type_tag].
//!
//! Link to [parent module](super)
// ---------------------------------------------------------------------------
//
use std::any::Any;
use std::fmt;
use std::rc::Rc;
//
use crate::types::Type;
//
// DynAny
/// Trait bound satisfied by every value that can be stored in a [Value].
pub trait DynAny: Any + fmt::Debug {
    //
    // clone_dyn
    /// Clone this value behind a fresh, type-erased allocation.
    fn clone_dyn(&self) -> Box<dyn DynAny>;
}
//
impl<T> DynAny for T
where
    T : Any + Clone + fmt::Debug,
{
    fn clone_dyn(&self) -> Box<dyn DynAny> {
        Box::new( self.clone() )
    }
}
//
// Value
/// A type-erased, reference-counted value.
///
/// `Value` is the Rust stand-in for the host language's `any`. It is
/// cheap to clone (an `Rc` bump) and supports downcasting back to a
/// concrete type when the caller knows, out of band, what that type is.
#[derive(Clone)]
pub struct Value( Rc<dyn DynAny> );
//
impl Value {
    //
    // Value::new
    /// Wrap a concrete value as a dynamic [Value].
    pub fn new<T : DynAny>(value : T) -> Self {
        Value( Rc::new(value) )
    }
    //
    // Value::downcast_ref
    /// Borrow the underlying value as `T`, or `None` if it is not a `T`.
    pub fn downcast_ref<T : 'static>(&self) -> Option<&T> {
        (self.0.as_ref() as &dyn Any).downcast_ref::<T>()
    }
    //
    // Value::type_tag
    /// The [Type] identifying this value's concrete underlying type.
    pub fn type_tag(&self) -> Type {
        Type::of_any( self.0.as_ref() )
    }
    //
    // Value::callable_type_tag
    /// The [Type] identifying the callable this value denotes: the
    /// wrapped [Callable]'s own type if this is a [CallableValue], else
    /// [Value::type_tag]. Used to build a [crate::types::Signature]'s
    /// `function` component when the callee was resolved from a
    /// variable rather than given directly.
    pub fn callable_type_tag(&self) -> Type {
        self.downcast_ref::<CallableValue>()
            .map( |cv| cv.0.type_tag() )
            .unwrap_or_else( || self.type_tag() )
    }
}
//
impl fmt::Debug for Value {
    fn fmt(&self, f : &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt( &self.0, f )
    }
}
//
impl fmt::Display for Value {
    fn fmt(&self, f : &mut fmt::Formatter) -> fmt::Result {
        write!( f, "{:?}", self.0 )
    }
}
//
impl PartialEq for Value {
    //
    /// Two values are equal iff they are the same allocation. This is a
    /// conservative relation (distinct-but-equal values compare unequal);
    /// it is only ever used to compare a cached `val` against itself.
    fn eq(&self, other : &Self) -> bool {
        Rc::ptr_eq( &self.0, &other.0 )
    }
}
//
// Slot
/// The value held by an operation: a concrete [Value], or the `UNKNOWN`
/// sentinel when no value is available yet.
#[derive(Clone, Debug, PartialEq)]
pub enum Slot {
    //
    // Slot::Unknown
    /// No value has been computed or supplied yet.
    Unknown,
    //
    // Slot::Known
    /// A concrete value is available.
    Known(Value),
}
//
impl Slot {
    //
    // Slot::is_unknown
    pub fn is_unknown(&self) -> bool {
        matches!( self, Slot::Unknown )
    }
    //
    // Slot::value
    /// Borrow the concrete value, panicking if this slot is `Unknown`.
    ///
    /// Use only where the caller has already checked [Slot::is_unknown];
    /// dereferencing an operation whose value has not been computed is a
    /// contract violation, not a recoverable error.
    pub fn value(&self) -> &Value {
        match self {
            Slot::Known(v) => v,
            Slot::Unknown  => panic!( "Slot::value: slot is Unknown" ),
        }
    }
    //
    // Slot::into_value
    pub fn into_value(self) -> Option<Value> {
        match self {
            Slot::Known(v) => Some(v),
            Slot::Unknown  => None,
        }
    }
}
//
impl From<Value> for Slot {
    fn from(value : Value) -> Self {
        Slot::Known(value)
    }
}
//
// Callable
/// A type-erased callable used as the `fn` field of a Call operation.
///
/// A closure or function pointer becomes a distinct Rust type per
/// call-site, so [Callable::type_tag] (derived from the concrete
/// implementor's `TypeId`) is a faithful stand-in for "this particular
/// function" the way the host language's function objects are.
pub trait Callable : fmt::Debug {
    //
    // Callable::call
    /// Apply this callable to already-resolved argument values.
    fn call(&self, args : &[Value]) -> Value;
    //
    // Callable::type_tag
    /// Identifies this callable's concrete type for signature matching.
    fn type_tag(&self) -> Type;
}
//
// FnCallable
/// Adapts a plain Rust closure/function pointer into a [Callable].
pub struct FnCallable<F> {
    name : &'static str,
    func : F,
}
//
impl<F> FnCallable<F>
where
    F : Fn(&[Value]) -> Value + 'static,
{
    pub fn new(name : &'static str, func : F) -> Self {
        Self { name, func }
    }
}
//
impl<F> fmt::Debug for FnCallable<F> {
    fn fmt(&self, f : &mut fmt::Formatter) -> fmt::Result {
        write!( f, "{}", self.name )
    }
}
//
impl<F> Callable for FnCallable<F>
where
    F : Fn(&[Value]) -> Value + 'static,
{
    fn call(&self, args : &[Value]) -> Value {
        (self.func)(args)
    }
    fn type_tag(&self) -> Type {
        Type::of_sized::<Self>( self.name )
    }
}
//
// FnRef
/// A reference-counted, type-erased [Callable], the concrete value
/// stored in a [crate::operation::Operation::Call]'s `fn` field when it
/// is not itself a [crate::variable::Variable].
pub type FnRef = Rc<dyn Callable>;
//
// CallableValue
/// Wraps a [FnRef] as a [Value], for the case where a Call's `fn` slot
/// is a [crate::variable::Variable] whose operation evaluates to a
/// callable: resolving that variable looks up its op's `val`, which
/// must downcast to one of these.
#[derive(Clone)]
pub struct CallableValue(pub FnRef);
//
impl fmt::Debug for CallableValue {
    fn fmt(&self, f : &mut fmt::Formatter) -> fmt::Result {
        write!( f, "{:?}", self.0.type_tag() )
    }
}
