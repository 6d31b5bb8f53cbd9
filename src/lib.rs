#![cfg_attr(not(doc), no_std)]
#![deny(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    clippy::as_ptr_cast_mut,
    clippy::ptr_as_ptr,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Two-word, allocation-free references to functions, methods and closures.
//!
//! ## Overview
//!
//! This crate provides [`FnRef`], a non-owning callable reference that fits
//! in exactly two machine words and never allocates. It fills the role a
//! borrowed `&dyn Fn(..)` or a boxed closure usually plays, but with value
//! semantics: an [`FnRef`] is `Copy`, comparable, storable in arrays and
//! registries, and safe to call even when empty. It is written for
//! `#![no_std]` targets first, embedded callback tables in particular, and
//! works identically everywhere else.
//!
//! A reference can point at:
//!
//! - a free function or non-capturing closure known at compile time
//!   ([`FnRef::make_fn`]),
//! - a function pointer supplied at runtime ([`FnRef::make_fn_ptr`]),
//! - a method paired with a receiver ([`FnRef::make_method`]),
//! - a functor or capturing closure borrowed from the caller
//!   ([`FnRef::make_closure`]),
//! - or nothing at all: the null reference ([`FnRef::new`]) is safe to call
//!   and returns `Ret::default()`.
//!
//! [`MethodRef`] and [`MethodRefMut`] complement it by storing a method
//! *without* its receiver, to be supplied at each call or attached later
//! with [`FnRef::make_bound`].
//!
//! ## Quick Example
//!
//! ```
//! use fnref::FnRef;
//!
//! struct Button<'a> {
//!     on_press: FnRef<'a, (u8,)>,
//! }
//!
//! fn beep(_presses: u8) {}
//!
//! let mut button = Button {
//!     on_press: FnRef::new(),
//! };
//! button.on_press.call(1); // null: does nothing
//!
//! button.on_press = FnRef::make_fn(beep);
//! button.on_press.call(2);
//!
//! let presses = core::cell::Cell::new(0u8);
//! let count = |n: u8| presses.set(presses.get() + n);
//! button.on_press = FnRef::make_closure(&count);
//! button.on_press.call(3);
//! assert_eq!(presses.get(), 3);
//! ```
//!
//! ## Representation
//!
//! Every reference is the same two words: a **thunk** address ("where to
//! jump") and an opaque **data** word ("what data to pass"). Binding a
//! target monomorphizes a thunk that knows the target's type and how to
//! interpret the data word; calling is one indirect call through the thunk,
//! with no heap, no vtable and no branch on the binding kind. The null state
//! is an ordinary thunk that returns `Ret::default()`, which is why calling
//! it needs no check.
//!
//! Argument lists are carried as tuples (`Args = (u8, u16)` for a two-
//! argument callable) so the core stays arity-generic; sugar for unpacked
//! arguments and function-pointer binders is provided for up to eight
//! arguments.
//!
//! ## Choosing a binder
//!
//! | Target | Binder | Borrows | Stored in data word |
//! |---|---|---|---|
//! | function, non-capturing closure | [`FnRef::make_fn`] | nothing | nothing |
//! | function pointer (runtime value) | [`FnRef::make_fn_ptr`] | nothing | the pointer |
//! | method + `&T` receiver | [`FnRef::make_method`] | receiver | receiver address |
//! | functor / capturing closure | [`FnRef::make_closure`] | closure | closure address |
//! | method + `&mut T` receiver | [`FnRef::make_method_mut`] (`unsafe`) | receiver | receiver address |
//! | mutating functor / closure | [`FnRef::make_closure_mut`] (`unsafe`) | closure | closure address |
//!
//! The `_mut` binders are `unsafe` because an [`FnRef`] is `Copy` and called
//! through `&self`: the borrow checker cannot rule out two overlapping calls
//! re-creating the same `&mut`. Prefer interior mutability
//! ([`core::cell::Cell`], [`core::cell::RefCell`]) with the safe binders;
//! reach for the `_mut` binders only when the no-overlap guarantee is
//! structural, as in a single-threaded interrupt-free dispatch loop.
//!
//! ## Identity, equality and ordering
//!
//! Two references are `==` exactly when they dispatch to the same target:
//! same binding kind, and same function, method-receiver pair or closure
//! address. Equality never inspects behavior. [`FnRef`] deliberately has no
//! `Ord`; wrap it in [`ByAddress`] to key ordered or hashed containers by
//! the arbitrary-but-stable representation order, and compare [`Null`]
//! against a reference to test for the null state literally.
//!
//! For implementation details, see the [`fnref-internals`] crate.
//!
//! [`fnref-internals`]: https://docs.rs/fnref-internals/latest/fnref_internals/

mod arity;
mod cmp;
mod fn_ref;
mod method_ref;

pub use fnref_internals::{
    OpaqueCell, Thunk,
    callable::{Callable, CallableMut, Method, MethodMut},
};

pub use crate::{
    cmp::ByAddress,
    fn_ref::{FnRef, Null},
    method_ref::{MethodRef, MethodRefMut},
};
