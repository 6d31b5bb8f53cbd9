#![no_std]
#![forbid(
    missing_docs,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::missing_docs_in_private_items,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
#![allow(rustdoc::private_intra_doc_links)]
//! Internal implementation crate for [`fnref`].
//!
//! # Overview
//!
//! This crate contains the low-level, type-erased storage and dispatch
//! machinery that powers the [`fnref`] callable-reference library. It provides
//! zero-cost type erasure through per-target thunk functions: for each way of
//! producing a call, monomorphization generates one concrete thunk with the
//! uniform signature [`Thunk<Args, Ret>`], so that a reference to any callable
//! fits in two machine words with no heap allocation and no trait-object
//! dispatch.
//!
//! **This crate is an implementation detail.** No semantic versioning
//! guarantees are provided. Users should depend on the [`fnref`] crate, not
//! this one.
//!
//! # Architecture
//!
//! - **[`cell`]**: [`OpaqueCell`], the single untyped data word paired with a
//!   thunk. It holds either nothing, the address of a referenced object, or
//!   the bit pattern of a runtime function pointer. Its interpretation is
//!   determined solely by the thunk it is paired with.
//! - **[`thunk`]**: the thunk functions themselves, one generic function per
//!   binding kind, instantiated per concrete target type.
//! - **[`raw`]**: [`RawFnRef`] and [`RawMethodRef`], the lifetime-erased
//!   value types pairing a thunk with (for [`RawFnRef`]) an [`OpaqueCell`].
//! - **[`callable`]**: the [`Callable`], [`CallableMut`], [`Method`] and
//!   [`MethodMut`] dispatch traits, blanket-implemented over the `Fn` traits
//!   for argument tuples. They keep everything above arity-generic.
//!
//! # Safety Strategy
//!
//! Erasing the target type means the thunk's type knowledge and the cell's
//! contents must never go out of sync. This crate maintains that through:
//!
//! - **Module-based encapsulation**: the cell's pointer word and the raw
//!   types' fields are module-private, so every way of pairing a thunk with a
//!   cell is visible in a single file.
//! - **Construction-time contracts**: constructors that erase a borrow are
//!   `unsafe` and state the liveness obligation once, covering every later
//!   call; calling itself stays safe and branch-free.
//! - **`const`-block assertions**: zero-size and word-size requirements on
//!   compile-time-bound callables and function pointers are checked during
//!   monomorphization, never at run time.
//!
//! [`fnref`]: https://docs.rs/fnref/latest/fnref/
//! [`OpaqueCell`]: cell::OpaqueCell
//! [`Thunk<Args, Ret>`]: thunk::Thunk
//! [`Callable`]: callable::Callable
//! [`CallableMut`]: callable::CallableMut
//! [`Method`]: callable::Method
//! [`MethodMut`]: callable::MethodMut

pub mod callable;
mod cell;
mod raw;
mod thunk;

pub use cell::OpaqueCell;
pub use raw::{RawFnRef, RawMethodRef};
pub use thunk::Thunk;
