//! Type-erased reference value types.
//!
//! This module encapsulates the fields of [`RawFnRef`] and [`RawMethodRef`],
//! ensuring a thunk can only ever be paired with a cell through the
//! constructors in this file. This visibility restriction guarantees the
//! safety invariant: **the cell's populated form always matches what the
//! stored thunk expects**.
//!
//! # Safety Invariant
//!
//! Constructors that erase a borrow (`of_method`, `of_closure` and their
//! `_mut` variants) are `unsafe` and place the liveness obligation on the
//! caller *once, at construction time*, covering every call made later
//! through the value or any bit-copy of it. After that, calling is safe:
//! there is no state the wrapper could corrupt, and the null thunk makes the
//! null state safe to call unconditionally.

use core::{fmt, ptr::fn_addr_eq};

use crate::{
    callable::{Callable, CallableMut, Method, MethodMut},
    cell::OpaqueCell,
    thunk::{self, Thunk},
};

/// The lifetime-erased core of a callable reference: one thunk address and
/// one opaque data word, exactly two machine words in total.
///
/// This type does not track the liveness of whatever the cell points at;
/// that obligation is taken by whoever runs an `unsafe` constructor. The
/// public `fnref` crate re-attaches a lifetime to make the obligation a
/// borrow-checker fact.
#[repr(C)]
pub struct RawFnRef<Args, Ret> {
    /// Where to jump: the thunk this value dispatches through.
    ///
    /// # Safety
    ///
    /// Always paired with a `cell` populated in the form this thunk expects;
    /// upheld because both fields are only ever written together by the
    /// constructors below.
    thunk: Thunk<Args, Ret>,
    /// What data to pass: interpreted only by `thunk`.
    cell: OpaqueCell,
}

impl<Args, Ret> Clone for RawFnRef<Args, Ret> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<Args, Ret> Copy for RawFnRef<Args, Ret> {}

impl<Args, Ret> RawFnRef<Args, Ret> {
    /// Creates the null reference: the null thunk paired with a zeroed cell.
    ///
    /// Calling it returns `Ret::default()` and does nothing else.
    #[inline]
    pub const fn null() -> Self
    where
        Ret: Default,
    {
        Self {
            thunk: thunk::null::<Args, Ret>,
            cell: OpaqueCell::null(),
        }
    }

    /// Binds a compile-time-known callable: a function item or non-capturing
    /// closure.
    ///
    /// `Z` must be zero-sized (checked during monomorphization); the live
    /// instance is consumed here so the thunk may re-materialize it on every
    /// call. The cell stays zeroed.
    #[inline]
    pub fn of_fn<Z>(target: Z) -> Self
    where
        Z: Callable<Args, Output = Ret>,
    {
        let _ = target;
        Self {
            thunk: thunk::fn_item::<Z, Args, Ret>,
            cell: OpaqueCell::null(),
        }
    }

    /// Binds a function pointer supplied at runtime, storing its bits in the
    /// cell and dispatching through the runtime-dispatch thunk.
    ///
    /// # Safety
    ///
    /// The caller must ensure `P` is a function pointer type. The cell
    /// stores `target`'s bits as data; a `P` that borrows storage (such as a
    /// reference to a closure) would smuggle that borrow past the erasure.
    #[inline]
    pub unsafe fn of_fn_ptr<P>(target: P) -> Self
    where
        P: Callable<Args, Output = Ret> + Copy,
    {
        Self {
            thunk: thunk::fn_ptr::<P, Args, Ret>,
            cell: OpaqueCell::from_code(target),
        }
    }

    /// Binds a method (or context-taking free function) to a shared
    /// receiver, storing the receiver's address in the cell.
    ///
    /// `M` must be zero-sized (checked during monomorphization).
    ///
    /// # Safety
    ///
    /// The caller must ensure `receiver` stays live, and not exclusively
    /// borrowed elsewhere, for every call made through the returned value or
    /// any copy of it.
    #[inline]
    pub unsafe fn of_method<T, M>(receiver: &T, method: M) -> Self
    where
        M: Method<T, Args, Output = Ret>,
    {
        let _ = method;
        Self {
            thunk: thunk::method::<T, M, Args, Ret>,
            cell: OpaqueCell::from_ref(receiver),
        }
    }

    /// Binds a method (or context-taking free function) to an exclusive
    /// receiver, storing the receiver's address in the cell.
    ///
    /// `M` must be zero-sized (checked during monomorphization).
    ///
    /// # Safety
    ///
    /// The caller must ensure `receiver` stays live for every call made
    /// through the returned value or any copy of it, and that no two such
    /// calls overlap (the thunk re-creates the `&mut T` on each call).
    #[inline]
    pub unsafe fn of_method_mut<T, M>(receiver: &mut T, method: M) -> Self
    where
        M: MethodMut<T, Args, Output = Ret>,
    {
        let _ = method;
        Self {
            thunk: thunk::method_mut::<T, M, Args, Ret>,
            cell: OpaqueCell::from_mut(receiver),
        }
    }

    /// Binds a functor or closure by shared reference, storing its address
    /// in the cell.
    ///
    /// # Safety
    ///
    /// The caller must ensure `target` stays live, and not exclusively
    /// borrowed elsewhere, for every call made through the returned value or
    /// any copy of it.
    #[inline]
    pub unsafe fn of_closure<F>(target: &F) -> Self
    where
        F: Callable<Args, Output = Ret>,
    {
        Self {
            thunk: thunk::closure::<F, Args, Ret>,
            cell: OpaqueCell::from_ref(target),
        }
    }

    /// Binds a functor or closure by exclusive reference, storing its
    /// address in the cell.
    ///
    /// # Safety
    ///
    /// The caller must ensure `target` stays live for every call made
    /// through the returned value or any copy of it, and that no two such
    /// calls overlap (the thunk re-creates the `&mut F` on each call).
    #[inline]
    pub unsafe fn of_closure_mut<F>(target: &mut F) -> Self
    where
        F: CallableMut<Args, Output = Ret>,
    {
        Self {
            thunk: thunk::closure_mut::<F, Args, Ret>,
            cell: OpaqueCell::from_mut(target),
        }
    }

    /// Pairs a caller-supplied thunk with an untyped context word.
    ///
    /// # Safety
    ///
    /// The caller must ensure `thunk` interprets `cell` correctly on every
    /// call, and that whatever `cell` names stays valid for every call made
    /// through the returned value or any copy of it.
    #[inline]
    pub const unsafe fn from_raw_parts(thunk: Thunk<Args, Ret>, cell: OpaqueCell) -> Self {
        Self { thunk, cell }
    }

    /// Dispatches through the stored thunk with the stored cell.
    ///
    /// Safe unconditionally: the constructors established that the thunk and
    /// cell match, and the liveness obligations of the `unsafe` constructors
    /// cover every call made here.
    #[inline]
    pub fn call(&self, args: Args) -> Ret {
        (self.thunk)(self.cell, args)
    }

    /// Returns whether this is the null reference for its signature.
    #[inline]
    pub fn is_null(&self) -> bool
    where
        Ret: Default,
    {
        fn_addr_eq(self.thunk, thunk::null::<Args, Ret> as Thunk<Args, Ret>)
    }

    /// Returns whether `self` and `other` name the same target: the same
    /// thunk and the same data word.
    ///
    /// Because a runtime function pointer is stored bit-for-bit as the data
    /// word, this single comparison covers both the object-address and the
    /// code-address interpretations. Null references always carry a zeroed
    /// cell, so two nulls compare equal under the same rule.
    #[inline]
    pub fn equal(&self, other: &Self) -> bool {
        fn_addr_eq(self.thunk, other.thunk) && self.cell.addr() == other.cell.addr()
    }

    /// The stored thunk's address, for ordering.
    #[inline]
    pub fn thunk_addr(&self) -> usize {
        self.thunk as usize
    }

    /// The stored data word, for ordering and inspection.
    #[inline]
    pub fn cell(&self) -> OpaqueCell {
        self.cell
    }
}

impl<Args, Ret> fmt::Debug for RawFnRef<Args, Ret> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawFnRef")
            .field("thunk", &(self.thunk_addr() as *const ()))
            .field("cell", &self.cell.as_ptr())
            .finish()
    }
}

/// A deferred method identity: a thunk with no receiver yet, exactly one
/// machine word.
///
/// Pairing it with a receiver later produces a [`RawFnRef`]. The receiver
/// type the thunk expects is erased here; the public `fnref` crate carries
/// it in a marker so that pairing is type-checked.
#[repr(transparent)]
pub struct RawMethodRef<Args, Ret> {
    /// The method thunk, expecting a cell that names a receiver of the type
    /// baked into it at construction.
    ///
    /// # Safety
    ///
    /// Only paired with a cell through [`RawMethodRef::bind`] or
    /// [`RawMethodRef::call`], whose contracts require the receiver type to
    /// match.
    thunk: Thunk<Args, Ret>,
}

impl<Args, Ret> Clone for RawMethodRef<Args, Ret> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<Args, Ret> Copy for RawMethodRef<Args, Ret> {}

impl<Args, Ret> RawMethodRef<Args, Ret> {
    /// Creates the null method reference for this signature.
    #[inline]
    pub const fn null() -> Self
    where
        Ret: Default,
    {
        Self {
            thunk: thunk::null::<Args, Ret>,
        }
    }

    /// Captures a shared-receiver method with no receiver attached.
    ///
    /// `M` must be zero-sized (checked during monomorphization); the live
    /// instance is consumed here. Nothing is stored besides the thunk
    /// address, so no liveness obligation arises yet.
    #[inline]
    pub fn of_method<T, M>(method: M) -> Self
    where
        M: Method<T, Args, Output = Ret>,
    {
        let _ = method;
        Self {
            thunk: thunk::method::<T, M, Args, Ret>,
        }
    }

    /// Captures an exclusive-receiver method with no receiver attached.
    ///
    /// `M` must be zero-sized (checked during monomorphization).
    #[inline]
    pub fn of_method_mut<T, M>(method: M) -> Self
    where
        M: MethodMut<T, Args, Output = Ret>,
    {
        let _ = method;
        Self {
            thunk: thunk::method_mut::<T, M, Args, Ret>,
        }
    }

    /// Returns whether this is the null method reference for its signature.
    #[inline]
    pub fn is_null(&self) -> bool
    where
        Ret: Default,
    {
        fn_addr_eq(self.thunk, thunk::null::<Args, Ret> as Thunk<Args, Ret>)
    }

    /// Returns whether `self` and `other` name the same method. Only the
    /// thunk address participates: no data word is stored yet.
    #[inline]
    pub fn equal(&self, other: &Self) -> bool {
        fn_addr_eq(self.thunk, other.thunk)
    }

    /// The stored thunk's address, for ordering.
    #[inline]
    pub fn thunk_addr(&self) -> usize {
        self.thunk as usize
    }

    /// Dispatches through the stored thunk with a caller-built cell.
    ///
    /// # Safety
    ///
    /// The caller must ensure `cell` names a live receiver of the type this
    /// thunk was created for, borrowed exclusively if the thunk came from
    /// [`RawMethodRef::of_method_mut`], for the duration of the call.
    #[inline]
    pub unsafe fn call(&self, cell: OpaqueCell, args: Args) -> Ret {
        (self.thunk)(cell, args)
    }

    /// Pairs this method identity with a receiver cell, producing a full
    /// callable reference.
    ///
    /// # Safety
    ///
    /// The caller must ensure `cell` names a receiver of the type this thunk
    /// was created for, and that the receiver satisfies the liveness (and,
    /// for exclusive-receiver thunks, non-overlap) obligations of
    /// [`RawFnRef::of_method`] / [`RawFnRef::of_method_mut`] for every call
    /// made through the result or any copy of it.
    #[inline]
    pub unsafe fn bind(self, cell: OpaqueCell) -> RawFnRef<Args, Ret> {
        // SAFETY: The thunk/cell pairing contract is guaranteed by the
        // caller.
        unsafe { RawFnRef::from_raw_parts(self.thunk, cell) }
    }
}

impl<Args, Ret> fmt::Debug for RawMethodRef<Args, Ret> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawMethodRef")
            .field("thunk", &(self.thunk_addr() as *const ()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use core::mem::size_of;

    use super::*;

    fn add(x: i32, y: i32) -> i32 {
        x + y
    }

    fn sub(x: i32, y: i32) -> i32 {
        x - y
    }

    struct Gauge {
        level: i32,
    }

    impl Gauge {
        fn headroom(&self, limit: i32) -> i32 {
            limit - self.level
        }
    }

    #[test]
    fn test_raw_size_is_two_words() {
        assert_eq!(
            size_of::<RawFnRef<(i32, i32), i32>>(),
            2 * size_of::<usize>()
        );
        assert_eq!(size_of::<RawMethodRef<(i32,), i32>>(), size_of::<usize>());
        // Function pointers have a niche, so the null state costs nothing
        // even when wrapped in an `Option`.
        assert_eq!(
            size_of::<Option<RawFnRef<(i32, i32), i32>>>(),
            2 * size_of::<usize>()
        );
    }

    #[test]
    fn test_null_round_trip() {
        let null = RawFnRef::<(i32,), i32>::null();
        assert!(null.is_null());
        assert_eq!(null.call((9,)), 0);
        assert_eq!(null.cell().addr(), 0);
    }

    #[test]
    fn test_of_fn_dispatch_and_identity() {
        let a = RawFnRef::<(i32, i32), i32>::of_fn(add);
        let b = RawFnRef::<(i32, i32), i32>::of_fn(add);
        let c = RawFnRef::<(i32, i32), i32>::of_fn(sub);
        assert_eq!(a.call((2, 3)), 5);
        assert!(a.equal(&b));
        assert!(!a.equal(&c));
        assert!(!a.is_null());
    }

    #[test]
    fn test_of_fn_ptr_stores_target_as_data() {
        // SAFETY: `fn(i32, i32) -> i32` is a function pointer type.
        let a = unsafe { RawFnRef::<(i32, i32), i32>::of_fn_ptr::<fn(i32, i32) -> i32>(add) };
        // SAFETY: As above.
        let b = unsafe { RawFnRef::<(i32, i32), i32>::of_fn_ptr::<fn(i32, i32) -> i32>(sub) };
        assert_eq!(a.call((40, 2)), 42);
        assert_eq!(b.call((40, 2)), 38);
        // Same thunk, different data words.
        assert_eq!(a.thunk_addr(), b.thunk_addr());
        assert!(!a.equal(&b));
    }

    #[test]
    fn test_method_ref_binds_to_receiver() {
        let gauge = Gauge { level: 30 };
        let captured = RawMethodRef::<(i32,), i32>::of_method::<Gauge, _>(Gauge::headroom);
        assert!(!captured.is_null());
        // SAFETY: The cell names `gauge`, which is live and matches the
        // receiver type the thunk was created for.
        let bound = unsafe { captured.bind(OpaqueCell::from_ref(&gauge)) };
        assert_eq!(bound.call((100,)), 70);
    }
}
