//! Thunk functions for type-erased dispatch.
//!
//! For each way of producing a call, monomorphization of one of the generic
//! functions below yields a concrete thunk with the uniform signature
//! [`Thunk<Args, Ret>`]. The thunk closes over all type-specific knowledge
//! (the target's type, how to interpret the paired [`OpaqueCell`]), so a
//! reference only needs to store the thunk's address.
//!
//! This module is private to the crate; thunks are only ever paired with a
//! cell through the constructors in [`crate::raw`], which is what guarantees
//! the safety invariant: **a thunk is only ever handed a cell that was
//! populated for it**.
//!
//! Every thunk is pure with respect to the wrapper machinery: it may be
//! called any number of times and touches nothing but the cell it is given
//! and the target it dispatches to.

use core::{mem::size_of, ptr::NonNull};

use crate::{
    callable::{Callable, CallableMut, Method, MethodMut},
    cell::OpaqueCell,
};

/// The uniform calling convention shared by every thunk: "where to jump"
/// takes "what data to pass" plus the packed call arguments.
pub type Thunk<Args, Ret> = fn(OpaqueCell, Args) -> Ret;

/// Materializes a zero-sized callable out of thin air.
///
/// This is the stable-Rust counterpart of passing a function as a non-type
/// template argument: a function item or non-capturing closure is a unique
/// zero-sized type, so holding its *type* is holding the callable. The
/// constructors in [`crate::raw`] consume a live instance of `Z` at bind
/// time, so the value conjured here re-materializes one the binder proved to
/// own.
#[inline]
fn conjure<'a, Z>() -> &'a Z {
    const {
        assert!(
            size_of::<Z>() == 0,
            "compile-time-bound callables must be zero-sized; bind capturing \
             closures by reference instead"
        )
    };
    // SAFETY: `Z` is zero-sized per the assertion above, so a dangling,
    // well-aligned pointer is valid to turn into a reference.
    unsafe { NonNull::<Z>::dangling().as_ref() }
}

/// The canonical null thunk: ignores its cell and returns a
/// default-constructed value.
///
/// A reference is in the null state exactly when it stores this function's
/// address for its `(Args, Ret)` instantiation.
pub(crate) fn null<Args, Ret: Default>(_cell: OpaqueCell, _args: Args) -> Ret {
    Ret::default()
}

/// Thunk for a compile-time-known callable: conjures the zero-sized `Z` and
/// calls it. The cell is ignored and stays zeroed.
pub(crate) fn fn_item<Z, Args, Ret>(_cell: OpaqueCell, args: Args) -> Ret
where
    Z: Callable<Args, Output = Ret>,
{
    conjure::<Z>().call(args)
}

/// The runtime-dispatch thunk: reinterprets the cell word as the function
/// pointer `P` and calls through it.
///
/// This is the only thunk for which the cell holds a code address rather
/// than an object address. Because the pointer is stored bit-for-bit as the
/// cell word, word equality on the cell *is* function-pointer equality for
/// two references that both use this thunk.
pub(crate) fn fn_ptr<P, Args, Ret>(cell: OpaqueCell, args: Args) -> Ret
where
    P: Callable<Args, Output = Ret> + Copy,
{
    // SAFETY: This thunk is only installed by `RawFnRef::of_fn_ptr`, which
    // populated the cell from a value of type `P`.
    let target: P = unsafe { cell.read_code::<P>() };
    target.call(args)
}

/// Thunk for a method with a shared receiver: reads the cell as `&T` and
/// invokes the conjured zero-sized method value on it.
pub(crate) fn method<T, M, Args, Ret>(cell: OpaqueCell, args: Args) -> Ret
where
    M: Method<T, Args, Output = Ret>,
{
    // SAFETY: This thunk is only installed by `RawFnRef::of_method` (or a
    // `RawMethodRef` binding), whose contracts guarantee the cell holds a
    // live, shareable `T` whenever a call arrives.
    let receiver: &T = unsafe { cell.as_ref::<T>() };
    conjure::<M>().invoke(receiver, args)
}

/// Thunk for a method with an exclusive receiver: reads the cell as `&mut T`
/// and invokes the conjured zero-sized method value on it.
pub(crate) fn method_mut<T, M, Args, Ret>(cell: OpaqueCell, args: Args) -> Ret
where
    M: MethodMut<T, Args, Output = Ret>,
{
    // SAFETY: This thunk is only installed by `RawFnRef::of_method_mut` (or
    // a `RawMethodRef` binding), whose contracts guarantee the cell holds a
    // live `T` that no other reference aliases for the duration of the call.
    let receiver: &mut T = unsafe { cell.as_mut::<T>() };
    conjure::<M>().invoke_mut(receiver, args)
}

/// Thunk for a functor or closure bound by shared reference: reads the cell
/// as `&F` and calls it.
pub(crate) fn closure<F, Args, Ret>(cell: OpaqueCell, args: Args) -> Ret
where
    F: Callable<Args, Output = Ret>,
{
    // SAFETY: This thunk is only installed by `RawFnRef::of_closure`, whose
    // contract guarantees the cell holds a live, shareable `F` whenever a
    // call arrives.
    let target: &F = unsafe { cell.as_ref::<F>() };
    target.call(args)
}

/// Thunk for a functor or closure bound by exclusive reference: reads the
/// cell as `&mut F` and calls it.
pub(crate) fn closure_mut<F, Args, Ret>(cell: OpaqueCell, args: Args) -> Ret
where
    F: CallableMut<Args, Output = Ret>,
{
    // SAFETY: This thunk is only installed by `RawFnRef::of_closure_mut`,
    // whose contract guarantees the cell holds a live `F` that no other
    // reference aliases for the duration of the call.
    let target: &mut F = unsafe { cell.as_mut::<F>() };
    target.call_mut(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(x: i32, y: i32) -> i32 {
        x + y
    }

    #[test]
    fn test_null_returns_default() {
        let thunk: Thunk<(i32,), i32> = null::<(i32,), i32>;
        assert_eq!(thunk(OpaqueCell::null(), (7,)), 0);
    }

    #[test]
    fn test_thunk_identity_per_target() {
        // Two coercions of the same instantiation must yield the same
        // address, since that address is what equality compares.
        fn item_thunk<Z>(_witness: &Z) -> Thunk<(i32, i32), i32>
        where
            Z: Callable<(i32, i32), Output = i32>,
        {
            fn_item::<Z, (i32, i32), i32>
        }
        assert!(core::ptr::fn_addr_eq(item_thunk(&add), item_thunk(&add)));

        fn sub(x: i32, y: i32) -> i32 {
            x - y
        }
        assert!(!core::ptr::fn_addr_eq(item_thunk(&add), item_thunk(&sub)));
    }

    #[test]
    fn test_fn_ptr_thunk_calls_through_cell() {
        let cell = OpaqueCell::from_code::<fn(i32, i32) -> i32>(add);
        let thunk: Thunk<(i32, i32), i32> = fn_ptr::<fn(i32, i32) -> i32, (i32, i32), i32>;
        assert_eq!(thunk(cell, (20, 22)), 42);
    }
}
