//! The opaque data word paired with a thunk.
//!
//! This module encapsulates the `ptr` field of [`OpaqueCell`], ensuring it is
//! only written through the constructors in this file. This visibility
//! restriction guarantees the safety invariant: **the cell's contents are
//! only ever interpreted by the thunk it was paired with at construction**.
//!
//! # Safety Invariant
//!
//! An [`OpaqueCell`] holds one of three bit patterns:
//!
//! 1. null (the cleared state, paired with the null thunk),
//! 2. the address of a referenced object (method and closure bindings),
//! 3. the bit pattern of a runtime function pointer, reused word-for-word as
//!    data (the runtime-dispatch binding).
//!
//! The cell itself records nothing about which form it holds. Every typed
//! accessor is `unsafe` and requires the caller to know the form from the
//! paired thunk; the word is never inspected generically.

use core::mem::size_of;

/// A single untyped machine word naming "what data to pass" to a thunk.
///
/// Meaningless without the thunk it was constructed for. See the module
/// documentation for the forms it can hold.
#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct OpaqueCell {
    /// The stored bit pattern.
    ///
    /// # Safety
    ///
    /// Only interpreted through the unsafe typed accessors below, whose
    /// contracts require the caller to know the populated form from the
    /// paired thunk.
    ptr: *const (),
}

impl OpaqueCell {
    /// Creates the cleared cell. This is the only value a null reference
    /// ever stores, which keeps equality on null references trivial.
    #[inline]
    pub const fn null() -> Self {
        Self {
            ptr: core::ptr::null(),
        }
    }

    /// Creates a cell holding the address of `value`.
    #[inline]
    pub fn from_ref<T>(value: &T) -> Self {
        Self {
            ptr: (value as *const T).cast::<()>(),
        }
    }

    /// Creates a cell holding the address of `value`, remembering nothing
    /// about the exclusivity of the borrow. Pair only with a thunk that
    /// re-creates the `&mut T`.
    #[inline]
    pub fn from_mut<T>(value: &mut T) -> Self {
        Self {
            ptr: (value as *mut T as *const T).cast::<()>(),
        }
    }

    /// Creates a cell from an already-untyped pointer, for user-written
    /// thunks over an untyped context word.
    #[inline]
    pub const fn from_ptr(ptr: *const ()) -> Self {
        Self { ptr }
    }

    /// Creates a cell holding the bit pattern of `code`, which must be a
    /// function pointer type occupying exactly one machine word.
    ///
    /// Storing the bits is safe on its own; reading them back through
    /// [`OpaqueCell::read_code`] is where the pairing contract applies.
    #[inline]
    pub fn from_code<P: Copy>(code: P) -> Self {
        const {
            assert!(
                size_of::<P>() == size_of::<*const ()>(),
                "a runtime-dispatch target must be exactly one machine word"
            )
        };
        // SAFETY: The sizes match per the assertion above, and any bit
        // pattern is a valid `*const ()`.
        let ptr = unsafe { core::mem::transmute_copy::<P, *const ()>(&code) };
        Self { ptr }
    }

    /// Returns the stored word as an untyped pointer.
    #[inline]
    pub fn as_ptr(self) -> *const () {
        self.ptr
    }

    /// Returns the stored word as an address, for comparison and ordering.
    #[inline]
    pub fn addr(self) -> usize {
        self.ptr as usize
    }

    /// Reads the cell as a shared reference to `T`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The cell was created via [`OpaqueCell::from_ref`] (or
    ///    [`OpaqueCell::from_mut`]) with a value of type `T`.
    /// 2. The referenced value is live and not exclusively borrowed elsewhere
    ///    for the duration of `'a`.
    #[inline]
    pub unsafe fn as_ref<'a, T>(self) -> &'a T {
        // SAFETY: The pointer holds the address of a live `T` per the
        // caller's obligations.
        unsafe { &*self.ptr.cast::<T>() }
    }

    /// Reads the cell as an exclusive reference to `T`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The cell was created via [`OpaqueCell::from_mut`] with a value of
    ///    type `T`.
    /// 2. The referenced value is live and no other reference to it exists
    ///    for the duration of `'a`.
    #[inline]
    pub unsafe fn as_mut<'a, T>(self) -> &'a mut T {
        let ptr = self.ptr as *mut T;
        // SAFETY: The pointer holds the address of a live, unaliased `T`
        // per the caller's obligations; its provenance comes from the
        // `&mut T` given to `from_mut`.
        unsafe { &mut *ptr }
    }

    /// Reads the cell as the function pointer `P` it was created from.
    ///
    /// # Safety
    ///
    /// The caller must ensure the cell was created via
    /// [`OpaqueCell::from_code`] with a value of type `P`.
    #[inline]
    pub unsafe fn read_code<P: Copy>(self) -> P {
        const {
            assert!(
                size_of::<P>() == size_of::<*const ()>(),
                "a runtime-dispatch target must be exactly one machine word"
            )
        };
        // SAFETY: The sizes match per the assertion above, and the stored
        // bits are a valid `P` because they were written from one.
        unsafe { core::mem::transmute_copy::<*const (), P>(&self.ptr) }
    }
}
