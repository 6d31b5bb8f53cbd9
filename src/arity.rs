//! Per-arity convenience surface over the tuple-based core.
//!
//! The core API works on the packed argument tuple (`call_args`,
//! `invoke_args`), which keeps it arity-generic. Call sites should not have
//! to build tuples by hand, and function-pointer binders need a concrete
//! `fn(A, B, ..) -> Ret` type to accept. Both are generated here for zero
//! through eight arguments; each arity's methods live in an inherent `impl`
//! on that arity's tuple instantiation, so they never collide.

use fnref_internals::RawFnRef;

use crate::{
    fn_ref::FnRef,
    method_ref::{MethodRef, MethodRefMut},
};

/// Generates the unpacked-argument surface for one arity.
macro_rules! impl_arity {
    ($($arg:ident: $ty:ident),*) => {
        impl<'a, Ret $(, $ty)*> FnRef<'a, ($($ty,)*), Ret> {
            /// Calls the target. A null reference returns `Ret::default()`
            /// without doing anything else.
            #[inline]
            pub fn call(&self $(, $arg: $ty)*) -> Ret {
                self.call_args(($($arg,)*))
            }

            /// Creates a reference to a function pointer supplied at
            /// runtime.
            ///
            /// Unlike [`FnRef::make_fn`], the pointer's value is data: it is
            /// stored in the reference's data word, so two references to
            /// different pointers of the same type differ. The reference
            /// borrows nothing, so `'a` is unconstrained.
            #[inline]
            pub fn make_fn_ptr(target: fn($($ty),*) -> Ret) -> Self {
                // SAFETY: `fn(..) -> Ret` is a function pointer type.
                Self::from_raw(unsafe { RawFnRef::of_fn_ptr(target) })
            }

            /// Rebinds this reference to a runtime function pointer. See
            /// [`FnRef::make_fn_ptr`].
            #[inline]
            pub fn set_fn_ptr(&mut self, target: fn($($ty),*) -> Ret) -> &mut Self {
                *self = Self::make_fn_ptr(target);
                self
            }

            /// Creates a reference from an optional function pointer,
            /// mapping `None` to the null reference.
            ///
            /// This is the shape C callback registries hand out.
            #[inline]
            pub fn make_fn_ptr_opt(target: Option<fn($($ty),*) -> Ret>) -> Self
            where
                Ret: Default,
            {
                match target {
                    Some(target) => Self::make_fn_ptr(target),
                    None => Self::new(),
                }
            }
        }

        impl<'a, Ret $(, $ty)*> From<fn($($ty),*) -> Ret> for FnRef<'a, ($($ty,)*), Ret> {
            #[inline]
            fn from(target: fn($($ty),*) -> Ret) -> Self {
                Self::make_fn_ptr(target)
            }
        }

        impl<T, Ret $(, $ty)*> MethodRef<T, ($($ty,)*), Ret> {
            /// Calls the stored method on `receiver`. A null reference
            /// returns `Ret::default()` without touching the receiver.
            #[inline]
            pub fn invoke(&self, receiver: &T $(, $arg: $ty)*) -> Ret {
                self.invoke_args(receiver, ($($arg,)*))
            }
        }

        impl<T, Ret $(, $ty)*> MethodRefMut<T, ($($ty,)*), Ret> {
            /// Calls the stored method on `receiver`. A null reference
            /// returns `Ret::default()` without touching the receiver.
            #[inline]
            pub fn invoke(&self, receiver: &mut T $(, $arg: $ty)*) -> Ret {
                self.invoke_args(receiver, ($($arg,)*))
            }
        }
    };
}

impl_arity!();
impl_arity!(a1: A1);
impl_arity!(a1: A1, a2: A2);
impl_arity!(a1: A1, a2: A2, a3: A3);
impl_arity!(a1: A1, a2: A2, a3: A3, a4: A4);
impl_arity!(a1: A1, a2: A2, a3: A3, a4: A4, a5: A5);
impl_arity!(a1: A1, a2: A2, a3: A3, a4: A4, a5: A5, a6: A6);
impl_arity!(a1: A1, a2: A2, a3: A3, a4: A4, a5: A5, a6: A6, a7: A7);
impl_arity!(a1: A1, a2: A2, a3: A3, a4: A4, a5: A5, a6: A6, a7: A7, a8: A8);

#[cfg(test)]
mod tests {
    use crate::fn_ref::FnRef;

    fn add(x: i32, y: i32) -> i32 {
        x + y
    }

    fn sub(x: i32, y: i32) -> i32 {
        x - y
    }

    fn answer() -> i32 {
        42
    }

    #[test]
    fn test_call_unpacks_arguments() {
        let nullary: FnRef<'_, (), i32> = FnRef::make_fn(answer);
        assert_eq!(nullary.call(), 42);
        let binary: FnRef<'_, (i32, i32), i32> = FnRef::make_fn(add);
        assert_eq!(binary.call(20, 22), 42);
    }

    #[test]
    fn test_fn_ptr_identity_is_the_pointer() {
        let a = FnRef::<(i32, i32), i32>::make_fn_ptr(add);
        let b = FnRef::<(i32, i32), i32>::make_fn_ptr(add);
        let c = FnRef::<(i32, i32), i32>::make_fn_ptr(sub);
        assert_eq!(a.call(1, 2), 3);
        assert_eq!(c.call(1, 2), -1);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_fn_ptr_and_compile_time_bindings_differ() {
        // Same function, different dispatch strategy: these are distinct
        // targets on purpose.
        let ptr = FnRef::<(i32, i32), i32>::make_fn_ptr(add);
        let item: FnRef<'_, (i32, i32), i32> = FnRef::make_fn(add);
        assert_ne!(ptr, item);
        assert_eq!(ptr.call(2, 2), item.call(2, 2));
    }

    #[test]
    fn test_fn_ptr_opt_none_is_null() {
        let none = FnRef::<(i32, i32), i32>::make_fn_ptr_opt(None);
        assert!(none.is_null());
        assert_eq!(none.call(1, 2), 0);
        let some = FnRef::<(i32, i32), i32>::make_fn_ptr_opt(Some(add));
        assert!(!some.is_null());
        assert_eq!(some.call(1, 2), 3);
    }

    #[test]
    fn test_from_fn_pointer() {
        let cb: FnRef<'_, (i32, i32), i32> = (add as fn(i32, i32) -> i32).into();
        assert_eq!(cb.call(3, 4), 7);
        assert_eq!(cb, FnRef::<(i32, i32), i32>::make_fn_ptr(add));
    }

    #[test]
    fn test_eight_arguments() {
        fn total(a: u8, b: u8, c: u8, d: u8, e: u8, f: u8, g: u8, h: u8) -> u32 {
            [a, b, c, d, e, f, g, h].iter().map(|&v| u32::from(v)).sum()
        }
        let cb: FnRef<'_, (u8, u8, u8, u8, u8, u8, u8, u8), u32> = FnRef::make_fn(total);
        assert_eq!(cb.call(1, 2, 3, 4, 5, 6, 7, 8), 36);
    }
}
