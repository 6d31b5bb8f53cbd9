//! Dispatch traits that keep the thunk machinery arity-generic.
//!
//! Stable Rust cannot abstract over function arity directly, so these traits
//! carry the argument list as a tuple: a reference with arguments `(A, B)`
//! works with any `F: Callable<(A, B)>`. Blanket implementations over the
//! `Fn`/`FnMut` traits are generated for tuples of zero through eight
//! elements, which covers plain functions, function pointers and closures
//! without any per-arity code in the core.
//!
//! [`Method`] and [`MethodMut`] are the receiver-taking variants. A Rust
//! method *is* a free function whose first parameter is the receiver, so
//! these also cover "free function with an injected context argument"
//! bindings: `fn log(ctx: &Logger, line: u32)` implements
//! `Method<Logger, (u32,)>` exactly like `Logger::log` would.

/// A callable invoked through a shared reference, with its arguments packed
/// into a tuple.
///
/// Implemented for every `Fn(A, B, ..) -> Ret` with up to eight arguments.
///
/// # Examples
///
/// ```
/// use fnref_internals::callable::Callable;
///
/// fn add(x: i32, y: i32) -> i32 {
///     x + y
/// }
///
/// fn apply<F: Callable<(i32, i32), Output = i32>>(f: &F) -> i32 {
///     f.call((2, 3))
/// }
///
/// assert_eq!(apply(&add), 5);
/// assert_eq!(apply(&|x, y| x * y), 6);
/// ```
pub trait Callable<Args> {
    /// The value produced by a call.
    type Output;

    /// Calls the target with the packed argument tuple.
    fn call(&self, args: Args) -> Self::Output;
}

/// A callable invoked through an exclusive reference, with its arguments
/// packed into a tuple.
///
/// Implemented for every `FnMut(A, B, ..) -> Ret` with up to eight
/// arguments.
pub trait CallableMut<Args> {
    /// The value produced by a call.
    type Output;

    /// Calls the target with the packed argument tuple.
    fn call_mut(&mut self, args: Args) -> Self::Output;
}

/// A callable taking a shared receiver before its packed argument tuple.
///
/// Implemented for every `Fn(&T, A, B, ..) -> Ret` with up to eight
/// arguments after the receiver, which is what a method on `&self` (or a
/// free function with a leading context reference) looks like as a value.
///
/// # Examples
///
/// ```
/// use fnref_internals::callable::Method;
///
/// struct Counter {
///     count: u32,
/// }
///
/// impl Counter {
///     fn above(&self, threshold: u32) -> bool {
///         self.count > threshold
///     }
/// }
///
/// fn check<M: Method<Counter, (u32,), Output = bool>>(m: &M, c: &Counter) -> bool {
///     m.invoke(c, (10,))
/// }
///
/// let counter = Counter { count: 12 };
/// assert!(check(&Counter::above, &counter));
/// ```
pub trait Method<T, Args> {
    /// The value produced by a call.
    type Output;

    /// Calls the target on `receiver` with the packed argument tuple.
    fn invoke(&self, receiver: &T, args: Args) -> Self::Output;
}

/// A callable taking an exclusive receiver before its packed argument tuple.
///
/// Implemented for every `Fn(&mut T, A, B, ..) -> Ret` with up to eight
/// arguments after the receiver. Note that the callable *value* itself is
/// still invoked through a shared reference; only the receiver is exclusive,
/// matching a method on `&mut self`.
pub trait MethodMut<T, Args> {
    /// The value produced by a call.
    type Output;

    /// Calls the target on `receiver` with the packed argument tuple.
    fn invoke_mut(&self, receiver: &mut T, args: Args) -> Self::Output;
}

/// Generates the blanket implementations for one argument-tuple arity.
macro_rules! impl_callable {
    ($($arg:ident: $ty:ident),*) => {
        impl<Func, Ret $(, $ty)*> Callable<($($ty,)*)> for Func
        where
            Func: Fn($($ty),*) -> Ret,
        {
            type Output = Ret;

            #[inline]
            fn call(&self, ($($arg,)*): ($($ty,)*)) -> Ret {
                self($($arg),*)
            }
        }

        impl<Func, Ret $(, $ty)*> CallableMut<($($ty,)*)> for Func
        where
            Func: FnMut($($ty),*) -> Ret,
        {
            type Output = Ret;

            #[inline]
            fn call_mut(&mut self, ($($arg,)*): ($($ty,)*)) -> Ret {
                self($($arg),*)
            }
        }

        impl<Func, Recv, Ret $(, $ty)*> Method<Recv, ($($ty,)*)> for Func
        where
            Func: Fn(&Recv $(, $ty)*) -> Ret,
        {
            type Output = Ret;

            #[inline]
            fn invoke(&self, receiver: &Recv, ($($arg,)*): ($($ty,)*)) -> Ret {
                self(receiver $(, $arg)*)
            }
        }

        impl<Func, Recv, Ret $(, $ty)*> MethodMut<Recv, ($($ty,)*)> for Func
        where
            Func: Fn(&mut Recv $(, $ty)*) -> Ret,
        {
            type Output = Ret;

            #[inline]
            fn invoke_mut(&self, receiver: &mut Recv, ($($arg,)*): ($($ty,)*)) -> Ret {
                self(receiver $(, $arg)*)
            }
        }
    };
}

impl_callable!();
impl_callable!(a1: A1);
impl_callable!(a1: A1, a2: A2);
impl_callable!(a1: A1, a2: A2, a3: A3);
impl_callable!(a1: A1, a2: A2, a3: A3, a4: A4);
impl_callable!(a1: A1, a2: A2, a3: A3, a4: A4, a5: A5);
impl_callable!(a1: A1, a2: A2, a3: A3, a4: A4, a5: A5, a6: A6);
impl_callable!(a1: A1, a2: A2, a3: A3, a4: A4, a5: A5, a6: A6, a7: A7);
impl_callable!(a1: A1, a2: A2, a3: A3, a4: A4, a5: A5, a6: A6, a7: A7, a8: A8);

#[cfg(test)]
mod tests {
    use super::*;

    fn add(x: i32, y: i32) -> i32 {
        x + y
    }

    struct Tally {
        total: i32,
    }

    impl Tally {
        fn sum(&self, extra: i32) -> i32 {
            self.total + extra
        }

        fn bump(&mut self, by: i32) -> i32 {
            self.total += by;
            self.total
        }
    }

    #[test]
    fn test_callable_for_fn_item() {
        assert_eq!(Callable::call(&add, (2, 3)), 5);
    }

    #[test]
    fn test_callable_for_fn_pointer() {
        let p: fn(i32, i32) -> i32 = add;
        assert_eq!(p.call((4, 5)), 9);
    }

    #[test]
    fn test_callable_mut_for_closure() {
        let mut hits = 0;
        let mut counter = |by: i32| {
            hits += by;
            hits
        };
        assert_eq!(counter.call_mut((2,)), 2);
        assert_eq!(counter.call_mut((3,)), 5);
    }

    #[test]
    fn test_method_for_method_path() {
        let tally = Tally { total: 40 };
        assert_eq!(Tally::sum.invoke(&tally, (2,)), 42);
    }

    #[test]
    fn test_method_mut_for_method_path() {
        let mut tally = Tally { total: 1 };
        assert_eq!(Tally::bump.invoke_mut(&mut tally, (9,)), 10);
        assert_eq!(tally.total, 10);
    }

    #[test]
    fn test_method_for_context_function() {
        fn gap(tally: &Tally, target: i32) -> i32 {
            target - tally.total
        }
        let tally = Tally { total: 30 };
        assert_eq!(gap.invoke(&tally, (100,)), 70);
    }
}
