//! Receiver-less method references, [`MethodRef`] and [`MethodRefMut`].

use core::{cmp::Ordering, fmt, marker::PhantomData};

use fnref_internals::{
    OpaqueCell, RawMethodRef,
    callable::{Method, MethodMut},
};

use crate::fn_ref::Null;

/// A reference to a shared-receiver method of `T` with no receiver attached
/// yet, stored in one machine word.
///
/// Where [`FnRef`](crate::FnRef) answers "call *this* on *that* object", a
/// `MethodRef` stores only the "this": which method to call. It borrows
/// nothing and has no lifetime; the receiver is supplied at each call
/// ([`MethodRef::invoke_args`] and the per-arity `invoke` sugar) or attached
/// later with [`FnRef::make_bound`](crate::FnRef::make_bound).
///
/// Because no receiver is stored, `MethodRef` is freely `Copy`, `Send` and
/// `Sync`, and two of them are equal exactly when they name the same method.
///
/// # Examples
///
/// ```
/// use fnref::MethodRef;
///
/// struct Scaler {
///     factor: i32,
/// }
///
/// impl Scaler {
///     fn scale(&self, x: i32) -> i32 {
///         self.factor * x
///     }
/// }
///
/// let method: MethodRef<Scaler, (i32,), i32> = MethodRef::make(Scaler::scale);
/// let doubler = Scaler { factor: 2 };
/// let tripler = Scaler { factor: 3 };
/// assert_eq!(method.invoke(&doubler, 10), 20);
/// assert_eq!(method.invoke(&tripler, 10), 30);
/// ```
pub struct MethodRef<T, Args = (), Ret = ()> {
    /// The erased method thunk.
    pub(crate) raw: RawMethodRef<Args, Ret>,
    /// Remembers the receiver type the thunk expects, so binding is
    /// type-checked. Variance and auto traits follow a plain function
    /// signature over `T`.
    _marker: PhantomData<fn(&T, Args) -> Ret>,
}

impl<T, Args, Ret> Clone for MethodRef<T, Args, Ret> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, Args, Ret> Copy for MethodRef<T, Args, Ret> {}

impl<T, Args, Ret> MethodRef<T, Args, Ret> {
    /// Creates a null method reference. Binding it yields a null
    /// [`FnRef`](crate::FnRef); invoking it returns `Ret::default()`.
    #[inline]
    pub const fn new() -> Self
    where
        Ret: Default,
    {
        Self {
            raw: RawMethodRef::null(),
            _marker: PhantomData,
        }
    }

    /// Captures a shared-receiver method (or receiver-taking free function)
    /// of `T`.
    ///
    /// `method` must be zero-sized, which a path like `Widget::refresh` is;
    /// this is checked at compile time.
    #[inline]
    pub fn make<M>(method: M) -> Self
    where
        M: Method<T, Args, Output = Ret>,
    {
        Self {
            raw: RawMethodRef::of_method::<T, M>(method),
            _marker: PhantomData,
        }
    }

    /// Returns whether this reference is in the null state.
    #[inline]
    pub fn is_null(&self) -> bool
    where
        Ret: Default,
    {
        self.raw.is_null()
    }

    /// Calls the stored method on `receiver` with the packed argument tuple.
    ///
    /// Per-arity sugar taking the arguments unpacked is available as
    /// `invoke(receiver, a, b, ..)` for up to eight arguments.
    #[inline]
    pub fn invoke_args(&self, receiver: &T, args: Args) -> Ret {
        // SAFETY: The thunk was created for receiver type `T` by `make` (or
        // is the null thunk, which ignores the cell), and the receiver is
        // borrowed for the duration of the call.
        unsafe { self.raw.call(OpaqueCell::from_ref(receiver), args) }
    }
}

impl<T, Args, Ret: Default> Default for MethodRef<T, Args, Ret> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T, Args, Ret> PartialEq for MethodRef<T, Args, Ret> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.raw.equal(&other.raw)
    }
}

impl<T, Args, Ret> Eq for MethodRef<T, Args, Ret> {}

impl<T, Args, Ret: Default> PartialOrd for MethodRef<T, Args, Ret> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T, Args, Ret: Default> Ord for MethodRef<T, Args, Ret> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_method_thunks(
            self.is_null(),
            self.raw.thunk_addr(),
            other.is_null(),
            other.raw.thunk_addr(),
        )
    }
}

impl<T, Args, Ret: Default> PartialEq<Null> for MethodRef<T, Args, Ret> {
    #[inline]
    fn eq(&self, _: &Null) -> bool {
        self.is_null()
    }
}

impl<T, Args, Ret> fmt::Debug for MethodRef<T, Args, Ret> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodRef")
            .field("thunk", &(self.raw.thunk_addr() as *const ()))
            .finish()
    }
}

/// A reference to an exclusive-receiver method of `T` with no receiver
/// attached yet, stored in one machine word.
///
/// The `&mut T` receiver is supplied at each call, freshly borrowed for the
/// call's duration, so [`MethodRefMut::invoke_args`] and the per-arity
/// `invoke` sugar are safe. Attaching a receiver permanently
/// ([`FnRef::make_bound_mut`](crate::FnRef::make_bound_mut)) is where the
/// aliasing obligation arises.
///
/// A shared-receiver method also works where an exclusive one is expected;
/// widen it with [`MethodRefMut::make_shared`] or `From<MethodRef>`.
///
/// # Examples
///
/// ```
/// use fnref::MethodRefMut;
///
/// struct Counter {
///     count: i32,
/// }
///
/// impl Counter {
///     fn bump(&mut self, by: i32) -> i32 {
///         self.count += by;
///         self.count
///     }
/// }
///
/// let method: MethodRefMut<Counter, (i32,), i32> = MethodRefMut::make(Counter::bump);
/// let mut counter = Counter { count: 0 };
/// assert_eq!(method.invoke(&mut counter, 2), 2);
/// assert_eq!(method.invoke(&mut counter, 3), 5);
/// ```
pub struct MethodRefMut<T, Args = (), Ret = ()> {
    /// The erased method thunk.
    pub(crate) raw: RawMethodRef<Args, Ret>,
    /// Remembers the receiver type the thunk expects.
    _marker: PhantomData<fn(&mut T, Args) -> Ret>,
}

impl<T, Args, Ret> Clone for MethodRefMut<T, Args, Ret> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, Args, Ret> Copy for MethodRefMut<T, Args, Ret> {}

impl<T, Args, Ret> MethodRefMut<T, Args, Ret> {
    /// Creates a null method reference.
    #[inline]
    pub const fn new() -> Self
    where
        Ret: Default,
    {
        Self {
            raw: RawMethodRef::null(),
            _marker: PhantomData,
        }
    }

    /// Captures an exclusive-receiver method (or receiver-taking free
    /// function) of `T`.
    ///
    /// `method` must be zero-sized, which a path like `Widget::refresh` is;
    /// this is checked at compile time.
    #[inline]
    pub fn make<M>(method: M) -> Self
    where
        M: MethodMut<T, Args, Output = Ret>,
    {
        Self {
            raw: RawMethodRef::of_method_mut::<T, M>(method),
            _marker: PhantomData,
        }
    }

    /// Captures a shared-receiver method behind the exclusive-receiver
    /// interface.
    ///
    /// The call will simply not mutate; this mirrors how a `&mut T` coerces
    /// to `&T` at an ordinary call site.
    #[inline]
    pub fn make_shared<M>(method: M) -> Self
    where
        M: Method<T, Args, Output = Ret>,
    {
        Self {
            raw: RawMethodRef::of_method::<T, M>(method),
            _marker: PhantomData,
        }
    }

    /// Returns whether this reference is in the null state.
    #[inline]
    pub fn is_null(&self) -> bool
    where
        Ret: Default,
    {
        self.raw.is_null()
    }

    /// Calls the stored method on `receiver` with the packed argument tuple.
    #[inline]
    pub fn invoke_args(&self, receiver: &mut T, args: Args) -> Ret {
        // SAFETY: The thunk was created for receiver type `T` by `make` or
        // `make_shared` (or is the null thunk, which ignores the cell), and
        // the receiver is exclusively borrowed for the duration of the call.
        unsafe { self.raw.call(OpaqueCell::from_mut(receiver), args) }
    }
}

impl<T, Args, Ret: Default> Default for MethodRefMut<T, Args, Ret> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T, Args, Ret> From<MethodRef<T, Args, Ret>> for MethodRefMut<T, Args, Ret> {
    #[inline]
    fn from(method: MethodRef<T, Args, Ret>) -> Self {
        Self {
            raw: method.raw,
            _marker: PhantomData,
        }
    }
}

impl<T, Args, Ret> PartialEq for MethodRefMut<T, Args, Ret> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.raw.equal(&other.raw)
    }
}

impl<T, Args, Ret> Eq for MethodRefMut<T, Args, Ret> {}

impl<T, Args, Ret: Default> PartialOrd for MethodRefMut<T, Args, Ret> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T, Args, Ret: Default> Ord for MethodRefMut<T, Args, Ret> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_method_thunks(
            self.is_null(),
            self.raw.thunk_addr(),
            other.is_null(),
            other.raw.thunk_addr(),
        )
    }
}

impl<T, Args, Ret: Default> PartialEq<Null> for MethodRefMut<T, Args, Ret> {
    #[inline]
    fn eq(&self, _: &Null) -> bool {
        self.is_null()
    }
}

impl<T, Args, Ret> fmt::Debug for MethodRefMut<T, Args, Ret> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodRefMut")
            .field("thunk", &(self.raw.thunk_addr() as *const ()))
            .finish()
    }
}

/// Shared ordering rule for method references: null first, then by thunk
/// address.
#[inline]
fn cmp_method_thunks(
    lhs_null: bool,
    lhs_addr: usize,
    rhs_null: bool,
    rhs_addr: usize,
) -> Ordering {
    match (lhs_null, rhs_null) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => lhs_addr.cmp(&rhs_addr),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tally {
        total: i32,
    }

    impl Tally {
        fn sum(&self, extra: i32) -> i32 {
            self.total + extra
        }

        fn diff(&self, less: i32) -> i32 {
            self.total - less
        }

        fn bump(&mut self, by: i32) -> i32 {
            self.total += by;
            self.total
        }
    }

    #[test]
    fn test_null_invoke_returns_default() {
        let method = MethodRef::<Tally, (i32,), i32>::new();
        let tally = Tally { total: 9 };
        assert!(method.is_null());
        assert_eq!(method.invoke_args(&tally, (5,)), 0);
        assert!(method == Null);
    }

    #[test]
    fn test_invoke_across_receivers() {
        let method: MethodRef<Tally, (i32,), i32> = MethodRef::make(Tally::sum);
        let a = Tally { total: 1 };
        let b = Tally { total: 2 };
        assert_eq!(method.invoke_args(&a, (10,)), 11);
        assert_eq!(method.invoke_args(&b, (10,)), 12);
    }

    #[test]
    fn test_equality_by_method_identity() {
        let sum_a: MethodRef<Tally, (i32,), i32> = MethodRef::make(Tally::sum);
        let sum_b: MethodRef<Tally, (i32,), i32> = MethodRef::make(Tally::sum);
        let diff: MethodRef<Tally, (i32,), i32> = MethodRef::make(Tally::diff);
        assert_eq!(sum_a, sum_b);
        assert_ne!(sum_a, diff);
        assert_ne!(sum_a, MethodRef::new());
    }

    #[test]
    fn test_ordering_null_first() {
        let null = MethodRef::<Tally, (i32,), i32>::new();
        let sum: MethodRef<Tally, (i32,), i32> = MethodRef::make(Tally::sum);
        let diff: MethodRef<Tally, (i32,), i32> = MethodRef::make(Tally::diff);
        assert!(null < sum);
        assert!(null < diff);
        assert_eq!(sum.cmp(&diff), diff.cmp(&sum).reverse());
        assert_eq!(sum.cmp(&sum), Ordering::Equal);
    }

    #[test]
    fn test_mut_invoke_mutates() {
        let method: MethodRefMut<Tally, (i32,), i32> = MethodRefMut::make(Tally::bump);
        let mut tally = Tally { total: 0 };
        assert_eq!(method.invoke_args(&mut tally, (4,)), 4);
        assert_eq!(method.invoke_args(&mut tally, (5,)), 9);
        assert_eq!(tally.total, 9);
    }

    #[test]
    fn test_widening_preserves_identity() {
        let shared: MethodRef<Tally, (i32,), i32> = MethodRef::make(Tally::sum);
        let widened = MethodRefMut::from(shared);
        let direct: MethodRefMut<Tally, (i32,), i32> = MethodRefMut::make_shared(Tally::sum);
        assert_eq!(widened, direct);
        let mut tally = Tally { total: 40 };
        assert_eq!(widened.invoke_args(&mut tally, (2,)), 42);
    }

    #[test]
    fn test_method_refs_are_send_and_sync() {
        fn assert_send_sync<V: Send + Sync>() {}
        assert_send_sync::<MethodRef<Tally, (i32,), i32>>();
        assert_send_sync::<MethodRefMut<Tally, (i32,), i32>>();
    }
}
