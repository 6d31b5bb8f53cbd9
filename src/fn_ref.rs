//! The two-word callable reference, [`FnRef`].

use core::{cmp::Ordering, fmt, marker::PhantomData};

use fnref_internals::{
    OpaqueCell, RawFnRef, Thunk,
    callable::{Callable, CallableMut, Method, MethodMut},
};

use crate::method_ref::{MethodRef, MethodRefMut};

/// A non-owning reference to a callable with signature `Args -> Ret`, stored
/// in exactly two machine words.
///
/// An `FnRef` can point at a free function bound at compile time, a function
/// pointer supplied at runtime, a method paired with a receiver, or a functor
/// or closure borrowed from the caller. Whatever the target, the
/// representation is the same: one thunk address ("where to jump") and one
/// opaque data word ("what data to pass"). Binding and calling never
/// allocate, and calling is a single indirect call through the thunk.
///
/// `Args` is the argument list packed as a tuple; `Ret` is the return type.
/// Per-arity sugar (`call(a, b)` instead of `call_args((a, b))`, plus the
/// function-pointer binders) is provided for up to eight arguments.
///
/// # Null state
///
/// Where `Ret: Default`, an `FnRef` has a distinguished null state that is
/// *safe to call*: the call does nothing and returns `Ret::default()`. This
/// removes the need to check a callback before invoking it. For return types
/// without a default there is no null state, and every constructor requires a
/// target.
///
/// # Lifetimes
///
/// Bindings that reference caller storage (methods, closures, functors)
/// borrow it for `'a`, so a reference can never outlive its target. Bindings
/// that reference only code (compile-time functions, function pointers, the
/// null state) leave `'a` unconstrained.
///
/// `FnRef` is `Copy`; every copy is the same two words and compares equal to
/// the original.
///
/// # Examples
///
/// ```
/// use fnref::FnRef;
///
/// fn add(x: i32, y: i32) -> i32 {
///     x + y
/// }
///
/// let mut cb: FnRef<(i32, i32), i32> = FnRef::new();
/// assert!(cb.is_null());
/// assert_eq!(cb.call(2, 3), 0);
///
/// cb.set_fn(add);
/// assert_eq!(cb.call(2, 3), 5);
/// ```
///
/// A reference cannot outlive what it points at:
///
/// ```compile_fail,E0597
/// use fnref::FnRef;
///
/// struct Adder {
///     base: i32,
/// }
///
/// impl Adder {
///     fn add(&self, x: i32) -> i32 {
///         self.base + x
///     }
/// }
///
/// let cb: FnRef<(i32,), i32> = {
///     let adder = Adder { base: 1 };
///     FnRef::make_method(&adder, Adder::add)
/// };
/// cb.call(1);
/// ```
#[repr(C)]
pub struct FnRef<'a, Args = (), Ret = ()> {
    /// The erased (thunk, cell) pair.
    pub(crate) raw: RawFnRef<Args, Ret>,
    /// Ties the reference to the storage it may point at.
    pub(crate) _borrow: PhantomData<&'a ()>,
}

impl<Args, Ret> Clone for FnRef<'_, Args, Ret> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<Args, Ret> Copy for FnRef<'_, Args, Ret> {}

impl<'a, Args, Ret> FnRef<'a, Args, Ret> {
    /// Wraps an erased pair, attaching the caller-chosen lifetime.
    #[inline]
    pub(crate) fn from_raw(raw: RawFnRef<Args, Ret>) -> Self {
        Self {
            raw,
            _borrow: PhantomData,
        }
    }

    /// Creates a null reference. Calling it returns `Ret::default()`.
    #[inline]
    pub const fn new() -> Self
    where
        Ret: Default,
    {
        Self {
            raw: RawFnRef::null(),
            _borrow: PhantomData,
        }
    }

    /// Resets this reference to the null state.
    #[inline]
    pub fn clear(&mut self) -> &mut Self
    where
        Ret: Default,
    {
        *self = Self::new();
        self
    }

    /// Returns whether this reference is in the null state.
    #[inline]
    pub fn is_null(&self) -> bool
    where
        Ret: Default,
    {
        self.raw.is_null()
    }

    /// Calls the target with the packed argument tuple.
    ///
    /// Per-arity sugar taking the arguments unpacked is available as
    /// `call(a, b, ..)` for up to eight arguments.
    #[inline]
    pub fn call_args(&self, args: Args) -> Ret {
        self.raw.call(args)
    }

    /// Creates a reference to a function (or non-capturing closure) known at
    /// compile time.
    ///
    /// The target must be zero-sized, which is what lets it live in the
    /// reference's type rather than its data word; this is checked at compile
    /// time. The returned reference borrows nothing, so `'a` is
    /// unconstrained.
    ///
    /// A capturing closure is not zero-sized and is rejected at compile
    /// time; bind it with [`FnRef::make_closure`] instead:
    ///
    /// ```compile_fail
    /// use fnref::FnRef;
    ///
    /// let offset = 10;
    /// let cb: FnRef<(i32,), i32> = FnRef::make_fn(move |x: i32| x + offset);
    /// cb.call(1);
    /// ```
    #[inline]
    pub fn make_fn<F>(target: F) -> Self
    where
        F: Callable<Args, Output = Ret>,
    {
        Self::from_raw(RawFnRef::of_fn(target))
    }

    /// Rebinds this reference to a compile-time-known function. See
    /// [`FnRef::make_fn`].
    #[inline]
    pub fn set_fn<F>(&mut self, target: F) -> &mut Self
    where
        F: Callable<Args, Output = Ret>,
    {
        *self = Self::make_fn(target);
        self
    }

    /// Creates a reference to a method (or receiver-taking free function)
    /// paired with a shared receiver.
    ///
    /// `method` must name the callable at compile time, so it must be
    /// zero-sized (a path like `Widget::refresh` is); only the receiver's
    /// address goes into the data word. The receiver stays borrowed for `'a`.
    ///
    /// A method taking `&mut self` does not satisfy [`Method`] and is
    /// rejected at compile time:
    ///
    /// ```compile_fail,E0277
    /// use fnref::FnRef;
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
    /// let counter = Counter { count: 0 };
    /// let cb: FnRef<(i32,), i32> = FnRef::make_method(&counter, Counter::bump);
    /// ```
    ///
    /// # Examples
    ///
    /// ```
    /// use fnref::FnRef;
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
    /// let scaler = Scaler { factor: 3 };
    /// let cb: FnRef<(i32,), i32> = FnRef::make_method(&scaler, Scaler::scale);
    /// assert_eq!(cb.call(7), 21);
    /// ```
    #[inline]
    pub fn make_method<T, M>(receiver: &'a T, method: M) -> Self
    where
        M: Method<T, Args, Output = Ret>,
    {
        // SAFETY: The receiver is borrowed for 'a, which the reference
        // carries, so it stays live and free of exclusive borrows for every
        // call.
        Self::from_raw(unsafe { RawFnRef::of_method(receiver, method) })
    }

    /// Rebinds this reference to a method with a shared receiver. See
    /// [`FnRef::make_method`].
    #[inline]
    pub fn set_method<T, M>(&mut self, receiver: &'a T, method: M) -> &mut Self
    where
        M: Method<T, Args, Output = Ret>,
    {
        *self = Self::make_method(receiver, method);
        self
    }

    /// Creates a reference to a method (or receiver-taking free function)
    /// paired with an exclusive receiver.
    ///
    /// # Safety
    ///
    /// `FnRef` is `Copy` and calling takes `&self`, so the borrow checker
    /// cannot see that each call re-creates a `&mut T`. The caller must
    /// ensure no two calls through this reference, or any copy of it,
    /// overlap (for example, a call made from within the bound method).
    #[inline]
    pub unsafe fn make_method_mut<T, M>(receiver: &'a mut T, method: M) -> Self
    where
        M: MethodMut<T, Args, Output = Ret>,
    {
        // SAFETY: The receiver is exclusively borrowed for 'a, which the
        // reference carries; the caller upholds that calls never overlap.
        Self::from_raw(unsafe { RawFnRef::of_method_mut(receiver, method) })
    }

    /// Rebinds this reference to a method with an exclusive receiver.
    ///
    /// # Safety
    ///
    /// Same contract as [`FnRef::make_method_mut`].
    #[inline]
    pub unsafe fn set_method_mut<T, M>(&mut self, receiver: &'a mut T, method: M) -> &mut Self
    where
        M: MethodMut<T, Args, Output = Ret>,
    {
        // SAFETY: Forwarded to the caller.
        *self = unsafe { Self::make_method_mut(receiver, method) };
        self
    }

    /// Creates a reference to a functor or capturing closure, borrowed for
    /// `'a`.
    ///
    /// The closure's address goes into the data word, so captures of any
    /// size are supported; the closure itself lives with the caller.
    ///
    /// # Examples
    ///
    /// ```
    /// use fnref::FnRef;
    ///
    /// let offset = 10;
    /// let target = move |x: i32| x + offset;
    /// let cb: FnRef<(i32,), i32> = FnRef::make_closure(&target);
    /// assert_eq!(cb.call(1), 11);
    /// ```
    #[inline]
    pub fn make_closure<F>(target: &'a F) -> Self
    where
        F: Callable<Args, Output = Ret>,
    {
        // SAFETY: The closure is borrowed for 'a, which the reference
        // carries, so it stays live and free of exclusive borrows for every
        // call.
        Self::from_raw(unsafe { RawFnRef::of_closure(target) })
    }

    /// Rebinds this reference to a borrowed functor or closure. See
    /// [`FnRef::make_closure`].
    #[inline]
    pub fn set_closure<F>(&mut self, target: &'a F) -> &mut Self
    where
        F: Callable<Args, Output = Ret>,
    {
        *self = Self::make_closure(target);
        self
    }

    /// Creates a reference to a mutating functor or closure, exclusively
    /// borrowed for `'a`.
    ///
    /// # Safety
    ///
    /// Same contract as [`FnRef::make_method_mut`]: the caller must ensure
    /// no two calls through this reference, or any copy of it, overlap.
    #[inline]
    pub unsafe fn make_closure_mut<F>(target: &'a mut F) -> Self
    where
        F: CallableMut<Args, Output = Ret>,
    {
        // SAFETY: The closure is exclusively borrowed for 'a, which the
        // reference carries; the caller upholds that calls never overlap.
        Self::from_raw(unsafe { RawFnRef::of_closure_mut(target) })
    }

    /// Rebinds this reference to a mutating functor or closure.
    ///
    /// # Safety
    ///
    /// Same contract as [`FnRef::make_method_mut`].
    #[inline]
    pub unsafe fn set_closure_mut<F>(&mut self, target: &'a mut F) -> &mut Self
    where
        F: CallableMut<Args, Output = Ret>,
    {
        // SAFETY: Forwarded to the caller.
        *self = unsafe { Self::make_closure_mut(target) };
        self
    }

    /// Pairs a stored method identity with a shared receiver, completing it
    /// into a callable reference.
    ///
    /// A null `method` yields a null reference regardless of the receiver.
    ///
    /// # Examples
    ///
    /// ```
    /// use fnref::{FnRef, MethodRef};
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
    /// let scaler = Scaler { factor: 5 };
    /// let cb = FnRef::make_bound(method, &scaler);
    /// assert_eq!(cb.call(8), 40);
    /// ```
    #[inline]
    pub fn make_bound<T>(method: MethodRef<T, Args, Ret>, receiver: &'a T) -> Self
    where
        Ret: Default,
    {
        if method.is_null() {
            Self::new()
        } else {
            // SAFETY: The method identity was created for receiver type `T`,
            // and the receiver is borrowed for 'a, which the reference
            // carries.
            Self::from_raw(unsafe { method.raw.bind(OpaqueCell::from_ref(receiver)) })
        }
    }

    /// Rebinds this reference from a method identity and a shared receiver.
    /// See [`FnRef::make_bound`].
    #[inline]
    pub fn set_bound<T>(&mut self, method: MethodRef<T, Args, Ret>, receiver: &'a T) -> &mut Self
    where
        Ret: Default,
    {
        *self = Self::make_bound(method, receiver);
        self
    }

    /// Pairs a stored exclusive-receiver method identity with its receiver,
    /// completing it into a callable reference.
    ///
    /// A null `method` yields a null reference regardless of the receiver.
    ///
    /// # Safety
    ///
    /// Same contract as [`FnRef::make_method_mut`].
    #[inline]
    pub unsafe fn make_bound_mut<T>(method: MethodRefMut<T, Args, Ret>, receiver: &'a mut T) -> Self
    where
        Ret: Default,
    {
        if method.is_null() {
            Self::new()
        } else {
            // SAFETY: The method identity was created for receiver type `T`;
            // the receiver is exclusively borrowed for 'a, which the
            // reference carries, and the caller upholds that calls never
            // overlap.
            Self::from_raw(unsafe { method.raw.bind(OpaqueCell::from_mut(receiver)) })
        }
    }

    /// Rebinds this reference from an exclusive-receiver method identity and
    /// its receiver.
    ///
    /// # Safety
    ///
    /// Same contract as [`FnRef::make_method_mut`].
    #[inline]
    pub unsafe fn set_bound_mut<T>(
        &mut self,
        method: MethodRefMut<T, Args, Ret>,
        receiver: &'a mut T,
    ) -> &mut Self
    where
        Ret: Default,
    {
        // SAFETY: Forwarded to the caller.
        *self = unsafe { Self::make_bound_mut(method, receiver) };
        self
    }

    /// Assembles a reference from a caller-written thunk and an untyped
    /// context word, for interoperating with C-style callback pairs.
    ///
    /// # Safety
    ///
    /// The caller must ensure `thunk` interprets `data` correctly, and that
    /// whatever `data` names stays valid and callable through for all of
    /// `'a`.
    #[inline]
    pub const unsafe fn from_raw_parts(thunk: Thunk<Args, Ret>, data: *const ()) -> Self {
        Self {
            // SAFETY: The pairing and liveness contract is guaranteed by the
            // caller.
            raw: unsafe { RawFnRef::from_raw_parts(thunk, OpaqueCell::from_ptr(data)) },
            _borrow: PhantomData,
        }
    }

    /// Returns whether `self` and `other` reference the same target: the
    /// same binding kind and the same function, method-receiver pair, or
    /// closure.
    ///
    /// Also available as `==`. Two null references of the same signature
    /// always compare equal. Equality never compares deeply: two distinct
    /// closures with identical behavior are unequal.
    #[inline]
    pub fn equal(&self, other: &FnRef<'_, Args, Ret>) -> bool {
        self.raw.equal(&other.raw)
    }

    /// Compares two references by representation: null orders first, then
    /// (thunk address, data word) lexicographically.
    ///
    /// The order is a strict total order, consistent with [`FnRef::equal`],
    /// and stable while the process runs. It carries no meaning beyond that;
    /// its purpose is to let references serve as keys in ordered containers.
    /// See [`ByAddress`](crate::ByAddress) for a wrapper that exposes it as
    /// [`Ord`].
    #[inline]
    pub fn address_cmp(&self, other: &FnRef<'_, Args, Ret>) -> Ordering
    where
        Ret: Default,
    {
        match (self.is_null(), other.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => {
                let lhs = (self.raw.thunk_addr(), self.raw.cell().addr());
                let rhs = (other.raw.thunk_addr(), other.raw.cell().addr());
                lhs.cmp(&rhs)
            }
        }
    }

    /// Returns whether `self` orders before `other` under
    /// [`FnRef::address_cmp`].
    #[inline]
    pub fn less(&self, other: &FnRef<'_, Args, Ret>) -> bool
    where
        Ret: Default,
    {
        self.address_cmp(other) == Ordering::Less
    }
}

impl<Args, Ret: Default> Default for FnRef<'_, Args, Ret> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<'b, Args, Ret> PartialEq<FnRef<'b, Args, Ret>> for FnRef<'_, Args, Ret> {
    #[inline]
    fn eq(&self, other: &FnRef<'b, Args, Ret>) -> bool {
        self.equal(other)
    }
}

impl<Args, Ret> Eq for FnRef<'_, Args, Ret> {}

impl<Args, Ret> fmt::Debug for FnRef<'_, Args, Ret> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRef")
            .field("thunk", &(self.raw.thunk_addr() as *const ()))
            .field("data", &self.raw.cell().as_ptr())
            .finish()
    }
}

/// The typed null literal, comparable against and convertible into any
/// nullable reference.
///
/// # Examples
///
/// ```
/// use fnref::{FnRef, Null};
///
/// let cb: FnRef<(i32,), i32> = FnRef::from(Null);
/// assert!(cb == Null);
///
/// let live: FnRef<(i32,), i32> = FnRef::make_fn(|x: i32| x);
/// assert!(live != Null);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Null;

impl<Args, Ret: Default> PartialEq<Null> for FnRef<'_, Args, Ret> {
    #[inline]
    fn eq(&self, _: &Null) -> bool {
        self.is_null()
    }
}

impl<'a, Args, Ret: Default> PartialEq<FnRef<'a, Args, Ret>> for Null {
    #[inline]
    fn eq(&self, other: &FnRef<'a, Args, Ret>) -> bool {
        other.is_null()
    }
}

impl<Args, Ret: Default> From<Null> for FnRef<'_, Args, Ret> {
    #[inline]
    fn from(_: Null) -> Self {
        Self::new()
    }
}
