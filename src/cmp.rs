//! Ordered-container support for callable references.

use core::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

use crate::fn_ref::FnRef;

/// Wraps an [`FnRef`] to expose its representation order as [`Ord`] and
/// [`Hash`], for use as a key in ordered and hashed containers.
///
/// `FnRef` itself deliberately implements neither: its order
/// ([`FnRef::address_cmp`]) is an arbitrary strict total order over (thunk
/// address, data word) with no meaning beyond container placement, and
/// hiding it behind a named wrapper keeps that explicit at the use site.
///
/// # Examples
///
/// ```
/// extern crate alloc;
///
/// use alloc::collections::BTreeSet;
///
/// use fnref::{ByAddress, FnRef};
///
/// fn on_tick(_count: u32) {}
/// fn on_tock(_count: u32) {}
///
/// let mut subscribers: BTreeSet<ByAddress<FnRef<'_, (u32,)>>> = BTreeSet::new();
/// subscribers.insert(ByAddress(FnRef::make_fn(on_tick)));
/// subscribers.insert(ByAddress(FnRef::make_fn(on_tock)));
/// subscribers.insert(ByAddress(FnRef::make_fn(on_tick)));
/// assert_eq!(subscribers.len(), 2);
///
/// for subscriber in &subscribers {
///     subscriber.0.call(1);
/// }
/// ```
#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct ByAddress<D>(pub D);

impl<D> From<D> for ByAddress<D> {
    #[inline]
    fn from(inner: D) -> Self {
        Self(inner)
    }
}

impl<'b, Args, Ret> PartialEq<ByAddress<FnRef<'b, Args, Ret>>> for ByAddress<FnRef<'_, Args, Ret>> {
    #[inline]
    fn eq(&self, other: &ByAddress<FnRef<'b, Args, Ret>>) -> bool {
        self.0.equal(&other.0)
    }
}

impl<Args, Ret> Eq for ByAddress<FnRef<'_, Args, Ret>> {}

impl<Args, Ret: Default> PartialOrd for ByAddress<FnRef<'_, Args, Ret>> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Args, Ret: Default> Ord for ByAddress<FnRef<'_, Args, Ret>> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.address_cmp(&other.0)
    }
}

impl<Args, Ret> Hash for ByAddress<FnRef<'_, Args, Ret>> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.raw.thunk_addr().hash(state);
        self.0.raw.cell().addr().hash(state);
    }
}

impl<D: fmt::Debug> fmt::Debug for ByAddress<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ByAddress").field(&self.0).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(x: i32, y: i32) -> i32 {
        x + y
    }

    fn sub(x: i32, y: i32) -> i32 {
        x - y
    }

    #[test]
    fn test_ord_matches_address_cmp() {
        let a = ByAddress(FnRef::<'_, (i32, i32), i32>::make_fn(add));
        let b = ByAddress(FnRef::<'_, (i32, i32), i32>::make_fn(sub));
        let null = ByAddress(FnRef::<(i32, i32), i32>::new());
        assert_eq!(a.cmp(&b), a.0.address_cmp(&b.0));
        assert!(null < a);
        assert!(null < b);
        assert_eq!(a.cmp(&a), Ordering::Equal);
    }

    #[test]
    fn test_equal_refs_hash_alike() {
        use core::hash::{Hash, Hasher};

        /// Collects the written words so two hashes can be compared without
        /// a hasher implementation.
        #[derive(Default)]
        struct Recorder(u64);

        impl Hasher for Recorder {
            fn finish(&self) -> u64 {
                self.0
            }

            fn write(&mut self, bytes: &[u8]) {
                for &b in bytes {
                    self.0 = self.0.rotate_left(8) ^ u64::from(b);
                }
            }
        }

        let a = ByAddress(FnRef::<'_, (i32, i32), i32>::make_fn(add));
        let b = ByAddress(FnRef::<'_, (i32, i32), i32>::make_fn(add));
        let mut ha = Recorder::default();
        let mut hb = Recorder::default();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(a, b);
        assert_eq!(ha.finish(), hb.finish());
    }
}
