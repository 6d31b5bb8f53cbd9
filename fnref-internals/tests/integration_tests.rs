//! Tests exercising the raw layer through its public surface, the way the
//! `fnref` crate drives it.

use std::{cell::Cell, mem::size_of};

use fnref_internals::{OpaqueCell, RawFnRef, RawMethodRef, Thunk};
use static_assertions::{assert_eq_size, assert_impl_all, assert_not_impl_any};

struct Gauge {
    level: Cell<i32>,
}

impl Gauge {
    fn headroom(&self, limit: i32) -> i32 {
        limit - self.level.get()
    }
}

fn add(x: i32, y: i32) -> i32 {
    x + y
}

assert_eq_size!(RawFnRef<(i32,), i32>, [usize; 2]);
assert_eq_size!(Option<RawFnRef<(i32,), i32>>, [usize; 2]);
assert_eq_size!(RawMethodRef<(i32,), i32>, usize);
assert_impl_all!(RawFnRef<(i32,), i32>: Copy);
assert_not_impl_any!(RawFnRef<(i32,), i32>: Send, Sync);

#[test]
fn every_binding_kind_dispatches() {
    let gauge = Gauge {
        level: Cell::new(10),
    };
    let capture = 5;
    let closure = move |x: i32, y: i32| x + y + capture;

    let null = RawFnRef::<(i32, i32), i32>::null();
    let item = RawFnRef::<(i32, i32), i32>::of_fn(add);
    // SAFETY: `fn(i32, i32) -> i32` is a function pointer type.
    let pointer = unsafe { RawFnRef::<(i32, i32), i32>::of_fn_ptr::<fn(i32, i32) -> i32>(add) };
    // SAFETY: `gauge` outlives every reference in this test and is never
    // exclusively borrowed.
    let method = unsafe {
        RawFnRef::<(i32, i32), i32>::of_method(&gauge, |g: &Gauge, x: i32, y: i32| {
            g.headroom(x) + y
        })
    };
    // SAFETY: `closure` outlives every reference in this test and is never
    // exclusively borrowed.
    let borrowed = unsafe { RawFnRef::<(i32, i32), i32>::of_closure(&closure) };

    assert_eq!(null.call((1, 2)), 0);
    assert_eq!(item.call((1, 2)), 3);
    assert_eq!(pointer.call((1, 2)), 3);
    assert_eq!(method.call((30, 2)), 22);
    assert_eq!(borrowed.call((1, 2)), 8);
}

#[test]
fn bit_copies_dispatch_like_the_original() {
    let gauge = Gauge {
        level: Cell::new(3),
    };
    // SAFETY: `gauge` outlives both copies and is never exclusively
    // borrowed.
    let original = unsafe { RawFnRef::<(i32,), i32>::of_method(&gauge, Gauge::headroom) };
    let copy = original;
    assert!(original.equal(&copy));
    assert_eq!(copy.call((10,)), 7);

    // The copy references the same object, not a snapshot.
    gauge.level.set(4);
    assert_eq!(original.call((10,)), 6);
    assert_eq!(copy.call((10,)), 6);
}

#[test]
fn deferred_method_binds_to_any_receiver() {
    let captured = RawMethodRef::<(i32,), i32>::of_method::<Gauge, _>(Gauge::headroom);
    let low = Gauge {
        level: Cell::new(1),
    };
    let high = Gauge {
        level: Cell::new(90),
    };
    // SAFETY: Both cells name live `Gauge` values matching the thunk's
    // receiver type, borrowed for the duration of each call.
    unsafe {
        assert_eq!(captured.call(OpaqueCell::from_ref(&low), (100,)), 99);
        assert_eq!(captured.call(OpaqueCell::from_ref(&high), (100,)), 10);
    }
}

#[test]
fn caller_written_thunk_round_trips() {
    fn double_context(cell: OpaqueCell, args: (i32,)) -> i32 {
        // SAFETY: The cell below was built from a live i32.
        let context = unsafe { cell.as_ref::<i32>() };
        context * 2 + args.0
    }
    let context = 20;
    let thunk: Thunk<(i32,), i32> = double_context;
    // SAFETY: The thunk reads the cell as the `&context` it was built from,
    // and `context` outlives the reference.
    let cb = unsafe { RawFnRef::from_raw_parts(thunk, OpaqueCell::from_ref(&context)) };
    assert_eq!(cb.call((2,)), 42);
}
