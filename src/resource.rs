//! Ownership-transfer wrappers for raw OS resources.
//!
//! Each wrapper owns at most one raw resource and guarantees the native
//! release routine runs exactly once, whether through an explicit
//! [`Owned::release`] call, a transfer, or drop. [`Owned::detach`] hands
//! the raw value back to the caller and relieves the wrapper of its
//! obligation.

#![cfg_attr(not(windows), allow(dead_code))]

use core::ffi::c_void;
use core::marker::PhantomData;
use core::ptr;

/// A native release routine for one kind of raw resource.
pub(crate) trait Release {
    /// The raw value marking "no resource held".
    const EMPTY: *mut c_void = ptr::null_mut();

    /// Whether `raw` is a sentinel rather than a live resource. Handle
    /// kinds also recognize the reserved invalid-handle value.
    fn is_empty(raw: *mut c_void) -> bool {
        raw == Self::EMPTY
    }

    /// Releases `raw`, which is non-empty. Returns whether the native
    /// call succeeded.
    ///
    /// # Safety
    /// `raw` must be a live resource of this kind, released at most once.
    unsafe fn release(raw: *mut c_void) -> bool;
}

/// An owned raw resource of kind `R`, pointing at values of type `T`.
pub(crate) struct Owned<T, R: Release> {
    raw: *mut c_void,
    _marker: PhantomData<(*mut T, R)>,
}

impl<T, R: Release> Owned<T, R> {
    /// An empty wrapper holding nothing.
    pub(crate) fn empty() -> Self {
        Self {
            raw: R::EMPTY,
            _marker: PhantomData,
        }
    }

    /// Takes ownership of `raw`; releasing it becomes this wrapper's job.
    ///
    /// # Safety
    /// `raw` must be either `R::EMPTY` or a live resource of kind `R`
    /// not owned elsewhere.
    pub(crate) unsafe fn acquire(raw: *mut c_void) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    #[allow(dead_code)]
    pub(crate) fn is_valid(&self) -> bool {
        !R::is_empty(self.raw)
    }

    pub(crate) fn as_ptr(&self) -> *mut T {
        self.raw.cast()
    }

    /// A location the acquiring OS call writes the raw value into.
    pub(crate) fn slot(&mut self) -> &mut *mut c_void {
        &mut self.raw
    }

    /// Hands the raw resource to the caller; the wrapper becomes empty
    /// and will not release it.
    pub(crate) fn detach(&mut self) -> *mut c_void {
        let raw = self.raw;
        self.raw = R::EMPTY;
        raw
    }

    /// Releases the held resource now. Returns `false` when the native
    /// release call failed; the wrapper is empty afterwards either way,
    /// so a second call is a no-op that reports success.
    pub(crate) fn release(&mut self) -> bool {
        let raw = self.detach();
        if R::is_empty(raw) {
            return true;
        }
        // SAFETY: `raw` came from detach on a wrapper that owned it, so
        // it is live and will not be released again.
        unsafe { R::release(raw) }
    }

    /// Moves the resource out of `other` into `self`, releasing whatever
    /// `self` held before.
    #[allow(dead_code)]
    pub(crate) fn transfer(&mut self, other: &mut Self) {
        if ptr::eq(self, other) {
            return;
        }
        self.release();
        self.raw = other.detach();
    }
}

impl<T, R: Release> Drop for Owned<T, R> {
    fn drop(&mut self) {
        self.release();
    }
}

/// A growable array of owned resources, each released exactly once.
#[allow(dead_code)]
pub(crate) struct OwnedArray<T, R: Release> {
    items: Vec<Owned<T, R>>,
}

#[allow(dead_code)]
impl<T, R: Release> OwnedArray<T, R> {
    pub(crate) fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Releases every held resource, then restarts with `len` empty
    /// wrappers.
    pub(crate) fn resize(&mut self, len: usize) {
        self.items.clear();
        self.items.resize_with(len, Owned::empty);
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&Owned<T, R>> {
        self.items.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Owned<T, R>> {
        self.items.get_mut(index)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Owned<T, R>> {
        self.items.iter()
    }
}

cfg_if::cfg_if! {
    if #[cfg(windows)] {
        use windows_sys::Win32::Foundation::{CloseHandle, LocalFree, INVALID_HANDLE_VALUE};
        use windows_sys::Win32::NetworkManagement::NetManagement::{NetApiBufferFree, NERR_Success};

        /// Memory from `LocalAlloc` or OS calls documented to require
        /// `LocalFree`.
        pub(crate) struct LocalMem;

        impl Release for LocalMem {
            unsafe fn release(raw: *mut c_void) -> bool {
                // SAFETY: caller guarantees `raw` is live LocalAlloc memory.
                unsafe { LocalFree(raw).is_null() }
            }
        }

        /// Buffers returned by the NetApi family, freed with
        /// `NetApiBufferFree`.
        pub(crate) struct NetApiMem;

        impl Release for NetApiMem {
            unsafe fn release(raw: *mut c_void) -> bool {
                // SAFETY: caller guarantees `raw` came from a NetApi call.
                unsafe { NetApiBufferFree(raw) == NERR_Success }
            }
        }

        /// Kernel object handles closed with `CloseHandle`.
        pub(crate) struct HandleKind;

        impl Release for HandleKind {
            fn is_empty(raw: *mut c_void) -> bool {
                raw.is_null() || raw == INVALID_HANDLE_VALUE
            }

            unsafe fn release(raw: *mut c_void) -> bool {
                // SAFETY: caller guarantees `raw` is an open handle.
                unsafe { CloseHandle(raw) != 0 }
            }
        }

        /// An owned kernel handle.
        pub(crate) type Handle = Owned<c_void, HandleKind>;
    }
}

#[cfg(test)]
#[allow(
    clippy::undocumented_unsafe_blocks,
    reason = "The counting kind never dereferences its raw values"
)]
pub(crate) mod tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};

    /// A release kind with its own counter, so tests running on
    /// parallel threads never observe each other's releases.
    macro_rules! counting_kind {
        ($kind:ident, $counter:ident) => {
            static $counter: AtomicUsize = AtomicUsize::new(0);

            struct $kind;

            impl Release for $kind {
                unsafe fn release(_raw: *mut c_void) -> bool {
                    $counter.fetch_add(1, Ordering::SeqCst);
                    true
                }
            }
        };
    }

    fn fake_raw(n: usize) -> *mut c_void {
        n as *mut c_void
    }

    #[test]
    fn release_runs_exactly_once() {
        counting_kind!(ReleaseKind, RELEASED);
        let mut owned: Owned<c_void, ReleaseKind> = unsafe { Owned::acquire(fake_raw(1)) };
        assert!(owned.is_valid(), "holds the resource");
        assert!(owned.release(), "first release succeeds");
        assert!(!owned.is_valid(), "empty after release");
        assert!(owned.release(), "second release is a no-op");
        drop(owned);
        assert_eq!(
            RELEASED.load(Ordering::SeqCst),
            1,
            "one native release across release, re-release and drop"
        );
    }

    #[test]
    fn detach_relieves_the_wrapper() {
        counting_kind!(DetachKind, RELEASED);
        let mut owned: Owned<c_void, DetachKind> = unsafe { Owned::acquire(fake_raw(2)) };
        assert_eq!(owned.detach(), fake_raw(2), "detach returns the raw value");
        drop(owned);
        assert_eq!(
            RELEASED.load(Ordering::SeqCst),
            0,
            "detached resource is the caller's problem"
        );
    }

    #[test]
    fn transfer_moves_ownership_and_frees_the_target() {
        counting_kind!(TransferKind, RELEASED);
        let mut a: Owned<c_void, TransferKind> = unsafe { Owned::acquire(fake_raw(3)) };
        let mut b: Owned<c_void, TransferKind> = unsafe { Owned::acquire(fake_raw(4)) };
        a.transfer(&mut b);
        assert!(a.is_valid(), "receiver holds the moved resource");
        assert!(!b.is_valid(), "source is empty");
        assert_eq!(
            RELEASED.load(Ordering::SeqCst),
            1,
            "receiver's old resource was freed by the transfer"
        );
        drop(a);
        drop(b);
        assert_eq!(
            RELEASED.load(Ordering::SeqCst),
            2,
            "both raw values freed exactly once overall"
        );
    }

    #[cfg(windows)]
    #[test]
    fn invalid_handle_value_is_a_sentinel() {
        use windows_sys::Win32::Foundation::INVALID_HANDLE_VALUE;

        assert!(HandleKind::is_empty(core::ptr::null_mut()), "null");
        assert!(HandleKind::is_empty(INVALID_HANDLE_VALUE), "reserved value");
        // SAFETY: a sentinel is never released, so no live handle is needed.
        let mut handle = unsafe { Handle::acquire(INVALID_HANDLE_VALUE) };
        assert!(!handle.is_valid(), "sentinel handles hold nothing");
        assert!(handle.release(), "releasing a sentinel is a successful no-op");
    }

    #[test]
    fn array_resize_disposes_previous_contents() {
        counting_kind!(ArrayKind, RELEASED);
        let mut arr: OwnedArray<c_void, ArrayKind> = OwnedArray::new();
        arr.resize(2);
        assert_eq!(arr.len(), 2, "two empty slots");
        assert!(arr.get(2).is_none(), "out of bounds is None");
        for i in 0..2 {
            if let Some(slot) = arr.get_mut(i) {
                *slot = unsafe { Owned::acquire(fake_raw(10 + i)) };
            }
        }
        assert_eq!(arr.iter().filter(|o| o.is_valid()).count(), 2);
        arr.resize(1);
        assert_eq!(
            RELEASED.load(Ordering::SeqCst),
            2,
            "resize released both previous resources"
        );
        assert!(
            arr.get(0).is_some_and(|o| !o.is_valid()),
            "fresh slots are empty"
        );
    }
}
