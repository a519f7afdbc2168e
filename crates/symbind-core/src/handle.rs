//! # Owned Native Handles
//!
//! [`NativeObject`] is the host-side owner of one opaque native pointer.
//!
//! ## Lifecycle
//!
//! ```text
//!   wrap(ptr) ──► Open ──release()/drop──► Closed
//! ```
//!
//! - Only [`NativeObject::wrap`] produces an open object. It is `unsafe`
//!   because the caller vouches that the pointer came from a successful
//!   native allocation and is not owned by anyone else.
//! - [`NativeObject::new`] exists only to fail: there is no meaningful empty
//!   wrapper.
//! - [`NativeObject::release`] runs the kind's deallocator at most once.
//!   `Drop` calls it as a backstop, so an object that goes out of scope is
//!   still freed.
//! - Once closed, [`NativeObject::call_method`] fails with `ResourceClosed`
//!   and never touches the native library.
//!
//! The wrapper holds a `NonNull`, so it is neither `Send` nor `Sync`: a
//! handle stays on the thread whose error slot it reports through.

use std::fmt;
use std::ptr::NonNull;

use tracing::{trace, warn};

use crate::bridge::{call_native, ErrorSlot};
use crate::error::{BridgeError, BridgeResult};

/// Describes one kind of native resource.
pub trait NativeKind
{
    /// The opaque type the native library hands out pointers to.
    type Raw;

    /// The error slot the library reports through.
    type Slot: ErrorSlot + Default;

    /// Name used in error messages.
    const TYPE_NAME: &'static str;

    /// The native function releasing a `Raw`, if it needs releasing.
    const DEALLOC: Option<unsafe extern "C" fn(*mut Self::Raw)>;
}

/// State of a [`NativeObject`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState
{
    /// The native resource is alive and owned by this wrapper.
    Open,
    /// The native resource has been released.
    Closed,
}

/// Exclusive owner of one native resource of kind `K`.
pub struct NativeObject<K: NativeKind>
{
    ptr: Option<NonNull<K::Raw>>,
    slot: K::Slot,
}

impl<K: NativeKind> NativeObject<K>
{
    /// Public construction is not supported.
    ///
    /// ## Errors
    ///
    /// Always returns `Construction`. Objects come from native calls only.
    pub fn new() -> BridgeResult<Self>
    {
        Err(BridgeError::Construction {
            type_name: K::TYPE_NAME,
        })
    }

    /// Take ownership of a freshly allocated native resource.
    ///
    /// # Safety
    ///
    /// `ptr` must come from a successful native allocation of kind `K`,
    /// must not be owned by any other wrapper, and must not be freed by
    /// anyone else.
    pub unsafe fn wrap(ptr: NonNull<K::Raw>) -> Self
    {
        trace!(type_name = K::TYPE_NAME, ptr = ?ptr, "wrapping native handle");
        Self {
            ptr: Some(ptr),
            slot: K::Slot::default(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> HandleState
    {
        if self.ptr.is_some() {
            HandleState::Open
        } else {
            HandleState::Closed
        }
    }

    /// Whether the resource has been released.
    pub fn is_closed(&self) -> bool
    {
        self.state() == HandleState::Closed
    }

    /// The owned pointer.
    ///
    /// ## Errors
    ///
    /// `ResourceClosed` once released.
    pub fn as_ptr(&self) -> BridgeResult<*mut K::Raw>
    {
        self.ptr.map(NonNull::as_ptr).ok_or(BridgeError::ResourceClosed {
            type_name: K::TYPE_NAME,
        })
    }

    /// Call a native function with the owned pointer as first argument.
    ///
    /// The closure receives the pointer and must make exactly one native
    /// call; its result is checked through the error bridge.
    ///
    /// ## Errors
    ///
    /// - `ResourceClosed`: the handle was released (the closure is not run)
    /// - any error reported by the native call
    pub fn call_method<F, R>(&self, f: F) -> BridgeResult<R>
    where
        F: FnOnce(*mut K::Raw) -> R,
    {
        let ptr = self.as_ptr()?;
        call_native(&self.slot, || f(ptr))
    }

    /// Release the native resource. Idempotent.
    ///
    /// The handle is marked closed before the deallocator runs. If the
    /// deallocator reports an error it is logged and otherwise ignored: a
    /// failed free is never retried.
    pub fn release(&mut self)
    {
        let Some(ptr) = self.ptr.take() else {
            return;
        };

        if let Some(dealloc) = K::DEALLOC {
            trace!(type_name = K::TYPE_NAME, ptr = ?ptr, "releasing native handle");
            if let Err(err) = call_native(&self.slot, || unsafe { dealloc(ptr.as_ptr()) }) {
                warn!(type_name = K::TYPE_NAME, error = %err, "native deallocation reported an error");
            }
        }
    }
}

impl<K: NativeKind> Drop for NativeObject<K>
{
    fn drop(&mut self)
    {
        self.release();
    }
}

impl<K: NativeKind> fmt::Debug for NativeObject<K>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct(K::TYPE_NAME).field("ptr", &self.ptr).finish()
    }
}
