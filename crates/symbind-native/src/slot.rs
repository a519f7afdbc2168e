//! # Last-Error Slot
//!
//! The out-of-band channel through which native functions report failure.
//!
//! Each OS thread has its own slot, so a clear/call/check sequence issued
//! by one thread never observes an error recorded by another. Entry points
//! do not clear the slot on success; that is the caller's job
//! (`symbind_err_clear` before every call).
//!
//! Every exported function runs its body through [`landingpad`], which
//! converts both `Err` returns and panics into a slot entry plus a zero
//! return value.

use std::any::Any;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::ptr;

use tracing::debug;

use crate::error::{ErrorCode, NativeError, NativeResult};
use crate::string::SymbindStr;

/// The failure recorded for the current thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord
{
    /// Code reported by `symbind_err_get_last_code`.
    pub code: ErrorCode,
    /// Message reported by `symbind_err_get_last_message`.
    pub message: String,
}

impl From<&NativeError> for ErrorRecord
{
    fn from(err: &NativeError) -> Self
    {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

thread_local! {
    static LAST_ERROR: RefCell<Option<ErrorRecord>> = const { RefCell::new(None) };
}

/// Record `err` as the current thread's last error.
pub fn set_last_error(err: &NativeError)
{
    let record = ErrorRecord::from(err);
    debug!(code = record.code.value(), message = %record.message, "native call failed");
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(record));
}

/// Empty the current thread's slot.
pub fn clear_last_error()
{
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

/// A copy of the current thread's last error, if any.
#[must_use]
pub fn last_error() -> Option<ErrorRecord>
{
    LAST_ERROR.with(|slot| slot.borrow().clone())
}

/// Value returned from an entry point whose body failed.
pub trait FfiDefault
{
    /// The zero value for this return type.
    fn ffi_default() -> Self;
}

impl FfiDefault for ()
{
    fn ffi_default() -> Self {}
}

impl FfiDefault for bool
{
    fn ffi_default() -> Self
    {
        false
    }
}

impl FfiDefault for u32
{
    fn ffi_default() -> Self
    {
        0
    }
}

impl FfiDefault for u64
{
    fn ffi_default() -> Self
    {
        0
    }
}

impl FfiDefault for usize
{
    fn ffi_default() -> Self
    {
        0
    }
}

impl<T> FfiDefault for *mut T
{
    fn ffi_default() -> Self
    {
        ptr::null_mut()
    }
}

impl<T> FfiDefault for *const T
{
    fn ffi_default() -> Self
    {
        ptr::null()
    }
}

/// Run an entry point body, recording any error or panic in the slot.
///
/// Public so that entry points defined outside this crate (extensions
/// linked into the same library) follow the same convention.
pub fn landingpad<F, T>(f: F) -> T
where
    F: FnOnce() -> NativeResult<T>,
    T: FfiDefault,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(rv)) => rv,
        Ok(Err(err)) => {
            set_last_error(&err);
            T::ffi_default()
        }
        Err(payload) => {
            set_last_error(&NativeError::Panic(panic_message(payload.as_ref())));
            T::ffi_default()
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String
{
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Clear the calling thread's last error.
#[no_mangle]
pub extern "C" fn symbind_err_clear()
{
    landingpad(|| {
        clear_last_error();
        Ok(())
    });
}

/// The calling thread's last error code, `0` when there is none.
#[no_mangle]
pub extern "C" fn symbind_err_get_last_code() -> u32
{
    landingpad(|| Ok(last_error().map_or(ErrorCode::NoError.value(), |record| record.code.value())))
}

/// An owned copy of the calling thread's last error message.
///
/// Returns the empty string when there is no error. The result must be
/// released with `symbind_str_free`.
#[no_mangle]
pub extern "C" fn symbind_err_get_last_message() -> SymbindStr
{
    landingpad(|| Ok(last_error().map_or_else(SymbindStr::empty, |record| SymbindStr::from_string(record.message))))
}
