//! # Error Bridge
//!
//! Every native call goes through [`call_native`]:
//!
//! 1. clear the last-error slot
//! 2. call the native function and keep its return value
//! 3. read the error code
//! 4. code `0`: hand the value back
//! 5. otherwise decode the message and fail with the mapped [`BridgeError`]
//!
//! The slot is abstracted behind [`ErrorSlot`] so the same sequence can run
//! against the real library ([`NativeSlot`]) or an in-memory stand-in.
//!
//! ## Threading
//!
//! The native slot is per OS thread. The clear/call/check sequence must run
//! on one thread without another native call in between, which holds as
//! long as a closure passed to [`call_native`] makes exactly one native
//! call.

use tracing::debug;

use crate::error::{BridgeError, BridgeResult, EncodingError};

/// Access to a native library's last-error state.
pub trait ErrorSlot
{
    /// Forget any recorded error.
    fn clear(&self);

    /// The recorded error code, `0` for none.
    fn last_code(&self) -> u32;

    /// The raw bytes of the recorded message.
    fn last_message(&self) -> Vec<u8>;
}

/// The last-error slot of the linked `symbind-native` library.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeSlot;

impl ErrorSlot for NativeSlot
{
    fn clear(&self)
    {
        symbind_native::symbind_err_clear();
    }

    fn last_code(&self) -> u32
    {
        symbind_native::symbind_err_get_last_code()
    }

    fn last_message(&self) -> Vec<u8>
    {
        let mut message = symbind_native::symbind_err_get_last_message();
        // The message is an owned copy; copy out and free it right away.
        let bytes = unsafe { message.as_bytes() }.to_vec();
        unsafe { symbind_native::symbind_str_free(&mut message) };
        bytes
    }
}

/// Run one native call with error checking against `slot`.
///
/// ## Errors
///
/// - `Native`: the call set a known error code
/// - `UnknownNative`: the call set a code missing from the table
/// - `Encoding`: the error message was not UTF-8
pub fn call_native<S, F, R>(slot: &S, f: F) -> BridgeResult<R>
where
    S: ErrorSlot + ?Sized,
    F: FnOnce() -> R,
{
    slot.clear();
    let rv = f();
    let code = slot.last_code();
    if code == 0 {
        return Ok(rv);
    }

    let message = String::from_utf8(slot.last_message()).map_err(|err| EncodingError::InvalidUtf8(err.utf8_error()))?;
    debug!(code, %message, "native call reported an error");
    Err(BridgeError::from_native(code, message))
}

/// [`call_native`] against the linked native library.
pub fn rustcall<F, R>(f: F) -> BridgeResult<R>
where
    F: FnOnce() -> R,
{
    call_native(&NativeSlot, f)
}
