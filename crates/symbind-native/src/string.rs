//! # String Passing
//!
//! `SymbindStr` is the single string type crossing the C ABI in both
//! directions: a pointer, a byte length, and an ownership flag. The bytes
//! are UTF-8 and are not NUL-terminated.
//!
//! ## Ownership
//!
//! - `owned == true`: the buffer was allocated by this library and must be
//!   released exactly once with [`symbind_str_free`].
//! - `owned == false`: the buffer is borrowed from something else (a symbol
//!   table handle, a static, or a buffer the host passed in) and is valid for
//!   as long as that owner is.

use std::ffi::CStr;
use std::{ptr, slice, str};

use libc::c_char;

use crate::slot::{landingpad, FfiDefault};
use crate::NativeError;

/// A UTF-8 string passed across the C ABI.
#[repr(C)]
#[derive(Debug)]
pub struct SymbindStr
{
    /// Pointer to the first byte, or null for the empty string.
    pub data: *mut c_char,
    /// Number of bytes at `data`.
    pub len: usize,
    /// Whether the receiver must free the buffer.
    pub owned: bool,
}

impl SymbindStr
{
    /// The empty string. Never needs freeing.
    #[must_use]
    pub const fn empty() -> Self
    {
        Self {
            data: ptr::null_mut(),
            len: 0,
            owned: false,
        }
    }

    /// Borrow a Rust string slice.
    ///
    /// The result aliases `s` and must not outlive it.
    #[must_use]
    pub fn borrowed(s: &str) -> Self
    {
        Self {
            data: s.as_ptr() as *mut c_char,
            len: s.len(),
            owned: false,
        }
    }

    /// Hand ownership of `s` to the receiver.
    #[must_use]
    pub fn from_string(s: String) -> Self
    {
        if s.is_empty() {
            return Self::empty();
        }

        let boxed = s.into_boxed_str();
        let len = boxed.len();
        let data = Box::into_raw(boxed) as *mut u8 as *mut c_char;
        Self { data, len, owned: true }
    }

    /// The raw bytes of the string.
    ///
    /// # Safety
    ///
    /// `data` must point to `len` readable bytes (or be null with `len == 0`)
    /// for the lifetime of the returned slice.
    #[must_use]
    pub unsafe fn as_bytes(&self) -> &[u8]
    {
        if self.data.is_null() || self.len == 0 {
            return &[];
        }
        unsafe { slice::from_raw_parts(self.data as *const u8, self.len) }
    }

    /// The string as `&str`, validating UTF-8.
    ///
    /// # Safety
    ///
    /// Same requirements as [`SymbindStr::as_bytes`].
    pub unsafe fn as_str(&self) -> Result<&str, NativeError>
    {
        Ok(str::from_utf8(unsafe { self.as_bytes() })?)
    }

    /// Release the buffer if it is owned, leaving an empty borrowed string.
    ///
    /// # Safety
    ///
    /// An owned `SymbindStr` must have been produced by
    /// [`SymbindStr::from_string`] and not freed before.
    pub unsafe fn free(&mut self)
    {
        if self.owned && !self.data.is_null() {
            let raw = ptr::slice_from_raw_parts_mut(self.data as *mut u8, self.len) as *mut str;
            drop(unsafe { Box::from_raw(raw) });
        }
        *self = Self::empty();
    }
}

impl Default for SymbindStr
{
    fn default() -> Self
    {
        Self::empty()
    }
}

impl FfiDefault for SymbindStr
{
    fn ffi_default() -> Self
    {
        Self::empty()
    }
}

/// Borrow a NUL-terminated C string as a `SymbindStr`.
///
/// Fails with `InvalidUtf8` when the bytes are not UTF-8. The result is
/// borrowed and stays valid as long as `s` does.
///
/// # Safety
///
/// `s` must be null or point to a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn symbind_str_from_cstr(s: *const c_char) -> SymbindStr
{
    landingpad(|| {
        if s.is_null() {
            return Err(NativeError::NullPointer("s"));
        }
        let text = unsafe { CStr::from_ptr(s) }.to_str()?;
        Ok(SymbindStr::borrowed(text))
    })
}

/// Release an owned `SymbindStr`. Borrowed strings are left alone.
///
/// # Safety
///
/// `s` must be null or point to a `SymbindStr` returned by this library.
#[no_mangle]
pub unsafe extern "C" fn symbind_str_free(s: *mut SymbindStr)
{
    landingpad(|| {
        if let Some(s) = unsafe { s.as_mut() } {
            unsafe { s.free() };
        }
        Ok(())
    });
}

#[cfg(test)]
mod tests
{
    use std::ffi::CString;

    use super::*;

    #[test]
    fn test_owned_round_trip()
    {
        let mut s = SymbindStr::from_string("core::fmt::write".to_string());
        assert!(s.owned);
        assert_eq!(unsafe { s.as_str() }.unwrap(), "core::fmt::write");

        unsafe { symbind_str_free(&mut s) };
        assert!(s.data.is_null());
        assert!(!s.owned);
    }

    #[test]
    fn test_empty_string_is_not_owned()
    {
        let s = SymbindStr::from_string(String::new());
        assert!(!s.owned);
        assert_eq!(unsafe { s.as_bytes() }, b"");
    }

    #[test]
    fn test_borrowed_free_is_noop()
    {
        let text = "borrowed";
        let mut s = SymbindStr::borrowed(text);
        unsafe { symbind_str_free(&mut s) };
        assert_eq!(text, "borrowed");
        assert_eq!(s.len, 0);
    }

    #[test]
    fn test_from_cstr()
    {
        let c = CString::new("libfoo.so").unwrap();
        let s = unsafe { symbind_str_from_cstr(c.as_ptr()) };
        assert!(!s.owned);
        assert_eq!(unsafe { s.as_str() }.unwrap(), "libfoo.so");
    }

    #[test]
    fn test_from_cstr_rejects_invalid_utf8()
    {
        let c = CString::new(vec![0xff, 0xfe]).unwrap();
        let s = unsafe { symbind_str_from_cstr(c.as_ptr()) };
        assert!(s.data.is_null());
        assert_eq!(crate::symbind_err_get_last_code(), crate::ErrorCode::InvalidUtf8.value());
    }
}
