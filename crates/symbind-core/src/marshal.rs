//! # Marshalling
//!
//! Conversion between Rust strings/paths and the native conventions:
//!
//! - `SymbindStr` (pointer + length, UTF-8, not NUL-terminated) for text in
//!   both directions
//! - NUL-terminated byte strings for paths
//!
//! Decoding copies the bytes into a Rust `String` straight away, so nothing
//! returned from here borrows native memory.

use std::ffi::CString;
use std::marker::PhantomData;
use std::path::Path;
use std::str;

use symbind_native::SymbindStr;

use crate::error::{BridgeResult, EncodingError};

/// A `SymbindStr` borrowing a Rust string for the duration of a call.
#[derive(Debug)]
pub struct EncodedStr<'a>
{
    raw: SymbindStr,
    _source: PhantomData<&'a str>,
}

impl EncodedStr<'_>
{
    /// Pointer suitable for a `*const SymbindStr` parameter.
    #[must_use]
    pub fn as_ptr(&self) -> *const SymbindStr
    {
        &self.raw
    }

    /// The borrowed native string.
    #[must_use]
    pub fn as_raw(&self) -> &SymbindStr
    {
        &self.raw
    }
}

/// Encode `s` for passing into a native call. No copy is made.
#[must_use]
pub fn encode_str(s: &str) -> EncodedStr<'_>
{
    EncodedStr {
        raw: SymbindStr::borrowed(s),
        _source: PhantomData,
    }
}

/// Copy a native string into a `String` without taking ownership of it.
///
/// ## Errors
///
/// `Encoding(InvalidUtf8)` if the bytes are not UTF-8.
///
/// # Safety
///
/// `s` must describe `len` readable bytes (or be null with length zero).
pub unsafe fn decode_str(s: &SymbindStr) -> BridgeResult<String>
{
    let bytes = unsafe { s.as_bytes() };
    let text = str::from_utf8(bytes).map_err(EncodingError::from)?;
    Ok(text.to_owned())
}

/// Copy a native string into a `String`, then free it if it is owned.
///
/// The buffer is freed even when decoding fails.
///
/// # Safety
///
/// Same as [`decode_str`]; an owned `s` must not have been freed already.
pub unsafe fn take_str(mut s: SymbindStr) -> BridgeResult<String>
{
    let decoded = unsafe { decode_str(&s) };
    unsafe { symbind_native::symbind_str_free(&mut s) };
    decoded
}

/// Encode raw path bytes as a NUL-terminated string.
///
/// ## Errors
///
/// `Encoding(NulByte)` if `bytes` contains a NUL.
pub fn encode_path_bytes(bytes: &[u8]) -> BridgeResult<CString>
{
    CString::new(bytes).map_err(|err| {
        EncodingError::NulByte {
            position: err.nul_position(),
        }
        .into()
    })
}

/// Encode a filesystem path for a native call.
///
/// ## Errors
///
/// `Encoding(NulByte)` if the path contains a NUL.
pub fn encode_path<P: AsRef<Path>>(path: P) -> BridgeResult<CString>
{
    encode_path_bytes(path.as_ref().as_os_str().as_encoded_bytes())
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::error::BridgeError;

    #[test]
    fn test_round_trip()
    {
        for text in ["", "main", "core::fmt::write", "ünïcödé ✓", "tab\tand\nnewline"] {
            let encoded = encode_str(text);
            assert_eq!(unsafe { decode_str(encoded.as_raw()) }.unwrap(), text);
        }
    }

    #[test]
    fn test_round_trip_keeps_interior_nul()
    {
        // SymbindStr is length-delimited, so NUL is ordinary data here.
        let text = "a\0b";
        let encoded = encode_str(text);
        assert_eq!(encoded.as_raw().len, 3);
        assert_eq!(unsafe { decode_str(encoded.as_raw()) }.unwrap(), text);
    }

    #[test]
    fn test_decode_invalid_utf8()
    {
        let bytes = [0x66, 0x6f, 0xff];
        let raw = SymbindStr {
            data: bytes.as_ptr() as *mut _,
            len: bytes.len(),
            owned: false,
        };
        let err = unsafe { decode_str(&raw) }.unwrap_err();
        assert!(matches!(err, BridgeError::Encoding(EncodingError::InvalidUtf8(_))));
    }

    #[test]
    fn test_take_owned()
    {
        let owned = SymbindStr::from_string("owned by native".to_string());
        assert_eq!(unsafe { take_str(owned) }.unwrap(), "owned by native");
    }

    #[test]
    fn test_encode_path()
    {
        let encoded = encode_path("/usr/lib/libc.so.6").unwrap();
        assert_eq!(encoded.as_bytes(), b"/usr/lib/libc.so.6");

        let encoded = encode_path(r"C:\Windows\System32\kernel32.dll").unwrap();
        assert_eq!(encoded.as_bytes(), br"C:\Windows\System32\kernel32.dll");
    }

    #[test]
    fn test_encode_path_rejects_nul()
    {
        for path in ["\0", "/usr/lib\0/libc.so", "trailing\0"] {
            let err = encode_path(path).unwrap_err();
            match err {
                BridgeError::Encoding(EncodingError::NulByte { position }) => {
                    assert_eq!(path.as_bytes()[position], 0);
                }
                _ => panic!("Expected NulByte error for {path:?}"),
            }
        }

        assert!(encode_path_bytes(b"lib\0foo").is_err());
    }
}
