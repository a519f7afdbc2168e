//! Symbol demangling.
//!
//! Only Rust mangling (legacy `_ZN...E` and v0 `_R...`) is understood. Names
//! in any other scheme are reported as not demangled rather than as an error.

use rustc_demangle::try_demangle;

use crate::error::NativeError;
use crate::slot::landingpad;
use crate::string::SymbindStr;

/// Demangle a Rust symbol, without the trailing hash.
///
/// Returns `None` when `raw` is not a Rust mangled name.
pub fn demangle_symbol(raw: &str) -> Option<String>
{
    try_demangle(raw).ok().map(|demangled| format!("{demangled:#}"))
}

/// Demangle `ident`.
///
/// Returns an owned string, or the empty string when `ident` is not a
/// mangled name.
///
/// # Safety
///
/// `ident` must be null or point to a valid `SymbindStr`.
#[no_mangle]
pub unsafe extern "C" fn symbind_demangle(ident: *const SymbindStr) -> SymbindStr
{
    landingpad(|| {
        let ident = unsafe { ident.as_ref() }.ok_or(NativeError::NullPointer("ident"))?;
        let raw = unsafe { ident.as_str() }?;
        Ok(demangle_symbol(raw).map_or_else(SymbindStr::empty, SymbindStr::from_string))
    })
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_demangle_legacy_rust()
    {
        assert_eq!(
            demangle_symbol("_ZN4core3fmt5write17h0123456789abcdefE").as_deref(),
            Some("core::fmt::write")
        );
    }

    #[test]
    fn test_plain_c_symbol_is_not_demangled()
    {
        assert_eq!(demangle_symbol("main"), None);
    }

    #[test]
    fn test_demangle_over_abi()
    {
        let input = "_ZN4core3fmt5write17h0123456789abcdefE";
        let ident = SymbindStr::borrowed(input);
        let mut out = unsafe { symbind_demangle(&ident) };
        assert!(out.owned);
        assert_eq!(unsafe { out.as_str() }.unwrap(), "core::fmt::write");
        unsafe { out.free() };

        let ident = SymbindStr::borrowed("memcpy");
        let out = unsafe { symbind_demangle(&ident) };
        assert_eq!(out.len, 0);
    }
}
