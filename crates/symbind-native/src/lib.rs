//! # symbind-native
//!
//! The native half of symbind: a small symbol-resolution library exposed
//! through a C ABI.
//!
//! This crate provides:
//! - A per-thread last-error slot (`symbind_err_*`)
//! - The `SymbindStr` string-passing convention (`symbind_str_*`)
//! - Symbol table handles read from object files (`symbind_symtab_*`)
//! - Rust symbol demangling (`symbind_demangle`)
//!
//! ## Calling Convention
//!
//! No function unwinds or returns a Rust `Result` across the boundary. The
//! caller clears the slot, makes the call, and then checks
//! `symbind_err_get_last_code()`. A non-zero code means the return value is
//! a zero value (null, `0`, empty string) and the message explains why.
//!
//! Every function returning a handle has exactly one matching `*_free`
//! function.
//!
//! ## Why unsafe code is needed
//!
//! Entry points receive raw pointers from foreign callers and hand out
//! boxed Rust objects as opaque pointers. The unsafe parts are confined to
//! pointer conversion at the top of each entry point.

#![allow(unsafe_code)] // Required for the C ABI
#![deny(unsafe_op_in_unsafe_fn)]

pub mod demangle;
pub mod error;
pub mod slot;
pub mod string;
pub mod symtab;

pub use demangle::symbind_demangle;
pub use error::{ErrorCode, NativeError, NativeResult};
pub use slot::{
    landingpad, symbind_err_clear, symbind_err_get_last_code, symbind_err_get_last_message, ErrorRecord, FfiDefault,
};
pub use string::{symbind_str_free, symbind_str_from_cstr, SymbindStr};
pub use symtab::{
    symbind_symtab_free, symbind_symtab_from_bytes, symbind_symtab_get_arch, symbind_symtab_lookup,
    symbind_symtab_open, symbind_symtab_symbol_count, SymbindLookupResult, SymbindSymbolTable, SymbolEntry,
    SymbolTable,
};
