//! # symbind-core
//!
//! Safe host-side bindings over the `symbind-native` C ABI.
//!
//! This crate provides:
//! - The error bridge: clear, call, check the last-error slot ([`bridge`])
//! - Exclusive owners for native handles with exactly-once release ([`handle`])
//! - String and path marshalling ([`marshal`])
//! - Cross-platform path heuristics for debug-info paths ([`paths`])
//! - Typed symbol table bindings ([`symbols`])
//!
//! ## Example
//!
//! ```rust,no_run
//! use symbind_core::symbols::SymbolTable;
//!
//! let mut table = SymbolTable::open("/usr/lib/libc.so.6")?;
//! let _symbol = table.lookup(0x29d90)?;
//! table.close();
//! assert!(table.lookup(0x29d90).is_err());
//! # Ok::<(), symbind_core::BridgeError>(())
//! ```
//!
//! ## Why unsafe code is needed
//!
//! Every native call goes through raw pointers. The unsafe blocks are
//! limited to the call sites in [`symbols`] and to [`handle`], which owns
//! the pointers.

#![allow(unsafe_code)] // Required to call the native library
#![deny(unsafe_op_in_unsafe_fn)]

pub mod bridge;
pub mod error;
pub mod handle;
pub mod marshal;
pub mod paths;
pub mod prelude;
pub mod symbols;

pub use bridge::{call_native, rustcall, ErrorSlot, NativeSlot};
pub use error::{BridgeError, BridgeResult, EncodingError, NativeErrorKind};
pub use handle::{HandleState, NativeKind, NativeObject};
pub use symbols::{demangle, Symbol, SymbolTable};
