//! # Symbols
//!
//! Typed wrappers over the native symbol-table API.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use symbind_core::symbols::SymbolTable;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>>
//! {
//!     let table = SymbolTable::open("/usr/lib/libc.so.6")?;
//!     println!("{} symbols for {}", table.symbol_count()?, table.arch()?);
//!
//!     if let Some(symbol) = table.lookup(0x29d90)? {
//!         println!("{} + {:#x}", symbol.display_name(), 0x29d90 - symbol.address);
//!     }
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::path::Path;
use std::ptr::NonNull;

use symbind_native::{
    symbind_demangle, symbind_symtab_free, symbind_symtab_from_bytes, symbind_symtab_get_arch, symbind_symtab_lookup,
    symbind_symtab_open, symbind_symtab_symbol_count, SymbindSymbolTable,
};

use crate::bridge::{rustcall, NativeSlot};
use crate::error::{BridgeError, BridgeResult, NativeErrorKind};
use crate::handle::{NativeKind, NativeObject};
use crate::marshal::{decode_str, encode_path, encode_str, take_str};

/// Handle kind for native symbol tables.
#[derive(Debug)]
pub struct SymbolTableKind;

impl NativeKind for SymbolTableKind
{
    type Raw = SymbindSymbolTable;
    type Slot = NativeSlot;

    const TYPE_NAME: &'static str = "SymbolTable";
    const DEALLOC: Option<unsafe extern "C" fn(*mut SymbindSymbolTable)> =
        Some(symbind_symtab_free as unsafe extern "C" fn(*mut SymbindSymbolTable));
}

/// A symbol resolved from a [`SymbolTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol
{
    /// Raw name as stored in the object file.
    pub name: String,
    /// Demangled name, when the raw name is a Rust mangled name.
    pub demangled: Option<String>,
    /// Start address.
    pub address: u64,
    /// Size in bytes.
    pub size: u64,
}

impl Symbol
{
    /// Preferred presentation (demangled, falling back to raw).
    pub fn display_name(&self) -> &str
    {
        self.demangled.as_deref().unwrap_or(&self.name)
    }
}

impl fmt::Display for Symbol
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.display_name())
    }
}

/// Function symbols of one object file, owned by the native library.
///
/// The native table is freed when this value is dropped or [`closed`].
///
/// [`closed`]: SymbolTable::close
#[derive(Debug)]
pub struct SymbolTable
{
    inner: NativeObject<SymbolTableKind>,
}

impl SymbolTable
{
    /// Load the symbol table of the object file at `path`.
    ///
    /// ## Errors
    ///
    /// - `Encoding(NulByte)`: the path contains a NUL byte
    /// - `Native { kind: Io }`: the file could not be read
    /// - `Native { kind: ObjectParse | UnsupportedObject }`: not a usable object file
    pub fn open<P: AsRef<Path>>(path: P) -> BridgeResult<Self>
    {
        let path = encode_path(path)?;
        let raw = rustcall(|| unsafe { symbind_symtab_open(path.as_ptr()) })?;
        Self::from_raw(raw)
    }

    /// Load the symbol table of an object file held in memory.
    pub fn from_bytes(data: &[u8]) -> BridgeResult<Self>
    {
        let raw = rustcall(|| unsafe { symbind_symtab_from_bytes(data.as_ptr(), data.len()) })?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: *mut SymbindSymbolTable) -> BridgeResult<Self>
    {
        let ptr = NonNull::new(raw).ok_or_else(|| BridgeError::Native {
            kind: NativeErrorKind::Unknown,
            message: "native library returned a null handle without reporting an error".to_string(),
        })?;
        Ok(Self {
            inner: unsafe { NativeObject::wrap(ptr) },
        })
    }

    /// Architecture of the object file, e.g. `x86_64` or `arm64`.
    pub fn arch(&self) -> BridgeResult<String>
    {
        let arch = self.inner.call_method(|ptr| unsafe { symbind_symtab_get_arch(ptr) })?;
        unsafe { decode_str(&arch) }
    }

    /// Number of function symbols.
    pub fn symbol_count(&self) -> BridgeResult<usize>
    {
        self.inner.call_method(|ptr| unsafe { symbind_symtab_symbol_count(ptr) })
    }

    /// Find the symbol covering `address`.
    ///
    /// Returns `Ok(None)` when no symbol covers it.
    pub fn lookup(&self, address: u64) -> BridgeResult<Option<Symbol>>
    {
        let result = self.inner.call_method(|ptr| unsafe { symbind_symtab_lookup(ptr, address) })?;
        if !result.found {
            return Ok(None);
        }

        // The name borrows from the table; copy it before anything else.
        let name = unsafe { decode_str(&result.name) }?;
        let demangled = demangle(&name)?;
        Ok(Some(Symbol {
            name,
            demangled,
            address: result.sym_addr,
            size: result.sym_size,
        }))
    }

    /// Release the native table now instead of at drop.
    pub fn close(&mut self)
    {
        self.inner.release();
    }

    /// Whether [`close`](Self::close) has run.
    pub fn is_closed(&self) -> bool
    {
        self.inner.is_closed()
    }
}

/// Demangle a Rust symbol name.
///
/// Returns `Ok(None)` for names that are not Rust mangled names.
pub fn demangle(name: &str) -> BridgeResult<Option<String>>
{
    let ident = encode_str(name);
    let demangled = rustcall(|| unsafe { symbind_demangle(ident.as_ptr()) })?;
    let demangled = unsafe { take_str(demangled) }?;
    Ok(if demangled.is_empty() { None } else { Some(demangled) })
}
