//! # Symbol Tables
//!
//! The one resource kind this library hands out: a sorted table of function
//! symbols read from an object file (ELF, Mach-O, PE, ...).
//!
//! ## ABI
//!
//! | function | returns |
//! |---|---|
//! | `symbind_symtab_open` | new handle, from a path |
//! | `symbind_symtab_from_bytes` | new handle, from an in-memory image |
//! | `symbind_symtab_free` | releases a handle from either of the above |
//! | `symbind_symtab_get_arch` | borrowed architecture name |
//! | `symbind_symtab_symbol_count` | number of symbols |
//! | `symbind_symtab_lookup` | the symbol covering an address |
//!
//! Handles are opaque (`SymbindSymbolTable`) and must be released exactly
//! once with `symbind_symtab_free`. Strings returned from a handle borrow
//! from it.

use std::ffi::CStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use libc::c_char;
use object::{Object, ObjectSymbol, SymbolKind};
use tracing::debug;

use crate::error::{NativeError, NativeResult};
use crate::slot::{landingpad, FfiDefault};
use crate::string::SymbindStr;

/// A function symbol with its address range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry
{
    /// Raw (possibly mangled) symbol name.
    pub name: String,
    /// Start address as recorded in the object file.
    pub address: u64,
    /// Length in bytes; `0` when unknown.
    pub size: u64,
}

/// Function symbols of one object file, ordered by address.
#[derive(Debug, Clone)]
pub struct SymbolTable
{
    arch: String,
    symbols: Vec<SymbolEntry>,
    /// `reach[i]` is the highest end address among `symbols[..=i]`.
    reach: Vec<u64>,
}

impl SymbolTable
{
    /// Read and parse the object file at `path`.
    ///
    /// ## Errors
    ///
    /// - `Io`: the file can't be read
    /// - `ObjectParse`: the contents are not an object file
    /// - `UnsupportedObject`: the architecture is not recognised
    pub fn open(path: &Path) -> NativeResult<Self>
    {
        let data = fs::read(path).map_err(|err| io::Error::new(err.kind(), format!("{}: {err}", path.display())))?;
        let table = Self::parse(&data)?;
        debug!(path = %path.display(), symbols = table.len(), arch = %table.arch, "loaded symbol table");
        Ok(table)
    }

    /// Parse an object file held in memory.
    pub fn parse(data: &[u8]) -> NativeResult<Self>
    {
        let file = object::File::parse(data)?;
        let arch = architecture_name(file.architecture())?;

        let symbols = file
            .symbols()
            .chain(file.dynamic_symbols())
            .filter(|symbol| symbol.kind() == SymbolKind::Text && symbol.is_definition())
            .filter_map(|symbol| {
                let name = symbol.name().ok()?;
                if name.is_empty() {
                    return None;
                }
                Some(SymbolEntry {
                    name: name.to_string(),
                    address: symbol.address(),
                    size: symbol.size(),
                })
            })
            .collect();

        Ok(Self::from_entries(arch, symbols))
    }

    /// Build a table from already-extracted entries.
    ///
    /// Entries are sorted by address and exact duplicates (the same symbol
    /// from both the static and dynamic tables) are merged, keeping the one
    /// with a known size. Entries without a size extend up to the next
    /// higher address.
    pub fn from_entries(arch: impl Into<String>, mut symbols: Vec<SymbolEntry>) -> Self
    {
        symbols.sort_by(|a, b| {
            a.address
                .cmp(&b.address)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| b.size.cmp(&a.size))
        });
        symbols.dedup_by(|a, b| a.address == b.address && a.name == b.name);

        let starts: Vec<u64> = symbols.iter().map(|symbol| symbol.address).collect();
        for (index, symbol) in symbols.iter_mut().enumerate() {
            if symbol.size != 0 {
                continue;
            }
            if let Some(next) = starts[index + 1..].iter().find(|&&start| start > symbol.address) {
                symbol.size = next - symbol.address;
            }
        }

        let reach = symbols
            .iter()
            .scan(0u64, |reach, symbol| {
                *reach = (*reach).max(symbol.address.saturating_add(symbol.size.max(1)));
                Some(*reach)
            })
            .collect();

        Self {
            arch: arch.into(),
            symbols,
            reach,
        }
    }

    /// Architecture name, e.g. `x86_64` or `arm64`.
    pub fn arch(&self) -> &str
    {
        &self.arch
    }

    /// Number of symbols in the table.
    pub fn len(&self) -> usize
    {
        self.symbols.len()
    }

    /// Whether the table holds no symbols.
    pub fn is_empty(&self) -> bool
    {
        self.symbols.is_empty()
    }

    /// Find the innermost symbol whose range contains `address`.
    ///
    /// Symbols may nest (local labels or aliases inside a function); the one
    /// starting closest below `address` wins. A symbol of unknown size (only
    /// possible for the highest one) matches its start address only.
    pub fn lookup(&self, address: u64) -> Option<&SymbolEntry>
    {
        let end = self.symbols.partition_point(|symbol| symbol.address <= address);
        (0..end)
            .rev()
            .take_while(|&index| self.reach[index] > address)
            .map(|index| &self.symbols[index])
            .find(|symbol| {
                let offset = address - symbol.address;
                offset < symbol.size || offset == 0
            })
    }
}

fn architecture_name(arch: object::Architecture) -> NativeResult<String>
{
    let name = match arch {
        object::Architecture::Aarch64 => "arm64",
        object::Architecture::X86_64 => "x86_64",
        object::Architecture::I386 => "x86",
        object::Architecture::Arm => "arm",
        object::Architecture::Unknown => {
            return Err(NativeError::UnsupportedObject("unknown architecture".to_string()));
        }
        other => return Ok(format!("{other:?}").to_lowercase()),
    };
    Ok(name.to_string())
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> NativeResult<PathBuf>
{
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    Ok(PathBuf::from(OsStr::from_bytes(bytes)))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> NativeResult<PathBuf>
{
    Ok(PathBuf::from(std::str::from_utf8(bytes)?))
}

/// Opaque handle to a [`SymbolTable`].
#[repr(C)]
pub struct SymbindSymbolTable
{
    _private: [u8; 0],
}

/// Result of `symbind_symtab_lookup`.
///
/// `name` borrows from the table handle.
#[repr(C)]
#[derive(Debug, Default)]
pub struct SymbindLookupResult
{
    /// Whether a symbol covers the address; all other fields are zero if not.
    pub found: bool,
    /// Start address of the symbol.
    pub sym_addr: u64,
    /// Size of the symbol in bytes.
    pub sym_size: u64,
    /// Raw symbol name.
    pub name: SymbindStr,
}

impl FfiDefault for SymbindLookupResult
{
    fn ffi_default() -> Self
    {
        Self::default()
    }
}

fn into_handle(table: SymbolTable) -> *mut SymbindSymbolTable
{
    Box::into_raw(Box::new(table)).cast()
}

/// # Safety
///
/// `handle` must be null or a live handle from this module.
unsafe fn table_ref<'a>(handle: *const SymbindSymbolTable) -> NativeResult<&'a SymbolTable>
{
    unsafe { handle.cast::<SymbolTable>().as_ref() }.ok_or(NativeError::NullPointer("symtab"))
}

/// Load a symbol table from the object file at `path`.
///
/// # Safety
///
/// `path` must be null or a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn symbind_symtab_open(path: *const c_char) -> *mut SymbindSymbolTable
{
    landingpad(|| {
        if path.is_null() {
            return Err(NativeError::NullPointer("path"));
        }
        let path = path_from_bytes(unsafe { CStr::from_ptr(path) }.to_bytes())?;
        SymbolTable::open(&path).map(into_handle)
    })
}

/// Load a symbol table from `len` bytes at `bytes`.
///
/// # Safety
///
/// `bytes` must point to `len` readable bytes, or be null with `len == 0`.
#[no_mangle]
pub unsafe extern "C" fn symbind_symtab_from_bytes(bytes: *const u8, len: usize) -> *mut SymbindSymbolTable
{
    landingpad(|| {
        let data: &[u8] = if bytes.is_null() {
            if len != 0 {
                return Err(NativeError::NullPointer("bytes"));
            }
            &[]
        } else {
            unsafe { std::slice::from_raw_parts(bytes, len) }
        };
        SymbolTable::parse(data).map(into_handle)
    })
}

/// Release a symbol table handle. Null is ignored.
///
/// # Safety
///
/// `handle` must be null or a handle from this module that was not freed.
#[no_mangle]
pub unsafe extern "C" fn symbind_symtab_free(handle: *mut SymbindSymbolTable)
{
    landingpad(|| {
        if !handle.is_null() {
            drop(unsafe { Box::from_raw(handle.cast::<SymbolTable>()) });
        }
        Ok(())
    })
}

/// Architecture name of the table, borrowed from the handle.
///
/// # Safety
///
/// `handle` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn symbind_symtab_get_arch(handle: *const SymbindSymbolTable) -> SymbindStr
{
    landingpad(|| Ok(SymbindStr::borrowed(unsafe { table_ref(handle) }?.arch())))
}

/// Number of symbols in the table.
///
/// # Safety
///
/// `handle` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn symbind_symtab_symbol_count(handle: *const SymbindSymbolTable) -> usize
{
    landingpad(|| Ok(unsafe { table_ref(handle) }?.len()))
}

/// Find the symbol covering `addr`.
///
/// # Safety
///
/// `handle` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn symbind_symtab_lookup(handle: *const SymbindSymbolTable, addr: u64) -> SymbindLookupResult
{
    landingpad(|| {
        let table = unsafe { table_ref(handle) }?;
        Ok(table.lookup(addr).map_or_else(SymbindLookupResult::default, |symbol| SymbindLookupResult {
            found: true,
            sym_addr: symbol.address,
            sym_size: symbol.size,
            name: SymbindStr::borrowed(&symbol.name),
        }))
    })
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn entry(name: &str, address: u64, size: u64) -> SymbolEntry
    {
        SymbolEntry {
            name: name.to_string(),
            address,
            size,
        }
    }

    fn sample() -> SymbolTable
    {
        SymbolTable::from_entries(
            "x86_64",
            vec![
                entry("gamma", 0x3000, 0),
                entry("alpha", 0x1000, 0x10),
                entry("beta", 0x2000, 0),
                entry("alpha", 0x1000, 0x10),
            ],
        )
    }

    #[test]
    fn test_entries_sorted_and_deduplicated()
    {
        let table = sample();
        assert_eq!(table.len(), 3);
        assert_eq!(table.arch(), "x86_64");
    }

    #[test]
    fn test_lookup_within_explicit_size()
    {
        let table = sample();
        assert_eq!(table.lookup(0x1000).unwrap().name, "alpha");
        assert_eq!(table.lookup(0x100f).unwrap().name, "alpha");
        assert!(table.lookup(0x1010).is_none());
        assert!(table.lookup(0x0fff).is_none());
    }

    #[test]
    fn test_lookup_infers_size_from_next_symbol()
    {
        let table = sample();
        let beta = table.lookup(0x2fff).unwrap();
        assert_eq!(beta.name, "beta");
        assert_eq!(beta.size, 0x1000);
    }

    #[test]
    fn test_last_symbol_without_size_matches_start_only()
    {
        let table = sample();
        assert_eq!(table.lookup(0x3000).unwrap().name, "gamma");
        assert!(table.lookup(0x3001).is_none());
    }

    #[test]
    fn test_lookup_nested_symbols()
    {
        let table = SymbolTable::from_entries(
            "x86_64",
            vec![
                entry("outer", 0x1000, 0x100),
                entry("inner", 0x1010, 0x10),
                entry("after", 0x2000, 0x10),
            ],
        );
        assert_eq!(table.lookup(0x1008).unwrap().name, "outer");
        assert_eq!(table.lookup(0x1010).unwrap().name, "inner");
        assert_eq!(table.lookup(0x101f).unwrap().name, "inner");
        assert_eq!(table.lookup(0x1020).unwrap().name, "outer");
        assert_eq!(table.lookup(0x1050).unwrap().name, "outer");
        assert_eq!(table.lookup(0x10ff).unwrap().name, "outer");
        assert!(table.lookup(0x1100).is_none());
        assert!(table.lookup(0x1fff).is_none());
        assert_eq!(table.lookup(0x2004).unwrap().name, "after");
    }

    #[test]
    fn test_duplicate_keeps_sized_entry()
    {
        // Static entry without a size, dynamic entry with one.
        let table = SymbolTable::from_entries(
            "x86_64",
            vec![
                entry("memcpy", 0x1000, 0),
                entry("memcpy", 0x1000, 0x40),
                entry("memset", 0x2000, 0x40),
            ],
        );
        assert_eq!(table.len(), 2);

        let memcpy = table.lookup(0x1000).unwrap();
        assert_eq!(memcpy.size, 0x40);
        assert!(table.lookup(0x1040).is_none());
        assert!(table.lookup(0x1800).is_none());
    }

    #[test]
    fn test_parse_garbage_fails()
    {
        let err = SymbolTable::parse(b"definitely not an object file").unwrap_err();
        assert_eq!(err.code(), crate::ErrorCode::ObjectParse);
    }

    #[test]
    fn test_null_handle_reports_error()
    {
        crate::symbind_err_clear();
        let count = unsafe { symbind_symtab_symbol_count(std::ptr::null()) };
        assert_eq!(count, 0);
        assert_eq!(crate::symbind_err_get_last_code(), crate::ErrorCode::NullPointer.value());
        crate::symbind_err_clear();
    }
}
