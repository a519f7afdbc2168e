//! Common module for library exports

pub use crate::bridge::{call_native, rustcall, ErrorSlot, NativeSlot};
pub use crate::error::{BridgeError, BridgeResult, EncodingError, NativeErrorKind};
pub use crate::handle::{HandleState, NativeKind, NativeObject};
pub use crate::marshal::{decode_str, encode_path, encode_str, take_str};
pub use crate::paths::{is_windows_style, join, strip_prefix, PathStyle};
pub use crate::symbols::{demangle, Symbol, SymbolTable};
