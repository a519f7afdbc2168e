//! # Error Types
//!
//! Error handling for the host side of the binding.
//!
//! Native failures arrive as a numeric code plus a message (see
//! [`crate::bridge`]). This module turns the code into a [`NativeErrorKind`]
//! through a fixed table, and defines the errors the binding raises on its
//! own without consulting the native layer.

use std::str::Utf8Error;

use symbind_native::ErrorCode;
use thiserror::Error;

/// Kind of failure reported by the native library
///
/// One variant per known code. Codes missing from [`CODE_TABLE`] surface as
/// [`BridgeError::UnknownNative`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeErrorKind
{
    /// A panic was caught inside the native library.
    Panic,
    /// The native library gave no more specific reason.
    Unknown,
    /// An argument was rejected.
    InvalidArgument,
    /// A required pointer was null.
    NullPointer,
    /// A filesystem read failed.
    Io,
    /// A string argument was not UTF-8.
    InvalidUtf8,
    /// An object file could not be parsed.
    ObjectParse,
    /// An object file has an unsupported format or architecture.
    UnsupportedObject,
}

/// Code to kind mapping, versioned with the native ABI.
pub const CODE_TABLE: &[(u32, NativeErrorKind)] = &[
    (ErrorCode::Panic as u32, NativeErrorKind::Panic),
    (ErrorCode::Unknown as u32, NativeErrorKind::Unknown),
    (ErrorCode::InvalidArgument as u32, NativeErrorKind::InvalidArgument),
    (ErrorCode::NullPointer as u32, NativeErrorKind::NullPointer),
    (ErrorCode::Io as u32, NativeErrorKind::Io),
    (ErrorCode::InvalidUtf8 as u32, NativeErrorKind::InvalidUtf8),
    (ErrorCode::ObjectParse as u32, NativeErrorKind::ObjectParse),
    (ErrorCode::UnsupportedObject as u32, NativeErrorKind::UnsupportedObject),
];

impl NativeErrorKind
{
    /// Look up the kind for a non-zero native error code.
    #[must_use]
    pub fn from_code(code: u32) -> Option<Self>
    {
        CODE_TABLE.iter().find(|(known, _)| *known == code).map(|(_, kind)| *kind)
    }

    /// The native code for this kind.
    #[must_use]
    pub fn code(self) -> u32
    {
        CODE_TABLE
            .iter()
            .find(|(_, kind)| *kind == self)
            .map_or(ErrorCode::Unknown as u32, |(code, _)| *code)
    }
}

/// Errors raised while marshalling strings and paths
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError
{
    /// A path or C string contained an interior NUL byte
    ///
    /// The native side reads NUL-terminated strings, so anything after the
    /// NUL would be silently dropped.
    #[error("NUL byte at offset {position} is not allowed in paths")]
    NulByte
    {
        /// Byte offset of the first NUL
        position: usize,
    },

    /// Bytes received from the native library were not UTF-8
    #[error("invalid UTF-8 from native library: {0}")]
    InvalidUtf8(#[from] Utf8Error),
}

/// Main error type for binding operations
///
/// ## Error Categories
///
/// 1. **Native errors**: Native, UnknownNative (reported through the slot)
/// 2. **Lifecycle errors**: ResourceClosed, Construction (raised locally)
/// 3. **Encoding errors**: Encoding (raised locally, or while decoding a
///    native message)
#[derive(Error, Debug)]
pub enum BridgeError
{
    /// The native library reported a known error code
    #[error("{kind:?}: {message}")]
    Native
    {
        /// Kind mapped from the code
        kind: NativeErrorKind,
        /// Message from the native library
        message: String,
    },

    /// The native library reported a code missing from [`CODE_TABLE`]
    ///
    /// Usually means the native library is newer than this binding.
    #[error("unknown native error {code}: {message}")]
    UnknownNative
    {
        /// The raw code
        code: u32,
        /// Message from the native library
        message: String,
    },

    /// A method was called on a handle that was already released
    #[error("{type_name} is closed")]
    ResourceClosed
    {
        /// Name of the wrapper type
        type_name: &'static str,
    },

    /// A wrapper was constructed directly instead of by a native call
    #[error("cannot instantiate {type_name} objects directly")]
    Construction
    {
        /// Name of the wrapper type
        type_name: &'static str,
    },

    /// A string or path could not be marshalled
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

impl BridgeError
{
    /// Build the error for a non-zero native code.
    #[must_use]
    pub fn from_native(code: u32, message: String) -> Self
    {
        match NativeErrorKind::from_code(code) {
            Some(kind) => BridgeError::Native { kind, message },
            None => BridgeError::UnknownNative { code, message },
        }
    }

    /// The native kind, if this error came from the native library.
    #[must_use]
    pub fn native_kind(&self) -> Option<NativeErrorKind>
    {
        match self {
            BridgeError::Native { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Convenience type alias for `Result<T, BridgeError>`
pub type BridgeResult<T> = std::result::Result<T, BridgeError>;
