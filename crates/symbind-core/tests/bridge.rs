//! Tests for the error bridge

use std::cell::{Cell, RefCell};
use std::ptr;

use symbind_core::{call_native, rustcall, BridgeError, EncodingError, ErrorSlot, NativeErrorKind};

/// An in-memory last-error slot that records how it was used.
#[derive(Default)]
struct ScriptedSlot
{
    code: Cell<u32>,
    message: RefCell<Vec<u8>>,
    log: RefCell<Vec<&'static str>>,
}

impl ScriptedSlot
{
    fn fail(&self, code: u32, message: &[u8])
    {
        self.code.set(code);
        *self.message.borrow_mut() = message.to_vec();
    }

    fn log(&self) -> Vec<&'static str>
    {
        self.log.borrow().clone()
    }
}

impl ErrorSlot for ScriptedSlot
{
    fn clear(&self)
    {
        self.log.borrow_mut().push("clear");
        self.code.set(0);
        self.message.borrow_mut().clear();
    }

    fn last_code(&self) -> u32
    {
        self.log.borrow_mut().push("code");
        self.code.get()
    }

    fn last_message(&self) -> Vec<u8>
    {
        self.log.borrow_mut().push("message");
        self.message.borrow().clone()
    }
}

#[test]
fn test_success_returns_value()
{
    let slot = ScriptedSlot::default();
    let rv = call_native(&slot, || {
        slot.log.borrow_mut().push("call");
        42
    });
    assert_eq!(rv.unwrap(), 42);
    // The message is never read on success.
    assert_eq!(slot.log(), vec!["clear", "call", "code"]);
}

#[test]
fn test_stale_error_is_cleared_before_call()
{
    let slot = ScriptedSlot::default();
    slot.fail(101, b"left over from an earlier call");

    let rv = call_native(&slot, || "fresh");
    assert_eq!(rv.unwrap(), "fresh");
}

#[test]
fn test_known_code_maps_to_kind()
{
    let slot = ScriptedSlot::default();
    let err = call_native(&slot, || slot.fail(201, b"bad magic")).unwrap_err();

    match err {
        BridgeError::Native { kind, message } => {
            assert_eq!(kind, NativeErrorKind::ObjectParse);
            assert_eq!(message, "bad magic");
        }
        other => panic!("Expected Native error, got {other:?}"),
    }
    assert_eq!(slot.log(), vec!["clear", "code", "message"]);
}

#[test]
fn test_native_panic_is_an_error()
{
    let slot = ScriptedSlot::default();
    let err = call_native(&slot, || slot.fail(1, b"panic: index out of bounds")).unwrap_err();
    assert_eq!(err.native_kind(), Some(NativeErrorKind::Panic));
    assert!(err.to_string().contains("index out of bounds"));
}

#[test]
fn test_unknown_code_falls_back()
{
    let slot = ScriptedSlot::default();
    let err = call_native(&slot, || slot.fail(31337, "nouveau code ✓".as_bytes())).unwrap_err();

    match err {
        BridgeError::UnknownNative { code, message } => {
            assert_eq!(code, 31337);
            assert_eq!(message, "nouveau code ✓");
        }
        other => panic!("Expected UnknownNative error, got {other:?}"),
    }
}

#[test]
fn test_invalid_utf8_message_is_not_swallowed()
{
    let slot = ScriptedSlot::default();
    let err = call_native(&slot, || slot.fail(2, &[b'o', b'o', 0xff, 0xfe])).unwrap_err();
    assert!(matches!(err, BridgeError::Encoding(EncodingError::InvalidUtf8(_))));
}

#[test]
fn test_rustcall_against_native_library()
{
    let err = rustcall(|| unsafe { symbind_native::symbind_symtab_open(ptr::null()) }).unwrap_err();
    assert_eq!(err.native_kind(), Some(NativeErrorKind::NullPointer));
    assert!(err.to_string().contains("path"));

    // The next call starts from a clean slot and succeeds.
    let count = rustcall(|| symbind_native::symbind_err_get_last_code()).unwrap();
    assert_eq!(count, 0);
    assert_eq!(symbind_native::symbind_err_get_last_code(), 0);
}

#[test]
fn test_rustcall_surfaces_native_panic()
{
    let err = rustcall(|| {
        symbind_native::landingpad(|| -> symbind_native::NativeResult<*mut u8> { panic!("table index 7 out of range") })
    })
    .unwrap_err();

    match &err {
        BridgeError::Native { kind, message } => {
            assert_eq!(*kind, NativeErrorKind::Panic);
            assert!(message.contains("table index 7 out of range"));
        }
        other => panic!("Expected Native panic error, got {other:?}"),
    }

    // The panic did not poison the slot for the next call.
    assert_eq!(rustcall(|| 5).unwrap(), 5);
}
