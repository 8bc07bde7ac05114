//! Cryptoki v2.40 C types.
//!
//! Layouts follow `pkcs11t.h`. Windows builds of Cryptoki pack structures to
//! one byte, so every structure is `packed` there; fields are only ever read
//! by value, never borrowed.
//!
//! `CK_FUNCTION_LIST` is generated together with the exported entry points
//! (see `proxy_abi`) so its field order cannot drift from theirs.

#![allow(non_camel_case_types, non_snake_case)]

use std::ffi::{c_ulong, c_void};

use pkcs11_logger_core::translate;

pub use crate::proxy_abi::CK_FUNCTION_LIST;

pub type CK_BYTE = u8;
pub type CK_BBOOL = CK_BYTE;
pub type CK_UTF8CHAR = CK_BYTE;
pub type CK_ULONG = c_ulong;
pub type CK_FLAGS = CK_ULONG;
pub type CK_RV = CK_ULONG;
pub type CK_SLOT_ID = CK_ULONG;
pub type CK_SESSION_HANDLE = CK_ULONG;
pub type CK_OBJECT_HANDLE = CK_ULONG;
pub type CK_USER_TYPE = CK_ULONG;
pub type CK_STATE = CK_ULONG;
pub type CK_MECHANISM_TYPE = CK_ULONG;
pub type CK_ATTRIBUTE_TYPE = CK_ULONG;
pub type CK_NOTIFICATION = CK_ULONG;

pub type CK_VOID_PTR = *mut c_void;
pub type CK_BYTE_PTR = *mut CK_BYTE;
pub type CK_UTF8CHAR_PTR = *mut CK_UTF8CHAR;
pub type CK_ULONG_PTR = *mut CK_ULONG;
pub type CK_SLOT_ID_PTR = *mut CK_SLOT_ID;
pub type CK_SESSION_HANDLE_PTR = *mut CK_SESSION_HANDLE;
pub type CK_OBJECT_HANDLE_PTR = *mut CK_OBJECT_HANDLE;
pub type CK_MECHANISM_TYPE_PTR = *mut CK_MECHANISM_TYPE;
pub type CK_ATTRIBUTE_PTR = *mut CK_ATTRIBUTE;
pub type CK_MECHANISM_PTR = *mut CK_MECHANISM;
pub type CK_INFO_PTR = *mut CK_INFO;
pub type CK_SLOT_INFO_PTR = *mut CK_SLOT_INFO;
pub type CK_TOKEN_INFO_PTR = *mut CK_TOKEN_INFO;
pub type CK_SESSION_INFO_PTR = *mut CK_SESSION_INFO;
pub type CK_MECHANISM_INFO_PTR = *mut CK_MECHANISM_INFO;
pub type CK_FUNCTION_LIST_PTR = *mut CK_FUNCTION_LIST;
pub type CK_FUNCTION_LIST_PTR_PTR = *mut CK_FUNCTION_LIST_PTR;

/// Application callback passed to `C_OpenSession`.
pub type CK_NOTIFY =
    Option<unsafe extern "C" fn(CK_SESSION_HANDLE, CK_NOTIFICATION, CK_VOID_PTR) -> CK_RV>;

/// The one symbol every Cryptoki module must export by name.
pub type CK_C_GetFunctionList = unsafe extern "C" fn(CK_FUNCTION_LIST_PTR_PTR) -> CK_RV;

pub const CK_FALSE: CK_BBOOL = 0;
pub const CK_TRUE: CK_BBOOL = 1;
pub const CK_UNAVAILABLE_INFORMATION: CK_ULONG = !0;

pub const CKR_OK: CK_RV = translate::CKR_OK as CK_RV;
pub const CKR_GENERAL_ERROR: CK_RV = translate::CKR_GENERAL_ERROR as CK_RV;
pub const CKR_ARGUMENTS_BAD: CK_RV = translate::CKR_ARGUMENTS_BAD as CK_RV;
pub const CKR_FUNCTION_NOT_SUPPORTED: CK_RV = translate::CKR_FUNCTION_NOT_SUPPORTED as CK_RV;
pub const CKR_BUFFER_TOO_SMALL: CK_RV = translate::CKR_BUFFER_TOO_SMALL as CK_RV;

/// Version implemented by the proxy's own function list.
pub const PROXY_VERSION: CK_VERSION = CK_VERSION {
    major: 2,
    minor: 40,
};

#[repr(C)]
#[cfg_attr(windows, repr(packed))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CK_VERSION {
    pub major: CK_BYTE,
    pub minor: CK_BYTE,
}

#[repr(C)]
#[cfg_attr(windows, repr(packed))]
#[derive(Debug, Clone, Copy)]
pub struct CK_INFO {
    pub cryptokiVersion: CK_VERSION,
    pub manufacturerID: [CK_UTF8CHAR; 32],
    pub flags: CK_FLAGS,
    pub libraryDescription: [CK_UTF8CHAR; 32],
    pub libraryVersion: CK_VERSION,
}

#[repr(C)]
#[cfg_attr(windows, repr(packed))]
#[derive(Debug, Clone, Copy)]
pub struct CK_SLOT_INFO {
    pub slotDescription: [CK_UTF8CHAR; 64],
    pub manufacturerID: [CK_UTF8CHAR; 32],
    pub flags: CK_FLAGS,
    pub hardwareVersion: CK_VERSION,
    pub firmwareVersion: CK_VERSION,
}

#[repr(C)]
#[cfg_attr(windows, repr(packed))]
#[derive(Debug, Clone, Copy)]
pub struct CK_TOKEN_INFO {
    pub label: [CK_UTF8CHAR; 32],
    pub manufacturerID: [CK_UTF8CHAR; 32],
    pub model: [CK_UTF8CHAR; 16],
    pub serialNumber: [CK_BYTE; 16],
    pub flags: CK_FLAGS,
    pub ulMaxSessionCount: CK_ULONG,
    pub ulSessionCount: CK_ULONG,
    pub ulMaxRwSessionCount: CK_ULONG,
    pub ulRwSessionCount: CK_ULONG,
    pub ulMaxPinLen: CK_ULONG,
    pub ulMinPinLen: CK_ULONG,
    pub ulTotalPublicMemory: CK_ULONG,
    pub ulFreePublicMemory: CK_ULONG,
    pub ulTotalPrivateMemory: CK_ULONG,
    pub ulFreePrivateMemory: CK_ULONG,
    pub hardwareVersion: CK_VERSION,
    pub firmwareVersion: CK_VERSION,
    pub utcTime: [CK_BYTE; 16],
}

#[repr(C)]
#[cfg_attr(windows, repr(packed))]
#[derive(Debug, Clone, Copy)]
pub struct CK_SESSION_INFO {
    pub slotID: CK_SLOT_ID,
    pub state: CK_STATE,
    pub flags: CK_FLAGS,
    pub ulDeviceError: CK_ULONG,
}

#[repr(C)]
#[cfg_attr(windows, repr(packed))]
#[derive(Debug, Clone, Copy)]
pub struct CK_MECHANISM_INFO {
    pub ulMinKeySize: CK_ULONG,
    pub ulMaxKeySize: CK_ULONG,
    pub flags: CK_FLAGS,
}

#[repr(C)]
#[cfg_attr(windows, repr(packed))]
#[derive(Debug, Clone, Copy)]
pub struct CK_MECHANISM {
    pub mechanism: CK_MECHANISM_TYPE,
    pub pParameter: CK_VOID_PTR,
    pub ulParameterLen: CK_ULONG,
}

#[repr(C)]
#[cfg_attr(windows, repr(packed))]
#[derive(Debug, Clone, Copy)]
pub struct CK_ATTRIBUTE {
    pub type_: CK_ATTRIBUTE_TYPE,
    pub pValue: CK_VOID_PTR,
    pub ulValueLen: CK_ULONG,
}

#[repr(C)]
#[cfg_attr(windows, repr(packed))]
#[derive(Debug, Clone, Copy)]
pub struct CK_C_INITIALIZE_ARGS {
    pub CreateMutex: CK_VOID_PTR,
    pub DestroyMutex: CK_VOID_PTR,
    pub LockMutex: CK_VOID_PTR,
    pub UnlockMutex: CK_VOID_PTR,
    pub flags: CK_FLAGS,
    pub pReserved: CK_VOID_PTR,
}

/// Widen a `CK_ULONG` to the width the translation tables use.
#[inline]
#[must_use]
pub fn widen(value: CK_ULONG) -> u64 {
    u64::from(value)
}
