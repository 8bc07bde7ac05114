//! Minimal Cryptoki module used as the real implementation in proxy tests.
//!
//! Exports `C_GetFunctionList` only. The list it hands out provides
//! `C_Initialize`, `C_Finalize`, `C_GetInfo` and `C_GetFunctionList`; the
//! other 64 entries are absent. Must not link the proxy, whose `C_*` symbols
//! would then be exported from here as well.

#![allow(non_camel_case_types, non_snake_case)]

use std::ffi::{c_ulong, c_void};
use std::sync::atomic::{AtomicBool, Ordering};

pub type CK_ULONG = c_ulong;
pub type CK_RV = CK_ULONG;

pub const CKR_OK: CK_RV = 0x0000_0000;
pub const CKR_ARGUMENTS_BAD: CK_RV = 0x0000_0007;
pub const CKR_CRYPTOKI_NOT_INITIALIZED: CK_RV = 0x0000_0190;
pub const CKR_CRYPTOKI_ALREADY_INITIALIZED: CK_RV = 0x0000_0191;

/// Manufacturer reported by `C_GetInfo`.
pub const MANUFACTURER: &str = "pkcs11-logger test module";

#[repr(C)]
#[cfg_attr(windows, repr(packed))]
#[derive(Debug, Clone, Copy)]
pub struct CK_VERSION {
    pub major: u8,
    pub minor: u8,
}

#[repr(C)]
#[cfg_attr(windows, repr(packed))]
#[derive(Debug, Clone, Copy)]
pub struct CK_INFO {
    pub cryptokiVersion: CK_VERSION,
    pub manufacturerID: [u8; 32],
    pub flags: CK_ULONG,
    pub libraryDescription: [u8; 32],
    pub libraryVersion: CK_VERSION,
}

type Absent = Option<unsafe extern "C" fn()>;

/// `CK_FUNCTION_LIST` with the first four entries typed.
#[repr(C)]
#[cfg_attr(windows, repr(packed))]
pub struct FunctionList {
    pub version: CK_VERSION,
    pub C_Initialize: Option<unsafe extern "C" fn(*mut c_void) -> CK_RV>,
    pub C_Finalize: Option<unsafe extern "C" fn(*mut c_void) -> CK_RV>,
    pub C_GetInfo: Option<unsafe extern "C" fn(*mut CK_INFO) -> CK_RV>,
    pub C_GetFunctionList: Option<unsafe extern "C" fn(*mut *const FunctionList) -> CK_RV>,
    pub rest: [Absent; 64],
}

static INITIALIZED: AtomicBool = AtomicBool::new(false);

static FUNCTION_LIST: FunctionList = FunctionList {
    version: CK_VERSION {
        major: 2,
        minor: 40,
    },
    C_Initialize: Some(initialize),
    C_Finalize: Some(finalize),
    C_GetInfo: Some(get_info),
    C_GetFunctionList: Some(C_GetFunctionList),
    rest: [None; 64],
};

unsafe extern "C" fn initialize(_init_args: *mut c_void) -> CK_RV {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return CKR_CRYPTOKI_ALREADY_INITIALIZED;
    }
    CKR_OK
}

unsafe extern "C" fn finalize(_reserved: *mut c_void) -> CK_RV {
    if !INITIALIZED.swap(false, Ordering::SeqCst) {
        return CKR_CRYPTOKI_NOT_INITIALIZED;
    }
    CKR_OK
}

fn padded(text: &str) -> [u8; 32] {
    let mut field = [b' '; 32];
    let len = text.len().min(field.len());
    field[..len].copy_from_slice(&text.as_bytes()[..len]);
    field
}

unsafe extern "C" fn get_info(info: *mut CK_INFO) -> CK_RV {
    if !INITIALIZED.load(Ordering::SeqCst) {
        return CKR_CRYPTOKI_NOT_INITIALIZED;
    }
    if info.is_null() {
        return CKR_ARGUMENTS_BAD;
    }
    let value = CK_INFO {
        cryptokiVersion: CK_VERSION {
            major: 2,
            minor: 40,
        },
        manufacturerID: padded(MANUFACTURER),
        flags: 0,
        libraryDescription: padded("stub"),
        libraryVersion: CK_VERSION { major: 1, minor: 0 },
    };
    // SAFETY: non-null out-pointer supplied by the caller.
    unsafe { info.write_unaligned(value) };
    CKR_OK
}

/// Hand out this module's function list.
///
/// # Safety
///
/// `list` must be null or valid for one pointer write.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn C_GetFunctionList(list: *mut *const FunctionList) -> CK_RV {
    if list.is_null() {
        return CKR_ARGUMENTS_BAD;
    }
    // SAFETY: non-null out-pointer supplied by the caller.
    unsafe { list.write_unaligned(&raw const FUNCTION_LIST) };
    CKR_OK
}
