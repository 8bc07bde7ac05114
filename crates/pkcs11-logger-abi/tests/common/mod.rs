//! In-process stub Cryptoki module and proxy setup shared by the ABI tests.

#![allow(dead_code)]

use std::ffi::c_void;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};

use pkcs11_logger::ck::*;
use pkcs11_logger::loader::{LoadedModule, LoaderError, ModuleLoader};
use pkcs11_logger::{ProxyState, install};
use pkcs11_logger_core::{LoggerFlags, Settings};

/// Serializes tests that read the shared log.
pub static TEST_LOCK: Mutex<()> = Mutex::new(());

/// Arguments the stub received, by operation.
static CAPTURED: Mutex<Vec<(&'static str, Vec<u8>)>> = Mutex::new(Vec::new());

pub const STUB_SLOTS: [CK_SLOT_ID; 2] = [1, 7];
pub const STUB_SESSION: CK_SESSION_HANDLE = 42;
/// Vendor result code missing from every table.
pub const STUB_UNKNOWN_RV: CK_RV = 0x0000_0777;

fn capture(op: &'static str, data: CK_BYTE_PTR, len: CK_ULONG) {
    let bytes = if data.is_null() {
        Vec::new()
    } else {
        // SAFETY: the caller passed `len` readable bytes.
        unsafe { std::slice::from_raw_parts(data, len as usize) }.to_vec()
    };
    CAPTURED.lock().unwrap().push((op, bytes));
}

/// Everything captured for `op` since the last call.
pub fn take_captured(op: &str) -> Vec<Vec<u8>> {
    let mut captured = CAPTURED.lock().unwrap();
    let (wanted, rest): (Vec<_>, Vec<_>) = captured.drain(..).partition(|(name, _)| *name == op);
    *captured = rest;
    wanted.into_iter().map(|(_, bytes)| bytes).collect()
}

unsafe extern "C" fn stub_initialize(_args: CK_VOID_PTR) -> CK_RV {
    CKR_OK
}

unsafe extern "C" fn stub_finalize(_reserved: CK_VOID_PTR) -> CK_RV {
    CKR_OK
}

unsafe extern "C" fn stub_get_slot_list(
    _token_present: CK_BBOOL,
    slots: CK_SLOT_ID_PTR,
    count: CK_ULONG_PTR,
) -> CK_RV {
    if count.is_null() {
        return CKR_ARGUMENTS_BAD;
    }
    let wanted = STUB_SLOTS.len() as CK_ULONG;
    // SAFETY: non-null count pointer from the caller.
    unsafe {
        if slots.is_null() {
            *count = wanted;
            return CKR_OK;
        }
        if *count < wanted {
            *count = wanted;
            return CKR_BUFFER_TOO_SMALL;
        }
        std::ptr::copy_nonoverlapping(STUB_SLOTS.as_ptr(), slots, STUB_SLOTS.len());
        *count = wanted;
    }
    CKR_OK
}

unsafe extern "C" fn stub_open_session(
    _slot: CK_SLOT_ID,
    _flags: CK_FLAGS,
    application: CK_VOID_PTR,
    notify: CK_NOTIFY,
    session: CK_SESSION_HANDLE_PTR,
) -> CK_RV {
    if session.is_null() {
        return CKR_ARGUMENTS_BAD;
    }
    if let Some(callback) = notify {
        // SAFETY: the application's callback, invoked as a module would.
        let rv = unsafe { callback(STUB_SESSION, 0, application) };
        if rv != CKR_OK {
            return rv;
        }
    }
    // SAFETY: non-null out-pointer.
    unsafe { *session = STUB_SESSION };
    CKR_OK
}

unsafe extern "C" fn stub_close_session(_session: CK_SESSION_HANDLE) -> CK_RV {
    CKR_OK
}

unsafe extern "C" fn stub_login(
    _session: CK_SESSION_HANDLE,
    _user: CK_USER_TYPE,
    pin: CK_UTF8CHAR_PTR,
    pin_len: CK_ULONG,
) -> CK_RV {
    capture("C_Login", pin, pin_len);
    CKR_OK
}

unsafe extern "C" fn stub_digest_update(
    _session: CK_SESSION_HANDLE,
    part: CK_BYTE_PTR,
    part_len: CK_ULONG,
) -> CK_RV {
    capture("C_DigestUpdate", part, part_len);
    CKR_OK
}

/// "Encrypts" by inverting every byte.
unsafe extern "C" fn stub_encrypt(
    _session: CK_SESSION_HANDLE,
    data: CK_BYTE_PTR,
    data_len: CK_ULONG,
    out: CK_BYTE_PTR,
    out_len: CK_ULONG_PTR,
) -> CK_RV {
    if out_len.is_null() {
        return CKR_ARGUMENTS_BAD;
    }
    // SAFETY: caller buffers per the Cryptoki contract.
    unsafe {
        if out.is_null() {
            *out_len = data_len;
            return CKR_OK;
        }
        if *out_len < data_len {
            *out_len = data_len;
            return CKR_BUFFER_TOO_SMALL;
        }
        for i in 0..data_len as usize {
            *out.add(i) = !*data.add(i);
        }
        *out_len = data_len;
    }
    CKR_OK
}

unsafe extern "C" fn stub_seed_random(
    _session: CK_SESSION_HANDLE,
    _seed: CK_BYTE_PTR,
    _seed_len: CK_ULONG,
) -> CK_RV {
    STUB_UNKNOWN_RV
}

/// The stub's list. `C_Sign` and most others are deliberately absent.
static STUB_LIST: CK_FUNCTION_LIST = CK_FUNCTION_LIST {
    version: CK_VERSION { major: 2, minor: 40 },
    C_Initialize: Some(stub_initialize),
    C_Finalize: Some(stub_finalize),
    C_GetSlotList: Some(stub_get_slot_list),
    C_OpenSession: Some(stub_open_session),
    C_CloseSession: Some(stub_close_session),
    C_Login: Some(stub_login),
    C_DigestUpdate: Some(stub_digest_update),
    C_Encrypt: Some(stub_encrypt),
    C_SeedRandom: Some(stub_seed_random),
    ..CK_FUNCTION_LIST::EMPTY
};

unsafe extern "C" fn stub_get_function_list(list: CK_FUNCTION_LIST_PTR_PTR) -> CK_RV {
    if list.is_null() {
        return CKR_ARGUMENTS_BAD;
    }
    // SAFETY: non-null out-pointer.
    unsafe { *list = (&raw const STUB_LIST).cast_mut() };
    CKR_OK
}

/// Loader whose "module" is the stub above. The first `failures` opens fail.
pub struct StubLoader {
    failures: AtomicUsize,
    pub opens: &'static AtomicUsize,
}

struct StubModule;

impl ModuleLoader for StubLoader {
    fn open(&self, path: &Path) -> Result<Box<dyn LoadedModule>, LoaderError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(LoaderError::Open {
                path: path.to_path_buf(),
                reason: "stub refused to load".into(),
            });
        }
        Ok(Box::new(StubModule))
    }
}

impl LoadedModule for StubModule {
    fn symbol(&self, name: &str) -> Result<NonNull<c_void>, LoaderError> {
        if name != "C_GetFunctionList" {
            return Err(LoaderError::Symbol {
                name: name.to_string(),
                reason: "not exported by the stub".into(),
            });
        }
        let entry: CK_C_GetFunctionList = stub_get_function_list;
        NonNull::new(entry as *mut c_void).ok_or_else(|| LoaderError::Symbol {
            name: name.to_string(),
            reason: "null".into(),
        })
    }
}

pub struct Fixture {
    _dir: tempfile::TempDir,
    pub log: PathBuf,
    pub opens: &'static AtomicUsize,
}

impl Fixture {
    /// Current size of the log file, 0 if it does not exist yet.
    pub fn log_len(&self) -> u64 {
        std::fs::metadata(&self.log).map_or(0, |meta| meta.len())
    }

    /// Log text written after `offset`.
    pub fn log_since(&self, offset: u64) -> String {
        let bytes = std::fs::read(&self.log).unwrap_or_default();
        String::from_utf8_lossy(&bytes[offset as usize..]).into_owned()
    }
}

static FIXTURE: OnceLock<Fixture> = OnceLock::new();

/// Install a proxy backed by the stub, once per test binary.
pub fn setup(flags: u64, failures: usize) -> &'static Fixture {
    FIXTURE.get_or_init(|| {
        let dir = tempfile::tempdir().expect("temp dir");
        let log = dir.path().join("pkcs11.log");
        let opens: &'static AtomicUsize = Box::leak(Box::new(AtomicUsize::new(0)));
        let settings = Settings {
            library_path: Some(PathBuf::from("stub-module.so")),
            log_path: Some(log.clone()),
            flags: LoggerFlags::from_bits(flags),
        };
        let loader = StubLoader {
            failures: AtomicUsize::new(failures),
            opens,
        };
        install(ProxyState::with_loader(settings, Box::new(loader)))
            .expect("proxy state installed before first call");
        Fixture {
            _dir: dir,
            log,
            opens,
        }
    })
}

/// Prefix every line of this process's records starts with, ids enabled.
pub fn pid_prefix() -> String {
    format!("0x{:08x} : ", std::process::id())
}
