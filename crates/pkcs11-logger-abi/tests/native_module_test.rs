//! The proxy in front of a real shared library, opened by path with the
//! platform loader.

use std::path::PathBuf;
use std::ptr;

use pkcs11_logger::ck::*;
use pkcs11_logger::proxy_abi::{C_Finalize, C_GetInfo, C_Initialize, C_Sign};
use pkcs11_logger::{ProxyState, global, install};
use pkcs11_logger_core::Settings;
use pkcs11_logger_core::settings::{LIBRARY_PATH_VAR, LOG_FILE_PATH_VAR};
use pkcs11_logger_harness::parse;

const MANUFACTURER: &str = "pkcs11-logger test module";

/// The stub module cargo builds as a dev-dependency, next to this binary.
fn stub_module_path() -> PathBuf {
    let name = libloading::library_filename("pkcs11_logger_stub_module");
    let exe = std::env::current_exe().expect("test binary path");
    let deps = exe.parent().expect("deps directory");
    [deps, deps.parent().unwrap_or(deps)]
        .iter()
        .map(|dir| dir.join(&name))
        .find(|path| path.exists())
        .unwrap_or_else(|| {
            panic!("{} not found near {}", name.to_string_lossy(), deps.display())
        })
}

fn empty_info() -> CK_INFO {
    CK_INFO {
        cryptokiVersion: CK_VERSION::default(),
        manufacturerID: [0; 32],
        flags: 0,
        libraryDescription: [0; 32],
        libraryVersion: CK_VERSION::default(),
    }
}

#[test]
fn calls_reach_a_dynamically_loaded_module() {
    let dir = tempfile::tempdir().expect("temp dir");
    let log = dir.path().join("native.log");
    let module = stub_module_path();
    let settings = Settings::from_lookup(|key| match key {
        LIBRARY_PATH_VAR => Some(module.to_string_lossy().into_owned()),
        LOG_FILE_PATH_VAR => Some(log.to_string_lossy().into_owned()),
        _ => None,
    });
    install(ProxyState::new(settings)).expect("proxy state installed before first call");

    let mut info = empty_info();
    let mut data = [1u8];
    let mut signature_len: CK_ULONG = 0;
    // SAFETY: every pointer is null or addresses a live local.
    unsafe {
        assert_eq!(C_Initialize(ptr::null_mut()), CKR_OK);
        assert_eq!(C_GetInfo(&mut info), CKR_OK);
        assert_eq!(
            C_Sign(1, data.as_mut_ptr(), 1, ptr::null_mut(), &mut signature_len),
            CKR_FUNCTION_NOT_SUPPORTED
        );
        assert_eq!(C_Finalize(ptr::null_mut()), CKR_OK);
    }
    assert!({ info.manufacturerID }.starts_with(MANUFACTURER.as_bytes()));
    assert_eq!({ info.cryptokiVersion }, CK_VERSION { major: 2, minor: 40 });

    let text = std::fs::read_to_string(&log).expect("log written");
    let parsed = parse(&text).expect("proxy log");
    assert!(parsed.is_clean(), "{:?}", parsed.violations);
    let functions: Vec<&str> = parsed.records.iter().map(|r| r.function.as_str()).collect();
    assert_eq!(functions, ["C_Initialize", "C_GetInfo", "C_Sign", "C_Finalize"]);
    let get_info = parsed.calls("C_GetInfo").next().expect("C_GetInfo record");
    assert_eq!(
        get_info.param("pInfo.manufacturerID"),
        Some(format!("\"{MANUFACTURER}\"").as_str())
    );
    let metrics = global().metrics().snapshot();
    assert_eq!(metrics.forwarded, 3);
    assert_eq!(metrics.unsupported_calls, 1);

    // Unloading releases the module and the log; later calls fail without
    // reloading or writing.
    global().shutdown();
    let logged = std::fs::metadata(&log).expect("log").len();
    // SAFETY: null init args.
    assert_eq!(unsafe { C_Initialize(ptr::null_mut()) }, CKR_GENERAL_ERROR);
    assert_eq!(std::fs::metadata(&log).expect("log").len(), logged);
}
