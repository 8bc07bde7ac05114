//! With file logging disabled nothing is created at the log path.

mod common;

use common::{TEST_LOCK, setup, take_captured};
use pkcs11_logger::ck::*;
use pkcs11_logger::global;
use pkcs11_logger::proxy_abi::{C_DigestUpdate, C_Finalize, C_Initialize};
use pkcs11_logger_core::LoggerFlags;

#[test]
fn no_log_file_is_created() {
    let fixture = setup(LoggerFlags::DISABLE_LOG_FILE, 0);
    let _guard = TEST_LOCK.lock().unwrap();

    let mut part = [1u8, 2, 3];
    // SAFETY: null init args are valid; `part` is readable for its length.
    unsafe {
        assert_eq!(C_Initialize(std::ptr::null_mut()), CKR_OK);
        assert_eq!(C_DigestUpdate(1, part.as_mut_ptr(), 3), CKR_OK);
        assert_eq!(C_Finalize(std::ptr::null_mut()), CKR_OK);
    }
    assert_eq!(take_captured("C_DigestUpdate"), vec![part.to_vec()]);

    assert!(!fixture.log.exists());
    let metrics = global().metrics().snapshot();
    assert_eq!(metrics.calls, 3);
    assert_eq!(metrics.forwarded, 3);
    assert_eq!(metrics.sink_write_failures, 0);
}
