//! End-to-end: exported entry points -> stub module -> log file.

mod common;

use std::ptr;

use common::{
    STUB_SESSION, STUB_SLOTS, STUB_UNKNOWN_RV, TEST_LOCK, pid_prefix, setup, take_captured,
};
use pkcs11_logger::ck::*;
use pkcs11_logger::proxy_abi::{
    C_CloseSession, C_DigestUpdate, C_Encrypt, C_GetFunctionList, C_GetSlotList, C_Login,
    C_OpenSession, C_SeedRandom, C_Sign,
};
use pkcs11_logger::{FUNCTION_LIST, global};
use pkcs11_logger_harness::{Summary, parse};

const FLAGS: u64 = 0;

fn lines(text: &str) -> Vec<&str> {
    text.lines().collect()
}

#[test]
fn digest_update_logs_block_and_forwards_bytes() {
    let fixture = setup(FLAGS, 0);
    let _guard = TEST_LOCK.lock().unwrap();
    let start = fixture.log_len();

    let mut part = [0xDE_u8, 0xAD, 0xBE, 0xEF];
    // SAFETY: `part` is readable for its length.
    let rv = unsafe { C_DigestUpdate(1, part.as_mut_ptr(), part.len() as CK_ULONG) };
    assert_eq!(rv, CKR_OK);
    assert_eq!(take_captured("C_DigestUpdate"), vec![part.to_vec()]);

    let text = fixture.log_since(start);
    let log = lines(&text);
    assert_eq!(log[0], pkcs11_logger_core::record::SEPARATOR);
    assert!(log[1].starts_with(&pid_prefix()), "{}", log[1]);
    assert!(log[1].ends_with(" : Calling C_DigestUpdate"), "{}", log[1]);
    assert!(log.iter().any(|line| line.ends_with(" pPart: 4 bytes: DEADBEEF")));
    assert!(log.iter().any(|line| line.ends_with(" ulPartLen: 4")));
    assert!(log.last().unwrap().ends_with("Returning 0x00000000 (CKR_OK)"));
    assert!(!text.contains("Output"));
}

#[test]
fn empty_buffer_and_null_buffer_differ() {
    let fixture = setup(FLAGS, 0);
    let _guard = TEST_LOCK.lock().unwrap();
    let start = fixture.log_len();

    let mut part = [0u8; 1];
    // SAFETY: zero-length reads of a valid buffer, then a null buffer.
    unsafe {
        assert_eq!(C_DigestUpdate(1, part.as_mut_ptr(), 0), CKR_OK);
        assert_eq!(C_DigestUpdate(1, ptr::null_mut(), 0), CKR_OK);
    }
    take_captured("C_DigestUpdate");

    let text = fixture.log_since(start);
    let parts: Vec<&str> = text
        .lines()
        .filter_map(|line| line.split_once(" pPart: ").map(|(_, value)| value))
        .collect();
    assert_eq!(parts, ["<empty>", "NULL"]);
}

#[test]
fn pin_is_redacted_but_forwarded_unchanged() {
    let fixture = setup(FLAGS, 0);
    let _guard = TEST_LOCK.lock().unwrap();
    let start = fixture.log_len();

    let mut pin = *b"4711";
    // SAFETY: `pin` is readable for its length.
    let rv = unsafe { C_Login(1, 1, pin.as_mut_ptr(), pin.len() as CK_ULONG) };
    assert_eq!(rv, CKR_OK);
    assert_eq!(take_captured("C_Login"), vec![b"4711".to_vec()]);

    let text = fixture.log_since(start);
    assert!(text.contains(" pPin: *** redacted ***"), "{text}");
    assert!(text.contains(" userType: 0x00000001 (CKU_USER)"), "{text}");
    assert!(!text.contains("4711"));
    assert!(global().metrics().snapshot().redactions >= 1);
}

#[test]
fn encrypt_output_is_shown_only_on_success() {
    let fixture = setup(FLAGS, 0);
    let _guard = TEST_LOCK.lock().unwrap();
    let start = fixture.log_len();

    let mut data = [0xDE_u8, 0xAD, 0xBE, 0xEF];
    let mut out = [0u8; 4];
    let mut out_len: CK_ULONG = 2;
    // SAFETY: all buffers outlive the calls and lengths match.
    unsafe {
        let rv = C_Encrypt(1, data.as_mut_ptr(), 4, out.as_mut_ptr(), &mut out_len);
        assert_eq!(rv, CKR_BUFFER_TOO_SMALL);
        assert_eq!(out_len, 4);
        let rv = C_Encrypt(1, data.as_mut_ptr(), 4, out.as_mut_ptr(), &mut out_len);
        assert_eq!(rv, CKR_OK);
    }
    assert_eq!(out, [0x21, 0x52, 0x41, 0x10]);

    let text = fixture.log_since(start);
    let encrypted: Vec<&str> = text
        .lines()
        .filter_map(|line| line.split_once(" pEncryptedData: ").map(|(_, value)| value))
        .collect();
    assert_eq!(encrypted.len(), 2);
    assert!(encrypted[0].starts_with("0x"), "{encrypted:?}");
    assert_eq!(encrypted[1], "4 bytes: 21524110");
    assert!(text.contains("Returning 0x00000150 (CKR_BUFFER_TOO_SMALL)"));
}

#[test]
fn absent_real_entry_is_not_supported() {
    let fixture = setup(FLAGS, 0);
    let _guard = TEST_LOCK.lock().unwrap();
    let start = fixture.log_len();

    let mut data = [1u8];
    let mut signature_len: CK_ULONG = 0;
    // SAFETY: valid buffers; the stub has no C_Sign so nothing is written.
    let rv = unsafe {
        C_Sign(1, data.as_mut_ptr(), 1, ptr::null_mut(), &mut signature_len)
    };
    assert_eq!(rv, CKR_FUNCTION_NOT_SUPPORTED);

    let text = fixture.log_since(start);
    assert!(text.contains("Calling C_Sign"));
    assert!(text.contains("Returning 0x00000054 (CKR_FUNCTION_NOT_SUPPORTED)"));
}

#[test]
fn unknown_result_is_returned_verbatim() {
    let fixture = setup(FLAGS, 0);
    let _guard = TEST_LOCK.lock().unwrap();
    let start = fixture.log_len();

    let mut seed = [9u8; 3];
    // SAFETY: `seed` is readable for its length.
    let rv = unsafe { C_SeedRandom(1, seed.as_mut_ptr(), 3) };
    assert_eq!(rv, STUB_UNKNOWN_RV);
    assert!(fixture.log_since(start).contains("Returning 0x00000777 (unrecognized)"));
}

#[test]
fn slot_list_size_query_then_fetch() {
    let fixture = setup(FLAGS, 0);
    let _guard = TEST_LOCK.lock().unwrap();
    let start = fixture.log_len();

    let mut count: CK_ULONG = 0;
    let mut slots = [0 as CK_SLOT_ID; 4];
    // SAFETY: count and slot buffers are valid for the calls.
    unsafe {
        assert_eq!(C_GetSlotList(CK_TRUE, ptr::null_mut(), &mut count), CKR_OK);
        assert_eq!(count, 2);
        assert_eq!(C_GetSlotList(CK_TRUE, slots.as_mut_ptr(), &mut count), CKR_OK);
    }
    assert_eq!(&slots[..2], &STUB_SLOTS);

    let log = parse(&fixture.log_since(start)).unwrap();
    assert!(log.is_clean(), "{:?}", log.violations);
    let calls: Vec<_> = log.calls("C_GetSlotList").collect();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].outputs[0].value, "NULL");
    assert_eq!(calls[0].outputs[1].value, "2");
    assert_eq!(calls[1].param("pSlotList"), Some("2 entries"));
    assert_eq!(calls[1].param("pSlotList[1]"), Some("7"));
}

#[test]
fn function_list_calls_stay_intercepted() {
    let fixture = setup(FLAGS, 0);
    let _guard = TEST_LOCK.lock().unwrap();
    let start = fixture.log_len();

    let mut list: CK_FUNCTION_LIST_PTR = ptr::null_mut();
    // SAFETY: `list` is a valid out-pointer.
    assert_eq!(unsafe { C_GetFunctionList(&mut list) }, CKR_OK);
    assert!(ptr::eq(list.cast_const(), &raw const FUNCTION_LIST));
    // SAFETY: a null out-pointer is rejected before any write.
    assert_eq!(unsafe { C_GetFunctionList(ptr::null_mut()) }, CKR_ARGUMENTS_BAD);

    // SAFETY: `list` points at the proxy's static list.
    let digest_update = unsafe { (*list).C_DigestUpdate }.expect("entry present");
    let mut part = [7u8; 2];
    // SAFETY: `part` is readable for its length.
    assert_eq!(unsafe { digest_update(5, part.as_mut_ptr(), 2) }, CKR_OK);
    take_captured("C_DigestUpdate");

    let log = parse(&fixture.log_since(start)).unwrap();
    let functions: Vec<&str> = log.records.iter().map(|r| r.function.as_str()).collect();
    assert_eq!(functions, ["C_GetFunctionList", "C_GetFunctionList", "C_DigestUpdate"]);
    assert_eq!(log.records[2].param("hSession"), Some("5"));
}

unsafe extern "C" fn close_from_callback(
    session: CK_SESSION_HANDLE,
    _event: CK_NOTIFICATION,
    _application: CK_VOID_PTR,
) -> CK_RV {
    // SAFETY: plain handle argument.
    unsafe { C_CloseSession(session) }
}

#[test]
fn callback_reentering_the_proxy_nests_its_block() {
    let fixture = setup(FLAGS, 0);
    let _guard = TEST_LOCK.lock().unwrap();
    let start = fixture.log_len();

    let mut session: CK_SESSION_HANDLE = 0;
    // SAFETY: `session` is a valid out-pointer; the callback only calls the proxy.
    let rv = unsafe {
        C_OpenSession(1, 0x6, ptr::null_mut(), Some(close_from_callback), &mut session)
    };
    assert_eq!(rv, CKR_OK);
    assert_eq!(session, STUB_SESSION);

    let text = fixture.log_since(start);
    let open = text.find("Calling C_OpenSession").unwrap();
    let close = text.find("Calling C_CloseSession").unwrap();
    let result = text.find(" phSession: 42").unwrap();
    assert!(open < close && close < result, "{text}");
    assert!(text.contains(" flags: 0x00000006 (CKF_RW_SESSION | CKF_SERIAL_SESSION)"), "{text}");

    let summary = Summary::from_log(&parse(&text).unwrap());
    assert!(summary.is_clean(), "{:?}", summary.violations);
    assert_eq!(summary.nested, 1);
}

#[test]
fn concurrent_calls_never_interleave() {
    const THREADS: usize = 8;
    const CALLS: usize = 25;

    let fixture = setup(FLAGS, 0);
    let _guard = TEST_LOCK.lock().unwrap();
    let start = fixture.log_len();

    let workers: Vec<_> = (0..THREADS)
        .map(|t| {
            std::thread::spawn(move || {
                let mut part = [t as u8; 16];
                for _ in 0..CALLS {
                    // SAFETY: `part` is readable for its length.
                    let rv = unsafe { C_DigestUpdate(t as CK_ULONG, part.as_mut_ptr(), 16) };
                    assert_eq!(rv, CKR_OK);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    let captured = take_captured("C_DigestUpdate");
    assert_eq!(captured.len(), THREADS * CALLS);

    let log = parse(&fixture.log_since(start)).unwrap();
    assert!(log.is_clean(), "{:?}", log.violations);
    assert_eq!(log.records.len(), THREADS * CALLS);
    let summary = Summary::from_log(&log);
    assert_eq!(summary.callers, THREADS);
    assert_eq!(summary.functions["C_DigestUpdate"].ok, THREADS * CALLS);
    for record in &log.records {
        let session: usize = record.param("hSession").unwrap().parse().unwrap();
        let expected = format!("16 bytes: {}", format!("{session:02X}").repeat(16));
        assert_eq!(record.param("pPart"), Some(expected.as_str()));
    }
}
