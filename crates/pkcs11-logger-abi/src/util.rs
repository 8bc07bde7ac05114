//! Shared internal utilities for the ABI layer.

use pkcs11_logger_core::{CallerIds, LoggerFlags};

/// Process and thread ids of the caller, each only when `flags` enable it.
#[must_use]
pub fn caller_ids(flags: LoggerFlags) -> CallerIds {
    CallerIds {
        pid: flags
            .process_id_enabled()
            .then(|| u64::from(std::process::id())),
        tid: flags.thread_id_enabled().then(current_thread_id),
    }
}

/// Kernel thread id, matching what debuggers and `ps -L` show.
#[cfg(any(target_os = "linux", target_os = "android"))]
#[must_use]
pub fn current_thread_id() -> u64 {
    // SAFETY: gettid has no preconditions and cannot fail.
    let tid = unsafe { libc::syscall(libc::SYS_gettid) };
    tid as u64
}

/// Per-thread id handed out in order of first use.
#[cfg(not(any(target_os = "linux", target_os = "android")))]
#[must_use]
pub fn current_thread_id() -> u64 {
    use std::sync::atomic::{AtomicU64, Ordering};

    static NEXT_ID: AtomicU64 = AtomicU64::new(1);
    std::thread_local! {
        static THREAD_ID: u64 = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    }
    THREAD_ID.with(|id| *id)
}

/// Copy `len` bytes starting at `addr`, or `None` for a null address.
///
/// # Safety
///
/// A non-null `addr` must be readable for `len` bytes.
pub unsafe fn read_bytes<'a>(addr: usize, len: usize) -> Option<&'a [u8]> {
    if addr == 0 {
        return None;
    }
    if len == 0 {
        return Some(&[][..]);
    }
    // SAFETY: non-null and readable per the caller's contract.
    Some(unsafe { std::slice::from_raw_parts(addr as *const u8, len) })
}

/// Read a `T` at `addr` without alignment requirements.
///
/// # Safety
///
/// A non-null `addr` must be readable for `size_of::<T>()` bytes holding a
/// valid `T`.
pub unsafe fn read_value<T: Copy>(addr: usize) -> Option<T> {
    if addr == 0 {
        return None;
    }
    // SAFETY: non-null and readable per the caller's contract.
    Some(unsafe { std::ptr::read_unaligned(addr as *const T) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_flags() {
        let all = caller_ids(LoggerFlags::default());
        assert_eq!(all.pid, Some(u64::from(std::process::id())));
        assert!(all.tid.is_some());

        let none = caller_ids(LoggerFlags::from_bits(
            LoggerFlags::DISABLE_PROCESS_ID | LoggerFlags::DISABLE_THREAD_ID,
        ));
        assert_eq!(none, CallerIds::default());
    }

    #[test]
    fn thread_ids_differ_between_threads() {
        let here = current_thread_id();
        let there = std::thread::spawn(current_thread_id).join().unwrap();
        assert_ne!(here, there);
        assert_eq!(here, current_thread_id());
    }

    #[test]
    fn null_reads_are_none() {
        // SAFETY: null is never dereferenced.
        unsafe {
            assert_eq!(read_bytes(0, 4), None);
            assert_eq!(read_value::<u32>(0), None);
        }
        let data = [1u8, 2, 3];
        // SAFETY: `data` outlives the borrow.
        let bytes = unsafe { read_bytes(data.as_ptr() as usize, 3) };
        assert_eq!(bytes, Some(&data[..]));
    }
}
