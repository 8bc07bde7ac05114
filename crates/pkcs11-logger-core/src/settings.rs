//! Proxy configuration.
//!
//! Three inputs configure the proxy, normally taken from the environment:
//! - `PKCS11_LOGGER_LIBRARY_PATH`: the real PKCS#11 module (required)
//! - `PKCS11_LOGGER_LOG_FILE_PATH`: the log file (unset: no file output)
//! - `PKCS11_LOGGER_FLAGS`: a bitmask, decimal or `0x`-prefixed hex
//!
//! They are decoded once into an immutable [`Settings`]; nothing re-reads the
//! environment afterwards.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

pub const LIBRARY_PATH_VAR: &str = "PKCS11_LOGGER_LIBRARY_PATH";
pub const LOG_FILE_PATH_VAR: &str = "PKCS11_LOGGER_LOG_FILE_PATH";
pub const FLAGS_VAR: &str = "PKCS11_LOGGER_FLAGS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("flags value '{raw}' is not a decimal or 0x-prefixed hex integer")]
    InvalidFlags { raw: String },
}

/// Decoded `PKCS11_LOGGER_FLAGS` bitmask.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct LoggerFlags(u64);

impl LoggerFlags {
    pub const DISABLE_LOG_FILE: u64 = 0x0000_0001;
    pub const DISABLE_PROCESS_ID: u64 = 0x0000_0002;
    pub const DISABLE_THREAD_ID: u64 = 0x0000_0004;
    pub const ENABLE_PIN: u64 = 0x0000_0008;
    pub const ENABLE_STDOUT: u64 = 0x0000_0010;
    pub const ENABLE_STDERR: u64 = 0x0000_0020;
    /// Reopen, write and close the log file for every block.
    pub const ENABLE_FCLOSE: u64 = 0x0000_0040;

    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn contains(self, bit: u64) -> bool {
        self.0 & bit == bit
    }

    #[must_use]
    pub const fn file_log_enabled(self) -> bool {
        !self.contains(Self::DISABLE_LOG_FILE)
    }

    #[must_use]
    pub const fn process_id_enabled(self) -> bool {
        !self.contains(Self::DISABLE_PROCESS_ID)
    }

    #[must_use]
    pub const fn thread_id_enabled(self) -> bool {
        !self.contains(Self::DISABLE_THREAD_ID)
    }

    /// Credentials are redacted unless this returns `true`.
    #[must_use]
    pub const fn credentials_visible(self) -> bool {
        self.contains(Self::ENABLE_PIN)
    }

    #[must_use]
    pub const fn stdout_enabled(self) -> bool {
        self.contains(Self::ENABLE_STDOUT)
    }

    #[must_use]
    pub const fn stderr_enabled(self) -> bool {
        self.contains(Self::ENABLE_STDERR)
    }

    #[must_use]
    pub const fn force_flush(self) -> bool {
        self.contains(Self::ENABLE_FCLOSE)
    }
}

/// Immutable proxy configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub library_path: Option<PathBuf>,
    pub log_path: Option<PathBuf>,
    pub flags: LoggerFlags,
}

impl Settings {
    /// Decode from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key).map(|v| v.to_string_lossy().into_owned()))
    }

    /// Decode from an arbitrary key lookup.
    ///
    /// Empty paths count as unset. Malformed flags decode as `0`, which keeps
    /// every default (file log on, ids on, credentials redacted).
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let path = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
        };
        let flags = lookup(FLAGS_VAR)
            .and_then(|raw| parse_flags(&raw).ok())
            .unwrap_or(0);
        Self {
            library_path: path(LIBRARY_PATH_VAR),
            log_path: path(LOG_FILE_PATH_VAR),
            flags: LoggerFlags::from_bits(flags),
        }
    }
}

/// Parse a flags value: decimal, or hex with a `0x`/`0X` prefix.
pub fn parse_flags(raw: &str) -> Result<u64, SettingsError> {
    let trimmed = raw.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => trimmed.parse::<u64>(),
    };
    parsed.map_err(|_| SettingsError::InvalidFlags {
        raw: raw.to_string(),
    })
}
