//! Safe logic for the PKCS#11 logging proxy.
//!
//! Everything here works on plain integers and byte slices. Reading the raw
//! Cryptoki structures handed over by the calling application is the job of
//! `pkcs11-logger-abi`; this crate decides how the values it extracts look in
//! the log.
//!
//! # Architecture
//!
//! ```text
//! C caller -> ABI shim -> (raw reads) -> render/record (this crate) -> log sink
//! ```
//!
//! - **Translation tables** (`translate`): total code-to-name lookups
//! - **Rendering** (`render`): markers, hex dumps, enumerations, flag words
//! - **Records** (`record`): line-oriented entry/exit blocks
//! - **Settings** (`settings`): decoded configuration and flag bits
//! - **Metrics** (`metrics`): atomic counters for observability

#![deny(unsafe_code)]

pub mod metrics;
pub mod record;
pub mod render;
pub mod settings;
pub mod translate;

pub use metrics::{MetricsSnapshot, ProxyMetrics};
pub use record::{CallerIds, Record};
pub use settings::{LoggerFlags, Settings, SettingsError};
pub use translate::AttributeKind;
