// Every export takes raw pointers from a Cryptoki caller and passes them on to
// the real module unchanged; the contract is the Cryptoki one for that function.
#![allow(clippy::missing_safety_doc)]
//! # pkcs11-logger-abi
//!
//! `extern "C"` boundary of the PKCS#11 logging proxy.
//!
//! This crate produces a `cdylib` (`libpkcs11_logger.so`) exporting the 68
//! Cryptoki v2.40 functions. An application loads it in place of its real
//! module; each call is written to the log and forwarded to the module named
//! by `PKCS11_LOGGER_LIBRARY_PATH`.
//!
//! # Architecture
//!
//! ```text
//! caller -> entry point -> dispatch -> entry record -> real module -> exit record -> caller
//! ```
//!
//! The entry and exit records of one call form a single block; blocks from
//! different threads never interleave.

#[macro_use]
mod macros;

pub mod ck;
pub mod dispatch;
pub mod loader;
mod params;
pub mod proxy_abi;
pub mod sink;
pub mod state;
pub mod util;

pub use proxy_abi::{FUNCTION_LIST, OPERATIONS, OpId, operation};
pub use state::{ProxyState, global, install};
