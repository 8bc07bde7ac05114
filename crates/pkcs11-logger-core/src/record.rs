//! Line-oriented call records.
//!
//! A record is one block of the log: a separator, the entry line, the
//! parameter lines, and the exit line. Every line but the separator carries
//! the caller prefix, so concurrent blocks stay attributable to a thread.
//!
//! ```text
//! ****************************************************************************
//! 0x00001a2b : 0x00001a2c : 2026-10-16 09:41:07.123 : Calling C_DigestUpdate
//! 0x00001a2b : 0x00001a2c : Input
//! 0x00001a2b : 0x00001a2c :  hSession: 1
//! 0x00001a2b : 0x00001a2c :  pPart: 4 bytes: DEADBEEF
//! 0x00001a2b : 0x00001a2c : Returning 0x00000000 (CKR_OK)
//! ```

use std::fmt::{Display, Write as _};

use crate::render;

/// Separator line opening every record.
pub const SEPARATOR: &str =
    "****************************************************************************";
/// Text between the timestamp and the operation name on the entry line.
pub const CALLING: &str = "Calling ";
/// Text opening the exit line.
pub const RETURNING: &str = "Returning ";
/// Header before input parameters.
pub const INPUT: &str = "Input";
/// Header before output parameters.
pub const OUTPUT: &str = "Output";
/// Separator between prefix fields.
pub const FIELD_SEPARATOR: &str = " : ";
/// Note written in place of parameters when the real module cannot be loaded.
pub const INIT_FAILED: &str = "Proxy initialization failed";

/// Process and thread identity of the caller, each optional per flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallerIds {
    pub pid: Option<u64>,
    pub tid: Option<u64>,
}

impl CallerIds {
    fn prefix(self) -> String {
        let mut prefix = String::new();
        for id in [self.pid, self.tid].into_iter().flatten() {
            let _ = write!(prefix, "0x{id:08x}{FIELD_SEPARATOR}");
        }
        prefix
    }
}

/// Builder for one record block.
///
/// Lines accumulate until [`Record::take`] hands the text to the sink, so the
/// entry half can be written before the real call and the exit half after.
#[derive(Debug)]
pub struct Record {
    prefix: String,
    text: String,
}

impl Record {
    #[must_use]
    pub fn new(ids: CallerIds) -> Self {
        Self {
            prefix: ids.prefix(),
            text: String::with_capacity(512),
        }
    }

    pub fn separator(&mut self) {
        self.text.push_str(SEPARATOR);
        self.text.push('\n');
    }

    /// Entry line: timestamp and operation name.
    pub fn enter(&mut self, function: &str, timestamp: &str) {
        self.line(format_args!("{timestamp}{FIELD_SEPARATOR}{CALLING}{function}"));
    }

    /// Section header (`Input` / `Output`).
    pub fn section(&mut self, title: &str) {
        self.line(format_args!("{title}"));
    }

    /// One parameter line, tagged by name.
    pub fn param(&mut self, name: &str, value: impl Display) {
        self.line(format_args!(" {name}: {value}"));
    }

    /// Free-form note inside the block.
    pub fn note(&mut self, message: impl Display) {
        self.line(format_args!("{message}"));
    }

    /// Exit line with the translated result code.
    pub fn exit(&mut self, rv: u64) {
        self.line(format_args!("{RETURNING}{}", render::rv(rv)));
    }

    fn line(&mut self, body: std::fmt::Arguments<'_>) {
        self.text.push_str(&self.prefix);
        let _ = self.text.write_fmt(body);
        self.text.push('\n');
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Hand over the accumulated lines and start empty again.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.text)
    }
}

/// Local wall-clock timestamp with millisecond precision.
#[must_use]
pub fn timestamp_now() -> String {
    chrono::Local::now()
        .format("%Y-%m-%d %H:%M:%S%.3f")
        .to_string()
}
