//! Parse a proxy log back into call records.
//!
//! The parser mirrors the record layout: a separator line opens a block, the
//! next line must be the entry line, and the block stays open until its
//! `Returning` line and any output lines after it. A block opened while
//! another one on the same caller is still waiting for its result is a
//! callback re-entering the proxy and is recorded as nested.
//!
//! Structural problems are collected as [`Violation`]s instead of aborting;
//! only unreadable input is a [`ParseError`].

use std::path::{Path, PathBuf};

use pkcs11_logger_core::record::{
    CALLING, FIELD_SEPARATOR, INPUT, OUTPUT, RETURNING, SEPARATOR,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed reading '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("input has no record separators")]
    NotALog,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub value: String,
}

/// One call as reconstructed from the log.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CallRecord {
    /// 1-based line of the entry line.
    pub line: usize,
    /// Process and thread ids from the line prefix, in order.
    pub caller: Vec<u64>,
    pub timestamp: String,
    pub function: String,
    /// Number of enclosing blocks still open when this one started.
    pub depth: usize,
    pub inputs: Vec<Param>,
    pub outputs: Vec<Param>,
    pub rv: Option<u64>,
    pub notes: Vec<String>,
}

impl CallRecord {
    /// First parameter called `name`, inputs before outputs.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.inputs
            .iter()
            .chain(&self.outputs)
            .find(|param| param.name == name)
            .map(|param| param.value.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Separator not followed by an entry line.
    MissingEntry,
    /// Line outside any block.
    OrphanLine,
    /// Block that never got its `Returning` line.
    Unterminated,
    /// Block from another caller opened inside a running block.
    Interleaved,
    /// Line whose prefix belongs to a different caller than its block.
    ForeignLine,
    /// `Returning` line without a hex result code.
    BadResult,
    /// Second `Returning` line in one block.
    DuplicateResult,
    /// Parameter line without `name: value`.
    MalformedParam,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Violation {
    pub line: usize,
    pub kind: ViolationKind,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ParsedLog {
    /// Records in log order of their entry lines.
    pub records: Vec<CallRecord>,
    pub violations: Vec<Violation>,
}

impl ParsedLog {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Records of calls to `function`.
    pub fn calls<'a>(&'a self, function: &'a str) -> impl Iterator<Item = &'a CallRecord> + 'a {
        self.records.iter().filter(move |record| record.function == function)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Input,
    Output,
}

#[derive(Debug)]
struct OpenBlock {
    record: CallRecord,
    section: Section,
}

#[derive(Default)]
struct Parser {
    open: Vec<OpenBlock>,
    done: Vec<CallRecord>,
    violations: Vec<Violation>,
    pending_separator: Option<usize>,
}

/// Read and parse a log file. Invalid UTF-8 is replaced, not rejected.
pub fn read_log(path: &Path) -> Result<ParsedLog, ParseError> {
    let bytes = std::fs::read(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&String::from_utf8_lossy(&bytes))
}

/// Parse log text. Empty input is an empty log.
pub fn parse(text: &str) -> Result<ParsedLog, ParseError> {
    if !text.trim().is_empty() && !text.lines().any(|line| line == SEPARATOR) {
        return Err(ParseError::NotALog);
    }
    let mut parser = Parser::default();
    for (index, line) in text.lines().enumerate() {
        parser.line(index + 1, line);
    }
    Ok(parser.finish())
}

/// Split the `0x%08x : ` id fields off the front of a line.
fn split_prefix(line: &str) -> (Vec<u64>, &str) {
    let mut ids = Vec::new();
    let mut rest = line;
    while ids.len() < 2 {
        let Some((field, tail)) = rest.split_once(FIELD_SEPARATOR) else {
            break;
        };
        let Some(id) = field
            .strip_prefix("0x")
            .and_then(|hex| u64::from_str_radix(hex, 16).ok())
        else {
            break;
        };
        ids.push(id);
        rest = tail;
    }
    (ids, rest)
}

/// `0x00000000 (CKR_OK)` -> `0`.
fn parse_result(text: &str) -> Option<u64> {
    let code = text.split_whitespace().next()?;
    u64::from_str_radix(code.strip_prefix("0x")?, 16).ok()
}

impl Parser {
    fn violation(&mut self, line: usize, kind: ViolationKind, message: impl Into<String>) {
        self.violations.push(Violation {
            line,
            kind,
            message: message.into(),
        });
    }

    /// Move finished blocks off the top of the stack.
    fn close_finished(&mut self) {
        while self.open.last().is_some_and(|block| block.record.rv.is_some()) {
            if let Some(block) = self.open.pop() {
                self.done.push(block.record);
            }
        }
    }

    fn line(&mut self, number: usize, line: &str) {
        if line == SEPARATOR {
            if let Some(previous) = self.pending_separator.replace(number) {
                self.violation(
                    previous,
                    ViolationKind::MissingEntry,
                    "separator without entry line",
                );
            }
            self.close_finished();
            return;
        }

        let (caller, body) = split_prefix(line);
        if let Some(separator) = self.pending_separator.take() {
            self.enter(separator, number, caller, body);
            return;
        }

        // A result line after a finished nested block belongs to the block
        // that was waiting on it.
        if body.starts_with(RETURNING)
            && self.open.len() > 1
            && self.open.last().is_some_and(|block| block.record.rv.is_some())
        {
            if let Some(block) = self.open.pop() {
                self.done.push(block.record);
            }
        }

        let Some(block) = self.open.last_mut() else {
            let message = format!("line outside a block: {body}");
            self.violation(number, ViolationKind::OrphanLine, message);
            return;
        };
        if block.record.caller != caller {
            let function = block.record.function.clone();
            self.violation(
                number,
                ViolationKind::ForeignLine,
                format!("line from {caller:x?} inside {function} block"),
            );
            return;
        }

        if body == INPUT {
            block.section = Section::Input;
        } else if body == OUTPUT {
            block.section = Section::Output;
        } else if let Some(result) = body.strip_prefix(RETURNING) {
            let duplicate = block.record.rv.is_some();
            match parse_result(result) {
                Some(_) if duplicate => {
                    self.violation(number, ViolationKind::DuplicateResult, body.to_string());
                }
                Some(rv) => block.record.rv = Some(rv),
                None => self.violation(number, ViolationKind::BadResult, body.to_string()),
            }
        } else if let Some(param) = body.strip_prefix(' ') {
            let Some((name, value)) = param.split_once(": ") else {
                self.violation(number, ViolationKind::MalformedParam, body.to_string());
                return;
            };
            let param = Param {
                name: name.to_string(),
                value: value.to_string(),
            };
            match block.section {
                Section::Output => block.record.outputs.push(param),
                Section::Input | Section::Header => block.record.inputs.push(param),
            }
        } else {
            block.record.notes.push(body.to_string());
        }
    }

    fn enter(&mut self, separator: usize, number: usize, caller: Vec<u64>, body: &str) {
        let marker = format!("{FIELD_SEPARATOR}{CALLING}");
        let Some((timestamp, function)) = body.split_once(&marker) else {
            let message = format!("expected entry line, got: {body}");
            self.violation(separator, ViolationKind::MissingEntry, message);
            return;
        };
        if let Some(outer) = self.open.last() {
            if outer.record.caller != caller {
                let message = format!("{function} opened inside {}", outer.record.function);
                self.violation(number, ViolationKind::Interleaved, message);
            }
        }
        self.open.push(OpenBlock {
            record: CallRecord {
                line: number,
                caller,
                timestamp: timestamp.to_string(),
                function: function.to_string(),
                depth: self.open.len(),
                inputs: Vec::new(),
                outputs: Vec::new(),
                rv: None,
                notes: Vec::new(),
            },
            section: Section::Header,
        });
    }

    fn finish(mut self) -> ParsedLog {
        if let Some(separator) = self.pending_separator.take() {
            self.violation(separator, ViolationKind::MissingEntry, "log ends after a separator");
        }
        while let Some(block) = self.open.pop() {
            if block.record.rv.is_none() {
                let message = format!("{} has no result line", block.record.function);
                self.violation(block.record.line, ViolationKind::Unterminated, message);
            }
            self.done.push(block.record);
        }
        self.done.sort_by_key(|record| record.line);
        self.violations
            .sort_by(|a, b| a.line.cmp(&b.line).then_with(|| a.kind.cmp(&b.kind)));
        ParsedLog {
            records: self.done,
            violations: self.violations,
        }
    }
}
