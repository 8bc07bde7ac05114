//! Machine-readable summary of a parsed log.

use std::collections::{BTreeMap, BTreeSet};

use pkcs11_logger_core::record::INIT_FAILED;
use pkcs11_logger_core::render::{self, REDACTED_MARKER};
use serde::Serialize;

use crate::log_parse::{ParsedLog, Violation};

/// Per-function call counts.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct FunctionStats {
    pub calls: usize,
    pub ok: usize,
    pub failed: usize,
    /// Blocks without a result line.
    pub unfinished: usize,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Summary {
    pub records: usize,
    /// Distinct caller prefixes.
    pub callers: usize,
    /// Blocks written from inside another call.
    pub nested: usize,
    pub init_failures: usize,
    /// Parameter values replaced by the redaction marker.
    pub redacted_values: usize,
    pub functions: BTreeMap<String, FunctionStats>,
    /// Rendered result code -> occurrences.
    pub results: BTreeMap<String, usize>,
    pub violations: Vec<Violation>,
}

impl Summary {
    #[must_use]
    pub fn from_log(log: &ParsedLog) -> Self {
        let mut summary = Self {
            records: log.records.len(),
            violations: log.violations.clone(),
            ..Self::default()
        };
        let mut callers = BTreeSet::new();
        for record in &log.records {
            callers.insert(record.caller.clone());
            if record.depth > 0 {
                summary.nested += 1;
            }
            if record.notes.iter().any(|note| note.starts_with(INIT_FAILED)) {
                summary.init_failures += 1;
            }
            summary.redacted_values += record
                .inputs
                .iter()
                .chain(&record.outputs)
                .filter(|param| param.value.ends_with(REDACTED_MARKER))
                .count();

            let stats = summary.functions.entry(record.function.clone()).or_default();
            stats.calls += 1;
            match record.rv {
                Some(0) => stats.ok += 1,
                Some(_) => stats.failed += 1,
                None => stats.unfinished += 1,
            }
            if let Some(rv) = record.rv {
                *summary.results.entry(render::rv(rv)).or_default() += 1;
            }
        }
        summary.callers = callers.len();
        summary
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
