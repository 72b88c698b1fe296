//! The pipeline `Context` object.
//!
//! A block pipeline external to this crate (out of scope per the design
//! doc) hands each transform an untyped string-keyed map describing how
//! the current block should be processed. `Context` wraps that map with
//! typed accessors for the keys this workspace's transforms actually
//! read or write, the same way the teacher workspace wraps a bare `u8`
//! compression level in a small typed [`crate::CompressionLevel`]-style
//! struct rather than passing raw integers around.

use std::collections::HashMap;
use std::fmt;

/// A data-type hint/outcome carried in the `"dataType"` context key.
///
/// Transforms such as the UTF-8 alias codec and the EXE filter both read
/// this (to skip their own detection when the pipeline already knows the
/// type) and write it (once they've detected a type, so later stages and
/// telemetry can use it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataType {
    /// No hint; the transform must run its own detection.
    #[default]
    Undefined,
    /// Valid UTF-8 text.
    Utf8,
    /// A recognized executable image (ELF/PE/Mach-O).
    Exe,
    /// Multimedia payload (images, audio); informational only in this
    /// crate, no transform here acts on it.
    Multimedia,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Undefined => "UNDEFINED",
            Self::Utf8 => "UTF8",
            Self::Exe => "EXE",
            Self::Multimedia => "MULTIMEDIA",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for DataType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "UTF8" => Self::Utf8,
            "EXE" => Self::Exe,
            "MULTIMEDIA" => Self::Multimedia,
            _ => Self::Undefined,
        })
    }
}

/// Pipeline configuration and per-block hints, shared with every
/// transform invoked on a block.
///
/// Backed by a plain string map (mirroring the source pipeline's
/// untyped context) so unrecognized keys round-trip unchanged; the
/// typed accessors below cover every key this workspace reads.
#[derive(Debug, Clone, Default)]
pub struct Context {
    entries: HashMap<String, String>,
}

impl Context {
    /// An empty context (every typed accessor returns its default).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a raw key/value pair.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Look up a raw key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// The `"transform"` chain, e.g. `"BWT+MTFT+ZRLT"`, `"ROLZ"`,
    /// `"ROLZX"`, `"UTF8"`, `"EXE"`, `"NONE"`, split on `+`/`,`.
    pub fn transform_chain(&self) -> Vec<&str> {
        match self.get("transform") {
            Some(s) if !s.is_empty() => s.split(['+', ',']).collect(),
            _ => vec!["NONE"],
        }
    }

    /// The `"entropy"` coder name, e.g. `"ANS0"`, `"ANS1"`, `"FPAQ"`,
    /// `"RANGE"`.
    pub fn entropy(&self) -> &str {
        self.get("entropy").unwrap_or("ANS0")
    }

    /// The `"blockSize"` value, rounded up to a multiple of 16 as the
    /// contract requires.
    pub fn block_size(&self) -> Option<usize> {
        self.get("blockSize")
            .and_then(|s| s.parse::<usize>().ok())
            .map(|n| n.next_multiple_of(16))
    }

    /// The `"dataType"` hint/outcome.
    pub fn data_type(&self) -> DataType {
        self.get("dataType")
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Record a detected data type back into the context for downstream
    /// consumers.
    pub fn set_data_type(&mut self, data_type: DataType) -> &mut Self {
        self.set("dataType", data_type.to_string())
    }

    /// The `"jobs"` worker count (pipeline-level, consumed by BWT's
    /// inverse fan-out). Defaults to 1.
    pub fn jobs(&self) -> usize {
        self.get("jobs")
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(1)
    }

    /// Whether the pipeline wants a checksum computed (pipeline-level;
    /// no transform in this crate computes one itself).
    pub fn checksum(&self) -> bool {
        matches!(self.get("checksum"), Some("true") | Some("1"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_chain_splits_on_plus() {
        let mut ctx = Context::new();
        ctx.set("transform", "BWT+MTFT+ZRLT");
        assert_eq!(ctx.transform_chain(), vec!["BWT", "MTFT", "ZRLT"]);
    }

    #[test]
    fn missing_transform_defaults_to_none() {
        let ctx = Context::new();
        assert_eq!(ctx.transform_chain(), vec!["NONE"]);
    }

    #[test]
    fn block_size_rounds_up_to_multiple_of_16() {
        let mut ctx = Context::new();
        ctx.set("blockSize", "1000001");
        assert_eq!(ctx.block_size(), Some(1_000_016));
    }

    #[test]
    fn data_type_round_trips_through_display_and_parse() {
        let mut ctx = Context::new();
        ctx.set_data_type(DataType::Utf8);
        assert_eq!(ctx.data_type(), DataType::Utf8);
        assert_eq!(ctx.get("dataType"), Some("UTF8"));
    }

    #[test]
    fn jobs_defaults_to_one_and_rejects_zero() {
        let mut ctx = Context::new();
        assert_eq!(ctx.jobs(), 1);
        ctx.set("jobs", "0");
        assert_eq!(ctx.jobs(), 1);
        ctx.set("jobs", "4");
        assert_eq!(ctx.jobs(), 4);
    }
}
