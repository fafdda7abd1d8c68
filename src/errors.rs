//! Structured error types for ksymfilter
//!
//! Using thiserror for automatic Display implementation and error chaining.

use thiserror::Error;

/// Errors raised while building the resolver table at startup.
///
/// All of these are configuration errors: the run aborts before any input
/// is consumed.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("module table line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error("module {name}: base 0x{base:x} plus size {size} overflows the 64-bit address space")]
    RangeOverflow { name: String, base: u64, size: u64 },

    #[error(
        "range 0x{start:016x}-0x{end:016x} for {label} overlaps \
         0x{prev_start:016x}-0x{prev_end:016x} for {prev_label}"
    )]
    OverlappingRange {
        start: u64,
        end: u64,
        label: String,
        prev_start: u64,
        prev_end: u64,
        prev_label: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors from a symbolization worker process.
///
/// A broken worker is fatal to the whole run: there is no restart or retry
/// policy, matching the strictly sequential request/response protocol.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("symbolizer for {label} is gone: {source}")]
    WorkerIo {
        label: String,
        #[source]
        source: std::io::Error,
    },

    #[error("symbolizer for {label} closed its output stream")]
    WorkerEof { label: String },
}
