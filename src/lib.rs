//! # ksymfilter - Kernel Log Address Rewriting
//!
//! ksymfilter is a line-oriented filter that translates raw memory addresses
//! embedded in CSV-like kernel log lines into human-readable
//! `function at file:line` locations. Resolution is delegated to one
//! long-lived `addr2line` process per binary image (the kernel image plus one
//! per loadable module); an address-range table decides which process owns a
//! given address.
//!
//! ## Pipeline
//!
//! ```text
//! stdin ──▶ filter ─────▶ router ───────▶ resolver ──▶ stdout
//!           extract       which binary    addr2line child
//!           16-hex        owns this       process + per-token
//!           tokens        address?        cache
//! ```
//!
//! ## Module Structure
//!
//! - [`filter`]: the pull-process-push loop over input lines
//!   - extracts bare 16-digit lowercase hex tokens (word-boundary semantics)
//!   - replaces every occurrence of a resolved token, quoted, in the line
//!   - passes unresolvable tokens and token-free lines through untouched
//!
//! - [`router`]: ordered table of disjoint address ranges, one per binary
//!   - registration rejects overlapping ranges up front
//!   - point lookup is a first-match linear scan, memoized per address
//!
//! - [`resolver`]: persistent `addr2line` worker processes
//!   - one line-based request/response round trip per uncached token
//!   - children are killed and reaped when the resolver is dropped
//!
//! - [`module_table`]: parses the loaded-module manifest (name, size, base
//!   load address) and derives `<module_dir>/<name>.ko` binary paths
//!
//! - [`cli`]: command-line argument parsing
//!
//! - [`errors`]: structured error types shared by the modules above
//!
//! ## Typical Usage
//!
//! ```bash
//! # Kernel addresses only
//! ksymfilter -e vmlinux < trace.csv
//!
//! # Kernel plus loadable modules
//! ksymfilter -e vmlinux -m modules.list -d /lib/modules/extra < trace.csv
//! ```
//!
//! Everything is single-threaded and synchronous: at most one request is in
//! flight per worker process, and a hung worker blocks the whole filter.

// Expose modules for testing
pub mod cli;
pub mod errors;
pub mod filter;
pub mod module_table;
pub mod resolver;
pub mod router;
