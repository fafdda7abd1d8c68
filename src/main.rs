//! # ksymfilter - Main Entry Point
//!
//! Reads CSV-like log lines on stdin, rewrites every address that falls
//! inside a known kernel or module range, and writes the lines to stdout in
//! order. All diagnostics go to stderr (via env_logger), so stdout stays a
//! clean copy of the input stream with only the addresses substituted.

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use std::io::{self, BufWriter};

use ksymfilter::cli::Args;
use ksymfilter::filter;
use ksymfilter::module_table::parse_module_table;
use ksymfilter::resolver::SymbolResolver;
use ksymfilter::router::{ResolverTable, KERNEL_RANGE};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            EXIT_ERROR
        }
    });
}

/// Build the resolver table from CLI arguments.
///
/// Registration order matters for the first-match scan: the kernel range
/// first (when configured), then module ranges in module-table order.
fn build_table(args: &Args) -> Result<ResolverTable> {
    let mut table = ResolverTable::new();

    if let Some(ref kernel) = args.kernel {
        let resolver = SymbolResolver::for_binary(&args.addr2line, kernel)?;
        table.register(KERNEL_RANGE, kernel.display().to_string(), resolver)?;
    }

    if let Some(ref module_table) = args.module {
        let entries = parse_module_table(module_table)
            .with_context(|| format!("failed to parse module table {}", module_table.display()))?;

        for entry in entries {
            let path = entry.binary_path(&args.module_dir);
            if !path.exists() {
                warn!(
                    "module binary {} not found; resolving its addresses will fail",
                    path.display()
                );
            }
            let resolver = SymbolResolver::for_binary(&args.addr2line, &path)?;
            table.register(entry.range()?, path.display().to_string(), resolver)?;
        }
    }

    Ok(table)
}

fn run() -> Result<()> {
    let args = Args::parse();
    let mut table = build_table(&args)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    filter::run(stdin.lock(), BufWriter::new(stdout.lock()), &mut table)
}
