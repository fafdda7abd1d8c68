//! Line-oriented address rewriting
//!
//! A strict pull-process-push loop: read one line, swap each routable
//! address token for its resolved location, write the line onward. Lines
//! are read with their terminators so token-free input passes through
//! byte-for-byte.

use std::io::{BufRead, Write};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use log::{debug, info};
use regex::Regex;

use crate::router::ResolverTable;

// Bare 16-digit lowercase hex tokens with word boundaries. A 0x-prefixed
// run does not match (the `x` kills the left boundary), and neither does
// any longer hex run.
static ADDR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[0-9a-f]{16}\b").unwrap());

/// Run the filter over `input`, writing rewritten lines to `output`.
///
/// # Errors
/// Fails on input/output errors and on a broken symbolizer worker. Lookup
/// misses and unknown-symbol responses are not errors; those tokens pass
/// through untouched.
pub fn run<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    table: &mut ResolverTable,
) -> Result<()> {
    let mut line = String::new();
    let mut lines = 0u64;
    let mut rewritten = 0u64;

    loop {
        line.clear();
        if input.read_line(&mut line).context("failed to read input")? == 0 {
            break;
        }
        lines += 1;
        rewritten += rewrite_line(&mut line, table)?;
        output.write_all(line.as_bytes()).context("failed to write output")?;
    }

    output.flush().context("failed to flush output")?;
    info!("processed {lines} lines, rewrote {rewritten} addresses");
    Ok(())
}

/// Rewrite every resolvable address token in `line`, returning how many
/// distinct tokens were replaced.
///
/// A resolved token is substituted as a whole string, wrapped in double
/// quotes, so a token appearing more than once in the line is replaced at
/// every occurrence identically.
fn rewrite_line(line: &mut String, table: &mut ResolverTable) -> Result<u64> {
    let mut count = 0;

    for token in address_tokens(line) {
        let Ok(addr) = u64::from_str_radix(&token, 16) else {
            continue;
        };
        let Some(resolver) = table.lookup(addr) else {
            debug!("no range covers {token}");
            continue;
        };
        let resolved = resolver.resolve(&token)?;
        if resolved == token {
            // The worker could not place it; keep the raw address.
            continue;
        }
        *line = line.replace(&token, &format!("\"{resolved}\""));
        count += 1;
    }

    Ok(count)
}

/// Distinct address tokens in `line`, in first-appearance order.
fn address_tokens(line: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for m in ADDR_RE.find_iter(line) {
        if !tokens.iter().any(|t| t == m.as_str()) {
            tokens.push(m.as_str().to_string());
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_to_string(input: &str, table: &mut ResolverTable) -> String {
        let mut output = Vec::new();
        run(Cursor::new(input), &mut output, table).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_token_extraction() {
        assert_eq!(address_tokens("1,ffffffff81123450,x"), vec!["ffffffff81123450"]);
        assert_eq!(
            address_tokens("ffffffff81123450 ffffffffc0001050"),
            vec!["ffffffff81123450", "ffffffffc0001050"]
        );
    }

    #[test]
    fn test_token_extraction_dedups_repeats() {
        assert_eq!(
            address_tokens("ffffffff81123450,ffffffff81123450"),
            vec!["ffffffff81123450"]
        );
    }

    #[test]
    fn test_prefixed_and_oversized_runs_do_not_match() {
        // `x` is a word character, so 0x-prefixed addresses have no boundary
        assert!(address_tokens("0xffffffff81123450").is_empty());
        // 17 hex digits: no 16-digit window has boundaries on both sides
        assert!(address_tokens("fffffffff81123450").is_empty());
        // too short
        assert!(address_tokens("ffffffff8112345").is_empty());
        // uppercase is not an address token
        assert!(address_tokens("FFFFFFFF81123450").is_empty());
    }

    #[test]
    fn test_empty_table_passes_lines_through() {
        let mut table = ResolverTable::new();
        let input = "1,ffffffff81123450,foo\r\n2,no address here\nlast line no terminator";
        assert_eq!(run_to_string(input, &mut table), input);
    }

    #[test]
    fn test_token_free_line_is_unchanged() {
        let mut table = ResolverTable::new();
        let input = "cpu,event,count\n0,sched_switch,42\n";
        assert_eq!(run_to_string(input, &mut table), input);
    }
}
