//! Persistent symbolization worker processes
//!
//! A [`SymbolResolver`] owns one spawned `addr2line` bound to a single binary
//! image and round-trips address tokens through it: one line written to the
//! worker's stdin, one line read back from its stdout. The protocol is
//! strictly sequential with no pipelining, so a request is never issued
//! before the previous response has been consumed.
//!
//! Responses are memoized per literal token, so each distinct token touches
//! the worker at most once. The cache is append-only and unbounded; the
//! filter lives for one stream, which keeps it small in practice.

use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use log::debug;

use crate::errors::ResolveError;

/// Default symbolization executable, overridable via `--addr2line`.
pub const DEFAULT_ADDR2LINE: &str = "addr2line";

/// One worker process bound to one binary image, plus its response cache.
#[derive(Debug)]
pub struct SymbolResolver {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    cache: HashMap<String, String>,
    label: String,
}

impl SymbolResolver {
    /// Spawn an addr2line worker for the given binary image.
    ///
    /// `-f` emits function names, `-C` demangles them, and `-p` keeps the
    /// response to one line per request (`function at file:line`).
    ///
    /// # Errors
    /// Returns an error if the symbolization executable cannot be spawned.
    pub fn for_binary(tool: &str, binary: &Path) -> Result<Self, ResolveError> {
        let mut cmd = Command::new(tool);
        cmd.args(["-f", "-C", "-p", "-e"]).arg(binary);
        Self::with_command(cmd, binary.display().to_string())
    }

    /// Spawn a worker from a pre-built command.
    ///
    /// The command must answer every line on its stdin with exactly one line
    /// on its stdout. This is the hook for substituting another symbolizer
    /// (or a stub in tests) for the stock addr2line invocation.
    ///
    /// # Errors
    /// Returns an error if the command cannot be spawned.
    pub fn with_command(mut cmd: Command, label: String) -> Result<Self, ResolveError> {
        cmd.stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::null());
        let mut child = cmd.spawn().map_err(|source| ResolveError::Spawn {
            program: cmd.get_program().to_string_lossy().into_owned(),
            source,
        })?;

        // Both pipes were configured just above, so take() cannot miss.
        let stdin = child.stdin.take().expect("child stdin is piped");
        let stdout = BufReader::new(child.stdout.take().expect("child stdout is piped"));

        debug!("spawned symbolizer for {label}");
        Ok(Self { child, stdin, stdout, cache: HashMap::new(), label })
    }

    /// The binary image this worker is bound to.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// OS process id of the worker.
    #[must_use]
    pub fn worker_pid(&self) -> u32 {
        self.child.id()
    }

    /// Translate one literal address token into a resolved location string.
    ///
    /// Cache hits return without touching the worker. On a miss, the token
    /// is written to the worker and one whitespace-trimmed response line is
    /// read back. A response containing `?` (addr2line's unknown-symbol
    /// convention) yields the original token instead of the marker text, so
    /// callers keep the raw address rather than leaking `??`.
    ///
    /// # Errors
    /// Returns an error if the worker has exited or either pipe is broken.
    /// The worker is not restarted.
    pub fn resolve(&mut self, token: &str) -> Result<String, ResolveError> {
        if let Some(hit) = self.cache.get(token) {
            return Ok(hit.clone());
        }

        self.stdin.write_all(token.as_bytes()).map_err(|e| self.worker_io(e))?;
        self.stdin.write_all(b"\n").map_err(|e| self.worker_io(e))?;
        self.stdin.flush().map_err(|e| self.worker_io(e))?;

        let mut response = String::new();
        let n = self.stdout.read_line(&mut response).map_err(|e| self.worker_io(e))?;
        if n == 0 {
            return Err(ResolveError::WorkerEof { label: self.label.clone() });
        }

        let response = response.trim();
        let resolved = if response.contains('?') { token } else { response };
        debug!("{}: {token} -> {resolved}", self.label);

        self.cache.insert(token.to_string(), resolved.to_string());
        Ok(resolved.to_string())
    }

    fn worker_io(&self, source: io::Error) -> ResolveError {
        ResolveError::WorkerIo { label: self.label.clone(), source }
    }
}

impl Drop for SymbolResolver {
    /// Terminate and reap the worker on every exit path, including error
    /// exits, so no child process or pipe outlives the filter.
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
