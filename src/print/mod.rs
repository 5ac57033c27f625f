mod debug;
mod prompt;

pub use debug::{
    build_debug_str_from_body, build_debug_str_from_headers, build_debug_str_from_input_model,
    build_debug_str_from_map, DEFAULT_HTTP_HEADERS,
};
pub use prompt::{PasswordReader, TermPasswordReader};

use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, BufRead, BufReader, Write};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Verbosity levels, ordered from most to least chatty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl Level {
    pub const VALUES: [&'static str; 4] = ["debug", "info", "warning", "error"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => Level::Debug,
            1 => Level::Info,
            2 => Level::Warning,
            _ => Level::Error,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Level::Debug => 0,
            Level::Info => 1,
            Level::Warning => 2,
            Level::Error => 3,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warning" => Ok(Level::Warning),
            "error" => Ok(Level::Error),
            other => Err(format!(
                "unknown verbosity {:?}, must be one of {:?}",
                other,
                Level::VALUES
            )),
        }
    }
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Owns the process output streams and gates everything written to them by verbosity.
///
/// Results go to stdout unconditionally. Progress, warnings and errors go to stderr.
pub struct Printer {
    out: Mutex<Box<dyn Write + Send>>,
    err: Mutex<Box<dyn Write + Send>>,
    input: Mutex<Box<dyn BufRead + Send>>,
    verbosity: AtomicU8,
    stdout_tty: bool,
    stderr_tty: bool,
    input_model_logged: AtomicBool,
    password_reader: Box<dyn PasswordReader>,
    env: EnvLookup,
}

impl Printer {
    /// Printer bound to the process stdio.
    pub fn stdio() -> Self {
        let mut printer = Self::new(
            Box::new(io::stdout()),
            Box::new(io::stderr()),
            Box::new(BufReader::new(io::stdin())),
        );
        printer.stdout_tty = console::Term::stdout().is_term();
        printer.stderr_tty = console::Term::stderr().is_term();
        printer
    }

    /// Printer over arbitrary streams. Neither stream is treated as a terminal.
    pub fn new(
        out: Box<dyn Write + Send>,
        err: Box<dyn Write + Send>,
        input: Box<dyn BufRead + Send>,
    ) -> Self {
        Self {
            out: Mutex::new(out),
            err: Mutex::new(err),
            input: Mutex::new(input),
            verbosity: AtomicU8::new(Level::Info.as_u8()),
            stdout_tty: false,
            stderr_tty: false,
            input_model_logged: AtomicBool::new(false),
            password_reader: Box::new(TermPasswordReader),
            env: Box::new(|key| std::env::var(key).ok()),
        }
    }

    pub fn with_password_reader(mut self, reader: Box<dyn PasswordReader>) -> Self {
        self.password_reader = reader;
        self
    }

    /// Replaces the environment lookup used by the password prompt.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Box::new(lookup);
        self
    }

    pub fn verbosity(&self) -> Level {
        Level::from_u8(self.verbosity.load(Ordering::Relaxed))
    }

    pub fn set_verbosity(&self, level: Level) {
        self.verbosity.store(level.as_u8(), Ordering::Relaxed);
    }

    pub fn is_verbosity_debug(&self) -> bool {
        self.verbosity() == Level::Debug
    }

    pub fn stdout_is_terminal(&self) -> bool {
        self.stdout_tty
    }

    pub fn stderr_is_terminal(&self) -> bool {
        self.stderr_tty
    }

    /// Writes `msg` to stdout as is.
    pub fn output(&self, msg: &str) {
        let mut out = lock(&self.out);
        let _ = out.write_all(msg.as_bytes());
        let _ = out.flush();
    }

    pub fn outputln(&self, msg: &str) {
        self.output(&format!("{}\n", msg));
    }

    pub fn info(&self, msg: &str) {
        if self.verbosity() <= Level::Info {
            self.write_err(&format!("{}\n", msg));
        }
    }

    pub fn warn(&self, msg: &str) {
        if self.verbosity() <= Level::Warning {
            let prefix = if self.stderr_tty {
                "Warning".yellow().bold().to_string()
            } else {
                "Warning".to_string()
            };
            self.write_err(&format!("{}: {}\n", prefix, msg));
        }
    }

    /// Always emitted, whatever the verbosity.
    pub fn error(&self, msg: &str) {
        let prefix = if self.stderr_tty {
            "Error".red().bold().to_string()
        } else {
            "Error".to_string()
        };
        self.write_err(&format!("{}: {}\n", prefix, msg));
    }

    /// Writes a bare line to stderr, bypassing the verbosity gate.
    pub fn errln(&self, msg: &str) {
        self.write_err(&format!("{}\n", msg));
    }

    pub fn debug(&self, level: Level, msg: &str) {
        if !self.is_verbosity_debug() {
            return;
        }
        match level {
            Level::Debug => tracing::debug!("{}", msg),
            Level::Info => tracing::info!("{}", msg),
            Level::Warning => tracing::warn!("{}", msg),
            Level::Error => tracing::error!("{}", msg),
        }
    }

    /// Logs the parsed input model once per invocation.
    pub fn debug_input_model<T: Serialize>(&self, model: &T) {
        if !self.is_verbosity_debug() || self.input_model_logged.swap(true, Ordering::SeqCst) {
            return;
        }
        match build_debug_str_from_input_model(model) {
            Ok(s) => self.debug(Level::Debug, &format!("parsed input values: {}", s)),
            Err(e) => self.debug(
                Level::Error,
                &format!("convert model to string for debugging: {}", e),
            ),
        }
    }

    pub(crate) fn write_err(&self, msg: &str) {
        let mut err = lock(&self.err);
        let _ = err.write_all(msg.as_bytes());
        let _ = err.flush();
    }

    pub(crate) fn read_line(&self) -> io::Result<Option<String>> {
        let mut input = lock(&self.input);
        let mut line = String::new();
        match input.read_line(&mut line)? {
            0 => Ok(None),
            _ => Ok(Some(line)),
        }
    }

    pub(crate) fn lookup_env(&self, key: &str) -> Option<String> {
        (self.env)(key)
    }

    pub(crate) fn password_reader(&self) -> &dyn PasswordReader {
        self.password_reader.as_ref()
    }
}

fn lock<T: ?Sized>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Clonable in-memory writer, handy for capturing what a [`Printer`] emits.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&lock(&self.0)).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        lock(&self.0).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Printer writing into fresh buffers and reading `stdin`, for tests.
pub fn buffered_printer(stdin: &str) -> (Printer, SharedBuffer, SharedBuffer) {
    let out = SharedBuffer::new();
    let err = SharedBuffer::new();
    let printer = Printer::new(
        Box::new(out.clone()),
        Box::new(err.clone()),
        Box::new(io::Cursor::new(stdin.as_bytes().to_vec())),
    )
    .with_env(|_| None);
    (printer, out, err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_is_gated_by_verbosity() {
        let (p, out, err) = buffered_printer("");
        p.info("creating");
        p.set_verbosity(Level::Warning);
        p.info("hidden");
        p.warn("careful");
        p.set_verbosity(Level::Error);
        p.warn("hidden too");
        p.error("boom");

        assert_eq!(out.contents(), "");
        assert_eq!(err.contents(), "creating\nWarning: careful\nError: boom\n");
    }

    #[test]
    fn output_goes_to_stdout() {
        let (p, out, err) = buffered_printer("");
        p.set_verbosity(Level::Error);
        p.output("a");
        p.outputln("b");
        assert_eq!(out.contents(), "ab\n");
        assert!(err.contents().is_empty());
    }

    #[test]
    fn level_parses_case_insensitively() {
        assert_eq!("DEBUG".parse::<Level>(), Ok(Level::Debug));
        assert_eq!("warning".parse::<Level>(), Ok(Level::Warning));
        assert!("trace".parse::<Level>().is_err());
        assert!(Level::Debug < Level::Info);
    }

    #[test]
    fn input_model_is_not_logged_without_debug() {
        let (p, _out, _err) = buffered_printer("");
        p.debug_input_model(&serde_json::json!({"a": 1}));
        assert!(!p.input_model_logged.load(Ordering::SeqCst));

        p.set_verbosity(Level::Debug);
        p.debug_input_model(&serde_json::json!({"a": 1}));
        assert!(p.input_model_logged.load(Ordering::SeqCst));
    }
}
