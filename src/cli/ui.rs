use crate::print::Printer;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Creates a standard spinner ProgressBar drawing to stderr.
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.blue.bold} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&[
            "▹▹▹▹▹",
            "▸▹▹▹▹",
            "▹▸▹▹▹",
            "▹▹▸▹▹",
            "▹▹▹▸▹",
            "▹▹▹▹▸",
            "▪▪▪▪▪",
        ]);
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Progress feedback for a blocking wait.
///
/// Animates on a terminal. Elsewhere it writes one line when it starts and one
/// when it stops so logs stay readable.
pub struct Spinner<'a> {
    printer: &'a Printer,
    message: String,
    bar: Option<ProgressBar>,
}

impl<'a> Spinner<'a> {
    pub fn start(printer: &'a Printer, message: &str) -> Self {
        let animate = printer.stderr_is_terminal() && printer.verbosity() <= crate::print::Level::Info;
        let bar = if animate {
            Some(create_spinner(message))
        } else {
            printer.info(&format!("{}...", message));
            None
        };
        Self {
            printer,
            message: message.to_string(),
            bar,
        }
    }

    pub fn stop(mut self) {
        match self.bar.take() {
            Some(bar) => {
                bar.finish_and_clear();
                self.printer
                    .info(&format!("{} {}", self.message, "✓".green()));
            }
            None => self.printer.info(&format!("{}: done", self.message)),
        }
    }

    /// Clears the animation without reporting success.
    pub fn stop_with_error(mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl Drop for Spinner<'_> {
    fn drop(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::print::buffered_printer;

    #[test]
    fn non_terminal_writes_start_and_done_lines() {
        let (p, out, err) = buffered_printer("");
        let s = Spinner::start(&p, "Creating instance");
        s.stop();
        assert_eq!(out.contents(), "");
        assert_eq!(err.contents(), "Creating instance...\nCreating instance: done\n");
    }

    #[test]
    fn error_stop_writes_nothing_more() {
        let (p, _, err) = buffered_printer("");
        let s = Spinner::start(&p, "Deleting instance");
        s.stop_with_error();
        assert_eq!(err.contents(), "Deleting instance...\n");
    }
}
