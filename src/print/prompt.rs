use super::{Level, Printer};
use crate::cli::error::CliError;
use dialoguer::Password;
use std::io;

/// Reads a secret from the terminal without echoing it.
pub trait PasswordReader: Send + Sync {
    fn read_password(&self, prompt: &str) -> io::Result<String>;
}

/// Reads through the controlling terminal on stderr.
pub struct TermPasswordReader;

impl PasswordReader for TermPasswordReader {
    fn read_password(&self, prompt: &str) -> io::Result<String> {
        Password::new()
            .with_prompt(prompt)
            .interact_on(&console::Term::stderr())
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
    }
}

impl Printer {
    /// Asks a yes/no question on stderr and reads the answer from stdin.
    ///
    /// `y` and `yes` (any case) confirm. Every other answer, including an empty
    /// line or end of input, is a refusal and yields [`CliError::Aborted`].
    pub fn prompt_for_confirmation(&self, prompt: &str) -> Result<(), CliError> {
        self.write_err(&format!("{} [y/N] ", prompt));
        let answer = self
            .read_line()
            .map_err(|e| CliError::Prompt(format!("read user response: {}", e)))?;

        match answer.as_deref().map(|a| a.trim().to_lowercase()) {
            Some(a) if a == "y" || a == "yes" => Ok(()),
            Some(_) => Err(CliError::Aborted),
            None => {
                self.write_err("\n");
                Err(CliError::Aborted)
            }
        }
    }

    /// Skips the question entirely when `assume_yes` is set.
    pub fn confirm(&self, assume_yes: bool, prompt: &str) -> Result<(), CliError> {
        if assume_yes {
            return Ok(());
        }
        self.prompt_for_confirmation(prompt)
    }

    /// Reads a password twice and checks both entries match.
    ///
    /// A non-empty `env_var` takes precedence and no terminal read happens.
    pub fn prompt_for_password(&self, prompt: &str, env_var: &str) -> Result<String, CliError> {
        if let Some(password) = self.lookup_env(env_var).filter(|p| !p.is_empty()) {
            self.debug(
                Level::Debug,
                &format!("using password from environment variable {}", env_var),
            );
            return Ok(password);
        }

        let reader = self.password_reader();
        let password = reader
            .read_password(prompt)
            .map_err(|e| CliError::Prompt(format!("read password: {}", e)))?;
        let confirmation = reader
            .read_password("Confirm password: ")
            .map_err(|e| CliError::Prompt(format!("read password confirmation: {}", e)))?;

        if password != confirmation {
            return Err(CliError::Prompt("passwords do not match".to_string()));
        }
        Ok(password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::print::buffered_printer;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct ScriptedReader {
        answers: Mutex<Vec<String>>,
        reads: Arc<AtomicUsize>,
    }

    impl ScriptedReader {
        fn new(answers: &[&str], reads: Arc<AtomicUsize>) -> Self {
            let mut answers: Vec<String> = answers.iter().map(|s| s.to_string()).collect();
            answers.reverse();
            Self {
                answers: Mutex::new(answers),
                reads,
            }
        }
    }

    impl PasswordReader for ScriptedReader {
        fn read_password(&self, _prompt: &str) -> io::Result<String> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.answers
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no input"))
        }
    }

    #[test]
    fn confirmation_accepts_yes_variants() {
        for input in ["y\n", "Y\n", "yes\n", " YeS \n"] {
            let (p, _, _) = buffered_printer(input);
            assert!(p.prompt_for_confirmation("Sure?").is_ok(), "input {:?}", input);
        }
    }

    #[test]
    fn confirmation_refuses_everything_else() {
        for input in ["no\n", "n\n", "\n", "maybe\n", ""] {
            let (p, _, err) = buffered_printer(input);
            let result = p.prompt_for_confirmation("Sure?");
            assert!(matches!(result, Err(CliError::Aborted)), "input {:?}", input);
            assert!(err.contents().starts_with("Sure? [y/N] "));
        }
    }

    #[test]
    fn assume_yes_never_reads_input() {
        let (p, _, err) = buffered_printer("no\n");
        assert!(p.confirm(true, "Sure?").is_ok());
        assert!(err.contents().is_empty());
        assert_eq!(p.read_line().unwrap().as_deref(), Some("no\n"));
    }

    #[test]
    fn password_from_env_skips_terminal() {
        let reads = Arc::new(AtomicUsize::new(0));
        let (p, _, _) = buffered_printer("");
        let p = p
            .with_env(|k| (k == "PW_VAR").then(|| "s3cret".to_string()))
            .with_password_reader(Box::new(ScriptedReader::new(&[], reads.clone())));

        assert_eq!(p.prompt_for_password("Enter: ", "PW_VAR").unwrap(), "s3cret");
        assert_eq!(reads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn password_requires_matching_confirmation() {
        let reads = Arc::new(AtomicUsize::new(0));
        let (p, _, _) = buffered_printer("");
        let p = p.with_password_reader(Box::new(ScriptedReader::new(&["a", "b"], reads.clone())));
        let err = p.prompt_for_password("Enter: ", "PW_VAR").unwrap_err();
        assert_eq!(err.to_string(), "passwords do not match");
        assert_eq!(reads.load(Ordering::SeqCst), 2);

        let (p, _, _) = buffered_printer("");
        let p = p.with_password_reader(Box::new(ScriptedReader::new(&["a", "a"], reads.clone())));
        assert_eq!(p.prompt_for_password("Enter: ", "PW_VAR").unwrap(), "a");
    }
}
