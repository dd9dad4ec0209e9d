//! Confirmation of destructive actions

use std::io::{self, BufRead, Write};

/// The only response that confirms an overwrite
pub const CONFIRM_TOKEN: &str = "O";

/// Asks whether a destructive action may proceed
pub trait Confirmation {
    /// Show `prompt` and return `true` only on explicit approval
    fn confirm(&mut self, prompt: &str) -> io::Result<bool>;
}

/// True only for the exact confirmation token; the trailing line ending is
/// ignored, nothing else is.
pub fn is_confirmation(response: &str) -> bool {
    response.trim_end_matches(&['\r', '\n'][..]) == CONFIRM_TOKEN
}

/// Prompts on stdout and blocks on one line of stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinConfirmation;

impl Confirmation for StdinConfirmation {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        let mut stdout = io::stdout();
        writeln!(stdout, "{}", prompt)?;
        stdout.flush()?;

        let mut response = String::new();
        io::stdin().lock().read_line(&mut response)?;
        Ok(is_confirmation(&response))
    }
}

/// Answers every prompt with a fixed response.
#[derive(Debug, Clone)]
pub struct ScriptedConfirmation {
    response: String,
    prompts: Vec<String>,
}

impl ScriptedConfirmation {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            prompts: Vec::new(),
        }
    }

    /// Prompts shown so far
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl Confirmation for ScriptedConfirmation {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        self.prompts.push(prompt.to_string());
        Ok(is_confirmation(&self.response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_exact_token_confirms() {
        assert!(is_confirmation("O"));
        assert!(is_confirmation("O\n"));
        assert!(is_confirmation("O\r\n"));
        assert!(!is_confirmation(""));
        assert!(!is_confirmation("\n"));
        assert!(!is_confirmation("o"));
        assert!(!is_confirmation("0"));
        assert!(!is_confirmation("OO"));
        assert!(!is_confirmation(" O"));
        assert!(!is_confirmation("yes"));
    }

    #[test]
    fn test_scripted_records_prompts() {
        let mut confirmation = ScriptedConfirmation::new("O");
        assert!(confirmation.confirm("overwrite?").unwrap());
        assert_eq!(confirmation.prompts(), &["overwrite?".to_string()]);
    }
}
