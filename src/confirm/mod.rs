//! Yes/no confirmation before a lifecycle operation runs.

use std::io::{BufRead, Write};

/// Answers the per-plugin confirmation questions.
pub trait Confirmation {
    /// Ask one question; `Ok(true)` means go ahead.
    fn confirm(&mut self, question: &str) -> std::io::Result<bool>;
}

/// Non-interactive mode: every action is affirmed without blocking.
#[derive(Debug, Default)]
pub struct AutoConfirm;

impl Confirmation for AutoConfirm {
    fn confirm(&mut self, _question: &str) -> std::io::Result<bool> {
        Ok(true)
    }
}

/// Interactive mode: prompt on stdout, read one line from stdin.
#[derive(Debug, Default)]
pub struct StdinConfirm;

impl Confirmation for StdinConfirm {
    fn confirm(&mut self, question: &str) -> std::io::Result<bool> {
        print!("{question}");
        std::io::stdout().flush()?;

        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        Ok(is_affirmative(&line, true))
    }
}

/// Interpret one answer line against a default.
///
/// Empty input takes the default; a case-insensitive `y` or `j` prefix
/// affirms (so `yes` and `ja` both work), anything else declines.
pub fn is_affirmative(line: &str, default: bool) -> bool {
    let answer = line.trim();
    if answer.is_empty() {
        return default;
    }
    matches!(answer.as_bytes()[0], b'y' | b'Y' | b'j' | b'J')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affirmative_answers() {
        for answer in ["y", "Y", "j", "J", "yes", "Yes", "ja", "Ja\n"] {
            assert!(is_affirmative(answer, true), "{answer:?} should affirm");
            assert!(is_affirmative(answer, false), "{answer:?} should affirm");
        }
    }

    #[test]
    fn test_negative_answers() {
        for answer in ["n", "N", "no", "Nein", "x", "0"] {
            assert!(!is_affirmative(answer, true), "{answer:?} should decline");
        }
    }

    #[test]
    fn test_empty_input_takes_default() {
        assert!(is_affirmative("", true));
        assert!(is_affirmative("\n", true));
        assert!(is_affirmative("   ", true));
        assert!(!is_affirmative("", false));
        assert!(!is_affirmative("\n", false));
    }

    #[test]
    fn test_auto_confirm_always_affirms() {
        let mut auto = AutoConfirm;
        assert!(auto.confirm("Install and activate SwagExample? (Y/n) ").unwrap());
    }
}
