//! Yes/no prompts for commands that need a confirmation

use std::io::{self, BufRead, Write};

/// How many times an empty answer re-asks when there is no default.
pub const MAX_CONFIRM_ATTEMPTS: usize = 3;

/// Ask `"{action}? (y/n)"` on the terminal.
///
/// The default, if any, is shown capitalized and returned for an empty or
/// unrecognized answer. With `skip` the default is returned without asking.
/// `None` means no decision: end of input, an I/O error, or no default and
/// no usable answer.
///
/// ```no_run
/// use argmap::confirm;
///
/// if confirm("Delete 3 keys", Some(true), false) == Some(true) {
///     println!("deleted");
/// }
/// ```
#[must_use]
pub fn confirm(action: &str, default: Option<bool>, skip: bool) -> Option<bool> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    confirm_with(&mut stdin.lock(), &mut stdout.lock(), action, default, skip)
        .ok()
        .flatten()
}

/// [`confirm`] over arbitrary streams.
///
/// # Errors
///
/// Fails when the prompt cannot be written or the answer cannot be read.
pub fn confirm_with<R, W>(
    reader: &mut R,
    writer: &mut W,
    action: &str,
    default: Option<bool>,
    skip: bool,
) -> io::Result<Option<bool>>
where
    R: BufRead + ?Sized,
    W: Write + ?Sized,
{
    if skip {
        return Ok(default);
    }

    let (yes, no) = match default {
        None => ("y", "n"),
        Some(true) => ("Y", "n"),
        Some(false) => ("y", "N"),
    };
    let prompt = format!("{action}? ({yes}/{no})");
    let attempts = if default.is_none() { MAX_CONFIRM_ATTEMPTS } else { 1 };

    let mut choice = String::new();
    for _ in 0..attempts {
        write!(writer, "{prompt}")?;
        writer.flush()?;

        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            writeln!(writer)?;
            return Ok(None);
        }
        choice = line.trim().to_string();
        if !choice.is_empty() {
            break;
        }
    }

    Ok(match choice.as_str() {
        "yes" | "y" | "Y" => Some(true),
        "no" | "n" | "N" => Some(false),
        _ => default,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ask(input: &str, default: Option<bool>) -> (Option<bool>, String) {
        let mut reader = Cursor::new(input.as_bytes().to_vec());
        let mut writer = Vec::new();
        let answer = confirm_with(&mut reader, &mut writer, "Delete", default, false).unwrap();
        (answer, String::from_utf8(writer).unwrap())
    }

    #[test]
    fn test_prompt_marks_default() {
        assert_eq!(ask("y\n", None).1, "Delete? (y/n)");
        assert_eq!(ask("y\n", Some(true)).1, "Delete? (Y/n)");
        assert_eq!(ask("y\n", Some(false)).1, "Delete? (y/N)");
    }

    #[test]
    fn test_answers() {
        assert_eq!(ask("yes\n", None).0, Some(true));
        assert_eq!(ask("Y\n", Some(false)).0, Some(true));
        assert_eq!(ask("n\n", Some(true)).0, Some(false));
        assert_eq!(ask("no\n", None).0, Some(false));
    }

    #[test]
    fn test_empty_answer_takes_default() {
        assert_eq!(ask("\n", Some(true)).0, Some(true));
        assert_eq!(ask("maybe\n", Some(false)).0, Some(false));
        assert_eq!(ask("maybe\n", None).0, None);
    }

    #[test]
    fn test_no_default_reasks() {
        let (answer, prompts) = ask("\n\ny\n", None);
        assert_eq!(answer, Some(true));
        assert_eq!(prompts.matches("Delete?").count(), 3);

        let (answer, prompts) = ask("\n\n\ny\n", None);
        assert_eq!(answer, None);
        assert_eq!(prompts.matches("Delete?").count(), MAX_CONFIRM_ATTEMPTS);
    }

    #[test]
    fn test_end_of_input() {
        assert_eq!(ask("", Some(true)).0, None);
    }

    #[test]
    fn test_skip_does_not_prompt() {
        let mut reader = Cursor::new(Vec::new());
        let mut writer = Vec::new();
        let answer = confirm_with(&mut reader, &mut writer, "Delete", Some(false), true).unwrap();
        assert_eq!(answer, Some(false));
        assert!(writer.is_empty());
    }
}
