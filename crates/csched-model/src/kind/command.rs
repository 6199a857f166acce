use crate::ModelError;

/// Split a command label into tokens using POSIX shell quoting rules.
///
/// Single and double quotes group words, backslash escapes the next character.
/// An unterminated quote or a trailing escape is rejected.
pub fn split_command(raw: &str) -> Result<Vec<String>, ModelError> {
    shell_words::split(raw).map_err(|e| ModelError::MalformedCommand {
        raw: raw.to_string(),
        reason: e.to_string(),
    })
}
