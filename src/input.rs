//! Terminal line commands.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// `/quit` or `/exit`.
    Quit,
    /// `/suggest`: list quick suggestions.
    Suggestions,
    /// `/pick <n>`: zero-based index of the chosen suggestion.
    Pick(usize),
    /// Blank line: send whatever is in the draft.
    SendDraft,
    /// Anything else is sent verbatim.
    Send(String),
    /// A `/command` that is not recognized or is missing its argument.
    Unknown(String),
}

#[must_use]
pub fn parse_line(line: &str) -> Input {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Input::SendDraft;
    }
    let Some(command) = trimmed.strip_prefix('/') else {
        return Input::Send(line.to_string());
    };

    let mut words = command.split_whitespace();
    match (words.next(), words.next()) {
        (Some("quit" | "exit"), None) => Input::Quit,
        (Some("suggest"), None) => Input::Suggestions,
        (Some("pick"), Some(n)) => match n.parse::<usize>() {
            Ok(n) if n >= 1 => Input::Pick(n - 1),
            _ => Input::Unknown(trimmed.to_string()),
        },
        _ => Input::Unknown(trimmed.to_string()),
    }
}
