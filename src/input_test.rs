use super::*;

#[test]
fn blank_line_sends_draft() {
    assert_eq!(parse_line(""), Input::SendDraft);
    assert_eq!(parse_line("   "), Input::SendDraft);
}

#[test]
fn plain_text_is_sent_verbatim() {
    assert_eq!(parse_line("  Who won IPL 2024? "), Input::Send("  Who won IPL 2024? ".into()));
}

#[test]
fn quit_commands() {
    assert_eq!(parse_line("/quit"), Input::Quit);
    assert_eq!(parse_line(" /exit "), Input::Quit);
}

#[test]
fn suggest_command() {
    assert_eq!(parse_line("/suggest"), Input::Suggestions);
}

#[test]
fn pick_is_one_based() {
    assert_eq!(parse_line("/pick 1"), Input::Pick(0));
    assert_eq!(parse_line("/pick 4"), Input::Pick(3));
}

#[test]
fn pick_rejects_bad_index() {
    assert_eq!(parse_line("/pick 0"), Input::Unknown("/pick 0".into()));
    assert_eq!(parse_line("/pick two"), Input::Unknown("/pick two".into()));
    assert_eq!(parse_line("/pick"), Input::Unknown("/pick".into()));
}

#[test]
fn unknown_command() {
    assert_eq!(parse_line("/stats kohli"), Input::Unknown("/stats kohli".into()));
}
