use colored::*;
use murmur_session::{ChatView, MessageHistory};
use std::io::Write;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
const PROMPT: &str = "Type a message: ";

/// Redraws the whole conversation on every change.
pub struct TerminalView;

/// Highlight the `username:` prefix of a chat line.
fn render_line(line: &str) -> String {
    match line.split_once(": ") {
        Some((username, text)) => format!("{}: {}", username.cyan().bold(), text),
        None => line.to_owned(),
    }
}

impl ChatView for TerminalView {
    fn redraw(&self, history: &MessageHistory) {
        let mut out = std::io::stdout().lock();
        let _ = write!(out, "{}", CLEAR_SCREEN);
        for line in history.lines() {
            let _ = writeln!(out, "{}", render_line(line));
        }
        let _ = write!(out, "{}", PROMPT.bold());
        let _ = out.flush();
    }

    fn report_error(&self, message: &str) {
        eprintln!("{}", message.red());
    }
}
