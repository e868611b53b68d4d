//! ANSI escapes used by the terminal table and messages.
pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";

pub const GREY: &str = "\x1b[90m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const MAGENTA: &str = "\x1b[35m";

/// Highlight for rows holding unsaved local edits.
pub const DIRTY: &str = "\x1b[41;97m";

/// Wrap `value` in `color`, or leave it untouched when `color` is empty.
pub fn paint(value: &str, color: &str) -> String {
    if color.is_empty() {
        value.to_string()
    } else {
        format!("{color}{value}{RESET}")
    }
}
