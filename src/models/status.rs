use rusqlite::types::Value;
use serde::Serialize;

/// Tri-state status marker as stored in the work order table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Flag {
    #[default]
    Unset,
    Off,
    On,
}

impl Flag {
    /// Convert DB value → flag.
    /// `NULL` is unset; `0`, `"0"`, `""` and `"false"` are off; anything else is on.
    pub fn from_value(v: &Value) -> Self {
        match v {
            Value::Null => Flag::Unset,
            Value::Integer(0) => Flag::Off,
            Value::Integer(_) => Flag::On,
            Value::Real(f) if *f == 0.0 => Flag::Off,
            Value::Real(_) => Flag::On,
            Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "" | "0" | "false" => Flag::Off,
                _ => Flag::On,
            },
            Value::Blob(b) if b.is_empty() => Flag::Off,
            Value::Blob(_) => Flag::On,
        }
    }

    pub fn is_on(&self) -> bool {
        matches!(self, Flag::On)
    }

    /// Helper: parse CLI input (`on`, `off`, `unset`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "on" | "1" | "yes" => Some(Flag::On),
            "off" | "0" | "no" => Some(Flag::Off),
            "unset" | "none" => Some(Flag::Unset),
            _ => None,
        }
    }

    pub fn to_db(self) -> Option<bool> {
        match self {
            Flag::Unset => None,
            Flag::Off => Some(false),
            Flag::On => Some(true),
        }
    }
}

/// Visual style of a row, derived from its status flags only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RowStyle {
    Queued,
    Running,
    Finished,
    Modifying,
}

impl RowStyle {
    /// Modifying wins over running, running over finished.
    pub fn from_flags(running: Flag, finished: Flag, modifying: Flag) -> Self {
        if modifying.is_on() {
            RowStyle::Modifying
        } else if running.is_on() {
            RowStyle::Running
        } else if finished.is_on() {
            RowStyle::Finished
        } else {
            RowStyle::Queued
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RowStyle::Queued => "queued",
            RowStyle::Running => "running",
            RowStyle::Finished => "finished",
            RowStyle::Modifying => "modifying",
        }
    }
}
