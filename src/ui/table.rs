//! Terminal rendering of the schedule.

use crate::models::RowStyle;
use crate::schedule::view::{Presenter, RowState, ViewOp};
use crate::utils::colors::{BOLD, DIRTY, GREEN, GREY, RESET, YELLOW};
use crate::utils::formatting::pad_right;
use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

pub struct Column {
    pub header: String,
    pub width: usize,
}

pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<(Vec<String>, &'static str)>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Add a row drawn in `color` (an ANSI escape, or "" for none).
    pub fn add_row(&mut self, row: Vec<String>, color: &'static str) {
        self.rows.push((row, color));
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        for col in &self.columns {
            out.push_str(&pad_right(&col.header, col.width));
            out.push(' ');
        }
        out.push('\n');

        for col in &self.columns {
            out.push_str(&"-".repeat(col.width));
            out.push(' ');
        }
        out.push('\n');

        for (row, color) in &self.rows {
            out.push_str(color);
            for (cell, col) in row.iter().zip(&self.columns) {
                out.push_str(&pad_right(&clip(cell, col.width), col.width));
                out.push(' ');
            }
            if !color.is_empty() {
                out.push_str(RESET);
            }
            out.push('\n');
        }

        out
    }
}

/// Cut `s` so it never exceeds `width` display columns.
fn clip(s: &str, width: usize) -> String {
    if s.width() <= width {
        return s.to_string();
    }
    let mut out = String::new();
    for c in s.chars() {
        if out.width() + c.to_string().width() >= width {
            break;
        }
        out.push(c);
    }
    out.push('…');
    out
}

fn style_color(row: &RowState) -> &'static str {
    if row.dirty {
        return DIRTY;
    }
    match row.style() {
        RowStyle::Queued => "",
        RowStyle::Running => GREEN,
        RowStyle::Finished => GREY,
        RowStyle::Modifying => YELLOW,
    }
}

fn marker(row: &RowState) -> &'static str {
    match (row.dirty, row.conflict) {
        (_, true) => "!",
        (true, false) => "*",
        _ => " ",
    }
}

/// Render rows as a fixed-width table. Notes wrap onto continuation lines.
pub fn render_rows(rows: &[RowState]) -> String {
    let columns = vec![
        Column { header: " ".into(), width: 1 },
        Column { header: "Pri".into(), width: 4 },
        Column { header: "Job".into(), width: 10 },
        Column { header: "Description".into(), width: 22 },
        Column { header: "Material".into(), width: 14 },
        Column { header: "Qty".into(), width: 6 },
        Column { header: "Status".into(), width: 9 },
        Column { header: "Doc".into(), width: 3 },
        Column { header: "Notes".into(), width: 30 },
    ];
    let notes_width = 30;
    let mut table = Table::new(columns);

    for row in rows {
        let fields = row.display_fields();
        let color = style_color(row);
        let notes = textwrap::wrap(&row.data.notes, notes_width);
        let first_note = notes.first().map(|l| l.to_string()).unwrap_or_default();

        table.add_row(
            vec![
                marker(row).to_string(),
                fields.priority,
                row.data.job_number.clone(),
                row.data.description.clone(),
                fields.material,
                fields.material_qty,
                row.style().label().to_string(),
                if row.has_document { "pdf" } else { "" }.to_string(),
                first_note,
            ],
            color,
        );

        for line in notes.iter().skip(1) {
            let mut cont = vec![String::new(); 8];
            cont.push(line.to_string());
            table.add_row(cont, color);
        }
    }

    table.render()
}

/// Mirrors row operations and redraws the whole table after each batch.
pub struct TerminalPresenter {
    rows: Vec<RowState>,
    title: String,
    /// Clear the screen before redrawing (interactive watch mode).
    clear_screen: bool,
}

impl TerminalPresenter {
    pub fn new(title: &str, clear_screen: bool) -> Self {
        Self {
            rows: Vec::new(),
            title: title.to_string(),
            clear_screen,
        }
    }

    pub fn rows(&self) -> &[RowState] {
        &self.rows
    }

    fn apply(&mut self, op: &ViewOp) {
        match op {
            ViewOp::Clear => self.rows.clear(),
            ViewOp::Insert { index, row } => {
                let at = (*index).min(self.rows.len());
                self.rows.insert(at, row.clone());
            }
            ViewOp::Update { index, row } => {
                if let Some(slot) = self.rows.get_mut(*index) {
                    *slot = row.clone();
                }
            }
            ViewOp::Remove { job } => self.rows.retain(|r| r.job_number() != job),
            ViewOp::Spacer => {}
        }
    }
}

impl Presenter for TerminalPresenter {
    fn present(&mut self, ops: &[ViewOp]) {
        for op in ops {
            self.apply(op);
        }

        let mut out = io::stdout().lock();
        if self.clear_screen {
            let _ = write!(out, "\x1b[2J\x1b[H");
        }
        let _ = writeln!(out, "{BOLD}{}{RESET}", self.title);
        if self.rows.is_empty() {
            let _ = writeln!(out, "{GREY}(no jobs in this queue){RESET}");
        } else {
            let _ = write!(out, "{}", render_rows(&self.rows));
        }
        let _ = out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Flag, ScheduleRow};
    use crate::schedule::edit::EditableFields;

    fn row(job: &str, notes: &str) -> RowState {
        RowState {
            data: ScheduleRow {
                priority: 7,
                job_number: job.into(),
                description: "Bracket".into(),
                material: "S235".into(),
                material_qty: "2".into(),
                running: Flag::On,
                finished: Flag::Off,
                modifying: Flag::Unset,
                job_ref: format!("ref-{job}"),
                notes: notes.into(),
            },
            dirty: false,
            conflict: false,
            has_document: true,
            pending: None,
        }
    }

    #[test]
    fn renders_status_and_document_columns() {
        let out = render_rows(&[row("J1", "")]);
        assert!(out.contains("007"));
        assert!(out.contains("running"));
        assert!(out.contains("pdf"));
        assert!(out.contains(GREEN));
    }

    #[test]
    fn dirty_rows_show_pending_values() {
        let mut r = row("J1", "");
        r.dirty = true;
        r.pending = Some(EditableFields {
            priority: "005".into(),
            material: "AISI304".into(),
            material_qty: "2".into(),
        });
        let out = render_rows(&[r]);
        assert!(out.contains(DIRTY));
        assert!(out.contains("AISI304"));
        assert!(out.contains("* "));
    }

    #[test]
    fn long_notes_wrap_onto_extra_lines() {
        let notes = "check the drawing revision before cutting and call the office";
        let out = render_rows(&[row("J1", notes)]);
        // header, rule, then three lines for the row
        assert_eq!(out.lines().count(), 5);
        assert!(out.contains("before cutting and call the"));
    }

    #[test]
    fn presenter_mirrors_operations() {
        let mut p = TerminalPresenter::new("test", false);
        p.apply(&ViewOp::Insert { index: 0, row: row("J1", "") });
        p.apply(&ViewOp::Insert { index: 1, row: row("J2", "") });
        p.apply(&ViewOp::Remove { job: "J1".into() });
        assert_eq!(p.rows().len(), 1);
        assert_eq!(p.rows()[0].job_number(), "J2");
        p.apply(&ViewOp::Clear);
        assert!(p.rows().is_empty());
    }
}
