//! Text rendering of roster state

use roster_core::{Notice, NoticeLevel, RecordCache};
use roster_schema::{Field, FieldErrors, StudentRecord};
use std::fmt::Write as _;

const LIST_COLUMNS: [Field; 4] = [Field::Name, Field::Class, Field::Section, Field::RollNumber];

/// Roster table: short id, name, class, section and roll number
pub(crate) fn table(records: &RecordCache) -> String {
    if records.is_empty() {
        return "No students yet. Use `add` to create one.\n".to_string();
    }

    let mut rows: Vec<[&str; 5]> = Vec::with_capacity(records.len() + 1);
    rows.push([
        "ID",
        Field::Name.label(),
        Field::Class.label(),
        Field::Section.label(),
        Field::RollNumber.label(),
    ]);
    for record in records.iter() {
        let [a, b, c, d] = LIST_COLUMNS.map(|f| record.fields.get(f));
        rows.push([record.id.short(), a, b, c, d]);
    }

    let mut widths = [0usize; 5];
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in &rows {
        let line = row
            .iter()
            .zip(widths)
            .map(|(cell, w)| format!("{cell:<w$}"))
            .collect::<Vec<_>>()
            .join("  ");
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

/// Every field of one record, labelled
pub(crate) fn detail(record: &StudentRecord) -> String {
    let width = Field::ALL
        .iter()
        .map(|f| f.label().chars().count())
        .max()
        .unwrap_or(0);
    let mut out = format!("Student {}\n", record.id);
    for field in Field::ALL {
        let _ = writeln!(
            out,
            "  {:<width$}  {}",
            field.label(),
            record.fields.get(field)
        );
    }
    out
}

/// Inline errors, one per line, in form order
pub(crate) fn field_errors(errors: &FieldErrors) -> String {
    let mut out = String::new();
    for (field, message) in errors.iter() {
        let _ = writeln!(out, "  ! {}: {message}", field.label());
    }
    out
}

pub(crate) fn notice(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Info => format!("note: {}", notice.message),
        NoticeLevel::Warning => format!("warning: {}", notice.message),
    }
}
