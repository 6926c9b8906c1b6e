//! Terminal output helpers with a normal and a quiet level.

use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};

const RED: &str = "31";
const YELLOW: &str = "33";
const BLUE: &str = "34";
const MAGENTA: &str = "35";
const CYAN: &str = "36";

/// Console writer; quiet mode keeps only essential lines and tables.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    quiet: bool,
    color: bool,
}

impl Output {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            color: std::env::var_os("NO_COLOR").is_none(),
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_owned()
        }
    }

    /// Prints a line in normal mode only.
    pub fn line(&self, text: impl Display) {
        if !self.quiet {
            println!("{text}");
        }
    }

    /// Prints a line regardless of mode.
    pub fn always(&self, text: impl Display) {
        println!("{text}");
    }

    pub fn error(&self, text: impl Display) {
        eprintln!("{}", self.paint(RED, format!("Error: {text}").as_str()));
    }

    pub fn banner(&self, version: &str) {
        self.line(self.paint(MAGENTA, format!("PIM Group CLI v{version}").as_str()));
    }

    pub fn heading(&self, text: &str) {
        self.line(self.paint(YELLOW, text));
    }

    /// Prints an aligned `label: value` line.
    pub fn field(&self, indent: usize, label: &str, value: impl Display) {
        let padding = " ".repeat(15_usize.saturating_sub(label.len() + 1));
        let label = self.paint(BLUE, format!("{label}:").as_str());
        self.line(format!("{}{label}{padding} {value}", " ".repeat(indent)));
    }

    /// Like [`Output::field`] with a highlighted suffix in parentheses.
    pub fn field_with_note(&self, indent: usize, label: &str, value: &str, note: &str) {
        let note = self.paint(CYAN, format!("({note})").as_str());
        self.field(indent, label, format!("{value} {note}"));
    }

    pub fn table(&self, table: &Table) {
        self.always(table.render(|header| self.paint(YELLOW, header)));
    }
}

/// Left-aligned text table sized to its widest cells.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|header| (*header).to_owned()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|header| header.chars().count()).collect();
        for row in &self.rows {
            for (index, cell) in row.iter().enumerate() {
                let width = cell.chars().count();
                match widths.get_mut(index) {
                    Some(current) => *current = (*current).max(width),
                    None => widths.push(width),
                }
            }
        }
        widths
    }

    /// Renders the table; `style_header` decorates each padded header cell.
    pub fn render(&self, style_header: impl Fn(&str) -> String) -> String {
        let widths = self.widths();
        let mut lines = vec![format_row(&self.headers, &widths, &style_header)];
        for row in &self.rows {
            lines.push(format_row(row, &widths, &|cell: &str| cell.to_owned()));
        }
        lines.join("\n")
    }
}

fn format_row(cells: &[String], widths: &[usize], style: &dyn Fn(&str) -> String) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| style(format!("{cell:<width$}").as_str()))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_owned()
}

/// Formats a timestamp as `HH:MM, Mon DD`.
pub fn format_clock<Tz: TimeZone>(moment: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    moment.format("%H:%M, %b %d").to_string()
}

/// Formats the time until `end` as `Xh Ym`, rounded to the minute.
///
/// Elapsed instants render as `0h 0m`.
pub fn format_time_left(end: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (end - now).num_seconds().max(0);
    let minutes = (seconds + 30) / 60;
    format!("{}h {}m", minutes / 60, minutes % 60)
}
