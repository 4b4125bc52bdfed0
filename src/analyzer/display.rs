//! Box drawing for terminal report rendering.

use once_cell::sync::Lazy;
use regex::Regex;

/// ANSI escape sequences do not take up columns.
static ANSI: Lazy<Regex> = Lazy::new(|| Regex::new("\u{1b}\\[[0-9;]*m").unwrap());

fn visual_width(s: &str) -> usize {
    ANSI.replace_all(s, "").chars().count()
}

enum Line {
    Pair { label: String, value: String },
    Value(String),
    Separator,
}

/// Pre-measures content, then draws a unicode box sized to fit.
pub struct BoxDrawer {
    title: String,
    lines: Vec<Line>,
    min_width: usize,
    max_width: usize,
}

impl BoxDrawer {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            lines: Vec::new(),
            min_width: 56,
            max_width: 110,
        }
    }

    pub fn add_line(&mut self, label: &str, value: &str) {
        self.lines.push(Line::Pair {
            label: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn add_value_only(&mut self, value: &str) {
        self.lines.push(Line::Value(value.to_string()));
    }

    pub fn add_separator(&mut self) {
        self.lines.push(Line::Separator);
    }

    fn content_width(&self) -> usize {
        let mut width = visual_width(&self.title) + 4;
        for line in &self.lines {
            let line_width = match line {
                Line::Pair { label, value } => visual_width(label) + 2 + visual_width(value),
                Line::Value(value) => visual_width(value),
                Line::Separator => 0,
            };
            width = width.max(line_width);
        }
        width.clamp(self.min_width, self.max_width)
    }

    pub fn draw(&self) -> String {
        let width = self.content_width();
        let mut out = String::new();

        out.push_str(&format!(
            "┌─ {} {}┐\n",
            self.title,
            "─".repeat(width.saturating_sub(visual_width(&self.title) + 2))
        ));
        for line in &self.lines {
            match line {
                Line::Pair { label, value } => {
                    let used = visual_width(label) + 2 + visual_width(value);
                    out.push_str(&format!(
                        "│ {}  {}{} │\n",
                        label,
                        value,
                        " ".repeat(width.saturating_sub(used + 1))
                    ));
                }
                Line::Value(value) => {
                    out.push_str(&format!(
                        "│ {}{} │\n",
                        value,
                        " ".repeat(width.saturating_sub(visual_width(value) + 1))
                    ));
                }
                Line::Separator => {
                    out.push_str(&format!("├{}┤\n", "─".repeat(width + 1)));
                }
            }
        }
        out.push_str(&format!("└{}┘\n", "─".repeat(width + 1)));
        out
    }
}
