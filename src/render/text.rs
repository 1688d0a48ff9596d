use colored::*;

use super::Render;
use crate::list::Entry;

/// Terminal renderer for `leadlist watch` and `leadlist list`. Reprints the
/// whole list on every snapshot.
#[derive(Debug, Default)]
pub struct TextList;

impl TextList {
    pub fn new() -> Self {
        Self
    }
}

impl Render for TextList {
    fn render(&mut self, entries: &[Entry]) {
        println!(
            "{} {}",
            "Leads".cyan().bold(),
            format!("({})", entries.len()).bright_black()
        );
        if entries.is_empty() {
            println!("  {}", "(empty)".bright_black());
            return;
        }
        for (i, entry) in entries.iter().enumerate() {
            println!(
                "  {} {}",
                format!("{}.", i + 1).bright_black(),
                entry.as_str().bright_blue()
            );
        }
    }
}
