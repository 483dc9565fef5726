//! Output rendering: markdown for people, JSON for scripts.
//!
//! Markdown is styled with termimad when stdout is a terminal and printed
//! as is otherwise, so piped output stays greppable.

use std::fmt::Display;
use std::io::IsTerminal;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use termimad::{crossterm::style::Color, MadSkin};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Json,
    Rich,
    Plain,
}

/// Prints command results in the format chosen on the command line
pub struct Renderer {
    mode: Mode,
    skin: MadSkin,
}

impl Renderer {
    pub fn new(json: bool) -> Self {
        Self::with_mode(if json { Mode::Json } else { Mode::Plain })
    }

    /// Styled markdown unless `no_color` is set or stdout is not a terminal.
    pub fn for_terminal(json: bool, no_color: bool) -> Self {
        if !json && !no_color && std::io::stdout().is_terminal() {
            Self::with_mode(Mode::Rich)
        } else {
            Self::new(json)
        }
    }

    fn with_mode(mode: Mode) -> Self {
        let mut skin = MadSkin::default();
        skin.set_headers_fg(Color::Blue);
        skin.bold.set_fg(Color::Yellow);
        skin.italic.set_fg(Color::Magenta);
        skin.inline_code.set_bg(Color::AnsiValue(238));
        Self { mode, skin }
    }

    /// Formats a value with its `Display` impl, or as pretty JSON.
    pub fn format<T>(&self, value: &T) -> Result<String>
    where
        T: Display + Serialize + ?Sized,
    {
        if self.mode == Mode::Json {
            let mut text =
                serde_json::to_string_pretty(value).context("Failed to serialize output")?;
            text.push('\n');
            Ok(text)
        } else {
            Ok(value.to_string())
        }
    }

    pub fn render<T>(&self, value: &T) -> Result<()>
    where
        T: Display + Serialize + ?Sized,
    {
        let text = self.format(value)?;
        self.print(&text);
        Ok(())
    }

    /// For outcomes with no domain value: a sentence, or `data` as JSON.
    pub fn notice(&self, message: impl Display, data: Value) -> Result<()> {
        if self.mode == Mode::Json {
            println!(
                "{}",
                serde_json::to_string_pretty(&data).context("Failed to serialize output")?
            );
        } else {
            self.print(&format!("{message}\n"));
        }
        Ok(())
    }

    fn print(&self, markdown: &str) {
        if self.mode != Mode::Rich {
            print!("{markdown}");
            return;
        }
        for line in markdown.lines() {
            // Keep the hashes visible so headings read like the plain output.
            if line.starts_with('#') {
                println!("\x1b[34m{line}\x1b[0m");
            } else {
                self.skin.print_inline(line);
                println!();
            }
        }
    }
}
