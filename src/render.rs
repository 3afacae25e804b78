//! Terminal output for status, diagnostics, and response bodies.
//!
//! Status lines go to stderr so stdout carries only response bodies and can
//! be piped into other tools.

use crossterm::style::{Color, Stylize};

const LABEL_WARNING: &str = "warning:";
const LABEL_ERROR: &str = "error:";
const GLYPH_SECTION_BULLET: &str = "•";
const INDENT_1: &str = "  ";

/// Injectable rendering interface used by command handlers.
///
/// `Renderer` is the terminal implementation; tests substitute a recording
/// sink without coupling to stderr output.
pub trait RenderSink: Send + Sync {
    /// Render a warning line.
    fn warn(&self, msg: &str);
    /// Render an error line.
    fn error(&self, msg: &str);
    /// Render a titled section header.
    fn section(&self, title: &str);
    /// Render activity/lifecycle text.
    fn activity(&self, text: &str);
    /// Render one key/value field row.
    fn field(&self, key: &str, value: &str);
    /// Render additional detail text.
    fn detail(&self, text: &str);
    /// Write a response body to stdout.
    fn body(&self, text: &str);
}

/// Styled stderr/stdout renderer.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn color(&self) -> bool {
        self.color
    }

    pub fn warn(&self, msg: &str) {
        if self.color {
            eprintln!("{} {msg}", LABEL_WARNING.with(Color::Yellow).bold());
        } else {
            eprintln!("{LABEL_WARNING} {msg}");
        }
    }

    /// Print an error (to stderr).
    pub fn error(&self, msg: &str) {
        if self.color {
            eprintln!("{} {msg}", LABEL_ERROR.with(Color::Red).bold());
        } else {
            eprintln!("{LABEL_ERROR} {msg}");
        }
    }

    /// Print a small section header in status-style output.
    pub fn section(&self, title: &str) {
        if self.color {
            eprintln!(
                "{} {}",
                GLYPH_SECTION_BULLET.with(Color::Cyan),
                title.with(Color::White).bold()
            );
        } else {
            eprintln!("{title}:");
        }
    }

    /// Print an activity line for lifecycle updates.
    pub fn activity(&self, text: &str) {
        if self.color {
            eprintln!(
                "{} {}",
                GLYPH_SECTION_BULLET.with(Color::Cyan),
                text.with(Color::Grey).bold()
            );
        } else {
            eprintln!("{text}");
        }
    }

    /// Print a key/value line under a status section.
    pub fn field(&self, key: &str, value: &str) {
        if self.color {
            eprintln!(
                "{INDENT_1}{} {}",
                format!("{key}:").with(Color::DarkGrey),
                value.with(Color::White),
            );
        } else {
            eprintln!("{INDENT_1}{key}: {value}");
        }
    }

    pub fn detail(&self, text: &str) {
        if self.color {
            eprintln!("{INDENT_1}{}", text.with(Color::Grey));
        } else {
            eprintln!("{INDENT_1}{text}");
        }
    }

    /// Print a response body to stdout, unstyled.
    pub fn body(&self, text: &str) {
        println!("{text}");
    }
}

impl RenderSink for Renderer {
    fn warn(&self, msg: &str) {
        Renderer::warn(self, msg);
    }

    fn error(&self, msg: &str) {
        Renderer::error(self, msg);
    }

    fn section(&self, title: &str) {
        Renderer::section(self, title);
    }

    fn activity(&self, text: &str) {
        Renderer::activity(self, text);
    }

    fn field(&self, key: &str, value: &str) {
        Renderer::field(self, key, value);
    }

    fn detail(&self, text: &str) {
        Renderer::detail(self, text);
    }

    fn body(&self, text: &str) {
        Renderer::body(self, text);
    }
}
