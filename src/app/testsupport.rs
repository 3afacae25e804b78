//! Test doubles for command helpers.

use ridepool::render::RenderSink;
use std::sync::Mutex;

/// Render sink that records `kind:text` lines instead of printing.
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    lines: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub(crate) fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("sink lock").clone()
    }

    fn push(&self, kind: &str, text: &str) {
        self.lines
            .lock()
            .expect("sink lock")
            .push(format!("{kind}:{text}"));
    }
}

impl RenderSink for RecordingSink {
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }

    fn error(&self, msg: &str) {
        self.push("error", msg);
    }

    fn section(&self, title: &str) {
        self.push("section", title);
    }

    fn activity(&self, text: &str) {
        self.push("activity", text);
    }

    fn field(&self, key: &str, value: &str) {
        self.push("field", &format!("{key}={value}"));
    }

    fn detail(&self, text: &str) {
        self.push("detail", text);
    }

    fn body(&self, text: &str) {
        self.push("body", text);
    }
}
