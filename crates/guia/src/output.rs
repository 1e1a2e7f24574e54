//! Progress lines for the `build` and `dev` commands, written to stderr.

use std::fmt::Display;

use console::{Style, Term};
use guia_config::MissingPage;

pub(crate) struct Output {
    term: Term,
    label: Style,
    done: Style,
    warn: Style,
    failed: Style,
}

impl Output {
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            label: Style::new().dim(),
            done: Style::new().green(),
            warn: Style::new().yellow(),
            failed: Style::new().red().bold(),
        }
    }

    /// `label: value` with a dimmed label.
    pub(crate) fn field(&self, label: &str, value: &impl Display) {
        self.line(&format!("{} {value}", self.label.apply_to(format!("{label}:"))));
    }

    /// Navigation link whose target has no content file.
    pub(crate) fn missing_page(&self, page: &MissingPage) {
        self.line(&self.warn.apply_to(missing_page_line(page)).to_string());
    }

    pub(crate) fn success(&self, msg: &str) {
        self.line(&self.done.apply_to(msg).to_string());
    }

    pub(crate) fn error(&self, err: &impl Display) {
        self.line(&self.failed.apply_to(format!("Error: {err}")).to_string());
    }

    // Write errors on stderr are ignored.
    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }
}

fn missing_page_line(page: &MissingPage) -> String {
    format!(
        "Warning: {} links to {} but no content file serves it",
        page.field, page.path
    )
}
