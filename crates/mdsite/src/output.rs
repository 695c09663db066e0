//! Colored terminal output.

use console::{Style, Term};

/// Terminal output formatter.
///
/// Status lines go to stderr; listings go to stdout so they can be piped.
pub(crate) struct Output {
    err: Term,
    out: Term,
    red: Style,
    dim: Style,
    cyan_bold: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            err: Term::stderr(),
            out: Term::stdout(),
            red: Style::new().red(),
            dim: Style::new().dim(),
            cyan_bold: Style::new().cyan().bold(),
        }
    }

    /// Print an info message.
    pub(crate) fn info(&self, msg: &str) {
        let _ = self.err.write_line(msg);
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.err.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Print a heading (cyan bold) to stdout.
    pub(crate) fn heading(&self, msg: &str) {
        let _ = self.out.write_line(&self.cyan_bold.apply_to(msg).to_string());
    }

    /// Print one listing row to stdout with a dimmed prefix column.
    pub(crate) fn row(&self, prefix: &str, rest: &str) {
        let _ = self
            .out
            .write_line(&format!("{} {rest}", self.dim.apply_to(prefix)));
    }
}
