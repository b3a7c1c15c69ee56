//! Failure context records.
//!
//! A [`FailureContext`] pairs a human-readable message with an optional
//! source location and an excerpt of the surrounding lines. Promises treat it
//! as an ordinary rejection reason; nothing in the core inspects it.
//!
//! ```text
//! error: division by zero
//!   --> calc.txt:3
//!     |
//!   1 | let a = 4
//!   2 | let b = 0
//! > 3 | let c = a / b
//!   4 | print(c)
//! ```

use core::fmt;

/// Lines of context shown on each side of the failing line by default.
pub const DEFAULT_RADIUS: usize = 2;

/// One line of an excerpt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextLine {
    /// 1-based line number.
    pub number: usize,
    /// Line text without its terminator.
    pub text: String,
    /// True for the failing line itself.
    pub is_failure: bool,
}

/// A failure message with optional source-line context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureContext {
    message: String,
    file: Option<String>,
    line: Option<usize>,
    radius: usize,
    source: Option<String>,
}

impl FailureContext {
    /// Creates a record carrying only `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            file: None,
            line: None,
            radius: DEFAULT_RADIUS,
            source: None,
        }
    }

    /// Names the file the failure happened in.
    #[must_use]
    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Sets the 1-based failing line.
    #[must_use]
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Sets how many lines either side of the failing line are excerpted.
    #[must_use]
    pub fn with_radius(mut self, radius: usize) -> Self {
        self.radius = radius;
        self
    }

    /// Supplies the raw file contents the excerpt is cut from.
    #[must_use]
    pub fn with_source(mut self, contents: impl Into<String>) -> Self {
        self.source = Some(contents.into());
        self
    }

    /// The failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The file name, if one was given.
    #[must_use]
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// The failing line, if one was given.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        self.line
    }

    /// `file:line`, `file`, or `<source>:line`, depending on what is known.
    #[must_use]
    pub fn location(&self) -> Option<String> {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => Some(format!("{file}:{line}")),
            (Some(file), None) => Some(file.clone()),
            (None, Some(line)) => Some(format!("<source>:{line}")),
            (None, None) => None,
        }
    }

    /// The failing line plus up to `radius` lines either side.
    ///
    /// Empty when there is no source, no line, or the line is out of range.
    #[must_use]
    pub fn excerpt(&self) -> Vec<ContextLine> {
        let (Some(source), Some(line)) = (&self.source, self.line) else {
            return Vec::new();
        };
        let lines: Vec<&str> = source.lines().collect();
        if line == 0 || line > lines.len() {
            return Vec::new();
        }
        let first = line.saturating_sub(self.radius).max(1);
        let last = line.saturating_add(self.radius).min(lines.len());
        (first..=last)
            .map(|number| ContextLine {
                number,
                text: lines[number - 1].to_string(),
                is_failure: number == line,
            })
            .collect()
    }

    /// Multi-line rendering with a numbered gutter and a `>` marker on the
    /// failing line.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!("error: {}\n", self.message);
        if let Some(location) = self.location() {
            out.push_str(&format!("  --> {location}\n"));
        }
        let excerpt = self.excerpt();
        let Some(widest) = excerpt.last().map(|l| l.number.to_string().len()) else {
            return out;
        };
        out.push_str(&format!("{} |\n", " ".repeat(widest + 2)));
        for line in &excerpt {
            let marker = if line.is_failure { '>' } else { ' ' };
            out.push_str(&format!(
                "{marker} {number:>widest$} | {text}\n",
                number = line.number,
                text = line.text
            ));
        }
        out
    }
}

impl fmt::Display for FailureContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(location) = self.location() {
            write!(f, " at {location}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FailureContext {}
