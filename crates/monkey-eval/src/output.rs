//! Output sink for the `puts` builtin.
//!
//! Output can be directed to different destinations:
//! - stdout (default, for drivers)
//! - a line buffer (tests and embedders that want to inspect output)
//! - nowhere

/// Where `puts` writes its lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Output {
    /// Writes each line to stdout.
    #[default]
    Stdout,
    /// Captures lines in memory.
    Buffer(Vec<String>),
    /// Discards all output silently.
    Silent,
}

impl Output {
    /// A fresh capturing sink.
    pub fn buffer() -> Self {
        Self::Buffer(Vec::new())
    }

    /// Emit one line.
    pub fn println(&mut self, line: &str) {
        match self {
            Self::Stdout => println!("{line}"),
            Self::Buffer(lines) => lines.push(line.to_string()),
            Self::Silent => {}
        }
    }

    /// Captured lines; empty for sinks that don't capture.
    pub fn lines(&self) -> &[String] {
        match self {
            Self::Buffer(lines) => lines,
            Self::Stdout | Self::Silent => &[],
        }
    }

    /// Drop captured lines.
    pub fn clear(&mut self) {
        if let Self::Buffer(lines) = self {
            lines.clear();
        }
    }
}
