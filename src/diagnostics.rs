//! Severity levels and recovered-problem reports.
//!
//! Translators never abort on a construct they cannot render. They record a
//! [`Diagnostic`], render a system message in its place (if the level passes
//! the `report_level` threshold) and move on to the next sibling.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Severity of a system message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Level {
    Debug = 0,
    Info = 1,
    #[default]
    Warning = 2,
    Error = 3,
    Severe = 4,
}

impl Level {
    /// Upper-case name used in rendered system messages (`ERROR`).
    pub fn name(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Severe => "SEVERE",
        }
    }

    /// Numeric severity (`ERROR` is 3).
    pub fn number(self) -> u8 {
        self as u8
    }

    /// Map a numeric level from a node attribute; out-of-range values saturate.
    pub fn from_number(n: u8) -> Self {
        match n {
            0 => Level::Debug,
            1 => Level::Info,
            2 => Level::Warning,
            3 => Level::Error,
            _ => Level::Severe,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Level {
    type Err = Error;

    /// Accepts names (`warning`, `ERROR`) or numbers (`0`..`4`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(n) = s.parse::<u8>()
            && n <= 4
        {
            return Ok(Level::from_number(n));
        }
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warning" => Ok(Level::Warning),
            "error" => Ok(Level::Error),
            "severe" => Ok(Level::Severe),
            // "none" silences everything, as in the report_level option
            "none" => Ok(Level::Severe),
            _ => Err(Error::InvalidSetting {
                name: "report_level",
                reason: format!("unknown level {s:?}"),
            }),
        }
    }
}

/// A recovered problem, reported inline and collected in the parts.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    /// Source path the problem relates to (`<string>` if unknown).
    pub source: String,
    pub line: Option<u32>,
}

impl Diagnostic {
    pub fn new(level: Level, message: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            source: source.into(),
            line: None,
        }
    }

    pub fn with_line(mut self, line: Option<u32>) -> Self {
        self.line = line;
        self
    }

    /// Title line used by every writer:
    /// `System Message: ERROR/3 (<string>, line 1)`.
    pub fn title(&self) -> String {
        let mut title = format!(
            "System Message: {}/{} ({}",
            self.level.name(),
            self.level.number(),
            self.source
        );
        if let Some(line) = self.line {
            title.push_str(&format!(", line {line}"));
        }
        title.push(')');
        title
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title(), self.message)
    }
}
