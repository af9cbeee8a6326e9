//! Message kinds and their presentation

use super::sink::SinkLevel;

/// What a report line represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// A case's display path
    Name,
    Info,
    /// Assertion failure details
    Failure,
    /// Unexpected error details
    Error,
    Pass,
    Banner,
    /// Highlighted section header
    Invert,
}

impl MessageKind {
    /// Sink severity for this kind
    pub fn level(self) -> SinkLevel {
        match self {
            MessageKind::Failure => SinkLevel::Fatal,
            MessageKind::Error => SinkLevel::Error,
            _ => SinkLevel::Info,
        }
    }
}

/// Formats report lines, with ANSI colors when enabled
#[derive(Debug, Clone, Copy, Default)]
pub struct Messages {
    #[cfg_attr(not(feature = "colors"), allow(dead_code))]
    colored: bool,
}

impl Messages {
    /// Plain text output
    pub fn plain() -> Self {
        Self { colored: false }
    }

    /// Colored output when built with the `colors` feature and stdout is a terminal
    pub fn detect() -> Self {
        #[cfg(feature = "colors")]
        {
            Self {
                colored: atty::is(atty::Stream::Stdout),
            }
        }
        #[cfg(not(feature = "colors"))]
        {
            Self::plain()
        }
    }

    pub fn format(&self, kind: MessageKind, text: &str) -> String {
        #[cfg(feature = "colors")]
        {
            if self.colored {
                if let Some(colored) = colorize(kind, text) {
                    return colored;
                }
            }
        }
        let _ = kind;
        text.to_string()
    }
}

#[cfg(feature = "colors")]
fn colorize(kind: MessageKind, text: &str) -> Option<String> {
    use std::io::Write;
    use termcolor::{Buffer, Color, ColorSpec, WriteColor};

    let mut spec = ColorSpec::new();
    match kind {
        MessageKind::Name | MessageKind::Banner => spec.set_bold(true),
        MessageKind::Failure | MessageKind::Error => spec.set_fg(Some(Color::Red)),
        MessageKind::Pass => spec.set_fg(Some(Color::Green)),
        MessageKind::Invert => spec.set_fg(Some(Color::Black)).set_bg(Some(Color::White)),
        MessageKind::Info => return None,
    };

    let mut buffer = Buffer::ansi();
    buffer.set_color(&spec).ok()?;
    write!(buffer, "{}", text).ok()?;
    buffer.reset().ok()?;
    String::from_utf8(buffer.into_inner()).ok()
}
