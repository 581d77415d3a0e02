use serde::Deserialize;
use std::fmt;
use std::io;
use std::str::FromStr;
use tracing::Subscriber;
use tracing_subscriber::fmt::{self as tracing_fmt, format, writer::BoxMakeWriter};
use tracing_subscriber::registry::LookupSpan;

/// Console layer: one compact line per event, no timestamp.
pub type ConsoleFmtLayer<S> = tracing_fmt::Layer<
    S,
    format::DefaultFields,
    format::Format<format::Compact, ()>,
    BoxMakeWriter,
>;

/// Stream that receives console diagnostics.
///
/// stdout carries the written path or `--dry-run` YAML, so the default is stderr.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleOutput {
    Stdout,
    #[default]
    Stderr,
    None,
}

impl ConsoleOutput {
    pub const ALL: [ConsoleOutput; 3] = [
        ConsoleOutput::Stdout,
        ConsoleOutput::Stderr,
        ConsoleOutput::None,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConsoleOutput::Stdout => "stdout",
            ConsoleOutput::Stderr => "stderr",
            ConsoleOutput::None => "none",
        }
    }

    fn make_writer(self) -> BoxMakeWriter {
        match self {
            ConsoleOutput::Stdout => BoxMakeWriter::new(io::stdout),
            ConsoleOutput::Stderr => BoxMakeWriter::new(io::stderr),
            ConsoleOutput::None => BoxMakeWriter::new(io::sink),
        }
    }
}

impl fmt::Display for ConsoleOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsoleOutput {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        ConsoleOutput::ALL
            .into_iter()
            .find(|output| output.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                format!(
                    "invalid console output '{}'; expected stdout, stderr or none",
                    value
                )
            })
    }
}

/// Console layer writing to `output`.
pub fn console_layer<S>(output: ConsoleOutput) -> ConsoleFmtLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    compact_layer(output.make_writer())
}

fn compact_layer<S>(make_writer: BoxMakeWriter) -> ConsoleFmtLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_fmt::layer()
        .with_writer(make_writer)
        .without_time()
        .compact()
        .with_ansi(false)
        .with_target(false)
}
