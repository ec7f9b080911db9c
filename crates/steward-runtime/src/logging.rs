//! Logging setup for the Steward runtime.
//!
//! One `tracing` / `tracing-subscriber` initialization path, driven either by
//! the loaded [`LoggingConfig`] or programmatically through
//! [`LoggingBuilder`].
//!
//! ```rust,ignore
//! use steward_runtime::config::load_config;
//! use steward_runtime::logging;
//!
//! let config = load_config()?;
//! logging::init_from_config(&config.logging);
//! ```
//!
//! ```rust,ignore
//! use steward_runtime::logging::{LoggingBuilder, SpanEvents};
//!
//! LoggingBuilder::new()
//!     .directive("steward_core=debug")
//!     .span_events(SpanEvents::Lifecycle)
//!     .init();
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::warn;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::config::{LogFormat, LogOutput, LoggingConfig};

/// When span lifecycle events are written to the log.
///
/// Every dispatched message runs inside a span; these events mark where
/// handling starts and finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SpanEvents {
    /// No lifecycle events.
    #[default]
    None,
    /// Creation and close only. Shows each dispatch without enter/exit noise.
    Lifecycle,
    /// Enter and exit only.
    Active,
    /// New, enter, exit, and close.
    Full,
}

impl SpanEvents {
    fn to_fmt_span(self) -> FmtSpan {
        match self {
            Self::None => FmtSpan::NONE,
            Self::Lifecycle => FmtSpan::NEW | FmtSpan::CLOSE,
            Self::Active => FmtSpan::ENTER | FmtSpan::EXIT,
            Self::Full => FmtSpan::FULL,
        }
    }
}

/// Initializes logging from the loaded configuration.
///
/// Safe to call more than once; a second initialization is ignored rather
/// than panicking.
pub fn init_from_config(config: &LoggingConfig) {
    let _ = LoggingBuilder::from_config(config).try_init();
}

/// Programmatic logging setup.
///
/// ```rust,ignore
/// use steward_runtime::logging::{LoggingBuilder, SpanEvents};
/// use tracing::Level;
///
/// LoggingBuilder::new()
///     .level(Level::DEBUG)
///     .span_events(SpanEvents::Lifecycle)
///     .thread_ids(true)
///     .init();
/// ```
#[derive(Default)]
pub struct LoggingBuilder {
    level: Option<tracing::Level>,
    directives: Vec<String>,
    span_events: SpanEvents,
    format: LogFormat,
    output: LogOutput,
    target: bool,
    thread_ids: bool,
    file_location: bool,
    file_path: Option<PathBuf>,
}

impl LoggingBuilder {
    pub fn new() -> Self {
        Self {
            target: true,
            ..Self::default()
        }
    }

    /// Carries every knob of a [`LoggingConfig`] over to the builder.
    pub fn from_config(config: &LoggingConfig) -> Self {
        let mut builder = Self::new();
        // Validation has already rejected unknown level names.
        builder.level = config.level.parse().ok();
        builder.format = config.format;
        builder.output = config.output;
        builder.thread_ids = config.thread_ids;
        builder.file_location = config.file_location;
        builder.file_path.clone_from(&config.file_path);
        for (module, level) in &config.filters {
            builder.directives.push(format!("{module}={level}"));
        }
        builder
    }

    /// Base log level when `RUST_LOG` is unset.
    pub fn level(mut self, level: tracing::Level) -> Self {
        self.level = Some(level);
        self
    }

    /// Adds one filter directive, e.g. `"steward_core=debug"`.
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// Span lifecycle events to log for each dispatch.
    pub fn span_events(mut self, events: SpanEvents) -> Self {
        self.span_events = events;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    /// Whether lines carry the emitting module path. On by default.
    pub fn target(mut self, enabled: bool) -> Self {
        self.target = enabled;
        self
    }

    pub fn thread_ids(mut self, enabled: bool) -> Self {
        self.thread_ids = enabled;
        self
    }

    /// Whether lines carry the source file and line number.
    pub fn file_location(mut self, enabled: bool) -> Self {
        self.file_location = enabled;
        self
    }

    /// Destination for [`LogOutput::File`].
    pub fn file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Environment filter: `RUST_LOG` when set, the configured base level
    /// otherwise, plus any per-module directives.
    fn build_filter(&self) -> EnvFilter {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let base = self.level.unwrap_or(tracing::Level::INFO);
            EnvFilter::new(base.to_string().to_lowercase())
        });
        self.directives
            .iter()
            .filter_map(|directive| directive.parse::<Directive>().ok())
            .fold(filter, EnvFilter::add_directive)
    }

    /// One fmt layer over the given writer, boxed so every format shares a
    /// single initialization path.
    fn fmt_layer<W>(&self, writer: W) -> Box<dyn Layer<Registry> + Send + Sync>
    where
        W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
    {
        let base = fmt::layer()
            .with_writer(writer)
            .with_span_events(self.span_events.to_fmt_span())
            .with_target(self.target)
            .with_thread_ids(self.thread_ids)
            .with_file(self.file_location)
            .with_line_number(self.file_location);
        match self.format {
            LogFormat::Compact => base.compact().boxed(),
            LogFormat::Full => base.boxed(),
            LogFormat::Pretty => base.pretty().boxed(),
            #[cfg(feature = "json-log")]
            LogFormat::Json => base.json().boxed(),
            // Without the json-log feature the nearest built-in format
            // stands in.
            #[cfg(not(feature = "json-log"))]
            LogFormat::Json => base.compact().boxed(),
        }
    }

    /// Installs the subscriber, ignoring a second initialization.
    pub fn init(self) {
        let _ = self.try_init();
    }

    /// Installs the subscriber, surfacing the error when one is already set.
    pub fn try_init(self) -> Result<(), TryInitError> {
        let filter = self.build_filter();
        let layer = match &self.output {
            LogOutput::Stdout => self.fmt_layer(std::io::stdout),
            LogOutput::Stderr => self.fmt_layer(std::io::stderr),
            LogOutput::File => match &self.file_path {
                Some(path) => {
                    let appender = tracing_appender::rolling::never(
                        path.parent().unwrap_or_else(|| Path::new(".")),
                        path.file_name().unwrap_or_else(|| OsStr::new("steward.log")),
                    );
                    self.fmt_layer(appender)
                }
                None => {
                    warn!("File output configured without a path; logging to stdout");
                    self.fmt_layer(std::io::stdout)
                }
            },
        };
        tracing_subscriber::registry().with(layer).with(filter).try_init()
    }
}
