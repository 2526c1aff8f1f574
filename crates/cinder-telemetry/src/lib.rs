use config::{Config, Format};
use tracing::{info, subscriber::DefaultGuard};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
    Layer,
    Registry,
};

pub mod config;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to initialize telemetry: {0}")]
    Initialization(#[from] TryInitError),
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Structured logging for the application.
///
/// Events are written to stderr so that command output on stdout stays clean.
pub struct Telemetry {
    config: Config,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Telemetry {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Temporary subscriber used before the configuration has been loaded.
    #[must_use]
    pub fn bootstrap() -> DefaultGuard {
        tracing::subscriber::set_default(
            Registry::default()
                .with(Self::fmt_layer(Format::default()))
                .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into())),
        )
    }

    /// Installs the global subscriber.
    ///
    /// # Errors
    /// If a global default subscriber has already been set.
    pub fn init(self) -> Result<Self, Error> {
        Registry::default()
            .with(Self::fmt_layer(self.config.format))
            .with(self.get_filter())
            .try_init()?;

        info!(config = %self.config, "initialized global telemetry");
        Ok(self)
    }

    /// Installs the subscriber for the current thread until the guard is dropped.
    ///
    /// # Errors
    /// Currently infallible, kept symmetric with [`Telemetry::init`].
    pub fn init_scoped(self) -> Result<(Self, DefaultGuard), Error> {
        let guard = tracing::subscriber::set_default(
            Registry::default()
                .with(Self::fmt_layer(self.config.format))
                .with(self.get_filter()),
        );

        info!(config = %self.config, "initialized scoped telemetry");
        Ok((self, guard))
    }

    fn get_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.config.filter))
    }

    fn fmt_layer(format: Format) -> BoxedLayer {
        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_thread_names(true)
            .with_span_events(FmtSpan::CLOSE);

        match format {
            Format::Compact => layer.compact().with_ansi(cfg!(debug_assertions)).boxed(),
            Format::Pretty => layer.pretty().with_ansi(cfg!(debug_assertions)).boxed(),
            Format::Json => layer.json().boxed(),
        }
    }
}
