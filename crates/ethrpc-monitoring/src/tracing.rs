use ethrpc_config::LoggingConfig;
use thiserror::Error;
use tracing::{info, warn, Level, Subscriber};
use tracing_subscriber::{
	filter::LevelFilter, fmt, fmt::format::FmtSpan, layer::SubscriberExt,
	util::SubscriberInitExt,
};

#[derive(Error, Debug)]
pub enum TracingError {
	#[error("Failed to initialize tracing: {0}")]
	Init(String),
}

/// Tracing configuration
#[derive(Debug, Clone)]
pub struct TracingConfig {
	pub level: Level,
	pub with_thread_ids: bool,
	pub with_thread_names: bool,
	pub with_file_and_line: bool,
	pub with_target: bool,
	pub with_span_events: FmtSpan,
	pub json_format: bool,
}

impl Default for TracingConfig {
	fn default() -> Self {
		Self {
			level: Level::INFO,
			with_thread_ids: true,
			with_thread_names: true,
			with_file_and_line: true,
			with_target: true,
			with_span_events: FmtSpan::NONE,
			json_format: false,
		}
	}
}

impl TracingConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_level(mut self, level: Level) -> Self {
		self.level = level;
		self
	}

	pub fn debug() -> Self {
		Self::default().with_level(Level::DEBUG)
	}

	pub fn production() -> Self {
		Self {
			level: Level::INFO,
			with_thread_ids: false,
			with_thread_names: false,
			with_file_and_line: false,
			with_target: false,
			with_span_events: FmtSpan::NONE,
			json_format: true,
		}
	}
}

impl From<&LoggingConfig> for TracingConfig {
	/// An unparseable level falls back to `INFO`; the config loader rejects
	/// such levels before they get here.
	fn from(config: &LoggingConfig) -> Self {
		let level = config.level.parse().unwrap_or_else(|_| {
			warn!("Unknown log level '{}', using info", config.level);
			Level::INFO
		});

		if config.json {
			Self::production().with_level(level)
		} else {
			Self::default().with_level(level)
		}
	}
}

/// Fmt layer with the options shared by the pretty and JSON outputs.
fn fmt_layer<S>(config: &TracingConfig) -> fmt::Layer<S> {
	fmt::layer()
		.with_span_events(config.with_span_events.clone())
		.with_thread_ids(config.with_thread_ids)
		.with_thread_names(config.with_thread_names)
		.with_file(config.with_file_and_line)
		.with_line_number(config.with_file_and_line)
		.with_target(config.with_target)
}

/// Subscriber described by `config`, not yet installed.
fn build_subscriber(config: &TracingConfig) -> impl Subscriber + Send + Sync + 'static {
	// Exactly one of the two is present.
	let (json, pretty) = if config.json_format {
		(Some(fmt_layer(config).json()), None)
	} else {
		(None, Some(fmt_layer(config).pretty()))
	};

	tracing_subscriber::registry()
		.with(LevelFilter::from_level(config.level))
		.with(json)
		.with(pretty)
}

/// Initialize tracing with the given configuration
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
	build_subscriber(&config)
		.try_init()
		.map_err(|e| TracingError::Init(e.to_string()))?;

	info!("Tracing initialized with level: {:?}", config.level);
	Ok(())
}
