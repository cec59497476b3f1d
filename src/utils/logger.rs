use crate::utils::error::{Result, WrapperError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How log lines are written to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    /// One JSON object per line, for log collectors (cloud functions, containers).
    Json,
}

impl LogFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            LogFormat::Json
        } else {
            LogFormat::Compact
        }
    }
}

/// Filter used when `RUST_LOG` is unset. The SDK runtime crates stay quiet unless
/// `verbose`, since they log every request attempt.
pub fn default_directives(verbose: bool) -> String {
    let (own, sdk) = if verbose { ("debug", "info") } else { ("info", "warn") };
    [
        format!("yc_aws_wrapper={own}"),
        format!("yc_aws={own}"),
        format!("aws_config={sdk}"),
        format!("aws_smithy_runtime={sdk}"),
        "warn".to_string(),
    ]
    .join(",")
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init(format: LogFormat, verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));
    let layer = tracing_subscriber::fmt::layer()
        .with_target(verbose)
        .with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Compact => registry.with(layer.compact()).try_init(),
        LogFormat::Json => registry.with(layer.json().flatten_event(true)).try_init(),
    };
    installed.map_err(|e| WrapperError::ConfigError {
        message: format!("failed to install log subscriber: {}", e),
    })
}
