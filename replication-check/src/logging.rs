use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize stderr logging. Stdout is reserved for the report line.
///
/// Default level is `warn` (`debug` with `verbose`); `RUST_LOG` overrides both.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_level.into());

    let result = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();

    if let Err(e) = result {
        eprintln!("Failed to initialize logging: {}", e);
    }
}
