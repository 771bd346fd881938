use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `--debug` selects debug level and the
/// default is info. `log`-facade records from dependencies are bridged in.
pub fn init_subscriber(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let formatter = fmt::layer().with_target(false);

    let subscriber = Registry::default().with(filter).with(formatter);

    tracing_log::LogTracer::init().ok();
    tracing::subscriber::set_global_default(subscriber).ok();
}
