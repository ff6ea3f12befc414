use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::Registry;

use crate::formatter::Formatter;
use crate::layer::GoogleLogLayer;

/// Configuration of the stdout logging pipeline.
///
/// **Fields**
/// - `report_caller`: if `true`, every entry carries
///   `logging.googleapis.com/sourceLocation` built from the event's file,
///   line and module path.
#[derive(Clone, Debug, Default)]
pub struct LayerConfig {
    pub report_caller: bool,
}

/// Error returned when installing the global subscriber.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error("failed to set global subscriber: {0}")]
    SetGlobalDefault(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Subscriber produced by [`build_subscriber`].
pub type GoogleLogSubscriber<F> = Layered<GoogleLogLayer<F>, Registry>;

/// Build a [`Registry`] that writes every event to stdout through
/// `formatter`.
///
/// The subscriber is returned rather than installed so it can be scoped
/// with `tracing::subscriber::with_default` or combined further.
pub fn build_subscriber<F>(formatter: F, config: LayerConfig) -> GoogleLogSubscriber<F>
where
    F: Formatter + 'static,
{
    let layer = GoogleLogLayer::new(formatter).with_caller(config.report_caller);
    Registry::default().with(layer)
}

/// Install [`build_subscriber`]'s result as the global default subscriber.
///
/// **Returns**
/// - `Err(InitError)` if a global subscriber was already set.
pub fn try_init_tracing_with_config<F>(formatter: F, config: LayerConfig) -> Result<(), InitError>
where
    F: Formatter + 'static,
{
    tracing::subscriber::set_global_default(build_subscriber(formatter, config))?;
    Ok(())
}

/// Equivalent to [`try_init_tracing_with_config`] with
/// [`LayerConfig::default`].
pub fn try_init_tracing<F>(formatter: F) -> Result<(), InitError>
where
    F: Formatter + 'static,
{
    try_init_tracing_with_config(formatter, LayerConfig::default())
}
