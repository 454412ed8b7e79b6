use const_format::concatcp;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt};

use common::log_debug;

use crate::session::ENV_PREFIX;

const LOG_ENV: &str = concatcp!(ENV_PREFIX, "_LOG");

/// Installs a hierarchical subscriber on stderr, filtered by `MARSH_LOG`.
///
/// If the host has already set up a global subscriber, it is kept as is.
pub(crate) fn init_logging() {
    let env_filter = EnvFilter::builder()
        .with_env_var(LOG_ENV)
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    let tree_layer = tracing_tree::HierarchicalLayer::new(2)
        .with_writer(std::io::stderr)
        .with_targets(true)
        .with_indent_lines(true);

    let result = tracing_subscriber::registry()
        .with(env_filter)
        .with(tree_layer)
        .try_init();

    match result {
        Ok(()) => log_debug!("Logging initialized"),
        Err(_) => log_debug!("A global subscriber is already set, keeping it"),
    }
}
