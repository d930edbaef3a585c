use std::sync::Once;

use tracing::Level;

static INIT: Once = Once::new();

/// Installs a formatted stdout subscriber at INFO. Later calls are no-ops.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_target(false)
            .try_init();
    });
}
