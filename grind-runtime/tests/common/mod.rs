pub mod mock_transport;

use std::sync::Once;

static INIT: Once = Once::new();

/// Test logging to the captured test writer, once per binary.
#[allow(dead_code)]
pub fn init_test_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    });
}
