use std::sync::Once;

use env_logger::Builder;
use log::LevelFilter;

static INIT: Once = Once::new();

// Prefer WARN to keep test output quiet; override via RUST_LOG when needed.
pub fn init_test_logger() {
    INIT.call_once(|| {
        let mut builder = Builder::new();
        builder
            .filter_level(LevelFilter::Warn)
            .format_timestamp_millis()
            .is_test(true)
            .parse_default_env();
        // Another test binary may already own the global logger.
        let _ = builder.try_init();
    });
}
