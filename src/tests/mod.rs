//! Cross-module scenarios. Unit cases live next to each module.
use std::sync::Once;

mod kepler;

static INIT: Once = Once::new();

/// Test logger, activated once per run.
/// Convenient to debug a failing pipeline: RUST_LOG=debug cargo test
pub fn init_logger() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}
