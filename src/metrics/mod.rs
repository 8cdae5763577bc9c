//! Prometheus metrics of watch transitions.
//!
//! Collectors are process-wide. [`registry()`] returns a registry with all of
//! them registered, ready to be gathered by the host's exporter.

use std::sync::Once;

use lazy_static::lazy_static;
use prometheus::Encoder;
use prometheus::IntCounterVec;
use prometheus::IntGauge;
use prometheus::Opts;
use prometheus::Registry;
use prometheus::TextEncoder;
use tracing::error;


lazy_static! {
    pub static ref VALUE_UPDATES: IntCounterVec = IntCounterVec::new(
        Opts::new("dynconf_value_updates", "Values published after a successful decode"),
        &["key"]
    )
    .expect("metric can not be created");

    pub static ref DECODE_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("dynconf_decode_failures", "Payloads skipped because they failed to decode"),
        &["key"]
    )
    .expect("metric can not be created");

    pub static ref STORE_ERRORS: IntCounterVec = IntCounterVec::new(
        Opts::new("dynconf_store_errors", "Failed long-poll requests, by kind"),
        &["key", "kind"]
    )
    .expect("metric can not be created");

    pub static ref VERSION_RESETS: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "dynconf_version_resets",
            "Times the store reported a lower version than the tracked one"
        ),
        &["key"]
    )
    .expect("metric can not be created");

    pub static ref ACTIVE_WATCHES: IntGauge =
        IntGauge::new("dynconf_active_watches", "Watches whose long-poll task is running")
            .expect("metric can not be created");

    pub static ref REGISTRY: Registry = Registry::new();
}

pub(crate) const STORE_ERROR_TRANSPORT: &str = "transport";
pub(crate) const STORE_ERROR_NOT_FOUND: &str = "not_found";

pub fn register_custom_metrics(registry: &Registry) -> prometheus::Result<()> {
    registry.register(Box::new(VALUE_UPDATES.clone()))?;
    registry.register(Box::new(DECODE_FAILURES.clone()))?;
    registry.register(Box::new(STORE_ERRORS.clone()))?;
    registry.register(Box::new(VERSION_RESETS.clone()))?;
    registry.register(Box::new(ACTIVE_WATCHES.clone()))?;
    Ok(())
}

/// Crate registry with every collector registered
pub fn registry() -> &'static Registry {
    static REGISTER: Once = Once::new();
    REGISTER.call_once(|| {
        if let Err(e) = register_custom_metrics(&REGISTRY) {
            error!("could not register dynconf metrics: {}", e);
        }
    });
    &REGISTRY
}

/// Renders the crate registry in the Prometheus text format
pub fn gather_text() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&registry().gather(), &mut buffer) {
        error!("could not encode dynconf metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
