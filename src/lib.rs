//! Candlestick chart layout engine for a price-prediction page.
//!
//! The domain layer solves scales, builds drawing primitives and maps pointer
//! positions back to data coordinates; everything there is pure and
//! synchronous. The presentation layer exposes it to JavaScript.

pub mod application;
pub mod domain;
pub mod infrastructure;
#[cfg(not(feature = "logic-only"))]
pub mod presentation;

#[cfg(not(feature = "logic-only"))]
use wasm_bindgen::prelude::*;

/// Install the panic hook, the console logger and the browser clock.
#[cfg(not(feature = "logic-only"))]
#[wasm_bindgen(start)]
pub fn initialize() {
    console_error_panic_hook::set_once();

    let logger = Box::new(infrastructure::services::ConsoleLogger::new_development());
    let clock = Box::new(infrastructure::services::BrowserTimeProvider::new());
    if !domain::logging::init_logger(logger) || !domain::logging::init_time_provider(clock) {
        crate::log_warn!(
            domain::logging::LogComponent::Presentation("Initialize"),
            "logging was already initialized"
        );
    }

    crate::log_info!(
        domain::logging::LogComponent::Presentation("Initialize"),
        "prediction chart engine ready"
    );
}
