//! Injectable diagnostics hook.
//!
//! Layout code never prints. It reports recoverable anomalies and fallbacks
//! through a `Diagnostics` implementation chosen by the caller.

/// Receiver for messages emitted while laying out a graph.
pub trait Diagnostics {
    fn debug(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards to the `log` facade under the `constellation` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn debug(&self, message: &str) {
        log::debug!(target: "constellation", "{}", message);
    }

    fn warn(&self, message: &str) {
        log::warn!(target: "constellation", "{}", message);
    }

    fn error(&self, message: &str) {
        log::error!(target: "constellation", "{}", message);
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Diagnostics for Silent {
    fn debug(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}
