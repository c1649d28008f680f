//! Span helpers for the process and for individual backup cycles.
//!
//! # Design
//! - Provides an application-level span guard so every event carries the build SHA.
//! - Gives each backup cycle its own span keyed by sequence number and archive name.

use tracing::{Span, span::Entered};

use crate::init::build_sha;

/// Guard that keeps the application-level span entered for the lifetime of the process.
pub struct GlobalContextGuard {
    _guard: Entered<'static>,
}

impl GlobalContextGuard {
    #[must_use]
    /// Enter the application-level tracing span for the lifetime of the guard.
    pub fn new(component: impl Into<String>) -> Self {
        let component = component.into();
        let span: &'static Span = Box::leak(Box::new(tracing::info_span!(
            "app",
            component = %component,
            build_sha = %build_sha()
        )));
        let guard = span.enter();
        Self { _guard: guard }
    }
}

/// Build the span that wraps a single backup cycle.
#[must_use]
pub fn cycle_span(sequence: u64, archive_name: &str) -> Span {
    tracing::info_span!("backup_cycle", sequence, archive = %archive_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_span_can_be_entered() {
        let span = cycle_span(7, "backup_2026-01-01_00-00-00.zip");
        let _entered = span.enter();
        tracing::info!("inside cycle span");
    }

    #[test]
    fn global_guard_enters_span() {
        let _guard = GlobalContextGuard::new("test");
        tracing::info!("inside app span");
    }
}
