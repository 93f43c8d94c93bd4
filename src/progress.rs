//! A periodic progress sink gated by wall-clock throttling, plus
//! cooperative cancellation polled at every recursive step of the decoder
//! and encoder.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::error::Error;

/// Opaque class tag passed straight through to [`ProgressSink::set`],
/// mirroring the original `klass` parameter -- the crate never inspects
/// it, it exists purely for the host to route progress to the right UI
/// element.
pub type ProgressClass = u64;

/// A host collaborator that receives periodic progress updates. Invoked
/// synchronously on the calling thread.
pub trait ProgressSink {
    fn set(&mut self, klass: ProgressClass, percent: u8, message: &str);
}

impl<F: FnMut(ProgressClass, u8, &str)> ProgressSink for F {
    fn set(&mut self, klass: ProgressClass, percent: u8, message: &str) {
        self(klass, percent, message)
    }
}

/// A host collaborator whose `is_cancelled` is polled cooperatively at
/// every recursive step of decode/encode.
pub trait CancelToken {
    fn is_cancelled(&self) -> bool;
}

/// A ready-made `Arc<AtomicBool>`-backed [`CancelToken`], cheap to clone and
/// safe to flip from another thread while a decode/encode call is running.
#[derive(Clone, Default)]
pub struct AtomicCancelToken(Arc<AtomicBool>);

impl AtomicCancelToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl CancelToken for AtomicCancelToken {
    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The progress range a decode/encode call reports into, e.g. a caller
/// driving several sub-tasks might reserve `[0, 50]` for this one.
#[derive(Debug, Clone, Copy)]
pub struct ProgressRange {
    pub min: u8,
    pub max: u8,
}

impl Default for ProgressRange {
    fn default() -> Self {
        Self { min: 0, max: 100 }
    }
}

/// Bundles the optional progress sink and cancel token collaborators a
/// decode/encode call is given, plus the wall-clock throttle state.
///
/// Throttling is coarse and opportunistic: we track the last 500ms
/// boundary we emitted at and only call through to the sink again once
/// elapsed time has crossed into a new one. This never blocks on a timer
/// and never emits more than once per visited node.
pub struct ProgressReporter<'a> {
    sink: Option<&'a mut dyn ProgressSink>,
    cancel: Option<&'a dyn CancelToken>,
    klass: ProgressClass,
    range: ProgressRange,
    started_at: Instant,
    last_emitted_bucket: u64,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(
        sink: Option<&'a mut dyn ProgressSink>,
        cancel: Option<&'a dyn CancelToken>,
        klass: ProgressClass,
        range: ProgressRange,
    ) -> Self {
        Self {
            sink,
            cancel,
            klass,
            range,
            started_at: Instant::now(),
            last_emitted_bucket: 0,
        }
    }

    pub fn none() -> Self {
        Self::new(None, None, 0, ProgressRange::default())
    }

    /// Checks the cancel token; returns `Err(Error::Cancelled)` if it has
    /// been set. Call at every recursive value and every encoded node.
    pub fn check_cancelled(&self) -> Result<(), Error> {
        if self.cancel.map_or(false, |token| token.is_cancelled()) {
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    /// Reports progress as a fraction `numerator / denominator` mapped into
    /// `self.range`, throttled to roughly once per 500ms, with `message`
    /// describing the current phase.
    pub fn report(&mut self, numerator: usize, denominator: usize, message: &str) {
        let Some(sink) = self.sink.as_deref_mut() else { return };
        let elapsed_ms = self.started_at.elapsed().as_millis() as u64;
        let bucket = elapsed_ms / 500;
        if bucket == self.last_emitted_bucket && elapsed_ms != 0 {
            return;
        }
        self.last_emitted_bucket = bucket;

        let fraction = if denominator == 0 {
            1.0
        } else {
            (numerator as f64 / denominator as f64).clamp(0.0, 1.0)
        };
        let span = (self.range.max as f64 - self.range.min as f64).max(0.0);
        let percent = (self.range.min as f64 + fraction * span).round() as u8;
        sink.set(self.klass, percent, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_cancel_token_observes_cancel_from_a_clone() {
        let token = AtomicCancelToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn reporter_with_no_sink_never_panics() {
        let mut reporter = ProgressReporter::none();
        reporter.report(5, 10, "parsing");
        assert!(reporter.check_cancelled().is_ok());
    }

    #[test]
    fn reporter_maps_fraction_into_the_configured_range() {
        let mut messages = Vec::new();
        {
            let mut sink = |_klass: ProgressClass, percent: u8, message: &str| {
                messages.push((percent, message.to_string()));
            };
            let mut reporter = ProgressReporter::new(
                Some(&mut sink),
                None,
                0,
                ProgressRange { min: 50, max: 100 },
            );
            reporter.report(1, 2, "halfway");
        }
        assert_eq!(messages, vec![(75, "halfway".to_string())]);
    }

    #[test]
    fn check_cancelled_fails_once_the_token_is_set() {
        let token = AtomicCancelToken::new();
        token.cancel();
        let reporter = ProgressReporter::new(None, Some(&token), 0, ProgressRange::default());
        assert!(reporter.check_cancelled().is_err());
    }
}
