//! Span-based activity recording, grounded on the teacher's `BoaProfiler`
//! (`profiler.rs`): a zero-cost no-op by default, swapped for a real
//! recorder via [`EngineOptions`](crate::context::EngineOptions) rather
//! than a global `static`/feature-gated singleton. Unlike `BoaProfiler`
//! this crate never reaches for an external tracing crate — the teacher's
//! own stack carries none, so the ambient logging story stays in this
//! same hand-rolled shape, just made instance-local and swappable.

use std::fmt;

/// Receives `(label, category)` span start/end notifications from the
/// evaluator and realm construction. Implementations are expected to be
/// cheap on the "disabled" path; [`NullRecorder`] compiles down to nothing.
pub trait ActivityRecorder: fmt::Debug {
    /// Called when a span such as `"create_intrinsics"` or `"Main"` begins.
    /// The returned token is dropped when the span ends; recorders that
    /// need paired start/end events should stash state in the token via
    /// interior mutability (none of the built-in recorders need to).
    fn start(&self, label: &str, category: &str) -> ActivitySpan;
}

/// An open span. Dropping it is the only signal recorders get that the
/// span has ended — there is no explicit `end()` call, mirroring
/// `BoaProfiler::TimingGuard`'s RAII shape.
pub struct ActivitySpan {
    on_drop: Option<Box<dyn FnOnce()>>,
}

impl ActivitySpan {
    fn new(on_drop: impl FnOnce() + 'static) -> Self {
        Self {
            on_drop: Some(Box::new(on_drop)),
        }
    }

    fn noop() -> Self {
        Self { on_drop: None }
    }
}

impl Drop for ActivitySpan {
    fn drop(&mut self) {
        if let Some(f) = self.on_drop.take() {
            f();
        }
    }
}

/// The default recorder: every span is free.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRecorder;

impl ActivityRecorder for NullRecorder {
    fn start(&self, _label: &str, _category: &str) -> ActivitySpan {
        ActivitySpan::noop()
    }
}

/// Prints `category::label` to stderr on span start and the elapsed time
/// on span end. Only built with the `std-activity` feature, matching how
/// the teacher gates `BoaProfiler`'s real backend behind `feature =
/// "profiler"` rather than compiling it in unconditionally.
#[cfg(feature = "std-activity")]
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintRecorder;

#[cfg(feature = "std-activity")]
impl ActivityRecorder for PrintRecorder {
    fn start(&self, label: &str, category: &str) -> ActivitySpan {
        let started = std::time::Instant::now();
        let label = label.to_string();
        let category = category.to_string();
        eprintln!("[{category}] {label} start");
        ActivitySpan::new(move || {
            eprintln!("[{category}] {label} done in {:?}", started.elapsed());
        })
    }
}
