//! Host Clock Abstraction
//!
//! The host scheduler owns the notion of "how much simulation time has
//! elapsed". A `SimTimeline` only reads it through this seam, so the same
//! timeline code runs against a stepped clock in tests and a wall clock in
//! real-time execution.

/// Source of elapsed simulation seconds.
///
/// # Contract
/// - `elapsed_seconds()` is non-decreasing between host steps.
/// - Reading never mutates observable state.
pub trait ClockSource {
    /// Seconds elapsed since the clock started.
    fn elapsed_seconds(&self) -> f64;
}

impl<T: ClockSource + ?Sized> ClockSource for &T {
    #[inline]
    fn elapsed_seconds(&self) -> f64 {
        (**self).elapsed_seconds()
    }
}

impl<T: ClockSource + ?Sized> ClockSource for std::rc::Rc<T> {
    #[inline]
    fn elapsed_seconds(&self) -> f64 {
        (**self).elapsed_seconds()
    }
}

impl<T: ClockSource + ?Sized> ClockSource for std::sync::Arc<T> {
    #[inline]
    fn elapsed_seconds(&self) -> f64 {
        (**self).elapsed_seconds()
    }
}
