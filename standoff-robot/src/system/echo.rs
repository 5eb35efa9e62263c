//! Echo Capture Plumbing
//!
//! The shared state between the edge-capture task and the control loop: the
//! pulse-capture cell itself, a completion signal so the consumer does not
//! have to poll, and a re-arm kick that breaks the capture task out of a
//! stale edge wait after a forced reset.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Instant;
use standoff_core::capture::CaptureCell;

/// Pulse-capture cell, written by the capture task and consumed by the
/// control loop
pub static CAPTURE: CaptureCell = CaptureCell::new();

/// Raised when a full pulse width is ready for consumption
static CAPTURED: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Tells the capture task to re-evaluate which edge polarity it watches
static REARM: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Announces a completed capture to the control loop
pub fn notify_captured() {
    CAPTURED.signal(());
}

/// Waits until a capture completes
pub async fn wait_captured() {
    CAPTURED.wait().await
}

/// Drops a stale completion left over from an abandoned measurement
pub fn clear_captured() {
    CAPTURED.reset();
}

/// Kicks the capture task out of its current edge wait
pub fn request_rearm() {
    REARM.signal(());
}

/// Waits for a re-arm kick
pub async fn wait_rearm() {
    REARM.wait().await
}

/// Snapshot of the free-running 1 MHz timebase. Truncation to 32 bits is
/// harmless: pulse widths are computed with wrapping subtraction.
pub fn timer_count() -> u32 {
    Instant::now().as_ticks() as u32
}
