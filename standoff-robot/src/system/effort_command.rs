//! Effort Command Module
//!
//! Carries the commanded motor effort from the control loop to the drive
//! task. A Signal fits here: the sink only ever wants the latest command,
//! and when the sensor stalls the last commanded effort simply stays in
//! effect.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Signal for motor effort commands
pub static EFFORT: Signal<CriticalSectionRawMutex, f32> = Signal::new();

/// Publishes a new effort command, replacing any unconsumed one
pub fn update(effort: f32) {
    EFFORT.signal(effort);
}

/// Waits for the next effort command
pub async fn wait() -> f32 {
    EFFORT.wait().await
}
