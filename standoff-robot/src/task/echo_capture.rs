//! Echo Edge Capture
//!
//! Timestamps the rising and falling edges of the echo line against the
//! free-running timer and feeds them into the shared capture cell. Runs on
//! the interrupt executor so an edge preempts whatever the control loop is
//! doing and the timestamp latency stays bounded.
//!
//! The cell decides which edge polarity matters in its current state; this
//! task just reconfigures its wait accordingly. A re-arm kick from the
//! control loop cancels a wait that a forced reset has made stale.

use crate::system::{echo, resources::EchoCaptureResources};
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::{Input, Pull};
use standoff_core::capture::{CaptureOutcome, EdgePolarity};

// TODO: timestamp edges in a PIO program instead, so the capture time does
// not include the executor wake latency
#[embassy_executor::task]
pub async fn echo_capture(r: EchoCaptureResources) {
    let mut echo_pin = Input::new(r.echo_pin, Pull::None);

    loop {
        let edge_wait = async {
            match echo::CAPTURE.watch_edge() {
                EdgePolarity::Rising => echo_pin.wait_for_rising_edge().await,
                EdgePolarity::Falling => echo_pin.wait_for_falling_edge().await,
            }
        };

        match select(edge_wait, echo::wait_rearm()).await {
            Either::First(()) => {
                // spurious edges come back Ignored and change nothing
                let outcome = echo::CAPTURE.on_capture_event(echo::timer_count());
                if outcome == CaptureOutcome::PulseComplete {
                    echo::notify_captured();
                }
            }
            // forced reset or fresh arm, re-evaluate the watched polarity
            Either::Second(()) => {}
        }
    }
}
