//! Standoff Control Loop
//!
//! Issues ultrasonic pings on a fixed cadence, consumes captured pulse
//! widths, smooths them and commands a proportional motor effort that holds
//! the target standoff distance.
//!
//! # Ping Scheduling
//! A ping is only issued when the capture machine is idle; an in-flight
//! measurement is never corrupted by a second trigger. A measurement that
//! produces no echo is abandoned after a bounded timeout and the machine is
//! forcibly reset, so a missed echo costs one cycle instead of stalling the
//! sensor forever.
//!
//! # Telemetry
//! One line per control cycle: raw counts, elapsed time, one-shot distance,
//! filtered distance and commanded effort. defmt stamps each line with
//! uptime.

use crate::system::{echo, effort_command, resources::PingTriggerResources};
use defmt::{info, warn};
use embassy_rp::gpio::{Level, Output};
use embassy_time::{block_for, with_timeout, Duration, Ticker};
use standoff_core::control::StandoffController;
use standoff_core::filter::{distance_cm, pulse_micros, FilterStrategy, SampleWindow};

/// Cadence between trigger pulses
const PING_INTERVAL: Duration = Duration::from_millis(100);

/// Trigger line is held high this long to request one ping
const TRIGGER_PULSE: Duration = Duration::from_micros(10);

/// Upper bound on a round trip before the ping is written off as lost. The
/// sensor itself gives up after roughly 38ms with nothing in range.
const ECHO_TIMEOUT: Duration = Duration::from_millis(50);

/// Tick duration of the capture timebase (1 MHz timer)
const US_PER_COUNT: u32 = 1;

/// Smoothing window size
const FILTER_WINDOW: usize = 5;

/// Aggregation over the window. Mean tracks motion fastest; Median is the
/// robust alternative when dropped echoes show up as outliers.
const FILTER_STRATEGY: FilterStrategy = FilterStrategy::Mean;

/// Target standoff distance
const SETPOINT_CM: f32 = 20.0;

/// Proportional gain, tuned on hardware; P alone settles well on this plant
const PROPORTIONAL_GAIN: f32 = 10.0;

/// Efforts at or below this are squelched so the motors do not chatter at
/// the setpoint
const EFFORT_DEADBAND: f32 = 5.0;

/// Main control task: ping scheduler, distance filter and controller
#[embassy_executor::task]
pub async fn standoff_control(r: PingTriggerResources) {
    let mut trigger = Output::new(r.trigger_pin, Level::Low);
    let mut window = SampleWindow::<FILTER_WINDOW>::new();
    let controller = StandoffController::new(PROPORTIONAL_GAIN, SETPOINT_CM, EFFORT_DEADBAND);
    let mut ticker = Ticker::every(PING_INTERVAL);

    loop {
        ticker.next().await;

        // pings are only issued while the capture machine is idle
        if !echo::CAPTURE.try_arm() {
            warn!("capture machine not idle at ping time, resetting");
            echo::CAPTURE.force_idle();
            echo::request_rearm();
            continue;
        }
        echo::clear_captured();

        // blocking for the trigger width is fine, it is a tiny fraction of
        // the ping cadence
        trigger.set_high();
        block_for(TRIGGER_PULSE);
        trigger.set_low();

        if with_timeout(ECHO_TIMEOUT, echo::wait_captured())
            .await
            .is_err()
        {
            // missed echo; the next scheduled ping is the retry
            warn!("no echo within {}ms", ECHO_TIMEOUT.as_millis());
            echo::CAPTURE.force_idle();
            echo::request_rearm();
            continue;
        }

        let Some(width_counts) = echo::CAPTURE.try_consume() else {
            continue;
        };

        let pulse_us = pulse_micros(width_counts, US_PER_COUNT);
        let single_cm = distance_cm(pulse_us);
        window.push(pulse_us);
        let filtered_cm = distance_cm(window.aggregate(FILTER_STRATEGY));

        let effort = controller.effort(filtered_cm);
        effort_command::update(effort);

        info!(
            "pulse {} counts / {} us, distance {} cm, filtered {} cm, effort {}",
            width_counts, pulse_us, single_cm, filtered_cm, effort
        );
    }
}
