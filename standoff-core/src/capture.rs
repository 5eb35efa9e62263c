//! Echo pulse capture
//!
//! Measures the width of the echo pulse by timestamping its rising and
//! falling edges against a free-running timer. The state machine walks one
//! cycle per ping:
//!
//! ```text
//! Idle --arm--> WaitingLow --rising edge--> WaitingHigh --falling edge--> Captured --consume--> Idle
//! ```
//!
//! # Sharing Discipline
//! The raw edge timestamps and the state variable are the only data shared
//! between the capture context and the control loop. [`CaptureCell`] wraps
//! them in a blocking mutex so every access is one scoped critical section;
//! a capture event can never observe or produce a half-updated pair.
//!
//! # Edge Cases
//! - Capture events outside `WaitingLow`/`WaitingHigh` are ignored, so a
//!   stray edge before a ping or after the pulse closed cannot corrupt a
//!   measurement.
//! - The pulse width is computed with wrapping subtraction; a counter
//!   overflow between the two edges still yields the true modular width.
//! - A missed falling edge leaves the machine in `WaitingHigh`. [`CaptureCell::force_idle`]
//!   is the recovery path for a consumer that has given up waiting.

use core::cell::RefCell;

use defmt::Format;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// Lifecycle of a single ping measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum PulseState {
    /// No ping in flight
    Idle,
    /// Trigger issued, watching for the echo's rising edge
    WaitingLow,
    /// Rising edge seen, watching for the falling edge
    WaitingHigh,
    /// Both edges seen, pulse width ready for consumption
    Captured,
}

/// Edge polarity the capture source must watch for next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum EdgePolarity {
    Rising,
    Falling,
}

/// What a capture event did to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum CaptureOutcome {
    /// Event arrived outside an armed measurement and was dropped
    Ignored,
    /// Rising edge recorded, pulse is open
    PulseStarted,
    /// Falling edge recorded, pulse width is ready
    PulseComplete,
}

/// Raw timing and state, mutated only through [`CaptureCell`]
struct PulseCapture {
    state: PulseState,
    /// Timer count at the rising edge
    pulse_start: u32,
    /// Timer count at the falling edge
    pulse_end: u32,
}

impl PulseCapture {
    const fn new() -> Self {
        Self {
            state: PulseState::Idle,
            pulse_start: 0,
            pulse_end: 0,
        }
    }

    fn on_capture_event(&mut self, count: u32) -> CaptureOutcome {
        match self.state {
            PulseState::WaitingLow => {
                self.pulse_start = count;
                self.state = PulseState::WaitingHigh;
                CaptureOutcome::PulseStarted
            }
            PulseState::WaitingHigh => {
                self.pulse_end = count;
                self.state = PulseState::Captured;
                CaptureOutcome::PulseComplete
            }
            // spurious event, nothing armed
            _ => CaptureOutcome::Ignored,
        }
    }

    fn width(&self) -> u32 {
        self.pulse_end.wrapping_sub(self.pulse_start)
    }
}

/// Single-producer/single-consumer cell for one in-flight ping measurement.
///
/// The capture context feeds edges in through [`on_capture_event`]; the
/// control loop arms and consumes through [`try_arm`] and [`try_consume`].
/// The state machine itself guarantees at most one measurement is in flight,
/// so no queueing is needed.
///
/// [`on_capture_event`]: CaptureCell::on_capture_event
/// [`try_arm`]: CaptureCell::try_arm
/// [`try_consume`]: CaptureCell::try_consume
pub struct CaptureCell {
    inner: Mutex<CriticalSectionRawMutex, RefCell<PulseCapture>>,
}

impl CaptureCell {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(PulseCapture::new())),
        }
    }

    /// Arms the machine for a new ping. Returns `false` unless the machine
    /// is `Idle`; a trigger pulse must never be issued while a measurement
    /// is in flight.
    pub fn try_arm(&self) -> bool {
        self.inner.lock(|c| {
            let mut c = c.borrow_mut();
            if c.state == PulseState::Idle {
                c.state = PulseState::WaitingLow;
                true
            } else {
                false
            }
        })
    }

    /// Records a capture event. Safe to call from interrupt context; does
    /// not allocate or block.
    pub fn on_capture_event(&self, count: u32) -> CaptureOutcome {
        self.inner.lock(|c| c.borrow_mut().on_capture_event(count))
    }

    /// Takes the captured pulse width in timer counts and returns the
    /// machine to `Idle`. `None` unless a pulse has been fully captured.
    pub fn try_consume(&self) -> Option<u32> {
        self.inner.lock(|c| {
            let mut c = c.borrow_mut();
            if c.state == PulseState::Captured {
                c.state = PulseState::Idle;
                Some(c.width())
            } else {
                None
            }
        })
    }

    /// Edge polarity the capture source should be configured for in the
    /// current state.
    pub fn watch_edge(&self) -> EdgePolarity {
        self.inner.lock(|c| match c.borrow().state {
            PulseState::WaitingHigh => EdgePolarity::Falling,
            _ => EdgePolarity::Rising,
        })
    }

    /// Abandons an in-flight measurement. Recovery path for a missed echo
    /// that would otherwise stall the machine forever.
    pub fn force_idle(&self) {
        self.inner.lock(|c| c.borrow_mut().state = PulseState::Idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_captures_once_and_resets_on_consume() {
        let cell = CaptureCell::new();
        assert!(cell.try_arm());
        assert_eq!(cell.on_capture_event(100), CaptureOutcome::PulseStarted);
        assert_eq!(cell.on_capture_event(680), CaptureOutcome::PulseComplete);
        assert_eq!(cell.try_consume(), Some(580));
        // consumed, so the machine is idle and re-armable
        assert_eq!(cell.try_consume(), None);
        assert!(cell.try_arm());
    }

    #[test]
    fn arm_refused_outside_idle() {
        let cell = CaptureCell::new();
        assert!(cell.try_arm());
        assert!(!cell.try_arm());
        cell.on_capture_event(10);
        assert!(!cell.try_arm());
        cell.on_capture_event(20);
        assert!(!cell.try_arm());
        cell.try_consume();
        assert!(cell.try_arm());
    }

    #[test]
    fn spurious_events_are_ignored() {
        let cell = CaptureCell::new();
        assert_eq!(cell.on_capture_event(42), CaptureOutcome::Ignored);
        assert_eq!(cell.try_consume(), None);

        assert!(cell.try_arm());
        cell.on_capture_event(100);
        cell.on_capture_event(200);
        // events after the pulse closed leave the captured width alone
        assert_eq!(cell.on_capture_event(999), CaptureOutcome::Ignored);
        assert_eq!(cell.try_consume(), Some(100));
    }

    #[test]
    fn width_survives_counter_wraparound() {
        let cell = CaptureCell::new();
        assert!(cell.try_arm());
        cell.on_capture_event(u32::MAX - 15);
        cell.on_capture_event(16);
        assert_eq!(cell.try_consume(), Some(32));
    }

    #[test]
    fn watch_edge_follows_state() {
        let cell = CaptureCell::new();
        assert_eq!(cell.watch_edge(), EdgePolarity::Rising);
        cell.try_arm();
        assert_eq!(cell.watch_edge(), EdgePolarity::Rising);
        cell.on_capture_event(5);
        assert_eq!(cell.watch_edge(), EdgePolarity::Falling);
        cell.on_capture_event(10);
        assert_eq!(cell.watch_edge(), EdgePolarity::Rising);
    }

    #[test]
    fn force_idle_recovers_stalled_capture() {
        let cell = CaptureCell::new();
        cell.try_arm();
        cell.on_capture_event(5);
        cell.force_idle();
        assert_eq!(cell.try_consume(), None);
        assert!(cell.try_arm());
    }
}
