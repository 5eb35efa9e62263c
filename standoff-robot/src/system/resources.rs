//! Hardware Resource Management
//!
//! Manages and allocates hardware resources (pins, peripherals) to the
//! system components, defining clear ownership so no two tasks can contend
//! for the same pin.
//!
//! # Resource Groups
//! - Echo Capture: HC-SR04 echo input, owned by the capture task
//! - Ping Trigger: HC-SR04 trigger output, owned by the control loop
//! - Analog Range: Sharp IR analog output pin
//! - Motor Driver: TB6612FNG pins and PWM channels
//!
//! # Shared Resources
//! The ADC is shared and protected by a mutex. Tasks must acquire the mutex
//! lock before performing ADC operations and release it promptly after.

use assign_resources::assign_resources;
use embassy_rp::adc::InterruptHandler as AdcInterruptHandler;
use embassy_rp::adc::{Adc, Async as AdcAsync};
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::{self, ADC};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;

/// Global ADC (Analog-to-Digital Converter) instance protected by a mutex.
///
/// Only one task can access the ADC at a time, preventing conflicts in
/// hardware access.
static ADC: Mutex<CriticalSectionRawMutex, Option<Adc<'static, AdcAsync>>> = Mutex::new(None);

/// Initializes the ADC peripheral.
///
/// This should only be called once during system initialization in main.rs,
/// before any tasks are spawned.
pub fn init_adc(adc: ADC) {
    let adc = Adc::new(adc, Irqs, embassy_rp::adc::Config::default());
    critical_section::with(|_| {
        *ADC.try_lock().unwrap() = Some(adc);
    });
}

/// Returns a reference to the protected ADC instance.
///
/// Tasks should acquire the mutex lock, perform their ADC operations, and
/// release the lock as quickly as possible.
pub fn get_adc() -> &'static Mutex<CriticalSectionRawMutex, Option<Adc<'static, AdcAsync>>> {
    &ADC
}

assign_resources! {
    /// HC-SR04 echo line, watched for edges by the capture task
    echo_capture: EchoCaptureResources {
        echo_pin: PIN_14,
    },
    /// HC-SR04 trigger line, pulsed by the control loop
    ping_trigger: PingTriggerResources {
        trigger_pin: PIN_15,
    },
    /// Sharp IR range sensor analog output
    analog_range: AnalogRangeResources {
        adc_pin: PIN_26,
    },
    /// TB6612FNG dual motor driver pins and PWM channels
    motor_driver: MotorDriverResources {
        standby_pin: PIN_22,
        // Motor drive PWM
        left_slice: PWM_SLICE6,
        left_pwm_pin: PIN_28,
        left_forward_pin: PIN_21,
        left_backward_pin: PIN_20,
        // Motor drive PWM
        right_slice: PWM_SLICE5,
        right_pwm_pin: PIN_27,
        right_forward_pin: PIN_19,
        right_backward_pin: PIN_18,
    },
}

bind_interrupts!(pub struct Irqs {
    ADC_IRQ_FIFO => AdcInterruptHandler;
});
