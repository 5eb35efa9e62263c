//! Standoff robot firmware entry point
//!
//! Initializes the system and spawns the capture and control tasks. Two
//! execution contexts: edge capture runs on an interrupt executor so it
//! preempts the thread-mode control loop, which cooperates with the drive
//! and analog sensor tasks.

#![no_std]
#![no_main]

use crate::task::{
    analog_range_read::analog_range_read, echo_capture::echo_capture,
    standoff_control::standoff_control, standoff_drive::standoff_drive,
};
use embassy_executor::{Executor, InterruptExecutor};
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use static_cell::StaticCell;
use system::resources::{
    self, AnalogRangeResources, AssignedResources, EchoCaptureResources, MotorDriverResources,
    PingTriggerResources,
};
use {defmt_rtt as _, panic_probe as _};

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

/// System core modules
mod system;
/// Task implementations
mod task;

/// High-priority executor for echo edge timestamping
static EXECUTOR_CAPTURE: InterruptExecutor = InterruptExecutor::new();
/// Thread-mode executor for the control loop and its collaborators
static EXECUTOR_MAIN: StaticCell<Executor> = StaticCell::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_CAPTURE.on_interrupt()
}

/// Firmware entry point
#[cortex_m_rt::entry]
fn main() -> ! {
    let p = embassy_rp::init(Config::default());

    // Initialize the global ADC instance before spawning any tasks, so it is
    // ready for every task that needs it and is only initialized once.
    resources::init_adc(p.ADC);

    // Split the resources into separate groups for each task, for all the resources that we do not share between tasks.
    let r = split_resources!(p);

    // Edge capture preempts everything else so the timestamp latency on a
    // capture event stays bounded.
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let capture_spawner = EXECUTOR_CAPTURE.start(interrupt::SWI_IRQ_1);
    capture_spawner.spawn(echo_capture(r.echo_capture)).unwrap();

    // Everything else cooperates on the thread executor
    let executor = EXECUTOR_MAIN.init(Executor::new());
    executor.run(|spawner| {
        spawner.spawn(standoff_control(r.ping_trigger)).unwrap();
        spawner.spawn(standoff_drive(r.motor_driver)).unwrap();
        spawner.spawn(analog_range_read(r.analog_range)).unwrap();
    })
}
