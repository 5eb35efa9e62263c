//! Standoff Drive Task
//!
//! Applies commanded efforts to both motors of a TB6612FNG driver. Effort is
//! symmetric across the channels: the robot only ever drives straight toward
//! or away from the obstacle it is holding distance to.

use crate::system::{effort_command, resources::MotorDriverResources};
use defmt::info;
use embassy_rp::gpio;
use embassy_rp::pwm;
use tb6612fng::{DriveCommand, Motor, Tb6612fng};

/// Duty range accepted by the motor driver
const MAX_EFFORT: f32 = 100.0;

#[embassy_executor::task]
pub async fn standoff_drive(r: MotorDriverResources) {
    // Configure PWM for motor control
    // We use 10kHz frequency as cheaper DC motors often work better at lower frequencies
    let desired_freq_hz = 10_000;
    let clock_freq_hz = embassy_rp::clocks::clk_sys_freq(); // 150MHz

    // Calculate minimum divider needed to keep period under 16-bit limit (65535)
    let divider = ((clock_freq_hz / desired_freq_hz) / 65535 + 1) as u8;
    let period = (clock_freq_hz / (desired_freq_hz * divider as u32)) as u16 - 1;

    // Configure PWM
    let mut pwm_config = pwm::Config::default();
    pwm_config.divider = divider.into();
    pwm_config.top = period;

    // Initialize TB6612FNG motor driver pins
    let stby = gpio::Output::new(r.standby_pin, gpio::Level::Low);

    // motor A, here defined to be the left motor
    let left_fwd = gpio::Output::new(r.left_forward_pin, gpio::Level::Low);
    let left_bckw = gpio::Output::new(r.left_backward_pin, gpio::Level::Low);
    let left_pwm = pwm::Pwm::new_output_a(r.left_slice, r.left_pwm_pin, pwm_config.clone());
    let left_motor = Motor::new(left_fwd, left_bckw, left_pwm).unwrap();

    // motor B, here defined to be the right motor
    let right_fwd = gpio::Output::new(r.right_forward_pin, gpio::Level::Low);
    let right_bckw = gpio::Output::new(r.right_backward_pin, gpio::Level::Low);
    let right_pwm = pwm::Pwm::new_output_b(r.right_slice, r.right_pwm_pin, pwm_config.clone());
    let right_motor = Motor::new(right_fwd, right_bckw, right_pwm).unwrap();

    // Create motor driver controller instance
    let mut control = Tb6612fng::new(left_motor, right_motor, stby).unwrap();
    control.disable_standby().unwrap();

    loop {
        let effort = effort_command::wait().await;

        // the controller emits unclamped proportional effort; the duty range
        // is enforced here at the sink
        let duty = effort.clamp(-MAX_EFFORT, MAX_EFFORT) as i8;

        if duty > 0 {
            info!("drive forward {}", duty);
            control
                .motor_a
                .drive(DriveCommand::Forward(duty as u8))
                .unwrap();
            control
                .motor_b
                .drive(DriveCommand::Forward(duty as u8))
                .unwrap();
        } else if duty < 0 {
            info!("drive backward {}", -duty);
            control
                .motor_a
                .drive(DriveCommand::Backward(-duty as u8))
                .unwrap();
            control
                .motor_b
                .drive(DriveCommand::Backward(-duty as u8))
                .unwrap();
        } else {
            control.motor_a.drive(DriveCommand::Stop).unwrap();
            control.motor_b.drive(DriveCommand::Stop).unwrap();
        }
    }
}
