//! Analog Range Sensor Reading
//!
//! Samples the Sharp IR ranger's analog output on a fixed cadence. A plain
//! polling sampler with no concurrency hazard; it shares nothing with the
//! ultrasonic path beyond the ADC mutex.
//!
//! # Measurement Strategy
//! - Reads voltage through the shared ADC every 100ms
//! - Applies median filtering over 5 samples to reduce noise
//! - Initial 500ms delay ensures the rail has settled
//!
//! The voltage-to-distance calibration curve is sensor-batch specific and
//! is not applied here; raw and filtered volts go out as telemetry.

use defmt::info;
use embassy_rp::{adc::Channel, gpio::Pull};
use embassy_time::{Duration, Timer};
use moving_median::MovingMedian;

use crate::system::resources::{get_adc, AnalogRangeResources};

/// Time between samples
const READ_INTERVAL: Duration = Duration::from_millis(100);

/// ADC reference voltage (3.3V is the RP2350's reference)
const REF_VOLTAGE: f32 = 3.3;

/// ADC resolution (12-bit = 4096 steps)
const ADC_RANGE: f32 = 4096.0;

/// Median filter window
const MEDIAN_WINDOW_SIZE: usize = 5;

/// Analog ranging task that samples and filters the sensor voltage
#[embassy_executor::task]
pub async fn analog_range_read(r: AnalogRangeResources) {
    let mut channel = Channel::new_pin(r.adc_pin, Pull::None);

    // Setup median filter for smoothing voltage readings
    let mut median_filter = MovingMedian::<f32, MEDIAN_WINDOW_SIZE>::new();

    // Initial delay to ensure system stabilization before first reading
    Timer::after(Duration::from_millis(500)).await;

    loop {
        // Take the ADC lock only for the duration of one conversion
        let (raw, voltage) = {
            let mut adc_guard = get_adc().lock().await;
            let adc = adc_guard.as_mut().unwrap();
            let raw = adc.read(&mut channel).await.unwrap_or(0);
            (raw, f32::from(raw) * REF_VOLTAGE / ADC_RANGE)
        };

        median_filter.add_value(voltage);
        let filtered_voltage = median_filter.median();

        info!(
            "analog range: raw {}, {} V, filtered {} V",
            raw, voltage, filtered_voltage
        );

        Timer::after(READ_INTERVAL).await;
    }
}
