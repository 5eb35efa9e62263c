//! Proportional standoff control
//!
//! Maps distance error to a signed motor effort. The proportional term alone
//! settles well on this plant, so there are no integral or derivative terms
//! and no internal state beyond the gains.

/// Proportional controller with a dead-band around the setpoint
pub struct StandoffController {
    kp: f32,
    setpoint_cm: f32,
    deadband: f32,
}

impl StandoffController {
    pub const fn new(kp: f32, setpoint_cm: f32, deadband: f32) -> Self {
        Self {
            kp,
            setpoint_cm,
            deadband,
        }
    }

    /// Effort for the given filtered distance. Positive drives toward larger
    /// distance readings (away from the setpoint error). Efforts at or below
    /// the dead-band are forced to exactly zero so the actuator does not
    /// chatter around the setpoint. Clamping to the actuator's range is the
    /// effort sink's job.
    pub fn effort(&self, distance_cm: f32) -> f32 {
        let error = distance_cm - self.setpoint_cm;
        let effort = self.kp * error;
        if libm::fabsf(effort) <= self.deadband {
            0.0
        } else {
            effort
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadband_squelches_small_efforts() {
        let c = StandoffController::new(1.0, 0.0, 5.0);
        assert_eq!(c.effort(4.9), 0.0);
        assert_eq!(c.effort(5.0), 0.0);
        assert_eq!(c.effort(5.1), 5.1);
        assert_eq!(c.effort(-4.9), 0.0);
        assert_eq!(c.effort(-5.1), -5.1);
    }

    #[test]
    fn effort_is_zero_at_setpoint_regardless_of_gain() {
        let c = StandoffController::new(1000.0, 20.0, 5.0);
        assert_eq!(c.effort(20.0), 0.0);
    }

    #[test]
    fn proportional_effort_past_deadband() {
        let c = StandoffController::new(10.0, 20.0, 5.0);
        // 10 cm of error at Kp = 10; clamping is left to the sink
        assert_eq!(c.effort(30.0), 100.0);
        assert_eq!(c.effort(10.0), -100.0);
    }
}
