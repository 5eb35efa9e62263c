pub mod analog_range_read;
pub mod echo_capture;
pub mod standoff_control;
pub mod standoff_drive;
