//! Sensor acquisition
//!
//! Register-level access to each supported sensor. Reads return `None` on a
//! failed acquisition; the control plane turns that into a NaN sample value.

/// Error reported when a sensor cannot be brought up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitError;

/// Three-axis accelerometer (e.g. LIS2DW12)
pub trait AccelerometerDriver {
    /// Probe and configure the device
    fn init(&mut self) -> Result<(), InitError>;

    /// Select the full-scale range in g (2, 4, 8 or 16)
    fn set_range(&mut self, range_g: u8);

    /// Read raw signed counts for the X, Y and Z axes
    fn read_raw(&mut self) -> Option<[i16; 3]>;
}

/// Time-of-flight range finder (e.g. VL6180X)
pub trait RangeFinder {
    /// Probe and configure the device
    fn init(&mut self) -> Result<(), InitError>;

    /// Take one ranging measurement in millimetres
    fn read_mm(&mut self) -> Option<u16>;

    /// Estimated duration of one `read_mm` call, in milliseconds
    ///
    /// Used to size the oversampling window so that all reads of one tick
    /// fit inside the sampling interval.
    fn estimated_cost_per_reading_ms(&self) -> u32 {
        10
    }
}

/// Non-contact infrared thermometer (e.g. MLX90614)
pub trait Thermometer {
    /// Probe and configure the device
    fn init(&mut self) -> Result<(), InitError>;

    /// Read `(object, ambient)` temperatures in degrees Celsius
    fn read_celsius(&mut self) -> Option<(f32, f32)>;
}
