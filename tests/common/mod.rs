#![allow(dead_code)]

use approx::assert_relative_eq;
use orbit_env::ref_system::EciVector;

pub const ISS_LINE1: &str = "1 25544U 98067A   21014.31054398  .00001697  00000-0  38545-4 0  9993";
pub const ISS_LINE2: &str = "2 25544  51.6457  23.8259 0000410 224.6534 316.4858 15.49291243264748";

/// Position of the ISS at its epoch, WGS-84 constants, kilometers.
pub const ISS_EPOCH_POSITION_KM: [f64; 3] =
    [-6180.110796739977, -2828.4955912682844, -114.83452396783214];

/// Velocity of the ISS at its epoch, WGS-84 constants, km/s.
pub const ISS_EPOCH_VELOCITY_KMS: [f64; 3] =
    [2.064325100438461, -4.281604617920194, -6.007910825999104];

/// Route the `log` output of the crate to the test harness.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn assert_eci_close(actual: &EciVector, expected: &[f64; 3], epsilon: f64) {
    assert_relative_eq!(actual.x(), expected[0], epsilon = epsilon);
    assert_relative_eq!(actual.y(), expected[1], epsilon = epsilon);
    assert_relative_eq!(actual.z(), expected[2], epsilon = epsilon);
}
