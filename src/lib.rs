pub mod constants;
pub mod geomag;
pub mod mean_elements;
pub mod orbit_env;
pub mod orbit_env_errors;
pub mod params;
pub mod ref_system;
pub mod sgp4;
pub mod sun;
pub mod time;
pub mod tle_reader;

pub use geomag::{GeomagneticModel, MagneticFieldReading};
pub use mean_elements::MeanElementRecord;
pub use orbit_env::{EnvironmentSnapshot, OrbitEnvironment};
pub use orbit_env_errors::OrbitEnvError;
pub use params::{EnvParams, EnvParamsBuilder};
pub use ref_system::{EcefVector, EciVector, GeodeticPosition, LocalCartesian};
pub use sgp4::{gravity::GravityModel, CartesianState, PropagationError, Sgp4Propagator};
pub use sun::{EclipseState, SunModel, SunPrecision};
pub use tle_reader::{parse_tle, ParseTleError};
