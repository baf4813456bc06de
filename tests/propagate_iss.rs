mod common;

use approx::assert_relative_eq;
use orbit_env::constants::RADEG;
use orbit_env::sgp4::gravity::GravityModel;
use orbit_env::sgp4::{solve_kepler_equation, LengthUnit, PropagationError, Sgp4Propagator};
use orbit_env::tle_reader::{parse_tle, parse_tle_batch};
use orbit_env::{MeanElementRecord, OrbitEnvError};

use crate::common::{
    assert_eci_close, init_logger, ISS_EPOCH_POSITION_KM, ISS_EPOCH_VELOCITY_KMS, ISS_LINE1,
    ISS_LINE2,
};

#[test]
fn test_tle_to_epoch_state() {
    init_logger();
    let record = parse_tle(ISS_LINE1, ISS_LINE2).unwrap();
    let mut propagator = Sgp4Propagator::from_record(&record, GravityModel::Wgs84).unwrap();

    let state = propagator.propagate_km(0.0).unwrap();
    assert_eci_close(&state.position, &ISS_EPOCH_POSITION_KM, 1e-6);
    assert_eci_close(&state.velocity, &ISS_EPOCH_VELOCITY_KMS, 1e-9);

    // propagate(0) right after initialize reproduces the validation state, in meters
    let meters = propagator.propagate(0.0).unwrap();
    assert_eq!(meters.unit, LengthUnit::Meter);
    assert_eci_close(
        &meters.position,
        &ISS_EPOCH_POSITION_KM.map(|v| v * 1000.0),
        1e-3,
    );
    assert_eq!(meters, propagator.propagate(0.0).unwrap());
}

#[test]
fn test_batch_from_catalog_text() {
    let catalog = format!("ISS (ZARYA)\n{ISS_LINE1}\n{ISS_LINE2}\n\n{ISS_LINE1}\n{ISS_LINE2}\n");
    let records = parse_tle_batch(&catalog).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].0.as_deref(), Some("ISS (ZARYA)"));
    assert_eq!(records[1].0, None);
    assert_eq!(records[0].1, records[1].1);
}

#[test]
fn test_one_day_orbit_stays_bounded() {
    let mut propagator = Sgp4Propagator::from_record(
        &parse_tle(ISS_LINE1, ISS_LINE2).unwrap(),
        GravityModel::Wgs84,
    )
    .unwrap();
    let period = propagator.period_minutes().unwrap();
    assert_relative_eq!(period, 92.956, epsilon = 1e-3);

    let mut previous = propagator.propagate_km(0.0).unwrap();
    for minute in 1..=1440 {
        let state = propagator.propagate_km(minute as f64).unwrap();
        let radius = state.position.norm();
        assert!((6_700.0..6_850.0).contains(&radius), "{minute}: {radius}");
        assert_relative_eq!(state.velocity.norm(), 7.66, epsilon = 0.05);

        // ~460 km per minute along the orbit
        let step = (state.position.0 - previous.position.0).norm();
        assert!((400.0..500.0).contains(&step), "{minute}: {step}");
        previous = state;
    }
    assert_eq!(propagator.last_error(), None);
}

#[test]
fn test_decay_leaves_no_state() {
    init_logger();
    let n = MeanElementRecord::rev_per_day_to_rad_per_min(16.0);
    let record = MeanElementRecord::new(99_999, 2_459_228.5, 0.0, 51.6 * RADEG, 0.0, 0.0, 0.0, n, 0.1);
    let mut propagator = Sgp4Propagator::from_record(&record, GravityModel::Wgs84).unwrap();

    let result = propagator.propagate(500.0);
    assert!(matches!(
        result,
        Err(OrbitEnvError::Propagation(PropagationError::Decayed { .. }))
    ));
    assert!(matches!(
        propagator.last_error(),
        Some(PropagationError::Decayed { .. })
    ));

    // still usable near the epoch
    assert!(propagator.propagate(0.0).is_ok());
}

#[test]
fn test_kepler_solver_convergence() {
    for &e in &[0.0, 0.001, 0.1, 0.5, 0.9] {
        for k in 0..16 {
            let u = k as f64 * std::f64::consts::TAU / 16.0;
            let w = 0.3 + k as f64;
            let (axnl, aynl) = (e * w.cos(), e * w.sin());
            let (eo1, iterations) = solve_kepler_equation(u, axnl, aynl);

            let residual = eo1 - axnl * eo1.sin() + aynl * eo1.cos() - u;
            assert!(iterations <= 10);
            assert!(residual.abs() < 1e-9, "e={e} u={u}: {residual}");
            if e == 0.0 {
                assert_eq!(iterations, 1);
            }
        }
    }
}

#[test]
fn test_gravity_models_agree_within_meters() {
    let record = parse_tle(ISS_LINE1, ISS_LINE2).unwrap();
    let mut wgs84 = Sgp4Propagator::from_record(&record, GravityModel::Wgs84).unwrap();
    let mut wgs72 = Sgp4Propagator::from_record(&record, GravityModel::Wgs72).unwrap();

    let a = wgs84.propagate_km(60.0).unwrap();
    let b = wgs72.propagate_km(60.0).unwrap();
    let separation = (a.position.0 - b.position.0).norm();
    assert!(separation > 0.0 && separation < 1.0, "{separation} km");
}
