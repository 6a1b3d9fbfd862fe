use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use torsion_lab::{
    lab::{self, SinglePointInput},
    material_db::{find_material, profile_for, validate_modulus, Material},
    torsion::{
        analyze_degrees, effective_modulus, generate, generate_ideal, max_shear_stress,
        polar_moment_of_inertia, polar_section_modulus, reduce_experiment, shear_modulus,
        MeasurementSeries, NoiseSettings, ReducerSettings, Regime, SyntheticError,
        SyntheticSettings,
    },
    units::{AngleUnit, TorqueUnit},
};

const L: f64 = 0.1;
const D: f64 = 0.01;

#[test]
fn lab_handout_geometry() {
    // d = 10 mm, L = 100 mm, T = 1000 N·mm, 10°
    let jp = polar_moment_of_inertia(10.0);
    let wp = polar_section_modulus(10.0);
    assert!((jp - 981.75).abs() < 0.01, "jp={jp}");
    assert!((wp - 196.35).abs() < 0.01, "wp={wp}");
    let tau = max_shear_stress(1000.0, 10.0).expect("tau");
    assert!((tau - 5.09).abs() < 0.01);
    let g = shear_modulus(1000.0, 100.0, 10.0, 10f64.to_radians()).expect("g");
    assert!(g.is_finite() && g > 0.0);
}

#[test]
fn section_identity_holds() {
    for d in [0.5, 1.0, 7.5, 10.0, 42.0] {
        let lhs = polar_section_modulus(d);
        let rhs = polar_moment_of_inertia(d) * 2.0 / d;
        assert_relative_eq!(lhs, rhs, max_relative = 1e-12);
    }
    assert_eq!(polar_moment_of_inertia(0.0), 0.0);
    assert_eq!(polar_section_modulus(0.0), 0.0);
    assert!(shear_modulus(10.0, 1.0, 0.0, 0.1).is_none());
    assert!(shear_modulus(10.0, 1.0, 1.0, 0.0).is_none());
}

#[test]
fn steel_profile_limits() {
    let steel = profile_for(Material::Steel);
    assert_eq!(steel.elastic_limit_deg, 15.0);
    assert_eq!(steel.failure_angle_deg, 30.0);
    assert!(steel.stiffness_coefficient > 0.0 && steel.stiffness_coefficient <= 1.0);
    assert_eq!(find_material("чугун").expect("alias"), Material::CastIron);
}

#[test]
fn effective_modulus_is_continuous_and_vanishes_at_failure() {
    for material in Material::ALL {
        let profile = profile_for(material);
        let at = |deg: f64| {
            effective_modulus(50_000.0, 100.0, 10.0, deg, profile)
                .effective_modulus
                .expect("modulus")
        };
        let limit = profile.elastic_limit_deg;
        assert_relative_eq!(at(limit), at(limit + 1e-9), max_relative = 1e-6);
        assert_eq!(at(profile.failure_angle_deg), 0.0);
        assert_eq!(at(profile.failure_angle_deg + 5.0), 0.0);
    }
}

#[test]
fn plastic_reading_carries_warning() {
    let input = SinglePointInput {
        material: Material::CastIron,
        length_mm: 100.0,
        diameter_mm: 10.0,
        torque_n_mm: 80_000.0,
        angle_deg: 12.0,
    };
    input.validate().expect("valid");
    let outcome = input.evaluate();
    assert_eq!(outcome.regime, Regime::Plastic);
    assert!(outcome.warnings[0].contains("plasticity model applied"));
    let record = input.to_record(&outcome);
    assert_eq!(record.effective_modulus, outcome.effective_modulus);
}

#[test]
fn reducer_recovers_generator_modulus() {
    for material in Material::ALL {
        let profile = profile_for(material);
        let jp = polar_moment_of_inertia(D);
        let exp = generate_ideal(profile, jp, L, 100.0, 50).expect("ideal");
        let result = reduce_experiment(
            &exp.series,
            L,
            D,
            Some(profile),
            &ReducerSettings::STANDARD,
        );
        let g = result.shear_modulus.expect("modulus");
        assert_relative_eq!(g, exp.modulus_used, max_relative = 1e-9);
        assert!(result.relative_error_percent.expect("error") < 1e-6);
        assert_eq!(result.max_torque, Some(100.0));
    }
}

#[test]
fn noisy_run_stays_near_reference() {
    let profile = profile_for(Material::Steel);
    let jp = polar_moment_of_inertia(D);
    let settings = SyntheticSettings {
        target_max_torque: 100.0,
        point_count: 50,
        noise: Some(NoiseSettings::default()),
    };
    let a = generate(profile, jp, L, &settings, &mut StdRng::seed_from_u64(7)).expect("a");
    let b = generate(profile, jp, L, &settings, &mut StdRng::seed_from_u64(7)).expect("b");
    assert_eq!(a, b);

    let result = reduce_experiment(&a.series, L, D, Some(profile), &ReducerSettings::STANDARD);
    let g = result.shear_modulus.expect("modulus");
    assert_relative_eq!(g, profile.reference_shear_modulus, max_relative = 0.1);
    assert!(validate_modulus(Material::Steel, g, 0.2).is_plausible());
}

#[test]
fn degree_readings_scenario() {
    let data = [(100.0, 0.5), (200.0, 1.0), (300.0, 1.5), (400.0, 2.0), (500.0, 2.5)];
    let result = analyze_degrees(&data, 100.0, 10.0);
    assert!(result.shear_modulus.expect("modulus") > 0.0);
    let tau = result.max_shear_stress.expect("tau");
    assert!((tau - 500.0 / polar_section_modulus(10.0)).abs() < 1e-9);
    assert_eq!(result.series.len(), 5);
}

#[test]
fn rejected_inputs_give_empty_results() {
    let data = [(100.0, 0.5), (200.0, 1.0), (300.0, 1.5)];
    assert!(analyze_degrees(&[], 100.0, 10.0).is_empty());
    assert!(analyze_degrees(&data, 0.0, 10.0).is_empty());
    assert!(analyze_degrees(&data, 100.0, -1.0).is_empty());

    let negative = MeasurementSeries::from(vec![(1.0, 0.1), (2.0, -0.2), (3.0, 0.3)]);
    let r = reduce_experiment(&negative, L, D, None, &ReducerSettings::STANDARD);
    assert!(r.is_empty());
    assert!(r.max_shear_stress.is_none() && r.yield_limit.is_none());
}

#[test]
fn readings_in_lab_units_match_si() {
    let specimen = lab::specimen_from_mm(Material::Wood, 10.0, 100.0);
    let torques = [500.0, 1000.0, 1500.0, 2000.0];
    let angles = [2.0, 4.0, 6.0, 8.0];
    let result = lab::analyze_readings(
        specimen,
        &torques,
        &angles,
        TorqueUnit::NewtonMillimeter,
        AngleUnit::Degree,
        &ReducerSettings::STANDARD,
    )
    .expect("readings");
    let slope = 0.5 / 2f64.to_radians();
    let expected = slope * 0.1 / polar_moment_of_inertia(0.01);
    assert_relative_eq!(result.shear_modulus.expect("g"), expected, max_relative = 1e-9);

    let mismatch = lab::analyze_readings(
        specimen,
        &torques,
        &angles[..3],
        TorqueUnit::NewtonMillimeter,
        AngleUnit::Degree,
        &ReducerSettings::STANDARD,
    );
    assert!(mismatch.is_err());
}

#[test]
fn synthetic_run_reduces_against_material() {
    let specimen = lab::specimen_from_mm(Material::CastIron, 10.0, 100.0);
    let settings = SyntheticSettings {
        target_max_torque: 60.0,
        point_count: 30,
        noise: None,
    };
    let outcome = lab::run_synthetic(
        specimen,
        &settings,
        &ReducerSettings::STANDARD,
        &mut StdRng::seed_from_u64(1),
    )
    .expect("run");
    assert_eq!(outcome.result.series.len(), 30);
    assert_relative_eq!(
        outcome.result.reference_modulus.expect("ref"),
        4.0e10,
        max_relative = 1e-12
    );
    assert!(outcome.result.relative_error_percent.expect("err") < 1e-6);
}

#[test]
fn oversized_scatter_is_rejected_before_drawing() {
    let specimen = lab::specimen_from_mm(Material::Steel, 10.0, 100.0);
    let settings = SyntheticSettings {
        target_max_torque: 100.0,
        point_count: 50,
        noise: Some(NoiseSettings { error_percent: 250.0 }),
    };
    for seed in 0..20 {
        let outcome = lab::run_synthetic(
            specimen,
            &settings,
            &ReducerSettings::STANDARD,
            &mut StdRng::seed_from_u64(seed),
        );
        assert_eq!(
            outcome.unwrap_err(),
            SyntheticError::InvalidErrorPercent(250.0),
            "seed {seed}"
        );
    }

    let wide = SyntheticSettings {
        noise: Some(NoiseSettings { error_percent: 99.0 }),
        ..settings
    };
    for seed in 0..20 {
        let outcome = lab::run_synthetic(
            specimen,
            &wide,
            &ReducerSettings::STANDARD,
            &mut StdRng::seed_from_u64(seed),
        )
        .expect("within bounds");
        assert!(outcome.experiment.modulus_used > 0.0, "seed {seed}");
    }
}
