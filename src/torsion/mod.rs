//! Torsion testing core: section properties, elastic relations, the
//! post-elastic modulus model, synthetic experiments and data reduction.
//!
//! Everything here is pure and synchronous. The only source of
//! non-determinism is the random generator handed to [`synthetic::generate`].

pub mod elastic;
pub mod plasticity;
pub mod reducer;
pub mod section;
pub mod specimen;
pub mod synthetic;

pub use elastic::{
    max_shear_stress, relative_shear, safety_factor, shear_modulus, shear_stress_distribution,
    theoretical_torque, StressSample,
};
pub use plasticity::{effective_modulus, modulus_curve, EffectiveModulus, Regime};
pub use reducer::{
    analyze_degrees, least_squares_line, least_squares_slope, reduce_experiment, ReducerSettings,
};
pub use section::{polar_moment_of_inertia, polar_section_modulus};
pub use specimen::{
    CharacterizationResult, MeasurementPoint, MeasurementSeries, SeriesError, Specimen,
};
pub use synthetic::{
    generate, generate_ideal, NoiseSettings, SyntheticError, SyntheticExperiment,
    SyntheticSettings,
};
