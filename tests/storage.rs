use torsion_lab::{
    config::{self, Config},
    conversion::convert,
    history::{HistoryStore, NewRecord},
    lab,
    material_db::Material,
    presets,
    quantity::QuantityKind,
    report::{self, ReportOptions},
    torsion::{analyze_degrees, ReducerSettings},
    units::{AngleUnit, TorqueUnit},
};

fn record(material: Material, angle: f64) -> NewRecord {
    NewRecord {
        material,
        length: 100.0,
        diameter: 10.0,
        torque: 140_000.0,
        angle,
        effective_modulus: Some(81_705.0),
    }
}

#[test]
fn history_appends_and_lists_newest_first() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = HistoryStore::new(dir.path().join("data").join("history.jsonl"));
    assert!(store.load_all().expect("empty").is_empty());

    let first = store.append(record(Material::Steel, 10.0)).expect("first");
    let second = store.append(record(Material::Wood, 4.0)).expect("second");
    assert_eq!((first.id, second.id), (1, 2));

    let all = store.load_all().expect("load");
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, 2);
    assert_eq!(all[0].material, Material::Wood);

    store.clear().expect("clear");
    assert!(store.load_all().expect("after clear").is_empty());
    store.clear().expect("clear twice");
}

#[test]
fn malformed_history_line_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("history.jsonl");
    std::fs::write(&path, "{not json}\n").expect("write");
    assert!(HistoryStore::new(path).load_all().is_err());
}

#[test]
fn config_round_trips_through_toml() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    let mut cfg = Config::default();
    cfg.default_material = Material::CastIron;
    cfg.synthetic.point_count = 40;
    cfg.web.port = 8080;
    cfg.save_to(&path).expect("save");

    let loaded = config::load_from(&path).expect("load");
    assert_eq!(loaded, cfg);
    assert_eq!(loaded.synthetic_settings().point_count, 40);
    assert_eq!(loaded.reducer_settings(), ReducerSettings::STANDARD);
}

#[test]
fn partial_config_keeps_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[web]\nhost = \"0.0.0.0\"\nport = 9000\n").expect("write");
    let cfg = config::load_from(&path).expect("load");
    assert_eq!(cfg.web.port, 9000);
    assert_eq!(cfg.default_material, Material::Steel);
    assert!(cfg.synthetic_settings().noise.is_some());

    std::fs::write(&path, "default_material = 3").expect("write");
    assert!(config::load_from(&path).is_err());
}

#[test]
fn experiment_report_is_saved() {
    let preset = &presets::experiments()[0];
    let specimen = lab::specimen_from_mm(preset.material, preset.diameter_mm, preset.length_mm);
    let (torques, angles): (Vec<f64>, Vec<f64>) = preset.readings.iter().copied().unzip();
    let result = lab::analyze_readings(
        specimen,
        &torques,
        &angles,
        TorqueUnit::NewtonMillimeter,
        AngleUnit::Degree,
        &ReducerSettings::STANDARD,
    )
    .expect("preset readings");

    let text = report::render_characterization(&specimen, &result, &ReportOptions::default());
    assert!(text.starts_with("# Determination of the shear modulus in torsion"));
    assert!(text.contains(preset.material.name()));

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("reports").join("run.md");
    report::save(&path, &text).expect("save");
    assert_eq!(std::fs::read_to_string(&path).expect("read"), text);
}

#[test]
fn empty_result_renders_placeholders() {
    let specimen = lab::specimen_from_mm(Material::Steel, 10.0, 100.0);
    let result = analyze_degrees(&[], 0.1, 0.01);
    let text = report::render_characterization(&specimen, &result, &ReportOptions::default());
    assert!(text.contains("n/a"));
}

#[test]
fn every_preset_is_well_formed() {
    for p in presets::calculations() {
        let input = lab::SinglePointInput {
            material: p.material,
            length_mm: p.length_mm,
            diameter_mm: p.diameter_mm,
            torque_n_mm: p.torque_n_mm,
            angle_deg: p.angle_deg,
        };
        assert!(input.validate().is_ok(), "{}", p.title);
        assert!(input.evaluate().effective_modulus.is_some(), "{}", p.title);
    }
    for p in presets::experiments() {
        assert!(p.readings.len() >= 3, "{}", p.title);
    }
}

#[test]
fn string_unit_conversion() {
    let nm = convert(QuantityKind::Torque, 1500.0, "N*mm", "N·m").expect("torque");
    assert!((nm - 1.5).abs() < 1e-12);
    let deg = convert(QuantityKind::Angle, std::f64::consts::PI, "rad", "deg").expect("angle");
    assert!((deg - 180.0).abs() < 1e-9);
    assert!(convert(QuantityKind::Length, 1.0, "furlong", "m").is_err());
}
