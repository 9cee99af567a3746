use brushkit_core::{ConfigError, Error};
use brushkit_settings::{InfillStrategy, LayerSettings, PainterConfig, StateHandoff};
use std::fs;

#[test]
fn test_json_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("painter.json");

    let mut config = PainterConfig::default();
    config.global.seed = Some(7);
    config.layers[0] = LayerSettings::new("Red", 66.0, 862.0).with_image("red.png");

    config.save_to_file(&path).unwrap();
    let loaded = PainterConfig::load_from_file(&path).unwrap();

    assert_eq!(loaded.global, config.global);
    assert_eq!(loaded.layers.len(), 4);
    // relative image paths are anchored at the config directory
    assert_eq!(loaded.layers[0].image, Some(dir.path().join("red.png")));
}

#[test]
fn test_toml_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("painter.toml");

    let mut config = PainterConfig::default();
    config.global.state_handoff = StateHandoff::Carry;
    config.save_to_file(&path).unwrap();

    let loaded = PainterConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_front_end_key_names_accepted() {
    let json = r#"{
        "global": {
            "target_width": 1070, "brush_w": 1.6, "overlap": 0.15,
            "x_off": 263, "y_off": 266,
            "z_paint": 0.0, "z_low": 4.6, "z_high": 31.0, "z_wipe_exit": 16.0, "dip_z": 0.0,
            "min_dist": 240, "max_dist": 280, "dip_jitter": 20,
            "dip_spiral_loops": 1.0, "dip_spiral_r": 50, "wipe_r": 70,
            "feed": 12000, "feed_paint": 400, "accel_travel": 12000, "accel_paint": 200
        },
        "layers": [
            {"name": "Color 1", "enabled": true, "dip_x": 66, "dip_y": 862,
             "infill_type": "concentric", "infill_angle": 0, "brush_w": null,
             "image_path": "/tmp/layer_0.png"},
            {"name": "Color 2", "enabled": false, "dip_x": 66, "dip_y": 700}
        ]
    }"#;

    let config = PainterConfig::from_json_str(json).unwrap();
    assert_eq!(config.global.brush_width, 1.6);
    assert_eq!(config.global.min_distance, 240.0);
    assert_eq!(config.global.jitter_radius, 20.0);
    assert_eq!(config.global.threshold, 140);
    assert_eq!(config.global.working_scale, 2.0);
    assert_eq!(config.layers[0].station_x, Some(66.0));
    assert_eq!(
        config.layers[0].infill_strategy,
        Some(InfillStrategy::Concentric)
    );
    assert_eq!(config.layers[0].brush_width, None);
    assert_eq!(config.enabled_layers().count(), 1);
}

#[test]
fn test_missing_numeric_field_is_configuration_error() {
    let json = r#"{"global": {"target_width": 100}, "layers": []}"#;
    let err = PainterConfig::from_json_str(json).unwrap_err();
    match err {
        Error::Configuration(ConfigError::Parse(msg)) => assert!(msg.contains("missing field")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_inverted_distance_range_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("painter.toml");

    let mut config = PainterConfig::default();
    config.global.min_distance = 400.0;
    let text = toml::to_string_pretty(&config).unwrap();
    fs::write(&path, text).unwrap();

    let err = PainterConfig::load_from_file(&path).unwrap_err();
    assert!(err.is_config_error());
    assert!(err.to_string().contains("min_distance"));
}

#[test]
fn test_enabled_layer_without_station_rejected() {
    let mut config = PainterConfig::default();
    config.layers[1].station_y = None;
    let err = config.validate().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Missing required field 'station_y' in layer 2 \"Color 2 - Teal\""
    );

    // the same gap on a disabled layer is ignored
    config.layers[1].enabled = false;
    assert!(config.validate().is_ok());
}

#[test]
fn test_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("painter.yaml");
    fs::write(&path, "global: {}").unwrap();

    let err = PainterConfig::load_from_file(&path).unwrap_err();
    assert!(matches!(
        err,
        Error::Configuration(ConfigError::UnsupportedFormat(ref ext)) if ext == "yaml"
    ));
}
