//! Lookups against the bundled WeatherLink table

mod common;

use common::bundled_json;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;
use wl_translations::{
    is_state_token, normalize_token, EntityCatalog, Namespace, Platform, Translations,
    COMPASS_TOKENS, DOMAIN,
};

fn strings() -> &'static Translations {
    Translations::bundled()
}

#[test]
fn test_wind_direction_state() {
    assert_eq!(
        strings().lookup(Namespace::Entity, &["sensor", "wind_direction", "state", "n"]),
        Some("N")
    );
}

#[test]
fn test_config_step_field_label() {
    assert_eq!(
        strings().lookup(Namespace::Config, &["step", "user", "data", "api_version"]),
        Some("API version")
    );
}

#[test]
fn test_selector_option() {
    assert_eq!(
        strings().lookup(Namespace::Selector, &["set_api_ver", "options", "api_v1"]),
        Some("API V1")
    );
    assert_eq!(strings().selector_option("set_api_ver", "api_v2"), Some("API V2"));
}

#[test]
fn test_unknown_entity_is_absent() {
    assert_eq!(
        strings().lookup(Namespace::Entity, &["sensor", "does_not_exist", "name"]),
        None
    );

    let shown = strings().display(Namespace::Entity, &["sensor", "does_not_exist", "name"]);
    assert!(matches!(shown, Cow::Owned(_)));
    assert_eq!(shown, "Name");
}

#[test]
fn test_config_abort() {
    assert_eq!(
        strings().lookup(Namespace::Config, &["abort", "already_configured"]),
        Some("Device is already configured")
    );
}

#[test]
fn test_config_steps() {
    for step in ["user", "user_1", "user_2", "user_3"] {
        assert!(strings().config_step(step).is_some(), "missing step {}", step);
    }
    let user_2 = strings().config_step("user_2").unwrap();
    assert_eq!(user_2.data["api_key_v2"], "API key");
    assert_eq!(user_2.data["api_secret"], "API secret");
    assert_eq!(strings().config_step("user_3").unwrap().data["station_id"], "Station");
    assert_eq!(strings().config_error("invalid_auth"), Some("Invalid authentication"));
}

#[test]
fn test_every_leaf_matches_source() {
    let source = bundled_json();
    let leaves = strings().leaves();
    assert!(leaves.len() > 150);

    for (path, text) in leaves {
        let mut expected = &source;
        for key in path.segments() {
            expected = &expected[key.as_str()];
        }
        assert_eq!(expected, &Value::String(text.to_string()), "mismatch at {}", path);
        assert!(!text.is_empty());
        assert_eq!(strings().lookup_key(&path.to_string()), Some(text));
    }
}

#[test]
fn test_state_tokens_are_lowercase_and_distinct() {
    for (platform, entities) in &strings().schema().entity {
        for (key, descriptor) in entities {
            let mut normalized = HashSet::new();
            for token in descriptor.state.keys() {
                assert!(is_state_token(token), "{}.{} token {}", platform, key, token);
                assert!(
                    normalized.insert(normalize_token(token)),
                    "{}.{} token {} collides",
                    platform,
                    key,
                    token
                );
            }
        }
    }
}

#[test]
fn test_compass_states_complete() {
    for key in ["wind_direction", "wind_gust_direction"] {
        for token in COMPASS_TOKENS {
            let label = strings().entity_state(Platform::Sensor, key, token).unwrap();
            assert_eq!(label, token.to_uppercase());
        }
    }
}

#[test]
fn test_bar_trend_labels() {
    assert_eq!(
        strings().entity_state(Platform::Sensor, "bar_trend", &normalize_token("Rising Slowly")),
        Some("Rising slowly")
    );
    assert_eq!(
        strings().entity_state(Platform::Sensor, "rx_state", "synched"),
        Some("Synched")
    );
}

#[test]
fn test_wind_direction_attribute_labels_are_distinct() {
    let wind = strings().entity(Platform::Sensor, "wind_direction").unwrap();
    assert_eq!(
        wind.state_attributes["wind_dir_scalar_avg_last_1_min"].name.as_deref(),
        Some("Wind dir last 1min")
    );
    assert_eq!(
        wind.state_attributes["wind_dir_scalar_avg_last_2_min"].name.as_deref(),
        Some("Wind dir last 2min")
    );
}

#[test]
fn test_bundled_lint_is_clean() {
    let warnings = strings().lint();
    assert!(warnings.is_empty(), "{:?}", warnings);
}

#[test]
fn test_bundled_covers_catalog() {
    let report = strings().check_catalog(&EntityCatalog::weatherlink());
    assert!(report.missing.is_empty(), "missing: {:?}", report.missing);
    assert!(report.orphaned.is_empty(), "orphaned: {:?}", report.orphaned);
}

#[test]
fn test_binary_sensor() {
    assert_eq!(
        strings().entity_name(Platform::BinarySensor, "trans_battery"),
        Some("Transmitter battery")
    );
}

#[test]
fn test_flattened_resources() {
    let flat = strings().flatten(DOMAIN, Some(Namespace::Entity));
    assert_eq!(
        flat["component.weatherlink.entity.sensor.wind_direction.state.n"],
        "N"
    );
    assert!(flat.keys().all(|k| k.starts_with("component.weatherlink.entity.")));

    let all = strings().flatten(DOMAIN, None);
    assert_eq!(all.len(), strings().leaf_count());
    assert_eq!(all["component.weatherlink.title"], "WeatherLink");
}

#[test]
fn test_concurrent_readers() {
    let shared = Arc::new(strings().clone());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let shared = Arc::clone(&shared);
            std::thread::spawn(move || {
                let token = COMPASS_TOKENS[i % COMPASS_TOKENS.len()];
                shared
                    .entity_state(Platform::Sensor, "wind_direction", token)
                    .map(String::from)
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let label = handle.join().unwrap();
        assert_eq!(
            label.as_deref(),
            Some(COMPASS_TOKENS[i % COMPASS_TOKENS.len()].to_uppercase().as_str())
        );
    }
}
