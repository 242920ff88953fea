//! Loading from disk, schema failures, round trips and translation sets

mod common;

use common::{fixture_path, load_fixture, parse, write_strings_dir};
use tempfile::TempDir;
use wl_translations::{
    ConfigError, KeyPath, LintWarning, LoaderConfig, Namespace, SchemaError, TranslationError,
    TranslationSet, Translations,
};

const GERMAN: &str = r#"{
  "title": "WeatherLink",
  "config": {
    "step": {"user": {"description": "API-Version auswählen", "data": {"api_version": "API-Version"}}},
    "error": {"cannot_connect": "Verbindung fehlgeschlagen"},
    "abort": {"already_configured": "Gerät ist bereits konfiguriert"}
  },
  "entity": {"sensor": {"bar_trend": {"name": "Drucktendenz", "state": {"rising_slowly": "Langsam steigend", "steady": "Gleichbleibend"}}}},
  "selector": {"set_api_ver": {"options": {"api_v1": "API V1", "api_v2": "API V2"}}}
}"#;

fn schema_error(result: Result<Translations, TranslationError>) -> SchemaError {
    match result {
        Err(TranslationError::Schema(e)) => e,
        Err(other) => panic!("expected schema error, got {}", other),
        Ok(_) => panic!("expected schema error, table loaded"),
    }
}

#[test]
fn test_load_fixture_file() {
    let t = Translations::load(fixture_path("minimal.json")).unwrap();
    assert_eq!(t.title(), Some("WeatherLink"));
    assert_eq!(
        t.lookup_key("entity.sensor.bar_trend.state.rising_slowly"),
        Some("Rising slowly")
    );
    assert!(t.lint().is_empty());
}

#[test]
fn test_missing_file() {
    let result = Translations::load(fixture_path("nope.json"));
    assert!(matches!(result, Err(TranslationError::ReadFile { .. })));
}

#[test]
fn test_name_must_be_string() {
    let err = schema_error(Translations::load(fixture_path("name_not_string.json")));
    assert_eq!(
        err,
        SchemaError::ExpectedText {
            path: KeyPath::from("entity.sensor.wind.name"),
            found: "mapping",
        }
    );
    assert_eq!(
        err.to_string(),
        "entity.sensor.wind.name: expected a string, found mapping"
    );
}

#[test]
fn test_leaf_must_not_be_mapping() {
    let err = schema_error(Translations::load(fixture_path("leaf_is_mapping.json")));
    assert_eq!(
        err,
        SchemaError::ExpectedText {
            path: KeyPath::from("config.abort.already_configured"),
            found: "mapping",
        }
    );
}

#[test]
fn test_duplicate_sibling_key() {
    let err = schema_error(Translations::load(fixture_path("duplicate_key.json")));
    assert_eq!(
        err,
        SchemaError::DuplicateKey {
            path: KeyPath::from("entity.sensor.wind_direction.state"),
            key: "n".to_string(),
        }
    );
}

#[test]
fn test_numeric_label() {
    let err = schema_error(Translations::load(fixture_path("numeric_label.json")));
    assert_eq!(
        err,
        SchemaError::UnexpectedValue {
            path: KeyPath::from("selector.set_api_ver.options.api_v1"),
            found: "number",
        }
    );
}

#[test]
fn test_copy_paste_label_loads_with_warning() {
    let t = parse(&load_fixture("copy_paste_label.json"));
    let warnings = t.lint();
    assert_eq!(warnings.len(), 1);
    match &warnings[0] {
        LintWarning::DuplicateLabel { path, keys, label } => {
            assert_eq!(path.to_string(), "entity.sensor.wind_direction.state_attributes");
            assert_eq!(
                keys,
                &["wind_dir_scalar_avg_last_1_min", "wind_dir_scalar_avg_last_2_min"]
            );
            assert_eq!(label, "Wind dir last 1min");
        }
        other => panic!("unexpected warning {}", other),
    }
}

#[test]
fn test_round_trip_on_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("strings.json");

    let original = Translations::bundled();
    original.save(&path).unwrap();
    let reloaded = Translations::load(&path).unwrap();
    assert_eq!(&reloaded, original);

    // Saving again produces the same bytes
    let first = std::fs::read_to_string(&path).unwrap();
    reloaded.save(&path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
}

#[test]
fn test_round_trip_preserves_source_text() {
    let source = load_fixture("minimal.json");
    let t = parse(&source);
    assert_eq!(format!("{}\n", t.to_json_pretty().unwrap()), source);
}

#[tokio::test]
async fn test_load_async() {
    let t = Translations::load_async(fixture_path("minimal.json")).await.unwrap();
    assert_eq!(t, Translations::load(fixture_path("minimal.json")).unwrap());

    let result = Translations::load_async(fixture_path("name_not_string.json")).await;
    assert!(matches!(result, Err(TranslationError::Schema(_))));
}

#[test]
fn test_load_dir() {
    let dir = TempDir::new().unwrap();
    let source = load_fixture("minimal.json");
    write_strings_dir(dir.path(), &source, &[("de", GERMAN), ("en", source.as_str())]);

    let set = TranslationSet::load_dir(dir.path()).unwrap();
    assert_eq!(set.languages(), ["en", "de"]);
    assert!(set.check_parity().is_empty());
    assert_eq!(
        set.lookup("de", Namespace::Entity, &["sensor", "bar_trend", "state", "steady"]),
        Some("Gleichbleibend")
    );
    assert_eq!(
        set.lookup("nl", Namespace::Entity, &["sensor", "bar_trend", "state", "steady"]),
        Some("Steady")
    );
}

#[test]
fn test_load_dir_without_translations() {
    let dir = TempDir::new().unwrap();
    write_strings_dir(dir.path(), &load_fixture("minimal.json"), &[]);

    let set = TranslationSet::load_dir(dir.path()).unwrap();
    assert_eq!(set.languages(), ["en"]);
}

#[test]
fn test_load_dir_rejects_bad_translation() {
    let dir = TempDir::new().unwrap();
    let broken = load_fixture("leaf_is_mapping.json");
    write_strings_dir(
        dir.path(),
        &load_fixture("minimal.json"),
        &[("de", broken.as_str())],
    );

    let result = TranslationSet::load_dir(dir.path());
    assert!(matches!(result, Err(TranslationError::Schema(_))));
}

#[tokio::test]
async fn test_load_dir_async() {
    let dir = TempDir::new().unwrap();
    write_strings_dir(dir.path(), &load_fixture("minimal.json"), &[("de", GERMAN)]);

    let set = TranslationSet::load_dir_async(dir.path()).await.unwrap();
    assert_eq!(set.languages(), ["en", "de"]);
    assert_eq!(
        set.lookup("de", Namespace::Config, &["abort", "already_configured"]),
        Some("Gerät ist bereits konfiguriert")
    );

    let missing = TranslationSet::load_dir_async(dir.path().join("absent")).await;
    assert!(matches!(missing, Err(TranslationError::DirectoryNotFound { .. })));
}

#[test]
fn test_host_reserved_namespace_loads() {
    let t = parse(
        r#"{"title": "WeatherLink", "device_automation": {"trigger_type": {"x": "X"}}}"#,
    );
    assert_eq!(
        t.lookup(Namespace::DeviceAutomation, &["trigger_type", "x"]),
        Some("X")
    );
    assert_eq!(t.lookup_key("device_automation.trigger_type.x"), Some("X"));
    assert_eq!(t.title(), Some("WeatherLink"));
}

#[tokio::test]
async fn test_sync_and_async_load_dir_skip_the_same_entries() {
    let dir = TempDir::new().unwrap();
    write_strings_dir(dir.path(), &load_fixture("minimal.json"), &[("de", GERMAN)]);
    let translations = dir.path().join("translations");
    std::fs::create_dir(translations.join("nl.json")).unwrap();
    std::fs::write(translations.join("README.txt"), "not a translation").unwrap();

    let sync = TranslationSet::load_dir(dir.path()).unwrap();
    let async_set = TranslationSet::load_dir_async(dir.path()).await.unwrap();
    assert_eq!(sync.languages(), ["en", "de"]);
    assert_eq!(async_set.languages(), sync.languages());
}

#[tokio::test]
async fn test_unreadable_translations_dir_is_an_error() {
    let dir = TempDir::new().unwrap();
    write_strings_dir(dir.path(), &load_fixture("minimal.json"), &[]);
    // A file where the translations directory should be cannot be listed
    std::fs::write(dir.path().join("translations"), "").unwrap();

    let sync = TranslationSet::load_dir(dir.path());
    assert!(matches!(sync, Err(TranslationError::ReadFile { .. })));
    let async_set = TranslationSet::load_dir_async(dir.path()).await;
    assert!(matches!(async_set, Err(TranslationError::ReadFile { .. })));

    let config = LoaderConfig {
        strings_dir: Some(dir.path().to_path_buf()),
        require_parity: true,
        ..Default::default()
    };
    assert!(matches!(
        config.open(),
        Err(ConfigError::Translations(TranslationError::ReadFile { .. }))
    ));
}

#[test]
fn test_config_file_opens_directory() {
    let dir = TempDir::new().unwrap();
    write_strings_dir(dir.path(), &load_fixture("minimal.json"), &[("de", GERMAN)]);

    let config_path = dir.path().join("translations.yaml");
    std::fs::write(
        &config_path,
        format!(
            "strings_dir: {}\nlanguage: de\nrequire_parity: true\n",
            dir.path().display()
        ),
    )
    .unwrap();

    let config = LoaderConfig::load(&config_path).unwrap();
    assert_eq!(config.language, "de");

    let set = config.open().unwrap();
    assert_eq!(
        set.lookup(&config.language, Namespace::Title, &[] as &[&str]),
        Some("WeatherLink")
    );
}

#[test]
fn test_config_requires_parity() {
    let dir = TempDir::new().unwrap();
    write_strings_dir(
        dir.path(),
        &load_fixture("minimal.json"),
        &[("de", r#"{"title": "WeatherLink"}"#)],
    );

    let config = LoaderConfig {
        strings_dir: Some(dir.path().to_path_buf()),
        require_parity: true,
        ..Default::default()
    };

    match config.open() {
        Err(ConfigError::ParityMismatch { languages, gaps }) => {
            assert_eq!(languages, ["de"]);
            assert!(gaps["de"].extra.is_empty());
            assert!(gaps["de"]
                .missing
                .contains(&KeyPath::from("config.abort.already_configured")));
        }
        other => panic!("expected parity mismatch, got {:?}", other.map(|_| ())),
    }

    // Without the requirement the gaps are tolerated
    let lenient = LoaderConfig {
        require_parity: false,
        ..config
    };
    assert!(lenient.open().is_ok());
}
