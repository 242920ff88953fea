//! Entity keys defined by the integration
//!
//! The integration's entity descriptions reference the table by key. Every
//! key they use must exist in the table, or the entity falls back to an
//! auto-generated label, and the table must not carry keys no entity uses.

use crate::node::KeyPath;
use crate::schema::{EntityDescriptor, Namespace, Platform};
use crate::table::Translations;

/// Compass points reported by the wind and gust direction sensors
pub const COMPASS_TOKENS: [&str; 16] = [
    "n", "nne", "ne", "ene", "e", "ese", "se", "sse", "s", "ssw", "sw", "wsw", "w", "wnw", "nw",
    "nnw",
];

/// Barometric trend categories
pub const BAR_TREND_TOKENS: [&str; 5] = [
    "rising_rapidly",
    "rising_slowly",
    "steady",
    "falling_slowly",
    "falling_rapidly",
];

/// Radio receiver states
pub const RX_STATE_TOKENS: [&str; 3] = ["tracking", "synched", "scanning"];

/// One entity key with the state tokens and attributes it can report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub platform: Platform,
    pub key: String,
    pub states: Vec<String>,
    pub attributes: Vec<String>,
}

impl CatalogEntry {
    pub fn new(platform: Platform, key: impl Into<String>) -> Self {
        Self {
            platform,
            key: key.into(),
            states: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn with_states(mut self, states: &[&str]) -> Self {
        self.states = states.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_attributes(mut self, attributes: &[&str]) -> Self {
        self.attributes = attributes.iter().map(|s| s.to_string()).collect();
        self
    }

    fn path(&self) -> KeyPath {
        KeyPath::new([
            Namespace::Entity.as_str(),
            self.platform.as_str(),
            self.key.as_str(),
        ])
    }
}

/// External definition of the integration's entities
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityCatalog {
    entries: Vec<CatalogEntry>,
}

impl EntityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: CatalogEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, platform: Platform, key: &str) -> Option<&CatalogEntry> {
        self.entries
            .iter()
            .find(|e| e.platform == platform && e.key == key)
    }

    /// Entity keys of the WeatherLink integration
    pub fn weatherlink() -> Self {
        let mut catalog = Self::new();
        let mut sensor = |key: &str| catalog.push(CatalogEntry::new(Platform::Sensor, key));

        for key in [
            "outside_temperature",
            "inside_temperature",
            "outside_humidity",
            "inside_humidity",
            "pressure",
        ] {
            sensor(key);
        }
        for key in ["wind_1_min", "wind_2_min", "wind_10_min", "wind_gust_2_min"] {
            sensor(key);
        }
        for key in [
            "wind_direction_2m",
            "wind_direction_10m",
            "wind_gust_direction_2m",
            "wind_direction_deg",
            "wind_gust_direction_deg",
            "rain_today_15_min",
            "rain_today_60_min",
            "rain_today_24_h",
            "rain_rate_hi",
            "rain_rate_hi_15_min",
            "rain_storm_last",
            "et_day",
            "et_month",
            "et_year",
            "rain_this_month",
            "rain_this_year",
            "dewpoint",
            "wind_chill",
            "heat_index",
            "wet_bulb",
            "thw_index",
            "thsw_index",
            "solar_irradiance",
            "uv_index",
            "trans_battery_volt",
            "solar_panel_volt",
            "supercap_volt",
        ] {
            sensor(key);
        }
        for (prefix, count) in [
            ("moist_soil", 4),
            ("wet_leaf", 4),
            ("temp", 4),
            ("temp_extra", 7),
            ("temp_soil", 4),
            ("temp_leaf", 4),
            ("hum_extra", 7),
        ] {
            for numb in 1..=count {
                sensor(format!("{}_{}", prefix, numb).as_str());
            }
        }
        for key in [
            "pm_2p5",
            "pm_2p5_1_hour",
            "pm_2p5_3_hour",
            "pm_2p5_24_hour",
            "pm_2p5_nowcast",
            "pm_10_1_hour",
            "pm_10_3_hour",
            "pm_10_24_hour",
            "pm_10_nowcast",
            "pm_pct_data",
            "pm_pct_data_1_hour",
            "pm_pct_data_3_hour",
            "pm_pct_data_24_hour",
            "aqi_nowcast_val",
            "solar_energy_day",
            "uv_dose_day",
            "wind_run_day",
            "heatdegree_day",
            "cooldegree_day",
            "heatdegreef_day",
            "cooldegreef_day",
            "rssi_last",
            "freq_error_current",
            "packets_missed_day",
            "packets_received_day",
            "reception_day",
            "resyncs_day",
            "crc_errors_day",
        ] {
            sensor(key);
        }

        // Enumerated states and extra attributes
        let with_detail = [
            CatalogEntry::new(Platform::Sensor, "bar_trend").with_states(&BAR_TREND_TOKENS),
            CatalogEntry::new(Platform::Sensor, "rx_state").with_states(&RX_STATE_TOKENS),
            CatalogEntry::new(Platform::Sensor, "wind").with_attributes(&[
                "wind_speed_avg_last_1_min",
                "wind_speed_avg_last_2_min",
                "wind_speed_avg_last_10_min",
            ]),
            CatalogEntry::new(Platform::Sensor, "wind_gust")
                .with_attributes(&["wind_speed_hi_last_2_min"]),
            CatalogEntry::new(Platform::Sensor, "wind_direction")
                .with_states(&COMPASS_TOKENS)
                .with_attributes(&[
                    "wind_dir",
                    "wind_dir_scalar_avg_last_1_min",
                    "wind_dir_scalar_avg_last_2_min",
                    "wind_dir_scalar_avg_last_10_min",
                ]),
            CatalogEntry::new(Platform::Sensor, "wind_gust_direction")
                .with_states(&COMPASS_TOKENS)
                .with_attributes(&[
                    "wind_dir_at_hi_speed_last_10_min",
                    "wind_dir_at_hi_speed_last_2_min",
                ]),
            CatalogEntry::new(Platform::Sensor, "rain_today").with_attributes(&[
                "rain_day_last_15_min",
                "rain_day_last_60_min",
                "rain_day_last_24_hr",
            ]),
            CatalogEntry::new(Platform::Sensor, "rain_rate")
                .with_attributes(&["rain_rate_hi", "rain_rate_hi_last_15_min"]),
            CatalogEntry::new(Platform::Sensor, "rain_storm").with_attributes(&[
                "rain_storm_start",
                "rain_storm_last",
                "rain_storm_last_start",
                "rain_storm_last_end",
            ]),
            CatalogEntry::new(Platform::Sensor, "pm_10").with_attributes(&[
                "pm_10_1_hour",
                "pm_10_3_hour",
                "pm_10_24_hour",
                "pm_10_nowcast",
            ]),
            CatalogEntry::new(Platform::BinarySensor, "trans_battery"),
        ];
        for entry in with_detail {
            catalog.push(entry);
        }

        catalog
    }
}

/// Result of comparing a table against an [`EntityCatalog`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageReport {
    /// Catalog paths without a string; these fall back to generated labels
    pub missing: Vec<KeyPath>,
    /// Table paths no catalog entry uses
    pub orphaned: Vec<KeyPath>,
}

impl CoverageReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.orphaned.is_empty()
    }
}

impl Translations {
    /// Compare the `entity` namespace against the integration's entity keys
    pub fn check_catalog(&self, catalog: &EntityCatalog) -> CoverageReport {
        let mut report = CoverageReport::default();

        for entry in catalog.entries() {
            let path = entry.path();
            let Some(descriptor) = self.entity(entry.platform, &entry.key) else {
                report.missing.push(path);
                continue;
            };

            if descriptor.name.is_none() {
                report.missing.push(path.child("name"));
            }
            for token in &entry.states {
                if !descriptor.state.contains_key(token) {
                    report.missing.push(path.child("state").child(token.as_str()));
                }
            }
            for attr in &entry.attributes {
                let has_name = descriptor
                    .state_attributes
                    .get(attr)
                    .is_some_and(|a| a.name.is_some());
                if !has_name {
                    report.missing.push(
                        path.child("state_attributes")
                            .child(attr.as_str())
                            .child("name"),
                    );
                }
            }
        }

        for (platform, entities) in &self.schema().entity {
            for (key, descriptor) in entities {
                let path = KeyPath::new([Namespace::Entity.as_str(), platform.as_str(), key.as_str()]);
                match catalog.get(*platform, key) {
                    Some(entry) => orphaned_details(descriptor, entry, &path, &mut report.orphaned),
                    None => report.orphaned.push(path),
                }
            }
        }

        report
    }
}

fn orphaned_details(
    descriptor: &EntityDescriptor,
    entry: &CatalogEntry,
    path: &KeyPath,
    orphaned: &mut Vec<KeyPath>,
) {
    for token in descriptor.state.keys() {
        if !entry.states.contains(token) {
            orphaned.push(path.child("state").child(token.as_str()));
        }
    }
    for attr in descriptor.state_attributes.keys() {
        if !entry.attributes.contains(attr) {
            orphaned.push(path.child("state_attributes").child(attr.as_str()));
        }
    }
}
