//! Game configuration
//!
//! Hyperdrive tuning, stream sizing and the section templates. Loaded from
//! JSON and validated up front so bad data fails at load time, not mid-run.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SettingsError, TemplateError};
use crate::sim::formation::FormationSet;
use crate::sim::hyperdrive::HyperdriveSettings;
use crate::sim::map::StreamSettings;
use crate::sim::state::PowerUpKind;
use crate::sim::template::{PowerUpWeight, SectionTemplate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub hyperdrive: HyperdriveSettings,
    #[serde(default)]
    pub stream: StreamSettings,
    pub templates: Vec<SectionTemplate>,
}

impl Default for Settings {
    fn default() -> Self {
        let power_ups = vec![
            PowerUpWeight {
                kind: PowerUpKind::Invert,
                weight: 0.6,
            },
            PowerUpWeight {
                kind: PowerUpKind::Hyperdrive,
                weight: 0.4,
            },
        ];

        let templates = vec![
            SectionTemplate {
                name: "straights".to_string(),
                min_column_count: 4,
                max_column_count: 10,
                min_power_up_count: 0,
                max_power_up_count: 1,
                max_score_point_frequency: 0.3,
                min_gap_height: 5.0,
                max_gap_height: 8.0,
                formation_scale: 1.5,
                formations: FormationSet::LINE | FormationSet::BOX,
                power_ups: power_ups.clone(),
                rebuild_only: false,
            },
            SectionTemplate {
                name: "waves".to_string(),
                min_column_count: 8,
                max_column_count: 16,
                min_power_up_count: 0,
                max_power_up_count: 1,
                max_score_point_frequency: 0.25,
                min_gap_height: 5.0,
                max_gap_height: 7.0,
                formation_scale: 3.0,
                formations: FormationSet::WAVE | FormationSet::CIRCLE | FormationSet::CONE,
                power_ups: power_ups.clone(),
                rebuild_only: false,
            },
            SectionTemplate {
                name: "slopes".to_string(),
                min_column_count: 6,
                max_column_count: 12,
                min_power_up_count: 0,
                max_power_up_count: 2,
                max_score_point_frequency: 0.25,
                min_gap_height: 5.0,
                max_gap_height: 7.0,
                formation_scale: 0.5,
                formations: FormationSet::CLIMB | FormationSet::DROP | FormationSet::CURVE,
                power_ups,
                rebuild_only: false,
            },
            SectionTemplate {
                name: "hyperdrive_entry".to_string(),
                min_column_count: 8,
                max_column_count: 8,
                min_power_up_count: 0,
                max_power_up_count: 0,
                max_score_point_frequency: 0.0,
                min_gap_height: 8.0,
                max_gap_height: 8.0,
                formation_scale: 1.0,
                formations: FormationSet::LINE,
                power_ups: Vec::new(),
                rebuild_only: true,
            },
        ];

        Self {
            hyperdrive: HyperdriveSettings::default(),
            stream: StreamSettings::default(),
            templates,
        }
    }
}

fn non_negative(name: &str, value: f32) -> Result<(), SettingsError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SettingsError::Value(format!("{name} must be >= 0, got {value}")))
    }
}

fn positive(name: &str, value: f32) -> Result<(), SettingsError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SettingsError::Value(format!("{name} must be > 0, got {value}")))
    }
}

impl Settings {
    /// Parse and validate settings JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!(
            "Loaded settings from {} ({} templates)",
            path.display(),
            settings.templates.len()
        );
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn template(&self, name: &str) -> Option<&SectionTemplate> {
        self.templates.iter().find(|t| t.name == name)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let mut names = HashSet::new();
        for template in &self.templates {
            template.validate()?;
            if !names.insert(template.name.as_str()) {
                return Err(TemplateError::DuplicateTemplate(template.name.clone()).into());
            }
        }
        if !self.templates.iter().any(|t| !t.rebuild_only) {
            return Err(SettingsError::Value(
                "at least one template must be usable for regular spawning".to_string(),
            ));
        }

        let hyperdrive = &self.hyperdrive;
        if self.template(&hyperdrive.entry_template).is_none() {
            return Err(TemplateError::UnknownTemplate(hyperdrive.entry_template.clone()).into());
        }
        non_negative("hyperdrive.animation_time", hyperdrive.animation_time)?;
        non_negative("hyperdrive.travel_time", hyperdrive.travel_time)?;
        non_negative("hyperdrive.wait_time", hyperdrive.wait_time)?;
        non_negative("hyperdrive.begin_pause", hyperdrive.begin_pause)?;
        non_negative("hyperdrive.min_distance", hyperdrive.min_distance)?;
        if hyperdrive.max_distance.is_nan() || hyperdrive.max_distance < hyperdrive.min_distance {
            return Err(SettingsError::Value(format!(
                "hyperdrive distance range {}..{} is empty",
                hyperdrive.min_distance, hyperdrive.max_distance
            )));
        }
        positive("hyperdrive.walls.spacing", hyperdrive.walls.spacing)?;

        positive("stream.column_width", self.stream.column_width)?;
        positive("stream.player_see_radius", self.stream.player_see_radius)?;
        if self.stream.slots_per_template == 0 {
            return Err(SettingsError::Value(
                "stream.slots_per_template must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}
