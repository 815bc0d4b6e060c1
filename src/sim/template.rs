//! Section templates
//!
//! Read-only descriptions of what a section may contain. Templates are
//! validated when settings load so generation never meets a bad one.

use serde::{Deserialize, Serialize};

use super::formation::FormationSet;
use super::state::PowerUpKind;
use crate::error::TemplateError;

/// A power-up kind with its relative spawn weight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerUpWeight {
    pub kind: PowerUpKind,
    pub weight: f32,
}

/// Section generation template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionTemplate {
    /// Unique name, used by rebuild requests
    pub name: String,
    pub min_column_count: usize,
    pub max_column_count: usize,
    #[serde(default)]
    pub min_power_up_count: usize,
    pub max_power_up_count: usize,
    /// Score points per column upper bound
    pub max_score_point_frequency: f32,
    /// Full gap height between a column's walls
    pub min_gap_height: f32,
    pub max_gap_height: f32,
    /// Amplitude of shaped formations
    pub formation_scale: f32,
    pub formations: FormationSet,
    #[serde(default)]
    pub power_ups: Vec<PowerUpWeight>,
    /// Only spawned on explicit request (e.g. after hyperdrive)
    #[serde(default)]
    pub rebuild_only: bool,
}

impl SectionTemplate {
    /// Check every range and weight; called at load time
    pub fn validate(&self) -> Result<(), TemplateError> {
        let name = || self.name.clone();

        if self.formations.is_empty() {
            return Err(TemplateError::NoEligibleFormations(name()));
        }
        if self.min_column_count == 0 || self.min_column_count > self.max_column_count {
            return Err(TemplateError::InvalidColumnRange {
                name: name(),
                min: self.min_column_count,
                max: self.max_column_count,
            });
        }
        let gaps_finite = self.min_gap_height.is_finite() && self.max_gap_height.is_finite();
        if !gaps_finite || self.min_gap_height < 0.0 || self.min_gap_height > self.max_gap_height {
            return Err(TemplateError::InvalidGapRange {
                name: name(),
                min: self.min_gap_height,
                max: self.max_gap_height,
            });
        }
        if self.min_power_up_count > self.max_power_up_count {
            return Err(TemplateError::InvalidPowerUpRange {
                name: name(),
                min: self.min_power_up_count,
                max: self.max_power_up_count,
            });
        }
        if self.max_score_point_frequency.is_nan() || self.max_score_point_frequency < 0.0 {
            return Err(TemplateError::InvalidScorePointFrequency {
                name: name(),
                frequency: self.max_score_point_frequency,
            });
        }

        for (index, entry) in self.power_ups.iter().enumerate() {
            if !entry.weight.is_finite() || entry.weight < 0.0 {
                return Err(TemplateError::InvalidWeights {
                    name: name(),
                    source: crate::error::PoolError::InvalidWeight {
                        index,
                        weight: entry.weight,
                    },
                });
            }
        }
        let total: f32 = self.power_ups.iter().map(|p| p.weight).sum();
        if self.max_power_up_count > 0 && !self.power_ups.is_empty() && total <= 0.0 {
            return Err(TemplateError::ZeroWeightSum(name()));
        }

        Ok(())
    }

    /// `(kind, weight)` pairs for building the power-up selector
    pub fn power_up_weights(&self) -> Vec<(PowerUpKind, f32)> {
        self.power_ups.iter().map(|p| (p.kind, p.weight)).collect()
    }
}
