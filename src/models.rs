use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ProfileError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PeriodRegularity {
    Regular,
    Irregular,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlowLevel {
    Light,
    Medium,
    Heavy,
}

/// Per-user physiological profile supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CycleProfile {
    pub cycle_length: u32,
    pub luteal_length: u32,
    pub regularity: PeriodRegularity,
    /// Only consulted by the predictor when there is no period history.
    #[serde(default)]
    pub last_known_period_start: Option<NaiveDate>,
}

impl CycleProfile {
    pub fn regular(cycle_length: u32, luteal_length: u32) -> Self {
        Self {
            cycle_length,
            luteal_length,
            regularity: PeriodRegularity::Regular,
            last_known_period_start: None,
        }
    }

    pub fn irregular(cycle_length: u32, luteal_length: u32) -> Self {
        Self {
            regularity: PeriodRegularity::Irregular,
            ..Self::regular(cycle_length, luteal_length)
        }
    }

    pub fn with_last_known_period_start(mut self, date: NaiveDate) -> Self {
        self.last_known_period_start = Some(date);
        self
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.cycle_length == 0 {
            return Err(ProfileError::ZeroCycleLength);
        }
        if self.luteal_length >= self.cycle_length {
            return Err(ProfileError::LutealNotShorterThanCycle {
                luteal: self.luteal_length,
                cycle: self.cycle_length,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PeriodRecord {
    pub id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub flow_intensity: Option<FlowLevel>,
}

impl PeriodRecord {
    pub fn starting(start_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_date,
            end_date: None,
            flow_intensity: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CyclePhase {
    Menses,
    Follicular,
    Luteal,
    /// The cycle has run past its expected length; the period is overdue.
    #[serde(rename = "Next Cycle")]
    NextCycle,
}

impl std::fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Menses => write!(f, "Menses"),
            Self::Follicular => write!(f, "Follicular"),
            Self::Luteal => write!(f, "Luteal"),
            Self::NextCycle => write!(f, "Next Cycle"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionResult {
    pub day_of_cycle: i64,
    pub cycle_phase: CyclePhase,
    pub predicted_mood: Mood,
    pub days_until_next_period: Option<i64>,
    pub confidence: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CycleStats {
    pub total_periods: usize,
    pub avg_cycle_length: f64,
    pub current_cycle_length: Option<i64>,
    pub shortest_cycle: Option<i64>,
    pub longest_cycle: Option<i64>,
    pub last_period_start: Option<NaiveDate>,
}
