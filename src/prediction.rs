use chrono::NaiveDate;

use crate::cycle;
use crate::error::PredictionError;
use crate::models::{CycleProfile, PeriodRecord, PredictionResult};
use crate::mood;
use crate::predictor::{self, JitterSource};
use crate::settings::{EngineSettings, SettingsError};

/// Composes cycle arithmetic, the period predictor and the mood heuristic.
#[derive(Debug, Clone, Default)]
pub struct PredictionEngine {
    settings: EngineSettings,
}

impl PredictionEngine {
    pub fn new(settings: EngineSettings) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Full prediction for `target`.
    ///
    /// A missing anchor surfaces as [`PredictionError::NoPeriodData`] so the
    /// caller can degrade. Any other failure is reported as
    /// [`PredictionError::PredictionFailed`], including a next-period date
    /// outside the calendar. A missing next-period anchor is not a failure
    /// and leaves `days_until_next_period` empty.
    pub fn predict(
        &self,
        profile: &CycleProfile,
        periods: &[PeriodRecord],
        target: NaiveDate,
        today: NaiveDate,
        jitter: &mut dyn JitterSource,
    ) -> Result<PredictionResult, PredictionError> {
        let day_of_cycle = cycle::day_of_cycle(periods, target)?;

        profile
            .validate()
            .map_err(|e| PredictionError::PredictionFailed(e.to_string()))?;

        let cycle_phase =
            cycle::cycle_phase(day_of_cycle, profile.cycle_length, profile.luteal_length);
        let predicted_mood = mood::predict_mood(day_of_cycle);
        let days_until_next_period =
            predictor::try_days_until_next_period(profile, periods, today, jitter)?;

        tracing::debug!(
            %target,
            day_of_cycle,
            phase = %cycle_phase,
            mood = %predicted_mood,
            ?days_until_next_period,
            "prediction computed"
        );

        Ok(PredictionResult {
            day_of_cycle,
            cycle_phase,
            predicted_mood,
            days_until_next_period,
            confidence: Some(self.settings.default_confidence),
        })
    }
}

/// [`PredictionEngine::predict`] with default settings.
pub fn get_prediction(
    profile: &CycleProfile,
    periods: &[PeriodRecord],
    target: NaiveDate,
    today: NaiveDate,
    jitter: &mut dyn JitterSource,
) -> Result<PredictionResult, PredictionError> {
    PredictionEngine::default().predict(profile, periods, target, today, jitter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CyclePhase, Mood};
    use crate::predictor::{FixedJitter, NoJitter};
    use proptest::prelude::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn history(starts: &[&str]) -> Vec<PeriodRecord> {
        starts.iter().map(|s| PeriodRecord::starting(date(s))).collect()
    }

    #[test]
    fn composes_full_result() {
        let profile = CycleProfile::regular(28, 14);
        let periods = history(&["2024-01-01", "2024-01-29"]);
        let result = get_prediction(
            &profile,
            &periods,
            date("2024-02-05"),
            date("2024-02-05"),
            &mut NoJitter,
        )
        .unwrap();

        assert_eq!(result.day_of_cycle, 8);
        assert_eq!(result.cycle_phase, CyclePhase::Follicular);
        assert_eq!(result.predicted_mood, Mood::High);
        // next = 2024-02-26
        assert_eq!(result.days_until_next_period, Some(21));
        assert_eq!(result.confidence, Some(0.85));
    }

    #[test]
    fn overdue_cycle_reports_next_cycle_and_zero_days() {
        let profile = CycleProfile::regular(28, 14);
        let periods = history(&["2024-01-01"]);
        let result = get_prediction(
            &profile,
            &periods,
            date("2024-02-10"),
            date("2024-02-10"),
            &mut NoJitter,
        )
        .unwrap();

        assert_eq!(result.day_of_cycle, 41);
        assert_eq!(result.cycle_phase, CyclePhase::NextCycle);
        assert_eq!(result.predicted_mood, Mood::Medium);
        assert_eq!(result.days_until_next_period, Some(0));
    }

    #[test]
    fn missing_anchor_is_not_wrapped() {
        let profile = CycleProfile::regular(28, 14);
        let err = get_prediction(
            &profile,
            &[],
            date("2024-02-10"),
            date("2024-02-10"),
            &mut NoJitter,
        )
        .unwrap_err();
        assert!(err.is_no_period_data());
    }

    #[test]
    fn malformed_profile_is_wrapped() {
        let profile = CycleProfile::regular(12, 14);
        let err = get_prediction(
            &profile,
            &history(&["2024-01-01"]),
            date("2024-01-03"),
            date("2024-01-03"),
            &mut NoJitter,
        )
        .unwrap_err();
        match err {
            PredictionError::PredictionFailed(msg) => assert!(msg.contains("luteal length 14")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn irregular_prediction_uses_injected_jitter() {
        let profile = CycleProfile::irregular(28, 14);
        let periods = history(&["2024-01-01"]);
        let result = get_prediction(
            &profile,
            &periods,
            date("2024-01-10"),
            date("2024-01-10"),
            &mut FixedJitter(3),
        )
        .unwrap();
        // next = 2024-01-29 + 3 days = 2024-02-01
        assert_eq!(result.days_until_next_period, Some(22));
    }

    #[test]
    fn confidence_comes_from_settings() {
        let engine = PredictionEngine::new(EngineSettings {
            default_confidence: 0.5,
            ..EngineSettings::default()
        })
        .unwrap();
        let result = engine
            .predict(
                &CycleProfile::regular(28, 14),
                &history(&["2024-01-01"]),
                date("2024-01-02"),
                date("2024-01-02"),
                &mut NoJitter,
            )
            .unwrap();
        assert_eq!(result.confidence, Some(0.5));
    }

    #[test]
    fn rejects_out_of_range_settings() {
        let err = PredictionEngine::new(EngineSettings {
            default_confidence: 5.0,
            ..EngineSettings::default()
        })
        .unwrap_err();
        assert!(matches!(err, SettingsError::ConfidenceOutOfRange(_)));
        assert!(matches!(
            PredictionEngine::new(EngineSettings {
                retrain_threshold: 0,
                ..EngineSettings::default()
            }),
            Err(SettingsError::ZeroRetrainThreshold)
        ));
    }

    #[test]
    fn huge_cycle_length_fails_instead_of_panicking() {
        let profile = CycleProfile::regular(200_000_000, 14);
        assert!(profile.validate().is_ok());
        let err = get_prediction(
            &profile,
            &history(&["2024-01-01"]),
            date("2024-01-02"),
            date("2024-01-02"),
            &mut NoJitter,
        )
        .unwrap_err();
        match err {
            PredictionError::PredictionFailed(msg) => assert!(msg.contains("out of range")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    proptest! {
        #[test]
        fn valid_profiles_never_panic(
            cycle in 1u32..u32::MAX,
            luteal_seed in any::<u32>(),
            irregular in any::<bool>(),
            jitter in -10i64..=10,
            offset in 0i64..400,
        ) {
            let luteal = luteal_seed % cycle;
            let profile = if irregular {
                CycleProfile::irregular(cycle, luteal)
            } else {
                CycleProfile::regular(cycle, luteal)
            };
            prop_assert!(profile.validate().is_ok());

            let periods = history(&["2024-01-01"]);
            let target = date("2024-01-01") + chrono::Duration::days(offset);
            match get_prediction(&profile, &periods, target, target, &mut FixedJitter(jitter)) {
                Ok(result) => {
                    prop_assert!(result.day_of_cycle >= 1);
                    prop_assert!(result.days_until_next_period.map_or(true, |d| d >= 0));
                }
                Err(err) => prop_assert!(matches!(err, PredictionError::PredictionFailed(_))),
            }
        }
    }
}
