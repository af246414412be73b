use chrono::NaiveDate;

use crate::error::PredictionError;
use crate::models::{CyclePhase, CycleStats, PeriodRecord};

/// Menstruation is assumed to last this many days regardless of cycle length.
pub const MENSES_DAYS: i64 = 5;

/// 1-indexed day of cycle on `target`, anchored to the latest period start on
/// or before it. The start date itself is day 1.
pub fn day_of_cycle(periods: &[PeriodRecord], target: NaiveDate) -> Result<i64, PredictionError> {
    let anchor = periods
        .iter()
        .map(|p| p.start_date)
        .filter(|start| *start <= target)
        .max()
        .ok_or_else(|| {
            PredictionError::no_period_data(format!("no period start on or before {target}"))
        })?;

    Ok((target - anchor).num_days() + 1)
}

/// Last day of the follicular phase. Can be 5 or less for short cycles, in
/// which case the follicular band is empty.
pub fn ovulation_day(cycle_length: u32, luteal_length: u32) -> i64 {
    i64::from(cycle_length) - i64::from(luteal_length) - 1
}

pub fn cycle_phase(day_of_cycle: i64, cycle_length: u32, luteal_length: u32) -> CyclePhase {
    if day_of_cycle <= MENSES_DAYS {
        CyclePhase::Menses
    } else if day_of_cycle <= ovulation_day(cycle_length, luteal_length) {
        CyclePhase::Follicular
    } else if day_of_cycle <= i64::from(cycle_length) {
        CyclePhase::Luteal
    } else {
        CyclePhase::NextCycle
    }
}

/// Compute retrospective statistics over the recorded period starts.
/// With fewer than two starts no gap exists, so the configured length is echoed.
pub fn cycle_stats(
    periods: &[PeriodRecord],
    fallback_cycle_length: u32,
    today: NaiveDate,
) -> CycleStats {
    let mut starts: Vec<NaiveDate> = periods.iter().map(|p| p.start_date).collect();
    starts.sort();

    let last_period_start = starts.last().copied();

    if starts.len() < 2 {
        return CycleStats {
            total_periods: starts.len(),
            avg_cycle_length: f64::from(fallback_cycle_length),
            current_cycle_length: None,
            shortest_cycle: None,
            longest_cycle: None,
            last_period_start,
        };
    }

    let cycle_lengths: Vec<i64> = starts
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days())
        .collect();

    CycleStats {
        total_periods: starts.len(),
        avg_cycle_length: round_one_decimal(mean(&cycle_lengths)),
        current_cycle_length: last_period_start.map(|last| (today - last).num_days()),
        shortest_cycle: cycle_lengths.iter().copied().min(),
        longest_cycle: cycle_lengths.iter().copied().max(),
        last_period_start,
    }
}

fn mean(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<i64>() as f64 / values.len() as f64
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
