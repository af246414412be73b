use crate::models::Mood;

/// Coarse mood estimate for a cycle day.
///
/// The bands are fixed at days 5/14/21 and ignore the profile's cycle and
/// luteal lengths, unlike [`crate::cycle::cycle_phase`]. Long or short cycles
/// will therefore disagree with the phase shown alongside the mood.
pub fn predict_mood(day_of_cycle: i64) -> Mood {
    match day_of_cycle {
        i64::MIN..=5 => Mood::Low,
        6..=14 => Mood::High,
        15..=21 => Mood::High,
        _ => Mood::Medium,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_edges() {
        assert_eq!(predict_mood(1), Mood::Low);
        assert_eq!(predict_mood(5), Mood::Low);
        assert_eq!(predict_mood(6), Mood::High);
        assert_eq!(predict_mood(14), Mood::High);
        assert_eq!(predict_mood(15), Mood::High);
        assert_eq!(predict_mood(21), Mood::High);
        assert_eq!(predict_mood(22), Mood::Medium);
    }

    #[test]
    fn total_over_wide_range() {
        for day in -10..=100 {
            let mood = predict_mood(day);
            assert!(matches!(mood, Mood::Low | Mood::Medium | Mood::High));
        }
        assert_eq!(predict_mood(-10), Mood::Low);
        assert_eq!(predict_mood(100), Mood::Medium);
    }

    #[test]
    fn ignores_cycle_length() {
        // A 40-day cycle is still "medium" from day 22 on.
        assert_eq!(predict_mood(30), Mood::Medium);
    }
}
