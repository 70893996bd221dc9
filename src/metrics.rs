use serde::Serialize;

/// Score-to-value table: the first threshold the score meets wins.
#[derive(Debug, Clone)]
pub struct ThresholdBands<V> {
    bands: Vec<(f64, V)>,
    fallback: V,
}

impl<V> ThresholdBands<V> {
    pub fn new(mut bands: Vec<(f64, V)>, fallback: V) -> Self {
        bands.retain(|(threshold, _)| !threshold.is_nan());
        bands.sort_by(|a, b| b.0.total_cmp(&a.0));
        Self { bands, fallback }
    }

    pub fn band(&self, score: f64) -> &V {
        match self.index(score) {
            Some(i) => &self.bands[i].1,
            None => &self.fallback,
        }
    }

    /// Higher scores never get a lower rank. The fallback ranks 0.
    pub fn rank(&self, score: f64) -> usize {
        match self.index(score) {
            Some(i) => self.bands.len() - i,
            None => 0,
        }
    }

    fn index(&self, score: f64) -> Option<usize> {
        if score.is_nan() {
            return None;
        }
        self.bands.iter().position(|(threshold, _)| score >= *threshold)
    }
}

/// Traffic-light palette shared by the percent-style scores.
pub fn score_color(score: f64) -> &'static str {
    let bands = ThresholdBands::new(
        vec![(85.0, "#1f9d55"), (70.0, "#2f80ed"), (55.0, "#f2c94c")],
        "#eb5757",
    );
    *bands.band(score)
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Mean of a numeric field; 0.0 for an empty list.
pub fn average<T>(items: &[T], field: impl Fn(&T) -> f64) -> f64 {
    let values: Vec<f64> = items.iter().map(field).collect();
    mean(&values)
}

/// Gini coefficient over all ordered pairs. Flat or empty input gives 0.0.
pub fn gini_index(values: &[f64]) -> f64 {
    let avg = mean(values);
    if values.is_empty() || avg == 0.0 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mut total = 0.0;
    for a in values {
        for b in values {
            total += (a - b).abs();
        }
    }
    total / (n * n) / (2.0 * avg)
}

/// Share of the total held by the largest value.
pub fn dominance_index(values: &[f64]) -> f64 {
    let total: f64 = values.iter().sum();
    if total == 0.0 {
        return 0.0;
    }
    let top = values.iter().copied().fold(f64::MIN, f64::max);
    top / total
}

/// Percentage (0-100) of filled fields.
pub fn completeness_score(filled: &[bool]) -> f64 {
    if filled.is_empty() {
        return 0.0;
    }
    let count = filled.iter().filter(|f| **f).count();
    count as f64 * 100.0 / filled.len() as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Rising,
    Falling,
    Flat,
}

impl Trend {
    pub fn arrow(self) -> &'static str {
        match self {
            Trend::Rising => "↑",
            Trend::Falling => "↓",
            Trend::Flat => "→",
        }
    }
}

const TREND_TOLERANCE: f64 = 1.0;

pub fn trend_direction(series: &[f64]) -> Trend {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return Trend::Flat;
    };
    let delta = last - first;
    if delta > TREND_TOLERANCE {
        Trend::Rising
    } else if delta < -TREND_TOLERANCE {
        Trend::Falling
    } else {
        Trend::Flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette() -> ThresholdBands<&'static str> {
        ThresholdBands::new(
            vec![(55.0, "yellow"), (85.0, "green"), (70.0, "blue")],
            "red",
        )
    }

    #[test]
    fn bands_follow_expected_tiers() {
        let bands = palette();
        assert_eq!(*bands.band(92.0), "green");
        assert_eq!(*bands.band(85.0), "green");
        assert_eq!(*bands.band(71.0), "blue");
        assert_eq!(*bands.band(55.0), "yellow");
        assert_eq!(*bands.band(12.0), "red");
        assert_eq!(*bands.band(f64::NAN), "red");
    }

    #[test]
    fn band_rank_is_monotonic() {
        let bands = palette();
        let scores: Vec<f64> = (-10..=110).map(|s| s as f64 * 0.5 + 20.0).collect();
        for a in &scores {
            for b in &scores {
                if a >= b {
                    assert!(bands.rank(*a) >= bands.rank(*b), "{a} vs {b}");
                }
            }
        }
    }

    #[test]
    fn average_of_empty_is_zero() {
        let empty: Vec<f64> = Vec::new();
        assert_eq!(average(&empty, |v| *v), 0.0);
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(average(&[2.0, 4.0, 9.0], |v| *v), 5.0);
    }

    #[test]
    fn gini_bounds() {
        assert_eq!(gini_index(&[]), 0.0);
        assert_eq!(gini_index(&[0.0, 0.0, 0.0]), 0.0);
        assert_eq!(gini_index(&[7.0, 7.0, 7.0]), 0.0);

        let samples: [&[f64]; 4] = [
            &[1.0, 2.0, 3.0, 4.0],
            &[0.0, 0.0, 0.0, 100.0],
            &[12.0, 90.0, 45.0],
            &[0.5],
        ];
        for values in samples {
            let g = gini_index(values);
            assert!((0.0..=1.0).contains(&g), "{values:?} -> {g}");
        }
    }

    #[test]
    fn gini_of_single_holder() {
        let g = gini_index(&[0.0, 0.0, 0.0, 100.0]);
        assert!((g - 0.75).abs() < 1e-9);
    }

    #[test]
    fn dominance_takes_largest_share() {
        assert_eq!(dominance_index(&[]), 0.0);
        assert_eq!(dominance_index(&[0.0, 0.0]), 0.0);
        assert!((dominance_index(&[10.0, 30.0, 60.0]) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn completeness_counts_filled_fields() {
        assert_eq!(completeness_score(&[]), 0.0);
        assert_eq!(completeness_score(&[true, false, true, true]), 75.0);
    }

    #[test]
    fn trend_uses_first_and_last_points() {
        assert_eq!(trend_direction(&[60.0, 58.0, 71.0]), Trend::Rising);
        assert_eq!(trend_direction(&[80.0, 79.5]), Trend::Flat);
        assert_eq!(trend_direction(&[80.0, 60.0]), Trend::Falling);
        assert_eq!(trend_direction(&[]), Trend::Flat);
    }
}
