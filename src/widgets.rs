use serde::Serialize;

const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// One glyph per point, scaled between the series min and max.
pub fn sparkline(series: &[f64]) -> String {
    let finite: Vec<f64> = series.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return String::new();
    }
    let low = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let high = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = high - low;

    finite
        .iter()
        .map(|v| {
            if span == 0.0 {
                BLOCKS[3]
            } else {
                let level = ((v - low) / span * 7.0).round() as usize;
                BLOCKS[level.min(7)]
            }
        })
        .collect()
}

pub fn progress_bar(value: f64, max: f64, width: usize) -> String {
    let ratio = if max > 0.0 && value.is_finite() {
        (value / max).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (ratio * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Input shape for the external charting renderer.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub index_key: String,
    pub series: Vec<ChartSeries>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartSeries {
    pub id: String,
    pub points: Vec<f64>,
}

impl ChartData {
    pub fn new(index_key: impl Into<String>) -> Self {
        Self {
            index_key: index_key.into(),
            series: Vec::new(),
        }
    }

    pub fn push(&mut self, id: impl Into<String>, points: Vec<f64>) {
        self.series.push(ChartSeries {
            id: id.into(),
            points,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparkline_spans_min_to_max() {
        assert_eq!(sparkline(&[0.0, 50.0, 100.0]), "▁▅█");
        assert_eq!(sparkline(&[4.0, 4.0]), "▄▄");
        assert_eq!(sparkline(&[]), "");
        assert_eq!(sparkline(&[f64::NAN, 1.0, 2.0]).chars().count(), 2);
    }

    #[test]
    fn progress_bar_clamps() {
        assert_eq!(progress_bar(50.0, 100.0, 10), "[#####-----]");
        assert_eq!(progress_bar(150.0, 100.0, 4), "[####]");
        assert_eq!(progress_bar(-5.0, 100.0, 4), "[----]");
        assert_eq!(progress_bar(5.0, 0.0, 2), "[--]");
    }

    #[test]
    fn chart_data_uses_camel_case_keys() {
        let mut chart = ChartData::new("week");
        chart.push("load", vec![60.0, 72.0]);
        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["indexKey"], "week");
        assert_eq!(json["series"][0]["points"][1], 72.0);
    }
}
