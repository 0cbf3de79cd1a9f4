//! Plot-ready descriptions of comparison charts.
//!
//! A [`Chart`] is what a plotting backend consumes: ordered `(label, value)`
//! stems, an optional reference line and display options. It serializes to
//! JSON for external tools and is drawn by the OpenCV renderer when the
//! `render` feature is enabled.

use crate::diff::DeltaSeries;
use crate::error::Result;
use crate::results::Dimension;
use serde::Serialize;
use std::fmt::{self, Display};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Legend entry of the stems.
    pub series_label: String,
    pub points: Vec<Point>,
    /// Mean of the points, drawn as a horizontal line.
    pub reference: Option<f64>,
    /// Rotation of the x tick labels in degrees.
    pub tick_rotation: f64,
    /// Fraction of the x range left empty on each side.
    pub x_margin: f64,
    /// Label every n-th x tick only; `None` labels all of them.
    pub x_tick_step: Option<usize>,
}

impl Chart {
    fn from_series<K: Display>(series: &DeltaSeries<K>) -> Result<Self> {
        Ok(Self {
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            series_label: series.label().to_string(),
            points: series
                .points()
                .iter()
                .map(|p| Point {
                    label: p.key.to_string(),
                    value: p.value,
                })
                .collect(),
            reference: Some(series.mean()?),
            tick_rotation: 0.0,
            x_margin: 0.01,
            x_tick_step: None,
        })
    }

    /// Stem chart of one box dimension per frame.
    pub fn frame_dimension(
        sequence: &str,
        dimension: Dimension,
        series: &DeltaSeries<usize>,
    ) -> Result<Self> {
        let mut chart = Self::from_series(series)?;
        chart.title = format!(
            "Δ Bounding Box {} per Frame - {} Sequence",
            dimension.name(),
            sequence
        );
        chart.x_label = "Frame".to_string();
        chart.y_label = format!("Δ Bounding Box {} (pixels)", dimension.name());
        chart.x_tick_step = Some(10);
        Ok(chart)
    }

    /// Stem chart of the overlap (IoU) delta per frame.
    pub fn frame_overlap(sequence: &str, series: &DeltaSeries<usize>) -> Result<Self> {
        let mut chart = Self::from_series(series)?;
        chart.title = format!("Δ Overlap per Frame - {} Sequence", sequence);
        chart.x_label = "Frame".to_string();
        chart.y_label = "Δ Overlap (IoU)".to_string();
        chart.x_tick_step = Some(10);
        Ok(chart)
    }

    /// Stem chart of the success score delta per sequence.
    pub fn sequence_scores(series: &DeltaSeries<String>) -> Result<Self> {
        let mut chart = Self::from_series(series)?;
        chart.title = "Δ Success Score per Sequence".to_string();
        chart.x_label = "Sequence".to_string();
        chart.y_label = "Δ Success Score".to_string();
        chart.tick_rotation = 90.0;
        Ok(chart)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Ordered `(label, value)` pairs.
    pub fn points(&self) -> impl Iterator<Item = (&str, f64)> {
        self.points.iter().map(|p| (p.label.as_str(), p.value))
    }

    /// Smallest and largest value including the reference line and zero.
    pub fn value_range(&self) -> (f64, f64) {
        self.points
            .iter()
            .map(|p| p.value)
            .chain(self.reference)
            .fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)))
    }
}

impl Display for Chart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        let width = self
            .points
            .iter()
            .map(|p| p.label.chars().count())
            .chain(std::iter::once(self.x_label.chars().count()))
            .max()
            .unwrap_or(0);
        writeln!(f, "{:<width$}  {}", self.x_label, self.y_label, width = width)?;
        for point in &self.points {
            writeln!(f, "{:<width$}  {:+.4}", point.label, point.value, width = width)?;
        }
        if let Some(reference) = self.reference {
            write!(f, "mean ({}): {:+.4}", self.series_label, reference)?;
        }
        Ok(())
    }
}

/// Write charts as pretty JSON.
pub fn to_json(charts: &[Chart]) -> Result<String> {
    Ok(serde_json::to_string_pretty(charts)?)
}
