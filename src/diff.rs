use crate::error::{Error, Result};
use crate::results::{BoxSeries, Dimension, SequenceScores};
use crate::utils::{self, compute_iou};
use log::debug;
use serde::Serialize;

/// Legend label of a comparison, `"<experimental> - <baseline>"`.
pub fn series_label(baseline: &str, experimental: &str) -> String {
    format!("{} - {}", experimental, baseline)
}

/// Element-wise `experimental[i] - baseline[i]`.
pub fn diff_values(baseline: &[f64], experimental: &[f64]) -> Result<Vec<f64>> {
    if baseline.len() != experimental.len() {
        return Err(Error::LengthMismatch {
            baseline: baseline.len(),
            experimental: experimental.len(),
        });
    }
    Ok(baseline
        .iter()
        .zip(experimental)
        .map(|(b, e)| e - b)
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeltaPoint<K> {
    pub key: K,
    pub value: f64,
}

/// Ordered differences between an experimental and a baseline tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaSeries<K> {
    label: String,
    points: Vec<DeltaPoint<K>>,
}

impl<K> DeltaSeries<K> {
    pub fn new(label: impl Into<String>, points: Vec<DeltaPoint<K>>) -> Self {
        Self {
            label: label.into(),
            points,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn points(&self) -> &[DeltaPoint<K>] {
        &self.points
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.points.iter().map(|p| &p.key)
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Mean delta, drawn as the reference line of a chart.
    pub fn mean(&self) -> Result<f64> {
        utils::mean(&self.values())
    }

    pub fn summary(&self) -> Result<Summary> {
        let values = self.values();
        let mean = utils::mean(&values)?;
        Ok(Summary {
            count: values.len(),
            mean,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            positive: values.iter().filter(|v| **v > 0.0).count(),
            negative: values.iter().filter(|v| **v < 0.0).count(),
        })
    }
}

/// Aggregate view of a delta series for console reports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub positive: usize,
    pub negative: usize,
}

/// Per-frame deltas keyed by 1-based frame number.
fn frame_series(label: &str, values: Vec<f64>) -> DeltaSeries<usize> {
    let points = values
        .into_iter()
        .enumerate()
        .map(|(i, value)| DeltaPoint { key: i + 1, value })
        .collect();
    DeltaSeries::new(label, points)
}

/// Frame-by-frame differences of two trackers on one sequence.
#[derive(Debug, Clone)]
pub struct FrameDeltas {
    dimensions: Vec<DeltaSeries<usize>>,
    overlap: Option<DeltaSeries<usize>>,
}

/// Compare two trackers' boxes on the same sequence.
pub fn frame_deltas(baseline: &BoxSeries, experimental: &BoxSeries) -> Result<FrameDeltas> {
    if baseline.len() != experimental.len() {
        return Err(Error::LengthMismatch {
            baseline: baseline.len(),
            experimental: experimental.len(),
        });
    }

    let label = series_label("baseline", "experimental");
    let dimensions = Dimension::ALL
        .iter()
        .map(|&dimension| {
            let values = diff_values(
                &baseline.column(dimension),
                &experimental.column(dimension),
            )?;
            Ok(frame_series(&label, values))
        })
        .collect::<Result<Vec<_>>>()?;

    debug!("Computed frame deltas over {} frames", baseline.len());
    Ok(FrameDeltas {
        dimensions,
        overlap: None,
    })
}

impl FrameDeltas {
    /// Add the per-frame overlap delta against ground truth annotations.
    pub fn with_overlap(
        mut self,
        ground_truth: &BoxSeries,
        baseline: &BoxSeries,
        experimental: &BoxSeries,
    ) -> Result<Self> {
        let baseline_overlap = overlaps(ground_truth, baseline)?;
        let experimental_overlap = overlaps(ground_truth, experimental)?;
        let values = diff_values(&baseline_overlap, &experimental_overlap)?;
        let label = self.label().to_string();
        self.overlap = Some(frame_series(&label, values));
        Ok(self)
    }

    pub fn with_label(self, label: &str) -> Self {
        Self {
            dimensions: self
                .dimensions
                .into_iter()
                .map(|series| series.with_label(label))
                .collect(),
            overlap: self.overlap.map(|series| series.with_label(label)),
        }
    }

    pub fn label(&self) -> &str {
        self.dimensions[0].label()
    }

    pub fn frames(&self) -> usize {
        self.dimensions[0].len()
    }

    pub fn dimension(&self, dimension: Dimension) -> &DeltaSeries<usize> {
        &self.dimensions[dimension.index()]
    }

    pub fn overlap(&self) -> Option<&DeltaSeries<usize>> {
        self.overlap.as_ref()
    }
}

fn overlaps(ground_truth: &BoxSeries, tracked: &BoxSeries) -> Result<Vec<f64>> {
    if ground_truth.len() != tracked.len() {
        return Err(Error::GroundTruthMismatch {
            ground_truth: ground_truth.len(),
            tracked: tracked.len(),
        });
    }
    Ok(ground_truth
        .boxes()
        .iter()
        .zip(tracked.boxes())
        .map(|(truth, bbox)| compute_iou(truth, bbox))
        .collect())
}

/// Compare two trackers' success scores sequence by sequence.
///
/// The baseline decides which sequences are compared and in which order;
/// sequences only the experimental tracker has are ignored.
pub fn sequence_deltas(
    baseline: &SequenceScores,
    experimental: &SequenceScores,
) -> Result<DeltaSeries<String>> {
    let mut points = Vec::with_capacity(baseline.len());
    for (sequence, baseline_score) in baseline.iter() {
        let experimental_score = experimental
            .get(sequence)
            .ok_or_else(|| Error::MissingKey(sequence.to_string()))?;
        points.push(DeltaPoint {
            key: sequence.to_string(),
            value: experimental_score - baseline_score,
        });
    }

    let ignored = experimental
        .iter()
        .filter(|(sequence, _)| baseline.get(sequence).is_none())
        .count();
    if ignored > 0 {
        debug!("Ignoring {} sequences missing from the baseline", ignored);
    }

    Ok(DeltaSeries::new(
        series_label("baseline", "experimental"),
        points,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::BoundingBox;
    use approx::assert_relative_eq;
    use std::path::PathBuf;

    fn boxes(rows: &[[f64; 4]]) -> BoxSeries {
        BoxSeries::new(
            PathBuf::from("test.txt"),
            rows.iter()
                .map(|r| BoundingBox::new(r[0], r[1], r[2], r[3]))
                .collect(),
        )
    }

    fn scores(entries: &[(&str, f64)]) -> SequenceScores {
        entries
            .iter()
            .map(|(name, score)| (name.to_string(), *score))
            .collect()
    }

    #[test]
    fn test_diff_is_experimental_minus_baseline() {
        let a = [3.0, -1.5, 10.0, 0.0];
        let b = [2.5, 4.0, 10.0, -7.25];
        let d = diff_values(&a, &b).unwrap();
        for i in 0..a.len() {
            assert_eq!(d[i], b[i] - a[i]);
        }
    }

    #[test]
    fn test_diff_length_mismatch() {
        assert!(matches!(
            diff_values(&[1.0, 2.0], &[1.0]),
            Err(Error::LengthMismatch {
                baseline: 2,
                experimental: 1
            })
        ));
    }

    #[test]
    fn test_symmetric_scores_cancel() {
        let baseline = scores(&[("s1", 1.0), ("s2", 1.0)]);
        let experimental = scores(&[("s1", 1.2), ("s2", 0.8)]);
        let delta = sequence_deltas(&baseline, &experimental).unwrap();

        let values = delta.values();
        assert_relative_eq!(values[0], 0.2, epsilon = 1e-12);
        assert_relative_eq!(values[1], -0.2, epsilon = 1e-12);
        assert_relative_eq!(delta.mean().unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sequence_deltas_follow_baseline_order() {
        let baseline = scores(&[("Walking", 0.7), ("Basketball", 0.5), ("Singer1", 0.9)]);
        let experimental = scores(&[
            ("Basketball", 0.6),
            ("Extra", 0.1),
            ("Singer1", 0.8),
            ("Walking", 0.7),
        ]);
        let delta = sequence_deltas(&baseline, &experimental).unwrap();

        let keys: Vec<&String> = delta.keys().collect();
        assert_eq!(keys, vec!["Walking", "Basketball", "Singer1"]);
        assert_eq!(delta.len(), 3);
    }

    #[test]
    fn test_sequence_deltas_missing_key() {
        let baseline = scores(&[("s1", 0.5), ("s2", 0.6)]);
        let experimental = scores(&[("s1", 0.55)]);
        assert!(matches!(
            sequence_deltas(&baseline, &experimental),
            Err(Error::MissingKey(key)) if key == "s2"
        ));
    }

    #[test]
    fn test_empty_series_has_no_mean() {
        let empty = SequenceScores::default();
        let delta = sequence_deltas(&empty, &empty).unwrap();
        assert!(delta.is_empty());
        assert!(matches!(delta.mean(), Err(Error::EmptySeries)));
        assert!(matches!(delta.summary(), Err(Error::EmptySeries)));
    }

    #[test]
    fn test_frame_deltas_per_dimension() {
        let baseline = boxes(&[[10.0, 10.0, 30.0, 40.0], [12.0, 11.0, 30.0, 40.0]]);
        let experimental = boxes(&[[11.0, 10.0, 32.0, 38.0], [12.0, 9.0, 29.0, 40.0]]);
        let deltas = frame_deltas(&baseline, &experimental)
            .unwrap()
            .with_label(&series_label("SiamFC", "SiamFC+"));

        assert_eq!(deltas.frames(), 2);
        assert_eq!(deltas.label(), "SiamFC+ - SiamFC");
        assert_eq!(deltas.dimension(Dimension::X).values(), vec![1.0, 0.0]);
        assert_eq!(deltas.dimension(Dimension::Y).values(), vec![0.0, -2.0]);
        assert_eq!(deltas.dimension(Dimension::Width).values(), vec![2.0, -1.0]);
        assert_eq!(deltas.dimension(Dimension::Height).values(), vec![-2.0, 0.0]);

        let frames: Vec<usize> = deltas.dimension(Dimension::Width).keys().copied().collect();
        assert_eq!(frames, vec![1, 2]);
        assert!(deltas.overlap().is_none());
    }

    #[test]
    fn test_frame_deltas_length_mismatch() {
        let baseline = boxes(&[[0.0, 0.0, 1.0, 1.0]; 100]);
        let experimental = boxes(&[[0.0, 0.0, 1.0, 1.0]; 101]);
        assert!(matches!(
            frame_deltas(&baseline, &experimental),
            Err(Error::LengthMismatch {
                baseline: 100,
                experimental: 101
            })
        ));
    }

    #[test]
    fn test_overlap_delta() {
        let truth = boxes(&[[0.0, 0.0, 10.0, 10.0], [0.0, 0.0, 10.0, 10.0]]);
        let baseline = boxes(&[[5.0, 0.0, 10.0, 10.0], [0.0, 0.0, 10.0, 10.0]]);
        let experimental = boxes(&[[0.0, 0.0, 10.0, 10.0], [20.0, 20.0, 10.0, 10.0]]);
        let deltas = frame_deltas(&baseline, &experimental)
            .unwrap()
            .with_overlap(&truth, &baseline, &experimental)
            .unwrap();

        let overlap = deltas.overlap().unwrap().values();
        assert_relative_eq!(overlap[0], 1.0 - 1.0 / 3.0);
        assert_relative_eq!(overlap[1], -1.0);
    }

    #[test]
    fn test_overlap_requires_matching_ground_truth() {
        let truth = boxes(&[[0.0, 0.0, 10.0, 10.0]; 99]);
        let tracked = boxes(&[[0.0, 0.0, 10.0, 10.0]; 100]);
        let err = frame_deltas(&tracked, &tracked)
            .unwrap()
            .with_overlap(&truth, &tracked, &tracked)
            .unwrap_err();

        assert!(matches!(
            err,
            Error::GroundTruthMismatch {
                ground_truth: 99,
                tracked: 100
            }
        ));
        assert_eq!(
            err.to_string(),
            "ground truth has 99 frames but the tracker reported 100"
        );
    }

    #[test]
    fn test_summary() {
        let baseline = scores(&[("a", 0.5), ("b", 0.5), ("c", 0.5), ("d", 0.5)]);
        let experimental = scores(&[("a", 0.75), ("b", 0.5), ("c", 0.25), ("d", 1.0)]);
        let summary = sequence_deltas(&baseline, &experimental)
            .unwrap()
            .summary()
            .unwrap();

        assert_eq!(summary.count, 4);
        assert_eq!(summary.positive, 2);
        assert_eq!(summary.negative, 1);
        assert_relative_eq!(summary.mean, 0.125);
        assert_relative_eq!(summary.min, -0.25);
        assert_relative_eq!(summary.max, 0.5);
    }
}
