//! Loading of tracker results from disk.
//!
//! Two formats are supported:
//!
//! * per-sequence bounding boxes, one `x,y,w,h` row per frame, stored as
//!   `<results_dir>/<tracker>/<sequence>.txt`
//! * benchmark performance reports in JSON, mapping each tracker to its
//!   per-sequence success scores:
//!
//! ```json
//! {"SiamFC": {"seq_wise": {"Basketball": {"success_score": 0.58}}}}
//! ```

use crate::error::{Error, Result};
use crate::utils::BoundingBox;
use log::{debug, info};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// One coordinate of a bounding box row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    X,
    Y,
    Width,
    Height,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::X,
        Dimension::Y,
        Dimension::Width,
        Dimension::Height,
    ];

    /// Column of this dimension in an `[x, y, w, h]` row.
    pub fn index(self) -> usize {
        match self {
            Dimension::X => 0,
            Dimension::Y => 1,
            Dimension::Width => 2,
            Dimension::Height => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Dimension::X => "X",
            Dimension::Y => "Y",
            Dimension::Width => "Width",
            Dimension::Height => "Height",
        }
    }
}

/// Per-frame bounding boxes of one tracker on one sequence.
#[derive(Debug, Clone)]
pub struct BoxSeries {
    path: PathBuf,
    boxes: Vec<BoundingBox>,
}

impl BoxSeries {
    pub fn new(path: PathBuf, boxes: Vec<BoundingBox>) -> Self {
        Self { path, boxes }
    }

    /// File the boxes were read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// All values of one dimension, in frame order.
    pub fn column(&self, dimension: Dimension) -> Vec<f64> {
        self.boxes.iter().map(|b| b[dimension.index()]).collect()
    }
}

/// Path of a tracker's bounding box results for a sequence.
pub fn box_result_path<P: AsRef<Path>>(results_dir: P, tracker: &str, sequence: &str) -> PathBuf {
    results_dir
        .as_ref()
        .join(tracker)
        .join(format!("{}.txt", sequence))
}

/// Results directory of one benchmark experiment.
///
/// Benchmark toolkits write into a child directory named after the
/// benchmark and version, e.g. `<results_dir>/OTBtb100/<tracker>/<seq>.txt`.
pub fn experiment_results_dir<P: AsRef<Path>>(results_dir: P, experiment: Option<&str>) -> PathBuf {
    match experiment {
        Some(experiment) => results_dir.as_ref().join(experiment),
        None => results_dir.as_ref().to_path_buf(),
    }
}

/// Read a bounding box file.
///
/// Rows are comma separated; rows without a comma are split on whitespace.
/// Blank lines and `#` comments are skipped. Every remaining row must hold
/// exactly four finite numbers.
pub fn load_boxes<P: AsRef<Path>>(file_path: P) -> Result<BoxSeries> {
    let path = file_path.as_ref().to_path_buf();
    let file = File::open(&path).map_err(|e| open_error(&path, e))?;

    let reader = BufReader::new(file);
    let mut boxes = Vec::new();

    for (index, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let row = line.trim();
        if row.is_empty() || row.starts_with('#') {
            continue;
        }

        let bbox = parse_row(row).map_err(|reason| Error::MalformedResult {
            path: path.clone(),
            reason: format!("line {}: {}", index + 1, reason),
        })?;
        boxes.push(bbox);
    }

    debug!("Loaded {} boxes from {:?}", boxes.len(), path);
    Ok(BoxSeries::new(path, boxes))
}

fn parse_row(row: &str) -> std::result::Result<BoundingBox, String> {
    let fields: Vec<&str> = if row.contains(',') {
        row.split(',').map(str::trim).collect()
    } else {
        row.split_whitespace().collect()
    };

    if fields.len() != 4 {
        return Err(format!("expected 4 columns, found {}", fields.len()));
    }

    let mut values = [0.0f64; 4];
    for (slot, field) in values.iter_mut().zip(&fields) {
        let value: f64 = field
            .parse()
            .map_err(|_| format!("'{}' is not a number", field))?;
        if !value.is_finite() {
            return Err(format!("'{}' is not a finite number", field));
        }
        *slot = value;
    }

    Ok(BoundingBox::new(values[0], values[1], values[2], values[3]))
}

/// Load the baseline and experimental boxes for one sequence.
pub fn load_tracking_boxes<P: AsRef<Path>>(
    results_dir: P,
    sequence: &str,
    baseline: &str,
    experimental: &str,
) -> Result<(BoxSeries, BoxSeries)> {
    let results_dir = results_dir.as_ref();
    let baseline_boxes = load_boxes(box_result_path(results_dir, baseline, sequence))?;
    let experimental_boxes = load_boxes(box_result_path(results_dir, experimental, sequence))?;
    info!(
        "Loaded {} baseline and {} experimental frames for {}",
        baseline_boxes.len(),
        experimental_boxes.len(),
        sequence
    );
    Ok((baseline_boxes, experimental_boxes))
}

/// Path of a sequence's ground truth inside an OTB style benchmark directory.
pub fn ground_truth_path<P: AsRef<Path>>(benchmark_dir: P, sequence: &str) -> PathBuf {
    benchmark_dir
        .as_ref()
        .join(sequence)
        .join("groundtruth_rect.txt")
}

/// Ground truth annotations share the result file format.
pub fn load_ground_truth<P: AsRef<Path>>(file_path: P) -> Result<BoxSeries> {
    load_boxes(file_path)
}

/// Success scores of one tracker, in the order the report lists them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequenceScores {
    scores: Vec<(String, f64)>,
}

impl SequenceScores {
    pub fn new(scores: Vec<(String, f64)>) -> Self {
        Self { scores }
    }

    /// Score of a sequence, if the tracker has one.
    pub fn get(&self, sequence: &str) -> Option<f64> {
        self.scores
            .iter()
            .find(|(name, _)| name == sequence)
            .map(|(_, score)| *score)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.scores.iter().map(|(name, score)| (name.as_str(), *score))
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl FromIterator<(String, f64)> for SequenceScores {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Per-sequence success scores of every tracker in a performance report.
#[derive(Debug, Clone)]
pub struct PerformanceReport {
    path: PathBuf,
    trackers: Vec<(String, SequenceScores)>,
}

impl PerformanceReport {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Scores of the named tracker.
    pub fn tracker(&self, name: &str) -> Result<&SequenceScores> {
        self.trackers
            .iter()
            .find(|(tracker, _)| tracker == name)
            .map(|(_, scores)| scores)
            .ok_or_else(|| Error::UnknownTracker(name.to_string()))
    }

    pub fn tracker_names(&self) -> impl Iterator<Item = &str> {
        self.trackers.iter().map(|(name, _)| name.as_str())
    }
}

#[derive(Deserialize)]
struct TrackerPerformance {
    seq_wise: Map<String, Value>,
}

#[derive(Deserialize)]
struct SequencePerformance {
    success_score: f64,
}

/// Read a JSON performance report.
///
/// Accuracy based reports (VOT style) carry no per-sequence success scores
/// and are rejected with [`Error::UnsupportedFormat`].
pub fn load_performance<P: AsRef<Path>>(file_path: P) -> Result<PerformanceReport> {
    let path = file_path.as_ref().to_path_buf();
    let data = fs::read_to_string(&path).map_err(|e| open_error(&path, e))?;
    let malformed = |reason: String| Error::MalformedResult {
        path: path.clone(),
        reason,
    };

    let report: Map<String, Value> =
        serde_json::from_str(&data).map_err(|e| malformed(e.to_string()))?;

    if let Some(tracker) = report
        .iter()
        .find(|(_, data)| data.get("accuracy").is_some())
        .map(|(name, _)| name)
    {
        return Err(Error::UnsupportedFormat {
            path: path.clone(),
            reason: format!(
                "tracker '{}' reports accuracy, which has no per-sequence success scores",
                tracker
            ),
        });
    }

    let mut trackers = Vec::with_capacity(report.len());
    for (tracker, tracker_data) in report {
        let performance: TrackerPerformance = serde_json::from_value(tracker_data)
            .map_err(|e| malformed(format!("tracker '{}': {}", tracker, e)))?;

        let mut scores = Vec::with_capacity(performance.seq_wise.len());
        for (sequence, sequence_data) in performance.seq_wise {
            let sequence_performance: SequencePerformance =
                serde_json::from_value(sequence_data).map_err(|e| {
                    malformed(format!("tracker '{}', sequence '{}': {}", tracker, sequence, e))
                })?;
            scores.push((sequence, sequence_performance.success_score));
        }

        debug!("Tracker {} has {} sequence scores", tracker, scores.len());
        trackers.push((tracker, SequenceScores::new(scores)));
    }

    Ok(PerformanceReport { path, trackers })
}

fn open_error(path: &Path, error: io::Error) -> Error {
    if error.kind() == io::ErrorKind::NotFound {
        Error::MissingResultFile(path.to_path_buf())
    } else {
        Error::Io(error)
    }
}
