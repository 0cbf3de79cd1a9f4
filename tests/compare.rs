//! End-to-end comparisons over result files on disk.

use approx::assert_relative_eq;
use flatfoot::{
    chart, frame_deltas,
    diff::series_label,
    results::{self, box_result_path},
    sequence_deltas, Chart, Configuration, Dimension, Error,
};
use std::fs;
use std::path::Path;

fn write_boxes(dir: &Path, tracker: &str, sequence: &str, rows: &[[f64; 4]]) {
    let path = box_result_path(dir, tracker, sequence);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let contents: String = rows
        .iter()
        .map(|r| format!("{},{},{},{}\n", r[0], r[1], r[2], r[3]))
        .collect();
    fs::write(path, contents).unwrap();
}

#[test]
fn test_box_comparison_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let baseline: Vec<[f64; 4]> = (0..25).map(|i| [i as f64, 0.0, 40.0, 80.0]).collect();
    let experimental: Vec<[f64; 4]> = (0..25)
        .map(|i| [i as f64, 0.0, 40.0 + (i % 3) as f64, 80.0 - 1.0])
        .collect();
    write_boxes(dir.path(), "SiamFC", "Basketball", &baseline);
    write_boxes(dir.path(), "SiamFC+", "Basketball", &experimental);

    let (a, b) =
        results::load_tracking_boxes(dir.path(), "Basketball", "SiamFC", "SiamFC+").unwrap();
    let deltas = frame_deltas(&a, &b)
        .unwrap()
        .with_label(&series_label("SiamFC", "SiamFC+"));

    let width = deltas.dimension(Dimension::Width);
    assert_eq!(width.len(), 25);
    assert_eq!(width.values()[..4], [0.0, 1.0, 2.0, 0.0]);
    assert_eq!(deltas.dimension(Dimension::Height).mean().unwrap(), -1.0);
    assert_eq!(deltas.dimension(Dimension::X).mean().unwrap(), 0.0);

    let chart = Chart::frame_dimension("Basketball", Dimension::Width, width).unwrap();
    assert_eq!(chart.series_label, "SiamFC+ - SiamFC");
    assert_eq!(chart.points().next(), Some(("1", 0.0)));
    assert_eq!(chart.points().last(), Some(("25", 0.0)));
}

#[test]
fn test_box_results_under_benchmark_experiment() {
    let dir = tempfile::tempdir().unwrap();
    let experiment = results::experiment_results_dir(dir.path(), Some("OTBtb100"));
    write_boxes(&experiment, "A", "Car4", &[[1.0, 2.0, 3.0, 4.0]; 3]);
    write_boxes(&experiment, "B", "Car4", &[[1.0, 2.0, 5.0, 4.0]; 3]);
    assert!(dir.path().join("OTBtb100/A/Car4.txt").is_file());

    assert!(matches!(
        results::load_tracking_boxes(dir.path(), "Car4", "A", "B"),
        Err(Error::MissingResultFile(_))
    ));
    let (a, b) = results::load_tracking_boxes(&experiment, "Car4", "A", "B").unwrap();
    let deltas = frame_deltas(&a, &b).unwrap();
    assert_eq!(deltas.dimension(Dimension::Width).mean().unwrap(), 2.0);
}

#[test]
fn test_box_files_with_different_frame_counts() {
    let dir = tempfile::tempdir().unwrap();
    write_boxes(dir.path(), "A", "Car4", &[[1.0, 2.0, 3.0, 4.0]; 100]);
    write_boxes(dir.path(), "B", "Car4", &[[1.0, 2.0, 3.0, 4.0]; 101]);

    let (a, b) = results::load_tracking_boxes(dir.path(), "Car4", "A", "B").unwrap();
    assert!(matches!(
        frame_deltas(&a, &b),
        Err(Error::LengthMismatch {
            baseline: 100,
            experimental: 101
        })
    ));
}

#[test]
fn test_missing_experimental_results() {
    let dir = tempfile::tempdir().unwrap();
    write_boxes(dir.path(), "A", "Car4", &[[1.0, 2.0, 3.0, 4.0]]);

    match results::load_tracking_boxes(dir.path(), "Car4", "A", "B") {
        Err(Error::MissingResultFile(path)) => {
            assert_eq!(path, box_result_path(dir.path(), "B", "Car4"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_overlap_against_benchmark_ground_truth() {
    let dir = tempfile::tempdir().unwrap();
    let config = format!(
        "trackers: []\nbenchmarks:\n  - name: otb\n    path: {}\n",
        dir.path().join("otb").display()
    );
    let cfg = Configuration::from_yaml(&config).unwrap();
    let benchmark = cfg.benchmark("otb").unwrap();

    let truth_path = results::ground_truth_path(&benchmark.path, "Car4");
    fs::create_dir_all(truth_path.parent().unwrap()).unwrap();
    fs::write(&truth_path, "0\t0\t10\t10\n0\t0\t10\t10\n").unwrap();

    let results_dir = dir.path().join("results");
    write_boxes(&results_dir, "A", "Car4", &[[0.0, 0.0, 10.0, 10.0], [5.0, 0.0, 10.0, 10.0]]);
    write_boxes(&results_dir, "B", "Car4", &[[5.0, 0.0, 10.0, 10.0], [0.0, 0.0, 10.0, 10.0]]);

    let (a, b) = results::load_tracking_boxes(&results_dir, "Car4", "A", "B").unwrap();
    let truth = results::load_ground_truth(&truth_path).unwrap();
    let deltas = frame_deltas(&a, &b).unwrap().with_overlap(&truth, &a, &b).unwrap();

    let overlap = deltas.overlap().unwrap();
    assert_relative_eq!(overlap.values()[0], 1.0 / 3.0 - 1.0);
    assert_relative_eq!(overlap.values()[1], 1.0 - 1.0 / 3.0);
    assert_relative_eq!(overlap.mean().unwrap(), 0.0, epsilon = 1e-12);
}

#[test]
fn test_sequence_comparison_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("performance.json");
    fs::write(
        &path,
        r#"{
            "SiamFC": {"seq_wise": {
                "s1": {"success_score": 1.0},
                "s2": {"success_score": 1.0}
            }},
            "SiamFC+": {"seq_wise": {
                "s2": {"success_score": 0.8},
                "s1": {"success_score": 1.2}
            }}
        }"#,
    )
    .unwrap();

    let report = results::load_performance(&path).unwrap();
    let deltas = sequence_deltas(
        report.tracker("SiamFC").unwrap(),
        report.tracker("SiamFC+").unwrap(),
    )
    .unwrap();

    let keys: Vec<&String> = deltas.keys().collect();
    assert_eq!(keys, vec!["s1", "s2"]);
    assert_relative_eq!(deltas.values()[0], 0.2, epsilon = 1e-12);
    assert_relative_eq!(deltas.values()[1], -0.2, epsilon = 1e-12);
    assert_relative_eq!(deltas.mean().unwrap(), 0.0, epsilon = 1e-12);

    let charts = [Chart::sequence_scores(&deltas).unwrap()];
    let json: serde_json::Value = serde_json::from_str(&chart::to_json(&charts).unwrap()).unwrap();
    assert_eq!(json[0]["points"][1]["label"], "s2");
    assert_eq!(json[0]["tick_rotation"], 90.0);
}

#[test]
fn test_sequence_missing_from_experimental() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("performance.json");
    fs::write(
        &path,
        r#"{"A": {"seq_wise": {"s1": {"success_score": 0.5}, "s2": {"success_score": 0.4}}},
            "B": {"seq_wise": {"s1": {"success_score": 0.6}}}}"#,
    )
    .unwrap();

    let report = results::load_performance(&path).unwrap();
    let result = sequence_deltas(report.tracker("A").unwrap(), report.tracker("B").unwrap());
    assert!(matches!(result, Err(Error::MissingKey(key)) if key == "s2"));
}

#[test]
fn test_accuracy_report_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vot.json");
    fs::write(
        &path,
        r#"{
            "A": {"accuracy": 0.6, "robustness": 0.2},
            "B": {"accuracy": 0.62, "robustness": 0.25}
        }"#,
    )
    .unwrap();

    assert!(matches!(
        results::load_performance(&path),
        Err(Error::UnsupportedFormat { .. })
    ));
}
