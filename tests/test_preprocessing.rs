//! Integration test: loading, cleaning, encoding, splitting and scaling

mod common;

use common::{create_test_csv, survey_csv, survey_row, HEADER};
use ndarray::Axis;
use persona_svm::preprocessing::{train_test_split, EncodingTable};
use persona_svm::prelude::*;
use persona_svm::utils::DataLoader;
use polars::prelude::*;

fn survey_frame() -> DataFrame {
    df!(
        "Time_spent_Alone" => &[Some(9.0), Some(1.0), None, Some(8.0), Some(2.0), Some(7.5)],
        "Stage_fear" => &["Yes", "No", "Yes", "yes", "NO", "Yes"],
        "Social_event_attendance" => &[1.0, 8.0, 2.0, 0.0, 9.0, 1.0],
        "Going_outside" => &[1.0, 6.0, 0.0, 2.0, 5.0, 1.0],
        "Drained_after_socializing" => &["Yes", "No", "Yes", "Yes", "No", "Yes"],
        "Friends_circle_size" => &[2.0, 12.0, 3.0, 4.0, 10.0, 1.0],
        "Post_frequency" => &[0.0, 7.0, 1.0, 2.0, 9.0, 1.0],
        "Personality" => &["Introvert", "Extrovert", "Introvert", "Introvert", "Extrovert", "Introvert"],
        "Respondent" => &["a", "b", "c", "d", "e", "f"]
    )
    .unwrap()
}

#[test]
fn test_one_missing_cell_drops_one_row() {
    let mut csv = survey_csv(30);
    csv.push_str(",Yes,1,1,Yes,2,1,Introvert\n");
    let file = create_test_csv(&csv);

    let preparer = DataPreparer::new(&PipelineConfig::new(file.path()));
    let prepared = preparer.prepare(file.path()).unwrap();

    assert_eq!(prepared.n_raw_rows, 31);
    assert_eq!(prepared.n_dropped_rows, 1);
    assert_eq!(prepared.n_usable_rows(), 30);
}

#[test]
fn test_extra_columns_ignored() {
    let mut df = survey_frame();
    df.with_column(Series::new(
        "Time_spent_Alone".into(),
        &[9.0, 1.0, 6.0, 8.0, 2.0, 7.5],
    ))
    .unwrap();

    let preparer = DataPreparer::new(&PipelineConfig::default().with_test_size(0.4));
    let prepared = preparer.prepare_frame(&df).unwrap();

    assert_eq!(prepared.train.x.ncols(), 7);
    assert_eq!(prepared.n_dropped_rows, 0);
    assert_eq!(prepared.n_usable_rows(), 6);
    assert_eq!(prepared.evaluation.len(), 3);
}

#[test]
fn test_empty_cell_in_extra_column_drops_row() {
    let mut csv = format!("{},Note\n", HEADER);
    for i in 0..30 {
        let note = if i == 5 { "" } else { "seen" };
        csv.push_str(&format!("{},{}\n", survey_row(i, i % 2 == 0), note));
    }
    let file = create_test_csv(&csv);

    let prepared = DataPreparer::new(&PipelineConfig::default())
        .prepare(file.path())
        .unwrap();
    assert_eq!(prepared.n_raw_rows, 30);
    assert_eq!(prepared.n_dropped_rows, 1);
    assert_eq!(prepared.n_usable_rows(), 29);
}

#[test]
fn test_null_in_schema_column_of_frame_drops_row() {
    let preparer = DataPreparer::new(&PipelineConfig::default().with_test_size(0.4));
    let prepared = preparer.prepare_frame(&survey_frame()).unwrap();

    assert_eq!(prepared.n_dropped_rows, 1);
    assert_eq!(prepared.n_usable_rows(), 5);
    assert_eq!(prepared.evaluation.len(), 2);
}

#[test]
fn test_encoding_is_case_insensitive() {
    let df = survey_frame();
    let schema = FeatureSchema::standard();
    let table = EncodingTable::fit(&df, schema.categorical()).unwrap();

    let mapping = table.mapping(Feature::StageFear).unwrap();
    assert_eq!(mapping.get("Yes"), Some(&1));
    assert_eq!(mapping.get("yes"), Some(&1));
    assert_eq!(mapping.get("NO"), Some(&0));
    assert_eq!(table.encode_answer(Feature::StageFear, Answer::Negative).unwrap(), 0.0);
    assert!(table.encode_answer(Feature::PostFrequency, Answer::Affirmative).is_err());

    let encoded = table.transform(&df).unwrap();
    let codes: Vec<f64> = encoded
        .column("Stage_fear")
        .unwrap()
        .as_materialized_series()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect();
    assert_eq!(codes, vec![1.0, 0.0, 1.0, 1.0, 0.0, 1.0]);
}

#[test]
fn test_unknown_categorical_label_is_malformed() {
    let mut csv = survey_csv(20);
    csv.push_str("5.0,Sometimes,2,2,Yes,4,2,Introvert\n");
    let file = create_test_csv(&csv);

    let err = DataPreparer::new(&PipelineConfig::default())
        .prepare(file.path())
        .unwrap_err();
    assert!(err.is_dataset_error());
    assert!(err.to_string().contains("Sometimes"));
}

#[test]
fn test_missing_schema_column_is_malformed() {
    let csv = survey_csv(10).replace("Going_outside", "Going_out");
    let file = create_test_csv(&csv);

    let err = DataPreparer::new(&PipelineConfig::default())
        .prepare(file.path())
        .unwrap_err();
    assert!(matches!(
        err,
        PersonaError::DatasetLoad(DatasetLoadError::Malformed { .. })
    ));
    assert!(err.to_string().contains("Going_outside"));
}

#[test]
fn test_non_numeric_feature_is_malformed() {
    let mut csv = String::from(HEADER);
    csv.push('\n');
    csv.push_str("lots,Yes,1,1,Yes,2,1,Introvert\n");
    csv.push_str("1.0,No,8,5,No,10,6,Extrovert\n");
    let file = create_test_csv(&csv);

    let err = DataPreparer::new(&PipelineConfig::default().with_test_size(0.5))
        .prepare(file.path())
        .unwrap_err();
    assert!(err.is_dataset_error());
}

#[test]
fn test_loader_reports_missing_file() {
    let err = DataLoader::new()
        .load_csv("no/such/dir/personality_dataset.csv")
        .unwrap_err();
    assert!(err.is_dataset_not_found());
}

#[test]
fn test_split_is_seeded_and_disjoint() {
    let a = train_test_split(50, 0.2, 42).unwrap();
    let b = train_test_split(50, 0.2, 42).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.test.len(), 10);
    assert_eq!(a.train.len(), 40);

    let mut all: Vec<usize> = a.train.iter().chain(a.test.iter()).copied().collect();
    all.sort_unstable();
    assert_eq!(all, (0..50).collect::<Vec<_>>());
}

#[test]
fn test_scaler_fitted_on_training_partition() {
    let file = create_test_csv(&survey_csv(40));
    let prepared = DataPreparer::new(&PipelineConfig::default())
        .prepare(file.path())
        .unwrap();

    let scaled = prepared.scaler.transform(&prepared.train.x).unwrap();
    let means = scaled.mean_axis(Axis(0)).unwrap();
    for m in means.iter() {
        assert!(m.abs() < 1e-9, "column mean {}", m);
    }

    let stds = scaled.std_axis(Axis(0), 0.0);
    for s in stds.iter() {
        assert!((s - 1.0).abs() < 1e-9 || s.abs() < 1e-12, "column std {}", s);
    }
}

#[test]
fn test_scaler_is_pure() {
    let file = create_test_csv(&survey_csv(40));
    let prepared = DataPreparer::new(&PipelineConfig::default())
        .prepare(file.path())
        .unwrap();

    let row = prepared.evaluation.x.row(0);
    let first = prepared.scaler.transform_one(row).unwrap();
    let second = prepared.scaler.transform_one(row).unwrap();
    assert_eq!(first, second);
}
