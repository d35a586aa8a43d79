//! Integration test: dataset file to trained pipeline to assessment

mod common;

use common::{create_test_csv, survey_csv, HEADER};
use persona_svm::prelude::*;

#[test]
fn test_end_to_end_separable_dataset() {
    let file = create_test_csv(&survey_csv(100));
    let config = PipelineConfig::new(file.path());

    let pipeline = TrainedPipeline::train(&config).unwrap();
    let report = pipeline.report();

    assert!(report.accuracy >= 0.95, "accuracy {}", report.accuracy);
    assert_eq!(report.kernel, "rbf");
    assert_eq!(report.n_train, 80);
    assert_eq!(report.n_evaluation, 20);
    assert!(report.support_vectors[0] > 0);
    assert!(report.support_vectors[1] > 0);
    assert_eq!(pipeline.n_raw_rows(), 100);
    assert_eq!(pipeline.n_dropped_rows(), 0);

    let introvert = Answers {
        time_spent_alone: 8.3,
        stage_fear: Answer::Affirmative,
        social_event_attendance: 1,
        going_outside: 0,
        drained_after_socializing: Answer::Affirmative,
        friends_circle_size: 2,
        post_frequency: 1,
    };
    let assessment = pipeline.assess(&introvert).unwrap();
    assert_eq!(assessment.prediction.label, Personality::Introvert);
    assert!(assessment.prediction.confidence >= 0.8, "confidence {}", assessment.prediction.confidence);
    assert!(assessment.prediction.decision_score < 0.0);
    assert_eq!(assessment.insight.support_vectors, report.support_vectors);

    let extrovert = Answers {
        time_spent_alone: 1.5,
        stage_fear: Answer::Negative,
        social_event_attendance: 8,
        going_outside: 5,
        drained_after_socializing: Answer::Negative,
        friends_circle_size: 11,
        post_frequency: 7,
    };
    let assessment = pipeline.assess(&extrovert).unwrap();
    assert_eq!(assessment.prediction.label, Personality::Extrovert);
    assert!(assessment.prediction.decision_score > 0.0);
}

#[test]
fn test_training_is_deterministic() {
    let file = create_test_csv(&survey_csv(60));
    let config = PipelineConfig::new(file.path()).with_random_seed(7);

    let first = TrainedPipeline::train(&config).unwrap();
    let second = TrainedPipeline::train(&config).unwrap();

    assert_eq!(first.report().accuracy.to_bits(), second.report().accuracy.to_bits());
    assert_eq!(first.report().support_vectors, second.report().support_vectors);
    assert_eq!(first.scaler(), second.scaler());

    let preparer = DataPreparer::new(&config);
    let a = preparer.prepare(file.path()).unwrap();
    let b = preparer.prepare(file.path()).unwrap();
    assert_eq!(a.train.x, b.train.x);
    assert_eq!(a.train.y, b.train.y);
    assert_eq!(a.evaluation.x, b.evaluation.x);
}

#[test]
fn test_seed_changes_partition() {
    let file = create_test_csv(&survey_csv(60));
    let a = DataPreparer::new(&PipelineConfig::new(file.path()).with_random_seed(1))
        .prepare(file.path())
        .unwrap();
    let b = DataPreparer::new(&PipelineConfig::new(file.path()).with_random_seed(2))
        .prepare(file.path())
        .unwrap();

    assert_ne!(a.evaluation.x, b.evaluation.x);
}

#[test]
fn test_missing_dataset_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig::new(dir.path().join("personality_dataset.csv"));

    let err = TrainedPipeline::train(&config).unwrap_err();
    assert!(err.is_dataset_not_found());
    assert!(matches!(
        err,
        PersonaError::DatasetLoad(DatasetLoadError::NotFound { .. })
    ));
}

#[test]
fn test_unknown_label_is_malformed() {
    let mut csv = survey_csv(20);
    csv.push_str("5.0,Yes,2,2,Yes,4,2,Ambivert\n");
    let file = create_test_csv(&csv);

    let err = TrainedPipeline::train(&PipelineConfig::new(file.path())).unwrap_err();
    assert!(matches!(
        err,
        PersonaError::DatasetLoad(DatasetLoadError::Malformed { .. })
    ));
}

#[test]
fn test_single_class_dataset_is_training_error() {
    let mut csv = String::from(HEADER);
    csv.push('\n');
    for i in 0..20 {
        csv.push_str(&common::survey_row(i, true));
        csv.push('\n');
    }
    let file = create_test_csv(&csv);

    let err = TrainedPipeline::train(&PipelineConfig::new(file.path())).unwrap_err();
    assert!(matches!(err, PersonaError::TrainingError(_)));
}

#[test]
fn test_pipeline_shared_across_threads() {
    let file = create_test_csv(&survey_csv(60));
    let pipeline = TrainedPipeline::train(&PipelineConfig::new(file.path())).unwrap();

    let answers = Answers {
        time_spent_alone: 9.0,
        stage_fear: Answer::Affirmative,
        social_event_attendance: 0,
        going_outside: 1,
        drained_after_socializing: Answer::Affirmative,
        friends_circle_size: 3,
        post_frequency: 0,
    };
    let expected = pipeline.assess(&answers).unwrap();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| pipeline.assess(&answers).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn test_config_file_drives_training() {
    let data = create_test_csv(&survey_csv(40));
    let config_file = tempfile::NamedTempFile::new().unwrap();
    PipelineConfig::new(data.path())
        .with_test_size(0.25)
        .save_json_file(config_file.path())
        .unwrap();

    let config = PipelineConfig::from_json_file(config_file.path()).unwrap();
    let pipeline = TrainedPipeline::train(&config).unwrap();
    assert_eq!(pipeline.report().n_evaluation, 10);
    assert_eq!(pipeline.report().n_train, 30);
}

#[test]
fn test_answers_coded_through_fitted_table() {
    let file = create_test_csv(&survey_csv(40));
    let pipeline = TrainedPipeline::train(&PipelineConfig::new(file.path())).unwrap();

    let answers = Answers {
        time_spent_alone: 8.0,
        stage_fear: Answer::Affirmative,
        social_event_attendance: 1,
        going_outside: 1,
        drained_after_socializing: Answer::Negative,
        friends_circle_size: 3,
        post_frequency: 2,
    };
    let vector = pipeline.vectorize(&answers).unwrap();
    assert!(pipeline.schema().check(&vector).is_ok());
    assert_eq!(vector.values(), &[8.0, 1.0, 1.0, 1.0, 0.0, 3.0, 2.0]);
}

#[test]
fn test_answer_unseen_in_training_is_inference_error() {
    // every respondent answers yes to both yes/no questions
    let csv = survey_csv(40).replace(",No,", ",Yes,");
    let file = create_test_csv(&csv);
    let pipeline = TrainedPipeline::train(&PipelineConfig::new(file.path())).unwrap();

    let answers = Answers {
        time_spent_alone: 2.0,
        stage_fear: Answer::Negative,
        social_event_attendance: 7,
        going_outside: 5,
        drained_after_socializing: Answer::Negative,
        friends_circle_size: 10,
        post_frequency: 6,
    };
    let err = pipeline.assess(&answers).unwrap_err();
    assert!(matches!(err, PersonaError::InferenceError(_)));
}
