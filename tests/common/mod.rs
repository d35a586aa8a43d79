//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::io::Write;
use tempfile::NamedTempFile;

pub const HEADER: &str = "Time_spent_Alone,Stage_fear,Social_event_attendance,Going_outside,\
Drained_after_socializing,Friends_circle_size,Post_frequency,Personality";

/// One CSV row for a clearly introverted or extroverted respondent
pub fn survey_row(i: usize, introvert: bool) -> String {
    let jitter = (i % 5) as f64 * 0.4;
    if introvert {
        format!(
            "{:.1},Yes,{},{},Yes,{},{},Introvert",
            7.5 + jitter,
            i % 3,
            i % 2,
            1 + i % 4,
            i % 3
        )
    } else {
        format!(
            "{:.1},No,{},{},No,{},{},Extrovert",
            1.0 + jitter,
            6 + i % 4,
            4 + i % 3,
            9 + i % 6,
            5 + i % 5
        )
    }
}

/// `n` rows alternating Introvert / Extrovert
pub fn survey_csv(n: usize) -> String {
    let mut csv = String::from(HEADER);
    csv.push('\n');
    for i in 0..n {
        csv.push_str(&survey_row(i, i % 2 == 0));
        csv.push('\n');
    }
    csv
}

pub fn create_test_csv(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .unwrap();
    write!(file, "{}", contents).unwrap();
    file
}
