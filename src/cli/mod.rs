//! Persona CLI Module
//!
//! The interactive questionnaire and training report. Everything here is
//! presentation; the answers are validated before they reach the pipeline.

use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{theme::ColorfulTheme, Input};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::time::Instant;

use crate::config::PipelineConfig;
use crate::error::PersonaError;
use crate::pipeline::{Assessment, TrainedPipeline};
use crate::schema::{Answer, Answers, Feature, FeatureKind, Personality};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 54; // content width between "│  " and " │"

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }
fn fail(s: &str) -> ColoredString   { s.truecolor(235, 100, 100) }

const BORDER: &str = "─────────────────────────────────────────────────────────";

fn line_box_top()    { println!("  {}", dim(&format!("┌{}┐", BORDER))); }
fn line_box_bottom() { println!("  {}", dim(&format!("└{}┘", BORDER))); }
fn line_box_sep()    { println!("  {}", dim(&format!("├{}┤", BORDER))); }

fn boxed(left: usize, content: &str, right: usize) -> String {
    format!("{}  {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"))
}

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    println!("  {}", boxed(0, content, W.saturating_sub(visible_len)));
}

fn line_box_center(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let total_pad = W.saturating_sub(visible_len);
    let left = total_pad / 2;
    println!("  {}", boxed(left, content, total_pad - left));
}

fn line_box_empty() { line_box(""); }

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
    let _ = std::io::stdout().flush();
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn print_banner() {
    println!();
    println!("       {}", "┏━┓┏━╸┏━┓┏━┓┏━┓┏┓╻┏━┓".truecolor(120, 170, 255));
    println!("       {}", "┣━┛┣╸ ┣┳┛┗━┓┃ ┃┃┗┫┣━┫".truecolor(100, 150, 240));
    println!("       {}", "╹  ┗━╸╹┗╸┗━┛┗━┛╹ ╹╹ ╹".truecolor(80, 130, 220));
    println!();
    println!("       {}", dim(&format!("Introvert / Extrovert  ·  svm  ·  v{}", env!("CARGO_PKG_VERSION"))));
    println!();
}

fn theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: dialoguer::console::style("  ?".to_string()).for_stderr().color256(111),
        prompt_style: dialoguer::console::Style::new().for_stderr().white().bold(),
        success_prefix: dialoguer::console::style("  ✓".to_string()).for_stderr().green(),
        error_prefix: dialoguer::console::style("  ✗".to_string()).for_stderr().red(),
        ..ColorfulTheme::default()
    }
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "persona")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Introvert / extrovert questionnaire backed by a kernel SVM")]
#[command(long_about = None)]
pub struct Cli {
    /// Survey dataset (CSV with a Personality column)
    #[arg(short, long, global = true)]
    pub data: Option<PathBuf>,

    /// Pipeline configuration file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train on the dataset and print the evaluation report
    Report {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Build the pipeline configuration from `--config` and `--data`
    pub fn pipeline_config(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(data) = &self.data {
            config.dataset_path = data.clone();
        }
        Ok(config)
    }
}

// ─── Training ──────────────────────────────────────────────────────────────────

/// Train, printing progress. A failure is rendered and `None` returned.
fn train_pipeline(config: &PipelineConfig) -> Option<TrainedPipeline> {
    step_run(&format!("Training on {}", config.dataset_path.display()));
    let start = Instant::now();

    match TrainedPipeline::train(config) {
        Ok(pipeline) => {
            step_done(&format!("{:.2}s", start.elapsed().as_secs_f64()));
            Some(pipeline)
        }
        Err(err) => {
            println!("{}", fail("failed"));
            render_training_failure(config, &err);
            None
        }
    }
}

fn render_training_failure(config: &PipelineConfig, err: &PersonaError) {
    println!();
    if err.is_dataset_not_found() {
        println!(
            "  {} dataset '{}' not found",
            fail("✗"),
            config.dataset_path.display()
        );
        println!("  {}", dim("make sure the file exists or pass --data <path>"));
    } else {
        println!("  {} {}", fail("✗"), err);
    }
    println!();
}

fn print_training_summary(pipeline: &TrainedPipeline) {
    let report = pipeline.report();

    section("Model");
    println!("  {:<18} {}", muted("Accuracy"), format!("{:.2}%", report.accuracy * 100.0).white().bold());
    println!("  {:<18} {}", muted("Kernel"), report.kernel);
    if let Some(gamma) = report.gamma {
        println!("  {:<18} {:.6}", muted("Gamma"), gamma);
    }
    println!(
        "  {:<18} {} introvert · {} extrovert",
        muted("Support vectors"),
        report.support_vectors[0],
        report.support_vectors[1]
    );
    println!(
        "  {:<18} {} train · {} evaluation · {} dropped",
        muted("Rows"),
        report.n_train,
        report.n_evaluation,
        pipeline.n_dropped_rows()
    );
}

/// Train and print the evaluation report
pub fn cmd_report(config: &PipelineConfig, json: bool) -> anyhow::Result<()> {
    if json {
        let pipeline = match TrainedPipeline::train(config) {
            Ok(pipeline) => pipeline,
            Err(err) => {
                eprintln!("{}", err);
                return Ok(());
            }
        };
        println!("{}", serde_json::to_string_pretty(pipeline.report())?);
        return Ok(());
    }

    println!();
    let Some(pipeline) = train_pipeline(config) else {
        return Ok(());
    };

    print_training_summary(&pipeline);

    section("Classification report");
    for line in pipeline.report().metrics.to_string().lines() {
        println!("  {}", line);
    }

    let [[tn, fp], [fn_, tp]] = pipeline.report().metrics.confusion;
    section("Confusion matrix");
    println!("  {:>12} {:>10} {:>10}", "", muted("Introvert"), muted("Extrovert"));
    println!("  {:>12} {:>10} {:>10}", muted("Introvert"), tn, fp);
    println!("  {:>12} {:>10} {:>10}", muted("Extrovert"), fn_, tp);
    println!();

    Ok(())
}

// ─── Questionnaire ─────────────────────────────────────────────────────────────

fn question(feature: Feature) -> &'static str {
    match feature {
        Feature::TimeSpentAlone => "Hours spent alone per day",
        Feature::StageFear => "Do you have stage fear (yes/no)",
        Feature::SocialEventAttendance => "Social events attended per month",
        Feature::GoingOutside => "Times going outside per week",
        Feature::DrainedAfterSocializing => "Do you feel drained after socializing (yes/no)",
        Feature::FriendsCircleSize => "Number of close friends",
        Feature::PostFrequency => "Social media posts per week",
    }
}

fn check_bounds(feature: Feature, value: f64) -> Result<(), String> {
    let (min, max) = match feature.kind() {
        FeatureKind::Continuous { min, max } => (min, max),
        FeatureKind::Discrete { min, max } => (min as f64, max as f64),
        FeatureKind::Binary => (0.0, 1.0),
    };
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(format!("enter a value between {} and {}", min, max))
    }
}

fn ask_number(theme: &ColorfulTheme, feature: Feature) -> dialoguer::Result<f64> {
    Input::<f64>::with_theme(theme)
        .with_prompt(question(feature))
        .validate_with(move |v: &f64| check_bounds(feature, *v))
        .interact_text()
}

fn ask_count(theme: &ColorfulTheme, feature: Feature) -> dialoguer::Result<u32> {
    Input::<u32>::with_theme(theme)
        .with_prompt(question(feature))
        .validate_with(move |v: &u32| check_bounds(feature, *v as f64))
        .interact_text()
}

fn ask_answer(theme: &ColorfulTheme, feature: Feature) -> dialoguer::Result<Answer> {
    Input::<Answer>::with_theme(theme)
        .with_prompt(question(feature))
        .interact_text()
}

fn ask_answers(theme: &ColorfulTheme) -> dialoguer::Result<Answers> {
    section("Questionnaire");
    Ok(Answers {
        time_spent_alone: ask_number(theme, Feature::TimeSpentAlone)?,
        stage_fear: ask_answer(theme, Feature::StageFear)?,
        social_event_attendance: ask_count(theme, Feature::SocialEventAttendance)?,
        going_outside: ask_count(theme, Feature::GoingOutside)?,
        drained_after_socializing: ask_answer(theme, Feature::DrainedAfterSocializing)?,
        friends_circle_size: ask_count(theme, Feature::FriendsCircleSize)?,
        post_frequency: ask_count(theme, Feature::PostFrequency)?,
    })
}

/// The "predict again" question also takes a bare `y`
fn wants_again(input: &str) -> bool {
    let trimmed = input.trim().to_lowercase();
    trimmed == "y" || Answer::parse(&trimmed).is_some_and(|a| a.is_yes())
}

fn ask_again(theme: &ColorfulTheme) -> dialoguer::Result<bool> {
    let raw = Input::<String>::with_theme(theme)
        .with_prompt("Predict again (y/n)")
        .allow_empty(true)
        .interact_text()?;
    Ok(wants_again(&raw))
}

fn hyperplane_side(decision_score: f64) -> Personality {
    if decision_score >= 0.0 {
        Personality::Extrovert
    } else {
        Personality::Introvert
    }
}

fn render_assessment(answers: &Answers, assessment: &Assessment) {
    let prediction = &assessment.prediction;
    let insight = &assessment.insight;

    let verdict = match prediction.label {
        Personality::Introvert => prediction.label.as_str().truecolor(180, 140, 255).bold(),
        Personality::Extrovert => prediction.label.as_str().truecolor(255, 190, 90).bold(),
    };

    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "Result".white().bold()));
    line_box_empty();
    line_box_center(&format!("{}", verdict));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Confidence     ", &format!("{:.1}%", prediction.confidence * 100.0)));
    line_box(&kv("Tier           ", insight.tier.as_str()));
    line_box(&kv("P(introvert)   ", &format!("{:.3}", prediction.probabilities[0])));
    line_box(&kv("P(extrovert)   ", &format!("{:.3}", prediction.probabilities[1])));
    line_box_empty();
    line_box_bottom();

    section("Traits");
    for item in prediction.label.traits() {
        println!("  {} {}", accent("•"), item);
    }

    section("Model insight");
    println!("  {:<20} {:+.4}", muted("Decision score"), prediction.decision_score);
    println!("  {:<20} {} side", muted("Hyperplane"), hyperplane_side(prediction.decision_score));
    println!("  {:<20} {:.4}", muted("Distance"), prediction.decision_score.abs());
    println!(
        "  {:<20} {} introvert · {} extrovert",
        muted("Support vectors"),
        insight.support_vectors[0],
        insight.support_vectors[1]
    );

    section("Your answers");
    println!("  {:<30} {}", muted("Hours alone"), answers.time_spent_alone);
    println!("  {:<30} {}", muted("Stage fear"), answers.stage_fear);
    println!("  {:<30} {}", muted("Social events"), answers.social_event_attendance);
    println!("  {:<30} {}", muted("Going outside"), answers.going_outside);
    println!("  {:<30} {}", muted("Drained after socializing"), answers.drained_after_socializing);
    println!("  {:<30} {}", muted("Close friends"), answers.friends_circle_size);
    println!("  {:<30} {}", muted("Posts per week"), answers.post_frequency);
}

/// Ctrl-C or end of input at a prompt
fn is_session_end(err: &dialoguer::Error) -> bool {
    let dialoguer::Error::IO(io) = err;
    matches!(io.kind(), ErrorKind::Interrupted | ErrorKind::UnexpectedEof)
}

fn questionnaire_loop(pipeline: &TrainedPipeline, theme: &ColorfulTheme) -> dialoguer::Result<()> {
    loop {
        let answers = ask_answers(theme)?;

        match pipeline.assess(&answers) {
            Ok(assessment) => render_assessment(&answers, &assessment),
            Err(err) => {
                tracing::warn!(error = %err, "prediction failed");
                println!();
                println!("  {} {}", fail("✗"), err);
            }
        }

        println!();
        if !ask_again(theme)? {
            return Ok(());
        }
    }
}

/// Train once, then run questionnaire rounds until the user stops
pub fn cmd_interactive(config: &PipelineConfig) -> anyhow::Result<()> {
    print_banner();

    let Some(pipeline) = train_pipeline(config) else {
        return Ok(());
    };
    print_training_summary(&pipeline);

    let theme = theme();
    if let Err(err) = questionnaire_loop(&pipeline, &theme) {
        if !is_session_end(&err) {
            return Err(err.into());
        }
        println!();
    }

    println!();
    println!("  {}", dim("goodbye"));
    println!();
    Ok(())
}
