use clap::Parser;
use paper_explainer::cli::{Args, Command};
use paper_explainer::options::{Difficulty, ExecutionMode, FeatureOptions, SummaryStrategy};

fn explain_options(argv: &[&str], base: &FeatureOptions) -> FeatureOptions {
    let args = Args::try_parse_from(argv).expect("parse args");
    match args.cmd {
        Command::Explain { features, .. } => features.apply(base),
        other => panic!("expected explain, got {other:?}"),
    }
}

#[test]
fn flags_switch_features_on() {
    let opts = explain_options(
        &[
            "paper-explainer",
            "explain",
            "--input",
            "paper.pdf",
            "--difficulty",
            "high-school",
            "--examples",
            "--math",
            "--method",
            "refine",
        ],
        &FeatureOptions::default(),
    );
    assert_eq!(opts.difficulty, Difficulty::HighSchool);
    assert!(opts.include_examples);
    assert!(opts.explain_math);
    assert!(!opts.explain_prereq);
    assert_eq!(opts.summarization_method, SummaryStrategy::Refine);
    assert_eq!(opts.execution_mode, ExecutionMode::Concurrent);
}

#[test]
fn throttle_implies_sequential_mode() {
    let opts = explain_options(
        &["paper-explainer", "explain", "--input", "p.pdf", "--throttle", "2.5"],
        &FeatureOptions::default(),
    );
    assert_eq!(opts.execution_mode, ExecutionMode::SequentialThrottled);
    assert_eq!(opts.throttle(), Some(std::time::Duration::from_millis(2500)));
}

#[test]
fn similar_summary_implies_search() {
    let opts = explain_options(
        &["paper-explainer", "explain", "--input", "p.pdf", "--similar-summary"],
        &FeatureOptions::default(),
    );
    assert!(opts.find_similar_papers);
    assert!(opts.include_paper_summary_of_similar);
}

#[test]
fn absent_flags_keep_config_values() {
    let base = FeatureOptions {
        explain_prereq: true,
        difficulty: Difficulty::Expert,
        ..Default::default()
    };
    let opts = explain_options(&["paper-explainer", "explain", "--input", "p.pdf"], &base);
    assert!(opts.explain_prereq);
    assert_eq!(opts.difficulty, Difficulty::Expert);
}
