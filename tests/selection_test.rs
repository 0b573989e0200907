//! Scoring and selection over the public API

use understudy::{select_candidates, SelectionSettings, TaskAssessment};

fn assessment(desc: &str, value: u8, safety: u8, feasibility: u8, alignment: u8) -> TaskAssessment {
    TaskAssessment {
        task_description: desc.to_string(),
        reasoning: String::new(),
        value_score: value,
        safety_score: safety,
        feasibility_score: feasibility,
        user_preference_alignment_score: alignment,
    }
}

#[test]
fn unsafe_tasks_never_deploy_regardless_of_value() {
    let assessments = vec![
        assessment("wipe the staging database", 10, 2, 10, 10),
        assessment("summarize meeting notes", 9, 10, 9, 9),
    ];
    let candidates = select_candidates(&assessments, &SelectionSettings::default());

    assert_eq!(candidates.len(), 1);
    assert_eq!(
        candidates[0].assessment.task_description,
        "summarize meeting notes"
    );
}

#[test]
fn candidates_come_back_ranked_by_composite_score() {
    let mut settings = SelectionSettings::default();
    settings.deployment_threshold = 0.0;

    let assessments = vec![
        assessment("low", 5, 10, 5, 5),
        assessment("high", 10, 10, 10, 10),
        assessment("mid", 8, 10, 7, 6),
    ];
    let candidates = select_candidates(&assessments, &settings);

    let order: Vec<_> = candidates
        .iter()
        .map(|c| c.assessment.task_description.as_str())
        .collect();
    assert_eq!(order, vec!["high", "mid", "low"]);

    // ranking is strictly non-increasing in true_score
    for pair in candidates.windows(2) {
        assert!(pair[0].true_score >= pair[1].true_score);
    }
}

#[test]
fn deployment_threshold_is_a_ratio_of_the_maximum() {
    // default weights: max score = (2.0 + 1.5 + 0.5) * 10 = 40
    let settings = SelectionSettings::default();

    // 2*9 + 1.5*10 + 0.5*10 = 38 → ratio 0.95, above 0.9
    let passes = assessment("passes", 9, 10, 10, 10);
    // 2*8 + 1.5*8 + 0.5*8 = 32 → ratio 0.8, below 0.9
    let fails = assessment("fails", 8, 10, 8, 8);

    let candidates = select_candidates(&[passes, fails], &settings);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].assessment.task_description, "passes");
    assert!((candidates[0].score_ratio - 0.95).abs() < 1e-9);
}

#[test]
fn deployment_cap_keeps_only_the_best() {
    let mut settings = SelectionSettings::default();
    settings.deployment_threshold = 0.0;
    settings.max_deployed_tasks = 2;

    let assessments: Vec<_> = (1..=5)
        .map(|v| assessment(&format!("task-{}", v), v * 2, 10, 10, 10))
        .collect();
    let candidates = select_candidates(&assessments, &settings);

    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].assessment.task_description, "task-5");
    assert_eq!(candidates[1].assessment.task_description, "task-4");
}

#[test]
fn nonpositive_cap_means_unlimited() {
    let mut settings = SelectionSettings::default();
    settings.deployment_threshold = 0.0;
    settings.max_deployed_tasks = 0;

    let assessments: Vec<_> = (0..10)
        .map(|i| assessment(&format!("task-{}", i), 8, 10, 8, 8))
        .collect();
    assert_eq!(select_candidates(&assessments, &settings).len(), 10);
}

#[test]
fn all_zero_weights_select_nothing() {
    // max score is 0, so every ratio is defined as 0 and nothing clears a
    // positive deployment threshold
    let settings = SelectionSettings {
        value_weight: 0.0,
        feasibility_weight: 0.0,
        user_preference_alignment_weight: 0.0,
        ..SelectionSettings::default()
    };

    let assessments = vec![assessment("anything", 10, 10, 10, 10)];
    let candidates = select_candidates(&assessments, &settings);
    assert!(candidates.is_empty());
}

#[test]
fn equal_scores_break_ties_toward_the_heavier_dimension() {
    let mut settings = SelectionSettings::default();
    settings.deployment_threshold = 0.0;

    // both score 2*8 + 1.5*6 + 0.5*4 = 27, but "valuable" puts its points
    // in the dimension with the largest weight
    let valuable = assessment("valuable", 8, 10, 6, 4);
    let feasible = assessment("feasible", 6, 10, 8, 6);
    assert_eq!(
        2.0 * 8.0 + 1.5 * 6.0 + 0.5 * 4.0,
        2.0 * 6.0 + 1.5 * 8.0 + 0.5 * 6.0
    );

    let candidates = select_candidates(&[feasible, valuable], &settings);
    assert_eq!(candidates[0].assessment.task_description, "valuable");
}
