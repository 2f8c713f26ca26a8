//! Deterministic validation scoring for idea candidates.

use radar_db::ClusterRow;
use serde::Serialize;

use crate::cluster::round2;
use crate::ideas::IdeaCandidate;

const BUDGET_REVENUE_TERMS: [&str; 4] = ["enterprise", "annual", "seat", "usage"];
const BUDGET_ICP_TERMS: [&str; 3] = ["enterprise", "mid-market", "b2b"];
const NOVELTY_TERMS: [&str; 2] = ["category-defining", "new"];
const CROWDED_TERMS: [&str; 2] = ["workflow", "dashboard"];
const SCALABLE_REVENUE_TERMS: [&str; 3] = ["usage", "api", "platform"];

const MAX_LEAN_MVP_FEATURES: usize = 6;

/// Six sub-scores in `0..=100` plus their weighted final score.
///
/// `competition_level` is stored as-is (lower is better) and only inverted
/// inside `final_score`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValidationScores {
    pub pain_intensity: i32,
    pub frequency: i32,
    pub budget_size: i32,
    pub competition_level: i32,
    pub speed_to_mvp: i32,
    pub scalability: i32,
    pub final_score: f64,
}

/// Score `idea` for a cluster with the given rollups.
#[must_use]
pub fn score(avg_urgency: f64, post_count: i32, idea: &IdeaCandidate) -> ValidationScores {
    #[allow(clippy::cast_possible_truncation)]
    let pain_intensity = (avg_urgency * 10.0).clamp(0.0, 100.0) as i32;
    let frequency = post_count.saturating_mul(8).clamp(0, 100);

    let revenue = idea.revenue_model.to_lowercase();
    let icp = idea.icp.to_lowercase();
    let description = idea.description.to_lowercase();

    let mut budget_size = 50;
    if mentions_any(&revenue, &BUDGET_REVENUE_TERMS) {
        budget_size += 20;
    }
    if mentions_any(&icp, &BUDGET_ICP_TERMS) {
        budget_size += 15;
    }

    let competition_level = if mentions_any(&description, &NOVELTY_TERMS) {
        35
    } else if mentions_any(&description, &CROWDED_TERMS) {
        60
    } else {
        50
    };

    let mut speed_to_mvp = 80;
    if idea.mvp_features.len() > MAX_LEAN_MVP_FEATURES {
        speed_to_mvp -= 20;
    }
    if idea
        .mvp_features
        .iter()
        .any(|f| f.to_lowercase().contains("integrations"))
    {
        speed_to_mvp -= 10;
    }

    let mut scalability = 65;
    if mentions_any(&revenue, &SCALABLE_REVENUE_TERMS) {
        scalability += 20;
    }
    if revenue.contains("services") {
        scalability -= 10;
    }

    let mut scores = ValidationScores {
        pain_intensity,
        frequency,
        budget_size: budget_size.clamp(0, 100),
        competition_level,
        speed_to_mvp: speed_to_mvp.clamp(0, 100),
        scalability: scalability.clamp(0, 100),
        final_score: 0.0,
    };
    scores.final_score = final_score(&scores);
    scores
}

#[must_use]
pub fn score_for_cluster(cluster: &ClusterRow, idea: &IdeaCandidate) -> ValidationScores {
    score(cluster.avg_urgency, cluster.post_count, idea)
}

fn final_score(s: &ValidationScores) -> f64 {
    let weighted = 0.25 * f64::from(s.pain_intensity)
        + 0.20 * f64::from(s.frequency)
        + 0.15 * f64::from(s.budget_size)
        + 0.10 * f64::from(100 - s.competition_level)
        + 0.15 * f64::from(s.speed_to_mvp)
        + 0.15 * f64::from(s.scalability);
    round2(weighted)
}

fn mentions_any(text: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| text.contains(term))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ideas::{fallback_ideas, IdeaType};

    fn idea(revenue: &str, icp: &str, description: &str, features: &[&str]) -> IdeaCandidate {
        IdeaCandidate {
            idea_type: IdeaType::Saas,
            idea_name: "Test".to_string(),
            description: description.to_string(),
            icp: icp.to_string(),
            revenue_model: revenue.to_string(),
            mvp_features: features.iter().map(|f| (*f).to_string()).collect(),
            pricing_estimate: String::new(),
            execution_roadmap: String::new(),
            tech_stack: String::new(),
            gtm_strategy: String::new(),
            launch_plan_30d: String::new(),
        }
    }

    #[test]
    fn workflow_dashboard_scenario() {
        let scores = score(
            8.0,
            12,
            &idea(
                "Tiered subscription + usage",
                "B2B operations teams",
                "Workflow dashboard with automation",
                &["Ingestion", "Insights", "Automation"],
            ),
        );

        assert_eq!(scores.pain_intensity, 80);
        assert_eq!(scores.frequency, 96);
        assert_eq!(scores.budget_size, 85);
        assert_eq!(scores.competition_level, 60);
        assert_eq!(scores.speed_to_mvp, 80);
        assert_eq!(scores.scalability, 85);
        assert!((scores.final_score - 80.7).abs() < 1e-9);
    }

    #[test]
    fn sub_scores_saturate() {
        let scores = score(14.0, 40, &idea("", "", "", &[]));
        assert_eq!(scores.pain_intensity, 100);
        assert_eq!(scores.frequency, 100);

        let scores = score(-1.0, -3, &idea("", "", "", &[]));
        assert_eq!(scores.pain_intensity, 0);
        assert_eq!(scores.frequency, 0);
    }

    #[test]
    fn pain_intensity_truncates() {
        assert_eq!(score(7.67, 1, &idea("", "", "", &[])).pain_intensity, 76);
    }

    #[test]
    fn novelty_beats_workflow_in_competition() {
        let scores = score(5.0, 1, &idea("", "", "A new workflow tool", &[]));
        assert_eq!(scores.competition_level, 35);
        assert_eq!(score(5.0, 1, &idea("", "", "Plain", &[])).competition_level, 50);
    }

    #[test]
    fn heavy_mvp_with_integrations_is_slower() {
        let features = ["a", "b", "c", "d", "e", "f", "Native Integrations"];
        assert_eq!(score(5.0, 1, &idea("", "", "", &features)).speed_to_mvp, 50);
    }

    #[test]
    fn services_revenue_lowers_scalability() {
        let scores = score(5.0, 1, &idea("API platform plus services", "", "", &[]));
        assert_eq!(scores.scalability, 75);
    }

    #[test]
    fn fallback_ideas_score_within_bounds() {
        for candidate in fallback_ideas("Churn") {
            let scores = score(10.0, 100, &candidate);
            assert!((0.0..=100.0).contains(&scores.final_score));
            assert_eq!(scores, score(10.0, 100, &candidate));
        }
    }
}
