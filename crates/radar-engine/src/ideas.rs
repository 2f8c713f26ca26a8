//! Five startup-idea candidates per cluster.

use std::sync::Arc;

use radar_db::{ClusterRow, PainRow};
use serde::Serialize;
use serde_json::Value;

use crate::completion::CompletionService;
use crate::extractor::string_list;

const SYSTEM_PROMPT: &str = "You are a startup ideation engine. Return strict JSON with key \
     `ideas` as a list of exactly 5 items. Items 1-3 must have idea_type=saas. Item 4 must have \
     idea_type=automation. Item 5 must have idea_type=enterprise. Each item must include: \
     idea_type, idea_name, description, icp, revenue_model, mvp_features (array), \
     pricing_estimate, execution_roadmap, tech_stack, gtm_strategy, launch_plan_30d.";

const MAX_PROMPT_PAINS: usize = 8;
pub const IDEAS_PER_CLUSTER: usize = 5;

/// Required type of each candidate, by position.
pub const IDEA_TYPE_ORDER: [IdeaType; IDEAS_PER_CLUSTER] = [
    IdeaType::Saas,
    IdeaType::Saas,
    IdeaType::Saas,
    IdeaType::Automation,
    IdeaType::Enterprise,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdeaType {
    Saas,
    Automation,
    Enterprise,
}

impl IdeaType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            IdeaType::Saas => "saas",
            IdeaType::Automation => "automation",
            IdeaType::Enterprise => "enterprise",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "saas" => Some(IdeaType::Saas),
            "automation" => Some(IdeaType::Automation),
            "enterprise" => Some(IdeaType::Enterprise),
            _ => None,
        }
    }
}

impl std::fmt::Display for IdeaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated idea before scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdeaCandidate {
    pub idea_type: IdeaType,
    pub idea_name: String,
    pub description: String,
    pub icp: String,
    pub revenue_model: String,
    pub mvp_features: Vec<String>,
    pub pricing_estimate: String,
    pub execution_roadmap: String,
    pub tech_stack: String,
    pub gtm_strategy: String,
    pub launch_plan_30d: String,
}

pub struct IdeaGenerator {
    completion: Arc<dyn CompletionService>,
}

impl IdeaGenerator {
    #[must_use]
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self { completion }
    }

    /// Always returns exactly five candidates typed saas, saas, saas,
    /// automation, enterprise.
    pub async fn generate_for_cluster(
        &self,
        cluster: &ClusterRow,
        pains: &[PainRow],
    ) -> Vec<IdeaCandidate> {
        let examples: Vec<String> = pains
            .iter()
            .take(MAX_PROMPT_PAINS)
            .map(|p| format!("- {}", p.pain_point))
            .collect();
        let user_prompt = format!(
            "Cluster: {}\nSummary: {}\nAverage urgency: {}\nPain examples:\n{}",
            cluster.name,
            cluster.summary,
            cluster.avg_urgency,
            examples.join("\n")
        );

        match self.completion.complete_json(SYSTEM_PROMPT, &user_prompt).await {
            Ok(parsed) => normalize_ideas(&parsed).unwrap_or_else(|| {
                tracing::warn!(cluster = %cluster.name, "malformed idea list; using templates");
                fallback_ideas(&cluster.name)
            }),
            Err(e) => {
                tracing::debug!(cluster = %cluster.name, error = %e, "idea generation fell back to templates");
                fallback_ideas(&cluster.name)
            }
        }
    }
}

/// Normalize a completion answer. `None` when it has fewer than five ideas
/// or the first five do not follow [`IDEA_TYPE_ORDER`].
#[must_use]
pub fn normalize_ideas(parsed: &Value) -> Option<Vec<IdeaCandidate>> {
    let items = parsed.get("ideas")?.as_array()?;
    if items.len() < IDEAS_PER_CLUSTER {
        return None;
    }

    items
        .iter()
        .take(IDEAS_PER_CLUSTER)
        .zip(IDEA_TYPE_ORDER)
        .map(|(raw, expected)| {
            let idea_type = match text(raw, "idea_type") {
                Some(value) => IdeaType::parse(&value.to_lowercase())?,
                None => expected,
            };
            (idea_type == expected).then(|| normalize_idea(raw, idea_type))
        })
        .collect()
}

fn normalize_idea(raw: &Value, idea_type: IdeaType) -> IdeaCandidate {
    let or = |key: &str, default: &str| text(raw, key).unwrap_or_else(|| default.to_string());

    let features: Vec<String> = raw
        .get("mvp_features")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(scalar_text).collect())
        .unwrap_or_default();

    IdeaCandidate {
        idea_type,
        idea_name: or("idea_name", "Untitled Idea"),
        description: or("description", ""),
        icp: or("icp", "SMBs"),
        revenue_model: or("revenue_model", "Subscription"),
        mvp_features: if features.is_empty() {
            string_list(&["Core workflow", "Dashboard", "Billing"])
        } else {
            features
        },
        pricing_estimate: or("pricing_estimate", "$49-$299 / month"),
        execution_roadmap: or("execution_roadmap", ""),
        tech_stack: or("tech_stack", ""),
        gtm_strategy: or("gtm_strategy", ""),
        launch_plan_30d: or("launch_plan_30d", ""),
    }
}

fn text(raw: &Value, key: &str) -> Option<String> {
    raw.get(key).and_then(scalar_text)
}

fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Template ideas named after the part of `cluster_name` before any `:`.
#[must_use]
pub fn fallback_ideas(cluster_name: &str) -> Vec<IdeaCandidate> {
    let base = cluster_name.split(':').next().unwrap_or_default().trim();
    let base = if base.is_empty() { "Ops" } else { base };
    let suffixes = [
        "Copilot",
        "Workflow Hub",
        "Insights",
        "AI Bot Factory",
        "Command Center",
    ];

    IDEA_TYPE_ORDER
        .into_iter()
        .zip(suffixes)
        .map(|(idea_type, suffix)| IdeaCandidate {
            idea_type,
            idea_name: format!("{base} {suffix}"),
            description: format!(
                "Build a {idea_type} product solving {} pain.",
                cluster_name.to_lowercase()
            ),
            icp: "Growth-stage startups and SMB operators".to_string(),
            revenue_model: "Tiered subscription + usage overages".to_string(),
            mvp_features: string_list(&[
                "Pain signal ingestion",
                "AI recommendation engine",
                "Action dashboard",
            ]),
            pricing_estimate: "$99-$799 / month".to_string(),
            execution_roadmap: "Week 1 scoping, Week 2 build core, Week 3 pilots, Week 4 ship."
                .to_string(),
            tech_stack: "Next.js, FastAPI, Postgres, OpenAI, Supabase Auth".to_string(),
            gtm_strategy: "Founder-led outbound to communities where the pain was discovered."
                .to_string(),
            launch_plan_30d: "Days 1-7 interviews; 8-15 MVP; 16-23 pilot; 24-30 paid beta."
                .to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn types(ideas: &[IdeaCandidate]) -> Vec<IdeaType> {
        ideas.iter().map(|i| i.idea_type).collect()
    }

    #[test]
    fn fallback_has_fixed_shape() {
        let ideas = fallback_ideas("Invoicing / Manual / Hours");
        assert_eq!(ideas.len(), 5);
        assert_eq!(types(&ideas), IDEA_TYPE_ORDER.to_vec());
        assert_eq!(ideas[0].idea_name, "Invoicing / Manual / Hours Copilot");
        assert_eq!(ideas[4].idea_name, "Invoicing / Manual / Hours Command Center");
        assert_eq!(
            ideas[3].description,
            "Build a automation product solving invoicing / manual / hours pain."
        );
    }

    #[test]
    fn fallback_base_stops_at_colon_and_defaults_to_ops() {
        assert_eq!(fallback_ideas("Billing: late fees")[1].idea_name, "Billing Workflow Hub");
        assert_eq!(fallback_ideas(" : x")[2].idea_name, "Ops Insights");
    }

    #[test]
    fn normalize_fills_defaults_and_truncates_to_five() {
        let mut ideas: Vec<Value> = (0..6).map(|_| json!({})).collect();
        ideas[0] = json!({
            "idea_type": "SaaS",
            "idea_name": "  LedgerBot ",
            "mvp_features": ["Sync", "  ", "Alerts"]
        });

        let normalized = normalize_ideas(&json!({ "ideas": ideas })).unwrap();

        assert_eq!(normalized.len(), 5);
        assert_eq!(types(&normalized), IDEA_TYPE_ORDER.to_vec());
        assert_eq!(normalized[0].idea_name, "LedgerBot");
        assert_eq!(normalized[0].mvp_features, vec!["Sync", "Alerts"]);
        assert_eq!(normalized[1].idea_name, "Untitled Idea");
        assert_eq!(normalized[1].icp, "SMBs");
        assert_eq!(normalized[1].revenue_model, "Subscription");
        assert_eq!(normalized[1].pricing_estimate, "$49-$299 / month");
        assert_eq!(
            normalized[1].mvp_features,
            vec!["Core workflow", "Dashboard", "Billing"]
        );
        assert_eq!(normalized[1].description, "");
    }

    #[test]
    fn normalize_rejects_short_lists() {
        let ideas: Vec<Value> = (0..4).map(|_| json!({})).collect();
        assert!(normalize_ideas(&json!({ "ideas": ideas })).is_none());
        assert!(normalize_ideas(&json!({ "ideas": "none" })).is_none());
    }

    #[test]
    fn normalize_rejects_wrong_type_distribution() {
        let mut ideas: Vec<Value> = (0..5).map(|_| json!({})).collect();
        ideas[4] = json!({ "idea_type": "saas" });
        assert!(normalize_ideas(&json!({ "ideas": ideas })).is_none());

        ideas[4] = json!({ "idea_type": "marketplace" });
        assert!(normalize_ideas(&json!({ "ideas": ideas })).is_none());
    }
}
