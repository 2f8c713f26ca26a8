//! Turns one stored post into a structured pain record.

use std::sync::Arc;

use radar_db::PostRow;
use serde_json::Value;

use crate::completion::CompletionService;

const SYSTEM_PROMPT: &str = "You are an analyst that extracts startup pain signals from social \
     discussions. Return strict JSON with keys: pain_point, target_user, urgency_score, \
     willingness_to_pay, existing_solutions. urgency_score and willingness_to_pay are integers 1-10.";

const NORMALIZED_PAIN_POINT_CHARS: usize = 220;
const FALLBACK_PAIN_POINT_CHARS: usize = 240;

const URGENCY_TOKENS: [&str; 5] = ["urgent", "need", "stuck", "pain", "blocked"];
const PRICING_TOKENS: [&str; 4] = ["pay", "budget", "expensive", "cost"];
const B2B_TOKENS: [&str; 3] = ["enterprise", "b2b", "client"];

/// Structured pain extracted from a post. Scores are always in `1..=10`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PainExtraction {
    pub pain_point: String,
    pub target_user: String,
    pub urgency_score: i32,
    pub willingness_to_pay: i32,
    pub existing_solutions: Vec<String>,
}

pub struct PainExtractor {
    completion: Arc<dyn CompletionService>,
}

impl PainExtractor {
    #[must_use]
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self { completion }
    }

    /// Extract a pain from `post`. Never fails: completion errors and
    /// malformed answers fall back to [`fallback_extraction`].
    pub async fn extract(&self, post: &PostRow) -> PainExtraction {
        let user_prompt = format!(
            "Platform: {}\nTitle: {}\nContent: {}\nUpvotes: {}\nComments: {}",
            post.platform, post.title, post.content, post.upvotes, post.comments
        );

        match self.completion.complete_json(SYSTEM_PROMPT, &user_prompt).await {
            Ok(parsed) => normalize_extraction(&parsed, post),
            Err(e) => {
                tracing::debug!(
                    post_id = %post.id,
                    error = %e,
                    "pain extraction fell back to heuristics"
                );
                fallback_extraction(post)
            }
        }
    }
}

/// Fill gaps in a completion answer. Missing or non-integer scores use the
/// heuristic estimate; all scores are clamped to `1..=10`.
#[must_use]
pub fn normalize_extraction(parsed: &Value, post: &PostRow) -> PainExtraction {
    let pain_point = text_field(parsed, "pain_point").unwrap_or_else(|| {
        truncate_chars(&post.title, NORMALIZED_PAIN_POINT_CHARS)
            .trim()
            .to_string()
    });
    let target_user =
        text_field(parsed, "target_user").unwrap_or_else(|| "SMB operators".to_string());

    let urgency_score = bounded_score(parsed.get("urgency_score"))
        .unwrap_or_else(|| estimate_urgency(post.upvotes, post.comments, &post.content));
    let willingness_to_pay = bounded_score(parsed.get("willingness_to_pay"))
        .unwrap_or_else(|| estimate_willingness_to_pay(&post.content));

    let existing_solutions = match parsed.get("existing_solutions") {
        Some(Value::Array(items)) => items.iter().filter_map(item_text).collect(),
        _ => string_list(&["Manual workflows", "Spreadsheets", "Generic SaaS tools"]),
    };

    PainExtraction {
        pain_point,
        target_user,
        urgency_score,
        willingness_to_pay,
        existing_solutions,
    }
}

/// Deterministic extraction used whenever the completion service is
/// unavailable or unusable.
#[must_use]
pub fn fallback_extraction(post: &PostRow) -> PainExtraction {
    PainExtraction {
        pain_point: truncate_chars(&post.title, FALLBACK_PAIN_POINT_CHARS),
        target_user: "Startup operators and growth teams".to_string(),
        urgency_score: estimate_urgency(post.upvotes, post.comments, &post.content),
        willingness_to_pay: estimate_willingness_to_pay(&post.content),
        existing_solutions: string_list(&[
            "Manual process",
            "Hiring contractors",
            "Fragmented tools",
        ]),
    }
}

/// Base 3, +2 for more than 20 upvotes, +2 for more than 10 comments, +2 if
/// the content mentions an urgency term.
#[must_use]
pub fn estimate_urgency(upvotes: i32, comments: i32, content: &str) -> i32 {
    let lowered = content.to_lowercase();
    let mut score = 3;
    if upvotes > 20 {
        score += 2;
    }
    if comments > 10 {
        score += 2;
    }
    if contains_any(&lowered, &URGENCY_TOKENS) {
        score += 2;
    }
    score.clamp(1, 10)
}

/// Base 4, +2 for pricing/budget language, +2 for B2B language.
#[must_use]
pub fn estimate_willingness_to_pay(content: &str) -> i32 {
    let lowered = content.to_lowercase();
    let mut score = 4;
    if contains_any(&lowered, &PRICING_TOKENS) {
        score += 2;
    }
    if contains_any(&lowered, &B2B_TOKENS) {
        score += 2;
    }
    score.clamp(1, 10)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Integers, integral floats, and numeric strings are accepted; anything
/// else is treated as missing.
#[allow(clippy::cast_possible_truncation)]
fn bounded_score(value: Option<&Value>) -> Option<i32> {
    let raw = match value? {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|f| f.trunc() as i64))?,
        Value::String(text) => text.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    Some(raw.clamp(1, 10) as i32)
}

fn text_field(parsed: &Value, key: &str) -> Option<String> {
    parsed.get(key).and_then(item_text)
}

fn item_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

pub(crate) fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

pub(crate) fn string_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| (*item).to_string()).collect()
}
