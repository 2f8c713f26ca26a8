//! Groups unclustered pains into named problem clusters.
//!
//! The similarity algorithm sits behind [`GroupingStrategy`]; naming,
//! rollups, and trend windows do not depend on which strategy is used.

mod agglomerative;
mod tfidf;

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use radar_db::{ClusterRow, DbError, NewCluster, PainRow};
use sqlx::PgConnection;
use uuid::Uuid;

pub use agglomerative::{AverageLinkage, DEFAULT_DISTANCE_THRESHOLD};
pub use tfidf::{SparseVector, TfidfVectorizer, DEFAULT_MAX_FEATURES};

use crate::error::ClusterError;

const MAX_NAME_TOKENS: usize = 3;
const FALLBACK_TOKEN: &str = "operations";
const STRIP_CHARS: &[char] = &[
    '.', ',', '!', '?', ':', ';', '(', ')', '[', ']', '{', '}', '"', '\'', '`', ' ',
];

/// Pluggable text-similarity grouping: `vectorize(texts)` then
/// `group(features)` yields one label per text.
pub trait GroupingStrategy: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ClusterError`] when the texts cannot be featurized.
    fn vectorize(&self, texts: &[String]) -> Result<Vec<SparseVector>, ClusterError>;

    fn group(&self, features: &[SparseVector]) -> Vec<usize>;
}

/// TF-IDF features grouped by average-linkage cosine distance.
#[derive(Debug, Clone, Default)]
pub struct TfidfAverageLinkage {
    pub vectorizer: TfidfVectorizer,
    pub linkage: AverageLinkage,
}

impl GroupingStrategy for TfidfAverageLinkage {
    fn vectorize(&self, texts: &[String]) -> Result<Vec<SparseVector>, ClusterError> {
        self.vectorizer.fit_transform(texts)
    }

    fn group(&self, features: &[SparseVector]) -> Vec<usize> {
        self.linkage.labels(features)
    }
}

pub struct ClusterEngine {
    strategy: Box<dyn GroupingStrategy>,
}

impl Default for ClusterEngine {
    fn default() -> Self {
        Self::new(Box::new(TfidfAverageLinkage::default()))
    }
}

impl ClusterEngine {
    #[must_use]
    pub fn new(strategy: Box<dyn GroupingStrategy>) -> Self {
        Self { strategy }
    }

    /// Partition `texts` into groups of indices, in order of each group's
    /// first member. Any strategy failure degrades to one group per text.
    #[must_use]
    pub fn build_groups(&self, texts: &[String]) -> Vec<Vec<usize>> {
        if texts.len() <= 1 {
            return (0..texts.len()).map(|i| vec![i]).collect();
        }

        let labels = match self.labels(texts) {
            Ok(labels) => labels,
            Err(e) => {
                tracing::warn!(error = %e, pains = texts.len(), "grouping failed; using singletons");
                return (0..texts.len()).map(|i| vec![i]).collect();
            }
        };

        let mut order: Vec<usize> = Vec::new();
        let mut groups: HashMap<usize, Vec<usize>> = HashMap::new();
        for (index, label) in labels.into_iter().enumerate() {
            groups
                .entry(label)
                .or_insert_with(|| {
                    order.push(label);
                    Vec::new()
                })
                .push(index);
        }
        order
            .into_iter()
            .filter_map(|label| groups.remove(&label))
            .collect()
    }

    fn labels(&self, texts: &[String]) -> Result<Vec<usize>, ClusterError> {
        let features = self.strategy.vectorize(texts)?;
        let labels = self.strategy.group(&features);
        if labels.len() == texts.len() {
            Ok(labels)
        } else {
            Err(ClusterError::LabelCountMismatch {
                expected: texts.len(),
                found: labels.len(),
            })
        }
    }

    /// Group every pain without a cluster, create one cluster per group, and
    /// assign the members. Returns the clusters created.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if any read or write fails.
    pub async fn cluster_unassigned_pains(
        &self,
        conn: &mut PgConnection,
    ) -> Result<Vec<ClusterRow>, DbError> {
        let pains = radar_db::list_unclustered_pains(&mut *conn).await?;
        if pains.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<String> = pains.iter().map(|p| p.pain_point.clone()).collect();
        let groups = self.build_groups(&texts);

        let mut created = Vec::with_capacity(groups.len());
        for group in groups {
            let members: Vec<&PainRow> = group.iter().map(|&i| &pains[i]).collect();
            let cluster = radar_db::insert_cluster(&mut *conn, &summarize_group(&members)).await?;
            let ids: Vec<Uuid> = members.iter().map(|p| p.id).collect();
            radar_db::assign_pains_to_cluster(&mut *conn, cluster.id, &ids).await?;
            tracing::debug!(cluster = %cluster.name, members = ids.len(), "created cluster");
            created.push(cluster);
        }

        Ok(created)
    }

    /// Recompute `post_count` and `avg_urgency` for every cluster.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the update fails.
    pub async fn refresh_cluster_rollups(&self, conn: &mut PgConnection) -> Result<u64, DbError> {
        radar_db::refresh_cluster_rollups(conn).await
    }

    /// Recompute 7-day and 30-day trend counts relative to `now`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the update fails.
    pub async fn refresh_cluster_trends(
        &self,
        conn: &mut PgConnection,
        now: DateTime<Utc>,
    ) -> Result<u64, DbError> {
        radar_db::refresh_cluster_trends(conn, now - Duration::days(7), now - Duration::days(30))
            .await
    }
}

fn summarize_group(members: &[&PainRow]) -> NewCluster {
    let texts: Vec<&str> = members.iter().map(|p| p.pain_point.as_str()).collect();
    let tokens = top_tokens(&texts);
    let total: i32 = members.iter().map(|p| p.urgency_score).sum();
    #[allow(clippy::cast_precision_loss)]
    let avg_urgency = f64::from(total) / members.len() as f64;

    NewCluster {
        name: cluster_name(&tokens),
        summary: format!(
            "Cluster built from {} pain signals around {} with urgency focus.",
            members.len(),
            tokens.join(", ")
        ),
        avg_urgency: round2(avg_urgency),
        post_count: i32::try_from(members.len()).unwrap_or(i32::MAX),
    }
}

/// Up to three most frequent significant tokens, ties broken by first
/// appearance. Never empty.
#[must_use]
pub fn top_tokens(texts: &[&str]) -> Vec<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for text in texts {
        for raw in text.split_whitespace() {
            if raw.chars().count() <= 3 {
                continue;
            }
            let token = raw.to_lowercase().trim_matches(STRIP_CHARS).to_string();
            if token.is_empty() || !token.is_ascii() {
                continue;
            }
            match counts.iter_mut().find(|(t, _)| *t == token) {
                Some((_, n)) => *n += 1,
                None => counts.push((token, 1)),
            }
        }
    }

    // Stable sort keeps first-appearance order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    let tokens: Vec<String> = counts
        .into_iter()
        .take(MAX_NAME_TOKENS)
        .map(|(t, _)| t)
        .collect();
    if tokens.is_empty() {
        vec![FALLBACK_TOKEN.to_string()]
    } else {
        tokens
    }
}

#[must_use]
pub fn cluster_name(tokens: &[String]) -> String {
    tokens
        .iter()
        .map(|t| title_case(t))
        .collect::<Vec<_>>()
        .join(" / ")
}

/// Uppercase every letter that follows a non-letter; lowercase the rest.
fn title_case(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    let mut boundary = true;
    for c in token.chars() {
        if c.is_alphabetic() {
            if boundary {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            boundary = false;
        } else {
            out.push(c);
            boundary = true;
        }
    }
    out
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|t| (*t).to_string()).collect()
    }

    struct FixedLabels(Vec<usize>);

    impl GroupingStrategy for FixedLabels {
        fn vectorize(&self, texts: &[String]) -> Result<Vec<SparseVector>, ClusterError> {
            Ok(vec![Vec::new(); texts.len()])
        }

        fn group(&self, _features: &[SparseVector]) -> Vec<usize> {
            self.0.clone()
        }
    }

    #[test]
    fn top_tokens_counts_and_breaks_ties_by_first_appearance() {
        let tokens = top_tokens(&[
            "Manual invoicing takes hours",
            "Invoicing errors, manual (again)!",
            "hours lost",
        ]);
        assert_eq!(tokens, vec!["manual", "invoicing", "hours"]);
    }

    #[test]
    fn top_tokens_skips_short_and_non_ascii_words() {
        assert_eq!(top_tokens(&["CRM is bad", "café naïve"]), vec!["operations"]);
    }

    #[test]
    fn length_is_checked_before_stripping() {
        // "(ai)" has four chars before stripping and keeps "ai".
        assert_eq!(top_tokens(&["(ai)"]), vec!["ai"]);
    }

    #[test]
    fn cluster_name_title_cases_tokens() {
        assert_eq!(
            cluster_name(&owned(&["payroll", "b2b", "e-mail"])),
            "Payroll / B2B / E-Mail"
        );
    }

    #[test]
    fn build_groups_orders_by_first_member() {
        let engine = ClusterEngine::new(Box::new(FixedLabels(vec![7, 3, 7, 1])));
        let groups = engine.build_groups(&owned(&["a", "b", "c", "d"]));
        assert_eq!(groups, vec![vec![0, 2], vec![1], vec![3]]);
    }

    #[test]
    fn build_groups_falls_back_on_label_mismatch() {
        let engine = ClusterEngine::new(Box::new(FixedLabels(vec![0])));
        let groups = engine.build_groups(&owned(&["a", "b"]));
        assert_eq!(groups, vec![vec![0], vec![1]]);
    }

    #[test]
    fn build_groups_falls_back_on_empty_vocabulary() {
        let engine = ClusterEngine::default();
        let groups = engine.build_groups(&owned(&["the and", "of a"]));
        assert_eq!(groups, vec![vec![0], vec![1]]);
    }

    #[test]
    fn default_engine_merges_related_pains() {
        let engine = ClusterEngine::default();
        let groups = engine.build_groups(&owned(&[
            "invoice reconciliation is manual",
            "hiring engineers takes months",
            "manual invoice reconciliation",
        ]));
        assert_eq!(groups, vec![vec![0, 2], vec![1]]);
    }

    #[test]
    fn round2_rounds_half_away_from_zero() {
        assert!((round2(7.666_666) - 7.67).abs() < f64::EPSILON);
        assert!((round2(80.7) - 80.7).abs() < f64::EPSILON);
    }
}
