//! Admin-filter policy and cross-platform dedup over a collected batch.

use std::collections::HashMap;

use radar_core::{AdminFilter, GeoScope, Platform, RawPost};

/// Location tokens a post must mention to pass an `INDIA` geo filter.
pub const INDIA_GEO_TOKENS: [&str; 7] = [
    "india",
    "indian",
    "mumbai",
    "delhi",
    "bengaluru",
    "bangalore",
    "hyderabad",
];

/// Drop posts that hit an exclude keyword, miss the geo scope, or match
/// none of the filter's industries. Matching is case-insensitive substring
/// search over `title content`.
#[must_use]
pub fn apply_manual_filters(posts: Vec<RawPost>, filter: &AdminFilter) -> Vec<RawPost> {
    let excluded: Vec<String> = lowered(&filter.exclude_keywords);
    let industries: Vec<String> = lowered(&filter.industries);

    posts
        .into_iter()
        .filter(|post| {
            let haystack = post.haystack();
            if excluded.iter().any(|kw| haystack.contains(kw.as_str())) {
                return false;
            }
            if filter.geo_scope == GeoScope::India
                && !INDIA_GEO_TOKENS.iter().any(|t| haystack.contains(t))
            {
                return false;
            }
            industries.is_empty() || industries.iter().any(|i| haystack.contains(i.as_str()))
        })
        .collect()
}

/// Collapse posts sharing `(platform, url)`. The last occurrence wins but
/// keeps the position of the first.
#[must_use]
pub fn dedupe_by_identity(posts: Vec<RawPost>) -> Vec<RawPost> {
    let mut slots: HashMap<(Platform, String), usize> = HashMap::new();
    let mut unique: Vec<RawPost> = Vec::with_capacity(posts.len());
    for post in posts {
        let key = (post.platform, post.url.clone());
        match slots.get(&key) {
            Some(&slot) => unique[slot] = post,
            None => {
                slots.insert(key, unique.len());
                unique.push(post);
            }
        }
    }
    unique
}

fn lowered(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn post(platform: Platform, url: &str, title: &str, content: &str) -> RawPost {
        RawPost {
            platform,
            title: title.to_string(),
            content: content.to_string(),
            upvotes: 0,
            comments: 0,
            url: url.to_string(),
            created_at: Utc::now(),
        }
    }

    fn filter(exclude: &[&str], geo_scope: GeoScope, industries: &[&str]) -> AdminFilter {
        AdminFilter {
            include_keywords: Vec::new(),
            exclude_keywords: exclude.iter().map(|s| (*s).to_string()).collect(),
            geo_scope,
            industries: industries.iter().map(|s| (*s).to_string()).collect(),
            updated_at: None,
        }
    }

    #[test]
    fn exclude_keywords_are_case_insensitive() {
        let posts = vec![
            post(Platform::Reddit, "u1", "Crypto payroll pain", ""),
            post(Platform::Reddit, "u2", "Payroll pain", ""),
        ];
        let kept = apply_manual_filters(posts, &filter(&["CRYPTO"], GeoScope::Global, &[]));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].url, "u2");
    }

    #[test]
    fn india_scope_requires_location_token() {
        let posts = vec![
            post(Platform::Twitter, "u1", "Churn is brutal", "our SaaS in Berlin"),
            post(Platform::Twitter, "u2", "Churn is brutal", "startups in Bengaluru"),
        ];
        let kept = apply_manual_filters(posts, &filter(&[], GeoScope::India, &[]));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].url, "u2");
    }

    #[test]
    fn industries_require_any_match() {
        let posts = vec![
            post(Platform::ProductHunt, "u1", "AI notetaker", ""),
            post(Platform::ProductHunt, "u2", "Recipe app", ""),
        ];
        let kept = apply_manual_filters(posts, &filter(&[], GeoScope::Global, &["saas", "AI"]));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].url, "u1");
    }

    #[test]
    fn dedupe_keeps_last_content_at_first_position() {
        let posts = vec![
            post(Platform::Reddit, "same", "first", "old"),
            post(Platform::Twitter, "same", "other platform", ""),
            post(Platform::Reddit, "same", "second", "new"),
        ];
        let unique = dedupe_by_identity(posts);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].title, "second");
        assert_eq!(unique[1].platform, Platform::Twitter);
    }
}
