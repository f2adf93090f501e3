//! Stateless filtering, search, and pagination over a store snapshot.
//!
//! Everything here is a pure function of the slice it is handed; the store
//! decides when to take the snapshot. Nothing in this module mutates the
//! collection.

use crate::store::Blog;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which entries qualify with respect to the `enabled` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    /// Only enabled entries (the visitor-facing default).
    #[default]
    Enabled,
    /// Only disabled entries.
    Disabled,
    /// No filtering on the flag.
    All,
}

/// Filter parameters for [`filter_blogs`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogFilter {
    /// Case-insensitive substring matched against name OR url. Absent or
    /// empty means no text filter.
    #[serde(default)]
    pub search: Option<String>,
    /// An entry qualifies only if it carries every listed tag
    /// (intersection, not union).
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub status: StatusFilter,
    /// Entries to drop from the front of the filtered list.
    #[serde(default)]
    pub offset: Option<usize>,
    /// Entries to keep after the offset; absent or non-positive means
    /// unlimited.
    #[serde(default)]
    pub size: Option<i64>,
}

/// One page of filtered results.
///
/// `total` counts the filtered set before offset/size were applied, so
/// callers can build pagination without a second query.
#[derive(Debug, Clone, Serialize)]
pub struct BlogPage {
    pub total: usize,
    pub blogs: Vec<Blog>,
}

/// Filter by status, then search, then tag intersection, then paginate.
///
/// The order is load-bearing: `total` is taken after the three filters and
/// before offset/size.
pub fn filter_blogs(blogs: &[Blog], filter: &BlogFilter) -> BlogPage {
    let search = filter
        .search
        .as_deref()
        .map(|s| s.to_lowercase())
        .filter(|s| !s.is_empty());

    let mut ret: Vec<&Blog> = blogs
        .iter()
        .filter(|b| match filter.status {
            StatusFilter::Enabled => b.enabled,
            StatusFilter::Disabled => !b.enabled,
            StatusFilter::All => true,
        })
        .filter(|b| match &search {
            Some(needle) => {
                b.name.to_lowercase().contains(needle) || b.url.to_lowercase().contains(needle)
            }
            None => true,
        })
        .filter(|b| match &filter.tags {
            Some(tags) if !tags.is_empty() => tags.iter().all(|t| b.tags.contains(t)),
            _ => true,
        })
        .collect();

    let total = ret.len();

    if let Some(offset) = filter.offset {
        ret = ret.into_iter().skip(offset).collect();
    }
    if let Some(size) = filter.size {
        if size > 0 {
            ret.truncate(size as usize);
        }
    }

    BlogPage {
        total,
        blogs: ret.into_iter().cloned().collect(),
    }
}

/// Occurrence counts across the tags of the given entries.
///
/// The caller picks the slice; [`get_tags_with_count`] hands over the
/// enabled entries only, so registered-but-unused tags never show up and no
/// zero counts are synthesized.
///
/// [`get_tags_with_count`]: crate::store::BlogStore::get_tags_with_count
pub fn count_tags(blogs: &[Blog]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for blog in blogs {
        for tag in &blog.tags {
            *counts.entry(tag.clone()).or_insert(0) += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blog(id: &str, name: &str, url: &str, tags: &[&str], enabled: bool) -> Blog {
        Blog {
            id: id.to_string(),
            name: name.to_string(),
            url: url.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            enabled,
            join_time: 0,
            update_time: 0,
        }
    }

    fn sample() -> Vec<Blog> {
        vec![
            blog("1", "Rusty Corner", "https://rusty.example.com", &["rust", "systems"], true),
            blog("2", "Web Things", "https://web.example.com", &["web"], true),
            blog("3", "Hidden Gem", "https://gem.example.com/RUST", &["rust"], false),
            blog("4", "Mixed Bag", "https://mixed.example.com", &["rust", "web"], true),
        ]
    }

    #[test]
    fn default_filter_returns_enabled_only() {
        let page = filter_blogs(&sample(), &BlogFilter::default());
        assert_eq!(page.total, 3);
        assert!(page.blogs.iter().all(|b| b.enabled));
    }

    #[test]
    fn disabled_only_and_all_statuses() {
        let disabled = filter_blogs(
            &sample(),
            &BlogFilter {
                status: StatusFilter::Disabled,
                ..BlogFilter::default()
            },
        );
        assert_eq!(disabled.total, 1);
        assert_eq!(disabled.blogs[0].id, "3");

        let all = filter_blogs(
            &sample(),
            &BlogFilter {
                status: StatusFilter::All,
                ..BlogFilter::default()
            },
        );
        assert_eq!(all.total, 4);
    }

    #[test]
    fn search_is_case_insensitive_and_matches_name_or_url() {
        let page = filter_blogs(
            &sample(),
            &BlogFilter {
                search: Some("RUSTY".to_string()),
                ..BlogFilter::default()
            },
        );
        assert_eq!(page.total, 1);
        assert_eq!(page.blogs[0].id, "1");

        // Matches the url of the disabled entry once status allows it.
        let page = filter_blogs(
            &sample(),
            &BlogFilter {
                search: Some("rust".to_string()),
                status: StatusFilter::All,
                ..BlogFilter::default()
            },
        );
        assert_eq!(page.total, 2);
    }

    #[test]
    fn empty_search_means_no_text_filter() {
        let page = filter_blogs(
            &sample(),
            &BlogFilter {
                search: Some(String::new()),
                ..BlogFilter::default()
            },
        );
        assert_eq!(page.total, 3);
    }

    #[test]
    fn tag_filter_is_an_intersection() {
        let page = filter_blogs(
            &sample(),
            &BlogFilter {
                tags: Some(vec!["rust".to_string(), "web".to_string()]),
                ..BlogFilter::default()
            },
        );
        assert_eq!(page.total, 1);
        assert_eq!(page.blogs[0].id, "4");
    }

    #[test]
    fn filters_compose_and_total_precedes_pagination() {
        let page = filter_blogs(
            &sample(),
            &BlogFilter {
                search: Some("e".to_string()),
                tags: Some(vec!["rust".to_string()]),
                offset: Some(1),
                size: Some(5),
                ..BlogFilter::default()
            },
        );
        // Enabled entries matching "e" with tag "rust": ids 1 and 4.
        assert_eq!(page.total, 2);
        assert_eq!(page.blogs.len(), 1);
        assert_eq!(page.blogs[0].id, "4");
    }

    #[test]
    fn pagination_windows_the_filtered_set() {
        let blogs: Vec<Blog> = (0..10)
            .map(|i| {
                blog(
                    &i.to_string(),
                    &format!("blog {}", i),
                    "https://example.com",
                    &[],
                    true,
                )
            })
            .collect();

        let page = filter_blogs(
            &blogs,
            &BlogFilter {
                offset: Some(2),
                size: Some(3),
                ..BlogFilter::default()
            },
        );
        assert_eq!(page.total, 10);
        let ids: Vec<&str> = page.blogs.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3", "4"]);
    }

    #[test]
    fn negative_or_zero_size_means_unlimited() {
        let blogs = sample();
        for size in [-1, 0] {
            let page = filter_blogs(
                &blogs,
                &BlogFilter {
                    size: Some(size),
                    ..BlogFilter::default()
                },
            );
            assert_eq!(page.blogs.len(), page.total);
        }
    }

    #[test]
    fn offset_past_the_end_yields_an_empty_page() {
        let page = filter_blogs(
            &sample(),
            &BlogFilter {
                offset: Some(100),
                ..BlogFilter::default()
            },
        );
        assert_eq!(page.total, 3);
        assert!(page.blogs.is_empty());
    }

    #[test]
    fn count_tags_counts_occurrences() {
        let counts = count_tags(&sample());
        // Raw counting over whatever slice it is given, disabled included.
        assert_eq!(counts.get("rust"), Some(&3));
        assert_eq!(counts.get("web"), Some(&2));
        assert_eq!(counts.get("systems"), Some(&1));
        assert_eq!(counts.get("absent"), None);
    }
}
