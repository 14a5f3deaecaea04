//! Note pages and their classification into overview buckets.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::CoreError;
use crate::models::{PriorityLevel, Task};

/// Bucket for pages without any tags.
pub const UNTAGGED_BUCKET: &str = "zz - Overige";
/// Bucket for tagged pages no division claims.
pub const UNMATCHED_BUCKET: &str = "zz - Onbekend";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub title: String,
    /// Sorted, trimmed
    pub tags: Vec<String>,
    pub tasks: Vec<Task>,
}

impl Page {
    /// Reads `tags:` from the text between the first two `---` markers,
    /// wherever they sit in the page. Logseq `tags::` page properties on the
    /// leading lines are accepted as well; front matter wins when both exist.
    pub fn from_markdown(title: &str, content: &str) -> Self {
        let properties = content.lines().take_while(|line| line.contains("::"));
        let front_matter = content.split("---").nth(1).unwrap_or_default().lines();
        let header: Vec<&str> = properties.chain(front_matter).collect();
        let mut tags: Vec<String> = header
            .iter()
            .filter_map(|line| {
                let (key, value) = line.split_once(':')?;
                (key.trim() == "tags").then(|| value.trim_start_matches(':'))
            })
            .last()
            .map(|value| {
                value
                    .split(',')
                    .map(|tag| tag.trim().trim_start_matches('#').to_string())
                    .filter(|tag| !tag.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        tags.sort();
        Self {
            title: title.to_string(),
            tags,
            tasks: Vec::new(),
        }
    }

    pub fn with_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.tasks = tasks;
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Non-repeating tasks at `priority`; `None` counts everything below C,
    /// repeating or not.
    pub fn priority_count(&self, priority: Option<PriorityLevel>) -> usize {
        self.tasks
            .iter()
            .filter(|task| match priority {
                Some(level) => task.priority == level && !task.repeating,
                None => task.priority > PriorityLevel::C,
            })
            .count()
    }

    /// A counts 5, B 1, C 0.2, anything else nothing.
    pub fn weight(&self) -> f64 {
        self.tasks
            .iter()
            .map(|task| match task.priority {
                PriorityLevel::A => 5.0,
                PriorityLevel::B => 1.0,
                PriorityLevel::C => 0.2,
                PriorityLevel::Later | PriorityLevel::None => 0.0,
            })
            .sum()
    }
}

/// Ordered `tag,tag:Bucket|tag:Bucket` rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDivision {
    rules: Vec<(Vec<String>, String)>,
}

impl TagDivision {
    /// First bucket whose tags the page carries in full.
    pub fn bucket_for<'a>(&'a self, page: &Page) -> &'a str {
        if page.tags.is_empty() {
            return UNTAGGED_BUCKET;
        }
        self.rules
            .iter()
            .find(|(tags, _)| tags.iter().all(|tag| page.has_tag(tag)))
            .map_or(UNMATCHED_BUCKET, |(_, bucket)| bucket.as_str())
    }

    /// Groups pages by bucket; buckets sort by name, pages by weight with
    /// the heaviest first.
    pub fn classify(&self, pages: Vec<Page>) -> BTreeMap<String, Vec<Page>> {
        let mut buckets: BTreeMap<String, Vec<Page>> = BTreeMap::new();
        for page in pages {
            let bucket = self.bucket_for(&page).to_string();
            buckets.entry(bucket).or_default().push(page);
        }
        for pages in buckets.values_mut() {
            pages.sort_by(|a, b| b.weight().partial_cmp(&a.weight()).unwrap_or(Ordering::Equal));
        }
        buckets
    }
}

impl FromStr for TagDivision {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rules = s
            .split('|')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let (tags, bucket) = entry.rsplit_once(':').ok_or_else(|| {
                    CoreError::InvalidInput(format!("tag division entry '{entry}' has no bucket"))
                })?;
                let tags: Vec<String> = tags
                    .split(',')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect();
                if tags.is_empty() {
                    return Err(CoreError::InvalidInput(format!(
                        "tag division entry '{entry}' has no tags"
                    )));
                }
                Ok((tags, bucket.trim().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }
}
