use serde::{Deserialize, Serialize};

use crate::recco::types::{ContentKind, DropType};

fn default_difficulty() -> u8 {
    3
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolItem {
    pub id: String,
    pub tipo: ContentKind,
    #[serde(default)]
    pub estimated_minutes: Option<u32>,
    /// 1 (easiest) to 5.
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub drop_type: Option<DropType>,
}

impl PoolItem {
    pub fn new(id: impl Into<String>, tipo: ContentKind) -> Self {
        Self {
            id: id.into(),
            tipo,
            estimated_minutes: None,
            difficulty: default_difficulty(),
            topic: None,
            tags: Vec::new(),
            drop_type: None,
        }
    }

    pub fn minutes(mut self, minutes: u32) -> Self {
        self.estimated_minutes = Some(minutes);
        self
    }

    pub fn difficulty(mut self, difficulty: u8) -> Self {
        self.difficulty = difficulty.clamp(1, 5);
        self
    }

    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn drop_type(mut self, drop_type: DropType) -> Self {
        self.drop_type = Some(drop_type);
        self
    }
}

/// Proximity lookup used by the reinforcement stage.
#[derive(Debug, Clone)]
pub struct RelatedQuery<'a> {
    pub kind: ContentKind,
    pub topic: Option<&'a str>,
    pub tags: &'a [String],
    /// Restricts drops to these formats; empty means any format.
    pub drop_types: &'a [DropType],
    pub exclude_drop_types: &'a [DropType],
    pub exclude_ids: &'a [String],
    pub limit: usize,
}

/// Read-only snapshot of study content supplied by the caller.
///
/// Implementations must be cheap to query and free of interior mutation; the
/// engine shares one pool across learners evaluated in parallel.
pub trait ContentPool: Send + Sync {
    /// Resolves a `{tipo, content_id?}` request. An empty result means the
    /// reference could not be resolved.
    fn resolve(&self, kind: ContentKind, content_id: Option<&str>) -> Vec<PoolItem>;

    /// Items close to a topic/tag set, most related first.
    fn related(&self, query: &RelatedQuery<'_>) -> Vec<PoolItem>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryContentPool {
    items: Vec<PoolItem>,
}

impl InMemoryContentPool {
    pub fn new(items: Vec<PoolItem>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ContentPool for InMemoryContentPool {
    fn resolve(&self, kind: ContentKind, content_id: Option<&str>) -> Vec<PoolItem> {
        match content_id {
            Some(id) => self
                .items
                .iter()
                .find(|item| item.tipo == kind && item.id == id)
                .cloned()
                .into_iter()
                .collect(),
            None => self
                .items
                .iter()
                .filter(|item| item.tipo == kind)
                .cloned()
                .collect(),
        }
    }

    fn related(&self, query: &RelatedQuery<'_>) -> Vec<PoolItem> {
        let mut matches: Vec<(usize, &PoolItem)> = self
            .items
            .iter()
            .filter(|item| item.tipo == query.kind)
            .filter(|item| !query.exclude_ids.contains(&item.id))
            .filter(|item| match item.drop_type {
                Some(dt) => {
                    (query.drop_types.is_empty() || query.drop_types.contains(&dt))
                        && !query.exclude_drop_types.contains(&dt)
                }
                None => query.drop_types.is_empty(),
            })
            .map(|item| (proximity(item, query.topic, query.tags), item))
            .filter(|(score, _)| *score > 0)
            .collect();

        // stable: equal proximity keeps pool order after difficulty
        matches.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.difficulty.cmp(&b.1.difficulty)));

        matches
            .into_iter()
            .take(query.limit)
            .map(|(_, item)| item.clone())
            .collect()
    }
}

fn proximity(item: &PoolItem, topic: Option<&str>, tags: &[String]) -> usize {
    let topic_match = match (item.topic.as_deref(), topic) {
        (Some(a), Some(b)) if a.eq_ignore_ascii_case(b) => 2,
        _ => 0,
    };
    let shared_tags = item.tags.iter().filter(|tag| tags.contains(tag)).count();
    topic_match + shared_tags
}
