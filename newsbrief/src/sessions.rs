use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::llm::ArticleSummary;

/// Grouping bucket used when a summary lacks a country.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// One accumulated summary. Owned by the session store after creation and
/// never mutated; cleared only when the session itself goes away.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    pub id: Uuid,
    pub original_url: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Derived read-only view: one bucket per country.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryGroup {
    pub country: String,
    pub summaries: Vec<SummaryResult>,
}

/// Append-only store of summaries for a single session. The grouped view is
/// recomputed on every read; the store is bounded by session summary count,
/// so that recompute stays cheap.
#[derive(Debug, Default)]
pub struct SessionStore {
    entries: Vec<SummaryResult>,
}

impl SessionStore {
    pub fn append(&mut self, original_url: String, summary: ArticleSummary) -> SummaryResult {
        let result = SummaryResult {
            id: Uuid::new_v4(),
            original_url,
            summary: summary.summary,
            country: summary.country,
        };
        self.entries.push(result.clone());
        result
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Group by country: alphabetical buckets with the sentinel always last;
    /// within a bucket, insertion order.
    pub fn grouped(&self) -> Vec<CountryGroup> {
        let mut buckets: BTreeMap<String, Vec<SummaryResult>> = BTreeMap::new();
        for entry in &self.entries {
            let key = entry
                .country
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or(UNCATEGORIZED)
                .to_string();
            buckets.entry(key).or_default().push(entry.clone());
        }

        let sentinel = buckets.remove(UNCATEGORIZED);
        let mut groups: Vec<CountryGroup> = buckets
            .into_iter()
            .map(|(country, summaries)| CountryGroup { country, summaries })
            .collect();
        if let Some(summaries) = sentinel {
            groups.push(CountryGroup {
                country: UNCATEGORIZED.to_string(),
                summaries,
            });
        }
        groups
    }
}

/// All live session stores, keyed by the opaque session id carried in a
/// cookie. Appends are atomic; reads snapshot the grouped view.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    inner: RwLock<HashMap<Uuid, SessionStore>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn append(
        &self,
        session_id: Uuid,
        original_url: String,
        summary: ArticleSummary,
    ) -> SummaryResult {
        let mut sessions = self.inner.write().await;
        sessions
            .entry(session_id)
            .or_default()
            .append(original_url, summary)
    }

    pub async fn grouped(&self, session_id: Uuid) -> Vec<CountryGroup> {
        let sessions = self.inner.read().await;
        sessions
            .get(&session_id)
            .map(|store| store.grouped())
            .unwrap_or_default()
    }
}
