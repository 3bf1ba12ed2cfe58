//! One-shot session queries
//!
//! A [`SessionQuery`] mirrors what the hosted table API offers: equality
//! filters, not-null filters, ordering by timestamp and a row limit. A
//! free-text search over ids backs the sessions table view.

use crate::types::Session;
use serde::{Deserialize, Serialize};

/// Timestamp ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Filter, order and limit applied to a session collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionQuery {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub intervention: Option<String>,
    #[serde(default)]
    pub require_intervention: bool,
    #[serde(default)]
    pub require_effectiveness: bool,
    /// Case-insensitive substring match against `user_id` or `session_id`
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub order: Option<SortOrder>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl SessionQuery {
    /// Query matching every session
    pub fn all() -> Self {
        Self::default()
    }

    pub fn user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn intervention(mut self, intervention: impl Into<String>) -> Self {
        self.intervention = Some(intervention.into());
        self
    }

    pub fn with_intervention(mut self) -> Self {
        self.require_intervention = true;
        self
    }

    pub fn with_effectiveness(mut self) -> Self {
        self.require_effectiveness = true;
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = Some(order);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a single session passes every filter
    pub fn matches(&self, session: &Session) -> bool {
        if let Some(user_id) = &self.user_id {
            if &session.user_id != user_id {
                return false;
            }
        }
        if let Some(language) = &self.language {
            if session.language.as_ref() != Some(language) {
                return false;
            }
        }
        if let Some(intervention) = &self.intervention {
            if session.intervention.as_ref() != Some(intervention) {
                return false;
            }
        }
        if self.require_intervention && session.intervention.is_none() {
            return false;
        }
        if self.require_effectiveness && session.effectiveness.is_none() {
            return false;
        }
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            if !session.user_id.to_lowercase().contains(&term)
                && !session.session_id.to_lowercase().contains(&term)
            {
                return false;
            }
        }
        true
    }

    /// Apply filters, ordering and limit.
    ///
    /// Ordering is stable: sessions with equal timestamps keep input order.
    pub fn apply(&self, sessions: &[Session]) -> Vec<Session> {
        let mut result: Vec<Session> = sessions.iter().filter(|s| self.matches(s)).cloned().collect();

        match self.order {
            Some(SortOrder::Ascending) => result.sort_by_key(|s| s.timestamp),
            Some(SortOrder::Descending) => result.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
            None => {}
        }

        if let Some(limit) = self.limit {
            result.truncate(limit);
        }

        result
    }
}

/// Rows of the sessions table: newest first, optionally searched and
/// filtered to one language, at most `limit` rows
pub fn sessions_table(
    sessions: &[Session],
    search: Option<&str>,
    language: Option<&str>,
    limit: usize,
) -> Vec<Session> {
    let mut query = SessionQuery::all().order(SortOrder::Descending).limit(limit);
    if let Some(term) = search.filter(|t| !t.is_empty()) {
        query = query.search(term);
    }
    if let Some(language) = language {
        query = query.language(language);
    }
    query.apply(sessions)
}
