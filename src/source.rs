//! Session data source and change feed
//!
//! The hosted `sessions` table is reached only through these seams:
//! - [`SessionSource`]: one-shot queries returning validated sessions
//! - [`ChangeFeed`]: row-level insert/update/delete notifications
//!
//! [`MemorySource`] is an in-process implementation used by the CLI and tests;
//! it applies change events to its own copy of the table.

use crate::error::AnalyticsError;
use crate::query::SessionQuery;
use crate::schema::SessionRecord;
use crate::types::Session;
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use tracing::{debug, warn};

/// Anything that can answer a session query
pub trait SessionSource {
    fn fetch(&self, query: &SessionQuery) -> Result<Vec<Session>, AnalyticsError>;
}

/// Row-level change type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// Primary key of a changed row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordKey {
    pub session_id: String,
}

/// Change notification for the `sessions` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    #[serde(rename = "eventType")]
    pub kind: ChangeKind,
    /// Row after the change (insert, update)
    #[serde(default)]
    pub new: Option<SessionRecord>,
    /// Key of the row before the change (update, delete)
    #[serde(default)]
    pub old: Option<RecordKey>,
}

impl ChangeEvent {
    pub fn insert(record: SessionRecord) -> Self {
        Self {
            kind: ChangeKind::Insert,
            new: Some(record),
            old: None,
        }
    }

    pub fn update(record: SessionRecord) -> Self {
        let old = Some(RecordKey {
            session_id: record.session_id.clone(),
        });
        Self {
            kind: ChangeKind::Update,
            new: Some(record),
            old,
        }
    }

    pub fn delete(session_id: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Delete,
            new: None,
            old: Some(RecordKey {
                session_id: session_id.into(),
            }),
        }
    }

    /// Id of the affected row
    pub fn session_id(&self) -> Option<&str> {
        self.old
            .as_ref()
            .map(|k| k.session_id.as_str())
            .or_else(|| self.new.as_ref().map(|r| r.session_id.as_str()))
    }
}

/// Source of change notifications
pub trait ChangeFeed {
    /// Next event, `None` once the feed is closed
    fn next_event(&mut self) -> Option<Result<ChangeEvent, AnalyticsError>>;
}

/// Change feed reading one JSON event per line
pub struct NdjsonFeed<R: BufRead> {
    reader: R,
    line_num: usize,
}

impl<R: BufRead> NdjsonFeed<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, line_num: 0 }
    }
}

impl<R: BufRead> ChangeFeed for NdjsonFeed<R> {
    fn next_event(&mut self) -> Option<Result<ChangeEvent, AnalyticsError>> {
        let mut line = String::new();
        loop {
            line.clear();
            self.line_num += 1;
            match self.reader.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    return Some(serde_json::from_str(trimmed).map_err(|e| {
                        AnalyticsError::ParseError(format!(
                            "Failed to parse change event on line {}: {}",
                            self.line_num, e
                        ))
                    }));
                }
                Err(e) => return Some(Err(AnalyticsError::SourceError(e.to_string()))),
            }
        }
    }
}

/// In-memory `sessions` table
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    sessions: Vec<Session>,
}

impl MemorySource {
    pub fn new(sessions: Vec<Session>) -> Self {
        Self { sessions }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Apply a change notification to the table.
    ///
    /// Inserts of an existing id and updates of a missing id are treated as
    /// upserts. Deleting a missing id is a no-op.
    pub fn apply(&mut self, event: &ChangeEvent) -> Result<(), AnalyticsError> {
        match event.kind {
            ChangeKind::Insert | ChangeKind::Update => {
                let record = event.new.clone().ok_or_else(|| {
                    AnalyticsError::MissingField(format!("{:?} event without new row", event.kind))
                })?;
                let session = record.into_session()?;
                self.upsert(session, event.old.as_ref());
            }
            ChangeKind::Delete => {
                let session_id = event.session_id().ok_or_else(|| {
                    AnalyticsError::MissingField("Delete event without row key".to_string())
                })?;
                let before = self.sessions.len();
                self.sessions.retain(|s| s.session_id != session_id);
                if self.sessions.len() == before {
                    debug!(%session_id, "delete for unknown session ignored");
                }
            }
        }
        Ok(())
    }

    fn upsert(&mut self, session: Session, old: Option<&RecordKey>) {
        let key = old
            .map(|k| k.session_id.as_str())
            .unwrap_or(session.session_id.as_str())
            .to_string();

        if key != session.session_id {
            let before = self.sessions.len();
            self.sessions.retain(|s| s.session_id != session.session_id);
            if self.sessions.len() != before {
                warn!(from = %key, to = %session.session_id, "rekey replaced an existing session");
            }
        }

        match self.sessions.iter_mut().find(|s| s.session_id == key) {
            Some(existing) => *existing = session,
            None => {
                if old.is_some() {
                    warn!(session_id = %key, "update for unknown session, inserting");
                }
                self.sessions.push(session);
            }
        }
    }
}

impl SessionSource for MemorySource {
    fn fetch(&self, query: &SessionQuery) -> Result<Vec<Session>, AnalyticsError> {
        Ok(query.apply(&self.sessions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn record(id: &str, stress: f64) -> SessionRecord {
        SessionRecord {
            session_id: id.to_string(),
            user_id: "u1".to_string(),
            timestamp: Some("2024-01-15T09:00:00Z".parse().unwrap()),
            stress_score: Some(stress),
            ..Default::default()
        }
    }

    #[test]
    fn test_insert_update_delete() {
        let mut source = MemorySource::default();

        source.apply(&ChangeEvent::insert(record("a", 0.4))).unwrap();
        source.apply(&ChangeEvent::insert(record("b", 0.6))).unwrap();
        assert_eq!(source.len(), 2);

        source.apply(&ChangeEvent::update(record("a", 0.9))).unwrap();
        let all = source.fetch(&SessionQuery::all()).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].stress_score, 0.9);

        source.apply(&ChangeEvent::delete("b")).unwrap();
        assert_eq!(source.len(), 1);

        source.apply(&ChangeEvent::delete("missing")).unwrap();
        assert_eq!(source.len(), 1);
    }

    #[test]
    fn test_rekey_onto_existing_id_keeps_one_row() {
        let mut source = MemorySource::default();
        source.apply(&ChangeEvent::insert(record("a", 0.4))).unwrap();
        source.apply(&ChangeEvent::insert(record("b", 0.6))).unwrap();

        let rekey = ChangeEvent {
            kind: ChangeKind::Update,
            new: Some(record("b", 0.8)),
            old: Some(RecordKey {
                session_id: "a".to_string(),
            }),
        };
        source.apply(&rekey).unwrap();

        let all = source.fetch(&SessionQuery::all()).unwrap();
        let ids: Vec<&str> = all.iter().map(|s| s.session_id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
        assert_eq!(all[0].stress_score, 0.8);
    }

    #[test]
    fn test_invalid_insert_rejected() {
        let mut source = MemorySource::default();
        let mut bad = record("a", 0.4);
        bad.stress_score = None;

        let err = source.apply(&ChangeEvent::insert(bad)).unwrap_err();
        assert!(matches!(err, AnalyticsError::Validation(_)));
        assert!(source.is_empty());
    }

    #[test]
    fn test_ndjson_feed() {
        let input = concat!(
            r#"{"eventType":"INSERT","new":{"session_id":"a","user_id":"u","timestamp":"2024-01-15T09:00:00Z","stress_score":0.5}}"#,
            "\n\n",
            r#"{"eventType":"DELETE","old":{"session_id":"a"}}"#,
            "\n",
            "garbage\n"
        );
        let mut feed = NdjsonFeed::new(Cursor::new(input));

        let first = feed.next_event().unwrap().unwrap();
        assert_eq!(first.kind, ChangeKind::Insert);
        assert_eq!(first.session_id(), Some("a"));

        let second = feed.next_event().unwrap().unwrap();
        assert_eq!(second.kind, ChangeKind::Delete);

        let third = feed.next_event().unwrap();
        assert!(third.unwrap_err().to_string().contains("line 4"));

        assert!(feed.next_event().is_none());
    }
}
