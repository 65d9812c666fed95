//! Audit records for persisted entity changes.
//!
//! Snapshots are taken from the stored representation, so encrypted and
//! hashed attributes never appear in plaintext in the log.

use crate::defaults::Clock;
use crate::entity::Entity;
use crate::error::ModelResult;
use crate::schemaless::SchemalessOverlay;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;
use warden_types::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Created,
    Updated,
    Deleted,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Updated => write!(f, "updated"),
            Self::Deleted => write!(f, "deleted"),
        }
    }
}

/// One audit log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: RecordId,
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    pub subject_type: String,
    pub subject_id: Option<Value>,
    /// Who caused the change, if the host knows.
    pub causer: Option<String>,
    /// Attributes as last persisted. Empty on `created`.
    pub before: Map<String, Value>,
    /// Attributes being persisted. Empty on `deleted`.
    pub after: Map<String, Value>,
}

/// Receives audit records.
pub trait AuditSink: Send + Sync {
    fn record(&self, record: AuditRecord) -> ModelResult<()>;
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, record: AuditRecord) -> ModelResult<()> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
        Ok(())
    }
}

pub struct AuditLogger {
    sink: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl AuditLogger {
    pub fn new(sink: Arc<dyn AuditSink>, clock: Arc<dyn Clock>) -> Self {
        Self { sink, clock }
    }

    /// The current stored attributes with schemaless documents decoded into
    /// structured values. A document that fails to decode is kept as stored.
    pub fn snapshot(entity: &Entity) -> Map<String, Value> {
        Self::decode_documents(entity, entity.bag().attributes())
    }

    fn decode_documents(entity: &Entity, stored: &Map<String, Value>) -> Map<String, Value> {
        let registry = &entity.schema().transforms;
        stored
            .iter()
            .map(|(name, value)| {
                let value = if registry.is_schemaless(name) {
                    SchemalessOverlay::decode(Some(value)).unwrap_or_else(|_| value.clone())
                } else {
                    value.clone()
                };
                (name.clone(), value)
            })
            .collect()
    }

    /// Builds a record for `action` and hands it to the sink. Returns `None`
    /// for entity types that are not loggable.
    pub fn log(
        &self,
        action: AuditAction,
        entity: &Entity,
        causer: Option<&str>,
    ) -> ModelResult<Option<AuditRecord>> {
        let compiled = entity.schema();
        if !compiled.loggable {
            return Ok(None);
        }

        let before = match action {
            AuditAction::Created => Map::new(),
            AuditAction::Updated | AuditAction::Deleted => {
                Self::decode_documents(entity, entity.bag().original())
            }
        };
        let after = match action {
            AuditAction::Deleted => Map::new(),
            AuditAction::Created | AuditAction::Updated => Self::snapshot(entity),
        };

        let record = AuditRecord {
            id: RecordId::ordered(),
            timestamp: self.clock.now(),
            action,
            subject_type: compiled.entity_type().to_string(),
            subject_id: entity.key().cloned(),
            causer: causer.map(str::to_string),
            before,
            after,
        };

        debug!(
            entity_type = %record.subject_type,
            action = %action,
            record_id = %record.id,
            "Audit record emitted"
        );
        self.sink.record(record.clone())?;
        Ok(Some(record))
    }
}
