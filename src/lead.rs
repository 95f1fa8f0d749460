use crate::catalog::{Catalog, StatusId};
use crate::error::{PathError, StoreError};
use crate::path::{Path, PathDetector};
use ahash::AHashMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Flat key/value blob persisted for a lead: plain and namespaced keys side by side.
pub type LeadData = AHashMap<String, serde_json::Value>;

/// A past `(status, data)` pair, recorded when a transition is committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub status_id: StatusId,
    pub data: LeadData,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    /// Effective status: the deepest status on the lead's path.
    #[serde(alias = "status")]
    pub current_status_id: StatusId,
    #[serde(default)]
    pub data: LeadData,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// The exact value handed to a `LeadStore` after a transition is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionPayload {
    pub status_id: StatusId,
    pub data: LeadData,
}

impl Lead {
    /// A fresh lead sitting on the catalog's default status.
    pub fn new(id: &str, catalog: &Catalog) -> Self {
        Self {
            id: id.to_string(),
            current_status_id: catalog.default_status().id.clone(),
            data: LeadData::new(),
            history: Vec::new(),
        }
    }

    /// The lead as it stands after `payload` has been written.
    pub fn committed(&self, payload: &TransitionPayload, at: DateTime<Utc>) -> Lead {
        let mut history = self.history.clone();
        history.push(HistoryEntry {
            status_id: self.current_status_id.clone(),
            data: self.data.clone(),
            timestamp: at,
        });
        Lead {
            id: self.id.clone(),
            current_status_id: payload.status_id.clone(),
            data: payload.data.clone(),
            history,
        }
    }

    /// The persisted path of this lead.
    ///
    /// Tries each root above the current status and keeps the first whose
    /// detected path ends on it. When the data no longer leads there, the
    /// path detected from the first root is returned.
    pub fn path(&self, catalog: &Catalog) -> Result<Path, PathError> {
        catalog.require(&self.current_status_id)?;
        let detector = PathDetector::new(catalog, &self.data);
        let roots = catalog.roots_of(&self.current_status_id);

        let mut fallback = None;
        for root in &roots {
            let path = detector.detect(root)?;
            if path.effective_status() == self.current_status_id {
                return Ok(path);
            }
            fallback.get_or_insert(path);
        }

        tracing::debug!(
            lead_id = %self.id,
            status_id = %self.current_status_id,
            "lead data does not lead to its current status"
        );
        Ok(fallback.unwrap_or_else(|| Path::root(&self.current_status_id)))
    }
}

/// Contract the caller's persistence layer honors.
///
/// A write commits status and data together or not at all. The engine never
/// calls `write` itself. Concurrent writes to one lead are last-writer-wins
/// at this layer.
pub trait LeadStore {
    fn read(&self, lead_id: &str) -> Result<Lead, StoreError>;

    fn write(&mut self, lead_id: &str, payload: &TransitionPayload) -> Result<(), StoreError>;
}

/// In-memory `LeadStore`, for tests and the CLI.
#[derive(Debug, Default)]
pub struct MemoryLeadStore {
    leads: AHashMap<String, Lead>,
    fail_next_write: Option<String>,
}

impl MemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, lead: Lead) {
        self.leads.insert(lead.id.clone(), lead);
    }

    /// Makes the next `write` fail with `message`, leaving the lead untouched.
    pub fn fail_next_write(&mut self, message: &str) {
        self.fail_next_write = Some(message.to_string());
    }

    pub fn len(&self) -> usize {
        self.leads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leads.is_empty()
    }
}

impl LeadStore for MemoryLeadStore {
    fn read(&self, lead_id: &str) -> Result<Lead, StoreError> {
        self.leads
            .get(lead_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(lead_id.to_string()))
    }

    fn write(&mut self, lead_id: &str, payload: &TransitionPayload) -> Result<(), StoreError> {
        if let Some(message) = self.fail_next_write.take() {
            return Err(StoreError::WriteFailed {
                lead_id: lead_id.to_string(),
                message,
            });
        }
        let lead = self
            .leads
            .get_mut(lead_id)
            .ok_or_else(|| StoreError::NotFound(lead_id.to_string()))?;
        *lead = lead.committed(payload, Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lead_reads_backend_shape() {
        let lead: Lead = serde_json::from_value(json!({
            "id": "lead-7",
            "status": "status-b",
            "data": { "Outcome": "Interested" }
        }))
        .unwrap();
        assert_eq!(lead.current_status_id, "status-b");
        assert_eq!(lead.data["Outcome"], json!("Interested"));
        assert!(lead.history.is_empty());
    }

    #[test]
    fn test_payload_serializes_camel_case() {
        let payload = TransitionPayload {
            status_id: "status-b".to_string(),
            data: LeadData::new(),
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({ "statusId": "status-b", "data": {} })
        );
    }
}
