use pipecore::{RunId, RunRecord};
use tokio::sync::RwLock;

/// Append-only store of finished run records.
///
/// No mutation or deletion API: history is the audit trail for the
/// lifetime of the process. Persistence beyond that is an external
/// collaborator's concern.
pub struct RunHistory {
    records: RwLock<Vec<RunRecord>>,
}

impl RunHistory {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    pub async fn append(&self, record: RunRecord) {
        let mut records = self.records.write().await;
        records.push(record);
    }

    /// All records, newest first
    pub async fn list(&self) -> Vec<RunRecord> {
        let records = self.records.read().await;
        let mut listed = records.clone();
        listed.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        listed
    }

    pub async fn get(&self, id: RunId) -> Option<RunRecord> {
        let records = self.records.read().await;
        records.iter().find(|r| r.id == id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for RunHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use pipecore::RunStatus;
    use uuid::Uuid;

    fn record_at(offset_secs: i64) -> RunRecord {
        RunRecord {
            id: Uuid::new_v4(),
            workflow_id: Uuid::new_v4(),
            timestamp: Utc::now() + Duration::seconds(offset_secs),
            status: RunStatus::Success,
            duration_ms: 5,
            logs: Vec::new(),
        }
    }

    #[tokio::test]
    async fn list_orders_newest_first() {
        let history = RunHistory::new();
        let old = record_at(-60);
        let new = record_at(0);
        let old_id = old.id;
        let new_id = new.id;
        history.append(old).await;
        history.append(new).await;

        let listed = history.list().await;
        assert_eq!(listed[0].id, new_id);
        assert_eq!(listed[1].id, old_id);
    }

    #[tokio::test]
    async fn get_finds_by_id() {
        let history = RunHistory::new();
        let record = record_at(0);
        let id = record.id;
        history.append(record).await;

        assert!(history.get(id).await.is_some());
        assert!(history.get(Uuid::new_v4()).await.is_none());
    }
}
