//! In-memory meeting store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use minutes_core::{Error, Meeting, MeetingStore, MeetingSummary, ProjectCount, Result};

/// Default [`MeetingStore`] implementation backed by a map.
///
/// Meetings are whole-record values; `create` either inserts the complete
/// record or fails, so readers never see a partial meeting.
#[derive(Default)]
pub struct MemoryStore {
    meetings: RwLock<HashMap<Uuid, Meeting>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MeetingStore for MemoryStore {
    async fn create(&self, meeting: Meeting) -> Result<()> {
        let mut meetings = self.meetings.write().await;
        if meetings.contains_key(&meeting.id) {
            return Err(Error::Storage(format!(
                "meeting {} already exists",
                meeting.id
            )));
        }
        meetings.insert(meeting.id, meeting);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Meeting> {
        self.meetings
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(Error::MeetingNotFound(id))
    }

    async fn list(&self) -> Result<Vec<MeetingSummary>> {
        let meetings = self.meetings.read().await;
        let mut summaries: Vec<MeetingSummary> = meetings
            .values()
            .map(|m| MeetingSummary {
                id: m.id,
                title: m.title.clone(),
                project_name: m.project_name.clone(),
                created_at: m.created_at,
            })
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(summaries)
    }

    async fn list_projects(&self) -> Result<Vec<ProjectCount>> {
        let meetings = self.meetings.read().await;
        let mut counts: HashMap<String, usize> = HashMap::new();
        for meeting in meetings.values() {
            if let Some(name) = &meeting.project_name {
                *counts.entry(name.clone()).or_insert(0) += 1;
            }
        }
        let mut projects: Vec<ProjectCount> = counts
            .into_iter()
            .map(|(name, count)| ProjectCount { name, count })
            .collect();
        projects.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        Ok(projects)
    }

    async fn meeting_ids_for_project(&self, name: &str) -> Result<Vec<Uuid>> {
        let meetings = self.meetings.read().await;
        let mut ids: Vec<Uuid> = meetings
            .values()
            .filter(|m| m.project_name.as_deref() == Some(name))
            .map(|m| m.id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.meetings
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(Error::MeetingNotFound(id))
    }
}
