use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::{ClearingEventType, DecisionScope, DecisionType, EventId, LicenseId};
use crate::store::{
    CandidateUpdate, ClearingHistory, FindingStore, LicenseTaxonomy, NewClearingEvent,
    NewDecision, StoreError,
};

/// How a license record entered the taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorType {
    Scanner,
    Imported,
    User,
}

fn default_detector() -> DetectorType {
    DetectorType::Scanner
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseRecord {
    pub id: LicenseId,
    pub short_name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub url: String,
    /// `None` for global licenses, `Some(group)` for group-scoped uploads.
    #[serde(default)]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub candidate: bool,
    #[serde(default = "default_detector")]
    pub detector: DetectorType,
    #[serde(default)]
    pub spdx_compatible: bool,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub merged: bool,
    #[serde(default)]
    pub merged_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearingEventRecord {
    pub id: EventId,
    pub uploadtree_id: i64,
    pub user_id: i64,
    pub group_id: i64,
    pub license_id: LicenseId,
    pub is_removal: bool,
    pub event_type: ClearingEventType,
    pub text: String,
    pub comment: String,
    pub job_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub id: i64,
    pub uploadtree_id: i64,
    pub user_id: i64,
    pub group_id: i64,
    pub decision_type: DecisionType,
    pub scope: DecisionScope,
    pub event_ids: Vec<EventId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindingRecord {
    pub id: i64,
    pub license_id: LicenseId,
    pub agent_id: i64,
    pub pfile_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopyrightRecord {
    pub id: i64,
    pub agent_id: i64,
    pub pfile_id: i64,
    pub content: String,
    pub hash: String,
    #[serde(rename = "type")]
    pub statement_type: String,
}

/// Append-only clearing database kept in memory and persisted as JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    licenses: Vec<LicenseRecord>,
    #[serde(default)]
    events: Vec<ClearingEventRecord>,
    #[serde(default)]
    decisions: Vec<DecisionRecord>,
    #[serde(default)]
    findings: Vec<FindingRecord>,
    #[serde(default)]
    copyrights: Vec<CopyrightRecord>,
}

impl MemoryStore {
    /// Load the database at `path`; a missing file is an empty database.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading database {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing database {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("writing database {}", path.display()))
    }

    pub fn licenses(&self) -> &[LicenseRecord] {
        &self.licenses
    }

    pub fn license(&self, id: LicenseId) -> Option<&LicenseRecord> {
        self.licenses.iter().find(|l| l.id == id)
    }

    pub fn events(&self) -> &[ClearingEventRecord] {
        &self.events
    }

    pub fn decisions(&self) -> &[DecisionRecord] {
        &self.decisions
    }

    pub fn findings(&self) -> &[FindingRecord] {
        &self.findings
    }

    pub fn copyrights(&self) -> &[CopyrightRecord] {
        &self.copyrights
    }

    fn next_license_id(&self) -> LicenseId {
        LicenseId(next_id(self.licenses.iter().map(|l| l.id.0)))
    }

    fn visible_in(record: &LicenseRecord, group_id: i64) -> bool {
        record.group_id.map_or(true, |g| g == group_id)
    }

    fn push_license(
        &mut self,
        short_name: &str,
        text: &str,
        group_id: Option<i64>,
        detector: DetectorType,
        spdx_compatible: bool,
    ) -> LicenseId {
        let id = self.next_license_id();
        self.licenses.push(LicenseRecord {
            id,
            short_name: short_name.to_string(),
            full_name: String::new(),
            text: text.to_string(),
            url: String::new(),
            group_id,
            candidate: false,
            detector,
            spdx_compatible,
            note: None,
            merged: false,
            merged_id: 0,
        });
        id
    }
}

/// Ids continue after the highest one present; loaded databases may be sparse.
fn next_id(ids: impl Iterator<Item = i64>) -> i64 {
    ids.max().unwrap_or(0) + 1
}

impl LicenseTaxonomy for MemoryStore {
    fn find_by_short_name(
        &self,
        short_name: &str,
        group_id: i64,
    ) -> Result<Option<LicenseId>, StoreError> {
        Ok(self
            .licenses
            .iter()
            .find(|l| l.short_name == short_name && Self::visible_in(l, group_id))
            .map(|l| l.id))
    }

    fn is_name_available(&self, short_name: &str, group_id: i64) -> Result<bool, StoreError> {
        Ok(!self.licenses.iter().any(|l| {
            l.short_name.eq_ignore_ascii_case(short_name) && Self::visible_in(l, group_id)
        }))
    }

    fn insert_license(
        &mut self,
        short_name: &str,
        text: &str,
        group_id: i64,
    ) -> Result<LicenseId, StoreError> {
        if !self.is_name_available(short_name, group_id)? {
            return Err(StoreError::Conflict {
                short_name: short_name.to_string(),
                group_id,
            });
        }
        Ok(self.push_license(short_name, text, Some(group_id), DetectorType::User, false))
    }

    fn mark_as_candidate(
        &mut self,
        id: LicenseId,
        update: &CandidateUpdate<'_>,
    ) -> Result<(), StoreError> {
        let record = self
            .licenses
            .iter_mut()
            .find(|l| l.id == id && l.group_id.is_some())
            .ok_or(StoreError::UnknownLicense(id))?;

        record.short_name = update.short_name.to_string();
        record.full_name = update.full_name.to_string();
        record.text = update.text.to_string();
        record.url = update.url.to_string();
        record.note = Some(update.note.to_string());
        record.merged = update.merged;
        record.merged_id = update.merged_id;
        record.candidate = true;
        Ok(())
    }

    fn insert_final_license(
        &mut self,
        short_name: &str,
        text: &str,
        spdx_compatible: bool,
    ) -> Result<LicenseId, StoreError> {
        if self
            .licenses
            .iter()
            .any(|l| l.group_id.is_none() && l.short_name.eq_ignore_ascii_case(short_name))
        {
            return Err(StoreError::Conflict {
                short_name: short_name.to_string(),
                group_id: 0,
            });
        }
        Ok(self.push_license(short_name, text, None, DetectorType::Imported, spdx_compatible))
    }
}

impl ClearingHistory for MemoryStore {
    fn insert_event(&mut self, event: &NewClearingEvent<'_>) -> Result<EventId, StoreError> {
        if self.license(event.license_id).is_none() {
            return Err(StoreError::UnknownLicense(event.license_id));
        }
        let id = EventId(next_id(self.events.iter().map(|e| e.id.0)));
        self.events.push(ClearingEventRecord {
            id,
            uploadtree_id: event.uploadtree_id,
            user_id: event.user_id,
            group_id: event.group_id,
            license_id: event.license_id,
            is_removal: event.is_removal,
            event_type: event.event_type,
            text: event.text.to_string(),
            comment: event.comment.to_string(),
            job_id: event.job_id,
        });
        Ok(id)
    }

    fn create_decision_from_events(
        &mut self,
        decision: &NewDecision<'_>,
    ) -> Result<(), StoreError> {
        let id = next_id(self.decisions.iter().map(|d| d.id));
        self.decisions.push(DecisionRecord {
            id,
            uploadtree_id: decision.uploadtree_id,
            user_id: decision.user_id,
            group_id: decision.group_id,
            decision_type: decision.decision_type,
            scope: decision.scope,
            event_ids: decision.event_ids.to_vec(),
        });
        Ok(())
    }
}

impl FindingStore for MemoryStore {
    fn insert_finding(
        &mut self,
        license_id: LicenseId,
        agent_id: i64,
        pfile_id: i64,
    ) -> Result<(), StoreError> {
        let id = next_id(self.findings.iter().map(|f| f.id));
        self.findings.push(FindingRecord {
            id,
            license_id,
            agent_id,
            pfile_id,
        });
        Ok(())
    }

    fn insert_copyright_statement(
        &mut self,
        agent_id: i64,
        pfile_id: i64,
        text: &str,
        hash: &str,
        statement_type: &str,
    ) -> Result<(), StoreError> {
        let id = next_id(self.copyrights.iter().map(|c| c.id));
        self.copyrights.push(CopyrightRecord {
            id,
            agent_id,
            pfile_id,
            content: text.to_string(),
            hash: hash.to_string(),
            statement_type: statement_type.to_string(),
        });
        Ok(())
    }
}
