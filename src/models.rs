use serde::{Deserialize, Serialize};

/// Statement type stamped on every imported copyright record.
pub const COPYRIGHT_STATEMENT_TYPE: &str = "statement";

/// Reported identifier meaning "no claim"; skipped everywhere.
const NO_ASSERTION: &str = "noassertion";

/// Handle of a license record owned by the taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LicenseId(pub i64);

impl std::fmt::Display for LicenseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle of a clearing event owned by the clearing history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub i64);

/// A file the report talks about: its tree position and its physical file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTarget {
    pub uploadtree_id: i64,
    pub pfile_id: i64,
}

/// Full license definition proposed by a report for an identifier the
/// taxonomy does not know yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseCandidate {
    pub short_name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub spdx_compatible: bool,
}

/// One license mention as it appeared in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportImportDataItem {
    pub license_id: String,
    #[serde(default)]
    pub custom_text: Option<String>,
    #[serde(default)]
    pub license_candidate: Option<LicenseCandidate>,
}

impl ReportImportDataItem {
    pub fn is_no_assertion(&self) -> bool {
        self.license_id.eq_ignore_ascii_case(NO_ASSERTION)
    }
}

#[cfg(test)]
impl ReportImportDataItem {
    pub fn new(license_id: impl Into<String>) -> Self {
        Self {
            license_id: license_id.into(),
            custom_text: None,
            license_candidate: None,
        }
    }

    pub fn with_custom_text(mut self, text: impl Into<String>) -> Self {
        self.custom_text = Some(text.into());
        self
    }

    pub fn with_candidate(mut self, candidate: LicenseCandidate) -> Self {
        self.license_candidate = Some(candidate);
        self
    }
}

/// Everything the report parser extracted for one set of files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportImportData {
    #[serde(default)]
    pub pfiles: Vec<FileTarget>,
    #[serde(default)]
    pub license_infos_in_file: Vec<ReportImportDataItem>,
    #[serde(default)]
    pub licenses_concluded: Vec<ReportImportDataItem>,
    #[serde(default)]
    pub copyright_texts: Vec<String>,
}

/// Who is importing, on behalf of which group, under which job.
///
/// Built once per run and passed by reference into every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportContext {
    pub agent_id: i64,
    pub group_id: i64,
    pub user_id: i64,
    pub job_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearingEventType {
    User,
    Bulk,
    Agent,
    Import,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionScope {
    Item,
    Upload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionType {
    ToBeDiscussed,
    Irrelevant,
    Identified,
    DoNotUse,
    NonFunctional,
}

/// How a reported identifier ended up with a license identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseOrigin {
    Existing,
    CreatedCandidate,
    CreatedFinal,
}

impl std::fmt::Display for LicenseOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LicenseOrigin::Existing => write!(f, "existing"),
            LicenseOrigin::CreatedCandidate => write!(f, "candidate"),
            LicenseOrigin::CreatedFinal => write!(f, "license"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLicense {
    pub short_name: String,
    pub id: LicenseId,
    pub origin: LicenseOrigin,
}

/// Tally of one import run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub files: usize,
    pub resolved: Vec<ResolvedLicense>,
    pub unresolved: Vec<String>,
    pub findings: usize,
    pub add_events: usize,
    pub remove_events: usize,
    pub decisions: usize,
    pub copyright_statements: usize,
}

impl ImportSummary {
    pub fn created(&self) -> impl Iterator<Item = &ResolvedLicense> {
        self.resolved
            .iter()
            .filter(|r| r.origin != LicenseOrigin::Existing)
    }

    pub fn reused(&self) -> impl Iterator<Item = &ResolvedLicense> {
        self.resolved
            .iter()
            .filter(|r| r.origin == LicenseOrigin::Existing)
    }
}
