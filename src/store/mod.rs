//! Contracts for the stores the importer writes into.
//!
//! - [`LicenseTaxonomy`] — lookup and creation of canonical license records.
//! - [`ClearingHistory`] — append-only clearing events and the decisions
//!   bundling them.
//! - [`FindingStore`] — license findings and copyright statements.
//!
//! [`memory::MemoryStore`] implements all three on top of a JSON database file.

pub mod memory;

use thiserror::Error;

use crate::models::{ClearingEventType, DecisionScope, DecisionType, EventId, LicenseId};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The short name is already taken in the group's scope.
    #[error("license shortname \"{short_name}\" already in use for group {group_id}")]
    Conflict { short_name: String, group_id: i64 },

    #[error("no license with id {0}")]
    UnknownLicense(LicenseId),

    #[error("store failure: {0}")]
    Backend(String),
}

/// Fields written when a freshly inserted license is turned into a candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateUpdate<'a> {
    pub short_name: &'a str,
    pub full_name: &'a str,
    pub text: &'a str,
    pub url: &'a str,
    pub note: &'a str,
    pub merged: bool,
    pub merged_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewClearingEvent<'a> {
    pub uploadtree_id: i64,
    pub user_id: i64,
    pub group_id: i64,
    pub license_id: LicenseId,
    pub is_removal: bool,
    pub event_type: ClearingEventType,
    pub text: &'a str,
    pub comment: &'a str,
    pub job_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDecision<'a> {
    pub uploadtree_id: i64,
    pub user_id: i64,
    pub group_id: i64,
    pub decision_type: DecisionType,
    pub scope: DecisionScope,
    pub event_ids: &'a [EventId],
}

pub trait LicenseTaxonomy {
    fn find_by_short_name(&self, short_name: &str, group_id: i64)
        -> Result<Option<LicenseId>, StoreError>;

    /// Whether `short_name` may be used for a new license in the group.
    ///
    /// A name can be unavailable without [`find_by_short_name`] resolving it.
    ///
    /// [`find_by_short_name`]: LicenseTaxonomy::find_by_short_name
    fn is_name_available(&self, short_name: &str, group_id: i64) -> Result<bool, StoreError>;

    fn insert_license(
        &mut self,
        short_name: &str,
        text: &str,
        group_id: i64,
    ) -> Result<LicenseId, StoreError>;

    fn mark_as_candidate(
        &mut self,
        id: LicenseId,
        update: &CandidateUpdate<'_>,
    ) -> Result<(), StoreError>;

    fn insert_final_license(
        &mut self,
        short_name: &str,
        text: &str,
        spdx_compatible: bool,
    ) -> Result<LicenseId, StoreError>;
}

pub trait ClearingHistory {
    fn insert_event(&mut self, event: &NewClearingEvent<'_>) -> Result<EventId, StoreError>;

    fn create_decision_from_events(&mut self, decision: &NewDecision<'_>)
        -> Result<(), StoreError>;
}

pub trait FindingStore {
    fn insert_finding(
        &mut self,
        license_id: LicenseId,
        agent_id: i64,
        pfile_id: i64,
    ) -> Result<(), StoreError>;

    fn insert_copyright_statement(
        &mut self,
        agent_id: i64,
        pfile_id: i64,
        text: &str,
        hash: &str,
        statement_type: &str,
    ) -> Result<(), StoreError>;
}

/// Everything the importer needs from its backing store.
pub trait ImportStore: LicenseTaxonomy + ClearingHistory + FindingStore {}

impl<T: LicenseTaxonomy + ClearingHistory + FindingStore> ImportStore for T {}
