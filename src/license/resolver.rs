use std::collections::HashMap;

use tracing::info;

use crate::config::ImportConfig;
use crate::models::{
    ImportContext, LicenseCandidate, LicenseId, LicenseOrigin, ReportImportDataItem,
};
use crate::store::{CandidateUpdate, LicenseTaxonomy, StoreError};

/// Outcome of resolving one reported identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Resolved { id: LicenseId, origin: LicenseOrigin },
    /// Unknown to the taxonomy and no definition was supplied; skip the item.
    Unresolved,
    /// The short name is reserved in the group but cannot be used.
    Collision,
}

/// Resolves identifiers for a single import run.
///
/// Identities are cached per `(short name, group)` so an identifier reported
/// both in-file and as concluded is created at most once.
#[derive(Debug, Default)]
pub struct LicenseResolver {
    cache: HashMap<(String, i64), (LicenseId, LicenseOrigin)>,
}

impl LicenseResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve<S>(
        &mut self,
        store: &mut S,
        ctx: &ImportContext,
        config: &ImportConfig,
        item: &ReportImportDataItem,
    ) -> Result<Resolution, StoreError>
    where
        S: LicenseTaxonomy + ?Sized,
    {
        if item.is_no_assertion() {
            return Ok(Resolution::Unresolved);
        }

        let key = (item.license_id.clone(), ctx.group_id);
        if let Some(&(id, origin)) = self.cache.get(&key) {
            return Ok(Resolution::Resolved { id, origin });
        }

        let resolution = resolve_uncached(store, ctx, config, item)?;
        if let Resolution::Resolved { id, origin } = resolution {
            self.cache.insert(key, (id, origin));
        }
        Ok(resolution)
    }
}

fn resolve_uncached<S>(
    store: &mut S,
    ctx: &ImportContext,
    config: &ImportConfig,
    item: &ReportImportDataItem,
) -> Result<Resolution, StoreError>
where
    S: LicenseTaxonomy + ?Sized,
{
    let short_name = item.license_id.as_str();

    if let Some(id) = store.find_by_short_name(short_name, ctx.group_id)? {
        return Ok(Resolution::Resolved {
            id,
            origin: LicenseOrigin::Existing,
        });
    }

    if !store.is_name_available(short_name, ctx.group_id)? {
        return Ok(Resolution::Collision);
    }

    let Some(candidate) = item.license_candidate.as_ref() else {
        return Ok(Resolution::Unresolved);
    };

    let created = if config.create_licenses_as_candidate {
        info!(short_name = %short_name, "no license found, creating it as license candidate");
        create_candidate(store, ctx, short_name, candidate)
            .map(|id| (id, LicenseOrigin::CreatedCandidate))
    } else {
        info!(short_name = %short_name, "no license found, creating it as license");
        store
            .insert_final_license(
                &candidate.short_name,
                candidate.text.trim(),
                candidate.spdx_compatible,
            )
            .map(|id| (id, LicenseOrigin::CreatedFinal))
    };

    match created {
        Ok((id, origin)) => Ok(Resolution::Resolved { id, origin }),
        // Lost a race against a concurrent import of the same name.
        Err(StoreError::Conflict { .. }) => Ok(Resolution::Collision),
        Err(e) => Err(e),
    }
}

fn create_candidate<S>(
    store: &mut S,
    ctx: &ImportContext,
    short_name: &str,
    candidate: &LicenseCandidate,
) -> Result<LicenseId, StoreError>
where
    S: LicenseTaxonomy + ?Sized,
{
    let id = store.insert_license(short_name, &candidate.text, ctx.group_id)?;
    let note = format!("Created for ReportImport with jobId=[{}]", ctx.job_id);
    store.mark_as_candidate(
        id,
        &CandidateUpdate {
            short_name: &candidate.short_name,
            full_name: &candidate.full_name,
            text: &candidate.text,
            url: &candidate.url,
            note: &note,
            merged: false,
            merged_id: 0,
        },
    )?;
    Ok(id)
}
