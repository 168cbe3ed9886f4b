use crate::models::{FileTarget, ImportContext, LicenseId};
use crate::store::{FindingStore, StoreError};

/// Record one finding per (file, license) pair. Duplicates are written as-is.
pub fn save_findings<S>(
    store: &mut S,
    ctx: &ImportContext,
    license_ids: &[LicenseId],
    targets: &[FileTarget],
) -> Result<usize, StoreError>
where
    S: FindingStore + ?Sized,
{
    let mut written = 0;
    for target in targets {
        for &license_id in license_ids {
            store.insert_finding(license_id, ctx.agent_id, target.pfile_id)?;
            written += 1;
        }
    }
    Ok(written)
}
