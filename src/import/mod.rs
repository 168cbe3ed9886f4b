//! Writing one parsed report into the clearing database.
//!
//! - [`findings`] — license findings per file.
//! - [`decision`] — add/remove event planning and one decision per file.
//! - [`copyright`] — copyright blocks split into statements per file.
//!
//! [`ReportImporter`] drives them in order according to [`ImportConfig`].

pub mod copyright;
pub mod decision;
pub mod findings;

use thiserror::Error;
use tracing::warn;

use crate::config::ImportConfig;
use crate::license::{LicenseResolver, Resolution};
use crate::models::{
    ImportContext, ImportSummary, LicenseId, ReportImportData, ReportImportDataItem,
    ResolvedLicense,
};
use crate::store::{ImportStore, StoreError};

use decision::DecisionPlan;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("shortname \"{short_name}\" already in use in group {group_id}")]
    NameCollision { short_name: String, group_id: i64 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct ReportImporter<'a, S: ?Sized> {
    store: &'a mut S,
    ctx: ImportContext,
    config: &'a ImportConfig,
}

impl<'a, S> ReportImporter<'a, S>
where
    S: ImportStore + ?Sized,
{
    pub fn new(store: &'a mut S, ctx: ImportContext, config: &'a ImportConfig) -> Self {
        Self { store, ctx, config }
    }

    /// Import one report. Nothing is written when the report names no files.
    pub fn import(&mut self, data: &ReportImportData) -> Result<ImportSummary, ImportError> {
        let mut summary = ImportSummary::default();
        if data.pfiles.is_empty() {
            return Ok(summary);
        }
        summary.files = data.pfiles.len();

        if self.config.wants_licenses() {
            self.import_licenses(data, &mut summary)?;
        }

        if self.config.add_copyright_information {
            summary.copyright_statements = copyright::save_copyrights(
                &mut *self.store,
                &self.ctx,
                &data.copyright_texts,
                &data.pfiles,
            )?;
        }

        Ok(summary)
    }

    fn import_licenses(
        &mut self,
        data: &ReportImportData,
        summary: &mut ImportSummary,
    ) -> Result<(), ImportError> {
        let mut resolver = LicenseResolver::new();

        let mut in_file: Vec<LicenseId> = Vec::new();
        for item in &data.license_infos_in_file {
            if let Some(id) = self.resolve(&mut resolver, item, summary)? {
                in_file.push(id);
            }
        }

        let mut concluded: Vec<(LicenseId, String)> = Vec::new();
        for item in &data.licenses_concluded {
            if let Some(id) = self.resolve(&mut resolver, item, summary)? {
                concluded.push((id, item.custom_text.clone().unwrap_or_default()));
            }
        }

        // In-file licenses are always findings once the license path runs.
        summary.findings +=
            findings::save_findings(&mut *self.store, &self.ctx, &in_file, &data.pfiles)?;

        if self.config.create_concluded_licenses_as_findings {
            let ids: Vec<LicenseId> = concluded.iter().map(|(id, _)| *id).collect();
            summary.findings +=
                findings::save_findings(&mut *self.store, &self.ctx, &ids, &data.pfiles)?;
        }

        if self.config.create_concluded_licenses_as_conclusions {
            let plan = DecisionPlan::new(&in_file, &concluded);
            let counts = decision::save_decisions(
                &mut *self.store,
                &self.ctx,
                self.config.conclude_license_decision_type,
                &plan,
                &data.pfiles,
            )?;
            summary.add_events = counts.add_events;
            summary.remove_events = counts.remove_events;
            summary.decisions = counts.decisions;
        }

        Ok(())
    }

    fn resolve(
        &mut self,
        resolver: &mut LicenseResolver,
        item: &ReportImportDataItem,
        summary: &mut ImportSummary,
    ) -> Result<Option<LicenseId>, ImportError> {
        if item.is_no_assertion() {
            return Ok(None);
        }

        match resolver.resolve(&mut *self.store, &self.ctx, self.config, item)? {
            Resolution::Resolved { id, origin } => {
                if !summary.resolved.iter().any(|r| r.id == id) {
                    summary.resolved.push(ResolvedLicense {
                        short_name: item.license_id.clone(),
                        id,
                        origin,
                    });
                }
                Ok(Some(id))
            }
            Resolution::Unresolved => {
                warn!(
                    short_name = %item.license_id,
                    "no license found and no definition given, skipping"
                );
                if !summary.unresolved.contains(&item.license_id) {
                    summary.unresolved.push(item.license_id.clone());
                }
                Ok(None)
            }
            Resolution::Collision => Err(ImportError::NameCollision {
                short_name: item.license_id.clone(),
                group_id: self.ctx.group_id,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DecisionType, FileTarget, LicenseCandidate, LicenseOrigin};
    use crate::store::testing::RecordingStore;
    use crate::store::LicenseTaxonomy;

    fn ctx() -> ImportContext {
        ImportContext {
            agent_id: 1,
            group_id: 2,
            user_id: 3,
            job_id: 4,
        }
    }

    fn one_file() -> Vec<FileTarget> {
        vec![FileTarget { uploadtree_id: 10, pfile_id: 20 }]
    }

    fn candidate(short_name: &str) -> LicenseCandidate {
        LicenseCandidate {
            short_name: short_name.to_string(),
            full_name: String::new(),
            text: "text".to_string(),
            url: String::new(),
            spdx_compatible: false,
        }
    }

    fn seeded() -> (RecordingStore, LicenseId, LicenseId) {
        let mut store = RecordingStore::new();
        let mit = store.inner.insert_final_license("MIT", "", true).unwrap();
        let apache = store.inner.insert_final_license("Apache-2.0", "", true).unwrap();
        (store, mit, apache)
    }

    #[test]
    fn test_mit_found_apache_concluded() {
        let (mut store, mit, apache) = seeded();
        let config = ImportConfig::default();
        let data = ReportImportData {
            pfiles: one_file(),
            license_infos_in_file: vec![ReportImportDataItem::new("MIT")],
            licenses_concluded: vec![ReportImportDataItem::new("Apache-2.0").with_custom_text("note")],
            copyright_texts: vec![],
        };

        let summary = ReportImporter::new(&mut store, ctx(), &config)
            .import(&data)
            .unwrap();

        let events = store.inner.events();
        assert_eq!(events.len(), 2);
        assert_eq!((events[0].license_id, events[0].is_removal, events[0].text.as_str()), (apache, false, "note"));
        assert_eq!((events[1].license_id, events[1].is_removal), (mit, true));

        let decisions = store.inner.decisions();
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].uploadtree_id, 10);
        assert_eq!(decisions[0].event_ids, vec![events[0].id, events[1].id]);
        assert_eq!(decisions[0].decision_type, DecisionType::Identified);

        assert_eq!(summary.findings, 1);
        assert_eq!(store.inner.findings()[0].license_id, mit);
        assert_eq!(summary.add_events, 1);
        assert_eq!(summary.remove_events, 1);
        assert_eq!(summary.decisions, 1);
    }

    #[test]
    fn test_empty_pfiles_writes_nothing() {
        let mut store = RecordingStore::new();
        let config = ImportConfig {
            add_copyright_information: true,
            create_concluded_licenses_as_findings: true,
            ..ImportConfig::default()
        };
        let data = ReportImportData {
            pfiles: vec![],
            license_infos_in_file: vec![ReportImportDataItem::new("Foo").with_candidate(candidate("Foo"))],
            licenses_concluded: vec![ReportImportDataItem::new("Bar").with_candidate(candidate("Bar"))],
            copyright_texts: vec!["(c) Someone".to_string()],
        };

        let summary = ReportImporter::new(&mut store, ctx(), &config)
            .import(&data)
            .unwrap();

        assert_eq!(summary, ImportSummary::default());
        assert!(store.calls.is_empty());
        assert!(store.inner.licenses().is_empty());
    }

    #[test]
    fn test_no_assertion_is_skipped_everywhere() {
        let (mut store, mit, _) = seeded();
        let config = ImportConfig {
            create_concluded_licenses_as_findings: true,
            ..ImportConfig::default()
        };
        let data = ReportImportData {
            pfiles: one_file(),
            license_infos_in_file: vec![
                ReportImportDataItem::new("NOASSERTION"),
                ReportImportDataItem::new("MIT"),
            ],
            licenses_concluded: vec![ReportImportDataItem::new("NoAssertion").with_custom_text("x")],
            copyright_texts: vec![],
        };

        let summary = ReportImporter::new(&mut store, ctx(), &config)
            .import(&data)
            .unwrap();

        assert!(summary.unresolved.is_empty());
        assert_eq!(store.inner.findings().len(), 1);
        assert!(store.inner.events().iter().all(|e| e.license_id == mit));
        assert_eq!(store.inner.events().len(), 1);
        assert!(store.inner.events()[0].is_removal);
    }

    #[test]
    fn test_unresolved_item_is_skipped() {
        let (mut store, _, _) = seeded();
        let config = ImportConfig::default();
        let data = ReportImportData {
            pfiles: one_file(),
            license_infos_in_file: vec![ReportImportDataItem::new("LicenseRef-unknown")],
            licenses_concluded: vec![],
            copyright_texts: vec![],
        };

        let summary = ReportImporter::new(&mut store, ctx(), &config)
            .import(&data)
            .unwrap();

        assert_eq!(summary.unresolved, vec!["LicenseRef-unknown".to_string()]);
        assert_eq!(store.inner.licenses().len(), 2);
        assert!(store.inner.findings().is_empty());
        // An empty plan still yields one (empty) decision per file.
        assert!(store.inner.decisions()[0].event_ids.is_empty());
    }

    #[test]
    fn test_collision_aborts_before_any_finding() {
        let (mut store, _, _) = seeded();
        let config = ImportConfig::default();
        let data = ReportImportData {
            pfiles: one_file(),
            license_infos_in_file: vec![
                ReportImportDataItem::new("MIT"),
                ReportImportDataItem::new("mit").with_candidate(candidate("mit")),
            ],
            licenses_concluded: vec![],
            copyright_texts: vec!["(c) x".to_string()],
        };

        let err = ReportImporter::new(&mut store, ctx(), &config)
            .import(&data)
            .unwrap_err();

        assert!(matches!(err, ImportError::NameCollision { ref short_name, group_id: 2 } if short_name == "mit"));
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn test_candidate_created_once_across_both_sets() {
        let mut store = RecordingStore::new();
        let config = ImportConfig::default();
        let item = ReportImportDataItem::new("LicenseRef-foo").with_candidate(candidate("LicenseRef-foo"));
        let data = ReportImportData {
            pfiles: one_file(),
            license_infos_in_file: vec![item.clone()],
            licenses_concluded: vec![item],
            copyright_texts: vec![],
        };

        let summary = ReportImporter::new(&mut store, ctx(), &config)
            .import(&data)
            .unwrap();

        assert_eq!(store.count("insert_license"), 1);
        assert_eq!(store.count("mark_as_candidate"), 1);
        assert_eq!(store.count("insert_final_license"), 0);
        assert_eq!(summary.resolved.len(), 1);
        assert_eq!(summary.resolved[0].origin, LicenseOrigin::CreatedCandidate);
        // Found and concluded: one add event, nothing removed.
        assert_eq!((summary.add_events, summary.remove_events), (1, 0));
    }

    #[test]
    fn test_switches_gate_each_step() {
        let (mut store, _, _) = seeded();
        let config = ImportConfig {
            create_license_infos_as_findings: false,
            create_concluded_licenses_as_findings: true,
            create_concluded_licenses_as_conclusions: false,
            add_copyright_information: true,
            ..ImportConfig::default()
        };
        let data = ReportImportData {
            pfiles: vec![
                FileTarget { uploadtree_id: 1, pfile_id: 11 },
                FileTarget { uploadtree_id: 2, pfile_id: 12 },
            ],
            license_infos_in_file: vec![ReportImportDataItem::new("MIT")],
            licenses_concluded: vec![ReportImportDataItem::new("Apache-2.0")],
            copyright_texts: vec!["Foo\n\nBar\n  \nBaz".to_string()],
        };

        let summary = ReportImporter::new(&mut store, ctx(), &config)
            .import(&data)
            .unwrap();

        // MIT in-file plus Apache-2.0 concluded, on two files.
        assert_eq!(summary.findings, 4);
        assert_eq!(store.count("insert_event"), 0);
        assert_eq!(store.count("create_decision_from_events"), 0);
        assert_eq!(summary.copyright_statements, 6);
    }

    #[test]
    fn test_in_file_findings_written_when_only_conclusions_enabled() {
        let (mut store, mit, _) = seeded();
        let config = ImportConfig {
            create_license_infos_as_findings: false,
            create_concluded_licenses_as_findings: false,
            create_concluded_licenses_as_conclusions: true,
            ..ImportConfig::default()
        };
        let data = ReportImportData {
            pfiles: one_file(),
            license_infos_in_file: vec![ReportImportDataItem::new("MIT")],
            ..ReportImportData::default()
        };

        let summary = ReportImporter::new(&mut store, ctx(), &config)
            .import(&data)
            .unwrap();

        assert_eq!(summary.findings, 1);
        assert_eq!(store.inner.findings()[0].license_id, mit);
        assert_eq!(store.inner.findings()[0].pfile_id, 20);
        assert_eq!(summary.decisions, 1);
    }

    #[test]
    fn test_license_path_disabled_skips_resolution() {
        let mut store = RecordingStore::new();
        let config = ImportConfig {
            create_license_infos_as_findings: false,
            create_concluded_licenses_as_findings: false,
            create_concluded_licenses_as_conclusions: false,
            add_copyright_information: true,
            ..ImportConfig::default()
        };
        let data = ReportImportData {
            pfiles: one_file(),
            license_infos_in_file: vec![ReportImportDataItem::new("Foo").with_candidate(candidate("Foo"))],
            licenses_concluded: vec![],
            copyright_texts: vec!["(c) Jane".to_string()],
        };

        ReportImporter::new(&mut store, ctx(), &config)
            .import(&data)
            .unwrap();

        assert_eq!(store.calls, vec!["insert_copyright_statement"]);
    }

    #[test]
    fn test_store_failure_is_propagated() {
        let mut store = RecordingStore::failing_on("insert_finding", 1);
        store.inner.insert_final_license("MIT", "", true).unwrap();
        let config = ImportConfig::default();
        let data = ReportImportData {
            pfiles: one_file(),
            license_infos_in_file: vec![ReportImportDataItem::new("MIT")],
            ..ReportImportData::default()
        };

        let err = ReportImporter::new(&mut store, ctx(), &config)
            .import(&data)
            .unwrap_err();

        assert!(matches!(err, ImportError::Store(StoreError::Backend(_))));
        assert!(store.inner.decisions().is_empty());
    }
}
