use tracing::debug;

use crate::models::{
    ClearingEventType, DecisionScope, DecisionType, EventId, FileTarget, ImportContext, LicenseId,
};
use crate::store::{ClearingHistory, NewClearingEvent, NewDecision, StoreError};

/// The add/remove events that turn the in-file licenses into the concluded ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecisionPlan {
    /// Concluded licenses with their custom text, in first-seen order.
    pub add: Vec<(LicenseId, String)>,
    /// In-file licenses that were not concluded.
    pub remove: Vec<LicenseId>,
}

impl DecisionPlan {
    /// Concluded licenses win; a repeated concluded license keeps its first
    /// position and takes the later text.
    pub fn new(in_file: &[LicenseId], concluded: &[(LicenseId, String)]) -> Self {
        let mut add: Vec<(LicenseId, String)> = Vec::with_capacity(concluded.len());
        for (id, text) in concluded {
            match add.iter_mut().find(|(existing, _)| existing == id) {
                Some(entry) => entry.1 = text.clone(),
                None => add.push((*id, text.clone())),
            }
        }

        let mut remove: Vec<LicenseId> = Vec::new();
        for id in in_file {
            if !add.iter().any(|(added, _)| added == id) && !remove.contains(id) {
                remove.push(*id);
            }
        }

        DecisionPlan { add, remove }
    }
}

/// Per-run counts of what [`save_decisions`] wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecisionCounts {
    pub add_events: usize,
    pub remove_events: usize,
    pub decisions: usize,
}

/// Write the plan's events for every target and bundle them into one decision
/// per target. A failing event leaves that target without a decision.
pub fn save_decisions<S>(
    store: &mut S,
    ctx: &ImportContext,
    decision_type: DecisionType,
    plan: &DecisionPlan,
    targets: &[FileTarget],
) -> Result<DecisionCounts, StoreError>
where
    S: ClearingHistory + ?Sized,
{
    let mut counts = DecisionCounts::default();

    for target in targets {
        let mut event_ids: Vec<EventId> = Vec::with_capacity(plan.add.len() + plan.remove.len());

        for (license_id, text) in &plan.add {
            debug!(license = %license_id, uploadtree = target.uploadtree_id, "add decision");
            let event = import_event(ctx, target, *license_id, false, text.trim());
            event_ids.push(store.insert_event(&event)?);
        }
        for &license_id in &plan.remove {
            debug!(license = %license_id, uploadtree = target.uploadtree_id, "remove decision");
            let event = import_event(ctx, target, license_id, true, "");
            event_ids.push(store.insert_event(&event)?);
        }

        store.create_decision_from_events(&NewDecision {
            uploadtree_id: target.uploadtree_id,
            user_id: ctx.user_id,
            group_id: ctx.group_id,
            decision_type,
            scope: DecisionScope::Item,
            event_ids: &event_ids,
        })?;

        counts.add_events += plan.add.len();
        counts.remove_events += plan.remove.len();
        counts.decisions += 1;
    }

    Ok(counts)
}

fn import_event<'a>(
    ctx: &ImportContext,
    target: &FileTarget,
    license_id: LicenseId,
    is_removal: bool,
    text: &'a str,
) -> NewClearingEvent<'a> {
    NewClearingEvent {
        uploadtree_id: target.uploadtree_id,
        user_id: ctx.user_id,
        group_id: ctx.group_id,
        license_id,
        is_removal,
        event_type: ClearingEventType::Import,
        text,
        comment: "",
        job_id: ctx.job_id,
    }
}
