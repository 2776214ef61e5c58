use serde::Serialize;

use super::domain::ApplicationId;
use super::layout::Segment;
use super::planner::DockPlan;

/// Suggested berth for an admitted boat, derived from the plan's order within its segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProposedBerth {
    pub application_id: ApplicationId,
    pub member_name: String,
    pub boat_length: u32,
    pub order: usize,
    /// Feet from the start of the segment.
    pub position: u32,
    /// Feet from the start of the dock run.
    pub dock_offset: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentSlots {
    pub segment: Segment,
    pub berths: Vec<ProposedBerth>,
}

/// Lays admitted boats end to end in each segment of the plan's layout, separated by its spacing.
pub fn slot_map(plan: &DockPlan) -> Vec<SegmentSlots> {
    let layout = &plan.layout;
    layout
        .segments(plan.pump_start)
        .into_iter()
        .map(|segment| {
            let mut entries: Vec<_> = plan
                .admitted
                .iter()
                .filter_map(|entry| {
                    plan.slot_for(&entry.application_id)
                        .filter(|slot| slot.segment == segment.id)
                        .map(|slot| (slot.order, entry))
                })
                .collect();
            entries.sort_by_key(|(order, _)| *order);

            let mut position = 0;
            let berths = entries
                .into_iter()
                .map(|(order, entry)| {
                    let berth = ProposedBerth {
                        application_id: entry.application_id.clone(),
                        member_name: entry.member_name.clone(),
                        boat_length: entry.boat_length,
                        order,
                        position,
                        dock_offset: segment.offset + position,
                    };
                    position += entry.boat_length + layout.boat_spacing;
                    berth
                })
                .collect();

            SegmentSlots { segment, berths }
        })
        .collect()
}

/// Proposed berth for one application, if the plan admitted it.
pub fn proposed_berth(
    plan: &DockPlan,
    application_id: &ApplicationId,
) -> Option<(Segment, ProposedBerth)> {
    slot_map(plan).into_iter().find_map(|slots| {
        let berth = slots
            .berths
            .into_iter()
            .find(|berth| &berth.application_id == application_id)?;
        Some((slots.segment, berth))
    })
}
