use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Fixed dock segments. Declaration order is the planner's segment order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SegmentId {
    Small,
    MainInsideSouth,
    MainInsideNorth,
    MainOutsideUpper,
    MainOutsideLower,
}

impl SegmentId {
    pub const ALL: [SegmentId; 5] = [
        SegmentId::Small,
        SegmentId::MainInsideSouth,
        SegmentId::MainInsideNorth,
        SegmentId::MainOutsideUpper,
        SegmentId::MainOutsideLower,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            SegmentId::Small => "small",
            SegmentId::MainInsideSouth => "mainInsideSouth",
            SegmentId::MainInsideNorth => "mainInsideNorth",
            SegmentId::MainOutsideUpper => "mainOutsideUpper",
            SegmentId::MainOutsideLower => "mainOutsideLower",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            SegmentId::Small => "Small Dock (Right Side)",
            SegmentId::MainInsideSouth => "South Inside",
            SegmentId::MainInsideNorth => "North Inside",
            SegmentId::MainOutsideUpper => "Main Outside (Upper)",
            SegmentId::MainOutsideLower => "Main Outside (Lower)",
        }
    }

    /// Segments whose usable length depends on where the pump-out zone starts.
    pub const fn follows_pump_out(self) -> bool {
        matches!(
            self,
            SegmentId::MainOutsideUpper | SegmentId::MainOutsideLower
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dock {
    Small,
    MainLeft,
    MainRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Left,
    Right,
}

/// One contiguous stretch of dock available for berthing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub id: SegmentId,
    pub name: &'static str,
    pub dock: Dock,
    pub orientation: Orientation,
    /// Distance from the start of the dock run to the start of this segment, in feet.
    pub offset: u32,
    /// Usable length in feet. Zero when the pump-out zone swallows the whole segment.
    pub length: u32,
}

/// Physical dimensions of one marina. Defaults describe the club's current docks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockLayoutConfig {
    pub small_length: u32,
    pub inside_south_length: u32,
    pub inside_north_length: u32,
    /// Unusable stretch between the two inside segments.
    pub inside_gap: u32,
    /// Full length of the outside run that the pump-out zone splits.
    pub outside_run_length: u32,
    pub pump_zone_width: u32,
    pub pump_start_min: u32,
    pub pump_start_max: u32,
    /// Clearance required between adjacent boats in one segment.
    pub boat_spacing: u32,
}

impl Default for DockLayoutConfig {
    fn default() -> Self {
        Self {
            small_length: 399,
            inside_south_length: 448,
            inside_north_length: 425,
            inside_gap: 157,
            outside_run_length: 1030,
            pump_zone_width: 60,
            pump_start_min: 455,
            pump_start_max: 515,
            boat_spacing: 3,
        }
    }
}

impl DockLayoutConfig {
    /// Candidate pump-out start offsets swept by the plan search.
    pub fn pump_starts(&self) -> RangeInclusive<u32> {
        self.pump_start_min..=self.pump_start_max
    }

    /// Builds the five segments for a given pump-out start.
    pub fn segments(&self, pump_start: u32) -> Vec<Segment> {
        SegmentId::ALL
            .iter()
            .map(|&id| self.segment(pump_start, id))
            .collect()
    }

    pub fn segment(&self, pump_start: u32, id: SegmentId) -> Segment {
        let pump_end = pump_start.saturating_add(self.pump_zone_width);
        let (dock, orientation, offset, length) = match id {
            SegmentId::Small => (Dock::Small, Orientation::Right, 0, self.small_length),
            SegmentId::MainInsideSouth => (
                Dock::MainLeft,
                Orientation::Left,
                0,
                self.inside_south_length,
            ),
            SegmentId::MainInsideNorth => (
                Dock::MainLeft,
                Orientation::Left,
                self.inside_south_length + self.inside_gap,
                self.inside_north_length,
            ),
            SegmentId::MainOutsideUpper => (Dock::MainRight, Orientation::Right, 0, pump_start),
            SegmentId::MainOutsideLower => (
                Dock::MainRight,
                Orientation::Right,
                pump_end,
                self.outside_run_length.saturating_sub(pump_end),
            ),
        };

        Segment {
            id,
            name: id.display_name(),
            dock,
            orientation,
            offset,
            length,
        }
    }
}
