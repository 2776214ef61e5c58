//! Dock arithmetic shared by the planner and the fit checks.
//!
//! A segment of length `L` holds boats `b1..bn` when `sum(b) + spacing * (n - 1) <= L`. Giving
//! every boat a footprint of `b + spacing` and every non-empty segment a room of `L + spacing`
//! turns that into a plain sum, which is what the search keys its memo on.

/// `sum + spacing * (count - 1)` for a non-empty segment, zero otherwise.
pub fn required_length(length_sum: u64, boats: u32, spacing: u32) -> u64 {
    if boats == 0 {
        return 0;
    }
    length_sum + u64::from(spacing) * u64::from(boats - 1)
}

/// Dock a boat consumes once its clearance to the next boat is counted.
pub fn footprint(boat_length: u32, spacing: u32) -> u64 {
    u64::from(boat_length) + u64::from(spacing)
}

/// Sum of footprints a segment can take. Zero-length segments take nothing.
pub fn segment_room(segment_length: u32, spacing: u32) -> u64 {
    if segment_length == 0 {
        return 0;
    }
    u64::from(segment_length) + u64::from(spacing)
}
