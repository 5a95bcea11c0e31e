//! Unit occupancy resolver.
//!
//! [`OccupancyMap::resolve`] walks the rack's devices in order and assigns
//! every unit `U1..Uheight` either to exactly one device or to nothing.  Each
//! occupied unit carries span metadata so the view builder can merge a
//! multi-unit device into a single block.
//!
//! # Anchor and position (for beginners)
//!
//! Spans grow upward from `start_unit`, and elevations are drawn from the top
//! of the rack down.  The **anchor** of a device is therefore its topmost unit:
//! it is the first row of the device a reader sees, and it is where the label
//! goes.  `position_within_span` counts from 0 at the anchor down to the
//! bottom unit, which is flagged `is_last_unit`.
//!
//! ```text
//!   U7  ┌────────────┐  anchor       position 0  is_first_unit
//!   U6  │  db-01 3U  │               position 1
//!   U5  └────────────┘               position 2  is_last_unit
//! ```
//!
//! # Partial and contested spans
//!
//! The resolver is total: it never fails, whatever the device list looks like.
//!
//! - Units outside `[1, height]` are dropped and an [`OccupancyIssue::Clipped`]
//!   is recorded.  The in-range remainder is still placed.
//! - If any in-range unit of a device is already owned by an earlier device,
//!   the later device is refused as a whole: none of its units are assigned
//!   and an [`OccupancyIssue::Overlap`] is recorded.  The earlier claim always
//!   stands, so the result does not depend on how contested units interleave.

use std::ops::RangeInclusive;

use serde::Serialize;
use tracing::{debug, warn};

use super::rack::{Device, DeviceId, Rack};

/// Span metadata for one occupied unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupancyEntry<'r> {
    /// The device owning the unit.
    pub device: &'r Device,
    /// `true` for exactly one unit per placed device: its topmost in-range unit.
    pub is_first_unit: bool,
    /// `true` for the bottommost in-range unit of the device.
    pub is_last_unit: bool,
    /// Distance from the anchor, 0 at the anchor.
    pub position_within_span: u32,
    /// The device's declared `unit_span`.
    pub total_span: u32,
}

/// A problem found while resolving occupancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OccupancyIssue {
    /// Part (or all) of the device's span lies outside the rack.
    Clipped {
        device: DeviceId,
        dropped_units: u32,
    },
    /// The device was refused because earlier devices already hold `units`.
    Overlap {
        device: DeviceId,
        units: Vec<u32>,
        holders: Vec<DeviceId>,
    },
}

impl OccupancyIssue {
    /// The device the issue is about.
    pub fn device(&self) -> DeviceId {
        match self {
            OccupancyIssue::Clipped { device, .. } | OccupancyIssue::Overlap { device, .. } => {
                *device
            }
        }
    }
}

/// Per-unit assignment of devices for one rack snapshot.
///
/// Borrows the devices of the [`Rack`] it was resolved from; resolve again
/// after any edit.
#[derive(Debug, Clone)]
pub struct OccupancyMap<'r> {
    height: u32,
    /// Index `u - 1` holds unit `u`.
    slots: Vec<Option<OccupancyEntry<'r>>>,
    placed: Vec<&'r Device>,
    issues: Vec<OccupancyIssue>,
}

/// Resolves the occupancy of `rack`.  Shorthand for [`OccupancyMap::resolve`].
pub fn resolve_occupancy(rack: &Rack) -> OccupancyMap<'_> {
    OccupancyMap::resolve(rack)
}

impl<'r> OccupancyMap<'r> {
    /// Builds the occupancy map for `rack`.
    ///
    /// Runs in O(devices × average span) time and O(height) space.
    pub fn resolve(rack: &'r Rack) -> Self {
        let height = rack.height_units();
        let mut map = OccupancyMap {
            height,
            slots: vec![None; height as usize],
            placed: Vec::with_capacity(rack.devices().len()),
            issues: Vec::new(),
        };

        for device in rack.devices() {
            map.claim(device);
        }

        debug!(
            "resolved rack {} ({}U): {} devices placed, {} units occupied, {} issues",
            rack.name(),
            height,
            map.placed.len(),
            map.occupied_units(),
            map.issues.len()
        );
        map
    }

    /// Attempts to place one device, recording an issue if it cannot be placed
    /// in full.
    fn claim(&mut self, device: &'r Device) {
        let in_range = clamp_to_height(device, self.height);
        let kept = in_range.as_ref().map_or(0, |r| r.end() - r.start() + 1);
        let dropped_units = device.unit_span() - kept;

        if dropped_units > 0 {
            debug!(
                "device {} ({}) clipped: {} of {} units outside the {}U rack",
                device.name(),
                device.id(),
                dropped_units,
                device.unit_span(),
                self.height
            );
            self.issues.push(OccupancyIssue::Clipped {
                device: device.id(),
                dropped_units,
            });
        }

        let Some(range) = in_range else {
            return;
        };

        let mut contested = Vec::new();
        let mut holders = Vec::new();
        for unit in range.clone() {
            if let Some(entry) = self.entry(unit) {
                contested.push(unit);
                if !holders.contains(&entry.device.id()) {
                    holders.push(entry.device.id());
                }
            }
        }

        if !contested.is_empty() {
            warn!(
                "device {} ({}) refused: units {:?} already occupied",
                device.name(),
                device.id(),
                contested
            );
            self.issues.push(OccupancyIssue::Overlap {
                device: device.id(),
                units: contested,
                holders,
            });
            return;
        }

        let top = *range.end();
        let bottom = *range.start();
        for unit in range.rev() {
            self.slots[slot_index(unit)] = Some(OccupancyEntry {
                device,
                is_first_unit: unit == top,
                is_last_unit: unit == bottom,
                position_within_span: top - unit,
                total_span: device.unit_span(),
            });
        }
        self.placed.push(device);
    }

    fn entry(&self, unit: u32) -> Option<&OccupancyEntry<'r>> {
        self.slots.get(slot_index(unit)).and_then(Option::as_ref)
    }

    /// Rack height; also the number of units in the map.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The entry for `unit`, or `None` if the unit is empty or outside the rack.
    pub fn get(&self, unit: u32) -> Option<&OccupancyEntry<'r>> {
        if unit == 0 || unit > self.height {
            return None;
        }
        self.entry(unit)
    }

    /// `true` if `unit` is inside the rack and unoccupied.
    pub fn is_free(&self, unit: u32) -> bool {
        (1..=self.height).contains(&unit) && self.entry(unit).is_none()
    }

    /// Every unit `1..=height` in ascending order with its entry, if any.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (u32, Option<&OccupancyEntry<'r>>)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, slot)| (i as u32 + 1, slot.as_ref()))
    }

    /// Occupied units only, in ascending order.
    pub fn entries(&self) -> impl Iterator<Item = (u32, &OccupancyEntry<'r>)> + '_ {
        self.iter().filter_map(|(unit, entry)| entry.map(|e| (unit, e)))
    }

    /// Number of occupied units.
    pub fn occupied_units(&self) -> u32 {
        self.slots.iter().filter(|s| s.is_some()).count() as u32
    }

    /// Maximal runs of consecutive empty units, in ascending order.
    pub fn free_runs(&self) -> Vec<RangeInclusive<u32>> {
        let mut runs = Vec::new();
        let mut run_start: Option<u32> = None;

        for (unit, entry) in self.iter() {
            match (entry, run_start) {
                (None, None) => run_start = Some(unit),
                (Some(_), Some(start)) => {
                    runs.push(start..=unit - 1);
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            runs.push(start..=self.height);
        }
        runs
    }

    /// Devices that received units, in processing order.
    pub fn placed_devices(&self) -> &[&'r Device] {
        &self.placed
    }

    /// Units held by `device`, or `None` if it was not placed.
    pub fn units_of(&self, device: DeviceId) -> Option<RangeInclusive<u32>> {
        let mut units = self
            .iter()
            .filter(|(_, e)| e.is_some_and(|e| e.device.id() == device))
            .map(|(u, _)| u);
        let first = units.next()?;
        let last = units.last().unwrap_or(first);
        Some(first..=last)
    }

    /// Problems found while resolving, in device order.
    pub fn issues(&self) -> &[OccupancyIssue] {
        &self.issues
    }

    /// `true` if any device was refused because of an overlap.
    pub fn has_overlaps(&self) -> bool {
        self.issues
            .iter()
            .any(|i| matches!(i, OccupancyIssue::Overlap { .. }))
    }
}

// ── Private helpers ───────────────────────────────────────────────────────────

/// The part of `device`'s span inside `[1, height]`, if any.
fn clamp_to_height(device: &Device, height: u32) -> Option<RangeInclusive<u32>> {
    let first = device.start_unit().max(1);
    let last = device.last_unit().min(height);
    (first <= last).then_some(first..=last)
}

fn slot_index(unit: u32) -> usize {
    unit as usize - 1
}

// ── Tests ─────────────────────────────────────────────────────────────────────
