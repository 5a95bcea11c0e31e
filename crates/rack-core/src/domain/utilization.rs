//! Utilization metrics for summary panels.
//!
//! Occupied units are counted from the occupancy map rather than summed from
//! declared spans, so clipped spans and refused devices never inflate the
//! figure.

use serde::Serialize;

use super::occupancy::OccupancyMap;
use super::rack::{Device, DeviceStatus, Rack};

/// Number of devices in each [`DeviceStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatusCounts {
    pub active: usize,
    pub maintenance: usize,
    pub inactive: usize,
    pub retired: usize,
}

impl StatusCounts {
    /// Counts the statuses of `devices`.
    pub fn tally<'a>(devices: impl IntoIterator<Item = &'a Device>) -> Self {
        let mut counts = Self::default();
        for device in devices {
            *counts.slot_mut(device.status()) += 1;
        }
        counts
    }

    /// Count for a single status.
    pub fn get(&self, status: DeviceStatus) -> usize {
        match status {
            DeviceStatus::Active => self.active,
            DeviceStatus::Maintenance => self.maintenance,
            DeviceStatus::Inactive => self.inactive,
            DeviceStatus::Retired => self.retired,
        }
    }

    /// Total number of devices counted.
    pub fn total(&self) -> usize {
        self.active + self.maintenance + self.inactive + self.retired
    }

    fn slot_mut(&mut self, status: DeviceStatus) -> &mut usize {
        match status {
            DeviceStatus::Active => &mut self.active,
            DeviceStatus::Maintenance => &mut self.maintenance,
            DeviceStatus::Inactive => &mut self.inactive,
            DeviceStatus::Retired => &mut self.retired,
        }
    }
}

/// Space usage of a rack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Utilization {
    /// Units owned by some device.
    pub occupied_units: u32,
    /// Rack height.
    pub total_units: u32,
    /// `occupied_units / total_units` as a rounded percentage, 0–100.
    pub percent: u8,
    /// Per-status counts over every device in the rack.
    pub status_counts: StatusCounts,
}

/// Computes the utilization of `rack`.
pub fn utilization(rack: &Rack) -> Utilization {
    Utilization::from_occupancy(&OccupancyMap::resolve(rack), rack.devices())
}

impl Utilization {
    /// Computes utilization from an already-resolved map, so callers that also
    /// render the rack resolve only once.
    pub fn from_occupancy(map: &OccupancyMap<'_>, devices: &[Device]) -> Self {
        let occupied_units = map.occupied_units();
        let total_units = map.height();
        Self {
            occupied_units,
            total_units,
            percent: rounded_percent(occupied_units, total_units),
            status_counts: StatusCounts::tally(devices),
        }
    }

    /// Units still available.
    pub fn free_units(&self) -> u32 {
        self.total_units - self.occupied_units
    }
}

/// Rounds half away from zero, so 1 of 8 units is 13%, not 12%.
fn rounded_percent(part: u32, whole: u32) -> u8 {
    if whole == 0 {
        return 0;
    }
    let pct = (f64::from(part) / f64::from(whole) * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}
