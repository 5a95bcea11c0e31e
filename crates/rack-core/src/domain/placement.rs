//! Placement validation.
//!
//! Every add, move or resize coming from the surrounding CRUD layer is checked
//! here before it is committed.  A placement is legal when:
//!
//! 1. the span stays inside the rack: `start_unit ≥ 1` and
//!    `start_unit + unit_span - 1 ≤ height_units`, and
//! 2. none of its units is owned by another device in the current occupancy
//!    map.  The device being edited is excluded, so moving a device onto units
//!    it already holds is fine.
//!
//! All functions here are deterministic and side-effect free.

use serde::Serialize;
use tracing::debug;

use super::error::{PlacementError, RackError, UnitConflict};
use super::occupancy::{OccupancyIssue, OccupancyMap};
use super::rack::{Device, DeviceId, Rack};

/// Outcome of [`can_place`] in the shape a form or drag target consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacementCheck {
    /// `true` if the placement can be committed.
    pub ok: bool,
    /// Contested units in ascending order; empty unless the failure is an overlap.
    pub conflicts: Vec<u32>,
    /// The reason the placement was refused.
    #[serde(skip)]
    pub error: Option<PlacementError>,
}

/// Checks whether `candidate` can be placed in `rack`.
///
/// `excluding` names a device to ignore, normally the device being edited.
///
/// # Example
///
/// ```
/// use rack_core::{can_place, Device, Rack};
///
/// let a = Device::builder("a", 5, 2).build().unwrap();
/// let rack = Rack::new("r1", 42, vec![a]).unwrap();
/// let b = Device::builder("b", 6, 1).build().unwrap();
///
/// let check = can_place(&rack, &b, None);
/// assert!(!check.ok);
/// assert_eq!(check.conflicts, vec![6]);
/// ```
pub fn can_place(rack: &Rack, candidate: &Device, excluding: Option<DeviceId>) -> PlacementCheck {
    match check_placement(rack, candidate, excluding) {
        Ok(()) => PlacementCheck {
            ok: true,
            conflicts: Vec::new(),
            error: None,
        },
        Err(err) => PlacementCheck {
            ok: false,
            conflicts: err.conflicting_units(),
            error: Some(err),
        },
    }
}

/// `Result` form of [`can_place`].
///
/// # Errors
///
/// - [`PlacementError::OutOfBounds`] if the span leaves the rack.
/// - [`PlacementError::Overlap`] if the span hits units held by other devices.
pub fn check_placement(
    rack: &Rack,
    candidate: &Device,
    excluding: Option<DeviceId>,
) -> Result<(), PlacementError> {
    check_bounds(rack.height_units(), candidate)?;

    let map = OccupancyMap::resolve(rack);
    let conflicts: Vec<UnitConflict> = candidate
        .units()
        .filter_map(|unit| {
            let entry = map.get(unit)?;
            if Some(entry.device.id()) == excluding {
                return None;
            }
            Some(UnitConflict {
                unit,
                device_id: entry.device.id(),
                device_name: entry.device.name().to_string(),
            })
        })
        .collect();

    if conflicts.is_empty() {
        Ok(())
    } else {
        debug!(
            "placement of {} at U{}..U{} rejected: {} contested units",
            candidate.name(),
            candidate.start_unit(),
            candidate.last_unit(),
            conflicts.len()
        );
        Err(PlacementError::Overlap {
            device: candidate.id(),
            conflicts,
        })
    }
}

/// Validates a whole rack as if its devices were added one by one in order.
///
/// Used before accepting imported data.  Reports the first problem found.
///
/// # Errors
///
/// - [`PlacementError::OutOfBounds`] for the first device whose span leaves the rack.
/// - [`PlacementError::Overlap`] for the first device that collides with an earlier one.
pub fn validate_layout(rack: &Rack) -> Result<(), RackError> {
    let map = OccupancyMap::resolve(rack);

    let Some(issue) = map.issues().first() else {
        return Ok(());
    };
    let Some(device) = rack.device(issue.device()) else {
        return Ok(());
    };

    let err = match issue {
        OccupancyIssue::Clipped { .. } => PlacementError::OutOfBounds {
            device: device.id(),
            first_unit: device.start_unit(),
            last_unit: device.last_unit(),
            height: rack.height_units(),
        },
        OccupancyIssue::Overlap { units, .. } => PlacementError::Overlap {
            device: device.id(),
            conflicts: units
                .iter()
                .filter_map(|&unit| {
                    map.get(unit).map(|entry| UnitConflict {
                        unit,
                        device_id: entry.device.id(),
                        device_name: entry.device.name().to_string(),
                    })
                })
                .collect(),
        },
    };
    Err(err.into())
}

/// Lowest start unit at which a device of `unit_span` units fits without
/// overlapping anything, or `None` if no free run is long enough.
pub fn find_free_slot(rack: &Rack, unit_span: u32) -> Option<u32> {
    if unit_span == 0 {
        return None;
    }
    OccupancyMap::resolve(rack)
        .free_runs()
        .into_iter()
        .find(|run| run.end() - run.start() + 1 >= unit_span)
        .map(|run| *run.start())
}

fn check_bounds(height: u32, candidate: &Device) -> Result<(), PlacementError> {
    if candidate.start_unit() < 1 || candidate.last_unit() > height {
        return Err(PlacementError::OutOfBounds {
            device: candidate.id(),
            first_unit: candidate.start_unit(),
            last_unit: candidate.last_unit(),
            height,
        });
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
