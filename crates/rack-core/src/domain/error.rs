//! Errors raised at the engine boundary.
//!
//! All failures are input-driven: a malformed field, a span that leaves the
//! rack, or two devices claiming the same unit.  None of them are transient,
//! so callers surface them (inline form error, rejected edit) rather than
//! retrying.

use thiserror::Error;

use super::rack::DeviceId;

/// Malformed rack or device fields, rejected at construction time.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A rack must be at least one unit tall.
    #[error("rack height must be at least 1U")]
    ZeroHeight,

    /// Taller than [`MAX_RACK_HEIGHT`](super::rack::MAX_RACK_HEIGHT).
    #[error("rack height {height}U exceeds the {max}U maximum")]
    HeightTooLarge { height: u32, max: u32 },

    /// Two devices in one rack share an id, so edits could not tell them apart.
    #[error("duplicate device id {0}")]
    DuplicateDeviceId(DeviceId),

    /// Units are numbered from U1; U0 does not exist.
    #[error("device start unit must be at least U1")]
    ZeroStartUnit,

    /// A device must occupy at least one unit.
    #[error("device unit span must be at least 1U")]
    ZeroSpan,

    /// `start_unit + unit_span - 1` does not fit in the unit address space.
    #[error("a {span}U span starting at U{start} overflows the unit address space")]
    SpanOverflow { start: u32, span: u32 },

    /// The device has no name to label its block with.
    #[error("device name must not be empty")]
    EmptyName,
}

/// One unit of a candidate placement that is already owned by another device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitConflict {
    /// The contested unit.
    pub unit: u32,
    /// The device currently holding the unit.
    pub device_id: DeviceId,
    /// Display name of the holding device.
    pub device_name: String,
}

/// A placement that cannot be accepted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlacementError {
    /// The span leaves the rack.
    #[error("device {device} would occupy U{first_unit}..U{last_unit}, outside a {height}U rack")]
    OutOfBounds {
        device: DeviceId,
        first_unit: u32,
        last_unit: u32,
        height: u32,
    },

    /// The span intersects units owned by other devices.
    #[error("device {device} overlaps {}", describe_conflicts(.conflicts))]
    Overlap {
        device: DeviceId,
        conflicts: Vec<UnitConflict>,
    },
}

impl PlacementError {
    /// Units reported as contested; empty for out-of-bounds failures.
    pub fn conflicting_units(&self) -> Vec<u32> {
        match self {
            PlacementError::OutOfBounds { .. } => Vec::new(),
            PlacementError::Overlap { conflicts, .. } => {
                conflicts.iter().map(|c| c.unit).collect()
            }
        }
    }
}

/// Any error the engine can raise.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RackError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Placement(#[from] PlacementError),
}

/// Renders conflicts as `U6 (core-sw-01), U7 (core-sw-01)`.
fn describe_conflicts(conflicts: &[UnitConflict]) -> String {
    conflicts
        .iter()
        .map(|c| format!("U{} ({})", c.unit, c.device_name))
        .collect::<Vec<_>>()
        .join(", ")
}
