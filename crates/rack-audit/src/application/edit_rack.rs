//! RackEditor: applies device edits to a rack snapshot.
//!
//! The engine never mutates a rack.  An edit takes the current snapshot, runs
//! the placement validator, and, if the edit is legal, returns a **new**
//! snapshot with the change applied.  The caller decides what to do with it:
//! show it, save it, push it onto an undo stack.
//!
//! # Edit flow (for beginners)
//!
//! ```text
//! RackEdit::Move { device, start_unit: 20 }
//!      │
//!      ├─ look up the device            → DeviceNotFound
//!      ├─ build the moved copy          → Invalid (e.g. U0)
//!      ├─ check_placement, excluding it → Rejected (out of bounds / overlap)
//!      ├─ new Rack with the copy swapped in
//!      └─ every other placed device kept → Rejected (overlap)
//! ```
//!
//! The last step matters for racks that already hold an overlap.  The first
//! claim on a unit wins, so moving or deleting the winner would hand its
//! units to a device that was refused before and unseat whatever it now
//! collides with.  Such an edit is refused instead.
//!
//! [`RackEditor`] adds the persistence step on top, through the [`RackStore`]
//! trait that the external CRUD layer implements.

use std::fmt;

use rack_core::{
    check_placement, resolve_occupancy, Device, DeviceId, PlacementError, Rack, RackId,
    UnitConflict, ValidationError,
};
use thiserror::Error;
use tracing::{debug, info};

/// Error type for edit operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EditError {
    #[error("device not found: {0}")]
    DeviceNotFound(DeviceId),
    #[error("device already in rack: {0}")]
    DuplicateDevice(DeviceId),
    #[error("invalid device: {0}")]
    Invalid(#[from] ValidationError),
    #[error("placement rejected: {0}")]
    Rejected(#[from] PlacementError),
    #[error("rack store failed: {0}")]
    Store(#[from] StoreError),
}

/// Error type for [`RackStore`] implementations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("rack not found: {0}")]
    NotFound(RackId),
    #[error("{0}")]
    Backend(String),
}

/// A single change to a rack's device collection.
#[derive(Debug, Clone, PartialEq)]
pub enum RackEdit {
    /// Mount a new device.
    Add(Device),
    /// Move an existing device so its span starts at `start_unit`.
    Move { device: DeviceId, start_unit: u32 },
    /// Change an existing device's height.
    Resize { device: DeviceId, unit_span: u32 },
    /// Remove a device from the rack.
    Delete { device: DeviceId },
}

impl fmt::Display for RackEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RackEdit::Add(d) => write!(
                f,
                "add {} at U{} ({}U)",
                d.name(),
                d.start_unit(),
                d.unit_span()
            ),
            RackEdit::Move { device, start_unit } => write!(f, "move {device} to U{start_unit}"),
            RackEdit::Resize { device, unit_span } => write!(f, "resize {device} to {unit_span}U"),
            RackEdit::Delete { device } => write!(f, "delete {device}"),
        }
    }
}

impl RackEdit {
    /// The existing device this edit changes, if any.
    fn target(&self) -> Option<DeviceId> {
        match self {
            RackEdit::Add(_) => None,
            RackEdit::Move { device, .. }
            | RackEdit::Resize { device, .. }
            | RackEdit::Delete { device } => Some(*device),
        }
    }
}

/// Storage seam to the CRUD layer that owns rack persistence.
#[cfg_attr(test, mockall::automock)]
pub trait RackStore {
    /// Loads the current snapshot of a rack.
    fn load(&self, id: RackId) -> Result<Rack, StoreError>;
    /// Persists a rack snapshot, replacing any previous one with the same id.
    fn save(&self, rack: &Rack) -> Result<(), StoreError>;
}

/// Applies `edit` to `rack`, returning the edited snapshot.
///
/// `rack` itself is never modified.
///
/// # Errors
///
/// - [`EditError::DeviceNotFound`] if the edit names a device not in the rack.
/// - [`EditError::DuplicateDevice`] if an added device's id is already present.
/// - [`EditError::Invalid`] if the moved/resized device is malformed.
/// - [`EditError::Rejected`] if the placement validator refuses the result,
///   or if the edit would unseat another device that is placed today.
pub fn apply_edit(rack: &Rack, edit: &RackEdit) -> Result<Rack, EditError> {
    let result = match edit {
        RackEdit::Add(device) => add_device(rack, device),
        RackEdit::Move { device, start_unit } => {
            let current = find_device(rack, *device)?;
            replace_device(rack, current.moved_to(*start_unit)?)
        }
        RackEdit::Resize { device, unit_span } => {
            let current = find_device(rack, *device)?;
            replace_device(rack, current.resized_to(*unit_span)?)
        }
        RackEdit::Delete { device } => delete_device(rack, *device),
    }
    .and_then(|edited| {
        ensure_no_displacement(rack, &edited, edit.target())?;
        Ok(edited)
    });

    match &result {
        Ok(_) => debug!("rack {}: applied {edit}", rack.name()),
        Err(e) => info!("rack {}: rejected {edit}: {e}", rack.name()),
    }
    result
}

/// Loads racks from a [`RackStore`], applies edits and saves the result.
pub struct RackEditor<S> {
    store: S,
}

impl<S: RackStore> RackEditor<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Loads rack `id`, applies `edit`, and saves the new snapshot.
    ///
    /// Nothing is saved when the edit is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::Store`] if loading or saving fails, or any error
    /// from [`apply_edit`].
    pub fn apply_and_save(&self, id: RackId, edit: &RackEdit) -> Result<Rack, EditError> {
        let rack = self.store.load(id)?;
        let edited = apply_edit(&rack, edit)?;
        self.store.save(&edited)?;
        Ok(edited)
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn find_device(rack: &Rack, id: DeviceId) -> Result<&Device, EditError> {
    rack.device(id).ok_or(EditError::DeviceNotFound(id))
}

fn add_device(rack: &Rack, device: &Device) -> Result<Rack, EditError> {
    if rack.device(device.id()).is_some() {
        return Err(EditError::DuplicateDevice(device.id()));
    }
    check_placement(rack, device, None)?;

    let mut devices = rack.devices().to_vec();
    devices.push(device.clone());
    Ok(rack.with_devices(devices)?)
}

/// Swaps in `updated` for the device with the same id, keeping its position
/// in the device order.
fn replace_device(rack: &Rack, updated: Device) -> Result<Rack, EditError> {
    check_placement(rack, &updated, Some(updated.id()))?;

    let devices = rack
        .devices()
        .iter()
        .map(|d| if d.id() == updated.id() { updated.clone() } else { d.clone() })
        .collect();
    Ok(rack.with_devices(devices)?)
}

fn delete_device(rack: &Rack, id: DeviceId) -> Result<Rack, EditError> {
    find_device(rack, id)?;
    let devices = rack
        .devices()
        .iter()
        .filter(|d| d.id() != id)
        .cloned()
        .collect();
    Ok(rack.with_devices(devices)?)
}

/// Fails if a device placed in `before`, other than `edited`, lost or changed
/// its units in `after`.
fn ensure_no_displacement(
    before: &Rack,
    after: &Rack,
    edited: Option<DeviceId>,
) -> Result<(), PlacementError> {
    let was = resolve_occupancy(before);
    let now = resolve_occupancy(after);

    for device in was.placed_devices() {
        if Some(device.id()) == edited {
            continue;
        }
        let Some(units) = was.units_of(device.id()) else {
            continue;
        };
        if now.units_of(device.id()).as_ref() == Some(&units) {
            continue;
        }
        let conflicts = units
            .filter_map(|unit| {
                now.get(unit).map(|entry| UnitConflict {
                    unit,
                    device_id: entry.device.id(),
                    device_name: entry.device.name().to_string(),
                })
            })
            .collect();
        return Err(PlacementError::Overlap { device: device.id(), conflicts });
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use rack_core::{resolve_occupancy, utilization};
    use uuid::Uuid;

    fn device(name: &str, start: u32, span: u32) -> Device {
        Device::builder(name, start, span).build().unwrap()
    }

    fn rack_with(devices: Vec<Device>) -> Rack {
        Rack::new("edit-test", 42, devices).unwrap()
    }

    // ── Add ───────────────────────────────────────────────────────────────────

    #[test]
    fn test_add_device_to_free_units_succeeds() {
        let rack = rack_with(vec![device("a", 1, 4)]);
        let edited = apply_edit(&rack, &RackEdit::Add(device("b", 5, 2))).unwrap();

        assert_eq!(edited.devices().len(), 2);
        assert_eq!(utilization(&edited).occupied_units, 6);
        assert_eq!(rack.devices().len(), 1, "original snapshot is untouched");
    }

    #[test]
    fn test_add_overlapping_device_is_rejected() {
        let rack = rack_with(vec![device("a", 5, 2)]);
        let result = apply_edit(&rack, &RackEdit::Add(device("b", 6, 1)));
        assert!(matches!(
            result,
            Err(EditError::Rejected(PlacementError::Overlap { .. }))
        ));
    }

    #[test]
    fn test_add_duplicate_id_is_rejected() {
        let a = device("a", 1, 1);
        let copy = a.moved_to(10).unwrap();
        let rack = rack_with(vec![a.clone()]);
        assert_eq!(
            apply_edit(&rack, &RackEdit::Add(copy)),
            Err(EditError::DuplicateDevice(a.id()))
        );
    }

    // ── Move ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_move_onto_own_units_succeeds() {
        let a = device("a", 5, 3);
        let rack = rack_with(vec![a.clone()]);

        let edited = apply_edit(&rack, &RackEdit::Move { device: a.id(), start_unit: 6 }).unwrap();

        assert_eq!(edited.device(a.id()).unwrap().start_unit(), 6);
        let map = resolve_occupancy(&edited);
        assert!(map.is_free(5));
        assert!(!map.is_free(8));
    }

    #[test]
    fn test_move_past_top_of_rack_is_rejected() {
        let a = device("a", 1, 2);
        let rack = rack_with(vec![a.clone()]);
        let result = apply_edit(&rack, &RackEdit::Move { device: a.id(), start_unit: 42 });
        assert!(matches!(
            result,
            Err(EditError::Rejected(PlacementError::OutOfBounds { .. }))
        ));
    }

    #[test]
    fn test_move_to_unit_zero_is_invalid() {
        let a = device("a", 1, 2);
        let rack = rack_with(vec![a.clone()]);
        assert_eq!(
            apply_edit(&rack, &RackEdit::Move { device: a.id(), start_unit: 0 }),
            Err(EditError::Invalid(ValidationError::ZeroStartUnit))
        );
    }

    #[test]
    fn test_move_unknown_device_fails() {
        let rack = rack_with(vec![]);
        let id = Uuid::new_v4();
        assert_eq!(
            apply_edit(&rack, &RackEdit::Move { device: id, start_unit: 3 }),
            Err(EditError::DeviceNotFound(id))
        );
    }

    #[test]
    fn test_move_keeps_device_order() {
        let a = device("a", 1, 1);
        let b = device("b", 2, 1);
        let c = device("c", 3, 1);
        let rack = rack_with(vec![a, b.clone(), c]);

        let edited = apply_edit(&rack, &RackEdit::Move { device: b.id(), start_unit: 20 }).unwrap();

        let names: Vec<&str> = edited.devices().iter().map(Device::name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_move_that_unseats_a_placed_device_is_rejected() {
        // "b" overlaps "a" at U2 and is refused, so "c" holds U3.  Moving "a"
        // away would let "b" claim U2-U3 and push "c" out.
        let a = device("a", 1, 2);
        let b = device("b", 2, 2);
        let c = device("c", 3, 1);
        let rack = rack_with(vec![a.clone(), b.clone(), c.clone()]);

        let result = apply_edit(&rack, &RackEdit::Move { device: a.id(), start_unit: 20 });

        match result {
            Err(EditError::Rejected(PlacementError::Overlap { device, conflicts })) => {
                assert_eq!(device, c.id());
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].unit, 3);
                assert_eq!(conflicts[0].device_id, b.id());
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_move_within_overlapping_rack_keeps_others_placed() {
        let a = device("a", 1, 2);
        let b = device("b", 2, 2);
        let c = device("c", 10, 1);
        let rack = rack_with(vec![a, b.clone(), c.clone()]);

        let edited = apply_edit(&rack, &RackEdit::Move { device: c.id(), start_unit: 30 }).unwrap();

        let map = resolve_occupancy(&edited);
        assert_eq!(map.units_of(c.id()), Some(30..=30));
        assert_eq!(map.units_of(b.id()), None, "b is still refused");
    }

    // ── Resize ────────────────────────────────────────────────────────────────

    #[test]
    fn test_resize_into_neighbour_is_rejected() {
        let a = device("a", 1, 2);
        let b = device("b", 3, 1);
        let rack = rack_with(vec![a.clone(), b]);

        let result = apply_edit(&rack, &RackEdit::Resize { device: a.id(), unit_span: 3 });

        match result {
            Err(EditError::Rejected(err)) => assert_eq!(err.conflicting_units(), vec![3]),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_resize_shrink_frees_units() {
        let a = device("a", 1, 4);
        let rack = rack_with(vec![a.clone()]);
        let edited = apply_edit(&rack, &RackEdit::Resize { device: a.id(), unit_span: 1 }).unwrap();
        assert_eq!(utilization(&edited).occupied_units, 1);
    }

    #[test]
    fn test_resize_to_zero_is_invalid() {
        let a = device("a", 1, 4);
        let rack = rack_with(vec![a.clone()]);
        assert_eq!(
            apply_edit(&rack, &RackEdit::Resize { device: a.id(), unit_span: 0 }),
            Err(EditError::Invalid(ValidationError::ZeroSpan))
        );
    }

    // ── Delete ────────────────────────────────────────────────────────────────

    #[test]
    fn test_delete_removes_device_and_frees_units() {
        let a = device("a", 1, 4);
        let rack = rack_with(vec![a.clone()]);
        let edited = apply_edit(&rack, &RackEdit::Delete { device: a.id() }).unwrap();
        assert!(edited.devices().is_empty());
        assert_eq!(utilization(&edited).occupied_units, 0);
    }

    #[test]
    fn test_delete_that_unseats_a_placed_device_is_rejected() {
        let a = device("a", 1, 2);
        let b = device("b", 2, 2);
        let c = device("c", 3, 1);
        let rack = rack_with(vec![a.clone(), b, c.clone()]);

        let result = apply_edit(&rack, &RackEdit::Delete { device: a.id() });

        match result {
            Err(EditError::Rejected(err)) => assert_eq!(err.conflicting_units(), vec![3]),
            other => panic!("expected rejection, got {other:?}"),
        }
        assert!(rack.device(c.id()).is_some(), "original snapshot is untouched");
    }

    #[test]
    fn test_delete_refused_device_succeeds() {
        let a = device("a", 1, 2);
        let b = device("b", 2, 2);
        let rack = rack_with(vec![a, b.clone()]);

        let edited = apply_edit(&rack, &RackEdit::Delete { device: b.id() }).unwrap();

        assert!(!resolve_occupancy(&edited).has_overlaps());
    }

    #[test]
    fn test_edit_error_is_cloneable() {
        let err = EditError::Store(StoreError::Backend("disk full".into()));
        assert_eq!(err.clone(), err);
    }

    #[test]
    fn test_delete_unknown_device_fails() {
        let rack = rack_with(vec![]);
        let id = Uuid::new_v4();
        assert_eq!(
            apply_edit(&rack, &RackEdit::Delete { device: id }),
            Err(EditError::DeviceNotFound(id))
        );
    }

    // ── RackEditor with a mocked store ────────────────────────────────────────

    #[test]
    fn test_editor_loads_edits_and_saves() {
        // Arrange
        let rack = rack_with(vec![device("a", 1, 2)]);
        let rack_id = rack.id();
        let mut store = MockRackStore::new();
        store
            .expect_load()
            .with(eq(rack_id))
            .times(1)
            .returning(move |_| Ok(rack.clone()));
        store
            .expect_save()
            .withf(|r: &Rack| r.devices().len() == 2)
            .times(1)
            .returning(|_| Ok(()));
        let editor = RackEditor::new(store);

        // Act
        let edited = editor.apply_and_save(rack_id, &RackEdit::Add(device("b", 3, 1)));

        // Assert
        assert_eq!(edited.unwrap().devices().len(), 2);
    }

    #[test]
    fn test_editor_does_not_save_rejected_edit() {
        let rack = rack_with(vec![device("a", 1, 2)]);
        let rack_id = rack.id();
        let mut store = MockRackStore::new();
        store.expect_load().returning(move |_| Ok(rack.clone()));
        store.expect_save().times(0);
        let editor = RackEditor::new(store);

        let result = editor.apply_and_save(rack_id, &RackEdit::Add(device("b", 2, 1)));

        assert!(matches!(result, Err(EditError::Rejected(_))));
    }

    #[test]
    fn test_editor_surfaces_store_errors() {
        let missing = Uuid::new_v4();
        let mut store = MockRackStore::new();
        store
            .expect_load()
            .returning(|id| Err(StoreError::NotFound(id)));
        let editor = RackEditor::new(store);

        let result = editor.apply_and_save(missing, &RackEdit::Delete { device: Uuid::new_v4() });

        assert_eq!(result, Err(EditError::Store(StoreError::NotFound(missing))));
    }

    #[test]
    fn test_rack_edit_display_is_human_readable() {
        let d = device("core-sw", 12, 1);
        assert_eq!(RackEdit::Add(d).to_string(), "add core-sw at U12 (1U)");
    }
}
