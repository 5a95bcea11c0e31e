//! # rack-core
//!
//! Rack elevation engine for infrastructure audits.  Given a rack of fixed
//! height and the devices mounted in it, the engine answers the questions an
//! audit screen needs: which device owns each rack unit, whether a proposed
//! placement is legal, how full the rack is, and how the elevation should be
//! drawn.
//!
//! This crate has no I/O, no global state and no UI dependencies.  Every
//! operation is a pure function over a [`Rack`] snapshot, so callers simply
//! pass a fresh snapshot after each edit.
//!
//! # Architecture overview (for beginners)
//!
//! ```text
//! Rack ──► OccupancyMap ──┬──► can_place / validate_layout   (placement)
//!                         ├──► utilization                   (metrics)
//!                         └──► build_render_rows             (elevation view)
//! ```
//!
//! - **`domain::rack`** – The value objects: [`Rack`] and [`Device`].  Their
//!   constructors validate input, so the rest of the engine can trust them.
//!
//! - **`domain::occupancy`** – The resolver.  It maps every unit `U1..Uheight`
//!   to the device that owns it (or to nothing) and records span metadata.
//!
//! - **`domain::placement`** – Checks a candidate placement against the rack
//!   bounds and the current occupancy before an edit is accepted.
//!
//! - **`domain::utilization`** – Occupied-unit counts, percentage and
//!   per-status device counts.
//!
//! - **`domain::render`** – Turns the occupancy map into one row per unit,
//!   merging multi-unit devices into a single block.
//!
//! # Unit numbering
//!
//! Units are numbered from `U1` at the bottom of the rack.  A device's span
//! grows upward from its `start_unit`: a 2U device starting at `U5` occupies
//! `U5` and `U6`.  Render rows are emitted from the top of the rack down.

pub mod domain;

// Re-export the most-used types at the crate root so callers can write
// `rack_core::Rack` instead of `rack_core::domain::rack::Rack`.
pub use domain::error::{PlacementError, RackError, UnitConflict, ValidationError};
pub use domain::occupancy::{resolve_occupancy, OccupancyEntry, OccupancyIssue, OccupancyMap};
pub use domain::placement::{
    can_place, check_placement, find_free_slot, validate_layout, PlacementCheck,
};
pub use domain::rack::{
    Device, DeviceBuilder, DeviceId, DeviceStatus, DeviceType, Rack, RackId, StatusTone,
    DEFAULT_RACK_HEIGHT, MAX_RACK_HEIGHT,
};
pub use domain::render::{build_render_rows, RenderRow};
pub use domain::utilization::{utilization, StatusCounts, Utilization};
