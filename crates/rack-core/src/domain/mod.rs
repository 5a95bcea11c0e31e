//! Domain entities for the rack elevation engine.
//!
//! This module contains pure business logic with no infrastructure dependencies.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! The innermost layer of a Clean Architecture codebase is the **domain**.
//! Domain code holds the core rules of the system and has no imports from
//! file systems, databases, network libraries or UI frameworks.  Here the core
//! rules are about rack units: which device owns which slot, when two devices
//! collide, and how a rack elevation is drawn.
//!
//! Outer layers (the `rack-audit` application, a web UI, a report generator)
//! depend on this module, never the other way round.

/// Error types raised at the engine boundary.
pub mod error;

/// Unit occupancy resolver.
pub mod occupancy;

/// Placement validation for add/move/resize edits.
pub mod placement;

/// Rack and device value objects.
pub mod rack;

/// Render view builder.
pub mod render;

/// Utilization metrics.
pub mod utilization;
