//! Application layer use cases for rack audits.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (the pure rack engine in `rack-core`) and the infrastructure (files,
//! terminals, configuration).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** domain functions to fulfil a user goal (e.g., "move this
//!   switch two units up, but only if nothing is there").
//! - **Depend on abstractions** (the [`edit_rack::RackStore`] trait) rather
//!   than concrete storage, so the CRUD backend can be swapped freely.
//! - **Contain no file system access and no terminal output**.
//!
//! # Sub-modules
//!
//! - **`edit_rack`** – Add, move, resize and delete devices.  Every edit is
//!   checked by the placement validator before a new rack snapshot is produced.
//!
//! - **`import_devices`** – Bulk import of device lists from external files,
//!   routed through the same validation as interactive edits.
//!
//! - **`render_cache`** – Memoizes the elevation view per rack so a UI that
//!   re-renders on every keystroke only recomputes when the rack changes.

pub mod edit_rack;
pub mod import_devices;
pub mod render_cache;
