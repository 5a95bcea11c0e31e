//! Storage infrastructure: configuration and rack file persistence.
//!
//! - `config` reads and writes the TOML settings file from the platform config
//!   directory, falling back to defaults on first run.
//! - `rack_file` loads and saves rack snapshots as TOML or JSON, and provides
//!   [`FileRackStore`](rack_file::FileRackStore), a directory-backed
//!   [`RackStore`](crate::application::edit_rack::RackStore).

pub mod config;
pub mod rack_file;
