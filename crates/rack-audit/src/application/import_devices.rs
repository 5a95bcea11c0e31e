//! Bulk device import.
//!
//! Imported devices go through the same placement checks as interactive
//! edits: each one is applied as a [`RackEdit::Add`] against the snapshot
//! produced by the previous one.  Data that would overlap or leave the rack
//! never reaches the saved layout.
//!
//! Two modes:
//!
//! - [`ImportMode::AllOrNothing`]: the first rejection aborts the import and
//!   the original rack is kept.
//! - [`ImportMode::SkipRejected`]: rejected devices are reported and the rest
//!   are imported.

use rack_core::{Device, DeviceId, Rack};
use thiserror::Error;
use tracing::{info, warn};

use super::edit_rack::{apply_edit, EditError, RackEdit};

/// How rejections are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    #[default]
    AllOrNothing,
    SkipRejected,
}

/// A device that was not imported, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedDevice {
    pub device: Device,
    pub reason: EditError,
}

/// Outcome of a successful import.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    /// The rack with every accepted device added.
    pub rack: Rack,
    /// Ids of imported devices, in import order.
    pub accepted: Vec<DeviceId>,
    /// Devices skipped in [`ImportMode::SkipRejected`]; always empty otherwise.
    pub rejected: Vec<RejectedDevice>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Error type for [`import_devices`].
#[derive(Debug, Error, PartialEq)]
pub enum ImportError {
    #[error("device {name} rejected, nothing imported")]
    Rejected {
        name: String,
        #[source]
        source: EditError,
    },
}

/// Adds `devices` to `rack` in order.
///
/// # Errors
///
/// In [`ImportMode::AllOrNothing`], returns [`ImportError::Rejected`] for the
/// first device that fails validation.  [`ImportMode::SkipRejected`] never
/// fails.
pub fn import_devices(
    rack: &Rack,
    devices: Vec<Device>,
    mode: ImportMode,
) -> Result<ImportReport, ImportError> {
    let mut current = rack.clone();
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for device in devices {
        let id = device.id();
        match apply_edit(&current, &RackEdit::Add(device.clone())) {
            Ok(next) => {
                current = next;
                accepted.push(id);
            }
            Err(reason) => match mode {
                ImportMode::AllOrNothing => {
                    return Err(ImportError::Rejected {
                        name: device.name().to_string(),
                        source: reason,
                    });
                }
                ImportMode::SkipRejected => {
                    warn!("skipping device {}: {}", device.name(), reason);
                    rejected.push(RejectedDevice { device, reason });
                }
            },
        }
    }

    info!(
        "imported {} devices into rack {} ({} rejected)",
        accepted.len(),
        rack.name(),
        rejected.len()
    );

    Ok(ImportReport {
        rack: current,
        accepted,
        rejected,
    })
}
