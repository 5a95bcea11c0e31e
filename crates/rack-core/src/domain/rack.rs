//! Rack and device value objects.
//!
//! Both types are immutable once built.  Their constructors (and their serde
//! `Deserialize` impls, which route through the same constructors) reject
//! malformed fields with a [`ValidationError`], so the resolver, validator and
//! view builder never have to deal with a zero-height rack or a zero-unit
//! device.
//!
//! Non-integer or negative unit numbers cannot be represented at all: units are
//! `u32`, and deserializing `1.5` or `-2` into one fails before a value exists.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValidationError;

/// Height used when a rack record does not say otherwise.
pub const DEFAULT_RACK_HEIGHT: u32 = 42;

/// Tallest rack accepted.  Occupancy maps allocate one slot per unit, so the
/// height is bounded well above any physical rack.
pub const MAX_RACK_HEIGHT: u32 = 1000;

/// Unique identifier for a rack, derived from UUID v4.
pub type RackId = Uuid;

/// Unique identifier for a device, derived from UUID v4.
pub type DeviceId = Uuid;

// ── Device classification ─────────────────────────────────────────────────────

/// Kind of equipment mounted in a rack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceType {
    Server,
    Switch,
    Router,
    Storage,
    Ups,
    Pdu,
    Firewall,
    Monitor,
    PatchPanel,
    #[default]
    Other,
}

impl DeviceType {
    /// Human-readable label for legends and detail views.
    pub fn label(self) -> &'static str {
        match self {
            DeviceType::Server => "Server",
            DeviceType::Switch => "Switch",
            DeviceType::Router => "Router",
            DeviceType::Storage => "Storage",
            DeviceType::Ups => "UPS",
            DeviceType::Pdu => "PDU",
            DeviceType::Firewall => "Firewall",
            DeviceType::Monitor => "Monitor",
            DeviceType::PatchPanel => "Patch Panel",
            DeviceType::Other => "Other",
        }
    }
}

/// Operational status recorded during an audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceStatus {
    #[default]
    Active,
    Inactive,
    Maintenance,
    Retired,
}

/// Presentation class of a [`DeviceStatus`].
///
/// This drives the colour coding of device blocks:
/// - `Healthy` = green
/// - `Attention` = amber
/// - `Idle` = grey
/// - `Decommissioned` = red / struck through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusTone {
    Healthy,
    Attention,
    Idle,
    Decommissioned,
}

impl DeviceStatus {
    /// All statuses in summary display order.
    pub const ALL: [DeviceStatus; 4] = [
        DeviceStatus::Active,
        DeviceStatus::Maintenance,
        DeviceStatus::Inactive,
        DeviceStatus::Retired,
    ];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            DeviceStatus::Active => "Active",
            DeviceStatus::Inactive => "Inactive",
            DeviceStatus::Maintenance => "Maintenance",
            DeviceStatus::Retired => "Retired",
        }
    }

    /// Classifies the status for presentation.
    pub fn tone(self) -> StatusTone {
        match self {
            DeviceStatus::Active => StatusTone::Healthy,
            DeviceStatus::Maintenance => StatusTone::Attention,
            DeviceStatus::Inactive => StatusTone::Idle,
            DeviceStatus::Retired => StatusTone::Decommissioned,
        }
    }
}

// ── Device ────────────────────────────────────────────────────────────────────

/// A piece of equipment occupying `unit_span` contiguous units starting at
/// `start_unit` and growing upward.
///
/// Whether the span fits a particular rack is not known here; that is the job
/// of [`check_placement`](super::placement::check_placement).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DeviceRecord")]
pub struct Device {
    id: DeviceId,
    name: String,
    #[serde(rename = "type")]
    device_type: DeviceType,
    model: String,
    serial_number: String,
    start_unit: u32,
    unit_span: u32,
    status: DeviceStatus,
    notes: String,
}

impl Device {
    /// Starts building a device with a fresh id and default classification.
    pub fn builder(name: impl Into<String>, start_unit: u32, unit_span: u32) -> DeviceBuilder {
        DeviceBuilder {
            id: Uuid::new_v4(),
            name: name.into(),
            device_type: DeviceType::default(),
            model: String::new(),
            serial_number: String::new(),
            start_unit,
            unit_span,
            status: DeviceStatus::default(),
            notes: String::new(),
        }
    }

    /// Returns a builder pre-filled with this device's fields, id included.
    pub fn to_builder(&self) -> DeviceBuilder {
        DeviceBuilder {
            id: self.id,
            name: self.name.clone(),
            device_type: self.device_type,
            model: self.model.clone(),
            serial_number: self.serial_number.clone(),
            start_unit: self.start_unit,
            unit_span: self.unit_span,
            status: self.status,
            notes: self.notes.clone(),
        }
    }

    /// Returns a copy of this device moved to `start_unit`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the moved span is malformed.
    pub fn moved_to(&self, start_unit: u32) -> Result<Device, ValidationError> {
        self.to_builder().start_unit(start_unit).build()
    }

    /// Returns a copy of this device resized to `unit_span`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the resized span is malformed.
    pub fn resized_to(&self, unit_span: u32) -> Result<Device, ValidationError> {
        self.to_builder().unit_span(unit_span).build()
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    pub fn start_unit(&self) -> u32 {
        self.start_unit
    }

    pub fn unit_span(&self) -> u32 {
        self.unit_span
    }

    pub fn status(&self) -> DeviceStatus {
        self.status
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Highest unit covered by the span.  Cannot overflow: the builder
    /// rejects spans that would.
    pub fn last_unit(&self) -> u32 {
        self.start_unit + (self.unit_span - 1)
    }

    /// Every unit the declared span covers, in ascending order.
    pub fn units(&self) -> RangeInclusive<u32> {
        self.start_unit..=self.last_unit()
    }
}

/// Builder for [`Device`]; validation happens in [`DeviceBuilder::build`].
#[derive(Debug, Clone)]
pub struct DeviceBuilder {
    id: DeviceId,
    name: String,
    device_type: DeviceType,
    model: String,
    serial_number: String,
    start_unit: u32,
    unit_span: u32,
    status: DeviceStatus,
    notes: String,
}

impl DeviceBuilder {
    pub fn id(mut self, id: DeviceId) -> Self {
        self.id = id;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn device_type(mut self, device_type: DeviceType) -> Self {
        self.device_type = device_type;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn serial_number(mut self, serial_number: impl Into<String>) -> Self {
        self.serial_number = serial_number.into();
        self
    }

    pub fn start_unit(mut self, start_unit: u32) -> Self {
        self.start_unit = start_unit;
        self
    }

    pub fn unit_span(mut self, unit_span: u32) -> Self {
        self.unit_span = unit_span;
        self
    }

    pub fn status(mut self, status: DeviceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Validates the fields and produces a [`Device`].
    ///
    /// # Errors
    ///
    /// - [`ValidationError::EmptyName`] if the name is blank.
    /// - [`ValidationError::ZeroStartUnit`] if `start_unit` is 0.
    /// - [`ValidationError::ZeroSpan`] if `unit_span` is 0.
    /// - [`ValidationError::SpanOverflow`] if the last unit does not fit in a `u32`.
    pub fn build(self) -> Result<Device, ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.start_unit == 0 {
            return Err(ValidationError::ZeroStartUnit);
        }
        if self.unit_span == 0 {
            return Err(ValidationError::ZeroSpan);
        }
        if self.start_unit.checked_add(self.unit_span - 1).is_none() {
            return Err(ValidationError::SpanOverflow {
                start: self.start_unit,
                span: self.unit_span,
            });
        }

        Ok(Device {
            id: self.id,
            name: self.name,
            device_type: self.device_type,
            model: self.model,
            serial_number: self.serial_number,
            start_unit: self.start_unit,
            unit_span: self.unit_span,
            status: self.status,
            notes: self.notes,
        })
    }
}

/// Wire shape of a device; every optional field falls back to a default.
#[derive(Deserialize)]
struct DeviceRecord {
    #[serde(default = "new_id")]
    id: DeviceId,
    name: String,
    #[serde(rename = "type", default)]
    device_type: DeviceType,
    #[serde(default)]
    model: String,
    #[serde(default)]
    serial_number: String,
    start_unit: u32,
    #[serde(default = "default_unit_span")]
    unit_span: u32,
    #[serde(default)]
    status: DeviceStatus,
    #[serde(default)]
    notes: String,
}

impl TryFrom<DeviceRecord> for Device {
    type Error = ValidationError;

    fn try_from(record: DeviceRecord) -> Result<Self, Self::Error> {
        Device::builder(record.name, record.start_unit, record.unit_span)
            .id(record.id)
            .device_type(record.device_type)
            .model(record.model)
            .serial_number(record.serial_number)
            .status(record.status)
            .notes(record.notes)
            .build()
    }
}

// ── Rack ──────────────────────────────────────────────────────────────────────

/// A rack of `height_units` slots and the devices mounted in it.
///
/// Device order is preserved; the occupancy resolver processes devices in this
/// order, so earlier devices win contested units.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RackRecord")]
pub struct Rack {
    id: RackId,
    name: String,
    height_units: u32,
    devices: Vec<Device>,
}

impl Rack {
    /// Creates a rack with a fresh id.
    ///
    /// # Errors
    ///
    /// See [`Rack::with_id`].
    pub fn new(
        name: impl Into<String>,
        height_units: u32,
        devices: Vec<Device>,
    ) -> Result<Self, ValidationError> {
        Self::with_id(Uuid::new_v4(), name, height_units, devices)
    }

    /// Creates a rack with an explicit id, e.g. one loaded from storage.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::ZeroHeight`] if `height_units` is 0.
    /// - [`ValidationError::HeightTooLarge`] if it exceeds [`MAX_RACK_HEIGHT`].
    /// - [`ValidationError::DuplicateDeviceId`] if two devices share an id.
    pub fn with_id(
        id: RackId,
        name: impl Into<String>,
        height_units: u32,
        devices: Vec<Device>,
    ) -> Result<Self, ValidationError> {
        if height_units == 0 {
            return Err(ValidationError::ZeroHeight);
        }
        if height_units > MAX_RACK_HEIGHT {
            return Err(ValidationError::HeightTooLarge {
                height: height_units,
                max: MAX_RACK_HEIGHT,
            });
        }
        let mut seen = HashSet::with_capacity(devices.len());
        if let Some(dup) = devices.iter().find(|d| !seen.insert(d.id)) {
            return Err(ValidationError::DuplicateDeviceId(dup.id));
        }
        Ok(Self {
            id,
            name: name.into(),
            height_units,
            devices,
        })
    }

    /// Creates a standard 42U rack.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateDeviceId`] if two devices share an id.
    pub fn standard(name: impl Into<String>, devices: Vec<Device>) -> Result<Self, ValidationError> {
        Self::new(name, DEFAULT_RACK_HEIGHT, devices)
    }

    /// Returns a new snapshot of this rack holding `devices` instead.
    ///
    /// Id, name and height carry over; `self` is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateDeviceId`] if two devices share an id.
    pub fn with_devices(&self, devices: Vec<Device>) -> Result<Rack, ValidationError> {
        Rack::with_id(self.id, self.name.clone(), self.height_units, devices)
    }

    pub fn id(&self) -> RackId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn height_units(&self) -> u32 {
        self.height_units
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Looks a device up by id.
    pub fn device(&self, id: DeviceId) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }
}

#[derive(Deserialize)]
struct RackRecord {
    #[serde(default = "new_id")]
    id: RackId,
    name: String,
    #[serde(default = "default_height")]
    height_units: u32,
    #[serde(default)]
    devices: Vec<Device>,
}

impl TryFrom<RackRecord> for Rack {
    type Error = ValidationError;

    fn try_from(record: RackRecord) -> Result<Self, Self::Error> {
        Rack::with_id(record.id, record.name, record.height_units, record.devices)
    }
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn new_id() -> Uuid {
    Uuid::new_v4()
}
fn default_unit_span() -> u32 {
    1
}
fn default_height() -> u32 {
    DEFAULT_RACK_HEIGHT
}

// ── Tests ─────────────────────────────────────────────────────────────────────
