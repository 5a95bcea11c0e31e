//! Render view builder.
//!
//! Converts an occupancy map into one [`RenderRow`] per unit, ordered from the
//! top of the rack (`U{height}`) down to `U1`.  A device spanning several units
//! becomes one [`RenderRow::Block`] on its anchor unit followed by
//! [`RenderRow::Continuation`] rows, which a renderer folds into the block's
//! height.  The row count always equals the rack height.
//!
//! Rows own a copy of the device, so a view can be cached or serialized after
//! the rack snapshot is gone.

use serde::Serialize;

use super::occupancy::OccupancyMap;
use super::rack::{Device, Rack};

/// One visual row of a rack elevation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderRow {
    /// Unoccupied unit.
    Empty { unit: u32 },
    /// Anchor unit of a device; the block covers `span_units` rows from here down.
    Block {
        unit: u32,
        span_units: u32,
        device: Device,
    },
    /// Non-anchor unit of the block above it.
    Continuation { unit: u32 },
}

impl RenderRow {
    /// Unit number of the row.
    pub fn unit(&self) -> u32 {
        match self {
            RenderRow::Empty { unit }
            | RenderRow::Block { unit, .. }
            | RenderRow::Continuation { unit } => *unit,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RenderRow::Empty { .. })
    }
}

/// Builds the elevation rows for `rack`.
pub fn build_render_rows(rack: &Rack) -> Vec<RenderRow> {
    RenderRow::from_occupancy(&OccupancyMap::resolve(rack))
}

impl RenderRow {
    /// Builds the elevation rows from an already-resolved map.
    pub fn from_occupancy(map: &OccupancyMap<'_>) -> Vec<RenderRow> {
        let mut rows = Vec::with_capacity(map.height() as usize);

        for (unit, entry) in map.iter().rev() {
            let row = match entry {
                None => RenderRow::Empty { unit },
                Some(entry) if entry.is_first_unit => RenderRow::Block {
                    unit,
                    span_units: block_height(map, unit, entry.device),
                    device: entry.device.clone(),
                },
                Some(_) => RenderRow::Continuation { unit },
            };
            rows.push(row);
        }
        rows
    }
}

/// Number of consecutive units from `anchor` downward held by `device`.
fn block_height(map: &OccupancyMap<'_>, anchor: u32, device: &Device) -> u32 {
    (1..=anchor)
        .rev()
        .take_while(|&u| map.get(u).is_some_and(|e| std::ptr::eq(e.device, device)))
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(name: &str, start: u32, span: u32) -> Device {
        Device::builder(name, start, span).build().unwrap()
    }

    #[test]
    fn test_empty_rack_renders_all_empty_rows() {
        let rack = Rack::new("r", 42, vec![]).unwrap();
        let rows = build_render_rows(&rack);
        assert_eq!(rows.len(), 42);
        assert!(rows.iter().all(RenderRow::is_empty));
    }

    #[test]
    fn test_rows_run_from_top_of_rack_down() {
        let rack = Rack::new("r", 4, vec![]).unwrap();
        let units: Vec<u32> = build_render_rows(&rack).iter().map(RenderRow::unit).collect();
        assert_eq!(units, vec![4, 3, 2, 1]);
    }

    #[test]
    fn test_multi_unit_device_renders_block_then_continuations() {
        let db = device("db-01", 2, 3);
        let rack = Rack::new("r", 5, vec![db.clone()]).unwrap();

        let rows = build_render_rows(&rack);

        assert_eq!(
            rows,
            vec![
                RenderRow::Empty { unit: 5 },
                RenderRow::Block { unit: 4, span_units: 3, device: db },
                RenderRow::Continuation { unit: 3 },
                RenderRow::Continuation { unit: 2 },
                RenderRow::Empty { unit: 1 },
            ]
        );
    }

    #[test]
    fn test_adjacent_devices_render_as_separate_blocks() {
        let a = device("a", 1, 2);
        let b = device("b", 3, 2);
        let rack = Rack::new("r", 4, vec![a, b]).unwrap();

        let rows = build_render_rows(&rack);

        assert!(matches!(rows[0], RenderRow::Block { unit: 4, span_units: 2, .. }));
        assert!(matches!(rows[1], RenderRow::Continuation { unit: 3 }));
        assert!(matches!(rows[2], RenderRow::Block { unit: 2, span_units: 2, .. }));
        assert!(matches!(rows[3], RenderRow::Continuation { unit: 1 }));
    }

    #[test]
    fn test_clipped_device_block_covers_in_range_units_only() {
        let rack = Rack::new("r", 10, vec![device("tall", 8, 5)]).unwrap();
        let rows = build_render_rows(&rack);

        assert_eq!(rows.len(), 10);
        match &rows[0] {
            RenderRow::Block { unit, span_units, device } => {
                assert_eq!(*unit, 10);
                assert_eq!(*span_units, 3);
                assert_eq!(device.unit_span(), 5);
            }
            other => panic!("expected block, got {other:?}"),
        }
    }

    #[test]
    fn test_refused_device_renders_nothing() {
        let rack = Rack::new("r", 6, vec![device("a", 1, 2), device("b", 2, 3)]).unwrap();
        let rows = build_render_rows(&rack);

        let blocks = rows.iter().filter(|r| matches!(r, RenderRow::Block { .. })).count();
        assert_eq!(blocks, 1);
        assert_eq!(rows.len(), 6);
    }

    #[test]
    fn test_render_row_serializes_with_kind_tag() {
        let json = serde_json::to_value(RenderRow::Continuation { unit: 7 }).unwrap();
        assert_eq!(json["kind"], "continuation");
        assert_eq!(json["unit"], 7);
    }
}
