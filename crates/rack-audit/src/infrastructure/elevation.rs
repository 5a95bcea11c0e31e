//! Plain-text rack elevation for the CLI.
//!
//! One line per unit, top of the rack first:
//!
//! ```text
//! U5  ·
//! U4  ■ db-01 3U · Server         Active
//! U3  │
//! U2  │
//! U1  ▲ pdu-a 1U · PDU            Maintenance
//! ```
//!
//! The block marker reflects the device's [`StatusTone`].  With
//! `show_empty_units = false`, runs of two or more empty units collapse into a
//! single `U9-U6  · 4U free` line.

use rack_core::{DeviceStatus, RenderRow, StatusTone, Utilization};

use super::storage::config::DisplayConfig;

/// Layout options for [`render_elevation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElevationStyle {
    pub show_empty_units: bool,
    /// Label column width; `0` disables padding and truncation.
    pub label_width: usize,
}

impl Default for ElevationStyle {
    fn default() -> Self {
        (&DisplayConfig::default()).into()
    }
}

impl From<&DisplayConfig> for ElevationStyle {
    fn from(cfg: &DisplayConfig) -> Self {
        Self {
            show_empty_units: cfg.show_empty_units,
            label_width: cfg.label_width,
        }
    }
}

/// Renders `rows` (as produced by `build_render_rows`) into text lines.
pub fn render_elevation(rows: &[RenderRow], style: ElevationStyle) -> Vec<String> {
    let digits = rows
        .iter()
        .map(RenderRow::unit)
        .max()
        .map_or(1, |top| top.to_string().len());

    let mut lines = Vec::with_capacity(rows.len());
    let mut i = 0;
    while i < rows.len() {
        let row = &rows[i];
        if row.is_empty() && !style.show_empty_units {
            let run = rows[i..].iter().take_while(|r| r.is_empty()).count();
            if run > 1 {
                let bottom = rows[i + run - 1].unit();
                lines.push(format!("U{}-U{}  · {}U free", row.unit(), bottom, run));
                i += run;
                continue;
            }
        }
        lines.push(render_row(row, digits, style.label_width));
        i += 1;
    }
    lines
}

/// One-line utilization summary.
pub fn format_summary(util: &Utilization) -> String {
    let counts = DeviceStatus::ALL
        .iter()
        .map(|&s| format!("{} {}", s.label(), util.status_counts.get(s)))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{}/{}U used ({}%), {}U free; {}",
        util.occupied_units,
        util.total_units,
        util.percent,
        util.free_units(),
        counts
    )
}

fn render_row(row: &RenderRow, digits: usize, label_width: usize) -> String {
    let unit = format!("U{:<digits$}", row.unit());
    match row {
        RenderRow::Empty { .. } => format!("{unit}  ·"),
        RenderRow::Continuation { .. } => format!("{unit}  │"),
        RenderRow::Block { span_units, device, .. } => {
            let mut label = format!(
                "{} {}U · {}",
                device.name(),
                device.unit_span(),
                device.device_type().label()
            );
            if *span_units < device.unit_span() {
                label.push_str(" (clipped)");
            }
            let label = fit(&label, label_width);
            format!(
                "{unit}  {} {label:<label_width$}  {}",
                marker(device.status().tone()),
                device.status().label()
            )
        }
    }
}

fn marker(tone: StatusTone) -> char {
    match tone {
        StatusTone::Healthy => '■',
        StatusTone::Attention => '▲',
        StatusTone::Idle => '□',
        StatusTone::Decommissioned => '✕',
    }
}

/// Truncates `label` to `width` characters, ending in `…` when cut.
fn fit(label: &str, width: usize) -> String {
    if width == 0 || label.chars().count() <= width {
        return label.to_string();
    }
    let mut cut: String = label.chars().take(width - 1).collect();
    cut.push('…');
    cut
}
