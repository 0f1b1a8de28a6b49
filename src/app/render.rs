//! Plain-text report formatting.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Left-aligned columns separated by two spaces, with a dashed rule under the header.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(index) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(render_row(headers, &widths));
    lines.push(render_row(&rule.iter().map(String::as_str).collect::<Vec<_>>(), &widths));
    for row in rows {
        lines.push(render_row(&row.iter().map(String::as_str).collect::<Vec<_>>(), &widths));
    }
    lines.join("\n")
}

fn render_row(cells: &[&str], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Two-column key/value listing.
pub fn fields(pairs: &[(&str, String)]) -> String {
    let width = pairs.iter().map(|(key, _)| key.chars().count()).max().unwrap_or(0);
    pairs
        .iter()
        .map(|(key, value)| format!("  {:<width$}  {}", key, value, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Elapsed time as `Xm Ys`.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}m {}s", secs / 60, secs % 60)
}

/// Age of a timestamp relative to `now`.
pub fn relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - at).num_seconds().max(0);
    match secs {
        0..60 => "just now".to_string(),
        60..3600 => format!("{}m ago", secs / 60),
        3600..86400 => format!("{}h ago", secs / 3600),
        _ => format!("{}d ago", secs / 86400),
    }
}
