//! Plain-text rendering of listings and session state.

use std::time::SystemTime;

use burrow_core::{ClipboardMode, EntryRef, ListingSnapshot, SelectionModel};

/// Formats a byte count with B/KB/MB/GB units and at most two decimals.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_owned();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[unit])
}

/// Formats how long before `now` the entry was modified.
pub fn format_age(modified: SystemTime, now: SystemTime) -> String {
    let elapsed = match now.duration_since(modified) {
        Ok(d) => d,
        Err(_) => return "just now".to_owned(),
    };

    let secs = elapsed.as_secs();
    if secs < 60 {
        return format!("{secs}s ago");
    }
    let mins = secs / 60;
    if mins < 60 {
        return format!("{mins}m ago");
    }
    let hours = mins / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }
    let days = hours / 24;
    format!("{days}d ago")
}

/// The kind column: `folder`, the extension, or `file`.
fn kind_label(entry: &EntryRef) -> &str {
    if entry.is_folder() {
        "folder"
    } else {
        entry.extension().unwrap_or("file")
    }
}

/// Renders one listing row. Selected rows are marked with `*`.
pub fn render_entry(entry: &EntryRef, selected: bool, now: SystemTime) -> String {
    let marker = if selected { '*' } else { ' ' };
    let name = if entry.is_folder() {
        format!("{}/", entry.name())
    } else {
        entry.name().to_owned()
    };
    let size = entry.size_bytes().map(format_size).unwrap_or_default();
    let age = entry
        .modified_at()
        .map(|m| format_age(m, now))
        .unwrap_or_default();
    format!("{marker} {name:<32} {:<8} {size:>10}  {age}", kind_label(entry))
        .trim_end()
        .to_owned()
}

/// Renders the whole listing with a header line.
pub fn render_listing(
    snapshot: &ListingSnapshot,
    selection: &SelectionModel,
    now: SystemTime,
) -> String {
    let mut lines = vec![format!(
        "{} ({} item(s))",
        snapshot.path().display(),
        snapshot.len()
    )];
    if snapshot.is_empty() {
        lines.push("  (empty)".to_owned());
    }
    for entry in snapshot.entries() {
        lines.push(render_entry(
            entry,
            selection.is_selected(entry.path()),
            now,
        ));
    }
    lines.join("\n")
}

/// One-line clipboard summary.
pub fn render_clipboard(mode: Option<ClipboardMode>, items: usize) -> String {
    match mode {
        Some(mode) => format!("clipboard: {mode} {items} item(s)"),
        None => "clipboard: empty".to_owned(),
    }
}
