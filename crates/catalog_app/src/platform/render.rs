use catalog_core::{BrowserViewModel, ItemRowView};
use catalog_engine::stem_preview;

const UID_WIDTH: usize = 8;
const STEM_WIDTH: usize = 72;

/// Renders the view model as plain text lines.
pub fn render(view: &BrowserViewModel) -> Vec<String> {
    let mut lines = Vec::with_capacity(view.items.len() + 4);

    let filter_label = view.filter.as_deref().unwrap_or("Any");
    let mut status = format!(
        "Filter: {} | Shown: {} | Selected: {}",
        filter_label,
        view.items.len(),
        view.selected_count
    );
    if view.loading {
        status.push_str(" | loading...");
    }
    lines.push(status);

    if view.building_index {
        lines.push("Subjects: loading subjects...".to_string());
    } else if !view.filter_values.is_empty() {
        lines.push(format!("Subjects: {}", view.filter_values.join(", ")));
    }

    if let Some(error) = &view.error {
        lines.push(format!("Error: {error}"));
    }

    if let Some(message) = &view.empty_message {
        lines.push(message.clone());
    }

    for (index, row) in view.items.iter().enumerate() {
        lines.push(render_row(index + 1, row));
    }

    if view.can_load_more {
        lines.push("More available: type \"more\".".to_string());
    }

    lines
}

fn render_row(position: usize, row: &ItemRowView) -> String {
    let mark = if row.selected { "[x]" } else { "[ ]" };
    let uid: String = row.uid.chars().take(UID_WIDTH).collect();
    format!(
        "{mark} {position:>3}. {uid:<width$} | {} | {} | {} | {}",
        row.primary_class.as_deref().unwrap_or("-"),
        row.module.as_deref().unwrap_or("-"),
        row.difficulty,
        stem_preview(&row.stem, STEM_WIDTH),
        width = UID_WIDTH,
    )
}
