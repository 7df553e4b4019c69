//! Presentation for `prefetch check`.

use super::shared::format_section_heading;
use crate::manifest::Manifest;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use std::collections::BTreeMap;

/// Declared dependencies with their occurrence counts.
pub fn format_check_text(manifest: &Manifest) -> String {
    let mut out = String::new();
    let title = match manifest.name.as_deref() {
        Some(name) => format!("Manifest '{}'", name),
        None => "Manifest".to_string(),
    };
    out.push_str(&format!("{}\n\n", format_section_heading(&title)));

    let ids = manifest.dependency_ids();
    if ids.is_empty() {
        out.push_str("No dependencies declared.\n");
        return out;
    }

    let mut order = Vec::new();
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for id in &ids {
        let count = counts.entry(id).or_insert(0);
        if *count == 0 {
            order.push(*id);
        }
        *count += 1;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Dependency", "Declared"]);
    for id in order {
        table.add_row(vec![id.to_string(), counts[id].to_string()]);
    }
    out.push_str(&format!("{}\n\n", table));

    let duplicates = manifest.duplicate_ids();
    if duplicates.is_empty() {
        out.push_str(&format!("{} dependencies, no duplicate ids\n", ids.len()));
    } else {
        out.push_str(&format!("Duplicate ids: {}\n", duplicates.join(", ")));
    }
    out
}
