//! Presentation for `prefetch resolve`.

use super::shared::{format_section_heading, yes_no};
use crate::error::PrefetchError;
use crate::resolver::Resolution;
use crate::state::RehydrationState;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use serde_json::json;

/// Human-readable summary: run stats, dependency table, snapshot, failure.
pub fn format_resolve_text(resolution: &Resolution<String>, outline: Option<&str>) -> String {
    let report = &resolution.report;
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Resolution")));
    out.push_str(&format!("  Rehydrated: {}\n", yes_no(report.rehydrated)));
    out.push_str(&format!("  Complete: {}\n", yes_no(resolution.is_complete())));
    if !report.pruned.is_empty() {
        let pruned: Vec<String> = report
            .pruned
            .iter()
            .map(|p| format!("{} ({})", p.node, p.limit.as_str()))
            .collect();
        out.push_str(&format!("  Pruned: {}\n", pruned.join(", ")));
    }
    out.push_str(&format!(
        "  Passes: {}  Nodes visited: {}  Elapsed: {} ms\n\n",
        report.passes, report.nodes_visited, report.elapsed_ms
    ));

    if report.dependencies.is_empty() {
        out.push_str("No dependencies discovered.\n\n");
    } else {
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Dependency", "State", "Value"]);
        for (id, state) in &report.dependencies {
            let value = resolution
                .exec_context()
                .get_component(id)
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string());
            table.add_row(vec![id.clone(), state.as_str().to_string(), value]);
        }
        out.push_str(&format!("{}\n\n", table));
    }

    out.push_str(&format!(
        "{}\n\n",
        format_section_heading(&format!("State ({})", resolution.state_identifier))
    ));
    let snapshot = resolution
        .state
        .to_json()
        .unwrap_or_else(|_| "{}".to_string());
    out.push_str(&format!("{}\n", snapshot));

    if let Some(ref failure) = resolution.failure {
        out.push_str(&format!("\nFailure: {}\n", failure));
    }

    if let Some(outline) = outline {
        out.push_str(&format!("\n{}\n\n", format_section_heading("Tree")));
        out.push_str(outline);
    }
    out
}

/// Full result as pretty JSON.
///
/// `rehydrate` is the state the run consumed, if any; its post-run form
/// (consumed flags cleared) is included as `rehydration`.
pub fn format_resolve_json(
    resolution: &Resolution<String>,
    rehydrate: Option<&RehydrationState>,
    outline: Option<&str>,
) -> Result<String, PrefetchError> {
    let mut value = json!({
        "state_identifier": resolution.state_identifier,
        "state": resolution.state,
        "report": resolution.report,
    });
    if let Some(original) = rehydrate {
        value["rehydration"] = serde_json::to_value(resolution.rehydration_after(original))?;
    }
    if let Some(outline) = outline {
        value["outline"] = json!(outline);
    }
    Ok(serde_json::to_string_pretty(&value)?)
}
