//! Show the validated global resource defaults.

use anyhow::Result;
use cadence_core::resources::{GlobalDefaults, ResourceAxis};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};

#[derive(Serialize, Tabled)]
struct AxisRow {
    #[tabled(rename = "Axis")]
    axis: ResourceAxis,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Millis")]
    millis: String,
}

fn rows(defaults: &GlobalDefaults) -> Vec<AxisRow> {
    ResourceAxis::ALL
        .into_iter()
        .map(|axis| match defaults.requirements().get(axis) {
            Some(quantity) => AxisRow {
                axis,
                value: quantity.to_string(),
                millis: quantity
                    .millis()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            },
            None => AxisRow {
                axis,
                value: "(unset)".to_string(),
                millis: "-".to_string(),
            },
        })
        .collect()
}

pub fn execute(defaults: &GlobalDefaults, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            output::print_table(&rows(defaults));
            if defaults.is_empty() {
                output::print_info("No global defaults configured");
            } else {
                output::print_success("Global defaults are valid");
            }
            Ok(())
        }
        _ => output::print_item(defaults.requirements(), format),
    }
}
