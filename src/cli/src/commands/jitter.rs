//! Show the jitter slots an identity maps to.

use anyhow::{bail, Result};
use cadence_core::schedule::{
    CronExpression, JitterScheme, JitterSlots, ObjectIdentity, RandomMacro, ScheduleResolver,
};
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct JitterArgs {
    /// Object identity as namespace/name
    identity: String,

    /// Only show this macro (e.g. @daily-random)
    #[arg(long = "macro", value_name = "MACRO")]
    random_macro: Option<String>,
}

#[derive(Serialize)]
struct JitterReport {
    identity: ObjectIdentity,
    scheme: JitterScheme,
    seed: String,
    slots: JitterSlots,
    schedules: Vec<ExpansionRow>,
}

#[derive(Serialize, Tabled)]
struct ExpansionRow {
    #[tabled(rename = "Macro")]
    #[serde(rename = "macro")]
    random_macro: String,
    #[tabled(rename = "Cron")]
    cron: CronExpression,
}

fn selected(filter: Option<&str>) -> Result<Vec<RandomMacro>> {
    match filter {
        None => Ok(RandomMacro::ALL.to_vec()),
        Some(token) => match RandomMacro::from_token(token) {
            Some(m) => Ok(vec![m]),
            None => bail!(
                "'{}' is not a random schedule macro (expected one of {})",
                token,
                RandomMacro::ALL.map(|m| m.as_str()).join(", ")
            ),
        },
    }
}

pub fn execute(args: JitterArgs, format: OutputFormat) -> Result<()> {
    let identity: ObjectIdentity = args.identity.parse()?;
    let macros = selected(args.random_macro.as_deref())?;

    let resolver = ScheduleResolver::default();
    let scheme = resolver.scheme();

    let report = JitterReport {
        seed: scheme.seed_hex(&identity),
        slots: scheme.derive(&identity),
        schedules: macros
            .into_iter()
            .map(|m| ExpansionRow {
                random_macro: m.as_str().to_string(),
                cron: resolver.resolve(&identity, &m.into()),
            })
            .collect(),
        identity,
        scheme,
    };

    match format {
        OutputFormat::Table => {
            output::print_header(&format!("Jitter for {}", report.identity));
            output::print_detail("Scheme", report.scheme.as_str());
            output::print_detail("Seed", &report.seed);
            output::print_detail("Minute", &report.slots.minute.to_string());
            output::print_detail("Hour", &report.slots.hour.to_string());
            output::print_detail("Day of week", &report.slots.day_of_week.to_string());
            output::print_detail("Day of month", &report.slots.day_of_month.to_string());
            println!();
            output::print_table(&report.schedules);
            Ok(())
        }
        _ => output::print_item(&report, format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_macros() {
        assert_eq!(selected(None).unwrap().len(), 4);
        assert_eq!(selected(Some("@weekly-random")).unwrap(), vec![RandomMacro::Weekly]);
        assert!(selected(Some("@weekly")).is_err());
    }
}
