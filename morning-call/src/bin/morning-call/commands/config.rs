use anyhow::Result;
use comfy_table::Cell;
use morning_call::CoreConfig;
use serde::Serialize;

use crate::context::CliContext;
use crate::output::{Printer, Report};

#[derive(Serialize)]
struct ConfigReport<'a> {
    source: String,
    from_file: bool,
    config: &'a CoreConfig,
}

impl Report for ConfigReport<'_> {
    fn table(&self, printer: &Printer) -> comfy_table::Table {
        let mut table = printer.table(&["Setting", "Value"]);
        let rows = [
            ("scheduling.max_days_ahead", self.config.scheduling.max_days_ahead.to_string()),
            ("scheduling.max_message_chars", self.config.scheduling.max_message_chars.to_string()),
            ("users.min_username_chars", self.config.users.min_username_chars.to_string()),
            ("users.max_username_chars", self.config.users.max_username_chars.to_string()),
        ];
        for (key, value) in rows {
            table.add_row(vec![Cell::new(key), Cell::new(value)]);
        }
        table
    }

    fn summary(&self) -> String {
        format!(
            "max_days_ahead={} max_message_chars={} username_chars={}..={}",
            self.config.scheduling.max_days_ahead,
            self.config.scheduling.max_message_chars,
            self.config.users.min_username_chars,
            self.config.users.max_username_chars
        )
    }
}

pub fn handle_config(ctx: &CliContext, printer: &Printer) -> Result<()> {
    printer.section("Configuration");
    if ctx.from_file {
        printer.note(&format!("loaded from {}", ctx.config_path.display()));
    } else {
        printer.note(&format!("built-in defaults, create {} to override", ctx.config_path.display()));
    }

    let report = ConfigReport {
        source: ctx.config_path.display().to_string(),
        from_file: ctx.from_file,
        config: &ctx.config,
    };
    printer.emit(&report)?;

    if printer.flags.verbose {
        printer.detail(&ctx.config.to_toml_string()?);
    }
    Ok(())
}
