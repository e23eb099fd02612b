use anyhow::Result;
use clap::Subcommand;
use comfy_table::Cell;
use morning_call::validators::{normalize_email, normalize_username};
use morning_call::{CoreConfig, DefaultValidator, DomainError, InputValidator, ValidationError, ValidationIssue};
use serde::Serialize;

use crate::output::{Printer, Report};

#[derive(Subcommand)]
pub enum CheckCommands {
    /// Validate an email address
    #[command(name = "email")]
    Email {
        /// Address to check
        value: String,
    },

    /// Validate a username
    #[command(name = "username")]
    Username {
        /// Username to check
        value: String,
    },
}

#[derive(Serialize)]
pub struct CheckReport {
    field: &'static str,
    input: String,
    normalized: String,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
}

impl Report for CheckReport {
    fn table(&self, printer: &Printer) -> comfy_table::Table {
        let mut table = printer.table(&["Field", "Input", "Normalized", "Valid", "Reason"]);
        table.add_row(vec![
            Cell::new(self.field),
            Cell::new(&self.input),
            Cell::new(&self.normalized),
            Cell::new(if self.valid { "yes" } else { "no" }),
            Cell::new(self.reason.unwrap_or("-")),
        ]);
        table
    }

    fn summary(&self) -> String {
        match self.reason {
            Some(reason) => format!("{} invalid ({reason})", self.field),
            None => format!("{} ok: {}", self.field, self.normalized),
        }
    }
}

pub fn handle_check_commands(command: CheckCommands, config: &CoreConfig, printer: &Printer) -> Result<()> {
    let validator = DefaultValidator::new(&config.users);
    let (field, input, normalized, outcome) = match command {
        CheckCommands::Email { value } => {
            let normalized = normalize_email(&value);
            let outcome = validator.check_email(&normalized);
            ("email", value, normalized, outcome)
        }
        CheckCommands::Username { value } => {
            let normalized = normalize_username(&value);
            let outcome = validator.check_username(&normalized);
            ("username", value, normalized, outcome)
        }
    };
    printer.detail(&format!("checking {field} {input:?}"));

    let report = CheckReport {
        field,
        input,
        normalized,
        valid: outcome.is_ok(),
        reason: outcome.err().map(|reason| reason.code()),
    };
    printer.emit(&report)?;

    match outcome {
        Ok(()) => {
            printer.done(&format!("{field} is valid"));
            Ok(())
        }
        Err(reason) => Err(DomainError::from(ValidationError::new([ValidationIssue::from_reason(field, reason)])).into()),
    }
}
