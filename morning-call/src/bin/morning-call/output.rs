use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{Attribute, Cell, Color as TableColor, Table, presets};
use morning_call::DomainError;
use serde::Serialize;

#[derive(Clone, Copy, Debug, ValueEnum, Default, PartialEq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    /// One summary line per report
    Compact,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Flags {
    pub format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
    pub plain: bool,
}

/// A command result that can be printed in every output format.
pub trait Report: Serialize {
    fn table(&self, printer: &Printer) -> Table;
    fn summary(&self) -> String;
}

/// Text shown for a refused operation: status, kind, reason code and message.
pub fn refusal_line(err: &DomainError) -> String {
    match err.reason_code() {
        Some(code) => format!("{} {} [{code}]: {}", err.status_code(), err.kind, err.message),
        None => format!("{} {}: {}", err.status_code(), err.kind, err.message),
    }
}

pub struct Printer {
    pub flags: Flags,
}

impl Printer {
    pub fn new(flags: Flags) -> Self {
        Self { flags }
    }

    fn chatty(&self) -> bool {
        !self.flags.quiet && self.flags.format != OutputFormat::Json
    }

    pub fn emit<R: Report>(&self, report: &R) -> Result<()> {
        if self.flags.quiet {
            return Ok(());
        }
        match self.flags.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
            OutputFormat::Table => println!("{}", report.table(self)),
            OutputFormat::Compact => println!("{}", report.summary()),
        }
        Ok(())
    }

    pub fn done(&self, message: &str) {
        if self.chatty() {
            let mark = if self.flags.plain { "ok".normal() } else { "✓".green() };
            println!("{mark} {message}");
        }
    }

    pub fn note(&self, message: &str) {
        if self.chatty() {
            println!("{}", if self.flags.plain { message.normal() } else { message.dimmed() });
        }
    }

    pub fn caution(&self, message: &str) {
        if self.chatty() {
            println!("{}", if self.flags.plain { message.normal() } else { message.yellow() });
        }
    }

    /// Shown only with `--verbose`, on stderr.
    pub fn detail(&self, message: &str) {
        if self.flags.verbose && !self.flags.quiet {
            eprintln!("{}", if self.flags.plain { message.normal() } else { message.bright_black() });
        }
    }

    /// Printed even in quiet mode.
    pub fn error(&self, message: &str) {
        let mark = if self.flags.plain { "error:".normal() } else { "✗".red().bold() };
        eprintln!("{mark} {message}");
    }

    pub fn refused(&self, err: &DomainError) {
        self.error(&refusal_line(err));
    }

    pub fn section(&self, title: &str) {
        if self.chatty() {
            if self.flags.plain {
                println!("{title}\n{}", "-".repeat(title.chars().count()));
            } else {
                println!("{}", title.bright_blue().bold());
            }
        }
    }

    pub fn table(&self, headers: &[&str]) -> Table {
        let mut table = Table::new();
        table.load_preset(if self.flags.plain { presets::ASCII_FULL } else { presets::UTF8_FULL_CONDENSED });
        table.set_header(headers.iter().map(|header| {
            let cell = Cell::new(header).add_attribute(Attribute::Bold);
            if self.flags.plain { cell } else { cell.fg(TableColor::Cyan) }
        }));
        table
    }

    /// Green for success, yellow for a refusal carrying its status code.
    pub fn outcome_cell(&self, status: Option<u16>) -> Cell {
        let (text, color) = match status {
            None => ("ok".to_string(), TableColor::Green),
            Some(code) => (format!("refused {code}"), TableColor::Yellow),
        };
        let cell = Cell::new(text);
        if self.flags.plain { cell } else { cell.fg(color) }
    }
}
