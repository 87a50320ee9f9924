//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use infobox_domain::{
    Coordinate, DatePrecision, EntityId, EntityLabel, PartialDate, PropertyToken, Qualifier, StoredClaim,
};
use infobox_extractor::{ImportPlan, InfoboxRecord, Reference, IMPORTED_FROM, REFERENCE_URL};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
    Table,
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the field names of each infobox.
    pub fn format_tokens(&self, blocks: &[Vec<PropertyToken>]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(blocks)?),
            OutputFormat::Quiet => Ok(blocks
                .iter()
                .flatten()
                .map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if blocks.iter().all(|b| b.is_empty()) {
                    return Ok(self.colorize("No fields found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Infobox", "Field"]);
                for (i, tokens) in blocks.iter().enumerate() {
                    for token in tokens {
                        builder.push_record([(i + 1).to_string(), token.to_string()]);
                    }
                }
                Ok(styled(builder.build()))
            }
        }
    }

    /// Format extracted infobox records.
    pub fn format_records(&self, records: &[InfoboxRecord]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
            OutputFormat::Quiet => Ok(records
                .iter()
                .flat_map(|r| r.fields.iter())
                .map(|f| format!("{}\t{}", f.name, f.value))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if records.iter().all(|r| r.is_empty()) {
                    return Ok(self.colorize("No infobox values found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Infobox", "Field", "Kind", "Value"]);
                for (i, record) in records.iter().enumerate() {
                    for field in &record.fields {
                        builder.push_record([
                            (i + 1).to_string(),
                            field.name.to_string(),
                            field.value.kind().to_string(),
                            field.value.to_string(),
                        ]);
                    }
                    for failure in &record.failures {
                        builder.push_record([
                            (i + 1).to_string(),
                            failure.name.to_string(),
                            self.colorize("error", "red"),
                            failure.reason.clone(),
                        ]);
                    }
                }
                Ok(styled(builder.build()))
            }
        }
    }

    /// Format an import plan.
    pub fn format_plan(&self, plan: &ImportPlan) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(plan)?),
            OutputFormat::Quiet => Ok(plan
                .proposals
                .iter()
                .map(|p| format!("{}\t{}\t{}", p.property, p.mode, p.target))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => Ok(self.format_plan_table(plan)),
        }
    }

    fn format_plan_table(&self, plan: &ImportPlan) -> String {
        let mut sections = Vec::new();

        if plan.proposals.is_empty() {
            sections.push(self.colorize("Nothing to write.", "yellow"));
        } else {
            let mut builder = Builder::default();
            builder.push_record(["Field", "Property", "Mode", "Value", "Qualifiers", "References"]);
            for proposal in &plan.proposals {
                builder.push_record([
                    proposal.field.clone(),
                    proposal.property.to_string(),
                    proposal.mode.to_string(),
                    proposal.target.to_string(),
                    format_qualifiers(&proposal.qualifiers),
                    format_references(&proposal.references),
                ]);
            }
            sections.push(styled(builder.build()));
        }

        if !plan.skipped.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Field", "Property", "Value", "Skipped because"]);
            for skip in &plan.skipped {
                builder.push_record([
                    skip.field.clone(),
                    skip.property.to_string(),
                    skip.value.to_string(),
                    skip.reason.to_string(),
                ]);
            }
            sections.push(styled(builder.build()));
        }

        if !plan.rejected.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Field", "Value", "Rejected because"]);
            for rejection in &plan.rejected {
                builder.push_record([
                    rejection.field.clone(),
                    rejection.value.clone(),
                    rejection.reason.to_string(),
                ]);
            }
            sections.push(styled(builder.build()));
        }

        let meta = &plan.metadata;
        sections.push(self.info(&format!(
            "{}: {} infobox(es), {} field(s), {} candidate(s): {} to write, {} skipped, {} rejected ({} ms)",
            plan.entity,
            meta.blocks,
            meta.fields_seen,
            meta.candidates,
            plan.proposals.len(),
            plan.skipped.len(),
            plan.rejected.len(),
            meta.processing_time_ms,
        )));
        if !meta.unmapped.is_empty() {
            sections.push(self.warning(&format!("Unmapped fields: {}", meta.unmapped.join(", "))));
        }

        sections.join("\n")
    }

    /// Format a record's stored claims.
    pub fn format_claims(
        &self,
        entity: &EntityId,
        label: Option<&EntityLabel>,
        claims: &[StoredClaim],
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "entity": entity,
                "label": label.map(|l| serde_json::json!({ "label": l.label, "language": l.language })),
                "claims": claims,
            }))?),
            OutputFormat::Quiet => Ok(claims
                .iter()
                .map(|c| format!("{}\t{}", c.property, c.target))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                let title = match label {
                    Some(label) => format!("{} ({}, {})", entity, label.label, label.language),
                    None => entity.to_string(),
                };
                if claims.is_empty() {
                    return Ok(format!("{}\n{}", title, self.colorize("No claims found.", "yellow")));
                }

                let mut builder = Builder::default();
                builder.push_record(["Statement", "Property", "Value", "Qualifiers"]);
                for claim in claims {
                    builder.push_record([
                        claim.id.clone().unwrap_or_else(|| "-".to_string()),
                        claim.property.to_string(),
                        claim.target.to_string(),
                        format_qualifiers(&claim.qualifiers),
                    ]);
                }
                Ok(format!("{}\n{}", title, styled(builder.build())))
            }
        }
    }

    /// Format a list of record ids.
    pub fn format_entities(&self, entities: &[EntityId]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(entities)?),
            OutputFormat::Quiet | OutputFormat::Table => {
                if entities.is_empty() && self.format == OutputFormat::Table {
                    return Ok(self.colorize("Store is empty.", "yellow"));
                }
                Ok(entities.iter().map(|e| e.as_str()).collect::<Vec<_>>().join("\n"))
            }
        }
    }

    /// Format a normalized date.
    pub fn format_date(&self, date: &PartialDate) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(date)?),
            OutputFormat::Quiet => Ok(date.to_string()),
            OutputFormat::Table => Ok(format!("{} ({})", date, date_precision(date))),
        }
    }

    /// Format a computed coordinate.
    pub fn format_coordinate(&self, coordinate: &Coordinate) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(coordinate)?),
            OutputFormat::Quiet => Ok(coordinate.to_decimal_params().join("|")),
            OutputFormat::Table => Ok(format!(
                "{} (precision {})",
                coordinate.to_decimal_params().join("|"),
                coordinate.precision()
            )),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn styled(mut table: Table) -> String {
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

fn date_precision(date: &PartialDate) -> &'static str {
    match date.precision() {
        DatePrecision::Day => "day",
        DatePrecision::Month => "month",
        DatePrecision::Year => "year",
    }
}

/// `P585: 1911-05-31, ...`
fn format_qualifiers(qualifiers: &[Qualifier]) -> String {
    qualifiers
        .iter()
        .map(|q| format!("{}: {}", q.property, q.target))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `P143: Q328`, `P4656: <url>`
fn format_references(references: &[Reference]) -> String {
    let mut lines = Vec::new();
    for reference in references {
        if let Some(source) = &reference.imported_from {
            lines.push(format!("P{}: {}", IMPORTED_FROM, source));
        }
        if let Some(url) = &reference.url {
            lines.push(format!("P{}: {}", REFERENCE_URL, url));
        }
    }
    lines.join("\n")
}
