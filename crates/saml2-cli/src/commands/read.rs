//! `saml2 read`: structural read without verification.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use saml2_token::Saml2TokenHandler;

use crate::config::{CliConfig, OutputFormat};
use crate::output::{self, fields, heading, optional};

/// What `read` reports about an assertion.
#[derive(Debug, Serialize)]
pub struct AssertionSummary {
    /// Assertion `ID`.
    pub id: String,
    /// Issuer value.
    pub issuer: String,
    /// `IssueInstant`.
    pub issue_instant: DateTime<Utc>,
    /// Subject name identifier, if any.
    pub subject: Option<String>,
    /// `NotBefore`.
    pub not_before: Option<DateTime<Utc>>,
    /// `NotOnOrAfter`.
    pub not_on_or_after: Option<DateTime<Utc>>,
    /// Audiences across all restrictions.
    pub audiences: Vec<String>,
    /// Statement kinds in document order.
    pub statements: Vec<String>,
    /// Whether the assertion carries an enveloped signature.
    pub signed: bool,
}

/// Runs the read command.
pub fn run_read(file: &Path, config: &CliConfig, format: OutputFormat) -> crate::CliResult<()> {
    let raw = std::fs::read_to_string(file)?;
    let handler = Saml2TokenHandler::with_config(config.handler)?;
    let token = handler.read_token(&raw)?;
    let assertion = token.assertion();

    let summary = AssertionSummary {
        id: token.id().to_string(),
        issuer: token.issuer().to_string(),
        issue_instant: assertion.issue_instant(),
        subject: assertion
            .subject()
            .and_then(|s| s.name_id.as_ref())
            .map(|n| n.value.clone()),
        not_before: token.valid_from(),
        not_on_or_after: token.valid_to(),
        audiences: assertion.audiences(),
        statements: assertion
            .statements()
            .iter()
            .map(|s| s.kind().to_string())
            .collect(),
        signed: assertion.is_signed(),
    };

    output::output(&summary, format, |s| {
        heading("Assertion");
        fields(&[
            ("id", s.id.clone()),
            ("issuer", s.issuer.clone()),
            ("issue instant", s.issue_instant.to_rfc3339()),
            ("subject", optional(s.subject.as_deref())),
            ("not before", optional(s.not_before.map(|t| t.to_rfc3339()))),
            ("not on or after", optional(s.not_on_or_after.map(|t| t.to_rfc3339()))),
            ("audiences", s.audiences.join(", ")),
            ("statements", s.statements.join(", ")),
            ("signed", s.signed.to_string()),
        ]);
    })
}
