//! End-to-end export run.

use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use crate::merge::merge_defaults;
use crate::pagination::list_all;
use crate::projection::{project, project_raw};
use crate::selection::Selection;
use crate::sink::{ExportRecord, RecordSink};
use crate::template::{build_template, Template};
use crate::{Authenticator, ExportConfig, ExportError, ExportResult, GraphClient};

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    /// Records handed to the sink, failed ones included.
    pub total: usize,
    /// Records that became error records.
    pub failed: usize,
}

/// Normalizes one raw record against the template.
///
/// A `null` record is treated as empty. Any other non-object value cannot
/// be normalized and is rejected.
pub fn normalize_record(raw: &Value, template: &Template) -> ExportResult<Map<String, Value>> {
    match raw {
        Value::Object(_) | Value::Null => Ok(merge_defaults(template, raw)),
        Value::Array(_) => Err(ExportError::Record(
            "expected a JSON object, got an array".into(),
        )),
        Value::String(_) => Err(ExportError::Record(
            "expected a JSON object, got a string".into(),
        )),
        Value::Number(_) => Err(ExportError::Record(
            "expected a JSON object, got a number".into(),
        )),
        Value::Bool(_) => Err(ExportError::Record(
            "expected a JSON object, got a boolean".into(),
        )),
    }
}

/// Turns raw records into output records, one for one and in order.
///
/// A record that fails to normalize becomes an [`ExportRecord::Failed`];
/// the rest of the batch is unaffected.
#[must_use]
pub fn process_records(
    raw_records: &[Value],
    template: &Template,
    selection: &Selection,
) -> Vec<ExportRecord> {
    let total = raw_records.len();

    raw_records
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let label = raw
                .get("userPrincipalName")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .or_else(|| raw.get("id").and_then(Value::as_str))
                .unwrap_or("<unknown>");
            debug!("Processing {}/{}: {}", i + 1, total, label);

            match normalize_record(raw, template) {
                Ok(normalized) => ExportRecord::User(project(&normalized, selection)),
                Err(e) => {
                    warn!(user = label, "Failed to process user: {}", e);
                    ExportRecord::Failed {
                        user: project_raw(raw, selection),
                        error: e.to_string(),
                    }
                }
            }
        })
        .collect()
}

/// Runs authentication, retrieval, normalization and persistence in order.
#[derive(Debug)]
pub struct UserExporter<'a> {
    config: &'a ExportConfig,
    authenticator: Authenticator<'a>,
    client: GraphClient,
}

impl<'a> UserExporter<'a> {
    /// Creates an exporter for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be created.
    pub fn new(config: &'a ExportConfig) -> ExportResult<Self> {
        Ok(Self {
            config,
            authenticator: Authenticator::new(config)?,
            client: GraphClient::new(config)?,
        })
    }

    /// Exports all users with the selected fields into `sink`.
    ///
    /// Authentication and HTTP failures abort the run before the sink is
    /// touched. Per-record failures do not.
    #[instrument(skip(self, selection, sink), fields(selection = %selection))]
    pub async fn run<S: RecordSink>(
        &self,
        selection: &Selection,
        sink: &mut S,
    ) -> ExportResult<ExportSummary> {
        let template = build_template(selection);

        let token = self.authenticator.acquire_token().await?;
        let raw_records = list_all(&self.client, &self.config.users_url(), &token, selection).await?;

        let records = process_records(&raw_records, &template, selection);
        let failed = records.iter().filter(|r| r.is_failed()).count();

        sink.write_records(&records)?;

        let summary = ExportSummary {
            total: records.len(),
            failed,
        };
        info!(
            total = summary.total,
            failed = summary.failed,
            "Export completed"
        );
        Ok(summary)
    }
}
