//! Microsoft Entra ID user export
//!
//! This crate pulls every user from the Microsoft Graph `/users` collection,
//! normalizes each record against a template of defaults for the fields the
//! operator asked for, and hands the projected records to a sink.
//!
//! # Features
//!
//! - `OAuth2` client credentials authentication
//! - GET retries on 429/503/504 honoring `Retry-After`
//! - `@odata.nextLink` pagination
//! - Recursive default merging, tolerant of missing or unexpected fields
//! - Per-record failure isolation
//!
//! # Example
//!
//! ```no_run
//! use entra_user_export::{parse_selection, ExportConfig, JsonFileSink, SelectionOutcome, UserExporter};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExportConfig::builder()
//!     .tenant_id("your-tenant-id")
//!     .client_id("your-client-id")
//!     .client_secret("your-client-secret")
//!     .build()?;
//!
//! let SelectionOutcome::Fields(selection) = parse_selection("3,4")? else {
//!     return Ok(());
//! };
//!
//! let mut sink = JsonFileSink::timestamped(&config.output_dir);
//! let exporter = UserExporter::new(&config)?;
//! let summary = exporter.run(&selection, &mut sink).await?;
//! println!("Saved {} users to {}", summary.total, sink.path().display());
//! # Ok(())
//! # }
//! ```

mod auth;
mod config;
mod error;
mod export;
mod fields;
mod graph_client;
mod merge;
mod pagination;
mod projection;
mod selection;
mod sink;
mod template;

// Re-exports
pub use auth::{AccessToken, Authenticator};
pub use config::{
    ConfigError, EntraCloudEnvironment, EntraCredentials, ExportConfig, ExportConfigBuilder,
    DEFAULT_API_VERSION, DEFAULT_MAX_ATTEMPTS, DEFAULT_REQUEST_TIMEOUT, DEFAULT_RETRY_AFTER,
};
pub use error::{ExportError, ExportResult};
pub use export::{normalize_record, process_records, ExportSummary, UserExporter};
pub use fields::{FieldKind, UserField, CORE_FIELDS, EXIT_MENU_KEY};
pub use graph_client::{is_retryable, retry_after, GraphClient};
pub use merge::merge_defaults;
pub use pagination::{
    list_all, page_size, select_clause, ODataPage, DEFAULT_PAGE_SIZE, REDUCED_PAGE_SIZE,
};
pub use projection::{project, project_raw};
pub use selection::{parse_selection, Selection, SelectionError, SelectionOutcome};
pub use sink::{ExportRecord, JsonFileSink, MemorySink, RecordSink};
pub use template::{build_template, default_value, Template};
