//! Cleaner core: field schema, row prompts and replies, the table model and
//! the pure run state machine. Nothing in here touches IO.
mod batch;
mod config;
mod effect;
mod error;
mod msg;
mod prompt;
mod response;
mod schema;
mod state;
mod summary;
mod table;
mod update;
mod view_model;

pub use batch::{plan_batches, progress_percent, Batch};
pub use config::{
    RunConfig, RunPlan, DEFAULT_BATCH_SIZE, DEFAULT_MAX_WORKERS, DEFAULT_RETRY_BACKOFF,
    DEFAULT_ROW_TIMEOUT,
};
pub use effect::{Effect, StopMode};
pub use error::{SchemaError, StartError};
pub use msg::Msg;
pub use prompt::{build_prompt, render_row, OUTPUT_INSTRUCTION, ROW_DATA_HEADER};
pub use response::{parse_response, split_label_value};
pub use schema::{extract_field_schema, normalize_label, preview_fields, FieldSchema};
pub use state::{AppState, RunState, STATUS_HISTORY_LIMIT};
pub use summary::{RunEnd, RunSummary};
pub use table::{FieldMap, RowSnapshot, Table};
pub use update::update;
pub use view_model::AppViewModel;
