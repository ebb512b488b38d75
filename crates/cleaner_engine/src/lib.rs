//! Cleaner engine: row tasks, worker pool, batch coordinator, checkpoints and
//! run control.
mod client;
mod controller;
mod coordinator;
mod decode;
mod pool;
mod progress;
mod signal;
mod store;
mod task;
mod types;

pub use client::{ChatClient, ClientSettings, ReqwestChatClient, DEFAULT_ENDPOINT, DEFAULT_MODEL};
pub use controller::RunController;
pub use coordinator::BatchCoordinator;
pub use decode::{decode_text, DecodeError, DecodedText};
pub use pool::{TaskContext, WorkerPool};
pub use progress::{ChannelProgressSink, ProgressSink};
pub use signal::RunSignal;
pub use store::{is_locked, load_table, save_table, CheckpointStore, CsvTableStore, TableIoError};
pub use task::{RowTask, TaskLimits};
pub use types::{ProgressEvent, RowError, RowFailure, RowOutcome};
