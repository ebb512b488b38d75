#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cleaner_core::Table;
use cleaner_engine::{
    ChatClient, CheckpointStore, ProgressEvent, ProgressSink, RowError, TableIoError,
};

pub const TEMPLATE: &str = "### 规则\n   - 规格：容量\n   - 功效：主要功效\n";

pub fn init_logging() {
    engine_logging::initialize_for_tests();
}

/// Input table whose rows are `item-0`, `item-1`, ... in column `宝贝名`.
pub fn item_table(rows: usize) -> Table {
    Table::new(
        vec!["宝贝名".to_string()],
        (0..rows).map(|i| vec![format!("item-{i}")]).collect(),
    )
}

/// Row index a prompt was built for, read back from the `item-N` marker.
pub fn row_of(prompt: &str) -> usize {
    let start = prompt.find("item-").expect("row marker") + "item-".len();
    prompt[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .expect("row number")
}

type ReplyFn = dyn Fn(usize) -> Result<String, RowError> + Send + Sync;
type HookFn = dyn Fn(usize) + Send + Sync;

/// In-memory chat client: replies per row, records call order and the peak
/// number of concurrent calls.
pub struct ScriptedClient {
    reply: Box<ReplyFn>,
    on_call: Option<Box<HookFn>>,
    delay: Duration,
    clock: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    spans: Mutex<Vec<(usize, usize, usize)>>,
}

impl ScriptedClient {
    pub fn new(reply: impl Fn(usize) -> Result<String, RowError> + Send + Sync + 'static) -> Self {
        Self {
            reply: Box::new(reply),
            on_call: None,
            delay: Duration::from_millis(10),
            clock: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            spans: Mutex::new(Vec::new()),
        }
    }

    /// Replies `规格:<n>ml` and `功效:effect-<n>` for row n.
    pub fn filling() -> Self {
        Self::new(|row| Ok(format!("规格:{row}ml\n功效:effect-{row}")))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Run `hook(row)` when a call starts.
    pub fn on_call(mut self, hook: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.on_call = Some(Box::new(hook));
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// `(row, start tick, end tick)` for every finished call.
    pub fn spans(&self) -> Vec<(usize, usize, usize)> {
        self.spans.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.spans.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl ChatClient for ScriptedClient {
    async fn complete(&self, _api_key: &str, prompt: &str) -> Result<String, RowError> {
        let row = row_of(prompt);
        let start = self.clock.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(hook) = &self.on_call {
            hook(row);
        }

        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let end = self.clock.fetch_add(1, Ordering::SeqCst);
        self.spans.lock().unwrap().push((row, start, end));
        (self.reply)(row)
    }
}

/// Checkpoint store keeping every persisted table in memory.
pub struct RecordingStore {
    path: PathBuf,
    saved: Mutex<Vec<Table>>,
    failures_left: AtomicUsize,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            path: PathBuf::from("memory.csv"),
            saved: Mutex::new(Vec::new()),
            failures_left: AtomicUsize::new(0),
        }
    }

    /// The next `count` persists fail as if the file were locked.
    pub fn failing_first(self, count: usize) -> Self {
        self.failures_left.store(count, Ordering::SeqCst);
        self
    }

    pub fn persist_count(&self) -> usize {
        self.saved.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<Table> {
        self.saved.lock().unwrap().last().cloned()
    }
}

impl CheckpointStore for RecordingStore {
    fn persist(&self, table: &Table) -> Result<(), TableIoError> {
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(TableIoError::WriteLocked(self.path.display().to_string()));
        }
        self.saved.lock().unwrap().push(table.clone());
        Ok(())
    }

    fn location(&self) -> &Path {
        &self.path
    }
}

/// Progress sink collecting events for later inspection.
#[derive(Default)]
pub struct CollectingSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl CollectingSink {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ProgressEvent::Status(line) => Some(line),
                _ => None,
            })
            .collect()
    }

    pub fn percents(&self) -> Vec<f64> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ProgressEvent::Progress(value) => Some(value),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for CollectingSink {
    fn emit(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn shared<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
