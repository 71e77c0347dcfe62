//! Application state.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use loopcast_queue::EventQueue;
use loopcast_storage::{LocalStorage, StorageError};

use crate::config::ApiConfig;
use crate::services::ConvertService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    /// The single progress event queue; single-flight, so one queue serves
    /// whichever job is currently running.
    pub events: EventQueue,
    pub converter: ConvertService,
    /// Guards the single-flight invariant: set while a conversion runs.
    pub converting: Arc<AtomicBool>,
}

impl AppState {
    /// Create new application state, creating the storage directories.
    pub async fn new(config: ApiConfig) -> Result<Self, StorageError> {
        let uploads = Arc::new(LocalStorage::create(&config.upload_dir).await?);
        let outputs = Arc::new(LocalStorage::create(&config.output_dir).await?);

        let events = EventQueue::new();
        let converter = ConvertService::new(uploads, outputs, events.clone());

        Ok(Self {
            config,
            events,
            converter,
            converting: Arc::new(AtomicBool::new(false)),
        })
    }
}
