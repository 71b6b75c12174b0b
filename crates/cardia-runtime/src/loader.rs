#![forbid(unsafe_code)]

//! Asynchronous asset loading.
//!
//! Fetching and parsing a binary scene asset is the only operation in the
//! engine that suspends. It runs on a background worker so the frame loop
//! never blocks; results come back through a channel drained by
//! [`ThreadedAssetLoader::poll`] on the driving thread.
//!
//! Every request carries a generation-stamped [`LoadTicket`]. Managers only
//! accept the result matching their latest ticket (last-request-wins);
//! anything older is a stale-load discard — intentional, logged at debug
//! level, and never an error.

use std::collections::HashMap;
use std::fmt;
use std::sync::mpsc;
use std::thread;

use cardia_scene::graph::SceneTemplate;
use cardia_scene::manifest::{self, ManifestError};

/// Why an asset failed to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// The URI does not exist at the source. Tier-specific assets that were
    /// never deployed land here and trigger the medium-tier fallback.
    NotFound(String),
    /// Transport failure (network down, timeout, interrupted stream).
    Fetch(String),
    /// The bytes arrived but could not be decoded as a scene.
    Malformed(String),
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(uri) => write!(f, "asset not found: {uri}"),
            Self::Fetch(msg) => write!(f, "asset fetch failed: {msg}"),
            Self::Malformed(msg) => write!(f, "asset is malformed: {msg}"),
        }
    }
}

impl std::error::Error for AssetError {}

impl From<ManifestError> for AssetError {
    fn from(err: ManifestError) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// The injected asset I/O capability.
///
/// Implementations block until the asset is fetched and parsed; the loader
/// hides that latency on its worker thread. The frame loop never calls this
/// directly.
pub trait AssetFetcher: Send {
    /// Fetch and decode the asset at `uri`.
    fn fetch(&self, uri: &str) -> Result<SceneTemplate, AssetError>;
}

/// An in-memory fetcher serving pre-registered templates.
///
/// The test and demo workhorse: register templates (or raw manifest bytes)
/// under their URIs; anything else is [`AssetError::NotFound`].
#[derive(Default)]
pub struct StaticCatalog {
    templates: HashMap<String, SceneTemplate>,
    raw: HashMap<String, Vec<u8>>,
}

impl StaticCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template under a URI (builder).
    #[must_use]
    pub fn with(mut self, uri: impl Into<String>, template: SceneTemplate) -> Self {
        self.templates.insert(uri.into(), template);
        self
    }

    /// Register raw manifest bytes under a URI (builder); decoded on fetch,
    /// so malformed bytes surface the way a real source would.
    #[must_use]
    pub fn with_bytes(mut self, uri: impl Into<String>, bytes: &[u8]) -> Self {
        self.raw.insert(uri.into(), bytes.to_vec());
        self
    }
}

impl AssetFetcher for StaticCatalog {
    fn fetch(&self, uri: &str) -> Result<SceneTemplate, AssetError> {
        if let Some(template) = self.templates.get(uri) {
            return Ok(template.clone());
        }
        if let Some(bytes) = self.raw.get(uri) {
            return manifest::decode(bytes).map_err(AssetError::from);
        }
        Err(AssetError::NotFound(uri.to_string()))
    }
}

/// A generation-stamped token identifying one load request.
///
/// `owner` scopes generations to the requesting manager so two managers
/// sharing one loader cannot collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    pub(crate) owner: u32,
    pub(crate) generation: u64,
}

/// One unit of work for the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub uri: String,
    pub ticket: LoadTicket,
}

/// A completed load, stale or not — the manager decides.
pub type LoadCompletion = (LoadTicket, Result<SceneTemplate, AssetError>);

/// Background asset loader: one worker thread, FIFO over requests.
///
/// Requests go in via [`submit`](Self::submit); completions come out of
/// [`poll`](Self::poll) on whichever thread drives the frame loop. Dropping
/// the loader closes the request channel, which ends the worker.
pub struct ThreadedAssetLoader {
    requests: mpsc::Sender<LoadRequest>,
    completions: mpsc::Receiver<LoadCompletion>,
    worker: Option<thread::JoinHandle<()>>,
}

impl ThreadedAssetLoader {
    /// Spawn the worker around the given fetcher.
    #[must_use]
    pub fn new(fetcher: Box<dyn AssetFetcher>) -> Self {
        let (request_tx, request_rx) = mpsc::channel::<LoadRequest>();
        let (completion_tx, completion_rx) = mpsc::channel::<LoadCompletion>();

        let worker = thread::spawn(move || {
            for request in request_rx {
                let result = fetcher.fetch(&request.uri);
                if completion_tx.send((request.ticket, result)).is_err() {
                    // Receiver gone: the loader was dropped mid-flight.
                    break;
                }
            }
        });

        Self {
            requests: request_tx,
            completions: completion_rx,
            worker: Some(worker),
        }
    }

    /// Queue a load. Returns `false` if the worker is gone.
    pub fn submit(&self, request: LoadRequest) -> bool {
        tracing::debug!(uri = %request.uri, ?request.ticket, "submitting asset load");
        self.requests.send(request).is_ok()
    }

    /// Drain all completions that have arrived since the last poll.
    pub fn poll(&self) -> Vec<LoadCompletion> {
        let mut done = Vec::new();
        while let Ok(completion) = self.completions.try_recv() {
            done.push(completion);
        }
        done
    }

    /// Block until at least one completion arrives, then drain.
    ///
    /// Test aid; production hosts poll from the frame loop instead.
    pub fn wait(&self) -> Vec<LoadCompletion> {
        let mut done = Vec::new();
        if let Ok(first) = self.completions.recv() {
            done.push(first);
        }
        done.extend(self.poll());
        done
    }
}

impl Drop for ThreadedAssetLoader {
    fn drop(&mut self) {
        // Closing the request channel ends the worker's loop.
        let (closed_tx, _) = mpsc::channel();
        self.requests = closed_tx;
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
