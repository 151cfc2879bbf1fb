use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use image::ImageReader;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::names::{relative_asset_path, validate_asset_name, AssetNameError};
use super::Sprite;

static LOADER_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

pub trait AssetSource: Send + Sync {
    fn fetch(&self, name: &str) -> Result<Sprite, AssetError>;
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to open asset at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode asset at {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("asset {name} is not available")]
    Missing { name: String },
    #[error("asset name {name:?} escapes the asset root: {source}")]
    UnsafeName {
        name: String,
        #[source]
        source: AssetNameError,
    },
    #[error("failed to spawn loader thread for {name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoaderError {
    #[error("invalid asset name {name:?}: {source}")]
    InvalidName {
        name: String,
        #[source]
        source: AssetNameError,
    },
    #[error("cannot queue {name:?}: loading already started")]
    QueueAfterStart { name: String },
    #[error("asset loading already started")]
    AlreadyStarted,
}

#[derive(Debug, Clone)]
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetSource for FsAssetSource {
    fn fetch(&self, name: &str) -> Result<Sprite, AssetError> {
        let relative = relative_asset_path(name).map_err(|source| AssetError::UnsafeName {
            name: name.to_string(),
            source,
        })?;
        let path = self.root.join(relative);
        let reader = ImageReader::open(&path).map_err(|source| AssetError::Open {
            path: path.clone(),
            source,
        })?;
        let decoded = reader
            .decode()
            .map_err(|source| AssetError::Decode { path, source })?;
        Ok(Sprite::new(decoded.to_rgba8()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub total: usize,
}

type CompletionCallback = Box<dyn FnOnce(LoadSummary) + Send>;

#[derive(Default)]
struct LoaderState {
    cache: HashMap<String, Arc<Sprite>>,
    succeeded: usize,
    failed: usize,
    total: usize,
    on_complete: Option<CompletionCallback>,
}

impl LoaderState {
    fn is_done(&self) -> bool {
        self.succeeded + self.failed == self.total
    }

    fn summary(&self) -> LoadSummary {
        LoadSummary {
            succeeded: self.succeeded,
            failed: self.failed,
            total: self.total,
        }
    }
}

/// Loads a batch of named images concurrently and fires a completion callback
/// exactly once after every queued request has resolved.
pub struct AssetLoader {
    source: Arc<dyn AssetSource>,
    queued: Vec<String>,
    state: Arc<Mutex<LoaderState>>,
    started: bool,
    workers: Vec<JoinHandle<()>>,
}

impl AssetLoader {
    pub fn new(source: Arc<dyn AssetSource>) -> Self {
        Self {
            source,
            queued: Vec::new(),
            state: Arc::new(Mutex::new(LoaderState::default())),
            started: false,
            workers: Vec::new(),
        }
    }

    pub fn queue(&mut self, name: impl Into<String>) -> Result<(), LoaderError> {
        let name = name.into();
        if self.started {
            return Err(LoaderError::QueueAfterStart { name });
        }
        if let Err(source) = validate_asset_name(&name) {
            return Err(LoaderError::InvalidName { name, source });
        }
        debug!(asset = %name, "asset_queued");
        self.queued.push(name);
        lock_state(&self.state).total = self.queued.len();
        Ok(())
    }

    /// Starts one worker per queued request. `on_complete` runs on whichever
    /// thread resolves the last request, or inline when nothing was queued.
    pub fn load_all<F>(&mut self, on_complete: F) -> Result<(), LoaderError>
    where
        F: FnOnce(LoadSummary) + Send + 'static,
    {
        if self.started {
            return Err(LoaderError::AlreadyStarted);
        }
        self.started = true;
        info!(queued = self.queued.len(), "asset_load_started");

        if self.queued.is_empty() {
            let summary = lock_state(&self.state).summary();
            info!(succeeded = 0, failed = 0, "assets_ready");
            on_complete(summary);
            return Ok(());
        }

        lock_state(&self.state).on_complete = Some(Box::new(on_complete));
        for name in self.queued.clone() {
            let source = Arc::clone(&self.source);
            let state = Arc::clone(&self.state);
            let worker_name = name.clone();
            let spawned = thread::Builder::new()
                .name(format!("asset-{name}"))
                .spawn(move || {
                    let outcome = source.fetch(&worker_name);
                    resolve(&state, worker_name, outcome);
                });
            match spawned {
                Ok(handle) => self.workers.push(handle),
                Err(source) => {
                    let error = AssetError::Spawn {
                        name: name.clone(),
                        source,
                    };
                    resolve(&self.state, name, Err(error));
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<Sprite>> {
        lock_state(&self.state).cache.get(name).cloned()
    }

    pub fn is_done(&self) -> bool {
        lock_state(&self.state).is_done()
    }

    pub fn summary(&self) -> LoadSummary {
        lock_state(&self.state).summary()
    }

    pub fn success_count(&self) -> usize {
        lock_state(&self.state).succeeded
    }

    pub fn error_count(&self) -> usize {
        lock_state(&self.state).failed
    }

    pub fn queued(&self) -> &[String] {
        &self.queued
    }

    pub fn join_workers(&mut self) {
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                warn!("asset_worker_panicked");
            }
        }
    }
}

fn resolve(state: &Mutex<LoaderState>, name: String, outcome: Result<Sprite, AssetError>) {
    let completion = {
        let mut state = lock_state(state);
        match outcome {
            Ok(sprite) => {
                debug!(
                    asset = %name,
                    width = sprite.width(),
                    height = sprite.height(),
                    "asset_loaded"
                );
                state.cache.insert(name, Arc::new(sprite));
                state.succeeded += 1;
            }
            Err(error) => {
                warn!(asset = %name, error = %error, "asset_load_failed");
                state.failed += 1;
            }
        }
        // The callback is taken under the lock, so only one resolution can own it.
        if state.is_done() {
            state
                .on_complete
                .take()
                .map(|callback| (callback, state.summary()))
        } else {
            None
        }
    };

    if let Some((callback, summary)) = completion {
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "assets_ready"
        );
        callback(summary);
    }
}

fn lock_state(state: &Mutex<LoaderState>) -> MutexGuard<'_, LoaderState> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            if LOADER_LOCK_POISON_WARNED
                .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
            {
                warn!("asset loader lock poisoned; recovered inner value");
            }
            poisoned.into_inner()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc::{channel, Receiver};
    use std::sync::{Barrier, Condvar};
    use std::time::{Duration, Instant};

    const WAIT: Duration = Duration::from_secs(5);

    /// Succeeds for every name except those starting with `missing`.
    struct StubSource;

    impl AssetSource for StubSource {
        fn fetch(&self, name: &str) -> Result<Sprite, AssetError> {
            if name.starts_with("missing") {
                return Err(AssetError::Missing {
                    name: name.to_string(),
                });
            }
            Ok(Sprite::filled(4, 2, [255, 0, 0, 255]))
        }
    }

    struct BarrierSource {
        barrier: Barrier,
    }

    impl AssetSource for BarrierSource {
        fn fetch(&self, name: &str) -> Result<Sprite, AssetError> {
            self.barrier.wait();
            StubSource.fetch(name)
        }
    }

    #[derive(Default)]
    struct GatedSource {
        open: Mutex<bool>,
        opened: Condvar,
    }

    impl GatedSource {
        fn open_gate(&self) {
            *self.open.lock().expect("gate") = true;
            self.opened.notify_all();
        }
    }

    impl AssetSource for GatedSource {
        fn fetch(&self, name: &str) -> Result<Sprite, AssetError> {
            if name.starts_with("slow") {
                let mut open = self.open.lock().expect("gate");
                while !*open {
                    open = self.opened.wait(open).expect("gate");
                }
            }
            StubSource.fetch(name)
        }
    }

    fn loader_with(source: Arc<dyn AssetSource>, names: &[&str]) -> AssetLoader {
        let mut loader = AssetLoader::new(source);
        for name in names {
            loader.queue(*name).expect("queue");
        }
        loader
    }

    fn start(loader: &mut AssetLoader) -> Receiver<LoadSummary> {
        let (sender, receiver) = channel();
        loader
            .load_all(move |summary| {
                sender.send(summary).expect("send summary");
            })
            .expect("load_all");
        receiver
    }

    #[test]
    fn empty_queue_completes_immediately() {
        let mut loader = AssetLoader::new(Arc::new(StubSource));
        let receiver = start(&mut loader);

        let summary = receiver.try_recv().expect("fired inline");
        assert_eq!(summary, LoadSummary::default());
        assert!(loader.is_done());
    }

    #[test]
    fn mixed_outcomes_fire_once_with_full_accounting() {
        let mut loader = loader_with(
            Arc::new(StubSource),
            &["tile1.png", "missing_a.png", "tile2.png", "missing_b.png"],
        );
        let receiver = start(&mut loader);

        let summary = receiver.recv_timeout(WAIT).expect("completion");
        loader.join_workers();

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.succeeded + summary.failed, summary.total);
        assert!(receiver.try_recv().is_err());
        assert!(loader.is_done());
    }

    #[test]
    fn all_failures_still_complete() {
        let mut loader = loader_with(Arc::new(StubSource), &["missing1.png", "missing2.png"]);
        let receiver = start(&mut loader);

        let summary = receiver.recv_timeout(WAIT).expect("completion");
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.succeeded, 0);
    }

    #[test]
    fn simultaneous_resolutions_do_not_double_fire() {
        let names: Vec<String> = (0..12).map(|index| format!("tile{index}.png")).collect();
        let source = Arc::new(BarrierSource {
            barrier: Barrier::new(names.len()),
        });
        let mut loader = AssetLoader::new(source);
        for name in &names {
            loader.queue(name.as_str()).expect("queue");
        }
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_in_callback = Arc::clone(&fired);
        loader
            .load_all(move |_| {
                fired_in_callback.fetch_add(1, Ordering::SeqCst);
            })
            .expect("load_all");
        loader.join_workers();

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(loader.success_count(), names.len());
    }

    #[test]
    fn completion_waits_for_the_slowest_request() {
        let source = Arc::new(GatedSource::default());
        let mut loader = loader_with(source.clone(), &["fast.png", "slow.png"]);
        let receiver = start(&mut loader);

        let deadline = Instant::now() + WAIT;
        while loader.success_count() < 1 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(loader.success_count(), 1);
        assert!(!loader.is_done());
        assert!(receiver.try_recv().is_err());
        assert!(loader.get("fast.png").is_some());
        assert!(loader.get("slow.png").is_none());

        source.open_gate();
        let summary = receiver.recv_timeout(WAIT).expect("completion");
        assert_eq!(summary.succeeded, 2);
    }

    #[test]
    fn cache_misses_return_none() {
        let mut loader = loader_with(Arc::new(StubSource), &["tile1.png", "missing.png"]);
        let receiver = start(&mut loader);
        receiver.recv_timeout(WAIT).expect("completion");

        assert!(loader.get("tile1.png").is_some());
        assert!(loader.get("missing.png").is_none());
        assert!(loader.get("never_queued.png").is_none());
    }

    #[test]
    fn queue_and_load_are_rejected_after_start() {
        let mut loader = loader_with(Arc::new(StubSource), &["tile1.png"]);
        let receiver = start(&mut loader);

        assert_eq!(
            loader.queue("tile2.png"),
            Err(LoaderError::QueueAfterStart {
                name: "tile2.png".to_string()
            })
        );
        assert_eq!(loader.load_all(|_| {}), Err(LoaderError::AlreadyStarted));
        receiver.recv_timeout(WAIT).expect("completion");
    }

    #[test]
    fn only_empty_names_are_refused_by_queue() {
        let mut loader = AssetLoader::new(Arc::new(StubSource));
        assert_eq!(
            loader.queue(""),
            Err(LoaderError::InvalidName {
                name: String::new(),
                source: AssetNameError::Empty,
            })
        );
        loader.queue("img/Tile1.png").expect("mixed case");
        loader.queue("tiles/floor 1.png").expect("space");
        assert_eq!(loader.queued(), ["img/Tile1.png", "tiles/floor 1.png"]);
    }

    #[test]
    fn escaping_names_resolve_as_counted_failures() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut loader = loader_with(
            Arc::new(FsAssetSource::new(dir.path())),
            &["../outside.png", "/abs/tile.png"],
        );
        let receiver = start(&mut loader);

        let summary = receiver.recv_timeout(WAIT).expect("completion");
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.total, 2);
        assert!(loader.get("../outside.png").is_none());
    }

    #[test]
    fn duplicate_names_count_individually() {
        let mut loader = loader_with(Arc::new(StubSource), &["tile1.png", "tile1.png"]);
        let receiver = start(&mut loader);

        let summary = receiver.recv_timeout(WAIT).expect("completion");
        assert_eq!(summary.total, 2);
        assert_eq!(summary.succeeded, 2);
    }

    #[test]
    fn fs_source_decodes_png_and_reports_failures() {
        let dir = tempfile::tempdir().expect("tempdir");
        image::RgbaImage::from_pixel(3, 5, image::Rgba([1, 2, 3, 255]))
            .save(dir.path().join("tile1.png"))
            .expect("write png");
        std::fs::write(dir.path().join("broken.png"), b"not a png").expect("write junk");
        let source = FsAssetSource::new(dir.path());

        let sprite = source.fetch("tile1.png").expect("decoded");
        assert_eq!((sprite.width(), sprite.height()), (3, 5));
        assert_eq!(sprite.pixel(0, 0), Some([1, 2, 3, 255]));
        assert!(matches!(
            source.fetch("absent.png"),
            Err(AssetError::Open { .. })
        ));
        assert!(matches!(
            source.fetch("broken.png"),
            Err(AssetError::Decode { .. })
        ));
        assert!(matches!(
            source.fetch("../tile1.png"),
            Err(AssetError::UnsafeName {
                source: AssetNameError::ParentTraversal,
                ..
            })
        ));
    }
}
