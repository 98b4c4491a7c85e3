//! Background asset loading.
//!
//! Each load reads and decodes its file on a named worker thread and hands
//! the result back through a one-shot channel. The frame loop polls the
//! returned [`PendingAsset`] without blocking and applies whatever has
//! arrived.

use std::path::{Path, PathBuf};
use std::thread;

use futures::channel::oneshot;

use crate::error::AssetError;

/// A load in flight.
#[derive(Debug)]
pub struct PendingAsset<T> {
    label: String,
    receiver: Option<oneshot::Receiver<Result<T, AssetError>>>,
}

impl<T> PendingAsset<T> {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the result once, as soon as it is available.
    ///
    /// A worker that goes away without answering resolves as
    /// [`AssetError::Canceled`]. After the result has been taken this keeps
    /// returning `None`.
    pub fn poll(&mut self) -> Option<Result<T, AssetError>> {
        let receiver = self.receiver.as_mut()?;
        let result = match receiver.try_recv() {
            Ok(None) => return None,
            Ok(Some(result)) => result,
            Err(oneshot::Canceled) => Err(AssetError::Canceled),
        };
        self.receiver = None;
        Some(result)
    }

    pub fn is_finished(&self) -> bool {
        self.receiver.is_none()
    }

    /// Blocks until the result is available.
    pub fn wait(mut self) -> Result<T, AssetError> {
        match self.receiver.take() {
            Some(receiver) => futures::executor::block_on(receiver).unwrap_or(Err(AssetError::Canceled)),
            None => Err(AssetError::Canceled),
        }
    }
}

/// Spawns asset loads onto worker threads.
#[derive(Debug, Clone, Default)]
pub struct AssetLoader {
    root: Option<PathBuf>,
}

impl AssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves relative asset paths against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Reads `path` on a worker thread and decodes it with `decode`.
    pub fn load<T, F>(&self, label: &str, path: &Path, decode: F) -> PendingAsset<T>
    where
        T: Send + 'static,
        F: FnOnce(&[u8]) -> Result<T, AssetError> + Send + 'static,
    {
        let path = self.resolve(path);
        self.spawn(label, move || {
            let bytes = std::fs::read(&path).map_err(|source| AssetError::Io {
                path: path.clone(),
                source,
            })?;
            decode(&bytes)
        })
    }

    /// Runs `job` on a worker thread.
    pub fn spawn<T, F>(&self, label: &str, job: F) -> PendingAsset<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, AssetError> + Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        let spawned = thread::Builder::new()
            .name(format!("asset-{label}"))
            .spawn(move || {
                // The receiver may already be gone; nothing is waiting then
                let _ = sender.send(job());
            });

        if let Err(err) = spawned {
            // The sender was dropped with the closure, so polling reports Canceled
            log::warn!("failed to spawn loader thread for {label}: {err}");
        } else {
            log::debug!("loading {label}");
        }

        PendingAsset {
            label: label.to_owned(),
            receiver: Some(receiver),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn poll_until_done<T>(pending: &mut PendingAsset<T>) -> Result<T, AssetError> {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(result) = pending.poll() {
                return result;
            }
            assert!(Instant::now() < deadline, "asset never resolved");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn spawned_job_resolves_once() {
        let loader = AssetLoader::new();
        let mut pending = loader.spawn("answer", || Ok(42));
        assert_eq!(pending.label(), "answer");
        assert_eq!(poll_until_done(&mut pending).unwrap(), 42);
        assert!(pending.is_finished());
        assert!(pending.poll().is_none());
    }

    #[test]
    fn poll_does_not_block_while_pending() {
        let (release, gate) = std::sync::mpsc::channel::<()>();
        let mut pending = AssetLoader::new().spawn("gated", move || {
            gate.recv().ok();
            Ok("done")
        });
        assert!(pending.poll().is_none());
        assert!(!pending.is_finished());
        release.send(()).unwrap();
        assert_eq!(poll_until_done(&mut pending).unwrap(), "done");
    }

    #[test]
    fn missing_file_reports_its_path() {
        let path = Path::new("definitely/not/here.json");
        let mut pending = AssetLoader::new().load("missing", path, |bytes| Ok(bytes.len()));
        match poll_until_done(&mut pending) {
            Err(AssetError::Io { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected an I/O error, got {other:?}"),
        }
    }

    #[test]
    fn decode_runs_on_file_contents() {
        let dir = std::env::temp_dir().join(format!("bauble-loader-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("five.bin"), [1, 2, 3, 4, 5]).unwrap();

        let loader = AssetLoader::with_root(&dir);
        let pending = loader.load("five", Path::new("five.bin"), |bytes| Ok(bytes.len()));
        assert_eq!(pending.wait().unwrap(), 5);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn panicking_worker_is_canceled() {
        let mut pending: PendingAsset<()> = AssetLoader::new().spawn("boom", || panic!("boom"));
        assert!(matches!(
            poll_until_done(&mut pending),
            Err(AssetError::Canceled)
        ));
    }

    #[test]
    fn resolve_keeps_absolute_paths() {
        let loader = AssetLoader::with_root("/srv/assets");
        assert_eq!(
            loader.resolve(Path::new("fonts/a.json")),
            Path::new("/srv/assets/fonts/a.json")
        );
        let absolute = std::env::temp_dir().join("x.png");
        assert_eq!(loader.resolve(&absolute), absolute);
    }
}
