//! Hot reload of the shader directory
//!
//! The watcher thread never touches GPU objects. It raises a flag that the
//! render thread polls with [`ShaderWatcher::take_reload_request`] and answers
//! with a full [`ProgramRegistry::reload`](crate::shading::ProgramRegistry::reload).

use crate::error::WatchError;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Whether a path names a shader unit or a program definition
pub fn is_shader_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("vert" | "frag" | "prog")
    )
}

#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Changes closer together than this raise a single request
    pub debounce_duration: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce_duration: Duration::from_millis(300),
        }
    }
}

/// Watches a shader directory and flags when it needs reloading
pub struct ShaderWatcher {
    _watcher: RecommendedWatcher,
    shader_dir: PathBuf,
    reload_requested: Arc<AtomicBool>,
    control_handle: Option<WatcherControlHandle>,
}

struct WatcherControlHandle {
    stop_sender: Sender<()>,
    thread_handle: thread::JoinHandle<()>,
}

impl ShaderWatcher {
    pub fn new<P: AsRef<Path>>(shader_dir: P, config: WatcherConfig) -> Result<Self, WatchError> {
        let shader_dir = shader_dir.as_ref().to_path_buf();
        info!(path = ?shader_dir, "Creating shader watcher");

        let (event_tx, event_rx) = mpsc::channel::<Event>();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let mut watcher = RecommendedWatcher::new(
            move |res| match res {
                Ok(event) => {
                    if let Err(e) = event_tx.send(event) {
                        error!(error = %e, "Failed to send file event");
                    }
                }
                Err(e) => error!(error = %e, "File watcher error"),
            },
            Config::default(),
        )?;
        watcher.watch(&shader_dir, RecursiveMode::NonRecursive)?;
        debug!(watch_path = ?shader_dir, "Started watching for shader changes");

        let reload_requested = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&reload_requested);
        let thread_handle = thread::spawn(move || {
            Self::event_loop(config, flag, event_rx, stop_rx);
        });

        Ok(Self {
            _watcher: watcher,
            shader_dir,
            reload_requested,
            control_handle: Some(WatcherControlHandle {
                stop_sender: stop_tx,
                thread_handle,
            }),
        })
    }

    fn event_loop(
        config: WatcherConfig,
        reload_requested: Arc<AtomicBool>,
        event_rx: Receiver<Event>,
        stop_rx: Receiver<()>,
    ) {
        let mut last_request: Option<Instant> = None;
        // changes inside the debounce window, raised once it closes
        let mut pending = false;

        loop {
            if stop_rx.try_recv().is_ok() {
                debug!("Shader watcher received stop signal");
                break;
            }

            match event_rx.recv_timeout(Duration::from_millis(100)) {
                Ok(event) => {
                    if !event.paths.iter().any(|p| is_shader_file(p)) {
                        continue;
                    }
                    let now = Instant::now();
                    let debounced = last_request
                        .is_some_and(|last| now.duration_since(last) < config.debounce_duration);
                    if debounced {
                        debug!(paths = ?event.paths, "Debouncing rapid shader changes");
                        pending = true;
                        continue;
                    }
                    debug!(
                        event_kind = ?event.kind,
                        paths = ?event.paths,
                        "Shader file changed, requesting reload"
                    );
                    reload_requested.store(true, Ordering::Release);
                    last_request = Some(now);
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    debug!("Event channel disconnected, stopping watcher");
                    break;
                }
            }

            let window_closed = last_request
                .is_none_or(|last| last.elapsed() >= config.debounce_duration);
            if pending && window_closed {
                debug!("Flushing debounced shader changes, requesting reload");
                reload_requested.store(true, Ordering::Release);
                last_request = Some(Instant::now());
                pending = false;
            }
        }

        info!("Shader watcher event loop stopped");
    }

    /// Clear and return the pending reload request
    pub fn take_reload_request(&self) -> bool {
        self.reload_requested.swap(false, Ordering::AcqRel)
    }

    pub fn shader_dir(&self) -> &Path {
        &self.shader_dir
    }

    /// Stop the watcher thread and wait for it
    pub fn stop(mut self) -> Result<(), WatchError> {
        if let Some(control) = self.control_handle.take() {
            info!(path = ?self.shader_dir, "Stopping shader watcher");
            if let Err(e) = control.stop_sender.send(()) {
                warn!(error = %e, "Failed to send stop signal to watcher thread");
            }
            if let Err(e) = control.thread_handle.join() {
                error!(error = ?e, "Error joining watcher thread");
                return Err(WatchError::Join);
            }
        }
        Ok(())
    }
}

impl Drop for ShaderWatcher {
    fn drop(&mut self) {
        if let Some(control) = self.control_handle.take() {
            warn!("ShaderWatcher dropped without calling stop()");
            let _ = control.stop_sender.send(());
        }
    }
}
