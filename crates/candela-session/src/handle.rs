//! Async front door for the session.
//!
//! Decoding is long-running and must not block event processing: it runs on
//! the blocking pool and its result is applied synchronously under the
//! session lock. Cancellation is implicit, latest load wins: a result whose
//! ticket was superseded is discarded on arrival.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use candela_core::display::AdvancedColorInfo;

use crate::acquire::acquire_image;
use crate::error::LoadError;
use crate::services::{Decoder, PlatformCapabilities, Renderer, RendererError};
use crate::session::{LoadOutcome, OverrideChange, Session, SessionEvent};

/// Failure of one dispatched session event.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Renderer(#[from] RendererError),
}

/// Shares a [`Session`] between the event consumer and in-flight loads.
///
/// All mutation happens under one lock, so handlers run to completion
/// before the next event touches the state.
pub struct SessionHandle<R: Renderer> {
    session: Arc<Mutex<Session<R>>>,
    decoder: Arc<dyn Decoder>,
    caps: Arc<dyn PlatformCapabilities>,
}

impl<R: Renderer> Clone for SessionHandle<R> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            decoder: Arc::clone(&self.decoder),
            caps: Arc::clone(&self.caps),
        }
    }
}

impl<R: Renderer + 'static> SessionHandle<R> {
    pub fn new(
        session: Session<R>,
        decoder: Arc<dyn Decoder>,
        caps: Arc<dyn PlatformCapabilities>,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            decoder,
            caps,
        }
    }

    /// Run a closure against the locked session.
    pub fn with_session<T>(&self, f: impl FnOnce(&mut Session<R>) -> T) -> T {
        f(&mut self.session.lock())
    }

    /// Acquire and apply an image. Decode work runs on the blocking pool;
    /// if a newer load starts meanwhile, this result is discarded when it
    /// arrives.
    pub async fn load_image(&self, path: PathBuf) -> Result<LoadOutcome, LoadError> {
        let (ticket, options) = {
            let mut session = self.session.lock();
            (session.begin_load(), session.acquire_options())
        };

        let decoder = Arc::clone(&self.decoder);
        let caps = Arc::clone(&self.caps);
        let decode_path = path.clone();
        let result =
            tokio::task::spawn_blocking(move || acquire_image(&*decoder, &*caps, &decode_path, &options))
                .await
                .map_err(|e| LoadError::InvalidFile(format!("decode task failed: {e}")))?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.session.lock().complete_load(ticket, result, &name)
    }

    /// Synchronous, non-blocking handlers.
    pub fn on_display_changed(&self, snapshot: AdvancedColorInfo) {
        self.session.lock().on_display_changed(snapshot);
    }

    pub fn on_override_changed(&self, change: OverrideChange) {
        self.session.lock().on_override_changed(change);
    }

    pub fn on_window_resized(&self) {
        self.session.lock().on_window_resized();
    }

    pub fn on_export_requested(&self, target: &Path) -> Result<(), RendererError> {
        self.session.lock().on_export_requested(target)
    }

    /// Dispatch one event to its handler.
    pub async fn dispatch(&self, event: SessionEvent) -> Result<(), DispatchError> {
        match event {
            SessionEvent::FileOpened(path) => {
                self.load_image(path).await?;
            }
            SessionEvent::DisplayChanged(snapshot) => self.on_display_changed(snapshot),
            SessionEvent::OverrideChanged(change) => self.on_override_changed(change),
            SessionEvent::WindowResized => self.on_window_resized(),
            SessionEvent::ExportRequested(target) => self.on_export_requested(&target)?,
        }
        Ok(())
    }

    /// Drain an event queue as its single consumer, preserving arrival
    /// order. Failures are diagnostics, not fatal: the session stays usable.
    pub async fn run(&self, mut events: mpsc::Receiver<SessionEvent>) {
        while let Some(event) = events.recv().await {
            if let Err(error) = self.dispatch(event).await {
                tracing::warn!(%error, "session event failed");
            }
        }
    }
}
