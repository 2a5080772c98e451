//! Async facade over a blocking [`TransportSession`].

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use super::TransportSession;
use crate::process::ProcessResult;
use crate::Result;

/// Cloneable async handle to one session.
///
/// Operations run on tokio's blocking pool. The inner mutex serializes
/// callers, so at most one child per session is alive at a time.
#[derive(Clone)]
pub struct AsyncSession {
    inner: Arc<Mutex<TransportSession>>,
}

impl AsyncSession {
    /// Wrap a session.
    pub fn new(session: TransportSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Connect the session.
    pub async fn connect(&self) -> Result<()> {
        self.blocking(|session| {
            session.connect();
            Ok(())
        })
        .await
    }

    /// See [`TransportSession::exec_command`].
    pub async fn exec_command(
        &self,
        command: impl Into<Vec<u8>>,
        input: Option<Vec<u8>>,
        sudoable: bool,
    ) -> Result<ProcessResult> {
        let command = command.into();
        self.blocking(move |session| session.exec_command(&command, input.as_deref(), sudoable))
            .await
    }

    /// See [`TransportSession::put_file`].
    pub async fn put_file(
        &self,
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
    ) -> Result<()> {
        let (source, destination) = (source.into(), destination.into());
        self.blocking(move |session| session.put_file(&source, &destination))
            .await
    }

    /// See [`TransportSession::fetch_file`].
    pub async fn fetch_file(
        &self,
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
    ) -> Result<()> {
        let (source, destination) = (source.into(), destination.into());
        self.blocking(move |session| session.fetch_file(&source, &destination))
            .await
    }

    /// Close the session.
    pub async fn close(&self) -> Result<()> {
        self.blocking(|session| {
            session.close();
            Ok(())
        })
        .await
    }

    /// Whether the session is connected. Waits for any running operation.
    pub async fn is_connected(&self) -> Result<bool> {
        self.blocking(|session| Ok(session.is_connected())).await
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut TransportSession) -> Result<T> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || f(&mut lock(&inner))).await?
    }
}

/// A panic inside one operation leaves nothing half-written in the
/// session, so a poisoned lock is safe to reuse.
fn lock(inner: &Mutex<TransportSession>) -> MutexGuard<'_, TransportSession> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl std::fmt::Debug for AsyncSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncSession").finish_non_exhaustive()
    }
}
