use crate::db;
use crate::render::Pages;
use crate::web::error::ApiError;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub struct AppState {
    pub db_path: PathBuf,
    pub pages: Pages,
    rebuild_lock: Mutex<()>,
}

impl AppState {
    pub fn new(db_path: impl Into<PathBuf>, pages: Pages) -> Self {
        Self {
            db_path: db_path.into(),
            pages,
            rebuild_lock: Mutex::new(()),
        }
    }

    /// A connection scoped to the caller; dropping it releases the handle.
    pub fn connect(&self) -> Result<Connection, ApiError> {
        db::connect(&self.db_path).map_err(|e| ApiError::new("db_open_failed", format!("{e:#}")))
    }

    /// Runs `f` on a fresh connection under the rebuild lock. Reads of a
    /// pass's output belong inside `f` so no other rebuild lands in between.
    pub fn rebuild<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut Connection) -> Result<T, ApiError>,
    {
        let _guard = self.rebuild_guard();
        let mut conn = self.connect()?;
        f(&mut conn)
    }

    fn rebuild_guard(&self) -> MutexGuard<'_, ()> {
        self.rebuild_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebuild_holds_the_lock_until_the_closure_returns() {
        let dir = tempfile::tempdir().expect("temp dir");
        let state = AppState::new(
            dir.path().join("escolar.db"),
            Pages::new().expect("compile templates"),
        );

        let locked_inside = state
            .rebuild(|_conn| Ok(state.rebuild_lock.try_lock().is_err()))
            .expect("rebuild");
        assert!(locked_inside);
        assert!(state.rebuild_lock.try_lock().is_ok());
    }

    #[test]
    fn rebuild_releases_the_lock_on_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let state = AppState::new(
            dir.path().join("escolar.db"),
            Pages::new().expect("compile templates"),
        );

        let err = state
            .rebuild(|_conn| Err::<(), _>(ApiError::new("db_query_failed", "boom")))
            .expect_err("closure error propagates");
        assert_eq!(err.code, "db_query_failed");
        assert!(state.rebuild_lock.try_lock().is_ok());
    }
}
