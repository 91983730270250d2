//! Session runner.
//!
//! A session binds a registry, installs a store's recorded values into the
//! live cells, runs a computation and then, on every exit path, captures
//! the live values back into the store and unbinds. The exit work lives in
//! [`SessionGuard`]'s `Drop`, so it also runs while a panic unwinds out of
//! the computation. Unbinding sits in its own guard, so a panic raised by a
//! cell value's `Clone` while installing or capturing still releases the
//! registry.

use std::time::Instant;

use tracing::{debug, error, warn};

use super::BindingState;
use crate::error::{fault, StoreError};
use crate::registry::Registry;
use crate::store::Store;
use crate::Result;

/// Holds a registry bound to a store for the duration of one session.
pub(crate) struct SessionGuard<'a> {
    registry: &'a Registry,
    store: &'a mut Store,
    installed: bool,
    started: Instant,
}

/// Unbinds the registry when dropped, including while capture unwinds.
struct Release<'a>(&'a Registry);

impl Drop for Release<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.0.transition(BindingState::Unbound) {
            error!(%err, "binding flag released by someone else during a session");
        }
    }
}

impl<'a> SessionGuard<'a> {
    /// Bind `registry` and install `store` into its cells.
    pub(crate) fn enter(registry: &'a Registry, store: &'a mut Store) -> Result<Self> {
        if store.registry_id() != registry.id() {
            return Err(StoreError::ForeignStore {
                store: store.registry_id(),
                registry: registry.id(),
            });
        }

        registry.transition(BindingState::Bound)?;
        // From here on the guard owns the binding, even if installing panics.
        let mut guard = Self {
            registry,
            store,
            installed: false,
            started: Instant::now(),
        };
        guard.store.install();
        guard.installed = true;
        debug!(
            registry = %registry.id(),
            store = %guard.store.id(),
            session = guard.store.sessions() + 1,
            "session bound"
        );
        Ok(guard)
    }
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        let release = Release(self.registry);
        // A half-finished install leaves the recorded values untouched.
        if self.installed {
            self.store.capture();
        }
        drop(release);

        let elapsed = self.started.elapsed();
        if std::thread::panicking() {
            warn!(
                registry = %self.registry.id(),
                store = %self.store.id(),
                ?elapsed,
                captured = self.installed,
                "session unwound"
            );
        } else {
            debug!(
                registry = %self.registry.id(),
                store = %self.store.id(),
                ?elapsed,
                "session finished"
            );
        }
    }
}

impl Registry {
    /// Run `computation` with `store` installed into this registry's cells.
    ///
    /// After `computation` returns, or while it panics, the live cells are
    /// captured back into `store` and the registry is unbound. The live
    /// cells keep the values the computation left them at, so the next
    /// session on the same store resumes exactly from there. A panic keeps
    /// unwinding unchanged after the capture; an `Err` returned by the
    /// computation is an ordinary return value.
    ///
    /// # Panics
    ///
    /// Panics if a session is already bound to this registry (sessions do
    /// not nest) or if `store` was built from another registry.
    #[track_caller]
    pub fn run<R, F>(&self, store: &mut Store, computation: F) -> R
    where
        F: FnOnce() -> R,
    {
        fault(self.try_run(store, computation))
    }

    /// Run a session, reporting [`StoreError::AlreadyBound`] or
    /// [`StoreError::ForeignStore`] instead of panicking.
    pub fn try_run<R, F>(&self, store: &mut Store, computation: F) -> Result<R>
    where
        F: FnOnce() -> R,
    {
        let guard = SessionGuard::enter(self, store)?;
        let result = computation();
        drop(guard);
        Ok(result)
    }
}
