//! One-time installation of history interception.

use crate::error::{QueryError, Result};
use crate::registry;
use crate::types::SyncConfig;
use std::cell::RefCell;
use std::rc::Rc;

use super::backend::{default_backend, HistoryBackend};

struct Installed {
    backend: Rc<dyn HistoryBackend>,
    config: SyncConfig,
}

thread_local! {
    static INSTALLED: RefCell<Option<Installed>> = const { RefCell::new(None) };
}

/// Intercept `backend` and route its navigations to the listener registry.
///
/// Returns `Ok(true)` if this call installed interception and `Ok(false)`
/// if it was already installed, in which case `backend` and `config` are
/// ignored and nothing is wrapped a second time.
pub fn install(backend: Rc<dyn HistoryBackend>, config: SyncConfig) -> Result<bool> {
    if is_installed() {
        tracing::debug!("history interception already installed");
        return Ok(false);
    }

    backend.intercept(Rc::new(registry::notify_all))?;
    INSTALLED.with(|slot| *slot.borrow_mut() = Some(Installed { backend, config }));
    tracing::debug!("history interception installed");
    Ok(true)
}

/// Install interception over the platform's default history, once.
pub fn ensure_interception_installed() -> Result<()> {
    if !is_installed() {
        install(default_backend()?, SyncConfig::default())?;
    }
    Ok(())
}

pub fn is_installed() -> bool {
    INSTALLED.with(|slot| slot.borrow().is_some())
}

/// The intercepted backend.
pub fn backend() -> Result<Rc<dyn HistoryBackend>> {
    INSTALLED.with(|slot| {
        slot.borrow()
            .as_ref()
            .map(|installed| Rc::clone(&installed.backend))
            .ok_or(QueryError::NotInstalled)
    })
}

/// Configuration given at install time, or the default before that.
pub fn config() -> SyncConfig {
    INSTALLED.with(|slot| {
        slot.borrow()
            .as_ref()
            .map(|installed| installed.config.clone())
            .unwrap_or_default()
    })
}
