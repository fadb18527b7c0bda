//! Session - the single slot for the attached backend instance
//!
//! At most one backend instance is live at a time. `install` only succeeds
//! on an empty slot; `clear` tears the instance down and unbinds the
//! surface's source.

use crate::backend::BackendInstance;
use crate::surface::MediaSurface;
use crate::types::BackendKind;
use crate::{Error, Result};
use std::sync::Arc;
use tracing::{debug, warn};

/// Holds the backend instance currently driving the surface
pub struct Session {
    surface: Arc<dyn MediaSurface>,
    active: Option<Box<dyn BackendInstance>>,
}

impl Session {
    pub fn new(surface: Arc<dyn MediaSurface>) -> Self {
        Self {
            surface,
            active: None,
        }
    }

    /// Tear down the held instance (if any) and release the surface source
    pub fn clear(&mut self) {
        if let Some(instance) = self.active.take() {
            debug!(backend = %instance.kind(), "Tearing down active instance");
            instance.teardown();
        }
        self.surface.clear_source();
    }

    /// Take ownership of a freshly playing instance.
    ///
    /// Native playback passes `None`: nothing to own, the slot stays empty.
    /// An occupied slot is an ordering bug upstream; the incoming instance is
    /// torn down rather than leaked and the error is returned.
    pub fn install(&mut self, instance: Option<Box<dyn BackendInstance>>) -> Result<()> {
        if let Some(held) = &self.active {
            let held = held.kind();
            if let Some(incoming) = instance {
                warn!(held = %held, incoming = %incoming.kind(), "Install on occupied session");
                incoming.teardown();
            }
            return Err(Error::SessionOccupied(held));
        }

        if let Some(instance) = &instance {
            debug!(backend = %instance.kind(), "Installing instance");
        }
        self.active = instance;
        Ok(())
    }

    pub fn active_kind(&self) -> Option<BackendKind> {
        self.active.as_ref().map(|instance| instance.kind())
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_none()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(instance) = self.active.take() {
            instance.teardown();
        }
    }
}
