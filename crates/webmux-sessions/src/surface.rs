//! Surface backend seam
//!
//! The orchestrator treats each embedded session as an opaque content
//! surface; everything the real embedding layer must do for us goes through
//! this trait. `HeadlessBackend` is the in-process implementation used for
//! headless runs and tests; it records operations instead of rendering.

use parking_lot::Mutex;
use std::collections::HashSet;
use url::Url;

use webmux_registry::SessionConfig;

use crate::error::LifecycleError;
use crate::policy::SecurityPolicy;
use crate::Result;

pub trait SurfaceBackend: Send + Sync {
    /// Create the isolated content surface for `config` under `policy`.
    fn create_surface(&self, config: &SessionConfig, policy: &SecurityPolicy) -> Result<()>;

    /// Load `url` into the session's surface.
    fn load(&self, id: &str, url: &Url) -> Result<()>;

    /// Raise the surface and give it input focus.
    fn focus(&self, id: &str);

    /// Push the surface to the background.
    fn blur(&self, id: &str);

    /// Detach and release the surface.
    fn destroy(&self, id: &str);

    /// Apply a zoom factor to the surface.
    fn set_zoom(&self, id: &str, factor: f64);

    /// Hand a URL to the OS default external handler.
    fn open_external(&self, url: &Url);
}

/// One recorded backend operation.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Created { id: String, privileged: bool },
    Loaded { id: String, url: String },
    Focused(String),
    Blurred(String),
    Destroyed(String),
    Zoomed { id: String, factor: f64 },
    OpenedExternal(String),
}

#[derive(Default)]
pub struct HeadlessBackend {
    ops: Mutex<Vec<SurfaceOp>>,
    failing: Mutex<HashSet<String>>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `create_surface` fail for `id`, for partial-failure tests.
    pub fn fail_creation_of(&self, id: &str) {
        self.failing.lock().insert(id.to_string());
    }

    pub fn ops(&self) -> Vec<SurfaceOp> {
        self.ops.lock().clone()
    }

    fn record(&self, op: SurfaceOp) {
        self.ops.lock().push(op);
    }
}

impl SurfaceBackend for HeadlessBackend {
    fn create_surface(&self, config: &SessionConfig, policy: &SecurityPolicy) -> Result<()> {
        if self.failing.lock().contains(&config.id) {
            return Err(LifecycleError::Creation {
                id: config.id.clone(),
                reason: "injected failure".to_string(),
            });
        }

        self.record(SurfaceOp::Created {
            id: config.id.clone(),
            privileged: policy.privileged,
        });
        Ok(())
    }

    fn load(&self, id: &str, url: &Url) -> Result<()> {
        self.record(SurfaceOp::Loaded {
            id: id.to_string(),
            url: url.to_string(),
        });
        Ok(())
    }

    fn focus(&self, id: &str) {
        self.record(SurfaceOp::Focused(id.to_string()));
    }

    fn blur(&self, id: &str) {
        self.record(SurfaceOp::Blurred(id.to_string()));
    }

    fn destroy(&self, id: &str) {
        self.record(SurfaceOp::Destroyed(id.to_string()));
    }

    fn set_zoom(&self, id: &str, factor: f64) {
        self.record(SurfaceOp::Zoomed {
            id: id.to_string(),
            factor,
        });
    }

    fn open_external(&self, url: &Url) {
        self.record(SurfaceOp::OpenedExternal(url.to_string()));
    }
}
