//! Typed accessors over the settings store
//!
//! Each accessor owns one persisted key. Map-valued keys are flipped one
//! entry at a time: toggling a service or changing one zoom factor rewrites
//! only that entry, leaving the rest of the map as persisted.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use webmux_storage::{keys, Database, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

pub struct SettingsStore {
    db: Database,
}

impl SettingsStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn window_bounds(&self) -> Result<Option<WindowBounds>> {
        self.db.get_json(keys::WINDOW_BOUNDS)
    }

    pub fn set_window_bounds(&self, bounds: &WindowBounds) -> Result<()> {
        self.db.set_json(keys::WINDOW_BOUNDS, bounds)
    }

    pub fn services(&self) -> Result<HashMap<String, bool>> {
        Ok(self.db.get_json(keys::SERVICES)?.unwrap_or_default())
    }

    /// Flip a single service flag, leaving every other persisted key of the
    /// map unchanged.
    pub fn set_service_flag(&self, id: &str, enabled: bool) -> Result<()> {
        let mut services = self.services()?;
        services.insert(id.to_string(), enabled);
        self.db.set_json(keys::SERVICES, &services)
    }

    pub fn zoom_levels(&self) -> Result<HashMap<String, f64>> {
        Ok(self.db.get_json(keys::ZOOM_LEVELS)?.unwrap_or_default())
    }

    pub fn set_zoom_level(&self, id: &str, factor: f64) -> Result<()> {
        let mut levels = self.zoom_levels()?;
        levels.insert(id.to_string(), factor);
        self.db.set_json(keys::ZOOM_LEVELS, &levels)
    }
}
