//! webmux active view state machine
//!
//! At most one session is foregrounded at any time. Switching blurs the
//! previous surface before the target is raised, triggers lazy creation and
//! loading on first activation, persists the active id, and announces every
//! transition to the shell UI over the outbound bus.

mod error;
mod switcher;

pub use error::ViewError;
pub use switcher::ViewSwitcher;

pub type Result<T> = std::result::Result<T, ViewError>;
