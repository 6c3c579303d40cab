//! Device abstraction layer
//!
//! Provides the immediate-mode device trait, shared types, scoped render state
//! and a headless device implementation.

pub mod headless;
pub mod state;
pub mod traits;
pub mod types;

pub use headless::{ClearRecord, DrawRecord, HeadlessBackend, HeadlessTexture, RenderTarget};
pub use state::{reset_render_state, StateGuard};
pub use traits::*;
pub use types::*;
