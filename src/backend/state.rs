//! Scoped render state

use std::ops::{Deref, DerefMut};

use super::traits::GraphicsBackend;
use super::types::RenderState;

/// Captures the device render state on creation and restores it on drop.
///
/// Restoration happens on every exit path, including early returns through `?`.
pub struct StateGuard<'a, B: GraphicsBackend> {
    backend: &'a mut B,
    saved: RenderState,
}

impl<'a, B: GraphicsBackend> StateGuard<'a, B> {
    pub fn new(backend: &'a mut B) -> Self {
        let saved = backend.render_state();
        Self { backend, saved }
    }
}

impl<B: GraphicsBackend> Deref for StateGuard<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.backend
    }
}

impl<B: GraphicsBackend> DerefMut for StateGuard<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.backend
    }
}

impl<B: GraphicsBackend> Drop for StateGuard<'_, B> {
    fn drop(&mut self) {
        self.backend.set_render_state(self.saved);
    }
}

/// Force the device back to the known default state
pub fn reset_render_state<B: GraphicsBackend>(backend: &mut B) {
    backend.set_render_state(RenderState::default());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BlendState, CompareFunction, CullMode, HeadlessBackend};

    fn failing_pass<B: GraphicsBackend>(backend: &mut B) -> Result<(), ()> {
        let mut guard = StateGuard::new(backend);
        guard.set_blend(Some(BlendState::additive()));
        guard.set_cull_mode(CullMode::None);
        Err(())
    }

    #[test]
    fn test_guard_restores_on_drop() {
        let mut backend = HeadlessBackend::new(64, 64);
        {
            let mut guard = StateGuard::new(&mut backend);
            guard.set_depth_func(CompareFunction::LessEqual);
            guard.set_depth_test(false);
            assert!(!guard.render_state().depth_test);
        }
        assert_eq!(backend.render_state(), RenderState::default());
    }

    #[test]
    fn test_guard_restores_on_error_path() {
        let mut backend = HeadlessBackend::new(64, 64);
        assert!(failing_pass(&mut backend).is_err());
        assert_eq!(backend.render_state(), RenderState::default());
    }
}
