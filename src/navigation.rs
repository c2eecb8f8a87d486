use heapless::Vec;

use crate::config::SCREEN_STACK_DEPTH;
use crate::host::Navigation;
use crate::types::ScreenId;

/// Bounded display-state stack; the root screen is never popped.
#[derive(Clone, Debug)]
pub struct ScreenStack {
    screens: Vec<ScreenId, SCREEN_STACK_DEPTH>,
}

impl Default for ScreenStack {
    fn default() -> Self {
        Self::new(ScreenId::Main)
    }
}

impl ScreenStack {
    pub fn new(root: ScreenId) -> Self {
        let mut screens = Vec::new();
        let _ = screens.push(root);
        Self { screens }
    }

    pub fn depth(&self) -> usize {
        self.screens.len()
    }

    pub fn as_slice(&self) -> &[ScreenId] {
        &self.screens
    }
}

impl Navigation for ScreenStack {
    fn enter(&mut self, screen: ScreenId) {
        if self.screens.last() == Some(&screen) {
            return;
        }
        if self.screens.push(screen).is_err() {
            // Full: the new screen replaces the top rather than being dropped.
            log::warn!("navigation: stack full depth={}", SCREEN_STACK_DEPTH);
            if let Some(top) = self.screens.last_mut() {
                *top = screen;
            }
        }
    }

    fn leave(&mut self) {
        if self.screens.len() > 1 {
            let _ = self.screens.pop();
        }
    }

    fn current(&self) -> Option<ScreenId> {
        self.screens.last().copied()
    }
}
