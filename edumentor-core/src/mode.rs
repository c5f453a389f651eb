use crate::types::InputMode;

/// Which capture surface is showing. Switching never touches captured data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputModeController {
    current: InputMode,
}

impl Default for InputModeController {
    fn default() -> Self {
        Self {
            current: InputMode::Text,
        }
    }
}

impl InputModeController {
    pub fn current(&self) -> InputMode {
        self.current
    }

    pub fn select(&mut self, mode: InputMode) {
        self.current = mode;
    }

    pub fn is_visible(&self, mode: InputMode) -> bool {
        self.current == mode
    }

    pub fn hidden(&self) -> impl Iterator<Item = InputMode> + '_ {
        InputMode::ALL.into_iter().filter(|m| *m != self.current)
    }
}
