pub mod hold;

use crossterm::event::{MouseButton, MouseEventKind};

pub use hold::{HoldActivation, HoldGesture, HoldPhase, Propagation, DEFAULT_HOLD_THRESHOLD};

/// Raw press/release/move signals a hold target listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSignal {
    MouseDown,
    MouseMove,
    MouseUp,
    TouchStart,
    TouchMove,
    TouchEnd,
    TouchCancel,
}

impl PointerSignal {
    pub fn is_press_start(self) -> bool {
        matches!(self, PointerSignal::MouseDown | PointerSignal::TouchStart)
    }

    pub fn is_release(self) -> bool {
        matches!(
            self,
            PointerSignal::MouseUp | PointerSignal::TouchEnd | PointerSignal::TouchCancel
        )
    }

    /// Terminal mouse reports mapped onto pointer signals. Only the left
    /// button starts a press; scroll events are not pointer signals.
    pub fn from_mouse(kind: MouseEventKind) -> Option<Self> {
        match kind {
            MouseEventKind::Down(MouseButton::Left) => Some(PointerSignal::MouseDown),
            MouseEventKind::Drag(_) | MouseEventKind::Moved => Some(PointerSignal::MouseMove),
            MouseEventKind::Up(_) => Some(PointerSignal::MouseUp),
            _ => None,
        }
    }
}
