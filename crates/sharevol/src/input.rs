//! Adapts winit window events into viewer pointer events.

use glam::Vec2;
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::ModifiersState;

/// Wheel units per pixel of a pixel-precise scroll.
pub const PIXEL_SCROLL_SCALE: f32 = 0.1;

/// Pinch distance in pixels per unit of gesture scale.
pub const PINCH_PIXELS: f64 = 1000.0;

/// Pointer buttons the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Rotates the volume, paints and moves slice cursors.
    Primary,
    /// Rolls the volume about the view axis.
    Middle,
    /// Pans the volume.
    Secondary,
}

impl PointerButton {
    /// Maps a winit button. Back, forward and other buttons are ignored.
    pub fn from_winit(button: MouseButton) -> Option<Self> {
        match button {
            MouseButton::Left => Some(Self::Primary),
            MouseButton::Middle => Some(Self::Middle),
            MouseButton::Right => Some(Self::Secondary),
            _ => None,
        }
    }
}

/// Converts a scroll delta into wheel spin.
#[allow(clippy::cast_possible_truncation)]
pub fn wheel_spin(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * PIXEL_SCROLL_SCALE,
    }
}

/// A pointer event in canvas pixels, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { button: PointerButton, position: Vec2 },
    /// Pointer moved with a button held.
    Drag {
        button: PointerButton,
        position: Vec2,
        delta: Vec2,
    },
    /// Pointer moved with no button held.
    Hover { position: Vec2 },
    Up { button: PointerButton },
    /// Wheel spin; `modifier` is set while shift is held.
    Wheel {
        position: Vec2,
        spin: f32,
        modifier: bool,
    },
    Pinch { distance: f32 },
}

/// Tracks pointer position, held button and modifiers across events.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    position: Vec2,
    pressed: Option<PointerButton>,
    shift: bool,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn pressed(&self) -> Option<PointerButton> {
        self.pressed
    }

    /// Translates a window event. Events the viewer does not use return `None`.
    pub fn handle(&mut self, event: &WindowEvent) -> Option<PointerEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => Some(self.cursor_moved(*position)),
            WindowEvent::MouseInput { state, button, .. } => self.button(*button, *state),
            WindowEvent::MouseWheel { delta, .. } => Some(self.wheel(*delta)),
            WindowEvent::ModifiersChanged(modifiers) => {
                self.set_modifiers(modifiers.state());
                None
            }
            WindowEvent::PinchGesture { delta, .. } => Some(self.pinch(*delta)),
            _ => None,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn cursor_moved(&mut self, position: PhysicalPosition<f64>) -> PointerEvent {
        let position = Vec2::new(position.x as f32, position.y as f32);
        let delta = position - self.position;
        self.position = position;
        match self.pressed {
            Some(button) => PointerEvent::Drag {
                button,
                position,
                delta,
            },
            None => PointerEvent::Hover { position },
        }
    }

    pub fn button(&mut self, button: MouseButton, state: ElementState) -> Option<PointerEvent> {
        let button = PointerButton::from_winit(button)?;
        match state {
            ElementState::Pressed => {
                self.pressed = Some(button);
                Some(PointerEvent::Down {
                    button,
                    position: self.position,
                })
            }
            ElementState::Released => {
                if self.pressed == Some(button) {
                    self.pressed = None;
                }
                Some(PointerEvent::Up { button })
            }
        }
    }

    pub fn wheel(&mut self, delta: MouseScrollDelta) -> PointerEvent {
        PointerEvent::Wheel {
            position: self.position,
            spin: wheel_spin(delta),
            modifier: self.shift,
        }
    }

    pub fn set_modifiers(&mut self, modifiers: ModifiersState) {
        self.shift = modifiers.shift_key();
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn pinch(&mut self, delta: f64) -> PointerEvent {
        PointerEvent::Pinch {
            distance: (delta * PINCH_PIXELS) as f32,
        }
    }
}
