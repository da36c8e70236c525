//! Keyboard and mouse standing in for the hand detector.
//!
//! The viewer has no camera, so [`Input`] turns window events into the same
//! [`HandObservation`]s a detector would report:
//!
//! - the cursor is the steering hand's anchor while it is inside the window,
//! - holding the left mouse button closes that hand into a fist,
//! - digit keys `0`-`5` raise that many fingers on the selecting hand.
//!
//! ```ignore
//! input.handle_event(&event);
//! let hands = input.hands(Handedness::Right);
//! sculpture.on_detection(&hands);
//! input.begin_frame();
//! ```

use crate::hand::{HandObservation, Handedness};
use crate::synthetic::HandPose;
use glam::{Vec2, Vec3};
use std::collections::HashSet;
use winit::event::{ElementState, MouseButton as WinitMouseButton, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

/// Where the selecting hand is drawn. It exerts no force, so any point works.
const SELECTION_ANCHOR: Vec3 = Vec3::new(0.8, 0.6, 0.0);

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl From<WinitMouseButton> for MouseButton {
    fn from(btn: WinitMouseButton) -> Self {
        match btn {
            WinitMouseButton::Left => MouseButton::Left,
            WinitMouseButton::Right => MouseButton::Right,
            WinitMouseButton::Middle => MouseButton::Middle,
            _ => MouseButton::Left,
        }
    }
}

/// The keys the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Key0,
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    Escape,
    Other(u32),
}

impl KeyCode {
    /// Finger count for a digit key.
    pub fn finger_count(self) -> Option<u8> {
        match self {
            KeyCode::Key0 => Some(0),
            KeyCode::Key1 => Some(1),
            KeyCode::Key2 => Some(2),
            KeyCode::Key3 => Some(3),
            KeyCode::Key4 => Some(4),
            KeyCode::Key5 => Some(5),
            _ => None,
        }
    }
}

impl From<WinitKeyCode> for KeyCode {
    fn from(key: WinitKeyCode) -> Self {
        match key {
            WinitKeyCode::Digit0 | WinitKeyCode::Numpad0 => KeyCode::Key0,
            WinitKeyCode::Digit1 | WinitKeyCode::Numpad1 => KeyCode::Key1,
            WinitKeyCode::Digit2 | WinitKeyCode::Numpad2 => KeyCode::Key2,
            WinitKeyCode::Digit3 | WinitKeyCode::Numpad3 => KeyCode::Key3,
            WinitKeyCode::Digit4 | WinitKeyCode::Numpad4 => KeyCode::Key4,
            WinitKeyCode::Digit5 | WinitKeyCode::Numpad5 => KeyCode::Key5,
            WinitKeyCode::Escape => KeyCode::Escape,
            _ => KeyCode::Other(key as u32),
        }
    }
}

/// Input state tracking for keyboard and mouse.
#[derive(Debug, Default)]
pub struct Input {
    keys_held: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    mouse_held: HashSet<MouseButton>,

    // None while the cursor is outside the window.
    cursor: Option<Vec2>,
    window_size: (u32, u32),

    // None until a digit key has been pressed.
    selection_fingers: Option<u8>,
}

impl Input {
    pub fn new() -> Self {
        Self {
            window_size: (800, 600),
            ..Default::default()
        }
    }

    /// Check if a key was pressed this frame (just went down).
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn mouse_held(&self, button: MouseButton) -> bool {
        self.mouse_held.contains(&button)
    }

    /// Cursor position as a fraction of the window, `(0, 0)` top-left.
    pub fn cursor_fraction(&self) -> Option<Vec2> {
        let (w, h) = self.window_size;
        if w == 0 || h == 0 {
            return None;
        }
        self.cursor
            .map(|c| (c / Vec2::new(w as f32, h as f32)).clamp(Vec2::ZERO, Vec2::ONE))
    }

    /// Fingers currently raised on the selecting hand.
    pub fn selection_fingers(&self) -> Option<u8> {
        self.selection_fingers
    }

    /// The hands a detector would report for the current input.
    ///
    /// Landmarks use the detector's mirrored frame, so the cursor's `x` is
    /// flipped.
    pub fn hands(&self, selection_hand: Handedness) -> Vec<HandObservation> {
        let mut hands = Vec::with_capacity(2);

        if let Some(fingers) = self.selection_fingers {
            hands.push(
                HandPose::open(fingers)
                    .with_anchor(SELECTION_ANCHOR)
                    .build(selection_hand),
            );
        }

        if let Some(screen) = self.cursor_fraction() {
            let pose = if self.mouse_held(MouseButton::Left) {
                HandPose::fist()
            } else {
                HandPose::open(5)
            };
            let anchor = Vec3::new(1.0 - screen.x, screen.y, 0.0);
            hands.push(pose.with_anchor(anchor).build(selection_hand.opposite()));
        }

        hands
    }

    /// Called at the start of each frame to clear per-frame state.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
    }

    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(keycode) = event.physical_key {
                    self.key_event(KeyCode::from(keycode), event.state);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.mouse_event(MouseButton::from(*button), *state);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Some(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
            }
            WindowEvent::Resized(size) => {
                self.set_window_size(size.width, size.height);
            }
            _ => {}
        }
    }

    fn key_event(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                // No repeat
                if self.keys_held.insert(key) {
                    self.keys_pressed.insert(key);
                    if let Some(fingers) = key.finger_count() {
                        self.selection_fingers = Some(fingers);
                    }
                }
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
            }
        }
    }

    fn mouse_event(&mut self, button: MouseButton, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.mouse_held.insert(button);
            }
            ElementState::Released => {
                self.mouse_held.remove(&button);
            }
        }
    }
}
