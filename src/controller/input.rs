/// Platform-agnostic input handling system
use std::collections::{HashSet, VecDeque};

use glam::DVec2;
use tracing::trace;

/// Platform-independent input events
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    // Keyboard events, keyed by `KeyboardEvent.code`
    KeyDown(String),
    KeyUp(String),

    // Pointer look
    MouseMove { dx: f64, dy: f64 },
    /// User gesture asking for pointer lock (e.g. a canvas click).
    CaptureRequested,
    PointerLockChanged { locked: bool },
    /// The platform refused the lock request.
    PointerLockError,

    // Touch look
    TouchStart { x: f64, y: f64, touches: u32 },
    TouchMove { x: f64, y: f64, touches: u32 },
    TouchEnd,

    // On-screen controls
    Joystick { x: f64, y: f64 },
    JoystickReleased,
    Button { button: VirtualButton, pressed: bool },

    // Window events
    FocusLost,
    VisibilityChanged { visible: bool },
    ViewportResized { width: f64, height: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VirtualButton {
    Jump,
    Interact,
    AuxA,
    AuxB,
}

impl VirtualButton {
    const COUNT: usize = 4;

    fn index(self) -> usize {
        self as usize
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "jump" => Some(VirtualButton::Jump),
            "interact" => Some(VirtualButton::Interact),
            "aux_a" | "e" => Some(VirtualButton::AuxA),
            "aux_b" | "l" => Some(VirtualButton::AuxB),
            _ => None,
        }
    }
}

/// One frame's worth of intent, merged from every input device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlVector {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub run: bool,
    pub interact: bool,
    pub aux_a: bool,
    pub aux_b: bool,
}

/// Actions that fire once per press rather than while held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlEdges {
    pub interact: bool,
    pub aux_a: bool,
    pub aux_b: bool,
}

impl ControlEdges {
    pub fn union(self, other: ControlEdges) -> ControlEdges {
        ControlEdges {
            interact: self.interact || other.interact,
            aux_a: self.aux_a || other.aux_a,
            aux_b: self.aux_b || other.aux_b,
        }
    }
}

impl ControlVector {
    pub fn rising_edges(&self, previous: &ControlVector) -> ControlEdges {
        ControlEdges {
            interact: self.interact && !previous.interact,
            aux_a: self.aux_a && !previous.aux_a,
            aux_b: self.aux_b && !previous.aux_b,
        }
    }

    pub fn is_moving(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }
}

/// Raw device state between frames.
pub struct InputState {
    pub pressed_keys: HashSet<String>,
    /// Screen-space stick deflection, clamped to the unit disk.
    pub joystick: DVec2,
    buttons: [bool; VirtualButton::COUNT],
    /// Keys and buttons that went down since the last [`end_frame`](Self::end_frame),
    /// kept even if they were released again before the frame ran.
    keys_down_this_frame: HashSet<String>,
    buttons_down_this_frame: [bool; VirtualButton::COUNT],
    last_button_press: [Option<f64>; VirtualButton::COUNT],
    button_repeat_ms: f64,
}

impl InputState {
    pub fn new(button_repeat_ms: f64) -> Self {
        Self {
            pressed_keys: HashSet::new(),
            joystick: DVec2::ZERO,
            buttons: [false; VirtualButton::COUNT],
            keys_down_this_frame: HashSet::new(),
            buttons_down_this_frame: [false; VirtualButton::COUNT],
            last_button_press: [None; VirtualButton::COUNT],
            button_repeat_ms,
        }
    }

    /// Process an input event and update state. Look events are not handled here.
    pub fn process_event(&mut self, event: &InputEvent, now_ms: f64) {
        match event {
            InputEvent::KeyDown(code) => {
                if self.pressed_keys.insert(code.clone()) {
                    self.keys_down_this_frame.insert(code.clone());
                }
            }
            InputEvent::KeyUp(code) => {
                self.pressed_keys.remove(code.as_str());
            }
            InputEvent::Joystick { x, y } => {
                let v = DVec2::new(*x, *y);
                self.joystick = if v.is_finite() { v.clamp_length_max(1.0) } else { DVec2::ZERO };
            }
            InputEvent::JoystickReleased => {
                self.joystick = DVec2::ZERO;
            }
            InputEvent::Button { button, pressed } => self.set_button(*button, *pressed, now_ms),
            InputEvent::FocusLost | InputEvent::VisibilityChanged { visible: false } => {
                self.clear();
            }
            _ => {}
        }
    }

    fn set_button(&mut self, button: VirtualButton, pressed: bool, now_ms: f64) {
        let i = button.index();
        if pressed {
            if let Some(last) = self.last_button_press[i] {
                if now_ms - last < self.button_repeat_ms {
                    trace!(?button, "virtual button press rate limited");
                    return;
                }
            }
            self.last_button_press[i] = Some(now_ms);
            self.buttons_down_this_frame[i] = true;
        }
        self.buttons[i] = pressed;
    }

    pub fn is_key_pressed(&self, code: &str) -> bool {
        self.pressed_keys.contains(code)
    }

    pub fn is_button_pressed(&self, button: VirtualButton) -> bool {
        self.buttons[button.index()]
    }

    /// True if `code` went down since the last frame, even if it is already up again.
    pub fn was_key_pressed(&self, code: &str) -> bool {
        self.keys_down_this_frame.contains(code)
    }

    pub fn was_button_pressed(&self, button: VirtualButton) -> bool {
        self.buttons_down_this_frame[button.index()]
    }

    /// Forget this frame's presses. Held state is kept.
    pub fn end_frame(&mut self) {
        self.keys_down_this_frame.clear();
        self.buttons_down_this_frame = [false; VirtualButton::COUNT];
    }

    pub fn clear(&mut self) {
        self.pressed_keys.clear();
        self.joystick = DVec2::ZERO;
        self.buttons = [false; VirtualButton::COUNT];
        self.end_frame();
    }
}

/// Key mapping configuration, by `KeyboardEvent.code`
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub forward: String,
    pub backward: String,
    pub left: String,
    pub right: String,
    /// Secondary movement keys, the arrow keys by default.
    pub forward_alt: String,
    pub backward_alt: String,
    pub left_alt: String,
    pub right_alt: String,
    pub jump: String,
    pub run: String,
    pub interact: String,
    pub aux_a: String,
    pub aux_b: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: "KeyW".to_string(),
            backward: "KeyS".to_string(),
            left: "KeyA".to_string(),
            right: "KeyD".to_string(),
            forward_alt: "ArrowUp".to_string(),
            backward_alt: "ArrowDown".to_string(),
            left_alt: "ArrowLeft".to_string(),
            right_alt: "ArrowRight".to_string(),
            jump: "Space".to_string(),
            run: "ShiftLeft".to_string(),
            interact: "KeyF".to_string(),
            aux_a: "KeyE".to_string(),
            aux_b: "KeyL".to_string(),
        }
    }
}

impl KeyBindings {
    /// Codes whose browser default (scrolling) should be suppressed.
    pub fn is_navigation_key(&self, code: &str) -> bool {
        [&self.jump, &self.forward_alt, &self.backward_alt, &self.left_alt, &self.right_alt]
            .into_iter()
            .any(|bound| bound == code)
    }
}

/// Folds keyboard, joystick and virtual buttons into a [`ControlVector`].
#[derive(Debug, Clone)]
pub struct InputAggregator {
    bindings: KeyBindings,
    deadzone: f64,
}

impl InputAggregator {
    pub fn new(bindings: KeyBindings, deadzone: f64) -> Self {
        Self { bindings, deadzone }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn aggregate(&self, input: &InputState) -> ControlVector {
        let key = |code: &str| input.is_key_pressed(code);
        let stick = input.joystick;
        let b = &self.bindings;

        ControlVector {
            forward: key(&b.forward) || key(&b.forward_alt) || stick.y < -self.deadzone,
            backward: key(&b.backward) || key(&b.backward_alt) || stick.y > self.deadzone,
            left: key(&b.left) || key(&b.left_alt) || stick.x < -self.deadzone,
            right: key(&b.right) || key(&b.right_alt) || stick.x > self.deadzone,
            jump: key(&self.bindings.jump) || input.is_button_pressed(VirtualButton::Jump),
            // Touch has no run control.
            run: key(&self.bindings.run),
            interact: key(&self.bindings.interact) || input.is_button_pressed(VirtualButton::Interact),
            aux_a: key(&self.bindings.aux_a) || input.is_button_pressed(VirtualButton::AuxA),
            aux_b: key(&self.bindings.aux_b) || input.is_button_pressed(VirtualButton::AuxB),
        }
    }

    /// Press actions that went down this frame, including taps already released.
    pub fn presses(&self, input: &InputState) -> ControlEdges {
        let tapped = |code: &str, button: VirtualButton| input.was_key_pressed(code) || input.was_button_pressed(button);
        ControlEdges {
            interact: tapped(&self.bindings.interact, VirtualButton::Interact),
            aux_a: tapped(&self.bindings.aux_a, VirtualButton::AuxA),
            aux_b: tapped(&self.bindings.aux_b, VirtualButton::AuxB),
        }
    }
}

/// Events queued by platform callbacks, applied at one fixed point per frame.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<InputEvent>,
}

impl EventQueue {
    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.events.drain(..)
    }
}

pub mod wasm {
    use super::*;
    use web_sys::{KeyboardEvent, MouseEvent, TouchEvent};

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> InputEvent {
        let code = e.code();
        if is_down {
            InputEvent::KeyDown(code)
        } else {
            InputEvent::KeyUp(code)
        }
    }

    pub fn mouse_move_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::MouseMove {
            dx: e.movement_x() as f64,
            dy: e.movement_y() as f64,
        }
    }

    /// `None` when the event carries no touch point (e.g. a last-finger end).
    pub fn touch_to_input(e: &TouchEvent, is_start: bool) -> Option<InputEvent> {
        let touches = e.touches();
        let touch = touches.get(0)?;
        let (x, y, count) = (touch.client_x() as f64, touch.client_y() as f64, touches.length());
        Some(if is_start {
            InputEvent::TouchStart { x, y, touches: count }
        } else {
            InputEvent::TouchMove { x, y, touches: count }
        })
    }
}
