use glam::DVec2;
use tracing::debug;

use super::input::InputEvent;
use crate::model::OrientationState;

/// Where look deltas come from. Fixed for a session; never both at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookSource {
    PointerLock,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    Idle,
    /// A user gesture asked for the lock and the platform has not answered yet.
    Requested,
    Active,
}

/// Screen rectangles reserved for on-screen controls; touches there never steer the camera.
#[derive(Debug, Clone, Copy)]
struct ControlZones {
    width: f64,
    height: f64,
}

impl ControlZones {
    const JOYSTICK: (f64, f64) = (120.0, 120.0);
    const BUTTONS: (f64, f64) = (150.0, 220.0);

    fn contains(&self, x: f64, y: f64) -> bool {
        let in_joystick = x >= self.width - Self::JOYSTICK.0 && y >= self.height - Self::JOYSTICK.1;
        let in_buttons = x <= Self::BUTTONS.0 && y >= self.height - Self::BUTTONS.1;
        in_joystick || in_buttons
    }
}

/// Turns pointer-lock or touch-drag deltas into yaw and pitch.
pub struct OrientationController {
    source: LookSource,
    sensitivity: f64,
    capture: Capture,
    orientation: OrientationState,
    pending: DVec2,
    last_touch: DVec2,
    zones: Option<ControlZones>,
}

impl OrientationController {
    pub fn new(source: LookSource, sensitivity: f64, initial: OrientationState) -> Self {
        Self {
            source,
            sensitivity,
            capture: Capture::Idle,
            orientation: initial,
            pending: DVec2::ZERO,
            last_touch: DVec2::ZERO,
            zones: None,
        }
    }

    pub fn source(&self) -> LookSource {
        self.source
    }

    pub fn capture(&self) -> Capture {
        self.capture
    }

    pub fn is_active(&self) -> bool {
        self.capture == Capture::Active
    }

    pub fn orientation(&self) -> OrientationState {
        self.orientation
    }

    /// Observe one queued event. Deltas are gated by the capture state at the time of the event.
    pub fn observe(&mut self, event: &InputEvent) {
        match (self.source, event) {
            (_, InputEvent::ViewportResized { width, height }) => {
                self.zones = Some(ControlZones { width: *width, height: *height });
            }
            (_, InputEvent::FocusLost) | (_, InputEvent::VisibilityChanged { visible: false }) => {
                self.release();
            }

            (LookSource::PointerLock, InputEvent::CaptureRequested) => {
                if self.capture == Capture::Idle {
                    self.capture = Capture::Requested;
                }
            }
            (LookSource::PointerLock, InputEvent::PointerLockChanged { locked: true }) => {
                debug!("pointer lock acquired");
                self.capture = Capture::Active;
            }
            (LookSource::PointerLock, InputEvent::PointerLockChanged { locked: false }) => {
                self.release();
            }
            (LookSource::PointerLock, InputEvent::PointerLockError) => {
                // Stays inert until the next gesture; nothing is retried.
                debug!("pointer lock denied");
                self.capture = Capture::Idle;
            }
            (LookSource::PointerLock, InputEvent::MouseMove { dx, dy }) => {
                if self.is_active() {
                    self.pending += DVec2::new(*dx, *dy);
                }
            }

            (LookSource::Touch, InputEvent::TouchStart { x, y, touches }) => {
                if *touches == 1 && !self.in_control_zone(*x, *y) {
                    self.last_touch = DVec2::new(*x, *y);
                    self.capture = Capture::Active;
                }
            }
            (LookSource::Touch, InputEvent::TouchMove { x, y, touches }) => {
                if self.is_active() && *touches == 1 && !self.in_control_zone(*x, *y) {
                    let point = DVec2::new(*x, *y);
                    self.pending += point - self.last_touch;
                    self.last_touch = point;
                }
            }
            (LookSource::Touch, InputEvent::TouchEnd) => {
                self.capture = Capture::Idle;
            }

            _ => {}
        }
    }

    fn in_control_zone(&self, x: f64, y: f64) -> bool {
        self.zones.is_some_and(|z| z.contains(x, y))
    }

    /// Drop capture; later deltas are ignored until it is regranted.
    pub fn release(&mut self) {
        if self.capture != Capture::Idle {
            debug!(source = ?self.source, "look capture released");
        }
        self.capture = Capture::Idle;
    }

    /// Apply the deltas gathered this frame.
    pub fn update(&mut self) -> OrientationState {
        if self.pending != DVec2::ZERO {
            self.orientation.apply_delta(self.pending.x, self.pending.y, self.sensitivity);
            self.pending = DVec2::ZERO;
        }
        self.orientation
    }

    /// Snap to a scene's spawn orientation, discarding unapplied deltas.
    pub fn reset(&mut self, orientation: OrientationState) {
        self.orientation = orientation;
        self.pending = DVec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mouse(dx: f64, dy: f64) -> InputEvent {
        InputEvent::MouseMove { dx, dy }
    }

    #[test]
    fn test_deltas_ignored_until_lock_granted() {
        let mut c = OrientationController::new(LookSource::PointerLock, 0.002, OrientationState::default());
        c.observe(&mouse(100.0, 0.0));
        c.observe(&InputEvent::CaptureRequested);
        c.observe(&mouse(100.0, 0.0));
        assert_eq!(c.update().yaw, 0.0);

        c.observe(&InputEvent::PointerLockChanged { locked: true });
        c.observe(&mouse(100.0, 50.0));
        let o = c.update();
        assert!((o.yaw - -0.2).abs() < 1e-12);
        assert!((o.pitch - -0.1).abs() < 1e-12);
    }

    #[test]
    fn test_denied_lock_stays_idle() {
        let mut c = OrientationController::new(LookSource::PointerLock, 0.002, OrientationState::default());
        c.observe(&InputEvent::CaptureRequested);
        c.observe(&InputEvent::PointerLockError);
        c.observe(&mouse(100.0, 0.0));
        assert_eq!(c.capture(), Capture::Idle);
        assert_eq!(c.update().yaw, 0.0);
    }

    #[test]
    fn test_deltas_after_release_are_dropped() {
        let mut c = OrientationController::new(LookSource::PointerLock, 0.002, OrientationState::default());
        c.observe(&InputEvent::PointerLockChanged { locked: true });
        c.observe(&mouse(10.0, 0.0));
        c.observe(&InputEvent::VisibilityChanged { visible: false });
        c.observe(&mouse(1000.0, 0.0));
        assert!((c.update().yaw - -0.02).abs() < 1e-12);
    }

    #[test]
    fn test_touch_source_ignores_mouse() {
        let mut c = OrientationController::new(LookSource::Touch, 0.003, OrientationState::default());
        c.observe(&InputEvent::PointerLockChanged { locked: true });
        c.observe(&mouse(100.0, 0.0));
        assert_eq!(c.update().yaw, 0.0);

        c.observe(&InputEvent::TouchStart { x: 200.0, y: 200.0, touches: 1 });
        c.observe(&InputEvent::TouchMove { x: 210.0, y: 200.0, touches: 1 });
        c.observe(&InputEvent::TouchMove { x: 230.0, y: 200.0, touches: 1 });
        assert!((c.update().yaw - -0.09).abs() < 1e-12);
    }

    #[test]
    fn test_touch_in_control_zone_ignored() {
        let mut c = OrientationController::new(LookSource::Touch, 0.003, OrientationState::default());
        c.observe(&InputEvent::ViewportResized { width: 800.0, height: 600.0 });
        c.observe(&InputEvent::TouchStart { x: 750.0, y: 550.0, touches: 1 });
        assert!(!c.is_active());

        c.observe(&InputEvent::TouchStart { x: 400.0, y: 300.0, touches: 2 });
        assert!(!c.is_active());
    }
}
