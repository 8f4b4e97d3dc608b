use tracing::{debug, trace};

use super::camera_controller::{LookSource, OrientationController};
use super::collision::CollisionResolver;
use super::input::{ControlVector, EventQueue, InputAggregator, InputEvent, InputState, KeyBindings};
use super::interaction::{DispatchInput, InteractionEvent, InteractionState, InteractionStateStore, Shortcut};
use super::physics::KinematicBody;
use super::proximity::ProximityIndex;
use crate::config::NavigationConfig;
use crate::error::ConfigError;
use crate::model::{BodyState, CameraPose, InteractableDescriptor, InteractableId, OrientationState, SceneMode, SceneSet};

/// Callbacks into the view layer. Every method defaults to doing nothing.
pub trait NavigationHost {
    /// The deferred exit (or an immediate entry) has just been applied.
    fn on_scene_changed(&mut self, _from: SceneMode, _to: SceneMode) {}

    /// An exit was requested; pointer capture should be torn down now.
    fn on_transition_started(&mut self, _from: SceneMode, _to: SceneMode) {}

    fn on_toggled(&mut self, _id: InteractableId, _open: bool) {}

    fn on_shortcut(&mut self, _shortcut: Shortcut) {}
}

impl NavigationHost for () {}

/// Owns every navigation component and runs them in a fixed order once per frame:
/// input, orientation, body, collision, proximity, interaction.
pub struct FrameLoopContext<H: NavigationHost> {
    config: NavigationConfig,
    scenes: SceneSet,
    host: H,
    queue: EventQueue,
    input_state: InputState,
    aggregator: InputAggregator,
    orientation: OrientationController,
    kinematics: KinematicBody,
    collision: CollisionResolver,
    proximity: ProximityIndex,
    interactions: InteractionStateStore,
    body: BodyState,
    control: ControlVector,
    last_time: Option<f64>,
    frame: u64,
}

impl<H: NavigationHost> FrameLoopContext<H> {
    pub fn new(
        config: NavigationConfig,
        scenes: SceneSet,
        initial_mode: SceneMode,
        look_source: LookSource,
        host: H,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        scenes.outside.validate()?;
        scenes.inside.validate()?;

        let scene = scenes.get(initial_mode);
        let spawn = OrientationState::new(scene.spawn.yaw, scene.spawn.pitch);
        let sensitivity = match look_source {
            LookSource::PointerLock => config.mouse_sensitivity,
            LookSource::Touch => config.touch_sensitivity,
        };

        Ok(Self {
            queue: EventQueue::default(),
            input_state: InputState::new(config.button_repeat_ms),
            aggregator: InputAggregator::new(KeyBindings::default(), config.joystick_deadzone),
            orientation: OrientationController::new(look_source, sensitivity, spawn),
            kinematics: KinematicBody::new(&config),
            collision: CollisionResolver::new(&config),
            proximity: ProximityIndex::new(config.proximity_interval()),
            interactions: InteractionStateStore::new(&config, initial_mode, scene),
            body: BodyState::spawn(&scene.spawn, scene.ground_level),
            control: ControlVector::default(),
            last_time: None,
            frame: 0,
            config,
            scenes,
            host,
        })
    }

    pub fn with_bindings(mut self, bindings: KeyBindings) -> Self {
        self.aggregator = InputAggregator::new(bindings, self.config.joystick_deadzone);
        self
    }

    /// Queue a platform event; it is applied at the start of the next [`update`](Self::update).
    pub fn push(&mut self, event: InputEvent) {
        self.queue.push(event);
    }

    /// Advance one frame. `now_ms` is the host's monotonic clock.
    pub fn update(&mut self, now_ms: f64) {
        // A broken clock reading becomes a zero-length frame at the last good time.
        let now_ms = if now_ms.is_finite() {
            now_ms
        } else {
            debug!(now_ms, "non-finite frame clock, stepping with dt = 0");
            self.last_time.unwrap_or(0.0)
        };
        let dt = match self.last_time {
            Some(last) => ((now_ms - last) / 1000.0).clamp(0.0, self.config.max_frame_dt),
            None => 0.0,
        };
        self.last_time = Some(now_ms);
        self.frame += 1;

        // Sample input
        for event in self.queue.drain() {
            self.input_state.process_event(&event, now_ms);
            self.orientation.observe(&event);
        }
        let control = self.aggregator.aggregate(&self.input_state);
        let edges = control
            .rising_edges(&self.control)
            .union(self.aggregator.presses(&self.input_state));
        self.input_state.end_frame();
        self.control = control;

        // Orientation
        let orientation = self.orientation.update();

        // Body
        let scene = self.scenes.get(self.interactions.mode());
        let step = self.kinematics.horizontal_step(&control, &orientation, dt);
        self.kinematics.vertical_step(&mut self.body, control.jump, scene.ground_level, dt);

        // Collision
        let (position, resolution) = self.collision.resolve(self.body.position, step, &scene.obstacles);
        self.body.position = position;

        // Proximity
        let nearest = self.proximity.tick(position, &scene.interactables);

        trace!(frame = self.frame, dt, ?resolution, ?nearest, "frame stepped");

        // Interaction
        let events = self.interactions.dispatch(
            &self.scenes,
            DispatchInput { edges, nearest, position, now_ms },
        );
        for event in events {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: InteractionEvent) {
        match event {
            InteractionEvent::Toggled { id, open } => self.host.on_toggled(id, open),
            InteractionEvent::Shortcut(shortcut) => self.host.on_shortcut(shortcut),
            InteractionEvent::TransitionStarted { from, to } => self.host.on_transition_started(from, to),
            InteractionEvent::SceneChanged { from, to } => {
                self.enter_scene(to);
                self.host.on_scene_changed(from, to);
            }
        }
    }

    fn enter_scene(&mut self, mode: SceneMode) {
        let scene = self.scenes.get(mode);
        self.body = BodyState::spawn(&scene.spawn, scene.ground_level);
        self.orientation.reset(OrientationState::new(scene.spawn.yaw, scene.spawn.pitch));
        self.proximity.reset();
        debug!(mode = mode.name(), position = ?self.body.position, "body reset to spawn");
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.body.position,
            orientation: self.orientation.orientation(),
        }
    }

    pub fn body(&self) -> &BodyState {
        &self.body
    }

    pub fn scene_mode(&self) -> SceneMode {
        self.interactions.mode()
    }

    pub fn interactions(&self) -> &InteractionState {
        self.interactions.state()
    }

    pub fn nearest(&self) -> Option<InteractableId> {
        self.proximity.current()
    }

    /// Descriptor of the nearest interactable, for drawing its prompt.
    pub fn nearest_descriptor(&self) -> Option<&InteractableDescriptor> {
        let id = self.nearest()?;
        self.scenes.get(self.scene_mode()).descriptor(id)
    }

    pub fn transition_pending(&self) -> bool {
        self.interactions.transition_pending()
    }

    pub fn control(&self) -> ControlVector {
        self.control
    }

    pub fn orientation(&self) -> &OrientationController {
        &self.orientation
    }

    pub fn aggregator(&self) -> &InputAggregator {
        &self.aggregator
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::VirtualButton;
    use crate::model::presets;
    use glam::DVec3;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn inside() -> FrameLoopContext<()> {
        FrameLoopContext::new(
            NavigationConfig::default(),
            presets::scene_set(),
            SceneMode::Inside,
            LookSource::PointerLock,
            (),
        )
        .unwrap()
    }

    #[test]
    fn test_spawns_on_ground() {
        let ctx = inside();
        assert_eq!(ctx.body().position, DVec3::new(0.0, 2.2, 12.0));
        assert!(ctx.body().grounded);
    }

    #[test]
    fn test_walks_forward_at_walk_speed() {
        let mut ctx = inside();
        ctx.update(0.0);
        ctx.push(InputEvent::KeyDown("KeyW".into()));
        ctx.update(100.0);
        assert!((ctx.body().position.z - 11.2).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_clock_is_a_zero_length_frame() {
        let mut ctx = inside();
        ctx.update(0.0);
        ctx.push(InputEvent::KeyDown("KeyW".into()));
        ctx.update(f64::NAN);
        ctx.update(f64::INFINITY);
        assert_eq!(ctx.body().position, DVec3::new(0.0, 2.2, 12.0));

        // The clock picks up again from the last good reading.
        ctx.update(100.0);
        assert!((ctx.body().position.z - 11.2).abs() < 1e-9);
    }

    #[test]
    fn test_tap_between_frames_still_interacts() {
        let mut ctx = inside();
        ctx.update(0.0);
        assert_eq!(ctx.nearest(), Some(InteractableId::Door));
        ctx.push(InputEvent::KeyDown("KeyF".into()));
        ctx.push(InputEvent::KeyUp("KeyF".into()));
        ctx.update(50.0);
        assert!(ctx.transition_pending());
    }

    #[test]
    fn test_button_tap_between_frames_still_interacts() {
        let mut ctx = FrameLoopContext::new(
            NavigationConfig::default(),
            presets::scene_set(),
            SceneMode::Inside,
            LookSource::Touch,
            (),
        )
        .unwrap();
        ctx.update(0.0);
        ctx.push(InputEvent::Button { button: VirtualButton::Interact, pressed: true });
        ctx.push(InputEvent::Button { button: VirtualButton::Interact, pressed: false });
        ctx.update(50.0);
        assert!(ctx.transition_pending());
    }

    #[test]
    fn test_orientation_applied_before_movement() {
        let mut ctx = inside();
        ctx.update(0.0);
        ctx.push(InputEvent::PointerLockChanged { locked: true });
        // Quarter turn to the right, queued in the same frame as the key press.
        ctx.push(InputEvent::MouseMove { dx: std::f64::consts::FRAC_PI_2 / 0.002, dy: 0.0 });
        ctx.push(InputEvent::KeyDown("KeyW".into()));
        ctx.update(100.0);
        let p = ctx.body().position;
        assert!((p.x - 0.8).abs() < 1e-9);
        assert!((p.z - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_interact_toggles_nearest_once_per_press() {
        let mut ctx = inside();
        // Walk up to the laptop side of the desk.
        ctx.update(0.0);
        ctx.push(InputEvent::KeyDown("KeyW".into()));
        let mut now = 0.0;
        while ctx.nearest() != Some(InteractableId::Laptop) {
            now += FRAME_MS;
            ctx.update(now);
            assert!(now < 5000.0, "never reached the laptop");
        }
        ctx.push(InputEvent::KeyUp("KeyW".into()));
        ctx.push(InputEvent::KeyDown("KeyF".into()));
        for _ in 0..30 {
            now += FRAME_MS;
            ctx.update(now);
        }
        assert!(ctx.interactions().is_open(InteractableId::Laptop));
    }
}
