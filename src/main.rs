//! Headless walkthrough of the CV room. Replays a scripted visit against the
//! built-in scenes and logs every transition the view layer would react to.

use tracing::{error, info, warn};

use cvroom::controller::{FrameLoopContext, InputEvent, LookSource, NavigationHost, Shortcut};
use cvroom::model::{presets, InteractableId, SceneMode};
use cvroom::{logging, ConfigError, NavigationConfig};

const FRAME_MS: f64 = 1000.0 / 60.0;
const STEP_LIMIT_MS: f64 = 10_000.0;

struct LoggingHost;

impl NavigationHost for LoggingHost {
    fn on_scene_changed(&mut self, from: SceneMode, to: SceneMode) {
        info!(from = from.name(), to = to.name(), "host: load scene");
    }

    fn on_transition_started(&mut self, from: SceneMode, to: SceneMode) {
        info!(from = from.name(), to = to.name(), "host: release pointer capture");
    }

    fn on_toggled(&mut self, id: InteractableId, open: bool) {
        info!(id = id.name(), open, "host: toggle overlay");
    }

    fn on_shortcut(&mut self, shortcut: Shortcut) {
        info!(shortcut = shortcut.name(), "host: open external link");
    }
}

struct Walkthrough {
    ctx: FrameLoopContext<LoggingHost>,
    now: f64,
}

impl Walkthrough {
    fn step(&mut self) {
        self.now += FRAME_MS;
        self.ctx.update(self.now);
    }

    fn frames(&mut self, n: usize) {
        for _ in 0..n {
            self.step();
        }
    }

    /// Press and release a key, one frame each.
    fn tap(&mut self, code: &str) {
        self.ctx.push(InputEvent::KeyDown(code.to_string()));
        self.step();
        self.ctx.push(InputEvent::KeyUp(code.to_string()));
        self.step();
    }

    /// Hold `code` until `done` holds or the step limit runs out.
    fn hold_until(&mut self, code: &str, what: &str, done: impl Fn(&FrameLoopContext<LoggingHost>) -> bool) {
        let start = self.now;
        self.ctx.push(InputEvent::KeyDown(code.to_string()));
        while !done(&self.ctx) {
            if self.now - start > STEP_LIMIT_MS {
                warn!(what, position = ?self.ctx.body().position, "gave up walking");
                break;
            }
            self.step();
        }
        self.ctx.push(InputEvent::KeyUp(code.to_string()));
        self.step();
        info!(what, position = ?self.ctx.body().position, nearest = ?self.ctx.nearest(), "arrived");
    }
}

fn run() -> Result<(), ConfigError> {
    let ctx = FrameLoopContext::new(
        NavigationConfig::default(),
        presets::scene_set(),
        SceneMode::Outside,
        LookSource::PointerLock,
        LoggingHost,
    )?;
    let mut walk = Walkthrough { ctx, now: 0.0 };
    walk.ctx.update(walk.now);
    walk.ctx.push(InputEvent::PointerLockChanged { locked: true });

    // Up the garden path and through the front door
    walk.hold_until("KeyW", "front door", |ctx| ctx.body().position.z < 1.5);
    walk.tap("KeyF");

    // Over to the phone shelf, send an email, then pick up the phone
    walk.hold_until("KeyD", "phone", |ctx| ctx.nearest() == Some(InteractableId::Phone));
    walk.tap("KeyE");
    walk.tap("KeyE");
    walk.tap("KeyF");

    // Jump on the spot
    walk.ctx.push(InputEvent::KeyDown("Space".to_string()));
    walk.step();
    walk.ctx.push(InputEvent::KeyUp("Space".to_string()));
    while !walk.ctx.body().grounded {
        walk.step();
    }
    info!(y = walk.ctx.body().position.y, "landed");

    // Back to the door and out
    walk.hold_until("KeyA", "exit door", |ctx| ctx.nearest() == Some(InteractableId::Door));
    walk.tap("KeyF");
    walk.tap("KeyF");
    walk.frames(10);

    let pose = walk.ctx.pose();
    info!(
        scene = walk.ctx.scene_mode().name(),
        position = ?pose.position,
        yaw = pose.yaw(),
        elapsed_ms = walk.now,
        "walkthrough finished"
    );
    Ok(())
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        error!(%err, "walkthrough aborted");
        std::process::exit(1);
    }
}
