// CONTROLLER: Input, simulation steps and the per-frame loop
pub mod camera_controller;
pub mod collision;
pub mod frame_loop;
pub mod input;
pub mod interaction;
pub mod physics;
pub mod proximity;
pub mod scheduler;

pub use camera_controller::{Capture, LookSource, OrientationController};
pub use collision::{CollisionResolver, Resolution};
pub use frame_loop::{FrameLoopContext, NavigationHost};
pub use input::{ControlEdges, ControlVector, EventQueue, InputAggregator, InputEvent, InputState, KeyBindings, VirtualButton};
pub use interaction::{InteractionEvent, InteractionState, InteractionStateStore, Shortcut};
pub use physics::KinematicBody;
pub use proximity::ProximityIndex;
pub use scheduler::Scheduler;
