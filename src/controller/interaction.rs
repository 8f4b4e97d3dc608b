//! Per-object open/closed state and the outside/inside scene machine.
//!
//! This is the only place that writes interaction flags or the scene mode.

use glam::DVec3;
use tracing::{debug, info, trace};

use super::input::ControlEdges;
use super::scheduler::Scheduler;
use crate::config::NavigationConfig;
use crate::model::{InteractableId, InteractableKind, Region, SceneConfig, SceneMode, SceneSet};

/// Open/closed flag per interactable, for the interactables the current scene registered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionState {
    open: [bool; InteractableId::COUNT],
    registered: [bool; InteractableId::COUNT],
}

impl InteractionState {
    pub fn for_scene(scene: &SceneConfig) -> Self {
        let mut state = Self::default();
        for d in &scene.interactables {
            state.registered[d.id.index()] = true;
        }
        state
    }

    pub fn is_open(&self, id: InteractableId) -> bool {
        self.open[id.index()]
    }

    pub fn is_registered(&self, id: InteractableId) -> bool {
        self.registered[id.index()]
    }

    /// Flip and return the new value; `None` for ids the scene never registered.
    pub fn toggle(&mut self, id: InteractableId) -> Option<bool> {
        if !self.is_registered(id) {
            return None;
        }
        let slot = &mut self.open[id.index()];
        *slot = !*slot;
        Some(*slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = (InteractableId, bool)> + '_ {
        InteractableId::ALL
            .into_iter()
            .filter(|id| self.is_registered(*id))
            .map(|id| (id, self.is_open(id)))
    }
}

/// External side effects bound to the auxiliary actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Email,
    Profile,
}

impl Shortcut {
    fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Shortcut::Email => "email",
            Shortcut::Profile => "profile",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionEvent {
    Toggled { id: InteractableId, open: bool },
    Shortcut(Shortcut),
    /// A swap was requested; it applies immediately or after the exit delay.
    TransitionStarted { from: SceneMode, to: SceneMode },
    SceneChanged { from: SceneMode, to: SceneMode },
}

/// Everything the dispatch step reads from earlier steps of the frame.
#[derive(Debug, Clone, Copy)]
pub struct DispatchInput {
    pub edges: ControlEdges,
    pub nearest: Option<InteractableId>,
    pub position: DVec3,
    pub now_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SceneSwap(SceneMode);

pub struct InteractionStateStore {
    mode: SceneMode,
    state: InteractionState,
    kinds: [Option<InteractableKind>; InteractableId::COUNT],
    entry_region: Option<Region>,
    last_toggle: [Option<f64>; InteractableId::COUNT],
    last_shortcut: [Option<f64>; 2],
    swaps: Scheduler<SceneSwap>,
    transition_pending: bool,
    interact_cooldown_ms: f64,
    shortcut_cooldown_ms: f64,
    exit_delay_ms: f64,
    shortcut_target: InteractableId,
}

impl InteractionStateStore {
    pub fn new(config: &NavigationConfig, mode: SceneMode, scene: &SceneConfig) -> Self {
        let mut store = Self {
            mode,
            state: InteractionState::default(),
            kinds: [None; InteractableId::COUNT],
            entry_region: None,
            last_toggle: [None; InteractableId::COUNT],
            last_shortcut: [None; 2],
            swaps: Scheduler::default(),
            transition_pending: false,
            interact_cooldown_ms: config.interact_cooldown_ms,
            shortcut_cooldown_ms: config.shortcut_cooldown_ms,
            exit_delay_ms: config.exit_delay_ms,
            shortcut_target: config.shortcut_target,
        };
        store.load_scene(mode, scene);
        store
    }

    pub fn mode(&self) -> SceneMode {
        self.mode
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn transition_pending(&self) -> bool {
        self.transition_pending
    }

    fn load_scene(&mut self, mode: SceneMode, scene: &SceneConfig) {
        self.mode = mode;
        self.state = InteractionState::for_scene(scene);
        self.kinds = [None; InteractableId::COUNT];
        for d in &scene.interactables {
            self.kinds[d.id.index()] = Some(d.kind);
        }
        self.entry_region = scene.entry_region;
        self.last_toggle = [None; InteractableId::COUNT];
        self.last_shortcut = [None; 2];
        self.swaps.clear();
        self.transition_pending = false;
    }

    /// Run the dispatch step for one frame.
    ///
    /// A due scene swap, or starting one, ends dispatch for the frame.
    pub fn dispatch(&mut self, scenes: &SceneSet, input: DispatchInput) -> Vec<InteractionEvent> {
        let mut events = Vec::new();

        if let Some(SceneSwap(to)) = self.swaps.take_due(input.now_ms).into_iter().next() {
            events.push(self.apply_swap(scenes, to));
            return events;
        }
        if self.transition_pending {
            if input.edges.interact {
                trace!("interact ignored, scene transition already pending");
            }
            return events;
        }

        if input.edges.interact {
            if let Some(event) = self.interact(scenes, &input) {
                let ends_frame = !matches!(event, InteractionEvent::Toggled { .. });
                events.push(event);
                if ends_frame {
                    return events;
                }
            }
        }

        if input.nearest == Some(self.shortcut_target) {
            let pressed = [(input.edges.aux_a, Shortcut::Email), (input.edges.aux_b, Shortcut::Profile)];
            for (edge, shortcut) in pressed {
                if edge && self.shortcut_ready(shortcut, input.now_ms) {
                    debug!(shortcut = shortcut.name(), "shortcut triggered");
                    events.push(InteractionEvent::Shortcut(shortcut));
                }
            }
        }

        events
    }

    fn interact(&mut self, scenes: &SceneSet, input: &DispatchInput) -> Option<InteractionEvent> {
        if self.entry_region.is_some_and(|r| r.contains(input.position)) {
            return Some(self.begin_transition(scenes, input.now_ms, 0.0));
        }

        let id = input.nearest?;
        let Some(kind) = self.kinds[id.index()] else {
            trace!(?id, "interact on unregistered interactable");
            return None;
        };

        if let Some(last) = self.last_toggle[id.index()] {
            if input.now_ms - last < self.interact_cooldown_ms {
                trace!(?id, "interact debounced");
                return None;
            }
        }
        self.last_toggle[id.index()] = Some(input.now_ms);

        match kind {
            InteractableKind::ExitDoor => Some(self.begin_transition(scenes, input.now_ms, self.exit_delay_ms)),
            InteractableKind::Toggle => {
                let open = self.state.toggle(id)?;
                debug!(?id, open, "interaction toggled");
                Some(InteractionEvent::Toggled { id, open })
            }
        }
    }

    fn begin_transition(&mut self, scenes: &SceneSet, now_ms: f64, delay_ms: f64) -> InteractionEvent {
        let from = self.mode;
        let to = from.other();
        if delay_ms > 0.0 {
            debug!(from = from.name(), to = to.name(), delay_ms, "scene transition scheduled");
            self.transition_pending = true;
            self.swaps.schedule(now_ms, delay_ms, SceneSwap(to));
            InteractionEvent::TransitionStarted { from, to }
        } else {
            self.apply_swap(scenes, to)
        }
    }

    fn apply_swap(&mut self, scenes: &SceneSet, to: SceneMode) -> InteractionEvent {
        let from = self.mode;
        info!(from = from.name(), to = to.name(), "scene changed");
        self.load_scene(to, scenes.get(to));
        InteractionEvent::SceneChanged { from, to }
    }

    fn shortcut_ready(&mut self, shortcut: Shortcut, now_ms: f64) -> bool {
        let cooldown = self.shortcut_cooldown_ms;
        let slot = &mut self.last_shortcut[shortcut.index()];
        if slot.is_some_and(|last| now_ms - last < cooldown) {
            return false;
        }
        *slot = Some(now_ms);
        true
    }
}
