//! Browser entry points. The host page owns rendering and the RAF loop and
//! calls [`Navigator::frame`] once per animation frame.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Function;
use tracing::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
use web_sys::{Document, Event, HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent, Window};

use crate::config::NavigationConfig;
use crate::controller::input::wasm as convert;
use crate::controller::{EventQueue, FrameLoopContext, InputEvent, KeyBindings, LookSource, NavigationHost, Shortcut, VirtualButton};
use crate::logging;
use crate::model::{presets, InteractableId, SceneMode, SceneSet};

#[wasm_bindgen(start)]
pub fn start() {
    logging::init();
}

#[derive(Default)]
struct JsHost {
    on_scene_changed: Option<Function>,
    on_transition_started: Option<Function>,
    on_toggled: Option<Function>,
    on_shortcut: Option<Function>,
}

fn call(f: &Option<Function>, a: JsValue, b: JsValue) {
    if let Some(f) = f {
        if let Err(err) = f.call2(&JsValue::NULL, &a, &b) {
            warn!(?err, "host callback threw");
        }
    }
}

impl NavigationHost for JsHost {
    fn on_scene_changed(&mut self, from: SceneMode, to: SceneMode) {
        call(&self.on_scene_changed, from.name().into(), to.name().into());
    }

    fn on_transition_started(&mut self, from: SceneMode, to: SceneMode) {
        // Let the lock teardown finish before the deferred swap lands.
        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            document.exit_pointer_lock();
        }
        call(&self.on_transition_started, from.name().into(), to.name().into());
    }

    fn on_toggled(&mut self, id: InteractableId, open: bool) {
        call(&self.on_toggled, id.name().into(), open.into());
    }

    fn on_shortcut(&mut self, shortcut: Shortcut) {
        call(&self.on_shortcut, shortcut.name().into(), JsValue::UNDEFINED);
    }
}

#[wasm_bindgen]
pub struct Navigator {
    ctx: FrameLoopContext<JsHost>,
    inbox: Rc<RefCell<EventQueue>>,
}

#[wasm_bindgen]
impl Navigator {
    /// `scenes_json` and `config_json` fall back to the built-in room and default tuning.
    #[wasm_bindgen(constructor)]
    pub fn new(
        scenes_json: Option<String>,
        config_json: Option<String>,
        touch: bool,
        start_inside: bool,
    ) -> Result<Navigator, JsValue> {
        let scenes = match scenes_json {
            Some(json) => SceneSet::from_json(&json).map_err(js_error)?,
            None => presets::scene_set(),
        };
        let config = match config_json {
            Some(json) => NavigationConfig::from_json(&json).map_err(js_error)?,
            None => NavigationConfig::default(),
        };
        let source = if touch { LookSource::Touch } else { LookSource::PointerLock };
        let mode = if start_inside { SceneMode::Inside } else { SceneMode::Outside };

        let ctx = FrameLoopContext::new(config, scenes, mode, source, JsHost::default()).map_err(js_error)?;
        Ok(Self { ctx, inbox: Rc::new(RefCell::new(EventQueue::default())) })
    }

    pub fn set_on_scene_changed(&mut self, f: Function) {
        self.ctx.host_mut().on_scene_changed = Some(f);
    }

    pub fn set_on_transition_started(&mut self, f: Function) {
        self.ctx.host_mut().on_transition_started = Some(f);
    }

    pub fn set_on_toggled(&mut self, f: Function) {
        self.ctx.host_mut().on_toggled = Some(f);
    }

    pub fn set_on_shortcut(&mut self, f: Function) {
        self.ctx.host_mut().on_shortcut = Some(f);
    }

    /// Install DOM listeners that feed the event queue.
    pub fn attach(&self, canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| js_error("no global `window`"))?;
        let document = window.document().ok_or_else(|| js_error("no document on window"))?;
        setup_input_listeners(&window, &document, canvas, self.inbox.clone(), self.ctx.aggregator().bindings().clone())
    }

    pub fn key_down(&mut self, code: String) {
        self.ctx.push(InputEvent::KeyDown(code));
    }

    pub fn key_up(&mut self, code: String) {
        self.ctx.push(InputEvent::KeyUp(code));
    }

    pub fn joystick(&mut self, x: f64, y: f64) {
        self.ctx.push(InputEvent::Joystick { x, y });
    }

    pub fn joystick_released(&mut self) {
        self.ctx.push(InputEvent::JoystickReleased);
    }

    /// `name` is one of `jump`, `interact`, `aux_a`, `aux_b`.
    pub fn button(&mut self, name: &str, pressed: bool) {
        match VirtualButton::from_name(name) {
            Some(button) => self.ctx.push(InputEvent::Button { button, pressed }),
            None => warn!(name, "unknown virtual button"),
        }
    }

    /// Run one simulation frame at `now_ms` (e.g. `performance.now()`).
    pub fn frame(&mut self, now_ms: f64) {
        let queued: Vec<InputEvent> = self.inbox.borrow_mut().drain().collect();
        for event in queued {
            self.ctx.push(event);
        }
        self.ctx.update(now_ms);
    }

    pub fn position(&self) -> Vec<f64> {
        self.ctx.pose().position.to_array().to_vec()
    }

    pub fn yaw(&self) -> f64 {
        self.ctx.pose().yaw()
    }

    pub fn pitch(&self) -> f64 {
        self.ctx.pose().pitch()
    }

    /// Column-major view matrix.
    pub fn view_matrix(&self) -> Vec<f32> {
        self.ctx.pose().view().as_mat4().to_cols_array().to_vec()
    }

    /// `PoseUniform` bytes, ready for a uniform buffer write.
    pub fn pose_uniform(&self) -> Vec<u8> {
        bytemuck::bytes_of(&self.ctx.pose().uniform()).to_vec()
    }

    pub fn scene_mode(&self) -> String {
        self.ctx.scene_mode().name().to_string()
    }

    pub fn nearest(&self) -> Option<String> {
        self.ctx.nearest().map(|id| id.name().to_string())
    }

    pub fn nearest_label(&self) -> Option<String> {
        self.ctx.nearest_descriptor().map(|d| d.label.clone())
    }

    pub fn is_open(&self, id: &str) -> bool {
        InteractableId::from_name(id).is_some_and(|id| self.ctx.interactions().is_open(id))
    }

    pub fn transition_pending(&self) -> bool {
        self.ctx.transition_pending()
    }

    pub fn look_active(&self) -> bool {
        self.ctx.orientation().is_active()
    }
}

fn setup_input_listeners(
    window: &Window,
    document: &Document,
    canvas: &HtmlCanvasElement,
    inbox: Rc<RefCell<EventQueue>>,
    bindings: KeyBindings,
) -> Result<(), JsValue> {
    // Keyboard down
    {
        let inbox = inbox.clone();
        let keydown = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            if bindings.is_navigation_key(&e.code()) {
                e.prevent_default();
            }
            if !e.repeat() {
                inbox.borrow_mut().push(convert::keyboard_event_to_input(&e, true));
            }
        }) as Box<dyn FnMut(KeyboardEvent)>);
        document.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
        keydown.forget();
    }

    // Keyboard up
    {
        let inbox = inbox.clone();
        let keyup = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            inbox.borrow_mut().push(convert::keyboard_event_to_input(&e, false));
        }) as Box<dyn FnMut(KeyboardEvent)>);
        document.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
        keyup.forget();
    }

    // Focus loss
    {
        let inbox = inbox.clone();
        let blur = Closure::wrap(Box::new(move |_e: Event| {
            inbox.borrow_mut().push(InputEvent::FocusLost);
        }) as Box<dyn FnMut(Event)>);
        window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
        blur.forget();
    }

    // Visibility change
    {
        let inbox = inbox.clone();
        let doc = document.clone();
        let visibility = Closure::wrap(Box::new(move |_e: Event| {
            inbox.borrow_mut().push(InputEvent::VisibilityChanged { visible: !doc.hidden() });
        }) as Box<dyn FnMut(Event)>);
        document.add_event_listener_with_callback("visibilitychange", visibility.as_ref().unchecked_ref())?;
        visibility.forget();
    }

    // Pointer lock change / error
    {
        let inbox = inbox.clone();
        let doc = document.clone();
        let canvas_el: web_sys::Element = canvas.clone().into();
        let plc = Closure::wrap(Box::new(move |_e: Event| {
            let locked = doc.pointer_lock_element().is_some_and(|el| el == canvas_el);
            inbox.borrow_mut().push(InputEvent::PointerLockChanged { locked });
        }) as Box<dyn FnMut(Event)>);
        document.add_event_listener_with_callback("pointerlockchange", plc.as_ref().unchecked_ref())?;
        plc.forget();
    }
    {
        let inbox = inbox.clone();
        let ple = Closure::wrap(Box::new(move |_e: Event| {
            inbox.borrow_mut().push(InputEvent::PointerLockError);
        }) as Box<dyn FnMut(Event)>);
        document.add_event_listener_with_callback("pointerlockerror", ple.as_ref().unchecked_ref())?;
        ple.forget();
    }

    // Canvas click asks for pointer lock
    {
        let inbox = inbox.clone();
        let canvas_click = canvas.clone();
        let click = Closure::wrap(Box::new(move |_e: MouseEvent| {
            inbox.borrow_mut().push(InputEvent::CaptureRequested);
            canvas_click.request_pointer_lock();
        }) as Box<dyn FnMut(MouseEvent)>);
        canvas.add_event_listener_with_callback("click", click.as_ref().unchecked_ref())?;
        click.forget();
    }

    // Mouse move
    {
        let inbox = inbox.clone();
        let mm = Closure::wrap(Box::new(move |e: MouseEvent| {
            inbox.borrow_mut().push(convert::mouse_move_to_input(&e));
        }) as Box<dyn FnMut(MouseEvent)>);
        document.add_event_listener_with_callback("mousemove", mm.as_ref().unchecked_ref())?;
        mm.forget();
    }

    // Touch drag
    for (name, is_start) in [("touchstart", true), ("touchmove", false)] {
        let inbox = inbox.clone();
        let touch = Closure::wrap(Box::new(move |e: TouchEvent| {
            if let Some(event) = convert::touch_to_input(&e, is_start) {
                inbox.borrow_mut().push(event);
            }
        }) as Box<dyn FnMut(TouchEvent)>);
        canvas.add_event_listener_with_callback(name, touch.as_ref().unchecked_ref())?;
        touch.forget();
    }
    for name in ["touchend", "touchcancel"] {
        let inbox = inbox.clone();
        let end = Closure::wrap(Box::new(move |_e: TouchEvent| {
            inbox.borrow_mut().push(InputEvent::TouchEnd);
        }) as Box<dyn FnMut(TouchEvent)>);
        canvas.add_event_listener_with_callback(name, end.as_ref().unchecked_ref())?;
        end.forget();
    }

    // Viewport size, for the on-screen control zones
    {
        let push_size = {
            let inbox = inbox.clone();
            let window = window.clone();
            move || {
                let size = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
                let width = size(window.inner_width());
                let height = size(window.inner_height());
                inbox.borrow_mut().push(InputEvent::ViewportResized { width, height });
            }
        };
        push_size();
        let resize = Closure::wrap(Box::new(move |_e: Event| push_size()) as Box<dyn FnMut(Event)>);
        window.add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())?;
        resize.forget();
    }

    Ok(())
}

fn js_error<E: ToString>(err: E) -> JsValue {
    JsValue::from_str(&err.to_string())
}
