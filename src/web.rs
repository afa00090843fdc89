//! Browser host
//!
//! Backs the frame source with `requestAnimationFrame` and exposes the
//! engine's lifecycle to JavaScript. Rendering and DOM input stay on the
//! JS side; it feeds pointer/key state in and draws from snapshots.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::clock::{FrameId, FrameSource};
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::BankError;
use crate::sim::GameMode;

type SharedEngine = Rc<RefCell<Engine<RafFrames>>>;

/// One outstanding `requestAnimationFrame` call
struct Request {
    id: FrameId,
    handle: i32,
    /// Kept alive until the browser is done with it
    _callback: Closure<dyn FnMut(f64)>,
}

/// Frame source backed by `requestAnimationFrame`.
///
/// Every request gets its own one-shot callback that carries its own id, so
/// the clock can tell a live frame from a ghost.
pub struct RafFrames {
    window: web_sys::Window,
    engine: Weak<RefCell<Engine<RafFrames>>>,
    next_id: u64,
    requests: Vec<Request>,
}

impl RafFrames {
    fn new() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        Ok(Self {
            window,
            engine: Weak::new(),
            next_id: 0,
            requests: Vec::new(),
        })
    }

    fn attach(&mut self, engine: &SharedEngine) {
        self.engine = Rc::downgrade(engine);
    }

    /// Release callbacks of requests older than `id`; they have already fired
    fn retire_before(&mut self, id: FrameId) {
        self.requests.retain(|r| r.id.0 >= id.0);
    }
}

impl FrameSource for RafFrames {
    fn request_frame(&mut self) -> Option<FrameId> {
        self.next_id += 1;
        let id = FrameId(self.next_id);
        let engine = self.engine.clone();
        let callback: Closure<dyn FnMut(f64)> =
            Closure::once(move |now: f64| deliver_frame(&engine, id, now));
        match self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())
        {
            Ok(handle) => {
                self.requests.push(Request {
                    id,
                    handle,
                    _callback: callback,
                });
                Some(id)
            }
            Err(e) => {
                log::warn!("requestAnimationFrame failed: {:?}", e);
                None
            }
        }
    }

    fn cancel_frame(&mut self, id: FrameId) {
        let Some(pos) = self.requests.iter().position(|r| r.id == id) else {
            return;
        };
        let request = self.requests.remove(pos);
        if let Err(e) = self.window.cancel_animation_frame(request.handle) {
            log::warn!("cancelAnimationFrame failed: {:?}", e);
        }
    }
}

/// Hand a fired frame to the engine
fn deliver_frame(engine: &Weak<RefCell<Engine<RafFrames>>>, id: FrameId, now: f64) {
    let Some(shared) = engine.upgrade() else {
        return;
    };
    let Ok(mut game) = shared.try_borrow_mut() else {
        // Try again next frame with the same id so the clock never stalls
        log::warn!("Frame {:?} arrived while the engine was busy; retrying", id);
        let engine = engine.clone();
        let retry = Closure::once_into_js(move |now: f64| deliver_frame(&engine, id, now));
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.request_animation_frame(retry.unchecked_ref()) {
                log::warn!("requestAnimationFrame failed: {:?}", e);
            }
        }
        return;
    };
    game.frames_mut().retire_before(id);
    game.on_frame(id, now);
}

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Quiz Flyer starting...");
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Game handle owned by the page. Freeing it cancels any pending frame.
#[wasm_bindgen]
pub struct WebGame {
    engine: SharedEngine,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WebGame, JsValue> {
        let config = EngineConfig::load_stored();
        let seed = (js_sys::Math::random() * 9_007_199_254_740_992.0) as u64;

        let engine = Engine::new(config, RafFrames::new()?, seed).map_err(js_err)?;
        let engine: SharedEngine = Rc::new(RefCell::new(engine));
        engine.borrow_mut().frames_mut().attach(&engine);

        log::info!("Movement model: {}", engine.borrow().config().movement.as_str());
        Ok(WebGame { engine })
    }

    pub fn start_arithmetic(&self) -> Result<(), JsValue> {
        self.engine
            .borrow_mut()
            .start(GameMode::Arithmetic)
            .map_err(js_err)
    }

    /// Start a run from the deck loaded earlier
    pub fn start_deck(&self) -> Result<(), JsValue> {
        self.engine.borrow_mut().start(GameMode::Deck).map_err(js_err)
    }

    /// Call before fetching a deck
    pub fn begin_loading(&self) -> Result<(), JsValue> {
        self.engine.borrow_mut().begin_loading().map_err(js_err)
    }

    /// Deck text arrived: parse it and start playing
    pub fn load_deck_json(&self, json: &str) -> Result<(), JsValue> {
        self.engine.borrow_mut().load_deck_json(json).map_err(js_err)
    }

    /// Deck fetch failed: return to the menu
    pub fn load_failed(&self, reason: &str) -> Result<(), JsValue> {
        let result = self
            .engine
            .borrow_mut()
            .finish_loading(Err(BankError::Unavailable(reason.to_string())));
        match result {
            Err(crate::EngineError::Bank(_)) => Ok(()),
            other => other.map_err(js_err),
        }
    }

    pub fn pause(&self) -> Result<(), JsValue> {
        self.engine.borrow_mut().pause().map_err(js_err)
    }

    pub fn resume(&self) -> Result<(), JsValue> {
        self.engine.borrow_mut().resume().map_err(js_err)
    }

    pub fn restart(&self) -> Result<(), JsValue> {
        self.engine.borrow_mut().restart().map_err(js_err)
    }

    pub fn exit(&self) -> Result<(), JsValue> {
        self.engine.borrow_mut().exit().map_err(js_err)
    }

    /// Pointer position in canvas coordinates
    pub fn set_pointer(&self, x: f32, y: f32) {
        let mut engine = self.engine.borrow_mut();
        let mut input = engine.input();
        input.target = Some(Vec2::new(x, y));
        engine.set_input(input);
    }

    pub fn clear_pointer(&self) {
        let mut engine = self.engine.borrow_mut();
        let mut input = engine.input();
        input.target = None;
        engine.set_input(input);
    }

    pub fn set_keys(&self, up: bool, down: bool) {
        let mut engine = self.engine.borrow_mut();
        let mut input = engine.input();
        input.up = up;
        input.down = down;
        engine.set_input(input);
    }

    pub fn state(&self) -> String {
        self.engine.borrow().state().as_str().to_string()
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        self.engine.borrow().snapshot().to_json().map_err(js_err)
    }

    /// Events since the last call, for audio and particle hooks
    pub fn drain_events_json(&self) -> Result<String, JsValue> {
        let events = self.engine.borrow_mut().drain_events();
        serde_json::to_string(&events).map_err(js_err)
    }

    /// Switch movement model and remember it for next time
    pub fn set_movement(&self, name: &str) -> Result<(), JsValue> {
        let movement = crate::config::MovementModel::from_str(name)
            .ok_or_else(|| JsValue::from_str(&format!("unknown movement model: {name}")))?;
        let mut engine = self.engine.borrow_mut();
        engine.set_movement(movement);
        engine.config().save_stored();
        Ok(())
    }
}
