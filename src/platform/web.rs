//! Browser driver: requestAnimationFrame loop, DOM input, visibility pause

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use glam::DVec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, MouseEvent, Window};

use super::{FrameSlot, GameKind, apply_key, client_to_world};
use crate::game_loop::{FrameOutcome, GameLoop, Simulation};
use crate::persistence::LocalStorageStore;
use crate::render::{RenderFrame, Renderer};
use crate::settings::Settings;
use crate::sim::Phase;
use crate::tuning::Tuning;

/// Hands every frame to a JS callback as JSON
struct JsRenderer {
    callback: js_sys::Function,
}

impl Renderer for JsRenderer {
    fn draw(&mut self, frame: &RenderFrame) {
        match frame.to_json() {
            Ok(json) => {
                if let Err(e) = self.callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                    log::warn!("Frame callback failed: {e:?}");
                }
            }
            Err(e) => log::warn!("Failed to serialize frame: {e}"),
        }
    }
}

struct Driver {
    game_loop: GameLoop<Box<dyn Simulation>, LocalStorageStore>,
    renderer: JsRenderer,
    canvas: HtmlCanvasElement,
    playfield: DVec2,
    frame_slot: FrameSlot,
}

/// Monotonic page time
fn now() -> Duration {
    let ms = web_sys::window()
        .and_then(|w| w.performance())
        .map_or(0.0, |p| p.now());
    Duration::from_secs_f64(ms.max(0.0) / 1000.0)
}

fn js_err(msg: &str) -> JsValue {
    JsValue::from_str(msg)
}

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    // A second init (hot reload) keeps the first logger
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Start `kind` ("asteroids" or "defense") on the canvas with id `canvas_id`.
///
/// `on_frame` receives one JSON-serialized render frame per display frame.
#[wasm_bindgen]
pub fn start_game(kind: &str, canvas_id: &str, on_frame: js_sys::Function) -> Result<(), JsValue> {
    let kind: GameKind = kind.parse().map_err(|e: String| js_err(&e))?;
    let window = web_sys::window().ok_or_else(|| js_err("no window"))?;
    let document = window.document().ok_or_else(|| js_err("no document"))?;
    let canvas: HtmlCanvasElement = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| js_err("no canvas"))?
        .dyn_into()
        .map_err(|_| js_err("not a canvas"))?;

    let tuning = Tuning::default();
    let settings = Settings::load();
    let seed = js_sys::Date::now() as u64;
    let store = LocalStorageStore::new(kind.high_score_key());
    let driver = Rc::new(RefCell::new(Driver {
        game_loop: GameLoop::new(kind.build(seed, &tuning, settings), store),
        renderer: JsRenderer { callback: on_frame },
        canvas: canvas.clone(),
        playfield: kind.playfield(&tuning),
        frame_slot: FrameSlot::default(),
    }));
    log::info!("Starting {kind} with seed {seed}");

    setup_keyboard(&window, driver.clone())?;
    setup_pointer(&canvas, driver.clone())?;
    setup_auto_pause(&document, driver.clone())?;

    request_animation_frame(driver);
    Ok(())
}

fn setup_keyboard(window: &Window, driver: Rc<RefCell<Driver>>) -> Result<(), JsValue> {
    for (event_name, pressed) in [("keydown", true), ("keyup", false)] {
        let driver = driver.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let mut d = driver.borrow_mut();
            if apply_key(d.game_loop.input_mut(), &event.key(), pressed) {
                event.prevent_default();
            }
        });
        window.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

/// Clicks aim while playing and confirm on every other screen
fn setup_pointer(canvas: &HtmlCanvasElement, driver: Rc<RefCell<Driver>>) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
        let mut d = driver.borrow_mut();
        let rect = d.canvas.get_bounding_client_rect();
        let world = client_to_world(
            DVec2::new(f64::from(event.client_x()), f64::from(event.client_y())),
            DVec2::new(rect.left(), rect.top()),
            DVec2::new(rect.width(), rect.height()),
            d.playfield,
        );
        let playing = d.game_loop.sim().phase() == Phase::Playing;
        let input = d.game_loop.input_mut();
        if playing {
            input.aim = Some(world);
        } else {
            input.confirm = true;
        }
    });
    canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Hidden tab: cancel the queued frame and stop. Visible again: resume from the
/// current time with a single fresh frame.
fn setup_auto_pause(document: &Document, driver: Rc<RefCell<Driver>>) -> Result<(), JsValue> {
    let doc = document.clone();
    let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
        if doc.visibility_state() == web_sys::VisibilityState::Hidden {
            let pending = {
                let mut d = driver.borrow_mut();
                d.game_loop.pause();
                d.frame_slot.cancel()
            };
            if let (Some(handle), Some(window)) = (pending, web_sys::window()) {
                if window.cancel_animation_frame(handle).is_err() {
                    log::warn!("cancelAnimationFrame rejected");
                }
            }
            return;
        }
        driver.borrow_mut().game_loop.resume(now());
        request_animation_frame(driver.clone());
    });
    document.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Queue the next frame unless one is already queued
fn request_animation_frame(driver: Rc<RefCell<Driver>>) {
    if !driver.borrow().frame_slot.is_free() {
        return;
    }
    let Some(window) = web_sys::window() else {
        return;
    };
    let callback_driver = driver.clone();
    let closure = Closure::once(move |_time: f64| {
        frame(callback_driver);
    });
    match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
        Ok(handle) => driver.borrow_mut().frame_slot.fill(handle),
        Err(_) => log::warn!("requestAnimationFrame rejected"),
    }
    closure.forget();
}

fn frame(driver: Rc<RefCell<Driver>>) {
    let outcome = {
        let mut guard = driver.borrow_mut();
        let d = &mut *guard;
        d.frame_slot.fired();
        d.game_loop.frame(now(), &mut d.renderer)
    };
    if outcome == FrameOutcome::Continue {
        request_animation_frame(driver);
    }
}
