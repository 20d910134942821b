//! Stage runtime: session state, event wiring and the frame loop.
//!
//! Everything mutable lives in one [`StageState`] held in a thread-local
//! `RefCell`. A single `requestAnimationFrame` loop ticks the whole toy:
//! pending text fades, the idle deadline, ambient mutation/burst schedules
//! and every live sprite. There are no `setTimeout`/`setInterval` callbacks;
//! timed behavior is deadline timestamps checked by the tick, all on the
//! monotonic `performance.now()` clock.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlAudioElement, HtmlElement, HtmlImageElement, window};

pub mod audio;
pub mod burst;
pub mod idle;
pub mod mood;
pub mod rng;
pub mod taps;

use audio::SfxPool;
use burst::{BurstPlan, SpriteMotion};
use idle::{IdleEvent, IdleTimer};
use mood::{FadePlan, MoodState, CALM_RESET_SLACK_MS, PULSE_MS};
use rng::Lcg;
use taps::TapTracker;

use crate::{
    BASELINE_MESSAGE, CALM_MESSAGE, IDLE_MESSAGE, MESSAGES, RARE_MESSAGE, SPRITE_SOURCES,
};

// --- Schedule constants ------------------------------------------------------

/// Ambient text mutation cadence and probability.
pub const MUTATE_INTERVAL_MS: f64 = 3800.0;
pub const MUTATE_PROB: f64 = 0.35;

/// Ambient burst cadence and probability.
pub const AMBIENT_BURST_INTERVAL_MS: f64 = 9000.0;
pub const AMBIENT_BURST_PROB: f64 = 0.15;
/// Ambient bursts land inside the central band of the viewport.
const AMBIENT_BAND_MIN: f64 = 0.15;
const AMBIENT_BAND_MAX: f64 = 0.85;

// --- Session state -----------------------------------------------------------

/// A sprite currently on stage, advanced once per frame.
struct ActiveSprite {
    el: HtmlElement,
    start_ms: f64,
    gravity: f64,
    motion: SpriteMotion,
}

/// All mutable toy state. Touched only from the main thread (browser event
/// loop), so a `RefCell` is enough.
struct StageState {
    egg: HtmlElement,
    stage_el: Element,
    hint: Option<Element>,
    bgm: Option<HtmlAudioElement>,
    ding: Option<HtmlAudioElement>,
    pop: Option<HtmlAudioElement>,
    sfx: SfxPool,
    audio_unlocked: bool,
    rng: Lcg,
    taps: TapTracker,
    mood: MoodState,
    pending_text: Option<FadePlan>,
    pulse_clear_at: Option<f64>,
    calm_reset_at: Option<f64>,
    idle: IdleTimer,
    next_mutate_at: f64,
    next_ambient_burst_at: f64,
    sprites: Vec<ActiveSprite>,
    // Keeps preloaded images alive so the cache stays warm.
    _preloaded: Vec<HtmlImageElement>,
}

thread_local! {
    static STAGE_STATE: std::cell::RefCell<Option<StageState>> = std::cell::RefCell::new(None);
}

// --- Startup -----------------------------------------------------------------

pub fn start_stage(sfx_manifest: Option<String>) -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let egg: HtmlElement = doc
        .get_element_by_id("egg")
        .ok_or_else(|| JsValue::from_str("missing #egg element"))?
        .dyn_into()?;
    let stage_el = doc
        .get_element_by_id("stage")
        .ok_or_else(|| JsValue::from_str("missing #stage element"))?;

    // Optional page furniture: degrade silently when absent.
    let hint = doc.get_element_by_id("hint");
    let bgm = audio_element(&doc, "bgm");
    let ding = audio_element(&doc, "ding");
    let pop = audio_element(&doc, "pop");

    let sources = audio::resolve_sfx_sources(sfx_manifest.as_deref());
    let sfx = SfxPool::new(sources)?;
    sfx.warm();

    let now = win.performance().map(|p| p.now()).unwrap_or(0.0);
    let state = StageState {
        egg,
        stage_el,
        hint,
        bgm,
        ding,
        pop,
        sfx,
        audio_unlocked: false,
        rng: seed_rng(now),
        taps: TapTracker::new(),
        mood: MoodState::new(),
        pending_text: None,
        pulse_clear_at: None,
        calm_reset_at: None,
        idle: IdleTimer::armed(now),
        next_mutate_at: now + MUTATE_INTERVAL_MS,
        next_ambient_burst_at: now + AMBIENT_BURST_INTERVAL_MS,
        sprites: Vec::new(),
        _preloaded: preload_sprites(),
    };
    STAGE_STATE.with(|cell| cell.replace(Some(state)));

    // Click: unlock, spam detection / text, idle re-arm, burst at the cursor.
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
            let now = crate::performance_now();
            STAGE_STATE.with(|cell| {
                if let Some(state) = cell.borrow_mut().as_mut() {
                    handle_click(state, now, evt.client_x() as f64, evt.client_y() as f64);
                }
            });
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Key press: unlock gesture + idle re-arm.
    {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
            let now = crate::performance_now();
            STAGE_STATE.with(|cell| {
                if let Some(state) = cell.borrow_mut().as_mut() {
                    unlock_audio(state);
                    state.idle.interact(now);
                }
            });
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Remaining qualifying interactions only re-arm the idle deadline.
    for event in ["mousemove", "scroll", "touchstart"] {
        register_idle_reset(&doc, event)?;
    }

    // Right click is disabled on the toy page.
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::Event| {
            evt.prevent_default();
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("contextmenu", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    start_frame_loop();
    Ok(())
}

fn audio_element(doc: &Document, id: &str) -> Option<HtmlAudioElement> {
    doc.get_element_by_id(id).and_then(|el| el.dyn_into().ok())
}

fn preload_sprites() -> Vec<HtmlImageElement> {
    let mut imgs = Vec::with_capacity(SPRITE_SOURCES.len());
    for url in SPRITE_SOURCES {
        if let Ok(img) = HtmlImageElement::new() {
            img.set_attribute("decoding", "async").ok();
            img.set_attribute("loading", "eager").ok();
            img.set_src(url);
            imgs.push(img);
        }
    }
    imgs
}

fn register_idle_reset(doc: &Document, event: &str) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
        let now = crate::performance_now();
        STAGE_STATE.with(|cell| {
            if let Some(state) = cell.borrow_mut().as_mut() {
                state.idle.interact(now);
            }
        });
    }) as Box<dyn FnMut(_)>);
    doc.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

#[cfg(feature = "rng")]
fn seed_rng(now: f64) -> Lcg {
    let mut buf = [0u8; 4];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => Lcg::new(u32::from_le_bytes(buf)),
        Err(_) => Lcg::from_clock(now),
    }
}

#[cfg(not(feature = "rng"))]
fn seed_rng(now: f64) -> Lcg {
    Lcg::from_clock(now)
}

// --- Input handling ----------------------------------------------------------

fn handle_click(state: &mut StageState, now: f64, x: f64, y: f64) {
    unlock_audio(state);

    let calmed = state.taps.register(now);
    if calmed {
        state.mood.begin_override(now);
        set_text(state, CALM_MESSAGE, now);
        play_random_sfx(state, 0.35);
        // Once the override lapses, settle back to baseline (unless a newer
        // override extended the window meanwhile).
        state.calm_reset_at = Some(state.mood.override_until() + CALM_RESET_SLACK_MS);
    } else {
        if state.rng.chance(0.7) {
            set_text(state, BASELINE_MESSAGE, now);
        }
        if state.rng.chance(0.02) {
            set_text(state, RARE_MESSAGE, now);
        }
        if state.audio_unlocked && state.rng.chance(0.12) {
            play_random_sfx(state, 0.2);
        }
    }

    state.idle.interact(now);
    spawn_burst(state, x, y, now).ok();
}

fn unlock_audio(state: &mut StageState) {
    if state.audio_unlocked {
        return;
    }
    state.audio_unlocked = true;

    if let Some(hint) = &state.hint {
        hint.class_list().add_1("hidden").ok();
    }
    if let Some(bgm) = &state.bgm {
        bgm.set_volume(0.14);
        audio::play_silent(bgm);
    }
    if let Some(ding) = &state.ding {
        audio::replay(ding, 0.25);
    }
}

fn play_random_sfx(state: &mut StageState, volume: f64) {
    if !state.audio_unlocked {
        return;
    }
    state.sfx.play_random(&mut state.rng, volume);
}

// --- Text behavior -----------------------------------------------------------

/// Start a fade toward `requested`. The override is checked now and again at
/// apply time (it may begin mid-fade).
fn set_text(state: &mut StageState, requested: &'static str, now: f64) {
    let requested = state.mood.resolve(requested, now);
    state.egg.class_list().add_1("fade").ok();
    state.pending_text = Some(FadePlan::new(now, requested));
}

fn apply_pending_text(state: &mut StageState, now: f64) {
    let Some(text) = state
        .pending_text
        .as_ref()
        .and_then(|plan| plan.due(&state.mood, now))
    else {
        return;
    };
    state.pending_text = None;

    state.egg.set_text_content(Some(text));
    state.egg.class_list().remove_1("fade").ok();

    if text == CALM_MESSAGE {
        state
            .egg
            .style()
            .set_property("transform", "translate(-50%, -50%) scale(1.06)")
            .ok();
        state.pulse_clear_at = Some(now + PULSE_MS);
    }
}

// --- Bursts ------------------------------------------------------------------

fn spawn_burst(state: &mut StageState, x: f64, y: f64, now: f64) -> Result<(), JsValue> {
    if state.audio_unlocked {
        if state.pop.is_some() && state.rng.chance(0.9) {
            if let Some(pop) = &state.pop {
                audio::replay(pop, 0.15);
            }
        }
        if state.rng.chance(0.25) {
            play_random_sfx(state, 0.18);
        }
    }

    let doc = window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let plan = BurstPlan::generate(&mut state.rng, SPRITE_SOURCES.len());
    for motion in plan.sprites {
        let el: HtmlElement = doc.create_element("img")?.dyn_into()?;
        el.set_class_name("sprite");
        el.set_attribute("src", SPRITE_SOURCES[motion.image])?;
        let style = el.style();
        style.set_property("left", &format!("{x}px")).ok();
        style.set_property("top", &format!("{y}px")).ok();
        style
            .set_property("width", &format!("{}px", motion.size_px))
            .ok();
        style
            .set_property("height", &format!("{}px", motion.size_px))
            .ok();
        state.stage_el.append_child(&el)?;
        state.sprites.push(ActiveSprite {
            el,
            start_ms: now,
            gravity: plan.gravity,
            motion,
        });
    }
    Ok(())
}

fn update_sprites(state: &mut StageState, now: f64) {
    state.sprites.retain(|s| {
        let frame = s.motion.frame(s.gravity, now - s.start_ms);
        if frame.done {
            s.el.remove();
            return false;
        }
        let style = s.el.style();
        style
            .set_property("opacity", &format!("{}", frame.opacity))
            .ok();
        style
            .set_property(
                "transform",
                &format!(
                    "translate(calc(-50% + {dx}px), calc(-50% + {dy}px)) rotate({rot}deg) scale({sc})",
                    dx = frame.dx,
                    dy = frame.dy,
                    rot = frame.rot_deg,
                    sc = frame.scale
                ),
            )
            .ok();
        true
    });
}

// --- Frame loop --------------------------------------------------------------

type FrameCallback = std::rc::Rc<std::cell::RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn start_frame_loop() {
    let f: FrameCallback = std::rc::Rc::new(std::cell::RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        STAGE_STATE.with(|cell| {
            if let Some(state) = cell.borrow_mut().as_mut() {
                stage_tick(state, ts);
            }
        });
        if let Some(w) = window() {
            let _ =
                w.request_animation_frame(f.borrow().as_ref().unwrap().as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut(f64)>));
    if let Some(w) = window() {
        let _ = w.request_animation_frame(g.borrow().as_ref().unwrap().as_ref().unchecked_ref());
    }
}

fn stage_tick(state: &mut StageState, now: f64) {
    apply_pending_text(state, now);

    if let Some(at) = state.pulse_clear_at {
        if now >= at {
            state.pulse_clear_at = None;
            state.egg.style().remove_property("transform").ok();
        }
    }

    if let Some(at) = state.calm_reset_at {
        if now >= at {
            state.calm_reset_at = None;
            if !state.mood.override_active(now) {
                set_text(state, BASELINE_MESSAGE, now);
            }
        }
    }

    match state.idle.tick(now) {
        Some(IdleEvent::Escalate) => set_text(state, IDLE_MESSAGE, now),
        Some(IdleEvent::Revert) => set_text(state, BASELINE_MESSAGE, now),
        None => {}
    }

    if now >= state.next_mutate_at {
        state.next_mutate_at = now + MUTATE_INTERVAL_MS;
        ambient_mutate(state, now);
    }

    if now >= state.next_ambient_burst_at {
        state.next_ambient_burst_at = now + AMBIENT_BURST_INTERVAL_MS;
        ambient_burst(state, now);
    }

    update_sprites(state, now);
}

fn ambient_mutate(state: &mut StageState, now: f64) {
    if !state.rng.chance(MUTATE_PROB) {
        return;
    }
    let msg = MESSAGES[state.rng.index(MESSAGES.len())];
    set_text(state, msg, now);

    if state.audio_unlocked && state.rng.chance(0.18) {
        if let Some(ding) = &state.ding {
            audio::replay(ding, 0.22);
        }
    }
    if state.audio_unlocked && state.rng.chance(0.22) {
        play_random_sfx(state, 0.18);
    }
}

fn ambient_burst(state: &mut StageState, now: f64) {
    if !state.rng.chance(AMBIENT_BURST_PROB) {
        return;
    }
    let Some(win) = window() else {
        return;
    };
    let w = win.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let h = win.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    if w <= 0.0 || h <= 0.0 {
        return;
    }
    let x = state.rng.range(w * AMBIENT_BAND_MIN, w * AMBIENT_BAND_MAX);
    let y = state.rng.range(h * AMBIENT_BAND_MIN, h * AMBIENT_BAND_MAX);
    spawn_burst(state, x, y, now).ok();
}
