//! Eggling core crate.
//!
//! A small WASM desk toy: one DOM element (the egg) mutters status lines,
//! plays sound effects through a rotating voice pool, and bursts into
//! short-lived egg sprites on clicks. All behavior is driven by a single
//! `requestAnimationFrame` loop owned by the [`stage`] module; the pure
//! pieces (tap-rate detection, mood override, burst kinematics, RNG) are
//! plain Rust and covered by native tests.

use wasm_bindgen::prelude::*;

pub mod stage;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

// -----------------------------------------------------------------------------
// Static asset registry. Read-only after initialization; the SFX list is the
// only one a host page may replace (via the manifest argument to `start_egg`).
// -----------------------------------------------------------------------------

/// Status lines the egg cycles through. `BASELINE_MESSAGE` must stay a member
/// so ambient mutation can land back on the reset text.
pub const MESSAGES: &[&str] = &[
    "you are an egg",
    "still an egg",
    "egg :3",
    "🥚",
    "loading shell…",
    "processing egg",
    "egg behavior detected",
    "you are an egg :3",
];

/// Reset text applied after idle reverts and post-calm-down resets.
pub const BASELINE_MESSAGE: &str = "you are an egg";

/// Low-probability click line.
pub const RARE_MESSAGE: &str = "would you like a brisket with eggs?";

/// Forced text while the override window is active.
pub const CALM_MESSAGE: &str = "CALM DOWN WITH THE EGGING";

/// Shown once the idle deadline fires.
pub const IDLE_MESSAGE: &str = "hmm";

/// Sprite pool for bursts; one is picked uniformly per spawned sprite.
pub const SPRITE_SOURCES: &[&str] = &[
    "assets/egg1.png",
    "assets/egg2.png",
    "assets/egg3.png",
    "assets/egg4.png",
];

/// Directory prepended to bare manifest entries.
pub const SFX_DIR: &str = "assets/sfx/";

/// Built-in sound effects used when no manifest is supplied.
pub const SFX_FALLBACK: &[&str] = &[
    "assets/sfx/sfx1.mp3",
    "assets/sfx/sfx2.mp3",
    "assets/sfx/sfx3.mp3",
];

// -----------------------------------------------------------------------------
// Unified entrypoint
// -----------------------------------------------------------------------------

/// Start the toy. `sfx_manifest` is an optional newline- or comma-separated
/// list of sound-effect filenames (the JS side passes
/// `window.SFX_FILES?.join("\n")`); absent or empty falls back to the
/// built-in three.
#[wasm_bindgen]
pub fn start_egg(sfx_manifest: Option<String>) -> Result<(), JsValue> {
    stage::start_stage(sfx_manifest)
}

/// Monotonic milliseconds from `Performance::now()`; 0.0 when unavailable
/// (native tests drive the pure modules with explicit timestamps instead).
pub(crate) fn performance_now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}
