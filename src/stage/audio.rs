//! Sound-effect voice pool and playback helpers.
//!
//! A fixed ring of `HtmlAudioElement` handles lets effects overlap without
//! starving a voice that is still playing. Playback failure (autoplay
//! restrictions, missing files) is never an error state: sync errors are
//! dropped and the play promise gets a no-op rejection handler.

use wasm_bindgen::prelude::*;
use web_sys::{HtmlAudioElement, HtmlMediaElement};

use super::rng::Lcg;
use crate::{SFX_DIR, SFX_FALLBACK};

/// Number of reusable playback handles in the pool.
pub const SFX_VOICES: usize = 8;

/// Resolve the effective SFX source list from an optional host manifest
/// (newline- or comma-separated filenames). Entries are trimmed, empties
/// dropped, and bare names prefixed with [`SFX_DIR`]. Absent or empty
/// manifests fall back to the built-in list.
pub fn resolve_sfx_sources(manifest: Option<&str>) -> Vec<String> {
    let entries: Vec<String> = manifest
        .unwrap_or_default()
        .split(['\n', ','])
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(|f| {
            if f.starts_with("assets/") {
                f.to_string()
            } else {
                format!("{SFX_DIR}{f}")
            }
        })
        .collect();

    if entries.is_empty() {
        SFX_FALLBACK.iter().map(|s| (*s).to_string()).collect()
    } else {
        entries
    }
}

thread_local! {
    // Shared rejection handler so per-play catch() calls don't each leak a closure.
    static SWALLOW: Closure<dyn FnMut(JsValue)> =
        Closure::wrap(Box::new(|_: JsValue| {}) as Box<dyn FnMut(JsValue)>);
}

/// Start playback and swallow both sync and async failures.
pub fn play_silent(media: &HtmlMediaElement) {
    if let Ok(promise) = media.play() {
        SWALLOW.with(|cb| {
            let _ = promise.catch(cb);
        });
    }
}

/// Rewind a one-shot element and play it at `volume`.
pub fn replay(media: &HtmlMediaElement, volume: f64) {
    media.set_volume(volume);
    media.set_current_time(0.0);
    play_silent(media);
}

pub struct SfxPool {
    sources: Vec<String>,
    voices: Vec<HtmlAudioElement>,
    next_voice: usize,
}

impl SfxPool {
    pub fn new(sources: Vec<String>) -> Result<Self, JsValue> {
        let voices = (0..SFX_VOICES)
            .map(|_| HtmlAudioElement::new())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            sources,
            voices,
            next_voice: 0,
        })
    }

    /// Best-effort cache warm: point a throwaway element at every source so
    /// the browser starts fetching.
    pub fn warm(&self) {
        for url in &self.sources {
            if let Ok(a) = HtmlAudioElement::new() {
                a.set_preload("auto");
                a.set_src(url);
            }
        }
    }

    /// Play a random effect on the next voice in the ring.
    pub fn play_random(&mut self, rng: &mut Lcg, volume: f64) {
        if self.sources.is_empty() {
            return;
        }
        let url = &self.sources[rng.index(self.sources.len())];
        let voice = &self.voices[self.next_voice];
        self.next_voice = (self.next_voice + 1) % self.voices.len();

        let _ = voice.pause();
        voice.set_current_time(0.0);
        voice.set_src(url);
        voice.set_volume(volume);
        play_silent(voice);
    }
}
