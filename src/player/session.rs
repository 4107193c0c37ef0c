use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::animation::progress::{ProgressStream, SubscriptionId};
use crate::assets::fetch::FrameFetcher;
use crate::assets::sequence::{LoaderOpts, SequenceLoader};
use crate::foundation::core::{SurfaceSize, frame_index};
use crate::foundation::error::FilmstripResult;
use crate::render::fit::{CoverFit, DEFAULT_OVERSCAN};
use crate::render::surface::Surface;

/// Operating mode, chosen once from the host's policy flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerMode {
    /// Follow the progress stream, redrawing on frame-index changes.
    Animated,
    /// Draw frame 0 once; ignore progress. Chosen for reduced motion.
    Frozen,
    /// Draw frame 0 once and fetch nothing else. Chosen for low-data mode.
    Static,
}

impl PlayerMode {
    /// Derive the mode from the two policy flags. Low-data wins.
    pub fn from_flags(reduce_motion: bool, low_data: bool) -> Self {
        if low_data {
            Self::Static
        } else if reduce_motion {
            Self::Frozen
        } else {
            Self::Animated
        }
    }
}

/// Player construction options.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlayerOpts {
    /// Honor a motion-sensitivity preference: draw one frame, never animate.
    pub reduce_motion: bool,
    /// Honor a bandwidth constraint: fetch and draw a single frame only.
    pub low_data: bool,
    /// Overscan multiplier for the cover-fit placement.
    pub overscan: f64,
    /// Text shown over the surface until the sequence is ready.
    pub placeholder: String,
}

impl Default for PlayerOpts {
    fn default() -> Self {
        Self {
            reduce_motion: false,
            low_data: false,
            overscan: DEFAULT_OVERSCAN,
            placeholder: "Preloading cinematic assets...".to_string(),
        }
    }
}

/// Draw-path counters, mainly for diagnostics and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerStats {
    /// Progress callbacks received.
    pub progress_events: u64,
    /// Frames actually painted.
    pub frames_drawn: u64,
    /// Progress updates skipped because the frame index was unchanged.
    pub redraws_skipped: u64,
}

struct PlayerCore {
    loader: SequenceLoader,
    surface: Surface,
    mode: PlayerMode,
    overscan: f64,
    placeholder: String,
    last_drawn: Option<usize>,
    last_progress: f64,
    was_ready: bool,
    stats: PlayerStats,
}

impl PlayerCore {
    /// Paint the frame for `progress` unless the mapped index was already
    /// drawn. `force` bypasses the dedup (resize, initial paint).
    fn draw_at(&mut self, progress: f64, force: bool) {
        let Some(index) = frame_index(progress, self.loader.len()) else {
            return;
        };
        if !force && self.last_drawn == Some(index) {
            self.stats.redraws_skipped += 1;
            return;
        }
        // The continuous progress goes to the loader so its nearest-neighbor
        // fallback can substitute while this index is still in flight.
        let Some(frame) = self.loader.get_frame(progress) else {
            return;
        };
        let fit = match CoverFit::compute(
            self.surface.width(),
            self.surface.height(),
            frame.width,
            frame.height,
            self.overscan,
        ) {
            Ok(fit) => fit,
            Err(err) => {
                tracing::warn!(error = %err, "skipping draw");
                return;
            }
        };
        self.surface.clear();
        if self.surface.draw_frame(&frame, fit).is_ok() {
            self.last_drawn = Some(index);
            self.stats.frames_drawn += 1;
        }
    }

    fn on_ready(&mut self) {
        match self.mode {
            // Progress may already be nonzero (mid-scroll page load).
            PlayerMode::Animated => self.draw_at(self.last_progress, true),
            PlayerMode::Frozen | PlayerMode::Static => self.draw_at(0.0, true),
        }
    }
}

/// Scroll-synchronized sequence player over an owned surface.
///
/// The player owns its [`SequenceLoader`] and [`Surface`]; the host drives it
/// with [`pump`](Self::pump) (loader progress, readiness edge) and, in
/// animated mode, by connecting it to a [`ProgressStream`]. Every failure
/// path degrades visually — a nearby frame, a placeholder, or nothing — and
/// never raises out of the draw path.
pub struct SequencePlayer {
    core: Rc<RefCell<PlayerCore>>,
}

impl SequencePlayer {
    /// Create a player for `sources` and dispatch initial loading.
    ///
    /// In static (low-data) mode the sequence is truncated to its first
    /// frame before the loader sees it, so exactly one asset is fetched.
    pub fn new(
        mut sources: Vec<String>,
        size: SurfaceSize,
        opts: PlayerOpts,
        loader_opts: LoaderOpts,
        fetcher: &mut dyn FrameFetcher,
        now: Duration,
    ) -> FilmstripResult<Self> {
        let mode = PlayerMode::from_flags(opts.reduce_motion, opts.low_data);
        if mode == PlayerMode::Static {
            sources.truncate(1);
        }
        tracing::debug!(?mode, frames = sources.len(), "player constructed");

        let loader = SequenceLoader::new(sources, loader_opts, fetcher, now)?;
        let surface = Surface::new(size)?;
        Ok(Self {
            core: Rc::new(RefCell::new(PlayerCore {
                loader,
                surface,
                mode,
                overscan: opts.overscan,
                placeholder: opts.placeholder,
                last_drawn: None,
                last_progress: 0.0,
                was_ready: false,
                stats: PlayerStats::default(),
            })),
        })
    }

    /// Operating mode.
    pub fn mode(&self) -> PlayerMode {
        self.core.borrow().mode
    }

    /// Subscribe to a progress stream. Animated mode only; frozen and static
    /// players never react to progress and return `None`.
    ///
    /// Each update records the latest progress and, once the loader is
    /// ready, redraws only when the mapped frame index changed.
    pub fn connect(&self, stream: &mut ProgressStream) -> Option<SubscriptionId> {
        if self.core.borrow().mode != PlayerMode::Animated {
            return None;
        }
        let core = Rc::clone(&self.core);
        Some(stream.subscribe(Box::new(move |progress| {
            let mut core = core.borrow_mut();
            core.stats.progress_events += 1;
            core.last_progress = progress;
            if core.loader.is_ready() {
                core.draw_at(progress, false);
            }
        })))
    }

    /// Drive loading forward and handle the readiness rising edge.
    ///
    /// On first readiness the current frame is force-drawn at the latest
    /// known progress, covering a mid-scroll page load.
    pub fn pump(&self, fetcher: &mut dyn FrameFetcher, now: Duration) {
        let mut core = self.core.borrow_mut();
        core.loader.pump(fetcher, now);
        if !core.was_ready && core.loader.is_ready() {
            core.was_ready = true;
            core.on_ready();
        }
    }

    /// Swap the sequence. Counters and draw state reset; stale completions
    /// from the previous sequence are discarded by the loader's epoch guard.
    pub fn set_sources(
        &self,
        mut sources: Vec<String>,
        fetcher: &mut dyn FrameFetcher,
        now: Duration,
    ) {
        let mut core = self.core.borrow_mut();
        if core.mode == PlayerMode::Static {
            sources.truncate(1);
        }
        core.loader.set_sources(sources, fetcher, now);
        core.last_drawn = None;
        core.was_ready = false;
        core.stats = PlayerStats::default();
    }

    /// Rebuild the surface at a new size and force-redraw the current frame.
    ///
    /// The dedup check is bypassed: the index is unchanged but the buffer
    /// was just reallocated.
    pub fn resize(&self, size: SurfaceSize) -> FilmstripResult<()> {
        let mut core = self.core.borrow_mut();
        core.surface = Surface::new(size)?;
        tracing::debug!(width = size.width, height = size.height, "surface resized");
        if core.was_ready {
            let progress = match core.mode {
                PlayerMode::Animated => core.last_progress,
                PlayerMode::Frozen | PlayerMode::Static => 0.0,
            };
            core.draw_at(progress, true);
        }
        Ok(())
    }

    /// Loader readiness.
    pub fn is_ready(&self) -> bool {
        self.core.borrow().loader.is_ready()
    }

    /// Whether every frame slot has resolved.
    pub fn is_fully_loaded(&self) -> bool {
        self.core.borrow().loader.is_fully_loaded()
    }

    /// Placeholder text while loading, or `None` once it should be removed.
    ///
    /// Static mode never shows one: a single fetch either lands or the
    /// surface simply stays empty.
    pub fn placeholder_text(&self) -> Option<String> {
        let core = self.core.borrow();
        if core.mode != PlayerMode::Static && !core.loader.is_ready() {
            Some(core.placeholder.clone())
        } else {
            None
        }
    }

    /// Index of the most recently painted frame.
    pub fn last_drawn_index(&self) -> Option<usize> {
        self.core.borrow().last_drawn
    }

    /// Draw-path counters.
    pub fn stats(&self) -> PlayerStats {
        self.core.borrow().stats
    }

    /// Run a closure against the current surface.
    pub fn with_surface<R>(&self, f: impl FnOnce(&Surface) -> R) -> R {
        f(&self.core.borrow().surface)
    }
}

impl std::fmt::Debug for SequencePlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.core.borrow();
        f.debug_struct("SequencePlayer")
            .field("mode", &core.mode)
            .field("frames", &core.loader.len())
            .field("last_drawn", &core.last_drawn)
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/session.rs"]
mod tests;
