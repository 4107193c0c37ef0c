//! Filmstrip maps continuous scroll progress onto an ordered image sequence.
//!
//! The pipeline has three parts:
//!
//! - A [`SequenceLoader`] streams and decodes the sequence without blocking:
//!   a priority window is fetched immediately, the rest in fixed-cadence
//!   background batches, and [`SequenceLoader::get_frame`] answers any
//!   position with the nearest loaded frame.
//! - A scroll mapper ([`ScrollRegion`] + [`Spring`]) turns raw scroll
//!   offsets into smoothed progress published through a [`ProgressStream`].
//! - A [`SequencePlayer`] follows the progress stream and composites the
//!   current frame onto an RGBA8 [`Surface`] with a cover-fit transform,
//!   redrawing only when the mapped frame index changes.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Scroll mapping, spring smoothing, and the progress stream.
pub mod animation;
/// Frame fetching, decoding, and the progressive sequence loader.
pub mod assets;
/// The progress-driven sequence player.
pub mod player;
/// Persisted visitor preferences (audience, language).
pub mod prefs;
/// Cover-fit math and the CPU surface.
pub mod render;

pub use crate::foundation::core::{SurfaceSize, clamp_progress, frame_index};
pub use crate::foundation::error::{FilmstripError, FilmstripResult};

pub use crate::animation::progress::{ProgressStream, SubscriptionId};
pub use crate::animation::scroll::ScrollRegion;
pub use crate::animation::spring::{Spring, SpringOpts};
pub use crate::assets::fetch::{
    FrameFetcher, FrameOutcome, FrameRequest, HttpFetcher, LoadedFrame, ManualFetcher, SharedAgent,
};
pub use crate::assets::sequence::{LoaderOpts, SequenceLoader};
pub use crate::player::session::{PlayerMode, PlayerOpts, PlayerStats, SequencePlayer};
pub use crate::render::fit::{CoverFit, DEFAULT_OVERSCAN};
pub use crate::render::surface::Surface;
