use std::sync::mpsc;
use std::sync::{Arc, OnceLock};

use crate::foundation::error::{FilmstripError, FilmstripResult};

/// A decoded frame in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct LoadedFrame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl LoadedFrame {
    /// Build a frame from straight-alpha RGBA8 bytes, premultiplying.
    pub fn from_straight_rgba8(width: u32, height: u32, mut rgba8: Vec<u8>) -> FilmstripResult<Self> {
        if width == 0 || height == 0 {
            return Err(FilmstripError::asset("frame dimensions must be > 0"));
        }
        let expected = width as usize * height as usize * 4;
        if rgba8.len() != expected {
            return Err(FilmstripError::asset(format!(
                "frame byte length {} does not match {width}x{height} rgba8",
                rgba8.len()
            )));
        }
        for px in rgba8.chunks_exact_mut(4) {
            let a = px[3];
            px[0] = mul_div255(px[0], a);
            px[1] = mul_div255(px[1], a);
            px[2] = mul_div255(px[2], a);
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8),
        })
    }

    /// Build a uniform-color frame. Intended for tests and debugging.
    pub fn solid(width: u32, height: u32, straight_rgba: [u8; 4]) -> FilmstripResult<Self> {
        let px_count = width as usize * height as usize;
        let mut data = Vec::with_capacity(px_count * 4);
        for _ in 0..px_count {
            data.extend_from_slice(&straight_rgba);
        }
        Self::from_straight_rgba8(width, height, data)
    }
}

fn mul_div255(c: u8, a: u8) -> u8 {
    (((u16::from(c) * u16::from(a)) + 127) / 255) as u8
}

/// One fetch dispatched by the loader.
///
/// `epoch` identifies the sequence generation the request belongs to; the
/// loader drops completions whose epoch no longer matches.
#[derive(Clone, Debug)]
pub struct FrameRequest {
    /// Sequence generation this request was issued for.
    pub epoch: u64,
    /// Slot index within the sequence.
    pub index: usize,
    /// Frame source: an `http(s)://` URL or a filesystem path.
    pub source: String,
}

/// Resolution of a dispatched fetch.
///
/// `frame` is `None` when the fetch or decode failed; the failure is
/// absorbed into an unusable slot rather than surfaced as an error.
#[derive(Clone, Debug)]
pub struct FrameOutcome {
    /// Sequence generation the originating request carried.
    pub epoch: u64,
    /// Slot index within the sequence.
    pub index: usize,
    /// Decoded frame, or `None` on failure.
    pub frame: Option<LoadedFrame>,
}

/// Non-blocking frame acquisition contract.
///
/// `dispatch` must return immediately; completions are delivered through
/// `drain`, which the loader calls from `pump` on the driving thread. All
/// loader state mutation therefore happens on one thread regardless of how
/// an implementation performs its I/O.
pub trait FrameFetcher {
    /// Begin fetching one frame. Must not block.
    fn dispatch(&mut self, request: FrameRequest);
    /// Take all completions that have arrived since the last drain.
    fn drain(&mut self) -> Vec<FrameOutcome>;
}

/// Cloneable handle to a lazily-initialized shared HTTP agent.
///
/// The agent is built once, on first use, and every holder of a clone of the
/// handle reuses it. Passing the handle explicitly keeps the load-once,
/// reuse-everywhere behavior testable instead of hiding it in a process
/// global.
#[derive(Clone, Default)]
pub struct SharedAgent {
    inner: Arc<OnceLock<ureq::Agent>>,
}

impl std::fmt::Debug for SharedAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedAgent")
            .field("initialized", &self.inner.get().is_some())
            .finish()
    }
}

impl SharedAgent {
    /// Create a handle whose agent has not been built yet.
    pub fn new() -> Self {
        Self::default()
    }

    fn agent(&self) -> &ureq::Agent {
        self.inner.get_or_init(ureq::Agent::new_with_defaults)
    }
}

/// Fetcher backed by worker threads: `ureq` for `http(s)://` sources,
/// filesystem reads for plain paths, `image` decode for both.
///
/// Workers only fetch and decode; results cross back over a channel and are
/// applied by the loader during `pump`. A request that never completes (a
/// hung connection) simply leaves its slot unusable; there is no per-fetch
/// timeout.
pub struct HttpFetcher {
    agent: SharedAgent,
    tx: mpsc::Sender<FrameOutcome>,
    rx: mpsc::Receiver<FrameOutcome>,
}

impl std::fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("agent", &self.agent)
            .finish()
    }
}

impl HttpFetcher {
    /// Create a fetcher sharing `agent` with any sibling fetchers.
    pub fn new(agent: SharedAgent) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { agent, tx, rx }
    }
}

impl FrameFetcher for HttpFetcher {
    fn dispatch(&mut self, request: FrameRequest) {
        let agent = self.agent.clone();
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            let frame = match fetch_and_decode(&agent, &request.source) {
                Ok(frame) => Some(frame),
                Err(err) => {
                    tracing::debug!(
                        index = request.index,
                        source = %request.source,
                        error = %err,
                        "frame fetch failed"
                    );
                    None
                }
            };
            // The loader may be gone by the time a slow fetch resolves.
            let _ = tx.send(FrameOutcome {
                epoch: request.epoch,
                index: request.index,
                frame,
            });
        });
    }

    fn drain(&mut self) -> Vec<FrameOutcome> {
        self.rx.try_iter().collect()
    }
}

fn fetch_and_decode(agent: &SharedAgent, source: &str) -> FilmstripResult<LoadedFrame> {
    let bytes = if source.starts_with("http://") || source.starts_with("https://") {
        let mut response = agent
            .agent()
            .get(source)
            .call()
            .map_err(|e| FilmstripError::asset(format!("GET '{source}' failed: {e}")))?;
        response
            .body_mut()
            .read_to_vec()
            .map_err(|e| FilmstripError::asset(format!("reading body of '{source}' failed: {e}")))?
    } else {
        std::fs::read(source)
            .map_err(|e| FilmstripError::asset(format!("reading file '{source}' failed: {e}")))?
    };

    let decoded = image::load_from_memory(&bytes)
        .map_err(|e| FilmstripError::asset(format!("decoding '{source}' failed: {e}")))?
        .to_rgba8();
    let (width, height) = decoded.dimensions();
    LoadedFrame::from_straight_rgba8(width, height, decoded.into_raw())
}

/// In-memory fetcher for tests and debugging.
///
/// Records every dispatched request; completions are injected by hand with
/// [`complete`](Self::complete), so resolution order and timing are fully
/// controlled by the caller.
#[derive(Debug, Default)]
pub struct ManualFetcher {
    dispatched: Vec<FrameRequest>,
    pending: Vec<FrameOutcome>,
}

impl ManualFetcher {
    /// Create an empty fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request dispatched so far, in dispatch order.
    pub fn dispatched(&self) -> &[FrameRequest] {
        &self.dispatched
    }

    /// Queue a completion for the next `drain`.
    pub fn complete(&mut self, epoch: u64, index: usize, frame: Option<LoadedFrame>) {
        self.pending.push(FrameOutcome {
            epoch,
            index,
            frame,
        });
    }
}

impl FrameFetcher for ManualFetcher {
    fn dispatch(&mut self, request: FrameRequest) {
        self.dispatched.push(request);
    }

    fn drain(&mut self) -> Vec<FrameOutcome> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
