use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

use filmstrip::prefs::{Audience, Language, PreferenceStore};
use filmstrip::{
    HttpFetcher, LoaderOpts, PlayerOpts, ProgressStream, ScrollRegion, SequencePlayer, SharedAgent,
    Spring, SpringOpts, Surface, SurfaceSize,
};

#[derive(Parser, Debug)]
#[command(name = "filmstrip", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the frame at a given progress as a PNG.
    Frame(FrameArgs),
    /// Simulate a spring-smoothed scroll sweep, writing each drawn frame.
    Render(RenderArgs),
    /// Read or update the persisted visitor preferences.
    Prefs(PrefsArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input sequence manifest JSON ({"frames": ["url-or-path", ...]}).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Normalized progress in [0, 1].
    #[arg(long, default_value_t = 0.0)]
    progress: f64,

    /// Surface CSS width.
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    /// Surface CSS height.
    #[arg(long, default_value_t = 720.0)]
    height: f64,

    /// Device pixel ratio.
    #[arg(long, default_value_t = 1.0)]
    dpr: f64,

    /// Draw one frozen frame regardless of progress.
    #[arg(long)]
    reduce_motion: bool,

    /// Fetch and draw only the first frame.
    #[arg(long)]
    low_data: bool,

    /// Give up waiting for unresolved frames after this many milliseconds.
    #[arg(long, default_value_t = 30_000)]
    load_timeout_ms: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input sequence manifest JSON ({"frames": ["url-or-path", ...]}).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory for frame_####.png files.
    #[arg(long)]
    out_dir: PathBuf,

    /// Scroll sweep duration in seconds.
    #[arg(long, default_value_t = 4.0)]
    sweep_secs: f64,

    /// Simulation tick rate in Hz.
    #[arg(long, default_value_t = 60.0)]
    tick_hz: f64,

    /// Surface CSS width.
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    /// Surface CSS height.
    #[arg(long, default_value_t = 720.0)]
    height: f64,

    /// Device pixel ratio.
    #[arg(long, default_value_t = 1.0)]
    dpr: f64,

    /// Draw one frozen frame regardless of progress.
    #[arg(long)]
    reduce_motion: bool,

    /// Fetch and draw only the first frame.
    #[arg(long)]
    low_data: bool,

    /// Give up waiting for unresolved frames after this many milliseconds.
    #[arg(long, default_value_t = 30_000)]
    load_timeout_ms: u64,
}

#[derive(Parser, Debug)]
struct PrefsArgs {
    /// Preferences JSON file.
    #[arg(long)]
    file: PathBuf,

    /// Set the audience.
    #[arg(long, value_enum)]
    audience: Option<AudienceChoice>,

    /// Set the language.
    #[arg(long, value_enum)]
    language: Option<LanguageChoice>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AudienceChoice {
    Recruiter,
    Client,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LanguageChoice {
    En,
    Fr,
}

#[derive(serde::Deserialize, Debug)]
struct SequenceManifest {
    frames: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    match Cli::parse().cmd {
        Command::Frame(args) => run_frame(args),
        Command::Render(args) => run_render(args),
        Command::Prefs(args) => run_prefs(args),
    }
}

fn run_frame(args: FrameArgs) -> anyhow::Result<()> {
    let sources = load_manifest(&args.in_path)?;
    let size = SurfaceSize::from_css(args.width, args.height, args.dpr)?;
    let opts = PlayerOpts {
        reduce_motion: args.reduce_motion,
        low_data: args.low_data,
        ..PlayerOpts::default()
    };

    let mut fetcher = HttpFetcher::new(SharedAgent::new());
    let start = Instant::now();
    let player = SequencePlayer::new(
        sources,
        size,
        opts,
        LoaderOpts::default(),
        &mut fetcher,
        Duration::ZERO,
    )?;
    let mut stream = ProgressStream::new();
    player.connect(&mut stream);

    wait_for_frames(&player, &mut fetcher, start, args.load_timeout_ms);
    stream.set(args.progress);

    if let Some(text) = player.placeholder_text() {
        eprintln!("warning: sequence not fully ready ({text})");
    }
    player.with_surface(|surface| write_png(surface, &args.out))?;
    println!("wrote {}", args.out.display());
    Ok(())
}

fn run_render(args: RenderArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.sweep_secs > 0.0, "--sweep-secs must be > 0");
    anyhow::ensure!(args.tick_hz > 0.0, "--tick-hz must be > 0");

    let sources = load_manifest(&args.in_path)?;
    let size = SurfaceSize::from_css(args.width, args.height, args.dpr)?;
    let opts = PlayerOpts {
        reduce_motion: args.reduce_motion,
        low_data: args.low_data,
        ..PlayerOpts::default()
    };

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating '{}'", args.out_dir.display()))?;

    let mut fetcher = HttpFetcher::new(SharedAgent::new());
    let start = Instant::now();
    let player = SequencePlayer::new(
        sources,
        size,
        opts,
        LoaderOpts::default(),
        &mut fetcher,
        Duration::ZERO,
    )?;
    let mut stream = ProgressStream::new();
    player.connect(&mut stream);

    wait_for_frames(&player, &mut fetcher, start, args.load_timeout_ms);

    // The hero region of the host page is roughly four viewports tall.
    let region = ScrollRegion::new(0.0, args.height * 4.0, args.height)?;
    let spring_opts = if args.reduce_motion {
        SpringOpts::reduced_motion()
    } else {
        SpringOpts::default()
    };
    let mut spring = Spring::new(0.0, spring_opts)?;

    let dt = Duration::from_secs_f64(1.0 / args.tick_hz);
    let ticks = (args.sweep_secs * args.tick_hz).ceil() as u64;
    let mut written: Option<usize> = None;

    for tick in 0..=ticks {
        let scroll_y = region.extent() * tick as f64 / ticks as f64;
        spring.set_target(region.progress_at(scroll_y));
        stream.set(spring.step(dt));
        player.pump(&mut fetcher, start.elapsed());
        write_if_new_frame(&player, &args.out_dir, &mut written)?;
    }

    // Let the spring settle onto the final frame.
    let settle_ticks = (2.0 * args.tick_hz).ceil() as u64;
    for _ in 0..settle_ticks {
        if spring.is_settled() {
            break;
        }
        stream.set(spring.step(dt));
        write_if_new_frame(&player, &args.out_dir, &mut written)?;
    }

    let stats = player.stats();
    println!(
        "drawn {} frames ({} redraws skipped, {} progress events)",
        stats.frames_drawn, stats.redraws_skipped, stats.progress_events
    );
    Ok(())
}

fn run_prefs(args: PrefsArgs) -> anyhow::Result<()> {
    let mut store = PreferenceStore::load(&args.file);
    if let Some(audience) = args.audience {
        store.set_audience(match audience {
            AudienceChoice::Recruiter => Audience::Recruiter,
            AudienceChoice::Client => Audience::Client,
        })?;
    }
    if let Some(language) = args.language {
        store.set_language(match language {
            LanguageChoice::En => Language::En,
            LanguageChoice::Fr => Language::Fr,
        })?;
    }
    println!("{}", serde_json::to_string_pretty(&store.preferences())?);
    Ok(())
}

fn load_manifest(path: &Path) -> anyhow::Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading manifest '{}'", path.display()))?;
    let manifest: SequenceManifest = serde_json::from_str(&raw)
        .with_context(|| format!("parsing manifest '{}'", path.display()))?;
    anyhow::ensure!(!manifest.frames.is_empty(), "manifest lists no frames");
    Ok(manifest.frames)
}

/// Pump the player until every slot resolved or the deadline passes.
fn wait_for_frames(
    player: &SequencePlayer,
    fetcher: &mut HttpFetcher,
    start: Instant,
    timeout_ms: u64,
) {
    let deadline = Duration::from_millis(timeout_ms);
    loop {
        player.pump(fetcher, start.elapsed());
        if player.is_fully_loaded() || start.elapsed() >= deadline {
            return;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
}

fn write_if_new_frame(
    player: &SequencePlayer,
    out_dir: &Path,
    written: &mut Option<usize>,
) -> anyhow::Result<()> {
    let drawn = player.last_drawn_index();
    if drawn.is_some() && drawn != *written {
        let index = drawn.unwrap_or_default();
        let path = out_dir.join(format!("frame_{index:04}.png"));
        player.with_surface(|surface| write_png(surface, &path))?;
        *written = drawn;
    }
    Ok(())
}

fn write_png(surface: &Surface, path: &Path) -> anyhow::Result<()> {
    let mut straight = surface.data().to_vec();
    for px in straight.chunks_exact_mut(4) {
        let a = px[3];
        if a == 0 {
            continue;
        }
        for c in px.iter_mut().take(3) {
            *c = ((u16::from(*c) * 255 + u16::from(a) / 2) / u16::from(a)).min(255) as u8;
        }
    }
    let img = image::RgbaImage::from_raw(surface.width(), surface.height(), straight)
        .context("surface buffer does not match its dimensions")?;
    img.save(path)
        .with_context(|| format!("writing '{}'", path.display()))?;
    Ok(())
}
