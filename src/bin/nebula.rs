use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "nebula", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available moods with their palettes.
    Moods,
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render an MP4 animation (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Mood selecting palette and speed.
    #[arg(long, value_enum, default_value_t = nebula::Mood::Gateway)]
    mood: nebula::Mood,

    /// Ticks to advance before capturing (16 logical ms each).
    #[arg(long, default_value_t = 60)]
    tick: u64,

    /// Surface width in pixels.
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Surface height in pixels.
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Particle seed override.
    #[arg(long)]
    seed: Option<u64>,

    /// Session config JSON (SessionOpts).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Mood selecting palette and speed.
    #[arg(long, value_enum, default_value_t = nebula::Mood::Gateway)]
    mood: nebula::Mood,

    /// Number of frames to render.
    #[arg(long, default_value_t = 300)]
    ticks: u64,

    /// Encoder frame rate (playback timing only; the logical step is fixed).
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Surface width in pixels.
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Surface height in pixels.
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Particle seed override.
    #[arg(long)]
    seed: Option<u64>,

    /// Session config JSON (SessionOpts).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Moods => cmd_moods(),
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn load_opts(config: Option<&Path>, seed: Option<u64>) -> anyhow::Result<nebula::SessionOpts> {
    let mut opts = match config {
        Some(path) => {
            let f = File::open(path)
                .with_context(|| format!("open session config '{}'", path.display()))?;
            serde_json::from_reader(BufReader::new(f)).with_context(|| "parse session config JSON")?
        }
        None => nebula::SessionOpts::default(),
    };
    if let Some(seed) = seed {
        opts.seed = seed;
    }
    Ok(opts)
}

fn mount(
    mood: nebula::Mood,
    width: u32,
    height: u32,
    opts: nebula::SessionOpts,
) -> anyhow::Result<nebula::Session> {
    let viewport = nebula::Viewport::new(width, height);
    Ok(nebula::Session::mount(mood, viewport, opts)?)
}

fn cmd_moods() -> anyhow::Result<()> {
    for mood in nebula::Mood::ALL {
        let palette = nebula::Palette::for_mood(mood);
        let colors = palette
            .colors
            .iter()
            .map(|c| c.to_hex())
            .collect::<Vec<_>>()
            .join(" ");
        println!("{mood:<12} {colors}  speed {}", palette.speed);
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let opts = load_opts(args.config.as_deref(), args.seed)?;
    let mut session = mount(args.mood, args.width, args.height, opts)?;

    for _ in 0..args.tick {
        session.tick()?;
    }

    let surface = session
        .surface()
        .context("no drawing surface (zero-sized viewport)")?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        surface.data(),
        surface.width(),
        surface.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    if args.ticks == 0 {
        anyhow::bail!("render requires --ticks > 0");
    }

    let opts = load_opts(args.config.as_deref(), args.seed)?;
    let mut session = mount(args.mood, args.width, args.height, opts)?;

    let cfg = nebula::default_mp4_config(&args.out, args.width, args.height, args.fps);
    let mut enc = nebula::FfmpegEncoder::new(cfg)?;

    for _ in 0..args.ticks {
        session.tick()?;
        let surface = session
            .surface()
            .context("no drawing surface (zero-sized viewport)")?;
        enc.encode_frame(surface)?;
    }
    let frames = enc.frames_written();
    enc.finish()?;

    eprintln!("wrote {} ({frames} frames)", args.out.display());
    Ok(())
}
