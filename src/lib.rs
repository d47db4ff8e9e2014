#![forbid(unsafe_code)]

pub mod compositor;
pub mod core;
pub mod ease;
pub mod encode_ffmpeg;
pub mod error;
pub mod field;
pub mod palette;
pub mod rng;
pub mod scheduler;
pub mod session;
pub mod visualizer;

pub use compositor::{Compositor, Surface, DEFAULT_TRAIL_ALPHA};
pub use core::{Rgba8Premul, Tick, Viewport, TICK_MILLIS};
pub use ease::Ease;
pub use encode_ffmpeg::{default_mp4_config, EncodeConfig, FfmpegEncoder};
pub use error::{NebulaError, NebulaResult};
pub use field::{
    Blob, FieldFrame, Particle, ParticleField, PointSprite, BLOB_COUNT, DEFAULT_PARTICLE_COUNT,
};
pub use palette::{Mood, Palette, Rgb8, BASE_BACKGROUND, PALETTE_COLORS};
pub use rng::Rng64;
pub use scheduler::FrameScheduler;
pub use session::{Session, SessionOpts};
pub use visualizer::{Visualizer, BAR_COUNT};
