use crate::{
    compositor::{Compositor, Surface, DEFAULT_TRAIL_ALPHA},
    core::{Tick, Viewport},
    ease::Ease,
    error::{NebulaError, NebulaResult},
    field::{self, ParticleField, DEFAULT_PARTICLE_COUNT},
    palette::{Mood, Palette, BASE_BACKGROUND},
    scheduler::FrameScheduler,
    visualizer::Visualizer,
};

/// Session configuration. Deserializable from JSON so the CLI can load a
/// config file; every field has a sensible default.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SessionOpts {
    pub particle_count: usize,
    pub seed: u64,
    pub trail_alpha: f64,
    /// Mount fade-in length; primitive alpha ramps from 0 to 1 over this
    /// many ticks with a cubic-out ease. 0 disables the ramp.
    pub fade_in_ticks: u64,
    pub visualizer: bool,
    pub vignette: bool,
    /// Overrides the mood's built-in palette when set.
    pub palette: Option<Palette>,
}

impl Default for SessionOpts {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            seed: 0,
            trail_alpha: DEFAULT_TRAIL_ALPHA,
            fade_in_ticks: 60,
            visualizer: false,
            vignette: false,
            palette: None,
        }
    }
}

impl SessionOpts {
    pub fn validate(&self) -> NebulaResult<()> {
        if self.particle_count == 0 || self.particle_count > 100_000 {
            return Err(NebulaError::validation(
                "particle_count must be within 1..=100000",
            ));
        }
        if !self.trail_alpha.is_finite() || !(0.0..=1.0).contains(&self.trail_alpha) {
            return Err(NebulaError::validation("trail_alpha must be within [0, 1]"));
        }
        if let Some(palette) = &self.palette {
            palette.validate()?;
        }
        Ok(())
    }
}

/// One mounted background instance: the exclusive pairing of a scheduler
/// registration, a particle set, and a drawing surface.
///
/// Lifecycle: `mount` clears the surface and registers the loop; `tick`
/// advances and composites one frame; `resize` swaps the bitmap without
/// touching the accumulator or particles; `remount` switches moods by fully
/// cancelling the old registration before starting a fresh one; `unmount`
/// cancels. When no surface can be acquired (zero-area viewport) the whole
/// session degrades to a no-op render.
#[derive(Clone, Debug)]
pub struct Session {
    mood: Mood,
    palette: Palette,
    opts: SessionOpts,
    scheduler: FrameScheduler,
    field: ParticleField,
    compositor: Compositor,
    surface: Option<Surface>,
    visualizer: Option<Visualizer>,
    frames_composited: u64,
}

impl Session {
    #[tracing::instrument(skip(opts))]
    pub fn mount(mood: Mood, viewport: Viewport, opts: SessionOpts) -> NebulaResult<Self> {
        opts.validate()?;

        let palette = opts.palette.unwrap_or_else(|| Palette::for_mood(mood));
        let compositor = Compositor::new(BASE_BACKGROUND, opts.trail_alpha)?;
        let field = ParticleField::seeded(opts.particle_count, mount_seed(opts.seed, mood));
        let visualizer = opts.visualizer.then(|| {
            let mut v = Visualizer::new(opts.seed);
            v.set_playing(true);
            v
        });

        let mut scheduler = FrameScheduler::new();
        let mut surface = Surface::acquire(viewport);
        match surface.as_mut() {
            Some(s) => {
                compositor.clear(s);
                scheduler.begin()?;
            }
            None => {
                tracing::debug!(?viewport, "no drawing surface; rendering degrades to a no-op");
            }
        }

        Ok(Self {
            mood,
            palette,
            opts,
            scheduler,
            field,
            compositor,
            surface,
            visualizer,
            frames_composited: 0,
        })
    }

    /// Run one tick: advance the accumulator, generate the field, composite.
    /// A no-op when the loop is not active (cancelled, or surfaceless).
    pub fn tick(&mut self) -> NebulaResult<()> {
        if !self.scheduler.is_active() {
            return Ok(());
        }
        let tick = self.scheduler.advance()?;
        let fade_in = fade_ramp(tick, self.opts.fade_in_ticks);

        let Some(surface) = self.surface.as_mut() else {
            return Ok(());
        };

        let frame = field::generate(tick, &self.palette, surface.viewport(), &mut self.field);
        self.compositor.composite(surface, &frame, fade_in);

        if let Some(viz) = self.visualizer.as_mut() {
            viz.tick(tick);
            self.compositor.paint_bars(
                surface,
                viz.bars(),
                self.palette.colors[1],
                self.palette.colors[3],
                fade_in,
            );
        }
        if self.opts.vignette {
            self.compositor.apply_vignette(surface);
        }

        self.frames_composited += 1;
        Ok(())
    }

    /// Adjust the surface bitmap to a new viewport. The accumulator and the
    /// particle set are untouched; the next tick repaints naturally.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport.is_degenerate() {
            return;
        }
        if let Some(surface) = self.surface.as_mut() {
            surface.resize(viewport);
            self.compositor.clear(surface);
        }
    }

    /// Switch moods. The old registration is fully cancelled before the new
    /// one begins, so two loops never drive the same surface; the
    /// accumulator resets and particles are reseeded, as on a fresh mount.
    pub fn remount(&mut self, mood: Mood) -> NebulaResult<()> {
        self.scheduler.cancel();
        self.scheduler.reset()?;

        self.mood = mood;
        self.palette = self.opts.palette.unwrap_or_else(|| Palette::for_mood(mood));
        self.field =
            ParticleField::seeded(self.opts.particle_count, mount_seed(self.opts.seed, mood));
        self.frames_composited = 0;

        if let Some(surface) = self.surface.as_mut() {
            self.compositor.clear(surface);
            self.scheduler.begin()?;
        }
        Ok(())
    }

    /// Cancel the loop. Further ticks are no-ops; the surface keeps its last
    /// painted contents.
    pub fn unmount(&mut self) {
        self.scheduler.cancel();
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn tick_index(&self) -> Tick {
        self.scheduler.tick()
    }

    pub fn frames_composited(&self) -> u64 {
        self.frames_composited
    }

    pub fn is_active(&self) -> bool {
        self.scheduler.is_active()
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn particles(&self) -> &ParticleField {
        &self.field
    }
}

/// Per-mount particle seed: distinct moods get distinct starfields while
/// staying reproducible for a given session seed.
fn mount_seed(seed: u64, mood: Mood) -> u64 {
    seed ^ ((mood as u64) + 1).wrapping_mul(0xD6E8_FEB8_6659_FD93)
}

fn fade_ramp(tick: Tick, fade_in_ticks: u64) -> f64 {
    if fade_in_ticks == 0 {
        return 1.0;
    }
    Ease::OutCubic.apply((tick.0 as f64) / (fade_in_ticks as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_opts_validate() {
        assert!(SessionOpts::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut opts = SessionOpts::default();
        opts.particle_count = 0;
        assert!(opts.validate().is_err());

        let mut opts = SessionOpts::default();
        opts.trail_alpha = 1.5;
        assert!(opts.validate().is_err());

        let mut opts = SessionOpts::default();
        opts.palette = Some(Palette {
            speed: -1.0,
            ..Palette::default()
        });
        assert!(opts.validate().is_err());
    }

    #[test]
    fn opts_deserialize_from_partial_json() {
        let opts: SessionOpts =
            serde_json::from_str(r#"{ "particle_count": 12, "seed": 42 }"#).unwrap();
        assert_eq!(opts.particle_count, 12);
        assert_eq!(opts.seed, 42);
        assert_eq!(opts.trail_alpha, DEFAULT_TRAIL_ALPHA);
        assert!(opts.palette.is_none());
    }

    #[test]
    fn opts_deserialize_with_palette_override() {
        let opts: SessionOpts = serde_json::from_str(
            r##"{
                "palette": {
                    "colors": ["#112233", "#445566", [7, 8, 9], "#aabbcc"],
                    "speed": 0.0005
                }
            }"##,
        )
        .unwrap();
        let palette = opts.palette.unwrap();
        assert_eq!(palette.speed, 0.0005);
        assert_eq!(palette.colors[2], crate::palette::Rgb8::new(7, 8, 9));

        let session = Session::mount(Mood::Mind, Viewport::new(16, 16), opts).unwrap();
        assert_eq!(session.palette().speed, 0.0005);
    }

    #[test]
    fn fade_ramp_reaches_unity() {
        assert_eq!(fade_ramp(Tick(0), 60), 0.0);
        assert!(fade_ramp(Tick(30), 60) > 0.0);
        assert_eq!(fade_ramp(Tick(60), 60), 1.0);
        assert_eq!(fade_ramp(Tick(120), 60), 1.0);
        assert_eq!(fade_ramp(Tick(0), 0), 1.0);
    }

    #[test]
    fn mount_seed_distinguishes_moods() {
        let a = mount_seed(1, Mood::Gateway);
        let b = mount_seed(1, Mood::Sound);
        assert_ne!(a, b);
        assert_eq!(a, mount_seed(1, Mood::Gateway));
    }

    #[test]
    fn visualizer_session_paints_bars() {
        let opts = SessionOpts {
            visualizer: true,
            fade_in_ticks: 0,
            ..SessionOpts::default()
        };
        let mut with_bars = Session::mount(Mood::Sound, Viewport::new(64, 64), opts).unwrap();

        let plain = SessionOpts {
            fade_in_ticks: 0,
            ..SessionOpts::default()
        };
        let mut without = Session::mount(Mood::Sound, Viewport::new(64, 64), plain).unwrap();

        for _ in 0..5 {
            with_bars.tick().unwrap();
            without.tick().unwrap();
        }
        assert_ne!(
            with_bars.surface().unwrap().data(),
            without.surface().unwrap().data()
        );
    }
}
