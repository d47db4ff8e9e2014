use crate::{
    core::Rgba8Premul,
    error::{NebulaError, NebulaResult},
};

/// Background color of the whole experience ("#05020f"); used for the
/// initial clear, the trail fade, and the vignette.
pub const BASE_BACKGROUND: Rgb8 = Rgb8::new(0x05, 0x02, 0x0f);

pub const PALETTE_COLORS: usize = 4;

/// The six panel moods. Each selects a color set and an animation-speed
/// multiplier for the background field.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    #[default]
    Gateway,
    Exploration,
    Mind,
    Sound,
    Visions,
    Connection,
}

impl Mood {
    pub const ALL: [Mood; 6] = [
        Mood::Gateway,
        Mood::Exploration,
        Mood::Mind,
        Mood::Sound,
        Mood::Visions,
        Mood::Connection,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Mood::Gateway => "gateway",
            Mood::Exploration => "exploration",
            Mood::Mind => "mind",
            Mood::Sound => "sound",
            Mood::Visions => "visions",
            Mood::Connection => "connection",
        }
    }

    /// Resolve a mood from a string key. Unknown keys fail closed to the
    /// default mood instead of erroring: the background is cosmetic and must
    /// never take the host down over a bad variant name.
    pub fn from_key(key: &str) -> Mood {
        Mood::ALL
            .into_iter()
            .find(|m| m.key() == key.trim().to_ascii_lowercase())
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// An immutable color set plus speed scalar. `speed` is the per-millisecond
/// angular rate fed to the field's sinusoids.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Palette {
    pub colors: [Rgb8; PALETTE_COLORS],
    pub speed: f64,
}

impl Palette {
    pub fn for_mood(mood: Mood) -> Palette {
        match mood {
            Mood::Gateway => Palette {
                colors: [
                    Rgb8::new(0x4f, 0x46, 0xe5),
                    Rgb8::new(0x7c, 0x3a, 0xed),
                    Rgb8::new(0xc0, 0x26, 0xd3),
                    Rgb8::new(0x0e, 0xa5, 0xe9),
                ],
                speed: 0.0003,
            },
            Mood::Exploration => Palette {
                colors: [
                    Rgb8::new(0x8b, 0x5c, 0xf6),
                    Rgb8::new(0xec, 0x48, 0x99),
                    Rgb8::new(0x06, 0xb6, 0xd4),
                    Rgb8::new(0x10, 0xb9, 0x81),
                ],
                speed: 0.0004,
            },
            Mood::Mind => Palette {
                colors: [
                    Rgb8::new(0x3b, 0x82, 0xf6),
                    Rgb8::new(0x63, 0x66, 0xf1),
                    Rgb8::new(0x8b, 0x5c, 0xf6),
                    Rgb8::new(0xa8, 0x55, 0xf7),
                ],
                speed: 0.0002,
            },
            Mood::Sound => Palette {
                colors: [
                    Rgb8::new(0x14, 0xb8, 0xa6),
                    Rgb8::new(0x06, 0xb6, 0xd4),
                    Rgb8::new(0x0e, 0xa5, 0xe9),
                    Rgb8::new(0x3b, 0x82, 0xf6),
                ],
                speed: 0.0003,
            },
            Mood::Visions => Palette {
                colors: [
                    Rgb8::new(0xf4, 0x3f, 0x5e),
                    Rgb8::new(0xec, 0x48, 0x99),
                    Rgb8::new(0xd9, 0x46, 0xef),
                    Rgb8::new(0xa8, 0x55, 0xf7),
                ],
                speed: 0.0004,
            },
            Mood::Connection => Palette {
                colors: [
                    Rgb8::new(0x10, 0xb9, 0x81),
                    Rgb8::new(0x14, 0xb8, 0xa6),
                    Rgb8::new(0x06, 0xb6, 0xd4),
                    Rgb8::new(0x22, 0xd3, 0xee),
                ],
                speed: 0.0002,
            },
        }
    }

    pub fn validate(&self) -> NebulaResult<()> {
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(NebulaError::validation("palette speed must be finite and > 0"));
        }
        Ok(())
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::for_mood(Mood::default())
    }
}

/// A straight (non-premultiplied) RGB color token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(s: &str) -> NebulaResult<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);

        fn hex_byte(pair: &str) -> NebulaResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| NebulaError::validation(format!("invalid hex byte \"{pair}\"")))
        }

        if s.len() != 6 {
            return Err(NebulaError::validation(
                "hex color must be #RRGGBB (case-insensitive)",
            ));
        }

        Ok(Self::new(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
        ))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Premultiply against the given alpha in [0,1].
    pub fn premul(self, alpha: f64) -> Rgba8Premul {
        let a = alpha.clamp(0.0, 1.0);
        fn to_u8(c: u8, a: f64) -> u8 {
            ((f64::from(c) / 255.0 * a).clamp(0.0, 1.0) * 255.0).round() as u8
        }

        Rgba8Premul {
            r: to_u8(self.r, a),
            g: to_u8(self.g, a),
            b: to_u8(self.b, a),
            a: (a * 255.0).round() as u8,
        }
    }

    /// Per-channel linear interpolation toward `other`.
    pub fn lerp(self, other: Rgb8, t: f64) -> Rgb8 {
        let t = t.clamp(0.0, 1.0);
        fn mix(a: u8, b: u8, t: f64) -> u8 {
            (f64::from(a) + (f64::from(b) - f64::from(a)) * t)
                .round()
                .clamp(0.0, 255.0) as u8
        }

        Rgb8::new(
            mix(self.r, other.r, t),
            mix(self.g, other.g, t),
            mix(self.b, other.b, t),
        )
    }
}

impl serde::Serialize for Rgb8 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Rgb8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            Arr([u8; 3]),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => Rgb8::from_hex(&s).map_err(serde::de::Error::custom),
            Repr::Arr([r, g, b]) => Ok(Rgb8::new(r, g, b)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_six_moods_return_documented_tuples() {
        let expected: [(Mood, [&str; 4], f64); 6] = [
            (
                Mood::Gateway,
                ["#4f46e5", "#7c3aed", "#c026d3", "#0ea5e9"],
                0.0003,
            ),
            (
                Mood::Exploration,
                ["#8b5cf6", "#ec4899", "#06b6d4", "#10b981"],
                0.0004,
            ),
            (
                Mood::Mind,
                ["#3b82f6", "#6366f1", "#8b5cf6", "#a855f7"],
                0.0002,
            ),
            (
                Mood::Sound,
                ["#14b8a6", "#06b6d4", "#0ea5e9", "#3b82f6"],
                0.0003,
            ),
            (
                Mood::Visions,
                ["#f43f5e", "#ec4899", "#d946ef", "#a855f7"],
                0.0004,
            ),
            (
                Mood::Connection,
                ["#10b981", "#14b8a6", "#06b6d4", "#22d3ee"],
                0.0002,
            ),
        ];

        for (mood, hexes, speed) in expected {
            let p = Palette::for_mood(mood);
            assert_eq!(p.speed, speed, "{mood}");
            for (i, hex) in hexes.iter().enumerate() {
                assert_eq!(p.colors[i], Rgb8::from_hex(hex).unwrap(), "{mood}[{i}]");
            }
            assert!(p.validate().is_ok());
        }
    }

    #[test]
    fn unknown_keys_fail_closed_to_default() {
        assert_eq!(Mood::from_key("sound"), Mood::Sound);
        assert_eq!(Mood::from_key("  Visions "), Mood::Visions);
        assert_eq!(Mood::from_key("wormhole"), Mood::Gateway);
        assert_eq!(Mood::from_key(""), Mood::Gateway);
    }

    #[test]
    fn hex_parse_and_roundtrip() {
        let c = Rgb8::from_hex("#4f46e5").unwrap();
        assert_eq!(c, Rgb8::new(0x4f, 0x46, 0xe5));
        assert_eq!(c.to_hex(), "#4f46e5");
        assert!(Rgb8::from_hex("#123").is_err());
        assert!(Rgb8::from_hex("zzzzzz").is_err());
    }

    #[test]
    fn serde_accepts_hex_and_array_forms() {
        let c: Rgb8 = serde_json::from_str("\"#ff0080\"").unwrap();
        assert_eq!(c, Rgb8::new(255, 0, 128));

        let c: Rgb8 = serde_json::from_str("[5, 2, 15]").unwrap();
        assert_eq!(c, BASE_BACKGROUND);

        assert_eq!(serde_json::to_string(&c).unwrap(), "\"#05020f\"");
    }

    #[test]
    fn premul_scales_channels() {
        let c = Rgb8::new(255, 0, 255).premul(0.5);
        assert_eq!(c.a, 128);
        assert_eq!(c.r, 128);
        assert_eq!(c.g, 0);
    }

    #[test]
    fn palette_validate_rejects_bad_speed() {
        let mut p = Palette::default();
        p.speed = 0.0;
        assert!(p.validate().is_err());
        p.speed = f64::NAN;
        assert!(p.validate().is_err());
    }
}
