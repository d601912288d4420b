//! Style configuration and the enumerated choices the host UI offers.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

// ────────────────────────────────────────────────────────────────────────────
// Template identifier
// ────────────────────────────────────────────────────────────────────────────

/// Selects one member of the template set.
///
/// Deserialization is total: unknown identifiers resolve to the first variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateId {
    #[default]
    Modern,
    Professional,
    Creative,
}

impl TemplateId {
    pub const ALL: [TemplateId; 3] = [
        TemplateId::Modern,
        TemplateId::Professional,
        TemplateId::Creative,
    ];

    pub fn from_id(id: &str) -> Self {
        match id.trim().to_ascii_lowercase().as_str() {
            "modern" => TemplateId::Modern,
            "professional" => TemplateId::Professional,
            "creative" => TemplateId::Creative,
            other => {
                warn!("Unknown template id '{other}', falling back to modern");
                TemplateId::Modern
            }
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            TemplateId::Modern => "modern",
            TemplateId::Professional => "professional",
            TemplateId::Creative => "creative",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TemplateId::Modern => "Modern",
            TemplateId::Professional => "Professional",
            TemplateId::Creative => "Creative",
        }
    }
}

impl<'de> Deserialize<'de> for TemplateId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(TemplateId::from_id(&raw))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fonts
// ────────────────────────────────────────────────────────────────────────────

/// The font options offered to the user. The first entry is the fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FontChoice {
    Inter,
    Lora,
    RobotoMono,
    Roboto,
    OpenSans,
    Lato,
    Merriweather,
    PlayfairDisplay,
    Montserrat,
    Nunito,
    Raleway,
}

impl FontChoice {
    pub const ALL: [FontChoice; 11] = [
        FontChoice::Inter,
        FontChoice::Lora,
        FontChoice::RobotoMono,
        FontChoice::Roboto,
        FontChoice::OpenSans,
        FontChoice::Lato,
        FontChoice::Merriweather,
        FontChoice::PlayfairDisplay,
        FontChoice::Montserrat,
        FontChoice::Nunito,
        FontChoice::Raleway,
    ];

    /// Resolves a selector id such as `font-serif`. Unknown ids resolve to `Inter`.
    pub fn from_id(id: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|f| f.id() == id)
            .unwrap_or(FontChoice::Inter)
    }

    pub fn id(&self) -> &'static str {
        match self {
            FontChoice::Inter => "font-sans",
            FontChoice::Lora => "font-serif",
            FontChoice::RobotoMono => "font-mono",
            FontChoice::Roboto => "font-roboto",
            FontChoice::OpenSans => "font-open-sans",
            FontChoice::Lato => "font-lato",
            FontChoice::Merriweather => "font-merriweather",
            FontChoice::PlayfairDisplay => "font-playfair-display",
            FontChoice::Montserrat => "font-montserrat",
            FontChoice::Nunito => "font-nunito",
            FontChoice::Raleway => "font-raleway",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FontChoice::Inter => "Inter (Sans-serif)",
            FontChoice::Lora => "Lora (Serif)",
            FontChoice::RobotoMono => "Roboto Mono (Monospace)",
            FontChoice::Roboto => "Roboto (Sans-serif)",
            FontChoice::OpenSans => "Open Sans (Sans-serif)",
            FontChoice::Lato => "Lato (Sans-serif)",
            FontChoice::Merriweather => "Merriweather (Serif)",
            FontChoice::PlayfairDisplay => "Playfair Display (Serif)",
            FontChoice::Montserrat => "Montserrat (Sans-serif)",
            FontChoice::Nunito => "Nunito (Sans-serif)",
            FontChoice::Raleway => "Raleway (Sans-serif)",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Colours
// ────────────────────────────────────────────────────────────────────────────

/// 8-bit sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xff, 0xff, 0xff);
    /// Body text (gray-800).
    pub const INK: Rgb = Rgb(0x1f, 0x29, 0x37);
    /// Secondary text (gray-600).
    pub const MUTED: Rgb = Rgb(0x4b, 0x55, 0x63);
    /// Tertiary text (gray-500).
    pub const FAINT: Rgb = Rgb(0x6b, 0x72, 0x80);

    /// Parses `#rgb` or `#rrggbb` (the `#` is optional).
    pub fn parse_hex(raw: &str) -> Option<Rgb> {
        let hex = raw.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let mut it = hex.chars().map(|c| channel(&format!("{c}{c}")));
                Some(Rgb(it.next()??, it.next()??, it.next()??))
            }
            6 => Some(Rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            _ => None,
        }
    }

    /// Blends `self` over `base` with the given opacity (0.0 – 1.0).
    pub fn over(self, base: Rgb, opacity: f32) -> Rgb {
        let a = opacity.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| (fg as f32 * a + bg as f32 * (1.0 - a)).round() as u8;
        Rgb(
            mix(self.0, base.0),
            mix(self.1, base.1),
            mix(self.2, base.2),
        )
    }
}

/// A named accent colour offered to the user.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ColorPreset {
    pub id: &'static str,
    pub name: &'static str,
    pub hex: &'static str,
}

pub const COLOR_PRESETS: [ColorPreset; 4] = [
    ColorPreset {
        id: "blue",
        name: "Blue",
        hex: "#2563eb",
    },
    ColorPreset {
        id: "green",
        name: "Green",
        hex: "#10b981",
    },
    ColorPreset {
        id: "gray",
        name: "Gray",
        hex: "#4b5563",
    },
    ColorPreset {
        id: "purple",
        name: "Purple",
        hex: "#7c3aed",
    },
];

/// Accent used when `primary_color` cannot be parsed.
pub const DEFAULT_ACCENT: Rgb = Rgb(0x25, 0x63, 0xeb);

// ────────────────────────────────────────────────────────────────────────────
// Style configuration
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleConfig {
    pub font_family: String,
    pub primary_color: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            font_family: FontChoice::Inter.id().to_string(),
            primary_color: COLOR_PRESETS[0].hex.to_string(),
        }
    }
}

impl StyleConfig {
    pub fn font(&self) -> FontChoice {
        FontChoice::from_id(&self.font_family)
    }

    pub fn accent(&self) -> Rgb {
        Rgb::parse_hex(&self.primary_color).unwrap_or(DEFAULT_ACCENT)
    }
}
