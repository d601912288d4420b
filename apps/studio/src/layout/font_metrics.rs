//! Static advance-width tables used by the flow layout to measure and wrap text.
//!
//! Widths are in em units (multiply by the font size in px). The tables approximate the real
//! faces closely enough to place line breaks where a browser would within a word or so; the
//! rasterizer draws whatever glyphs the loaded face actually has at those positions.
//! Index = (char as usize) - 32, covering ASCII 0x20..=0x7E.

use crate::models::style::FontChoice;

/// Width multiplier applied to bold runs.
pub const BOLD_FACTOR: f32 = 1.06;

/// Broad proportions shared by several of the offered fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricClass {
    /// Humanist sans (Inter, Roboto, Open Sans, Lato).
    Sans,
    /// Wide geometric sans (Montserrat, Raleway, Nunito).
    Geometric,
    /// Transitional and old-style serif (Lora, Merriweather, Playfair Display).
    Serif,
    Monospace,
}

impl MetricClass {
    pub fn of(font: FontChoice) -> Self {
        match font {
            FontChoice::Inter | FontChoice::Roboto | FontChoice::OpenSans | FontChoice::Lato => {
                MetricClass::Sans
            }
            FontChoice::Montserrat | FontChoice::Raleway | FontChoice::Nunito => {
                MetricClass::Geometric
            }
            FontChoice::Lora | FontChoice::Merriweather | FontChoice::PlayfairDisplay => {
                MetricClass::Serif
            }
            FontChoice::RobotoMono => MetricClass::Monospace,
        }
    }
}

pub struct FontMetricTable {
    widths: &'static [f32; 95],
    /// Multiplier over `widths`, so related classes share one table.
    scale: f32,
    /// Fallback width for characters outside printable ASCII.
    pub average_char_width: f32,
}

impl FontMetricTable {
    /// Width of `s` in em units at regular weight.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32] * self.scale
                } else {
                    self.average_char_width
                }
            })
            .sum()
    }

    /// Width of `s` in px at the given size and weight.
    pub fn measure_px(&self, s: &str, size_px: f32, bold: bool) -> f32 {
        let weight = if bold { BOLD_FACTOR } else { 1.0 };
        self.measure_str(s) * size_px * weight
    }

    /// Greedy word-wrap at `max_width_px`. A word wider than the line sits on its own line.
    pub fn wrap(&self, s: &str, max_width_px: f32, size_px: f32, bold: bool) -> Vec<String> {
        let mut lines = Vec::new();
        let space = self.measure_px(" ", size_px, bold);
        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in s.split_whitespace() {
            let word_w = self.measure_px(word, size_px, bold);
            if current.is_empty() {
                current.push_str(word);
                current_width = word_w;
            } else if current_width + space + word_w > max_width_px {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_width = word_w;
            } else {
                current.push(' ');
                current.push_str(word);
                current_width += space + word_w;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables
// ────────────────────────────────────────────────────────────────────────────

#[rustfmt::skip]
static PROPORTIONAL_WIDTHS: [f32; 95] = [
    // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
    0.25, 0.30, 0.38, 0.56, 0.56, 0.89, 0.67, 0.22, 0.33, 0.33, 0.39, 0.59, 0.28, 0.33, 0.28, 0.31,
    // 0     1     2     3     4     5     6     7     8     9
    0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56,
    // :     ;     <     =     >     ?     @
    0.28, 0.28, 0.59, 0.59, 0.59, 0.50, 1.02,
    // A     B     C     D     E     F     G     H     I     J     K     L     M
    0.67, 0.61, 0.61, 0.67, 0.56, 0.50, 0.67, 0.67, 0.25, 0.39, 0.61, 0.53, 0.78,
    // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
    0.67, 0.72, 0.56, 0.72, 0.61, 0.50, 0.56, 0.67, 0.67, 0.89, 0.61, 0.61, 0.56,
    // [     \     ]     ^     _     `
    0.28, 0.31, 0.28, 0.47, 0.56, 0.34,
    // a     b     c     d     e     f     g     h     i     j     k     l     m
    0.56, 0.56, 0.50, 0.56, 0.56, 0.31, 0.56, 0.56, 0.22, 0.22, 0.53, 0.22, 0.83,
    // n     o     p     q     r     s     t     u     v     w     x     y     z
    0.56, 0.56, 0.56, 0.56, 0.33, 0.44, 0.39, 0.56, 0.50, 0.72, 0.50, 0.50, 0.44,
    // {     |     }     ~
    0.33, 0.26, 0.33, 0.59,
];

static MONOSPACE_WIDTHS: [f32; 95] = [0.60; 95];

static SANS: FontMetricTable = FontMetricTable {
    widths: &PROPORTIONAL_WIDTHS,
    scale: 1.0,
    average_char_width: 0.52,
};

static GEOMETRIC: FontMetricTable = FontMetricTable {
    widths: &PROPORTIONAL_WIDTHS,
    scale: 1.08,
    average_char_width: 0.56,
};

static SERIF: FontMetricTable = FontMetricTable {
    widths: &PROPORTIONAL_WIDTHS,
    scale: 0.94,
    average_char_width: 0.49,
};

static MONOSPACE: FontMetricTable = FontMetricTable {
    widths: &MONOSPACE_WIDTHS,
    scale: 1.0,
    average_char_width: 0.60,
};

pub fn get_metrics(font: FontChoice) -> &'static FontMetricTable {
    match MetricClass::of(font) {
        MetricClass::Sans => &SANS,
        MetricClass::Geometric => &GEOMETRIC,
        MetricClass::Serif => &SERIF,
        MetricClass::Monospace => &MONOSPACE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_str_empty_returns_zero() {
        assert_eq!(get_metrics(FontChoice::Inter).measure_str(""), 0.0);
    }

    #[test]
    fn test_measure_str_ascii_characters() {
        // "Rust" = R(0.61) + u(0.56) + s(0.44) + t(0.39) = 2.00
        let width = get_metrics(FontChoice::Inter).measure_str("Rust");
        assert!((width - 2.00).abs() < 1e-3, "got {width}");
    }

    #[test]
    fn test_non_ascii_falls_back_to_average() {
        let metrics = get_metrics(FontChoice::Inter);
        assert!((metrics.measure_str("é") - metrics.average_char_width).abs() < 1e-4);
    }

    #[test]
    fn test_monospace_is_uniform() {
        let mono = get_metrics(FontChoice::RobotoMono);
        assert_eq!(mono.measure_str("iiii"), mono.measure_str("MMMM"));
    }

    #[test]
    fn test_bold_is_wider() {
        let m = get_metrics(FontChoice::Lato);
        assert!(m.measure_px("Engineer", 16.0, true) > m.measure_px("Engineer", 16.0, false));
    }

    #[test]
    fn test_every_font_has_a_table() {
        for font in FontChoice::ALL {
            assert!(get_metrics(font).measure_str("a") > 0.0);
        }
    }

    #[test]
    fn test_wrap_breaks_between_words_and_keeps_all_text() {
        let m = get_metrics(FontChoice::Inter);
        let text = "Architected a distributed caching layer using Redis and consistent hashing";
        let lines = m.wrap(text, 200.0, 14.0, false);
        assert!(lines.len() > 1);
        assert_eq!(lines.join(" "), text);
        for line in &lines[..lines.len() - 1] {
            assert!(m.measure_px(line, 14.0, false) <= 200.0);
        }
    }

    #[test]
    fn test_wrap_overlong_word_stays_whole() {
        let m = get_metrics(FontChoice::Inter);
        let lines = m.wrap("a supercalifragilisticexpialidocious b", 40.0, 14.0, false);
        assert_eq!(lines, vec!["a", "supercalifragilisticexpialidocious", "b"]);
    }

    #[test]
    fn test_wrap_blank_is_empty() {
        assert!(get_metrics(FontChoice::Inter)
            .wrap("   ", 100.0, 14.0, false)
            .is_empty());
    }
}
