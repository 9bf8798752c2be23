use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Fixed chart colours
// ---------------------------------------------------------------------------

/// Personal bars above the cap.
pub const OVER_CAP_GREEN: Color32 = Color32::from_rgb(0, 128, 0);
/// Personal bars below the cap.
pub const UNDER_CAP_GREEN: Color32 = Color32::from_rgb(144, 238, 144);
/// World top-10 bars.
pub const WORLD_BAR_GREEN: Color32 = Color32::from_rgb(0x01, 0x50, 0x30);
/// Accent for headings and borders.
pub const ACCENT: Color32 = Color32::from_rgb(0x23, 0x8a, 0x6b);
pub const WHEAT: Color32 = Color32::from_rgb(245, 222, 179);

fn hsl_to_color32(hsl: Hsl) -> Color32 {
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Sequential green scale: count → Color32
// ---------------------------------------------------------------------------

/// Maps a count onto a light-to-dark green ramp, darkest at the largest count.
#[derive(Debug, Clone, Copy)]
pub struct GreenScale {
    max: u64,
}

impl GreenScale {
    const LIGHTEST: f32 = 0.88;
    const DARKEST: f32 = 0.22;

    pub fn new(counts: impl IntoIterator<Item = u64>) -> Self {
        GreenScale {
            max: counts.into_iter().max().unwrap_or(0),
        }
    }

    pub fn color_for(&self, count: u64) -> Color32 {
        let t = if self.max == 0 {
            0.0
        } else {
            (count.min(self.max) as f32) / (self.max as f32)
        };
        let lightness = Self::LIGHTEST + (Self::DARKEST - Self::LIGHTEST) * t;
        hsl_to_color32(Hsl::new(130.0, 0.55, lightness))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brightness(c: Color32) -> u32 {
        c.r() as u32 + c.g() as u32 + c.b() as u32
    }

    #[test]
    fn larger_counts_are_darker() {
        let scale = GreenScale::new([1, 5, 10]);
        let low = brightness(scale.color_for(1));
        let mid = brightness(scale.color_for(5));
        let high = brightness(scale.color_for(10));
        assert!(low > mid && mid > high);
    }

    #[test]
    fn empty_scale_does_not_divide_by_zero() {
        let scale = GreenScale::new(std::iter::empty());
        assert_eq!(scale.color_for(3), scale.color_for(0));
    }
}
