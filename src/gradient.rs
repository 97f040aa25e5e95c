use crate::utils::{Interpolate, Rgb, map_t_of_range_a_to_range_b};
use itertools::Itertools;

type TColor = (f32, Rgb);

#[derive(Debug, Clone, PartialEq)]
struct Spectrum(Vec<TColor>);

impl Spectrum {
    fn from_colors(color_a: Rgb, color_b: Rgb) -> Self {
        Self(vec![(0.0, color_a), (1.0, color_b)])
    }

    fn add_color_at_t(&mut self, t: f32, color: Rgb) {
        self.0.push((t.clamp(0.0, 1.0), color));
        self.0.sort_by(|a, b| a.0.total_cmp(&b.0));
    }

    fn color_at_t(&self, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let (before, after) = self.bounding_colors_for_t(t);
        if after.0 <= before.0 {
            return after.1;
        }
        let mapped_t = map_t_of_range_a_to_range_b(t, before.0..after.0, 0.0..1.0);

        before.1.interpolate(&after.1, mapped_t)
    }

    fn bounding_colors_for_t(&self, t: f32) -> (TColor, TColor) {
        match self.0.iter().find_position(|(color_t, _)| *color_t >= t) {
            Some((0, &upper)) => (upper, upper),
            Some((position, &upper)) => (self.0[position - 1], upper),
            None => {
                let last = self.0[self.0.len() - 1];
                (last, last)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct GradientLut([Rgb; 256]);

impl From<&Spectrum> for GradientLut {
    fn from(spectrum: &Spectrum) -> Self {
        let mut lut = [[0u8; 3]; 256];
        for (i, color) in lut.iter_mut().enumerate() {
            *color = spectrum.color_at_t(i as f32 / 255.0);
        }

        GradientLut(lut)
    }
}

/// A colour ramp over `[0, 1]` backed by a 256 entry lookup table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorGradient {
    spectrum: Spectrum,
    lut: GradientLut,
}

impl ColorGradient {
    pub fn from_colors(color_a: Rgb, color_b: Rgb) -> Self {
        let spectrum = Spectrum::from_colors(color_a, color_b);

        Self {
            lut: (&spectrum).into(),
            spectrum,
        }
    }

    pub fn add_color_at_t(&mut self, t: f32, color: Rgb) {
        self.spectrum.add_color_at_t(t, color);
        self.lut = (&self.spectrum).into();
    }

    /// Looks up `t`, clamped to `[0, 1]`. NaN maps to the start of the ramp.
    pub fn color_at_t(&self, t: f32) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        self.lut.0[(t * 255.0).round() as usize]
    }

    /// The same colour as [`color_at_t`](Self::color_at_t) with channels in `[0, 1]`.
    pub fn linear_at_t(&self, t: f32) -> [f32; 3] {
        self.color_at_t(t).map(|c| f32::from(c) / 255.0)
    }
}
