use std::ops::{Add, Div, Mul, Range, Sub};

pub fn wrap_coord(c: isize, extent: usize) -> usize {
    c.rem_euclid(extent as isize) as usize
}

pub fn clamp_coord(c: isize, extent: usize) -> usize {
    c.clamp(0, extent as isize - 1) as usize
}

pub fn get_wrapping_index(
    x: isize,
    y: isize,
    z: isize,
    width: usize,
    height: usize,
    depth: usize,
) -> usize {
    let (x, y, z) = (
        wrap_coord(x, width),
        wrap_coord(y, height),
        wrap_coord(z, depth),
    );
    (z * height + y) * width + x
}

pub fn get_clamped_index(
    x: isize,
    y: isize,
    z: isize,
    width: usize,
    height: usize,
    depth: usize,
) -> usize {
    let (x, y, z) = (
        clamp_coord(x, width),
        clamp_coord(y, height),
        clamp_coord(z, depth),
    );
    (z * height + y) * width + x
}

pub fn map_t_of_range_a_to_range_b<T>(t: T, range_a: Range<T>, range_b: Range<T>) -> T
where
    T: Copy + Sub<Output = T> + Div<Output = T> + Add<Output = T> + Mul<Output = T>,
{
    let slope = (range_b.end - range_b.start) / (range_a.end - range_a.start);
    range_b.start + slope * (t - range_a.start)
}

pub trait Interpolate {
    fn interpolate(&self, other: &Self, t: f32) -> Self;
}

pub type Rgb = [u8; 3];

impl Interpolate for Rgb {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        let [r1, g1, b1] = self;
        let [r2, g2, b2] = other;

        [
            r1.interpolate(r2, t),
            g1.interpolate(g2, t),
            b1.interpolate(b2, t),
        ]
    }
}

impl Interpolate for u8 {
    fn interpolate(&self, other: &Self, t: f32) -> u8 {
        if self == other {
            *self
        } else {
            (f32::from(*self) * (1.0 - t) + f32::from(*other) * t).round() as u8
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_wrapping_index() {
        let (w, h, d) = (3, 4, 2);

        assert_eq!(0, get_wrapping_index(0, 0, 0, w, h, d));
        assert_eq!(0, get_wrapping_index(3, 0, 0, w, h, d));
        assert_eq!(0, get_wrapping_index(3, 4, 2, w, h, d));
        assert_eq!(6, get_wrapping_index(6, 2, 0, w, h, d));
        assert_eq!(7, get_wrapping_index(-2, -2, 0, w, h, d));
        assert_eq!(19, get_wrapping_index(-2, -2, -1, w, h, d));
        assert_eq!(7, get_wrapping_index(-2456, 562, 8, w, h, d));
    }

    #[test]
    fn test_get_clamped_index() {
        let (w, h, d) = (3, 4, 2);

        assert_eq!(0, get_clamped_index(-1, -5, -1, w, h, d));
        assert_eq!(2, get_clamped_index(7, 0, 0, w, h, d));
        assert_eq!(23, get_clamped_index(100, 100, 100, w, h, d));
        assert_eq!(13, get_clamped_index(1, 0, 1, w, h, d));
    }

    #[test]
    fn test_map_range() {
        assert_eq!(0.5, map_t_of_range_a_to_range_b(0.75, 0.5..1.0, 0.0..1.0));
        assert_eq!(10.0, map_t_of_range_a_to_range_b(1.0, 0.0..1.0, 0.0..10.0));
    }

    #[test]
    fn test_interpolate_rgb() {
        let a: Rgb = [0, 100, 255];
        let b: Rgb = [255, 100, 0];
        assert_eq!([128, 100, 128], a.interpolate(&b, 0.5));
        assert_eq!(a, a.interpolate(&b, 0.0));
    }
}
