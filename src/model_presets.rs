//! Named `(feed, kill)` pairs for well known Gray-Scott regimes.

pub const VOLUME_CORAL: (f32, f32) = (0.0233, 0.07);
pub const BRAIN_CORAL: (f32, f32) = (0.0545, 0.062);
pub const MITOSIS: (f32, f32) = (0.0367, 0.0649);
pub const SOLITONS: (f32, f32) = (0.03, 0.062);
pub const WORMS: (f32, f32) = (0.078, 0.061);
pub const MAZE: (f32, f32) = (0.029, 0.057);
pub const SPOTS: (f32, f32) = (0.035, 0.065);
pub const CHAOS: (f32, f32) = (0.026, 0.051);

pub const ALL: [(&str, (f32, f32)); 8] = [
    ("volume_coral", VOLUME_CORAL),
    ("brain_coral", BRAIN_CORAL),
    ("mitosis", MITOSIS),
    ("solitons", SOLITONS),
    ("worms", WORMS),
    ("maze", MAZE),
    ("spots", SPOTS),
    ("chaos", CHAOS),
];

pub fn by_name(name: &str) -> Option<(f32, f32)> {
    let name = name.trim().to_ascii_lowercase().replace(['-', ' '], "_");
    ALL.iter()
        .find(|(preset, _)| *preset == name)
        .map(|&(_, params)| params)
}
