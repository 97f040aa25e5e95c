use crate::gradient::ColorGradient;

pub fn new_pink_and_blue() -> ColorGradient {
    let mut gradient = ColorGradient::from_colors([0, 0, 0], [255, 255, 255]);
    gradient.add_color_at_t(0.80, [0, 20, 230]);
    gradient.add_color_at_t(0.63, [200, 0, 255]);
    gradient.add_color_at_t(0.60, [255, 0, 0]);
    gradient.add_color_at_t(0.53, [0, 255, 255]);
    gradient.add_color_at_t(0.40, [0, 0, 0]);

    gradient
}

pub fn new_inferno() -> ColorGradient {
    let mut gradient = ColorGradient::from_colors([0, 0, 4], [252, 255, 164]);
    gradient.add_color_at_t(0.25, [87, 16, 110]);
    gradient.add_color_at_t(0.50, [188, 55, 84]);
    gradient.add_color_at_t(0.75, [249, 142, 9]);

    gradient
}

/// Dim teal for traces of inhibitor up to white at full concentration.
pub fn new_inhibitor() -> ColorGradient {
    let mut gradient = ColorGradient::from_colors([20, 60, 90], [255, 255, 255]);
    gradient.add_color_at_t(0.3, [40, 170, 200]);
    gradient.add_color_at_t(0.6, [250, 200, 80]);

    gradient
}

pub fn by_name(name: &str) -> Option<ColorGradient> {
    match name.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
        "pink_and_blue" | "pink" => Some(new_pink_and_blue()),
        "inferno" => Some(new_inferno()),
        "inhibitor" => Some(new_inhibitor()),
        _ => None,
    }
}
