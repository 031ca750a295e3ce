use colored::Color;

pub const PRIMARY: Color = Color::TrueColor {
    r: 129,
    g: 200,
    b: 255,
};
pub const ACCENT: Color = Color::TrueColor {
    r: 255,
    g: 196,
    b: 87,
};
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::TrueColor {
    r: 220,
    g: 220,
    b: 220,
};
pub const MODEL: Color = Color::TrueColor {
    r: 196,
    g: 160,
    b: 255,
};
pub const PORT: Color = Color::TrueColor {
    r: 255,
    g: 140,
    b: 120,
};
