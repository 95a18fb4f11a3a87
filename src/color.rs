use crate::error::ColorError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(0xff, 0xff, 0xff);

    pub const fn hex(value: u32) -> Self {
        Rgb((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }

    pub fn parse(hex: &str) -> Result<Self, ColorError> {
        let digits = hex.trim_start_matches('#');
        if digits.len() != 6 {
            return Err(ColorError::Length(hex.to_string()));
        }
        u32::from_str_radix(digits, 16)
            .map(Rgb::hex)
            .map_err(|_| ColorError::Digits(hex.to_string()))
    }

    pub fn to_linear(self) -> [f32; 3] {
        [
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        ]
    }
}

/// Three shades a single shell draws its palette-coloured stars from.
pub type Palette = [Rgb; 3];

pub static PALETTES: [Palette; 3] = [
    // Amber
    [Rgb::hex(0xffaa00), Rgb::hex(0xff8800), Rgb::hex(0xffcc44)],
    // Ember red
    [Rgb::hex(0xff4422), Rgb::hex(0xff3300), Rgb::hex(0xff6633)],
    // Moonlight white
    [Rgb::hex(0xffffff), Rgb::hex(0xffffee), Rgb::hex(0xffffcc)],
];

/// Stepped cool-down shades for stars past their bloom.
pub const ORANGE_RAMP: [Rgb; 3] = [Rgb::hex(0xff8844), Rgb::hex(0xff6633), Rgb::hex(0xff4422)];

pub fn random_palette(rng: &mut fastrand::Rng) -> &'static Palette {
    &PALETTES[rng.usize(0..PALETTES.len())]
}

pub fn pick(palette: &Palette, rng: &mut fastrand::Rng) -> Rgb {
    palette[rng.usize(0..palette.len())]
}
