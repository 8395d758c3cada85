use bevy::prelude::*;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Named colour scheme of the selection highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum SelectionTheme {
    Fire,
    Ice,
    Electric,
    Nature,
    Gold,
    #[default]
    Blood,
}

/// sRGB colours of one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPalette {
    pub particle: [u8; 3],
    pub glow: [u8; 3],
    pub base_glow: [u8; 3],
    pub card_glow: [u8; 3],
}

impl SelectionPalette {
    const fn new(particle: u32, glow: u32, base_glow: u32, card_glow: u32) -> Self {
        Self {
            particle: rgb(particle),
            glow: rgb(glow),
            base_glow: rgb(base_glow),
            card_glow: rgb(card_glow),
        }
    }

    pub fn particle_color(&self) -> Color {
        to_color(self.particle)
    }

    pub fn glow_color(&self) -> Color {
        to_color(self.glow)
    }

    pub fn base_glow_color(&self) -> Color {
        to_color(self.base_glow)
    }

    pub fn card_glow_color(&self) -> Color {
        to_color(self.card_glow)
    }
}

const fn rgb(hex: u32) -> [u8; 3] {
    [(hex >> 16) as u8, (hex >> 8) as u8, hex as u8]
}

fn to_color([r, g, b]: [u8; 3]) -> Color {
    Color::srgb_u8(r, g, b)
}

impl SelectionTheme {
    pub fn palette(self) -> SelectionPalette {
        match self {
            Self::Fire => SelectionPalette::new(0xff4400, 0xff0000, 0xff8800, 0xff6600),
            Self::Ice => SelectionPalette::new(0x88ddff, 0x0088ff, 0xaaccff, 0x66aaff),
            Self::Electric => SelectionPalette::new(0xffff00, 0x8800ff, 0xff00ff, 0xcc00ff),
            Self::Nature => SelectionPalette::new(0x44ff44, 0x88ff00, 0x00ff88, 0x66cc44),
            Self::Gold => SelectionPalette::new(0xffdd00, 0xff8800, 0xffaa44, 0xffcc66),
            Self::Blood => SelectionPalette::new(0xcc0000, 0x990000, 0x660000, 0x910101),
        }
    }

    /// The following theme, wrapping around.
    pub fn next(self) -> Self {
        let mut themes = Self::iter().cycle().skip_while(|theme| *theme != self);
        themes.nth(1).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_blood() {
        let palette = SelectionTheme::default().palette();
        assert_eq!(palette.card_glow, [0x91, 0x01, 0x01]);
        assert_eq!(palette.particle, [0xcc, 0x00, 0x00]);
    }

    #[test]
    fn next_cycles_through_all_themes() {
        let mut theme = SelectionTheme::Fire;
        let mut seen = vec![theme];
        for _ in 0..5 {
            theme = theme.next();
            seen.push(theme);
        }
        assert_eq!(seen, SelectionTheme::iter().collect::<Vec<_>>());
        assert_eq!(SelectionTheme::Blood.next(), SelectionTheme::Fire);
    }

    #[test]
    fn names_are_lowercase() {
        assert_eq!("electric".parse::<SelectionTheme>().unwrap(), SelectionTheme::Electric);
        assert_eq!(SelectionTheme::Gold.to_string(), "gold");
        assert!("Plasma".parse::<SelectionTheme>().is_err());
    }
}
