use serde::Serialize;

/// A colour sticker pack as it is seeded into an empty store.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Palette {
    pub name: &'static str,
    pub description: &'static str,
    pub colors: &'static [&'static str],
}

pub const DEFAULT_PALETTE: Palette = Palette {
    name: "기본 컬러팩",
    description: "기본 색상 스티커 팩",
    colors: &[
        "#FADADD", "#FFE4E1", "#FFB6C1", "#FFBCD9", "#FFCBDB", "#FFDDE2", "#EDCDC2", "#FFDAB9",
        "#FFE5B4", "#FBCEB1", "#F8B878", "#F7E7CE",
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_palette_colors_are_hex() {
        assert_eq!(DEFAULT_PALETTE.colors.len(), 12);
        for color in DEFAULT_PALETTE.colors {
            assert_eq!(color.len(), 7, "{color}");
            assert!(color.starts_with('#'));
            assert!(color[1..].chars().all(|c| c.is_ascii_hexdigit()), "{color}");
        }
    }
}
