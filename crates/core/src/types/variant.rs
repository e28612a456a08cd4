//! Variant vocabulary: the closed sets of colors and sizes a shirt comes in.
//!
//! A [`VariantCatalog`] chooses which subset of the vocabulary the UI offers.
//! Persisted carts may hold any member of the full vocabulary.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a color, size or catalog name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseVariantError {
    #[error("unknown color: {0}")]
    Color(String),
    #[error("unknown size: {0}")]
    Size(String),
    #[error("unknown variant catalog: {0} (expected `full` or `compact`)")]
    Catalog(String),
}

/// Shirt colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
    Navy,
    Gray,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Pink,
}

impl Color {
    /// Every color, in palette order.
    pub const ALL: [Self; 10] = [
        Self::White,
        Self::Black,
        Self::Navy,
        Self::Gray,
        Self::Red,
        Self::Orange,
        Self::Yellow,
        Self::Green,
        Self::Blue,
        Self::Pink,
    ];

    /// Display name, identical to the persisted form.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::White => "White",
            Self::Black => "Black",
            Self::Navy => "Navy",
            Self::Gray => "Gray",
            Self::Red => "Red",
            Self::Orange => "Orange",
            Self::Yellow => "Yellow",
            Self::Green => "Green",
            Self::Blue => "Blue",
            Self::Pink => "Pink",
        }
    }

    /// Swatch fill color as a CSS hex string.
    #[must_use]
    pub const fn hex(self) -> &'static str {
        match self {
            Self::White => "#FFFFFF",
            Self::Black => "#000000",
            Self::Navy => "#1E3A8A",
            Self::Gray => "#6B7280",
            Self::Red => "#DC2626",
            Self::Orange => "#F97316",
            Self::Yellow => "#FCD34D",
            Self::Green => "#10B981",
            Self::Blue => "#3B82F6",
            Self::Pink => "#EC4899",
        }
    }

    /// Whether the swatch needs an outline to be visible on a white page.
    #[must_use]
    pub const fn needs_border(self) -> bool {
        matches!(self, Self::White)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Color {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseVariantError::Color(s.to_owned()))
    }
}

/// Shirt sizes, ordered smallest to largest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Size {
    #[serde(rename = "XS")]
    Xs,
    #[serde(rename = "S")]
    S,
    #[serde(rename = "M")]
    M,
    #[serde(rename = "L")]
    L,
    #[serde(rename = "XL")]
    Xl,
    #[serde(rename = "2XL", alias = "XXL")]
    Xxl,
}

impl Size {
    /// Every size, smallest first.
    pub const ALL: [Self; 6] = [Self::Xs, Self::S, Self::M, Self::L, Self::Xl, Self::Xxl];

    /// Display label, identical to the persisted form.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Xs => "XS",
            Self::S => "S",
            Self::M => "M",
            Self::L => "L",
            Self::Xl => "XL",
            Self::Xxl => "2XL",
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Size {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("XXL") {
            return Ok(Self::Xxl);
        }
        Self::ALL
            .into_iter()
            .find(|size| size.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseVariantError::Size(s.to_owned()))
    }
}

/// The colors and sizes the storefront offers when picking or editing a
/// variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantCatalog {
    colors: Vec<Color>,
    sizes: Vec<Size>,
}

impl VariantCatalog {
    /// The complete palette and size run.
    #[must_use]
    pub fn full() -> Self {
        Self {
            colors: Color::ALL.to_vec(),
            sizes: Size::ALL.to_vec(),
        }
    }

    /// A reduced palette for the quick-edit popup.
    #[must_use]
    pub fn compact() -> Self {
        Self {
            colors: vec![Color::Red, Color::Black, Color::White, Color::Blue],
            sizes: vec![Size::S, Size::M, Size::L, Size::Xl, Size::Xxl],
        }
    }

    /// Colors offered, in display order.
    #[must_use]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Sizes offered, smallest first.
    #[must_use]
    pub fn sizes(&self) -> &[Size] {
        &self.sizes
    }

    /// The color preselected on the dashboard.
    #[must_use]
    pub fn default_color(&self) -> Color {
        self.colors.first().copied().unwrap_or(Color::White)
    }

    /// The size preselected on the dashboard.
    #[must_use]
    pub fn default_size(&self) -> Size {
        if self.sizes.contains(&Size::M) {
            Size::M
        } else {
            self.sizes.first().copied().unwrap_or(Size::M)
        }
    }
}

impl Default for VariantCatalog {
    fn default() -> Self {
        Self::full()
    }
}

impl FromStr for VariantCatalog {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::full()),
            "compact" => Ok(Self::compact()),
            other => Err(ParseVariantError::Catalog(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_size_accepts_xxl_alias() {
        assert_eq!("XXL".parse::<Size>().unwrap(), Size::Xxl);
        assert_eq!("2xl".parse::<Size>().unwrap(), Size::Xxl);
        let from_json: Size = serde_json::from_str("\"XXL\"").unwrap();
        assert_eq!(from_json, Size::Xxl);
        assert_eq!(serde_json::to_string(&Size::Xxl).unwrap(), "\"2XL\"");
    }

    #[test]
    fn test_sizes_are_ordered() {
        let mut shuffled = vec![Size::Xl, Size::Xs, Size::Xxl, Size::M];
        shuffled.sort();
        assert_eq!(shuffled, vec![Size::Xs, Size::M, Size::Xl, Size::Xxl]);
    }

    #[test]
    fn test_color_parse_is_case_insensitive() {
        assert_eq!("navy".parse::<Color>().unwrap(), Color::Navy);
        assert_eq!(
            "Magenta".parse::<Color>(),
            Err(ParseVariantError::Color("Magenta".to_owned()))
        );
    }

    #[test]
    fn test_only_white_swatch_has_border() {
        let bordered: Vec<_> = Color::ALL.into_iter().filter(|c| c.needs_border()).collect();
        assert_eq!(bordered, vec![Color::White]);
    }

    #[test]
    fn test_catalog_from_str() {
        assert_eq!("full".parse::<VariantCatalog>().unwrap(), VariantCatalog::full());
        let compact: VariantCatalog = " Compact ".parse().unwrap();
        assert_eq!(compact.colors().len(), 4);
        assert!(!compact.sizes().contains(&Size::Xs));
        assert!("huge".parse::<VariantCatalog>().is_err());
    }

    #[test]
    fn test_catalog_defaults() {
        assert_eq!(VariantCatalog::full().default_color(), Color::White);
        assert_eq!(VariantCatalog::compact().default_color(), Color::Red);
        assert_eq!(VariantCatalog::compact().default_size(), Size::M);
    }
}
