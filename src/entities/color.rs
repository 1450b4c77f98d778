//! Card color codes shared by the master catalog and the ledgers.
//!
//! Colors are persisted as one-letter codes (`"R"`, `"B"`, ...). Multi-color
//! cards collapse to the single `M` marker; cards with no color are stored as
//! `U` (universal/colorless).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The color of a card, stored as a one-letter code.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(1))")]
pub enum CardColor {
    /// Red (`R`)
    #[sea_orm(string_value = "R")]
    Red,
    /// Blue (`B`)
    #[sea_orm(string_value = "B")]
    Blue,
    /// Green (`G`)
    #[sea_orm(string_value = "G")]
    Green,
    /// Yellow (`Y`)
    #[sea_orm(string_value = "Y")]
    Yellow,
    /// Purple (`P`)
    #[sea_orm(string_value = "P")]
    Purple,
    /// Orange (`O`)
    #[sea_orm(string_value = "O")]
    Orange,
    /// Universal / colorless (`U`)
    #[sea_orm(string_value = "U")]
    Universal,
    /// Multicolor (`M`)
    #[sea_orm(string_value = "M")]
    Multicolor,
}

impl CardColor {
    /// The one-letter code this color is persisted and exported as.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Red => "R",
            Self::Blue => "B",
            Self::Green => "G",
            Self::Yellow => "Y",
            Self::Purple => "P",
            Self::Orange => "O",
            Self::Universal => "U",
            Self::Multicolor => "M",
        }
    }

    /// Parses a one-letter color code, ignoring case and surrounding
    /// whitespace. Returns `None` for anything that is not a known code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "R" => Some(Self::Red),
            "B" => Some(Self::Blue),
            "G" => Some(Self::Green),
            "Y" => Some(Self::Yellow),
            "P" => Some(Self::Purple),
            "O" => Some(Self::Orange),
            "U" => Some(Self::Universal),
            "M" => Some(Self::Multicolor),
            _ => None,
        }
    }
}

impl std::fmt::Display for CardColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_round_trips_for_every_color() {
        for color in [
            CardColor::Red,
            CardColor::Blue,
            CardColor::Green,
            CardColor::Yellow,
            CardColor::Purple,
            CardColor::Orange,
            CardColor::Universal,
            CardColor::Multicolor,
        ] {
            assert_eq!(CardColor::from_code(color.code()), Some(color));
        }
    }

    #[test]
    fn from_code_ignores_case_and_whitespace() {
        assert_eq!(CardColor::from_code(" r "), Some(CardColor::Red));
        assert_eq!(CardColor::from_code("m"), Some(CardColor::Multicolor));
    }

    #[test]
    fn from_code_rejects_unknown_codes() {
        assert_eq!(CardColor::from_code("X"), None);
        assert_eq!(CardColor::from_code(""), None);
        assert_eq!(CardColor::from_code("RB"), None);
    }
}
