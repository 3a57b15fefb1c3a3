use serde::{Deserialize, Serialize};

use crate::types::CardId;

/// A catalog row as stored and as served to clients.
///
/// JSON keys follow the existing client contract (`nom`, `type`,
/// `frameType`, ...), column names follow the `cards` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct Card {
    /// Primary key.
    pub id: CardId,
    /// Every other column.
    #[serde(flatten)]
    #[cfg_attr(feature = "database", sqlx(flatten))]
    pub fields: CardFields,
}

/// Every mutable column of a card.
///
/// Used both as the body of a full update and as the payload of [`Card`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct CardFields {
    /// Card name, searched by substring.
    #[serde(rename = "nom")]
    pub name: String,
    /// Category such as `Spell Card` or `Effect Monster`.
    #[serde(rename = "type")]
    pub card_type: String,
    /// Frame style.
    #[serde(rename = "frameType", default)]
    pub frame_type: Option<String>,
    /// Rules text.
    #[serde(default)]
    pub description: Option<String>,
    /// Monster race or spell/trap subtype.
    #[serde(default)]
    pub race: Option<String>,
    /// Archetype.
    #[serde(default)]
    pub archetype: Option<String>,
    /// Link to the card on the reference database.
    #[serde(rename = "ygoprodeck_url", default)]
    pub reference_url: Option<String>,
    /// Set name.
    #[serde(default)]
    pub set_name: Option<String>,
    /// Set code.
    #[serde(default)]
    pub set_code: Option<String>,
    /// Rarity within the set; filtered by exact match.
    #[serde(default)]
    pub set_rarity: Option<String>,
    /// Set price; the price sort key.
    #[serde(default)]
    pub set_price: Option<f64>,
    /// Cardmarket price.
    #[serde(default)]
    pub cardmarket_price: Option<f64>,
    /// TCGplayer price.
    #[serde(default)]
    pub tcgplayer_price: Option<f64>,
    /// eBay price.
    #[serde(default)]
    pub ebay_price: Option<f64>,
    /// Amazon price.
    #[serde(default)]
    pub amazon_price: Option<f64>,
    /// CoolStuffInc price.
    #[serde(default)]
    pub coolstuffinc_price: Option<f64>,
    /// Card artwork URL.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Monster attack; `None` for spells and traps.
    #[serde(rename = "atk", default)]
    pub attack: Option<i32>,
    /// Monster defense.
    #[serde(rename = "def", default)]
    pub defense: Option<i32>,
    /// Monster level or rank.
    #[serde(default)]
    pub level: Option<i32>,
    /// Monster attribute.
    #[serde(default)]
    pub attribute: Option<String>,
}

impl CardFields {
    /// A card with only the two required columns set.
    pub fn new(name: impl Into<String>, card_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            card_type: card_type.into(),
            ..Self::default()
        }
    }
}
