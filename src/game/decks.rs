//! 起始牌組
//!
//! 搜尋器只關心會改變生成流的牌組效果：目前只有 Ghost 牌組
//! 會讓 Spectral 卡出現在商店卡槽。

use super::joker::normalize;

/// 牌組類型
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DeckType {
    #[default]
    Red,
    Blue,
    Yellow,
    Green,
    Black,
    Magic,
    Nebula,
    Ghost,
    Abandoned,
    Checkered,
    Zodiac,
    Painted,
    Anaglyph,
    Plasma,
    Erratic,
}

impl DeckType {
    pub fn all() -> &'static [DeckType] {
        &[
            DeckType::Red,
            DeckType::Blue,
            DeckType::Yellow,
            DeckType::Green,
            DeckType::Black,
            DeckType::Magic,
            DeckType::Nebula,
            DeckType::Ghost,
            DeckType::Abandoned,
            DeckType::Checkered,
            DeckType::Zodiac,
            DeckType::Painted,
            DeckType::Anaglyph,
            DeckType::Plasma,
            DeckType::Erratic,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            DeckType::Red => "Red Deck",
            DeckType::Blue => "Blue Deck",
            DeckType::Yellow => "Yellow Deck",
            DeckType::Green => "Green Deck",
            DeckType::Black => "Black Deck",
            DeckType::Magic => "Magic Deck",
            DeckType::Nebula => "Nebula Deck",
            DeckType::Ghost => "Ghost Deck",
            DeckType::Abandoned => "Abandoned Deck",
            DeckType::Checkered => "Checkered Deck",
            DeckType::Zodiac => "Zodiac Deck",
            DeckType::Painted => "Painted Deck",
            DeckType::Anaglyph => "Anaglyph Deck",
            DeckType::Plasma => "Plasma Deck",
            DeckType::Erratic => "Erratic Deck",
        }
    }

    /// 由名稱解析；結尾的 "Deck" 可省略
    pub fn from_name(name: &str) -> Option<DeckType> {
        let mut wanted = normalize(name);
        if !wanted.ends_with("deck") {
            wanted.push_str("deck");
        }
        DeckType::all()
            .iter()
            .copied()
            .find(|d| normalize(d.name()) == wanted)
    }

    /// 商店 Spectral 權重（只有 Ghost 牌組非零，所有 ante 適用）
    pub fn shop_spectral_rate(self) -> f64 {
        if self == DeckType::Ghost {
            2.0
        } else {
            0.0
        }
    }
}

// ============================================================================
// 單元測試
// ============================================================================
