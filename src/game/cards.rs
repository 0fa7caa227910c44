//! 卡牌和增強系統定義
//!
//! 搜尋器只需要生成面向的屬性：花色、點數、增強、封印、版本。

use super::joker::normalize;

/// 花色
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Suit {
    Spades,
    Hearts,
    Clubs,
    Diamonds,
}

impl Suit {
    pub fn all() -> &'static [Suit] {
        &[Suit::Spades, Suit::Hearts, Suit::Clubs, Suit::Diamonds]
    }

    pub fn to_index(self) -> usize {
        match self {
            Suit::Spades => 0,
            Suit::Hearts => 1,
            Suit::Clubs => 2,
            Suit::Diamonds => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Suit::Spades => "Spades",
            Suit::Hearts => "Hearts",
            Suit::Clubs => "Clubs",
            Suit::Diamonds => "Diamonds",
        }
    }

    pub fn from_name(name: &str) -> Option<Suit> {
        // 單數形式（"Club"）也接受
        match normalize(name).as_str() {
            "spades" | "spade" => Some(Suit::Spades),
            "hearts" | "heart" => Some(Suit::Hearts),
            "clubs" | "club" => Some(Suit::Clubs),
            "diamonds" | "diamond" => Some(Suit::Diamonds),
            _ => None,
        }
    }
}

/// 點數（Ace 高位，2 = 最小）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub fn all() -> &'static [Rank] {
        &[
            Rank::Two,
            Rank::Three,
            Rank::Four,
            Rank::Five,
            Rank::Six,
            Rank::Seven,
            Rank::Eight,
            Rank::Nine,
            Rank::Ten,
            Rank::Jack,
            Rank::Queen,
            Rank::King,
            Rank::Ace,
        ]
    }

    pub fn to_index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "Jack",
            Rank::Queen => "Queen",
            Rank::King => "King",
            Rank::Ace => "Ace",
        }
    }

    pub fn from_name(name: &str) -> Option<Rank> {
        match normalize(name).as_str() {
            "2" | "two" => Some(Rank::Two),
            "3" | "three" => Some(Rank::Three),
            "4" | "four" => Some(Rank::Four),
            "5" | "five" => Some(Rank::Five),
            "6" | "six" => Some(Rank::Six),
            "7" | "seven" => Some(Rank::Seven),
            "8" | "eight" => Some(Rank::Eight),
            "9" | "nine" => Some(Rank::Nine),
            "10" | "ten" | "t" => Some(Rank::Ten),
            "j" | "jack" => Some(Rank::Jack),
            "q" | "queen" => Some(Rank::Queen),
            "k" | "king" => Some(Rank::King),
            "a" | "ace" => Some(Rank::Ace),
            _ => None,
        }
    }
}

/// 卡片增強類型
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
pub enum Enhancement {
    #[default]
    None,
    Bonus,
    Mult,
    Wild,
    Glass,
    Steel,
    Stone,
    Gold,
    Lucky,
}

impl Enhancement {
    /// 標準包增強池（順序即 PRNG 索引契約）
    pub fn pack_pool() -> &'static [Enhancement] {
        &[
            Enhancement::Bonus,
            Enhancement::Mult,
            Enhancement::Wild,
            Enhancement::Glass,
            Enhancement::Steel,
            Enhancement::Stone,
            Enhancement::Gold,
            Enhancement::Lucky,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            Enhancement::None => "None",
            Enhancement::Bonus => "Bonus",
            Enhancement::Mult => "Mult",
            Enhancement::Wild => "Wild",
            Enhancement::Glass => "Glass",
            Enhancement::Steel => "Steel",
            Enhancement::Stone => "Stone",
            Enhancement::Gold => "Gold",
            Enhancement::Lucky => "Lucky",
        }
    }

    pub fn from_name(name: &str) -> Option<Enhancement> {
        match normalize(name).as_str() {
            "none" => Some(Enhancement::None),
            "bonus" => Some(Enhancement::Bonus),
            "mult" => Some(Enhancement::Mult),
            "wild" => Some(Enhancement::Wild),
            "glass" => Some(Enhancement::Glass),
            "steel" => Some(Enhancement::Steel),
            "stone" => Some(Enhancement::Stone),
            "gold" => Some(Enhancement::Gold),
            "lucky" => Some(Enhancement::Lucky),
            _ => None,
        }
    }
}

/// 卡片封印類型
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
pub enum Seal {
    #[default]
    None,
    Gold,
    Red,
    Blue,
    Purple,
}

impl Seal {
    /// 封印池（順序即 PRNG 索引契約）
    pub fn pool() -> &'static [Seal] {
        &[Seal::Gold, Seal::Red, Seal::Blue, Seal::Purple]
    }

    pub fn name(self) -> &'static str {
        match self {
            Seal::None => "None",
            Seal::Gold => "Gold",
            Seal::Red => "Red",
            Seal::Blue => "Blue",
            Seal::Purple => "Purple",
        }
    }

    pub fn from_name(name: &str) -> Option<Seal> {
        match normalize(name).as_str() {
            "none" => Some(Seal::None),
            "gold" | "goldseal" => Some(Seal::Gold),
            "red" | "redseal" => Some(Seal::Red),
            "blue" | "blueseal" => Some(Seal::Blue),
            "purple" | "purpleseal" => Some(Seal::Purple),
            _ => None,
        }
    }
}

/// 版本
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
pub enum Edition {
    #[default]
    None,
    Foil,
    Holographic,
    Polychrome,
    Negative,
}

impl Edition {
    pub fn name(self) -> &'static str {
        match self {
            Edition::None => "None",
            Edition::Foil => "Foil",
            Edition::Holographic => "Holographic",
            Edition::Polychrome => "Polychrome",
            Edition::Negative => "Negative",
        }
    }

    pub fn from_name(name: &str) -> Option<Edition> {
        match normalize(name).as_str() {
            "none" | "base" => Some(Edition::None),
            "foil" => Some(Edition::Foil),
            "holographic" | "holo" => Some(Edition::Holographic),
            "polychrome" | "poly" => Some(Edition::Polychrome),
            "negative" => Some(Edition::Negative),
            _ => None,
        }
    }
}

/// 生成出來的一張撲克牌（標準包內容的輸出單位）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CardItem {
    pub rank: Rank,
    pub suit: Suit,
    pub enhancement: Enhancement,
    pub edition: Edition,
    pub seal: Seal,
}

impl CardItem {
    pub fn plain(rank: Rank, suit: Suit) -> Self {
        Self {
            rank,
            suit,
            enhancement: Enhancement::None,
            edition: Edition::None,
            seal: Seal::None,
        }
    }

    /// 52 張基礎牌的索引（花色 * 13 + 點數），即 front 抽取的池序
    pub fn from_deck_index(index: usize) -> CardItem {
        let suit = Suit::all()[index / 13];
        let rank = Rank::all()[index % 13];
        CardItem::plain(rank, suit)
    }
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suit_rank_parse() {
        assert_eq!(Suit::from_name("Clubs"), Some(Suit::Clubs));
        assert_eq!(Suit::from_name("club"), Some(Suit::Clubs));
        assert_eq!(Rank::from_name("7"), Some(Rank::Seven));
        assert_eq!(Rank::from_name("Seven"), Some(Rank::Seven));
        assert_eq!(Rank::from_name("ace"), Some(Rank::Ace));
        assert_eq!(Rank::from_name("14"), None);
    }

    #[test]
    fn test_edition_parse() {
        assert_eq!(Edition::from_name("Polychrome"), Some(Edition::Polychrome));
        assert_eq!(Edition::from_name("holo"), Some(Edition::Holographic));
        assert_eq!(Edition::from_name("base"), Some(Edition::None));
    }

    #[test]
    fn test_deck_index() {
        // 0..52 覆蓋整副牌，不重複
        let mut seen = std::collections::HashSet::new();
        for i in 0..52 {
            let c = CardItem::from_deck_index(i);
            assert!(seen.insert((c.rank, c.suit)));
        }
        assert_eq!(CardItem::from_deck_index(0).suit, Suit::Spades);
        assert_eq!(CardItem::from_deck_index(0).rank, Rank::Two);
    }
}
