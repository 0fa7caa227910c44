//! 消耗品表
//!
//! 三種類型：
//! - Tarot: Arcana 包與商店
//! - Planet: Celestial 包與商店
//! - Spectral: Spectral 包（商店只在 Ghost 牌組出現）
//!
//! 池順序即 PRNG 索引契約。TheSoul 與 BlackHole 不進任何抽取池，
//! 只經由獨立的 soul 擲點出現在 Arcana / Spectral 包裡。

use super::joker::normalize;

/// Tarot 卡數量
pub const TAROT_COUNT: usize = 22;
/// Planet 卡數量
pub const PLANET_COUNT: usize = 12;
/// Spectral 卡數量（含 TheSoul / BlackHole）
pub const SPECTRAL_COUNT: usize = 18;

/// Tarot 卡 ID
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TarotId {
    TheFool,
    TheMagician,
    TheHighPriestess,
    TheEmpress,
    TheEmperor,
    TheHierophant,
    TheLovers,
    TheChariot,
    Justice,
    TheHermit,
    TheWheelOfFortune,
    Strength,
    TheHangedMan,
    Death,
    Temperance,
    TheDevil,
    TheTower,
    TheStar,
    TheMoon,
    TheSun,
    Judgement,
    TheWorld,
}

impl TarotId {
    /// 抽取池（全 22 張）
    pub fn all() -> &'static [TarotId] {
        &[
            TarotId::TheFool,
            TarotId::TheMagician,
            TarotId::TheHighPriestess,
            TarotId::TheEmpress,
            TarotId::TheEmperor,
            TarotId::TheHierophant,
            TarotId::TheLovers,
            TarotId::TheChariot,
            TarotId::Justice,
            TarotId::TheHermit,
            TarotId::TheWheelOfFortune,
            TarotId::Strength,
            TarotId::TheHangedMan,
            TarotId::Death,
            TarotId::Temperance,
            TarotId::TheDevil,
            TarotId::TheTower,
            TarotId::TheStar,
            TarotId::TheMoon,
            TarotId::TheSun,
            TarotId::Judgement,
            TarotId::TheWorld,
        ]
    }

    pub fn to_index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            TarotId::TheFool => "The Fool",
            TarotId::TheMagician => "The Magician",
            TarotId::TheHighPriestess => "The High Priestess",
            TarotId::TheEmpress => "The Empress",
            TarotId::TheEmperor => "The Emperor",
            TarotId::TheHierophant => "The Hierophant",
            TarotId::TheLovers => "The Lovers",
            TarotId::TheChariot => "The Chariot",
            TarotId::Justice => "Justice",
            TarotId::TheHermit => "The Hermit",
            TarotId::TheWheelOfFortune => "The Wheel of Fortune",
            TarotId::Strength => "Strength",
            TarotId::TheHangedMan => "The Hanged Man",
            TarotId::Death => "Death",
            TarotId::Temperance => "Temperance",
            TarotId::TheDevil => "The Devil",
            TarotId::TheTower => "The Tower",
            TarotId::TheStar => "The Star",
            TarotId::TheMoon => "The Moon",
            TarotId::TheSun => "The Sun",
            TarotId::Judgement => "Judgement",
            TarotId::TheWorld => "The World",
        }
    }

    pub fn from_name(name: &str) -> Option<TarotId> {
        let wanted = normalize(name);
        TarotId::all()
            .iter()
            .copied()
            .find(|t| normalize(t.name()) == wanted)
    }
}

/// Planet 卡 ID
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlanetId {
    Pluto,
    Mercury,
    Uranus,
    Venus,
    Saturn,
    Jupiter,
    Earth,
    Mars,
    Neptune,
    PlanetX,
    Ceres,
    Eris,
}

impl PlanetId {
    pub fn all() -> &'static [PlanetId] {
        &[
            PlanetId::Pluto,
            PlanetId::Mercury,
            PlanetId::Uranus,
            PlanetId::Venus,
            PlanetId::Saturn,
            PlanetId::Jupiter,
            PlanetId::Earth,
            PlanetId::Mars,
            PlanetId::Neptune,
            PlanetId::PlanetX,
            PlanetId::Ceres,
            PlanetId::Eris,
        ]
    }

    pub fn to_index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            PlanetId::Pluto => "Pluto",
            PlanetId::Mercury => "Mercury",
            PlanetId::Uranus => "Uranus",
            PlanetId::Venus => "Venus",
            PlanetId::Saturn => "Saturn",
            PlanetId::Jupiter => "Jupiter",
            PlanetId::Earth => "Earth",
            PlanetId::Mars => "Mars",
            PlanetId::Neptune => "Neptune",
            PlanetId::PlanetX => "Planet X",
            PlanetId::Ceres => "Ceres",
            PlanetId::Eris => "Eris",
        }
    }

    pub fn from_name(name: &str) -> Option<PlanetId> {
        let wanted = normalize(name);
        PlanetId::all()
            .iter()
            .copied()
            .find(|p| normalize(p.name()) == wanted)
    }
}

/// Spectral 卡 ID
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpectralId {
    Familiar,
    Grim,
    Incantation,
    Talisman,
    Aura,
    Wraith,
    Sigil,
    Ouija,
    Ectoplasm,
    Immolate,
    Ankh,
    DejaVu,
    Hex,
    Trance,
    Medium,
    Cryptid,
    TheSoul,
    BlackHole,
}

impl SpectralId {
    pub fn all() -> &'static [SpectralId] {
        &[
            SpectralId::Familiar,
            SpectralId::Grim,
            SpectralId::Incantation,
            SpectralId::Talisman,
            SpectralId::Aura,
            SpectralId::Wraith,
            SpectralId::Sigil,
            SpectralId::Ouija,
            SpectralId::Ectoplasm,
            SpectralId::Immolate,
            SpectralId::Ankh,
            SpectralId::DejaVu,
            SpectralId::Hex,
            SpectralId::Trance,
            SpectralId::Medium,
            SpectralId::Cryptid,
            SpectralId::TheSoul,
            SpectralId::BlackHole,
        ]
    }

    /// 一般抽取池（TheSoul / BlackHole 只從 soul 擲點出現）
    pub fn pool() -> &'static [SpectralId] {
        &Self::all()[..SPECTRAL_COUNT - 2]
    }

    pub fn to_index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            SpectralId::Familiar => "Familiar",
            SpectralId::Grim => "Grim",
            SpectralId::Incantation => "Incantation",
            SpectralId::Talisman => "Talisman",
            SpectralId::Aura => "Aura",
            SpectralId::Wraith => "Wraith",
            SpectralId::Sigil => "Sigil",
            SpectralId::Ouija => "Ouija",
            SpectralId::Ectoplasm => "Ectoplasm",
            SpectralId::Immolate => "Immolate",
            SpectralId::Ankh => "Ankh",
            SpectralId::DejaVu => "Deja Vu",
            SpectralId::Hex => "Hex",
            SpectralId::Trance => "Trance",
            SpectralId::Medium => "Medium",
            SpectralId::Cryptid => "Cryptid",
            SpectralId::TheSoul => "The Soul",
            SpectralId::BlackHole => "Black Hole",
        }
    }

    pub fn from_name(name: &str) -> Option<SpectralId> {
        let wanted = normalize(name);
        SpectralId::all()
            .iter()
            .copied()
            .find(|s| normalize(s.name()) == wanted)
    }
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        assert_eq!(TarotId::all().len(), TAROT_COUNT);
        assert_eq!(PlanetId::all().len(), PLANET_COUNT);
        assert_eq!(SpectralId::all().len(), SPECTRAL_COUNT);
    }

    #[test]
    fn test_spectral_pool_excludes_soul_cards() {
        assert!(!SpectralId::pool().contains(&SpectralId::TheSoul));
        assert!(!SpectralId::pool().contains(&SpectralId::BlackHole));
        assert_eq!(SpectralId::pool().len(), SPECTRAL_COUNT - 2);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(TarotId::from_name("the fool"), Some(TarotId::TheFool));
        assert_eq!(PlanetId::from_name("Planet X"), Some(PlanetId::PlanetX));
        assert_eq!(SpectralId::from_name("Deja Vu"), Some(SpectralId::DejaVu));
        assert_eq!(SpectralId::from_name("BlackHole"), Some(SpectralId::BlackHole));
    }

    #[test]
    fn test_index_order_matches_pool_order() {
        for (i, t) in TarotId::all().iter().enumerate() {
            assert_eq!(t.to_index(), i);
        }
        for (i, s) in SpectralId::all().iter().enumerate() {
            assert_eq!(s.to_index(), i);
        }
    }
}
