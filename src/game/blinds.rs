//! Boss Blind 表
//!
//! 每個 ante 一個 Boss。一般 Boss 有最低 ante 門檻；每逢 8 的倍數
//! ante 改從決戰（showdown）池抽取。Boss 流在整個種子期間共用
//! 同一個 used 集合：抽過的 Boss 在池耗盡前不會重複。

use super::joker::normalize;

/// Boss Blind 數量（23 一般 + 5 決戰）
pub const BOSS_COUNT: usize = 28;

const SHOWDOWN_BASE: usize = 23;

/// Boss Blind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BossBlind {
    // ========== 一般 (0..=22)，池順序即 PRNG 索引契約 ==========
    TheHook = 0,
    TheOx = 1,
    TheHouse = 2,
    TheWall = 3,
    TheWheel = 4,
    TheArm = 5,
    TheClub = 6,
    TheFish = 7,
    ThePsychic = 8,
    TheGoad = 9,
    TheWater = 10,
    TheWindow = 11,
    TheManacle = 12,
    TheEye = 13,
    TheMouth = 14,
    ThePlant = 15,
    TheSerpent = 16,
    ThePillar = 17,
    TheNeedle = 18,
    TheHead = 19,
    TheTooth = 20,
    TheFlint = 21,
    TheMark = 22,

    // ========== 決戰 (23..=27)，ante 8 的倍數 ==========
    AmberAcorn = 23,
    CeruleanBell = 24,
    CrimsonHeart = 25,
    VerdantLeaf = 26,
    VioletVessel = 27,
}

impl BossBlind {
    pub fn to_index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<BossBlind> {
        if index < BOSS_COUNT {
            Some(unsafe { std::mem::transmute::<u8, BossBlind>(index as u8) })
        } else {
            None
        }
    }

    pub fn is_showdown(self) -> bool {
        self.to_index() >= SHOWDOWN_BASE
    }

    /// 一般 Boss 的最低出現 ante
    pub fn min_ante(self) -> u8 {
        match self {
            BossBlind::TheHook
            | BossBlind::TheClub
            | BossBlind::ThePsychic
            | BossBlind::TheGoad
            | BossBlind::TheWindow
            | BossBlind::TheManacle
            | BossBlind::ThePillar
            | BossBlind::TheHead => 1,
            BossBlind::TheHouse
            | BossBlind::TheWall
            | BossBlind::TheWheel
            | BossBlind::TheArm
            | BossBlind::TheFish
            | BossBlind::TheWater
            | BossBlind::TheMouth
            | BossBlind::TheNeedle
            | BossBlind::TheFlint
            | BossBlind::TheMark => 2,
            BossBlind::TheEye | BossBlind::TheTooth => 3,
            BossBlind::ThePlant => 4,
            BossBlind::TheSerpent => 5,
            BossBlind::TheOx => 6,
            // 決戰 Boss 不看門檻
            _ => 8,
        }
    }

    /// 一般池（順序即 PRNG 索引契約）
    pub fn regular_pool() -> impl ExactSizeIterator<Item = BossBlind> + Clone {
        (0..SHOWDOWN_BASE).map(|i| BossBlind::from_index(i).unwrap())
    }

    /// 決戰池
    pub fn showdown_pool() -> impl ExactSizeIterator<Item = BossBlind> + Clone {
        (SHOWDOWN_BASE..BOSS_COUNT).map(|i| BossBlind::from_index(i).unwrap())
    }

    /// 該 ante 是否從決戰池抽取
    pub fn ante_is_showdown(ante: u8) -> bool {
        ante != 0 && ante % 8 == 0
    }

    pub fn name(self) -> &'static str {
        match self {
            BossBlind::TheHook => "The Hook",
            BossBlind::TheOx => "The Ox",
            BossBlind::TheHouse => "The House",
            BossBlind::TheWall => "The Wall",
            BossBlind::TheWheel => "The Wheel",
            BossBlind::TheArm => "The Arm",
            BossBlind::TheClub => "The Club",
            BossBlind::TheFish => "The Fish",
            BossBlind::ThePsychic => "The Psychic",
            BossBlind::TheGoad => "The Goad",
            BossBlind::TheWater => "The Water",
            BossBlind::TheWindow => "The Window",
            BossBlind::TheManacle => "The Manacle",
            BossBlind::TheEye => "The Eye",
            BossBlind::TheMouth => "The Mouth",
            BossBlind::ThePlant => "The Plant",
            BossBlind::TheSerpent => "The Serpent",
            BossBlind::ThePillar => "The Pillar",
            BossBlind::TheNeedle => "The Needle",
            BossBlind::TheHead => "The Head",
            BossBlind::TheTooth => "The Tooth",
            BossBlind::TheFlint => "The Flint",
            BossBlind::TheMark => "The Mark",
            BossBlind::AmberAcorn => "Amber Acorn",
            BossBlind::CeruleanBell => "Cerulean Bell",
            BossBlind::CrimsonHeart => "Crimson Heart",
            BossBlind::VerdantLeaf => "Verdant Leaf",
            BossBlind::VioletVessel => "Violet Vessel",
        }
    }

    pub fn from_name(name: &str) -> Option<BossBlind> {
        let wanted = normalize(name);
        (0..BOSS_COUNT)
            .map(|i| BossBlind::from_index(i).unwrap())
            .find(|b| normalize(b.name()) == wanted)
    }
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pools_partition() {
        assert_eq!(BossBlind::regular_pool().len() + BossBlind::showdown_pool().len(), BOSS_COUNT);
        assert!(BossBlind::regular_pool().all(|b| !b.is_showdown()));
        assert!(BossBlind::showdown_pool().all(|b| b.is_showdown()));
    }

    #[test]
    fn test_showdown_antes() {
        assert!(!BossBlind::ante_is_showdown(1));
        assert!(!BossBlind::ante_is_showdown(7));
        assert!(BossBlind::ante_is_showdown(8));
        assert!(BossBlind::ante_is_showdown(16));
        assert!(!BossBlind::ante_is_showdown(0));
    }

    #[test]
    fn test_min_ante_examples() {
        assert_eq!(BossBlind::TheHook.min_ante(), 1);
        assert_eq!(BossBlind::TheOx.min_ante(), 6);
        assert_eq!(BossBlind::TheSerpent.min_ante(), 5);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(BossBlind::from_name("The Wall"), Some(BossBlind::TheWall));
        assert_eq!(BossBlind::from_name("violetvessel"), Some(BossBlind::VioletVessel));
        assert_eq!(BossBlind::from_name("nothing"), None);
    }
}
