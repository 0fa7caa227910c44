//! Voucher 表
//!
//! 16 組基礎/升級對。升級版只有在基礎版已啟用時才會出現在
//! Voucher 流裡；Hieroglyph / Petroglyph 作為 ante 首張 Voucher
//! 出現時會額外從同一條流多抽一張（bonus voucher）。
//!
//! 索引配置：0..=15 基礎，16..=31 升級，`upgrade = base + 16`。
//! 池順序即 PRNG 索引契約。

use super::joker::normalize;

/// Voucher 數量
pub const VOUCHER_COUNT: usize = 32;

const UPGRADE_OFFSET: usize = 16;

/// Voucher ID
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum VoucherId {
    // ========== 基礎 (0..=15) ==========
    Overstock = 0,
    ClearanceSale = 1,
    Hone = 2,
    RerollSurplus = 3,
    CrystalBall = 4,
    Telescope = 5,
    Grabber = 6,
    Wasteful = 7,
    TarotMerchant = 8,
    PlanetMerchant = 9,
    SeedMoney = 10,
    Blank = 11,
    MagicTrick = 12,
    Hieroglyph = 13,
    DirectorsCut = 14,
    PaintBrush = 15,

    // ========== 升級 (16..=31，需要基礎版) ==========
    OverstockPlus = 16,
    Liquidation = 17,
    GlowUp = 18,
    RerollGlut = 19,
    OmenGlobe = 20,
    Observatory = 21,
    NachoTong = 22,
    Recyclomancy = 23,
    TarotTycoon = 24,
    PlanetTycoon = 25,
    MoneyTree = 26,
    Antimatter = 27,
    Illusion = 28,
    Petroglyph = 29,
    Retcon = 30,
    Palette = 31,
}

impl VoucherId {
    pub fn to_index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<VoucherId> {
        if index < VOUCHER_COUNT {
            Some(unsafe { std::mem::transmute::<u8, VoucherId>(index as u8) })
        } else {
            None
        }
    }

    pub fn is_upgrade(self) -> bool {
        self.to_index() >= UPGRADE_OFFSET
    }

    /// 升級版的前置需求
    pub fn prerequisite(self) -> Option<VoucherId> {
        if self.is_upgrade() {
            VoucherId::from_index(self.to_index() - UPGRADE_OFFSET)
        } else {
            None
        }
    }

    /// 基礎版的升級版本
    pub fn upgrade(self) -> Option<VoucherId> {
        if self.is_upgrade() {
            None
        } else {
            VoucherId::from_index(self.to_index() + UPGRADE_OFFSET)
        }
    }

    /// 作為 ante 首張 Voucher 出現時，是否贈送 bonus voucher
    pub fn grants_bonus_voucher(self) -> bool {
        matches!(self, VoucherId::Hieroglyph | VoucherId::Petroglyph)
    }

    pub fn name(self) -> &'static str {
        match self {
            VoucherId::Overstock => "Overstock",
            VoucherId::ClearanceSale => "Clearance Sale",
            VoucherId::Hone => "Hone",
            VoucherId::RerollSurplus => "Reroll Surplus",
            VoucherId::CrystalBall => "Crystal Ball",
            VoucherId::Telescope => "Telescope",
            VoucherId::Grabber => "Grabber",
            VoucherId::Wasteful => "Wasteful",
            VoucherId::TarotMerchant => "Tarot Merchant",
            VoucherId::PlanetMerchant => "Planet Merchant",
            VoucherId::SeedMoney => "Seed Money",
            VoucherId::Blank => "Blank",
            VoucherId::MagicTrick => "Magic Trick",
            VoucherId::Hieroglyph => "Hieroglyph",
            VoucherId::DirectorsCut => "Director's Cut",
            VoucherId::PaintBrush => "Paint Brush",
            VoucherId::OverstockPlus => "Overstock Plus",
            VoucherId::Liquidation => "Liquidation",
            VoucherId::GlowUp => "Glow Up",
            VoucherId::RerollGlut => "Reroll Glut",
            VoucherId::OmenGlobe => "Omen Globe",
            VoucherId::Observatory => "Observatory",
            VoucherId::NachoTong => "Nacho Tong",
            VoucherId::Recyclomancy => "Recyclomancy",
            VoucherId::TarotTycoon => "Tarot Tycoon",
            VoucherId::PlanetTycoon => "Planet Tycoon",
            VoucherId::MoneyTree => "Money Tree",
            VoucherId::Antimatter => "Antimatter",
            VoucherId::Illusion => "Illusion",
            VoucherId::Petroglyph => "Petroglyph",
            VoucherId::Retcon => "Retcon",
            VoucherId::Palette => "Palette",
        }
    }

    pub fn from_name(name: &str) -> Option<VoucherId> {
        let wanted = normalize(name);
        (0..VOUCHER_COUNT)
            .map(|i| VoucherId::from_index(i).unwrap())
            .find(|v| normalize(v.name()) == wanted)
    }
}

// ============================================================================
// 啟用集合
// ============================================================================

/// 已啟用 Voucher 的位元集合
///
/// 啟用是單調的：一旦設定就不再清除（搜尋過程中沒有「退還」）。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VoucherSet(u32);

impl VoucherSet {
    pub fn new() -> Self {
        VoucherSet(0)
    }

    pub fn activate(&mut self, v: VoucherId) {
        self.0 |= 1 << v.to_index();
    }

    pub fn is_active(self, v: VoucherId) -> bool {
        self.0 & (1 << v.to_index()) != 0
    }

    /// Voucher 流的出現資格：未啟用、且（若是升級版）基礎版已啟用
    pub fn is_offerable(self, v: VoucherId) -> bool {
        if self.is_active(v) {
            return false;
        }
        match v.prerequisite() {
            Some(base) => self.is_active(base),
            None => true,
        }
    }

    /// 商店 Tarot 權重倍數（Tarot Merchant x2 / Tarot Tycoon x4）
    pub fn tarot_rate_mult(self) -> f64 {
        if self.is_active(VoucherId::TarotTycoon) {
            4.0
        } else if self.is_active(VoucherId::TarotMerchant) {
            2.0
        } else {
            1.0
        }
    }

    /// 商店 Planet 權重倍數（Planet Merchant x2 / Planet Tycoon x4）
    pub fn planet_rate_mult(self) -> f64 {
        if self.is_active(VoucherId::PlanetTycoon) {
            4.0
        } else if self.is_active(VoucherId::PlanetMerchant) {
            2.0
        } else {
            1.0
        }
    }

    /// 商店撲克牌權重（Magic Trick 啟用前為 0）
    pub fn playing_card_rate(self) -> f64 {
        if self.is_active(VoucherId::MagicTrick) {
            4.0
        } else {
            0.0
        }
    }

    /// 版本出現率倍數（Hone x2 / Glow Up x4）
    pub fn edition_rate_mult(self) -> f64 {
        if self.is_active(VoucherId::GlowUp) {
            4.0
        } else if self.is_active(VoucherId::Hone) {
            2.0
        } else {
            1.0
        }
    }
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_layout() {
        for i in 0..UPGRADE_OFFSET {
            let base = VoucherId::from_index(i).unwrap();
            let up = base.upgrade().unwrap();
            assert_eq!(up.prerequisite(), Some(base));
            assert_eq!(up.to_index(), i + UPGRADE_OFFSET);
        }
        assert_eq!(VoucherId::Telescope.upgrade(), Some(VoucherId::Observatory));
        assert_eq!(VoucherId::Hieroglyph.upgrade(), Some(VoucherId::Petroglyph));
    }

    #[test]
    fn test_offerable_requires_prerequisite() {
        let mut set = VoucherSet::new();
        assert!(set.is_offerable(VoucherId::Telescope));
        assert!(!set.is_offerable(VoucherId::Observatory));

        set.activate(VoucherId::Telescope);
        assert!(!set.is_offerable(VoucherId::Telescope));
        assert!(set.is_offerable(VoucherId::Observatory));

        set.activate(VoucherId::Observatory);
        assert!(!set.is_offerable(VoucherId::Observatory));
    }

    #[test]
    fn test_activation_is_monotone() {
        let mut set = VoucherSet::new();
        set.activate(VoucherId::Hone);
        set.activate(VoucherId::Hone);
        assert!(set.is_active(VoucherId::Hone));
        assert_eq!(set.edition_rate_mult(), 2.0);
        set.activate(VoucherId::GlowUp);
        assert_eq!(set.edition_rate_mult(), 4.0);
    }

    #[test]
    fn test_bonus_voucher_flags() {
        assert!(VoucherId::Hieroglyph.grants_bonus_voucher());
        assert!(VoucherId::Petroglyph.grants_bonus_voucher());
        assert!(!VoucherId::Telescope.grants_bonus_voucher());
    }

    #[test]
    fn test_from_name() {
        assert_eq!(VoucherId::from_name("Reroll Surplus"), Some(VoucherId::RerollSurplus));
        assert_eq!(VoucherId::from_name("RerollSurplus"), Some(VoucherId::RerollSurplus));
        assert_eq!(VoucherId::from_name("Director's Cut"), Some(VoucherId::DirectorsCut));
        assert_eq!(VoucherId::from_name("observatory"), Some(VoucherId::Observatory));
    }
}
