//! Tag 表
//!
//! 每個 ante 提供兩個跳過獎勵：小盲一個、大盲一個，
//! 由同一條 Tag 流依序抽出。池順序即 PRNG 索引契約。

use super::joker::normalize;

/// Tag 數量
pub const TAG_COUNT: usize = 24;

/// Tag ID
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TagId {
    UncommonTag,
    RareTag,
    NegativeTag,
    FoilTag,
    HolographicTag,
    PolychromeTag,
    InvestmentTag,
    VoucherTag,
    BossTag,
    StandardTag,
    CharmTag,
    MeteorTag,
    BuffoonTag,
    HandyTag,
    GarbageTag,
    EtherealTag,
    CouponTag,
    DoubleTag,
    JuggleTag,
    D6Tag,
    TopUpTag,
    SpeedTag,
    OrbitalTag,
    EconomyTag,
}

impl TagId {
    /// 抽取池
    pub fn all() -> &'static [TagId] {
        &[
            TagId::UncommonTag,
            TagId::RareTag,
            TagId::NegativeTag,
            TagId::FoilTag,
            TagId::HolographicTag,
            TagId::PolychromeTag,
            TagId::InvestmentTag,
            TagId::VoucherTag,
            TagId::BossTag,
            TagId::StandardTag,
            TagId::CharmTag,
            TagId::MeteorTag,
            TagId::BuffoonTag,
            TagId::HandyTag,
            TagId::GarbageTag,
            TagId::EtherealTag,
            TagId::CouponTag,
            TagId::DoubleTag,
            TagId::JuggleTag,
            TagId::D6Tag,
            TagId::TopUpTag,
            TagId::SpeedTag,
            TagId::OrbitalTag,
            TagId::EconomyTag,
        ]
    }

    pub fn to_index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            TagId::UncommonTag => "Uncommon Tag",
            TagId::RareTag => "Rare Tag",
            TagId::NegativeTag => "Negative Tag",
            TagId::FoilTag => "Foil Tag",
            TagId::HolographicTag => "Holographic Tag",
            TagId::PolychromeTag => "Polychrome Tag",
            TagId::InvestmentTag => "Investment Tag",
            TagId::VoucherTag => "Voucher Tag",
            TagId::BossTag => "Boss Tag",
            TagId::StandardTag => "Standard Tag",
            TagId::CharmTag => "Charm Tag",
            TagId::MeteorTag => "Meteor Tag",
            TagId::BuffoonTag => "Buffoon Tag",
            TagId::HandyTag => "Handy Tag",
            TagId::GarbageTag => "Garbage Tag",
            TagId::EtherealTag => "Ethereal Tag",
            TagId::CouponTag => "Coupon Tag",
            TagId::DoubleTag => "Double Tag",
            TagId::JuggleTag => "Juggle Tag",
            TagId::D6Tag => "D6 Tag",
            TagId::TopUpTag => "Top-up Tag",
            TagId::SpeedTag => "Speed Tag",
            TagId::OrbitalTag => "Orbital Tag",
            TagId::EconomyTag => "Economy Tag",
        }
    }

    /// 由名稱解析；結尾的 "Tag" 可省略（"Negative" == "Negative Tag"）
    pub fn from_name(name: &str) -> Option<TagId> {
        let mut wanted = normalize(name);
        if !wanted.ends_with("tag") {
            wanted.push_str("tag");
        }
        TagId::all()
            .iter()
            .copied()
            .find(|t| normalize(t.name()) == wanted)
    }
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_count() {
        assert_eq!(TagId::all().len(), TAG_COUNT);
    }

    #[test]
    fn test_index_order() {
        for (i, tag) in TagId::all().iter().enumerate() {
            assert_eq!(tag.to_index(), i);
        }
    }

    #[test]
    fn test_from_name() {
        assert_eq!(TagId::from_name("NegativeTag"), Some(TagId::NegativeTag));
        assert_eq!(TagId::from_name("Negative"), Some(TagId::NegativeTag));
        assert_eq!(TagId::from_name("top-up tag"), Some(TagId::TopUpTag));
        assert_eq!(TagId::from_name("D6"), Some(TagId::D6Tag));
        assert_eq!(TagId::from_name("NoSuchTag"), None);
    }
}
