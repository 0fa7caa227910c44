//! 卡包表
//!
//! 卡包 = 種類 × 尺寸。尺寸決定內容數量：Normal 2 張、Jumbo 3 張、
//! Mega 5 張。內容流一次被要求抽出恰好等於尺寸的張數，多抽或少抽
//! 都會讓後續消費者錯位。
//!
//! 加權池順序即 PRNG 索引契約。

use super::joker::normalize;

/// 卡包組合數（5 種類 × 3 尺寸）
pub const PACK_TYPE_COUNT: usize = 15;

/// 單一卡包最多的內容張數（Mega）
pub const MAX_PACK_CONTENT: usize = 5;

/// 卡包種類
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PackKind {
    Arcana,
    Celestial,
    Spectral,
    Buffoon,
    Standard,
}

/// 卡包尺寸
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PackSize {
    Normal,
    Jumbo,
    Mega,
}

impl PackSize {
    /// 內容張數
    pub fn content_count(self) -> usize {
        match self {
            PackSize::Normal => 2,
            PackSize::Jumbo => 3,
            PackSize::Mega => MAX_PACK_CONTENT,
        }
    }
}

/// 商店供應的一個卡包
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PackType {
    pub kind: PackKind,
    pub size: PackSize,
}

/// 加權池：(卡包, 權重)，順序即 PRNG 索引契約
const PACK_WEIGHTS: [(PackKind, PackSize, f64); PACK_TYPE_COUNT] = [
    (PackKind::Arcana, PackSize::Normal, 4.0),
    (PackKind::Arcana, PackSize::Jumbo, 2.0),
    (PackKind::Arcana, PackSize::Mega, 0.5),
    (PackKind::Celestial, PackSize::Normal, 4.0),
    (PackKind::Celestial, PackSize::Jumbo, 2.0),
    (PackKind::Celestial, PackSize::Mega, 0.5),
    (PackKind::Standard, PackSize::Normal, 4.0),
    (PackKind::Standard, PackSize::Jumbo, 2.0),
    (PackKind::Standard, PackSize::Mega, 0.5),
    (PackKind::Buffoon, PackSize::Normal, 1.2),
    (PackKind::Buffoon, PackSize::Jumbo, 0.6),
    (PackKind::Buffoon, PackSize::Mega, 0.15),
    (PackKind::Spectral, PackSize::Normal, 0.6),
    (PackKind::Spectral, PackSize::Jumbo, 0.3),
    (PackKind::Spectral, PackSize::Mega, 0.07),
];

impl PackType {
    pub fn new(kind: PackKind, size: PackSize) -> Self {
        Self { kind, size }
    }

    /// 權重總和
    pub fn total_weight() -> f64 {
        PACK_WEIGHTS.iter().map(|(_, _, w)| w).sum()
    }

    /// 以 [0, total_weight) 的擲點選出卡包
    pub fn from_roll(roll: f64) -> PackType {
        let mut cumulative = 0.0;
        for &(kind, size, weight) in PACK_WEIGHTS.iter() {
            cumulative += weight;
            if roll < cumulative {
                return PackType::new(kind, size);
            }
        }
        // 浮點尾差落到最後一項
        let (kind, size, _) = PACK_WEIGHTS[PACK_TYPE_COUNT - 1];
        PackType::new(kind, size)
    }

    pub fn all() -> impl ExactSizeIterator<Item = PackType> + Clone {
        PACK_WEIGHTS.iter().map(|&(kind, size, _)| PackType::new(kind, size))
    }

    pub fn name(self) -> &'static str {
        match (self.kind, self.size) {
            (PackKind::Arcana, PackSize::Normal) => "Arcana Pack",
            (PackKind::Arcana, PackSize::Jumbo) => "Jumbo Arcana Pack",
            (PackKind::Arcana, PackSize::Mega) => "Mega Arcana Pack",
            (PackKind::Celestial, PackSize::Normal) => "Celestial Pack",
            (PackKind::Celestial, PackSize::Jumbo) => "Jumbo Celestial Pack",
            (PackKind::Celestial, PackSize::Mega) => "Mega Celestial Pack",
            (PackKind::Spectral, PackSize::Normal) => "Spectral Pack",
            (PackKind::Spectral, PackSize::Jumbo) => "Jumbo Spectral Pack",
            (PackKind::Spectral, PackSize::Mega) => "Mega Spectral Pack",
            (PackKind::Buffoon, PackSize::Normal) => "Buffoon Pack",
            (PackKind::Buffoon, PackSize::Jumbo) => "Jumbo Buffoon Pack",
            (PackKind::Buffoon, PackSize::Mega) => "Mega Buffoon Pack",
            (PackKind::Standard, PackSize::Normal) => "Standard Pack",
            (PackKind::Standard, PackSize::Jumbo) => "Jumbo Standard Pack",
            (PackKind::Standard, PackSize::Mega) => "Mega Standard Pack",
        }
    }

    pub fn from_name(name: &str) -> Option<PackType> {
        let wanted = normalize(name);
        PackType::all().find(|p| normalize(p.name()) == wanted)
    }
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_counts() {
        assert_eq!(PackSize::Normal.content_count(), 2);
        assert_eq!(PackSize::Jumbo.content_count(), 3);
        assert_eq!(PackSize::Mega.content_count(), MAX_PACK_CONTENT);
    }

    #[test]
    fn test_roll_covers_pool() {
        let total = PackType::total_weight();
        assert!(total > 22.0 && total < 23.0);
        // 邊界擲點
        assert_eq!(
            PackType::from_roll(0.0),
            PackType::new(PackKind::Arcana, PackSize::Normal)
        );
        let last = PackType::from_roll(total - 1e-9);
        assert_eq!(last, PackType::new(PackKind::Spectral, PackSize::Mega));
    }

    #[test]
    fn test_roll_monotone_partition() {
        // 均勻掃過 [0, total)，每個卡包至少被選中一次
        let total = PackType::total_weight();
        let mut seen = std::collections::HashSet::new();
        let mut roll = 0.0;
        while roll < total {
            seen.insert(PackType::from_roll(roll).name());
            roll += 0.01;
        }
        assert_eq!(seen.len(), PACK_TYPE_COUNT);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(
            PackType::from_name("Mega Arcana Pack"),
            Some(PackType::new(PackKind::Arcana, PackSize::Mega))
        );
        assert_eq!(
            PackType::from_name("spectral pack"),
            Some(PackType::new(PackKind::Spectral, PackSize::Normal))
        );
    }
}
