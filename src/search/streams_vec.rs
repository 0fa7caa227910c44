//! 內容生成流（8-lane 批次）
//!
//! 批次變體在 lane i 上與標量流（種子 i）逐 bit 一致。大多數流
//! 的推進會因 lane 而異（resample、Soul 擲點、包尺寸），所以批次
//! 形式持有 8 條標量游標、逐 lane 推進；Tag 流推進無條件，直接用
//! `CursorVec` 一次算 8 lane。

use crate::game::blinds::BossBlind;
use crate::game::decks::DeckType;
use crate::game::joker::JokerItem;
use crate::game::packs::PackType;
use crate::game::rng::{ante_key, CursorVec, SeedCtxVec, LANES};
use crate::game::stakes::Stake;
use crate::game::tags::{TagId, TAG_COUNT};
use crate::game::vouchers::VoucherId;

use super::state::{RunState, RunStateVec};
use super::streams::{
    ArcanaCard, ArcanaStream, BossStream, BuffoonStream, CelestialStream, PackStream,
    ShopExclusions, ShopItem, ShopItemStream, SoulJokerStream, SpectralStream, StandardStream,
    TagStream, VoucherStream,
};

macro_rules! per_lane {
    ($seeds:expr, $ctor:expr) => {{
        let seeds = $seeds;
        std::array::from_fn(|lane| $ctor(&seeds.lane(lane)))
    }};
}

// ============================================================================
// Voucher
// ============================================================================

pub struct VoucherStreamVec {
    lanes: [VoucherStream; LANES],
}

impl VoucherStreamVec {
    pub fn new(seeds: &SeedCtxVec, ante: u8) -> Self {
        Self {
            lanes: per_lane!(seeds, |s| VoucherStream::new(s, ante)),
        }
    }

    /// 全 lane 同步抽一張（resample 因 lane 而異）
    pub fn next(&mut self, state: &RunStateVec) -> [VoucherId; LANES] {
        std::array::from_fn(|lane| {
            let lane_state = state.lane(lane);
            self.lanes[lane].next(&lane_state)
        })
    }

    /// 只推進單一 lane（Hieroglyph bonus 只發生在部分 lane）
    pub fn next_lane(&mut self, lane: usize, state: &RunStateVec) -> VoucherId {
        let lane_state = state.lane(lane);
        self.lanes[lane].next(&lane_state)
    }
}

// ============================================================================
// Tag
// ============================================================================

pub struct TagStreamVec {
    cursor: CursorVec,
}

impl TagStreamVec {
    pub fn new(seeds: &SeedCtxVec, ante: u8) -> Self {
        Self {
            cursor: CursorVec::new(&ante_key("Tag", ante), seeds),
        }
    }

    pub fn next(&mut self) -> [TagId; LANES] {
        self.cursor.randint(0, TAG_COUNT - 1).map(|i| TagId::all()[i])
    }

    /// (小盲, 大盲)
    pub fn next_pair(&mut self) -> ([TagId; LANES], [TagId; LANES]) {
        (self.next(), self.next())
    }
}

// ============================================================================
// Boss
// ============================================================================

pub struct BossStreamVec {
    lanes: [BossStream; LANES],
}

impl BossStreamVec {
    pub fn new(seeds: &SeedCtxVec) -> Self {
        Self {
            lanes: per_lane!(seeds, BossStream::new),
        }
    }

    pub fn next(&mut self, ante: u8) -> [BossBlind; LANES] {
        std::array::from_fn(|lane| self.lanes[lane].next(ante))
    }
}

// ============================================================================
// 卡包
// ============================================================================

pub struct PackStreamVec {
    lanes: [PackStream; LANES],
}

impl PackStreamVec {
    pub fn for_ante(seeds: &SeedCtxVec, ante: u8) -> Self {
        Self {
            lanes: per_lane!(seeds, |s| PackStream::for_ante(s, ante)),
        }
    }

    pub fn next(&mut self) -> [PackType; LANES] {
        std::array::from_fn(|lane| self.lanes[lane].next())
    }
}

// ============================================================================
// 商店物品
// ============================================================================

pub struct ShopItemStreamVec {
    lanes: [ShopItemStream; LANES],
}

impl ShopItemStreamVec {
    pub fn new(seeds: &SeedCtxVec, ante: u8, exclusions: ShopExclusions) -> Self {
        Self {
            lanes: per_lane!(seeds, |s| ShopItemStream::new(s, ante, exclusions)),
        }
    }

    pub fn next(&mut self, state: &RunStateVec, deck: DeckType, stake: Stake) -> [ShopItem; LANES] {
        std::array::from_fn(|lane| {
            let lane_state = state.lane(lane);
            self.lanes[lane].next(&lane_state, deck, stake)
        })
    }
}

// ============================================================================
// 包內容
// ============================================================================

pub struct ArcanaStreamVec {
    lanes: [ArcanaStream; LANES],
}

impl ArcanaStreamVec {
    pub fn new(seeds: &SeedCtxVec, ante: u8) -> Self {
        Self {
            lanes: per_lane!(seeds, |s| ArcanaStream::new(s, ante)),
        }
    }

    /// 只推進指定 lane（各 lane 的包尺寸可能不同）
    pub fn next_lane(&mut self, lane: usize) -> ArcanaCard {
        self.lanes[lane].next()
    }
}

pub struct CelestialStreamVec {
    lanes: [CelestialStream; LANES],
}

impl CelestialStreamVec {
    pub fn new(seeds: &SeedCtxVec, ante: u8) -> Self {
        Self {
            lanes: per_lane!(seeds, |s| CelestialStream::new(s, ante)),
        }
    }

    pub fn next_lane(&mut self, lane: usize) -> crate::game::consumables::PlanetId {
        self.lanes[lane].next()
    }
}

pub struct SpectralStreamVec {
    lanes: [SpectralStream; LANES],
}

impl SpectralStreamVec {
    pub fn new(seeds: &SeedCtxVec, ante: u8) -> Self {
        Self {
            lanes: per_lane!(seeds, |s| SpectralStream::new(s, ante)),
        }
    }

    pub fn next_lane(&mut self, lane: usize) -> crate::game::consumables::SpectralId {
        self.lanes[lane].next()
    }
}

pub struct BuffoonStreamVec {
    lanes: [BuffoonStream; LANES],
}

impl BuffoonStreamVec {
    pub fn new(seeds: &SeedCtxVec, ante: u8) -> Self {
        Self {
            lanes: per_lane!(seeds, |s| BuffoonStream::new(s, ante)),
        }
    }

    pub fn next_lane(&mut self, lane: usize, state: &RunState, stake: Stake) -> JokerItem {
        self.lanes[lane].next(state, stake)
    }
}

pub struct StandardStreamVec {
    lanes: [StandardStream; LANES],
}

impl StandardStreamVec {
    pub fn new(seeds: &SeedCtxVec, ante: u8) -> Self {
        Self {
            lanes: per_lane!(seeds, |s| StandardStream::new(s, ante)),
        }
    }

    pub fn next_lane(&mut self, lane: usize) -> crate::game::cards::CardItem {
        self.lanes[lane].next()
    }
}

// ============================================================================
// Soul Joker
// ============================================================================

pub struct SoulJokerStreamVec {
    lanes: [SoulJokerStream; LANES],
}

impl SoulJokerStreamVec {
    pub fn new(seeds: &SeedCtxVec) -> Self {
        Self {
            lanes: per_lane!(seeds, SoulJokerStream::new),
        }
    }

    pub fn next_lane(&mut self, lane: usize, ante: u8, state: &RunState) -> JokerItem {
        self.lanes[lane].next(ante, state)
    }
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::rng::{SeedCtx, SEED_LEN};

    fn seeds() -> SeedCtxVec {
        SeedCtxVec::new([
            *b"AAAAAAAA", *b"BBBBBBBB", *b"12345678", *b"SEEDSEED",
            *b"ZZZZZZZZ", *b"A1B2C3D4", *b"QWERTYUI", *b"99999999",
        ])
    }

    fn scalar(seed: &[u8; SEED_LEN]) -> SeedCtx {
        SeedCtx::new(*seed)
    }

    #[test]
    fn test_tag_vec_matches_scalar() {
        let seeds = seeds();
        let mut vec_stream = TagStreamVec::new(&seeds, 3);
        let (smalls, bigs) = vec_stream.next_pair();
        for lane in 0..LANES {
            let mut s = TagStream::new(&seeds.lane(lane), 3);
            assert_eq!(s.next(), smalls[lane]);
            assert_eq!(s.next(), bigs[lane]);
        }
    }

    #[test]
    fn test_voucher_vec_matches_scalar() {
        let seeds = seeds();
        let state = RunStateVec::new();
        let mut vec_stream = VoucherStreamVec::new(&seeds, 1);
        let picks = vec_stream.next(&state);
        for lane in 0..LANES {
            let mut s = VoucherStream::new(&seeds.lane(lane), 1);
            assert_eq!(s.next(&state.lane(lane)), picks[lane]);
        }
    }

    #[test]
    fn test_boss_vec_matches_scalar() {
        let seeds = seeds();
        let mut vec_stream = BossStreamVec::new(&seeds);
        let a1 = vec_stream.next(1);
        let a2 = vec_stream.next(2);
        for lane in 0..LANES {
            let mut s = BossStream::new(&seeds.lane(lane));
            assert_eq!(s.next(1), a1[lane]);
            assert_eq!(s.next(2), a2[lane]);
        }
    }

    #[test]
    fn test_pack_vec_matches_scalar() {
        let seeds = seeds();
        let mut vec_stream = PackStreamVec::for_ante(&seeds, 2);
        let first = vec_stream.next();
        for lane in 0..LANES {
            let mut s = PackStream::for_ante(&scalar(&seeds.bytes[lane]), 2);
            assert_eq!(s.next(), first[lane]);
        }
    }
}
