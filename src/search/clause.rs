//! 準備態子句
//!
//! 使用者子句在搜尋開始前一次性正規化：枚舉值解析完畢、
//! ante / 商店卡槽 / 包卡槽集合預先算成位遮罩、來源與預設
//! 補齊。準備態子句不可變、跨執行緒共享；熱路徑上對它只有
//! 位測試和等值比較。

use crate::game::blinds::BossBlind;
use crate::game::cards::{CardItem, Edition, Enhancement, Rank, Seal, Suit};
use crate::game::constants::{DEFAULT_MAX_ANTE, MAX_ANTE, MAX_SHOP_SLOTS, PACK_SLOTS_PER_ANTE};
use crate::game::consumables::{PlanetId, SpectralId, TarotId};
use crate::game::decks::DeckType;
use crate::game::joker::{JokerId, JokerItem, Rarity, Stickers};
use crate::game::packs::PackSize;
use crate::game::stakes::Stake;
use crate::game::tags::TagId;
use crate::game::vouchers::VoucherId;

use super::streams::ShopItem;

/// 預設商店卡槽視窗（3 次進店 × 每店 2 槽，不含 reroll）
pub const DEFAULT_SHOP_SLOTS: u64 = 0x3f;

/// 預設包卡槽視窗（整個 ante 的 6 包）
pub const DEFAULT_PACK_SLOTS: u8 = 0x3f;

/// Joker 萬用比對
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wildcard {
    None,
    AnyJoker,
    AnyCommon,
    AnyUncommon,
    AnyRare,
    AnyLegendary,
}

impl Wildcard {
    pub fn matches(self, id: JokerId) -> bool {
        match self {
            Wildcard::None => false,
            Wildcard::AnyJoker => true,
            Wildcard::AnyCommon => id.rarity() == Rarity::Common,
            Wildcard::AnyUncommon => id.rarity() == Rarity::Uncommon,
            Wildcard::AnyRare => id.rarity() == Rarity::Rare,
            Wildcard::AnyLegendary => id.rarity() == Rarity::Legendary,
        }
    }
}

/// Tag 子句看哪個盲注槽
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagSlot {
    SmallBlind,
    BigBlind,
    Any,
}

/// 子句來源開關
#[derive(Clone, Copy, Debug)]
pub struct Sources {
    pub shop: bool,
    pub packs: bool,
    pub tags: bool,
    pub require_mega: bool,
}

impl Default for Sources {
    fn default() -> Self {
        Self {
            shop: true,
            packs: true,
            tags: false,
            require_mega: false,
        }
    }
}

/// 各類別的比對目標
#[derive(Clone, Debug)]
pub enum ClauseBody {
    Voucher {
        targets: Vec<VoucherId>,
    },
    Tag {
        targets: Vec<TagId>,
        slot: TagSlot,
    },
    Boss {
        targets: Vec<BossBlind>,
    },
    Tarot {
        targets: Vec<TarotId>,
        any: bool,
    },
    Planet {
        targets: Vec<PlanetId>,
        any: bool,
    },
    Spectral {
        targets: Vec<SpectralId>,
        any: bool,
    },
    Joker {
        targets: Vec<JokerId>,
        wildcard: Wildcard,
        stickers: Stickers,
    },
    SoulJoker {
        targets: Vec<JokerId>,
        wildcard: Wildcard,
    },
    PlayingCard {
        suit: Option<Suit>,
        rank: Option<Rank>,
        enhancement: Option<Enhancement>,
        seal: Option<Seal>,
    },
    And {
        children: Vec<Clause>,
    },
    Or {
        children: Vec<Clause>,
    },
}

/// 類別標籤（評估器分組用）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Voucher,
    Tag,
    Boss,
    Tarot,
    Planet,
    Spectral,
    Joker,
    SoulJoker,
    PlayingCard,
    Compound,
}

/// 準備態子句
#[derive(Clone, Debug)]
pub struct Clause {
    pub body: ClauseBody,
    /// ante 位集合（bit a = ante a，0..=63）
    pub antes: u64,
    /// 商店卡槽位集合
    pub shop_slots: u64,
    /// 包卡槽位集合（6-bit）
    pub pack_slots: u8,
    pub edition: Option<Edition>,
    pub sources: Sources,
    /// should 計分權重
    pub score: i64,
    /// should 門檻：計數低於 min 時記 0
    pub min: Option<u32>,
}

impl Clause {
    pub fn category(&self) -> Category {
        match self.body {
            ClauseBody::Voucher { .. } => Category::Voucher,
            ClauseBody::Tag { .. } => Category::Tag,
            ClauseBody::Boss { .. } => Category::Boss,
            ClauseBody::Tarot { .. } => Category::Tarot,
            ClauseBody::Planet { .. } => Category::Planet,
            ClauseBody::Spectral { .. } => Category::Spectral,
            ClauseBody::Joker { .. } => Category::Joker,
            ClauseBody::SoulJoker { .. } => Category::SoulJoker,
            ClauseBody::PlayingCard { .. } => Category::PlayingCard,
            ClauseBody::And { .. } | ClauseBody::Or { .. } => Category::Compound,
        }
    }

    // ------------------------------------------------------------------
    // 位集合查詢
    // ------------------------------------------------------------------

    pub fn includes_ante(&self, ante: u8) -> bool {
        ante <= MAX_ANTE && self.antes & (1u64 << ante) != 0
    }

    pub fn max_ante(&self) -> u8 {
        (63 - self.antes.leading_zeros().min(63)) as u8
    }

    pub fn min_ante(&self) -> u8 {
        self.antes.trailing_zeros().min(63) as u8
    }

    /// ante 的迭代（升冪）
    pub fn antes_iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=MAX_ANTE).filter(move |&a| self.includes_ante(a))
    }

    pub fn includes_shop_slot(&self, slot: usize) -> bool {
        slot < MAX_SHOP_SLOTS && self.shop_slots & (1u64 << slot) != 0
    }

    /// 需要走訪的商店卡槽上限（最高位 + 1；空集為 0）
    pub fn shop_slot_limit(&self) -> usize {
        (64 - self.shop_slots.leading_zeros()) as usize
    }

    pub fn includes_pack_slot(&self, slot: usize) -> bool {
        slot < PACK_SLOTS_PER_ANTE && self.pack_slots & (1u8 << slot) != 0
    }

    pub fn pack_slot_limit(&self) -> usize {
        (8 - self.pack_slots.leading_zeros()) as usize
    }

    pub fn wants_shop(&self) -> bool {
        self.sources.shop && self.shop_slots != 0
    }

    pub fn wants_packs(&self) -> bool {
        self.sources.packs && self.pack_slots != 0
    }

    /// requireMega：只接受 Mega 尺寸的包
    pub fn accepts_pack_size(&self, size: PackSize) -> bool {
        !self.sources.require_mega || size == PackSize::Mega
    }

    // ------------------------------------------------------------------
    // 單項比對（filter / verifier / scorer 共用）
    // ------------------------------------------------------------------

    fn edition_ok(&self, edition: Edition) -> bool {
        match self.edition {
            None => true,
            Some(e) => e == edition,
        }
    }

    /// Joker 子句對一張生成 Joker 的比對
    pub fn matches_joker(&self, item: &JokerItem) -> bool {
        let ClauseBody::Joker {
            targets,
            wildcard,
            stickers,
        } = &self.body
        else {
            return false;
        };
        let type_ok = wildcard.matches(item.id) || targets.contains(&item.id);
        type_ok && self.edition_ok(item.edition) && item.stickers.contains(*stickers)
    }

    /// SoulJoker 子句對傳說 Joker 的比對
    pub fn matches_soul_joker(&self, item: &JokerItem) -> bool {
        let ClauseBody::SoulJoker { targets, wildcard } = &self.body else {
            return false;
        };
        let type_ok = wildcard.matches(item.id) || targets.contains(&item.id);
        type_ok && self.edition_ok(item.edition)
    }

    /// Tarot / Planet / Spectral 子句對商店物品的比對
    pub fn matches_shop_item(&self, item: &ShopItem) -> bool {
        match (&self.body, item) {
            (ClauseBody::Tarot { targets, any }, ShopItem::Tarot(t)) => {
                (*any || targets.contains(t)) && self.edition_ok(Edition::None)
            }
            (ClauseBody::Planet { targets, any }, ShopItem::Planet(p)) => {
                (*any || targets.contains(p)) && self.edition_ok(Edition::None)
            }
            (ClauseBody::Spectral { targets, any }, ShopItem::Spectral(s)) => {
                (*any || targets.contains(s)) && self.edition_ok(Edition::None)
            }
            _ => false,
        }
    }

    pub fn matches_tarot(&self, t: TarotId) -> bool {
        match &self.body {
            ClauseBody::Tarot { targets, any } => {
                (*any || targets.contains(&t)) && self.edition_ok(Edition::None)
            }
            _ => false,
        }
    }

    pub fn matches_planet(&self, p: PlanetId) -> bool {
        match &self.body {
            ClauseBody::Planet { targets, any } => {
                (*any || targets.contains(&p)) && self.edition_ok(Edition::None)
            }
            _ => false,
        }
    }

    pub fn matches_spectral(&self, s: SpectralId) -> bool {
        match &self.body {
            ClauseBody::Spectral { targets, any } => {
                (*any || targets.contains(&s)) && self.edition_ok(Edition::None)
            }
            _ => false,
        }
    }

    /// PlayingCard 子句對一張撲克牌的比對（未指定的欄位不設限）
    pub fn matches_card(&self, card: &CardItem) -> bool {
        let ClauseBody::PlayingCard {
            suit,
            rank,
            enhancement,
            seal,
        } = &self.body
        else {
            return false;
        };
        suit.map_or(true, |s| s == card.suit)
            && rank.map_or(true, |r| r == card.rank)
            && enhancement.map_or(true, |e| e == card.enhancement)
            && seal.map_or(true, |s| s == card.seal)
            && self.edition_ok(card.edition)
    }

    pub fn matches_voucher(&self, v: VoucherId) -> bool {
        match &self.body {
            ClauseBody::Voucher { targets } => targets.contains(&v),
            _ => false,
        }
    }

    /// Tag 子句對一對 (小盲, 大盲) 的出現次數（0..=2）
    pub fn tag_matches(&self, small: TagId, big: TagId) -> u32 {
        let ClauseBody::Tag { targets, slot } = &self.body else {
            return 0;
        };
        let small_hit = targets.contains(&small) as u32;
        let big_hit = targets.contains(&big) as u32;
        match slot {
            TagSlot::SmallBlind => small_hit,
            TagSlot::BigBlind => big_hit,
            TagSlot::Any => small_hit + big_hit,
        }
    }

    pub fn matches_boss(&self, b: BossBlind) -> bool {
        match &self.body {
            ClauseBody::Boss { targets } => targets.contains(&b),
            _ => false,
        }
    }

    pub fn children(&self) -> Option<&[Clause]> {
        match &self.body {
            ClauseBody::And { children } | ClauseBody::Or { children } => Some(children),
            _ => None,
        }
    }
}

// ============================================================================
// 準備態過濾器
// ============================================================================

/// 整份過濾器的準備態；建構一次、跨執行緒唯讀共享
#[derive(Clone, Debug)]
pub struct PreparedFilter {
    pub name: Option<String>,
    pub deck: DeckType,
    pub stake: Stake,
    pub must: Vec<Clause>,
    pub should: Vec<Clause>,
    pub must_not: Vec<Clause>,
}

impl PreparedFilter {
    /// 所有子句（含 should / mustNot），遞迴展開複合子句
    pub fn walk(&self, mut f: impl FnMut(&Clause)) {
        fn visit(clauses: &[Clause], f: &mut impl FnMut(&Clause)) {
            for c in clauses {
                f(c);
                if let Some(children) = c.children() {
                    visit(children, f);
                }
            }
        }
        visit(&self.must, &mut f);
        visit(&self.should, &mut f);
        visit(&self.must_not, &mut f);
    }

    fn any_clause(&self, pred: impl Fn(&Clause) -> bool) -> bool {
        let mut hit = false;
        self.walk(|c| hit |= pred(c));
        hit
    }

    pub fn needs_vouchers(&self) -> bool {
        self.any_clause(|c| c.category() == Category::Voucher)
    }

    pub fn needs_bosses(&self) -> bool {
        self.any_clause(|c| c.category() == Category::Boss)
    }

    /// Voucher 啟用走訪需要到的最大 ante
    pub fn max_voucher_ante(&self) -> u8 {
        let mut max = 0;
        self.walk(|c| {
            if c.category() == Category::Voucher {
                max = max.max(c.max_ante());
            }
        });
        max.max(1)
    }

    /// 所有子句觸及的最大 ante
    pub fn max_ante(&self) -> u8 {
        let mut max = 1;
        self.walk(|c| max = max.max(c.max_ante()));
        max
    }
}

/// 位集合建構：ante 列表 → u64 遮罩
pub fn ante_mask(antes: &[u8]) -> u64 {
    antes
        .iter()
        .filter(|&&a| a <= MAX_ANTE)
        .fold(0u64, |m, &a| m | (1u64 << a))
}

/// 預設 ante 集合：1..=8
pub fn default_ante_mask() -> u64 {
    ((1u64 << (DEFAULT_MAX_ANTE + 1)) - 1) & !1
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn joker_clause(targets: Vec<JokerId>, antes: u64) -> Clause {
        Clause {
            body: ClauseBody::Joker {
                targets,
                wildcard: Wildcard::None,
                stickers: Stickers::none(),
            },
            antes,
            shop_slots: DEFAULT_SHOP_SLOTS,
            pack_slots: DEFAULT_PACK_SLOTS,
            edition: None,
            sources: Sources::default(),
            score: 1,
            min: None,
        }
    }

    #[test]
    fn test_ante_masks() {
        assert_eq!(default_ante_mask(), 0b1_1111_1110);
        let c = joker_clause(vec![JokerId::Blueprint], ante_mask(&[2, 5]));
        assert!(c.includes_ante(2));
        assert!(c.includes_ante(5));
        assert!(!c.includes_ante(3));
        assert_eq!(c.min_ante(), 2);
        assert_eq!(c.max_ante(), 5);
        assert_eq!(c.antes_iter().collect::<Vec<_>>(), vec![2, 5]);
    }

    #[test]
    fn test_slot_limits() {
        let mut c = joker_clause(vec![JokerId::Blueprint], default_ante_mask());
        assert_eq!(c.shop_slot_limit(), 6);
        c.shop_slots = 0b1001;
        assert_eq!(c.shop_slot_limit(), 4);
        assert!(c.includes_shop_slot(0));
        assert!(!c.includes_shop_slot(1));
        c.shop_slots = 0;
        assert!(!c.wants_shop());
    }

    #[test]
    fn test_joker_matching() {
        let mut c = joker_clause(vec![JokerId::Blueprint], default_ante_mask());
        let item = JokerItem::plain(JokerId::Blueprint);
        assert!(c.matches_joker(&item));
        assert!(!c.matches_joker(&JokerItem::plain(JokerId::Brainstorm)));

        // 版本條件是額外的 AND
        c.edition = Some(Edition::Negative);
        assert!(!c.matches_joker(&item));
        let mut negative = item;
        negative.edition = Edition::Negative;
        assert!(c.matches_joker(&negative));
    }

    #[test]
    fn test_wildcard_matching() {
        let c = Clause {
            body: ClauseBody::Joker {
                targets: vec![],
                wildcard: Wildcard::AnyRare,
                stickers: Stickers::none(),
            },
            antes: default_ante_mask(),
            shop_slots: DEFAULT_SHOP_SLOTS,
            pack_slots: DEFAULT_PACK_SLOTS,
            edition: None,
            sources: Sources::default(),
            score: 1,
            min: None,
        };
        assert!(c.matches_joker(&JokerItem::plain(JokerId::Blueprint)));
        assert!(!c.matches_joker(&JokerItem::plain(JokerId::Joker)));
    }

    #[test]
    fn test_tag_count_semantics() {
        let c = Clause {
            body: ClauseBody::Tag {
                targets: vec![TagId::NegativeTag],
                slot: TagSlot::Any,
            },
            antes: default_ante_mask(),
            shop_slots: 0,
            pack_slots: 0,
            edition: None,
            sources: Sources::default(),
            score: 1,
            min: None,
        };
        // 兩個槽都命中時計 2
        assert_eq!(c.tag_matches(TagId::NegativeTag, TagId::NegativeTag), 2);
        assert_eq!(c.tag_matches(TagId::NegativeTag, TagId::D6Tag), 1);
        assert_eq!(c.tag_matches(TagId::D6Tag, TagId::D6Tag), 0);
    }

    #[test]
    fn test_playing_card_unconstrained_fields() {
        let c = Clause {
            body: ClauseBody::PlayingCard {
                suit: Some(Suit::Clubs),
                rank: Some(Rank::Seven),
                enhancement: None,
                seal: None,
            },
            antes: default_ante_mask(),
            shop_slots: 0,
            pack_slots: DEFAULT_PACK_SLOTS,
            edition: None,
            sources: Sources::default(),
            score: 10,
            min: None,
        };
        let mut card = CardItem::plain(Rank::Seven, Suit::Clubs);
        assert!(c.matches_card(&card));
        card.enhancement = Enhancement::Lucky;
        assert!(c.matches_card(&card));
        card.suit = Suit::Hearts;
        assert!(!c.matches_card(&card));
    }
}
