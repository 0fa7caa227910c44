//! 內容生成流（標量）
//!
//! 每條流是一個 owned 游標：從 (種子, ante, 領域 key) 建構，
//! 依固定順序推進。推進次序是契約的一部分：兩個消費者要嘛
//! 共用同一個流實例，要嘛以相同方式重建並同步消費。錯位不會
//! 產生任何執行期錯誤，只會靜默得到錯的結果。
//!
//! 各流的 key 領域：
//! - Voucher: `Voucher{ante}`（resample 後綴處理資格拒絕）
//! - Tag: `Tag{ante}`（小盲、大盲依序）
//! - Boss: `boss`（整個種子共用，used 集合跨 ante 延續）
//! - 卡包: `shop_pack{ante}`（ante >= 2 丟棄第一包）
//! - 商店品類: `cdt{ante}`，各品類子游標只在實際生成時推進
//! - 包內容: `Tarotar1{ante}` / `Planetpl1{ante}` / `Spectralspe{ante}`
//!   / Buffoon 用 `buf` 後綴 / 標準包 `sta` 系列
//! - Soul 擲點: `soul_Tarot{ante}` / `soul_Spectral{ante}`
//! - Soul Joker: `Joker4`（整個種子一條，每發現一張 Soul 推進一次）

use crate::game::blinds::{BossBlind, BOSS_COUNT};
use crate::game::cards::{CardItem, Edition, Enhancement, Seal};
use crate::game::constants::*;
use crate::game::consumables::{PlanetId, SpectralId, TarotId, PLANET_COUNT, TAROT_COUNT};
use crate::game::decks::DeckType;
use crate::game::joker::{JokerId, JokerItem, Rarity, Stickers};
use crate::game::packs::PackType;
use crate::game::rng::{ante_key, source_key, Cursor, KeyBuf, SeedCtx};
use crate::game::stakes::Stake;
use crate::game::tags::{TagId, TAG_COUNT};
use crate::game::vouchers::{VoucherId, VOUCHER_COUNT};

use super::state::RunState;

/// resample 迴圈的保險上限；正常情況遠低於此
const RESAMPLE_CAP: usize = 128;

// ============================================================================
// Voucher 流
// ============================================================================

/// 一個 ante 的 Voucher 序列（首張 + Hieroglyph bonus + 其後）
pub struct VoucherStream {
    base_key: KeyBuf,
    cursor: Cursor,
    seed: SeedCtx,
}

impl VoucherStream {
    pub fn new(seed: &SeedCtx, ante: u8) -> Self {
        let base_key = ante_key("Voucher", ante);
        Self {
            base_key,
            cursor: Cursor::new(&base_key, seed),
            seed: *seed,
        }
    }

    /// 下一張符合資格的 Voucher：主游標推進一次，
    /// 資格被拒時以 `_resample{n}` 衍生 key 重擲
    pub fn next(&mut self, state: &RunState) -> VoucherId {
        let mut pick = VoucherId::from_index(self.cursor.randint(0, VOUCHER_COUNT - 1)).unwrap();
        let mut resample = 2;
        while !state.vouchers.is_offerable(pick) && resample < RESAMPLE_CAP {
            let mut alt = Cursor::new(&self.base_key.resample(resample), &self.seed);
            pick = VoucherId::from_index(alt.randint(0, VOUCHER_COUNT - 1)).unwrap();
            resample += 1;
        }
        pick
    }
}

// ============================================================================
// Tag 流
// ============================================================================

/// 一個 ante 的兩個 Tag（小盲先、大盲後）
pub struct TagStream {
    cursor: Cursor,
}

impl TagStream {
    pub fn new(seed: &SeedCtx, ante: u8) -> Self {
        Self {
            cursor: Cursor::new(&ante_key("Tag", ante), seed),
        }
    }

    pub fn next(&mut self) -> TagId {
        TagId::all()[self.cursor.randint(0, TAG_COUNT - 1)]
    }

    /// (小盲, 大盲)
    pub fn next_pair(&mut self) -> (TagId, TagId) {
        (self.next(), self.next())
    }
}

// ============================================================================
// Boss 流
// ============================================================================

/// 整個種子一條的 Boss 流；used 集合跨 ante 延續，
/// 對應池耗盡前不重複的抽取規則
pub struct BossStream {
    cursor: Cursor,
    used_regular: u32,
    used_showdown: u32,
}

impl BossStream {
    pub fn new(seed: &SeedCtx) -> Self {
        Self {
            cursor: Cursor::new(&KeyBuf::new("boss"), seed),
            used_regular: 0,
            used_showdown: 0,
        }
    }

    /// 該 ante 的 Boss；每次呼叫恰好推進一次
    pub fn next(&mut self, ante: u8) -> BossBlind {
        let showdown = BossBlind::ante_is_showdown(ante);
        let mut eligible = [BossBlind::TheHook; BOSS_COUNT];
        let mut len = self.collect_eligible(ante, showdown, &mut eligible);
        if len == 0 {
            // 池耗盡：該類別重新開放
            if showdown {
                self.used_showdown = 0;
            } else {
                self.used_regular = 0;
            }
            len = self.collect_eligible(ante, showdown, &mut eligible);
        }
        let pick = eligible[self.cursor.randint(0, len - 1)];
        if showdown {
            self.used_showdown |= 1 << pick.to_index();
        } else {
            self.used_regular |= 1 << pick.to_index();
        }
        pick
    }

    fn collect_eligible(&self, ante: u8, showdown: bool, out: &mut [BossBlind; BOSS_COUNT]) -> usize {
        let mut len = 0;
        if showdown {
            for b in BossBlind::showdown_pool() {
                if self.used_showdown & (1 << b.to_index()) == 0 {
                    out[len] = b;
                    len += 1;
                }
            }
        } else {
            for b in BossBlind::regular_pool() {
                if b.min_ante() <= ante.max(1) && self.used_regular & (1 << b.to_index()) == 0 {
                    out[len] = b;
                    len += 1;
                }
            }
        }
        len
    }
}

// ============================================================================
// 卡包流
// ============================================================================

/// 一個 ante 供應的卡包序列
pub struct PackStream {
    cursor: Cursor,
}

impl PackStream {
    /// `generated_first_pack`: ante >= 2 時為 true，建構時丟棄
    /// 第一個值（玩家看不到的幽靈包）
    pub fn new(seed: &SeedCtx, ante: u8, generated_first_pack: bool) -> Self {
        let mut cursor = Cursor::new(&ante_key("shop_pack", ante), seed);
        if generated_first_pack {
            let _ = cursor.random();
        }
        Self { cursor }
    }

    /// 依 ante 慣例建構（ante 1 不丟棄）
    pub fn for_ante(seed: &SeedCtx, ante: u8) -> Self {
        Self::new(seed, ante, ante >= 2)
    }

    pub fn next(&mut self) -> PackType {
        PackType::from_roll(self.cursor.random() * PackType::total_weight())
    }
}

// ============================================================================
// 版本 / 貼紙擲點
// ============================================================================

/// 版本擲點：roll 落在由高到低的累積窗格
/// （Negative 不吃倍數；其餘窗格乘上 Hone / Glow Up 倍數）
pub fn poll_edition(roll: f64, rate_mult: f64, allow_negative: bool) -> Edition {
    let neg_floor = 1.0 - EDITION_NEGATIVE_RATE;
    if allow_negative && roll > neg_floor {
        return Edition::Negative;
    }
    let poly_floor = neg_floor - EDITION_POLYCHROME_RATE * rate_mult;
    if roll > poly_floor {
        return Edition::Polychrome;
    }
    let holo_floor = poly_floor - EDITION_HOLO_RATE * rate_mult;
    if roll > holo_floor {
        return Edition::Holographic;
    }
    if roll > holo_floor - EDITION_FOIL_RATE * rate_mult {
        return Edition::Foil;
    }
    Edition::None
}

/// Joker 生成器：稀有度 → 池內抽取 → 版本 → 貼紙
///
/// 商店（src = "sho"）與 Buffoon 包（src = "buf"）共用同一套
/// 游標結構，key 後綴不同。
struct JokerGen {
    rarity: Cursor,
    edition: Cursor,
    common: Cursor,
    uncommon: Cursor,
    rare: Cursor,
    common_key: KeyBuf,
    uncommon_key: KeyBuf,
    rare_key: KeyBuf,
    eternal_perishable: Cursor,
    rental: Cursor,
    seed: SeedCtx,
}

impl JokerGen {
    fn new(seed: &SeedCtx, ante: u8, src: &str) -> Self {
        let common_key = source_key("Joker1", src, ante);
        let uncommon_key = source_key("Joker2", src, ante);
        let rare_key = source_key("Joker3", src, ante);
        let mut rarity_key = ante_key("rarity", ante);
        rarity_key.push_str(src);
        Self {
            rarity: Cursor::new(&rarity_key, seed),
            edition: Cursor::new(&source_key("edi", src, ante), seed),
            common: Cursor::new(&common_key, seed),
            uncommon: Cursor::new(&uncommon_key, seed),
            rare: Cursor::new(&rare_key, seed),
            common_key,
            uncommon_key,
            rare_key,
            eternal_perishable: Cursor::new(&ante_key("etperpoll", ante), seed),
            rental: Cursor::new(&ante_key("ssjr", ante), seed),
            seed: *seed,
        }
    }

    fn next(&mut self, state: &RunState, stake: Stake) -> JokerItem {
        let rarity_roll = self.rarity.random();
        let rarity = if rarity_roll > RARE_THRESHOLD {
            Rarity::Rare
        } else if rarity_roll > UNCOMMON_THRESHOLD {
            Rarity::Uncommon
        } else {
            Rarity::Common
        };

        let edition_roll = self.edition.random();
        let edition = poll_edition(edition_roll, state.vouchers.edition_rate_mult(), true);

        let (cursor, base_key) = match rarity {
            Rarity::Common => (&mut self.common, &self.common_key),
            Rarity::Uncommon => (&mut self.uncommon, &self.uncommon_key),
            _ => (&mut self.rare, &self.rare_key),
        };
        let pool_size = JokerId::pool_size(rarity);
        let mut id = JokerId::from_pool_index(rarity, cursor.randint(0, pool_size - 1));
        // 已擁有的 Joker 不重複出現，除非 Showman 已啟用
        let mut resample = 2;
        while !state.showman && state.owns_joker(id) && resample < RESAMPLE_CAP {
            let mut alt = Cursor::new(&base_key.resample(resample), &self.seed);
            id = JokerId::from_pool_index(rarity, alt.randint(0, pool_size - 1));
            resample += 1;
        }

        let mut stickers = Stickers::none();
        if stake.rolls_eternal() {
            let roll = self.eternal_perishable.random();
            if roll > STICKER_THRESHOLD {
                stickers = stickers.with(Stickers::ETERNAL);
            } else if stake.rolls_perishable() && roll > PERISHABLE_FLOOR {
                stickers = stickers.with(Stickers::PERISHABLE);
            }
        }
        if stake.rolls_rental() && self.rental.random() > STICKER_THRESHOLD {
            stickers = stickers.with(Stickers::RENTAL);
        }

        JokerItem {
            id,
            edition,
            stickers,
        }
    }
}

// ============================================================================
// 商店物品流
// ============================================================================

/// 商店品類排除旗標：被排除的品類產出 `ShopItem::Excluded`，
/// 對應的子游標不推進。品類擲點本身一定推進，因此任意兩條
/// 排除集不同的商店流對同一個卡槽看到相同的品類與相同的物品。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShopExclusions(u8);

impl ShopExclusions {
    pub const JOKERS: ShopExclusions = ShopExclusions(1);
    pub const TAROTS: ShopExclusions = ShopExclusions(2);
    pub const PLANETS: ShopExclusions = ShopExclusions(4);
    pub const PLAYING_CARDS: ShopExclusions = ShopExclusions(8);
    pub const SPECTRALS: ShopExclusions = ShopExclusions(16);

    pub fn none() -> Self {
        ShopExclusions(0)
    }

    /// 只生成 Joker
    pub fn all_but_jokers() -> Self {
        Self::TAROTS
            .with(Self::PLANETS)
            .with(Self::PLAYING_CARDS)
            .with(Self::SPECTRALS)
    }

    pub fn with(self, other: ShopExclusions) -> Self {
        ShopExclusions(self.0 | other.0)
    }

    pub fn contains(self, other: ShopExclusions) -> bool {
        self.0 & other.0 == other.0
    }
}

/// 商店卡槽產出的物品
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShopItem {
    Joker(JokerItem),
    Tarot(TarotId),
    Planet(PlanetId),
    Spectral(SpectralId),
    PlayingCard(CardItem),
    /// 品類被流排除，物品未生成
    Excluded,
}

/// 一個 ante 的商店卡槽序列（跨 reroll 的連續佇列）
pub struct ShopItemStream {
    type_cursor: Cursor,
    exclusions: ShopExclusions,
    joker: JokerGen,
    tarot: Cursor,
    planet: Cursor,
    spectral: Cursor,
    playing_card: Cursor,
}

impl ShopItemStream {
    pub fn new(seed: &SeedCtx, ante: u8, exclusions: ShopExclusions) -> Self {
        Self {
            type_cursor: Cursor::new(&ante_key("cdt", ante), seed),
            exclusions,
            joker: JokerGen::new(seed, ante, "sho"),
            tarot: Cursor::new(&source_key("Tarot", "sho", ante), seed),
            planet: Cursor::new(&source_key("Planet", "sho", ante), seed),
            spectral: Cursor::new(&source_key("Spectral", "sho", ante), seed),
            playing_card: Cursor::new(&source_key("front", "sho", ante), seed),
        }
    }

    /// 只看 Joker 卡槽的商店流
    pub fn jokers_only(seed: &SeedCtx, ante: u8) -> Self {
        Self::new(seed, ante, ShopExclusions::all_but_jokers())
    }

    /// 下一個卡槽的物品
    pub fn next(&mut self, state: &RunState, deck: DeckType, stake: Stake) -> ShopItem {
        let tarot_rate = SHOP_RATE_TAROT * state.vouchers.tarot_rate_mult();
        let planet_rate = SHOP_RATE_PLANET * state.vouchers.planet_rate_mult();
        let card_rate = state.vouchers.playing_card_rate();
        let spectral_rate = deck.shop_spectral_rate();
        let total = SHOP_RATE_JOKER + tarot_rate + planet_rate + card_rate + spectral_rate;

        let roll = self.type_cursor.random() * total;
        if roll < SHOP_RATE_JOKER {
            if self.exclusions.contains(ShopExclusions::JOKERS) {
                return ShopItem::Excluded;
            }
            return ShopItem::Joker(self.joker.next(state, stake));
        }
        if roll < SHOP_RATE_JOKER + tarot_rate {
            if self.exclusions.contains(ShopExclusions::TAROTS) {
                return ShopItem::Excluded;
            }
            return ShopItem::Tarot(TarotId::all()[self.tarot.randint(0, TAROT_COUNT - 1)]);
        }
        if roll < SHOP_RATE_JOKER + tarot_rate + planet_rate {
            if self.exclusions.contains(ShopExclusions::PLANETS) {
                return ShopItem::Excluded;
            }
            return ShopItem::Planet(PlanetId::all()[self.planet.randint(0, PLANET_COUNT - 1)]);
        }
        if roll < SHOP_RATE_JOKER + tarot_rate + planet_rate + card_rate {
            if self.exclusions.contains(ShopExclusions::PLAYING_CARDS) {
                return ShopItem::Excluded;
            }
            return ShopItem::PlayingCard(CardItem::from_deck_index(
                self.playing_card.randint(0, 51),
            ));
        }
        if self.exclusions.contains(ShopExclusions::SPECTRALS) {
            return ShopItem::Excluded;
        }
        let pool = SpectralId::pool();
        ShopItem::Spectral(pool[self.spectral.randint(0, pool.len() - 1)])
    }
}

// ============================================================================
// 包內容流
// ============================================================================

/// Arcana 包的一張牌
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArcanaCard {
    Tarot(TarotId),
    /// 傳說 Joker 的入口
    TheSoul,
}

/// Arcana 包內容（每包被要求抽出恰好尺寸張）
pub struct ArcanaStream {
    soul: Cursor,
    tarot: Cursor,
}

impl ArcanaStream {
    pub fn new(seed: &SeedCtx, ante: u8) -> Self {
        Self {
            soul: Cursor::new(&ante_key("soul_Tarot", ante), seed),
            tarot: Cursor::new(&source_key("Tarot", "ar1", ante), seed),
        }
    }

    pub fn next(&mut self) -> ArcanaCard {
        if self.soul.random() > SOUL_THRESHOLD {
            // Soul 出現時 Tarot 池游標不推進
            return ArcanaCard::TheSoul;
        }
        ArcanaCard::Tarot(TarotId::all()[self.tarot.randint(0, TAROT_COUNT - 1)])
    }
}

/// Celestial 包內容
pub struct CelestialStream {
    planet: Cursor,
}

impl CelestialStream {
    pub fn new(seed: &SeedCtx, ante: u8) -> Self {
        Self {
            planet: Cursor::new(&source_key("Planet", "pl1", ante), seed),
        }
    }

    pub fn next(&mut self) -> PlanetId {
        PlanetId::all()[self.planet.randint(0, PLANET_COUNT - 1)]
    }
}

/// Spectral 包內容（TheSoul / BlackHole 走獨立擲點）
pub struct SpectralStream {
    soul: Cursor,
    spectral: Cursor,
}

impl SpectralStream {
    pub fn new(seed: &SeedCtx, ante: u8) -> Self {
        Self {
            soul: Cursor::new(&ante_key("soul_Spectral", ante), seed),
            spectral: Cursor::new(&source_key("Spectral", "spe", ante), seed),
        }
    }

    pub fn next(&mut self) -> SpectralId {
        if self.soul.random() > SOUL_THRESHOLD {
            return SpectralId::TheSoul;
        }
        if self.soul.random() > SOUL_THRESHOLD {
            return SpectralId::BlackHole;
        }
        let pool = SpectralId::pool();
        pool[self.spectral.randint(0, pool.len() - 1)]
    }
}

/// Buffoon 包內容（Joker 生成走 `buf` 後綴 key）
pub struct BuffoonStream {
    joker: JokerGen,
}

impl BuffoonStream {
    pub fn new(seed: &SeedCtx, ante: u8) -> Self {
        Self {
            joker: JokerGen::new(seed, ante, "buf"),
        }
    }

    pub fn next(&mut self, state: &RunState, stake: Stake) -> JokerItem {
        self.joker.next(state, stake)
    }
}

/// 標準包內容（撲克牌）
pub struct StandardStream {
    has_enhancement: Cursor,
    enhancement: Cursor,
    front: Cursor,
    edition: Cursor,
    has_seal: Cursor,
    seal_type: Cursor,
}

impl StandardStream {
    pub fn new(seed: &SeedCtx, ante: u8) -> Self {
        Self {
            has_enhancement: Cursor::new(&ante_key("stdset", ante), seed),
            enhancement: Cursor::new(&ante_key("Enhancedsta", ante), seed),
            front: Cursor::new(&ante_key("frontsta", ante), seed),
            edition: Cursor::new(&ante_key("standard_edition", ante), seed),
            has_seal: Cursor::new(&ante_key("stdseal", ante), seed),
            seal_type: Cursor::new(&ante_key("stdsealtype", ante), seed),
        }
    }

    pub fn next(&mut self) -> CardItem {
        let enhancement = if self.has_enhancement.random() > STANDARD_ENHANCEMENT_THRESHOLD {
            let pool = Enhancement::pack_pool();
            pool[self.enhancement.randint(0, pool.len() - 1)]
        } else {
            Enhancement::None
        };
        let mut card = CardItem::from_deck_index(self.front.randint(0, 51));
        card.enhancement = enhancement;
        // 標準包的牌不會是 Negative
        card.edition = poll_edition(self.edition.random(), 1.0, false);
        if self.has_seal.random() > STANDARD_SEAL_THRESHOLD {
            let pool = Seal::pool();
            card.seal = pool[self.seal_type.randint(0, pool.len() - 1)];
        }
        card
    }
}

// ============================================================================
// Soul Joker 流
// ============================================================================

/// 整個種子一條的傳說 Joker 流
///
/// 只在包裡實際發現一張 Soul 時推進一次；以 ante 順序走訪、
/// 禁止 per-ante 重置。版本擲點用發現 Soul 的 ante 的 `edisou` key，
/// 同一 ante 的第二張 Soul 繼續推進同一條版本游標。
pub struct SoulJokerStream {
    cursor: Cursor,
    base_key: KeyBuf,
    seed: SeedCtx,
    edition_cursors: [Option<Cursor>; (MAX_ANTE as usize) + 1],
}

impl SoulJokerStream {
    pub fn new(seed: &SeedCtx) -> Self {
        let base_key = KeyBuf::new("Joker4");
        Self {
            cursor: Cursor::new(&base_key, seed),
            base_key,
            seed: *seed,
            edition_cursors: [None; (MAX_ANTE as usize) + 1],
        }
    }

    /// 下一張 Soul 會給出的傳說 Joker（`ante` = 發現 Soul 的 ante）
    pub fn next(&mut self, ante: u8, state: &RunState) -> JokerItem {
        let pool_size = JokerId::pool_size(Rarity::Legendary);
        let mut id = JokerId::from_pool_index(Rarity::Legendary, self.cursor.randint(0, pool_size - 1));
        let mut resample = 2;
        while !state.showman && state.owns_joker(id) && resample < RESAMPLE_CAP {
            let mut alt = Cursor::new(&self.base_key.resample(resample), &self.seed);
            id = JokerId::from_pool_index(Rarity::Legendary, alt.randint(0, pool_size - 1));
            resample += 1;
        }

        let slot = ante as usize;
        let edition_cursor = self.edition_cursors[slot]
            .get_or_insert_with(|| Cursor::new(&source_key("edi", "sou", ante), &self.seed));
        let edition = poll_edition(
            edition_cursor.random(),
            state.vouchers.edition_rate_mult(),
            true,
        );

        JokerItem {
            id,
            edition,
            stickers: Stickers::none(),
        }
    }
}

// ============================================================================
// 單元測試
// ============================================================================
