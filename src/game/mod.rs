//! 遊戲領域模組
//!
//! 包含種子搜尋所需的內容生成定義：
//! - `constants`: 種子空間、商店權重與擲點門檻
//! - `rng`: 種子決定性 PRNG 原語（pseudohash / 流節點 / LuaRandom）
//! - `cards`: 花色、點數、增強、封印、版本
//! - `joker`: Joker 表與稀有度池
//! - `consumables`: Tarot / Planet / Spectral 表
//! - `vouchers`: Voucher 表與啟用集合
//! - `tags`: Tag 表
//! - `blinds`: Boss Blind 表與 per-ante 池
//! - `packs`: 卡包種類 × 尺寸與加權池
//! - `decks`: 牌組（Ghost 影響商店 Spectral）
//! - `stakes`: Stake 難度（貼紙擲點）

pub mod blinds;
pub mod cards;
pub mod constants;
pub mod consumables;
pub mod decks;
pub mod joker;
pub mod packs;
pub mod rng;
pub mod stakes;
pub mod tags;
pub mod vouchers;

pub use blinds::{BossBlind, BOSS_COUNT};
pub use cards::{CardItem, Edition, Enhancement, Rank, Seal, Suit};
pub use constants::*;
pub use consumables::{PlanetId, SpectralId, TarotId, PLANET_COUNT, SPECTRAL_COUNT, TAROT_COUNT};
pub use decks::DeckType;
pub use joker::{JokerId, JokerItem, Rarity, Stickers, JOKER_COUNT};
pub use packs::{PackKind, PackSize, PackType, MAX_PACK_CONTENT, PACK_TYPE_COUNT};
pub use rng::{Cursor, CursorVec, LuaRandom, SeedCtx, SeedCtxVec, LANES, SEED_LEN};
pub use stakes::Stake;
pub use tags::{TagId, TAG_COUNT};
pub use vouchers::{VoucherId, VoucherSet, VOUCHER_COUNT};
