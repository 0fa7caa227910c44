//! 生成常量定義

// ============================================================================
// 種子空間
// ============================================================================

/// 種子字元表（35 字元，不含 0 與小寫）
pub const SEED_ALPHABET: &[u8] = b"123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// 支援的最大 ante（filter 的 ante 位遮罩寬度之內）
pub const MAX_ANTE: u8 = 39;

/// 沒有指定 antes 時的預設範圍上限
pub const DEFAULT_MAX_ANTE: u8 = 8;

// ============================================================================
// 商店與卡包
// ============================================================================

/// 每個 ante 的卡包槽位數（3 次進店 × 每店 2 包）
pub const PACK_SLOTS_PER_ANTE: usize = 6;

/// 商店卡槽佇列的可定址上限（clause 的 64-bit 遮罩寬度）
pub const MAX_SHOP_SLOTS: usize = 64;

/// 商店品類基礎權重
pub const SHOP_RATE_JOKER: f64 = 20.0;
pub const SHOP_RATE_TAROT: f64 = 4.0;
pub const SHOP_RATE_PLANET: f64 = 4.0;

// ============================================================================
// 擲點門檻
// ============================================================================

/// 稀有度擲點：> RARE_THRESHOLD 出 Rare，> UNCOMMON_THRESHOLD 出 Uncommon
pub const RARE_THRESHOLD: f64 = 0.95;
pub const UNCOMMON_THRESHOLD: f64 = 0.7;

/// Arcana / Spectral 包內 Soul 擲點門檻（> 門檻出現）
pub const SOUL_THRESHOLD: f64 = 0.997;

/// 版本基礎出現率（實際門檻再乘上 Hone / Glow Up 倍數）
pub const EDITION_NEGATIVE_RATE: f64 = 0.003;
pub const EDITION_POLYCHROME_RATE: f64 = 0.003;
pub const EDITION_HOLO_RATE: f64 = 0.014;
pub const EDITION_FOIL_RATE: f64 = 0.02;

/// 標準包：增強出現擲點門檻（> 門檻帶增強）
pub const STANDARD_ENHANCEMENT_THRESHOLD: f64 = 0.6;
/// 標準包：封印出現擲點門檻（> 門檻帶封印）
pub const STANDARD_SEAL_THRESHOLD: f64 = 0.75;

/// 貼紙擲點門檻（Eternal / Rental > 0.7；Perishable 落在 (0.4, 0.7]）
pub const STICKER_THRESHOLD: f64 = 0.7;
pub const PERISHABLE_FLOOR: f64 = 0.4;
