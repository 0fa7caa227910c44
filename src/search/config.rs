//! 過濾器設定解析
//!
//! 外部格式是 JSON：`must` / `should` / `mustNot` 三組子句，
//! 加上 deck / stake 與中繼資料。這裡逐值走訪 `serde_json::Value`
//! 做解析與驗證，錯誤訊息帶著出錯子句的路徑（如 `must[2].value`），
//! 驗證失敗時搜尋不會開始。

use std::fmt;

use serde_json::Value;

use crate::game::cards::{Edition, Enhancement, Rank, Seal, Suit};
use crate::game::decks::DeckType;
use crate::game::joker::{normalize, JokerId, Rarity, Stickers};
use crate::game::stakes::Stake;
use crate::game::tags::TagId;
use crate::game::vouchers::VoucherId;
use crate::game::blinds::BossBlind;
use crate::game::consumables::{PlanetId, SpectralId, TarotId};

use super::clause::{
    ante_mask, default_ante_mask, Clause, ClauseBody, PreparedFilter, Sources, TagSlot, Wildcard,
    DEFAULT_PACK_SLOTS, DEFAULT_SHOP_SLOTS,
};

/// 設定錯誤：路徑 + 訊息
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigError {
    pub path: String,
    pub message: String,
}

impl ConfigError {
    fn new(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// 入口
// ============================================================================

/// 由 JSON 字串準備過濾器
pub fn prepare_str(json: &str) -> Result<PreparedFilter, ConfigError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| ConfigError::new("$", format!("invalid JSON: {}", e)))?;
    prepare(&value)
}

/// 由已解析的 JSON 值準備過濾器
pub fn prepare(value: &Value) -> Result<PreparedFilter, ConfigError> {
    let obj = value
        .as_object()
        .ok_or_else(|| ConfigError::new("$", "filter must be a JSON object"))?;

    let name = obj.get("name").and_then(Value::as_str).map(str::to_string);

    let deck = match obj.get("deck") {
        None | Some(Value::Null) => DeckType::Red,
        Some(Value::String(s)) => DeckType::from_name(s)
            .ok_or_else(|| ConfigError::new("deck", format!("unknown deck \"{}\"", s)))?,
        Some(_) => return Err(ConfigError::new("deck", "expected a string")),
    };
    let stake = match obj.get("stake") {
        None | Some(Value::Null) => Stake::White,
        Some(Value::String(s)) => Stake::from_name(s)
            .ok_or_else(|| ConfigError::new("stake", format!("unknown stake \"{}\"", s)))?,
        Some(_) => return Err(ConfigError::new("stake", "expected a string")),
    };

    let must = parse_clause_list(obj.get("must"), "must")?;
    let should = parse_clause_list(obj.get("should"), "should")?;
    let must_not = parse_clause_list(obj.get("mustNot"), "mustNot")?;

    if must.is_empty() && should.is_empty() && must_not.is_empty() {
        return Err(ConfigError::new("$", "filter has no clauses"));
    }
    if should.len() > super::score::MAX_SHOULD {
        return Err(ConfigError::new(
            "should",
            format!("at most {} should clauses are supported", super::score::MAX_SHOULD),
        ));
    }

    Ok(PreparedFilter {
        name,
        deck,
        stake,
        must,
        should,
        must_not,
    })
}

fn parse_clause_list(value: Option<&Value>, path: &str) -> Result<Vec<Clause>, ConfigError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, v)| parse_clause(v, &format!("{}[{}]", path, i)))
            .collect(),
        Some(_) => Err(ConfigError::new(path, "expected an array of clauses")),
    }
}

// ============================================================================
// 子句解析
// ============================================================================

fn parse_clause(value: &Value, path: &str) -> Result<Clause, ConfigError> {
    let obj = value
        .as_object()
        .ok_or_else(|| ConfigError::new(path, "clause must be an object"))?;

    let kind = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ConfigError::new(path, "clause is missing \"type\""))?;
    let kind = normalize(kind);

    // value / values 互斥
    if obj.contains_key("value") && obj.contains_key("values") {
        return Err(ConfigError::new(
            path,
            "\"value\" and \"values\" are mutually exclusive",
        ));
    }
    let raw_values = collect_values(obj, path)?;

    let antes = match obj.get("antes") {
        None | Some(Value::Null) => default_ante_mask(),
        Some(v) => ante_mask(&parse_u8_list(v, &format!("{}.antes", path))?),
    };

    let edition = match obj.get("edition") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => match normalize(s).as_str() {
            "any" | "" => None,
            _ => Some(Edition::from_name(s).ok_or_else(|| {
                ConfigError::new(&format!("{}.edition", path), format!("unknown edition \"{}\"", s))
            })?),
        },
        Some(_) => return Err(ConfigError::new(&format!("{}.edition", path), "expected a string")),
    };

    let score = match obj.get("score") {
        None | Some(Value::Null) => 1,
        Some(v) => v
            .as_i64()
            .ok_or_else(|| ConfigError::new(&format!("{}.score", path), "expected an integer"))?,
    };
    let min = match obj.get("min") {
        None | Some(Value::Null) => None,
        Some(v) => Some(v.as_u64().ok_or_else(|| {
            ConfigError::new(&format!("{}.min", path), "expected a non-negative integer")
        })? as u32),
    };

    let stickers = parse_stickers(obj, path)?;

    // 來源：巢狀 sources 物件與舊式平鋪欄位都接受
    let (mut sources, mut shop_slots, mut pack_slots) = parse_sources(obj, path)?;

    let body = match kind.as_str() {
        "joker" => {
            let (targets, wildcard) =
                parse_joker_targets(&raw_values, path, /* legendary_ok = */ false)?;
            ClauseBody::Joker {
                targets,
                wildcard,
                stickers,
            }
        }
        "souljoker" => {
            // 傳說 Joker 不會出現在商店卡槽
            let shop_explicit = obj.contains_key("shopSlots")
                || obj
                    .get("sources")
                    .and_then(Value::as_object)
                    .map_or(false, |m| m.contains_key("shopSlots"));
            if !shop_explicit {
                sources.shop = false;
                shop_slots = 0;
            }
            let (targets, wildcard) = parse_soul_joker_targets(&raw_values, path)?;
            ClauseBody::SoulJoker { targets, wildcard }
        }
        "voucher" => ClauseBody::Voucher {
            targets: parse_enum_targets(&raw_values, path, "voucher", VoucherId::from_name)?,
        },
        "tarotcard" | "tarot" => {
            let (targets, any) = parse_consumable_targets(&raw_values, path, "tarot", TarotId::from_name)?;
            ClauseBody::Tarot { targets, any }
        }
        "planetcard" | "planet" => {
            let (targets, any) =
                parse_consumable_targets(&raw_values, path, "planet", PlanetId::from_name)?;
            ClauseBody::Planet { targets, any }
        }
        "spectralcard" | "spectral" => {
            let (targets, any) =
                parse_consumable_targets(&raw_values, path, "spectral", SpectralId::from_name)?;
            ClauseBody::Spectral { targets, any }
        }
        "playingcard" => parse_playing_card(obj, &raw_values, path)?,
        "tag" | "smallblindtag" | "bigblindtag" => {
            let slot = match kind.as_str() {
                "smallblindtag" => TagSlot::SmallBlind,
                "bigblindtag" => TagSlot::BigBlind,
                _ => TagSlot::Any,
            };
            ClauseBody::Tag {
                targets: parse_enum_targets(&raw_values, path, "tag", TagId::from_name)?,
                slot,
            }
        }
        "boss" => ClauseBody::Boss {
            targets: parse_enum_targets(&raw_values, path, "boss", BossBlind::from_name)?,
        },
        "and" | "or" => {
            let children = match obj.get("clauses") {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(items)) => items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| parse_clause(v, &format!("{}.clauses[{}]", path, i)))
                    .collect::<Result<_, _>>()?,
                Some(_) => {
                    return Err(ConfigError::new(
                        &format!("{}.clauses", path),
                        "expected an array of clauses",
                    ))
                }
            };
            if kind == "and" {
                ClauseBody::And { children }
            } else {
                ClauseBody::Or { children }
            }
        }
        other => {
            return Err(ConfigError::new(
                path,
                format!("unknown clause type \"{}\"", other),
            ))
        }
    };

    // 非物品類別不看卡槽
    if matches!(
        body,
        ClauseBody::Voucher { .. } | ClauseBody::Tag { .. } | ClauseBody::Boss { .. }
    ) {
        shop_slots = 0;
        pack_slots = 0;
    }
    // 撲克牌只來自標準包
    if matches!(body, ClauseBody::PlayingCard { .. }) {
        sources.shop = false;
        shop_slots = 0;
    }

    Ok(Clause {
        body,
        antes,
        shop_slots,
        pack_slots,
        edition,
        sources,
        score,
        min,
    })
}

// ============================================================================
// 欄位解析
// ============================================================================

/// value / values 統一收集為字串列表
fn collect_values(
    obj: &serde_json::Map<String, Value>,
    path: &str,
) -> Result<Vec<String>, ConfigError> {
    if let Some(v) = obj.get("value") {
        let s = v
            .as_str()
            .ok_or_else(|| ConfigError::new(&format!("{}.value", path), "expected a string"))?;
        return Ok(vec![s.to_string()]);
    }
    match obj.get("values") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, v)| {
                v.as_str().map(str::to_string).ok_or_else(|| {
                    ConfigError::new(&format!("{}.values[{}]", path, i), "expected a string")
                })
            })
            .collect(),
        Some(_) => Err(ConfigError::new(
            &format!("{}.values", path),
            "expected an array of strings",
        )),
    }
}

fn is_wildcard_word(s: &str) -> bool {
    matches!(
        normalize(s).as_str(),
        "any" | "anyjoker" | "anycommon" | "anyuncommon" | "anyrare" | "anylegendary" | ""
    ) || s.trim() == "*"
}

fn parse_wildcard(s: &str) -> Option<Wildcard> {
    if s.trim() == "*" {
        return Some(Wildcard::AnyJoker);
    }
    match normalize(s).as_str() {
        "any" | "anyjoker" => Some(Wildcard::AnyJoker),
        "anycommon" => Some(Wildcard::AnyCommon),
        "anyuncommon" => Some(Wildcard::AnyUncommon),
        "anyrare" => Some(Wildcard::AnyRare),
        "anylegendary" => Some(Wildcard::AnyLegendary),
        _ => None,
    }
}

fn parse_joker_targets(
    raw: &[String],
    path: &str,
    legendary_ok: bool,
) -> Result<(Vec<JokerId>, Wildcard), ConfigError> {
    if raw.is_empty() {
        return Err(ConfigError::new(path, "joker clause needs \"value\" or \"values\""));
    }
    if raw.len() == 1 {
        if let Some(w) = parse_wildcard(&raw[0]) {
            return Ok((Vec::new(), w));
        }
    }
    let mut targets = Vec::with_capacity(raw.len());
    for (i, s) in raw.iter().enumerate() {
        if is_wildcard_word(s) {
            return Err(ConfigError::new(
                &format!("{}.values[{}]", path, i),
                "wildcards are not allowed inside \"values\"",
            ));
        }
        let id = JokerId::from_name(s).ok_or_else(|| {
            ConfigError::new(&format!("{}.value", path), format!("unknown joker \"{}\"", s))
        })?;
        if !legendary_ok && id.rarity() == Rarity::Legendary {
            return Err(ConfigError::new(
                &format!("{}.value", path),
                format!(
                    "\"{}\" is a legendary joker; use type \"souljoker\" instead",
                    s
                ),
            ));
        }
        targets.push(id);
    }
    Ok((targets, Wildcard::None))
}

fn parse_soul_joker_targets(
    raw: &[String],
    path: &str,
) -> Result<(Vec<JokerId>, Wildcard), ConfigError> {
    if raw.is_empty() {
        // 無值 = 任一傳說
        return Ok((Vec::new(), Wildcard::AnyLegendary));
    }
    if raw.len() == 1 {
        if let Some(w) = parse_wildcard(&raw[0]) {
            return Ok((Vec::new(), w));
        }
    }
    let mut targets = Vec::with_capacity(raw.len());
    for s in raw {
        let id = JokerId::from_name(s).ok_or_else(|| {
            ConfigError::new(&format!("{}.value", path), format!("unknown joker \"{}\"", s))
        })?;
        if id.rarity() != Rarity::Legendary {
            return Err(ConfigError::new(
                &format!("{}.value", path),
                format!("\"{}\" is not a legendary joker; use type \"joker\"", s),
            ));
        }
        targets.push(id);
    }
    Ok((targets, Wildcard::None))
}

fn parse_enum_targets<T>(
    raw: &[String],
    path: &str,
    what: &str,
    from_name: impl Fn(&str) -> Option<T>,
) -> Result<Vec<T>, ConfigError> {
    if raw.is_empty() {
        return Err(ConfigError::new(
            path,
            format!("{} clause needs \"value\" or \"values\"", what),
        ));
    }
    raw.iter()
        .map(|s| {
            from_name(s).ok_or_else(|| {
                ConfigError::new(
                    &format!("{}.value", path),
                    format!("unknown {} \"{}\"", what, s),
                )
            })
        })
        .collect()
}

fn parse_consumable_targets<T>(
    raw: &[String],
    path: &str,
    what: &str,
    from_name: impl Fn(&str) -> Option<T>,
) -> Result<(Vec<T>, bool), ConfigError> {
    if raw.len() == 1 && is_wildcard_word(&raw[0]) {
        return Ok((Vec::new(), true));
    }
    let targets = parse_enum_targets(raw, path, what, from_name)?;
    Ok((targets, false))
}

fn parse_playing_card(
    obj: &serde_json::Map<String, Value>,
    raw_values: &[String],
    path: &str,
) -> Result<ClauseBody, ConfigError> {
    let mut suit = None;
    let mut rank = None;

    // value 形如 "7 of Clubs"
    if let Some(v) = raw_values.first() {
        if !is_wildcard_word(v) {
            let (r, s) = v.split_once(" of ").ok_or_else(|| {
                ConfigError::new(
                    &format!("{}.value", path),
                    format!("expected \"Rank of Suit\", got \"{}\"", v),
                )
            })?;
            rank = Some(Rank::from_name(r).ok_or_else(|| {
                ConfigError::new(&format!("{}.value", path), format!("unknown rank \"{}\"", r))
            })?);
            suit = Some(Suit::from_name(s).ok_or_else(|| {
                ConfigError::new(&format!("{}.value", path), format!("unknown suit \"{}\"", s))
            })?);
        }
    }

    if let Some(s) = get_opt_name(obj, "suit", path)? {
        suit = Some(Suit::from_name(&s).ok_or_else(|| {
            ConfigError::new(&format!("{}.suit", path), format!("unknown suit \"{}\"", s))
        })?);
    }
    if let Some(s) = get_opt_name(obj, "rank", path)? {
        rank = Some(Rank::from_name(&s).ok_or_else(|| {
            ConfigError::new(&format!("{}.rank", path), format!("unknown rank \"{}\"", s))
        })?);
    }
    let enhancement = match get_opt_name(obj, "enhancement", path)? {
        Some(s) => Some(Enhancement::from_name(&s).ok_or_else(|| {
            ConfigError::new(
                &format!("{}.enhancement", path),
                format!("unknown enhancement \"{}\"", s),
            )
        })?),
        None => None,
    };
    let seal = match get_opt_name(obj, "seal", path)? {
        Some(s) => Some(Seal::from_name(&s).ok_or_else(|| {
            ConfigError::new(&format!("{}.seal", path), format!("unknown seal \"{}\"", s))
        })?),
        None => None,
    };

    Ok(ClauseBody::PlayingCard {
        suit,
        rank,
        enhancement,
        seal,
    })
}

/// 讀取可為 "Any"/"*" 的名稱欄位；萬用值回傳 None（不設限）
fn get_opt_name(
    obj: &serde_json::Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Option<String>, ConfigError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            if is_wildcard_word(s) {
                Ok(None)
            } else {
                Ok(Some(s.clone()))
            }
        }
        Some(_) => Err(ConfigError::new(
            &format!("{}.{}", path, key),
            "expected a string",
        )),
    }
}

fn parse_stickers(
    obj: &serde_json::Map<String, Value>,
    path: &str,
) -> Result<Stickers, ConfigError> {
    match obj.get("stickers") {
        None | Some(Value::Null) => Ok(Stickers::none()),
        Some(Value::Array(items)) => {
            let mut stickers = Stickers::none();
            for (i, v) in items.iter().enumerate() {
                let s = v.as_str().ok_or_else(|| {
                    ConfigError::new(&format!("{}.stickers[{}]", path, i), "expected a string")
                })?;
                let flag = Stickers::from_name(s).ok_or_else(|| {
                    ConfigError::new(
                        &format!("{}.stickers[{}]", path, i),
                        format!("unknown sticker \"{}\"", s),
                    )
                })?;
                stickers = stickers.with(flag);
            }
            Ok(stickers)
        }
        Some(_) => Err(ConfigError::new(
            &format!("{}.stickers", path),
            "expected an array of strings",
        )),
    }
}

fn parse_sources(
    obj: &serde_json::Map<String, Value>,
    path: &str,
) -> Result<(Sources, u64, u8), ConfigError> {
    let mut sources = Sources::default();
    let mut shop_slots = DEFAULT_SHOP_SLOTS;
    let mut pack_slots = DEFAULT_PACK_SLOTS;

    // 巢狀 sources 物件優先；同名平鋪欄位是舊格式
    let nested = match obj.get("sources") {
        None | Some(Value::Null) => None,
        Some(Value::Object(m)) => Some(m),
        Some(_) => {
            return Err(ConfigError::new(
                &format!("{}.sources", path),
                "expected an object",
            ))
        }
    };
    let lookup = |key: &str| nested.and_then(|m| m.get(key)).or_else(|| obj.get(key));

    if let Some(v) = lookup("shopSlots") {
        let slots = parse_u8_list(v, &format!("{}.shopSlots", path))?;
        shop_slots = slots
            .iter()
            .filter(|&&s| (s as usize) < 64)
            .fold(0u64, |m, &s| m | (1u64 << s));
        sources.shop = shop_slots != 0;
    }
    if let Some(v) = lookup("packSlots") {
        let slots = parse_u8_list(v, &format!("{}.packSlots", path))?;
        pack_slots = slots
            .iter()
            .filter(|&&s| (s as usize) < 6)
            .fold(0u8, |m, &s| m | (1u8 << s));
        sources.packs = pack_slots != 0;
    }
    if let Some(v) = lookup("tags") {
        sources.tags = v.as_bool().ok_or_else(|| {
            ConfigError::new(&format!("{}.tags", path), "expected a boolean")
        })?;
    }
    if let Some(v) = lookup("requireMega") {
        sources.require_mega = v.as_bool().ok_or_else(|| {
            ConfigError::new(&format!("{}.requireMega", path), "expected a boolean")
        })?;
    }

    Ok((sources, shop_slots, pack_slots))
}

fn parse_u8_list(value: &Value, path: &str) -> Result<Vec<u8>, ConfigError> {
    let items = value
        .as_array()
        .ok_or_else(|| ConfigError::new(path, "expected an array of integers"))?;
    items
        .iter()
        .enumerate()
        .map(|(i, v)| {
            v.as_u64()
                .filter(|&n| n < 64)
                .map(|n| n as u8)
                .ok_or_else(|| {
                    ConfigError::new(
                        &format!("{}[{}]", path, i),
                        "expected an integer in 0..64",
                    )
                })
        })
        .collect()
}

// ============================================================================
// 單元測試
// ============================================================================
