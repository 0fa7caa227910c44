//! 逐種子標量評估
//!
//! 向量預過濾之後，每個存活 lane 在這裡以同一套流契約重放。
//! 標量路徑是權威：它處理萬用比對、owned-joker 去重、以及
//! Soul-in-pack 聯合條件；向量路徑絕不放行 verifier 會拒絕
//! 以外的種子。計分走同一個 `count` 協定（count > 0 即滿足）。

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::game::constants::{MAX_ANTE, PACK_SLOTS_PER_ANTE};
use crate::game::packs::PackKind;
use crate::game::rng::SeedCtx;

use super::clause::{Category, Clause, ClauseBody, PreparedFilter};
use super::state::RunState;
use super::streams::{
    ArcanaCard, ArcanaStream, BossStream, BuffoonStream, CelestialStream, PackStream,
    ShopExclusions, ShopItem, ShopItemStream, SoulJokerStream, SpectralStream, StandardStream,
    TagStream, VoucherStream,
};

const ANTE_SLOTS: usize = (MAX_ANTE as usize) + 1;

/// 某 ante 觀察到的首張 Voucher（與可能的 Hieroglyph bonus）
#[derive(Clone, Copy, Debug, Default)]
pub struct VoucherObs {
    pub first: Option<crate::game::vouchers::VoucherId>,
    pub bonus: Option<crate::game::vouchers::VoucherId>,
}

/// 單一種子的評估上下文
pub struct ScalarCtx<'a> {
    pub filter: &'a PreparedFilter,
    pub seed: SeedCtx,
    pub state: RunState,
    vouchers_seen: [VoucherObs; ANTE_SLOTS],
}

impl<'a> ScalarCtx<'a> {
    pub fn new(filter: &'a PreparedFilter, seed: &SeedCtx) -> Self {
        Self {
            filter,
            seed: *seed,
            state: RunState::new(),
            vouchers_seen: [VoucherObs::default(); ANTE_SLOTS],
        }
    }

    /// Voucher 啟用走訪與 Boss 快取（需要時才做）
    pub fn prepare(&mut self) {
        if self.filter.needs_vouchers() {
            self.walk_vouchers();
        }
        if self.filter.needs_bosses() {
            self.cache_bosses();
        }
    }

    /// ante 1..=max 依序取首張 Voucher 並無條件啟用；
    /// Hieroglyph / Petroglyph 額外抽一張 bonus 並啟用一次
    fn walk_vouchers(&mut self) {
        let max = self.filter.max_voucher_ante().min(MAX_ANTE);
        for ante in 1..=max {
            let mut stream = VoucherStream::new(&self.seed, ante);
            let first = stream.next(&self.state);
            self.state.activate_voucher(first);
            let mut obs = VoucherObs {
                first: Some(first),
                bonus: None,
            };
            if first.grants_bonus_voucher() {
                let bonus = stream.next(&self.state);
                self.state.activate_voucher(bonus);
                obs.bonus = Some(bonus);
            }
            self.vouchers_seen[ante as usize] = obs;
        }
    }

    /// Boss 流整條走一次快取；生成失敗的 ante 起視為不匹配
    fn cache_bosses(&mut self) {
        let mut max = 1;
        self.filter.walk(|c| {
            if c.category() == Category::Boss {
                max = max.max(c.max_ante());
            }
        });
        let mut stream = BossStream::new(&self.seed);
        for ante in 1..=max.min(MAX_ANTE) {
            match catch_unwind(AssertUnwindSafe(|| stream.next(ante))) {
                Ok(boss) => self.state.set_cached_boss(ante, boss),
                Err(_) => break,
            }
        }
    }

    /// must 全數滿足？Voucher 子句先評（後續品類權重依賴啟用集合，
    /// 啟用本身已在 prepare 完成，這裡只是依規約保持次序）
    pub fn eval_must(&mut self) -> bool {
        let filter = self.filter;
        for clause in filter.must.iter() {
            if clause.category() == Category::Voucher && !self.eval_clause(clause) {
                return false;
            }
        }
        for clause in filter.must.iter() {
            if clause.category() != Category::Voucher && !self.eval_clause(clause) {
                return false;
            }
        }
        true
    }

    /// 任一 mustNot 匹配？
    pub fn any_must_not(&mut self) -> bool {
        let filter = self.filter;
        filter.must_not.iter().any(|c| self.eval_clause(c))
    }

    /// 單一子句是否滿足
    pub fn eval_clause(&mut self, clause: &Clause) -> bool {
        match &clause.body {
            ClauseBody::And { children } => children.iter().all(|c| self.eval_clause(c)),
            ClauseBody::Or { children } => children.iter().any(|c| self.eval_clause(c)),
            _ => self.count_clause(clause, u64::MAX) > 0,
        }
    }

    /// 出現次數（`antes_filter` 與子句的 ante 集合取交集；
    /// And 的 per-ante gate 靠它把子句限制到單一 ante）
    pub fn count_clause(&mut self, clause: &Clause, antes_filter: u64) -> u32 {
        match clause.category() {
            Category::Voucher => self.count_voucher(clause, antes_filter),
            Category::Tag => self.count_tag(clause, antes_filter),
            Category::Boss => self.count_boss(clause, antes_filter),
            Category::Tarot | Category::Planet | Category::Spectral => {
                self.count_consumable(clause, antes_filter)
            }
            Category::Joker => self.count_joker(clause, antes_filter),
            Category::SoulJoker => {
                count_soul_clause(&self.seed, clause, &self.state, antes_filter)
            }
            Category::PlayingCard => self.count_playing_card(clause, antes_filter),
            Category::Compound => self.count_compound(clause, antes_filter),
        }
    }

    fn count_compound(&mut self, clause: &Clause, antes_filter: u64) -> u32 {
        match &clause.body {
            // And: 對子句 ante 聯集的每個 ante 做 gate，全部子句在該
            // ante 匹配時，貢獻有計分子句在該 ante 的最大次數
            ClauseBody::And { children } => {
                if children.is_empty() {
                    return 0;
                }
                let union = children.iter().fold(0u64, |m, c| m | c.antes) & antes_filter;
                let mut total = 0;
                for ante in 0..=MAX_ANTE {
                    if union & (1u64 << ante) == 0 {
                        continue;
                    }
                    let gate = 1u64 << ante;
                    // 每個子句都要在這個 ante 匹配，gate 才通過
                    let mut all_match = true;
                    for c in children.iter() {
                        if self.count_clause(c, gate) == 0 {
                            all_match = false;
                            break;
                        }
                    }
                    if !all_match {
                        continue;
                    }
                    let best = children
                        .iter()
                        .filter(|c| c.score > 0)
                        .map(|c| self.count_clause(c, gate))
                        .max()
                        .unwrap_or(0);
                    total += best;
                }
                total
            }
            ClauseBody::Or { children } => children
                .iter()
                .map(|c| self.count_clause(c, antes_filter))
                .max()
                .unwrap_or(0),
            _ => 0,
        }
    }

    fn count_voucher(&mut self, clause: &Clause, antes_filter: u64) -> u32 {
        let mut count = 0;
        for ante in clause.antes_iter() {
            if antes_filter & (1u64 << ante) == 0 {
                continue;
            }
            let obs = self.vouchers_seen[ante as usize];
            let hit = obs.first.map_or(false, |v| clause.matches_voucher(v))
                || obs.bonus.map_or(false, |v| clause.matches_voucher(v));
            count += hit as u32;
        }
        count
    }

    fn count_tag(&mut self, clause: &Clause, antes_filter: u64) -> u32 {
        let mut count = 0;
        for ante in clause.antes_iter() {
            if antes_filter & (1u64 << ante) == 0 {
                continue;
            }
            let mut stream = TagStream::new(&self.seed, ante);
            let (small, big) = stream.next_pair();
            count += clause.tag_matches(small, big);
        }
        count
    }

    fn count_boss(&mut self, clause: &Clause, antes_filter: u64) -> u32 {
        let mut count = 0;
        for ante in clause.antes_iter() {
            if antes_filter & (1u64 << ante) == 0 {
                continue;
            }
            if let Some(boss) = self.state.cached_boss(ante) {
                count += clause.matches_boss(boss) as u32;
            }
        }
        count
    }

    fn count_consumable(&mut self, clause: &Clause, antes_filter: u64) -> u32 {
        let mut count = 0;
        for ante in clause.antes_iter() {
            if antes_filter & (1u64 << ante) == 0 {
                continue;
            }
            if clause.wants_shop() {
                count += self.count_shop_slots(clause, ante);
            }
            if clause.wants_packs() {
                count += self.count_pack_contents(clause, ante);
            }
        }
        count
    }

    fn count_joker(&mut self, clause: &Clause, antes_filter: u64) -> u32 {
        let mut count = 0;
        for ante in clause.antes_iter() {
            if antes_filter & (1u64 << ante) == 0 {
                continue;
            }
            if clause.wants_shop() {
                count += self.count_shop_slots(clause, ante);
            }
            if clause.wants_packs() {
                count += self.count_buffoon_packs(clause, ante);
            }
        }
        count
    }

    fn count_playing_card(&mut self, clause: &Clause, antes_filter: u64) -> u32 {
        let mut count = 0;
        for ante in clause.antes_iter() {
            if antes_filter & (1u64 << ante) == 0 {
                continue;
            }
            if clause.wants_packs() {
                count += self.count_standard_packs(clause, ante);
            }
        }
        count
    }

    // ------------------------------------------------------------------
    // 商店與卡包走訪
    // ------------------------------------------------------------------

    fn count_shop_slots(&mut self, clause: &Clause, ante: u8) -> u32 {
        let limit = clause.shop_slot_limit();
        if limit == 0 {
            return 0;
        }
        let mut stream = ShopItemStream::new(&self.seed, ante, exclusions_for(clause.category()));
        let mut count = 0;
        for slot in 0..limit {
            let item = stream.next(&self.state, self.filter.deck, self.filter.stake);
            if !clause.includes_shop_slot(slot) {
                continue;
            }
            let hit = match (&item, clause.category()) {
                (ShopItem::Joker(j), Category::Joker) => clause.matches_joker(j),
                (_, Category::Tarot | Category::Planet | Category::Spectral) => {
                    clause.matches_shop_item(&item)
                }
                _ => false,
            };
            count += hit as u32;
        }
        count
    }

    /// Tarot / Planet / Spectral 的包內容；同類卡包在被走訪範圍內
    /// 一律抽出內容以維持對齊，未納入的卡槽只是不計數
    fn count_pack_contents(&mut self, clause: &Clause, ante: u8) -> u32 {
        let mut packs = PackStream::for_ante(&self.seed, ante);
        let mut count = 0;
        match clause.category() {
            Category::Tarot => {
                let mut contents = ArcanaStream::new(&self.seed, ante);
                for slot in 0..PACK_SLOTS_PER_ANTE {
                    let pack = packs.next();
                    if pack.kind != PackKind::Arcana {
                        continue;
                    }
                    for _ in 0..pack.size.content_count() {
                        let card = contents.next();
                        if clause.includes_pack_slot(slot) && clause.accepts_pack_size(pack.size) {
                            if let ArcanaCard::Tarot(t) = card {
                                count += clause.matches_tarot(t) as u32;
                            }
                        }
                    }
                }
            }
            Category::Planet => {
                let mut contents = CelestialStream::new(&self.seed, ante);
                for slot in 0..PACK_SLOTS_PER_ANTE {
                    let pack = packs.next();
                    if pack.kind != PackKind::Celestial {
                        continue;
                    }
                    for _ in 0..pack.size.content_count() {
                        let p = contents.next();
                        if clause.includes_pack_slot(slot) && clause.accepts_pack_size(pack.size) {
                            count += clause.matches_planet(p) as u32;
                        }
                    }
                }
            }
            Category::Spectral => {
                let mut contents = SpectralStream::new(&self.seed, ante);
                for slot in 0..PACK_SLOTS_PER_ANTE {
                    let pack = packs.next();
                    if pack.kind != PackKind::Spectral {
                        continue;
                    }
                    for _ in 0..pack.size.content_count() {
                        let s = contents.next();
                        if clause.includes_pack_slot(slot) && clause.accepts_pack_size(pack.size) {
                            count += clause.matches_spectral(s) as u32;
                        }
                    }
                }
            }
            _ => {}
        }
        count
    }

    fn count_buffoon_packs(&mut self, clause: &Clause, ante: u8) -> u32 {
        let mut packs = PackStream::for_ante(&self.seed, ante);
        let mut contents = BuffoonStream::new(&self.seed, ante);
        let mut count = 0;
        for slot in 0..PACK_SLOTS_PER_ANTE {
            let pack = packs.next();
            if pack.kind != PackKind::Buffoon {
                continue;
            }
            for _ in 0..pack.size.content_count() {
                let item = contents.next(&self.state, self.filter.stake);
                if clause.includes_pack_slot(slot) && clause.accepts_pack_size(pack.size) {
                    count += clause.matches_joker(&item) as u32;
                }
            }
        }
        count
    }

    fn count_standard_packs(&mut self, clause: &Clause, ante: u8) -> u32 {
        let mut packs = PackStream::for_ante(&self.seed, ante);
        let mut contents = StandardStream::new(&self.seed, ante);
        let mut count = 0;
        for slot in 0..PACK_SLOTS_PER_ANTE {
            let pack = packs.next();
            if pack.kind != PackKind::Standard {
                continue;
            }
            for _ in 0..pack.size.content_count() {
                let card = contents.next();
                if clause.includes_pack_slot(slot) && clause.accepts_pack_size(pack.size) {
                    count += clause.matches_card(&card) as u32;
                }
            }
        }
        count
    }
}

/// 品類對應的商店排除集（其餘品類的物品不生成、子游標不推進）
pub(super) fn exclusions_for(category: Category) -> ShopExclusions {
    match category {
        Category::Joker => ShopExclusions::all_but_jokers(),
        Category::Tarot => ShopExclusions::JOKERS
            .with(ShopExclusions::PLANETS)
            .with(ShopExclusions::PLAYING_CARDS)
            .with(ShopExclusions::SPECTRALS),
        Category::Planet => ShopExclusions::JOKERS
            .with(ShopExclusions::TAROTS)
            .with(ShopExclusions::PLAYING_CARDS)
            .with(ShopExclusions::SPECTRALS),
        Category::Spectral => ShopExclusions::JOKERS
            .with(ShopExclusions::TAROTS)
            .with(ShopExclusions::PLANETS)
            .with(ShopExclusions::PLAYING_CARDS),
        _ => ShopExclusions::none(),
    }
}

/// Soul Joker 聯合條件的計數
///
/// 整個種子一條的傳說流以 ante 順序走訪：從 ante 1 到子句最大
/// ante，所有卡包都掃過；每張實際出現的 Soul（Spectral 包裡的
/// BlackHole 同樣入口）推進流一次，授與的 Joker 加進本地 owned
/// 集合影響後續 resample。只有落在子句 ante / 卡槽 / 尺寸範圍
/// 內且比對成功的 Soul 計數。本地狀態不外洩，子句間互不干擾。
pub fn count_soul_clause(
    seed: &SeedCtx,
    clause: &Clause,
    base_state: &RunState,
    antes_filter: u64,
) -> u32 {
    let mut state = base_state.clone();
    let mut soul_stream = SoulJokerStream::new(seed);
    let max = clause.max_ante().min(MAX_ANTE);
    let mut count = 0;
    for ante in 1..=max {
        let mut packs = PackStream::for_ante(seed, ante);
        let mut arcana = ArcanaStream::new(seed, ante);
        let mut spectral = SpectralStream::new(seed, ante);
        for slot in 0..PACK_SLOTS_PER_ANTE {
            let pack = packs.next();
            let souls_in_pack = match pack.kind {
                PackKind::Arcana => {
                    let mut n = 0;
                    for _ in 0..pack.size.content_count() {
                        if arcana.next() == ArcanaCard::TheSoul {
                            n += 1;
                        }
                    }
                    n
                }
                PackKind::Spectral => {
                    let mut n = 0;
                    for _ in 0..pack.size.content_count() {
                        if matches!(
                            spectral.next(),
                            crate::game::consumables::SpectralId::TheSoul
                                | crate::game::consumables::SpectralId::BlackHole
                        ) {
                            n += 1;
                        }
                    }
                    n
                }
                _ => 0,
            };
            for _ in 0..souls_in_pack {
                let item = soul_stream.next(ante, &state);
                state.add_owned_joker(item.id);
                let gated = clause.includes_ante(ante)
                    && antes_filter & (1u64 << ante) != 0
                    && clause.includes_pack_slot(slot)
                    && clause.accepts_pack_size(pack.size);
                if gated && clause.matches_soul_joker(&item) {
                    count += 1;
                }
            }
        }
    }
    count
}

/// 向量遮罩之後的權威重放：must 子句全部以標量流重新評估
pub fn verify_seed(filter: &PreparedFilter, seed: &SeedCtx) -> bool {
    let mut ctx = ScalarCtx::new(filter, seed);
    ctx.prepare();
    ctx.eval_must()
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::config::prepare;
    use serde_json::json;

    fn seed(s: &str) -> SeedCtx {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(s.as_bytes());
        SeedCtx::new(bytes)
    }

    #[test]
    fn test_verify_deterministic() {
        let filter = prepare(&json!({
            "must": [{"type": "tag", "value": "D6Tag", "antes": [1, 2, 3, 4]}]
        }))
        .unwrap();
        let s = seed("DETERMIN");
        assert_eq!(verify_seed(&filter, &s), verify_seed(&filter, &s));
    }

    #[test]
    fn test_voucher_walk_is_monotone_and_logged() {
        let filter = prepare(&json!({
            "must": [{"type": "voucher", "value": "Telescope", "antes": [1, 2, 3, 4, 5, 6, 7, 8]}]
        }))
        .unwrap();
        let s = seed("VOUCHERS");
        let mut ctx = ScalarCtx::new(&filter, &s);
        ctx.prepare();
        // 每個走訪過的 ante 都觀察到首張 Voucher 且已啟用
        for ante in 1..=8u8 {
            let obs = ctx.vouchers_seen[ante as usize];
            let first = obs.first.expect("ante not walked");
            assert!(ctx.state.is_voucher_active(first));
        }
    }

    #[test]
    fn test_tag_clause_agrees_with_stream() {
        let s = seed("TAGCHECK");
        // 找出 ante 1 的實際小盲 Tag，確認以它為目標的子句通過
        let mut stream = TagStream::new(&s, 1);
        let (small, _) = stream.next_pair();
        let filter = prepare(&json!({
            "must": [{"type": "smallblindtag", "value": small.name(), "antes": [1]}]
        }))
        .unwrap();
        assert!(verify_seed(&filter, &s));

        // 錯的槽位不算
        let other = crate::game::tags::TagId::all()
            .iter()
            .copied()
            .find(|t| *t != small)
            .unwrap();
        let miss = prepare(&json!({
            "must": [{"type": "smallblindtag", "value": other.name(), "antes": [1]}]
        }))
        .unwrap();
        // 可能大盲剛好是 other，但小盲一定不是
        let mut ctx = ScalarCtx::new(&miss, &s);
        ctx.prepare();
        assert_eq!(ctx.count_clause(&miss.must[0], u64::MAX), 0);
    }

    #[test]
    fn test_boss_clause_uses_cache() {
        let s = seed("BOSSSEED");
        let mut stream = BossStream::new(&s);
        let ante2 = {
            let _ = stream.next(1);
            stream.next(2)
        };
        let filter = prepare(&json!({
            "must": [{"type": "boss", "value": ante2.name(), "antes": [2]}]
        }))
        .unwrap();
        assert!(verify_seed(&filter, &s));
    }

    #[test]
    fn test_and_gate_requires_same_ante() {
        // 兩個子句 ante 不相交時 And gate 永不通過
        let filter = prepare(&json!({
            "must": [{
                "type": "and",
                "clauses": [
                    {"type": "tag", "value": "D6Tag", "antes": [1]},
                    {"type": "tag", "value": "D6Tag", "antes": [2]}
                ]
            }]
        }))
        .unwrap();
        let s = seed("ANDGATES");
        let mut ctx = ScalarCtx::new(&filter, &s);
        ctx.prepare();
        assert_eq!(ctx.count_clause(&filter.must[0], u64::MAX), 0);
    }

    #[test]
    fn test_empty_compound_unsatisfiable() {
        let filter = prepare(&json!({
            "must": [{"type": "or", "clauses": []}]
        }))
        .unwrap();
        assert!(!verify_seed(&filter, &seed("EMPTYOR1")));
    }

    #[test]
    fn test_ante_union_law() {
        // antes A∪B 的匹配 == antes A 匹配 OR antes B 匹配
        let mk = |antes: serde_json::Value| {
            prepare(&json!({
                "must": [{"type": "tag", "value": "NegativeTag", "antes": antes}]
            }))
            .unwrap()
        };
        let union = mk(json!([1, 2, 3, 4]));
        let a = mk(json!([1, 2]));
        let b = mk(json!([3, 4]));
        for i in 0..64u64 {
            let s = crate::search::seed::Seed::from_index(i * 9973).ctx();
            let u = verify_seed(&union, &s);
            let ab = verify_seed(&a, &s) || verify_seed(&b, &s);
            assert_eq!(u, ab, "seed index {}", i);
        }
    }

    #[test]
    fn test_shop_slot_mask_restriction_law() {
        // 卡槽集合縮小不會增加匹配集
        let wide = prepare(&json!({
            "must": [{"type": "joker", "value": "AnyJoker", "antes": [1],
                      "sources": {"shopSlots": [0, 1, 2, 3]}}]
        }))
        .unwrap();
        let narrow = prepare(&json!({
            "must": [{"type": "joker", "value": "AnyJoker", "antes": [1],
                      "sources": {"shopSlots": [0, 1]}}]
        }))
        .unwrap();
        for i in 0..32u64 {
            let s = crate::search::seed::Seed::from_index(i * 31337).ctx();
            if verify_seed(&narrow, &s) {
                assert!(verify_seed(&wide, &s));
            }
        }
    }
}
