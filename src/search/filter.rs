//! 向量過濾評估
//!
//! 一批 8 個種子 lockstep 評估 must 子句：每個子句產生一個 lane
//! 遮罩，跨子句 AND、子句內跨 ante OR、多目標 OR。Voucher 走訪
//! 先行（後續品類權重依賴啟用集合），首張 Voucher 與 Boss 序列
//! 記錄成批內快取供子句（含複合子句的遞迴評估）查詢。
//!
//! 向量路徑允許高估（owned-joker 去重不追蹤；Soul 聯合條件逐
//! lane 走標量），權威判定由 individual verifier 重放。

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::game::blinds::BossBlind;
use crate::game::constants::{MAX_ANTE, PACK_SLOTS_PER_ANTE};
use crate::game::packs::PackKind;
use crate::game::rng::{SeedCtxVec, LANES};
use crate::game::vouchers::VoucherId;

use super::clause::{Category, Clause, ClauseBody, PreparedFilter};
use super::mask::Mask8;
use super::seed::SeedBatch;
use super::state::{RunState, RunStateVec};
use super::streams::{ArcanaCard, ShopItem};
use super::streams_vec::{
    ArcanaStreamVec, BossStreamVec, BuffoonStreamVec, CelestialStreamVec, PackStreamVec,
    ShopItemStreamVec, SpectralStreamVec, StandardStreamVec, TagStreamVec, VoucherStreamVec,
};
use super::verify::{count_soul_clause, exclusions_for};

const ANTE_SLOTS: usize = (MAX_ANTE as usize) + 1;

/// 一批種子的向量評估上下文
pub struct VectorCtx<'a> {
    pub filter: &'a PreparedFilter,
    pub seeds: SeedCtxVec,
    pub state: RunStateVec,
    voucher_first: [Option<[VoucherId; LANES]>; ANTE_SLOTS],
    voucher_bonus: [[Option<VoucherId>; LANES]; ANTE_SLOTS],
    bosses: [Option<[BossBlind; LANES]>; ANTE_SLOTS],
}

impl<'a> VectorCtx<'a> {
    pub fn new(filter: &'a PreparedFilter, batch: &SeedBatch) -> Self {
        Self {
            filter,
            seeds: batch.ctx_vec(),
            state: RunStateVec::new(),
            voucher_first: [None; ANTE_SLOTS],
            voucher_bonus: [[None; LANES]; ANTE_SLOTS],
            bosses: [None; ANTE_SLOTS],
        }
    }

    /// ante 1..=max 依序觀察並啟用首張 Voucher；
    /// Hieroglyph / Petroglyph 的 lane 個別補抽 bonus
    fn walk_vouchers(&mut self) {
        let max = self.filter.max_voucher_ante().min(MAX_ANTE);
        for ante in 1..=max {
            let mut stream = VoucherStreamVec::new(&self.seeds, ante);
            let firsts = stream.next(&self.state);
            self.state.activate_vouchers(firsts);
            self.voucher_first[ante as usize] = Some(firsts);
            for lane in 0..LANES {
                if firsts[lane].grants_bonus_voucher() {
                    let bonus = stream.next_lane(lane, &self.state);
                    self.state.activate_voucher_lane(lane, bonus);
                    self.voucher_bonus[ante as usize][lane] = Some(bonus);
                }
            }
        }
    }

    /// Boss 流整條走一次；某 ante 生成失敗則其後視為不匹配
    /// （標量重放採同一策略，兩邊一致）
    fn walk_bosses(&mut self) {
        let mut max = 1;
        self.filter.walk(|c| {
            if c.category() == Category::Boss {
                max = max.max(c.max_ante());
            }
        });
        let mut stream = BossStreamVec::new(&self.seeds);
        for ante in 1..=max.min(MAX_ANTE) {
            match catch_unwind(AssertUnwindSafe(|| stream.next(ante))) {
                Ok(bosses) => self.bosses[ante as usize] = Some(bosses),
                Err(_) => break,
            }
        }
    }

    /// 物品走訪用的 per-lane 標量視圖
    fn lane_states(&self) -> [RunState; LANES] {
        std::array::from_fn(|lane| self.state.lane(lane))
    }
}

/// 向量預過濾：回傳通過所有 must 子句的 lane 遮罩
pub fn filter_batch(filter: &PreparedFilter, batch: &SeedBatch) -> Mask8 {
    let mut ctx = VectorCtx::new(filter, batch);
    if filter.needs_vouchers() {
        ctx.walk_vouchers();
    }
    if filter.needs_bosses() {
        ctx.walk_bosses();
    }
    let mut mask = batch.valid();
    for clause in filter.must.iter() {
        mask &= eval_clause_vec(&mut ctx, clause);
        if mask.all_zero() {
            break;
        }
    }
    mask
}

/// 單一子句的 lane 遮罩（複合子句遞迴、短路）
pub fn eval_clause_vec(ctx: &mut VectorCtx, clause: &Clause) -> Mask8 {
    match &clause.body {
        ClauseBody::And { children } => {
            let mut mask = Mask8::ALL;
            for child in children.iter() {
                mask &= eval_clause_vec(ctx, child);
                if mask.all_zero() {
                    break;
                }
            }
            if children.is_empty() {
                Mask8::NONE
            } else {
                mask
            }
        }
        ClauseBody::Or { children } => {
            let mut mask = Mask8::NONE;
            for child in children.iter() {
                mask |= eval_clause_vec(ctx, child);
                if mask.all_ones() {
                    break;
                }
            }
            mask
        }
        ClauseBody::Voucher { .. } => voucher_mask(ctx, clause),
        ClauseBody::Tag { .. } => tag_mask(ctx, clause),
        ClauseBody::Boss { .. } => boss_mask(ctx, clause),
        ClauseBody::Tarot { .. } | ClauseBody::Planet { .. } | ClauseBody::Spectral { .. } => {
            consumable_mask(ctx, clause)
        }
        ClauseBody::Joker { .. } => joker_mask(ctx, clause),
        ClauseBody::SoulJoker { .. } => soul_joker_mask(ctx, clause),
        ClauseBody::PlayingCard { .. } => playing_card_mask(ctx, clause),
    }
}

// ============================================================================
// 各類別
// ============================================================================

fn voucher_mask(ctx: &VectorCtx, clause: &Clause) -> Mask8 {
    let mut mask = Mask8::NONE;
    for ante in clause.antes_iter() {
        let Some(firsts) = ctx.voucher_first[ante as usize] else {
            continue;
        };
        let bonuses = &ctx.voucher_bonus[ante as usize];
        mask |= Mask8::from_fn(|lane| {
            clause.matches_voucher(firsts[lane])
                || bonuses[lane].map_or(false, |b| clause.matches_voucher(b))
        });
        if mask.all_ones() {
            break;
        }
    }
    mask
}

fn tag_mask(ctx: &VectorCtx, clause: &Clause) -> Mask8 {
    let mut mask = Mask8::NONE;
    for ante in clause.antes_iter() {
        let mut stream = TagStreamVec::new(&ctx.seeds, ante);
        let (smalls, bigs) = stream.next_pair();
        mask |= Mask8::from_fn(|lane| clause.tag_matches(smalls[lane], bigs[lane]) > 0);
        if mask.all_ones() {
            break;
        }
    }
    mask
}

fn boss_mask(ctx: &VectorCtx, clause: &Clause) -> Mask8 {
    let mut mask = Mask8::NONE;
    for ante in clause.antes_iter() {
        let Some(bosses) = ctx.bosses[ante as usize] else {
            continue;
        };
        mask |= Mask8::from_fn(|lane| clause.matches_boss(bosses[lane]));
        if mask.all_ones() {
            break;
        }
    }
    mask
}

fn consumable_mask(ctx: &mut VectorCtx, clause: &Clause) -> Mask8 {
    let mut mask = Mask8::NONE;
    for ante in clause.antes_iter() {
        if clause.wants_shop() {
            mask |= shop_mask(ctx, clause, ante);
        }
        if clause.wants_packs() && !mask.all_ones() {
            mask |= consumable_pack_mask(ctx, clause, ante);
        }
        if mask.all_ones() {
            break;
        }
    }
    mask
}

fn joker_mask(ctx: &mut VectorCtx, clause: &Clause) -> Mask8 {
    let mut mask = Mask8::NONE;
    for ante in clause.antes_iter() {
        if clause.wants_shop() {
            mask |= shop_mask(ctx, clause, ante);
        }
        if clause.wants_packs() && !mask.all_ones() {
            mask |= buffoon_pack_mask(ctx, clause, ante);
        }
        if mask.all_ones() {
            break;
        }
    }
    mask
}

/// Soul 聯合條件：流的全域推進依賴每個 lane 的實際 Soul 序列，
/// lockstep 向量化不安全，逐 lane 走標量計數
fn soul_joker_mask(ctx: &VectorCtx, clause: &Clause) -> Mask8 {
    Mask8::from_fn(|lane| {
        let seed = ctx.seeds.lane(lane);
        let state = ctx.state.lane(lane);
        count_soul_clause(&seed, clause, &state, u64::MAX) > 0
    })
}

fn playing_card_mask(ctx: &mut VectorCtx, clause: &Clause) -> Mask8 {
    let mut mask = Mask8::NONE;
    for ante in clause.antes_iter() {
        if clause.wants_packs() {
            mask |= standard_pack_mask(ctx, clause, ante);
        }
        if mask.all_ones() {
            break;
        }
    }
    mask
}

// ============================================================================
// 商店與卡包走訪
// ============================================================================

fn shop_mask(ctx: &mut VectorCtx, clause: &Clause, ante: u8) -> Mask8 {
    let limit = clause.shop_slot_limit();
    if limit == 0 {
        return Mask8::NONE;
    }
    let mut stream = ShopItemStreamVec::new(&ctx.seeds, ante, exclusions_for(clause.category()));
    let mut mask = Mask8::NONE;
    for slot in 0..limit {
        let items = stream.next(&ctx.state, ctx.filter.deck, ctx.filter.stake);
        if !clause.includes_shop_slot(slot) {
            continue;
        }
        mask |= Mask8::from_fn(|lane| match (&items[lane], clause.category()) {
            (ShopItem::Joker(j), Category::Joker) => clause.matches_joker(j),
            (item, Category::Tarot | Category::Planet | Category::Spectral) => {
                clause.matches_shop_item(item)
            }
            _ => false,
        });
    }
    mask
}

fn consumable_pack_mask(ctx: &mut VectorCtx, clause: &Clause, ante: u8) -> Mask8 {
    let mut packs = PackStreamVec::for_ante(&ctx.seeds, ante);
    let mut mask = Mask8::NONE;
    match clause.category() {
        Category::Tarot => {
            let mut contents = ArcanaStreamVec::new(&ctx.seeds, ante);
            for slot in 0..PACK_SLOTS_PER_ANTE {
                let ps = packs.next();
                for lane in 0..LANES {
                    if ps[lane].kind != PackKind::Arcana {
                        continue;
                    }
                    for _ in 0..ps[lane].size.content_count() {
                        let card = contents.next_lane(lane);
                        if clause.includes_pack_slot(slot)
                            && clause.accepts_pack_size(ps[lane].size)
                        {
                            if let ArcanaCard::Tarot(t) = card {
                                if clause.matches_tarot(t) {
                                    mask.set(lane);
                                }
                            }
                        }
                    }
                }
            }
        }
        Category::Planet => {
            let mut contents = CelestialStreamVec::new(&ctx.seeds, ante);
            for slot in 0..PACK_SLOTS_PER_ANTE {
                let ps = packs.next();
                for lane in 0..LANES {
                    if ps[lane].kind != PackKind::Celestial {
                        continue;
                    }
                    for _ in 0..ps[lane].size.content_count() {
                        let p = contents.next_lane(lane);
                        if clause.includes_pack_slot(slot)
                            && clause.accepts_pack_size(ps[lane].size)
                            && clause.matches_planet(p)
                        {
                            mask.set(lane);
                        }
                    }
                }
            }
        }
        Category::Spectral => {
            let mut contents = SpectralStreamVec::new(&ctx.seeds, ante);
            for slot in 0..PACK_SLOTS_PER_ANTE {
                let ps = packs.next();
                for lane in 0..LANES {
                    if ps[lane].kind != PackKind::Spectral {
                        continue;
                    }
                    for _ in 0..ps[lane].size.content_count() {
                        let s = contents.next_lane(lane);
                        if clause.includes_pack_slot(slot)
                            && clause.accepts_pack_size(ps[lane].size)
                            && clause.matches_spectral(s)
                        {
                            mask.set(lane);
                        }
                    }
                }
            }
        }
        _ => {}
    }
    mask
}

fn buffoon_pack_mask(ctx: &mut VectorCtx, clause: &Clause, ante: u8) -> Mask8 {
    let mut packs = PackStreamVec::for_ante(&ctx.seeds, ante);
    let mut contents = BuffoonStreamVec::new(&ctx.seeds, ante);
    let lane_states = ctx.lane_states();
    let mut mask = Mask8::NONE;
    for slot in 0..PACK_SLOTS_PER_ANTE {
        let ps = packs.next();
        for lane in 0..LANES {
            if ps[lane].kind != PackKind::Buffoon {
                continue;
            }
            for _ in 0..ps[lane].size.content_count() {
                let item = contents.next_lane(lane, &lane_states[lane], ctx.filter.stake);
                if clause.includes_pack_slot(slot)
                    && clause.accepts_pack_size(ps[lane].size)
                    && clause.matches_joker(&item)
                {
                    mask.set(lane);
                }
            }
        }
    }
    mask
}

fn standard_pack_mask(ctx: &mut VectorCtx, clause: &Clause, ante: u8) -> Mask8 {
    let mut packs = PackStreamVec::for_ante(&ctx.seeds, ante);
    let mut contents = StandardStreamVec::new(&ctx.seeds, ante);
    let mut mask = Mask8::NONE;
    for slot in 0..PACK_SLOTS_PER_ANTE {
        let ps = packs.next();
        for lane in 0..LANES {
            if ps[lane].kind != PackKind::Standard {
                continue;
            }
            for _ in 0..ps[lane].size.content_count() {
                let card = contents.next_lane(lane);
                if clause.includes_pack_slot(slot)
                    && clause.accepts_pack_size(ps[lane].size)
                    && clause.matches_card(&card)
                {
                    mask.set(lane);
                }
            }
        }
    }
    mask
}

// ============================================================================
// 單元測試
// ============================================================================
