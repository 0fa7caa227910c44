//! 種子評估期間的累積狀態
//!
//! 一個種子（或一批）評估期間的先前生成效果：已啟用的 Voucher
//! 會改變後續流的權重；已擁有的 Joker 影響去重；Showman 關閉
//! 去重；Boss 陣列在有 Boss 謂詞時整條快取一次。
//!
//! 狀態是評估的區域值，不跨執行緒、不逃逸。

use crate::game::blinds::BossBlind;
use crate::game::constants::MAX_ANTE;
use crate::game::joker::JokerId;
use crate::game::rng::LANES;
use crate::game::vouchers::{VoucherId, VoucherSet};

use super::mask::Mask8;

/// 單一種子評估能累積的 Joker 上限
const OWNED_JOKER_CAP: usize = 32;

/// 標量 run state
#[derive(Clone)]
pub struct RunState {
    pub vouchers: VoucherSet,
    pub showman: bool,
    owned_jokers: [JokerId; OWNED_JOKER_CAP],
    owned_len: usize,
    cached_bosses: [Option<BossBlind>; (MAX_ANTE as usize) + 1],
}

impl RunState {
    pub fn new() -> Self {
        Self {
            vouchers: VoucherSet::new(),
            showman: false,
            owned_jokers: [JokerId::Joker; OWNED_JOKER_CAP],
            owned_len: 0,
            cached_bosses: [None; (MAX_ANTE as usize) + 1],
        }
    }

    /// 啟用 Voucher（單調：啟用後不再清除）
    pub fn activate_voucher(&mut self, v: VoucherId) {
        self.vouchers.activate(v);
    }

    pub fn is_voucher_active(&self, v: VoucherId) -> bool {
        self.vouchers.is_active(v)
    }

    pub fn add_owned_joker(&mut self, j: JokerId) {
        if self.owned_len < OWNED_JOKER_CAP && !self.owns_joker(j) {
            self.owned_jokers[self.owned_len] = j;
            self.owned_len += 1;
        }
    }

    pub fn owns_joker(&self, j: JokerId) -> bool {
        self.owned_jokers[..self.owned_len].contains(&j)
    }

    pub fn activate_showman(&mut self) {
        self.showman = true;
    }

    /// 快取單一 ante 的 Boss（整條流走訪時逐一填入；
    /// 生成失敗的 ante 留空，查詢時視為不匹配）
    pub fn set_cached_boss(&mut self, ante: u8, boss: BossBlind) {
        self.cached_bosses[ante as usize] = Some(boss);
    }

    pub fn cached_boss(&self, ante: u8) -> Option<BossBlind> {
        self.cached_bosses[ante as usize]
    }

    pub fn has_cached_bosses(&self) -> bool {
        self.cached_bosses.iter().any(Option::is_some)
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

/// 向量 run state：8 份啟用集合 + per-lane Showman 位
///
/// 不追蹤已擁有的 Joker；需要該資訊的謂詞走標量 fallback。
#[derive(Clone)]
pub struct RunStateVec {
    pub vouchers: [VoucherSet; LANES],
    pub showman: Mask8,
}

impl RunStateVec {
    pub fn new() -> Self {
        Self {
            vouchers: [VoucherSet::new(); LANES],
            showman: Mask8::NONE,
        }
    }

    /// 逐 lane 啟用（每個 lane 觀察到的 Voucher 可能不同）
    pub fn activate_vouchers(&mut self, per_lane: [VoucherId; LANES]) {
        for (set, v) in self.vouchers.iter_mut().zip(per_lane.iter()) {
            set.activate(*v);
        }
    }

    pub fn activate_voucher_lane(&mut self, lane: usize, v: VoucherId) {
        self.vouchers[lane].activate(v);
    }

    /// 哪些 lane 啟用了指定 Voucher
    pub fn active_mask(&self, v: VoucherId) -> Mask8 {
        Mask8::from_fn(|lane| self.vouchers[lane].is_active(v))
    }

    /// 取出單一 lane 的標量視圖（verifier 重建用）
    pub fn lane(&self, lane: usize) -> RunState {
        let mut state = RunState::new();
        state.vouchers = self.vouchers[lane];
        if self.showman.lane(lane) {
            state.activate_showman();
        }
        state
    }
}

impl Default for RunStateVec {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voucher_monotone() {
        let mut state = RunState::new();
        assert!(!state.is_voucher_active(VoucherId::Telescope));
        state.activate_voucher(VoucherId::Telescope);
        assert!(state.is_voucher_active(VoucherId::Telescope));
        // 重複啟用無事發生
        state.activate_voucher(VoucherId::Telescope);
        assert!(state.is_voucher_active(VoucherId::Telescope));
    }

    #[test]
    fn test_owned_jokers() {
        let mut state = RunState::new();
        assert!(!state.owns_joker(JokerId::Blueprint));
        state.add_owned_joker(JokerId::Blueprint);
        state.add_owned_joker(JokerId::Blueprint);
        assert!(state.owns_joker(JokerId::Blueprint));
        assert!(!state.owns_joker(JokerId::Brainstorm));
    }

    #[test]
    fn test_boss_cache() {
        let mut state = RunState::new();
        assert!(state.cached_boss(3).is_none());
        assert!(!state.has_cached_bosses());
        state.set_cached_boss(3, BossBlind::TheHook);
        assert_eq!(state.cached_boss(3), Some(BossBlind::TheHook));
        assert!(state.cached_boss(4).is_none());
        assert!(state.has_cached_bosses());
    }

    #[test]
    fn test_vec_state_per_lane() {
        let mut state = RunStateVec::new();
        state.activate_voucher_lane(2, VoucherId::Telescope);
        let mask = state.active_mask(VoucherId::Telescope);
        assert!(mask.lane(2));
        assert_eq!(mask.count(), 1);

        let scalar = state.lane(2);
        assert!(scalar.is_voucher_active(VoucherId::Telescope));
        assert!(!state.lane(0).is_voucher_active(VoucherId::Telescope));
    }
}
