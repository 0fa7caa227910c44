//! 計分提供者
//!
//! 通過基礎過濾的種子在這裡重新驗證 must、檢查 mustNot、
//! 對每個 should 子句算出現次數（min 門檻以下記 0）乘上權重
//! 加總，再對照截斷值決定是否送進 result sink。
//!
//! 自適應截斷是一個只升不降的原子字組：有種子取得嚴格更高的
//! 分數時以 CAS 迴圈提升，所有 worker 共用。

use std::sync::atomic::{AtomicI64, Ordering};

use crate::game::rng::SeedCtx;

use super::clause::PreparedFilter;
use super::verify::ScalarCtx;

/// should 子句數上限（tally 緩衝在棧上）
pub const MAX_SHOULD: usize = 64;

/// 截斷設定
#[derive(Clone, Copy, Debug)]
pub struct CutoffConfig {
    pub base: i64,
    pub adaptive: bool,
}

impl Default for CutoffConfig {
    fn default() -> Self {
        Self {
            base: 0,
            adaptive: false,
        }
    }
}

/// 跨 worker 共享的截斷狀態
pub struct Cutoff {
    learned: AtomicI64,
    adaptive: bool,
}

impl Cutoff {
    pub fn new(config: CutoffConfig) -> Self {
        Self {
            learned: AtomicI64::new(config.base),
            adaptive: config.adaptive,
        }
    }

    pub fn current(&self) -> i64 {
        self.learned.load(Ordering::Relaxed)
    }

    /// 自適應時把截斷提升到 score（只升不降）
    fn observe(&self, score: i64) {
        if !self.adaptive {
            return;
        }
        let mut current = self.learned.load(Ordering::Relaxed);
        while score > current {
            match self.learned.compare_exchange_weak(
                current,
                score,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(seen) => current = seen,
            }
        }
    }
}

/// 呼叫端提供的結果回收口；核心不加鎖直接呼叫，必須執行緒安全
pub trait ResultSink: Send + Sync {
    fn on_result(&self, seed: &str, score: i64, tallies: &[i64]);
}

/// 計分提供者
pub struct Scorer<'a> {
    filter: &'a PreparedFilter,
    cutoff: &'a Cutoff,
}

impl<'a> Scorer<'a> {
    pub fn new(filter: &'a PreparedFilter, cutoff: &'a Cutoff) -> Self {
        Self { filter, cutoff }
    }

    /// 完整計分；不過 must / 碰到 mustNot / 低於截斷時回傳 None。
    /// 通過時提升自適應截斷並把結果交給 sink。
    pub fn score_seed(&self, seed: &SeedCtx, seed_str: &str, sink: &dyn ResultSink) -> Option<i64> {
        let mut ctx = ScalarCtx::new(self.filter, seed);
        ctx.prepare();

        if !ctx.eval_must() {
            return None;
        }
        if ctx.any_must_not() {
            return None;
        }

        let mut tallies = [0i64; MAX_SHOULD];
        let mut total: i64 = 0;
        let filter = self.filter;
        for (i, clause) in filter.should.iter().enumerate().take(MAX_SHOULD) {
            let mut count = ctx.count_clause(clause, u64::MAX) as i64;
            if let Some(min) = clause.min {
                if count < min as i64 {
                    count = 0;
                }
            }
            tallies[i] = count;
            total += count * clause.score;
        }

        if total < self.cutoff.current() {
            return None;
        }
        self.cutoff.observe(total);
        sink.on_result(seed_str, total, &tallies[..filter.should.len().min(MAX_SHOULD)]);
        Some(total)
    }
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::config::prepare;
    use crate::search::seed::Seed;
    use serde_json::json;
    use std::sync::Mutex;

    struct Collect(Mutex<Vec<(String, i64, Vec<i64>)>>);

    impl Collect {
        fn new() -> Self {
            Collect(Mutex::new(Vec::new()))
        }
    }

    impl ResultSink for Collect {
        fn on_result(&self, seed: &str, score: i64, tallies: &[i64]) {
            self.0.lock().unwrap().push((seed.to_string(), score, tallies.to_vec()));
        }
    }

    #[test]
    fn test_cutoff_only_raises() {
        let cutoff = Cutoff::new(CutoffConfig {
            base: 10,
            adaptive: true,
        });
        cutoff.observe(5);
        assert_eq!(cutoff.current(), 10);
        cutoff.observe(25);
        assert_eq!(cutoff.current(), 25);
        cutoff.observe(25);
        assert_eq!(cutoff.current(), 25);
    }

    #[test]
    fn test_fixed_cutoff_never_moves() {
        let cutoff = Cutoff::new(CutoffConfig {
            base: 3,
            adaptive: false,
        });
        cutoff.observe(100);
        assert_eq!(cutoff.current(), 3);
    }

    #[test]
    fn test_score_is_weight_times_count() {
        let filter = prepare(&json!({
            "should": [{"type": "tag", "value": "D6Tag", "antes": [1, 2, 3, 4], "score": 100}]
        }))
        .unwrap();
        let cutoff = Cutoff::new(CutoffConfig::default());
        let scorer = Scorer::new(&filter, &cutoff);
        let sink = Collect::new();

        // 找一顆至少一次命中的種子驗證倍率
        for i in 0..4000u64 {
            let seed = Seed::from_index(i * 1009);
            if let Some(total) = scorer.score_seed(&seed.ctx(), seed.as_str(), &sink) {
                if total > 0 {
                    let results = sink.0.lock().unwrap();
                    let (_, score, tallies) = results.last().unwrap();
                    assert_eq!(*score, tallies[0] * 100);
                    return;
                }
            }
        }
        panic!("no scoring seed found in probe range");
    }

    #[test]
    fn test_min_threshold_zeroes_count() {
        let base = json!({"type": "tag", "value": "D6Tag", "antes": [1, 2], "score": 10});
        let with_min = prepare(&json!({"should": [{
            "type": "tag", "value": "D6Tag", "antes": [1, 2], "score": 10, "min": 3
        }]}))
        .unwrap();
        let without = prepare(&json!({ "should": [base] })).unwrap();
        let cutoff = Cutoff::new(CutoffConfig::default());
        let sink = Collect::new();

        for i in 0..256u64 {
            let seed = Seed::from_index(i * 65537);
            let plain = Scorer::new(&without, &cutoff)
                .score_seed(&seed.ctx(), seed.as_str(), &sink)
                .unwrap();
            let gated = Scorer::new(&with_min, &cutoff)
                .score_seed(&seed.ctx(), seed.as_str(), &sink)
                .unwrap();
            // ante 只有兩個，計數最多 4；min=3 之下 0..2 次都歸零
            if plain / 10 < 3 {
                assert_eq!(gated, 0);
            } else {
                assert_eq!(gated, plain);
            }
        }
    }

    #[test]
    fn test_repeat_scoring_is_bit_identical() {
        let filter = prepare(&json!({
            "must": [{"type": "tag", "value": "D6Tag", "antes": [1, 2, 3, 4, 5, 6, 7, 8]}],
            "should": [
                {"type": "joker", "value": "AnyCommon", "antes": [1], "score": 5},
                {"type": "tag", "value": "D6Tag", "antes": [1, 2, 3, 4], "score": 2}
            ]
        }))
        .unwrap();
        let cutoff = Cutoff::new(CutoffConfig::default());
        let scorer = Scorer::new(&filter, &cutoff);
        let sink = Collect::new();
        for i in 0..200u64 {
            let seed = Seed::from_index(i * 12007);
            let a = scorer.score_seed(&seed.ctx(), seed.as_str(), &sink);
            let b = scorer.score_seed(&seed.ctx(), seed.as_str(), &sink);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_below_cutoff_not_emitted() {
        let filter = prepare(&json!({
            "should": [{"type": "tag", "value": "D6Tag", "antes": [1], "score": 1}]
        }))
        .unwrap();
        let cutoff = Cutoff::new(CutoffConfig {
            base: 1_000_000,
            adaptive: false,
        });
        let scorer = Scorer::new(&filter, &cutoff);
        let sink = Collect::new();
        for i in 0..64u64 {
            let seed = Seed::from_index(i);
            assert!(scorer.score_seed(&seed.ctx(), seed.as_str(), &sink).is_none());
        }
        assert!(sink.0.lock().unwrap().is_empty());
    }
}
