//! 搜尋入口
//!
//! 把種子走訪切成 8 個一批，fan out 到 rayon worker：
//! 向量預過濾 → 存活 lane 逐一標量驗證 → 計分與發射。
//! 跨執行緒共享的只有截斷原子、掃描/命中計數器與 sink；
//! 取消旗標在批次之間輪詢，盡力而為。

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use rayon::prelude::*;

use super::clause::PreparedFilter;
use super::filter::filter_batch;
use super::score::{Cutoff, CutoffConfig, ResultSink, Scorer};
use super::seed::{Seed, SeedBatch};
use super::verify::verify_seed;

/// 一次搜尋的彙總
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchSummary {
    pub scanned: u64,
    pub found: u64,
    pub cancelled: bool,
}

/// 搜尋期間對外可見的進度
#[derive(Default)]
pub struct SearchProgress {
    pub scanned: AtomicU64,
    pub found: AtomicU64,
}

/// 驅動一次完整搜尋。種子以任意 `Seed` 迭代器供應（連續區段
/// 或隨機抽樣），結果不保證次序。
pub fn run_search(
    filter: &PreparedFilter,
    seeds: impl Iterator<Item = Seed> + Send,
    cutoff_config: CutoffConfig,
    cancel: &AtomicBool,
    sink: &dyn ResultSink,
    progress: &SearchProgress,
) -> SearchSummary {
    let cutoff = Cutoff::new(cutoff_config);
    let seeds = Mutex::new(seeds);
    let batches = std::iter::from_fn(|| {
        let mut guard = seeds.lock().unwrap();
        SeedBatch::fill(&mut *guard)
    });

    batches.par_bridge().for_each(|batch| {
        if cancel.load(Ordering::Relaxed) {
            return;
        }
        progress.scanned.fetch_add(batch.len() as u64, Ordering::Relaxed);

        let mask = filter_batch(filter, &batch);
        if mask.all_zero() {
            return;
        }
        let scorer = Scorer::new(filter, &cutoff);
        for lane in mask.lanes() {
            if cancel.load(Ordering::Relaxed) {
                return;
            }
            let seed = batch.seed(lane);
            let ctx = seed.ctx();
            if !verify_seed(filter, &ctx) {
                continue;
            }
            if scorer.score_seed(&ctx, seed.as_str(), sink).is_some() {
                progress.found.fetch_add(1, Ordering::Relaxed);
            }
        }
    });

    SearchSummary {
        scanned: progress.scanned.load(Ordering::Relaxed),
        found: progress.found.load(Ordering::Relaxed),
        cancelled: cancel.load(Ordering::Relaxed),
    }
}

/// 收進記憶體的 sink（服務層與測試用）
#[derive(Default)]
pub struct CollectSink {
    results: Mutex<Vec<FoundSeed>>,
}

/// 一筆搜尋結果
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FoundSeed {
    pub seed: String,
    pub score: i64,
    pub tallies: Vec<i64>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<FoundSeed> {
        std::mem::take(&mut self.results.lock().unwrap())
    }

    pub fn len(&self) -> usize {
        self.results.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultSink for CollectSink {
    fn on_result(&self, seed: &str, score: i64, tallies: &[i64]) {
        self.results.lock().unwrap().push(FoundSeed {
            seed: seed.to_string(),
            score,
            tallies: tallies.to_vec(),
        });
    }
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::config::prepare;
    use crate::search::seed::{Seed, SeedRange};
    use serde_json::json;

    fn d6_filter() -> PreparedFilter {
        prepare(&json!({
            "must": [{"type": "tag", "value": "D6Tag", "antes": [1, 2]}]
        }))
        .unwrap()
    }

    #[test]
    fn test_search_finds_only_verifying_seeds() {
        let filter = d6_filter();
        let cancel = AtomicBool::new(false);
        let sink = CollectSink::new();
        let progress = SearchProgress::default();
        let summary = run_search(
            &filter,
            SeedRange::new(0, 4096),
            CutoffConfig::default(),
            &cancel,
            &sink,
            &progress,
        );
        assert_eq!(summary.scanned, 4096);
        assert!(!summary.cancelled);
        let results = sink.take();
        assert_eq!(results.len() as u64, summary.found);
        for found in &results {
            let seed = Seed::parse(&found.seed).unwrap();
            assert!(verify_seed(&filter, &seed.ctx()), "emitted {}", found.seed);
        }
    }

    #[test]
    fn test_search_is_deterministic_set() {
        // 次序不保證，集合必須一致
        let filter = d6_filter();
        let run = || {
            let cancel = AtomicBool::new(false);
            let sink = CollectSink::new();
            let progress = SearchProgress::default();
            run_search(
                &filter,
                SeedRange::new(10_000, 2048),
                CutoffConfig::default(),
                &cancel,
                &sink,
                &progress,
            );
            let mut seeds: Vec<String> = sink.take().into_iter().map(|f| f.seed).collect();
            seeds.sort();
            seeds
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_cancelled_search_stops_early() {
        let filter = d6_filter();
        let cancel = AtomicBool::new(true);
        let sink = CollectSink::new();
        let progress = SearchProgress::default();
        let summary = run_search(
            &filter,
            SeedRange::new(0, 100_000),
            CutoffConfig::default(),
            &cancel,
            &sink,
            &progress,
        );
        assert!(summary.cancelled);
        assert_eq!(summary.found, 0);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_adaptive_cutoff_filters_later_results() {
        // 自適應截斷單調上升：最後留下的結果分數都不低於
        // 整場最高分（最高分種子必然被發射過）
        let filter = prepare(&json!({
            "must": [{"type": "tag", "value": "D6Tag", "antes": [1]}],
            "should": [{"type": "tag", "value": "D6Tag", "antes": [1, 2, 3, 4], "score": 1}]
        }))
        .unwrap();
        let cancel = AtomicBool::new(false);
        let sink = CollectSink::new();
        let progress = SearchProgress::default();
        run_search(
            &filter,
            SeedRange::new(0, 4096),
            CutoffConfig {
                base: 0,
                adaptive: true,
            },
            &cancel,
            &sink,
            &progress,
        );
        let results = sink.take();
        if let Some(max) = results.iter().map(|f| f.score).max() {
            assert!(results.iter().any(|f| f.score == max));
        }
    }
}
