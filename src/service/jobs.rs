//! 搜尋工作管理
//!
//! 每個工作一條專屬的搜尋執行緒（內部再由 rayon fan out），
//! 結果經有界 mpsc 流回 gRPC 串流。接收端先走人時把工作標記
//! 取消，worker 在下一批之間停下來。

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;

use crate::search::clause::PreparedFilter;
use crate::search::driver::{run_search, FoundSeed, SearchProgress};
use crate::search::score::{CutoffConfig, ResultSink};
use crate::search::seed::{random_seeds, SeedRange, SEED_SPACE};

/// 結果通道的背壓緩衝
const RESULT_BUFFER: usize = 256;

/// 種子走訪計畫
#[derive(Clone, Copy, Debug)]
pub enum SearchPlan {
    /// 連續區段
    Range { start: u64, count: u64 },
    /// 隨機抽樣 count 顆
    Random { count: u64 },
}

/// 一個搜尋工作的共享狀態
pub struct SearchJob {
    pub cancel: AtomicBool,
    pub done: AtomicBool,
    pub progress: SearchProgress,
    receiver: Mutex<Option<mpsc::Receiver<FoundSeed>>>,
}

impl SearchJob {
    fn new(receiver: mpsc::Receiver<FoundSeed>) -> Self {
        Self {
            cancel: AtomicBool::new(false),
            done: AtomicBool::new(false),
            progress: SearchProgress::default(),
            receiver: Mutex::new(Some(receiver)),
        }
    }

    /// 取走結果接收端；每個工作只能取一次
    pub fn take_receiver(&self) -> Option<mpsc::Receiver<FoundSeed>> {
        self.receiver.lock().unwrap().take()
    }
}

/// worker 端 sink：命中送進通道，接收端消失視同取消
struct ChannelSink {
    tx: mpsc::Sender<FoundSeed>,
    job: Arc<SearchJob>,
}

impl ResultSink for ChannelSink {
    fn on_result(&self, seed: &str, score: i64, tallies: &[i64]) {
        let result = FoundSeed {
            seed: seed.to_string(),
            score,
            tallies: tallies.to_vec(),
        };
        if self.tx.blocking_send(result).is_err() {
            self.job.cancel.store(true, Ordering::Relaxed);
        }
    }
}

/// 工作註冊表
pub struct JobRegistry {
    jobs: DashMap<u64, Arc<SearchJob>>,
    next_id: AtomicU64,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self {
            jobs: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// 啟動搜尋，回傳工作 id
    pub fn start(&self, filter: PreparedFilter, plan: SearchPlan, cutoff: CutoffConfig) -> u64 {
        let job_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::channel(RESULT_BUFFER);
        let job = Arc::new(SearchJob::new(rx));
        self.jobs.insert(job_id, job.clone());

        std::thread::spawn(move || {
            let sink = ChannelSink {
                tx,
                job: job.clone(),
            };
            match plan {
                SearchPlan::Range { start, count } => {
                    let count = if count == 0 {
                        SEED_SPACE.saturating_sub(start)
                    } else {
                        count
                    };
                    run_search(
                        &filter,
                        SeedRange::new(start, count),
                        cutoff,
                        &job.cancel,
                        &sink,
                        &job.progress,
                    );
                }
                SearchPlan::Random { count } => {
                    let mut rng = StdRng::from_entropy();
                    run_search(
                        &filter,
                        random_seeds(&mut rng, count),
                        cutoff,
                        &job.cancel,
                        &sink,
                        &job.progress,
                    );
                }
            }
            job.done.store(true, Ordering::Relaxed);
        });

        job_id
    }

    pub fn get(&self, job_id: u64) -> Option<Arc<SearchJob>> {
        self.jobs.get(&job_id).map(|j| j.clone())
    }

    pub fn cancel(&self, job_id: u64) -> bool {
        match self.jobs.get(&job_id) {
            Some(job) => {
                job.cancel.store(true, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// 單元測試
// ============================================================================
