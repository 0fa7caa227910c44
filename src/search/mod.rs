//! 搜尋核心模組
//!
//! 提供種子搜尋的三個緊耦合子系統：
//! - `filter`: 8-lane 向量過濾評估（per-category 謂詞 + And/Or 複合）
//! - `streams` / `streams_vec`: 決定性內容生成流（標量 / 批次）
//! - `score`: must / mustNot / should 計分與自適應截斷
//!
//! 周邊：`clause`（準備態子句）、`config`（JSON 解析）、
//! `verify`（權威標量重放）、`driver`（rayon 派工）、
//! `seed`（種子空間走訪）、`state`（run state）、`mask`（lane 遮罩）。

pub mod clause;
pub mod config;
pub mod driver;
pub mod filter;
pub mod mask;
pub mod score;
pub mod seed;
pub mod state;
pub mod streams;
pub mod streams_vec;
pub mod verify;

pub use clause::{Clause, ClauseBody, PreparedFilter};
pub use config::{prepare, prepare_str, ConfigError};
pub use driver::{run_search, CollectSink, FoundSeed, SearchProgress, SearchSummary};
pub use mask::Mask8;
pub use score::{Cutoff, CutoffConfig, ResultSink, Scorer, MAX_SHOULD};
pub use seed::{random_seeds, Seed, SeedBatch, SeedRange, SEED_SPACE};
pub use state::{RunState, RunStateVec};
pub use verify::{verify_seed, ScalarCtx};

#[cfg(test)]
mod integration_tests;
