//! 服務層模組
//!
//! gRPC 伺服器所需的搜尋工作管理：工作註冊表、結果通道、
//! 取消與進度。gRPC trait 實作在 `main.rs`。

pub mod jobs;

pub use jobs::{JobRegistry, SearchJob, SearchPlan};
