//! 種子搜尋引擎
//!
//! 對 8 字元種子空間做宣告式過濾：`game` 是內容生成的領域模型
//! 與 PRNG 原語，`search` 是向量過濾、標量驗證與計分的核心，
//! `service` 是 gRPC 工作管理。伺服器本體在 `main.rs`。

pub mod game;
pub mod search;
pub mod service;

pub mod proto {
    tonic::include_proto!("seeker");
}
