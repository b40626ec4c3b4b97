//! # SBS Logger
//!
//! 管道编排库，供 `sbs-logger` 二进制与端到端测试共用。
//!
//! 提供：
//! - 连接数据源与初始化持久化后端
//! - 逐行解析、分类与分发
//! - 任何退出路径上都只执行一次的最终刷新

pub mod pipeline;

pub use pipeline::{DrainTrigger, Pipeline, PipelineConfig, PipelineState, PipelineStats};
