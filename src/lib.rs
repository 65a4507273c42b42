//! # mastery-engine - 技能掌握度与间隔重复核心算法库
//!
//! 本 crate 提供纯 Rust 实现的学习评估算法:
//!
//! - **Event Scorer** - 单次学习事件评分 (提示、重试、修改次数、作答时长惩罚)
//! - **Mastery Estimation** - 指数近因加权掌握度与置信度
//! - **Learning Velocity** - 近期与早期表现对比
//! - **Forgetting Curve** - Ebbinghaus 遗忘曲线保持率与复习日期
//! - **SM-2** - SuperMemo-2 间隔重复调度
//!
//! ## 设计理念
//!
//! - **无状态** - 每次调用都基于调用方提供的完整事件历史重新计算
//! - **时间注入** - 通过 [`Clock`] 注入当前时间，结果可复现
//! - **有界输出** - 所有概率类字段都限制在 [0, 1]，不会输出 NaN
//! - **并行批量** - 多技能批量计算基于 rayon
//!
//! ## 模块结构
//!
//! - [`mastery`] - 掌握度引擎 (评分、聚合、速度、遗忘曲线)
//! - [`sm2`] - SM-2 间隔重复
//! - [`config`] - 可调参数 (环境变量 / JSON)
//! - [`clock`] - 时钟抽象
//! - [`sanitize`] - 数据清洗 (数值稳定性、验证)
//! - [`error`] - 错误类型
//! - [`types`] - 公共类型和常量
//!
//! ## 使用示例
//!
//! ```rust
//! use chrono::Utc;
//! use mastery_engine::{BlockType, FixedClock, LearningEvent, MasteryConfig, MasteryEngine};
//!
//! let now = Utc::now();
//! let engine = MasteryEngine::with_clock(MasteryConfig::default(), FixedClock::new(now));
//!
//! let event = LearningEvent::new("evt-1", "block-7", BlockType::Quiz, now, 45.0, true)
//!     .with_score(95.0);
//! let score = engine.calculate_mastery_score("skill-1", "Fractions", &[event.clone()]);
//! assert!(score.mastery_level > 0.9);
//!
//! let params = engine.initial_spaced_repetition();
//! let next = engine.update_spaced_repetition(&params, engine.event_to_quality_rating(&event));
//! assert_eq!(next.repetitions, 1);
//! ```

// ============================================================================
// 模块声明
// ============================================================================

pub mod clock;
pub mod config;
pub mod error;
pub mod mastery;
pub mod sanitize;
pub mod sm2;
pub mod types;

// ============================================================================
// 重新导出
// ============================================================================

/// 重新导出所有公共类型
pub use types::*;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::MasteryConfig;
pub use error::{MasteryError, Result};

/// 重新导出掌握度引擎
pub use mastery::{calculate_mastery_score, event_score, MasteryEngine};

/// 重新导出 SM-2 调度
pub use sm2::{event_to_quality_rating, update_spaced_repetition};
