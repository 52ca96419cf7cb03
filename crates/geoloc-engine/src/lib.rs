//! Geoloc 交互构造引擎
//!
//! # 架构设计
//!
//! - `action` / `actions`: 动作定义与内置动作目录
//! - `engine`: 参数解析状态机，生成预览与待提交对象
//! - `state`: 当前场景的图形、视图与轨迹数据
//! - `session`: 基于 `SceneStore` 的异步会话
//!
//! # 示例
//!
//! ```rust
//! use geoloc_engine::prelude::*;
//!
//! let mut engine = ConstructionEngine::default();
//! let mut scene = SceneState::new();
//! let start = engine.select_action("FixedPoint", &mut scene).unwrap();
//! assert!(matches!(start, ActionStart::Prompt { ref name, .. } if name == "A"));
//! ```

pub mod action;
pub mod actions;
pub mod config;
pub mod engine;
pub mod error;
pub mod highlight;
pub mod naming;
pub mod session;
pub mod state;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::action::{ActionDefinition, ActionGroup, ArgumentSlot, MouseButton};
    pub use crate::actions::ActionCatalog;
    pub use crate::config::EngineConfig;
    pub use crate::engine::{
        ActionStart, Committed, ConstructionEngine, EngineState, PendingCommit, StepOutcome,
    };
    pub use crate::error::{EngineError, EngineResult};
    pub use crate::session::{LoadReport, Progress, Session};
    pub use crate::state::SceneState;
}
