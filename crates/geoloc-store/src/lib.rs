//! Geoloc 场景存储
//!
//! - `SceneStore`: 引擎使用的异步存储接口
//! - `InMemorySceneStore`: 进程内实现
//! - `native`: `.geoloc` 场景文档的读写

pub mod error;
pub mod memory;
pub mod native;
pub mod store;

pub use error::StoreError;
pub use memory::InMemorySceneStore;
pub use native::SceneDocument;
pub use store::{
    Color, EvaluationResult, PlotSample, SceneData, SceneInfo, SceneStore, ValidationResult, View,
    SCENE_DEFAULT_NAME,
};
