//! 场景存储接口
//!
//! 存储负责持久化场景对象，并承担所有需要符号计算的工作：
//! 表达式校验与求值、轨迹曲线采样。引擎只通过这里的接口访问它。

use crate::error::StoreError;
use chrono::{DateTime, Utc};
use geoloc_core::math::Point2;
use geoloc_core::shape::PersistedObject;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// 未指定名称时的场景名
pub const SCENE_DEFAULT_NAME: &str = "New Scene";

/// 场景概要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneInfo {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// 视图：中心点与对角线跨度
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub center: Point2,
    #[serde(alias = "diagonal")]
    pub diagonal_span: f64,
}

impl Default for View {
    fn default() -> Self {
        Self {
            center: Point2::origin(),
            diagonal_span: 25.0,
        }
    }
}

/// 场景内容：按创建顺序排列的对象与视图
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneData {
    pub objects: Vec<PersistedObject>,
    #[serde(default)]
    pub view: View,
}

/// 采样点颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// 轨迹采样结果（像素坐标）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSample {
    pub points: Vec<(u32, u32, Color)>,
    pub equation: String,
    pub formatted_equations: Vec<String>,
    pub time_taken_seconds: f64,
}

/// 表达式校验结果，无错误即通过
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// 表达式初始值
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub values: Vec<f64>,
}

/// 场景存储
///
/// 所有方法都是异步的，返回的 future 需满足 `Send`。
pub trait SceneStore: Send + Sync {
    /// 按创建时间排列的所有场景
    fn list_scenes(&self) -> impl Future<Output = Result<Vec<SceneInfo>, StoreError>> + Send;

    /// 创建场景；名称为空时命名为 `Scene {id}`
    fn create_scene(
        &self,
        name: Option<&str>,
    ) -> impl Future<Output = Result<SceneInfo, StoreError>> + Send;

    fn rename_scene(
        &self,
        scene_id: i32,
        name: &str,
    ) -> impl Future<Output = Result<SceneInfo, StoreError>> + Send;

    fn delete_scene(&self, scene_id: i32) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn get_scene(&self, scene_id: i32) -> impl Future<Output = Result<SceneData, StoreError>> + Send;

    fn create_object(
        &self,
        scene_id: i32,
        object: PersistedObject,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// 删除对象及其全部（传递）依赖者，返回被删除的对象名
    fn delete_object(
        &self,
        scene_id: i32,
        name: &str,
    ) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

    /// 对象本身及其全部（传递）依赖者
    fn dependents(
        &self,
        scene_id: i32,
        name: &str,
    ) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

    /// 采样以 `point_name` 为生成点的轨迹
    fn sample_plot(
        &self,
        scene_id: i32,
        point_name: &str,
        width: u32,
        height: u32,
    ) -> impl Future<Output = Result<PlotSample, StoreError>> + Send;

    fn validate_expressions(
        &self,
        scene_id: i32,
        expressions: &[String],
    ) -> impl Future<Output = Result<ValidationResult, StoreError>> + Send;

    fn evaluate_initial(
        &self,
        scene_id: i32,
        expressions: &[String],
    ) -> impl Future<Output = Result<EvaluationResult, StoreError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_accepts_legacy_field_name() {
        let view: View = serde_json::from_str(r#"{"center": [1.0, 2.0], "diagonal": 30.0}"#).unwrap();
        assert_eq!(view.center, Point2::new(1.0, 2.0));
        assert_eq!(view.diagonal_span, 30.0);
    }

    #[test]
    fn test_scene_data_default_view() {
        let data: SceneData = serde_json::from_str(r#"{"objects": []}"#).unwrap();
        assert_eq!(data.view, View::default());
    }
}
