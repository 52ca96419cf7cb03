//! 场景状态
//!
//! 当前打开场景的已提交图形（按创建顺序）、视图与轨迹采样数据。

use geoloc_core::shape::{str_property, ObjectType, Shape};
use geoloc_store::{PlotSample, View};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct SceneState {
    scene_id: Option<i32>,
    view: View,
    shapes: Vec<Arc<Shape>>,
    /// 轨迹生成点名 -> 采样数据
    plots: HashMap<String, PlotSample>,
}

impl SceneState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 切换到新场景，清空旧内容
    pub fn open(&mut self, scene_id: i32, view: View, shapes: Vec<Arc<Shape>>) {
        self.scene_id = Some(scene_id);
        self.view = view;
        self.shapes = shapes;
        self.plots.clear();
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub fn scene_id(&self) -> Option<i32> {
        self.scene_id
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    pub fn shapes(&self) -> &[Arc<Shape>] {
        &self.shapes
    }

    pub(crate) fn shapes_mut(&mut self) -> &mut [Arc<Shape>] {
        &mut self.shapes
    }

    pub fn find(&self, name: &str) -> Option<&Arc<Shape>> {
        self.shapes.iter().find(|s| s.name() == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.shapes.iter().map(|s| s.name())
    }

    pub fn push(&mut self, shape: Arc<Shape>) {
        self.shapes.push(shape);
    }

    /// 移除指定名字的图形，并清理失效的轨迹数据
    pub fn remove_names(&mut self, names: &[String]) -> usize {
        let before = self.shapes.len();
        self.shapes.retain(|s| !names.iter().any(|n| n == s.name()));
        let removed = before - self.shapes.len();
        if removed > 0 {
            self.purge_plots();
        }
        removed
    }

    /// 切换选中状态，返回切换后是否选中
    pub fn toggle_selection(&mut self, name: &str) -> Option<bool> {
        let shape = self.shapes.iter_mut().find(|s| s.name() == name)?;
        let state = shape.state().toggled_selection();
        *shape = Arc::new(shape.with_state(state));
        Some(state.is_selected())
    }

    /// 所有轨迹的生成点名
    pub fn locus_points(&self) -> Vec<String> {
        self.shapes
            .iter()
            .filter(|s| s.object_type() == ObjectType::Locus)
            .filter_map(|s| str_property(s.properties(), "point"))
            .map(str::to_string)
            .collect()
    }

    /// 记录轨迹采样；没有对应轨迹时丢弃
    pub fn set_plot(&mut self, point_name: &str, sample: PlotSample) -> bool {
        if !self.locus_points().iter().any(|p| p == point_name) {
            tracing::debug!("Dropping plot for '{}': no locus uses it", point_name);
            return false;
        }
        self.plots.insert(point_name.to_string(), sample);
        true
    }

    pub fn plot(&self, point_name: &str) -> Option<&PlotSample> {
        self.plots.get(point_name)
    }

    pub fn plots(&self) -> &HashMap<String, PlotSample> {
        &self.plots
    }

    fn purge_plots(&mut self) {
        let points = self.locus_points();
        self.plots.retain(|key, _| points.iter().any(|p| p == key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoloc_core::math::Point2;
    use geoloc_core::shape::{Properties, ShapeGeometry, ShapeState};
    use serde_json::json;

    fn shape(name: &str, object_type: ObjectType, properties: Properties) -> Arc<Shape> {
        Arc::new(Shape::new(
            name,
            object_type,
            properties,
            String::new(),
            ShapeGeometry::None,
        ))
    }

    fn locus(name: &str, point: &str) -> Arc<Shape> {
        let mut properties = Properties::new();
        properties.insert("point".to_string(), json!(point));
        shape(name, ObjectType::Locus, properties)
    }

    fn sample() -> PlotSample {
        PlotSample {
            points: Vec::new(),
            equation: "x^2 + y^2 - 4".to_string(),
            formatted_equations: Vec::new(),
            time_taken_seconds: 0.0,
        }
    }

    #[test]
    fn test_plot_requires_locus() {
        let mut scene = SceneState::new();
        scene.open(1, View::default(), vec![shape("X", ObjectType::FreePoint, Properties::new())]);

        assert!(!scene.set_plot("X", sample()));
        scene.push(locus("locusA", "X"));
        assert!(scene.set_plot("X", sample()));
        assert!(scene.plot("X").is_some());
    }

    #[test]
    fn test_remove_purges_plots() {
        let mut scene = SceneState::new();
        scene.open(
            1,
            View::default(),
            vec![
                shape("X", ObjectType::FreePoint, Properties::new()),
                locus("locusA", "X"),
                shape("Y", ObjectType::FreePoint, Properties::new()),
                locus("locusB", "Y"),
            ],
        );
        scene.set_plot("X", sample());
        scene.set_plot("Y", sample());

        let removed = scene.remove_names(&["X".to_string(), "locusA".to_string()]);

        assert_eq!(removed, 2);
        assert!(scene.plot("X").is_none());
        assert!(scene.plot("Y").is_some());
        assert_eq!(scene.names().collect::<Vec<_>>(), vec!["Y", "locusB"]);
    }

    #[test]
    fn test_toggle_selection() {
        let mut scene = SceneState::new();
        scene.push(Arc::new(
            Shape::new(
                "A",
                ObjectType::FixedPoint,
                Properties::new(),
                String::new(),
                ShapeGeometry::Point(Point2::origin()),
            )
            .with_state(ShapeState::Suggested),
        ));

        assert_eq!(scene.toggle_selection("A"), Some(true));
        assert_eq!(scene.find("A").map(|s| s.state()), Some(ShapeState::SuggestedSelected));
        assert_eq!(scene.toggle_selection("A"), Some(false));
        assert_eq!(scene.toggle_selection("missing"), None);
    }
}
