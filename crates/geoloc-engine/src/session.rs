//! 会话
//!
//! 把构造引擎、场景状态和场景存储串联起来：引擎给出待提交对象，
//! 会话负责调用存储并把结果交回引擎。

use crate::action::MouseButton;
use crate::config::EngineConfig;
use crate::engine::{ActionStart, Committed, ConstructionEngine, PendingCommit, StepOutcome};
use crate::error::{EngineError, EngineResult};
use crate::state::SceneState;
use geoloc_core::creators::{resolve_shape, ArgumentValue};
use geoloc_core::error::ShapeError;
use geoloc_core::math::Point2;
use geoloc_core::shape::Shape;
use geoloc_store::{SceneInfo, SceneStore};
use std::sync::Arc;

/// 一次交互的结果
#[derive(Debug, Clone)]
pub enum Progress {
    /// 输入未被处理
    Ignored,
    Cancelled,
    /// 等待下一个参数
    Prompt { hint: String },
    /// 对象已持久化并加入场景
    Committed(Committed),
}

/// 打开场景的结果
#[derive(Debug)]
pub struct LoadReport {
    pub scene_id: i32,
    pub loaded: usize,
    /// 无法解析而被跳过的对象
    pub skipped: Vec<(String, ShapeError)>,
}

pub struct Session<S> {
    store: S,
    engine: ConstructionEngine,
    scene: SceneState,
}

impl<S: SceneStore> Session<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self {
            store,
            engine: ConstructionEngine::new(config),
            scene: SceneState::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn engine(&self) -> &ConstructionEngine {
        &self.engine
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    fn scene_id(&self) -> EngineResult<i32> {
        self.scene.scene_id().ok_or(EngineError::NoScene)
    }

    // ========== 场景管理 ==========

    pub async fn list_scenes(&self) -> EngineResult<Vec<SceneInfo>> {
        Ok(self.store.list_scenes().await?)
    }

    pub async fn create_scene(&self, name: Option<&str>) -> EngineResult<SceneInfo> {
        let info = self.store.create_scene(name).await?;
        tracing::info!("Created scene {} '{}'", info.id, info.name);
        Ok(info)
    }

    pub async fn rename_scene(&self, scene_id: i32, name: &str) -> EngineResult<SceneInfo> {
        Ok(self.store.rename_scene(scene_id, name).await?)
    }

    /// 删除场景；若为当前场景则关闭
    pub async fn delete_scene(&mut self, scene_id: i32) -> EngineResult<()> {
        self.store.delete_scene(scene_id).await?;
        if self.scene.scene_id() == Some(scene_id) {
            self.engine.cancel(&mut self.scene);
            self.scene.close();
        }
        tracing::info!("Deleted scene {}", scene_id);
        Ok(())
    }

    /// 打开场景
    ///
    /// 按创建顺序解析对象，解析失败的对象被跳过并记录在报告中。
    /// 场景中已有轨迹的采样随后刷新。
    pub async fn open_scene(&mut self, scene_id: i32) -> EngineResult<LoadReport> {
        self.engine.cancel(&mut self.scene);
        // 读取场景
        let data = self.store.get_scene(scene_id).await?;

        // 解析对象
        let mut shapes: Vec<Arc<Shape>> = Vec::with_capacity(data.objects.len());
        let mut skipped = Vec::new();
        for object in &data.objects {
            match resolve_shape(object, &shapes) {
                Ok(shape) => shapes.push(Arc::new(shape)),
                Err(e) => {
                    tracing::warn!("Skipping '{}' in scene {}: {}", object.name, scene_id, e);
                    skipped.push((object.name.clone(), e));
                }
            }
        }

        let loaded = shapes.len();
        self.scene.open(scene_id, data.view, shapes);
        tracing::info!(
            "Opened scene {} ({} objects, {} skipped)",
            scene_id,
            loaded,
            skipped.len()
        );

        // 刷新轨迹
        for point_name in self.scene.locus_points() {
            if let Err(e) = self.refresh_plot(&point_name).await {
                tracing::warn!("Plot for '{}' unavailable: {}", point_name, e);
            }
        }

        Ok(LoadReport {
            scene_id,
            loaded,
            skipped,
        })
    }

    // ========== 构造 ==========

    /// 选中动作；无参数动作会立即持久化
    pub async fn select_action(&mut self, name: &str) -> EngineResult<Progress> {
        self.scene_id()?;
        match self.engine.select_action(name, &mut self.scene)? {
            ActionStart::Prompt { hint, .. } => Ok(Progress::Prompt { hint }),
            ActionStart::Immediate(pending) => self.persist(pending).await,
        }
    }

    pub fn pointer_move(&mut self, cursor: Point2) {
        self.engine.pointer_move(cursor, &mut self.scene);
    }

    /// 左键提交当前参数，右键取消
    pub async fn click(&mut self, cursor: Point2, button: MouseButton) -> EngineResult<Progress> {
        match button {
            MouseButton::Left => {
                let outcome = self.engine.commit(cursor, &mut self.scene)?;
                self.advance(outcome).await
            }
            MouseButton::Right => {
                self.cancel();
                Ok(Progress::Cancelled)
            }
            MouseButton::Middle => Ok(Progress::Ignored),
        }
    }

    /// 提交表达式：先由存储校验，再求初始值，最后交给引擎
    pub async fn submit_expression(&mut self, text: &str) -> EngineResult<Progress> {
        let scene_id = self.scene_id()?;
        match self.engine.current_slot() {
            Some(slot) if slot.is_expression() => {}
            Some(_) => return Err(EngineError::NotExpressionSlot),
            None => return Err(EngineError::NoActiveAction),
        }

        let expressions = [text.trim().to_string()];
        let validation = self.store.validate_expressions(scene_id, &expressions).await?;
        if !validation.is_valid() {
            return Err(EngineError::InvalidExpression(validation.errors));
        }

        let value = match self.store.evaluate_initial(scene_id, &expressions).await {
            Ok(result) => result.values.first().copied(),
            Err(e) if !self.engine.expression_requires_value() => {
                tracing::debug!("No initial value for '{}': {}", expressions[0], e);
                None
            }
            Err(e) => return Err(e.into()),
        };

        let outcome = self
            .engine
            .submit_expression(&expressions[0], value, &mut self.scene)?;
        self.advance(outcome).await
    }

    pub fn cancel(&mut self) {
        self.engine.cancel(&mut self.scene);
    }

    pub fn toggle_selection(&mut self, name: &str) -> Option<bool> {
        self.scene.toggle_selection(name)
    }

    pub fn arguments_for(&self, name: &str) -> EngineResult<Vec<ArgumentValue>> {
        self.engine.arguments_for(name, &self.scene)
    }

    // ========== 对象 ==========

    /// 删除对象及其依赖者，返回被删除的对象名
    pub async fn delete_object(&mut self, name: &str) -> EngineResult<Vec<String>> {
        let scene_id = self.scene_id()?;
        self.engine.cancel(&mut self.scene);

        let removed = self.store.delete_object(scene_id, name).await?;
        self.scene.remove_names(&removed);
        tracing::info!("Deleted {:?} from scene {}", removed, scene_id);
        Ok(removed)
    }

    /// 对象本身及其全部依赖者
    pub async fn dependents(&self, name: &str) -> EngineResult<Vec<String>> {
        let scene_id = self.scene_id()?;
        Ok(self.store.dependents(scene_id, name).await?)
    }

    /// 重新采样以 `point_name` 为生成点的轨迹
    pub async fn refresh_plot(&mut self, point_name: &str) -> EngineResult<()> {
        let scene_id = self.scene_id()?;
        let (width, height) = (self.engine.config().plot_width, self.engine.config().plot_height);
        let sample = self
            .store
            .sample_plot(scene_id, point_name, width, height)
            .await?;
        self.scene.set_plot(point_name, sample);
        Ok(())
    }

    async fn advance(&mut self, outcome: StepOutcome) -> EngineResult<Progress> {
        match outcome {
            StepOutcome::Advanced { hint } => Ok(Progress::Prompt { hint }),
            StepOutcome::Pending(pending) => self.persist(pending).await,
        }
    }

    async fn persist(&mut self, pending: PendingCommit) -> EngineResult<Progress> {
        let scene_id = self.scene_id()?;
        let result = self.store.create_object(scene_id, pending.object).await;

        let Some(committed) = self
            .engine
            .complete_commit(pending.ticket, result, &mut self.scene)?
        else {
            return Ok(Progress::Ignored);
        };

        if let Some(point_name) = &committed.plot_request {
            if let Err(e) = self.refresh_plot(point_name).await {
                tracing::warn!("Plot for '{}' unavailable: {}", point_name, e);
            }
        }

        Ok(Progress::Committed(committed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoloc_core::math::{Vector2, EPSILON};
    use geoloc_core::shape::{ObjectType, PersistedObject, Properties};
    use geoloc_store::{Color, InMemorySceneStore, PlotSample, SceneData, StoreError, View};
    use serde_json::json;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn object(name: &str, object_type: ObjectType, properties: serde_json::Value) -> PersistedObject {
        let properties: Properties = serde_json::from_value(properties).unwrap();
        PersistedObject::new(name, object_type, properties)
    }

    async fn session_with_scene() -> (Session<InMemorySceneStore>, i32) {
        let mut session = Session::new(InMemorySceneStore::new(), EngineConfig::default());
        let id = session.create_scene(Some("Test")).await.unwrap().id;
        session.open_scene(id).await.unwrap();
        (session, id)
    }

    #[tokio::test]
    async fn test_line_ab_persisted() {
        let (mut session, id) = session_with_scene().await;

        session.select_action("LineAB").await.unwrap();
        let first = session.click(p(0.0, 0.0), MouseButton::Left).await.unwrap();
        assert!(matches!(first, Progress::Prompt { .. }));

        let second = session.click(p(4.0, 0.0), MouseButton::Left).await.unwrap();
        let Progress::Committed(committed) = second else {
            panic!("expected a committed line");
        };
        let line = committed.shape.defined_line().unwrap();
        assert!((line.n - Vector2::new(0.0, 4.0)).norm() < EPSILON);

        let data = session.store().get_scene(id).await.unwrap();
        assert_eq!(data.objects.len(), 1);
        assert_eq!(data.objects[0].properties["point1"], json!("0,0"));
        assert_eq!(data.objects[0].properties["point2"], json!("4,0"));
    }

    #[tokio::test]
    async fn test_right_click_cancels() {
        let (mut session, _) = session_with_scene().await;

        session.select_action("Midpoint").await.unwrap();
        session.click(p(0.0, 0.0), MouseButton::Left).await.unwrap();
        let progress = session.click(p(1.0, 1.0), MouseButton::Right).await.unwrap();

        assert!(matches!(progress, Progress::Cancelled));
        assert!(session.engine().active_action().is_none());
        assert!(session.scene().shapes().is_empty());
    }

    #[tokio::test]
    async fn test_optimistic_add_rolled_back() {
        let (mut session, id) = session_with_scene().await;
        session.store().delete_scene(id).await.unwrap();

        let result = session.select_action("Parameter").await;

        assert!(matches!(
            result,
            Err(EngineError::Store(StoreError::SceneNotFound(_)))
        ));
        assert!(session.scene().find("t").is_none());
    }

    #[tokio::test]
    async fn test_cascade_delete_purges_plot() {
        let store = InMemorySceneStore::new();
        let data = SceneData {
            objects: vec![
                object("A", ObjectType::FixedPoint, json!({"value": "0,0"})),
                object("lineA", ObjectType::LineAB, json!({"point1": "A", "point2": "4,0"})),
                object(
                    "X",
                    ObjectType::SlidingPoint,
                    json!({"value": "2,0", "constraining_object_name": "lineA"}),
                ),
                object("Y", ObjectType::Midpoint, json!({"point1": "A", "point2": "X"})),
                object("locusA", ObjectType::Locus, json!({"point": "Y"})),
            ],
            view: View::default(),
        };
        let id = store.import_scene("Loci", data).await.unwrap().id;
        store
            .set_plot(
                "Y",
                PlotSample {
                    points: vec![(10, 10, Color::new(255, 0, 0))],
                    equation: "y".to_string(),
                    formatted_equations: vec!["y = 0".to_string()],
                    time_taken_seconds: 0.0,
                },
            )
            .await;

        let mut session = Session::new(store, EngineConfig::default());
        let report = session.open_scene(id).await.unwrap();
        assert_eq!(report.loaded, 5);
        assert_eq!(session.scene().plot("Y").map(|s| s.points.len()), Some(1));

        assert_eq!(
            session.dependents("X").await.unwrap(),
            vec!["X", "Y", "locusA"]
        );

        let removed = session.delete_object("lineA").await.unwrap();
        assert_eq!(removed, vec!["lineA", "X", "Y", "locusA"]);
        assert!(session.scene().plot("Y").is_none());
        assert_eq!(session.scene().names().collect::<Vec<_>>(), vec!["A"]);
    }

    #[tokio::test]
    async fn test_open_scene_skips_broken_objects() {
        let store = InMemorySceneStore::new();
        let data = SceneData {
            objects: vec![
                object("A", ObjectType::FixedPoint, json!({"value": "0,0"})),
                object(
                    "invA",
                    ObjectType::TwoLineAngleInvariant,
                    json!({"line1": "lineA", "line2": "lineB"}),
                ),
                object("lineC", ObjectType::LineAB, json!({"point1": "A", "point2": "missing"})),
            ],
            view: View::default(),
        };
        let id = store.import_scene("Broken", data).await.unwrap().id;

        let mut session = Session::new(store, EngineConfig::default());
        let report = session.open_scene(id).await.unwrap();

        assert_eq!(report.loaded, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].0, "invA");
        assert!(session.scene().find("lineC").and_then(|s| s.defined_line()).is_none());
    }

    #[tokio::test]
    async fn test_computed_point_expressions() {
        let (mut session, _) = session_with_scene().await;

        session.select_action("ComputedPoint").await.unwrap();
        let invalid = session.submit_expression("(1 + 2").await;
        assert!(matches!(invalid, Err(EngineError::InvalidExpression(_))));

        let next = session.submit_expression("1/2").await.unwrap();
        assert!(matches!(next, Progress::Prompt { .. }));

        let done = session.submit_expression("2").await.unwrap();
        let Progress::Committed(committed) = done else {
            panic!("expected a committed point");
        };
        assert_eq!(committed.shape.properties()["value"], json!("0.5,2"));
        assert_eq!(committed.shape.defined_point(), Some(p(0.5, 2.0)));
    }

    #[tokio::test]
    async fn test_invariant_without_initial_value() {
        let (mut session, id) = session_with_scene().await;
        session
            .store()
            .create_object(id, object("A", ObjectType::FixedPoint, json!({"value": "1,1"})))
            .await
            .unwrap();
        session.open_scene(id).await.unwrap();

        session.select_action("Invariant").await.unwrap();
        let done = session.submit_expression("A.x + A.y").await.unwrap();

        let Progress::Committed(committed) = done else {
            panic!("expected a committed invariant");
        };
        assert_eq!(committed.shape.description(), "A.x + A.y = const");
    }

    #[tokio::test]
    async fn test_locus_commit_fetches_plot() {
        let (mut session, id) = session_with_scene().await;
        session
            .store()
            .create_object(id, object("X", ObjectType::FreePoint, json!({"value": "1,1"})))
            .await
            .unwrap();
        session.open_scene(id).await.unwrap();

        session.select_action("Locus").await.unwrap();
        session.click(p(1.0, 1.05), MouseButton::Left).await.unwrap();

        assert!(session.scene().plot("X").is_some());
        assert_eq!(session.scene().view(), &View::default());
    }
}
