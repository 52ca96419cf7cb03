//! 交互构造引擎
//!
//! 状态机：`Idle → Active(step) → AwaitingStore → Idle`
//!
//! - 鼠标移动：按当前参数槽解析光标，生成预览（BeingAdded / Hinted）与悬停高亮
//! - 点击：接受解析结果并前进；最后一步生成待提交对象，等待存储确认
//! - 存储确认：成功则加入场景，失败则恢复到最后一步以便重试
//!
//! 引擎本身不做任何 I/O，存储调用由 `Session` 完成后通过票据回传。

use crate::action::{ActionDefinition, ArgumentSlot};
use crate::actions::ActionCatalog;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::highlight::apply_highlight;
use crate::naming::next_free_name;
use crate::state::SceneState;
use geoloc_core::creators::{
    creator_for, reclassify_distance_invariant, resolve_shape, shape_from_arguments,
    ArgumentValue, BuildResult,
};
use geoloc_core::math::Point2;
use geoloc_core::shape::{str_property, ObjectType, PersistedObject, Shape, ShapeState};
use geoloc_core::snap::SnapEngine;
use geoloc_store::StoreError;
use std::collections::BTreeSet;
use std::sync::Arc;

/// 引擎状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    /// 正在收集第 `step` 个参数
    Active { step: usize },
    /// 已生成待提交对象，等待存储结果
    AwaitingStore,
}

/// 等待持久化的对象
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCommit {
    pub ticket: u64,
    pub object: PersistedObject,
}

/// 选中动作的结果
#[derive(Debug, Clone, PartialEq)]
pub enum ActionStart {
    /// 等待第一个参数
    Prompt { name: String, hint: String },
    /// 无参数动作，对象已加入场景，等待存储确认
    Immediate(PendingCommit),
}

/// 接受一个参数的结果
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Advanced { hint: String },
    Pending(PendingCommit),
}

/// 存储确认后加入场景的对象
#[derive(Debug, Clone)]
pub struct Committed {
    pub shape: Arc<Shape>,
    /// 轨迹对象需要采样的生成点名
    pub plot_request: Option<String>,
}

#[derive(Debug, Clone)]
struct ActiveAction {
    definition: ActionDefinition,
    /// 当前对象类型（距离不变量可能被重分类）
    object_type: ObjectType,
    name: String,
    step: usize,
    collected: Vec<ArgumentValue>,
}

impl ActiveAction {
    fn slot(&self) -> Option<&ArgumentSlot> {
        self.definition.slot_at(self.step)
    }
}

#[derive(Debug, Clone)]
struct Awaiting {
    ticket: u64,
    object: PersistedObject,
    /// 对象已预先加入场景
    optimistic: bool,
    /// 失败时恢复的动作
    restore: Option<ActiveAction>,
}

/// 构造引擎
#[derive(Debug, Clone)]
pub struct ConstructionEngine {
    config: EngineConfig,
    snap: SnapEngine,
    catalog: ActionCatalog,
    active: Option<ActiveAction>,
    awaiting: Option<Awaiting>,
    next_ticket: u64,
    /// 完全解析的预览
    staged: Option<Arc<Shape>>,
    /// 未完成的预览
    hinted: Option<Arc<Shape>>,
    highlight: BTreeSet<String>,
}

impl ConstructionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            snap: SnapEngine::new(config.snap.clone()),
            config,
            catalog: ActionCatalog::new(),
            active: None,
            awaiting: None,
            next_ticket: 1,
            staged: None,
            hinted: None,
            highlight: BTreeSet::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EngineConfig) {
        self.snap = SnapEngine::new(config.snap.clone());
        self.config = config;
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut ActionCatalog {
        &mut self.catalog
    }

    pub fn state(&self) -> EngineState {
        if self.awaiting.is_some() {
            EngineState::AwaitingStore
        } else if let Some(active) = &self.active {
            EngineState::Active { step: active.step }
        } else {
            EngineState::Idle
        }
    }

    /// 当前动作的定义
    pub fn active_action(&self) -> Option<&ActionDefinition> {
        self.active.as_ref().map(|a| &a.definition)
    }

    /// 正在构造的对象名
    pub fn active_name(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.name.as_str())
    }

    /// 当前参数槽的提示
    pub fn current_hint(&self) -> Option<&str> {
        self.current_slot().map(|slot| slot.hint.as_str())
    }

    pub fn current_slot(&self) -> Option<&ArgumentSlot> {
        if self.awaiting.is_some() {
            return None;
        }
        self.active.as_ref().and_then(ActiveAction::slot)
    }

    /// 当前表达式是否需要初始值（数值参与几何计算）
    pub fn expression_requires_value(&self) -> bool {
        matches!(
            self.active.as_ref().map(|a| a.object_type),
            Some(ObjectType::ScaledVectorPoint | ObjectType::ComputedPoint)
        )
    }

    pub fn staged(&self) -> Option<&Arc<Shape>> {
        self.staged.as_ref()
    }

    pub fn hinted(&self) -> Option<&Arc<Shape>> {
        self.hinted.as_ref()
    }

    pub fn highlight(&self) -> &BTreeSet<String> {
        &self.highlight
    }

    /// 选中动作
    ///
    /// 会先取消正在进行的动作。无参数动作立即把对象加入场景并返回待提交对象。
    pub fn select_action(&mut self, name: &str, scene: &mut SceneState) -> EngineResult<ActionStart> {
        if self.awaiting.is_some() {
            return Err(EngineError::AwaitingStore);
        }

        let definition = self
            .catalog
            .lookup(name)
            .cloned()
            .ok_or_else(|| EngineError::UnknownAction(name.to_string()))?;

        self.cancel(scene);

        let object_name = next_free_name(
            &definition.allowed_names,
            scene.names(),
            self.config.max_name_suffix,
        )
        .ok_or_else(|| EngineError::NoFreeName(definition.name.clone()))?;
        let object_type = definition
            .primary_type()
            .ok_or_else(|| EngineError::InvalidAction(definition.name.clone()))?;

        if definition.is_immediate() {
            let (_, shape) = shape_from_arguments(&object_name, object_type, &[])?;
            let object = shape.to_persisted();
            scene.push(Arc::new(shape));

            let ticket = self.issue_ticket();
            tracing::debug!("Added '{}' ({}) ahead of the store", object_name, object_type);
            self.awaiting = Some(Awaiting {
                ticket,
                object: object.clone(),
                optimistic: true,
                restore: None,
            });
            return Ok(ActionStart::Immediate(PendingCommit { ticket, object }));
        }

        let hint = definition
            .slot_at(0)
            .map(|slot| slot.hint.clone())
            .unwrap_or_default();
        tracing::debug!("Action {} started for '{}'", definition.name, object_name);
        self.active = Some(ActiveAction {
            definition,
            object_type,
            name: object_name.clone(),
            step: 0,
            collected: Vec::new(),
        });

        Ok(ActionStart::Prompt {
            name: object_name,
            hint,
        })
    }

    /// 鼠标移动：更新预览与高亮
    pub fn pointer_move(&mut self, cursor: Point2, scene: &mut SceneState) {
        if self.awaiting.is_some() {
            return;
        }
        let Some(active) = &self.active else {
            return;
        };
        let Some(slot) = active.slot() else {
            return;
        };
        if slot.is_expression() {
            return;
        }

        let found = self.snap.resolve(
            cursor,
            &slot.candidate_types,
            &slot.exclusive_object_types,
            scene.shapes(),
            &active.collected,
        );

        let (staged, hinted, highlight) = match found {
            Some(found) => {
                let highlight: BTreeSet<String> = found.highlight.into_iter().collect();
                let mut args = active.collected.clone();
                args.push(found.value);
                let object_type = reclassify_distance_invariant(active.object_type, &args);

                match shape_from_arguments(&active.name, object_type, &args) {
                    Ok((BuildResult::Complete(_), shape)) => (
                        Some(Arc::new(shape.with_state(ShapeState::BeingAdded))),
                        None,
                        highlight,
                    ),
                    Ok((BuildResult::Incomplete(_), shape)) => (
                        None,
                        Some(Arc::new(shape.with_state(ShapeState::Hinted))),
                        highlight,
                    ),
                    Ok((BuildResult::Empty, _)) => (None, None, highlight),
                    Err(e) => {
                        tracing::debug!("No preview for '{}': {}", active.name, e);
                        (None, None, highlight)
                    }
                }
            }
            None => (None, hint_at(active, slot, cursor), BTreeSet::new()),
        };

        self.staged = staged;
        self.hinted = hinted;
        self.set_highlight(highlight, scene);
    }

    /// 点击：解析光标并接受为当前参数
    pub fn commit(&mut self, cursor: Point2, scene: &mut SceneState) -> EngineResult<StepOutcome> {
        let active = self.accepting()?;
        let slot = active.slot().ok_or(EngineError::NoActiveAction)?;
        if slot.is_expression() {
            return Err(EngineError::ExpressionExpected);
        }

        let found = self
            .snap
            .resolve(
                cursor,
                &slot.candidate_types,
                &slot.exclusive_object_types,
                scene.shapes(),
                &active.collected,
            )
            .ok_or(EngineError::NoMatch)?;

        self.accept_argument(found.value, scene)
    }

    /// 提交表达式参数（已由存储校验与求值）
    pub fn submit_expression(
        &mut self,
        text: &str,
        value: Option<f64>,
        scene: &mut SceneState,
    ) -> EngineResult<StepOutcome> {
        let active = self.accepting()?;
        let slot = active.slot().ok_or(EngineError::NoActiveAction)?;
        if !slot.is_expression() {
            return Err(EngineError::NotExpressionSlot);
        }

        self.accept_argument(
            ArgumentValue::Expression {
                text: text.trim().to_string(),
                value,
            },
            scene,
        )
    }

    /// 存储结果回传
    ///
    /// 票据不匹配（动作已取消或被替换）时什么也不做，返回 `Ok(None)`。
    pub fn complete_commit(
        &mut self,
        ticket: u64,
        result: Result<(), StoreError>,
        scene: &mut SceneState,
    ) -> EngineResult<Option<Committed>> {
        let awaiting = match self.awaiting.take() {
            Some(awaiting) if awaiting.ticket == ticket => awaiting,
            other => {
                self.awaiting = other;
                tracing::debug!("Ignoring stale commit ticket {}", ticket);
                return Ok(None);
            }
        };
        let object = awaiting.object;

        if let Err(e) = result {
            tracing::warn!("Store rejected '{}': {}", object.name, e);
            if awaiting.optimistic {
                scene.remove_names(std::slice::from_ref(&object.name));
            } else {
                self.active = awaiting.restore;
            }
            return Err(e.into());
        }

        let shape = if awaiting.optimistic {
            scene
                .find(&object.name)
                .cloned()
                .ok_or_else(|| EngineError::ObjectNotFound(object.name.clone()))?
        } else {
            let shape = Arc::new(resolve_shape(&object, scene.shapes())?);
            scene.push(shape.clone());
            shape
        };

        tracing::info!("Committed '{}' ({})", object.name, object.object_type);

        let plot_request = if object.object_type == ObjectType::Locus {
            str_property(&object.properties, "point").map(str::to_string)
        } else {
            None
        };

        Ok(Some(Committed {
            shape,
            plot_request,
        }))
    }

    /// 取消当前动作，丢弃部分对象、预览与高亮，不涉及存储
    pub fn cancel(&mut self, scene: &mut SceneState) {
        if let Some(active) = self.active.take() {
            tracing::debug!("Action {} cancelled", active.definition.name);
        }
        if let Some(awaiting) = self.awaiting.take() {
            // 预先加入场景的对象随取消一并移除
            if awaiting.optimistic {
                scene.remove_names(std::slice::from_ref(&awaiting.object.name));
            }
            tracing::debug!("Dropped pending commit of '{}'", awaiting.object.name);
        }
        self.clear_preview(scene);
    }

    /// 反解已有对象的参数（编辑模式）
    pub fn arguments_for(&self, name: &str, scene: &SceneState) -> EngineResult<Vec<ArgumentValue>> {
        let shape = scene
            .find(name)
            .ok_or_else(|| EngineError::ObjectNotFound(name.to_string()))?;
        let args = creator_for(shape.object_type()).arguments_from(shape.properties(), scene.shapes())?;
        Ok(args)
    }

    fn accepting(&self) -> EngineResult<&ActiveAction> {
        if self.awaiting.is_some() {
            return Err(EngineError::AwaitingStore);
        }
        self.active.as_ref().ok_or(EngineError::NoActiveAction)
    }

    fn accept_argument(&mut self, value: ArgumentValue, scene: &mut SceneState) -> EngineResult<StepOutcome> {
        let mut active = self.active.take().ok_or(EngineError::NoActiveAction)?;

        let mut args = active.collected.clone();
        args.push(value);
        let object_type = reclassify_distance_invariant(active.object_type, &args);

        // 构造失败（如两条平行线）时停留在当前步骤
        if let Err(e) = creator_for(object_type).build(&args) {
            self.active = Some(active);
            return Err(e.into());
        }

        self.clear_preview(scene);

        let restore = active.clone();
        active.collected = args;
        active.object_type = object_type;
        active.step += 1;

        if let Some(slot) = active.slot() {
            let hint = slot.hint.clone();
            tracing::debug!("'{}' advanced to step {}", active.name, active.step);
            self.active = Some(active);
            return Ok(StepOutcome::Advanced { hint });
        }

        let properties = creator_for(object_type).properties_from(&active.collected);
        let object = PersistedObject::new(active.name, object_type, properties);
        let ticket = self.issue_ticket();
        self.awaiting = Some(Awaiting {
            ticket,
            object: object.clone(),
            optimistic: false,
            restore: Some(restore),
        });

        Ok(StepOutcome::Pending(PendingCommit { ticket, object }))
    }

    fn clear_preview(&mut self, scene: &mut SceneState) {
        self.staged = None;
        self.hinted = None;
        self.set_highlight(BTreeSet::new(), scene);
    }

    fn set_highlight(&mut self, next: BTreeSet<String>, scene: &mut SceneState) {
        apply_highlight(scene.shapes_mut(), &self.highlight, &next);
        self.highlight = next;
    }

    fn issue_ticket(&mut self) -> u64 {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        ticket
    }
}

impl Default for ConstructionEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// 光标未命中任何候选时的提示预览
///
/// 点类参数槽以光标位置作为临时点；其它参数槽只显示已收集参数的占位。
fn hint_at(active: &ActiveAction, slot: &ArgumentSlot, cursor: Point2) -> Option<Arc<Shape>> {
    let mut args = active.collected.clone();
    if slot.accepts_point() {
        args.push(ArgumentValue::GridPoint(cursor));
    }

    match shape_from_arguments(&active.name, active.object_type, &args) {
        Ok((BuildResult::Empty, _)) | Err(_) => None,
        Ok((_, shape)) => Some(Arc::new(shape.with_state(ShapeState::Hinted))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionGroup;
    use geoloc_core::math::{Vector2, EPSILON};
    use geoloc_core::shape::Properties;
    use geoloc_store::View;
    use serde_json::json;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn object(name: &str, object_type: ObjectType, properties: serde_json::Value) -> PersistedObject {
        let properties: Properties = serde_json::from_value(properties).unwrap();
        PersistedObject::new(name, object_type, properties)
    }

    fn scene_of(objects: &[PersistedObject]) -> SceneState {
        let mut shapes: Vec<Arc<Shape>> = Vec::new();
        for object in objects {
            let shape = resolve_shape(object, &shapes).unwrap();
            shapes.push(Arc::new(shape));
        }
        let mut scene = SceneState::new();
        scene.open(1, View::default(), shapes);
        scene
    }

    fn pending(outcome: StepOutcome) -> PendingCommit {
        match outcome {
            StepOutcome::Pending(pending) => pending,
            other => panic!("expected a pending commit, got {:?}", other),
        }
    }

    #[test]
    fn test_line_ab_end_to_end() {
        let mut engine = ConstructionEngine::default();
        let mut scene = scene_of(&[]);

        let start = engine.select_action("LineAB", &mut scene).unwrap();
        assert_eq!(
            start,
            ActionStart::Prompt {
                name: "lineA".to_string(),
                hint: "Select an already defined point or a point on the grid (1 of 2)".to_string(),
            }
        );

        engine.pointer_move(p(0.05, 0.0), &mut scene);
        assert!(engine.hinted().is_some());
        assert!(engine.staged().is_none());

        let outcome = engine.commit(p(0.05, 0.0), &mut scene).unwrap();
        assert_eq!(
            outcome,
            StepOutcome::Advanced {
                hint: "Select an already defined point or a point on the grid (2 of 2)".to_string()
            }
        );
        assert_eq!(engine.state(), EngineState::Active { step: 1 });

        engine.pointer_move(p(4.0, 0.1), &mut scene);
        assert_eq!(engine.staged().map(|s| s.state()), Some(ShapeState::BeingAdded));
        assert!(engine.hinted().is_none());

        let pending = pending(engine.commit(p(4.0, 0.1), &mut scene).unwrap());
        assert_eq!(pending.object.name, "lineA");
        assert_eq!(pending.object.object_type, ObjectType::LineAB);
        assert_eq!(pending.object.properties["point1"], json!("0,0"));
        assert_eq!(pending.object.properties["point2"], json!("4,0"));

        assert_eq!(engine.state(), EngineState::AwaitingStore);
        assert!(matches!(
            engine.commit(p(1.0, 1.0), &mut scene),
            Err(EngineError::AwaitingStore)
        ));
        assert!(scene.shapes().is_empty());

        let committed = engine
            .complete_commit(pending.ticket, Ok(()), &mut scene)
            .unwrap()
            .unwrap();
        let line = committed.shape.defined_line().unwrap();
        assert!((line.point - p(0.0, 0.0)).norm() < EPSILON);
        assert!((line.n - Vector2::new(0.0, 4.0)).norm() < EPSILON);
        assert!(committed.plot_request.is_none());
        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(scene.shapes().len(), 1);
    }

    #[test]
    fn test_distance_invariant_reclassified() {
        let mut engine = ConstructionEngine::default();
        let mut scene = scene_of(&[
            object("A", ObjectType::FixedPoint, json!({"value": "0,0"})),
            object("lineA", ObjectType::LineAB, json!({"point1": "0,2", "point2": "4,2"})),
        ]);

        engine.select_action("DistanceInvariant", &mut scene).unwrap();
        engine.commit(p(0.05, 0.0), &mut scene).unwrap();

        engine.pointer_move(p(1.5, 2.05), &mut scene);
        assert_eq!(
            engine.staged().map(|s| s.object_type()),
            Some(ObjectType::PointToLineDistanceInvariant)
        );
        assert!(engine.highlight().contains("lineA"));

        let pending = pending(engine.commit(p(1.5, 2.05), &mut scene).unwrap());
        assert_eq!(pending.object.name, "invA");
        assert_eq!(pending.object.object_type, ObjectType::PointToLineDistanceInvariant);
        assert_eq!(pending.object.properties["point"], json!("A"));
        assert_eq!(pending.object.properties["line"], json!("lineA"));
        assert!(!pending.object.properties.contains_key("point2"));
    }

    #[test]
    fn test_store_failure_restores_last_step() {
        let mut engine = ConstructionEngine::default();
        let mut scene = scene_of(&[]);

        engine.select_action("Midpoint", &mut scene).unwrap();
        engine.commit(p(0.0, 0.0), &mut scene).unwrap();
        let first = pending(engine.commit(p(2.0, 0.0), &mut scene).unwrap());

        let result = engine.complete_commit(
            first.ticket,
            Err(StoreError::DuplicateName("X".to_string())),
            &mut scene,
        );
        assert!(matches!(result, Err(EngineError::Store(StoreError::DuplicateName(_)))));
        assert_eq!(engine.state(), EngineState::Active { step: 1 });
        assert!(scene.shapes().is_empty());

        let second = pending(engine.commit(p(2.0, 0.0), &mut scene).unwrap());
        assert_ne!(first.ticket, second.ticket);
        assert_eq!(second.object, first.object);
    }

    #[test]
    fn test_stale_ticket_is_ignored() {
        let mut engine = ConstructionEngine::default();
        let mut scene = scene_of(&[]);

        engine.select_action("Midpoint", &mut scene).unwrap();
        engine.commit(p(0.0, 0.0), &mut scene).unwrap();
        let pending = pending(engine.commit(p(2.0, 0.0), &mut scene).unwrap());

        engine.cancel(&mut scene);
        let result = engine.complete_commit(pending.ticket, Ok(()), &mut scene).unwrap();

        assert!(result.is_none());
        assert!(scene.shapes().is_empty());
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[test]
    fn test_immediate_action_rollback() {
        let mut engine = ConstructionEngine::default();
        let mut scene = scene_of(&[]);

        let start = engine.select_action("Parameter", &mut scene).unwrap();
        let ActionStart::Immediate(first) = start else {
            panic!("parameter should be created immediately");
        };
        assert_eq!(first.object.name, "t");
        assert!(scene.find("t").is_some());

        let result = engine.complete_commit(
            first.ticket,
            Err(StoreError::Backend("offline".to_string())),
            &mut scene,
        );
        assert!(result.is_err());
        assert!(scene.find("t").is_none());
        assert_eq!(engine.state(), EngineState::Idle);

        let ActionStart::Immediate(second) = engine.select_action("Parameter", &mut scene).unwrap() else {
            panic!("parameter should be created immediately");
        };
        let committed = engine
            .complete_commit(second.ticket, Ok(()), &mut scene)
            .unwrap()
            .unwrap();
        assert_eq!(committed.shape.name(), "t");
        assert_eq!(scene.shapes().len(), 1);
    }

    #[test]
    fn test_cancel_discards_pending_immediate_object() {
        let mut engine = ConstructionEngine::default();
        let mut scene = scene_of(&[]);

        let ActionStart::Immediate(added) = engine.select_action("Parameter", &mut scene).unwrap() else {
            panic!("parameter should be created immediately");
        };
        assert!(scene.find("t").is_some());

        engine.cancel(&mut scene);
        assert!(scene.find("t").is_none());
        assert_eq!(engine.state(), EngineState::Idle);

        let late = engine.complete_commit(
            added.ticket,
            Err(StoreError::Backend("offline".to_string())),
            &mut scene,
        );
        assert!(matches!(late, Ok(None)));
        assert!(scene.shapes().is_empty());
    }

    #[test]
    fn test_action_without_object_type_is_rejected() {
        let mut engine = ConstructionEngine::default();
        let mut scene = scene_of(&[]);

        let mut definition =
            ActionDefinition::new("Broken", ActionGroup::Parameters, ObjectType::Parameter).names(["b"]);
        definition.object_types.clear();
        engine.catalog_mut().register(definition, &[]);

        assert!(matches!(
            engine.select_action("Broken", &mut scene),
            Err(EngineError::InvalidAction(name)) if name == "Broken"
        ));
        assert!(scene.shapes().is_empty());
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[test]
    fn test_expression_slot() {
        let mut engine = ConstructionEngine::default();
        let mut scene = scene_of(&[object("A", ObjectType::FixedPoint, json!({"value": "1,2"}))]);

        engine.select_action("Invariant", &mut scene).unwrap();
        assert!(matches!(
            engine.commit(p(1.0, 2.0), &mut scene),
            Err(EngineError::ExpressionExpected)
        ));
        assert!(!engine.expression_requires_value());

        let pending = pending(engine.submit_expression(" A.x + A.y ", None, &mut scene).unwrap());
        assert_eq!(pending.object.properties["formula"], json!("A.x + A.y"));
    }

    #[test]
    fn test_point_slot_rejects_expression() {
        let mut engine = ConstructionEngine::default();
        let mut scene = scene_of(&[]);

        engine.select_action("FixedPoint", &mut scene).unwrap();
        assert!(matches!(
            engine.submit_expression("1", Some(1.0), &mut scene),
            Err(EngineError::NotExpressionSlot)
        ));
    }

    #[test]
    fn test_parallel_lines_keep_step() {
        let mut engine = ConstructionEngine::default();
        let mut scene = scene_of(&[
            object("lineA", ObjectType::LineAB, json!({"point1": "0,0", "point2": "4,0"})),
            object("lineB", ObjectType::LineAB, json!({"point1": "0,2", "point2": "4,2"})),
        ]);

        engine.select_action("AngleInvariant", &mut scene).unwrap();
        engine.commit(p(0.5, 0.05), &mut scene).unwrap();

        let result = engine.commit(p(0.5, 2.05), &mut scene);
        assert!(matches!(result, Err(EngineError::Shape(_))));
        assert_eq!(engine.state(), EngineState::Active { step: 1 });
    }

    #[test]
    fn test_hover_highlight() {
        let mut engine = ConstructionEngine::default();
        let mut scene = scene_of(&[object("A", ObjectType::FixedPoint, json!({"value": "0,0"}))]);

        engine.select_action("Midpoint", &mut scene).unwrap();

        engine.pointer_move(p(0.05, 0.0), &mut scene);
        assert_eq!(scene.find("A").map(|s| s.state()), Some(ShapeState::Suggested));

        engine.pointer_move(p(0.5, 0.5), &mut scene);
        assert_eq!(scene.find("A").map(|s| s.state()), Some(ShapeState::Default));
        assert!(engine.highlight().is_empty());
        assert_eq!(engine.hinted().and_then(|s| s.defined_point()), Some(p(0.5, 0.5)));

        engine.pointer_move(p(0.05, 0.0), &mut scene);
        engine.cancel(&mut scene);
        assert_eq!(scene.find("A").map(|s| s.state()), Some(ShapeState::Default));
        assert!(engine.hinted().is_none());
    }

    #[test]
    fn test_naming_skips_existing() {
        let mut engine = ConstructionEngine::default();
        let mut scene = scene_of(&[object("A", ObjectType::FixedPoint, json!({"value": "0,0"}))]);

        let start = engine.select_action("fixedpoint", &mut scene).unwrap();
        assert!(matches!(start, ActionStart::Prompt { ref name, .. } if name == "B"));
        assert!(matches!(
            engine.select_action("Circle", &mut scene),
            Err(EngineError::UnknownAction(_))
        ));
    }

    #[test]
    fn test_locus_requests_plot() {
        let mut engine = ConstructionEngine::default();
        let mut scene = scene_of(&[object("X", ObjectType::FreePoint, json!({"value": "1,1"}))]);

        engine.select_action("Locus", &mut scene).unwrap();
        let pending = pending(engine.commit(p(1.05, 1.0), &mut scene).unwrap());
        assert_eq!(pending.object.properties["point"], json!("X"));

        let committed = engine
            .complete_commit(pending.ticket, Ok(()), &mut scene)
            .unwrap()
            .unwrap();
        assert_eq!(committed.plot_request.as_deref(), Some("X"));
        assert_eq!(committed.shape.description(), "Plot X");
    }

    #[test]
    fn test_arguments_for_existing_object() {
        let engine = ConstructionEngine::default();
        let scene = scene_of(&[
            object("A", ObjectType::FixedPoint, json!({"value": "0,0"})),
            object("lineA", ObjectType::LineAB, json!({"point1": "A", "point2": "4,0"})),
        ]);

        let args = engine.arguments_for("lineA", &scene).unwrap();
        assert_eq!(
            args,
            vec![
                ArgumentValue::DefinedPoint {
                    name: "A".to_string(),
                    point: p(0.0, 0.0),
                },
                ArgumentValue::GridPoint(p(4.0, 0.0)),
            ]
        );
        assert!(matches!(
            engine.arguments_for("lineZ", &scene),
            Err(EngineError::ObjectNotFound(_))
        ));
    }
}
