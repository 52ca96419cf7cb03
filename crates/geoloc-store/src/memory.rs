//! 内存场景存储
//!
//! 单进程内的 `SceneStore` 实现，用于离线编辑与测试：
//! - 名称冲突与未知引用在写入时拒绝
//! - 删除对象时按依赖关系级联删除
//! - 表达式校验使用与服务端相同的白名单规则
//! - 初始值只支持数字字面量、简单分数与参数（初值为 0）
//! - 轨迹采样返回预先设置的结果

use crate::error::StoreError;
use crate::store::{
    EvaluationResult, PlotSample, SceneData, SceneInfo, SceneStore, ValidationResult, View,
    SCENE_DEFAULT_NAME,
};
use chrono::Utc;
use geoloc_core::expression::{dependencies, extract_identifiers, parentheses_balanced};
use geoloc_core::shape::{str_property, ObjectType, PersistedObject};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::time::Instant;
use tokio::sync::Mutex;

const ALLOWED_FIELDS: [&str; 4] = ["x", "y", "o", "n"];
const ALLOWED_METHODS: [&str; 5] = ["abs", "length", "length_sqr", "rotated90", "contains"];
const ALLOWED_FUNCTIONS: [&str; 7] = ["sqrt", "d", "d_sqr", "cot", "Point", "Line", "Vector"];

#[derive(Debug)]
struct StoredScene {
    info: SceneInfo,
    data: SceneData,
}

impl StoredScene {
    fn find(&self, name: &str) -> Option<&PersistedObject> {
        self.data.objects.iter().find(|o| o.name == name)
    }

    /// 对象本身及其全部依赖者，按场景顺序排列
    fn collect_dependents(&self, target: &str) -> Vec<String> {
        let mut collected = HashSet::new();
        let mut queue = VecDeque::from([target.to_string()]);

        while let Some(current) = queue.pop_front() {
            if !collected.insert(current.clone()) {
                continue;
            }
            for object in &self.data.objects {
                if !collected.contains(&object.name)
                    && dependencies(object).iter().any(|d| *d == current)
                {
                    queue.push_back(object.name.clone());
                }
            }
        }

        self.data
            .objects
            .iter()
            .filter(|o| collected.contains(&o.name))
            .map(|o| o.name.clone())
            .collect()
    }

    fn validate_expression(&self, expression: &str) -> Vec<String> {
        let mut messages = Vec::new();
        if !parentheses_balanced(expression) {
            messages.push("Unbalanced parentheses".to_string());
        }

        let identifiers = extract_identifiers(expression);
        for field in &identifiers.field_names {
            if !ALLOWED_FIELDS.contains(&field.as_str()) {
                messages.push(format!(
                    "Invalid field name: '{}'. Allowed fields are: {:?}",
                    field, ALLOWED_FIELDS
                ));
            }
        }
        for method in &identifiers.method_names {
            if !ALLOWED_METHODS.contains(&method.as_str()) {
                messages.push(format!(
                    "Invalid method name: '{}'. Allowed methods are: {:?}",
                    method, ALLOWED_METHODS
                ));
            }
        }
        for function in &identifiers.function_names {
            if !ALLOWED_FUNCTIONS.contains(&function.as_str()) {
                messages.push(format!(
                    "Invalid function name: '{}'. Allowed functions are: {:?}",
                    function, ALLOWED_FUNCTIONS
                ));
            }
        }
        for name in &identifiers.object_names {
            match self.find(name) {
                Some(object) if is_constraint(object.object_type) => {
                    messages.push(format!(
                        "Object '{}' has type '{}' which is not allowed in expressions",
                        name, object.object_type
                    ));
                }
                Some(_) => {}
                None => messages.push(format!("Object '{}' not found in scene", name)),
            }
        }

        messages
    }

    fn evaluate(&self, expression: &str) -> Option<f64> {
        let text = expression.trim();
        if let Ok(v) = text.parse::<f64>() {
            return Some(v);
        }
        if let Some((num, den)) = text.split_once('/') {
            let num = num.trim().parse::<f64>().ok()?;
            let den = den.trim().parse::<f64>().ok()?;
            return (den != 0.0).then(|| num / den);
        }
        match self.find(text) {
            Some(object) if object.object_type == ObjectType::Parameter => Some(0.0),
            _ => None,
        }
    }
}

/// 不能出现在表达式中的类型
fn is_constraint(object_type: ObjectType) -> bool {
    matches!(
        object_type,
        ObjectType::TwoPointDistanceInvariant
            | ObjectType::PointToLineDistanceInvariant
            | ObjectType::TwoLineAngleInvariant
            | ObjectType::Invariant
            | ObjectType::Locus
    )
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i32,
    scenes: BTreeMap<i32, StoredScene>,
    /// 按生成点名预设的采样结果
    plots: HashMap<String, PlotSample>,
}

impl Inner {
    fn scene(&self, scene_id: i32) -> Result<&StoredScene, StoreError> {
        self.scenes
            .get(&scene_id)
            .ok_or(StoreError::SceneNotFound(scene_id))
    }

    fn scene_mut(&mut self, scene_id: i32) -> Result<&mut StoredScene, StoreError> {
        self.scenes
            .get_mut(&scene_id)
            .ok_or(StoreError::SceneNotFound(scene_id))
    }
}

/// 内存场景存储
#[derive(Debug, Default)]
pub struct InMemorySceneStore {
    inner: Mutex<Inner>,
}

impl InMemorySceneStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置某生成点的轨迹采样结果
    pub async fn set_plot(&self, point_name: &str, sample: PlotSample) {
        let mut inner = self.inner.lock().await;
        inner.plots.insert(point_name.to_string(), sample);
    }

    /// 导入整个场景（如从原生文档加载）
    pub async fn import_scene(&self, name: &str, data: SceneData) -> Result<SceneInfo, StoreError> {
        let info = self.create_scene(Some(name)).await?;
        let mut inner = self.inner.lock().await;
        inner.scene_mut(info.id)?.data = data;
        Ok(info)
    }
}

impl SceneStore for InMemorySceneStore {
    async fn list_scenes(&self) -> Result<Vec<SceneInfo>, StoreError> {
        let inner = self.inner.lock().await;
        let mut scenes: Vec<SceneInfo> = inner.scenes.values().map(|s| s.info.clone()).collect();
        scenes.sort_by_key(|s| (s.created_at, s.id));
        Ok(scenes)
    }

    async fn create_scene(&self, name: Option<&str>) -> Result<SceneInfo, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.next_id += 1;
        let id = inner.next_id;

        let name = match name.map(str::trim) {
            Some(n) if !n.is_empty() && n != SCENE_DEFAULT_NAME => n.to_string(),
            _ => format!("Scene {}", id),
        };
        let info = SceneInfo {
            id,
            name,
            created_at: Utc::now(),
        };
        inner.scenes.insert(
            id,
            StoredScene {
                info: info.clone(),
                data: SceneData {
                    objects: Vec::new(),
                    view: View::default(),
                },
            },
        );

        tracing::info!("Created scene {} '{}'", info.id, info.name);
        Ok(info)
    }

    async fn rename_scene(&self, scene_id: i32, name: &str) -> Result<SceneInfo, StoreError> {
        let mut inner = self.inner.lock().await;
        let scene = inner.scene_mut(scene_id)?;
        scene.info.name = name.to_string();
        Ok(scene.info.clone())
    }

    async fn delete_scene(&self, scene_id: i32) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner
            .scenes
            .remove(&scene_id)
            .ok_or(StoreError::SceneNotFound(scene_id))?;
        tracing::info!("Deleted scene {}", scene_id);
        Ok(())
    }

    async fn get_scene(&self, scene_id: i32) -> Result<SceneData, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.scene(scene_id)?.data.clone())
    }

    async fn create_object(&self, scene_id: i32, object: PersistedObject) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let scene = inner.scene_mut(scene_id)?;

        // 名称检查
        if object.name.trim().is_empty() {
            return Err(StoreError::InvalidObject("Object name is empty".to_string()));
        }
        if scene.find(&object.name).is_some() {
            return Err(StoreError::DuplicateName(object.name));
        }
        // 依赖检查
        for dependency in dependencies(&object) {
            if scene.find(&dependency).is_none() {
                return Err(StoreError::InvalidObject(format!(
                    "'{}' references unknown object '{}'",
                    object.name, dependency
                )));
            }
        }
        // 每个点只允许一个轨迹
        if object.object_type == ObjectType::Locus {
            let point = str_property(&object.properties, "point").unwrap_or_default();
            let taken = scene.data.objects.iter().any(|o| {
                o.object_type == ObjectType::Locus
                    && str_property(&o.properties, "point") == Some(point)
            });
            if taken {
                return Err(StoreError::InvalidObject(format!(
                    "Point '{}' already has a locus",
                    point
                )));
            }
        }

        tracing::info!(
            "Scene {}: created {} '{}'",
            scene_id,
            object.object_type,
            object.name
        );
        scene.data.objects.push(object);
        Ok(())
    }

    async fn delete_object(&self, scene_id: i32, name: &str) -> Result<Vec<String>, StoreError> {
        let mut inner = self.inner.lock().await;
        let scene = inner.scene_mut(scene_id)?;
        if scene.find(name).is_none() {
            return Err(StoreError::ObjectNotFound(name.to_string()));
        }

        let deleted = scene.collect_dependents(name);
        scene.data.objects.retain(|o| !deleted.contains(&o.name));

        tracing::info!("Scene {}: deleted {:?}", scene_id, deleted);
        Ok(deleted)
    }

    async fn dependents(&self, scene_id: i32, name: &str) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.lock().await;
        let scene = inner.scene(scene_id)?;
        if scene.find(name).is_none() {
            return Err(StoreError::ObjectNotFound(name.to_string()));
        }
        Ok(scene.collect_dependents(name))
    }

    async fn sample_plot(
        &self,
        scene_id: i32,
        point_name: &str,
        width: u32,
        height: u32,
    ) -> Result<PlotSample, StoreError> {
        let start = Instant::now();
        let inner = self.inner.lock().await;
        let scene = inner.scene(scene_id)?;

        let has_locus = scene.data.objects.iter().any(|o| {
            o.object_type == ObjectType::Locus
                && str_property(&o.properties, "point") == Some(point_name)
        });
        if !has_locus {
            return Err(StoreError::ObjectNotFound(format!("locus of {}", point_name)));
        }

        let mut sample = inner.plots.get(point_name).cloned().unwrap_or(PlotSample {
            points: Vec::new(),
            equation: String::new(),
            formatted_equations: Vec::new(),
            time_taken_seconds: 0.0,
        });
        sample.points.retain(|(x, y, _)| *x < width && *y < height);
        sample.time_taken_seconds = start.elapsed().as_secs_f64();

        tracing::debug!(
            "Scene {}: sampled locus of {} ({} points)",
            scene_id,
            point_name,
            sample.points.len()
        );
        Ok(sample)
    }

    async fn validate_expressions(
        &self,
        scene_id: i32,
        expressions: &[String],
    ) -> Result<ValidationResult, StoreError> {
        let inner = self.inner.lock().await;
        let scene = inner.scene(scene_id)?;

        let errors = expressions
            .iter()
            .enumerate()
            .flat_map(|(index, expression)| {
                scene
                    .validate_expression(expression)
                    .into_iter()
                    .map(move |error| format!("Expression {}: {}", index + 1, error))
            })
            .collect();
        Ok(ValidationResult { errors })
    }

    async fn evaluate_initial(
        &self,
        scene_id: i32,
        expressions: &[String],
    ) -> Result<EvaluationResult, StoreError> {
        let inner = self.inner.lock().await;
        let scene = inner.scene(scene_id)?;

        let values = expressions
            .iter()
            .map(|expression| {
                scene.evaluate(expression).ok_or_else(|| {
                    StoreError::Backend(format!(
                        "Failed to evaluate initial value of '{}'",
                        expression
                    ))
                })
            })
            .collect::<Result<Vec<f64>, StoreError>>()?;
        Ok(EvaluationResult { values })
    }
}
