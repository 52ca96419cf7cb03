//! 内置动作目录
//!
//! 按工具栏顺序注册所有动作，支持按名称（忽略大小写）或快捷名查找与前缀补全。

mod constraints;
mod lines;
mod points;

use crate::action::{ActionDefinition, ActionGroup};
use std::collections::HashMap;

/// 已有点或网格点参数的提示前缀
const DEFINED_OR_GRID_POINT_HINT: &str = "Select an already defined point or a point on the grid";

/// 除固定点外的点名：X, Y, Z, T, U, V, W
fn other_point_names() -> impl Iterator<Item = String> {
    ('X'..='Z').chain('T'..='W').map(String::from)
}

/// 动作目录
#[derive(Debug, Clone)]
pub struct ActionCatalog {
    /// 注册顺序即工具栏顺序
    definitions: Vec<ActionDefinition>,
    /// 大写名称 -> 下标
    by_name: HashMap<String, usize>,
    /// 大写快捷名 -> 下标
    shortcuts: HashMap<String, usize>,
}

impl ActionCatalog {
    pub fn new() -> Self {
        let mut catalog = Self {
            definitions: Vec::new(),
            by_name: HashMap::new(),
            shortcuts: HashMap::new(),
        };

        catalog.register_defaults();

        catalog
    }

    fn register_defaults(&mut self) {
        // 点
        self.register(points::fixed_point(), &["FP"]);
        self.register(points::free_point(), &["P"]);
        self.register(points::midpoint(), &["MID"]);
        self.register(points::intersection_point(), &["INT"]);
        self.register(points::sliding_point(), &["SP"]);
        self.register(points::projection(), &["PROJ"]);
        self.register(points::reflection(), &["REF"]);
        self.register(points::scaled_vector_point(), &["SVP"]);
        self.register(points::computed_point(), &["CP"]);

        // 直线
        self.register(lines::line_ab(), &["L"]);
        self.register(lines::pp_bisector(), &["BIS"]);
        self.register(lines::pp_to_line(), &["PERP"]);
        self.register(lines::pl_to_line(), &["PAR"]);

        // 参数
        self.register(constraints::parameter(), &["T"]);

        // 约束
        self.register(constraints::distance_invariant(), &["DI"]);
        self.register(constraints::angle_invariant(), &["AI"]);
        self.register(constraints::invariant(), &["INV"]);

        // 轨迹
        self.register(constraints::locus(), &["LOC"]);
    }

    /// 注册动作；同名动作会被替换
    pub fn register(&mut self, definition: ActionDefinition, shortcuts: &[&str]) {
        let key = definition.name.to_uppercase();
        let index = match self.by_name.get(&key) {
            Some(&index) => {
                self.definitions[index] = definition;
                index
            }
            None => {
                self.definitions.push(definition);
                let index = self.definitions.len() - 1;
                self.by_name.insert(key, index);
                index
            }
        };

        for shortcut in shortcuts {
            self.shortcuts.insert(shortcut.to_uppercase(), index);
        }
    }

    /// 按名称或快捷名查找
    pub fn lookup(&self, input: &str) -> Option<&ActionDefinition> {
        let key = input.to_uppercase();
        self.by_name
            .get(&key)
            .or_else(|| self.shortcuts.get(&key))
            .and_then(|&index| self.definitions.get(index))
    }

    /// 以 `prefix` 开头的动作名（忽略大小写，按字母排序）
    pub fn complete(&self, prefix: &str) -> Vec<String> {
        let prefix = prefix.to_uppercase();
        let mut results: Vec<String> = self
            .definitions
            .iter()
            .filter(|d| d.name.to_uppercase().starts_with(&prefix))
            .map(|d| d.name.clone())
            .collect();

        results.sort();
        results
    }

    /// 所有动作，按注册顺序
    pub fn definitions(&self) -> &[ActionDefinition] {
        &self.definitions
    }

    pub fn group(&self, group: ActionGroup) -> impl Iterator<Item = &ActionDefinition> {
        self.definitions.iter().filter(move |d| d.group == group)
    }
}

impl Default for ActionCatalog {
    fn default() -> Self {
        Self::new()
    }
}
