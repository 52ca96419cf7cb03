//! 动作定义
//!
//! 一个动作描述如何交互式地创建某种对象：按顺序需要哪些参数、
//! 每个参数接受哪些候选类型、以及新对象可以使用的名字。

use geoloc_core::shape::ObjectType;
use geoloc_core::snap::ArgumentType;
use serde::{Deserialize, Serialize};

/// 工具栏分组
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionGroup {
    Points,
    Lines,
    Parameters,
    Constraints,
    Locus,
}

impl ActionGroup {
    pub fn name(&self) -> &'static str {
        match self {
            ActionGroup::Points => "Points",
            ActionGroup::Lines => "Lines",
            ActionGroup::Parameters => "Parameters",
            ActionGroup::Constraints => "Constraints",
            ActionGroup::Locus => "Locus",
        }
    }
}

/// 鼠标按键
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// 参数槽
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentSlot {
    /// 按优先级排列的候选类型；为空表示表达式输入
    pub candidate_types: Vec<ArgumentType>,
    /// 提示文本
    pub hint: String,
    /// 其点位不可复用的对象类型
    pub exclusive_object_types: Vec<ObjectType>,
}

impl ArgumentSlot {
    pub fn new(candidate_types: Vec<ArgumentType>, hint: impl Into<String>) -> Self {
        Self {
            candidate_types,
            hint: hint.into(),
            exclusive_object_types: Vec::new(),
        }
    }

    /// 表达式槽
    pub fn expression(hint: impl Into<String>) -> Self {
        Self::new(Vec::new(), hint)
    }

    pub fn exclusive(mut self, object_types: &[ObjectType]) -> Self {
        self.exclusive_object_types = object_types.to_vec();
        self
    }

    pub fn is_expression(&self) -> bool {
        self.candidate_types.is_empty()
    }

    /// 是否接受点类参数
    pub fn accepts_point(&self) -> bool {
        self.candidate_types.iter().any(ArgumentType::is_point)
    }
}

/// 动作定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDefinition {
    pub name: String,
    pub description: String,
    pub group: ActionGroup,
    /// 可能产生的对象类型，第一个为默认类型
    pub object_types: Vec<ObjectType>,
    pub argument_slots: Vec<ArgumentSlot>,
    /// 按优先顺序排列的候选名
    pub allowed_names: Vec<String>,
}

impl ActionDefinition {
    pub fn new(name: impl Into<String>, group: ActionGroup, object_type: ObjectType) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            group,
            object_types: vec![object_type],
            argument_slots: Vec::new(),
            allowed_names: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// 追加一种可由重分类得到的对象类型
    pub fn also(mut self, object_type: ObjectType) -> Self {
        self.object_types.push(object_type);
        self
    }

    pub fn slot(mut self, slot: ArgumentSlot) -> Self {
        self.argument_slots.push(slot);
        self
    }

    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// 默认对象类型
    pub fn primary_type(&self) -> Option<ObjectType> {
        self.object_types.first().copied()
    }

    /// 无参数的动作在选中后立即创建对象
    pub fn is_immediate(&self) -> bool {
        self.argument_slots.is_empty()
    }

    pub fn slot_at(&self, step: usize) -> Option<&ArgumentSlot> {
        self.argument_slots.get(step)
    }
}
