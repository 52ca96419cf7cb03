//! 悬停高亮
//!
//! 高亮集合的变化以差分方式作用到图形列表：只有成员关系改变的图形
//! 会被替换为新的快照，其余保持同一个 `Arc`。

use geoloc_core::shape::Shape;
use std::collections::BTreeSet;
use std::sync::Arc;

/// 把高亮集合从 `previous` 切换到 `next`
///
/// 返回状态被改变的图形数量。
pub fn apply_highlight(
    shapes: &mut [Arc<Shape>],
    previous: &BTreeSet<String>,
    next: &BTreeSet<String>,
) -> usize {
    if previous == next {
        return 0;
    }

    let mut changed = 0;
    for shape in shapes.iter_mut() {
        let was = previous.contains(shape.name());
        let now = next.contains(shape.name());
        if was == now {
            continue;
        }

        let state = shape.state().with_suggested(now);
        if state != shape.state() {
            *shape = Arc::new(shape.with_state(state));
            changed += 1;
        }
    }
    changed
}
