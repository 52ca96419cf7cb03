//! 新对象的自动命名

/// 选取第一个未被占用的名字
///
/// 先按顺序尝试每个候选名本身，再以后缀 1..=`max_suffix` 为外层、
/// 候选名为内层依次尝试 `A1, B1, .., A2, ..`。
pub fn next_free_name<'a, I>(allowed: &[String], taken: I, max_suffix: u32) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: std::collections::HashSet<&str> = taken.into_iter().collect();

    if let Some(name) = allowed.iter().find(|name| !taken.contains(name.as_str())) {
        return Some(name.clone());
    }

    (1..=max_suffix)
        .flat_map(|suffix| allowed.iter().map(move |name| format!("{}{}", name, suffix)))
        .find(|candidate| !taken.contains(candidate.as_str()))
}
