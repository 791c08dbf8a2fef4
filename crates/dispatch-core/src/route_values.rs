use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

/// 逐字符折叠为大写，作为大小写不敏感比较的统一口径。
///
/// 只采用一对一的简单映射：`ς` 与 `σ` 都折叠为 `Σ`；
/// 会展开成多个字符的映射（如 `ß` → `SS`）保留原字符。
pub fn fold_chars(value: &str) -> impl Iterator<Item = char> + '_ {
    value.chars().map(fold_char)
}

fn fold_char(ch: char) -> char {
    let mut upper = ch.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(single), None) => single,
        _ => ch,
    }
}

/// 大小写不敏感的字符串相等判断。
pub fn eq_ignore_case(left: &str, right: &str) -> bool {
    if left.len() == right.len() && left == right {
        return true;
    }
    fold_chars(left).eq(fold_chars(right))
}

/// 返回字符串的折叠形式，用于预先计算哈希键。
pub fn fold_case(value: &str) -> String {
    fold_chars(value).collect()
}

/// 路由值键，比较、排序与哈希均忽略大小写。
///
/// # 教案级说明
/// - **契约 (What)**：`RouteKey::new("Controller") == RouteKey::new("controller")`；
///   [`Self::as_str`] 返回首次写入时的原始拼写，便于日志与诊断；
/// - **设计 (How)**：内部持有 `Cow<'static, str>`，静态键零分配。
#[derive(Clone, Serialize)]
#[serde(transparent)]
pub struct RouteKey(Cow<'static, str>);

impl RouteKey {
    /// 基于任意可转换为 `Cow` 的输入创建键名。
    pub fn new<S>(key: S) -> Self
    where
        S: Into<Cow<'static, str>>,
    {
        Self(key.into())
    }

    /// 读取原始拼写。
    pub fn as_str(&self) -> &str {
        self.0.as_ref()
    }

    /// 与裸字符串做大小写不敏感比较。
    pub fn matches(&self, other: &str) -> bool {
        eq_ignore_case(self.as_str(), other)
    }
}

impl fmt::Debug for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq for RouteKey {
    fn eq(&self, other: &Self) -> bool {
        eq_ignore_case(self.as_str(), other.as_str())
    }
}

impl Eq for RouteKey {}

impl PartialOrd for RouteKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RouteKey {
    fn cmp(&self, other: &Self) -> Ordering {
        fold_chars(self.as_str()).cmp(fold_chars(other.as_str()))
    }
}

impl Hash for RouteKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for ch in fold_chars(self.as_str()) {
            state.write_u32(ch as u32);
        }
        state.write_u8(0xff);
    }
}

impl From<&'static str> for RouteKey {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RouteKey {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// 路由值。请求侧的路由数据可能携带任意可转字符串的值，这里收敛为有限枚举。
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
#[non_exhaustive]
pub enum RouteValue {
    /// 显式空值，与缺失等价。
    Null,
    /// 文本值。
    Text(Cow<'static, str>),
    /// 整数值，匹配时按十进制文本比较。
    Integer(i64),
    /// 布尔值，匹配时按 `true`/`false` 文本比较。
    Boolean(bool),
}

impl RouteValue {
    /// 转换为参与匹配的字符串；`Null` 与空文本均视为缺失，返回 `None`。
    pub fn as_route_str(&self) -> Option<Cow<'_, str>> {
        match self {
            RouteValue::Null => None,
            RouteValue::Text(text) if text.is_empty() => None,
            RouteValue::Text(text) => Some(Cow::Borrowed(text.as_ref())),
            RouteValue::Integer(value) => Some(Cow::Owned(value.to_string())),
            RouteValue::Boolean(value) => Some(Cow::Borrowed(if *value { "true" } else { "false" })),
        }
    }

    /// 是否等价于缺失值。
    pub fn is_absent(&self) -> bool {
        self.as_route_str().is_none()
    }
}

impl From<&'static str> for RouteValue {
    fn from(value: &'static str) -> Self {
        RouteValue::Text(Cow::Borrowed(value))
    }
}

impl From<String> for RouteValue {
    fn from(value: String) -> Self {
        RouteValue::Text(Cow::Owned(value))
    }
}

impl From<i64> for RouteValue {
    fn from(value: i64) -> Self {
        RouteValue::Integer(value)
    }
}

impl From<bool> for RouteValue {
    fn from(value: bool) -> Self {
        RouteValue::Boolean(value)
    }
}

impl<T> From<Option<T>> for RouteValue
where
    T: Into<RouteValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(RouteValue::Null, Into::into)
    }
}

/// 大小写不敏感的路由值字典，保持插入顺序。
///
/// # 教案级说明
/// - **契约 (What)**：同一键（忽略大小写）只保留一条记录，后写覆盖先写，但保留首次写入的键拼写；
/// - **设计 (How)**：路由值通常只有个位数条目，内部使用 `Vec` 线性查找，迭代顺序即插入顺序；
/// - **风险 (Trade-offs)**：条目规模上百时查找退化为线性，若出现此类用法应改为哈希结构。
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RouteValueDictionary {
    entries: Vec<(RouteKey, RouteValue)>,
}

impl RouteValueDictionary {
    /// 创建空字典。
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入或覆盖，返回被覆盖的旧值。
    pub fn insert<K, V>(&mut self, key: K, value: V) -> Option<RouteValue>
    where
        K: Into<RouteKey>,
        V: Into<RouteValue>,
    {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Builder 风格的插入。
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<RouteKey>,
        V: Into<RouteValue>,
    {
        self.insert(key, value);
        self
    }

    /// 按键读取原始值。
    pub fn get(&self, key: &str) -> Option<&RouteValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.matches(key))
            .map(|(_, value)| value)
    }

    /// 按键读取参与匹配的字符串，缺失、`Null` 与空文本统一返回 `None`。
    pub fn get_str(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).and_then(RouteValue::as_route_str)
    }

    /// 是否包含指定键（无论值是否为空）。
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// 以插入顺序遍历。
    pub fn iter(&self) -> impl Iterator<Item = (&RouteKey, &RouteValue)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    /// 遍历键。
    pub fn keys(&self) -> impl Iterator<Item = &RouteKey> {
        self.entries.iter().map(|(key, _)| key)
    }

    /// 条目数量。
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空。
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 将 `other` 的条目合并进来，`other` 覆盖同名键。
    pub fn extend_from(&mut self, other: &RouteValueDictionary) {
        for (key, value) in other.iter() {
            self.insert(key.clone(), value.clone());
        }
    }
}

impl<K, V> FromIterator<(K, V)> for RouteValueDictionary
where
    K: Into<RouteKey>,
    V: Into<RouteValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dictionary = RouteValueDictionary::new();
        for (key, value) in iter {
            dictionary.insert(key, value);
        }
        dictionary
    }
}
