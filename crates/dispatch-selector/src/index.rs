//! 选择索引：按路由值元组分桶的只读结构。

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dispatch_core::route_values::fold_case;
use dispatch_core::{ActionCatalog, ActionDescriptor, ActionId, RouteKey, RouteValueDictionary};

/// 路由值元组；`None` 同时代表缺失与空字符串。
type TupleKey = Box<[Option<Box<str>>]>;

/// 从目录某一版本派生的分桶索引。
///
/// # 教案级说明
/// - **结构 (What)**：
///   - `route_keys`：任一描述符出现过的路由键，按首次出现顺序去重（不区分大小写）；
///   - `ignore_case`：折叠大小写后的元组 → 桶序号；
///   - `ordinal`：原样元组 → 桶序号，指向与其折叠形式相同的桶；
///   - 桶内描述符保持目录顺序。
/// - **不变式**：忽略大小写映射是原样映射的粗化，每个原样键的桶就是它折叠后所在的桶；
/// - **生命周期**：构建完成后不可变，由选择器整体替换。
pub struct SelectionIndex {
    version: u64,
    route_keys: Vec<RouteKey>,
    ordinal: HashMap<TupleKey, usize>,
    ignore_case: HashMap<TupleKey, usize>,
    buckets: Vec<Arc<[Arc<ActionDescriptor>]>>,
}

impl SelectionIndex {
    /// 从目录快照构建索引。
    pub fn build(catalog: &ActionCatalog) -> Self {
        let mut route_keys: Vec<RouteKey> = Vec::new();
        for action in catalog {
            for key in action.route_values().keys() {
                if !route_keys.contains(key) {
                    route_keys.push(key.clone());
                }
            }
        }

        let mut ordinal = HashMap::new();
        let mut ignore_case: HashMap<TupleKey, usize> = HashMap::new();
        let mut grouped: Vec<Vec<Arc<ActionDescriptor>>> = Vec::new();

        for action in catalog {
            let exact = tuple(&route_keys, action.route_values());
            let folded = fold_tuple(&exact);
            let slot = *ignore_case.entry(folded).or_insert_with(|| {
                grouped.push(Vec::new());
                grouped.len() - 1
            });
            grouped[slot].push(Arc::clone(action));
            ordinal.entry(exact).or_insert(slot);
        }

        Self {
            version: catalog.version(),
            route_keys,
            ordinal,
            ignore_case,
            buckets: grouped.into_iter().map(Arc::from).collect(),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn route_keys(&self) -> &[RouteKey] {
        &self.route_keys
    }

    /// 桶的数量（不同的忽略大小写元组数）。
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// 按请求路由值查桶：先原样，后忽略大小写。
    pub fn lookup(&self, values: &RouteValueDictionary) -> Option<&Arc<[Arc<ActionDescriptor>]>> {
        let exact = tuple(&self.route_keys, values);
        let slot = match self.ordinal.get(&exact) {
            Some(slot) => *slot,
            None => *self.ignore_case.get(&fold_tuple(&exact))?,
        };
        self.buckets.get(slot)
    }

    fn bucket_ids(&self, slot: usize) -> Vec<ActionId> {
        self.buckets
            .get(slot)
            .map(|bucket| bucket.iter().map(|action| action.id()).collect())
            .unwrap_or_default()
    }

    fn same_mapping(
        &self,
        own: &HashMap<TupleKey, usize>,
        other: &SelectionIndex,
        theirs: &HashMap<TupleKey, usize>,
    ) -> bool {
        own.len() == theirs.len()
            && own.iter().all(|(key, slot)| {
                theirs
                    .get(key)
                    .is_some_and(|other_slot| self.bucket_ids(*slot) == other.bucket_ids(*other_slot))
            })
    }
}

/// 值相等：版本、路由键与两张映射的桶内容（按 [`ActionId`] 比较）一致。
impl PartialEq for SelectionIndex {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.route_keys.len() == other.route_keys.len()
            && self
                .route_keys
                .iter()
                .zip(&other.route_keys)
                .all(|(left, right)| left.as_str() == right.as_str())
            && self.same_mapping(&self.ordinal, other, &other.ordinal)
            && self.same_mapping(&self.ignore_case, other, &other.ignore_case)
    }
}

impl fmt::Debug for SelectionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionIndex")
            .field("version", &self.version)
            .field("route_keys", &self.route_keys)
            .field("buckets", &self.buckets.len())
            .finish()
    }
}

fn tuple(route_keys: &[RouteKey], values: &RouteValueDictionary) -> TupleKey {
    route_keys
        .iter()
        .map(|key| values.get_str(key.as_str()).map(|value| Box::from(value.as_ref())))
        .collect()
}

fn fold_tuple(exact: &TupleKey) -> TupleKey {
    exact
        .iter()
        .map(|value| value.as_deref().map(|value| fold_case(value).into_boxed_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use dispatch_core::ControllerTypeId;

    use super::*;

    fn action(display: &str, controller: &str, area: Option<&str>) -> ActionDescriptor {
        let mut builder = ActionDescriptor::builder(display.to_owned(), ControllerTypeId::new("C"))
            .route_value("controller", controller.to_owned());
        if let Some(area) = area {
            builder = builder.route_value("area", area.to_owned());
        }
        builder.build()
    }

    #[test]
    fn route_keys_are_distinct_ignoring_case() {
        let catalog = ActionCatalog::new(
            1,
            [
                action("a", "Home", None),
                ActionDescriptor::builder("b", ControllerTypeId::new("C"))
                    .route_value("CONTROLLER", "Blog")
                    .route_value("Area", "Admin")
                    .build(),
            ],
        );
        let index = SelectionIndex::build(&catalog);
        let keys: Vec<_> = index.route_keys().iter().map(RouteKey::as_str).collect();
        assert_eq!(keys, ["controller", "Area"]);
    }

    #[test]
    fn ordinal_and_folded_keys_share_one_bucket() {
        let catalog = ActionCatalog::new(1, [action("a", "Home", None), action("b", "HOME", None)]);
        let index = SelectionIndex::build(&catalog);
        assert_eq!(index.bucket_count(), 1);

        let request = RouteValueDictionary::new().with("controller", "home");
        let bucket = index.lookup(&request).expect("忽略大小写应命中");
        assert_eq!(bucket.len(), 2);
    }

    #[test]
    fn empty_and_missing_values_are_equivalent() {
        let catalog = ActionCatalog::new(1, [action("a", "Home", None)]);
        let index = SelectionIndex::build(&catalog);

        let blank_area = RouteValueDictionary::new()
            .with("controller", "Home")
            .with("area", "");
        assert!(index.lookup(&blank_area).is_some());

        let other = RouteValueDictionary::new().with("controller", "Blog");
        assert!(index.lookup(&other).is_none());
    }
}
