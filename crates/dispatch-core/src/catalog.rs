use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;

use crate::descriptor::{ActionDescriptor, ActionId};

static NEXT_CATALOG_VERSION: AtomicU64 = AtomicU64::new(1);

/// 分配进程内单调递增的目录版本号。版本 0 保留给空目录。
pub fn next_catalog_version() -> u64 {
    NEXT_CATALOG_VERSION.fetch_add(1, Ordering::Relaxed)
}

/// 版本化、不可变的 Action 目录。
///
/// # 教案级说明
/// - **契约 (What)**：同一版本号始终对应同一序列；目录整体替换，从不原地修改；
///   消费方通过比较版本号判断自己持有的派生结构是否过期；
/// - **设计 (How)**：条目以 `Arc<[Arc<ActionDescriptor>]>` 共享，克隆目录只增加引用计数。
#[derive(Clone)]
pub struct ActionCatalog {
    version: u64,
    items: Arc<[Arc<ActionDescriptor>]>,
}

impl ActionCatalog {
    /// 以指定版本创建目录。
    pub fn new<I>(version: u64, items: I) -> Self
    where
        I: IntoIterator<Item = ActionDescriptor>,
    {
        Self {
            version,
            items: items.into_iter().map(Arc::new).collect(),
        }
    }

    /// 以新分配的版本号创建目录。
    pub fn with_next_version<I>(items: I) -> Self
    where
        I: IntoIterator<Item = ActionDescriptor>,
    {
        Self::new(next_catalog_version(), items)
    }

    /// 版本 0 的空目录。
    pub fn empty() -> Self {
        Self {
            version: 0,
            items: Arc::from(Vec::new()),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn items(&self) -> &[Arc<ActionDescriptor>] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<ActionDescriptor>> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 按标识查找描述符。
    pub fn find(&self, id: ActionId) -> Option<&Arc<ActionDescriptor>> {
        self.items.iter().find(|descriptor| descriptor.id() == id)
    }
}

impl Default for ActionCatalog {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for ActionCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionCatalog")
            .field("version", &self.version)
            .field("items", &self.items.len())
            .finish()
    }
}

impl<'a> IntoIterator for &'a ActionCatalog {
    type Item = &'a Arc<ActionDescriptor>;
    type IntoIter = std::slice::Iter<'a, Arc<ActionDescriptor>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// 目录提供方契约：返回当前快照。选择器轮询版本号，不接收推送。
pub trait ActionCatalogProvider: Send + Sync {
    fn action_descriptors(&self) -> Arc<ActionCatalog>;
}

/// 基于 `ArcSwap` 的默认目录提供方。
///
/// # 教案级说明
/// - **契约 (What)**：
///   - [`Self::action_descriptors`] 读路径无锁，返回的 `Arc` 在后续发布后仍然有效；
///   - [`Self::publish`] 只接受版本号严格大于当前版本的目录，否则返回 `false` 并保持原状；
/// - **执行 (How)**：发布使用 `compare_and_swap` 循环，并发发布时版本较大者最终胜出。
pub struct DefaultCatalogProvider {
    current: ArcSwap<ActionCatalog>,
}

impl DefaultCatalogProvider {
    /// 以空目录初始化。
    pub fn new() -> Self {
        Self::with_catalog(ActionCatalog::empty())
    }

    pub fn with_catalog(catalog: ActionCatalog) -> Self {
        Self {
            current: ArcSwap::from_pointee(catalog),
        }
    }

    /// 发布新目录。
    pub fn publish(&self, catalog: ActionCatalog) -> bool {
        let next = Arc::new(catalog);
        let mut current = self.current.load();
        loop {
            if next.version() <= current.version() {
                tracing::debug!(
                    target: "dispatch::catalog",
                    rejected = next.version(),
                    current = current.version(),
                    "ignoring stale action catalog"
                );
                return false;
            }
            let previous = self.current.compare_and_swap(&*current, Arc::clone(&next));
            if Arc::ptr_eq(&*previous, &*current) {
                tracing::debug!(
                    target: "dispatch::catalog",
                    version = next.version(),
                    actions = next.len(),
                    "published action catalog"
                );
                return true;
            }
            current = previous;
        }
    }

    /// 当前版本号。
    pub fn version(&self) -> u64 {
        self.current.load().version()
    }
}

impl Default for DefaultCatalogProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DefaultCatalogProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultCatalogProvider")
            .field("version", &self.version())
            .finish()
    }
}

impl ActionCatalogProvider for DefaultCatalogProvider {
    fn action_descriptors(&self) -> Arc<ActionCatalog> {
        self.current.load_full()
    }
}

impl<T> ActionCatalogProvider for Arc<T>
where
    T: ActionCatalogProvider + ?Sized,
{
    fn action_descriptors(&self) -> Arc<ActionCatalog> {
        (**self).action_descriptors()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ControllerTypeId;

    fn descriptor(name: &str) -> ActionDescriptor {
        ActionDescriptor::builder(name, ControllerTypeId::new("HomeController")).build()
    }

    #[test]
    fn versions_strictly_increase() {
        let first = ActionCatalog::with_next_version([descriptor("a")]);
        let second = ActionCatalog::with_next_version([descriptor("b")]);
        assert!(second.version() > first.version());
        assert!(first.version() > ActionCatalog::empty().version());
    }

    #[test]
    fn publish_rejects_stale_versions() {
        let provider = DefaultCatalogProvider::new();
        let newer = ActionCatalog::new(10, [descriptor("newer")]);
        let older = ActionCatalog::new(9, [descriptor("older")]);

        assert!(provider.publish(newer));
        assert!(!provider.publish(older));
        assert!(!provider.publish(ActionCatalog::new(10, [descriptor("same")])));

        let snapshot = provider.action_descriptors();
        assert_eq!(snapshot.version(), 10);
        assert_eq!(snapshot.items()[0].display_name(), "newer");
    }

    #[test]
    fn held_snapshot_survives_publish() {
        let provider = DefaultCatalogProvider::with_catalog(ActionCatalog::new(1, [descriptor("v1")]));
        let held = provider.action_descriptors();
        assert!(provider.publish(ActionCatalog::new(2, [descriptor("v2")])));

        assert_eq!(held.version(), 1);
        assert_eq!(held.items()[0].display_name(), "v1");
        assert_eq!(provider.action_descriptors().version(), 2);
    }

    #[test]
    fn find_by_id() {
        let catalog = ActionCatalog::with_next_version([descriptor("a"), descriptor("b")]);
        let id = catalog.items()[1].id();
        assert_eq!(catalog.find(id).map(|d| d.display_name()), Some("b"));
    }
}
