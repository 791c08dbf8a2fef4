use std::fmt;
use std::sync::Arc;

/// 过滤器元数据。过滤器的执行管线不在本 crate 范围内，这里只承载排序所需的信息。
pub trait FilterMetadata: fmt::Debug + Send + Sync + 'static {
    /// 过滤器名称，用于诊断与序列化。
    fn name(&self) -> &str;

    /// 显式排序值，默认 0。
    fn order(&self) -> i32 {
        0
    }
}

/// 过滤器声明所在的作用域，数值越大越靠内层。
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterScope {
    Global = 10,
    Controller = 20,
    Action = 30,
}

/// 折叠到描述符上的过滤器条目。
#[derive(Clone, Debug)]
pub struct FilterDescriptor {
    filter: Arc<dyn FilterMetadata>,
    scope: FilterScope,
    order: i32,
}

impl FilterDescriptor {
    pub fn new(filter: Arc<dyn FilterMetadata>, scope: FilterScope) -> Self {
        let order = filter.order();
        Self {
            filter,
            scope,
            order,
        }
    }

    pub fn filter(&self) -> &Arc<dyn FilterMetadata> {
        &self.filter
    }

    pub fn scope(&self) -> FilterScope {
        self.scope
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    /// 按 `(order, scope)` 稳定排序。
    pub fn sort(filters: &mut [FilterDescriptor]) {
        filters.sort_by_key(|descriptor| (descriptor.order, descriptor.scope));
    }
}
