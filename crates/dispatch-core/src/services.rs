use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::ConstraintFactoryError;

/// 同步服务解析契约。
///
/// # 教案级说明
/// - **契约 (What)**：按 [`TypeId`] 返回共享实例；未注册返回 `None`；
/// - **使用范围**：仅用于物化约束工厂等启动期/首次命中的场景，不在选择热路径上反复调用；
/// - **线程安全**：实现必须满足 `Send + Sync`。
pub trait ServiceProvider: Send + Sync {
    fn get_service(&self, id: TypeId) -> Option<Arc<dyn Any + Send + Sync>>;
}

impl dyn ServiceProvider + '_ {
    /// 按类型解析服务。
    pub fn get<T>(&self) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.get_service(TypeId::of::<T>())
            .and_then(|service| service.downcast::<T>().ok())
    }

    /// 按类型解析服务，缺失时返回 [`ConstraintFactoryError::MissingService`]。
    pub fn require<T>(&self) -> Result<Arc<T>, ConstraintFactoryError>
    where
        T: Any + Send + Sync,
    {
        self.get::<T>()
            .ok_or(ConstraintFactoryError::MissingService {
                service: type_name::<T>(),
            })
    }
}

/// 基于哈希表的最小服务容器。
#[derive(Clone, Default)]
pub struct ServiceCollection {
    services: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl ServiceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册服务实例，同类型后写覆盖先写。
    pub fn insert<T>(&mut self, service: T) -> &mut Self
    where
        T: Any + Send + Sync,
    {
        self.insert_shared(Arc::new(service))
    }

    /// 注册已共享的服务实例。
    pub fn insert_shared<T>(&mut self, service: Arc<T>) -> &mut Self
    where
        T: Any + Send + Sync,
    {
        self.services.insert(TypeId::of::<T>(), service);
        self
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl ServiceProvider for ServiceCollection {
    fn get_service(&self, id: TypeId) -> Option<Arc<dyn Any + Send + Sync>> {
        self.services.get(&id).cloned()
    }
}

impl fmt::Debug for ServiceCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceCollection")
            .field("services", &self.services.len())
            .finish()
    }
}
