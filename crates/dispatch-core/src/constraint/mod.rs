//! Action 约束契约。
//!
//! # 教案级说明
//! - **契约 (What)**：每个约束携带整数 `order`，值越小越先评估；同一 `order` 视为一组，
//!   组内不重排。`accept` 返回 `false` 即淘汰当前候选。
//! - **工厂 (How)**：需要在运行时解析服务的约束以 [`ActionConstraintFactory`] 声明，
//!   由选择器的约束缓存按描述符物化一次（`is_reusable() == false` 时按请求物化）。

mod consumes;
mod http_method;

use std::fmt;
use std::sync::Arc;

pub use consumes::{ConsumesConstraint, DEFAULT_CONSUMES_ORDER, MediaType};
pub use http_method::{DEFAULT_HTTP_METHOD_ORDER, HttpMethodConstraint};

use crate::context::ConstraintContext;
use crate::error::ConstraintFactoryError;
use crate::services::ServiceProvider;

/// 约束类别，供需要识别“同类约束”的内建约束使用（例如 Content-Type 回退判断）。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ConstraintKind {
    HttpMethod,
    Consumes,
    Custom,
}

/// 单个 Action 约束。
pub trait ActionConstraint: fmt::Debug + Send + Sync + 'static {
    /// 评估优先级，越小越先。
    fn order(&self) -> i32;

    /// 判断当前候选是否接受本次请求。
    fn accept(&self, context: &ConstraintContext<'_>) -> bool;

    /// 约束类别，默认 [`ConstraintKind::Custom`]。
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Custom
    }
}

/// 需要借助服务解析才能物化的约束。
pub trait ActionConstraintFactory: fmt::Debug + Send + Sync + 'static {
    /// 物化出的实例能否在请求间复用。
    fn is_reusable(&self) -> bool {
        true
    }

    /// 基于服务容器创建约束实例。解析失败时立即返回错误，不做重试。
    fn create_instance(
        &self,
        services: &dyn ServiceProvider,
    ) -> Result<Arc<dyn ActionConstraint>, ConstraintFactoryError>;
}

/// 描述符上的约束元数据：现成实例或工厂。
#[derive(Clone)]
pub enum ConstraintItem {
    Constraint(Arc<dyn ActionConstraint>),
    Factory(Arc<dyn ActionConstraintFactory>),
}

impl ConstraintItem {
    /// 包装现成约束。
    pub fn constraint<C>(constraint: C) -> Self
    where
        C: ActionConstraint,
    {
        ConstraintItem::Constraint(Arc::new(constraint))
    }

    /// 包装约束工厂。
    pub fn factory<F>(factory: F) -> Self
    where
        F: ActionConstraintFactory,
    {
        ConstraintItem::Factory(Arc::new(factory))
    }

    /// 无需物化即可得知的 `order`；工厂返回 `None`。
    pub fn static_order(&self) -> Option<i32> {
        match self {
            ConstraintItem::Constraint(constraint) => Some(constraint.order()),
            ConstraintItem::Factory(_) => None,
        }
    }
}

impl fmt::Debug for ConstraintItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintItem::Constraint(constraint) => {
                f.debug_tuple("Constraint").field(constraint).finish()
            }
            ConstraintItem::Factory(factory) => f.debug_tuple("Factory").field(factory).finish(),
        }
    }
}
