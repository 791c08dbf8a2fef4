//! dispatch-core：请求分发核心的共享契约。
//!
//! # 教案级说明（Why）
//! - 将 Action 描述符、版本化目录、路由值与约束契约沉淀在同一 crate，供
//!   `dispatch-model`（目录构建）与 `dispatch-selector`（请求选择）共同依赖；
//! - 所有结构在发布后只读，可跨请求并发共享。
//!
//! # 模块结构（How）
//! - `route_values`：大小写不敏感的路由值字典与大小写折叠工具；
//! - `descriptor`：[`ActionDescriptor`] 及其附属数据；
//! - `catalog`：[`ActionCatalog`] 版本化快照与 [`DefaultCatalogProvider`]；
//! - `constraint`：约束/约束工厂契约与内建约束（HTTP 方法、Content-Type）；
//! - `context`：请求上下文与约束评估上下文；
//! - `services`：同步服务解析契约；
//! - `filter`：过滤器元数据与作用域；
//! - `error`：错误域；
//! - `options`：可由 TOML 装载的配置。

pub mod catalog;
pub mod constraint;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod filter;
pub mod options;
pub mod route_values;
pub mod services;

pub use catalog::{ActionCatalog, ActionCatalogProvider, DefaultCatalogProvider, next_catalog_version};
pub use constraint::{
    ActionConstraint, ActionConstraintFactory, ConstraintItem, ConstraintKind, ConsumesConstraint,
    HttpMethodConstraint,
};
pub use context::{ActionCandidate, ConstraintContext, RequestContext};
pub use descriptor::{
    ATTRIBUTE_ROUTE_GROUP_KEY, ActionDescriptor, ActionDescriptorBuilder, ActionId, ApiExplorerInfo, AttributeRouteInfo,
    ControllerTypeId, ParameterDescriptor, PropertyValue,
};
pub use error::{ConstraintFactoryError, DispatchError, Result};
pub use filter::{FilterDescriptor, FilterMetadata, FilterScope};
pub use options::{ConstraintOptions, DiscoveryOptions, DispatchOptions, SelectorOptions};
pub use route_values::{RouteKey, RouteValue, RouteValueDictionary};
pub use services::{ServiceCollection, ServiceProvider};
