//! dispatch-model：从候选源构建版本化 Action 目录。
//!
//! # 教案级说明（Why）
//! - 运行时反射被替换为启动期的一次描述性遍历：调用方以 [`ControllerSource`] 列表交付
//!   “类型名 + 方法列表 + 特性标签”，本 crate 产出纯数据的 [`dispatch_core::ActionDescriptor`]；
//! - 构建过程只描述不执行，控制器能否实例化等问题留给激活阶段。
//!
//! # 流程（How）
//! 1. [`ActionDiscoveryConventions`] 判定控制器并把方法展开为 [`ActionInfo`]；
//! 2. [`ApplicationModelBuilder`] 生成 [`ApplicationModel`]（控制器 → Action → 参数）；
//! 3. [`apply_conventions`] 先应用全局约定，再按作用域应用特性约定；
//! 4. [`flatten_descriptors`] 把模型折叠为描述符序列；
//! 5. [`ActionCatalogBuilder::build_catalog`] 为序列分配新版本号。

pub mod attribute;
pub mod builder;
pub mod conventions;
pub mod discovery;
pub mod flatten;
pub mod model;
pub mod source;

pub use attribute::{
    ActionConvention, Attribute, ControllerConvention, ParameterConvention, RouteTemplateProvider,
};
pub use builder::{ActionCatalogBuilder, ApplicationModelBuilder};
pub use conventions::{ApplicationModelConvention, apply_conventions};
pub use discovery::{ActionDiscoveryConventions, ActionInfo, DefaultActionDiscoveryConventions};
pub use flatten::{combine_templates, flatten_descriptors};
pub use model::{ActionModel, ApplicationModel, AttributeRouteModel, ControllerModel, ParameterModel};
pub use source::{ControllerSource, MethodSource, ParameterSource};
