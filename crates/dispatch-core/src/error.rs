//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 集中定义分发核心对外暴露的错误语义；
//! - “未匹配”不是错误：选择器以 `Ok(None)` 表达，交由外层管线转成 404。
//!
//! ## 设计要求（What）
//! - 所有错误派生 `thiserror::Error`，并通过 [`DispatchError::code`] 暴露稳定错误码；
//! - 错误原样向调用方传播，核心内部不做重试：所有操作都是输入的纯函数，重试只会得到相同结果。

use thiserror::Error;

/// 分发核心统一的 `Result` 别名。
pub type Result<T, E = DispatchError> = core::result::Result<T, E>;

/// 约束工厂物化失败。
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConstraintFactoryError {
    /// 依赖的服务未注册。
    #[error("required service `{service}` is not registered")]
    MissingService { service: &'static str },

    /// 工厂自身报告的失败。
    #[error("constraint factory failed: {detail}")]
    Failed { detail: String },
}

/// 分发核心错误域。
///
/// # 教案式说明
/// - **契约 (What)**：
///   - `AmbiguousAction`：约束评估后仍有两个及以上 Action 并列，`names` 按候选顺序列出全部显示名；
///     这是面向开发者的配置错误，不会被静默消解；
///   - `ConstraintFactory`：约束工厂无法通过服务解析物化，属于启动期配置错误；
///   - `CatalogBuild`：从候选类型构建目录时发现非法组合；
///   - `InvalidOptions`：配置校验失败。
/// - **执行逻辑 (How)**：[`Self::code`] 为每类错误给出 `dispatch.*` 前缀的稳定错误码。
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum DispatchError {
    #[error(
        "multiple actions matched. The following actions matched route data and had all constraints satisfied:\n\n{}",
        .names.join("\n")
    )]
    AmbiguousAction { names: Vec<String> },

    #[error("failed to materialize constraint for action `{action}`")]
    ConstraintFactory {
        action: String,
        #[source]
        source: ConstraintFactoryError,
    },

    #[error("failed to build action catalog from `{controller}`: {detail}")]
    CatalogBuild { controller: String, detail: String },

    #[error("invalid dispatch options: {detail}")]
    InvalidOptions { detail: String },
}

impl DispatchError {
    /// 稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::AmbiguousAction { .. } => "dispatch.selector.ambiguous",
            DispatchError::ConstraintFactory { .. } => "dispatch.constraint.factory",
            DispatchError::CatalogBuild { .. } => "dispatch.catalog.build",
            DispatchError::InvalidOptions { .. } => "dispatch.options.invalid",
        }
    }

    /// 若为歧义错误，返回并列 Action 的显示名。
    pub fn ambiguous_names(&self) -> Option<&[String]> {
        match self {
            DispatchError::AmbiguousAction { names } => Some(names),
            _ => None,
        }
    }
}
