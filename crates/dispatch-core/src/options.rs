use serde::Deserialize;

use crate::constraint::{DEFAULT_CONSUMES_ORDER, DEFAULT_HTTP_METHOD_ORDER};
use crate::error::{DispatchError, Result};

/// 分发核心配置，可由 TOML 装载。
///
/// ```toml
/// [discovery]
/// controller_suffix = "Controller"
/// allow_suffixless_controllers = false
///
/// [constraints]
/// http_method_order = 100
/// consumes_order = 200
///
/// [selector]
/// log_constraint_mismatches = true
/// ```
///
/// 未出现的字段取默认值。
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchOptions {
    pub discovery: DiscoveryOptions,
    pub constraints: ConstraintOptions,
    pub selector: SelectorOptions,
}

/// 控制器发现相关配置。
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoveryOptions {
    /// 控制器类型名的约定后缀，推导控制器名时剥离。
    pub controller_suffix: String,
    /// 是否允许不带后缀、也未显式标记的公开类型成为控制器。
    pub allow_suffixless_controllers: bool,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            controller_suffix: "Controller".to_owned(),
            allow_suffixless_controllers: false,
        }
    }
}

/// 内建约束的优先级。
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ConstraintOptions {
    pub http_method_order: i32,
    pub consumes_order: i32,
}

impl Default for ConstraintOptions {
    fn default() -> Self {
        Self {
            http_method_order: DEFAULT_HTTP_METHOD_ORDER,
            consumes_order: DEFAULT_CONSUMES_ORDER,
        }
    }
}

/// 选择器配置。
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SelectorOptions {
    /// 是否为每次约束淘汰输出 trace 级日志。
    pub log_constraint_mismatches: bool,
}

impl Default for SelectorOptions {
    fn default() -> Self {
        Self {
            log_constraint_mismatches: true,
        }
    }
}

impl DispatchOptions {
    /// 解析并校验 TOML 文本。
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let options: DispatchOptions =
            toml::from_str(raw).map_err(|error| DispatchError::InvalidOptions {
                detail: error.to_string(),
            })?;
        options.validate()?;
        Ok(options)
    }

    /// 校验字段组合。
    ///
    /// - 后缀不能为空；
    /// - Content-Type 约束的 `order` 必须大于 HTTP 方法约束。
    pub fn validate(&self) -> Result<()> {
        if self.discovery.controller_suffix.trim().is_empty() {
            return Err(DispatchError::InvalidOptions {
                detail: "discovery.controller_suffix must not be empty".to_owned(),
            });
        }
        if self.constraints.consumes_order <= self.constraints.http_method_order {
            return Err(DispatchError::InvalidOptions {
                detail: format!(
                    "constraints.consumes_order ({}) must be greater than constraints.http_method_order ({})",
                    self.constraints.consumes_order, self.constraints.http_method_order
                ),
            });
        }
        Ok(())
    }
}
