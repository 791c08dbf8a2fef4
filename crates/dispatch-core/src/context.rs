use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::constraint::ActionConstraint;
use crate::descriptor::ActionDescriptor;
use crate::route_values::{RouteKey, RouteValue, RouteValueDictionary};

/// 单次请求中与选择相关的只读信息。
///
/// # 教案级说明
/// - **契约 (What)**：`method` 为 HTTP 方法，`content_type` 为原始 Content-Type 头，
///   `route_values` 为路由阶段解析出的值（键大小写不敏感）；
/// - **生命周期**：由请求管线按请求构造，选择结束即可丢弃。
#[derive(Clone, Debug)]
pub struct RequestContext {
    method: Cow<'static, str>,
    content_type: Option<String>,
    route_values: RouteValueDictionary,
}

impl RequestContext {
    pub fn new<S>(method: S) -> Self
    where
        S: Into<Cow<'static, str>>,
    {
        Self {
            method: method.into(),
            content_type: None,
            route_values: RouteValueDictionary::new(),
        }
    }

    pub fn with_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_route_value<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<RouteKey>,
        V: Into<RouteValue>,
    {
        self.route_values.insert(key, value);
        self
    }

    pub fn with_route_values(mut self, values: RouteValueDictionary) -> Self {
        self.route_values = values;
        self
    }

    pub fn method(&self) -> &str {
        self.method.as_ref()
    }

    /// 空白 Content-Type 视为未提供。
    pub fn content_type(&self) -> Option<&str> {
        self.content_type
            .as_deref()
            .filter(|value| !value.trim().is_empty())
    }

    pub fn route_values(&self) -> &RouteValueDictionary {
        &self.route_values
    }
}

/// 单次选择中的候选：描述符 + 为本次请求解析好的约束列表。
///
/// 每次选择调用新建，用完即弃，不进入任何缓存。
#[derive(Clone)]
pub struct ActionCandidate {
    action: Arc<ActionDescriptor>,
    constraints: Arc<[Arc<dyn ActionConstraint>]>,
}

impl ActionCandidate {
    pub fn new(action: Arc<ActionDescriptor>, constraints: Vec<Arc<dyn ActionConstraint>>) -> Self {
        Self::from_shared(action, constraints.into())
    }

    /// 复用约束缓存中已共享的列表，避免重复分配。
    pub fn from_shared(
        action: Arc<ActionDescriptor>,
        constraints: Arc<[Arc<dyn ActionConstraint>]>,
    ) -> Self {
        Self {
            action,
            constraints,
        }
    }

    pub fn action(&self) -> &Arc<ActionDescriptor> {
        &self.action
    }

    pub fn constraints(&self) -> &[Arc<dyn ActionConstraint>] {
        &self.constraints
    }

    /// 消费候选，取回描述符。
    pub fn into_action(self) -> Arc<ActionDescriptor> {
        self.action
    }
}

impl fmt::Debug for ActionCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionCandidate")
            .field("action", &self.action.display_name())
            .field("constraints", &self.constraints)
            .finish()
    }
}

/// 约束评估上下文：请求、本轮参与评估的候选全集与当前候选。
#[derive(Clone, Copy, Debug)]
pub struct ConstraintContext<'a> {
    request: &'a RequestContext,
    candidates: &'a [ActionCandidate],
    current: &'a ActionCandidate,
}

impl<'a> ConstraintContext<'a> {
    pub fn new(
        request: &'a RequestContext,
        candidates: &'a [ActionCandidate],
        current: &'a ActionCandidate,
    ) -> Self {
        Self {
            request,
            candidates,
            current,
        }
    }

    pub fn request(&self) -> &'a RequestContext {
        self.request
    }

    pub fn candidates(&self) -> &'a [ActionCandidate] {
        self.candidates
    }

    pub fn current(&self) -> &'a ActionCandidate {
        self.current
    }
}
