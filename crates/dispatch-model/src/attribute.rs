use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use dispatch_core::{ConstraintItem, FilterMetadata, PropertyValue, RouteKey};

use crate::model::{ActionModel, ControllerModel, ParameterModel};

/// 控制器作用域的模型约定。
pub type ControllerConvention = Arc<dyn Fn(&mut ControllerModel) + Send + Sync>;
/// Action 作用域的模型约定。
pub type ActionConvention = Arc<dyn Fn(&mut ActionModel) + Send + Sync>;
/// 参数作用域的模型约定。
pub type ParameterConvention = Arc<dyn Fn(&mut ParameterModel) + Send + Sync>;

/// 路由模板声明，可附带自身的 HTTP 方法（如 `HttpGet("api/products")`）。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteTemplateProvider {
    pub template: String,
    pub order: Option<i32>,
    pub name: Option<String>,
    pub http_methods: Vec<String>,
}

impl RouteTemplateProvider {
    pub fn new<S: Into<String>>(template: S) -> Self {
        Self {
            template: template.into(),
            ..Self::default()
        }
    }
}

/// 候选源上的特性：一组可选能力的组合。
///
/// # 教案级说明
/// - **契约 (What)**：同一特性可同时具备多种能力，例如既是约束又是 Action 约定；
///   构建器按能力字段分拣，而不是按特性名称做类型判断；
/// - **构造 (How)**：常用特性提供具名构造函数（[`Self::http_get`]、[`Self::area`]、
///   [`Self::consumes`] 等），其余能力通过 `with_*` 链式补充。
#[derive(Clone, Default)]
pub struct Attribute {
    name: Cow<'static, str>,
    constraint: Option<ConstraintItem>,
    consumes: Vec<String>,
    filter: Option<Arc<dyn FilterMetadata>>,
    route_template: Option<RouteTemplateProvider>,
    route_value: Option<(RouteKey, String)>,
    action_name: Option<String>,
    http_methods: Vec<String>,
    non_action: bool,
    non_controller: bool,
    controller_marker: bool,
    ignore_api: Option<bool>,
    api_group_name: Option<String>,
    property: Option<(String, PropertyValue)>,
    controller_convention: Option<ControllerConvention>,
    action_convention: Option<ActionConvention>,
    parameter_convention: Option<ParameterConvention>,
}

impl Attribute {
    /// 创建不带任何能力的具名特性。
    pub fn named<S>(name: S) -> Self
    where
        S: Into<Cow<'static, str>>,
    {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// 仅声明 HTTP 方法的特性。
    pub fn http_methods<I, S>(name: &'static str, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            http_methods: methods.into_iter().map(Into::into).collect(),
            ..Self::named(name)
        }
    }

    pub fn http_get() -> Self {
        Self::http_methods("HttpGet", ["GET"])
    }

    pub fn http_post() -> Self {
        Self::http_methods("HttpPost", ["POST"])
    }

    pub fn http_put() -> Self {
        Self::http_methods("HttpPut", ["PUT"])
    }

    pub fn http_delete() -> Self {
        Self::http_methods("HttpDelete", ["DELETE"])
    }

    /// 路由模板特性（`Route("...")`）。
    pub fn route<S: Into<String>>(template: S) -> Self {
        Self::named("Route").with_route_template(RouteTemplateProvider::new(template))
    }

    /// 带模板的 GET 特性（`HttpGet("...")`）。
    pub fn http_get_route<S: Into<String>>(template: S) -> Self {
        let mut provider = RouteTemplateProvider::new(template);
        provider.http_methods.push("GET".to_owned());
        Self::named("HttpGet").with_route_template(provider)
    }

    /// 带模板的 POST 特性（`HttpPost("...")`）。
    pub fn http_post_route<S: Into<String>>(template: S) -> Self {
        let mut provider = RouteTemplateProvider::new(template);
        provider.http_methods.push("POST".to_owned());
        Self::named("HttpPost").with_route_template(provider)
    }

    /// 区域特性，等价于路由值 `area=<name>`。
    pub fn area<S: Into<String>>(area: S) -> Self {
        Self::named("Area").with_route_value("area", area)
    }

    /// 任意路由值特性。
    pub fn route_value<K, V>(key: K, value: V) -> Self
    where
        K: Into<RouteKey>,
        V: Into<String>,
    {
        Self::named("RouteValue").with_route_value(key, value)
    }

    /// 覆盖 Action 名称（`ActionName("...")`）。
    pub fn action_name<S: Into<String>>(name: S) -> Self {
        Self {
            action_name: Some(name.into()),
            ..Self::named("ActionName")
        }
    }

    /// 标记方法不是 Action。
    pub fn non_action() -> Self {
        Self {
            non_action: true,
            ..Self::named("NonAction")
        }
    }

    /// 标记类型不是控制器。
    pub fn non_controller() -> Self {
        Self {
            non_controller: true,
            ..Self::named("NonController")
        }
    }

    /// 显式标记类型为控制器（即使类型名不带约定后缀）。
    pub fn controller() -> Self {
        Self {
            controller_marker: true,
            ..Self::named("Controller")
        }
    }

    /// 声明可接受的请求 Content-Type，构建器据此生成 Content-Type 约束。
    pub fn consumes<I, S>(content_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            consumes: content_types.into_iter().map(Into::into).collect(),
            ..Self::named("Consumes")
        }
    }

    /// API 浏览器可见性（`ApiExplorerSettings(IgnoreApi = ...)`）。
    pub fn api_explorer_settings(ignore_api: bool, group_name: Option<&str>) -> Self {
        Self {
            ignore_api: Some(ignore_api),
            api_group_name: group_name.map(str::to_owned),
            ..Self::named("ApiExplorerSettings")
        }
    }

    pub fn with_constraint(mut self, constraint: ConstraintItem) -> Self {
        self.constraint = Some(constraint);
        self
    }

    pub fn with_filter(mut self, filter: Arc<dyn FilterMetadata>) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_route_template(mut self, provider: RouteTemplateProvider) -> Self {
        self.route_template = Some(provider);
        self
    }

    pub fn with_route_value<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<RouteKey>,
        V: Into<String>,
    {
        self.route_value = Some((key.into(), value.into()));
        self
    }

    pub fn with_property<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<PropertyValue>,
    {
        self.property = Some((key.into(), value.into()));
        self
    }

    pub fn with_controller_convention<F>(mut self, convention: F) -> Self
    where
        F: Fn(&mut ControllerModel) + Send + Sync + 'static,
    {
        self.controller_convention = Some(Arc::new(convention));
        self
    }

    pub fn with_action_convention<F>(mut self, convention: F) -> Self
    where
        F: Fn(&mut ActionModel) + Send + Sync + 'static,
    {
        self.action_convention = Some(Arc::new(convention));
        self
    }

    pub fn with_parameter_convention<F>(mut self, convention: F) -> Self
    where
        F: Fn(&mut ParameterModel) + Send + Sync + 'static,
    {
        self.parameter_convention = Some(Arc::new(convention));
        self
    }

    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    pub fn constraint(&self) -> Option<&ConstraintItem> {
        self.constraint.as_ref()
    }

    pub fn consumed_content_types(&self) -> &[String] {
        &self.consumes
    }

    pub fn filter(&self) -> Option<&Arc<dyn FilterMetadata>> {
        self.filter.as_ref()
    }

    pub fn route_template(&self) -> Option<&RouteTemplateProvider> {
        self.route_template.as_ref()
    }

    pub fn route_value_pair(&self) -> Option<(&RouteKey, &str)> {
        self.route_value
            .as_ref()
            .map(|(key, value)| (key, value.as_str()))
    }

    pub fn action_name_override(&self) -> Option<&str> {
        self.action_name.as_deref()
    }

    pub fn declared_http_methods(&self) -> &[String] {
        &self.http_methods
    }

    pub fn is_non_action(&self) -> bool {
        self.non_action
    }

    pub fn is_non_controller(&self) -> bool {
        self.non_controller
    }

    pub fn is_controller_marker(&self) -> bool {
        self.controller_marker
    }

    /// `Some(true)` 表示从 API 浏览器隐藏。
    pub fn ignore_api(&self) -> Option<bool> {
        self.ignore_api
    }

    pub fn api_group_name(&self) -> Option<&str> {
        self.api_group_name.as_deref()
    }

    pub fn property(&self) -> Option<(&str, &PropertyValue)> {
        self.property
            .as_ref()
            .map(|(key, value)| (key.as_str(), value))
    }

    pub fn controller_convention(&self) -> Option<&ControllerConvention> {
        self.controller_convention.as_ref()
    }

    pub fn action_convention(&self) -> Option<&ActionConvention> {
        self.action_convention.as_ref()
    }

    pub fn parameter_convention(&self) -> Option<&ParameterConvention> {
        self.parameter_convention.as_ref()
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Attribute");
        debug.field("name", &self.name);
        if let Some(constraint) = &self.constraint {
            debug.field("constraint", constraint);
        }
        if !self.consumes.is_empty() {
            debug.field("consumes", &self.consumes);
        }
        if let Some(template) = &self.route_template {
            debug.field("route_template", template);
        }
        if let Some(route_value) = &self.route_value {
            debug.field("route_value", route_value);
        }
        if !self.http_methods.is_empty() {
            debug.field("http_methods", &self.http_methods);
        }
        debug.finish_non_exhaustive()
    }
}
