use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};

use crate::constraint::ConstraintItem;
use crate::filter::FilterDescriptor;
use crate::route_values::{RouteKey, RouteValue, RouteValueDictionary};

static NEXT_ACTION_ID: AtomicU64 = AtomicU64::new(1);

/// 特性路由分组键。经特性路由命中的请求在路由值中携带该键（值为路由模板），
/// 特性路由 Action 也以同一键声明必需值，从而与约定路由 Action 互不干扰。
pub const ATTRIBUTE_ROUTE_GROUP_KEY: &str = "!__route_group";

/// 进程内唯一的 Action 标识，用于日志关联与约束缓存键。
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ActionId(u64);

impl ActionId {
    /// 分配新的标识。
    pub fn next() -> Self {
        Self(NEXT_ACTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// 读取数值。
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "action#{}", self.0)
    }
}

/// 控制器类型身份：命名空间 + 类型名。
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ControllerTypeId {
    namespace: Option<Cow<'static, str>>,
    name: Cow<'static, str>,
}

impl ControllerTypeId {
    /// 创建不带命名空间的类型身份。
    pub fn new<S>(name: S) -> Self
    where
        S: Into<Cow<'static, str>>,
    {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    /// 补充命名空间。
    pub fn with_namespace<S>(mut self, namespace: S) -> Self
    where
        S: Into<Cow<'static, str>>,
    {
        self.namespace = Some(namespace.into());
        self
    }

    /// 类型名。
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    /// 命名空间。
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

impl fmt::Display for ControllerTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{namespace}.{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// 参数描述：形参名与是否可选（是否声明了默认值）。
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ParameterDescriptor {
    pub name: String,
    pub is_optional: bool,
}

/// 特性路由信息。
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AttributeRouteInfo {
    pub template: String,
    pub order: Option<i32>,
    pub name: Option<String>,
}

/// API 浏览器可见性与分组。`None` 表示未声明，由上层默认策略决定。
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ApiExplorerInfo {
    pub is_visible: Option<bool>,
    pub group_name: Option<String>,
}

impl ApiExplorerInfo {
    /// 以 `overrides` 中已声明的字段覆盖当前值。
    pub fn overlay(&self, overrides: &ApiExplorerInfo) -> ApiExplorerInfo {
        ApiExplorerInfo {
            is_visible: overrides.is_visible.or(self.is_visible),
            group_name: overrides
                .group_name
                .clone()
                .or_else(|| self.group_name.clone()),
        }
    }
}

/// 属性包中的值。
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Integer(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Boolean(value)
    }
}

/// 分发单元：一个 Action 的不可变描述。
///
/// # 教案级说明
/// - **契约 (What)**：
///   - `route_values` 中的键大小写不敏感且唯一，值为匹配所需的字符串；
///   - `constraints` 保持声明顺序，评估时按 `order` 分组，组内不重排；
///   - `http_methods` 为空表示接受任意方法；
///   - 目录发布后不再修改，所有字段只读，可在并发请求间共享。
/// - **构造 (How)**：通过 [`ActionDescriptor::builder`] 组装，`build` 时分配 [`ActionId`]。
#[derive(Clone)]
pub struct ActionDescriptor {
    id: ActionId,
    display_name: String,
    controller: ControllerTypeId,
    method_name: String,
    http_methods: Vec<String>,
    route_values: RouteValueDictionary,
    constraints: Vec<ConstraintItem>,
    filters: Vec<FilterDescriptor>,
    parameters: Vec<ParameterDescriptor>,
    attribute_route: Option<AttributeRouteInfo>,
    api_explorer: ApiExplorerInfo,
    properties: BTreeMap<String, PropertyValue>,
}

impl ActionDescriptor {
    /// 以显示名与所属控制器开始构建。
    pub fn builder<S>(display_name: S, controller: ControllerTypeId) -> ActionDescriptorBuilder
    where
        S: Into<String>,
    {
        ActionDescriptorBuilder::new(display_name.into(), controller)
    }

    pub fn id(&self) -> ActionId {
        self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn controller(&self) -> &ControllerTypeId {
        &self.controller
    }

    /// 声明该 Action 的方法名。
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn http_methods(&self) -> &[String] {
        &self.http_methods
    }

    pub fn route_values(&self) -> &RouteValueDictionary {
        &self.route_values
    }

    /// 读取单个路由值的匹配字符串。
    pub fn route_value(&self, key: &str) -> Option<Cow<'_, str>> {
        self.route_values.get_str(key)
    }

    pub fn constraints(&self) -> &[ConstraintItem] {
        &self.constraints
    }

    pub fn filters(&self) -> &[FilterDescriptor] {
        &self.filters
    }

    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    pub fn attribute_route(&self) -> Option<&AttributeRouteInfo> {
        self.attribute_route.as_ref()
    }

    pub fn api_explorer(&self) -> &ApiExplorerInfo {
        &self.api_explorer
    }

    pub fn properties(&self) -> &BTreeMap<String, PropertyValue> {
        &self.properties
    }
}

impl fmt::Debug for ActionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDescriptor")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("controller", &self.controller)
            .field("http_methods", &self.http_methods)
            .field("route_values", &self.route_values)
            .field("constraints", &self.constraints.len())
            .field("filters", &self.filters.len())
            .finish()
    }
}

impl Serialize for ActionDescriptor {
    /// 约束与过滤器是行为对象，序列化时分别输出约束的 `order` 列表与过滤器名称。
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let constraint_orders: Vec<Option<i32>> =
            self.constraints.iter().map(ConstraintItem::static_order).collect();
        let filter_names: Vec<&str> = self.filters.iter().map(|f| f.filter().name()).collect();

        let mut state = serializer.serialize_struct("ActionDescriptor", 12)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("display_name", &self.display_name)?;
        state.serialize_field("controller", &self.controller)?;
        state.serialize_field("method_name", &self.method_name)?;
        state.serialize_field("http_methods", &self.http_methods)?;
        state.serialize_field("route_values", &self.route_values)?;
        state.serialize_field("constraint_orders", &constraint_orders)?;
        state.serialize_field("filters", &filter_names)?;
        state.serialize_field("parameters", &self.parameters)?;
        state.serialize_field("attribute_route", &self.attribute_route)?;
        state.serialize_field("api_explorer", &self.api_explorer)?;
        state.serialize_field("properties", &self.properties)?;
        state.end()
    }
}

/// [`ActionDescriptor`] 的构建器。
#[derive(Debug)]
pub struct ActionDescriptorBuilder {
    display_name: String,
    controller: ControllerTypeId,
    method_name: String,
    http_methods: Vec<String>,
    route_values: RouteValueDictionary,
    constraints: Vec<ConstraintItem>,
    filters: Vec<FilterDescriptor>,
    parameters: Vec<ParameterDescriptor>,
    attribute_route: Option<AttributeRouteInfo>,
    api_explorer: ApiExplorerInfo,
    properties: BTreeMap<String, PropertyValue>,
}

impl ActionDescriptorBuilder {
    fn new(display_name: String, controller: ControllerTypeId) -> Self {
        Self {
            display_name,
            controller,
            method_name: String::new(),
            http_methods: Vec::new(),
            route_values: RouteValueDictionary::new(),
            constraints: Vec::new(),
            filters: Vec::new(),
            parameters: Vec::new(),
            attribute_route: None,
            api_explorer: ApiExplorerInfo::default(),
            properties: BTreeMap::new(),
        }
    }

    pub fn method_name<S: Into<String>>(mut self, method_name: S) -> Self {
        self.method_name = method_name.into();
        self
    }

    pub fn http_method<S: Into<String>>(mut self, method: S) -> Self {
        self.http_methods.push(method.into());
        self
    }

    pub fn http_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.http_methods.extend(methods.into_iter().map(Into::into));
        self
    }

    /// 写入必需路由值；空字符串按缺失处理，直接忽略。
    pub fn route_value<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<RouteKey>,
        V: Into<String>,
    {
        let value = value.into();
        if !value.is_empty() {
            self.route_values.insert(key, RouteValue::from(value));
        }
        self
    }

    pub fn route_values(mut self, values: RouteValueDictionary) -> Self {
        for (key, value) in values.iter() {
            if !value.is_absent() {
                self.route_values.insert(key.clone(), value.clone());
            }
        }
        self
    }

    pub fn constraint(mut self, item: ConstraintItem) -> Self {
        self.constraints.push(item);
        self
    }

    pub fn constraints<I>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = ConstraintItem>,
    {
        self.constraints.extend(items);
        self
    }

    pub fn filters<I>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = FilterDescriptor>,
    {
        self.filters.extend(filters);
        self
    }

    pub fn parameter<S: Into<String>>(mut self, name: S, is_optional: bool) -> Self {
        self.parameters.push(ParameterDescriptor {
            name: name.into(),
            is_optional,
        });
        self
    }

    pub fn attribute_route(mut self, route: AttributeRouteInfo) -> Self {
        self.attribute_route = Some(route);
        self
    }

    pub fn api_explorer(mut self, api_explorer: ApiExplorerInfo) -> Self {
        self.api_explorer = api_explorer;
        self
    }

    pub fn property<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<PropertyValue>,
    {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// 完成构建并分配 [`ActionId`]。
    pub fn build(self) -> ActionDescriptor {
        ActionDescriptor {
            id: ActionId::next(),
            display_name: self.display_name,
            controller: self.controller,
            method_name: self.method_name,
            http_methods: self.http_methods,
            route_values: self.route_values,
            constraints: self.constraints,
            filters: self.filters,
            parameters: self.parameters,
            attribute_route: self.attribute_route,
            api_explorer: self.api_explorer,
            properties: self.properties,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_drops_empty_route_values() {
        let descriptor = ActionDescriptor::builder("Home.Index", ControllerTypeId::new("HomeController"))
            .route_value("controller", "Home")
            .route_value("area", "")
            .build();

        assert_eq!(descriptor.route_value("CONTROLLER").as_deref(), Some("Home"));
        assert!(!descriptor.route_values().contains_key("area"));
    }

    #[test]
    fn ids_are_unique() {
        let controller = ControllerTypeId::new("HomeController");
        let first = ActionDescriptor::builder("a", controller.clone()).build();
        let second = ActionDescriptor::builder("b", controller).build();
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn api_explorer_overlay_prefers_declared_fields() {
        let controller = ApiExplorerInfo {
            is_visible: Some(true),
            group_name: Some("v1".into()),
        };
        let action = ApiExplorerInfo {
            is_visible: Some(false),
            group_name: None,
        };
        let merged = controller.overlay(&action);
        assert_eq!(merged.is_visible, Some(false));
        assert_eq!(merged.group_name.as_deref(), Some("v1"));
    }

    #[test]
    fn descriptor_serializes_as_plain_record() {
        let descriptor = ActionDescriptor::builder(
            "Shop.Products.List",
            ControllerTypeId::new("ProductsController").with_namespace("Shop"),
        )
        .method_name("List")
        .http_method("GET")
        .route_value("controller", "Products")
        .parameter("page", true)
        .property("owner", "catalog-team")
        .build();

        let json = serde_json::to_value(&descriptor).expect("描述符应可序列化");
        assert_eq!(json["display_name"], "Shop.Products.List");
        assert_eq!(json["route_values"]["entries"][0][1], "Products");
        assert_eq!(json["parameters"][0]["is_optional"], true);
        assert_eq!(json["properties"]["owner"], "catalog-team");
    }
}
