//! 应用模型：控制器 → Action → 参数 三级可变结构。
//!
//! # 教案级说明
//! - 模型只在构建期存在，约定可以任意改写其字段；
//! - 折叠为描述符后模型即被丢弃，描述符发布后不再变化；
//! - 每一级都派生 `Clone`，克隆为深拷贝（`Arc` 包装的约束与过滤器按引用共享，它们本身不可变）。

use std::collections::BTreeMap;
use std::sync::Arc;

use dispatch_core::{
    ApiExplorerInfo, AttributeRouteInfo, ConstraintItem, ControllerTypeId, FilterMetadata,
    PropertyValue, RouteValueDictionary,
};

use crate::attribute::{Attribute, RouteTemplateProvider};

/// 整个应用的模型根。
#[derive(Clone, Debug, Default)]
pub struct ApplicationModel {
    pub controllers: Vec<ControllerModel>,
    /// 作用于每个 Action 的全局过滤器。
    pub filters: Vec<Arc<dyn FilterMetadata>>,
    /// 作用于每个 Action 的全局约束。
    pub constraints: Vec<ConstraintItem>,
    pub api_explorer: ApiExplorerInfo,
    pub properties: BTreeMap<String, PropertyValue>,
}

impl ApplicationModel {
    /// 所有控制器下 Action 的总数。
    pub fn action_count(&self) -> usize {
        self.controllers
            .iter()
            .map(|controller| controller.actions.len())
            .sum()
    }
}

/// 特性路由模板。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttributeRouteModel {
    pub template: String,
    pub order: Option<i32>,
    pub name: Option<String>,
}

impl AttributeRouteModel {
    pub fn new<S: Into<String>>(template: S) -> Self {
        Self {
            template: template.into(),
            ..Self::default()
        }
    }

    pub(crate) fn to_info(&self) -> AttributeRouteInfo {
        AttributeRouteInfo {
            template: self.template.clone(),
            order: self.order,
            name: self.name.clone(),
        }
    }
}

impl From<&RouteTemplateProvider> for AttributeRouteModel {
    fn from(provider: &RouteTemplateProvider) -> Self {
        Self {
            template: provider.template.clone(),
            order: provider.order,
            name: provider.name.clone(),
        }
    }
}

/// 控制器模型。
#[derive(Clone, Debug)]
pub struct ControllerModel {
    pub type_id: ControllerTypeId,
    /// 剥离约定后缀后的控制器名。
    pub controller_name: String,
    pub attributes: Vec<Attribute>,
    pub route_values: RouteValueDictionary,
    /// 控制器级路由模板，作为 Action 模板的前缀。
    pub attribute_routes: Vec<AttributeRouteModel>,
    pub constraints: Vec<ConstraintItem>,
    pub filters: Vec<Arc<dyn FilterMetadata>>,
    pub api_explorer: ApiExplorerInfo,
    pub properties: BTreeMap<String, PropertyValue>,
    pub actions: Vec<ActionModel>,
}

impl ControllerModel {
    pub fn new<S: Into<String>>(type_id: ControllerTypeId, controller_name: S) -> Self {
        Self {
            type_id,
            controller_name: controller_name.into(),
            attributes: Vec::new(),
            route_values: RouteValueDictionary::new(),
            attribute_routes: Vec::new(),
            constraints: Vec::new(),
            filters: Vec::new(),
            api_explorer: ApiExplorerInfo::default(),
            properties: BTreeMap::new(),
            actions: Vec::new(),
        }
    }
}

/// Action 模型。
#[derive(Clone, Debug)]
pub struct ActionModel {
    /// 源方法名，用于显示名。
    pub method_name: String,
    /// 对外的 Action 名（`ActionName` 覆盖或方法名）。
    pub action_name: String,
    pub http_methods: Vec<String>,
    pub attribute_route: Option<AttributeRouteModel>,
    /// 为 `true` 时路由值写入 `action=<action_name>`。
    pub is_action_name_match_required: bool,
    pub attributes: Vec<Attribute>,
    pub route_values: RouteValueDictionary,
    pub constraints: Vec<ConstraintItem>,
    pub filters: Vec<Arc<dyn FilterMetadata>>,
    pub api_explorer: ApiExplorerInfo,
    pub properties: BTreeMap<String, PropertyValue>,
    pub parameters: Vec<ParameterModel>,
}

impl ActionModel {
    pub fn new<M, A>(method_name: M, action_name: A) -> Self
    where
        M: Into<String>,
        A: Into<String>,
    {
        Self {
            method_name: method_name.into(),
            action_name: action_name.into(),
            http_methods: Vec::new(),
            attribute_route: None,
            is_action_name_match_required: true,
            attributes: Vec::new(),
            route_values: RouteValueDictionary::new(),
            constraints: Vec::new(),
            filters: Vec::new(),
            api_explorer: ApiExplorerInfo::default(),
            properties: BTreeMap::new(),
            parameters: Vec::new(),
        }
    }
}

/// 参数模型。
#[derive(Clone, Debug)]
pub struct ParameterModel {
    pub name: String,
    pub is_optional: bool,
    pub attributes: Vec<Attribute>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_is_independent() {
        let mut controller = ControllerModel::new(ControllerTypeId::new("HomeController"), "Home");
        let mut action = ActionModel::new("Index", "Index");
        action.http_methods.push("GET".into());
        controller.actions.push(action);

        let mut copy = controller.clone();
        copy.actions[0].http_methods.push("POST".into());
        copy.route_values.insert("area", "Admin");

        assert_eq!(controller.actions[0].http_methods, ["GET"]);
        assert!(controller.route_values.is_empty());
    }

    #[test]
    fn action_count_spans_controllers() {
        let mut model = ApplicationModel::default();
        for name in ["Home", "Products"] {
            let mut controller = ControllerModel::new(ControllerTypeId::new(name), name);
            controller.actions.push(ActionModel::new("Index", "Index"));
            model.controllers.push(controller);
        }
        assert_eq!(model.action_count(), 2);
    }
}
