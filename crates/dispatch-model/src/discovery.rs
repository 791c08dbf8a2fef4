//! 控制器与 Action 的发现约定。

use std::fmt;

use dispatch_core::DiscoveryOptions;

use crate::attribute::{Attribute, RouteTemplateProvider};
use crate::source::{ControllerSource, MethodSource};

/// 一个方法展开出的单个 Action。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionInfo {
    pub action_name: String,
    pub http_methods: Vec<String>,
    pub attribute_route: Option<RouteTemplateProvider>,
    pub require_action_name_match: bool,
}

/// 可替换的发现约定。
///
/// # 教案级说明
/// - `is_controller` 判定候选类型是否参与构建；
/// - `get_actions` 返回 `None` 或空序列表示“不是 Action”；
///   一个方法可以展开为多个 [`ActionInfo`]，例如声明了多个路由模板。
pub trait ActionDiscoveryConventions: fmt::Debug + Send + Sync {
    fn is_controller(&self, controller: &ControllerSource) -> bool;

    fn get_actions(
        &self,
        method: &MethodSource,
        controller: &ControllerSource,
    ) -> Option<Vec<ActionInfo>>;
}

/// 由 [`DiscoveryOptions`] 驱动的默认发现约定。
#[derive(Clone, Debug, Default)]
pub struct DefaultActionDiscoveryConventions {
    options: DiscoveryOptions,
}

impl DefaultActionDiscoveryConventions {
    pub fn new(options: DiscoveryOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DiscoveryOptions {
        &self.options
    }

    fn is_action_method(method: &MethodSource) -> bool {
        method.is_public
            && !method.is_static
            && !method.is_special_name
            && !method.declared_on_object
            && !method.attributes.iter().any(Attribute::is_non_action)
    }
}

impl ActionDiscoveryConventions for DefaultActionDiscoveryConventions {
    fn is_controller(&self, controller: &ControllerSource) -> bool {
        if !controller.is_public || controller.is_abstract || controller.is_generic {
            return false;
        }
        if controller.attributes.iter().any(Attribute::is_non_controller) {
            return false;
        }
        controller
            .type_id
            .name()
            .ends_with(self.options.controller_suffix.as_str())
            || controller
                .attributes
                .iter()
                .any(Attribute::is_controller_marker)
            || self.options.allow_suffixless_controllers
    }

    fn get_actions(
        &self,
        method: &MethodSource,
        _controller: &ControllerSource,
    ) -> Option<Vec<ActionInfo>> {
        if !Self::is_action_method(method) {
            return None;
        }

        let action_name = method
            .attributes
            .iter()
            .find_map(Attribute::action_name_override)
            .unwrap_or(method.name.as_str())
            .to_owned();

        let mut verbs: Vec<String> = Vec::new();
        for verb in method
            .attributes
            .iter()
            .flat_map(|attribute| attribute.declared_http_methods())
        {
            if !verbs.iter().any(|known| known.eq_ignore_ascii_case(verb)) {
                verbs.push(verb.clone());
            }
        }

        let routed: Vec<ActionInfo> = method
            .attributes
            .iter()
            .filter_map(Attribute::route_template)
            .map(|provider| ActionInfo {
                action_name: action_name.clone(),
                http_methods: if provider.http_methods.is_empty() {
                    verbs.clone()
                } else {
                    provider.http_methods.clone()
                },
                attribute_route: Some(provider.clone()),
                require_action_name_match: true,
            })
            .collect();

        if !routed.is_empty() {
            return Some(routed);
        }

        Some(vec![ActionInfo {
            action_name,
            http_methods: verbs,
            attribute_route: None,
            require_action_name_match: true,
        }])
    }
}
