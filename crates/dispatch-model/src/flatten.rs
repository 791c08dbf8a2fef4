//! 把应用模型折叠为描述符序列。

use std::sync::Arc;

use dispatch_core::{
    ATTRIBUTE_ROUTE_GROUP_KEY, ActionDescriptor, ConstraintItem, ConstraintOptions,
    FilterDescriptor, FilterScope, HttpMethodConstraint,
};

use crate::model::{ActionModel, ApplicationModel, AttributeRouteModel, ControllerModel};

/// 组合控制器级与 Action 级路由模板。
///
/// - Action 模板以 `/` 或 `~/` 开头时覆盖控制器模板；
/// - 任一侧为空时取另一侧；两侧都为空返回 `None`。
pub fn combine_templates(prefix: Option<&str>, template: Option<&str>) -> Option<String> {
    let template = template.map(str::trim).filter(|value| !value.is_empty());
    if let Some(template) = template {
        if let Some(rooted) = template
            .strip_prefix("~/")
            .or_else(|| template.strip_prefix('/'))
        {
            return Some(rooted.to_owned());
        }
    }

    let prefix = prefix
        .map(|value| value.trim().trim_matches('/'))
        .filter(|value| !value.is_empty());

    match (prefix, template) {
        (Some(prefix), Some(template)) => Some(format!("{prefix}/{template}")),
        (Some(prefix), None) => Some(prefix.to_owned()),
        (None, Some(template)) => Some(template.to_owned()),
        (None, None) => None,
    }
}

/// 折叠整个模型。
///
/// # 教案级说明
/// - 每个 Action 对每个“控制器模板 × Action 模板”组合产出一个描述符；
///   两侧都没有模板时产出一个约定路由描述符；
/// - 路由值：控制器值在前，Action 值按键覆盖；特性路由额外写入
///   [`ATTRIBUTE_ROUTE_GROUP_KEY`]，值为组合后的模板；
/// - 约束：全局 → 控制器 → Action，Action 声明了 HTTP 方法时追加
///   [`HttpMethodConstraint`]；
/// - 过滤器按 `(order, scope)` 稳定排序；API 可见性与属性包逐级覆盖。
pub fn flatten_descriptors(
    model: &ApplicationModel,
    options: &ConstraintOptions,
) -> Vec<ActionDescriptor> {
    let mut descriptors = Vec::with_capacity(model.action_count());
    for controller in &model.controllers {
        for action in &controller.actions {
            for route in attribute_routes(controller, action) {
                descriptors.push(flatten_action(model, controller, action, route, options));
            }
        }
    }
    descriptors
}

fn attribute_routes(controller: &ControllerModel, action: &ActionModel) -> Vec<Option<AttributeRouteModel>> {
    let action_template = action.attribute_route.as_ref();
    if controller.attribute_routes.is_empty() {
        let normalized = action_template.and_then(|route| {
            combine_templates(None, Some(route.template.as_str())).map(|template| {
                AttributeRouteModel {
                    template,
                    ..route.clone()
                }
            })
        });
        return vec![normalized];
    }

    controller
        .attribute_routes
        .iter()
        .map(|controller_route| {
            let template = combine_templates(
                Some(controller_route.template.as_str()),
                action_template.map(|route| route.template.as_str()),
            );
            template.map(|template| AttributeRouteModel {
                template,
                order: action_template
                    .and_then(|route| route.order)
                    .or(controller_route.order),
                name: action_template
                    .and_then(|route| route.name.clone())
                    .or_else(|| controller_route.name.clone()),
            })
        })
        .collect()
}

fn flatten_action(
    model: &ApplicationModel,
    controller: &ControllerModel,
    action: &ActionModel,
    route: Option<AttributeRouteModel>,
    options: &ConstraintOptions,
) -> ActionDescriptor {
    let mut route_values = controller.route_values.clone();
    if action.is_action_name_match_required {
        route_values.insert("action", action.action_name.clone());
    }
    route_values.extend_from(&action.route_values);

    let mut builder = ActionDescriptor::builder(
        format!("{}.{}", controller.type_id, action.method_name),
        controller.type_id.clone(),
    )
    .method_name(action.method_name.clone())
    .http_methods(action.http_methods.iter().cloned())
    .route_values(route_values)
    .constraints(
        model
            .constraints
            .iter()
            .chain(&controller.constraints)
            .chain(&action.constraints)
            .cloned(),
    );

    if !action.http_methods.is_empty() {
        builder = builder.constraint(ConstraintItem::constraint(
            HttpMethodConstraint::new(action.http_methods.iter().cloned())
                .with_order(options.http_method_order),
        ));
    }

    if let Some(route) = &route {
        builder = builder
            .route_value(ATTRIBUTE_ROUTE_GROUP_KEY, route.template.clone())
            .attribute_route(route.to_info());
    }

    let mut filters: Vec<FilterDescriptor> = model
        .filters
        .iter()
        .map(|filter| FilterDescriptor::new(Arc::clone(filter), FilterScope::Global))
        .chain(
            controller
                .filters
                .iter()
                .map(|filter| FilterDescriptor::new(Arc::clone(filter), FilterScope::Controller)),
        )
        .chain(
            action
                .filters
                .iter()
                .map(|filter| FilterDescriptor::new(Arc::clone(filter), FilterScope::Action)),
        )
        .collect();
    FilterDescriptor::sort(&mut filters);
    builder = builder.filters(filters);

    for parameter in &action.parameters {
        builder = builder.parameter(parameter.name.clone(), parameter.is_optional);
    }

    builder = builder.api_explorer(
        model
            .api_explorer
            .overlay(&controller.api_explorer)
            .overlay(&action.api_explorer),
    );

    for (key, value) in model
        .properties
        .iter()
        .chain(&controller.properties)
        .chain(&action.properties)
    {
        builder = builder.property(key.clone(), value.clone());
    }

    builder.build()
}
