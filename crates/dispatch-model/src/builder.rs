//! 应用模型与 Action 目录构建器。

use std::fmt;
use std::sync::Arc;

use dispatch_core::{
    ActionCatalog, ActionDescriptor, ConstraintItem, ConsumesConstraint, DispatchError,
    DispatchOptions, FilterMetadata, Result, RouteKey,
};

use crate::attribute::Attribute;
use crate::conventions::{ApplicationModelConvention, apply_conventions};
use crate::discovery::{ActionDiscoveryConventions, ActionInfo, DefaultActionDiscoveryConventions};
use crate::flatten::flatten_descriptors;
use crate::model::{
    ActionModel, ApplicationModel, AttributeRouteModel, ControllerModel, ParameterModel,
};
use crate::source::{ControllerSource, MethodSource};

/// 把候选源转换为 [`ApplicationModel`]。
///
/// # 教案级说明
/// - **契约 (What)**：只描述不执行；非法特性组合（空路由值、同一作用域重复路由键、
///   空的或重复的 `ActionName`）以 [`DispatchError::CatalogBuild`] 报告；
/// - **执行逻辑 (How)**：发现约定筛出控制器 → 按能力分拣特性 → 逐方法展开 Action；
///   每个被接纳的控制器输出一条 `debug` 日志。
#[derive(Clone)]
pub struct ApplicationModelBuilder {
    options: DispatchOptions,
    discovery: Arc<dyn ActionDiscoveryConventions>,
    global_filters: Vec<Arc<dyn FilterMetadata>>,
    global_constraints: Vec<ConstraintItem>,
}

impl ApplicationModelBuilder {
    pub fn new(options: DispatchOptions) -> Self {
        let discovery = Arc::new(DefaultActionDiscoveryConventions::new(
            options.discovery.clone(),
        ));
        Self {
            options,
            discovery,
            global_filters: Vec::new(),
            global_constraints: Vec::new(),
        }
    }

    /// 替换发现约定。
    pub fn with_discovery(mut self, discovery: Arc<dyn ActionDiscoveryConventions>) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn global_filter(mut self, filter: Arc<dyn FilterMetadata>) -> Self {
        self.global_filters.push(filter);
        self
    }

    pub fn global_constraint(mut self, constraint: ConstraintItem) -> Self {
        self.global_constraints.push(constraint);
        self
    }

    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    /// 构建未应用约定的原始模型。
    pub fn build_model(&self, sources: &[ControllerSource]) -> Result<ApplicationModel> {
        let mut model = ApplicationModel {
            filters: self.global_filters.clone(),
            constraints: self.global_constraints.clone(),
            ..ApplicationModel::default()
        };

        for source in sources {
            if !self.discovery.is_controller(source) {
                tracing::trace!(
                    target: "dispatch::model",
                    controller = %source.type_id,
                    "candidate type is not a controller"
                );
                continue;
            }
            let controller = self.build_controller(source)?;
            tracing::debug!(
                target: "dispatch::model",
                controller = %controller.type_id,
                name = %controller.controller_name,
                actions = controller.actions.len(),
                "controller discovered"
            );
            model.controllers.push(controller);
        }

        Ok(model)
    }

    fn controller_name<'a>(&self, source: &'a ControllerSource) -> &'a str {
        let name = source.type_id.name();
        match name.strip_suffix(self.options.discovery.controller_suffix.as_str()) {
            Some(stripped) if !stripped.is_empty() => stripped,
            _ => name,
        }
    }

    fn build_controller(&self, source: &ControllerSource) -> Result<ControllerModel> {
        let fail = |detail: String| DispatchError::CatalogBuild {
            controller: source.type_id.to_string(),
            detail,
        };

        let mut controller =
            ControllerModel::new(source.type_id.clone(), self.controller_name(source));
        controller.attributes = source.attributes.clone();
        controller
            .route_values
            .insert("controller", controller.controller_name.clone());

        let mut declared_keys: Vec<RouteKey> = Vec::new();
        for attribute in &source.attributes {
            self.collect_route_value(attribute, &mut declared_keys, &mut controller.route_values)
                .map_err(&fail)?;
            if let Some(provider) = attribute.route_template() {
                controller
                    .attribute_routes
                    .push(AttributeRouteModel::from(provider));
            }
            self.collect_capabilities(
                attribute,
                &mut controller.constraints,
                &mut controller.filters,
                &mut controller.api_explorer,
                &mut controller.properties,
            );
        }

        for method in &source.methods {
            let Some(infos) = self.discovery.get_actions(method, source) else {
                continue;
            };
            validate_action_name(method).map_err(&fail)?;
            for info in infos {
                let action = self.build_action(method, info).map_err(&fail)?;
                controller.actions.push(action);
            }
        }

        Ok(controller)
    }

    fn build_action(
        &self,
        method: &MethodSource,
        info: ActionInfo,
    ) -> core::result::Result<ActionModel, String> {
        let mut action = ActionModel::new(method.name.clone(), info.action_name);
        action.http_methods = info.http_methods;
        action.attribute_route = info.attribute_route.as_ref().map(AttributeRouteModel::from);
        action.is_action_name_match_required = info.require_action_name_match;
        action.attributes = method.attributes.clone();

        let mut declared_keys: Vec<RouteKey> = Vec::new();
        for attribute in &method.attributes {
            self.collect_route_value(attribute, &mut declared_keys, &mut action.route_values)
                .map_err(|detail| format!("method `{}`: {detail}", method.name))?;
            self.collect_capabilities(
                attribute,
                &mut action.constraints,
                &mut action.filters,
                &mut action.api_explorer,
                &mut action.properties,
            );
        }

        action.parameters = method
            .parameters
            .iter()
            .map(|parameter| ParameterModel {
                name: parameter.name.clone(),
                is_optional: parameter.has_default,
                attributes: parameter.attributes.clone(),
            })
            .collect();

        Ok(action)
    }

    fn collect_route_value(
        &self,
        attribute: &Attribute,
        declared_keys: &mut Vec<RouteKey>,
        route_values: &mut dispatch_core::RouteValueDictionary,
    ) -> core::result::Result<(), String> {
        let Some((key, value)) = attribute.route_value_pair() else {
            return Ok(());
        };
        if value.is_empty() {
            return Err(format!(
                "attribute `{}` declares an empty value for route key `{}`",
                attribute.name(),
                key.as_str()
            ));
        }
        if declared_keys.contains(key) {
            return Err(format!(
                "route key `{}` is declared more than once",
                key.as_str()
            ));
        }
        declared_keys.push(key.clone());
        route_values.insert(key.clone(), value.to_owned());
        Ok(())
    }

    fn collect_capabilities(
        &self,
        attribute: &Attribute,
        constraints: &mut Vec<ConstraintItem>,
        filters: &mut Vec<Arc<dyn FilterMetadata>>,
        api_explorer: &mut dispatch_core::ApiExplorerInfo,
        properties: &mut std::collections::BTreeMap<String, dispatch_core::PropertyValue>,
    ) {
        if let Some(constraint) = attribute.constraint() {
            constraints.push(constraint.clone());
        }
        if !attribute.consumed_content_types().is_empty() {
            constraints.push(ConstraintItem::constraint(
                ConsumesConstraint::new(attribute.consumed_content_types())
                    .with_order(self.options.constraints.consumes_order),
            ));
        }
        if let Some(filter) = attribute.filter() {
            filters.push(Arc::clone(filter));
        }
        if let Some(ignore_api) = attribute.ignore_api() {
            api_explorer.is_visible = Some(!ignore_api);
        }
        if let Some(group_name) = attribute.api_group_name() {
            api_explorer.group_name = Some(group_name.to_owned());
        }
        if let Some((key, value)) = attribute.property() {
            properties.insert(key.to_owned(), value.clone());
        }
    }
}

impl Default for ApplicationModelBuilder {
    fn default() -> Self {
        Self::new(DispatchOptions::default())
    }
}

impl fmt::Debug for ApplicationModelBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationModelBuilder")
            .field("options", &self.options)
            .field("discovery", &self.discovery)
            .field("global_filters", &self.global_filters.len())
            .field("global_constraints", &self.global_constraints.len())
            .finish()
    }
}

fn validate_action_name(method: &MethodSource) -> core::result::Result<(), String> {
    let mut overrides = method
        .attributes
        .iter()
        .filter_map(Attribute::action_name_override);
    let first = overrides.next();
    if overrides.next().is_some() {
        return Err(format!(
            "method `{}` declares more than one action name",
            method.name
        ));
    }
    if first.is_some_and(|name| name.trim().is_empty()) {
        return Err(format!("method `{}` declares an empty action name", method.name));
    }
    Ok(())
}

/// Action 目录构建器：候选源 → 模型 → 约定 → 描述符 → 版本化目录。
#[derive(Clone, Default)]
pub struct ActionCatalogBuilder {
    model_builder: ApplicationModelBuilder,
    conventions: Vec<ApplicationModelConvention>,
    sources: Vec<ControllerSource>,
}

impl ActionCatalogBuilder {
    pub fn new(options: DispatchOptions) -> Self {
        Self {
            model_builder: ApplicationModelBuilder::new(options),
            conventions: Vec::new(),
            sources: Vec::new(),
        }
    }

    pub fn with_model_builder(mut self, model_builder: ApplicationModelBuilder) -> Self {
        self.model_builder = model_builder;
        self
    }

    pub fn with_discovery(mut self, discovery: Arc<dyn ActionDiscoveryConventions>) -> Self {
        self.model_builder = self.model_builder.with_discovery(discovery);
        self
    }

    pub fn global_filter(mut self, filter: Arc<dyn FilterMetadata>) -> Self {
        self.model_builder = self.model_builder.global_filter(filter);
        self
    }

    pub fn global_constraint(mut self, constraint: ConstraintItem) -> Self {
        self.model_builder = self.model_builder.global_constraint(constraint);
        self
    }

    /// 注册全局模型约定，按注册顺序执行。
    pub fn convention(mut self, convention: ApplicationModelConvention) -> Self {
        self.conventions.push(convention);
        self
    }

    pub fn source(mut self, source: ControllerSource) -> Self {
        self.sources.push(source);
        self
    }

    pub fn sources<I>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = ControllerSource>,
    {
        self.sources.extend(sources);
        self
    }

    /// 以新的候选源集合替换现有集合，用于重新加载。
    pub fn replace_sources<I>(&mut self, sources: I)
    where
        I: IntoIterator<Item = ControllerSource>,
    {
        self.sources = sources.into_iter().collect();
    }

    /// 构建并应用约定后的模型。
    pub fn build_model(&self) -> Result<ApplicationModel> {
        let mut model = self.model_builder.build_model(&self.sources)?;
        apply_conventions(&mut model, &self.conventions);
        Ok(model)
    }

    /// 折叠后的描述符序列。
    pub fn get_descriptors(&self) -> Result<Vec<ActionDescriptor>> {
        let model = self.build_model()?;
        Ok(flatten_descriptors(
            &model,
            &self.model_builder.options().constraints,
        ))
    }

    /// 构建带新版本号的目录；版本号严格大于此前任何目录。
    pub fn build_catalog(&self) -> Result<ActionCatalog> {
        let descriptors = self.get_descriptors()?;
        let catalog = ActionCatalog::with_next_version(descriptors);
        tracing::info!(
            target: "dispatch::model",
            version = catalog.version(),
            actions = catalog.len(),
            "action catalog built"
        );
        Ok(catalog)
    }
}

impl fmt::Debug for ActionCatalogBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionCatalogBuilder")
            .field("model_builder", &self.model_builder)
            .field("conventions", &self.conventions.len())
            .field("sources", &self.sources.len())
            .finish()
    }
}
