use std::any::Any;
use std::fmt;
use std::sync::Arc;

use dispatch_core::{
    ActionCatalog, ActionCatalogProvider, ActionDescriptor, ConstraintItem, DefaultCatalogProvider,
    DispatchOptions, FilterMetadata, RequestContext, Result, ServiceCollection,
};
use dispatch_model::{
    ActionCatalogBuilder, ActionDiscoveryConventions, ApplicationModelConvention,
    ControllerSource,
};
use dispatch_selector::{ActionSelector, BestActionPolicy, SelectionOutcome};

/// 分发宿主的装配入口。
///
/// # 教案级注释
/// - **设计目标 (Why)**：把“选项 → 候选源 → 目录 → 提供方 → 选择器”的装配收拢到一处，
///   应用层只需声明式地补充组件；
/// - **关键流程 (How)**：
///   1. 收集选项（代码或 TOML 文本）、候选源、全局过滤器/约束/约定与服务；
///   2. [`Self::build`] 校验选项并构建首个目录；
///   3. 产出持有提供方与选择器的 [`DispatchHost`]。
/// - **契约 (What)**：任何一步失败都以 [`dispatch_core::DispatchError`] 原样返回。
pub struct HostBuilder {
    options: DispatchOptions,
    sources: Vec<ControllerSource>,
    filters: Vec<Arc<dyn FilterMetadata>>,
    constraints: Vec<ConstraintItem>,
    conventions: Vec<ApplicationModelConvention>,
    services: ServiceCollection,
    discovery: Option<Arc<dyn ActionDiscoveryConventions>>,
    policy: Option<Arc<dyn BestActionPolicy>>,
}

impl HostBuilder {
    pub fn new() -> Self {
        Self {
            options: DispatchOptions::default(),
            sources: Vec::new(),
            filters: Vec::new(),
            constraints: Vec::new(),
            conventions: Vec::new(),
            services: ServiceCollection::new(),
            discovery: None,
            policy: None,
        }
    }

    pub fn options(mut self, options: DispatchOptions) -> Self {
        self.options = options;
        self
    }

    /// 从 TOML 文本加载选项。
    pub fn options_toml(mut self, raw: &str) -> Result<Self> {
        self.options = DispatchOptions::from_toml_str(raw)?;
        Ok(self)
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

    pub fn global_filter(mut self, filter: Arc<dyn FilterMetadata>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn global_constraint(mut self, constraint: ConstraintItem) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn convention(mut self, convention: ApplicationModelConvention) -> Self {
        self.conventions.push(convention);
        self
    }

    /// 注册供约束工厂解析的服务。
    pub fn service<T>(mut self, service: T) -> Self
    where
        T: Any + Send + Sync,
    {
        self.services.insert(service);
        self
    }

    pub fn discovery(mut self, discovery: Arc<dyn ActionDiscoveryConventions>) -> Self {
        self.discovery = Some(discovery);
        self
    }

    pub fn policy(mut self, policy: Arc<dyn BestActionPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn build(self) -> Result<DispatchHost> {
        self.options.validate()?;

        let mut catalog_builder = ActionCatalogBuilder::new(self.options.clone());
        if let Some(discovery) = self.discovery {
            catalog_builder = catalog_builder.with_discovery(discovery);
        }
        catalog_builder = self
            .filters
            .into_iter()
            .fold(catalog_builder, ActionCatalogBuilder::global_filter);
        catalog_builder = self
            .constraints
            .into_iter()
            .fold(catalog_builder, ActionCatalogBuilder::global_constraint);
        catalog_builder = self
            .conventions
            .into_iter()
            .fold(catalog_builder, ActionCatalogBuilder::convention);

        let catalog = catalog_builder.clone().sources(self.sources).build_catalog()?;
        let provider = Arc::new(DefaultCatalogProvider::with_catalog(catalog));

        let mut selector = ActionSelector::new(provider.clone())
            .with_services(Arc::new(self.services))
            .with_options(self.options.selector.clone());
        if let Some(policy) = self.policy {
            selector = selector.with_policy(policy);
        }

        tracing::info!(
            target: "dispatch::hosting",
            version = provider.version(),
            actions = provider.action_descriptors().len(),
            "dispatch host built"
        );

        Ok(DispatchHost {
            catalog_builder,
            provider,
            selector,
        })
    }
}

impl Default for HostBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HostBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostBuilder")
            .field("options", &self.options)
            .field("sources", &self.sources.len())
            .field("filters", &self.filters.len())
            .field("constraints", &self.constraints.len())
            .field("conventions", &self.conventions.len())
            .field("services", &self.services.len())
            .finish_non_exhaustive()
    }
}

/// 运行期的分发宿主：持有目录提供方与选择器。
pub struct DispatchHost {
    /// 不含候选源的构建器模板，重新加载时补入新的候选源。
    catalog_builder: ActionCatalogBuilder,
    provider: Arc<DefaultCatalogProvider>,
    selector: ActionSelector,
}

impl DispatchHost {
    pub fn builder() -> HostBuilder {
        HostBuilder::new()
    }

    pub fn select(&self, request: &RequestContext) -> Result<Option<Arc<ActionDescriptor>>> {
        self.selector.select(request)
    }

    pub fn evaluate(&self, request: &RequestContext) -> Result<SelectionOutcome> {
        self.selector.evaluate(request)
    }

    pub fn candidates(&self, request: &RequestContext) -> Vec<Arc<ActionDescriptor>> {
        self.selector.candidates(request)
    }

    /// 当前目录快照。
    pub fn catalog(&self) -> Arc<ActionCatalog> {
        self.provider.action_descriptors()
    }

    pub fn version(&self) -> u64 {
        self.provider.version()
    }

    pub fn selector(&self) -> &ActionSelector {
        &self.selector
    }

    /// 以新的候选源重建并发布目录，返回当前可见的目录版本。
    ///
    /// 并发重载时版本较小的目录会被丢弃，调用方拿到的是胜出者的版本。
    pub fn reload<I>(&self, sources: I) -> Result<u64>
    where
        I: IntoIterator<Item = ControllerSource>,
    {
        let mut builder = self.catalog_builder.clone();
        builder.replace_sources(sources);
        let catalog = builder.build_catalog()?;
        let version = catalog.version();

        if self.provider.publish(catalog) {
            tracing::info!(
                target: "dispatch::hosting",
                version,
                "action catalog reloaded"
            );
        } else {
            tracing::debug!(
                target: "dispatch::hosting",
                version,
                current = self.provider.version(),
                "reloaded catalog superseded by a newer one"
            );
        }
        Ok(self.provider.version())
    }
}

impl fmt::Debug for DispatchHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchHost")
            .field("version", &self.provider.version())
            .field("selector", &self.selector)
            .finish_non_exhaustive()
    }
}
