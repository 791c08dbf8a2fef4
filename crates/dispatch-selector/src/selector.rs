//! Action 选择器。

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use dispatch_core::{
    ActionCandidate, ActionCatalogProvider, ActionDescriptor, DispatchError, RequestContext,
    Result, SelectorOptions, ServiceCollection, ServiceProvider,
};

use crate::constraint_cache::ConstraintCache;
use crate::evaluator::evaluate_constraints;
use crate::index::SelectionIndex;
use crate::policy::{BestActionPolicy, PassThroughPolicy};

/// 单次选择的三种结果。
#[derive(Clone, Debug)]
pub enum SelectionOutcome {
    Found(Arc<ActionDescriptor>),
    NotFound,
    /// 并列的候选，保持目录顺序。
    Ambiguous(Vec<Arc<ActionDescriptor>>),
}

impl SelectionOutcome {
    /// 转为 `select` 的返回形态：歧义变为 [`DispatchError::AmbiguousAction`]。
    pub fn into_result(self) -> Result<Option<Arc<ActionDescriptor>>> {
        match self {
            SelectionOutcome::Found(action) => Ok(Some(action)),
            SelectionOutcome::NotFound => Ok(None),
            SelectionOutcome::Ambiguous(actions) => Err(DispatchError::AmbiguousAction {
                names: actions
                    .iter()
                    .map(|action| action.display_name().to_owned())
                    .collect(),
            }),
        }
    }
}

/// 把一次请求映射为唯一的 Action。
///
/// # 教案级说明
/// - **状态 (What)**：`index` 为空表示尚未构建；目录版本与索引版本不一致时重建，
///   构建完成后才通过 [`ArcSwapOption::store`] 发布，读者只会看到完整的旧索引或新索引；
///   并发重建允许重复发生，后写者胜出，结果等价；
/// - **执行逻辑 (How)**：取索引 → 按路由值查桶 → 解析约束构造候选 → 分组评估 →
///   [`BestActionPolicy`] 收窄 → 0/1/多 三分。
/// - **日志**：未命中 `debug`，歧义 `warn`，重建索引 `debug`。
pub struct ActionSelector {
    provider: Arc<dyn ActionCatalogProvider>,
    services: Arc<dyn ServiceProvider>,
    policy: Arc<dyn BestActionPolicy>,
    options: SelectorOptions,
    index: ArcSwapOption<SelectionIndex>,
    constraints: ConstraintCache,
}

impl ActionSelector {
    /// 使用空服务容器与 [`PassThroughPolicy`] 创建选择器。
    pub fn new(provider: Arc<dyn ActionCatalogProvider>) -> Self {
        Self {
            provider,
            services: Arc::new(ServiceCollection::new()),
            policy: Arc::new(PassThroughPolicy),
            options: SelectorOptions::default(),
            index: ArcSwapOption::empty(),
            constraints: ConstraintCache::new(),
        }
    }

    pub fn with_services(mut self, services: Arc<dyn ServiceProvider>) -> Self {
        self.services = services;
        self
    }

    pub fn with_policy(mut self, policy: Arc<dyn BestActionPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_options(mut self, options: SelectorOptions) -> Self {
        self.options = options;
        self
    }

    /// 当前目录版本对应的索引；版本前进时先重建再发布。
    pub fn current_index(&self) -> Arc<SelectionIndex> {
        let catalog = self.provider.action_descriptors();
        if let Some(index) = self.index.load_full() {
            if index.version() == catalog.version() {
                return index;
            }
        }

        let index = Arc::new(SelectionIndex::build(&catalog));
        tracing::debug!(
            target: "dispatch::selector",
            version = index.version(),
            actions = catalog.len(),
            route_keys = index.route_keys().len(),
            "selection index rebuilt"
        );
        self.index.store(Some(Arc::clone(&index)));
        index
    }

    /// 约束评估之前按路由值命中的桶，用于诊断。
    pub fn candidates(&self, request: &RequestContext) -> Vec<Arc<ActionDescriptor>> {
        self.current_index()
            .lookup(request.route_values())
            .map(|bucket| bucket.to_vec())
            .unwrap_or_default()
    }

    /// 完整选择流程，以 [`SelectionOutcome`] 表达三种结果。
    pub fn evaluate(&self, request: &RequestContext) -> Result<SelectionOutcome> {
        let index = self.current_index();
        let Some(bucket) = index.lookup(request.route_values()) else {
            tracing::debug!(
                target: "dispatch::selector",
                route_values = ?request.route_values(),
                "no action matched the route values"
            );
            return Ok(SelectionOutcome::NotFound);
        };

        let mut candidates = Vec::with_capacity(bucket.len());
        for action in bucket.iter() {
            let constraints =
                self.constraints
                    .resolve(index.version(), action, self.services.as_ref())?;
            candidates.push(ActionCandidate::from_shared(Arc::clone(action), constraints));
        }

        let survivors = evaluate_constraints(
            request,
            &candidates,
            self.options.log_constraint_mismatches,
        );
        let mut best = self.policy.select_best(survivors);

        match best.len() {
            0 => {
                tracing::debug!(
                    target: "dispatch::selector",
                    route_values = ?request.route_values(),
                    method = request.method(),
                    candidates = candidates.len(),
                    "every candidate was rejected by its constraints"
                );
                Ok(SelectionOutcome::NotFound)
            }
            1 => Ok(SelectionOutcome::Found(best.remove(0).into_action())),
            _ => {
                let actions: Vec<_> = best.into_iter().map(ActionCandidate::into_action).collect();
                let names: Vec<_> = actions.iter().map(|action| action.display_name()).collect();
                tracing::warn!(
                    target: "dispatch::selector",
                    actions = ?names,
                    "multiple actions matched"
                );
                Ok(SelectionOutcome::Ambiguous(actions))
            }
        }
    }

    /// 选择唯一 Action：未命中为 `Ok(None)`，歧义为 [`DispatchError::AmbiguousAction`]。
    pub fn select(&self, request: &RequestContext) -> Result<Option<Arc<ActionDescriptor>>> {
        self.evaluate(request)?.into_result()
    }
}

impl fmt::Debug for ActionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionSelector")
            .field("policy", &self.policy)
            .field("options", &self.options)
            .field(
                "index_version",
                &self.index.load_full().map(|index| index.version()),
            )
            .field("constraints", &self.constraints)
            .finish_non_exhaustive()
    }
}
