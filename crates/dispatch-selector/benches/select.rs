use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use dispatch_core::{
    ActionCatalog, ActionDescriptor, ConstraintItem, ControllerTypeId, DefaultCatalogProvider,
    HttpMethodConstraint, RequestContext,
};
use dispatch_selector::ActionSelector;

/// 选择热路径基准：1000 个 Action，每个控制器 GET/POST 两个变体。
///
/// # 执行逻辑（How）
/// - 预先构建一次索引，测量的只是“查桶 + 约束评估”；
/// - 分别覆盖原样命中与忽略大小写回退两条路径。
fn bench_select(c: &mut Criterion) {
    let actions = (0..500).flat_map(|index| {
        ["GET", "POST"].into_iter().map(move |method| {
            ActionDescriptor::builder(
                format!("Controller{index}.{method}"),
                ControllerTypeId::new("BenchController"),
            )
            .route_value("controller", format!("Controller{index}"))
            .route_value("action", "Index")
            .constraint(ConstraintItem::constraint(HttpMethodConstraint::new([method])))
            .build()
        })
    });
    let provider = Arc::new(DefaultCatalogProvider::with_catalog(
        ActionCatalog::with_next_version(actions),
    ));
    let selector = ActionSelector::new(provider);

    let exact = RequestContext::new("POST")
        .with_route_value("controller", "Controller250")
        .with_route_value("action", "Index");
    let folded = RequestContext::new("GET")
        .with_route_value("controller", "CONTROLLER250")
        .with_route_value("action", "index");
    selector.current_index();

    c.bench_function("select_ordinal", |b| b.iter(|| selector.select(&exact)));
    c.bench_function("select_ignore_case", |b| b.iter(|| selector.select(&folded)));
}

criterion_group!(selector_benches, bench_select);
criterion_main!(selector_benches);
