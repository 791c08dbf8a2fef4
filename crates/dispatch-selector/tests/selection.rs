//! 选择器行为测试：分桶查找、约束优先级、回退与歧义。

use std::sync::Arc;

use dispatch_core::{
    ActionCandidate, ActionCatalog, ActionConstraint, ActionDescriptor, ConstraintContext,
    ConstraintItem, ConsumesConstraint, ControllerTypeId, DefaultCatalogProvider,
    HttpMethodConstraint, RequestContext,
};
use dispatch_selector::{ActionSelector, BestActionPolicy, SelectionOutcome};
use tracing_test::traced_test;

#[derive(Debug)]
struct Fixed {
    order: i32,
    accept: bool,
}

impl ActionConstraint for Fixed {
    fn order(&self) -> i32 {
        self.order
    }

    fn accept(&self, _context: &ConstraintContext<'_>) -> bool {
        self.accept
    }
}

fn fixed(order: i32, accept: bool) -> ConstraintItem {
    ConstraintItem::constraint(Fixed { order, accept })
}

fn action(name: &str, controller: &str) -> dispatch_core::ActionDescriptorBuilder {
    ActionDescriptor::builder(name.to_owned(), ControllerTypeId::new("TestController"))
        .route_value("controller", controller.to_owned())
        .route_value("action", "Index")
}

fn selector_over(actions: Vec<ActionDescriptor>) -> (Arc<DefaultCatalogProvider>, ActionSelector) {
    let provider = Arc::new(DefaultCatalogProvider::with_catalog(
        ActionCatalog::with_next_version(actions),
    ));
    let selector = ActionSelector::new(provider.clone());
    (provider, selector)
}

fn request(method: &str, controller: &str) -> RequestContext {
    RequestContext::new(method.to_owned())
        .with_route_value("controller", controller.to_owned())
        .with_route_value("action", "Index")
}

fn selected_name(selector: &ActionSelector, request: &RequestContext) -> Option<String> {
    selector
        .select(request)
        .expect("不应歧义")
        .map(|action| action.display_name().to_owned())
}

#[test]
fn repeated_selection_returns_the_same_descriptor() {
    let (_, selector) = selector_over(vec![action("Home.Index", "Home").build()]);
    let request = request("GET", "Home");

    let first = selector.select(&request).expect("选择").expect("命中");
    let second = selector.select(&request).expect("选择").expect("命中");
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn ignore_case_bucket_is_the_fallback() {
    let (_, selector) = selector_over(vec![action("Home.Index", "Home").build()]);
    assert_eq!(
        selected_name(&selector, &request("GET", "HOME")).as_deref(),
        Some("Home.Index")
    );
}

#[test]
fn case_variants_are_separated_only_by_constraints() {
    let (_, selector) = selector_over(vec![
        action("Home.Get", "Home")
            .constraint(ConstraintItem::constraint(HttpMethodConstraint::new(["GET"])))
            .build(),
        action("HOME.Post", "HOME")
            .constraint(ConstraintItem::constraint(HttpMethodConstraint::new(["POST"])))
            .build(),
    ]);
    assert_eq!(
        selected_name(&selector, &request("GET", "Home")).as_deref(),
        Some("Home.Get")
    );
    assert_eq!(
        selected_name(&selector, &request("post", "Home")).as_deref(),
        Some("HOME.Post")
    );

    let (_, unconstrained) = selector_over(vec![
        action("Home.Index", "Home").build(),
        action("HOME.Index", "HOME").build(),
    ]);
    let error = unconstrained
        .select(&request("GET", "Home"))
        .expect_err("未被约束区分的大小写变体应歧义");
    assert_eq!(
        error.ambiguous_names(),
        Some(&["Home.Index".to_owned(), "HOME.Index".to_owned()][..])
    );
}

#[test]
fn constrained_survivor_beats_pass_through() {
    let (_, selector) = selector_over(vec![
        action("Plain", "Home").build(),
        action("Passes", "Home").constraint(fixed(1, true)).build(),
        action("Fails", "Home").constraint(fixed(1, false)).build(),
    ]);
    assert_eq!(
        selected_name(&selector, &request("GET", "Home")).as_deref(),
        Some("Passes")
    );
}

#[test]
fn pass_through_is_used_when_constrained_candidates_fail() {
    let (_, selector) = selector_over(vec![
        action("Plain", "Home").constraint(fixed(3, true)).build(),
        action("Fails", "Home").constraint(fixed(1, false)).build(),
    ]);
    assert_eq!(
        selected_name(&selector, &request("GET", "Home")).as_deref(),
        Some("Plain")
    );

    let (_, blocked) = selector_over(vec![
        action("Plain", "Home").constraint(fixed(3, false)).build(),
        action("Fails", "Home").constraint(fixed(1, false)).build(),
    ]);
    assert_eq!(selected_name(&blocked, &request("GET", "Home")), None);
}

#[test]
#[traced_test]
fn identical_actions_are_ambiguous() {
    let (_, selector) = selector_over(vec![
        action("Home.Index", "Home").build(),
        action("Home.Index2", "Home").build(),
    ]);

    match selector.evaluate(&request("GET", "Home")).expect("评估") {
        SelectionOutcome::Ambiguous(actions) => assert_eq!(actions.len(), 2),
        other => panic!("应为歧义，实际为 {other:?}"),
    }

    let error = selector
        .select(&request("GET", "Home"))
        .expect_err("应报告歧义");
    assert_eq!(error.code(), "dispatch.selector.ambiguous");
    assert!(error.to_string().ends_with("\n\nHome.Index\nHome.Index2"));
    assert!(logs_contain("multiple actions matched"));
}

#[test]
fn missing_and_empty_area_are_equivalent() {
    let (_, selector) = selector_over(vec![
        action("Home.Index", "Home").build(),
        action("Admin.Home.Index", "Home").route_value("area", "Admin").build(),
    ]);

    let blank_area = request("GET", "Home").with_route_value("area", "");
    assert_eq!(
        selected_name(&selector, &blank_area).as_deref(),
        Some("Home.Index")
    );
    assert_eq!(
        selected_name(&selector, &request("GET", "Home")).as_deref(),
        Some("Home.Index")
    );

    let admin = request("GET", "Home").with_route_value("area", "admin");
    assert_eq!(
        selected_name(&selector, &admin).as_deref(),
        Some("Admin.Home.Index")
    );
}

#[test]
fn consumes_falls_back_to_action_without_content_type_constraint() {
    let (_, selector) = selector_over(vec![
        action("Json", "Upload")
            .constraint(ConstraintItem::constraint(ConsumesConstraint::new([
                "application/json",
            ])))
            .build(),
        action("Fallback", "Upload").build(),
    ]);

    let json = request("POST", "Upload").with_content_type("application/json; charset=utf-8");
    assert_eq!(selected_name(&selector, &json).as_deref(), Some("Json"));

    let xml = request("POST", "Upload").with_content_type("text/xml");
    assert_eq!(selected_name(&selector, &xml).as_deref(), Some("Fallback"));

    assert_eq!(
        selected_name(&selector, &request("POST", "Upload")).as_deref(),
        Some("Fallback")
    );
}

#[test]
fn consumes_without_fallback_accepts_missing_content_type() {
    let (_, selector) = selector_over(vec![
        action("Json", "Upload")
            .constraint(ConstraintItem::constraint(ConsumesConstraint::new([
                "application/json",
            ])))
            .build(),
        action("Text", "Upload")
            .constraint(ConstraintItem::constraint(ConsumesConstraint::new(["text/*"])))
            .build(),
    ]);

    let plain = request("POST", "Upload").with_content_type("text/plain");
    assert_eq!(selected_name(&selector, &plain).as_deref(), Some("Text"));

    let error = selector
        .select(&request("POST", "Upload"))
        .expect_err("都带 Consumes 时缺少 Content-Type 应全部接受");
    assert_eq!(error.ambiguous_names().map(<[String]>::len), Some(2));
}

#[test]
#[traced_test]
fn unknown_route_values_are_not_found() {
    let (_, selector) = selector_over(vec![action("Home.Index", "Home").build()]);
    let outcome = selector.evaluate(&request("GET", "Blog")).expect("评估");
    assert!(matches!(outcome, SelectionOutcome::NotFound));
    assert!(selector.candidates(&request("GET", "Blog")).is_empty());
    assert!(logs_contain("no action matched the route values"));
}

#[test]
fn candidates_report_the_bucket_before_constraints() {
    let (_, selector) = selector_over(vec![
        action("Home.Get", "Home")
            .constraint(ConstraintItem::constraint(HttpMethodConstraint::new(["GET"])))
            .build(),
        action("Home.Post", "Home")
            .constraint(ConstraintItem::constraint(HttpMethodConstraint::new(["POST"])))
            .build(),
    ]);
    let names: Vec<_> = selector
        .candidates(&request("DELETE", "Home"))
        .iter()
        .map(|action| action.display_name().to_owned())
        .collect();
    assert_eq!(names, ["Home.Get", "Home.Post"]);
    assert_eq!(selected_name(&selector, &request("DELETE", "Home")), None);
}

#[test]
fn published_catalog_is_observed_by_the_next_selection() {
    let (provider, selector) = selector_over(vec![action("Home.Index", "Home").build()]);
    assert!(selected_name(&selector, &request("GET", "Blog")).is_none());

    assert!(provider.publish(ActionCatalog::with_next_version([
        action("Blog.Index", "Blog").build()
    ])));
    assert_eq!(
        selected_name(&selector, &request("GET", "Blog")).as_deref(),
        Some("Blog.Index")
    );
    assert_eq!(selector.current_index().version(), provider.version());
}

#[derive(Debug)]
struct FirstWins;

impl BestActionPolicy for FirstWins {
    fn select_best(&self, mut candidates: Vec<ActionCandidate>) -> Vec<ActionCandidate> {
        candidates.truncate(1);
        candidates
    }
}

#[test]
fn best_action_policy_narrows_survivors() {
    let (provider, _) = selector_over(vec![
        action("Home.Index", "Home").build(),
        action("Home.Index2", "Home").build(),
    ]);
    let selector = ActionSelector::new(provider).with_policy(Arc::new(FirstWins));
    assert_eq!(
        selected_name(&selector, &request("GET", "Home")).as_deref(),
        Some("Home.Index")
    );
}

#[derive(Debug)]
struct OnlyWhenAlone;

impl ActionConstraint for OnlyWhenAlone {
    fn order(&self) -> i32 {
        0
    }

    fn accept(&self, context: &ConstraintContext<'_>) -> bool {
        context.candidates().len() == 1
            && context.current().action().id() == context.candidates()[0].action().id()
    }
}

#[test]
fn constraint_context_exposes_the_evaluated_set() {
    let (_, selector) = selector_over(vec![
        action("Lonely", "Home")
            .constraint(ConstraintItem::constraint(OnlyWhenAlone))
            .build(),
        action("Other", "Home").build(),
    ]);
    assert_eq!(
        selected_name(&selector, &request("GET", "Home")).as_deref(),
        Some("Other")
    );
}
