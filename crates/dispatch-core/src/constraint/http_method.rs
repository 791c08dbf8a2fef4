use super::{ActionConstraint, ConstraintKind};
use crate::context::ConstraintContext;

/// HTTP 方法约束的默认优先级。
pub const DEFAULT_HTTP_METHOD_ORDER: i32 = 100;

/// 按请求方法筛选候选，方法名比较忽略大小写；方法列表为空时接受任意方法。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpMethodConstraint {
    methods: Vec<String>,
    order: i32,
}

impl HttpMethodConstraint {
    pub fn new<I, S>(methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            methods: methods.into_iter().map(Into::into).collect(),
            order: DEFAULT_HTTP_METHOD_ORDER,
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn methods(&self) -> &[String] {
        &self.methods
    }
}

impl ActionConstraint for HttpMethodConstraint {
    fn order(&self) -> i32 {
        self.order
    }

    fn accept(&self, context: &ConstraintContext<'_>) -> bool {
        if self.methods.is_empty() {
            return true;
        }
        let method = context.request().method();
        self.methods
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(method))
    }

    fn kind(&self) -> ConstraintKind {
        ConstraintKind::HttpMethod
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ActionCandidate, RequestContext};
    use crate::descriptor::{ActionDescriptor, ControllerTypeId};
    use std::sync::Arc;

    fn accepts(constraint: &HttpMethodConstraint, method: &str) -> bool {
        let descriptor = Arc::new(
            ActionDescriptor::builder("Home.Index", ControllerTypeId::new("HomeController")).build(),
        );
        let candidate = ActionCandidate::new(descriptor, Vec::new());
        let candidates = [candidate];
        let request = RequestContext::new(method.to_owned());
        let context = ConstraintContext::new(&request, &candidates, &candidates[0]);
        constraint.accept(&context)
    }

    #[test]
    fn matches_method_without_case() {
        let constraint = HttpMethodConstraint::new(["GET", "HEAD"]);
        assert!(accepts(&constraint, "get"));
        assert!(accepts(&constraint, "HEAD"));
        assert!(!accepts(&constraint, "POST"));
    }

    #[test]
    fn empty_list_accepts_anything() {
        let constraint = HttpMethodConstraint::new(Vec::<String>::new());
        assert!(accepts(&constraint, "DELETE"));
    }
}
