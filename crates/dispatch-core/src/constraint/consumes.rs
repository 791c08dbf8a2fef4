use std::fmt;

use super::{ActionConstraint, ConstraintKind};
use crate::context::ConstraintContext;

/// Content-Type 约束的默认优先级。
pub const DEFAULT_CONSUMES_ORDER: i32 = 200;

/// 简化的媒体类型：`type/subtype`，忽略 `;` 之后的参数，比较忽略大小写。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaType {
    kind: String,
    subtype: String,
}

impl MediaType {
    /// 解析媒体类型文本；缺少 `/` 或任一部分为空时返回 `None`。
    pub fn parse(raw: &str) -> Option<Self> {
        let essence = raw.split(';').next()?.trim();
        let (kind, subtype) = essence.split_once('/')?;
        let (kind, subtype) = (kind.trim(), subtype.trim());
        if kind.is_empty() || subtype.is_empty() {
            return None;
        }
        Some(Self {
            kind: kind.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
        })
    }

    /// `self` 作为声明方（可含通配符）时，是否覆盖请求方的 `other`。
    pub fn covers(&self, other: &MediaType) -> bool {
        if self.kind == "*" {
            return true;
        }
        if self.kind != other.kind {
            return false;
        }
        self.subtype == "*" || self.subtype == other.subtype
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.subtype)
    }
}

/// 按请求 Content-Type 筛选候选。
///
/// # 教案级说明
/// - **契约 (What)**：
///   - 请求带 Content-Type：任一声明类型覆盖请求类型即接受；
///   - 请求无 Content-Type：仅当本轮评估集合中的每个候选都带有 Content-Type 约束时才接受，
///     存在未声明该约束的候选时让位给它（回退 Action）；
///   - 请求 Content-Type 无法解析时拒绝。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsumesConstraint {
    content_types: Vec<MediaType>,
    order: i32,
}

impl ConsumesConstraint {
    /// 以声明的媒体类型创建；无法解析的条目被忽略。
    pub fn new<I, S>(content_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            content_types: content_types
                .into_iter()
                .filter_map(|raw| MediaType::parse(raw.as_ref()))
                .collect(),
            order: DEFAULT_CONSUMES_ORDER,
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn content_types(&self) -> &[MediaType] {
        &self.content_types
    }
}

impl ActionConstraint for ConsumesConstraint {
    fn order(&self) -> i32 {
        self.order
    }

    fn accept(&self, context: &ConstraintContext<'_>) -> bool {
        match context.request().content_type() {
            Some(raw) => match MediaType::parse(raw) {
                Some(requested) => self
                    .content_types
                    .iter()
                    .any(|declared| declared.covers(&requested)),
                None => false,
            },
            None => context.candidates().iter().all(|candidate| {
                candidate
                    .constraints()
                    .iter()
                    .any(|constraint| constraint.kind() == ConstraintKind::Consumes)
            }),
        }
    }

    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Consumes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ActionCandidate, RequestContext};
    use crate::descriptor::{ActionDescriptor, ControllerTypeId};
    use std::sync::Arc;

    fn candidate(name: &str, constraint: Option<ConsumesConstraint>) -> ActionCandidate {
        let descriptor = Arc::new(
            ActionDescriptor::builder(name, ControllerTypeId::new("CompanyController")).build(),
        );
        let constraints: Vec<Arc<dyn ActionConstraint>> = constraint
            .into_iter()
            .map(|c| Arc::new(c) as Arc<dyn ActionConstraint>)
            .collect();
        ActionCandidate::new(descriptor, constraints)
    }

    #[test]
    fn parses_media_type_and_ignores_parameters() {
        let parsed = MediaType::parse("Application/JSON; charset=utf-8").expect("应能解析");
        assert_eq!(parsed.to_string(), "application/json");
        assert!(MediaType::parse("json").is_none());
        assert!(MediaType::parse("/json").is_none());
    }

    #[test]
    fn wildcard_covers_subtypes() {
        let declared = MediaType::parse("application/*").unwrap();
        assert!(declared.covers(&MediaType::parse("application/xml").unwrap()));
        assert!(!declared.covers(&MediaType::parse("text/plain").unwrap()));
        assert!(MediaType::parse("*/*").unwrap().covers(&MediaType::parse("text/plain").unwrap()));
    }

    #[test]
    fn accepts_matching_content_type() {
        let json = ConsumesConstraint::new(["application/json"]);
        let candidates = [candidate("json", Some(json.clone()))];
        let request = RequestContext::new("POST").with_content_type("application/json; charset=utf-8");
        let context = ConstraintContext::new(&request, &candidates, &candidates[0]);
        assert!(json.accept(&context));

        let request = RequestContext::new("POST").with_content_type("application/xml");
        let context = ConstraintContext::new(&request, &candidates, &candidates[0]);
        assert!(!json.accept(&context));
    }

    #[test]
    fn missing_content_type_defers_to_fallback_candidate() {
        let json = ConsumesConstraint::new(["application/json"]);
        let with_fallback = [
            candidate("json", Some(json.clone())),
            candidate("fallback", None),
        ];
        let request = RequestContext::new("POST");
        let context = ConstraintContext::new(&request, &with_fallback, &with_fallback[0]);
        assert!(!json.accept(&context));

        let only_constrained = [
            candidate("json", Some(json.clone())),
            candidate("xml", Some(ConsumesConstraint::new(["application/xml"]))),
        ];
        let context = ConstraintContext::new(&request, &only_constrained, &only_constrained[0]);
        assert!(json.accept(&context));
    }
}
