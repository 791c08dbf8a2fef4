//! 约束分组评估。

use dispatch_core::{ActionCandidate, ConstraintContext, RequestContext};

/// 按 `order` 分组递归剥离候选。
///
/// # 教案级说明
/// - **执行逻辑 (How)**：
///   1. 在剩余候选中找出严格大于已处理 `order` 的最小 `order`；找不到则全部接受；
///   2. 把候选分为“本组约束全部接受”与“本组没有约束”两类，本组有约束但被拒绝的直接淘汰；
///   3. 先对前者递归，有结果即返回；否则对后者递归；
/// - **契约 (What)**：同组内不重排；[`ConstraintContext::candidates`] 暴露的是本层参与评估的集合；
/// - `log_mismatches` 为 `true` 时每次淘汰输出一条 `trace` 日志。
pub fn evaluate_constraints(
    request: &RequestContext,
    candidates: &[ActionCandidate],
    log_mismatches: bool,
) -> Vec<ActionCandidate> {
    evaluate_from(request, candidates, None, log_mismatches)
}

fn evaluate_from(
    request: &RequestContext,
    candidates: &[ActionCandidate],
    processed: Option<i32>,
    log_mismatches: bool,
) -> Vec<ActionCandidate> {
    let next_order = candidates
        .iter()
        .flat_map(|candidate| candidate.constraints().iter().map(|constraint| constraint.order()))
        .filter(|order| processed.is_none_or(|done| *order > done))
        .min();

    let Some(order) = next_order else {
        return candidates.to_vec();
    };

    let mut constrained = Vec::new();
    let mut pass_through = Vec::new();

    for candidate in candidates {
        let mut has_constraint = false;
        let mut accepted = true;
        for constraint in candidate
            .constraints()
            .iter()
            .filter(|constraint| constraint.order() == order)
        {
            has_constraint = true;
            let context = ConstraintContext::new(request, candidates, candidate);
            if !constraint.accept(&context) {
                accepted = false;
                if log_mismatches {
                    tracing::trace!(
                        target: "dispatch::selector",
                        action = candidate.action().display_name(),
                        action_id = %candidate.action().id(),
                        order,
                        constraint = ?constraint,
                        "action constraint rejected the request"
                    );
                }
                break;
            }
        }

        if !has_constraint {
            pass_through.push(candidate.clone());
        } else if accepted {
            constrained.push(candidate.clone());
        }
    }

    if !constrained.is_empty() {
        let matches = evaluate_from(request, &constrained, Some(order), log_mismatches);
        if !matches.is_empty() {
            return matches;
        }
    }

    if pass_through.is_empty() {
        return Vec::new();
    }
    evaluate_from(request, &pass_through, Some(order), log_mismatches)
}
