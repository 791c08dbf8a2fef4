use std::fmt;

use dispatch_core::ActionCandidate;

/// 约束评估之后的最终收窄钩子。
///
/// # 教案级说明
/// - **契约 (What)**：输入为通过约束评估的候选（保持目录顺序），输出为保留下来的子集；
///   不得重新评估约束，也不得引入输入之外的候选；
/// - 返回多于一个候选时，选择器按歧义处理。
pub trait BestActionPolicy: fmt::Debug + Send + Sync {
    fn select_best(&self, candidates: Vec<ActionCandidate>) -> Vec<ActionCandidate>;
}

/// 默认策略：原样返回。
#[derive(Clone, Copy, Debug, Default)]
pub struct PassThroughPolicy;

impl BestActionPolicy for PassThroughPolicy {
    fn select_best(&self, candidates: Vec<ActionCandidate>) -> Vec<ActionCandidate> {
        candidates
    }
}
