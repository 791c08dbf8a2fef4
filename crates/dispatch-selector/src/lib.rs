//! dispatch-selector：每个请求选出唯一 Action。
//!
//! # 教案级说明（Why）
//! - 目录规模达到成百上千个 Action，而重建只发生在代码变化时；
//!   因此按目录版本缓存一份只读的 [`SelectionIndex`]，请求路径只做一次哈希查找；
//! - 路由值先按原样比较、再按忽略大小写回退；空值与缺失等价；
//! - 约束按 `order` 分组递归评估，有满足约束的候选时优先于无约束候选。
//!
//! # 模块划分（What）
//! - [`index`]：分桶索引；
//! - [`evaluator`]：约束分组评估；
//! - [`constraint_cache`]：约束工厂的按版本物化缓存；
//! - [`policy`]：评估之后的收窄钩子；
//! - [`selector`]：把上述部件串成 `select` / `evaluate` / `candidates`。

pub mod constraint_cache;
pub mod evaluator;
pub mod index;
pub mod policy;
pub mod selector;

pub use constraint_cache::ConstraintCache;
pub use evaluator::evaluate_constraints;
pub use index::SelectionIndex;
pub use policy::{BestActionPolicy, PassThroughPolicy};
pub use selector::{ActionSelector, SelectionOutcome};
