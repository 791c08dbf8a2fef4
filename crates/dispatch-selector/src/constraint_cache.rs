//! 约束物化缓存。
//!
//! # 教案级说明
//! - 可复用的约束（现成实例或 `is_reusable()` 的工厂产物）按“目录版本 × ActionId”只物化一次；
//! - 不可复用工厂在每次请求时重新调用 `create_instance`；
//! - 目录版本变化时整张表被新的空表替换，旧条目随旧快照一同释放。

use std::fmt;
use std::sync::Arc;

use arc_swap::{ArcSwap, Guard};
use dashmap::DashMap;
use dispatch_core::{
    ActionConstraint, ActionConstraintFactory, ActionDescriptor, ActionId, ConstraintItem,
    DispatchError, Result, ServiceProvider,
};

type ConstraintList = Arc<[Arc<dyn ActionConstraint>]>;

#[derive(Clone)]
enum Slot {
    Ready(Arc<dyn ActionConstraint>),
    PerRequest(Arc<dyn ActionConstraintFactory>),
}

#[derive(Clone)]
struct Entry {
    /// 全部可复用时直接共享的列表。
    shared: Option<ConstraintList>,
    slots: Arc<[Slot]>,
}

struct Generation {
    version: u64,
    entries: DashMap<ActionId, Entry>,
}

impl Generation {
    fn new(version: u64) -> Self {
        Self {
            version,
            entries: DashMap::new(),
        }
    }
}

/// 按目录版本分代的约束缓存。
pub struct ConstraintCache {
    current: ArcSwap<Generation>,
}

impl ConstraintCache {
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(Generation::new(0)),
        }
    }

    /// 当前代对应的目录版本。
    pub fn version(&self) -> u64 {
        self.current.load().version
    }

    /// 当前代已缓存的描述符数量。
    pub fn cached_actions(&self) -> usize {
        self.current.load().entries.len()
    }

    /// 为本次请求解析 `action` 的约束列表。
    ///
    /// 工厂失败以 [`DispatchError::ConstraintFactory`] 原样返回，不重试、不缓存失败。
    pub fn resolve(
        &self,
        version: u64,
        action: &ActionDescriptor,
        services: &dyn ServiceProvider,
    ) -> Result<ConstraintList> {
        let generation = self.generation(version);

        let cached = generation
            .entries
            .get(&action.id())
            .map(|entry| entry.value().clone());
        let entry = match cached {
            Some(entry) => entry,
            None => {
                let entry = build_entry(action, services)?;
                generation.entries.insert(action.id(), entry.clone());
                entry
            }
        };

        if let Some(shared) = entry.shared {
            return Ok(shared);
        }

        entry
            .slots
            .iter()
            .map(|slot| match slot {
                Slot::Ready(constraint) => Ok(Arc::clone(constraint)),
                Slot::PerRequest(factory) => materialize(action, factory.as_ref(), services),
            })
            .collect::<Result<Vec<_>>>()
            .map(ConstraintList::from)
    }

    /// 取得 `version` 对应的代。
    ///
    /// 只向更新的版本切换；持有旧索引的请求拿到一张不发布的临时表，
    /// 不会把当前代回退到旧版本。
    fn generation(&self, version: u64) -> Arc<Generation> {
        let mut current = self.current.load_full();
        loop {
            if current.version == version {
                return current;
            }
            if current.version > version {
                return Arc::new(Generation::new(version));
            }
            let fresh = Arc::new(Generation::new(version));
            let previous = self.current.compare_and_swap(&current, Arc::clone(&fresh));
            if Arc::ptr_eq(&*previous, &current) {
                return fresh;
            }
            current = Guard::into_inner(previous);
        }
    }
}

impl Default for ConstraintCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConstraintCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = self.current.load();
        f.debug_struct("ConstraintCache")
            .field("version", &current.version)
            .field("cached_actions", &current.entries.len())
            .finish()
    }
}

fn build_entry(action: &ActionDescriptor, services: &dyn ServiceProvider) -> Result<Entry> {
    let mut slots = Vec::with_capacity(action.constraints().len());
    for item in action.constraints() {
        let slot = match item {
            ConstraintItem::Constraint(constraint) => Slot::Ready(Arc::clone(constraint)),
            ConstraintItem::Factory(factory) if factory.is_reusable() => {
                Slot::Ready(materialize(action, factory.as_ref(), services)?)
            }
            ConstraintItem::Factory(factory) => Slot::PerRequest(Arc::clone(factory)),
        };
        slots.push(slot);
    }

    let shared = slots
        .iter()
        .map(|slot| match slot {
            Slot::Ready(constraint) => Some(Arc::clone(constraint)),
            Slot::PerRequest(_) => None,
        })
        .collect::<Option<Vec<_>>>()
        .map(ConstraintList::from);

    Ok(Entry {
        shared,
        slots: slots.into(),
    })
}

fn materialize(
    action: &ActionDescriptor,
    factory: &dyn ActionConstraintFactory,
    services: &dyn ServiceProvider,
) -> Result<Arc<dyn ActionConstraint>> {
    let constraint = factory
        .create_instance(services)
        .map_err(|source| DispatchError::ConstraintFactory {
            action: action.display_name().to_owned(),
            source,
        })?;
    tracing::debug!(
        target: "dispatch::selector",
        action = action.display_name(),
        action_id = %action.id(),
        order = constraint.order(),
        reusable = factory.is_reusable(),
        "constraint factory materialized"
    );
    Ok(constraint)
}
