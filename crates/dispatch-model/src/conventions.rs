//! 两阶段约定应用。
//!
//! # 教案级说明
//! - **阶段一**：全局约定按注册顺序作用于整个 [`ApplicationModel`]；
//! - **阶段二**：特性约定按 控制器 → Action → 参数 逐级应用。
//!   每一级在应用任何约定之前先把本级约定复制进固定的 `Vec`，
//!   因此某个约定改写了 `attributes`，不会影响已经收集好的列表。

use std::sync::Arc;

use crate::model::ApplicationModel;

/// 全局应用模型约定。
pub type ApplicationModelConvention = Arc<dyn Fn(&mut ApplicationModel) + Send + Sync>;

/// 依次执行两个阶段。
pub fn apply_conventions(model: &mut ApplicationModel, conventions: &[ApplicationModelConvention]) {
    for convention in conventions {
        convention(model);
    }

    for controller in &mut model.controllers {
        let controller_conventions: Vec<_> = controller
            .attributes
            .iter()
            .filter_map(|attribute| attribute.controller_convention().cloned())
            .collect();
        for convention in &controller_conventions {
            convention(controller);
        }

        for action in &mut controller.actions {
            let action_conventions: Vec<_> = action
                .attributes
                .iter()
                .filter_map(|attribute| attribute.action_convention().cloned())
                .collect();
            for convention in &action_conventions {
                convention(action);
            }

            for parameter in &mut action.parameters {
                let parameter_conventions: Vec<_> = parameter
                    .attributes
                    .iter()
                    .filter_map(|attribute| attribute.parameter_convention().cloned())
                    .collect();
                for convention in &parameter_conventions {
                    convention(parameter);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use dispatch_core::ControllerTypeId;

    use super::*;
    use crate::attribute::Attribute;
    use crate::model::{ActionModel, ControllerModel, ParameterModel};

    #[test]
    fn global_runs_before_scoped_and_scopes_run_outside_in() {
        let trace = Arc::new(Mutex::new(Vec::new()));

        let mut controller = ControllerModel::new(ControllerTypeId::new("HomeController"), "Home");
        let seen = Arc::clone(&trace);
        controller.attributes.push(
            Attribute::named("C").with_controller_convention(move |_| {
                seen.lock().expect("lock").push("controller")
            }),
        );
        let mut action = ActionModel::new("Index", "Index");
        let seen = Arc::clone(&trace);
        action.attributes.push(
            Attribute::named("A")
                .with_action_convention(move |_| seen.lock().expect("lock").push("action")),
        );
        let seen = Arc::clone(&trace);
        action.parameters.push(ParameterModel {
            name: "id".into(),
            is_optional: false,
            attributes: vec![Attribute::named("P").with_parameter_convention(move |_| {
                seen.lock().expect("lock").push("parameter")
            })],
        });
        controller.actions.push(action);

        let mut model = ApplicationModel::default();
        model.controllers.push(controller);

        let seen = Arc::clone(&trace);
        let global: ApplicationModelConvention =
            Arc::new(move |_: &mut ApplicationModel| seen.lock().expect("lock").push("global"));

        apply_conventions(&mut model, &[global]);
        assert_eq!(
            *trace.lock().expect("lock"),
            ["global", "controller", "action", "parameter"]
        );
    }

    #[test]
    fn conventions_are_snapshotted_before_application() {
        let mut action = ActionModel::new("Index", "Index");
        action.attributes.push(Attribute::named("Appender").with_action_convention(|action| {
            action.attributes.push(
                Attribute::named("Late").with_action_convention(|action| {
                    action.properties.insert("late".into(), true.into());
                }),
            );
            action.properties.insert("appender".into(), true.into());
        }));
        let mut controller = ControllerModel::new(ControllerTypeId::new("HomeController"), "Home");
        controller.actions.push(action);
        let mut model = ApplicationModel::default();
        model.controllers.push(controller);

        apply_conventions(&mut model, &[]);
        let action = &model.controllers[0].actions[0];
        assert!(action.properties.contains_key("appender"));
        assert!(!action.properties.contains_key("late"));
        assert_eq!(action.attributes.len(), 2);
    }
}
