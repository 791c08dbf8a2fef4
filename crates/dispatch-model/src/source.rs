use dispatch_core::ControllerTypeId;

use crate::attribute::Attribute;

/// 候选控制器类型的描述：类型身份、可见性、特性与声明的方法。
#[derive(Clone, Debug)]
pub struct ControllerSource {
    pub type_id: ControllerTypeId,
    pub is_public: bool,
    pub is_abstract: bool,
    pub is_generic: bool,
    pub attributes: Vec<Attribute>,
    pub methods: Vec<MethodSource>,
}

impl ControllerSource {
    /// 以类型名创建公开、非抽象、非泛型的候选类型。
    pub fn new(type_id: ControllerTypeId) -> Self {
        Self {
            type_id,
            is_public: true,
            is_abstract: false,
            is_generic: false,
            attributes: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn named(name: &'static str) -> Self {
        Self::new(ControllerTypeId::new(name))
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn method(mut self, method: MethodSource) -> Self {
        self.methods.push(method);
        self
    }

    pub fn non_public(mut self) -> Self {
        self.is_public = false;
        self
    }

    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn generic(mut self) -> Self {
        self.is_generic = true;
        self
    }
}

/// 候选方法。
#[derive(Clone, Debug)]
pub struct MethodSource {
    pub name: String,
    pub is_public: bool,
    pub is_static: bool,
    /// 编译器生成的特殊方法（属性访问器、运算符等）。
    pub is_special_name: bool,
    /// 继承自根对象类型的方法（`ToString` 之类）。
    pub declared_on_object: bool,
    pub attributes: Vec<Attribute>,
    pub parameters: Vec<ParameterSource>,
}

impl MethodSource {
    /// 公开的实例方法。
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            is_public: true,
            is_static: false,
            is_special_name: false,
            declared_on_object: false,
            attributes: Vec::new(),
            parameters: Vec::new(),
        }
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn parameter(mut self, parameter: ParameterSource) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn non_public(mut self) -> Self {
        self.is_public = false;
        self
    }

    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn special_name(mut self) -> Self {
        self.is_special_name = true;
        self
    }

    pub fn from_object(mut self) -> Self {
        self.declared_on_object = true;
        self
    }
}

/// 候选形参。
#[derive(Clone, Debug)]
pub struct ParameterSource {
    pub name: String,
    pub has_default: bool,
    pub attributes: Vec<Attribute>,
}

impl ParameterSource {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            has_default: false,
            attributes: Vec::new(),
        }
    }

    /// 带默认值（可选）的形参。
    pub fn optional<S: Into<String>>(name: S) -> Self {
        Self {
            has_default: true,
            ..Self::new(name)
        }
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }
}
