//! Structural facts handed to the engine by its collaborators.
//!
//! The source parser reports ownership facts `(kind, key, parent)`; the class
//! decoder reports one [`ClassFile`] per decoded class with its supertypes,
//! members and the call/field-access sites of each method body.

use crate::element::ElementKind;
use crate::key;
use serde::{Deserialize, Serialize};

/// One ownership fact produced by the source parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFact {
    pub kind: ElementKind,
    pub key: String,
    pub parent: Option<String>,
}

impl SourceFact {
    pub fn new(kind: ElementKind, key: impl Into<String>, parent: Option<&str>) -> Self {
        Self {
            kind,
            key: key.into(),
            parent: parent.map(str::to_string),
        }
    }

    pub fn project(key: impl Into<String>) -> Self {
        Self::new(ElementKind::Project, key, None)
    }

    pub fn package(key: impl Into<String>, project: &str) -> Self {
        Self::new(ElementKind::Package, key, Some(project))
    }

    pub fn file(key: impl Into<String>, parent: &str) -> Self {
        Self::new(ElementKind::File, key, Some(parent))
    }

    pub fn type_decl(key: impl Into<String>, parent: Option<&str>) -> Self {
        Self::new(ElementKind::Type, key, parent)
    }

    /// A method fact; the key is derived from the owner and signature.
    pub fn method(owner: &str, signature: &str) -> Self {
        Self::new(
            ElementKind::Method,
            key::method_key(owner, signature),
            Some(owner),
        )
    }

    /// A field fact; the key is derived from the owner and name.
    pub fn field(owner: &str, name: &str) -> Self {
        Self::new(ElementKind::Field, key::field_key(owner, name), Some(owner))
    }
}

/// A field declared by a decoded class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// An invocation site inside a method body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallSite {
    /// Decoder-assigned site id, unique within the calling method.
    pub site: u32,
    /// Type key of the invoked method's owner.
    pub owner: String,
    /// Name and descriptor of the invoked method, e.g. `n()V`.
    pub signature: String,
}

impl CallSite {
    pub fn new(site: u32, owner: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            site,
            owner: owner.into(),
            signature: signature.into(),
        }
    }

    /// Key of the invoked method.
    pub fn target_key(&self) -> String {
        key::method_key(&self.owner, &self.signature)
    }
}

/// A field read or write inside a method body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldAccess {
    /// Decoder-assigned site id, unique within the accessing method.
    pub site: u32,
    /// Type key of the field's owner.
    pub owner: String,
    pub name: String,
}

impl FieldAccess {
    pub fn new(site: u32, owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            site,
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Key of the accessed field.
    pub fn target_key(&self) -> String {
        key::field_key(&self.owner, &self.name)
    }
}

/// One fact from a method body, in instruction order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "fact", rename_all = "snake_case")]
pub enum BodyFact {
    Call(CallSite),
    FieldAccess(FieldAccess),
}

impl BodyFact {
    pub fn site(&self) -> u32 {
        match self {
            Self::Call(call) => call.site,
            Self::FieldAccess(access) => access.site,
        }
    }

    /// Type key of the referenced member's owner.
    pub fn target_owner(&self) -> &str {
        match self {
            Self::Call(call) => &call.owner,
            Self::FieldAccess(access) => &access.owner,
        }
    }

    /// Key of the referenced member.
    pub fn target_key(&self) -> String {
        match self {
            Self::Call(call) => call.target_key(),
            Self::FieldAccess(access) => access.target_key(),
        }
    }
}

/// A method declared by a decoded class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDecl {
    /// Name and descriptor, e.g. `m()V`.
    pub signature: String,
    pub body: Vec<BodyFact>,
}

impl MethodDecl {
    pub fn new(signature: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            body: Vec::new(),
        }
    }

    pub fn with_call(mut self, site: u32, owner: &str, signature: &str) -> Self {
        self.body
            .push(BodyFact::Call(CallSite::new(site, owner, signature)));
        self
    }

    pub fn with_field_access(mut self, site: u32, owner: &str, name: &str) -> Self {
        self.body
            .push(BodyFact::FieldAccess(FieldAccess::new(site, owner, name)));
        self
    }
}

/// Structural facts for one decoded class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassFile {
    /// Internal name of the class, e.g. `com/acme/B`.
    pub key: String,
    /// Internal name of the superclass; `None` for an inheritance root.
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
}

impl ClassFile {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            superclass: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn with_superclass(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(FieldDecl::new(name));
        self
    }

    pub fn with_method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }
}
