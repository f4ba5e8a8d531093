//! Element key scheme shared by both scans.
//!
//! Keys are built from JVM internal names so that a type seen in source and
//! the same type seen in a class file resolve to one element:
//!
//! - type: `com/acme/Foo`
//! - method: `com/acme/Foo#run()V`
//! - field: `com/acme/Foo#count`
//! - package: `com/acme`

/// Separates a member name from its owning type.
pub const MEMBER_SEPARATOR: char = '#';

/// Separates package segments in an internal name.
pub const PACKAGE_SEPARATOR: char = '/';

/// Builds a method key from its owner and `name + descriptor` signature.
pub fn method_key(owner: &str, signature: &str) -> String {
    format!("{}{}{}", owner, MEMBER_SEPARATOR, signature)
}

/// Builds a field key from its owner and name.
pub fn field_key(owner: &str, name: &str) -> String {
    format!("{}{}{}", owner, MEMBER_SEPARATOR, name)
}

/// Returns the owning type key of a member key.
pub fn owner_of(member_key: &str) -> Option<&str> {
    member_key
        .split_once(MEMBER_SEPARATOR)
        .map(|(owner, _)| owner)
}

/// Returns the member part of a member key.
pub fn member_of(member_key: &str) -> Option<&str> {
    member_key
        .split_once(MEMBER_SEPARATOR)
        .map(|(_, member)| member)
}

/// Returns the package key of a type key, or `None` for the default package.
pub fn package_of(type_key: &str) -> Option<&str> {
    type_key
        .rsplit_once(PACKAGE_SEPARATOR)
        .map(|(package, _)| package)
        .filter(|package| !package.is_empty())
}
