//! Name and path derivation for generated files

use anyhow::{bail, Result};
use heck::{ToSnakeCase, ToUpperCamelCase};

/// Check that `name` is an UpperCamelCase type name
pub fn validate_type_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let starts_upper = chars.next().is_some_and(|c| c.is_ascii_uppercase());
    if !starts_upper || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        bail!(
            "'{}' is not a type name; use UpperCamelCase such as UserRepository",
            name
        );
    }
    if name.to_upper_camel_case() != name {
        bail!("'{}' is not UpperCamelCase (expected '{}')", name, name.to_upper_camel_case());
    }
    Ok(())
}

/// Check that `path` looks like `a::b::Type`
pub fn validate_path(path: &str) -> Result<()> {
    let valid = path.split("::").all(|segment| {
        let mut chars = segment.chars();
        chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    });
    if !valid || !path.contains("::") {
        bail!("'{}' is not a Rust path such as crate::entities::user::Entity", path);
    }
    Ok(())
}

/// `UserRepository` -> `User`; names equal to the suffix are kept whole
pub fn base_name<'a>(name: &'a str, suffix: &str) -> &'a str {
    match name.strip_suffix(suffix) {
        Some(base) if !base.is_empty() => base,
        _ => name,
    }
}

pub fn snake(name: &str) -> String {
    name.to_snake_case()
}

/// `User` -> `crate::entities::user::Entity`
pub fn default_entity(base: &str) -> String {
    format!("crate::entities::{}::Entity", snake(base))
}

/// `ActiveUsers` -> `crate::entities::users::Entity`
pub fn default_entity_from_last_word(base: &str) -> String {
    let snake = snake(base);
    let last = snake.rsplit('_').next().unwrap_or(snake.as_str());
    format!("crate::entities::{}::Entity", last)
}

/// `User` -> `crate::repositories::user_repository::UserRepository`
pub fn default_repository(base: &str) -> String {
    format!(
        "crate::repositories::{}_repository::{}Repository",
        snake(base),
        base
    )
}

/// `User` -> `users`
pub fn resource_segment(base: &str) -> String {
    let snake = snake(base);
    if snake.ends_with('s') {
        snake
    } else {
        format!("{}s", snake)
    }
}

/// `crate::a::B` -> (`crate::a`, `B`)
pub fn split_path(path: &str) -> Result<(String, String)> {
    validate_path(path)?;
    match path.rsplit_once("::") {
        Some((module, item)) => Ok((module.to_string(), item.to_string())),
        None => bail!("'{}' has no module part", path),
    }
}
