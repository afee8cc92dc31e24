use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::str::FromStr;

use anyhow::Result;

/// Where configuration values come from.
///
/// Empty values are treated as unset so that `KEY=` in a config file falls
/// back to the default the same way a missing key does.
pub trait ConfigSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct Env;

impl ConfigSource for Env {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|value| !value.is_empty())
    }
}

impl<K, V> ConfigSource for HashMap<K, V>
where
    K: Borrow<str> + Eq + Hash,
    V: AsRef<str>,
{
    fn var(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(|value| value.as_ref().to_owned())
            .filter(|value| !value.is_empty())
    }
}

/// Trait for building configuration structs
///
/// Implementors read every value through a [`ConfigSource`], which keeps
/// the process environment out of tests.
pub trait ConfigBuilder: Clone + Send + Sync + 'static {
    fn build_from(source: &dyn ConfigSource) -> Result<Self>;

    fn build() -> Result<Self> {
        Self::build_from(&Env)
    }
}

/// Reads `key`, logging and falling back to `default` when it is unset.
pub fn string_or(source: &dyn ConfigSource, key: &str, default: &str) -> String {
    source.var(key).unwrap_or_else(|| {
        tracing::warn!("cannot read `{key}` defaulting to `{default}`");

        default.to_owned()
    })
}

/// Reads and parses `key`. Both a missing and an unparsable value fall back
/// to `default`.
pub fn parse_or<T>(source: &dyn ConfigSource, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Debug,
{
    let Some(raw) = source.var(key) else {
        tracing::warn!("cannot read `{key}` defaulting to `{default}`");

        return default;
    };

    raw.parse().unwrap_or_else(|err| {
        tracing::error!("cannot parse `{key}`. defaulting to {default} {:?}", err);
        default
    })
}

/// Reads `key` without logging its value. Used for passwords, which may be
/// legitimately empty but must never appear in logs.
pub fn secret_or_empty(source: &dyn ConfigSource, key: &str) -> String {
    source.var(key).unwrap_or_else(|| {
        tracing::warn!("cannot read `{key}` defaulting to an empty value");

        String::new()
    })
}

/// Reads a value that has no default.
pub fn required(source: &dyn ConfigSource, key: &str) -> Result<String> {
    source
        .var(key)
        .ok_or_else(|| anyhow::anyhow!("cannot read `{key}`: it is required and has no default"))
}
