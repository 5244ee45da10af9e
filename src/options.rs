use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Dialect {
    #[default]
    Flow,
    TypeScript,
}

impl Dialect {
    pub fn from_typescript(typescript: bool) -> Self {
        if typescript {
            Dialect::TypeScript
        } else {
            Dialect::Flow
        }
    }

    fn plugin(self) -> Plugin {
        match self {
            Dialect::Flow => Plugin::Flow,
            Dialect::TypeScript => Plugin::TypeScript,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PluginRepr", into = "PluginRepr")]
pub enum Plugin {
    Jsx,
    Flow,
    TypeScript,
    DoExpressions,
    ImportMeta,
    BigInt,
    ObjectRestSpread,
    Decorators { decorators_before_export: bool },
    ClassProperties,
    ExportDefaultFrom,
    ExportNamespaceFrom,
    AsyncGenerators,
    FunctionBind,
    FunctionSent,
    DynamicImport,
    OptionalChaining,
    NullishCoalescingOperator,
    TopLevelAwait,
    Other(String),
}

impl Plugin {
    pub fn name(&self) -> &str {
        match self {
            Plugin::Jsx => "jsx",
            Plugin::Flow => "flow",
            Plugin::TypeScript => "typescript",
            Plugin::DoExpressions => "doExpressions",
            Plugin::ImportMeta => "importMeta",
            Plugin::BigInt => "bigInt",
            Plugin::ObjectRestSpread => "objectRestSpread",
            Plugin::Decorators { .. } => "decorators",
            Plugin::ClassProperties => "classProperties",
            Plugin::ExportDefaultFrom => "exportDefaultFrom",
            Plugin::ExportNamespaceFrom => "exportNamespaceFrom",
            Plugin::AsyncGenerators => "asyncGenerators",
            Plugin::FunctionBind => "functionBind",
            Plugin::FunctionSent => "functionSent",
            Plugin::DynamicImport => "dynamicImport",
            Plugin::OptionalChaining => "optionalChaining",
            Plugin::NullishCoalescingOperator => "nullishCoalescingOperator",
            Plugin::TopLevelAwait => "topLevelAwait",
            Plugin::Other(name) => name,
        }
    }

    fn from_name(name: &str) -> Self {
        match name {
            "jsx" => Plugin::Jsx,
            "flow" => Plugin::Flow,
            "typescript" => Plugin::TypeScript,
            "doExpressions" => Plugin::DoExpressions,
            "importMeta" => Plugin::ImportMeta,
            "bigInt" => Plugin::BigInt,
            "objectRestSpread" => Plugin::ObjectRestSpread,
            "decorators" => Plugin::Decorators {
                decorators_before_export: false,
            },
            "classProperties" => Plugin::ClassProperties,
            "exportDefaultFrom" => Plugin::ExportDefaultFrom,
            "exportNamespaceFrom" => Plugin::ExportNamespaceFrom,
            "asyncGenerators" => Plugin::AsyncGenerators,
            "functionBind" => Plugin::FunctionBind,
            "functionSent" => Plugin::FunctionSent,
            "dynamicImport" => Plugin::DynamicImport,
            "optionalChaining" => Plugin::OptionalChaining,
            "nullishCoalescingOperator" => Plugin::NullishCoalescingOperator,
            "topLevelAwait" => Plugin::TopLevelAwait,
            other => Plugin::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Wire shape of a plugin: `"name"` or `["name", { ...options }]`.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PluginRepr {
    Name(String),
    WithOptions(String, Map<String, Value>),
}

impl TryFrom<PluginRepr> for Plugin {
    type Error = String;

    fn try_from(repr: PluginRepr) -> Result<Self, Self::Error> {
        match repr {
            PluginRepr::Name(name) => Ok(Plugin::from_name(&name)),
            PluginRepr::WithOptions(name, opts) if name == "decorators" => {
                let before = match opts.get("decoratorsBeforeExport") {
                    None => false,
                    Some(Value::Bool(b)) => *b,
                    Some(other) => {
                        return Err(format!("decoratorsBeforeExport must be a boolean, got {other}"))
                    }
                };
                Ok(Plugin::Decorators {
                    decorators_before_export: before,
                })
            }
            PluginRepr::WithOptions(name, _) => Ok(Plugin::from_name(&name)),
        }
    }
}

impl From<Plugin> for PluginRepr {
    fn from(plugin: Plugin) -> Self {
        match plugin {
            Plugin::Decorators {
                decorators_before_export,
            } => {
                let mut opts = Map::new();
                opts.insert(
                    "decoratorsBeforeExport".into(),
                    Value::Bool(decorators_before_export),
                );
                PluginRepr::WithOptions("decorators".into(), opts)
            }
            other => PluginRepr::Name(other.name().to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    #[default]
    Module,
    Script,
    Unambiguous,
}

/// Fully merged options, as the parser sees them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParserOptions {
    pub plugins: Vec<Plugin>,
    pub source_type: SourceType,
    pub strict_mode: bool,
    pub allow_hash_bang: bool,
    pub allow_await_outside_function: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ParserOptions {
    pub fn defaults(dialect: Dialect) -> Self {
        Self {
            plugins: vec![
                Plugin::Jsx,
                dialect.plugin(),
                Plugin::DoExpressions,
                Plugin::ImportMeta,
                Plugin::BigInt,
                Plugin::ObjectRestSpread,
                Plugin::Decorators {
                    decorators_before_export: true,
                },
                Plugin::ClassProperties,
                Plugin::ExportDefaultFrom,
                Plugin::ExportNamespaceFrom,
                Plugin::AsyncGenerators,
                Plugin::FunctionBind,
                Plugin::FunctionSent,
                Plugin::DynamicImport,
                Plugin::OptionalChaining,
                Plugin::NullishCoalescingOperator,
                Plugin::TopLevelAwait,
            ],
            source_type: SourceType::Module,
            strict_mode: true,
            allow_hash_bang: true,
            allow_await_outside_function: true,
            extra: Map::new(),
        }
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.iter().any(|p| p.name() == name)
    }

    pub fn plugin(&self, name: &str) -> Option<&Plugin> {
        self.plugins.iter().find(|p| p.name() == name)
    }

    /// Layer `overrides` on top of these options; unset fields fall through.
    pub fn merged(&self, overrides: &ParserOverrides) -> Self {
        let overrides = overrides.normalized();
        let mut extra = self.extra.clone();
        for (key, value) in &overrides.extra {
            extra.insert(key.clone(), value.clone());
        }
        Self {
            plugins: overrides
                .plugins
                .clone()
                .unwrap_or_else(|| self.plugins.clone()),
            source_type: overrides.source_type.unwrap_or(self.source_type),
            strict_mode: overrides.strict_mode.unwrap_or(self.strict_mode),
            allow_hash_bang: overrides.allow_hash_bang.unwrap_or(self.allow_hash_bang),
            allow_await_outside_function: overrides
                .allow_await_outside_function
                .unwrap_or(self.allow_await_outside_function),
            extra,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParserOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Vec<Plugin>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_type: Option<SourceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_hash_bang: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_await_outside_function: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ParserOverrides {
    pub fn plugins(mut self, plugins: Vec<Plugin>) -> Self {
        self.plugins = Some(plugins);
        self
    }

    pub fn source_type(mut self, source_type: SourceType) -> Self {
        self.source_type = Some(source_type);
        self
    }

    pub fn strict_mode(mut self, strict: bool) -> Self {
        self.strict_mode = Some(strict);
        self
    }

    pub fn allow_hash_bang(mut self, allow: bool) -> Self {
        self.allow_hash_bang = Some(allow);
        self
    }

    pub fn allow_await_outside_function(mut self, allow: bool) -> Self {
        self.allow_await_outside_function = Some(allow);
        self
    }

    /// Sets an option by its parser-facing name, e.g. `sourceType`.
    pub fn flag(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if let Some(value) = self.set_named(&key, value.into()) {
            self.extra.insert(key, value);
        }
        self
    }

    // Hands the value back when `key` is not a named option.
    fn set_named(&mut self, key: &str, value: Value) -> Option<Value> {
        match key {
            "plugins" => {
                if let Some(v) = typed(key, value) {
                    self.plugins = Some(v);
                }
            }
            "sourceType" => {
                if let Some(v) = typed(key, value) {
                    self.source_type = Some(v);
                }
            }
            "strictMode" => {
                if let Some(v) = typed(key, value) {
                    self.strict_mode = Some(v);
                }
            }
            "allowHashBang" => {
                if let Some(v) = typed(key, value) {
                    self.allow_hash_bang = Some(v);
                }
            }
            "allowAwaitOutsideFunction" => {
                if let Some(v) = typed(key, value) {
                    self.allow_await_outside_function = Some(v);
                }
            }
            _ => return Some(value),
        }
        None
    }

    fn normalized(&self) -> Self {
        let mut out = Self {
            extra: Map::new(),
            ..self.clone()
        };
        for (key, value) in &self.extra {
            if let Some(value) = out.set_named(key, value.clone()) {
                out.extra.insert(key.clone(), value);
            }
        }
        out
    }
}

fn typed<T: DeserializeOwned>(key: &str, value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(option = key, error = %e, "ignoring parser option with the wrong type");
            None
        }
    }
}
