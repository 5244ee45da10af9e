use serde_json::Value;
use swc_common::{BytePos, Spanned};
use swc_ecma_parser::{EsConfig, Parser, StringInput, Syntax, TsConfig};
use tracing::{debug, warn};

use crate::error::ParseError;
use crate::options::{ParserOptions, Plugin, SourceType};

/// Turns source text into a tree: objects are nodes, arrays are sequences.
pub trait SourceParser {
    fn parse(&self, source: &str, options: &ParserOptions) -> Result<Value, ParseError>;
}

impl<F> SourceParser for F
where
    F: Fn(&str, &ParserOptions) -> Result<Value, ParseError>,
{
    fn parse(&self, source: &str, options: &ParserOptions) -> Result<Value, ParseError> {
        self(source, options)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SwcParser;

impl SwcParser {
    pub fn new() -> Self {
        SwcParser
    }
}

// Plugins that map onto an SWC syntax switch.
const TOGGLED: &[&str] = &[
    "jsx",
    "flow",
    "typescript",
    "decorators",
    "functionBind",
    "exportDefaultFrom",
];

// Plugins SWC always understands, so there is nothing to toggle for them.
const ALWAYS_ON: &[&str] = &[
    "doExpressions",
    "importMeta",
    "bigInt",
    "objectRestSpread",
    "classProperties",
    "exportNamespaceFrom",
    "asyncGenerators",
    "functionSent",
    "dynamicImport",
    "optionalChaining",
    "nullishCoalescingOperator",
    "topLevelAwait",
];

fn syntax_for(options: &ParserOptions) -> Syntax {
    let jsx = options.has_plugin("jsx");
    let (decorators, decorators_before_export) = match options.plugin("decorators") {
        Some(Plugin::Decorators {
            decorators_before_export,
        }) => (true, *decorators_before_export),
        _ => (false, false),
    };

    for plugin in &options.plugins {
        let name = plugin.name();
        if !TOGGLED.contains(&name) && !ALWAYS_ON.contains(&name) {
            warn!(plugin = %name, "swc: ignoring unsupported plugin");
        }
    }

    let allow_return = options
        .extra
        .get("allowReturnOutsideFunction")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if options.has_plugin("typescript") {
        if allow_return {
            warn!("swc: allowReturnOutsideFunction is not available for typescript, ignoring");
        }
        Syntax::Typescript(TsConfig {
            tsx: jsx,
            decorators,
            dts: false,
            no_early_errors: true,
            ..Default::default()
        })
    } else {
        if options.has_plugin("flow") {
            warn!("swc: flow annotations are unsupported, parsing as plain ECMAScript");
        }
        Syntax::Es(EsConfig {
            jsx,
            decorators,
            decorators_before_export,
            fn_bind: options.has_plugin("functionBind"),
            export_default_from: options.has_plugin("exportDefaultFrom"),
            allow_return_outside_function: allow_return,
            ..Default::default()
        })
    }
}

// Positions start at 1; 0 is reserved for dummy spans.
fn end_pos(len: usize) -> Result<BytePos, ParseError> {
    u32::try_from(len)
        .ok()
        .and_then(|len| len.checked_add(1))
        .map(BytePos)
        .ok_or(ParseError::TooLarge(len))
}

fn into_parse_error(err: swc_ecma_parser::error::Error) -> ParseError {
    let offset = err.span().lo.0.checked_sub(1).map(|lo| lo as usize);
    ParseError::syntax(err.kind().msg(), offset)
}

impl SourceParser for SwcParser {
    fn parse(&self, source: &str, options: &ParserOptions) -> Result<Value, ParseError> {
        if !options.allow_hash_bang && source.starts_with("#!") {
            return Err(ParseError::HashBang);
        }

        debug!(
            source_type = ?options.source_type,
            plugins = options.plugins.len(),
            "swc: parsing source"
        );

        let input = StringInput::new(source, BytePos(1), end_pos(source.len())?);
        let mut parser = Parser::new(syntax_for(options), input, None);

        let program = match options.source_type {
            SourceType::Module => parser.parse_module().map(|m| serde_json::to_value(&m)),
            SourceType::Script => parser.parse_script().map(|s| serde_json::to_value(&s)),
            SourceType::Unambiguous => parser.parse_program().map(|p| serde_json::to_value(&p)),
        }
        .map_err(into_parse_error)?;

        // Recovered errors still mean the source is malformed: no partial tree.
        if let Some(err) = parser.take_errors().into_iter().next() {
            return Err(into_parse_error(err));
        }

        program.map_err(|e| ParseError::Serialize(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{Dialect, ParserOverrides};

    fn ts() -> ParserOptions {
        ParserOptions::defaults(Dialect::TypeScript)
    }

    fn flow() -> ParserOptions {
        ParserOptions::defaults(Dialect::Flow)
    }

    fn contains_type(value: &Value, ty: &str) -> bool {
        match value {
            Value::Object(map) => {
                map.get("type").and_then(Value::as_str) == Some(ty)
                    || map.values().any(|v| contains_type(v, ty))
            }
            Value::Array(items) => items.iter().any(|v| contains_type(v, ty)),
            _ => false,
        }
    }

    #[test]
    fn test_parse_module() {
        let ast = SwcParser::new().parse("const a = 1;", &flow()).unwrap();
        assert_eq!(ast["type"], "Module");
        assert!(contains_type(&ast, "VariableDeclaration"));
    }

    #[test]
    fn test_parse_script() {
        let opts = flow().merged(&ParserOverrides::default().source_type(SourceType::Script));
        let ast = SwcParser::new().parse("var a = 1;", &opts).unwrap();
        assert_eq!(ast["type"], "Script");
    }

    #[test]
    fn test_typescript_dialect_accepts_annotations() {
        let source = "let x: number = 1;";
        assert!(SwcParser::new().parse(source, &ts()).is_ok());
        assert!(SwcParser::new().parse(source, &flow()).is_err());
    }

    #[test]
    fn test_jsx_enabled_by_default() {
        let ast = SwcParser::new().parse("const el = <div />;", &ts()).unwrap();
        assert!(contains_type(&ast, "JSXElement"));
    }

    #[test]
    fn test_syntax_error() {
        let err = SwcParser::new().parse("const = ;", &flow()).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
    }

    #[test]
    fn test_hashbang() {
        let source = "#!/usr/bin/env node\nlet a = 1;";
        assert!(SwcParser::new().parse(source, &flow()).is_ok());

        let strict = flow().merged(&ParserOverrides::default().allow_hash_bang(false));
        let err = SwcParser::new().parse(source, &strict).unwrap_err();
        assert!(matches!(err, ParseError::HashBang));
    }

    #[test]
    fn test_unambiguous_source_type() {
        let opts = flow().merged(&ParserOverrides::default().source_type(SourceType::Unambiguous));
        let module = SwcParser::new().parse("import a from 'a';", &opts).unwrap();
        assert_eq!(module["type"], "Module");
        let script = SwcParser::new().parse("var a = 1;", &opts).unwrap();
        assert_eq!(script["type"], "Script");
    }

    #[test]
    fn test_plugins_map_onto_es_switches() {
        let Syntax::Es(cfg) = syntax_for(&flow()) else {
            panic!("flow dialect should use the ES syntax");
        };
        assert!(cfg.jsx);
        assert!(cfg.decorators);
        assert!(cfg.decorators_before_export);
        assert!(cfg.fn_bind);
        assert!(cfg.export_default_from);

        let opts = flow().merged(&ParserOverrides::default().plugins(vec![Plugin::Decorators {
            decorators_before_export: false,
        }]));
        let Syntax::Es(cfg) = syntax_for(&opts) else {
            panic!("flow dialect should use the ES syntax");
        };
        assert!(cfg.decorators);
        assert!(!cfg.decorators_before_export);
        assert!(!cfg.jsx);
        assert!(!cfg.fn_bind);
        assert!(!cfg.export_default_from);
    }

    #[test]
    fn test_function_bind() {
        let source = "a::b;";
        assert!(SwcParser::new().parse(source, &flow()).is_ok());

        let without = flow().merged(&ParserOverrides::default().plugins(vec![Plugin::Jsx]));
        assert!(SwcParser::new().parse(source, &without).is_err());
    }

    #[test]
    fn test_export_default_from() {
        let source = "export v from 'm';";
        assert!(SwcParser::new().parse(source, &flow()).is_ok());

        let without = flow().merged(&ParserOverrides::default().plugins(vec![Plugin::Jsx]));
        assert!(SwcParser::new().parse(source, &without).is_err());
    }

    #[test]
    fn test_return_outside_function() {
        let script = flow().merged(&ParserOverrides::default().source_type(SourceType::Script));
        assert!(SwcParser::new().parse("return 1;", &script).is_err());

        let allowed = script.merged(&ParserOverrides::default().flag("allowReturnOutsideFunction", true));
        assert!(SwcParser::new().parse("return 1;", &allowed).is_ok());
    }

    #[test]
    fn test_end_pos() {
        assert_eq!(end_pos(10).unwrap(), BytePos(11));
        assert!(matches!(end_pos(u32::MAX as usize), Err(ParseError::TooLarge(_))));
    }

    #[test]
    fn test_closure_parser() {
        let parser = |src: &str, _: &ParserOptions| -> Result<Value, ParseError> {
            Ok(serde_json::json!({ "type": "Program", "len": src.len() }))
        };
        let ast = parser.parse("abc", &flow()).unwrap();
        assert_eq!(ast["len"], 3);
    }
}
