use crate::{ParserOverrides, SourceWalker, SwcParser, WalkerConfig};
use napi::bindgen_prelude::*;
use napi_derive::napi;
use serde_json::Value;

fn walker(typescript: Option<bool>) -> SourceWalker {
    SourceWalker::new(
        WalkerConfig::new()
            .parser(SwcParser::new())
            .typescript(typescript.unwrap_or(false)),
    )
}

#[napi]
pub fn parse(source: String, typescript: Option<bool>, options_json: Option<String>) -> Result<String> {
    let overrides = options_json
        .map(|s| serde_json::from_str::<ParserOverrides>(&s))
        .transpose()
        .map_err(|e| Error::from_reason(format!("invalid parser options: {}", e)))?;
    let ast = walker(typescript)
        .parse(&source, overrides.as_ref())
        .map_err(|e| Error::from_reason(format!("parse error: {}", e)))?;
    serde_json::to_string(&ast).map_err(|e| Error::from_reason(format!("serialize ast failed: {}", e)))
}

#[napi(object)]
pub struct TraverseStats {
    pub nodes_visited: u32,
}

#[napi]
pub fn traverse_ast(ast_json: String) -> Result<TraverseStats> {
    let ast: Value = serde_json::from_str(&ast_json)
        .map_err(|e| Error::from_reason(format!("invalid ast json: {}", e)))?;
    let mut nodes_visited = 0;
    crate::walk(&ast, |_, _| nodes_visited += 1);
    Ok(TraverseStats { nodes_visited })
}

/// Types of the ancestors of the node at `pointer` (RFC 6901), innermost
/// first, as reported by an ancestor walk.
#[napi]
pub fn ancestor_types(ast_json: String, pointer: String) -> Result<Vec<String>> {
    let ast: Value = serde_json::from_str(&ast_json)
        .map_err(|e| Error::from_reason(format!("invalid ast json: {}", e)))?;
    let target = ast
        .pointer(&pointer)
        .ok_or_else(|| Error::from_reason(format!("no node at {}", pointer)))?;

    let ancestry = crate::walk(&ast, |_, _| {});
    let mut types = Vec::new();
    ancestry
        .moonwalk(target, |node, _| {
            if let Some(ty) = node.get("type").and_then(Value::as_str) {
                types.push(ty.to_string());
            }
        })
        .map_err(|e| Error::from_reason(e.to_string()))?;
    Ok(types)
}
