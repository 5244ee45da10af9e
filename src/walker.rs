use serde_json::Value;
use tracing::debug;

use crate::ancestry::Ancestry;
use crate::error::{ParseError, WalkError};
use crate::options::{Dialect, ParserOptions, ParserOverrides};
use crate::parser::SourceParser;
use crate::traverse::{self, Cursor};

#[derive(Default)]
pub struct WalkerConfig {
    pub parser: Option<Box<dyn SourceParser>>,
    pub typescript: bool,
    pub options: ParserOverrides,
}

impl WalkerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parser(mut self, parser: impl SourceParser + 'static) -> Self {
        self.parser = Some(Box::new(parser));
        self
    }

    pub fn typescript(mut self, typescript: bool) -> Self {
        self.typescript = typescript;
        self
    }

    pub fn options(mut self, options: ParserOverrides) -> Self {
        self.options = options;
        self
    }
}

pub struct SourceWalker {
    parser: Option<Box<dyn SourceParser>>,
    parser_options: ParserOptions,
}

impl SourceWalker {
    pub fn new(config: WalkerConfig) -> Self {
        let defaults = ParserOptions::defaults(Dialect::from_typescript(config.typescript));
        Self {
            parser: config.parser,
            parser_options: defaults.merged(&config.options),
        }
    }

    pub fn parser_options(&self) -> &ParserOptions {
        &self.parser_options
    }

    /// Call-time `overrides` win over construction-time options.
    pub fn parse(&self, source: &str, overrides: Option<&ParserOverrides>) -> Result<Value, ParseError> {
        let parser = self.parser.as_deref().ok_or(ParseError::MissingParser)?;
        let options = match overrides {
            Some(overrides) => self.parser_options.merged(overrides),
            None => self.parser_options.clone(),
        };
        debug!(
            bytes = source.len(),
            source_type = ?options.source_type,
            allow_hash_bang = options.allow_hash_bang,
            "delegating parse"
        );
        parser.parse(source, &options)
    }

    pub fn walk<'a, F>(&self, tree: &'a Value, visitor: F) -> Ancestry<'a>
    where
        F: FnMut(&'a Value, &mut Cursor<'_, 'a>),
    {
        traverse::walk(tree, visitor)
    }

    /// The parsed tree only lives for the walk; look upward through
    /// [`Cursor::moonwalk`].
    pub fn walk_source<F>(&self, source: &str, visitor: F) -> Result<(), WalkError>
    where
        F: for<'a> FnMut(&'a Value, &mut Cursor<'_, 'a>),
    {
        let tree = self.parse(source, None)?;
        traverse::walk(&tree, visitor);
        Ok(())
    }
}

impl Default for SourceWalker {
    fn default() -> Self {
        Self::new(WalkerConfig::default())
    }
}
