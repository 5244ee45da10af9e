pub mod ancestry;
pub mod error;
pub mod options;
pub mod parser;
pub mod traverse;
pub mod walker;
#[cfg(feature = "node")]
pub mod bridge;

// Re-export selected API for consumers
pub use ancestry::Ancestry;
pub use error::{ParseError, WalkError};
pub use options::{Dialect, ParserOptions, ParserOverrides, Plugin, SourceType};
pub use parser::{SourceParser, SwcParser};
pub use traverse::{walk, Cursor, WalkControl};
pub use walker::{SourceWalker, WalkerConfig};
