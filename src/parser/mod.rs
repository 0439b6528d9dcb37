pub mod tokenizer;
mod tree_builder;

pub use tokenizer::{Position, Span, Token, TokenKind, Tokenizer, tokenize};
pub use tree_builder::{TreeBuilder, find_close_index};

use crate::NodeMap;
use crate::ast::{Fragment, HostNode};
use crate::error::InterpolateError;
use crate::tags::Tags;

/// Tokenize `source` and build its tree against `nodes`
pub fn parse<N: HostNode>(
    source: &str,
    tags: &Tags,
    nodes: &NodeMap<N>,
) -> Result<Fragment<N>, InterpolateError> {
    let tokens = tokenize(source, tags)?;
    TreeBuilder::new(nodes).build(&tokens)
}
