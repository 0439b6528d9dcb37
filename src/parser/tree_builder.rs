use super::tokenizer::{Token, TokenKind};
use crate::NodeMap;
use crate::ast::{Child, Fragment, HostNode};
use crate::error::{ErrorKind, InterpolateError};

/// Builds an output tree from a token stream
pub struct TreeBuilder<'a, N> {
    nodes: &'a NodeMap<N>,
}

impl<'a, N: HostNode> TreeBuilder<'a, N> {
    pub fn new(nodes: &'a NodeMap<N>) -> Self {
        Self { nodes }
    }

    pub fn build(&self, tokens: &[Token]) -> Result<Fragment<N>, InterpolateError> {
        Ok(Fragment::new(self.gather_children(tokens)?))
    }

    /// Build one nesting level. Each open marker is resolved in place: its
    /// content up to the matching close becomes the node's children, and the
    /// scan resumes after the close as a sibling continuation.
    fn gather_children(&self, tokens: &[Token]) -> Result<Vec<Child<N>>, InterpolateError> {
        let mut children = Vec::new();
        let mut index = 0;

        while index < tokens.len() {
            let token = &tokens[index];
            match token.kind {
                TokenKind::Text => {
                    children.push(Child::Text(token.value.clone()));
                }
                // Closes are consumed by their opener; one reached here has none
                TokenKind::Close => {
                    return Err(InterpolateError::new(
                        ErrorKind::UnmatchedClose,
                        format!("Missing opening component token: `{}`", token.value),
                    )
                    .with_span(token.span)
                    .with_help(format!("Open `{}` before closing it, or remove this marker", token.value)));
                }
                TokenKind::SelfClosing => {
                    let node = self.lookup(token)?;
                    children.push(Child::Node(node.clone()));
                }
                TokenKind::Open => {
                    let node = self.lookup(token)?;
                    let close_index = find_close_index(tokens, index)?;
                    let grandchildren = self.build(&tokens[index + 1..close_index])?;
                    children.push(Child::Node(node.with_children(grandchildren)));
                    index = close_index;
                }
            }
            index += 1;
        }

        Ok(children)
    }

    fn lookup(&self, token: &Token) -> Result<&'a N, InterpolateError> {
        self.nodes
            .get(&token.value)
            .and_then(Option::as_ref)
            .ok_or_else(|| {
                InterpolateError::new(
                    ErrorKind::MissingNode,
                    format!("Invalid interpolation, missing component node: `{}`", token.value),
                )
                .with_span(token.span)
                .with_help(format!("Add a node named `{}` to the components", token.value))
            })
    }
}

/// Find the close marker matching the open marker at `open_index`.
///
/// Only markers with the same name are counted: a same-name open enters a
/// nested region, a same-name close at depth zero is the match. Markers with
/// other names may overlap freely.
pub fn find_close_index(tokens: &[Token], open_index: usize) -> Result<usize, InterpolateError> {
    let open = &tokens[open_index];
    let mut depth = 0usize;

    for (index, token) in tokens.iter().enumerate().skip(open_index + 1) {
        if token.value != open.value {
            continue;
        }
        match token.kind {
            TokenKind::Open => depth += 1,
            TokenKind::Close if depth == 0 => return Ok(index),
            TokenKind::Close => depth -= 1,
            TokenKind::Text | TokenKind::SelfClosing => {}
        }
    }

    Err(InterpolateError::new(
        ErrorKind::MissingClose,
        format!("Missing closing component token `{}`", open.value),
    )
    .with_related(open.span)
    .with_related_label("opened here")
    .with_help(format!("Close `{}` after its content", open.value)))
}
