//! Dependency resolver
//!
//! Depth-first traversal from a root, recording every visit in a flat list
//! while carrying the chain of nodes still being expanded. Reversing the flat
//! list and keeping each node's first occurrence yields dependencies before
//! dependents.
//!
//! Revisiting a node that is already fully expanded is expected; revisiting
//! one on the current chain is a cycle.

use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;
use tracing::{debug, instrument};

use crate::cache::SharedCache;
use crate::error::{Result, ScriptError};
use crate::index::DirectoryIndex;
use crate::node::Script;

/// Order the transitive dependencies of `root`, `root` last.
///
/// `deps_of` yields the direct dependencies of a node. The traversal is
/// generic so graph properties can be checked without a filesystem.
pub fn linearize<N, F>(root: &N, mut deps_of: F) -> Result<Vec<N>>
where
    N: Clone + Eq + Hash + Display,
    F: FnMut(&N) -> Result<Vec<N>>,
{
    let mut flat = Vec::new();
    let mut chain = vec![root.clone()];
    visit(root, &mut chain, &mut flat, &mut deps_of)?;

    flat.reverse();
    let mut seen = HashSet::new();
    flat.retain(|node| seen.insert(node.clone()));
    Ok(flat)
}

fn visit<N, F>(node: &N, chain: &mut Vec<N>, flat: &mut Vec<N>, deps_of: &mut F) -> Result<()>
where
    N: Clone + Eq + Hash + Display,
    F: FnMut(&N) -> Result<Vec<N>>,
{
    flat.push(node.clone());
    for dep in deps_of(node)? {
        if chain.contains(&dep) {
            return Err(ScriptError::CircularDependency {
                node: node.to_string(),
                chain: chain
                    .iter()
                    .chain(std::iter::once(&dep))
                    .map(ToString::to_string)
                    .collect(),
            });
        }
        chain.push(dep.clone());
        visit(&dep, chain, flat, deps_of)?;
        chain.pop();
    }
    Ok(())
}

/// Resolves scripts, optionally consulting a symbol index for requires
#[derive(Debug, Clone, Copy, Default)]
pub struct DependencyResolver<'a> {
    index: Option<&'a DirectoryIndex>,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(index: Option<&'a DirectoryIndex>) -> Self {
        Self { index }
    }

    /// Every script `root` needs, dependencies first, `root` last.
    ///
    /// Without a `cache` a fresh one is used for this call only, so repeated
    /// calls re-read shared dependencies.
    #[instrument(target = "scriptcat::resolve", skip_all, fields(root = %root))]
    pub fn resolve(&self, root: &Script, cache: Option<&mut SharedCache>) -> Result<Vec<Script>> {
        let mut scratch = SharedCache::new();
        let cache = cache.unwrap_or(&mut scratch);
        let order = linearize(root, |node: &Script| node.dependencies(cache, self.index))?;
        debug!(target: "scriptcat::resolve", count = order.len(), "resolved");
        Ok(order)
    }

    /// Resolve several roots at once: they become forced dependencies of one
    /// synthetic virtual script, which is dropped from the result.
    #[instrument(target = "scriptcat::resolve", skip_all, fields(roots = roots.len()))]
    pub fn resolve_many(
        &self,
        roots: &[Script],
        cache: Option<&mut SharedCache>,
    ) -> Result<Vec<Script>> {
        let Some(first) = roots.first() else {
            return Ok(Vec::new());
        };
        let synthetic = first.env().virtual_with_deps("", None, roots.to_vec());
        let mut order = self.resolve(&synthetic, cache)?;
        order.pop();
        Ok(order)
    }
}
