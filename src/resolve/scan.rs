//! In-process stand-in for `protoc`: follows `import` statements through the
//! import bases without compiling anything.

use crate::errors::{HarvestError, Result};
use crate::resolve::{CompiledDescription, FileDescription, SchemaCompiler};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct ScanCompiler {
    /// Imports under this prefix that no import base provides are taken as
    /// bundled with the compiler, the way protoc ships its well-known types.
    bundled_prefix: Option<String>,
}

impl ScanCompiler {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bundled_prefix(prefix: impl Into<String>) -> Self {
        Self {
            bundled_prefix: Some(prefix.into()).filter(|p: &String| !p.is_empty()),
        }
    }

    fn is_bundled(&self, logical: &str) -> bool {
        self.bundled_prefix
            .as_deref()
            .is_some_and(|prefix| logical.starts_with(prefix))
    }
}

/// Replace comments with whitespace, leaving string literals intact.
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' | '\'' => {
                out.push(c);
                while let Some(s) = chars.next() {
                    out.push(s);
                    if s == '\\' {
                        if let Some(escaped) = chars.next() {
                            out.push(escaped);
                        }
                    } else if s == c || s == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'/') => {
                for s in chars.by_ref() {
                    if s == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for s in chars.by_ref() {
                    if prev == '*' && s == '/' {
                        break;
                    }
                    prev = s;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

/// Extract the logical paths named by `import` statements, in source order.
pub fn parse_imports(source: &str) -> Vec<String> {
    strip_comments(source)
        .split([';', '{', '}'])
        .filter_map(|statement| {
            let rest = statement.trim_start().strip_prefix("import")?;
            if !rest.starts_with(|c: char| c.is_whitespace() || c == '"' || c == '\'') {
                return None;
            }
            let rest = rest.trim_start();
            let rest = ["public", "weak"]
                .iter()
                .find_map(|modifier| rest.strip_prefix(modifier))
                .filter(|r| r.starts_with(char::is_whitespace))
                .unwrap_or(rest)
                .trim();
            let quote = rest.chars().next().filter(|&c| c == '"' || c == '\'')?;
            let inner = rest[1..].strip_suffix(quote)?;
            Some(inner.to_string())
        })
        .collect()
}

/// Logical name of a root file: its path below the first import base that
/// contains it.
fn logical_name(root: &Path, import_paths: &[PathBuf]) -> Result<String> {
    import_paths
        .iter()
        .find_map(|base| root.strip_prefix(base).ok())
        .map(|rel| {
            rel.components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/")
        })
        .ok_or_else(|| {
            HarvestError::compile(format!(
                "{} does not reside in any import path",
                root.display()
            ))
        })
}

fn find_import(logical: &str, import_paths: &[PathBuf]) -> Option<PathBuf> {
    import_paths
        .iter()
        .map(|base| base.join(logical))
        .find(|candidate| candidate.is_file())
}

impl SchemaCompiler for ScanCompiler {
    fn compile(&self, roots: &[PathBuf], import_paths: &[PathBuf]) -> Result<CompiledDescription> {
        let mut graph: DiGraph<String, ()> = DiGraph::new();
        let mut nodes: HashMap<String, NodeIndex> = HashMap::new();
        let mut imports_of: HashMap<NodeIndex, Vec<String>> = HashMap::new();
        let mut pending: VecDeque<(NodeIndex, PathBuf)> = VecDeque::new();

        for root in roots {
            let name = logical_name(root, import_paths)?;
            if !nodes.contains_key(&name) {
                let idx = graph.add_node(name.clone());
                nodes.insert(name, idx);
                pending.push_back((idx, root.clone()));
            }
        }

        while let Some((idx, physical)) = pending.pop_front() {
            let source = std::fs::read_to_string(&physical)
                .map_err(|e| HarvestError::read(&physical, e))?;
            let imports = parse_imports(&source);
            for import in &imports {
                let target = match nodes.get(import) {
                    Some(&existing) => existing,
                    None => {
                        let found = find_import(import, import_paths);
                        if found.is_none() && !self.is_bundled(import) {
                            return Err(HarvestError::Compile {
                                message: format!("unresolved import in {}", graph[idx]),
                                diagnostics: format!(
                                    "{}: Import \"{import}\" was not found.",
                                    graph[idx]
                                ),
                            });
                        }
                        let new_idx = graph.add_node(import.clone());
                        nodes.insert(import.clone(), new_idx);
                        if let Some(found) = found {
                            pending.push_back((new_idx, found));
                        }
                        new_idx
                    }
                };
                graph.update_edge(idx, target, ());
            }
            imports_of.insert(idx, imports);
        }

        // Dependencies before dependents, the order protoc emits.
        let order = petgraph::algo::toposort(&graph, None).map_err(|cycle| {
            HarvestError::compile(format!(
                "{} recursively imports itself",
                graph[cycle.node_id()]
            ))
        })?;
        let files = order
            .into_iter()
            .rev()
            .map(|idx| FileDescription {
                name: graph[idx].clone(),
                dependencies: imports_of.remove(&idx).unwrap_or_default(),
            })
            .collect();
        Ok(CompiledDescription { files })
    }
}
