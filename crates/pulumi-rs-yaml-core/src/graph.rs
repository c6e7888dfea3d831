//! Dependency Extractor & Topological Sorter (spec component 5).
//!
//! Walks a bound [`TemplateDecl`], computes the set of declaration names
//! each config/variable/resource/output transitively references, and
//! orders them with a depth-first topological sort. Ties are broken by
//! **source order** — the order declarations appear in the YAML document —
//! not by name, so the importer and generator see a deterministic,
//! human-readable order.

use std::collections::{HashMap, HashSet};

use crate::ast::expr::Expr;
use crate::ast::template::{ResourceOptionsDecl, ResourceProperties, TemplateDecl};
use crate::diag::Diagnostics;

/// A node in the dependency graph: one config, variable, resource, or output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub usize);

/// The dependency graph over a template's declarations.
///
/// Node 0..n are assigned in source order as declarations are collected:
/// configs first, then variables, then resources, then outputs — matching
/// the order they're gathered from the template, which is itself the
/// order `ast::parse` appended them from the document.
pub struct DependencyGraph {
    /// Declaration names in node-index order.
    pub names: Vec<String>,
    /// Forward edges: `edges[i]` is the set of node indices that node `i`
    /// depends on (i.e. must be emitted before it).
    edges: Vec<HashSet<NodeIndex>>,
    index_of: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Builds the dependency graph for `template`.
    ///
    /// Node order (and thus tie-break order) is: configs, variables,
    /// resources, outputs, each in the order they appear in the document.
    pub fn build(template: &TemplateDecl<'_>) -> Self {
        let mut names = Vec::new();
        let mut index_of = HashMap::new();

        for c in &template.config {
            index_of.insert(c.key.to_string(), NodeIndex(names.len()));
            names.push(c.key.to_string());
        }
        for v in &template.variables {
            index_of.insert(v.key.to_string(), NodeIndex(names.len()));
            names.push(v.key.to_string());
        }
        for r in &template.resources {
            index_of.insert(r.logical_name.to_string(), NodeIndex(names.len()));
            names.push(r.logical_name.to_string());
        }
        for o in &template.outputs {
            index_of.insert(o.key.to_string(), NodeIndex(names.len()));
            names.push(o.key.to_string());
        }

        let mut edges = vec![HashSet::new(); names.len()];

        let mut add_deps_from_expr = |idx: NodeIndex, expr: &Expr<'_>| {
            let mut deps = HashSet::new();
            collect_expr_deps(expr, &mut deps);
            for dep in deps {
                if let Some(&dep_idx) = index_of.get(&dep) {
                    if dep_idx != idx {
                        edges[idx.0].insert(dep_idx);
                    }
                }
            }
        };

        for c in &template.config {
            let idx = index_of[c.key.as_ref()];
            if let Some(default) = &c.param.default {
                add_deps_from_expr(idx, default);
            }
            if let Some(value) = &c.param.value {
                add_deps_from_expr(idx, value);
            }
        }
        for v in &template.variables {
            let idx = index_of[v.key.as_ref()];
            add_deps_from_expr(idx, &v.value);
        }
        for r in &template.resources {
            let idx = index_of[r.logical_name.as_ref()];
            match &r.resource.properties {
                ResourceProperties::Map(entries) => {
                    for entry in entries {
                        add_deps_from_expr(idx, &entry.value);
                    }
                }
                ResourceProperties::Expr(expr) => add_deps_from_expr(idx, expr),
            }
            if let Some(get) = &r.resource.get {
                add_deps_from_expr(idx, &get.id);
                for entry in &get.state {
                    add_deps_from_expr(idx, &entry.value);
                }
            }
            collect_option_deps(&r.resource.options, &mut |expr| add_deps_from_expr(idx, expr));
        }
        for o in &template.outputs {
            let idx = index_of[o.key.as_ref()];
            add_deps_from_expr(idx, &o.value);
        }

        Self { names, edges, index_of }
    }

    /// Looks up a declaration's node index by its logical name.
    pub fn index_of(&self, name: &str) -> Option<NodeIndex> {
        self.index_of.get(name).copied()
    }

    /// Performs a source-order-stable depth-first topological sort.
    ///
    /// Returns node indices in an order where every edge points forward
    /// (dependencies before dependents). On a cycle, returns the full cycle
    /// path (in declaration order) as an error instead.
    pub fn topo_sort(&self) -> Result<Vec<NodeIndex>, Vec<NodeIndex>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        let n = self.names.len();
        let mut mark = vec![Mark::Unvisited; n];
        let mut order = Vec::with_capacity(n);
        let mut stack = Vec::new();

        fn visit(
            i: usize,
            edges: &[HashSet<NodeIndex>],
            mark: &mut [Mark],
            order: &mut Vec<NodeIndex>,
            stack: &mut Vec<usize>,
        ) -> Result<(), Vec<NodeIndex>> {
            match mark[i] {
                Mark::Done => return Ok(()),
                Mark::InProgress => {
                    let pos = stack.iter().position(|&s| s == i).unwrap_or(0);
                    let cycle = stack[pos..]
                        .iter()
                        .chain(std::iter::once(&i))
                        .map(|&x| NodeIndex(x))
                        .collect();
                    return Err(cycle);
                }
                Mark::Unvisited => {}
            }

            mark[i] = Mark::InProgress;
            stack.push(i);

            let mut deps: Vec<usize> = edges[i].iter().map(|n| n.0).collect();
            deps.sort_unstable();
            for dep in deps {
                visit(dep, edges, mark, order, stack)?;
            }

            stack.pop();
            mark[i] = Mark::Done;
            order.push(NodeIndex(i));
            Ok(())
        }

        for i in 0..n {
            visit(i, &self.edges, &mut mark, &mut order, &mut stack)?;
        }

        Ok(order)
    }

    /// Runs [`Self::topo_sort`] and, on a cycle, records a single diagnostic
    /// naming every declaration in the cycle, in declaration order.
    pub fn topo_sort_or_report(&self, diags: &mut Diagnostics) -> Option<Vec<NodeIndex>> {
        match self.topo_sort() {
            Ok(order) => Some(order),
            Err(cycle) => {
                let names: Vec<&str> = cycle.iter().map(|i| self.names[i.0].as_str()).collect();
                diags.error(
                    None,
                    format!("circular reference: {}", names.join(" -> ")),
                    "",
                );
                None
            }
        }
    }
}

/// Collects every declaration name an expression transitively references:
/// the root of every `Symbol`/`Interpolate` property access, recursing
/// through builtin-form arguments.
fn collect_expr_deps(expr: &Expr<'_>, deps: &mut HashSet<String>) {
    match expr {
        Expr::Symbol(_, access) => {
            if access.root_name() != "pulumi" {
                deps.insert(access.root_name().to_string());
            }
        }
        Expr::Interpolate(_, parts) => {
            for part in parts {
                if let Some(access) = &part.value {
                    if access.root_name() != "pulumi" {
                        deps.insert(access.root_name().to_string());
                    }
                }
            }
        }
        Expr::List(_, items) => {
            for item in items {
                collect_expr_deps(item, deps);
            }
        }
        Expr::Object(_, entries) => {
            for entry in entries {
                collect_expr_deps(&entry.key, deps);
                collect_expr_deps(&entry.value, deps);
            }
        }
        Expr::Invoke(_, invoke) => {
            if let Some(args) = &invoke.call_args {
                collect_expr_deps(args, deps);
            }
            if let Some(parent) = &invoke.call_opts.parent {
                collect_expr_deps(parent, deps);
            }
            if let Some(provider) = &invoke.call_opts.provider {
                collect_expr_deps(provider, deps);
            }
            if let Some(depends_on) = &invoke.call_opts.depends_on {
                collect_expr_deps(depends_on, deps);
            }
        }
        Expr::StackReference(_, sref) => {
            collect_expr_deps(&sref.stack_name, deps);
            if let Some(p) = &sref.property_name {
                collect_expr_deps(p, deps);
            }
        }
        Expr::Join(_, a, b) | Expr::Select(_, a, b) | Expr::Split(_, a, b) => {
            collect_expr_deps(a, deps);
            collect_expr_deps(b, deps);
        }
        Expr::ToJson(_, inner)
        | Expr::ToBase64(_, inner)
        | Expr::FromBase64(_, inner)
        | Expr::Secret(_, inner)
        | Expr::ReadFile(_, inner)
        | Expr::StringAsset(_, inner)
        | Expr::FileAsset(_, inner)
        | Expr::RemoteAsset(_, inner)
        | Expr::FileArchive(_, inner)
        | Expr::RemoteArchive(_, inner) => collect_expr_deps(inner, deps),
        Expr::AssetArchive(_, entries) => {
            for (_, v) in entries {
                collect_expr_deps(v, deps);
            }
        }
        Expr::Null(_) | Expr::Bool(_, _) | Expr::Number(_, _) | Expr::String(_, _) => {}
    }
}

/// Collects explicit dependency-contributing options: `dependsOn`,
/// `parent`, `provider`, `providers`, `deletedWith`.
fn collect_option_deps<'a>(
    opts: &'a ResourceOptionsDecl<'_>,
    visit: &mut dyn FnMut(&'a Expr<'_>),
) {
    if let Some(e) = &opts.depends_on {
        visit(e);
    }
    if let Some(e) = &opts.parent {
        visit(e);
    }
    if let Some(e) = &opts.provider {
        visit(e);
    }
    if let Some(e) = &opts.providers {
        visit(e);
    }
    if let Some(e) = &opts.deleted_with {
        visit(e);
    }
}
