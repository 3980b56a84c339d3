//! Compound layout driver.
//!
//! Each nesting level is laid out as a flat graph, innermost first, so a compound node's size is
//! known (children plus padding and header) before its own level is ranked. Absolute centers are
//! then resolved top-down from the margins.

use crate::pipeline::{FlatLayout, layout_flat};
use crate::{EdgeLabel, Error, Graph, GraphLabel, Result};
use rustc_hash::FxHashMap as HashMap;

#[derive(Debug, Clone, Copy)]
struct Placed {
    size: (f64, f64),
    /// Center relative to the parent's content origin.
    center: (f64, f64),
    rank: i32,
    order: usize,
}

pub(crate) fn validate(g: &Graph) -> Result<()> {
    for id in g.nodes() {
        let Some(label) = g.node(id) else { continue };
        let valid = |v: f64| v.is_finite() && v >= 0.0;
        if !valid(label.width) || !valid(label.height) {
            return Err(Error::InvalidSize {
                node: id.to_string(),
                width: label.width,
                height: label.height,
            });
        }

        let mut cur = id;
        let mut steps = 0usize;
        while let Some(parent) = g.parent(cur) {
            if !g.has_node(parent) {
                return Err(Error::UnknownParent {
                    child: cur.to_string(),
                    parent: parent.to_string(),
                });
            }
            steps += 1;
            if parent == id || steps > g.node_count() {
                return Err(Error::ParentCycle {
                    node: id.to_string(),
                });
            }
            cur = parent;
        }
    }
    for e in g.edges() {
        for end in [&e.v, &e.w] {
            if !g.has_node(end) {
                return Err(Error::UnknownNode { node: end.clone() });
            }
        }
    }
    Ok(())
}

/// The ancestor-or-self of `id` whose parent is `level`.
fn ancestor_at<'a>(g: &'a Graph, id: &'a str, level: Option<&str>) -> Option<&'a str> {
    let mut cur = id;
    loop {
        let parent = g.parent(cur);
        if parent == level {
            return Some(cur);
        }
        cur = parent?;
    }
}

fn layout_level(
    g: &Graph,
    level: Option<&str>,
    label: &GraphLabel,
    placed: &mut HashMap<String, Placed>,
) -> (f64, f64) {
    let members: Vec<&str> = match level {
        Some(parent) => g.children(parent).iter().map(String::as_str).collect(),
        None => g.children_root(),
    };

    let mut sizes: Vec<(f64, f64)> = Vec::with_capacity(members.len());
    for &id in &members {
        let (w, h) = g.node(id).map(|n| (n.width, n.height)).unwrap_or((0.0, 0.0));
        if g.is_compound(id) {
            let (cw, ch) = layout_level(g, Some(id), label, placed);
            let pad = label.cluster_padding;
            sizes.push((
                w.max(cw + 2.0 * pad),
                h.max(ch + 2.0 * pad + label.cluster_header),
            ));
        } else {
            sizes.push((w, h));
        }
    }

    let index: HashMap<&str, usize> = members.iter().enumerate().map(|(i, &id)| (id, i)).collect();
    let edges: Vec<(usize, usize, EdgeLabel)> = g
        .edges()
        .iter()
        .filter_map(|e| {
            let v = *index.get(ancestor_at(g, &e.v, level)?)?;
            let w = *index.get(ancestor_at(g, &e.w, level)?)?;
            (v != w).then(|| (v, w, e.label.clone()))
        })
        .collect();

    let FlatLayout {
        centers,
        ranks,
        orders,
        width,
        height,
    } = layout_flat(&sizes, &edges, label);

    for (i, &id) in members.iter().enumerate() {
        placed.insert(
            id.to_string(),
            Placed {
                size: sizes[i],
                center: centers[i],
                rank: ranks[i],
                order: orders[i],
            },
        );
    }
    (width, height)
}

pub(crate) fn run(g: &mut Graph) -> Result<()> {
    validate(g)?;
    let label = g.graph().clone();
    let mut placed: HashMap<String, Placed> = HashMap::default();
    layout_level(g, None, &label, &mut placed);

    let mut absolute: HashMap<String, (f64, f64)> = HashMap::default();
    let mut queue: Vec<String> = g.children_root().into_iter().map(str::to_string).collect();
    while let Some(id) = queue.pop() {
        let Some(p) = placed.get(&id) else { continue };
        let origin = match g.parent(&id).and_then(|parent| {
            let pp = placed.get(parent)?;
            let pc = absolute.get(parent)?;
            Some((pc.0 - pp.size.0 / 2.0, pc.1 - pp.size.1 / 2.0))
        }) {
            Some((left, top)) => (
                left + label.cluster_padding,
                top + label.cluster_padding + label.cluster_header,
            ),
            None => (label.marginx, label.marginy),
        };
        absolute.insert(id.clone(), (origin.0 + p.center.0, origin.1 + p.center.1));
        queue.extend(g.children(&id).iter().cloned());
    }

    let ids: Vec<String> = g.nodes().map(str::to_string).collect();
    for id in ids {
        let (Some(p), Some(&(x, y))) = (placed.get(&id), absolute.get(&id)) else {
            continue;
        };
        let p = *p;
        if let Some(node) = g.node_mut(&id) {
            node.width = p.size.0;
            node.height = p.size.1;
            node.x = Some(x);
            node.y = Some(y);
            node.rank = Some(p.rank);
            node.order = Some(p.order);
        }
    }
    tracing::trace!(nodes = g.node_count(), edges = g.edge_count(), "layout finished");
    Ok(())
}
