//! Weakly-connected component decomposition.

use petgraph::unionfind::UnionFind;

/// A maximal weakly-connected set of vertices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    vertices: Vec<usize>,
    min_original_index: usize,
}

impl Component {
    /// Vertices of the component, ascending.
    #[must_use]
    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }

    /// Number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Always false: a component holds at least one vertex.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Smallest `original_index` among the component's vertices.
    #[must_use]
    pub fn min_original_index(&self) -> usize {
        self.min_original_index
    }

    /// Whether vertex `v` belongs to the component.
    #[must_use]
    pub fn contains(&self, v: usize) -> bool {
        self.vertices.binary_search(&v).is_ok()
    }
}

/// Partitions `0..vertex_count` into weak components, ignoring edge direction.
///
/// Components are ordered by descending size, then by ascending smallest
/// original index.
pub(crate) fn weak_components<E, L>(vertex_count: usize, edges: E, label: L) -> Vec<Component>
where
    E: IntoIterator<Item = (usize, usize)>,
    L: Fn(usize) -> usize,
{
    let mut sets = UnionFind::<usize>::new(vertex_count);
    for (s, t) in edges {
        sets.union(s, t);
    }

    let roots = sets.into_labeling();
    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); vertex_count];
    for (v, &root) in roots.iter().enumerate() {
        groups[root].push(v);
    }

    let mut components: Vec<Component> = groups
        .into_iter()
        .filter(|vertices| !vertices.is_empty())
        .map(|vertices| {
            let min_original_index = vertices.iter().map(|&v| label(v)).min().unwrap_or(0);
            Component {
                vertices,
                min_original_index,
            }
        })
        .collect();

    components.sort_by(|a, b| {
        b.len()
            .cmp(&a.len())
            .then_with(|| a.min_original_index.cmp(&b.min_original_index))
    });
    components
}
