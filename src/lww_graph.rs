use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, trace};

use crate::clock::{Clock, Timestamp};
use crate::lww_set::LWWSet;
use crate::{Crdt, Error, Result};

type Adjacency<T> = HashMap<T, Arc<LWWSet<T>>>;

/// A last-writer-wins undirected graph (LWW-Graph).
///
/// Vertices live in an [`LWWSet`]. Each vertex owns an adjacency [`LWWSet`] of
/// its neighbors, and an edge `(u, v)` exists only while `v` is in the
/// adjacency set of `u` and `u` is in the adjacency set of `v`.
///
/// Adding an edge requires both endpoints to be present. Removing an edge
/// never does: a removal is a tombstone, and tombstones must be recordable in
/// any order for merges to commute. Removing a vertex leaves its incident
/// edges in place.
///
/// Mutations without an explicit timestamp are stamped by the graph's
/// [`Clock`].
///
/// # Concurrency
///
/// Every set synchronizes itself, and the adjacency map has its own lock, so
/// all operations take `&self`. [`add_edge`](Self::add_edge) checks its
/// endpoints before taking the adjacency lock: a concurrent
/// [`remove_vertex`](Self::remove_vertex) may slip in between and leave an
/// edge to an absent vertex. Such an edge is an ordinary LWW state and
/// converges like any other.
///
/// # Example
///
/// ```
/// use lww_crdt::prelude::*;
///
/// let g = LWWGraph::new();
/// g.add_vertex("A");
/// g.add_vertex("B");
/// g.add_vertex("C");
/// g.add_edge("A", "B").unwrap();
/// g.add_edge("B", "C").unwrap();
///
/// assert_eq!(g.find_path(&"A", &"C").unwrap(), vec!["A", "B", "C"]);
/// assert!(!g.edge_exists(&"A", &"C"));
/// ```
#[derive(Debug)]
pub struct LWWGraph<T: Eq + Hash> {
    vertices: LWWSet<T>,
    edges: RwLock<Adjacency<T>>,
    clock: Clock,
}

impl<T: Eq + Hash> LWWGraph<T> {
    /// Create an empty graph stamped by the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Clock::new())
    }

    /// Create an empty graph stamped by `clock`.
    #[must_use]
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            vertices: LWWSet::new(),
            edges: RwLock::new(HashMap::new()),
            clock,
        }
    }

    fn read_edges(&self) -> RwLockReadGuard<'_, Adjacency<T>> {
        self.edges.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_edges(&self) -> RwLockWriteGuard<'_, Adjacency<T>> {
        self.edges.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Check if `vertex` is currently in the graph.
    #[must_use]
    pub fn vertex_exists(&self, vertex: &T) -> bool {
        self.vertices.exists(vertex)
    }

    /// Check if the edge `(u, v)` exists in both directions.
    ///
    /// Returns `false` if either vertex has never had an edge recorded.
    #[must_use]
    pub fn edge_exists(&self, u: &T, v: &T) -> bool {
        let edges = self.read_edges();
        let forward = edges.get(u).is_some_and(|adj| adj.exists(v));
        forward && edges.get(v).is_some_and(|adj| adj.exists(u))
    }

    /// The vertex set.
    #[must_use]
    pub fn vertices(&self) -> &LWWSet<T> {
        &self.vertices
    }

    /// The clock stamping this replica's local operations.
    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }
}

impl<T: Eq + Hash + Clone> LWWGraph<T> {
    /// Add `vertex` at the current time.
    pub fn add_vertex(&self, vertex: T) {
        self.add_vertex_with_timestamp(vertex, self.clock.now());
    }

    /// Add `vertex` at an explicit timestamp.
    pub fn add_vertex_with_timestamp(&self, vertex: T, timestamp: Timestamp) {
        self.vertices.add(vertex, timestamp);
    }

    /// Remove `vertex` at the current time. Incident edges are kept.
    pub fn remove_vertex(&self, vertex: T) {
        self.remove_vertex_with_timestamp(vertex, self.clock.now());
    }

    /// Remove `vertex` at an explicit timestamp.
    pub fn remove_vertex_with_timestamp(&self, vertex: T, timestamp: Timestamp) {
        self.vertices.remove(vertex, timestamp);
    }

    /// All vertices currently in the graph, in unspecified order.
    #[must_use]
    pub fn get_all_vertices(&self) -> Vec<T> {
        self.vertices.get()
    }

    /// Adjacency set of `vertex`, created empty if it has none yet.
    fn adjacency_entry(edges: &mut Adjacency<T>, vertex: &T) -> Arc<LWWSet<T>> {
        if let Some(adj) = edges.get(vertex) {
            return Arc::clone(adj);
        }
        Arc::clone(edges.entry(vertex.clone()).or_default())
    }

    /// Adjacency sets of both endpoints, created under one lock acquisition.
    fn adjacency_pair(&self, u: &T, v: &T) -> (Arc<LWWSet<T>>, Arc<LWWSet<T>>) {
        let mut edges = self.write_edges();
        (
            Self::adjacency_entry(&mut edges, u),
            Self::adjacency_entry(&mut edges, v),
        )
    }

    /// Remove the edge `(u, v)` at the current time.
    pub fn remove_edge(&self, u: T, v: T) {
        self.remove_edge_with_timestamp(u, v, self.clock.now());
    }

    /// Remove the edge `(u, v)` at an explicit timestamp.
    ///
    /// Neither the edge nor its endpoints need to exist; the removal is
    /// recorded as a tombstone either way. Unlike
    /// [`add_edge_with_timestamp`](Self::add_edge_with_timestamp) this has
    /// no failure case, so it returns nothing.
    pub fn remove_edge_with_timestamp(&self, u: T, v: T, timestamp: Timestamp) {
        let (from, to) = self.adjacency_pair(&u, &v);
        from.remove(v.clone(), timestamp);
        to.remove(u, timestamp);
    }

    fn neighbors(&self, vertex: &T) -> Vec<T> {
        let adj = self.read_edges().get(vertex).cloned();
        adj.map(|adj| adj.get()).unwrap_or_default()
    }

    /// Merge a peer replica into this one.
    ///
    /// Vertex sets are merged, then every adjacency set of the peer is merged
    /// into the local set for the same vertex, or copied if there is none.
    ///
    /// # Errors
    ///
    /// [`Error::NilPeer`] if `other` is `None`.
    pub fn merge_peer(&self, other: Option<&Self>) -> Result<()> {
        let other = other.ok_or(Error::NilPeer)?;
        self.vertices.merge(&other.vertices)?;

        // Release the peer's lock before touching ours.
        let peer_edges: Vec<(T, Arc<LWWSet<T>>)> = other
            .read_edges()
            .iter()
            .map(|(vertex, adj)| (vertex.clone(), Arc::clone(adj)))
            .collect();

        let mut adopted = 0;
        for (vertex, peer_adj) in peer_edges {
            let local = match self.write_edges().entry(vertex) {
                Entry::Occupied(entry) => Some(Arc::clone(entry.get())),
                Entry::Vacant(entry) => {
                    entry.insert(Arc::new(peer_adj.as_ref().clone()));
                    adopted += 1;
                    None
                }
            };
            if let Some(local) = local {
                local.merge(&peer_adj)?;
            }
        }

        debug!(adopted, "merged lww graph");
        Ok(())
    }
}

impl<T: Eq + Hash + Clone + fmt::Debug> LWWGraph<T> {
    fn require_vertex(&self, vertex: &T) -> Result<()> {
        if self.vertex_exists(vertex) {
            Ok(())
        } else {
            Err(Error::MissingVertex(format!("{vertex:?}")))
        }
    }

    /// Add the edge `(u, v)` at the current time.
    ///
    /// # Errors
    ///
    /// [`Error::MissingVertex`] if either endpoint is not in the graph.
    pub fn add_edge(&self, u: T, v: T) -> Result<()> {
        self.add_edge_with_timestamp(u, v, self.clock.now())
    }

    /// Add the edge `(u, v)` at an explicit timestamp.
    ///
    /// # Errors
    ///
    /// [`Error::MissingVertex`] if either endpoint is not in the graph.
    pub fn add_edge_with_timestamp(&self, u: T, v: T, timestamp: Timestamp) -> Result<()> {
        for vertex in [&u, &v] {
            if let Err(err) = self.require_vertex(vertex) {
                debug!(?vertex, "rejecting edge, vertex not in graph");
                return Err(err);
            }
        }

        let (from, to) = self.adjacency_pair(&u, &v);
        from.add(v.clone(), timestamp);
        to.add(u, timestamp);
        Ok(())
    }

    /// Neighbors of `vertex`, in unspecified order.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownVertex`] if `vertex` is not in the graph.
    pub fn get_vertex_edges(&self, vertex: &T) -> Result<Vec<T>> {
        if !self.vertex_exists(vertex) {
            return Err(Error::UnknownVertex(format!("{vertex:?}")));
        }
        Ok(self.neighbors(vertex))
    }

    /// Find a path from `from` to `to` by depth-first search.
    ///
    /// Returns `[from, .., to]` along the first branch that reaches `to`.
    /// Neighbor order is unspecified, so with several candidate paths the
    /// one returned is arbitrary, not the shortest. If `to` is unreachable
    /// the result is `[from]`.
    ///
    /// # Errors
    ///
    /// [`Error::MissingVertex`] if either endpoint is not in the graph.
    pub fn find_path(&self, from: &T, to: &T) -> Result<Vec<T>> {
        self.require_vertex(from)?;
        self.require_vertex(to)?;

        let mut path = vec![from.clone()];
        if from == to {
            return Ok(path);
        }

        let mut seen = HashSet::from([from.clone()]);
        // One frame per vertex on `path`: the neighbors still to try.
        let mut stack = vec![self.neighbors(from).into_iter()];

        while let Some(frontier) = stack.last_mut() {
            let Some(next) = frontier.next() else {
                stack.pop();
                path.pop();
                continue;
            };
            if !seen.insert(next.clone()) {
                continue;
            }
            if next == *to {
                path.push(next);
                trace!(len = path.len(), "path found");
                return Ok(path);
            }
            stack.push(self.neighbors(&next).into_iter());
            path.push(next);
        }

        trace!(visited = seen.len(), "no path found");
        Ok(vec![from.clone()])
    }
}

impl<T: Eq + Hash> Default for LWWGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Eq + Hash + Clone> Clone for LWWGraph<T> {
    fn clone(&self) -> Self {
        let edges = self
            .read_edges()
            .iter()
            .map(|(vertex, adj)| (vertex.clone(), Arc::new(adj.as_ref().clone())))
            .collect();
        Self {
            vertices: self.vertices.clone(),
            edges: RwLock::new(edges),
            clock: self.clock.clone(),
        }
    }
}

impl<T: Eq + Hash> PartialEq for LWWGraph<T> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
            || (self.vertices == other.vertices && *self.read_edges() == *other.read_edges())
    }
}

impl<T: Eq + Hash> Eq for LWWGraph<T> {}

impl<T: Eq + Hash + Clone> Crdt for LWWGraph<T> {
    fn merge(&self, other: &Self) -> Result<()> {
        self.merge_peer(Some(other))
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use std::collections::HashMap;
    use std::hash::Hash;
    use std::sync::{Arc, RwLock};

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::LWWGraph;
    use crate::clock::Clock;
    use crate::lww_set::LWWSet;

    #[derive(Serialize)]
    struct GraphRef<'a, T: Eq + Hash> {
        vertices: &'a LWWSet<T>,
        edges: HashMap<&'a T, &'a LWWSet<T>>,
    }

    #[derive(Deserialize)]
    #[serde(bound(deserialize = "T: Deserialize<'de>"))]
    struct GraphState<T: Eq + Hash> {
        vertices: LWWSet<T>,
        #[serde(default)]
        edges: HashMap<T, LWWSet<T>>,
    }

    /// Serialized as `{"vertices": <set>, "edges": {vertex: <set>}}`. The
    /// clock is local to a replica and is not transmitted.
    impl<T: Eq + Hash + Serialize> Serialize for LWWGraph<T> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let edges = self.read_edges();
            GraphRef {
                vertices: &self.vertices,
                edges: edges.iter().map(|(v, adj)| (v, adj.as_ref())).collect(),
            }
            .serialize(serializer)
        }
    }

    impl<'de, T: Eq + Hash + Deserialize<'de>> Deserialize<'de> for LWWGraph<T> {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let state = GraphState::<T>::deserialize(deserializer)?;
            Ok(LWWGraph {
                vertices: state.vertices,
                edges: RwLock::new(
                    state
                        .edges
                        .into_iter()
                        .map(|(v, adj)| (v, Arc::new(adj)))
                        .collect(),
                ),
                clock: Clock::new(),
            })
        }
    }
}
