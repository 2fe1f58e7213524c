//! Disjoint-set forest over record ids and the canonical cluster view.

use mpi_model::RecordId;
use serde::Serialize;

/// Union-find with path halving and union by rank.
#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Representative of `id`'s set.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated by [`DisjointSet::new`].
    pub fn find(&mut self, id: RecordId) -> RecordId {
        let mut node = id.index();
        while self.parent[node] != node {
            self.parent[node] = self.parent[self.parent[node]];
            node = self.parent[node];
        }
        RecordId::new(node)
    }

    /// Merges the sets of `a` and `b`; returns `false` if already merged.
    pub fn union(&mut self, a: RecordId, b: RecordId) -> bool {
        let (ra, rb) = (self.find(a).index(), self.find(b).index());
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] = self.rank[ra].saturating_add(1);
            }
        }
        true
    }

    pub fn same_set(&mut self, a: RecordId, b: RecordId) -> bool {
        self.find(a) == self.find(b)
    }

    /// Every set, members ascending, sets ordered by their smallest member.
    pub fn sets(&mut self) -> Vec<Vec<RecordId>> {
        let mut slot_of_root = vec![usize::MAX; self.len()];
        let mut sets: Vec<Vec<RecordId>> = Vec::new();
        for index in 0..self.len() {
            let root = self.find(RecordId::new(index)).index();
            if slot_of_root[root] == usize::MAX {
                slot_of_root[root] = sets.len();
                sets.push(Vec::new());
            }
            sets[slot_of_root[root]].push(RecordId::new(index));
        }
        sets
    }
}

/// A group of records judged to be the same patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateCluster {
    /// Position in the canonical cluster ordering.
    pub id: usize,
    pub members: Vec<RecordId>,
}

impl DuplicateCluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.members.binary_search(&id).is_ok()
    }
}

/// Clusters with more than one member, in canonical order.
pub fn duplicate_clusters(set: &mut DisjointSet) -> Vec<DuplicateCluster> {
    set.sets()
        .into_iter()
        .filter(|members| members.len() > 1)
        .enumerate()
        .map(|(id, members)| DuplicateCluster { id, members })
        .collect()
}
