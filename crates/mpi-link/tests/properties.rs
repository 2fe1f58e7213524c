use mpi_link::DisjointSet;
use mpi_model::RecordId;
use proptest::prelude::*;

const NODES: usize = 16;

/// Connected components by repeated relaxation over the edge list.
fn components(edges: &[(usize, usize)]) -> Vec<usize> {
    let mut label: Vec<usize> = (0..NODES).collect();
    loop {
        let mut changed = false;
        for &(a, b) in edges {
            let low = label[a].min(label[b]);
            if label[a] != low || label[b] != low {
                label[a] = low;
                label[b] = low;
                changed = true;
            }
        }
        if !changed {
            return label;
        }
    }
}

proptest! {
    #[test]
    fn union_find_matches_graph_components(
        edges in prop::collection::vec((0..NODES, 0..NODES), 0..40)
    ) {
        let mut set = DisjointSet::new(NODES);
        for &(a, b) in &edges {
            set.union(RecordId::new(a), RecordId::new(b));
        }
        let expected = components(&edges);
        for a in 0..NODES {
            for b in 0..NODES {
                prop_assert_eq!(
                    set.same_set(RecordId::new(a), RecordId::new(b)),
                    expected[a] == expected[b]
                );
            }
        }
    }

    #[test]
    fn sets_partition_every_record(
        edges in prop::collection::vec((0..NODES, 0..NODES), 0..40)
    ) {
        let mut set = DisjointSet::new(NODES);
        for &(a, b) in &edges {
            set.union(RecordId::new(a), RecordId::new(b));
        }
        let mut seen: Vec<usize> = set.sets().into_iter().flatten().map(RecordId::index).collect();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..NODES).collect::<Vec<_>>());
    }
}
