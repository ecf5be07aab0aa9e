//! Linearization of a root's lineage tree into root-to-leaf branches.

use std::collections::HashSet;

use super::record::FullTrajectory;
use crate::graph::Graph;
use crate::{NodeId, Result};

/// Result of traversing the subgraph reachable from one root.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TrajectoryWalk {
    /// Every root-to-leaf path, first out-edges first.
    pub branches: FullTrajectory,
    /// Nodes in depth-first visiting order, each exactly once.
    pub visited: Vec<NodeId>,
}

/// Depth-first traversal from `root` with an explicit work stack.
///
/// A node reachable along several paths (after a merge) is expanded only
/// once; later paths end at the node preceding it.
pub(crate) fn walk_trajectory<N, E>(graph: &Graph<N, E>, root: NodeId) -> Result<TrajectoryWalk> {
    let mut seen = HashSet::from([root]);
    let mut visited = Vec::new();
    let mut branches = Vec::new();
    let mut stack = vec![(root, vec![root])];

    while let Some((node_id, path)) = stack.pop() {
        visited.push(node_id);

        let successors: Vec<NodeId> = graph
            .successors(&node_id)?
            .into_iter()
            .filter(|successor| seen.insert(*successor))
            .collect();

        if successors.is_empty() {
            branches.push(path);
            continue;
        }

        // Copy the path for every extra daughter; the first out-edge takes
        // the original and is pushed last so it is popped first.
        let first = successors[0];
        for &successor in successors[1..].iter().rev() {
            let mut branch = path.clone();
            branch.push(successor);
            stack.push((successor, branch));
        }
        let mut path = path;
        path.push(first);
        stack.push((first, path));
    }

    Ok(TrajectoryWalk { branches, visited })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(frame: i32, label: i32) -> NodeId {
        NodeId::new(frame, label)
    }

    fn graph_with(edges: &[(NodeId, NodeId)]) -> Graph<()> {
        let mut graph = Graph::new();
        for &(head, tail) in edges {
            for node in [head, tail] {
                if !graph.contains_node(&node) {
                    graph.add_node(node, ()).unwrap();
                }
            }
            graph.add_edge(head, tail, None).unwrap();
        }
        graph
    }

    #[test]
    fn test_single_node() {
        let mut graph: Graph<()> = Graph::new();
        graph.add_node(id(0, 1), ()).unwrap();

        let walk = walk_trajectory(&graph, id(0, 1)).unwrap();
        assert_eq!(walk.branches, vec![vec![id(0, 1)]]);
        assert_eq!(walk.visited, vec![id(0, 1)]);
    }

    #[test]
    fn test_chain() {
        let graph = graph_with(&[(id(0, 1), id(1, 1)), (id(1, 1), id(2, 1))]);

        let walk = walk_trajectory(&graph, id(0, 1)).unwrap();
        assert_eq!(walk.branches, vec![vec![id(0, 1), id(1, 1), id(2, 1)]]);
    }

    #[test]
    fn test_split_copies_prefix() {
        let graph = graph_with(&[
            (id(0, 1), id(1, 1)),
            (id(1, 1), id(2, 1)),
            (id(1, 1), id(2, 2)),
            (id(2, 2), id(3, 2)),
        ]);

        let walk = walk_trajectory(&graph, id(0, 1)).unwrap();
        assert_eq!(
            walk.branches,
            vec![
                vec![id(0, 1), id(1, 1), id(2, 1)],
                vec![id(0, 1), id(1, 1), id(2, 2), id(3, 2)],
            ]
        );
        assert_eq!(walk.visited.len(), 5);
    }

    #[test]
    fn test_merge_visits_once() {
        let graph = graph_with(&[
            (id(0, 1), id(1, 1)),
            (id(0, 1), id(1, 2)),
            (id(1, 1), id(2, 1)),
            (id(1, 2), id(2, 1)),
            (id(2, 1), id(3, 1)),
        ]);

        let walk = walk_trajectory(&graph, id(0, 1)).unwrap();

        let unique: HashSet<_> = walk.visited.iter().collect();
        assert_eq!(unique.len(), walk.visited.len());
        assert_eq!(walk.visited.len(), 5);
        assert_eq!(
            walk.branches,
            vec![
                vec![id(0, 1), id(1, 1), id(2, 1), id(3, 1)],
                vec![id(0, 1), id(1, 2)],
            ]
        );
    }

    #[test]
    fn test_deep_chain_without_recursion() {
        let edges: Vec<_> = (0..10_000).map(|t| (id(t, 1), id(t + 1, 1))).collect();
        let graph = graph_with(&edges);

        let walk = walk_trajectory(&graph, id(0, 1)).unwrap();
        assert_eq!(walk.branches.len(), 1);
        assert_eq!(walk.branches[0].len(), 10_001);
    }
}
