use crate::error::GraphError;
use crate::workflow::{NodeId, Workflow};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap};

/// Dependency graph built from a workflow snapshot.
///
/// Node indices follow the workflow's node insertion order, which is what
/// makes the topological tie-break stable.
#[derive(Debug)]
pub struct DependencyGraph {
    graph: DiGraph<NodeId, ()>,
    index_of: HashMap<NodeId, NodeIndex>,
}

impl DependencyGraph {
    /// Validates the edge set and builds the graph. Self-loops and
    /// connections naming unknown nodes are rejected here, before any run
    /// can start.
    pub fn build(workflow: &Workflow) -> Result<Self, GraphError> {
        let mut graph = DiGraph::new();
        let mut index_of = HashMap::new();

        for node in &workflow.nodes {
            let idx = graph.add_node(node.id);
            index_of.insert(node.id, idx);
        }

        for conn in &workflow.connections {
            if conn.source == conn.target {
                return Err(GraphError::SelfLoop {
                    connection: conn.id,
                    node: conn.source,
                });
            }
            let source = *index_of.get(&conn.source).ok_or(GraphError::DanglingReference {
                connection: conn.id,
                node: conn.source,
            })?;
            let target = *index_of.get(&conn.target).ok_or(GraphError::DanglingReference {
                connection: conn.id,
                node: conn.target,
            })?;
            graph.add_edge(source, target, ());
        }

        Ok(Self { graph, index_of })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Kahn's algorithm with a stable tie-break: among simultaneously
    /// ready nodes the earliest-inserted wins. Errs with `CycleDetected`
    /// when any node is left with nonzero in-degree.
    pub fn topological_order(&self) -> Result<Vec<NodeId>, GraphError> {
        let mut in_degree: HashMap<NodeIndex, usize> = self
            .graph
            .node_indices()
            .map(|idx| {
                let degree = self
                    .graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .count();
                (idx, degree)
            })
            .collect();

        // BTreeSet keyed on NodeIndex, so popping the minimum yields the
        // earliest-inserted ready node.
        let mut ready: BTreeSet<NodeIndex> = in_degree
            .iter()
            .filter(|(_, &degree)| degree == 0)
            .map(|(&idx, _)| idx)
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(idx) = ready.pop_first() {
            order.push(self.graph[idx]);
            for succ in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                if let Some(degree) = in_degree.get_mut(&succ) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(succ);
                    }
                }
            }
        }

        if order.len() != self.graph.node_count() {
            return Err(GraphError::CycleDetected);
        }
        Ok(order)
    }

    /// Direct upstream nodes of `id`. Order is not significant; the engine
    /// re-sorts by topological position when assembling inputs.
    pub fn predecessors(&self, id: NodeId) -> Vec<NodeId> {
        match self.index_of.get(&id) {
            Some(&idx) => self
                .graph
                .neighbors_directed(idx, Direction::Incoming)
                .map(|p| self.graph[p])
                .collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{kind, NodeSpec};

    fn workflow_with(n: usize) -> (Workflow, Vec<NodeId>) {
        let mut wf = Workflow::new("test");
        let ids = (0..n)
            .map(|_| wf.add_node(NodeSpec::new(kind::SCRIPT)))
            .collect();
        (wf, ids)
    }

    #[test]
    fn order_respects_every_edge() {
        let (mut wf, ids) = workflow_with(5);
        // diamond with a tail: 0 -> {1, 2} -> 3 -> 4
        wf.connect(ids[0], ids[1]).unwrap();
        wf.connect(ids[0], ids[2]).unwrap();
        wf.connect(ids[1], ids[3]).unwrap();
        wf.connect(ids[2], ids[3]).unwrap();
        wf.connect(ids[3], ids[4]).unwrap();

        let graph = DependencyGraph::build(&wf).unwrap();
        let order = graph.topological_order().unwrap();
        assert_eq!(order.len(), 5);

        let position: HashMap<NodeId, usize> =
            order.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        for conn in &wf.connections {
            assert!(position[&conn.source] < position[&conn.target]);
        }
    }

    #[test]
    fn tie_break_preserves_insertion_order() {
        // three independent entry points plus one dependent node
        let (mut wf, ids) = workflow_with(4);
        wf.connect(ids[0], ids[3]).unwrap();

        let graph = DependencyGraph::build(&wf).unwrap();
        let order = graph.topological_order().unwrap();
        assert_eq!(order, vec![ids[0], ids[1], ids[2], ids[3]]);
    }

    #[test]
    fn multiple_entry_points_all_appear() {
        let (mut wf, ids) = workflow_with(4);
        // two independent sub-pipelines
        wf.connect(ids[0], ids[1]).unwrap();
        wf.connect(ids[2], ids[3]).unwrap();

        let graph = DependencyGraph::build(&wf).unwrap();
        let order = graph.topological_order().unwrap();
        assert_eq!(order.len(), 4);
    }

    #[test]
    fn cycle_is_detected() {
        let (mut wf, ids) = workflow_with(2);
        wf.connect(ids[0], ids[1]).unwrap();
        wf.connect(ids[1], ids[0]).unwrap();

        let graph = DependencyGraph::build(&wf).unwrap();
        assert_eq!(graph.topological_order(), Err(GraphError::CycleDetected));
    }

    #[test]
    fn dangling_connection_rejected_at_build() {
        let (mut wf, ids) = workflow_with(2);
        wf.connect(ids[0], ids[1]).unwrap();
        // bypass Workflow::connect validation to simulate a corrupt snapshot
        wf.connections[0].target = uuid::Uuid::new_v4();

        let err = DependencyGraph::build(&wf).unwrap_err();
        assert!(matches!(err, GraphError::DanglingReference { .. }));
    }

    #[test]
    fn predecessors_lists_direct_upstreams() {
        let (mut wf, ids) = workflow_with(3);
        wf.connect(ids[0], ids[2]).unwrap();
        wf.connect(ids[1], ids[2]).unwrap();

        let graph = DependencyGraph::build(&wf).unwrap();
        let mut preds = graph.predecessors(ids[2]);
        preds.sort();
        let mut expected = vec![ids[0], ids[1]];
        expected.sort();
        assert_eq!(preds, expected);
        assert!(graph.predecessors(ids[0]).is_empty());
    }
}
