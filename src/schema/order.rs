// src/schema/order.rs
//! Load order derived from declared table dependencies.

use std::{
    cmp::Reverse,
    collections::{BTreeSet, BinaryHeap},
};

use anyhow::{anyhow, Result};
use petgraph::{
    graph::{DiGraph, NodeIndex},
    Direction,
};

use super::{DatasetType, ForeignKey};

/// Directed graph with an edge parent → child for every declared
/// dependency. Node indices follow `DatasetType::ALL`.
pub fn dependency_graph() -> DiGraph<DatasetType, ForeignKey> {
    let mut graph = DiGraph::with_capacity(DatasetType::ALL.len(), 16);
    for dataset in DatasetType::ALL {
        graph.add_node(dataset);
    }
    for (child_idx, child) in DatasetType::ALL.iter().enumerate() {
        for fk in child.schema().foreign_keys {
            graph.add_edge(index_of(fk.parent), NodeIndex::new(child_idx), *fk);
        }
    }
    graph
}

fn index_of(dataset: DatasetType) -> NodeIndex {
    let pos = DatasetType::ALL
        .iter()
        .position(|d| *d == dataset)
        .unwrap_or_default();
    NodeIndex::new(pos)
}

/// Every dataset, parents before children.
///
/// Among datasets whose parents are already placed, declaration order wins,
/// so the result is stable across runs.
pub fn load_order() -> Result<Vec<DatasetType>> {
    let graph = dependency_graph();
    let mut pending: Vec<usize> = graph
        .node_indices()
        .map(|n| graph.neighbors_directed(n, Direction::Incoming).count())
        .collect();

    let mut ready: BinaryHeap<Reverse<usize>> = pending
        .iter()
        .enumerate()
        .filter(|&(_, &deg)| deg == 0)
        .map(|(i, _)| Reverse(i))
        .collect();

    let mut out = Vec::with_capacity(graph.node_count());
    while let Some(Reverse(i)) = ready.pop() {
        let node = NodeIndex::new(i);
        out.push(graph[node]);
        for child in graph.neighbors_directed(node, Direction::Outgoing) {
            let deg = &mut pending[child.index()];
            *deg -= 1;
            if *deg == 0 {
                ready.push(Reverse(child.index()));
            }
        }
    }

    if out.len() != graph.node_count() {
        let stuck: Vec<&str> = graph
            .node_indices()
            .filter(|n| pending[n.index()] > 0)
            .map(|n| graph[n].as_str())
            .collect();
        return Err(anyhow!("dependency cycle among {:?}", stuck));
    }
    Ok(out)
}

/// `dataset` and everything it depends on, transitively, in load order.
pub fn dependencies(dataset: DatasetType) -> Result<Vec<DatasetType>> {
    let mut needed = BTreeSet::new();
    let mut stack = vec![dataset];
    while let Some(d) = stack.pop() {
        if needed.insert(d) {
            stack.extend(d.schema().foreign_keys.iter().map(|fk| fk.parent));
        }
    }
    Ok(load_order()?
        .into_iter()
        .filter(|d| needed.contains(d))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(order: &[DatasetType], d: DatasetType) -> usize {
        order.iter().position(|x| *x == d).unwrap()
    }

    #[test]
    fn parents_load_before_children() -> Result<()> {
        let order = load_order()?;
        assert_eq!(order.len(), 14);
        for child in DatasetType::ALL {
            for fk in child.schema().foreign_keys {
                assert!(
                    position(&order, fk.parent) < position(&order, child),
                    "{} must precede {}",
                    fk.parent,
                    child
                );
            }
        }
        Ok(())
    }

    #[test]
    fn order_is_the_provider_table_order() -> Result<()> {
        let names: Vec<&str> = load_order()?.iter().map(|d| d.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "bills",
                "people",
                "bill_documents",
                "bill_actions",
                "bill_abstracts",
                "bill_sponsorships",
                "bill_sources",
                "bill_versions",
                "bill_version_links",
                "votes",
                "vote_sources",
                "vote_counts",
                "vote_people",
                "bill_document_links",
            ]
        );
        Ok(())
    }

    #[test]
    fn dependency_closure_is_transitive() -> Result<()> {
        assert_eq!(
            dependencies(DatasetType::VoteCounts)?,
            vec![
                DatasetType::Bills,
                DatasetType::BillActions,
                DatasetType::Votes,
                DatasetType::VoteCounts
            ]
        );
        assert_eq!(dependencies(DatasetType::Bills)?, vec![DatasetType::Bills]);
        assert_eq!(
            dependencies(DatasetType::BillSponsorships)?,
            vec![
                DatasetType::Bills,
                DatasetType::People,
                DatasetType::BillSponsorships
            ]
        );
        Ok(())
    }

    #[test]
    fn graph_has_one_edge_per_dependency() {
        let graph = dependency_graph();
        let declared: usize = DatasetType::ALL
            .iter()
            .map(|d| d.schema().foreign_keys.len())
            .sum();
        assert_eq!(graph.edge_count(), declared);
    }
}
