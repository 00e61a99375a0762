// Call graph model shared between the analyzer boundary and the
// visualization session.
//
// The analyzer emits this shape as a single JSON document; everything it
// sends is untrusted until validate() has accepted it.

use crate::error::{Error, Result};
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One analyzed function: identity, display label, and source location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionNode {
    pub id: String,
    pub label: String,
    pub file: String,
    /// 1-based line number
    pub line: u32,
}

/// A directed caller -> callee relation between two node ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallEdge {
    pub caller_id: String,
    pub callee_id: String,
}

/// The analysis result: function nodes and call edges
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallGraph {
    pub nodes: Vec<FunctionNode>,
    pub edges: Vec<CallEdge>,
}

/// Summary numbers reported after an analysis run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub functions: usize,
    pub calls: usize,
    /// Nodes no other node calls
    pub entry_points: usize,
}

impl CallGraph {
    /// Parse and validate one JSON document from the analyzer
    pub fn from_json(json: &str) -> Result<Self> {
        let graph: CallGraph =
            serde_json::from_str(json).map_err(|e| Error::parse(e.to_string()))?;
        graph.validate()?;
        Ok(graph)
    }

    /// Check the schema invariants: unique node ids, edges that reference
    /// existing nodes, and 1-based line numbers.
    pub fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();

        for node in &self.nodes {
            if node.line < 1 {
                return Err(Error::parse(format!(
                    "node '{}' has line {}, expected >= 1",
                    node.id, node.line
                )));
            }
            if !ids.insert(node.id.as_str()) {
                return Err(Error::parse(format!("duplicate node id '{}'", node.id)));
            }
        }

        for edge in &self.edges {
            if !ids.contains(edge.caller_id.as_str()) {
                return Err(Error::parse(format!(
                    "edge references unknown caller '{}'",
                    edge.caller_id
                )));
            }
            if !ids.contains(edge.callee_id.as_str()) {
                return Err(Error::parse(format!(
                    "edge references unknown callee '{}'",
                    edge.callee_id
                )));
            }
        }

        Ok(())
    }

    /// Find a node by id
    pub fn get_node(&self, id: &str) -> Option<&FunctionNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Compute summary statistics over the validated graph
    pub fn stats(&self) -> GraphStats {
        let mut digraph: DiGraphMap<&str, ()> = DiGraphMap::new();

        for node in &self.nodes {
            digraph.add_node(node.id.as_str());
        }
        for edge in &self.edges {
            digraph.add_edge(edge.caller_id.as_str(), edge.callee_id.as_str(), ());
        }

        let entry_points = digraph
            .nodes()
            .filter(|n| {
                digraph
                    .neighbors_directed(n, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .count();

        GraphStats {
            functions: self.nodes.len(),
            calls: self.edges.len(),
            entry_points,
        }
    }
}
