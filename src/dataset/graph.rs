//! Module implementing a single connectivity graph sample.
use itertools::Itertools;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::SNNError;

/// A weighted directed graph in coordinate format.
///
/// `w0[e]` is the weight of the edge `edge_index[e] = (source, target)`.
/// Off-diagonal edges come first in row-major order, followed by one self-loop per node.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct GraphSample {
    w0: Vec<f32>,
    edge_index: Vec<(usize, usize)>,
    num_nodes: usize,
}

impl GraphSample {
    /// Create a sample from its coordinate representation.
    /// Returns an error if the weights and edges do not line up or if an index is out of bounds.
    pub fn from_coo(
        edge_index: Vec<(usize, usize)>,
        w0: Vec<f32>,
        num_nodes: usize,
    ) -> Result<Self, SNNError> {
        if edge_index.len() != w0.len() {
            return Err(SNNError::InvalidParameter(format!(
                "Got {} edges for {} weights",
                edge_index.len(),
                w0.len()
            )));
        }

        if let Some(&(source, target)) = edge_index
            .iter()
            .find(|(source, target)| *source >= num_nodes || *target >= num_nodes)
        {
            return Err(SNNError::OutOfBounds(format!(
                "Edge ({}, {}) in a graph of {} nodes",
                source, target, num_nodes
            )));
        }

        Ok(GraphSample {
            w0,
            edge_index,
            num_nodes,
        })
    }

    /// Create a sample from a dense square weight matrix, with `dense[(source, target)]` the weight from source to target.
    /// Non-zero off-diagonal entries become edges; every node additionally gets a self-loop of weight zero.
    pub fn from_dense(dense: &DMatrix<f32>) -> Result<Self, SNNError> {
        if !dense.is_square() {
            return Err(SNNError::IncompatibleShapes(format!(
                "A connectivity matrix must be square, got {:?}",
                dense.shape()
            )));
        }
        let num_nodes = dense.nrows();

        let (mut edge_index, mut w0): (Vec<(usize, usize)>, Vec<f32>) = (0..num_nodes)
            .cartesian_product(0..num_nodes)
            .filter(|(source, target)| source != target && dense[(*source, *target)] != 0.0)
            .map(|(source, target)| ((source, target), dense[(source, target)]))
            .unzip();

        edge_index.extend((0..num_nodes).map(|node| (node, node)));
        w0.extend(std::iter::repeat(0.0).take(num_nodes));

        Ok(GraphSample {
            w0,
            edge_index,
            num_nodes,
        })
    }

    /// Returns the number of nodes in the graph.
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Returns the number of (stored) edges in the graph.
    pub fn num_edges(&self) -> usize {
        self.edge_index.len()
    }

    /// Returns the edge weights.
    pub fn w0(&self) -> &[f32] {
        &self.w0[..]
    }

    /// Returns the edges as (source, target) pairs.
    pub fn edge_index(&self) -> &[(usize, usize)] {
        &self.edge_index[..]
    }

    /// Returns true if every node has an edge to itself.
    pub fn has_self_loops(&self) -> bool {
        let mut has_loop = vec![false; self.num_nodes];
        self.edge_index
            .iter()
            .filter(|(source, target)| source == target)
            .for_each(|(node, _)| {
                if let Some(flag) = has_loop.get_mut(*node) {
                    *flag = true;
                }
            });
        has_loop.into_iter().all(|b| b)
    }

    /// Materialize the dense (num_nodes, num_nodes) weight matrix.
    /// Duplicate coordinates are summed.
    pub fn to_dense(&self) -> DMatrix<f32> {
        let mut dense = DMatrix::zeros(self.num_nodes, self.num_nodes);
        for (&(source, target), &weight) in self.edge_index.iter().zip_eq(self.w0.iter()) {
            dense[(source, target)] += weight;
        }
        dense
    }

    /// Keep only the edges for which the predicate holds.
    pub(crate) fn retain_edges<F>(&mut self, mut predicate: F)
    where
        F: FnMut((usize, usize), f32) -> bool,
    {
        let (edge_index, w0) = self
            .edge_index
            .iter()
            .zip_eq(self.w0.iter())
            .filter(|&(&edge, &weight)| predicate(edge, weight))
            .map(|(&edge, &weight)| (edge, weight))
            .unzip();
        self.edge_index = edge_index;
        self.w0 = w0;
    }
}
