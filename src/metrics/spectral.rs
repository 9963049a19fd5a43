//! Spectral radius of the adjacency matrix

use crate::graph::subgraph::induced_subgraph;
use crate::graph::CompressedGraph;
use nalgebra::{DMatrix, Schur, SymmetricEigen};

/// Iteration cap for the eigenvalue solvers
const MAX_EIGEN_ITERATIONS: usize = 10_000;

/// Iteration cap for the Perron root power iteration
const MAX_POWER_ITERATIONS: usize = 100_000;

/// Relative width at which the Collatz-Wielandt bracket counts as converged
const POWER_TOLERANCE: f64 = 1e-13;

/// Squarings used by the Gelfand fallback, i.e. `||A^(2^60)||^(2^-60)`
const GELFAND_SQUARINGS: i32 = 60;

/// Dense adjacency matrix; parallel edges add up, undirected edges are mirrored
pub fn adjacency_matrix(graph: &CompressedGraph) -> DMatrix<f64> {
    let n = graph.node_count;
    let mut matrix = DMatrix::<f64>::zeros(n, n);

    for (src, dst, w) in graph.edge_triples() {
        let (i, j) = (src as usize, dst as usize);
        matrix[(i, j)] += w;
        if !graph.directed && i != j {
            matrix[(j, i)] += w;
        }
    }

    matrix
}

/// Largest eigenvalue modulus of the adjacency matrix.
///
/// Matrices smaller than 2x2 yield 0. With non-negative weights a directed
/// matrix is block triangular over its strongly connected components, so
/// each component is solved on its own: an acyclic graph comes out as
/// exactly 0 and every cyclic block contributes its Perron root.
pub fn spectral_radius(graph: &CompressedGraph) -> f64 {
    if graph.node_count < 2 {
        return 0.0;
    }

    if graph.weights.iter().any(|w| !w.is_finite()) {
        log::warn!("Adjacency matrix has non-finite weights, spectral radius set to 0");
        return 0.0;
    }

    if !graph.directed {
        return symmetric_radius(adjacency_matrix(graph));
    }

    if graph.weights.iter().any(|&w| w < 0.0) {
        return general_radius(adjacency_matrix(graph));
    }

    strongly_connected_components(graph)
        .into_iter()
        .map(|component| match component.as_slice() {
            [node] => graph.edge_weight(*node as usize, *node),
            _ => perron_root(&induced_subgraph(graph, &component)),
        })
        .fold(0.0, f64::max)
}

fn symmetric_radius(matrix: DMatrix<f64>) -> f64 {
    match SymmetricEigen::try_new(matrix.clone(), f64::EPSILON, MAX_EIGEN_ITERATIONS) {
        Some(eigen) => eigen.eigenvalues.iter().map(|v| v.abs()).fold(0.0, f64::max),
        None => {
            log::debug!("Symmetric eigensolver did not converge, using Gelfand's formula");
            gelfand_radius(matrix)
        }
    }
}

fn general_radius(matrix: DMatrix<f64>) -> f64 {
    match Schur::try_new(matrix.clone(), f64::EPSILON, MAX_EIGEN_ITERATIONS) {
        Some(schur) => schur
            .complex_eigenvalues()
            .iter()
            .map(|c| c.norm())
            .fold(0.0, f64::max),
        None => {
            log::debug!("Schur decomposition did not converge, using Gelfand's formula");
            gelfand_radius(matrix)
        }
    }
}

/// Perron root of a strongly connected block with non-negative weights.
///
/// Power iteration runs on `A + I`, which is primitive, so it converges
/// even for periodic blocks such as a plain cycle. The Collatz-Wielandt
/// ratios `(Mx)_i / x_i` of a positive iterate bracket the root of `M`
/// from both sides.
fn perron_root(block: &CompressedGraph) -> f64 {
    let n = block.node_count;
    let mut x = vec![1.0f64; n];
    let mut y = vec![0.0f64; n];
    let mut lower = 0.0f64;
    let mut upper = f64::INFINITY;

    for _ in 0..MAX_POWER_ITERATIONS {
        for (i, yi) in y.iter_mut().enumerate() {
            let row: f64 = block
                .outgoing_edges(i)
                .iter()
                .zip(block.outgoing_weights(i))
                .map(|(&j, &w)| w * x[j as usize])
                .sum();
            *yi = x[i] + row;
        }

        lower = f64::INFINITY;
        upper = 0.0;
        for (yi, xi) in y.iter().zip(&x) {
            let ratio = yi / xi;
            lower = lower.min(ratio);
            upper = upper.max(ratio);
        }
        if upper - lower <= POWER_TOLERANCE * upper {
            break;
        }

        let scale = y.iter().copied().fold(0.0, f64::max);
        for (xi, yi) in x.iter_mut().zip(&y) {
            *xi = yi / scale;
        }
    }

    ((lower + upper) / 2.0 - 1.0).max(0.0)
}

/// Spectral radius from Gelfand's formula `lim ||A^k||^(1/k)`.
///
/// Repeated squaring with renormalization keeps the powers finite; the
/// logarithm of the radius estimate is accumulated alongside.
fn gelfand_radius(matrix: DMatrix<f64>) -> f64 {
    let norm = matrix.norm();
    if norm == 0.0 {
        return 0.0;
    }

    let mut power = matrix / norm;
    let mut log_radius = norm.ln();
    for step in 1..=GELFAND_SQUARINGS {
        power = &power * &power;
        let norm = power.norm();
        if norm == 0.0 {
            return 0.0;
        }
        power /= norm;
        log_radius += norm.ln() / 2f64.powi(step);
    }

    log_radius.exp()
}

/// Strongly connected components (Kosaraju, iterative)
pub fn strongly_connected_components(graph: &CompressedGraph) -> Vec<Vec<u32>> {
    let n = graph.node_count;

    // Pass 1: finish order along out-edges
    let mut visited = vec![false; n];
    let mut finished = Vec::with_capacity(n);
    for root in 0..n {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        let mut stack = vec![(root, 0usize)];
        while let Some((node, next)) = stack.last_mut() {
            let targets = graph.outgoing_edges(*node);
            if let Some(&target) = targets.get(*next) {
                *next += 1;
                let target = target as usize;
                if !visited[target] {
                    visited[target] = true;
                    stack.push((target, 0));
                }
            } else {
                finished.push(*node);
                stack.pop();
            }
        }
    }

    // Pass 2: collect along in-edges in reverse finish order
    let mut assigned = vec![false; n];
    let mut components = Vec::new();
    for &root in finished.iter().rev() {
        if assigned[root] {
            continue;
        }
        assigned[root] = true;
        let mut component = vec![root as u32];
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            for &source in graph.incoming_edges(node) {
                let source = source as usize;
                if !assigned[source] {
                    assigned[source] = true;
                    component.push(source as u32);
                    stack.push(source);
                }
            }
        }
        component.sort_unstable();
        components.push(component);
    }

    components
}
