//! End-to-end algorithm scenarios on a small mixed graph: a DAG core with a
//! feedback arc and a self-loop, and arc payloads whose sign selects the
//! acyclic subgraph.

use quiver::{ArcHandle, Digraph, NodeHandle};

struct Fixture {
    graph: Digraph<String, i32>,
    nodes: Vec<NodeHandle>,
    arcs: Vec<ArcHandle>,
}

/// node1..node5 with arcs (values in parentheses):
/// 1->2 (1), 2->4 (2), 4->3 (3), 1->3 (4), 3->5 (5), 5->4 (-6), 4->4 (-7).
/// Negative values mark the feedback arc and the self-loop; dropping them
/// leaves a DAG.
fn fixture() -> Fixture {
    let mut graph = Digraph::new();
    let nodes: Vec<_> = (1..=5).map(|i| graph.insert(format!("node{i}"))).collect();
    let wire = [
        (0, 1, 1),
        (1, 3, 2),
        (3, 2, 3),
        (0, 2, 4),
        (2, 4, 5),
        (4, 3, -6),
        (3, 3, -7),
    ];
    let arcs = wire
        .iter()
        .map(|&(f, t, v)| graph.arc_insert(nodes[f], nodes[t], v).unwrap())
        .collect();
    Fixture { graph, nodes, arcs }
}

fn natural(g: &Digraph<String, i32>, a: ArcHandle) -> bool {
    *g.arc(a).unwrap() >= 0
}

fn small(g: &Digraph<String, i32>, a: ArcHandle) -> bool {
    g.arc(a).unwrap().abs() < 4
}

#[test]
fn adjacency_matrix_matches_wiring() {
    let f = fixture();
    let expected = [
        // to:  1      2      3      4      5
        [false, true, true, false, false], // from 1
        [false, false, false, true, false], // from 2
        [false, false, false, false, true], // from 3
        [false, false, true, true, false], // from 4 (self-loop)
        [false, false, false, true, false], // from 5
    ];
    for (i, row) in expected.iter().enumerate() {
        for (j, &want) in row.iter().enumerate() {
            assert_eq!(
                f.graph.adjacent(f.nodes[i], f.nodes[j]).unwrap(),
                want,
                "adjacent(node{}, node{})",
                i + 1,
                j + 1
            );
        }
    }
}

#[test]
fn path_existence_agrees_with_all_paths() {
    let f = fixture();
    for &a in &f.nodes {
        for &b in &f.nodes {
            let exists = f.graph.path_exists(a, b).unwrap();
            let paths = f.graph.all_paths(a, b).unwrap();
            assert_eq!(exists, !paths.is_empty());
            for path in &paths {
                assert_eq!(path.first(), Some(&a));
                assert_eq!(path.last(), Some(&b));
            }
        }
    }
    // Everything is reachable from node1; nothing reaches back to it.
    for &b in &f.nodes {
        assert!(f.graph.path_exists(f.nodes[0], b).unwrap());
    }
    for &a in &f.nodes[1..] {
        assert!(!f.graph.path_exists(a, f.nodes[0]).unwrap());
    }
}

#[test]
fn all_paths_from_one_to_four() {
    let f = fixture();
    let paths = f.graph.all_paths(f.nodes[0], f.nodes[3]).unwrap();
    assert_eq!(
        paths,
        vec![
            vec![f.nodes[0], f.nodes[1], f.nodes[3]],
            vec![f.nodes[0], f.nodes[2], f.nodes[4], f.nodes[3]],
        ]
    );
}

#[test]
fn shortest_path_is_minimal() {
    let f = fixture();
    assert_eq!(
        f.graph.shortest_path(f.nodes[0], f.nodes[3]).unwrap(),
        vec![f.nodes[0], f.nodes[1], f.nodes[3]]
    );
    // The shortest path is never longer than any enumerated path.
    for &a in &f.nodes {
        for &b in &f.nodes {
            let shortest = f.graph.shortest_path(a, b).unwrap();
            for path in f.graph.all_paths(a, b).unwrap() {
                assert!(!shortest.is_empty());
                assert!(shortest.len() <= path.len());
            }
        }
    }
}

#[test]
fn shortest_paths_tree_under_magnitude_filter() {
    let f = fixture();
    // |value| < 4 keeps only 1->2, 2->4, 4->3: a chain, so the tree is
    // exactly those arcs in discovery order and node5 stays unreached.
    let tree = f.graph.shortest_paths(f.nodes[0], small).unwrap();
    assert_eq!(tree, vec![f.arcs[0], f.arcs[1], f.arcs[2]]);
}

#[test]
fn reachability_closures() {
    let f = fixture();
    // node1 reaches everything else but nothing cycles back to it.
    assert_eq!(
        f.graph.reachable_nodes(f.nodes[0]).unwrap(),
        vec![f.nodes[1], f.nodes[2], f.nodes[3], f.nodes[4]]
    );
    // node4 is reached by everything, including itself via the self-loop.
    let reaching = f.graph.reaching_nodes(f.nodes[3]).unwrap();
    assert_eq!(reaching.len(), 5);
    assert!(reaching.contains(&f.nodes[3]));
}

#[test]
fn sort_reports_exactly_the_cycle_arcs() {
    let f = fixture();
    let (order, errors) = f.graph.sort(|_, _| true);
    assert_eq!(
        order,
        vec![f.nodes[0], f.nodes[1], f.nodes[3], f.nodes[2], f.nodes[4]]
    );
    // The feedback arc 5->4 and the self-loop 4->4, in storage order.
    assert_eq!(errors, vec![f.arcs[5], f.arcs[6]]);
}

#[test]
fn sort_of_the_natural_subgraph_is_clean() {
    let f = fixture();
    let (order, errors) = f.graph.sort(natural);
    assert!(errors.is_empty());
    assert_eq!(order.len(), 5);
    // Every selected arc points forward in the order.
    let pos = |h: NodeHandle| order.iter().position(|&x| x == h).unwrap();
    for &arc in &f.arcs {
        if natural(&f.graph, arc) {
            let from = f.graph.arc_from(arc).unwrap();
            let to = f.graph.arc_to(arc).unwrap();
            assert!(pos(from) < pos(to));
        }
    }
}

#[test]
fn dag_sort_agrees_with_sort_on_the_natural_subgraph() {
    let f = fixture();
    let (order, _) = f.graph.sort(natural);
    assert_eq!(f.graph.dag_sort(natural), order);
}

#[test]
fn dag_sort_omits_nodes_trapped_by_the_cycle() {
    let f = fixture();
    // With every arc selected, the 4->4 self-loop pins node4 and everything
    // downstream of it; only node1 and node2 are free.
    assert_eq!(
        f.graph.dag_sort(|_, _| true),
        vec![f.nodes[0], f.nodes[1]]
    );
}

#[test]
fn traversals_visit_each_reachable_node_once() {
    let f = fixture();
    let bfs: Vec<_> = f.graph.bfs(f.nodes[0]).unwrap().collect();
    assert_eq!(bfs.len(), 5);
    let pre: Vec<_> = f.graph.dfs_pre(f.nodes[0]).unwrap().collect();
    assert_eq!(pre.len(), 5);
    let post: Vec<_> = f.graph.dfs_post(f.nodes[0]).unwrap().collect();
    assert_eq!(post.last(), Some(&f.nodes[0]));
    assert_eq!(f.graph.nodes().count(), 5);
    assert_eq!(f.graph.arcs().count(), 7);
}
