//! Child-ordering operations on the outgoing arc list: offset lookup,
//! reordering and swapping, as used for tree-shaped data.

use quiver::{Digraph, GraphError};

fn tree() -> (
    Digraph<&'static str, ()>,
    quiver::NodeHandle,
    Vec<quiver::NodeHandle>,
) {
    let mut g = Digraph::new();
    let root = g.insert("root");
    let kids = vec![g.insert("left"), g.insert("middle"), g.insert("right")];
    for &k in &kids {
        g.arc_insert(root, k, ()).unwrap();
    }
    (g, root, kids)
}

fn children(g: &Digraph<&'static str, ()>, root: quiver::NodeHandle) -> Vec<&'static str> {
    (0..g.fanout(root).unwrap())
        .map(|i| *g.node(g.arc_to(g.output(root, i).unwrap()).unwrap()).unwrap())
        .collect()
}

#[test]
fn child_offset_reflects_insertion_order() {
    let (g, root, kids) = tree();
    assert_eq!(g.child_offset(root, kids[0]).unwrap(), Some(0));
    assert_eq!(g.child_offset(root, kids[1]).unwrap(), Some(1));
    assert_eq!(g.child_offset(root, kids[2]).unwrap(), Some(2));
    // Not a child (no arc root -> root).
    assert_eq!(g.child_offset(root, root).unwrap(), None);
    // Reverse direction: kids have no children.
    assert_eq!(g.child_offset(kids[0], root).unwrap(), None);
}

#[test]
fn reorder_moves_a_child_to_a_new_position() {
    let (mut g, root, _) = tree();
    g.reorder(root, 0, 1).unwrap();
    assert_eq!(children(&g, root), vec!["middle", "left", "right"]);
    g.reorder(root, 2, 0).unwrap();
    assert_eq!(children(&g, root), vec!["right", "middle", "left"]);
    // Moving to the last position.
    g.reorder(root, 0, 2).unwrap();
    assert_eq!(children(&g, root), vec!["middle", "left", "right"]);
}

#[test]
fn reorder_rejects_out_of_range_positions() {
    let (mut g, root, _) = tree();
    assert_eq!(
        g.reorder(root, 0, 3),
        Err(GraphError::OutOfRange { index: 3, bound: 3 })
    );
    assert_eq!(
        g.reorder(root, 5, 0),
        Err(GraphError::OutOfRange { index: 5, bound: 3 })
    );
    // A failed reorder changes nothing.
    assert_eq!(children(&g, root), vec!["left", "middle", "right"]);
}

#[test]
fn swap_exchanges_two_children() {
    let (mut g, root, _) = tree();
    g.swap(root, 0, 2).unwrap();
    assert_eq!(children(&g, root), vec!["right", "middle", "left"]);
    g.swap(root, 1, 1).unwrap();
    assert_eq!(children(&g, root), vec!["right", "middle", "left"]);
    assert_eq!(
        g.swap(root, 0, 3),
        Err(GraphError::OutOfRange { index: 3, bound: 3 })
    );
}

#[test]
fn ordering_is_per_parent_and_survives_unrelated_erasure() {
    let (mut g, root, kids) = tree();
    let lonely = g.insert("lonely");
    g.reorder(root, 2, 0).unwrap();
    g.erase(lonely).unwrap();
    assert_eq!(children(&g, root), vec!["right", "left", "middle"]);
    // Erasing a child removes exactly its arc, keeping the rest in order.
    g.erase(kids[0]).unwrap();
    assert_eq!(children(&g, root), vec!["right", "middle"]);
}
