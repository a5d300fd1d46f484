//! Tests for tree mutation: append, insert, remove, replace, move and detach.

use dominic_dom::{DomTree, NodeId};

/// Helper: a `<div>` attached to the document with children tagged `tags`.
fn parent_with(tree: &mut DomTree, tags: &[&str]) -> (NodeId, Vec<NodeId>) {
    let parent = tree.alloc_element("div");
    tree.append_child(NodeId::ROOT, parent);
    let children = tags
        .iter()
        .map(|tag| {
            let id = tree.alloc_element(tag);
            tree.append_child(parent, id);
            id
        })
        .collect();
    (parent, children)
}

fn assert_detached(tree: &DomTree, id: NodeId) {
    assert_eq!(tree.parent(id), None);
    assert_eq!(tree.prev_sibling(id), None);
    assert_eq!(tree.next_sibling(id), None);
}

// ========== append_child ==========

#[test]
fn test_append_links_siblings() {
    let mut tree = DomTree::new();
    let (parent, kids) = parent_with(&mut tree, &["a", "b", "c"]);

    assert_eq!(tree.children(parent), kids.as_slice());
    assert_eq!(tree.first_child(parent), Some(kids[0]));
    assert_eq!(tree.last_child(parent), Some(kids[2]));
    assert_eq!(tree.next_sibling(kids[0]), Some(kids[1]));
    assert_eq!(tree.prev_sibling(kids[2]), Some(kids[1]));
}

#[test]
fn test_append_moves_attached_node() {
    let mut tree = DomTree::new();
    let (first, kids) = parent_with(&mut tree, &["a", "b"]);
    let (second, _) = parent_with(&mut tree, &[]);

    tree.append_child(second, kids[0]);

    assert_eq!(tree.children(first), &[kids[1]]);
    assert_eq!(tree.prev_sibling(kids[1]), None);
    assert_eq!(tree.children(second), &[kids[0]]);
    assert_eq!(tree.parent(kids[0]), Some(second));
}

// ========== remove_child ==========

#[test]
fn test_remove_only_child() {
    let mut tree = DomTree::new();
    let (parent, kids) = parent_with(&mut tree, &["p"]);

    tree.remove_child(parent, kids[0]);

    assert!(tree.children(parent).is_empty());
    assert_detached(&tree, kids[0]);
}

#[test]
fn test_remove_middle_child_relinks_neighbours() {
    let mut tree = DomTree::new();
    let (parent, kids) = parent_with(&mut tree, &["a", "b", "c"]);

    tree.remove_child(parent, kids[1]);

    assert_eq!(tree.children(parent), &[kids[0], kids[2]]);
    assert_eq!(tree.next_sibling(kids[0]), Some(kids[2]));
    assert_eq!(tree.prev_sibling(kids[2]), Some(kids[0]));
    assert_detached(&tree, kids[1]);
}

#[test]
fn test_remove_first_and_last() {
    let mut tree = DomTree::new();
    let (parent, kids) = parent_with(&mut tree, &["a", "b", "c"]);

    tree.remove_child(parent, kids[0]);
    tree.remove_child(parent, kids[2]);

    assert_eq!(tree.children(parent), &[kids[1]]);
    assert_eq!(tree.prev_sibling(kids[1]), None);
    assert_eq!(tree.next_sibling(kids[1]), None);
}

#[test]
fn test_remove_non_child_is_noop() {
    let mut tree = DomTree::new();
    let (parent, kids) = parent_with(&mut tree, &["a"]);
    let stranger = tree.alloc_element("x");

    tree.remove_child(parent, stranger);

    assert_eq!(tree.children(parent), kids.as_slice());
}

#[test]
fn test_removed_node_keeps_subtree_and_data() {
    let mut tree = DomTree::new();
    let (parent, kids) = parent_with(&mut tree, &["section"]);
    let text = tree.alloc_text("kept");
    tree.append_child(kids[0], text);

    tree.remove_child(parent, kids[0]);

    assert_eq!(tree.children(kids[0]), &[text]);
    assert_eq!(tree.text_content(kids[0]), "kept");
    assert!(!tree.is_connected(kids[0]));
    assert!(!tree.is_connected(text));
}

// ========== insert_before ==========

#[test]
fn test_insert_before_first() {
    let mut tree = DomTree::new();
    let (parent, kids) = parent_with(&mut tree, &["b"]);
    let a = tree.alloc_element("a");

    tree.insert_before(parent, a, kids[0]);

    assert_eq!(tree.children(parent), &[a, kids[0]]);
    assert_eq!(tree.parent(a), Some(parent));
    assert_eq!(tree.prev_sibling(a), None);
    assert_eq!(tree.next_sibling(a), Some(kids[0]));
    assert_eq!(tree.prev_sibling(kids[0]), Some(a));
}

#[test]
fn test_insert_before_middle() {
    let mut tree = DomTree::new();
    let (parent, kids) = parent_with(&mut tree, &["a", "c"]);
    let b = tree.alloc_element("b");

    tree.insert_before(parent, b, kids[1]);

    assert_eq!(tree.children(parent), &[kids[0], b, kids[1]]);
    assert_eq!(tree.next_sibling(kids[0]), Some(b));
    assert_eq!(tree.next_sibling(b), Some(kids[1]));
}

#[test]
fn test_insert_before_unknown_reference_appends() {
    let mut tree = DomTree::new();
    let (parent, kids) = parent_with(&mut tree, &["a"]);
    let stranger = tree.alloc_element("x");
    let b = tree.alloc_element("b");

    tree.insert_before(parent, b, stranger);

    assert_eq!(tree.children(parent), &[kids[0], b]);
}

// ========== replace_child ==========

#[test]
fn test_replace_child_keeps_position() {
    let mut tree = DomTree::new();
    let (parent, kids) = parent_with(&mut tree, &["a", "b", "c"]);
    let new = tree.alloc_element("z");

    tree.replace_child(parent, new, kids[1]);

    assert_eq!(tree.children(parent), &[kids[0], new, kids[2]]);
    assert_eq!(tree.prev_sibling(new), Some(kids[0]));
    assert_eq!(tree.next_sibling(new), Some(kids[2]));
    assert_detached(&tree, kids[1]);
}

// ========== move_children / clear_children ==========

#[test]
fn test_move_children_appends_after_existing() {
    let mut tree = DomTree::new();
    let (from, moved) = parent_with(&mut tree, &["y", "z"]);
    let (to, existing) = parent_with(&mut tree, &["x"]);

    tree.move_children(from, to);

    assert!(tree.children(from).is_empty());
    assert_eq!(tree.children(to), &[existing[0], moved[0], moved[1]]);
    assert_eq!(tree.next_sibling(existing[0]), Some(moved[0]));
    assert_eq!(tree.prev_sibling(moved[0]), Some(existing[0]));
    assert_eq!(tree.parent(moved[1]), Some(to));
}

#[test]
fn test_move_children_from_empty_is_noop() {
    let mut tree = DomTree::new();
    let (from, _) = parent_with(&mut tree, &[]);
    let (to, _) = parent_with(&mut tree, &[]);

    tree.move_children(from, to);

    assert!(tree.children(to).is_empty());
}

#[test]
fn test_clear_children_detaches_all() {
    let mut tree = DomTree::new();
    let (parent, kids) = parent_with(&mut tree, &["a", "b"]);

    tree.clear_children(parent);

    assert!(tree.children(parent).is_empty());
    for kid in kids {
        assert_detached(&tree, kid);
    }
}

// ========== traversal ==========

#[test]
fn test_descendants_are_preorder() {
    let mut tree = DomTree::new();
    let (parent, kids) = parent_with(&mut tree, &["a", "b"]);
    let inner = tree.alloc_element("i");
    tree.append_child(kids[0], inner);

    let order: Vec<NodeId> = tree.descendants(parent).collect();
    assert_eq!(order, vec![kids[0], inner, kids[1]]);

    let all: Vec<NodeId> = tree.iter_all().collect();
    assert_eq!(all, vec![NodeId::ROOT, parent, kids[0], inner, kids[1]]);
}

#[test]
fn test_sibling_iterators() {
    let mut tree = DomTree::new();
    let (_, kids) = parent_with(&mut tree, &["a", "b", "c", "d"]);

    let before: Vec<NodeId> = tree.preceding_siblings(kids[2]).collect();
    let after: Vec<NodeId> = tree.following_siblings(kids[1]).collect();

    assert_eq!(before, vec![kids[1], kids[0]]);
    assert_eq!(after, vec![kids[2], kids[3]]);
}

#[test]
fn test_ancestors_and_descendant_check() {
    let mut tree = DomTree::new();
    let (parent, kids) = parent_with(&mut tree, &["a"]);

    let chain: Vec<NodeId> = tree.ancestors(kids[0]).collect();
    assert_eq!(chain, vec![parent, NodeId::ROOT]);
    assert!(tree.is_descendant_of(kids[0], NodeId::ROOT));
    assert!(!tree.is_descendant_of(parent, kids[0]));
    assert_eq!(tree.document_element(), Some(parent));
}
