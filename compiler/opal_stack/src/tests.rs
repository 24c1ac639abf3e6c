use super::*;

#[test]
fn nested_list_depth() {
    enum Tree {
        Leaf,
        Node(Box<Tree>),
    }

    fn depth(tree: &Tree) -> usize {
        ensure_sufficient_stack(|| match tree {
            Tree::Leaf => 0,
            Tree::Node(inner) => depth(inner) + 1,
        })
    }

    let mut tree = Tree::Leaf;
    for _ in 0..50_000 {
        tree = Tree::Node(Box::new(tree));
    }
    assert_eq!(depth(&tree), 50_000);

    // Unwind iteratively so the drop itself cannot overflow.
    while let Tree::Node(inner) = tree {
        tree = *inner;
    }
}

#[test]
fn passes_result_through() {
    let result: Result<u8, &str> = ensure_sufficient_stack(|| Err("boom"));
    assert_eq!(result, Err("boom"));
}
