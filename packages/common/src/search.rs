use markweave_parser::{Node, NodeRef};

/// Collect every node satisfying `predicate`, in pre-order: a node is
/// visited before its children, and the root itself is a candidate.
///
/// Both blocking-rule gating and active-rule matching use this search, so
/// the order of the returned list is the order handlers are scheduled in.
pub fn find_all<F>(predicate: F, root: &NodeRef) -> Vec<NodeRef>
where
    F: Fn(&Node) -> bool,
{
    let mut matches = Vec::new();
    collect(&predicate, root, &mut matches);
    matches
}

fn collect<F>(predicate: &F, node: &NodeRef, matches: &mut Vec<NodeRef>)
where
    F: Fn(&Node) -> bool,
{
    if predicate(&node.borrow()) {
        matches.push(node.clone());
    }
    let children = node.borrow().children.clone();
    for child in &children {
        collect(predicate, child, matches);
    }
}

/// Walk the tree in pre-order, handing each node to `visitor`. Returning
/// `false` from the visitor prunes that node's subtree; siblings are still
/// visited.
pub fn descendants<F>(root: &NodeRef, visitor: &mut F)
where
    F: FnMut(&NodeRef) -> bool,
{
    if !visitor(root) {
        return;
    }
    let children = root.borrow().children.clone();
    for child in &children {
        descendants(child, visitor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markweave_parser::parse;

    #[test]
    fn find_all_visits_node_before_children() {
        let root = parse(r#"<div id="1"><div id="2"><div id="3"></div></div><div id="4"></div></div>"#)
            .unwrap();
        let found = find_all(|node| node.tag == "div", &root);
        let ids: Vec<_> = found
            .iter()
            .map(|n| n.borrow().attribute("id").unwrap_or_default().to_string())
            .collect();
        assert_eq!(ids, ["1", "2", "3", "4"]);
    }

    #[test]
    fn find_all_includes_root() {
        let root = parse("<span>x</span>").unwrap();
        assert_eq!(find_all(|node| node.tag == "span", &root).len(), 1);
    }

    #[test]
    fn find_all_empty_when_nothing_matches() {
        let root = parse("<div><span>x</span></div>").unwrap();
        assert!(find_all(|node| node.tag == "script", &root).is_empty());
    }

    #[test]
    fn descendants_prunes_subtree_on_false() {
        let root = parse("<a><b><c></c></b><d></d></a>").unwrap();
        let mut seen = Vec::new();
        descendants(&root, &mut |node| {
            let tag = node.borrow().tag.clone();
            let keep_on = tag != "b";
            seen.push(tag);
            keep_on
        });
        // `c` is skipped because `b` pruned its subtree, `d` still runs.
        assert_eq!(seen, ["a", "b", "d"]);
    }
}
