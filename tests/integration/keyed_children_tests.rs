use oxide_vdom::{HostOp, VNode};

use super::{first_child, given_an_empty_root, keyed_list, structural_ops, Counter, CounterProps};

#[test]
fn given_a_rotated_list_should_move_a_single_node() {
    let (mut root, host, container) = given_an_empty_root();
    root.render(keyed_list(&["a", "b", "c"])).unwrap();
    host.clear_ops();

    root.render(keyed_list(&["c", "a", "b"])).unwrap();

    let ops = structural_ops(&host);
    assert_eq!(ops.len(), 1);
    assert!(matches!(ops[0], HostOp::InsertBefore { .. }));
    assert_eq!(host.html(container), "<ul><li>c</li><li>a</li><li>b</li></ul>");
}

#[test]
fn given_a_reordered_list_should_keep_host_nodes_by_key() {
    let (mut root, host, container) = given_an_empty_root();
    root.render(keyed_list(&["a", "b", "c", "d"])).unwrap();
    let list = first_child(&host, container);
    let before = host.children_of(list);

    root.render(keyed_list(&["d", "b", "a", "c"])).unwrap();

    let after = host.children_of(list);
    assert_eq!(after, vec![before[3], before[1], before[0], before[2]]);
}

#[test]
fn given_an_item_inserted_in_the_middle_should_insert_before_its_successor() {
    let (mut root, host, container) = given_an_empty_root();
    root.render(keyed_list(&["a", "c"])).unwrap();
    let list = first_child(&host, container);
    let c = host.children_of(list)[1];
    host.clear_ops();

    root.render(keyed_list(&["a", "b", "c"])).unwrap();

    let ops = structural_ops(&host);
    assert!(ops
        .iter()
        .any(|op| matches!(op, HostOp::InsertBefore { parent, anchor, .. } if *parent == list && *anchor == c)));
    assert_eq!(host.html(container), "<ul><li>a</li><li>b</li><li>c</li></ul>");
}

#[test]
fn given_removed_items_should_remove_only_those_nodes() {
    let (mut root, host, container) = given_an_empty_root();
    root.render(keyed_list(&["a", "b", "c", "d"])).unwrap();
    host.clear_ops();

    root.render(keyed_list(&["a", "c"])).unwrap();

    let removals = structural_ops(&host)
        .into_iter()
        .filter(|op| matches!(op, HostOp::RemoveChild { .. }))
        .count();
    assert_eq!(removals, 2);
    assert_eq!(host.html(container), "<ul><li>a</li><li>c</li></ul>");
    assert_eq!(root.mounted_nodes(), 5);
}

#[test]
fn given_no_common_keys_should_clear_and_rebuild_the_list() {
    let (mut root, host, container) = given_an_empty_root();
    root.render(keyed_list(&["a", "b"])).unwrap();
    host.clear_ops();

    root.render(keyed_list(&["x", "y", "z"])).unwrap();

    assert!(host
        .ops()
        .iter()
        .any(|op| matches!(op, HostOp::ClearChildren { .. })));
    assert_eq!(host.html(container), "<ul><li>x</li><li>y</li><li>z</li></ul>");
}

#[test]
fn given_a_long_shuffled_list_should_reconcile_to_the_new_order() {
    let (mut root, host, container) = given_an_empty_root();
    let keys: Vec<String> = (0..40).map(|i| format!("k{i}")).collect();
    let shuffled: Vec<String> = keys.iter().rev().step_by(2).chain(keys.iter().step_by(2)).cloned().collect();
    let render = |keys: &[String]| {
        VNode::element("ol").children(keys.iter().map(|key| VNode::element("li").key(key.clone()).child(key)))
    };
    root.render(render(&keys)).unwrap();

    root.render(render(&shuffled)).unwrap();

    let expected: String = shuffled.iter().map(|key| format!("<li>{key}</li>")).collect();
    assert_eq!(host.html(container), format!("<ol>{expected}</ol>"));
}

/// Length of the longest increasing run, not necessarily contiguous.
fn increasing_subsequence_len(order: &[usize]) -> usize {
    let mut lengths = vec![1; order.len()];
    for i in 0..order.len() {
        for j in 0..i {
            if order[j] < order[i] {
                lengths[i] = lengths[i].max(lengths[j] + 1);
            }
        }
    }
    lengths.into_iter().max().unwrap_or(0)
}

#[test]
fn given_permutations_should_move_only_nodes_outside_the_increasing_subsequence() {
    let permutations: Vec<Vec<usize>> = vec![
        vec![1, 0, 3, 2, 5, 4],
        vec![0, 4, 2, 3, 1],
        vec![4, 3, 2, 1, 0],
        (0..40).map(|i| (i * 7) % 40).collect(),
        (0..40).rev().collect(),
    ];
    let render = |keys: &[String]| {
        VNode::element("ol").children(keys.iter().map(|key| VNode::element("li").key(key.clone()).child(key)))
    };

    for order in permutations {
        let (mut root, host, container) = given_an_empty_root();
        let keys: Vec<String> = (0..order.len()).map(|i| format!("k{i}")).collect();
        root.render(render(&keys)).unwrap();
        let list = first_child(&host, container);
        let before = host.children_of(list);
        host.clear_ops();

        let reordered: Vec<String> = order.iter().map(|&i| keys[i].clone()).collect();
        root.render(render(&reordered)).unwrap();

        let moves = structural_ops(&host);
        assert_eq!(moves.len(), order.len() - increasing_subsequence_len(&order), "{order:?}");
        assert!(moves
            .iter()
            .all(|op| matches!(op, HostOp::InsertBefore { .. } | HostOp::AppendChild { .. })));
        let expected: Vec<_> = order.iter().map(|&i| before[i]).collect();
        assert_eq!(host.children_of(list), expected, "{order:?}");
    }
}

#[test]
fn given_keyed_components_when_reordered_should_keep_their_instances() {
    let (mut root, _host, _container) = given_an_empty_root();
    let props = CounterProps::default();
    let render = |keys: [&str; 2]| {
        VNode::element("div").children(keys.map(|key| VNode::component::<Counter>(props.clone()).key(key)))
    };
    root.render(render(["first", "second"])).unwrap();

    root.render(render(["second", "first"])).unwrap();

    assert_eq!(props.links.borrow().len(), 2);
}

#[test]
fn given_unkeyed_children_when_shortened_should_truncate_the_tail() {
    let (mut root, host, container) = given_an_empty_root();
    root.render(VNode::element("div").unkeyed_children(["a", "b", "c"])).unwrap();
    host.clear_ops();

    root.render(VNode::element("div").unkeyed_children(["a"])).unwrap();

    assert_eq!(structural_ops(&host).len(), 2);
    assert_eq!(host.html(container), "<div>a</div>");
}
