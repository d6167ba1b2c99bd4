mod components;

use oxide_vdom::{HostOp, Root, TestHost, TestNode, VNode};
pub(crate) use components::*;

mod component_lifecycle_tests;
mod event_tests;
mod form_tests;
mod hydration_tests;
mod keyed_children_tests;
mod props_tests;
mod state_update_tests;

pub(crate) fn given_an_empty_root() -> (Root<TestHost>, TestHost, TestNode) {
    let host = TestHost::new();
    let container = host.create_container();
    let root = Root::new(host.clone(), container);
    (root, host, container)
}

/// `<ul>` with one keyed `<li>` per key, each showing its key.
pub(crate) fn keyed_list(keys: &[&str]) -> VNode {
    VNode::element("ul").children(
        keys.iter()
            .map(|key| VNode::element("li").key(*key).child(*key)),
    )
}

pub(crate) fn structural_ops(host: &TestHost) -> Vec<HostOp> {
    host.ops().into_iter().filter(HostOp::is_structural).collect()
}

pub(crate) fn first_child(host: &TestHost, node: TestNode) -> TestNode {
    host.children_of(node)[0]
}
