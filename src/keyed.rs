//! Keyed children reconciliation with a minimal number of moves.
//!
//! Matching prefixes and suffixes are patched in place first. What remains
//! is matched by key; old children without a match are removed, new ones
//! mounted, and only children outside the longest increasing subsequence of
//! old positions are moved.

use std::collections::HashMap;

use crate::arena::NodeId;
use crate::component::Context;
use crate::engine::Engine;
use crate::error::RenderError;
use crate::host::Host;
use crate::vnode::{Key, VNode};

/// Below either bound, keys are matched by scanning instead of building an
/// index.
const LINEAR_SCAN_MAX_LEN: usize = 4;
const LINEAR_SCAN_MAX_SPAN: usize = 32;

fn take(slot: &mut Option<VNode>) -> Result<VNode, RenderError> {
    slot.take().ok_or(RenderError::Detached)
}

impl<H: Host> Engine<H> {
    fn same_key(&self, id: NodeId, next: Option<&VNode>) -> bool {
        match (self.nodes.get(id), next) {
            (Some(record), Some(next)) => record.vnode.key == next.key,
            _ => false,
        }
    }

    fn key_of(&self, id: NodeId) -> Option<&Key> {
        self.nodes.get(id)?.vnode.key.as_ref()
    }

    /// Host node of the already reconciled child following `position`, the
    /// anchor new or moved children are inserted before.
    fn anchor_after(&self, result: &[Option<NodeId>], position: usize) -> Option<H::Node> {
        result
            .get(position + 1)
            .copied()
            .flatten()
            .and_then(|id| self.host_node(id))
    }

    fn insert_new(
        &mut self,
        next: VNode,
        parent: &H::Node,
        anchor: Option<&H::Node>,
        context: &Context,
        svg: bool,
    ) -> Result<NodeId, RenderError> {
        let id = self.mount(next, None, context, svg)?;
        let node = self.require_host(id)?;
        self.host.insert_or_append(parent, &node, anchor);
        Ok(id)
    }

    pub(crate) fn patch_keyed(
        &mut self,
        a: Vec<NodeId>,
        b: Vec<VNode>,
        parent: &H::Node,
        context: &Context,
        svg: bool,
    ) -> Result<Vec<NodeId>, RenderError> {
        let a_len = a.len();
        let b_len = b.len();
        let mut b: Vec<Option<VNode>> = b.into_iter().map(Some).collect();
        let mut result: Vec<Option<NodeId>> = vec![None; b_len];

        let mut start = 0;
        let mut a_end = a_len;
        let mut b_end = b_len;

        while start < a_end && start < b_end && self.same_key(a[start], b[start].as_ref()) {
            let next = take(&mut b[start])?;
            result[start] = Some(self.patch(a[start], next, parent, context, svg)?);
            start += 1;
        }
        while start < a_end && start < b_end && self.same_key(a[a_end - 1], b[b_end - 1].as_ref()) {
            a_end -= 1;
            b_end -= 1;
            let next = take(&mut b[b_end])?;
            result[b_end] = Some(self.patch(a[a_end], next, parent, context, svg)?);
        }

        if start >= a_end {
            if start < b_end {
                let anchor = self.anchor_after(&result, b_end - 1);
                for position in start..b_end {
                    let next = take(&mut b[position])?;
                    result[position] = Some(self.insert_new(next, parent, anchor.as_ref(), context, svg)?);
                }
            }
        } else if start >= b_end {
            for &last in &a[start..a_end] {
                self.remove(last, parent);
            }
        } else {
            self.patch_keyed_middle(&a, &mut b, &mut result, start, a_end, b_end, parent, context, svg)?;
        }

        result
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or(RenderError::Detached)
    }

    #[allow(clippy::too_many_arguments)]
    fn patch_keyed_middle(
        &mut self,
        a: &[NodeId],
        b: &mut [Option<VNode>],
        result: &mut [Option<NodeId>],
        start: usize,
        a_end: usize,
        b_end: usize,
        parent: &H::Node,
        context: &Context,
        svg: bool,
    ) -> Result<(), RenderError> {
        let a_len = a.len();
        let b_len = b.len();
        let a_left = a_end - start;
        let b_left = b_end - start;
        let b_start = start;
        let mut a_start = start;

        // Old position (plus one) of each remaining new child; zero means new.
        let mut sources = vec![0usize; b_left];
        let mut remove_whole = a_left == a_len;
        let mut moved = false;
        let mut pos = 0;
        let mut patched = 0;

        let index: Option<HashMap<Key, usize>> =
            if b_len < LINEAR_SCAN_MAX_LEN || (a_left | b_left) < LINEAR_SCAN_MAX_SPAN {
                None
            } else {
                Some(
                    (b_start..b_end)
                        .filter_map(|j| Some((b[j].as_ref()?.key.clone()?, j)))
                        .collect(),
                )
            };

        for i in start..a_end {
            let last = a[i];
            if patched >= b_left {
                if !remove_whole {
                    self.remove(last, parent);
                }
                continue;
            }

            let found = match &index {
                None => (b_start..b_end)
                    .find(|&j| sources[j - b_start] == 0 && self.same_key(last, b[j].as_ref())),
                Some(index) => self
                    .key_of(last)
                    .and_then(|key| index.get(key))
                    .copied()
                    .filter(|&j| sources[j - b_start] == 0),
            };
            let Some(j) = found else {
                if !remove_whole {
                    self.remove(last, parent);
                }
                continue;
            };

            sources[j - b_start] = i + 1;
            if remove_whole {
                remove_whole = false;
                while a_start < i {
                    self.remove(a[a_start], parent);
                    a_start += 1;
                }
            }
            if pos > j {
                moved = true;
            } else {
                pos = j;
            }
            let next = take(&mut b[j])?;
            result[j] = Some(self.patch(last, next, parent, context, svg)?);
            patched += 1;
        }

        tracing::trace!(a_left, b_left, patched, moved, remove_whole, "matched keyed children");

        if remove_whole {
            for &last in a {
                self.unmount(last);
            }
            self.host.clear_children(parent);
            for position in 0..b_len {
                let next = take(&mut b[position])?;
                result[position] = Some(self.mount(next, Some(parent), context, svg)?);
            }
        } else if moved {
            let stable = longest_increasing_subsequence(&sources);
            let mut remaining = stable.len();
            for i in (0..b_left).rev() {
                let position = i + b_start;
                let anchor = self.anchor_after(result, position);
                if sources[i] == 0 {
                    let next = take(&mut b[position])?;
                    result[position] = Some(self.insert_new(next, parent, anchor.as_ref(), context, svg)?);
                } else if remaining == 0 || i != stable[remaining - 1] {
                    let id = result[position].ok_or(RenderError::Detached)?;
                    let node = self.require_host(id)?;
                    self.host.insert_or_append(parent, &node, anchor.as_ref());
                } else {
                    remaining -= 1;
                }
            }
        } else if patched != b_left {
            for i in (0..b_left).rev() {
                if sources[i] == 0 {
                    let position = i + b_start;
                    let anchor = self.anchor_after(result, position);
                    let next = take(&mut b[position])?;
                    result[position] = Some(self.insert_new(next, parent, anchor.as_ref(), context, svg)?);
                }
            }
        }
        Ok(())
    }
}

/// Indices of a longest strictly increasing subsequence of the non-zero
/// entries of `sources`, in ascending order.
pub(crate) fn longest_increasing_subsequence(sources: &[usize]) -> Vec<usize> {
    let mut predecessors = vec![0usize; sources.len()];
    let mut tails: Vec<usize> = Vec::new();

    for (i, &value) in sources.iter().enumerate() {
        if value == 0 {
            continue;
        }
        match tails.last() {
            None => {
                tails.push(i);
                continue;
            }
            Some(&last) if sources[last] < value => {
                predecessors[i] = last;
                tails.push(i);
                continue;
            }
            Some(_) => {}
        }
        let slot = tails.partition_point(|&index| sources[index] < value);
        if value < sources[tails[slot]] {
            if slot > 0 {
                predecessors[i] = tails[slot - 1];
            }
            tails[slot] = i;
        }
    }

    let mut sequence = vec![0usize; tails.len()];
    let mut cursor = tails.last().copied().unwrap_or_default();
    for slot in (0..tails.len()).rev() {
        sequence[slot] = cursor;
        cursor = predecessors[cursor];
    }
    sequence
}
