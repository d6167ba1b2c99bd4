//! Deferred callbacks and the queue of pending state updates.

use core::any::Any;
use std::collections::VecDeque;
use std::rc::Rc;

use flume::{Receiver, Sender};
use indexmap::IndexMap;

use crate::arena::NodeId;
use crate::component::ErasedHooks;
use crate::vnode::RefCallback;

/// A queued edit of one component's state.
pub(crate) enum Change {
    Apply(Box<dyn FnOnce(&mut dyn Any)>),
    Force,
}

pub(crate) struct StateUpdate {
    pub(crate) id: NodeId,
    pub(crate) change: Change,
}

/// Callback held back until the structural work of a pass is complete.
pub(crate) enum Deferred<N> {
    ElementRef {
        callback: RefCallback,
        node: N,
    },
    DidMount(NodeId),
    HookDidMount {
        hooks: Rc<ErasedHooks>,
        props: Rc<dyn Any>,
    },
}

/// Receiving side of the state update channel.
///
/// Updates are pulled from the channel into a backlog so that the ones for a
/// single instance can be taken out ahead of the rest while it renders.
pub(crate) struct UpdateQueue {
    sender: Sender<StateUpdate>,
    receiver: Receiver<StateUpdate>,
    backlog: VecDeque<StateUpdate>,
}

impl UpdateQueue {
    pub(crate) fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self {
            sender,
            receiver,
            backlog: VecDeque::new(),
        }
    }

    pub(crate) fn sender(&self) -> Sender<StateUpdate> {
        self.sender.clone()
    }

    fn pull(&mut self) {
        self.backlog.extend(self.receiver.try_iter());
    }

    pub(crate) fn is_empty(&mut self) -> bool {
        self.pull();
        self.backlog.is_empty()
    }

    /// Take every queued change for `id`, in the order they were sent.
    pub(crate) fn take_for(&mut self, id: NodeId) -> Vec<Change> {
        self.pull();
        let mut taken = Vec::new();
        let mut rest = VecDeque::with_capacity(self.backlog.len());
        for update in self.backlog.drain(..) {
            if update.id == id {
                taken.push(update.change);
            } else {
                rest.push_back(update);
            }
        }
        self.backlog = rest;
        taken
    }

    /// Take everything queued so far, grouped per instance in first-seen
    /// order.
    pub(crate) fn take_all(&mut self) -> IndexMap<NodeId, Vec<Change>> {
        self.pull();
        let mut grouped: IndexMap<NodeId, Vec<Change>> = IndexMap::new();
        for update in self.backlog.drain(..) {
            grouped.entry(update.id).or_default().push(update.change);
        }
        grouped
    }

    /// Wait until at least one update is queued.
    pub(crate) async fn wait(&mut self) {
        if !self.is_empty() {
            return;
        }
        if let Ok(update) = self.receiver.recv_async().await {
            self.backlog.push_back(update);
        }
    }
}
