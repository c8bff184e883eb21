use crate::event::{Event, EventType};
use crate::page::Page;
use dom::NodeKey;
use std::collections::HashMap;
use std::rc::Rc;

pub(crate) type Handler = Rc<dyn Fn(&mut Page, &Event)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Listener {
    id: ListenerId,
    kind: EventType,
    once: bool,
    handler: Handler,
}

/// Listeners per target node, in registration order.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    by_target: HashMap<NodeKey, Vec<Listener>>,
    next_id: u64,
}

impl ListenerRegistry {
    pub(crate) fn add(
        &mut self,
        target: NodeKey,
        kind: EventType,
        once: bool,
        handler: Handler,
    ) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.by_target.entry(target).or_default().push(Listener {
            id,
            kind,
            once,
            handler,
        });
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        for listeners in self.by_target.values_mut() {
            if let Some(pos) = listeners.iter().position(|l| l.id == id) {
                listeners.remove(pos);
                return true;
            }
        }
        false
    }

    pub(crate) fn count(&self, target: NodeKey, kind: EventType) -> usize {
        self.by_target
            .get(&target)
            .map(|ls| ls.iter().filter(|l| l.kind == kind).count())
            .unwrap_or(0)
    }

    /// Snapshot the handlers for one dispatch. `once` listeners are removed
    /// here, so a handler that re-dispatches the same event cannot run them twice.
    pub(crate) fn take_for_dispatch(&mut self, target: NodeKey, kind: EventType) -> Vec<Handler> {
        let Some(listeners) = self.by_target.get_mut(&target) else {
            return Vec::new();
        };
        let handlers = listeners
            .iter()
            .filter(|l| l.kind == kind)
            .map(|l| Rc::clone(&l.handler))
            .collect();
        listeners.retain(|l| !(l.once && l.kind == kind));
        handlers
    }
}
