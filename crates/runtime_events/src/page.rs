use crate::event::{Event, EventType};
use crate::listeners::{ListenerId, ListenerRegistry};
use crate::scheduler::{Scheduler, TimerId};
use crate::transitions::TransitionRules;
use dom::{Document, DomError, NodeKey};
use std::collections::HashSet;
use std::rc::Rc;

/// Upper bound on tasks `run_until_idle` will run; guards against a task that
/// keeps rescheduling itself.
const IDLE_TASK_LIMIT: usize = 10_000;

/// A live document plus its listeners, clock and style transitions.
pub struct Page {
    doc: Document,
    listeners: ListenerRegistry,
    scheduler: Scheduler,
    transitions: TransitionRules,
    wired: HashSet<(NodeKey, &'static str)>,
}

impl Page {
    pub fn new(doc: Document) -> Self {
        Self::with_transitions(doc, TransitionRules::default())
    }

    pub fn with_transitions(doc: Document, transitions: TransitionRules) -> Self {
        Self {
            doc,
            listeners: ListenerRegistry::default(),
            scheduler: Scheduler::default(),
            transitions,
            wired: HashSet::new(),
        }
    }

    pub fn parse(markup: &str) -> Self {
        Self::new(Document::parse(markup))
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn doc_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn transitions(&self) -> &TransitionRules {
        &self.transitions
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now()
    }

    // --- wiring bookkeeping ---------------------------------------------

    /// Record that `role` behavior was attached to `key`. Returns `false` if it
    /// already was, in which case the caller must not attach again.
    pub fn mark_wired(&mut self, key: NodeKey, role: &'static str) -> bool {
        self.wired.insert((key, role))
    }

    pub fn is_wired(&self, key: NodeKey, role: &'static str) -> bool {
        self.wired.contains(&(key, role))
    }

    // --- listeners ------------------------------------------------------

    pub fn add_listener<F>(&mut self, target: NodeKey, kind: EventType, handler: F) -> ListenerId
    where
        F: Fn(&mut Page, &Event) + 'static,
    {
        self.listeners.add(target, kind, false, Rc::new(handler))
    }

    /// Listener removed after its first delivery.
    pub fn add_listener_once<F>(
        &mut self,
        target: NodeKey,
        kind: EventType,
        handler: F,
    ) -> ListenerId
    where
        F: Fn(&mut Page, &Event) + 'static,
    {
        self.listeners.add(target, kind, true, Rc::new(handler))
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn listener_count(&self, target: NodeKey, kind: EventType) -> usize {
        self.listeners.count(target, kind)
    }

    // --- events ---------------------------------------------------------

    /// Deliver `kind` to the listeners on `target`, in registration order.
    /// Returns the number of handlers run. Events do not bubble.
    pub fn dispatch(&mut self, kind: EventType, target: NodeKey) -> usize {
        self.deliver(Event {
            kind,
            target,
            time_ms: self.scheduler.now(),
            property: None,
        })
    }

    fn deliver(&mut self, event: Event) -> usize {
        let (kind, target) = (event.kind, event.target);
        let handlers = self.listeners.take_for_dispatch(target, kind);
        log::trace!(
            target: "runtime.events",
            "dispatch {kind} to {target} ({} handlers)",
            handlers.len()
        );
        for handler in &handlers {
            handler(self, &event);
        }
        handlers.len()
    }

    pub fn click(&mut self, target: NodeKey) -> usize {
        self.dispatch(EventType::Click, target)
    }

    /// Script-style value write followed by a `change` notification.
    pub fn set_value_and_notify(&mut self, target: NodeKey, value: &str) -> Result<(), DomError> {
        self.doc.set_value(target, value)?;
        self.dispatch(EventType::Change, target);
        Ok(())
    }

    /// Script-style checkedness write followed by a `change` notification.
    pub fn set_checked_and_notify(&mut self, target: NodeKey, checked: bool) -> Result<(), DomError> {
        self.doc.set_checked(target, checked)?;
        self.dispatch(EventType::Change, target);
        Ok(())
    }

    // --- classes and transitions -----------------------------------------

    /// Add a class and start its transition, if the stylesheet declares one.
    pub fn add_class(&mut self, key: NodeKey, class: &str) -> Result<bool, DomError> {
        let changed = self.doc.add_class(key, class)?;
        if changed {
            self.start_transition(key, class);
        }
        Ok(changed)
    }

    /// Remove a class and start its transition, if the stylesheet declares one.
    pub fn remove_class(&mut self, key: NodeKey, class: &str) -> Result<bool, DomError> {
        let changed = self.doc.remove_class(key, class)?;
        if changed {
            self.start_transition(key, class);
        }
        Ok(changed)
    }

    fn start_transition(&mut self, key: NodeKey, class: &str) {
        let Some(duration) = self.transitions.duration_for(class) else {
            return;
        };
        // Detached elements have no computed style, so nothing animates.
        if !self.doc.is_connected(key) {
            return;
        }
        log::trace!(target: "runtime.events", "transition on {key} for .{class}: {duration}ms");
        let property = class.to_string();
        self.scheduler.set_timeout(
            duration,
            Box::new(move |page: &mut Page| {
                let event = Event {
                    kind: EventType::TransitionEnd,
                    target: key,
                    time_ms: page.now_ms(),
                    property: Some(property),
                };
                page.deliver(event);
            }),
        );
    }

    // --- scheduling -----------------------------------------------------

    pub fn set_timeout<F>(&mut self, delay_ms: u64, task: F) -> TimerId
    where
        F: FnOnce(&mut Page) + 'static,
    {
        self.scheduler.set_timeout(delay_ms, Box::new(task))
    }

    pub fn request_animation_frame<F>(&mut self, task: F)
    where
        F: FnOnce(&mut Page) + 'static,
    {
        self.scheduler.request_frame(Box::new(task));
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending_timers()
    }

    pub fn has_pending_frames(&self) -> bool {
        self.scheduler.has_frames()
    }

    /// Run one animation frame: every callback requested before this call.
    pub fn run_animation_frame(&mut self) -> usize {
        let tasks = self.scheduler.take_frame();
        let ran = tasks.len();
        for task in tasks {
            task(self);
        }
        ran
    }

    /// Let `ms` of virtual time pass. Pending animation frames run first at
    /// every step, then the earliest due timer, with the clock set to its due
    /// time. Returns the number of tasks run.
    pub fn advance(&mut self, ms: u64) -> usize {
        let target = self.scheduler.now().saturating_add(ms);
        let mut ran = 0;
        loop {
            if self.scheduler.has_frames() {
                ran += self.run_animation_frame();
                continue;
            }
            let Some((due, task)) = self.scheduler.pop_due(target) else {
                break;
            };
            self.scheduler.set_now(due);
            task(self);
            ran += 1;
        }
        self.scheduler.set_now(target);
        ran
    }

    /// Run frames and timers until both queues are empty, moving the clock to
    /// each timer's due time.
    pub fn run_until_idle(&mut self) -> usize {
        let mut ran = 0;
        while ran < IDLE_TASK_LIMIT {
            if self.scheduler.has_frames() {
                ran += self.run_animation_frame();
                continue;
            }
            let Some(due) = self.scheduler.next_due() else {
                return ran;
            };
            if let Some((due, task)) = self.scheduler.pop_due(due) {
                self.scheduler.set_now(due);
                task(self);
                ran += 1;
            }
        }
        log::warn!(target: "runtime.events", "run_until_idle stopped after {ran} tasks");
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn page() -> (Page, NodeKey) {
        let page = Page::parse(r#"<div id="t"></div>"#);
        let target = page.doc().get_element_by_id("t").unwrap();
        (page, target)
    }

    #[test]
    fn dispatch_runs_listeners_in_registration_order() {
        let (mut page, target) = page();
        let log = Rc::new(RefCell::new(Vec::new()));
        for n in 0..3 {
            let log = Rc::clone(&log);
            page.add_listener(target, EventType::Click, move |_, _| log.borrow_mut().push(n));
        }
        assert_eq!(page.click(target), 3);
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
        assert_eq!(page.dispatch(EventType::Change, target), 0);
    }

    #[test]
    fn once_listener_runs_once() {
        let (mut page, target) = page();
        let hits = Rc::new(RefCell::new(0));
        let h = Rc::clone(&hits);
        page.add_listener_once(target, EventType::TransitionEnd, move |_, _| *h.borrow_mut() += 1);
        page.dispatch(EventType::TransitionEnd, target);
        page.dispatch(EventType::TransitionEnd, target);
        assert_eq!(*hits.borrow(), 1);
        assert_eq!(page.listener_count(target, EventType::TransitionEnd), 0);
    }

    #[test]
    fn removed_listener_no_longer_runs() {
        let (mut page, target) = page();
        let hits = Rc::new(RefCell::new(0));
        let h = Rc::clone(&hits);
        let id = page.add_listener(target, EventType::Change, move |_, _| *h.borrow_mut() += 1);
        page.dispatch(EventType::Change, target);
        assert!(page.remove_listener(id));
        assert!(!page.remove_listener(id));
        page.dispatch(EventType::Change, target);
        assert_eq!(*hits.borrow(), 1);
        assert_eq!(page.listener_count(target, EventType::Change), 0);
    }

    #[test]
    fn timers_run_in_due_then_scheduling_order() {
        let (mut page, _) = page();
        let log = Rc::new(RefCell::new(Vec::new()));
        for (delay, label) in [(20, "b"), (10, "a"), (20, "c")] {
            let log = Rc::clone(&log);
            page.set_timeout(delay, move |page| {
                log.borrow_mut().push((label, page.now_ms()));
            });
        }
        assert_eq!(page.advance(15), 1);
        assert_eq!(page.now_ms(), 15);
        page.advance(5);
        assert_eq!(*log.borrow(), vec![("a", 10), ("b", 20), ("c", 20)]);
    }

    #[test]
    fn nested_animation_frames_need_two_frames() {
        let (mut page, target) = page();
        page.request_animation_frame(move |page| {
            page.request_animation_frame(move |page| {
                page.doc_mut().add_class(target, "done").unwrap();
            });
        });
        assert_eq!(page.run_animation_frame(), 1);
        assert!(!page.doc().has_class(target, "done"));
        assert_eq!(page.run_animation_frame(), 1);
        assert!(page.doc().has_class(target, "done"));
    }

    #[test]
    fn class_with_transition_fires_transitionend_after_duration() {
        let doc = Document::parse(r#"<div id="t"></div>"#);
        let target = doc.get_element_by_id("t").unwrap();
        let mut page = Page::with_transitions(doc, TransitionRules::new().with("fade", 200));
        let fired = Rc::new(RefCell::new(None));
        let f = Rc::clone(&fired);
        page.add_listener(target, EventType::TransitionEnd, move |_, e| {
            *f.borrow_mut() = Some((e.time_ms, e.property.clone()));
        });
        page.add_class(target, "fade").unwrap();
        page.add_class(target, "plain").unwrap();
        page.advance(199);
        assert!(fired.borrow().is_none());
        page.advance(1);
        assert_eq!(*fired.borrow(), Some((200, Some("fade".to_string()))));
        assert_eq!(page.pending_timers(), 0);
    }

    #[test]
    fn detached_elements_do_not_transition() {
        let mut page = Page::with_transitions(Document::new(), TransitionRules::new().with("fade", 50));
        let loose = page.doc_mut().create_element("div", &[]);
        page.add_class(loose, "fade").unwrap();
        assert_eq!(page.pending_timers(), 0);
    }

    #[test]
    fn run_until_idle_drains_frames_and_timers() {
        let (mut page, target) = page();
        page.set_timeout(100, move |page| {
            page.request_animation_frame(move |page| {
                page.doc_mut().set_attr(target, "data-x", "1").unwrap();
            });
        });
        assert_eq!(page.run_until_idle(), 2);
        assert_eq!(page.now_ms(), 100);
        assert_eq!(page.doc().attr(target, "data-x"), Some("1"));
    }

    #[test]
    fn mark_wired_is_per_role() {
        let (mut page, target) = page();
        assert!(page.mark_wired(target, "remover"));
        assert!(!page.mark_wired(target, "remover"));
        assert!(page.mark_wired(target, "mirror"));
        assert!(page.is_wired(target, "remover"));
    }
}
