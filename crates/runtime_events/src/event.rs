use dom::NodeKey;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    Change,
    TransitionEnd,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EventType::Click => "click",
            EventType::Change => "change",
            EventType::TransitionEnd => "transitionend",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub kind: EventType,
    pub target: NodeKey,
    /// Virtual time (ms) at dispatch.
    pub time_ms: u64,
    /// For `transitionend`, the class whose toggle started the transition.
    pub property: Option<String>,
}

impl Event {
    /// True for a `transitionend` started by toggling `class`.
    pub fn is_transition_of(&self, class: &str) -> bool {
        self.kind == EventType::TransitionEnd && self.property.as_deref() == Some(class)
    }
}
