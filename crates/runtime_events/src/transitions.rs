/// Stand-in for the page's stylesheet: which class toggles start a CSS
/// transition and how long it runs.
///
/// Toggling a listed class on a connected element schedules a
/// `transitionend` on that element after the duration. Classes without a rule
/// change instantly and never produce `transitionend`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransitionRules {
    rules: Vec<(String, u64)>,
}

impl TransitionRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, class: &str, duration_ms: u64) -> Self {
        self.insert(class, duration_ms);
        self
    }

    pub fn insert(&mut self, class: &str, duration_ms: u64) {
        match self.rules.iter_mut().find(|(c, _)| c == class) {
            Some((_, d)) => *d = duration_ms,
            None => self.rules.push((class.to_string(), duration_ms)),
        }
    }

    pub fn duration_for(&self, class: &str) -> Option<u64> {
        self.rules
            .iter()
            .find(|(c, _)| c == class)
            .map(|(_, d)| *d)
    }
}
