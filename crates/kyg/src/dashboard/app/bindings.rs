use serde::Serialize;

/// Interactive affordances owned by the root app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Submit,
    Retry,
    Cancel,
}

impl Action {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Submit => "Retrieve and Validate",
            Self::Retry => "Retry",
            Self::Cancel => "Cancel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Binding {
    pub element_id: &'static str,
    pub action: Action,
}

/// Handlers bound during the current render pass.
///
/// Every pass starts from an empty table, so bindings from a discarded subtree
/// never survive and rebinding the same element replaces instead of stacking.
#[derive(Debug, Default, Clone)]
pub struct HandlerRegistry {
    bindings: Vec<Binding>,
    pass: u64,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn begin_pass(&mut self) -> u64 {
        self.bindings.clear();
        self.pass += 1;
        self.pass
    }

    pub(crate) fn bind(&mut self, element_id: &'static str, action: Action) {
        match self
            .bindings
            .iter_mut()
            .find(|binding| binding.element_id == element_id)
        {
            Some(existing) => existing.action = action,
            None => self.bindings.push(Binding { element_id, action }),
        }
    }

    pub fn lookup(&self, element_id: &str) -> Option<Action> {
        self.bindings
            .iter()
            .find(|binding| binding.element_id == element_id)
            .map(|binding| binding.action)
    }

    pub fn is_bound(&self, action: Action) -> bool {
        self.bindings.iter().any(|binding| binding.action == action)
    }

    pub fn count(&self, action: Action) -> usize {
        self.bindings
            .iter()
            .filter(|binding| binding.action == action)
            .count()
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn pass(&self) -> u64 {
        self.pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebinding_an_element_replaces_the_handler() {
        let mut registry = HandlerRegistry::new();
        registry.begin_pass();
        registry.bind("submit-btn", Action::Submit);
        registry.bind("submit-btn", Action::Submit);
        assert_eq!(registry.count(Action::Submit), 1);
    }

    #[test]
    fn new_pass_drops_previous_bindings() {
        let mut registry = HandlerRegistry::new();
        registry.begin_pass();
        registry.bind("cancel-btn", Action::Cancel);
        assert_eq!(registry.begin_pass(), 2);
        assert!(registry.lookup("cancel-btn").is_none());
        assert!(registry.bindings().is_empty());
    }
}
