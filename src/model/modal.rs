//! Modal stack for managing overlays
//!
//! Only the top modal receives input; the views underneath keep running.

/// Represents a modal overlay that can be displayed on top of the main UI
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    /// Quit confirmation dialog
    QuitConfirm,
    /// Help dialog showing all keyboard shortcuts
    Help,
    /// Run Evaluation dialog; its state lives in the dialog component
    RunEval,
    /// Confirmation before deleting a custom prompt
    ConfirmDelete {
        use_case_id: String,
        prompt_id: String,
        name: String,
    },
}

/// A stack of modal overlays
#[derive(Debug, Default)]
pub struct ModalStack {
    stack: Vec<Modal>,
}

impl ModalStack {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn push(&mut self, modal: Modal) {
        self.stack.push(modal);
    }

    pub fn pop(&mut self) -> Option<Modal> {
        self.stack.pop()
    }

    pub fn top(&self) -> Option<&Modal> {
        self.stack.last()
    }

    /// Bottom to top
    pub fn iter(&self) -> impl Iterator<Item = &Modal> {
        self.stack.iter()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Whether a modal of the same kind is anywhere on the stack
    pub fn contains(&self, modal: &Modal) -> bool {
        self.stack
            .iter()
            .any(|m| std::mem::discriminant(m) == std::mem::discriminant(modal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modal_stack_push_pop() {
        let mut stack = ModalStack::new();
        assert!(stack.is_empty());

        stack.push(Modal::RunEval);
        stack.push(Modal::QuitConfirm);

        assert_eq!(stack.pop(), Some(Modal::QuitConfirm));
        assert_eq!(stack.pop(), Some(Modal::RunEval));
        assert!(stack.top().is_none());
    }

    #[test]
    fn test_confirm_delete_carries_target() {
        let mut stack = ModalStack::new();
        stack.push(Modal::ConfirmDelete {
            use_case_id: "GKH".to_string(),
            prompt_id: "p2".to_string(),
            name: "Terse".to_string(),
        });

        match stack.top() {
            Some(Modal::ConfirmDelete { name, .. }) => assert_eq!(name, "Terse"),
            other => panic!("unexpected modal: {other:?}"),
        }
    }

    #[test]
    fn test_contains_ignores_payload() {
        let mut stack = ModalStack::new();
        stack.push(Modal::ConfirmDelete {
            use_case_id: "GKH".to_string(),
            prompt_id: "p2".to_string(),
            name: "Terse".to_string(),
        });
        assert!(stack.contains(&Modal::ConfirmDelete {
            use_case_id: String::new(),
            prompt_id: String::new(),
            name: String::new(),
        }));
        assert!(!stack.contains(&Modal::RunEval));
    }
}
