use std::cell::RefCell;
use std::rc::Rc;

use crate::metrics::context::ContextListener;

/// Listener that keeps every context string it was handed.
#[derive(Debug, Clone, Default)]
pub(super) struct Recorder {
    pub(super) seen: Rc<RefCell<Vec<String>>>,
}

impl Recorder {
    pub(super) fn calls(&self) -> usize {
        self.seen.borrow().len()
    }

    pub(super) fn last(&self) -> Option<String> {
        self.seen.borrow().last().cloned()
    }
}

impl ContextListener for Recorder {
    fn context_changed(&mut self, context: &str) {
        self.seen.borrow_mut().push(context.to_string());
    }
}
