//! Session scope owning the task controller.
//!
//! A session is entered once per application run with the store it should
//! mirror. Collaborators borrow the controller through the scope; asking for
//! it before the session starts (or after it ends) is an error rather than a
//! silent fallback to some global instance.

use crate::controller::TaskController;
use crate::error::{Error, Result};
use crate::storage::BlobStorage;
use crate::store::TaskStore;

pub struct SessionScope<S> {
    controller: Option<TaskController<S>>,
}

impl<S> Default for SessionScope<S> {
    fn default() -> Self {
        Self { controller: None }
    }
}

impl<S: BlobStorage> SessionScope<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the session with a fresh controller over `store`.
    pub fn enter(&mut self, store: TaskStore<S>) -> Result<&mut TaskController<S>> {
        if self.controller.is_some() {
            return Err(Error::SessionActive);
        }
        Ok(self.controller.insert(TaskController::new(store)))
    }

    /// End the session, handing back its controller.
    pub fn exit(&mut self) -> Option<TaskController<S>> {
        self.controller.take()
    }

    pub fn is_active(&self) -> bool {
        self.controller.is_some()
    }

    pub fn controller(&self) -> Result<&TaskController<S>> {
        self.controller.as_ref().ok_or(Error::OutsideSession)
    }

    pub fn controller_mut(&mut self) -> Result<&mut TaskController<S>> {
        self.controller.as_mut().ok_or(Error::OutsideSession)
    }
}
