//! Test sink for entity updates

use core::cell::RefCell;

use heapless::Vec;

use crate::entity::EntityUpdate;
use crate::traits::Publish;

const CAPACITY: usize = 64;

/// Collects published updates; shared by reference between entities
pub struct Recorder {
    updates: RefCell<Vec<EntityUpdate, CAPACITY>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            updates: RefCell::new(Vec::new()),
        }
    }

    pub fn updates(&self) -> Vec<EntityUpdate, CAPACITY> {
        self.updates.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.updates.borrow().len()
    }

    pub fn last(&self) -> Option<EntityUpdate> {
        self.updates.borrow().last().cloned()
    }

    pub fn clear(&self) {
        self.updates.borrow_mut().clear();
    }
}

impl Publish for &Recorder {
    fn publish(&mut self, update: EntityUpdate) {
        self.updates
            .borrow_mut()
            .push(update)
            .expect("recorder full");
    }
}
