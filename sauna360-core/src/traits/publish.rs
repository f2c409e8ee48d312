//! Entity update sink

use crate::entity::EntityUpdate;

/// Destination for entity state changes
///
/// The firmware forwards updates to a channel read by the console task;
/// tests collect them in a buffer.
pub trait Publish {
    /// Publish one update
    fn publish(&mut self, update: EntityUpdate);
}

impl<P: Publish + ?Sized> Publish for &mut P {
    fn publish(&mut self, update: EntityUpdate) {
        (**self).publish(update)
    }
}
