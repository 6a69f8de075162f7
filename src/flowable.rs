//! Resumable block-level content.

use crate::container::Container;
use crate::error::ContainerExhausted;

/// Content that flows into a sequence of containers, resuming where it left
/// off after a container runs out of space.
pub trait Flowable {
    /// Reset to the start of the content for a fresh layout pass.
    fn begin_pass(&mut self);

    /// Lay out as much as fits into `container`.
    ///
    /// Returns the height consumed when the content is complete. On
    /// `Err` everything before the failure stays drawn and the next call
    /// continues with the first piece that did not fit. Once complete, further
    /// calls consume nothing until [`begin_pass`](Self::begin_pass).
    fn flow(&mut self, container: &mut dyn Container) -> Result<f32, ContainerExhausted>;

    fn is_complete(&self) -> bool;
}

impl<F: Flowable + ?Sized> Flowable for Box<F> {
    fn begin_pass(&mut self) {
        (**self).begin_pass();
    }

    fn flow(&mut self, container: &mut dyn Container) -> Result<f32, ContainerExhausted> {
        (**self).flow(container)
    }

    fn is_complete(&self) -> bool {
        (**self).is_complete()
    }
}
