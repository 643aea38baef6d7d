use std::ops::{Deref, DerefMut};

use crate::context::RenderContext;
use crate::writer::ResponseWriter;

/// Installs a response writer on a context for the lifetime of the guard.
///
/// The writer that was active before is put back when the guard drops, on
/// success, early return, and unwinding alike.
pub struct WriterScope<'a> {
    context: &'a mut RenderContext,
    original: Option<Box<dyn ResponseWriter>>,
}

impl<'a> WriterScope<'a> {
    pub fn install(context: &'a mut RenderContext, writer: Box<dyn ResponseWriter>) -> Self {
        let original = context.set_response_writer(Some(writer));
        Self { context, original }
    }
}

impl Deref for WriterScope<'_> {
    type Target = RenderContext;

    fn deref(&self) -> &Self::Target {
        &*self.context
    }
}

impl DerefMut for WriterScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.context
    }
}

impl Drop for WriterScope<'_> {
    fn drop(&mut self) {
        self.context.set_response_writer(self.original.take());
    }
}
