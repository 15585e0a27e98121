//! The "run this on the rendering thread" primitive.
//!
//! Parsing produces plain data on whatever thread calls it. Everything that
//! builds renderable objects (material resolution, texture decoding, geometry
//! nodes) is funnelled through a [`Dispatcher`] so hosts with thread-affine
//! rendering contexts can service it on the right thread.

/// Executes work on the thread that is allowed to create renderable objects.
pub trait Dispatcher {
    /// Run `job` on the target thread and block until it returns.
    fn invoke<F, R>(&self, job: F) -> R
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static;
}

/// Runs jobs inline on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentThread;

impl Dispatcher for CurrentThread {
    fn invoke<F, R>(&self, job: F) -> R
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        job()
    }
}
