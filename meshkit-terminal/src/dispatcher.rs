use std::sync::mpsc;

use meshkit_core::Dispatcher;

/// Type-erased work closure sent to the main thread.
type MainThreadJob = Box<dyn FnOnce() + Send>;

/// Create a connected dispatcher handle and the queue serviced by the main thread.
pub fn channel() -> (MainThreadDispatcher, MainThreadQueue) {
    let (sender, receiver) = mpsc::channel();
    (
        MainThreadDispatcher { sender },
        MainThreadQueue { receiver },
    )
}

/// Handle used by loader threads to run model building on the main thread.
///
/// `invoke` blocks until the main thread has run the job. If the queue has
/// already been dropped the job runs on the calling thread instead.
#[derive(Clone)]
pub struct MainThreadDispatcher {
    sender: mpsc::Sender<MainThreadJob>,
}

impl Dispatcher for MainThreadDispatcher {
    fn invoke<F, R>(&self, job: F) -> R
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (result_tx, result_rx) = mpsc::sync_channel::<R>(1);
        let work: MainThreadJob = Box::new(move || {
            let _ = result_tx.send(job());
        });

        if let Err(mpsc::SendError(work)) = self.sender.send(work) {
            log::warn!("main thread queue is closed, running job on the loader thread");
            work();
        }

        match result_rx.recv() {
            Ok(result) => result,
            Err(_) => panic!("main thread dropped a dispatched job without running it"),
        }
    }
}

/// Receiving end owned by the main thread.
pub struct MainThreadQueue {
    receiver: mpsc::Receiver<MainThreadJob>,
}

impl MainThreadQueue {
    /// Run jobs until every dispatcher handle has been dropped. Returns the
    /// number of jobs executed.
    pub fn run(&self) -> usize {
        let mut executed = 0;
        for job in self.receiver.iter() {
            job();
            executed += 1;
        }
        executed
    }

    /// Run the jobs that are already queued without blocking.
    pub fn run_pending(&self) -> usize {
        let mut executed = 0;
        while let Ok(job) = self.receiver.try_recv() {
            job();
            executed += 1;
        }
        executed
    }
}
