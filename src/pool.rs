/// A fixed-size worker pool driving one task dispatch per render.
///
/// The pool's public contract — `start`, `run_threads`, `stop` — mirrors a
/// persistent gated pool, but there is a single dispatch per render, so
/// `run_threads` is implemented with `std::thread::scope`: every call spawns
/// `thread_count` scoped threads against borrowed (non-`'static`) scene
/// data, and the implicit join at scope exit is the completion barrier.
/// This avoids the `unsafe` lifetime extension a literal persistent-thread
/// translation would require.
pub struct WorkerPool {
    thread_count: usize,
}

impl WorkerPool {
    pub fn start(thread_count: usize) -> Self {
        assert!(thread_count > 0, "worker pool needs at least one thread");
        WorkerPool { thread_count }
    }

    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    /// Calls `task(worker_index, thread_count)` once per worker, each on
    /// its own scoped thread, and blocks until every worker returns.
    pub fn run_threads<F>(&self, task: F)
    where
        F: Fn(usize, usize) + Sync,
    {
        std::thread::scope(|scope| {
            for worker in 0..self.thread_count {
                let task = &task;
                scope.spawn(move || task(worker, self.thread_count));
            }
        });
    }

    /// Like `run_threads`, but each worker's closure returns a value that
    /// is collected in worker-index order once every worker has joined.
    /// Used by the render loop so each worker can accumulate its strided
    /// share of pixels into a private buffer instead of writing through
    /// shared mutable state.
    pub fn run_threads_collect<F, R>(&self, task: F) -> Vec<R>
    where
        F: Fn(usize, usize) -> R + Sync,
        R: Send,
    {
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..self.thread_count)
                .map(|worker| {
                    let task = &task;
                    scope.spawn(move || task(worker, self.thread_count))
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("worker thread panicked"))
                .collect()
        })
    }

    pub fn stop(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn run_threads_invokes_every_worker_exactly_once() {
        let pool = WorkerPool::start(8);
        let seen = (0..8).map(|_| AtomicUsize::new(0)).collect::<Vec<_>>();
        pool.run_threads(|worker, total| {
            assert_eq!(total, 8);
            seen[worker].fetch_add(1, Ordering::SeqCst);
        });
        assert!(seen.iter().all(|c| c.load(Ordering::SeqCst) == 1));
        pool.stop();
    }

    #[test]
    fn run_threads_collect_preserves_worker_order() {
        let pool = WorkerPool::start(6);
        let results = pool.run_threads_collect(|worker, _total| worker * 10);
        assert_eq!(results, vec![0, 10, 20, 30, 40, 50]);
    }

    #[test]
    fn run_threads_can_be_called_more_than_once() {
        let pool = WorkerPool::start(4);
        let total = AtomicUsize::new(0);
        pool.run_threads(|_, _| {
            total.fetch_add(1, Ordering::SeqCst);
        });
        pool.run_threads(|_, _| {
            total.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(total.load(Ordering::SeqCst), 8);
    }
}
