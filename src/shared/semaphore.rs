use std::sync::{Condvar, Mutex};

/// A counting semaphore bounding how many callers may hold a permit at
/// once. Built from the same `Mutex`+`Condvar` primitives the teacher's
/// `Cache` uses for its own internal synchronization, rather than reaching
/// for an external crate for something this small.
pub struct Semaphore {
    permits: Mutex<usize>,
    cond: Condvar,
}

impl Semaphore {
    pub fn new(permits: usize) -> Self {
        Semaphore { permits: Mutex::new(permits), cond: Condvar::new() }
    }

    /// Blocks until a permit is available, then takes it.
    pub fn acquire(&self) {
        let mut guard = self.permits.lock().unwrap();
        while *guard == 0 {
            guard = self.cond.wait(guard).unwrap();
        }
        *guard -= 1;
    }

    /// Returns a permit, waking one waiter if any is parked.
    pub fn release(&self) {
        let mut guard = self.permits.lock().unwrap();
        *guard += 1;
        self.cond.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn never_exceeds_permit_count() {
        let sem = Arc::new(Semaphore::new(3));
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let sem = Arc::clone(&sem);
                let current = Arc::clone(&current);
                let peak = Arc::clone(&peak);
                thread::spawn(move || {
                    sem.acquire();
                    let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(5));
                    current.fetch_sub(1, Ordering::SeqCst);
                    sem.release();
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert!(peak.load(Ordering::SeqCst) <= 3);
    }
}
