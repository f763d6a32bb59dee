use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chisel_mesh_cpu::MeshScratch;
use crossbeam_channel::{Receiver, Sender, bounded};

/// Lock-free pool for reusing mesh scratch buffers across worker jobs.
pub struct ScratchPool {
    available_tx: Sender<MeshScratch>,
    available_rx: Receiver<MeshScratch>,
    allocated: AtomicUsize,
    max_scratch: usize,
}

impl ScratchPool {
    pub fn new(max_scratch: usize) -> Self {
        debug_assert!(max_scratch > 0);
        let (tx, rx) = bounded(max_scratch);
        Self {
            available_tx: tx,
            available_rx: rx,
            allocated: AtomicUsize::new(0),
            max_scratch,
        }
    }

    pub fn with_capacity_from_workers(worker_count: usize) -> Arc<Self> {
        let count = worker_count.max(1) * 2;
        Arc::new(Self::new(count))
    }

    /// Acquire a scratch from the pool, creating a new one if under capacity.
    /// Blocks until one is returned when the pool is exhausted.
    pub fn acquire(&self) -> PooledScratch<'_> {
        if let Ok(scratch) = self.available_rx.try_recv() {
            return PooledScratch {
                scratch: Some(scratch),
                pool: self,
            };
        }

        loop {
            let current = self.allocated.load(Ordering::Acquire);
            if current < self.max_scratch {
                let prev = self.allocated.fetch_add(1, Ordering::AcqRel);
                if prev < self.max_scratch {
                    return PooledScratch {
                        scratch: Some(MeshScratch::new()),
                        pool: self,
                    };
                }
                self.allocated.fetch_sub(1, Ordering::AcqRel);
            }

            if let Ok(scratch) = self.available_rx.recv() {
                return PooledScratch {
                    scratch: Some(scratch),
                    pool: self,
                };
            }
        }
    }

    /// Scratch buffers created so far.
    pub fn allocated(&self) -> usize {
        self.allocated.load(Ordering::Acquire)
    }

    fn release(&self, scratch: MeshScratch) {
        let _ = self.available_tx.send(scratch);
    }
}

pub struct PooledScratch<'pool> {
    scratch: Option<MeshScratch>,
    pool: &'pool ScratchPool,
}

impl Deref for PooledScratch<'_> {
    type Target = MeshScratch;

    fn deref(&self) -> &Self::Target {
        self.scratch.as_ref().expect("scratch already released")
    }
}

impl DerefMut for PooledScratch<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.scratch.as_mut().expect("scratch already released")
    }
}

impl Drop for PooledScratch<'_> {
    fn drop(&mut self) {
        if let Some(scratch) = self.scratch.take() {
            self.pool.release(scratch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn released_scratch_is_reused() {
        let pool = ScratchPool::new(2);
        {
            let _a = pool.acquire();
            let _b = pool.acquire();
            assert_eq!(pool.allocated(), 2);
        }
        let _c = pool.acquire();
        assert_eq!(pool.allocated(), 2);
    }
}
