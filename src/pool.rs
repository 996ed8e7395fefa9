// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! A pool of reusable raw-deflate decompressors.
//!
//! Allocating a [`Decompress`] sets up a fresh inflate state and window, which is comparatively costly when many
//! small entries are read. A pool is owned by each [`ZipArchive`](crate::read::ZipArchive) (or shared between several
//! by passing it in explicitly) and hands out engines which return themselves, reset, when dropped.

use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use flate2::Decompress;

#[derive(Debug)]
pub struct DecompressorPool {
    idle: Mutex<Vec<Decompress>>,
    capacity: usize,
    allocated: AtomicUsize,
}

impl DecompressorPool {
    /// Constructs a pool which keeps at most `capacity` idle decompressors.
    pub fn new(capacity: usize) -> Arc<Self> {
        Arc::new(DecompressorPool { idle: Mutex::new(Vec::new()), capacity, allocated: AtomicUsize::new(0) })
    }

    /// Takes an idle decompressor from the pool, allocating one if none is available.
    pub fn acquire(self: &Arc<Self>) -> PooledDecompressor {
        let reused = self.idle.lock().unwrap_or_else(PoisonError::into_inner).pop();
        let inner = reused.unwrap_or_else(|| {
            self.allocated.fetch_add(1, Ordering::Relaxed);
            Decompress::new(false)
        });

        PooledDecompressor { inner: ManuallyDrop::new(inner), pool: Arc::clone(self) }
    }

    /// Returns the number of decompressors currently waiting in the pool.
    pub fn idle(&self) -> usize {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns the number of decompressors this pool has ever allocated.
    pub fn allocated(&self) -> usize {
        self.allocated.load(Ordering::Relaxed)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn release(&self, mut decompress: Decompress) {
        let mut idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        if idle.len() < self.capacity {
            decompress.reset(false);
            idle.push(decompress);
        }
    }
}

/// A decompressor on loan from a [`DecompressorPool`].
pub struct PooledDecompressor {
    inner: ManuallyDrop<Decompress>,
    pool: Arc<DecompressorPool>,
}

impl Deref for PooledDecompressor {
    type Target = Decompress;

    fn deref(&self) -> &Decompress {
        &self.inner
    }
}

impl DerefMut for PooledDecompressor {
    fn deref_mut(&mut self) -> &mut Decompress {
        &mut self.inner
    }
}

impl Drop for PooledDecompressor {
    fn drop(&mut self) {
        // SAFETY: `inner` is never accessed again after this point.
        let inner = unsafe { ManuallyDrop::take(&mut self.inner) };
        self.pool.release(inner);
    }
}
