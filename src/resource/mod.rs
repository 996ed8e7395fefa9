// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! Accounting for the streams which are open against an archive.
//!
//! Every entry stream registers itself with the [`ResourceAccountant`] of the archive it was opened from and
//! unregisters on close (or drop). Before an archive is rewritten or closed, the accountant is asked to wait for the
//! streams of other threads to close, and may forcibly close those that remain. Registrations are weak, so a stream
//! which was leaked without being closed is noticed by [`ResourceAccountant::sweep()`] once it becomes unreachable.

mod sweep;

pub use sweep::Sweeper;

use crate::chain::SequentialErrors;
use crate::error::{Result, ZipError};

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

/// The longest a waiter sleeps before re-checking the registry and its interrupt.
const WAIT_SLICE: Duration = Duration::from_millis(10);

/// Something which can be forcibly closed by a [`ResourceAccountant`].
pub trait Resource: Send + Sync {
    /// Closes this resource so that any further I/O through it fails.
    ///
    /// Must be idempotent.
    fn close_resource(&self) -> Result<()>;
}

struct Registration {
    resource: Weak<dyn Resource>,
    thread: ThreadId,
}

impl Registration {
    fn is_live(&self) -> bool {
        self.resource.strong_count() > 0
    }
}

#[derive(Default)]
struct Registry {
    entries: HashMap<usize, Registration>,
}

impl Registry {
    fn sweep(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, registration| registration.is_live());
        before - self.entries.len()
    }

    fn count_other(&self, current: ThreadId) -> usize {
        self.entries.values().filter(|r| r.thread != current && r.is_live()).count()
    }
}

fn key_of<R: ?Sized>(resource: &Arc<R>) -> usize {
    Arc::as_ptr(resource) as *const () as usize
}

/// A per-archive registry of open resources.
#[derive(Default)]
pub struct ResourceAccountant {
    registry: Mutex<Registry>,
    changed: Condvar,
}

impl ResourceAccountant {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts accounting for a resource on behalf of the calling thread.
    ///
    /// Returns `false` if the resource was already accounted for.
    pub fn start_accounting_for<R: Resource + 'static>(&self, resource: &Arc<R>) -> bool {
        let key = key_of(resource);
        let mut registry = self.lock();

        if registry.entries.get(&key).map_or(false, Registration::is_live) {
            return false;
        }

        let weak: Weak<dyn Resource> = Arc::downgrade(resource) as Weak<dyn Resource>;
        registry.entries.insert(key, Registration { resource: weak, thread: thread::current().id() });
        true
    }

    /// Stops accounting for a resource.
    ///
    /// Returns `false` if the resource was not accounted for.
    pub fn stop_accounting_for<R: ?Sized>(&self, resource: &Arc<R>) -> bool {
        let removed = self.lock().entries.remove(&key_of(resource)).is_some();
        if removed {
            self.changed.notify_all();
        }
        removed
    }

    /// Returns the number of live resources accounted for, across all threads.
    pub fn resources(&self) -> usize {
        self.lock().entries.values().filter(|r| r.is_live()).count()
    }

    /// Returns the number of registrations, including those whose resources were dropped.
    #[cfg(test)]
    pub(crate) fn registrations(&self) -> usize {
        self.lock().entries.len()
    }

    /// Returns the number of live resources accounted for by threads other than the calling one.
    pub fn other_resources(&self) -> usize {
        self.lock().count_other(thread::current().id())
    }

    /// Waits until other threads have closed their resources, or the timeout elapses.
    ///
    /// Returns the number of resources other threads still hold, which is non-zero only on timeout.
    pub fn wait_other_threads(&self, timeout: Duration) -> Result<usize> {
        self.wait(timeout, None)
    }

    /// As [`wait_other_threads()`](Self::wait_other_threads), but returns [`ZipError::Interrupted`] promptly once
    /// `interrupt` is triggered.
    pub fn wait_other_threads_interruptibly(&self, timeout: Duration, interrupt: &Interrupt) -> Result<usize> {
        self.wait(timeout, Some(interrupt))
    }

    fn wait(&self, timeout: Duration, interrupt: Option<&Interrupt>) -> Result<usize> {
        let current = thread::current().id();
        let deadline = Instant::now() + timeout;
        let mut registry = self.lock();

        loop {
            if interrupt.map_or(false, Interrupt::is_interrupted) {
                return Err(ZipError::Interrupted);
            }

            let swept = registry.sweep();
            if swept > 0 {
                tracing::warn!(swept, "reclaimed resources which were dropped without being closed");
            }

            let remaining = registry.count_other(current);
            let now = Instant::now();
            if remaining == 0 || now >= deadline {
                return Ok(remaining);
            }

            let slice = WAIT_SLICE.min(deadline - now);
            registry = self.changed.wait_timeout(registry, slice).unwrap_or_else(PoisonError::into_inner).0;
        }
    }

    /// Forcibly closes every resource still accounted for.
    ///
    /// A failure to close one resource is collected and does not prevent the others from being closed.
    pub fn close_all_resources(&self, errors: &mut SequentialErrors) {
        let resources: Vec<Arc<dyn Resource>> = {
            let mut registry = self.lock();
            registry.entries.drain().filter_map(|(_, r)| r.resource.upgrade()).collect()
        };

        for resource in resources {
            if let Err(err) = resource.close_resource() {
                tracing::warn!(error = %err, "failed to close resource");
                errors.push(err);
            }
        }

        self.changed.notify_all();
    }

    /// Removes registrations whose resources were dropped without being closed.
    pub fn sweep(&self) -> usize {
        let swept = self.lock().sweep();
        if swept > 0 {
            tracing::warn!(swept, "reclaimed resources which were dropped without being closed");
            self.changed.notify_all();
        }
        swept
    }
}

/// A cloneable flag which asks a waiting thread to stop waiting.
#[derive(Debug, Clone, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interrupt(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_interrupted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
