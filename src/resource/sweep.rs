// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::resource::ResourceAccountant;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// A background thread which periodically sweeps an accountant.
///
/// The thread stops when this guard is dropped or when the accountant itself is dropped.
pub struct Sweeper {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ResourceAccountant {
    /// Spawns a thread which calls [`sweep()`](Self::sweep) every `interval`.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> Sweeper {
        let stop = Arc::new(AtomicBool::new(false));
        let accountant: Weak<ResourceAccountant> = Arc::downgrade(self);
        let flag = Arc::clone(&stop);

        let handle = thread::spawn(move || loop {
            thread::park_timeout(interval);
            if flag.load(Ordering::SeqCst) {
                break;
            }
            match accountant.upgrade() {
                Some(accountant) => {
                    accountant.sweep();
                }
                None => break,
            }
        });

        Sweeper { stop, handle: Some(handle) }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            if handle.join().is_err() {
                tracing::warn!("resource sweeper panicked");
            }
        }
    }
}
