//! Merged receive path of the serial links.
//!
//! Each link has a reader task that offers bytes to the mailbox; the shell
//! is the single consumer. Offering never blocks, so a reader running in a
//! tight loop cannot stall behind a slow command.

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

pub const RX_QUEUE_DEPTH: usize = 16;

/// Which link a byte arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxSource {
    /// Debug link to the PC.
    Debug,
    /// Link to the companion computer.
    Host,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RxByte {
    pub source: RxSource,
    pub byte: u8,
}

pub struct RxMailbox {
    queue: Channel<CriticalSectionRawMutex, RxByte, RX_QUEUE_DEPTH>,
    dropped: AtomicU32,
}

impl RxMailbox {
    pub const fn new() -> Self {
        Self {
            queue: Channel::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Queue a byte. Returns `false` and counts the byte if the queue is full.
    pub fn offer(&self, source: RxSource, byte: u8) -> bool {
        match self.queue.try_send(RxByte { source, byte }) {
            Ok(()) => true,
            Err(_) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(
                    "RX mailbox full, dropped {:#04x} from {:?} ({} total)",
                    byte, source, dropped
                );
                false
            }
        }
    }

    pub async fn receive(&self) -> RxByte {
        self.queue.receive().await
    }

    pub fn try_receive(&self) -> Option<RxByte> {
        self.queue.try_receive().ok()
    }

    /// Producers that can afford to wait poll this before offering.
    pub fn is_full(&self) -> bool {
        self.queue.is_full()
    }

    /// Bytes lost to a full queue since start-up.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Default for RxMailbox {
    fn default() -> Self {
        Self::new()
    }
}

pub static RX_MAILBOX: RxMailbox = RxMailbox::new();
