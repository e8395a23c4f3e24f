// THEORY:
// The `Target` is the single cross-thread value of the whole system: the acquisition
// loop writes it every cycle, the render path reads it every frame. It is small and
// `Copy`, and it travels through a one-slot `watch` channel, so a reader always gets
// a whole value from exactly one cycle. Intermediate values a slow reader never saw
// are simply replaced; only the latest position matters.
//
// The slot is created as a publisher/reader pair and handed to each side at
// construction time. There is no ambient global.

use tokio::sync::watch;

/// The acquisition result for one cycle, in absolute display coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Target {
    pub x: i32,
    pub y: i32,
    pub valid: bool,
}

impl Target {
    pub const fn invalid() -> Self {
        Self {
            x: -1,
            y: -1,
            valid: false,
        }
    }

    pub const fn at(x: i32, y: i32) -> Self {
        Self { x, y, valid: true }
    }

    /// The position, only when this target is usable.
    pub fn position(&self) -> Option<(i32, i32)> {
        (self.valid && self.x != -1 && self.y != -1).then_some((self.x, self.y))
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::invalid()
    }
}

/// Creates the single shared slot, initially holding `Target::invalid()`.
pub fn target_slot() -> (TargetPublisher, TargetReader) {
    let (sender, receiver) = watch::channel(Target::invalid());
    (TargetPublisher { sender }, TargetReader { receiver })
}

/// Write side of the slot. Owned by the acquisition loop.
#[derive(Debug)]
pub struct TargetPublisher {
    sender: watch::Sender<Target>,
}

impl TargetPublisher {
    /// Replaces the slot's value, whether or not anyone is reading.
    pub fn publish(&self, target: Target) {
        self.sender.send_replace(target);
    }
}

/// Read side of the slot. Cheap to clone; one per consumer.
#[derive(Debug, Clone)]
pub struct TargetReader {
    receiver: watch::Receiver<Target>,
}

impl TargetReader {
    /// A copy of the most recently published target.
    pub fn latest(&self) -> Target {
        *self.receiver.borrow()
    }

    /// Waits for a publication this reader has not seen yet and returns it.
    /// Returns `None` once the publisher is gone.
    pub async fn next(&mut self) -> Option<Target> {
        self.receiver.changed().await.ok()?;
        Some(*self.receiver.borrow_and_update())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn default_is_invalid_sentinel() {
        let target = Target::default();
        assert_eq!((target.x, target.y, target.valid), (-1, -1, false));
        assert_eq!(target.position(), None);
        assert_eq!(Target::at(3, 4).position(), Some((3, 4)));
    }

    #[test]
    fn reader_sees_latest_value_only() {
        let (publisher, reader) = target_slot();
        assert_eq!(reader.latest(), Target::invalid());

        publisher.publish(Target::at(1, 1));
        publisher.publish(Target::at(2, 2));
        assert_eq!(reader.latest(), Target::at(2, 2));
    }

    #[tokio::test]
    async fn next_wakes_on_publication_and_ends_with_publisher() {
        let (publisher, mut reader) = target_slot();
        publisher.publish(Target::at(7, 8));
        assert_eq!(reader.next().await, Some(Target::at(7, 8)));

        drop(publisher);
        assert_eq!(reader.next().await, None);
    }

    #[test]
    fn concurrent_reads_never_observe_torn_targets() {
        // Every published value keeps x == y and valid == (x is even), so a mix of
        // two different cycles would break one of those relations.
        let (publisher, reader) = target_slot();
        let done = Arc::new(AtomicBool::new(false));

        let writer_done = done.clone();
        let writer = std::thread::spawn(move || {
            for i in 0..20_000 {
                let target = Target {
                    x: i,
                    y: i,
                    valid: i % 2 == 0,
                };
                publisher.publish(target);
            }
            writer_done.store(true, Ordering::SeqCst);
        });

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let reader = reader.clone();
                let done = done.clone();
                std::thread::spawn(move || {
                    while !done.load(Ordering::SeqCst) {
                        let target = reader.latest();
                        if target == Target::invalid() {
                            continue;
                        }
                        assert_eq!(target.x, target.y, "torn read: {target:?}");
                        assert_eq!(target.valid, target.x % 2 == 0, "torn read: {target:?}");
                    }
                })
            })
            .collect();

        writer.join().expect("writer thread");
        for handle in readers {
            handle.join().expect("reader thread");
        }
        assert_eq!(reader.latest().x, 19_999);
    }
}
