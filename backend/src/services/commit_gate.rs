//! Per-process serialisation of snapshot and commit

use tokio::sync::{Mutex, MutexGuard};

/// One lock per warehouse tier. An order holds both while it snapshots and
/// commits, so a second order never allocates against stock the first one
/// is about to decrement.
#[derive(Debug, Default)]
pub struct CommitGate {
    finished: Mutex<()>,
    semi_finished: Mutex<()>,
}

/// Held for the lifetime of one order's snapshot and commit
pub struct GateGuard<'a> {
    _finished: MutexGuard<'a, ()>,
    _semi_finished: MutexGuard<'a, ()>,
}

impl CommitGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks are always taken Finished first, then SemiFinished.
    pub async fn acquire(&self) -> GateGuard<'_> {
        let finished = self.finished.lock().await;
        let semi_finished = self.semi_finished.lock().await;
        GateGuard {
            _finished: finished,
            _semi_finished: semi_finished,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_second_order_waits_for_first() {
        let gate = Arc::new(CommitGate::new());
        let guard = gate.acquire().await;

        let contender = {
            let gate = gate.clone();
            tokio::spawn(async move {
                let _guard = gate.acquire().await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }
}
