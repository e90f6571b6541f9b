//! Timed tick source

use crate::interpreter::Task;
use crate::process::Process;
use std::time::Duration;

/// Emit `0..count`, sleeping `interval` before each tick
///
/// Each tick is its own request, so the process can be stopped between any
/// two ticks.
pub fn ticks(count: u64, interval: Duration) -> Process<Task<u64>, u64> {
    tick_from(0, count, interval)
}

fn tick_from(next: u64, count: u64, interval: Duration) -> Process<Task<u64>, u64> {
    if next >= count {
        return Process::halt();
    }
    let task = Task::new(format!("tick-{next}"), move || async move {
        tokio::time::sleep(interval).await;
        Ok(next)
    });
    Process::eval(task).append_with(move || tick_from(next + 1, count, interval))
}
