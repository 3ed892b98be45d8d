//! Per-engine scratch containers.
//!
//! Algorithms rent position buffers and BFS queues here instead of
//! allocating per call. The pools are plain fields on the engine (one per
//! engine, single-threaded); rent on entry, return on exit. After a fatal
//! invariant failure the engine is unusable anyway, so a leaked buffer on a
//! panicking path is not a concern.

use std::collections::VecDeque;

use super::grid::Pos;

#[derive(Debug, Default)]
pub struct ScratchPools {
    pos_vecs: Vec<Vec<Pos>>,
    queues: Vec<VecDeque<Pos>>,
    flag_vecs: Vec<Vec<bool>>,
}

impl ScratchPools {
    pub fn new() -> Self {
        ScratchPools::default()
    }

    pub fn take_positions(&mut self) -> Vec<Pos> {
        self.pos_vecs.pop().unwrap_or_default()
    }

    pub fn put_positions(&mut self, mut buf: Vec<Pos>) {
        buf.clear();
        self.pos_vecs.push(buf);
    }

    pub fn take_queue(&mut self) -> VecDeque<Pos> {
        self.queues.pop().unwrap_or_default()
    }

    pub fn put_queue(&mut self, mut queue: VecDeque<Pos>) {
        queue.clear();
        self.queues.push(queue);
    }

    /// A cleared flag buffer of at least `len` entries, all false.
    pub fn take_flags(&mut self, len: usize) -> Vec<bool> {
        let mut flags = self.flag_vecs.pop().unwrap_or_default();
        flags.clear();
        flags.resize(len, false);
        flags
    }

    pub fn put_flags(&mut self, flags: Vec<bool>) {
        self.flag_vecs.push(flags);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffers_are_reused() {
        let mut pools = ScratchPools::new();
        let mut buf = pools.take_positions();
        buf.push(Pos::new(1, 2));
        let cap = buf.capacity();
        pools.put_positions(buf);

        let buf = pools.take_positions();
        assert!(buf.is_empty(), "returned buffer must come back cleared");
        assert_eq!(buf.capacity(), cap, "returned buffer must be recycled");
    }

    #[test]
    fn test_flags_cleared_on_take() {
        let mut pools = ScratchPools::new();
        let mut flags = pools.take_flags(4);
        flags[2] = true;
        pools.put_flags(flags);

        let flags = pools.take_flags(8);
        assert_eq!(flags.len(), 8);
        assert!(flags.iter().all(|&f| !f));
    }
}
