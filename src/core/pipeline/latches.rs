//! Inter-Stage Buffers.
//!
//! All buffers are FIFOs. An instruction occupies exactly one buffer at a
//! time: stages move it by popping from one queue and pushing onto the next
//! within the same synchronous step.
//!
//! * Decode queue: fetched text, shared by all lanes.
//! * ALU and memory queues: one per lane, filled by decode in lane order.
//! * Vector queue: the single vector lane's reservation queue.
//! * Write-back queue: filled in lane completion order, drained in FIFO order.

use std::collections::VecDeque;

use super::traits::PipelineLatch;
use crate::isa::{DecodedInstruction, FetchedInstruction, InstId};

/// Fetched instructions waiting to be decoded.
#[derive(Clone, Debug, Default)]
pub struct DecodeQueue {
    /// Entries in fetch order.
    pub entries: VecDeque<FetchedInstruction>,
}

/// Decoded instructions waiting for one execution lane.
#[derive(Clone, Debug, Default)]
pub struct ExecQueue {
    /// Entries in dispatch order.
    pub entries: VecDeque<DecodedInstruction>,
}

/// Executed instructions waiting to commit.
#[derive(Clone, Debug, Default)]
pub struct WriteBackQueue {
    /// Entries in execute-completion order.
    pub entries: VecDeque<DecodedInstruction>,
}

macro_rules! impl_latch {
    ($ty:ty) => {
        impl PipelineLatch for $ty {
            fn flush(&mut self) -> usize {
                let n = self.entries.len();
                self.entries.clear();
                n
            }

            fn is_empty(&self) -> bool {
                self.entries.is_empty()
            }

            fn len(&self) -> usize {
                self.entries.len()
            }
        }
    };
}

impl_latch!(DecodeQueue);
impl_latch!(ExecQueue);
impl_latch!(WriteBackQueue);

/// Every inter-stage buffer plus the fetch program counter.
///
/// Owned exclusively by the [`Cpu`](crate::core::Cpu). The branch speculation
/// unit borrows it only to redirect fetch and to squash on misprediction.
#[derive(Clone, Debug)]
pub struct PipelineState {
    /// Address of the next instruction to fetch.
    pub pc: u32,
    /// Decode queue.
    pub decode: DecodeQueue,
    /// Per-lane ALU queues.
    pub alu: Vec<ExecQueue>,
    /// Per-lane memory queues.
    pub mem: Vec<ExecQueue>,
    /// Vector lane reservation queue.
    pub vector: ExecQueue,
    /// Write-back queue.
    pub writeback: WriteBackQueue,
}

impl PipelineState {
    /// Creates empty buffers for `lanes` parallel lanes, fetching from `pc`.
    pub fn new(lanes: usize, pc: u32) -> Self {
        Self {
            pc,
            decode: DecodeQueue::default(),
            alu: vec![ExecQueue::default(); lanes],
            mem: vec![ExecQueue::default(); lanes],
            vector: ExecQueue::default(),
            writeback: WriteBackQueue::default(),
        }
    }

    /// Whether every ALU, memory, and vector queue is empty.
    pub fn execute_queues_empty(&self) -> bool {
        self.alu.iter().all(PipelineLatch::is_empty)
            && self.mem.iter().all(PipelineLatch::is_empty)
            && self.vector.is_empty()
    }

    /// Whether nothing is left in flight past decode.
    pub fn backend_empty(&self) -> bool {
        self.execute_queues_empty() && self.writeback.is_empty()
    }

    /// Whether every buffer, including decode, is empty.
    pub fn is_drained(&self) -> bool {
        self.decode.is_empty() && self.backend_empty()
    }

    /// Total number of in-flight instructions across all buffers.
    pub fn in_flight(&self) -> usize {
        self.decode.len()
            + self.alu.iter().map(PipelineLatch::len).sum::<usize>()
            + self.mem.iter().map(PipelineLatch::len).sum::<usize>()
            + self.vector.len()
            + self.writeback.len()
    }

    /// Discards every instruction younger than `branch` from the write-back,
    /// ALU, memory, and vector buffers, and clears the decode queue.
    ///
    /// Older instructions stay in place and commit normally. Everything in
    /// the decode queue was fetched after `branch` left decode.
    ///
    /// Returns the number of instructions discarded.
    pub fn squash_younger_than(&mut self, branch: InstId) -> usize {
        let mut squashed = discard_younger(&mut self.writeback.entries, branch);
        for queue in self.alu.iter_mut().chain(self.mem.iter_mut()) {
            squashed += discard_younger(&mut queue.entries, branch);
        }
        squashed += discard_younger(&mut self.vector.entries, branch);
        squashed + self.decode.flush()
    }

    /// In-flight decoded instructions in hazard-scan priority order.
    ///
    /// Memory lanes, then ALU lanes, then the vector queue, then the
    /// write-back queue; each queue oldest first.
    pub fn hazard_scan_order(&self) -> impl Iterator<Item = &DecodedInstruction> {
        self.mem
            .iter()
            .chain(self.alu.iter())
            .chain(std::iter::once(&self.vector))
            .flat_map(|q| q.entries.iter())
            .chain(self.writeback.entries.iter())
    }
}

fn discard_younger(entries: &mut VecDeque<DecodedInstruction>, branch: InstId) -> usize {
    let before = entries.len();
    entries.retain(|inst| inst.id <= branch);
    before - entries.len()
}
