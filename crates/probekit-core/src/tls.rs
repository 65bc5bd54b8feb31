//! Destructor-order bookkeeping for the TLS deallocation probes.
//!
//! The probes verify that thread-local destructors run exactly once per
//! thread and still observe the values written before the backing storage
//! was deallocated. [`trample_heap`] recreates the original oracle: freed
//! storage that is still referenced will be overwritten by a same-sized
//! allocate/fill/free cycle, turning a use-after-free into a detectable
//! content mismatch.

use std::hint::black_box;

use parking_lot::Mutex;

/// Size of the large thread-local buffer used by the slab probes (1 MiB).
pub const SLAB_LEN: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct LedgerState {
    runs: usize,
    corrupt: usize,
}

/// Records destructor runs and observed corruption across threads.
#[derive(Debug, Default)]
pub struct DtorLedger {
    inner: Mutex<LedgerState>,
}

impl DtorLedger {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(LedgerState {
                runs: 0,
                corrupt: 0,
            }),
        }
    }

    /// Record one destructor run; `clean` is false when the destructor
    /// observed trampled contents.
    pub fn record(&self, clean: bool) {
        let mut state = self.inner.lock();
        state.runs += 1;
        if !clean {
            state.corrupt += 1;
        }
    }

    /// `(runs, corrupt)` so far.
    #[must_use]
    pub fn snapshot(&self) -> (usize, usize) {
        let state = self.inner.lock();
        (state.runs, state.corrupt)
    }

    pub fn reset(&self) {
        *self.inner.lock() = LedgerState::default();
    }
}

/// Allocate `len` bytes, fill them with 0xCD, and free them again.
///
/// `black_box` keeps the optimizer from eliding the alloc-and-free pair,
/// which would defeat the oracle.
pub fn trample_heap(len: usize) {
    let mut trample = vec![0xCD_u8; len];
    black_box(trample.as_mut_slice());
    drop(black_box(trample));
}

/// Large buffer for thread-local use whose destructor verifies its own
/// contents after trampling freed heap memory, recording the outcome in a
/// process-wide ledger.
pub struct TlsSlab {
    buf: Box<[u8]>,
    pattern: u8,
    ledger: &'static DtorLedger,
}

impl TlsSlab {
    #[must_use]
    pub fn new(pattern: u8, ledger: &'static DtorLedger) -> Self {
        Self {
            buf: vec![0; SLAB_LEN].into_boxed_slice(),
            pattern,
            ledger,
        }
    }

    /// Write the fill pattern to every byte.
    pub fn paint(&mut self) {
        self.buf.fill(self.pattern);
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }
}

impl Drop for TlsSlab {
    fn drop(&mut self) {
        trample_heap(self.buf.len());
        let clean = self.buf.iter().all(|&b| b == self.pattern);
        self.ledger.record(clean);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_counts_runs_and_corruption() {
        let ledger = DtorLedger::new();
        ledger.record(true);
        ledger.record(false);
        ledger.record(true);
        assert_eq!(ledger.snapshot(), (3, 1));
        ledger.reset();
        assert_eq!(ledger.snapshot(), (0, 0));
    }

    #[test]
    fn painted_slab_drops_clean() {
        static LEDGER: DtorLedger = DtorLedger::new();
        LEDGER.reset();
        let mut slab = TlsSlab::new(7, &LEDGER);
        slab.paint();
        assert!(slab.bytes().iter().all(|&b| b == 7));
        drop(slab);
        assert_eq!(LEDGER.snapshot(), (1, 0));
    }

    #[test]
    fn unpainted_slab_drops_corrupt() {
        static LEDGER: DtorLedger = DtorLedger::new();
        LEDGER.reset();
        drop(TlsSlab::new(7, &LEDGER));
        assert_eq!(LEDGER.snapshot(), (1, 1));
    }

    #[test]
    fn trample_heap_is_a_no_op_for_live_memory() {
        let live = vec![9u8; 4096];
        trample_heap(4096);
        assert!(live.iter().all(|&b| b == 9));
    }
}
