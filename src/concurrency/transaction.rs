use crate::common::config::TxnId;
use log::debug;
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TXN_ID: AtomicU64 = AtomicU64::new(1);

/// Transaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionState {
    Growing,
    Committed,
    Aborted,
}

/// The transaction context a scan runs under.
///
/// Pages are locked on behalf of a transaction; once it is aborted every
/// further page request made for it fails.
#[derive(Debug)]
pub struct Transaction {
    txn_id: TxnId,
    state: RwLock<TransactionState>,
}

impl Transaction {
    /// Starts a transaction with a fresh, process-unique id.
    pub fn begin() -> Self {
        let txn_id = NEXT_TXN_ID.fetch_add(1, Ordering::SeqCst);
        debug!("Beginning transaction {}", txn_id);
        Self::new(txn_id)
    }

    pub fn new(txn_id: TxnId) -> Self {
        Self {
            txn_id,
            state: RwLock::new(TransactionState::Growing),
        }
    }

    pub fn get_transaction_id(&self) -> TxnId {
        self.txn_id
    }

    pub fn get_state(&self) -> TransactionState {
        *self.state.read()
    }

    pub fn is_aborted(&self) -> bool {
        self.get_state() == TransactionState::Aborted
    }

    pub fn set_state(&self, state: TransactionState) {
        debug!(
            "Transaction {} state {:?} -> {:?}",
            self.txn_id,
            self.get_state(),
            state
        );
        *self.state.write() = state;
    }

    pub fn abort(&self) {
        self.set_state(TransactionState::Aborted);
    }

    pub fn commit(&self) {
        self.set_state(TransactionState::Committed);
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transaction {} ({:?})", self.txn_id, self.get_state())
    }
}
