use solana_program::pubkey::Pubkey;
use solana_sdk::signer::SignerError;
use thiserror::Error;

use crate::state::ProposalStatus;

/// Failure reported by a [`LedgerTransport`](crate::transport::LedgerTransport), passed through untouched.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Why a byte buffer is not a proposal record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Short buffer, string overrunning the buffer, bad UTF-8 or an unknown status ordinal.
    #[error("{0}")]
    Invalid(String),

    /// The record parsed, but bytes remain after it.
    #[error("{trailing} trailing bytes after a {consumed}-byte record")]
    TrailingBytes { consumed: usize, trailing: usize },
}

impl RecordError {
    pub fn is_trailing_bytes(&self) -> bool {
        matches!(self, RecordError::TrailingBytes { .. })
    }
}

impl From<borsh::io::Error> for RecordError {
    fn from(e: borsh::io::Error) -> Self {
        RecordError::Invalid(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum GovernanceError {
    #[error("{field} value {value} is out of range for u64")]
    ValueOutOfRange { field: &'static str, value: i128 },

    #[error("Malformed record: {0}")]
    MalformedRecord(#[from] RecordError),

    #[error("Account {0} does not hold a valid proposal")]
    UnrecoverableAccount(Pubkey),

    #[error("Proposal account {0} not found")]
    AccountNotFound(Pubkey),

    #[error("Proposal is {0}, voting is closed")]
    VotingClosed(ProposalStatus),

    #[error("Proposal is {0}, only passed proposals can be executed")]
    NotExecutable(ProposalStatus),

    #[error("Signing failed: {0}")]
    Signer(#[from] SignerError),

    #[error("Transport failure: {0}")]
    Transport(#[source] TransportError),
}
