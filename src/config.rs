use solana_program::pubkey::Pubkey;

use crate::instruction::{DEFAULT_VOTING_PERIOD, PROPOSAL_ACCOUNT_SPACE};

pub const DEVNET_URL: &str = "https://api.devnet.solana.com";

/// Step, in bytes, between two windows of the fallback scan.
pub const FALLBACK_STEP: usize = 10;

/// Smallest account worth decoding: the creator key alone.
pub const MIN_ACCOUNT_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub program_id: Pubkey,
    pub rpc_url: String,
    /// Bytes allocated for each new proposal account.
    pub proposal_account_space: usize,
    pub default_voting_period: i64,
    pub fallback_step: usize,
    pub min_account_len: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            program_id: crate::id(),
            rpc_url: DEVNET_URL.to_string(),
            proposal_account_space: PROPOSAL_ACCOUNT_SPACE,
            default_voting_period: DEFAULT_VOTING_PERIOD,
            fallback_step: FALLBACK_STEP,
            min_account_len: MIN_ACCOUNT_LEN,
        }
    }
}

impl ClientConfig {
    pub fn with_program_id(mut self, program_id: Pubkey) -> Self {
        self.program_id = program_id;
        self
    }

    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }

    pub fn with_proposal_account_space(mut self, space: usize) -> Self {
        self.proposal_account_space = space;
        self
    }

    pub fn with_default_voting_period(mut self, seconds: i64) -> Self {
        self.default_voting_period = seconds;
        self
    }

    /// A zero step is treated as one so the scan always makes progress.
    pub fn with_fallback_step(mut self, step: usize) -> Self {
        self.fallback_step = step.max(1);
        self
    }

    /// Blocking RPC connection to `rpc_url` at `confirmed` commitment.
    #[cfg(feature = "rpc")]
    pub fn connect(&self) -> solana_client::rpc_client::RpcClient {
        solana_client::rpc_client::RpcClient::new_with_commitment(
            self.rpc_url.clone(),
            solana_sdk::commitment_config::CommitmentConfig::confirmed(),
        )
    }
}
