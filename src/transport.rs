//! Boundaries to the outside world: the ledger connection, the wallet and the analysis service.

use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;
use solana_sdk::{
    hash::Hash,
    signature::{Signature, Signer},
    signer::SignerError,
    transaction::Transaction,
};

use crate::error::TransportError;

/// Blocking access to the ledger. Connection setup, retries and confirmation polling all
/// belong to the implementation.
pub trait LedgerTransport {
    /// Every account owned by `program_id`, as (address, data) pairs.
    fn program_accounts(&self, program_id: &Pubkey) -> Result<Vec<(Pubkey, Vec<u8>)>, TransportError>;

    /// Data of a single account, `None` if it does not exist.
    fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, TransportError>;

    fn latest_blockhash(&self) -> Result<Hash, TransportError>;

    fn minimum_balance_for_rent_exemption(&self, space: usize) -> Result<u64, TransportError>;

    fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature, TransportError>;
}

/// A wallet that can sign transactions without exposing its key material.
pub trait WalletSigner {
    fn public_key(&self) -> Pubkey;

    /// Adds the wallet's signature, keeping signatures already present.
    fn sign_transaction(&self, transaction: Transaction) -> Result<Transaction, SignerError>;
}

impl<T: Signer> WalletSigner for T {
    fn public_key(&self) -> Pubkey {
        self.pubkey()
    }

    fn sign_transaction(&self, mut transaction: Transaction) -> Result<Transaction, SignerError> {
        let blockhash = transaction.message.recent_blockhash;
        let signers: &[&dyn Signer] = &[self];
        transaction.try_partial_sign(signers, blockhash)?;
        Ok(transaction)
    }
}

fn default_summary() -> String {
    "No summary available.".to_string()
}

fn default_sentiment() -> String {
    "Neutral".to_string()
}

/// Text produced by the analysis service, copied verbatim into a new proposal.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AiAnalysis {
    #[serde(default = "default_summary")]
    pub summary: String,
    #[serde(default = "default_sentiment")]
    pub sentiment: String,
}

impl Default for AiAnalysis {
    fn default() -> Self {
        Self {
            summary: default_summary(),
            sentiment: default_sentiment(),
        }
    }
}

impl AiAnalysis {
    /// Parses the service's JSON response. Blank fields fall back to the defaults.
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        let mut analysis: AiAnalysis = serde_json::from_str(body)?;
        if analysis.summary.trim().is_empty() {
            analysis.summary = default_summary();
        }
        if analysis.sentiment.trim().is_empty() {
            analysis.sentiment = default_sentiment();
        }
        Ok(analysis)
    }
}

#[cfg(feature = "rpc")]
mod rpc {
    use solana_client::rpc_client::RpcClient;

    use super::*;

    impl LedgerTransport for RpcClient {
        fn program_accounts(
            &self,
            program_id: &Pubkey,
        ) -> Result<Vec<(Pubkey, Vec<u8>)>, TransportError> {
            let accounts = self.get_program_accounts(program_id)?;
            Ok(accounts
                .into_iter()
                .map(|(address, account)| (address, account.data))
                .collect())
        }

        fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, TransportError> {
            let response = self.get_account_with_commitment(address, self.commitment())?;
            Ok(response.value.map(|account| account.data))
        }

        fn latest_blockhash(&self) -> Result<Hash, TransportError> {
            Ok(self.get_latest_blockhash()?)
        }

        fn minimum_balance_for_rent_exemption(&self, space: usize) -> Result<u64, TransportError> {
            Ok(self.get_minimum_balance_for_rent_exemption(space)?)
        }

        fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature, TransportError> {
            Ok(self.send_and_confirm_transaction(transaction)?)
        }
    }
}
