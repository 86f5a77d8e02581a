use log::{debug, info};
use solana_program::pubkey::Pubkey;

use crate::{
    decoder::AccountDecoder, error::GovernanceError, state::Proposal, transport::LedgerTransport,
};

/// Reads proposals straight from the ledger. Nothing is cached between calls.
pub struct ProposalRepository<'a, T: LedgerTransport + ?Sized> {
    transport: &'a T,
    program_id: Pubkey,
    decoder: AccountDecoder,
}

impl<'a, T: LedgerTransport + ?Sized> ProposalRepository<'a, T> {
    pub fn new(transport: &'a T, program_id: Pubkey, decoder: AccountDecoder) -> Self {
        Self {
            transport,
            program_id,
            decoder,
        }
    }

    /// Every proposal the program owns, in the order the ledger returned them.
    ///
    /// Accounts that do not decode are left out; a failed fetch is an error.
    pub fn list(&self) -> Result<Vec<Proposal>, GovernanceError> {
        let accounts = self
            .transport
            .program_accounts(&self.program_id)
            .map_err(GovernanceError::Transport)?;
        let fetched = accounts.len();

        let proposals: Vec<Proposal> = accounts
            .iter()
            .filter_map(|(address, data)| self.decoder.decode(address, data))
            .collect();

        if proposals.len() < fetched {
            info!(
                "Skipped {} of {} program accounts that do not hold a proposal",
                fetched - proposals.len(),
                fetched
            );
        }
        debug!("Loaded {} proposals", proposals.len());
        Ok(proposals)
    }

    pub fn get(&self, address: &Pubkey) -> Result<Proposal, GovernanceError> {
        let data = self
            .transport
            .account_data(address)
            .map_err(GovernanceError::Transport)?
            .ok_or(GovernanceError::AccountNotFound(*address))?;
        self.decoder.try_decode(address, &data)
    }
}
