use log::info;
use solana_program::{instruction::Instruction, pubkey::Pubkey};
use solana_sdk::{
    signature::{Signature, Signer},
    transaction::Transaction,
};

use crate::{
    config::ClientConfig,
    decoder::AccountDecoder,
    error::GovernanceError,
    instruction::{self, NewProposal},
    repository::ProposalRepository,
    state::Proposal,
    transport::{LedgerTransport, WalletSigner},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedProposal {
    pub proposal: Pubkey,
    pub signature: Signature,
}

/// Creates, votes on and executes proposals through a [`LedgerTransport`].
pub struct GovernanceClient<T: LedgerTransport> {
    transport: T,
    config: ClientConfig,
}

impl<T: LedgerTransport> GovernanceClient<T> {
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn repository(&self) -> ProposalRepository<'_, T> {
        ProposalRepository::new(
            &self.transport,
            self.config.program_id,
            AccountDecoder::from_config(&self.config),
        )
    }

    /// Proposal arguments using the configured voting period.
    pub fn new_proposal(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> NewProposal {
        NewProposal::new(title, description).with_voting_period(self.config.default_voting_period)
    }

    /// Allocates a new proposal account and writes `args` into it in one transaction.
    pub fn create_proposal<W: WalletSigner + ?Sized>(
        &self,
        wallet: &W,
        args: &NewProposal,
    ) -> Result<CreatedProposal, GovernanceError> {
        // reject bad arguments before touching the network
        args.to_instruction()?;

        let space = self.config.proposal_account_space;
        let lamports = self
            .transport
            .minimum_balance_for_rent_exemption(space)
            .map_err(GovernanceError::Transport)?;
        let creation = instruction::create_proposal(
            &self.config.program_id,
            &wallet.public_key(),
            lamports,
            space,
            args,
        )?;

        let blockhash = self
            .transport
            .latest_blockhash()
            .map_err(GovernanceError::Transport)?;
        let mut transaction =
            Transaction::new_with_payer(&creation.instructions, Some(&wallet.public_key()));
        let proposal_signer: &[&dyn Signer] = &[&creation.proposal];
        transaction.try_partial_sign(proposal_signer, blockhash)?;
        let transaction = wallet.sign_transaction(transaction)?;

        let signature = self
            .transport
            .send_and_confirm(&transaction)
            .map_err(GovernanceError::Transport)?;
        let proposal = creation.proposal_pubkey();
        info!("Created proposal {} ({})", proposal, signature);
        Ok(CreatedProposal {
            proposal,
            signature,
        })
    }

    pub fn vote<W: WalletSigner + ?Sized>(
        &self,
        wallet: &W,
        proposal: &Pubkey,
        is_for: bool,
    ) -> Result<Signature, GovernanceError> {
        let ix = instruction::vote(
            &self.config.program_id,
            &wallet.public_key(),
            proposal,
            is_for,
        );
        let signature = self.submit(wallet, &[ix])?;
        info!(
            "Voted {} on proposal {} ({})",
            if is_for { "for" } else { "against" },
            proposal,
            signature
        );
        Ok(signature)
    }

    pub fn execute_proposal<W: WalletSigner + ?Sized>(
        &self,
        wallet: &W,
        proposal: &Pubkey,
    ) -> Result<Signature, GovernanceError> {
        let ix =
            instruction::execute_proposal(&self.config.program_id, &wallet.public_key(), proposal);
        let signature = self.submit(wallet, &[ix])?;
        info!("Executed proposal {} ({})", proposal, signature);
        Ok(signature)
    }

    pub fn proposals(&self) -> Result<Vec<Proposal>, GovernanceError> {
        self.repository().list()
    }

    pub fn proposal(&self, address: &Pubkey) -> Result<Proposal, GovernanceError> {
        self.repository().get(address)
    }

    fn submit<W: WalletSigner + ?Sized>(
        &self,
        wallet: &W,
        instructions: &[Instruction],
    ) -> Result<Signature, GovernanceError> {
        let blockhash = self
            .transport
            .latest_blockhash()
            .map_err(GovernanceError::Transport)?;
        let mut transaction = Transaction::new_with_payer(instructions, Some(&wallet.public_key()));
        transaction.message.recent_blockhash = blockhash;
        let transaction = wallet.sign_transaction(transaction)?;
        self.transport
            .send_and_confirm(&transaction)
            .map_err(GovernanceError::Transport)
    }
}
