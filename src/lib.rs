//! Client-side codec and transaction construction for the governance proposal program.
//!
//! Proposals live as borsh-encoded blobs in accounts owned by the program. This crate builds
//! the byte-exact instructions the program dispatches on and reads the proposal accounts back,
//! tolerating the unused space the allocation leaves after each record.

pub mod client;
pub mod config;
pub mod decoder;
pub mod error;
pub mod instruction;
pub mod repository;
pub mod state;
pub mod transport;

solana_program::declare_id!("C3hALGCa5NAEUYDBt3yM7vNPU44TZ3LCBkciXScri6Ba");

pub use client::{CreatedProposal, GovernanceClient};
pub use config::ClientConfig;
pub use decoder::AccountDecoder;
pub use error::{GovernanceError, RecordError};
pub use instruction::{NewProposal, ProposalCreation, ProposalInstruction};
pub use repository::ProposalRepository;
pub use state::{Proposal, ProposalRecord, ProposalStatus};
pub use transport::{AiAnalysis, LedgerTransport, WalletSigner};
