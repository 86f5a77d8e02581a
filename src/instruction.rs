use borsh::{BorshDeserialize, BorshSerialize};
use log::warn;
use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_instruction, system_program,
};
use solana_sdk::signature::{Keypair, Signer};

use crate::{
    error::{GovernanceError, RecordError},
    state,
    transport::AiAnalysis,
};

/// Bytes allocated for every new proposal account.
pub const PROPOSAL_ACCOUNT_SPACE: usize = 1000;

/// One day, in seconds.
pub const DEFAULT_VOTING_PERIOD: i64 = 86_400;

/// Every vote counts once.
pub const VOTE_WEIGHT: u64 = 1;

/// Instructions understood by the governance program. The program dispatches on the
/// leading variant byte: 0, 1 and 2 in declaration order.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum ProposalInstruction {
    /// Write a new proposal into a freshly allocated account.
    /// Accounts:
    /// 0. [signer, writable] payer
    /// 1. [signer, writable] proposal
    /// 2. [] system_program
    CreateProposal {
        title: String,
        description: String,
        ai_analysis_summary: String,
        ai_analysis_sentiment: String,
        /// Seconds the proposal stays open for votes.
        voting_period: u64,
    },

    /// Accounts:
    /// 0. [signer, writable] voter
    /// 1. [writable] proposal
    Vote { is_for: bool, vote_weight: u64 },

    /// Accounts:
    /// 0. [signer] invoker
    /// 1. [writable] proposal
    ExecuteProposal,
}

impl ProposalInstruction {
    pub fn pack(&self) -> borsh::io::Result<Vec<u8>> {
        borsh::to_vec(self)
    }

    pub fn unpack(input: &[u8]) -> Result<Self, RecordError> {
        Ok(Self::try_from_slice(input)?)
    }
}

/// Caller-facing arguments of a new proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProposal {
    pub title: String,
    pub description: String,
    pub ai_analysis_summary: String,
    pub ai_analysis_sentiment: String,
    /// Seconds, `0..=i64::MAX`; negative values are rejected when building.
    pub voting_period: i64,
}

impl NewProposal {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        let analysis = AiAnalysis::default();
        Self {
            title: title.into(),
            description: description.into(),
            ai_analysis_summary: analysis.summary,
            ai_analysis_sentiment: analysis.sentiment,
            voting_period: DEFAULT_VOTING_PERIOD,
        }
    }

    pub fn with_analysis(mut self, analysis: AiAnalysis) -> Self {
        self.ai_analysis_summary = analysis.summary;
        self.ai_analysis_sentiment = analysis.sentiment;
        self
    }

    /// Accepts `0..=i64::MAX` seconds, the ledger's timestamp range. Anything negative makes
    /// [`NewProposal::to_instruction`] fail with `ValueOutOfRange`.
    pub fn with_voting_period(mut self, seconds: i64) -> Self {
        self.voting_period = seconds;
        self
    }

    /// Length of the record the program will write for this proposal.
    pub fn record_len(&self) -> usize {
        state::record_len(
            &self.title,
            &self.description,
            &self.ai_analysis_summary,
            &self.ai_analysis_sentiment,
        )
    }

    pub fn to_instruction(&self) -> Result<ProposalInstruction, GovernanceError> {
        let voting_period =
            u64::try_from(self.voting_period).map_err(|_| GovernanceError::ValueOutOfRange {
                field: "voting_period",
                value: self.voting_period.into(),
            })?;
        Ok(ProposalInstruction::CreateProposal {
            title: self.title.clone(),
            description: self.description.clone(),
            ai_analysis_summary: self.ai_analysis_summary.clone(),
            ai_analysis_sentiment: self.ai_analysis_sentiment.clone(),
            voting_period,
        })
    }
}

/// The allocate + create pair for a new proposal and the keypair of the account it creates.
///
/// Both the payer and `proposal` must sign the transaction carrying `instructions`.
#[derive(Debug)]
pub struct ProposalCreation {
    pub payer: Pubkey,
    pub proposal: Keypair,
    pub instructions: Vec<Instruction>,
}

impl ProposalCreation {
    pub fn proposal_pubkey(&self) -> Pubkey {
        self.proposal.pubkey()
    }

    pub fn required_signers(&self) -> [Pubkey; 2] {
        [self.payer, self.proposal.pubkey()]
    }
}

/// Builds the instructions for a new proposal stored in a freshly generated account.
pub fn create_proposal(
    program_id: &Pubkey,
    payer: &Pubkey,
    lamports: u64,
    space: usize,
    args: &NewProposal,
) -> Result<ProposalCreation, GovernanceError> {
    let proposal = Keypair::new();
    let instructions =
        create_proposal_with_account(program_id, payer, &proposal.pubkey(), lamports, space, args)?;
    Ok(ProposalCreation {
        payer: *payer,
        proposal,
        instructions,
    })
}

/// Same as [`create_proposal`] for an account address chosen by the caller.
pub fn create_proposal_with_account(
    program_id: &Pubkey,
    payer: &Pubkey,
    proposal: &Pubkey,
    lamports: u64,
    space: usize,
    args: &NewProposal,
) -> Result<Vec<Instruction>, GovernanceError> {
    let data = args.to_instruction()?;

    let record_len = args.record_len();
    if record_len > space {
        warn!(
            "Proposal record needs {} bytes but only {} are allocated; the program may reject it",
            record_len, space
        );
    }

    let allocate =
        system_instruction::create_account(payer, proposal, lamports, space as u64, program_id);
    let create = Instruction::new_with_borsh(
        *program_id,
        &data,
        vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(*proposal, true),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
    );
    Ok(vec![allocate, create])
}

pub fn vote(program_id: &Pubkey, voter: &Pubkey, proposal: &Pubkey, is_for: bool) -> Instruction {
    Instruction::new_with_borsh(
        *program_id,
        &ProposalInstruction::Vote {
            is_for,
            vote_weight: VOTE_WEIGHT,
        },
        vec![
            AccountMeta::new(*voter, true),
            AccountMeta::new(*proposal, false),
        ],
    )
}

pub fn execute_proposal(program_id: &Pubkey, invoker: &Pubkey, proposal: &Pubkey) -> Instruction {
    Instruction::new_with_borsh(
        *program_id,
        &ProposalInstruction::ExecuteProposal,
        vec![
            AccountMeta::new_readonly(*invoker, true),
            AccountMeta::new(*proposal, false),
        ],
    )
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::state::{tests::arb_status, ProposalRecord};

    fn arb_instruction() -> impl Strategy<Value = ProposalInstruction> {
        prop_oneof![
            (
                any::<String>(),
                any::<String>(),
                any::<String>(),
                any::<String>(),
                any::<u64>(),
            )
                .prop_map(
                    |(title, description, ai_analysis_summary, ai_analysis_sentiment, voting_period)| {
                        ProposalInstruction::CreateProposal {
                            title,
                            description,
                            ai_analysis_summary,
                            ai_analysis_sentiment,
                            voting_period,
                        }
                    }
                ),
            (any::<bool>(), any::<u64>())
                .prop_map(|(is_for, vote_weight)| ProposalInstruction::Vote { is_for, vote_weight }),
            Just(ProposalInstruction::ExecuteProposal),
        ]
    }

    proptest! {
        #[test]
        fn any_instruction_roundtrips(ix in arb_instruction()) {
            let data = ix.pack().unwrap();
            let tag = match ix {
                ProposalInstruction::CreateProposal { .. } => 0,
                ProposalInstruction::Vote { .. } => 1,
                ProposalInstruction::ExecuteProposal => 2,
            };
            prop_assert_eq!(data[0], tag);
            prop_assert_eq!(ProposalInstruction::unpack(&data).unwrap(), ix);
        }

        #[test]
        fn record_len_matches_packed_record(
            title in any::<String>(),
            description in any::<String>(),
            summary in any::<String>(),
            sentiment in any::<String>(),
            status in arb_status(),
        ) {
            let args = NewProposal {
                title,
                description,
                ai_analysis_summary: summary,
                ai_analysis_sentiment: sentiment,
                voting_period: DEFAULT_VOTING_PERIOD,
            };
            let record = ProposalRecord {
                creator: Pubkey::new_unique(),
                title: args.title.clone(),
                description: args.description.clone(),
                status,
                votes_for: 0,
                votes_against: 0,
                ai_analysis_summary: args.ai_analysis_summary.clone(),
                ai_analysis_sentiment: args.ai_analysis_sentiment.clone(),
                created_at: 0,
                voting_ends_at: 0,
            };
            prop_assert_eq!(args.record_len(), record.pack().unwrap().len());
        }
    }

    #[test]
    fn create_instruction_roundtrip() {
        let args = NewProposal::new("T", "D").with_analysis(AiAnalysis {
            summary: "S".to_string(),
            sentiment: "Pos".to_string(),
        });
        let ix = args.to_instruction().unwrap();
        let data = ix.pack().unwrap();

        assert_eq!(data[0], 0);
        assert_eq!(
            ProposalInstruction::unpack(&data).unwrap(),
            ProposalInstruction::CreateProposal {
                title: "T".to_string(),
                description: "D".to_string(),
                ai_analysis_summary: "S".to_string(),
                ai_analysis_sentiment: "Pos".to_string(),
                voting_period: 86_400,
            }
        );
        // tag + four prefixed strings + u64
        assert_eq!(data.len(), 1 + (4 + 1) * 3 + (4 + 3) + 8);
    }

    #[test]
    fn vote_bytes() {
        let data = ProposalInstruction::Vote {
            is_for: true,
            vote_weight: VOTE_WEIGHT,
        }
        .pack()
        .unwrap();
        assert_eq!(data, vec![1, 1, 1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn execute_bytes() {
        assert_eq!(ProposalInstruction::ExecuteProposal.pack().unwrap(), vec![2]);
    }

    #[test]
    fn vote_and_execute_decode() {
        for is_for in [true, false] {
            let vote = ProposalInstruction::Vote {
                is_for,
                vote_weight: VOTE_WEIGHT,
            };
            assert_eq!(
                ProposalInstruction::unpack(&vote.pack().unwrap()).unwrap(),
                vote
            );
        }
        assert_eq!(
            ProposalInstruction::unpack(&[2]).unwrap(),
            ProposalInstruction::ExecuteProposal
        );
    }

    #[test]
    fn voting_period_range() {
        let ix = NewProposal::new("T", "D")
            .with_voting_period(i64::MAX)
            .to_instruction()
            .unwrap();
        assert!(matches!(
            ix,
            ProposalInstruction::CreateProposal { voting_period, .. } if voting_period == i64::MAX as u64
        ));

        let ix = NewProposal::new("T", "D").with_voting_period(0).to_instruction().unwrap();
        assert!(matches!(
            ix,
            ProposalInstruction::CreateProposal { voting_period: 0, .. }
        ));

        assert!(matches!(
            NewProposal::new("T", "D").with_voting_period(i64::MIN).to_instruction(),
            Err(GovernanceError::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert!(ProposalInstruction::unpack(&[3]).is_err());
        assert!(ProposalInstruction::unpack(&[]).is_err());
        // trailing data after an execute
        assert!(ProposalInstruction::unpack(&[2, 0]).is_err());
    }

    #[test]
    fn negative_voting_period_is_out_of_range() {
        let args = NewProposal::new("T", "D").with_voting_period(-1);
        let err = create_proposal(&crate::id(), &Pubkey::new_unique(), 1, 1000, &args)
            .unwrap_err();
        assert!(matches!(
            err,
            GovernanceError::ValueOutOfRange {
                field: "voting_period",
                value: -1
            }
        ));
    }

    #[test]
    fn create_proposal_accounts() {
        let program_id = crate::id();
        let payer = Pubkey::new_unique();
        let args = NewProposal::new("T", "D");
        let creation = create_proposal(&program_id, &payer, 7_850_880, 1000, &args).unwrap();
        let proposal = creation.proposal_pubkey();

        assert_eq!(creation.instructions.len(), 2);
        assert_eq!(creation.required_signers(), [payer, proposal]);

        let allocate = &creation.instructions[0];
        assert_eq!(allocate.program_id, system_program::id());
        assert_eq!(
            allocate.accounts,
            vec![AccountMeta::new(payer, true), AccountMeta::new(proposal, true)]
        );

        let create = &creation.instructions[1];
        assert_eq!(create.program_id, program_id);
        assert_eq!(
            create.accounts,
            vec![
                AccountMeta::new(payer, true),
                AccountMeta::new(proposal, true),
                AccountMeta::new_readonly(system_program::id(), false),
            ]
        );
        assert_eq!(create.data, args.to_instruction().unwrap().pack().unwrap());
    }

    #[test]
    fn oversized_text_still_builds() {
        let args = NewProposal::new("T", "x".repeat(2000));
        assert!(args.record_len() > PROPOSAL_ACCOUNT_SPACE);
        let ixs = create_proposal_with_account(
            &crate::id(),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            1,
            PROPOSAL_ACCOUNT_SPACE,
            &args,
        )
        .unwrap();
        assert_eq!(ixs.len(), 2);
    }

    #[test]
    fn execute_invoker_is_readonly_signer() {
        let invoker = Pubkey::new_unique();
        let proposal = Pubkey::new_unique();
        let ix = execute_proposal(&crate::id(), &invoker, &proposal);
        assert_eq!(
            ix.accounts,
            vec![
                AccountMeta::new_readonly(invoker, true),
                AccountMeta::new(proposal, false),
            ]
        );
        assert_eq!(ix.data, vec![2]);
    }

    #[test]
    fn vote_accounts() {
        let voter = Pubkey::new_unique();
        let proposal = Pubkey::new_unique();
        let ix = vote(&crate::id(), &voter, &proposal, false);
        assert_eq!(
            ix.accounts,
            vec![AccountMeta::new(voter, true), AccountMeta::new(proposal, false)]
        );
        assert_eq!(ix.data, vec![1, 0, 1, 0, 0, 0, 0, 0, 0, 0]);
    }
}
