use std::fmt;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Serialize, Serializer};
use solana_program::{instruction::Instruction, pubkey::Pubkey};

use crate::{
    error::{GovernanceError, RecordError},
    instruction,
};

/// Size of every fixed-width field of a record plus the four string length prefixes.
pub const RECORD_FIXED_LEN: usize = 32 // creator
    + 4 // title prefix
    + 4 // description prefix
    + 1 // status
    + 8 // votes_for
    + 8 // votes_against
    + 4 // ai_analysis_summary prefix
    + 4 // ai_analysis_sentiment prefix
    + 8 // created_at
    + 8; // voting_ends_at

/// Encoded length of a record holding these four strings.
pub fn record_len(title: &str, description: &str, summary: &str, sentiment: &str) -> usize {
    RECORD_FIXED_LEN + title.len() + description.len() + summary.len() + sentiment.len()
}

#[derive(BorshSerialize, BorshDeserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProposalStatus {
    /// Accepting votes.
    Active,
    Passed,
    Rejected,
    /// Terminal.
    Executed,
}

impl ProposalStatus {
    pub fn accepts_votes(self) -> bool {
        self == ProposalStatus::Active
    }

    pub fn is_executable(self) -> bool {
        self == ProposalStatus::Passed
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProposalStatus::Active => "Active",
            ProposalStatus::Passed => "Passed",
            ProposalStatus::Rejected => "Rejected",
            ProposalStatus::Executed => "Executed",
        };
        f.write_str(name)
    }
}

/// Proposal exactly as the program stores it in account data.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProposalRecord {
    pub creator: Pubkey,
    pub title: String,
    pub description: String,
    pub status: ProposalStatus,
    pub votes_for: u64,
    pub votes_against: u64,
    pub ai_analysis_summary: String,
    pub ai_analysis_sentiment: String,
    /// Unix seconds.
    pub created_at: u64,
    /// Unix seconds.
    pub voting_ends_at: u64,
}

impl ProposalRecord {
    /// Strict decode: the record must occupy `data` exactly.
    ///
    /// Leftover bytes are reported as [`RecordError::TrailingBytes`] so callers can tell
    /// padding apart from a structurally broken record.
    pub fn unpack(data: &[u8]) -> Result<Self, RecordError> {
        let mut rest = data;
        let record = Self::deserialize(&mut rest)?;
        if !rest.is_empty() {
            return Err(RecordError::TrailingBytes {
                consumed: data.len() - rest.len(),
                trailing: rest.len(),
            });
        }
        Ok(record)
    }

    pub fn pack(&self) -> borsh::io::Result<Vec<u8>> {
        borsh::to_vec(self)
    }

    pub fn packed_len(&self) -> usize {
        record_len(
            &self.title,
            &self.description,
            &self.ai_analysis_summary,
            &self.ai_analysis_sentiment,
        )
    }
}

fn serialize_address<S: Serializer>(key: &Pubkey, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(key)
}

/// A decoded proposal together with the address of the account holding it.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    #[serde(serialize_with = "serialize_address")]
    pub pubkey: Pubkey,
    #[serde(serialize_with = "serialize_address")]
    pub creator: Pubkey,
    pub title: String,
    pub description: String,
    pub status: ProposalStatus,
    pub votes_for: u64,
    pub votes_against: u64,
    pub ai_analysis_summary: String,
    pub ai_analysis_sentiment: String,
    pub created_at: u64,
    pub voting_ends_at: u64,
}

impl Proposal {
    pub fn from_record(pubkey: Pubkey, record: ProposalRecord) -> Self {
        Self {
            pubkey,
            creator: record.creator,
            title: record.title,
            description: record.description,
            status: record.status,
            votes_for: record.votes_for,
            votes_against: record.votes_against,
            ai_analysis_summary: record.ai_analysis_summary,
            ai_analysis_sentiment: record.ai_analysis_sentiment,
            created_at: record.created_at,
            voting_ends_at: record.voting_ends_at,
        }
    }

    pub fn total_votes(&self) -> u64 {
        self.votes_for.saturating_add(self.votes_against)
    }

    pub fn voting_open_at(&self, now: u64) -> bool {
        self.status.accepts_votes() && now < self.voting_ends_at
    }

    /// Vote instruction for this proposal; refused once it has left `Active`.
    pub fn vote_instruction(
        &self,
        program_id: &Pubkey,
        voter: &Pubkey,
        is_for: bool,
    ) -> Result<Instruction, GovernanceError> {
        if !self.status.accepts_votes() {
            return Err(GovernanceError::VotingClosed(self.status));
        }
        Ok(instruction::vote(program_id, voter, &self.pubkey, is_for))
    }

    pub fn execute_instruction(
        &self,
        program_id: &Pubkey,
        invoker: &Pubkey,
    ) -> Result<Instruction, GovernanceError> {
        if !self.status.is_executable() {
            return Err(GovernanceError::NotExecutable(self.status));
        }
        Ok(instruction::execute_proposal(program_id, invoker, &self.pubkey))
    }
}

impl fmt::Display for Proposal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Proposal: {}", self.pubkey)?;
        writeln!(f, "  Title:    {}", self.title)?;
        writeln!(f, "  Creator:  {}", self.creator)?;
        writeln!(f, "  Status:   {}", self.status)?;
        writeln!(
            f,
            "  Votes:    {} for / {} against",
            self.votes_for, self.votes_against
        )?;
        writeln!(f, "  Sentiment: {}", self.ai_analysis_sentiment)?;
        write!(f, "  Voting ends: {}", self.voting_ends_at)
    }
}
