//! Decoding of proposal accounts whose data is longer than the record they hold.
//!
//! Accounts are allocated with a fixed budget, so a record is normally followed by unused
//! bytes. The decoder first tries the whole buffer, then shrinking windows, and takes the
//! first window that holds exactly one well-formed record. Nothing in the format marks where a
//! record ends, so this is best-effort recovery: a shorter window that happens to parse would
//! win over the intended record.

use log::{debug, warn};
use solana_program::pubkey::Pubkey;

use crate::{
    config::{ClientConfig, FALLBACK_STEP, MIN_ACCOUNT_LEN},
    error::{GovernanceError, RecordError},
    state::{Proposal, ProposalRecord},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountDecoder {
    step: usize,
    min_len: usize,
}

impl Default for AccountDecoder {
    fn default() -> Self {
        Self::new(FALLBACK_STEP, MIN_ACCOUNT_LEN)
    }
}

impl AccountDecoder {
    pub fn new(step: usize, min_len: usize) -> Self {
        Self {
            step: step.max(1),
            min_len,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.fallback_step, config.min_account_len)
    }

    /// Decodes the proposal stored at `address`, or `None` if no window of `data` holds one.
    pub fn decode(&self, address: &Pubkey, data: &[u8]) -> Option<Proposal> {
        match self.decode_record(data) {
            Some(record) => Some(Proposal::from_record(*address, record)),
            None => {
                warn!(
                    "Account {} ({} bytes) does not hold a valid proposal",
                    address,
                    data.len()
                );
                None
            }
        }
    }

    pub fn try_decode(&self, address: &Pubkey, data: &[u8]) -> Result<Proposal, GovernanceError> {
        self.decode(address, data)
            .ok_or(GovernanceError::UnrecoverableAccount(*address))
    }

    pub fn decode_record(&self, data: &[u8]) -> Option<ProposalRecord> {
        if data.len() < self.min_len {
            debug!("{} bytes is too short for a proposal", data.len());
            return None;
        }

        let boundary = match ProposalRecord::unpack(data) {
            Ok(record) => return Some(record),
            Err(RecordError::TrailingBytes { consumed, trailing }) => {
                debug!(
                    "Record ends at byte {} with {} bytes of padding, scanning",
                    consumed, trailing
                );
                consumed
            }
            // shrinking the window cannot fix a broken record
            Err(err) => {
                debug!("Structural decode failure: {}", err);
                return None;
            }
        };

        for len in self.windows(data.len()) {
            match ProposalRecord::unpack(&data[..len]) {
                Ok(record) => {
                    debug!("Recovered proposal from the first {} bytes", len);
                    return Some(record);
                }
                Err(err) => debug!("Window of {} bytes: {}", len, err),
            }
        }

        // The stepped windows only land on the record when the padding is a multiple of the
        // step; the strict decoder already told us where the record ends.
        if boundary >= self.min_len {
            if let Ok(record) = ProposalRecord::unpack(&data[..boundary]) {
                debug!("Recovered proposal at its {}-byte boundary", boundary);
                return Some(record);
            }
        }
        None
    }

    /// Window lengths after the full buffer: `len - step`, `len - 2 * step`, ... down to `min_len`.
    fn windows(&self, len: usize) -> impl Iterator<Item = usize> {
        let step = self.step;
        let min_len = self.min_len;
        std::iter::successors(len.checked_sub(step), move |l| l.checked_sub(step))
            .take_while(move |l| *l >= min_len)
    }
}
