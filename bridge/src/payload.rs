//! Wire format for bridge frames.
//!
//! A frame is one version byte followed by the bincode encoding of
//! [`TransferPayload`]. Decoding rejects any version other than
//! [`PAYLOAD_VERSION`] before touching the body.

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;
use rebase_types::{AccountId, Amount, ChainId, Rate, TransferId};

pub const PAYLOAD_VERSION: u8 = 1;

/// Everything the destination needs to mint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferPayload {
    pub transfer_id: TransferId,
    pub source_chain: ChainId,
    pub dest_chain: ChainId,
    pub sender: AccountId,
    pub recipient: AccountId,
    pub amount: Amount,
    /// The sender's accrual rate at lock time.
    pub sender_rate: Rate,
}

impl TransferPayload {
    pub fn encode(&self) -> Result<Vec<u8>, BridgeError> {
        let body = bincode::serialize(self).map_err(|e| BridgeError::InvalidPayload(e.to_string()))?;
        let mut frame = Vec::with_capacity(1 + body.len());
        frame.push(PAYLOAD_VERSION);
        frame.extend_from_slice(&body);
        Ok(frame)
    }

    pub fn decode(frame: &[u8]) -> Result<Self, BridgeError> {
        let (version, body) = frame
            .split_first()
            .ok_or_else(|| BridgeError::InvalidPayload("empty frame".into()))?;
        if *version != PAYLOAD_VERSION {
            return Err(BridgeError::InvalidPayload(format!(
                "unsupported payload version {version}"
            )));
        }
        let payload: Self =
            bincode::deserialize(body).map_err(|e| BridgeError::InvalidPayload(e.to_string()))?;
        if !payload.recipient.is_valid() {
            return Err(BridgeError::InvalidPayload(format!(
                "malformed recipient {}",
                payload.recipient
            )));
        }
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TransferPayload {
        TransferPayload {
            transfer_id: TransferId::new([7u8; 32]),
            source_chain: ChainId::new(1),
            dest_chain: ChainId::new(2),
            sender: AccountId::new("rbt_alice"),
            recipient: AccountId::new("rbt_bob"),
            amount: Amount::new(12_345),
            sender_rate: Rate::DEFAULT_GLOBAL,
        }
    }

    #[test]
    fn frame_starts_with_version() {
        let frame = sample().encode().unwrap();
        assert_eq!(frame[0], PAYLOAD_VERSION);
        assert_eq!(TransferPayload::decode(&frame).unwrap(), sample());
    }

    #[test]
    fn unknown_version_rejected() {
        let mut frame = sample().encode().unwrap();
        frame[0] = PAYLOAD_VERSION + 1;
        assert!(matches!(
            TransferPayload::decode(&frame),
            Err(BridgeError::InvalidPayload(_))
        ));
    }

    #[test]
    fn empty_and_truncated_frames_rejected() {
        assert!(TransferPayload::decode(&[]).is_err());
        let frame = sample().encode().unwrap();
        assert!(TransferPayload::decode(&frame[..frame.len() - 4]).is_err());
    }
}
