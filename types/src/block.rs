//! Domain block type.

use crate::record::{self, BlockRecord};
use crate::{blake2b_256, BlockHash, CodecError, Input, Transaction, TxHash};

pub const BLOCK_MAJOR_VERSION: u8 = 1;
pub const BLOCK_MINOR_VERSION: u8 = 0;

/// A block: the embedded block-reward transaction plus the ordered hashes
/// of the regular transactions it confirms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    hash: BlockHash,
    height: u64,
    major_version: u8,
    minor_version: u8,
    timestamp: u64,
    prev_hash: BlockHash,
    nonce: u32,
    reward_tx: Transaction,
    tx_hashes: Vec<TxHash>,
}

impl Block {
    /// Assemble a block. The height is taken from the reward transaction.
    pub fn new(
        prev_hash: BlockHash,
        timestamp: u64,
        reward_tx: Transaction,
        tx_hashes: Vec<TxHash>,
    ) -> Result<Self, CodecError> {
        Self::from_record(BlockRecord {
            major_version: BLOCK_MAJOR_VERSION,
            minor_version: BLOCK_MINOR_VERSION,
            timestamp,
            prev_hash,
            nonce: 0,
            reward_tx: reward_tx.to_record(),
            tx_hashes,
        })
    }

    pub fn hash(&self) -> BlockHash {
        self.hash
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn prev_hash(&self) -> BlockHash {
        self.prev_hash
    }

    pub fn reward_tx(&self) -> &Transaction {
        &self.reward_tx
    }

    pub fn tx_hashes(&self) -> &[TxHash] {
        &self.tx_hashes
    }

    pub fn to_record(&self) -> BlockRecord {
        BlockRecord {
            major_version: self.major_version,
            minor_version: self.minor_version,
            timestamp: self.timestamp,
            prev_hash: self.prev_hash,
            nonce: self.nonce,
            reward_tx: self.reward_tx.to_record(),
            tx_hashes: self.tx_hashes.clone(),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        record::encode(&self.to_record())
    }

    /// Decode stored bytes. The hash is taken over exactly these bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let rec: BlockRecord = record::decode(bytes)?;
        Self::with_hash(rec, BlockHash::new(blake2b_256(bytes)))
    }

    pub fn from_record(rec: BlockRecord) -> Result<Self, CodecError> {
        let hash = BlockHash::new(blake2b_256(&record::encode(&rec)?));
        Self::with_hash(rec, hash)
    }

    fn with_hash(rec: BlockRecord, hash: BlockHash) -> Result<Self, CodecError> {
        let reward_tx = Transaction::from_record(rec.reward_tx)?;
        let height = match reward_tx.inputs() {
            [Input::Terminal { height }] => *height,
            inputs => {
                return Err(CodecError::MalformedReward(format!(
                    "expected a single terminal input, found {} input(s)",
                    inputs.len()
                )))
            }
        };
        Ok(Self {
            hash,
            height,
            major_version: rec.major_version,
            minor_version: rec.minor_version,
            timestamp: rec.timestamp,
            prev_hash: rec.prev_hash,
            nonce: rec.nonce,
            reward_tx,
            tx_hashes: rec.tx_hashes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KeyImage, Output, PublicKey};

    fn reward(height: u64) -> Transaction {
        Transaction::reward(height, vec![Output::new(1, PublicKey([height as u8; 32]))]).unwrap()
    }

    #[test]
    fn height_comes_from_reward_input() {
        let block = Block::new(BlockHash::ZERO, 100, reward(12), vec![]).unwrap();
        assert_eq!(block.height(), 12);
    }

    #[test]
    fn decode_reproduces_hash() {
        let block = Block::new(
            BlockHash::new([3; 32]),
            100,
            reward(1),
            vec![TxHash::new([4; 32])],
        )
        .unwrap();
        let decoded = Block::decode(&block.encode().unwrap()).unwrap();
        assert_eq!(decoded.hash(), block.hash());
        assert_eq!(decoded.tx_hashes(), block.tx_hashes());
    }

    #[test]
    fn keyed_reward_is_malformed() {
        let bad = Transaction::new(
            0,
            vec![Input::Keyed {
                amount: 0,
                key_offsets: vec![0],
                key_image: KeyImage([0; 32]),
            }],
            vec![],
            vec![],
        )
        .unwrap();
        let err = Block::new(BlockHash::ZERO, 0, bad, vec![]).unwrap_err();
        assert!(matches!(err, CodecError::MalformedReward(_)));
    }
}
