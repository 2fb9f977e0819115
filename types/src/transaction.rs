//! Domain transaction types.

use crate::offsets::relative_to_absolute;
use crate::record::{self, InputRecord, OutputRecord, TxRecord};
use crate::{blake2b_256, CodecError, KeyImage, PublicKey, TxHash, TypesError};

/// Current transaction format version.
pub const TX_VERSION: u8 = 2;

/// Blocks a block-reward output stays locked for.
pub const REWARD_UNLOCK_WINDOW: u64 = 60;

/// A transaction input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    /// Mints new supply; ends every backward trace.
    Terminal { height: u64 },
    /// Spends one member of a ring of earlier outputs of the same amount.
    Keyed {
        amount: u64,
        key_offsets: Vec<u64>,
        key_image: KeyImage,
    },
}

impl Input {
    /// Absolute output indices referenced by a keyed input.
    /// Terminal inputs reference nothing.
    pub fn absolute_offsets(&self) -> Result<Vec<u64>, TypesError> {
        match self {
            Self::Terminal { .. } => Ok(Vec::new()),
            Self::Keyed { key_offsets, .. } => relative_to_absolute(key_offsets),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal { .. })
    }

    fn to_record(&self) -> InputRecord {
        match self {
            Self::Terminal { height } => InputRecord::Gen { height: *height },
            Self::Keyed {
                amount,
                key_offsets,
                key_image,
            } => InputRecord::ToKey {
                amount: *amount,
                key_offsets: key_offsets.clone(),
                key_image: *key_image,
            },
        }
    }
}

impl TryFrom<InputRecord> for Input {
    type Error = CodecError;

    fn try_from(record: InputRecord) -> Result<Self, Self::Error> {
        match record {
            InputRecord::Gen { height } => Ok(Self::Terminal { height }),
            InputRecord::ToKey {
                amount,
                key_offsets,
                key_image,
            } => Ok(Self::Keyed {
                amount,
                key_offsets,
                key_image,
            }),
            other => Err(CodecError::UnsupportedInput(other.kind())),
        }
    }
}

/// A transaction output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Output {
    pub amount: u64,
    pub public_key: PublicKey,
}

impl Output {
    pub fn new(amount: u64, public_key: PublicKey) -> Self {
        Self { amount, public_key }
    }
}

/// An immutable, hashed transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    hash: TxHash,
    version: u8,
    unlock_time: u64,
    inputs: Vec<Input>,
    outputs: Vec<Output>,
    extra: Vec<u8>,
}

impl Transaction {
    /// Build a transaction and compute its hash.
    pub fn new(
        unlock_time: u64,
        inputs: Vec<Input>,
        outputs: Vec<Output>,
        extra: Vec<u8>,
    ) -> Result<Self, CodecError> {
        let mut tx = Self {
            hash: TxHash::ZERO,
            version: TX_VERSION,
            unlock_time,
            inputs,
            outputs,
            extra,
        };
        let bytes = tx.encode()?;
        tx.hash = TxHash::new(blake2b_256(&bytes));
        Ok(tx)
    }

    /// Build the block-reward transaction for `height`.
    pub fn reward(height: u64, outputs: Vec<Output>) -> Result<Self, CodecError> {
        Self::new(
            height + REWARD_UNLOCK_WINDOW,
            vec![Input::Terminal { height }],
            outputs,
            Vec::new(),
        )
    }

    pub fn hash(&self) -> TxHash {
        self.hash
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn unlock_time(&self) -> u64 {
        self.unlock_time
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub fn extra(&self) -> &[u8] {
        &self.extra
    }

    /// True when the first input mints supply.
    pub fn is_reward(&self) -> bool {
        self.inputs.first().is_some_and(Input::is_terminal)
    }

    pub fn to_record(&self) -> TxRecord {
        TxRecord {
            version: self.version,
            unlock_time: self.unlock_time,
            inputs: self.inputs.iter().map(Input::to_record).collect(),
            outputs: self
                .outputs
                .iter()
                .map(|o| OutputRecord {
                    amount: o.amount,
                    key: o.public_key,
                })
                .collect(),
            extra: self.extra.clone(),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        record::encode(&self.to_record())
    }

    /// Decode stored bytes. The hash is taken over exactly these bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let rec: TxRecord = record::decode(bytes)?;
        Self::with_hash(rec, TxHash::new(blake2b_256(bytes)))
    }

    /// Convert a record, re-encoding it to compute the hash.
    pub fn from_record(rec: TxRecord) -> Result<Self, CodecError> {
        let hash = TxHash::new(blake2b_256(&record::encode(&rec)?));
        Self::with_hash(rec, hash)
    }

    fn with_hash(rec: TxRecord, hash: TxHash) -> Result<Self, CodecError> {
        let inputs = rec
            .inputs
            .into_iter()
            .map(Input::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            hash,
            version: rec.version,
            unlock_time: rec.unlock_time,
            inputs,
            outputs: rec
                .outputs
                .into_iter()
                .map(|o| Output::new(o.amount, o.key))
                .collect(),
            extra: rec.extra,
        })
    }
}
