//! Non-mandatory box registers R4..=R9.
//!
//! Register contents are serialized constants. Interpreting them is the
//! script interpreter's job, so here they are opaque bytes. The only
//! structural rule enforced is dense packing: R5 may only be set if R4 is,
//! and so on.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::config::{FIRST_NON_MANDATORY_REGISTER, NUM_NON_MANDATORY_REGISTERS};

/// Errors for register construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegisterError {
    #[error("invalid register id R{0}: only R4..=R9 are non-mandatory")]
    InvalidRegisterId(u8),

    #[error("registers are not densely packed: R{missing} is unset but a later register is set")]
    NonDenselyPacked { missing: u8 },
}

/// Identifier of a non-mandatory register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NonMandatoryRegisterId {
    R4 = 4,
    R5 = 5,
    R6 = 6,
    R7 = 7,
    R8 = 8,
    R9 = 9,
}

impl NonMandatoryRegisterId {
    /// All ids in ascending order.
    pub const ALL: [NonMandatoryRegisterId; NUM_NON_MANDATORY_REGISTERS] = [
        Self::R4,
        Self::R5,
        Self::R6,
        Self::R7,
        Self::R8,
        Self::R9,
    ];

    /// Register index (4..=9).
    pub fn index(&self) -> u8 {
        *self as u8
    }
}

impl TryFrom<u8> for NonMandatoryRegisterId {
    type Error = RegisterError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        index
            .checked_sub(FIRST_NON_MANDATORY_REGISTER)
            .and_then(|offset| Self::ALL.get(offset as usize).copied())
            .ok_or(RegisterError::InvalidRegisterId(index))
    }
}

impl fmt::Display for NonMandatoryRegisterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.index())
    }
}

/// Serialized constant stored in a register.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RegisterValue(Vec<u8>);

impl RegisterValue {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for RegisterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for RegisterValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map(Self).map_err(serde::de::Error::custom)
    }
}

/// The densely packed set of R4..=R9 values of a box.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NonMandatoryRegisters(BTreeMap<NonMandatoryRegisterId, RegisterValue>);

impl NonMandatoryRegisters {
    /// No registers set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validates packing and builds the register set.
    pub fn new(
        regs: BTreeMap<NonMandatoryRegisterId, RegisterValue>,
    ) -> Result<Self, RegisterError> {
        let mut seen_gap: Option<NonMandatoryRegisterId> = None;
        for id in NonMandatoryRegisterId::ALL {
            match (regs.contains_key(&id), seen_gap) {
                (true, Some(gap)) => {
                    return Err(RegisterError::NonDenselyPacked {
                        missing: gap.index(),
                    })
                }
                (false, None) => seen_gap = Some(id),
                _ => {}
            }
        }
        Ok(Self(regs))
    }

    pub fn get(&self, id: NonMandatoryRegisterId) -> Option<&RegisterValue> {
        self.0.get(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Registers in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (&NonMandatoryRegisterId, &RegisterValue)> {
        self.0.iter()
    }
}

impl Serialize for NonMandatoryRegisters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, value) in &self.0 {
            map.serialize_entry(&id.to_string(), value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for NonMandatoryRegisters {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: BTreeMap<String, RegisterValue> = BTreeMap::deserialize(deserializer)?;
        let mut regs = BTreeMap::new();
        for (key, value) in raw {
            let index = key
                .strip_prefix('R')
                .and_then(|n| n.parse::<u8>().ok())
                .ok_or_else(|| serde::de::Error::custom(format!("bad register key {key}")))?;
            let id = NonMandatoryRegisterId::try_from(index).map_err(serde::de::Error::custom)?;
            regs.insert(id, value);
        }
        Self::new(regs).map_err(serde::de::Error::custom)
    }
}
