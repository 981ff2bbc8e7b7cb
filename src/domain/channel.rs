// Channel domain model - field slots, per-row field values and channel metadata
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const SLOT_COUNT: usize = 8;

/// One of the eight numeric field slots a channel exposes (`field1`..`field8`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Slot {
    Field1,
    Field2,
    Field3,
    Field4,
    Field5,
    Field6,
    Field7,
    Field8,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field slot must be between 1 and 8, got {0}")]
pub struct InvalidSlot(pub u8);

impl Slot {
    pub const ALL: [Slot; SLOT_COUNT] = [
        Slot::Field1,
        Slot::Field2,
        Slot::Field3,
        Slot::Field4,
        Slot::Field5,
        Slot::Field6,
        Slot::Field7,
        Slot::Field8,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    /// Canonical identifier used by the feed API, e.g. `field3`.
    pub fn ident(self) -> &'static str {
        match self {
            Slot::Field1 => "field1",
            Slot::Field2 => "field2",
            Slot::Field3 => "field3",
            Slot::Field4 => "field4",
            Slot::Field5 => "field5",
            Slot::Field6 => "field6",
            Slot::Field7 => "field7",
            Slot::Field8 => "field8",
        }
    }

    pub fn from_ident(key: &str) -> Option<Slot> {
        Slot::ALL.into_iter().find(|slot| slot.ident() == key)
    }
}

impl TryFrom<u8> for Slot {
    type Error = InvalidSlot;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        match number {
            1..=8 => Ok(Slot::ALL[usize::from(number - 1)]),
            _ => Err(InvalidSlot(number)),
        }
    }
}

impl From<Slot> for u8 {
    fn from(slot: Slot) -> Self {
        slot.number()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ident())
    }
}

/// Numeric values of a single row, one optional value per slot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FieldValues([Option<f64>; SLOT_COUNT]);

impl FieldValues {
    pub fn get(&self, slot: Slot) -> Option<f64> {
        self.0[slot.index()]
    }

    pub fn set(&mut self, slot: Slot, value: Option<f64>) {
        self.0[slot.index()] = value;
    }

    #[cfg(test)]
    pub fn with(mut self, slot: Slot, value: f64) -> Self {
        self.set(slot, Some(value));
        self
    }
}

/// Channel attributes reported alongside the feed rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelMetadata {
    pub id: Option<u64>,
    pub name: Option<String>,
    labels: [Option<String>; SLOT_COUNT],
}

impl ChannelMetadata {
    pub fn new(id: Option<u64>, name: Option<String>) -> Self {
        Self {
            id,
            name,
            labels: Default::default(),
        }
    }

    pub fn label(&self, slot: Slot) -> Option<&str> {
        self.labels[slot.index()].as_deref()
    }

    pub fn set_label(&mut self, slot: Slot, label: Option<String>) {
        self.labels[slot.index()] = label;
    }

    #[cfg(test)]
    pub fn with_label(mut self, slot: Slot, label: &str) -> Self {
        self.set_label(slot, Some(label.to_string()));
        self
    }
}

/// The two sensor channels the dashboard reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Soil,
    Environment,
}

impl ChannelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelKind::Soil => "soil",
            ChannelKind::Environment => "environment",
        }
    }
}

impl FromStr for ChannelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "soil" => Ok(ChannelKind::Soil),
            "environment" | "env" => Ok(ChannelKind::Environment),
            other => Err(format!("unknown channel '{}'", other)),
        }
    }
}
