//! Bounty ledgers and sheriff offices
//!
//! Each town keeps one office: an area of jurisdiction, the sheriff who
//! enforces it, and the ledger of wanted criminals. Ledgers only ever grow:
//! a criminal's entry accumulates crime names and a running total.

use serde::{Deserialize, Serialize};

use crate::core::types::{Area, CreatureId};

/// Accumulating record for one criminal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BountyEntry {
    pub criminal: CreatureId,
    pub name: String,
    /// Crime names, in the order they were witnessed
    pub crimes: Vec<String>,
    /// Running reward total, in cents
    pub value: i64,
}

/// Per-town criminal record, ordered by first offence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BountyLedger {
    entries: Vec<BountyEntry>,
}

impl BountyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a crime, creating the criminal's entry on first offence.
    pub fn record(
        &mut self,
        criminal: CreatureId,
        name: impl Into<String>,
        crime: impl Into<String>,
        value: i64,
    ) {
        let crime = crime.into();
        match self.entries.iter_mut().find(|e| e.criminal == criminal) {
            Some(entry) => {
                entry.crimes.push(crime);
                entry.value += value;
            }
            None => self.entries.push(BountyEntry {
                criminal,
                name: name.into(),
                crimes: vec![crime],
                value,
            }),
        }
    }

    pub fn entry(&self, criminal: &CreatureId) -> Option<&BountyEntry> {
        self.entries.iter().find(|e| &e.criminal == criminal)
    }

    pub fn is_wanted(&self, criminal: &CreatureId) -> bool {
        self.entry(criminal).is_some()
    }

    /// Entries in first-offence order.
    pub fn entries(&self) -> &[BountyEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One town's law: jurisdiction, sheriff, ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheriffOffice {
    pub town: Area,
    pub sheriff: CreatureId,
    pub ledger: BountyLedger,
}

impl SheriffOffice {
    pub fn new(town: Area, sheriff: CreatureId) -> Self {
        Self {
            town,
            sheriff,
            ledger: BountyLedger::new(),
        }
    }
}
