//! Party and storage box.

use serde::{Deserialize, Serialize};

use crate::entities::SpeciesId;

/// A creature owned by the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyMember {
    pub species: SpeciesId,
    #[serde(default)]
    pub shiny: bool,
    #[serde(default)]
    pub nickname: Option<String>,
    /// The partner chosen at the start of the save.
    #[serde(default)]
    pub is_partner: bool,
}

impl PartyMember {
    pub fn new(species: SpeciesId) -> Self {
        Self {
            species,
            shiny: false,
            nickname: None,
            is_partner: false,
        }
    }

    pub fn shiny(mut self) -> Self {
        self.shiny = true;
        self
    }

    pub fn partner(mut self) -> Self {
        self.is_partner = true;
        self
    }
}

/// Where a received creature ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Party,
    Storage,
}

/// Active party plus overflow storage. Receiving a creature never fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    members: Vec<PartyMember>,
    #[serde(default)]
    storage: Vec<PartyMember>,
    capacity: usize,
}

impl Default for Party {
    fn default() -> Self {
        Self::new(6)
    }
}

impl Party {
    pub fn new(capacity: usize) -> Self {
        Self {
            members: Vec::new(),
            storage: Vec::new(),
            capacity,
        }
    }

    pub fn members(&self) -> &[PartyMember] {
        &self.members
    }

    pub fn storage(&self) -> &[PartyMember] {
        &self.storage
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.capacity
    }

    /// Add to the party, or to storage once the party is full.
    pub fn receive(&mut self, member: PartyMember) -> Placement {
        if self.is_full() {
            self.storage.push(member);
            Placement::Storage
        } else {
            self.members.push(member);
            Placement::Party
        }
    }

    pub fn contains_partner(&self) -> bool {
        self.members.iter().any(|member| member.is_partner)
    }

    pub fn clear(&mut self) {
        self.members.clear();
        self.storage.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overflow_goes_to_storage() {
        let mut party = Party::new(1);
        assert_eq!(party.receive(PartyMember::new(SpeciesId(1))), Placement::Party);
        assert_eq!(party.receive(PartyMember::new(SpeciesId(2))), Placement::Storage);
        assert_eq!(party.len(), 1);
        assert_eq!(party.storage().len(), 1);
    }

    #[test]
    fn test_partner_detection() {
        let mut party = Party::new(6);
        party.receive(PartyMember::new(SpeciesId(1)));
        assert!(!party.contains_partner());
        party.receive(PartyMember::new(SpeciesId(2)).partner());
        assert!(party.contains_partner());
    }
}
