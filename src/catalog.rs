//! Read-only lookup of move and ability definitions.

use std::collections::BTreeMap;

use schema::{AbilityData, AbilityId, CatalogFile, MoveData, MoveId};

use crate::errors::{CatalogError, CatalogResult};

/// The engine's only view of the catalog. Entries are never mutated once loaded.
pub trait Catalog {
    fn move_data(&self, id: MoveId) -> Option<&MoveData>;
    fn ability_data(&self, id: AbilityId) -> Option<&AbilityData>;
}

/// In-memory catalog keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoveCatalog {
    moves: BTreeMap<MoveId, MoveData>,
    abilities: BTreeMap<AbilityId, AbilityData>,
}

impl MoveCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(file: CatalogFile) -> CatalogResult<Self> {
        let mut catalog = Self::new();
        for move_data in file.moves {
            catalog.insert_move(move_data)?;
        }
        for ability in file.abilities {
            catalog.insert_ability(ability)?;
        }
        Ok(catalog)
    }

    pub fn from_ron_str(source: &str) -> CatalogResult<Self> {
        let file: CatalogFile =
            ron::from_str(source).map_err(|e| CatalogError::MalformedData(e.to_string()))?;
        Self::from_file(file)
    }

    pub fn from_postcard(bytes: &[u8]) -> CatalogResult<Self> {
        let file = CatalogFile::from_postcard(bytes)
            .map_err(|e| CatalogError::MalformedData(e.to_string()))?;
        Self::from_file(file)
    }

    pub fn to_postcard(&self) -> CatalogResult<Vec<u8>> {
        self.to_file()
            .to_postcard()
            .map_err(|e| CatalogError::MalformedData(e.to_string()))
    }

    pub fn to_file(&self) -> CatalogFile {
        CatalogFile {
            moves: self.moves.values().cloned().collect(),
            abilities: self.abilities.values().cloned().collect(),
        }
    }

    pub fn insert_move(&mut self, move_data: MoveData) -> CatalogResult<()> {
        if self.moves.contains_key(&move_data.id) {
            return Err(CatalogError::DuplicateMove(move_data.id));
        }
        self.moves.insert(move_data.id, move_data);
        Ok(())
    }

    pub fn insert_ability(&mut self, ability: AbilityData) -> CatalogResult<()> {
        if self.abilities.contains_key(&ability.id) {
            return Err(CatalogError::DuplicateAbility(ability.id));
        }
        self.abilities.insert(ability.id, ability);
        Ok(())
    }

    pub fn moves(&self) -> impl Iterator<Item = &MoveData> {
        self.moves.values()
    }

    pub fn find_move(&self, name: &str) -> Option<&MoveData> {
        self.moves.values().find(|m| m.name.eq_ignore_ascii_case(name))
    }

    pub fn find_ability(&self, name: &str) -> Option<&AbilityData> {
        self.abilities
            .values()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }
}

impl Catalog for MoveCatalog {
    fn move_data(&self, id: MoveId) -> Option<&MoveData> {
        self.moves.get(&id)
    }

    fn ability_data(&self, id: AbilityId) -> Option<&AbilityData> {
        self.abilities.get(&id)
    }
}
