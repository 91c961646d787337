// Battle schema - catalog vocabulary shared by the engine and any authoring tools.
// Everything here is plain data: moves and abilities are described as ordered lists
// of attributes, and the engine gives those attributes their behaviour.

pub use ability_types::*;
pub use battle_data::*;
pub use move_types::*;
pub use pokemon_types::*;

pub mod ability_types;
pub mod battle_data;
pub mod move_types;
pub mod pokemon_types;

use serde::{Deserialize, Serialize};

/// The on-disk shape of a catalog: every move and ability definition in one document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct CatalogFile {
    #[serde(default)]
    pub moves: Vec<MoveData>,
    #[serde(default)]
    pub abilities: Vec<AbilityData>,
}

impl CatalogFile {
    /// Compact binary form used for shipping pre-built catalogs.
    pub fn to_postcard(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    pub fn from_postcard(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_file_survives_postcard() {
        let file = CatalogFile {
            moves: vec![MoveData {
                id: MoveId(44),
                name: "Bite".to_string(),
                move_type: PokemonType::Dark,
                category: MoveCategory::Physical,
                power: Some(60),
                accuracy: Some(100),
                pp: 25,
                priority: 0,
                target: MoveTarget::Opponent,
                contact: true,
                attrs: vec![MoveAttr::Flinch { chance: 30 }],
            }],
            abilities: vec![AbilityData {
                id: AbilityId(9),
                name: "Static".to_string(),
                attrs: vec![AbilityAttr::ContactStatus {
                    effect: StatusEffect::Paralysis,
                    chance: 30,
                }],
            }],
        };

        let bytes = file.to_postcard().unwrap();
        assert_eq!(CatalogFile::from_postcard(&bytes).unwrap(), file);
    }
}
