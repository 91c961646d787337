use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum PokemonType {
    Normal,
    Fighting,
    Flying,
    Poison,
    Ground,
    Rock,
    Bug,
    Ghost,
    Steel,
    Fire,
    Water,
    Grass,
    Electric,
    Psychic,
    Ice,
    Dragon,
    Dark,
    Fairy,
    /// Used for self-inflicted hits such as confusion; neutral against everything.
    Typeless,
}

/// One attacking type's row of the chart. Defending types not listed take neutral damage.
struct ChartRow {
    strong: &'static [PokemonType],
    weak: &'static [PokemonType],
    none: &'static [PokemonType],
}

const fn row(
    strong: &'static [PokemonType],
    weak: &'static [PokemonType],
    none: &'static [PokemonType],
) -> ChartRow {
    ChartRow { strong, weak, none }
}

impl PokemonType {
    fn chart_row(self) -> ChartRow {
        use PokemonType::*;
        match self {
            Normal => row(&[], &[Rock, Steel], &[Ghost]),
            Fighting => row(
                &[Normal, Ice, Rock, Dark, Steel],
                &[Poison, Flying, Psychic, Bug, Fairy],
                &[Ghost],
            ),
            Flying => row(&[Grass, Fighting, Bug], &[Electric, Rock, Steel], &[]),
            Poison => row(&[Grass, Fairy], &[Poison, Ground, Rock, Ghost], &[Steel]),
            Ground => row(&[Fire, Electric, Poison, Rock, Steel], &[Grass, Bug], &[Flying]),
            Rock => row(&[Fire, Ice, Flying, Bug], &[Fighting, Ground, Steel], &[]),
            Bug => row(
                &[Grass, Psychic, Dark],
                &[Fire, Fighting, Poison, Flying, Ghost, Steel, Fairy],
                &[],
            ),
            Ghost => row(&[Ghost, Psychic], &[Dark], &[Normal]),
            Steel => row(&[Ice, Rock, Fairy], &[Fire, Water, Electric, Steel], &[]),
            Fire => row(&[Grass, Ice, Bug, Steel], &[Fire, Water, Rock, Dragon], &[]),
            Water => row(&[Fire, Ground, Rock], &[Water, Grass, Dragon], &[]),
            Grass => row(
                &[Water, Ground, Rock],
                &[Fire, Grass, Poison, Flying, Bug, Dragon, Steel],
                &[],
            ),
            Electric => row(&[Water, Flying], &[Electric, Grass, Dragon], &[Ground]),
            Psychic => row(&[Fighting, Poison], &[Psychic, Steel], &[Dark]),
            Ice => row(&[Grass, Ground, Flying, Dragon], &[Fire, Water, Ice, Steel], &[]),
            Dragon => row(&[Dragon], &[Steel], &[Fairy]),
            Dark => row(&[Ghost, Psychic], &[Fighting, Dark, Fairy], &[]),
            Fairy => row(&[Fighting, Dragon, Dark], &[Fire, Poison, Steel], &[]),
            Typeless => row(&[], &[], &[]),
        }
    }

    /// Single-type matchup: 2.0, 1.0, 0.5 or 0.0.
    pub fn type_effectiveness(attacking: PokemonType, defending: PokemonType) -> f64 {
        if defending == PokemonType::Typeless {
            return 1.0;
        }
        let row = attacking.chart_row();
        if row.none.contains(&defending) {
            0.0
        } else if row.weak.contains(&defending) {
            0.5
        } else if row.strong.contains(&defending) {
            2.0
        } else {
            1.0
        }
    }

    pub fn is_immune(attacking: PokemonType, defending: PokemonType) -> bool {
        Self::type_effectiveness(attacking, defending) == 0.0
    }

    /// Product of the matchups against every defending type.
    pub fn effectiveness_against(attacking: PokemonType, defending: &[PokemonType]) -> f64 {
        defending
            .iter()
            .map(|&d| Self::type_effectiveness(attacking, d))
            .product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_pair_has_a_known_multiplier() {
        for attacking in PokemonType::iter() {
            for defending in PokemonType::iter() {
                let m = PokemonType::type_effectiveness(attacking, defending);
                assert!(
                    [0.0, 0.5, 1.0, 2.0].contains(&m),
                    "{} vs {} gave {}",
                    attacking,
                    defending,
                    m
                );
            }
        }
    }

    #[test]
    fn test_dual_type_effectiveness_multiplies() {
        use PokemonType::*;
        assert_eq!(PokemonType::effectiveness_against(Ice, &[Dragon, Flying]), 4.0);
        assert_eq!(PokemonType::effectiveness_against(Rock, &[Fire, Flying]), 4.0);
        assert_eq!(PokemonType::effectiveness_against(Electric, &[Water, Ground]), 0.0);
        assert_eq!(PokemonType::effectiveness_against(Fire, &[Water, Rock]), 0.25);
    }

    #[test]
    fn test_single_type_rows() {
        use PokemonType::*;
        assert_eq!(PokemonType::type_effectiveness(Water, Fire), 2.0);
        assert_eq!(PokemonType::type_effectiveness(Fire, Water), 0.5);
        assert_eq!(PokemonType::type_effectiveness(Ghost, Ghost), 2.0);
        assert_eq!(PokemonType::type_effectiveness(Normal, Fire), 1.0);
    }

    #[test]
    fn test_immunities() {
        use PokemonType::*;
        assert!(PokemonType::is_immune(Normal, Ghost));
        assert!(PokemonType::is_immune(Ground, Flying));
        assert!(PokemonType::is_immune(Dragon, Fairy));
        assert!(!PokemonType::is_immune(Typeless, Ghost));
    }
}
