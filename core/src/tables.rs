//! Static upgrade tables and building specifications.

use serde::{Deserialize, Serialize};

/// Index into one of the fixed upgrade tables.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Tier(u32);

impl Tier {
    /// Entry tier every bed and door starts at.
    pub const BASE: Tier = Tier(0);

    /// Creates a tier wrapper around the provided table index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric table index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// The tier exactly one step above this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Income and price of a single bed tier.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BedTier {
    /// Gold produced per second while the owner rests.
    pub gold_per_second: f64,
    /// Price paid to reach this tier from the one below.
    pub cost: u32,
}

/// Durability and price of a single door tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorTier {
    /// Hit points of a fresh door at this tier, before talent bonuses.
    pub max_hp: u32,
    /// Flat reduction applied to every incoming strike.
    pub armor: u32,
    /// Price paid to reach this tier from the one below.
    pub cost: u32,
}

/// Types of constructs that can occupy a non-bed grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    /// Shoots homing projectiles at the nearest intruder in range.
    Turret,
    /// Power generator; placeable but has no simulated effect.
    Generator,
    /// Floor trap; placeable but has no simulated effect.
    Trap,
    /// Money plant that adds a flat income.
    Plant,
}

impl BuildingKind {
    /// Every buildable kind, in catalogue order.
    pub const ALL: [BuildingKind; 4] = [Self::Turret, Self::Generator, Self::Trap, Self::Plant];
}

/// Static configuration of a building kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingSpec {
    /// Price paid when placing the building.
    pub cost: u32,
    /// Damage carried by each projectile; zero for non-combat buildings.
    pub damage: u32,
    /// Targeting radius in world units.
    pub range: f32,
    /// Seconds between consecutive shots.
    pub attack_interval: f32,
    /// Gold per second added to the room's income.
    pub income: f64,
}

impl BuildingSpec {
    /// Sustained damage per second, zero for buildings that never fire.
    #[must_use]
    pub fn damage_per_second(&self) -> f32 {
        if self.damage == 0 || self.attack_interval <= 0.0 {
            return 0.0;
        }
        self.damage as f32 / self.attack_interval
    }
}

/// Specifications for every [`BuildingKind`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingCatalogue {
    /// Turret specification.
    pub turret: BuildingSpec,
    /// Generator specification.
    pub generator: BuildingSpec,
    /// Trap specification.
    pub trap: BuildingSpec,
    /// Plant specification.
    pub plant: BuildingSpec,
}

impl BuildingCatalogue {
    /// Looks up the specification of a building kind.
    #[must_use]
    pub const fn spec(&self, kind: BuildingKind) -> &BuildingSpec {
        match kind {
            BuildingKind::Turret => &self.turret,
            BuildingKind::Generator => &self.generator,
            BuildingKind::Trap => &self.trap,
            BuildingKind::Plant => &self.plant,
        }
    }
}

impl Default for BuildingCatalogue {
    fn default() -> Self {
        Self {
            turret: BuildingSpec {
                cost: 50,
                damage: 5,
                range: 150.0,
                attack_interval: 1.5,
                income: 0.0,
            },
            generator: BuildingSpec {
                cost: 80,
                ..BuildingSpec::default()
            },
            trap: BuildingSpec {
                cost: 40,
                ..BuildingSpec::default()
            },
            plant: BuildingSpec {
                cost: 30,
                income: 1.0,
                ..BuildingSpec::default()
            },
        }
    }
}

/// Upgrade tables consulted by the economy model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyTables {
    /// Bed tiers, lowest first.
    pub beds: Vec<BedTier>,
    /// Door tiers, lowest first.
    pub doors: Vec<DoorTier>,
    /// Building specifications.
    pub buildings: BuildingCatalogue,
}

impl EconomyTables {
    /// Bed table entry for the provided tier, if it exists.
    #[must_use]
    pub fn bed(&self, tier: Tier) -> Option<&BedTier> {
        self.beds.get(tier.index())
    }

    /// Door table entry for the provided tier, if it exists.
    #[must_use]
    pub fn door(&self, tier: Tier) -> Option<&DoorTier> {
        self.doors.get(tier.index())
    }

    /// The bed tier directly above `tier`, if the table continues.
    #[must_use]
    pub fn next_bed(&self, tier: Tier) -> Option<(Tier, &BedTier)> {
        let next = tier.next();
        self.bed(next).map(|entry| (next, entry))
    }

    /// The door tier directly above `tier`, if the table continues.
    #[must_use]
    pub fn next_door(&self, tier: Tier) -> Option<(Tier, &DoorTier)> {
        let next = tier.next();
        self.door(next).map(|entry| (next, entry))
    }
}

impl Default for EconomyTables {
    fn default() -> Self {
        Self {
            beds: vec![
                BedTier {
                    gold_per_second: 2.0,
                    cost: 0,
                },
                BedTier {
                    gold_per_second: 4.0,
                    cost: 50,
                },
                BedTier {
                    gold_per_second: 8.0,
                    cost: 120,
                },
                BedTier {
                    gold_per_second: 15.0,
                    cost: 250,
                },
            ],
            doors: vec![
                DoorTier {
                    max_hp: 100,
                    armor: 0,
                    cost: 0,
                },
                DoorTier {
                    max_hp: 180,
                    armor: 5,
                    cost: 30,
                },
                DoorTier {
                    max_hp: 300,
                    armor: 15,
                    cost: 80,
                },
                DoorTier {
                    max_hp: 500,
                    armor: 30,
                    cost: 200,
                },
            ],
            buildings: BuildingCatalogue::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_tier_stops_at_table_end() {
        let tables = EconomyTables::default();
        let (tier, entry) = tables.next_bed(Tier::BASE).expect("second bed tier");
        assert_eq!(tier, Tier::new(1));
        assert_eq!(entry.cost, 50);

        assert!(tables.next_bed(Tier::new(3)).is_none());
        assert!(tables.next_door(Tier::new(3)).is_none());
    }

    #[test]
    fn turret_dps_matches_interval() {
        let turret = BuildingCatalogue::default().turret;
        assert!((turret.damage_per_second() - 5.0 / 1.5).abs() < 1e-5);
        assert_eq!(BuildingCatalogue::default().plant.damage_per_second(), 0.0);
    }

    #[test]
    fn door_tiers_grow_monotonically() {
        let tables = EconomyTables::default();
        for pair in tables.doors.windows(2) {
            assert!(pair[1].max_hp > pair[0].max_hp);
            assert!(pair[1].armor > pair[0].armor);
        }
        assert_eq!(tables.door(Tier::BASE).map(|door| door.cost), Some(0));
    }
}
