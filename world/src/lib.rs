#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative economy state for Nightmare Dorm.
//!
//! The world owns rooms, their doors, beds and buildings, and the wallets of
//! every occupant. Mutations arrive either through [`apply`] or through the
//! typed command methods on [`World`], which report a [`Receipt`] or the
//! [`Rejection`] that left state untouched.

pub mod layout;
mod occupants;
mod room;

use nightmare_dorm_core::{
    BuildingKind, CellIndex, Command, EconomyTables, Event, InvalidTarget, OccupantId, Receipt,
    Rejection, RoomId,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    layout::{GridMetrics, RoomLayout},
    occupants::Occupant,
    room::{CellFault, Door, Room},
};

/// Static configuration the world builds its rooms from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Rooms of the floor.
    pub layouts: Vec<RoomLayout>,
    /// Grid spacing inside rooms.
    pub grid: GridMetrics,
    /// Upgrade tables and building specifications.
    pub tables: EconomyTables,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            layouts: RoomLayout::dormitory(),
            grid: GridMetrics::default(),
            tables: EconomyTables::default(),
        }
    }
}

/// Represents the authoritative Nightmare Dorm economy.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    door_hp_bonus: u32,
    rooms: Vec<Room>,
    occupants: Vec<Occupant>,
}

impl World {
    /// Creates a world with the default dormitory and no talent bonus.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default(), 0)
    }

    /// Creates a world from the provided configuration.
    ///
    /// `door_hp_bonus` is added to the maximum hit points of every door tier.
    #[must_use]
    pub fn with_config(config: WorldConfig, door_hp_bonus: u32) -> Self {
        let mut world = Self {
            config,
            door_hp_bonus,
            rooms: Vec::new(),
            occupants: Vec::new(),
        };
        world.reset();
        world
    }

    /// Rebuilds every room at default tiers and forgets all occupants.
    pub fn reset(&mut self) {
        let WorldConfig {
            layouts,
            grid,
            tables,
        } = &self.config;
        let mut rooms: Vec<Room> = layouts
            .iter()
            .filter_map(|layout| Room::from_layout(layout, grid, tables, self.door_hp_bonus))
            .collect();
        rooms.sort_by_key(Room::id);
        rooms.dedup_by_key(|room| room.id());
        self.rooms = rooms;
        self.occupants.clear();
    }

    /// Registers a new occupant and returns its identifier.
    pub fn enrol(&mut self, name: impl Into<String>, autonomous: bool, gold: f64) -> OccupantId {
        let id = OccupantId::new(self.occupants.len() as u32);
        self.occupants
            .push(Occupant::new(id, name.into(), autonomous, gold));
        id
    }

    /// Assigns a free room to an occupant who owns none.
    pub fn claim_room(&mut self, occupant: OccupantId, room: RoomId) -> Result<Receipt, Rejection> {
        let payer = self.living(occupant)?;
        if self.occupants[payer].room.is_some() {
            return Err(InvalidTarget::AlreadyHoused.into());
        }
        let index = self.room_index(room).ok_or(InvalidTarget::UnknownRoom)?;
        if self.rooms[index].owner().is_some() {
            return Err(InvalidTarget::RoomTaken.into());
        }

        self.rooms[index].claim(occupant);
        self.occupants[payer].room = Some(room);
        info!(occupant = occupant.get(), room = room.get(), "room claimed");
        Ok(Receipt::RoomClaimed { room })
    }

    /// Advances the occupant's bed by exactly one tier.
    pub fn upgrade_bed(&mut self, occupant: OccupantId) -> Result<Receipt, Rejection> {
        let (payer, index) = self.housed(occupant)?;
        let (tier, cost) = self
            .config
            .tables
            .next_bed(self.rooms[index].bed_tier())
            .map(|(tier, entry)| (tier, entry.cost))
            .ok_or(InvalidTarget::MaxTier)?;
        self.charge(payer, cost)?;

        let room = &mut self.rooms[index];
        room.raise_bed(tier);
        debug!(room = room.id().get(), tier = tier.get(), cost, "bed upgraded");
        Ok(Receipt::BedUpgraded {
            room: room.id(),
            tier,
            cost,
        })
    }

    /// Advances the occupant's door by exactly one tier and restores it to
    /// full health.
    pub fn upgrade_door(&mut self, occupant: OccupantId) -> Result<Receipt, Rejection> {
        let (payer, index) = self.housed(occupant)?;
        let (tier, entry) = self
            .config
            .tables
            .next_door(self.rooms[index].door().tier())
            .map(|(tier, entry)| (tier, *entry))
            .ok_or(InvalidTarget::MaxTier)?;
        self.charge(payer, entry.cost)?;

        let door = Door::new(tier, &entry, self.door_hp_bonus);
        let max_hp = door.snapshot().max_hp;
        let room = &mut self.rooms[index];
        room.replace_door(door);
        debug!(room = room.id().get(), tier = tier.get(), max_hp, "door upgraded");
        Ok(Receipt::DoorUpgraded {
            room: room.id(),
            tier,
            cost: entry.cost,
            max_hp,
        })
    }

    /// Places a building on an empty non-bed cell of the occupant's room.
    pub fn build_at(
        &mut self,
        occupant: OccupantId,
        cell: CellIndex,
        kind: BuildingKind,
    ) -> Result<Receipt, Rejection> {
        let (payer, index) = self.housed(occupant)?;
        self.rooms[index].check_cell(cell).map_err(|fault| match fault {
            CellFault::Unknown => InvalidTarget::UnknownCell,
            CellFault::Bed => InvalidTarget::BedCell,
            CellFault::Occupied => InvalidTarget::Occupied,
        })?;
        let spec = *self.config.tables.buildings.spec(kind);
        self.charge(payer, spec.cost)?;

        let room = &mut self.rooms[index];
        room.place(cell, kind, spec);
        debug!(room = room.id().get(), cell = cell.get(), ?kind, "building placed");
        Ok(Receipt::BuildingPlaced {
            room: room.id(),
            cell,
            kind,
            cost: spec.cost,
        })
    }

    /// Applies an intruder strike to a room's door.
    ///
    /// Returns `true` only for the strike that takes the door to zero.
    pub fn take_door_damage(&mut self, room: RoomId, amount: u32) -> bool {
        match self.room_index(room) {
            Some(index) => self.rooms[index].door_mut().take_damage(amount),
            None => false,
        }
    }

    fn room_index(&self, room: RoomId) -> Option<usize> {
        self.rooms.binary_search_by_key(&room, Room::id).ok()
    }

    fn occupant_index(&self, occupant: OccupantId) -> Option<usize> {
        self.occupants.iter().position(|entry| entry.id == occupant)
    }

    fn living(&self, occupant: OccupantId) -> Result<usize, Rejection> {
        let index = self
            .occupant_index(occupant)
            .ok_or(InvalidTarget::UnknownOccupant)?;
        if !self.occupants[index].alive {
            return Err(InvalidTarget::OccupantEliminated.into());
        }
        Ok(index)
    }

    fn housed(&self, occupant: OccupantId) -> Result<(usize, usize), Rejection> {
        let payer = self.living(occupant)?;
        let room = self.occupants[payer].room.ok_or(InvalidTarget::NoRoom)?;
        let index = self.room_index(room).ok_or(InvalidTarget::UnknownRoom)?;
        Ok((payer, index))
    }

    fn charge(&mut self, payer: usize, cost: u32) -> Result<(), Rejection> {
        let wallet = &mut self.occupants[payer];
        if !wallet.can_afford(cost) {
            return Err(Rejection::InsufficientFunds {
                needed: u64::from(cost),
                available: wallet.available(),
            });
        }
        wallet.gold -= f64::from(cost);
        Ok(())
    }

    fn credit(&mut self, occupant: OccupantId, amount: f64) {
        if let Some(index) = self.occupant_index(occupant) {
            self.occupants[index].gold += amount;
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });

            let seconds = dt.as_secs_f64();
            for room in &mut world.rooms {
                room.accrue_cooldowns(seconds as f32);

                let Some(owner) = room.owner() else {
                    continue;
                };
                let income = room.gold_per_second(&world.config.tables) * seconds;
                if let Some(wallet) = world
                    .occupants
                    .iter_mut()
                    .find(|entry| entry.id == owner && entry.alive)
                {
                    wallet.gold += income;
                }
            }
        }
        Command::ClaimRoom { occupant, room } => {
            let outcome = world.claim_room(occupant, room);
            report(occupant, outcome, out_events);
        }
        Command::UpgradeBed { occupant } => {
            let outcome = world.upgrade_bed(occupant);
            report(occupant, outcome, out_events);
        }
        Command::UpgradeDoor { occupant } => {
            let outcome = world.upgrade_door(occupant);
            report(occupant, outcome, out_events);
        }
        Command::Build {
            occupant,
            cell,
            kind,
        } => {
            let outcome = world.build_at(occupant, cell, kind);
            report(occupant, outcome, out_events);
        }
        Command::Reward { occupant, amount } => world.credit(occupant, amount),
        Command::BeginResting => {
            for room in &mut world.rooms {
                let living = room.owner().is_some_and(|owner| {
                    world
                        .occupants
                        .iter()
                        .any(|entry| entry.id == owner && entry.alive)
                });
                room.set_resting(living);
            }
        }
        Command::FireTurret { room, cell } => {
            if let Some(index) = world.room_index(room) {
                let _ = world.rooms[index].reset_cooldown(cell);
            }
        }
        Command::EliminateOccupant { occupant, message } => {
            let Some(index) = world.occupant_index(occupant) else {
                return;
            };
            let entry = &mut world.occupants[index];
            if !entry.alive {
                return;
            }
            entry.alive = false;
            if let Some(room) = entry.room {
                if let Some(room_index) = world.room_index(room) {
                    world.rooms[room_index].set_resting(false);
                }
            }
            info!(occupant = occupant.get(), %message, "occupant eliminated");
            out_events.push(Event::OccupantEliminated { occupant, message });
        }
    }
}

fn report(occupant: OccupantId, outcome: Result<Receipt, Rejection>, out: &mut Vec<Event>) {
    match outcome {
        Ok(receipt) => out.push(receipt.into_event(occupant)),
        Err(reason) => {
            debug!(occupant = occupant.get(), %reason, "command rejected");
            out.push(Event::CommandRejected { occupant, reason });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use nightmare_dorm_core::{
        CellIndex, DoorSnapshot, EconomyTables, OccupantId, OccupantView, RoomId, RoomView,
        TurretSnapshot, TurretView, WorldPoint,
    };

    use super::World;

    /// Upgrade tables and building specifications in force.
    #[must_use]
    pub fn tables(world: &World) -> &EconomyTables {
        &world.config.tables
    }

    /// Captures a read-only view of every room.
    #[must_use]
    pub fn room_view(world: &World) -> RoomView {
        RoomView::from_snapshots(
            world
                .rooms
                .iter()
                .map(|room| room.snapshot(&world.config.tables))
                .collect(),
        )
    }

    /// Captures a read-only view of every occupant.
    #[must_use]
    pub fn occupant_view(world: &World) -> OccupantView {
        OccupantView::from_snapshots(world.occupants.iter().map(|o| o.snapshot()).collect())
    }

    /// Captures every turret of a claimed room whose door still stands.
    #[must_use]
    pub fn turret_view(world: &World) -> TurretView {
        let snapshots = world
            .rooms
            .iter()
            .filter(|room| room.armed())
            .flat_map(|room| {
                room.turrets()
                    .map(move |(cell, position, spec, ready)| TurretSnapshot {
                        room: room.id(),
                        cell,
                        position,
                        damage: spec.damage,
                        range: spec.range,
                        ready,
                    })
            })
            .collect();
        TurretView::from_snapshots(snapshots)
    }

    /// Gold held by the occupant.
    #[must_use]
    pub fn gold(world: &World, occupant: OccupantId) -> Option<f64> {
        world
            .occupant_index(occupant)
            .map(|index| world.occupants[index].gold)
    }

    /// Room owned by the occupant.
    #[must_use]
    pub fn room_of(world: &World, occupant: OccupantId) -> Option<RoomId> {
        world
            .occupant_index(occupant)
            .and_then(|index| world.occupants[index].room)
    }

    /// Current door state of the room.
    #[must_use]
    pub fn door(world: &World, room: RoomId) -> Option<DoorSnapshot> {
        world
            .room_index(room)
            .map(|index| world.rooms[index].door().snapshot())
    }

    /// Income the room currently produces.
    #[must_use]
    pub fn gold_per_second(world: &World, room: RoomId) -> Option<f64> {
        world
            .room_index(room)
            .map(|index| world.rooms[index].gold_per_second(&world.config.tables))
    }

    /// Sustained turret damage per second of the room.
    #[must_use]
    pub fn dps(world: &World, room: RoomId) -> Option<f32> {
        world
            .room_index(room)
            .map(|index| world.rooms[index].dps())
    }

    /// Room whose bounds contain the point.
    #[must_use]
    pub fn room_at(world: &World, point: WorldPoint) -> Option<RoomId> {
        world
            .rooms
            .iter()
            .find(|room| room.bounds().contains(point))
            .map(|room| room.id())
    }

    /// Grid cell of the room that covers the point.
    #[must_use]
    pub fn cell_at(world: &World, room: RoomId, point: WorldPoint) -> Option<CellIndex> {
        let index = world.room_index(room)?;
        world.rooms[index].cell_at(&world.config.grid, point)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn housed_world(gold: f64) -> (World, OccupantId) {
        let mut world = World::new();
        let occupant = world.enrol("tester", false, gold);
        let _ = world
            .claim_room(occupant, RoomId::new(1))
            .expect("room is free");
        (world, occupant)
    }

    #[test]
    fn tick_pays_only_resting_rooms() {
        let (mut world, occupant) = housed_world(0.0);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut events,
        );
        assert_eq!(query::gold(&world, occupant), Some(0.0));

        apply(&mut world, Command::BeginResting, &mut events);
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(2500),
            },
            &mut events,
        );
        assert_eq!(query::gold(&world, occupant), Some(5.0));
        assert!(matches!(events[0], Event::TimeAdvanced { .. }));
    }

    #[test]
    fn plants_add_income_linearly() {
        let (mut world, occupant) = housed_world(60.0);
        apply(&mut world, Command::BeginResting, &mut Vec::new());

        for cell in [1, 2] {
            let _ = world
                .build_at(occupant, CellIndex::new(cell), BuildingKind::Plant)
                .expect("affordable plant");
        }

        assert_eq!(query::gold_per_second(&world, RoomId::new(1)), Some(4.0));
        assert_eq!(query::gold(&world, occupant), Some(0.0));
    }

    #[test]
    fn rejected_commands_are_reported_without_mutation() {
        let (mut world, occupant) = housed_world(10.0);
        let mut events = Vec::new();

        apply(&mut world, Command::UpgradeBed { occupant }, &mut events);

        assert_eq!(
            events,
            vec![Event::CommandRejected {
                occupant,
                reason: Rejection::InsufficientFunds {
                    needed: 50,
                    available: 10,
                },
            }]
        );
        assert_eq!(query::gold(&world, occupant), Some(10.0));
    }

    #[test]
    fn elimination_stops_income_and_fires_once() {
        let (mut world, occupant) = housed_world(0.0);
        let mut events = Vec::new();
        apply(&mut world, Command::BeginResting, &mut events);

        for _ in 0..2 {
            apply(
                &mut world,
                Command::EliminateOccupant {
                    occupant,
                    message: "tester gone".to_owned(),
                },
                &mut events,
            );
        }
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(3),
            },
            &mut events,
        );

        let eliminations = events
            .iter()
            .filter(|event| matches!(event, Event::OccupantEliminated { .. }))
            .count();
        assert_eq!(eliminations, 1);
        assert_eq!(query::gold(&world, occupant), Some(0.0));
        assert_eq!(
            world.upgrade_bed(occupant),
            Err(Rejection::InvalidTarget(InvalidTarget::OccupantEliminated))
        );
    }

    #[test]
    fn turrets_fall_silent_once_the_door_breaks() {
        let (mut world, occupant) = housed_world(50.0);
        let _ = world
            .build_at(occupant, CellIndex::new(3), BuildingKind::Turret)
            .expect("affordable turret");
        assert_eq!(query::turret_view(&world).iter().count(), 1);

        assert!(world.take_door_damage(RoomId::new(1), 1_000));
        assert_eq!(query::turret_view(&world).iter().count(), 0);
    }

    #[test]
    fn fired_turret_restarts_its_cooldown() {
        let (mut world, occupant) = housed_world(50.0);
        let cell = CellIndex::new(1);
        let _ = world
            .build_at(occupant, cell, BuildingKind::Turret)
            .expect("affordable turret");
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(2),
            },
            &mut events,
        );
        assert!(query::turret_view(&world).iter().all(|turret| turret.ready));

        apply(
            &mut world,
            Command::FireTurret {
                room: RoomId::new(1),
                cell,
            },
            &mut events,
        );
        assert!(query::turret_view(&world).iter().all(|turret| !turret.ready));
    }

    #[test]
    fn pointer_lookups_resolve_rooms_and_cells() {
        let world = World::new();
        let point = nightmare_dorm_core::WorldPoint::new(100.0, 200.0);

        assert_eq!(query::room_at(&world, point), Some(RoomId::new(1)));
        assert_eq!(
            query::cell_at(&world, RoomId::new(1), point),
            Some(CellIndex::new(5))
        );
        assert_eq!(
            query::room_at(&world, nightmare_dorm_core::WorldPoint::new(200.0, 30.0)),
            None
        );
    }
}
