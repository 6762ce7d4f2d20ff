#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Nightmare Dorm simulation.
//!
//! This crate defines the message surface that connects the session, the
//! authoritative world, and pure systems. The session submits [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and every system reports what happened as
//! [`Event`] values collected into a per-tick list. Systems read immutable
//! snapshots and never hold references into the world.

pub mod geometry;
pub mod progress;
pub mod tables;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use geometry::{DoorSide, WorldPoint, WorldRect};
pub use progress::{CareerStats, GameRecord, MemoryStore, ProgressStore, Talent, Talents};
pub use tables::{
    BedTier, BuildingCatalogue, BuildingKind, BuildingSpec, DoorTier, EconomyTables, Tier,
};

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(u32);

        impl $name {
            /// Creates a new identifier with the provided numeric value.
            #[must_use]
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// Retrieves the numeric representation of the identifier.
            #[must_use]
            pub const fn get(&self) -> u32 {
                self.0
            }
        }
    };
}

identifier!(
    /// Identifier of a room, taken from the static layout table.
    RoomId
);
identifier!(
    /// Identifier of a human or autonomous occupant.
    OccupantId
);
identifier!(
    /// Identifier assigned to an intruder when it spawns.
    IntruderId
);
identifier!(
    /// Identifier assigned to a projectile when a turret fires.
    ProjectileId
);

/// Index of a grid cell inside a room, in row-major order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellIndex(u32);

impl CellIndex {
    /// Cell reserved for the bed.
    pub const BED: CellIndex = CellIndex(0);

    /// Creates a cell index wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether this is the bed cell.
    #[must_use]
    pub const fn is_bed(&self) -> bool {
        self.0 == Self::BED.0
    }
}

/// Phases of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Occupants are choosing rooms under a countdown.
    Selecting,
    /// Rooms earn income while intruders attack.
    Playing,
    /// The human survived the full duration.
    Victory,
    /// The human's door was broken.
    GameOver,
}

impl Phase {
    /// Reports whether the phase ends the session.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Victory | Self::GameOver)
    }
}

/// Behavioural state of an intruder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntruderMode {
    /// Wandering without a lock-on target.
    Idle,
    /// Locked onto a room and battering its door.
    Attack,
    /// Returning to the spawn point to heal.
    Retreat,
    /// Pursuing an exposed occupant directly.
    Chase,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the economy clock, paying income to every resting owner.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that an occupant take ownership of a free room.
    ClaimRoom {
        /// Occupant claiming the room.
        occupant: OccupantId,
        /// Room being claimed.
        room: RoomId,
    },
    /// Requests that an occupant raise their bed by one tier.
    UpgradeBed {
        /// Occupant paying for the upgrade.
        occupant: OccupantId,
    },
    /// Requests that an occupant raise their door by one tier.
    UpgradeDoor {
        /// Occupant paying for the upgrade.
        occupant: OccupantId,
    },
    /// Requests placement of a building inside the occupant's room.
    Build {
        /// Occupant paying for the building.
        occupant: OccupantId,
        /// Non-bed cell that receives the building.
        cell: CellIndex,
        /// Kind of building to place.
        kind: BuildingKind,
    },
    /// Credits gold to an occupant.
    Reward {
        /// Occupant receiving the gold.
        occupant: OccupantId,
        /// Amount credited.
        amount: f64,
    },
    /// Lays every living owner down to rest so their rooms start earning.
    BeginResting,
    /// Restarts a turret's cooldown after it fired.
    FireTurret {
        /// Room holding the turret.
        room: RoomId,
        /// Cell holding the turret.
        cell: CellIndex,
    },
    /// Marks an occupant as no longer alive.
    EliminateOccupant {
        /// Occupant being eliminated.
        occupant: OccupantId,
        /// Flavour text broadcast with the elimination.
        message: String,
    },
}

/// Events reported by the world and systems while a tick resolves.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the session entered a new phase.
    PhaseChanged {
        /// Phase that was active before the transition.
        from: Phase,
        /// Phase that became active.
        to: Phase,
    },
    /// Confirms that an occupant took ownership of a room.
    RoomClaimed {
        /// New owner of the room.
        occupant: OccupantId,
        /// Room that was claimed.
        room: RoomId,
    },
    /// Confirms that a bed advanced one tier.
    BedUpgraded {
        /// Room holding the bed.
        room: RoomId,
        /// Tier reached by the upgrade.
        tier: Tier,
        /// Gold deducted.
        cost: u32,
    },
    /// Confirms that a door advanced one tier and was restored to full health.
    DoorUpgraded {
        /// Room holding the door.
        room: RoomId,
        /// Tier reached by the upgrade.
        tier: Tier,
        /// Gold deducted.
        cost: u32,
        /// Maximum hit points of the new tier.
        max_hp: u32,
    },
    /// Confirms that a building was placed.
    BuildingPlaced {
        /// Room holding the building.
        room: RoomId,
        /// Cell the building occupies.
        cell: CellIndex,
        /// Kind of building.
        kind: BuildingKind,
        /// Gold deducted.
        cost: u32,
    },
    /// Reports that a command was refused without changing any state.
    CommandRejected {
        /// Occupant that issued the command.
        occupant: OccupantId,
        /// Reason the command was refused.
        reason: Rejection,
    },
    /// Intruders became active for the rest of the session.
    IntrudersAwakened,
    /// A new wave was scheduled.
    WaveStarted {
        /// One-based wave index.
        wave: u32,
        /// Number of intruders the wave spawns.
        intruders: u32,
    },
    /// An intruder entered the arena.
    IntruderSpawned {
        /// Identifier assigned to the intruder.
        intruder: IntruderId,
        /// Wave that produced the intruder.
        wave: u32,
        /// Spawn position.
        position: WorldPoint,
    },
    /// An intruder switched behavioural state.
    IntruderModeChanged {
        /// Intruder that transitioned.
        intruder: IntruderId,
        /// State that was left.
        from: IntruderMode,
        /// State that was entered.
        to: IntruderMode,
    },
    /// A door reached zero hit points.
    RoomBroken {
        /// Room whose door broke.
        room: RoomId,
    },
    /// A turret fired a projectile.
    ProjectileFired {
        /// Identifier of the projectile.
        projectile: ProjectileId,
        /// Room holding the turret.
        room: RoomId,
        /// Intruder the projectile homes on.
        target: IntruderId,
    },
    /// An intruder was killed by a projectile.
    IntruderKilled {
        /// Intruder that died.
        intruder: IntruderId,
        /// Room whose turret fired the killing projectile.
        room: RoomId,
        /// Gold granted for the kill.
        reward: u32,
    },
    /// A chasing intruder reached an exposed occupant.
    OccupantCaught {
        /// Occupant that was caught.
        occupant: OccupantId,
        /// Intruder that caught them.
        intruder: IntruderId,
    },
    /// An occupant was eliminated.
    OccupantEliminated {
        /// Occupant that was eliminated.
        occupant: OccupantId,
        /// Flavour text to broadcast.
        message: String,
    },
}

/// Reasons a command may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum Rejection {
    /// The payer cannot cover the price.
    #[error("insufficient funds: needed {needed}, available {available}")]
    InsufficientFunds {
        /// Price of the action.
        needed: u64,
        /// Balance held by the payer, rounded down.
        available: u64,
    },
    /// The command referenced something it cannot act on.
    #[error("invalid target: {0}")]
    InvalidTarget(InvalidTarget),
}

/// Details for [`Rejection::InvalidTarget`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum InvalidTarget {
    /// No room carries the identifier.
    #[error("unknown room")]
    UnknownRoom,
    /// No occupant carries the identifier.
    #[error("unknown occupant")]
    UnknownOccupant,
    /// The room has no cell with the index.
    #[error("unknown cell")]
    UnknownCell,
    /// The bed cell never holds a building.
    #[error("cell is reserved for the bed")]
    BedCell,
    /// The cell already holds a building.
    #[error("cell is occupied")]
    Occupied,
    /// The upgrade table has no further tier.
    #[error("already at max tier")]
    MaxTier,
    /// Another occupant owns the room.
    #[error("room belongs to another occupant")]
    RoomTaken,
    /// The occupant already owns a room.
    #[error("occupant already owns a room")]
    AlreadyHoused,
    /// The occupant does not own a room.
    #[error("occupant owns no room")]
    NoRoom,
    /// Room selection is closed.
    #[error("room selection is closed")]
    NotSelecting,
    /// The session is not in the playing phase.
    #[error("session is not playing")]
    NotPlaying,
    /// The occupant was eliminated.
    #[error("occupant was eliminated")]
    OccupantEliminated,
}

impl From<InvalidTarget> for Rejection {
    fn from(reason: InvalidTarget) -> Self {
        Self::InvalidTarget(reason)
    }
}

/// Successful outcome of an economy command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Receipt {
    /// A room changed hands.
    RoomClaimed {
        /// Room that was claimed.
        room: RoomId,
    },
    /// A bed advanced one tier.
    BedUpgraded {
        /// Room holding the bed.
        room: RoomId,
        /// Tier reached.
        tier: Tier,
        /// Gold deducted.
        cost: u32,
    },
    /// A door advanced one tier.
    DoorUpgraded {
        /// Room holding the door.
        room: RoomId,
        /// Tier reached.
        tier: Tier,
        /// Gold deducted.
        cost: u32,
        /// Maximum hit points of the new tier.
        max_hp: u32,
    },
    /// A building was placed.
    BuildingPlaced {
        /// Room holding the building.
        room: RoomId,
        /// Cell the building occupies.
        cell: CellIndex,
        /// Kind of building.
        kind: BuildingKind,
        /// Gold deducted.
        cost: u32,
    },
}

impl Receipt {
    /// Gold deducted by the command.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        match self {
            Self::RoomClaimed { .. } => 0,
            Self::BedUpgraded { cost, .. }
            | Self::DoorUpgraded { cost, .. }
            | Self::BuildingPlaced { cost, .. } => *cost,
        }
    }

    /// Event announcing the receipt on behalf of the occupant.
    #[must_use]
    pub const fn into_event(self, occupant: OccupantId) -> Event {
        match self {
            Self::RoomClaimed { room } => Event::RoomClaimed { occupant, room },
            Self::BedUpgraded { room, tier, cost } => Event::BedUpgraded { room, tier, cost },
            Self::DoorUpgraded {
                room,
                tier,
                cost,
                max_hp,
            } => Event::DoorUpgraded {
                room,
                tier,
                cost,
                max_hp,
            },
            Self::BuildingPlaced {
                room,
                cell,
                kind,
                cost,
            } => Event::BuildingPlaced {
                room,
                cell,
                kind,
                cost,
            },
        }
    }
}

/// Result of applying projectile damage to an intruder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Hit {
    /// The intruder no longer exists or is already dead.
    Stale,
    /// The intruder survived with the remaining hit points.
    Wounded {
        /// Hit points left after the hit.
        remaining: f32,
    },
    /// The intruder died.
    Killed {
        /// Wave that spawned the intruder.
        wave: u32,
    },
}

/// Immutable representation of a door.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DoorSnapshot {
    /// Current tier.
    pub tier: Tier,
    /// Remaining hit points.
    pub hp: u32,
    /// Maximum hit points of the current tier, talent bonus included.
    pub max_hp: u32,
    /// Flat damage reduction.
    pub armor: u32,
}

impl DoorSnapshot {
    /// Reports whether the door reached zero hit points.
    #[must_use]
    pub const fn is_broken(&self) -> bool {
        self.hp == 0
    }

    /// Remaining hit points as a fraction of the maximum.
    #[must_use]
    pub fn hp_fraction(&self) -> f32 {
        if self.max_hp == 0 {
            return 0.0;
        }
        self.hp as f32 / self.max_hp as f32
    }
}

/// Immutable representation of a room used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct RoomSnapshot {
    /// Identifier of the room.
    pub id: RoomId,
    /// Current owner, if claimed.
    pub owner: Option<OccupantId>,
    /// Whether the owner is resting and earning income.
    pub resting: bool,
    /// Tier of the bed.
    pub bed_tier: Tier,
    /// State of the door.
    pub door: DoorSnapshot,
    /// Wall carrying the door.
    pub door_side: DoorSide,
    /// Midpoint of the door on its wall.
    pub door_point: WorldPoint,
    /// Rectangle covered by the room.
    pub bounds: WorldRect,
    /// Income the room currently produces.
    pub gold_per_second: f64,
    /// Sustained turret damage per second.
    pub dps: f32,
    /// Price of the next bed tier, if one exists.
    pub next_bed_cost: Option<u32>,
    /// Price of the next door tier, if one exists.
    pub next_door_cost: Option<u32>,
    /// Lowest-index non-bed cell without a building.
    pub free_cell: Option<CellIndex>,
    /// Placed buildings keyed by cell.
    pub buildings: Vec<(CellIndex, BuildingKind)>,
}

impl RoomSnapshot {
    /// Reports whether intruders may select the room as an attack target.
    #[must_use]
    pub const fn is_target(&self) -> bool {
        self.owner.is_some() && self.resting && !self.door.is_broken()
    }
}

/// Read-only snapshot describing every room.
#[derive(Clone, Debug, Default)]
pub struct RoomView {
    snapshots: Vec<RoomSnapshot>,
}

impl RoomView {
    /// Creates a new room view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<RoomSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured rooms in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &RoomSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a single room.
    #[must_use]
    pub fn get(&self, id: RoomId) -> Option<&RoomSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<RoomSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of an occupant.
#[derive(Clone, Debug, PartialEq)]
pub struct OccupantSnapshot {
    /// Identifier of the occupant.
    pub id: OccupantId,
    /// Display name.
    pub name: String,
    /// Gold balance.
    pub gold: f64,
    /// Whether the occupant is still in the game.
    pub alive: bool,
    /// Room owned by the occupant.
    pub room: Option<RoomId>,
    /// Whether the autopilot drives the occupant.
    pub autonomous: bool,
}

/// Read-only snapshot describing every occupant.
#[derive(Clone, Debug, Default)]
pub struct OccupantView {
    snapshots: Vec<OccupantSnapshot>,
}

impl OccupantView {
    /// Creates a new occupant view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<OccupantSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured occupants in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &OccupantSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a single occupant.
    #[must_use]
    pub fn get(&self, id: OccupantId) -> Option<&OccupantSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<OccupantSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of an intruder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntruderSnapshot {
    /// Identifier of the intruder.
    pub id: IntruderId,
    /// Current position.
    pub position: WorldPoint,
    /// Remaining hit points.
    pub hp: f32,
    /// Maximum hit points.
    pub max_hp: f32,
    /// Damage dealt per strike before armor.
    pub damage: u32,
    /// Active behavioural state.
    pub mode: IntruderMode,
    /// Room locked on in attack mode.
    pub target: Option<RoomId>,
    /// Wave that spawned the intruder.
    pub wave: u32,
}

/// Read-only snapshot describing all live intruders.
#[derive(Clone, Debug, Default)]
pub struct IntruderView {
    snapshots: Vec<IntruderSnapshot>,
}

impl IntruderView {
    /// Creates a new intruder view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<IntruderSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured intruders in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &IntruderSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a single intruder.
    #[must_use]
    pub fn get(&self, id: IntruderId) -> Option<&IntruderSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Number of captured intruders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no intruders were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<IntruderSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier of the projectile.
    pub id: ProjectileId,
    /// Current position.
    pub position: WorldPoint,
    /// Intruder the projectile homes on.
    pub target: IntruderId,
    /// Damage applied on impact.
    pub damage: u32,
}

/// Immutable representation of a turret able to take part in combat.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurretSnapshot {
    /// Room holding the turret.
    pub room: RoomId,
    /// Cell holding the turret.
    pub cell: CellIndex,
    /// Centre of the turret's cell.
    pub position: WorldPoint,
    /// Damage carried by each projectile.
    pub damage: u32,
    /// Targeting radius.
    pub range: f32,
    /// Whether the cooldown reached the attack interval.
    pub ready: bool,
}

/// Read-only snapshot describing every armed turret.
#[derive(Clone, Debug, Default)]
pub struct TurretView {
    snapshots: Vec<TurretSnapshot>,
}

impl TurretView {
    /// Creates a new turret view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TurretSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| (snapshot.room, snapshot.cell));
        Self { snapshots }
    }

    /// Iterator over the captured turrets ordered by room then cell.
    pub fn iter(&self) -> impl Iterator<Item = &TurretSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TurretSnapshot> {
        self.snapshots
    }
}
