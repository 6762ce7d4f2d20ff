//! Per-room economy state: door, bed, grid and buildings.

use nightmare_dorm_core::{
    BuildingKind, BuildingSpec, CellIndex, DoorSide, DoorSnapshot, DoorTier, EconomyTables,
    OccupantId, RoomId, RoomSnapshot, Tier, WorldPoint, WorldRect,
};

use crate::layout::{GridMetrics, RoomLayout};

#[derive(Clone, Debug)]
pub(crate) struct Door {
    tier: Tier,
    hp: u32,
    max_hp: u32,
    armor: u32,
}

impl Door {
    pub(crate) fn new(tier: Tier, entry: &DoorTier, hp_bonus: u32) -> Self {
        let max_hp = entry.max_hp.saturating_add(hp_bonus);
        Self {
            tier,
            hp: max_hp,
            max_hp,
            armor: entry.armor,
        }
    }

    /// Removes `max(1, amount - armor)` hit points and reports whether this
    /// strike broke the door. A door already at zero absorbs further strikes.
    pub(crate) fn take_damage(&mut self, amount: u32) -> bool {
        if self.hp == 0 {
            return false;
        }
        let dealt = amount.saturating_sub(self.armor).max(1);
        self.hp = self.hp.saturating_sub(dealt);
        self.hp == 0
    }

    pub(crate) const fn tier(&self) -> Tier {
        self.tier
    }

    pub(crate) const fn snapshot(&self) -> DoorSnapshot {
        DoorSnapshot {
            tier: self.tier,
            hp: self.hp,
            max_hp: self.max_hp,
            armor: self.armor,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Building {
    kind: BuildingKind,
    spec: BuildingSpec,
    cooldown: f32,
}

impl Building {
    fn new(kind: BuildingKind, spec: BuildingSpec) -> Self {
        Self {
            kind,
            spec,
            cooldown: 0.0,
        }
    }

    fn is_turret(&self) -> bool {
        self.kind == BuildingKind::Turret
    }

    /// Accrues cooldown, saturating at the attack interval.
    fn accrue(&mut self, seconds: f32) {
        if self.is_turret() {
            self.cooldown = (self.cooldown + seconds).min(self.spec.attack_interval);
        }
    }

    fn ready(&self) -> bool {
        self.is_turret() && self.cooldown >= self.spec.attack_interval
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Cell {
    centre: WorldPoint,
    building: Option<Building>,
}

/// Reasons a placement was refused, mapped onto rejections by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CellFault {
    Unknown,
    Bed,
    Occupied,
}

#[derive(Clone, Debug)]
pub(crate) struct Room {
    id: RoomId,
    bounds: WorldRect,
    door_side: DoorSide,
    cells: Vec<Cell>,
    bed_tier: Tier,
    door: Door,
    owner: Option<OccupantId>,
    resting: bool,
}

impl Room {
    pub(crate) fn from_layout(
        layout: &RoomLayout,
        metrics: &GridMetrics,
        tables: &EconomyTables,
        door_hp_bonus: u32,
    ) -> Option<Self> {
        let base_door = tables.door(Tier::BASE)?;
        let cells = (0..layout.rows)
            .flat_map(|row| (0..layout.columns).map(move |column| (column, row)))
            .map(|(column, row)| Cell {
                centre: metrics.cell_centre(&layout.bounds, column, row),
                building: None,
            })
            .collect();

        Some(Self {
            id: layout.id,
            bounds: layout.bounds,
            door_side: layout.door,
            cells,
            bed_tier: Tier::BASE,
            door: Door::new(Tier::BASE, base_door, door_hp_bonus),
            owner: None,
            resting: false,
        })
    }

    pub(crate) const fn id(&self) -> RoomId {
        self.id
    }

    pub(crate) const fn owner(&self) -> Option<OccupantId> {
        self.owner
    }

    pub(crate) const fn bed_tier(&self) -> Tier {
        self.bed_tier
    }

    pub(crate) const fn bounds(&self) -> &WorldRect {
        &self.bounds
    }

    pub(crate) fn door(&self) -> &Door {
        &self.door
    }

    pub(crate) fn door_mut(&mut self) -> &mut Door {
        &mut self.door
    }

    pub(crate) fn claim(&mut self, occupant: OccupantId) {
        self.owner = Some(occupant);
    }

    pub(crate) fn set_resting(&mut self, resting: bool) {
        self.resting = resting && self.owner.is_some();
    }

    pub(crate) fn raise_bed(&mut self, tier: Tier) {
        self.bed_tier = tier;
    }

    pub(crate) fn replace_door(&mut self, door: Door) {
        self.door = door;
    }

    pub(crate) fn check_cell(&self, cell: CellIndex) -> Result<(), CellFault> {
        let slot = self
            .cells
            .get(cell.get() as usize)
            .ok_or(CellFault::Unknown)?;
        if cell.is_bed() {
            return Err(CellFault::Bed);
        }
        if slot.building.is_some() {
            return Err(CellFault::Occupied);
        }
        Ok(())
    }

    pub(crate) fn place(&mut self, cell: CellIndex, kind: BuildingKind, spec: BuildingSpec) {
        if let Some(slot) = self.cells.get_mut(cell.get() as usize) {
            slot.building = Some(Building::new(kind, spec));
        }
    }

    /// Bed income while resting plus every income building, summed linearly.
    pub(crate) fn gold_per_second(&self, tables: &EconomyTables) -> f64 {
        let bed = if self.resting {
            tables
                .bed(self.bed_tier)
                .map_or(0.0, |entry| entry.gold_per_second)
        } else {
            0.0
        };
        bed + self.buildings().map(|(_, b)| b.spec.income).sum::<f64>()
    }

    pub(crate) fn dps(&self) -> f32 {
        self.buildings()
            .filter(|(_, building)| building.is_turret())
            .map(|(_, building)| building.spec.damage_per_second())
            .sum()
    }

    fn buildings(&self) -> impl Iterator<Item = (CellIndex, &Building)> {
        self.cells.iter().enumerate().filter_map(|(index, cell)| {
            cell.building
                .as_ref()
                .map(|building| (CellIndex::new(index as u32), building))
        })
    }

    pub(crate) fn free_cell(&self) -> Option<CellIndex> {
        self.cells
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, cell)| cell.building.is_none())
            .map(|(index, _)| CellIndex::new(index as u32))
    }

    pub(crate) fn cell_at(&self, metrics: &GridMetrics, point: WorldPoint) -> Option<CellIndex> {
        self.cells
            .iter()
            .position(|cell| metrics.covers(cell.centre, point))
            .map(|index| CellIndex::new(index as u32))
    }

    /// Turrets of a claimed room whose door still stands.
    pub(crate) fn armed(&self) -> bool {
        self.owner.is_some() && !self.door.snapshot().is_broken()
    }

    pub(crate) fn accrue_cooldowns(&mut self, seconds: f32) {
        for cell in &mut self.cells {
            if let Some(building) = cell.building.as_mut() {
                building.accrue(seconds);
            }
        }
    }

    pub(crate) fn reset_cooldown(&mut self, cell: CellIndex) -> bool {
        match self
            .cells
            .get_mut(cell.get() as usize)
            .and_then(|slot| slot.building.as_mut())
        {
            Some(building) if building.is_turret() => {
                building.cooldown = 0.0;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn turrets(&self) -> impl Iterator<Item = (CellIndex, WorldPoint, &BuildingSpec, bool)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(index, cell)| {
                let building = cell.building.as_ref()?;
                building.is_turret().then(|| {
                    (
                        CellIndex::new(index as u32),
                        cell.centre,
                        &building.spec,
                        building.ready(),
                    )
                })
            })
    }

    pub(crate) fn snapshot(&self, tables: &EconomyTables) -> RoomSnapshot {
        RoomSnapshot {
            id: self.id,
            owner: self.owner,
            resting: self.resting,
            bed_tier: self.bed_tier,
            door: self.door.snapshot(),
            door_side: self.door_side,
            door_point: self.door_side.midpoint_of(&self.bounds),
            bounds: self.bounds,
            gold_per_second: self.gold_per_second(tables),
            dps: self.dps(),
            next_bed_cost: tables.next_bed(self.bed_tier).map(|(_, entry)| entry.cost),
            next_door_cost: tables
                .next_door(self.door.tier())
                .map(|(_, entry)| entry.cost),
            free_cell: self.free_cell(),
            buildings: self
                .buildings()
                .map(|(cell, building)| (cell, building.kind))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier_zero() -> DoorTier {
        DoorTier {
            max_hp: 100,
            armor: 0,
            cost: 0,
        }
    }

    #[test]
    fn chip_damage_gets_through_heavy_armor() {
        let mut door = Door::new(
            Tier::new(3),
            &DoorTier {
                max_hp: 500,
                armor: 30,
                cost: 200,
            },
            0,
        );
        assert!(!door.take_damage(10));
        assert_eq!(door.snapshot().hp, 499);
    }

    #[test]
    fn broken_door_absorbs_further_strikes() {
        let mut door = Door::new(Tier::BASE, &tier_zero(), 0);
        assert!(door.take_damage(150));
        assert!(!door.take_damage(10));
        assert_eq!(door.snapshot().hp, 0);
    }

    #[test]
    fn talent_bonus_raises_max_hp() {
        let door = Door::new(Tier::BASE, &tier_zero(), 40);
        let snapshot = door.snapshot();
        assert_eq!(snapshot.max_hp, 140);
        assert_eq!(snapshot.hp, 140);
    }

    #[test]
    fn turret_cooldown_saturates_at_interval() {
        let spec = BuildingSpec {
            cost: 50,
            damage: 5,
            range: 150.0,
            attack_interval: 1.5,
            income: 0.0,
        };
        let mut turret = Building::new(BuildingKind::Turret, spec);
        turret.accrue(1.0);
        assert!(!turret.ready());
        turret.accrue(5.0);
        assert!(turret.ready());
        assert!((turret.cooldown - 1.5).abs() < f32::EPSILON);
    }
}
