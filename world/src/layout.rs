//! Static room layout table.

use nightmare_dorm_core::{DoorSide, RoomId, WorldPoint, WorldRect};
use serde::{Deserialize, Serialize};

/// Placement of a single room in the dormitory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomLayout {
    /// Identifier the room is created with.
    pub id: RoomId,
    /// Rectangle covered by the room.
    pub bounds: WorldRect,
    /// Number of grid columns.
    pub columns: u32,
    /// Number of grid rows.
    pub rows: u32,
    /// Wall carrying the door.
    pub door: DoorSide,
}

impl RoomLayout {
    const fn new(id: u32, bounds: WorldRect, columns: u32, rows: u32, door: DoorSide) -> Self {
        Self {
            id: RoomId::new(id),
            bounds,
            columns,
            rows,
            door,
        }
    }

    /// The six rooms of the default dormitory floor.
    #[must_use]
    pub fn dormitory() -> Vec<RoomLayout> {
        vec![
            Self::new(1, WorldRect::new(10.0, 60.0, 130.0, 160.0), 2, 3, DoorSide::Bottom),
            Self::new(2, WorldRect::new(310.0, 60.0, 130.0, 160.0), 2, 3, DoorSide::Bottom),
            Self::new(3, WorldRect::new(10.0, 340.0, 130.0, 180.0), 2, 3, DoorSide::Right),
            Self::new(4, WorldRect::new(310.0, 340.0, 130.0, 180.0), 2, 3, DoorSide::Left),
            Self::new(5, WorldRect::new(10.0, 570.0, 180.0, 120.0), 3, 2, DoorSide::Top),
            Self::new(6, WorldRect::new(260.0, 570.0, 180.0, 120.0), 3, 2, DoorSide::Top),
        ]
    }

    /// Midpoint of the door on its wall.
    #[must_use]
    pub fn door_point(&self) -> WorldPoint {
        self.door.midpoint_of(&self.bounds)
    }
}

/// Spacing of the grid drawn inside every room.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridMetrics {
    /// Side length of a cell.
    pub cell_size: f32,
    /// Gap between the room's corner and its first cell.
    pub inset: f32,
}

impl GridMetrics {
    /// Centre of the cell at the given column and row.
    #[must_use]
    pub fn cell_centre(&self, bounds: &WorldRect, column: u32, row: u32) -> WorldPoint {
        let half = self.cell_size / 2.0;
        bounds.origin().offset(
            self.inset + column as f32 * self.cell_size + half,
            self.inset + row as f32 * self.cell_size + half,
        )
    }

    /// Reports whether `point` lies within half a cell of `centre` on both axes.
    #[must_use]
    pub fn covers(&self, centre: WorldPoint, point: WorldPoint) -> bool {
        let half = self.cell_size / 2.0;
        (point.x() - centre.x()).abs() <= half && (point.y() - centre.y()).abs() <= half
    }
}

impl Default for GridMetrics {
    fn default() -> Self {
        Self {
            cell_size: 50.0,
            inset: 15.0,
        }
    }
}
