//! Dense occupancy grid that backs every placement on the battlefield.

use skirmish_core::{Occupant, OccupancyView, PlacementError, Position};

/// Row-major tile storage. Each tile holds at most one occupant.
#[derive(Clone, Debug)]
pub(crate) struct Grid {
    columns: u32,
    rows: u32,
    cells: Vec<Option<Occupant>>,
}

impl Grid {
    pub(crate) fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![None; capacity],
        }
    }

    pub(crate) const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    pub(crate) fn occupant(&self, position: Position) -> Option<Occupant> {
        self.index(position)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Reports why `position` cannot accept a new occupant, if it cannot.
    pub(crate) fn check_vacant(&self, position: Position) -> Result<(), PlacementError> {
        let index = self.index(position).ok_or(PlacementError::OutOfBounds)?;
        match self.cells.get(index) {
            Some(None) => Ok(()),
            Some(Some(_)) => Err(PlacementError::Occupied),
            None => Err(PlacementError::OutOfBounds),
        }
    }

    pub(crate) fn place(
        &mut self,
        occupant: Occupant,
        position: Position,
    ) -> Result<(), PlacementError> {
        self.check_vacant(position)?;
        let index = self.index(position).ok_or(PlacementError::OutOfBounds)?;
        if let Some(slot) = self.cells.get_mut(index) {
            *slot = Some(occupant);
        }
        Ok(())
    }

    pub(crate) fn remove(&mut self, position: Position) -> Option<Occupant> {
        let index = self.index(position)?;
        self.cells.get_mut(index).and_then(Option::take)
    }

    /// Moves the occupant of `from` onto `to`, leaving both tiles untouched on failure.
    pub(crate) fn relocate(&mut self, from: Position, to: Position) -> Result<(), PlacementError> {
        self.check_vacant(to)?;
        let occupant = self.remove(from).ok_or(PlacementError::UnknownEntity)?;
        self.place(occupant, to)
    }

    /// Unoccupied tiles in row-major order.
    pub(crate) fn free_positions(&self) -> Vec<Position> {
        (0..self.rows)
            .flat_map(|y| (0..self.columns).map(move |x| Position::new(x, y)))
            .filter(|position| self.check_vacant(*position).is_ok())
            .collect()
    }

    pub(crate) fn view(&self) -> OccupancyView<'_> {
        OccupancyView::new(&self.cells, self.columns, self.rows)
    }

    fn index(&self, position: Position) -> Option<usize> {
        if position.within(self.columns, self.rows) {
            let row = usize::try_from(position.y()).ok()?;
            let column = usize::try_from(position.x()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::EntityId;

    fn unit(id: u32) -> Occupant {
        Occupant::Unit(EntityId::new(id))
    }

    #[test]
    fn place_rejects_out_of_bounds_and_occupied() {
        let mut grid = Grid::new(4, 3);
        assert_eq!(grid.place(unit(0), Position::new(1, 1)), Ok(()));
        assert_eq!(
            grid.place(unit(1), Position::new(1, 1)),
            Err(PlacementError::Occupied)
        );
        assert_eq!(
            grid.place(unit(1), Position::new(4, 0)),
            Err(PlacementError::OutOfBounds)
        );
        assert_eq!(grid.occupant(Position::new(1, 1)), Some(unit(0)));
    }

    #[test]
    fn remove_returns_previous_occupant() {
        let mut grid = Grid::new(2, 2);
        let structure = Occupant::Structure(EntityId::new(9));
        assert_eq!(grid.place(structure, Position::new(0, 1)), Ok(()));
        assert_eq!(grid.remove(Position::new(0, 1)), Some(structure));
        assert_eq!(grid.remove(Position::new(0, 1)), None);
        assert_eq!(grid.remove(Position::new(5, 5)), None);
    }

    #[test]
    fn relocate_keeps_source_when_destination_is_taken() {
        let mut grid = Grid::new(3, 3);
        assert_eq!(grid.place(unit(0), Position::new(0, 0)), Ok(()));
        assert_eq!(grid.place(unit(1), Position::new(1, 0)), Ok(()));

        assert_eq!(
            grid.relocate(Position::new(0, 0), Position::new(1, 0)),
            Err(PlacementError::Occupied)
        );
        assert_eq!(grid.occupant(Position::new(0, 0)), Some(unit(0)));

        assert_eq!(grid.relocate(Position::new(0, 0), Position::new(2, 2)), Ok(()));
        assert_eq!(grid.occupant(Position::new(0, 0)), None);
        assert_eq!(grid.occupant(Position::new(2, 2)), Some(unit(0)));
    }

    #[test]
    fn free_positions_are_row_major() {
        let mut grid = Grid::new(2, 2);
        assert_eq!(grid.place(unit(0), Position::new(1, 0)), Ok(()));
        assert_eq!(
            grid.free_positions(),
            vec![Position::new(0, 0), Position::new(0, 1), Position::new(1, 1)]
        );
        assert_eq!(grid.view().dimensions(), grid.dimensions());
    }
}
