#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Skirmish battle engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. The orchestrator submits [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values describing what
//! actually happened. Rule violations never abort: they surface as rejection
//! events carrying one of the typed reasons from this crate.

use std::fmt;

use serde::{Deserialize, Serialize};

mod error;
pub mod presets;
mod roster;
mod squad;
mod stats;

pub use error::{
    AttackError, ModifierError, MoveError, PlacementError, PurchaseError, SkillError, SquadError,
};
pub use roster::{PlayerProfile, RosterSnapshot};
pub use squad::{
    EntityKind, EntitySpec, Role, Squad, StructureKind, UnitKind, UnitSpec, HERO_COUNT,
    TOWER_COUNT, TOWN_CENTER_COUNT, VILLAGER_COUNT,
};
pub use stats::{
    saturating_pow10, BaseStats, EffectiveStats, Modifier, ModifierScope, Skill, CRIT_SCALE,
};

/// Number of tile columns on every battlefield.
pub const GRID_COLUMNS: u32 = 20;

/// Number of tile rows on every battlefield.
pub const GRID_ROWS: u32 = 20;

/// Identifies one of the two sides taking part in a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TeamId {
    /// The side that acts first.
    One,
    /// The side that acts second.
    Two,
}

impl TeamId {
    /// Both teams in turn order.
    pub const ALL: [TeamId; 2] = [TeamId::One, TeamId::Two];

    /// Returns the opposing team.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    /// Zero-based index of the team, suitable for indexing per-team arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One => write!(f, "team one"),
            Self::Two => write!(f, "team two"),
        }
    }
}

/// Unique identifier assigned to an entity by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
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

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Cardinal directions, listed in the order adjacency is scanned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Toward decreasing row indices.
    North,
    /// Toward increasing column indices.
    East,
    /// Toward increasing row indices.
    South,
    /// Toward decreasing column indices.
    West,
}

impl Direction {
    /// All directions in scan order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];
}

/// Location of a single tile expressed as column (`x`) and row (`y`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: u32,
    y: u32,
}

impl Position {
    /// Creates a new tile position.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Computes the Manhattan distance between two positions.
    #[must_use]
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Reports whether the position lies inside a grid of the given size.
    #[must_use]
    pub const fn within(self, columns: u32, rows: u32) -> bool {
        self.x < columns && self.y < rows
    }

    /// Returns the adjacent position in `direction`, if it lies inside the grid.
    #[must_use]
    pub fn step(self, direction: Direction, columns: u32, rows: u32) -> Option<Position> {
        let next = match direction {
            Direction::North => Position::new(self.x, self.y.checked_sub(1)?),
            Direction::East => Position::new(self.x.checked_add(1)?, self.y),
            Direction::South => Position::new(self.x, self.y.checked_add(1)?),
            Direction::West => Position::new(self.x.checked_sub(1)?, self.y),
        };
        next.within(columns, rows).then_some(next)
    }

    /// Up to four in-bounds neighbours in north, east, south, west order.
    pub fn neighbors4(self, columns: u32, rows: u32) -> impl Iterator<Item = Position> {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| self.step(direction, columns, rows))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// What occupies a tile. A tile never holds a unit and a structure at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occupant {
    /// A mobile hero or villager.
    Unit(EntityId),
    /// An immobile tower or town center.
    Structure(EntityId),
}

impl Occupant {
    /// Identifier of the occupying entity regardless of its class.
    #[must_use]
    pub const fn entity(&self) -> EntityId {
        match self {
            Self::Unit(id) | Self::Structure(id) => *id,
        }
    }

    /// Reports whether the occupant is a mobile unit.
    #[must_use]
    pub const fn is_unit(&self) -> bool {
        matches!(self, Self::Unit(_))
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Registers a new entity for `team` and places it on the grid.
    PlaceEntity {
        /// Side that owns the entity.
        team: TeamId,
        /// Template the entity is built from.
        spec: EntitySpec,
        /// Tile the entity should occupy.
        position: Position,
    },
    /// Clears whatever occupies the tile, leaving the entity unplaced.
    ClearTile {
        /// Tile to clear.
        position: Position,
    },
    /// Moves a unit to a destination within its movement budget.
    MoveUnit {
        /// Unit attempting to move.
        unit: EntityId,
        /// Tile the unit wants to occupy.
        destination: Position,
    },
    /// Resolves a melee attack between adjacent enemies.
    Attack {
        /// Entity performing the attack.
        attacker: EntityId,
        /// Entity receiving the attack.
        target: EntityId,
        /// Name of the skill the attacker wants to use, if any.
        skill: Option<String>,
        /// Outcome of the critical-hit roll performed by the caller.
        critical: bool,
    },
    /// Stacks a modifier onto an entity's stats.
    ApplyModifier {
        /// Entity receiving the modifier.
        entity: EntityId,
        /// Modifier record to apply.
        modifier: Modifier,
    },
    /// Removes a previously applied rune by name.
    RemoveModifier {
        /// Entity carrying the rune.
        entity: EntityId,
        /// Name of the rune to remove.
        name: String,
    },
    /// Removes every battle-scoped rune from an entity.
    StripRunes {
        /// Entity to strip.
        entity: EntityId,
    },
    /// Adds battle experience and performs any resulting level-ups.
    GrantExperience {
        /// Entity receiving experience.
        entity: EntityId,
        /// Amount of experience granted.
        amount: u64,
    },
    /// Deals flat damage that bypasses the combat resolver.
    DamageEntity {
        /// Entity receiving the damage.
        entity: EntityId,
        /// Health removed from the entity.
        amount: u64,
    },
    /// Closes a team's turn: clears per-turn flags and regenerates its heroes.
    EndTurn {
        /// Team whose turn ends.
        team: TeamId,
    },
    /// Revives a defeated unit at a new tile.
    Respawn {
        /// Unit to revive.
        unit: EntityId,
        /// Tile the unit should occupy after reviving.
        position: Position,
    },
    /// Returns an entity to battle level one.
    ResetToBaseLevel {
        /// Entity to reset.
        entity: EntityId,
    },
    /// Clears an entity's kill and death tallies.
    ClearTallies {
        /// Entity whose tallies are cleared.
        entity: EntityId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Confirms that an entity was registered and placed.
    EntityPlaced {
        /// Identifier allocated to the entity.
        entity: EntityId,
        /// Side that owns the entity.
        team: TeamId,
        /// Kind of entity that was placed.
        kind: EntityKind,
        /// Tile the entity occupies.
        position: Position,
    },
    /// Reports that a placement or respawn could not occupy the requested tile.
    PlacementRejected {
        /// Tile requested by the command.
        position: Position,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tile was cleared.
    TileCleared {
        /// Tile that was cleared.
        position: Position,
        /// Entity that previously occupied the tile.
        entity: EntityId,
    },
    /// Confirms that a unit moved between two tiles.
    UnitMoved {
        /// Unit that moved.
        unit: EntityId,
        /// Tile the unit left.
        from: Position,
        /// Tile the unit now occupies.
        to: Position,
    },
    /// Reports that a move request was rejected.
    MoveRejected {
        /// Unit that attempted to move.
        unit: EntityId,
        /// Specific reason the move failed.
        reason: MoveError,
    },
    /// Reports that a requested skill was refused and a plain attack was used instead.
    SkillRejected {
        /// Entity that requested the skill.
        attacker: EntityId,
        /// Name of the refused skill.
        skill: String,
        /// Specific reason the skill was refused.
        reason: SkillError,
    },
    /// Confirms that an attack was resolved.
    AttackResolved {
        /// Entity that attacked.
        attacker: EntityId,
        /// Entity that was attacked.
        target: EntityId,
        /// Health removed from the target.
        damage: u64,
        /// Indicates whether the attack was a critical hit.
        critical: bool,
        /// Skill used for the attack, if any.
        skill: Option<String>,
    },
    /// Reports that an attack request was rejected.
    AttackRejected {
        /// Entity that attempted to attack.
        attacker: EntityId,
        /// Entity that was targeted.
        target: EntityId,
        /// Specific reason the attack failed.
        reason: AttackError,
    },
    /// Confirms that an entity lost health outside of an attack.
    EntityDamaged {
        /// Entity that was damaged.
        entity: EntityId,
        /// Health removed from the entity.
        amount: u64,
    },
    /// Announces that an entity's health reached zero.
    EntityDefeated {
        /// Entity that was defeated.
        entity: EntityId,
        /// Entity credited with the defeat, if any.
        by: Option<EntityId>,
    },
    /// Confirms that an entity accumulated battle experience.
    ExperienceGained {
        /// Entity that gained experience.
        entity: EntityId,
        /// Amount of experience gained.
        amount: u64,
    },
    /// Announces that an entity reached a new battle level.
    LeveledUp {
        /// Entity that leveled up.
        entity: EntityId,
        /// Level the entity reached.
        level: u32,
    },
    /// Confirms that a modifier was stacked onto an entity.
    ModifierApplied {
        /// Entity that received the modifier.
        entity: EntityId,
        /// Name of the modifier.
        name: String,
        /// Whether the modifier is a rune or an upgrade.
        scope: ModifierScope,
    },
    /// Confirms that a rune was removed from an entity.
    ModifierRemoved {
        /// Entity that lost the rune.
        entity: EntityId,
        /// Name of the removed rune.
        name: String,
    },
    /// Reports that a modifier command was rejected.
    ModifierRejected {
        /// Entity targeted by the command.
        entity: EntityId,
        /// Name of the modifier in the command.
        name: String,
        /// Specific reason the command failed.
        reason: ModifierError,
    },
    /// Confirms that a team's turn was closed.
    TurnEnded {
        /// Team whose turn ended.
        team: TeamId,
    },
    /// Confirms that a defeated unit was revived.
    UnitRespawned {
        /// Unit that was revived.
        unit: EntityId,
        /// Tile the corpse occupied, if any.
        from: Option<Position>,
        /// Tile the unit occupies after reviving.
        to: Position,
    },
    /// Confirms that an entity returned to level one.
    LevelReset {
        /// Entity that was reset.
        entity: EntityId,
    },
    /// Confirms that an entity's tallies were cleared.
    TalliesCleared {
        /// Entity whose tallies were cleared.
        entity: EntityId,
    },
}

/// Immutable representation of a single entity's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EntitySnapshot {
    /// Identifier allocated by the world.
    pub id: EntityId,
    /// Display name copied from the entity's template.
    pub name: String,
    /// Side that owns the entity.
    pub team: TeamId,
    /// Kind of entity.
    pub kind: EntityKind,
    /// Tile currently occupied, if the entity is placed.
    pub position: Option<Position>,
    /// Current health.
    pub health: u64,
    /// Current magic resource. Always zero for structures.
    pub magic: u64,
    /// Effective combat stats after levels and modifiers.
    pub stats: EffectiveStats,
    /// Current battle level, starting at one.
    pub level: u32,
    /// Accumulated battle experience.
    pub experience: u64,
    /// Experience required to reach the next level.
    pub required_experience: u64,
    /// Indicates whether the entity moved during its team's current turn.
    pub has_moved: bool,
    /// Indicates whether the entity attacked during its team's current turn.
    pub has_attacked: bool,
    /// Number of units this entity defeated.
    pub kills: u32,
    /// Number of times this entity was defeated. Always zero for structures.
    pub deaths: u32,
    /// Maximum Manhattan distance per move, absent for structures.
    pub movement: Option<u32>,
    /// Skills available to the entity.
    pub skills: Vec<Skill>,
    /// Modifiers currently stacked on the entity, in application order.
    pub modifiers: Vec<Modifier>,
}

impl EntitySnapshot {
    /// Reports whether the entity still has health left.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Reports whether the entity is a hero or villager.
    #[must_use]
    pub const fn is_unit(&self) -> bool {
        self.kind.is_unit()
    }

    /// Looks up an owned skill by name.
    #[must_use]
    pub fn skill(&self, name: &str) -> Option<&Skill> {
        self.skills.iter().find(|skill| skill.name == name)
    }
}

/// Read-only snapshot describing every registered entity.
#[derive(Clone, Debug, Default)]
pub struct EntityView {
    snapshots: Vec<EntitySnapshot>,
}

impl EntityView {
    /// Creates a new entity view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EntitySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &EntitySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a snapshot by identifier.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&EntitySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EntitySnapshot> {
        self.snapshots
    }
}

/// Read-only view into the dense occupancy grid.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyView<'a> {
    cells: &'a [Option<Occupant>],
    columns: u32,
    rows: u32,
}

impl<'a> OccupancyView<'a> {
    /// Captures a new occupancy view backed by the provided cell slice.
    #[must_use]
    pub fn new(cells: &'a [Option<Occupant>], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Returns the occupant of the provided tile, if any.
    #[must_use]
    pub fn occupant(&self, position: Position) -> Option<Occupant> {
        self.index(position)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Reports whether the tile exists and is unoccupied.
    #[must_use]
    pub fn is_free(&self, position: Position) -> bool {
        self.index(position)
            .is_some_and(|index| matches!(self.cells.get(index), Some(None)))
    }

    /// Returns an iterator over all tiles in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = Option<Occupant>> + 'a {
        self.cells.iter().copied()
    }

    /// Provides the dimensions of the underlying occupancy grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
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
    use super::{Occupant, OccupancyView, Position, RosterSnapshot, TeamId};
    use crate::presets;
    use crate::PlayerProfile;

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = Position::new(1, 1);
        let destination = Position::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn neighbors_are_listed_north_east_south_west() {
        let neighbors: Vec<_> = Position::new(5, 5).neighbors4(20, 20).collect();
        assert_eq!(
            neighbors,
            vec![
                Position::new(5, 4),
                Position::new(6, 5),
                Position::new(5, 6),
                Position::new(4, 5),
            ]
        );
    }

    #[test]
    fn corner_neighbors_stay_in_bounds() {
        let neighbors: Vec<_> = Position::new(0, 0).neighbors4(20, 20).collect();
        assert_eq!(neighbors, vec![Position::new(1, 0), Position::new(0, 1)]);

        let far: Vec<_> = Position::new(19, 19).neighbors4(20, 20).collect();
        assert_eq!(far, vec![Position::new(19, 18), Position::new(18, 19)]);
    }

    #[test]
    fn opponent_is_symmetric() {
        for team in TeamId::ALL {
            assert_eq!(team.opponent().opponent(), team);
            assert_ne!(team.opponent(), team);
        }
    }

    #[test]
    fn occupancy_view_treats_out_of_bounds_as_blocked() {
        let cells = vec![None, Some(Occupant::Unit(super::EntityId::new(3))), None, None];
        let view = OccupancyView::new(&cells, 2, 2);

        assert!(view.is_free(Position::new(0, 0)));
        assert!(!view.is_free(Position::new(1, 0)));
        assert!(!view.is_free(Position::new(2, 0)));
        assert_eq!(
            view.occupant(Position::new(1, 0)).map(|occupant| occupant.entity()),
            Some(super::EntityId::new(3))
        );
    }

    #[test]
    fn roster_round_trips_through_bincode() {
        let roster = RosterSnapshot {
            profiles: vec![PlayerProfile {
                name: "Aster".to_owned(),
                currency: 1_250,
                rank: 3,
                heroes: vec![presets::hero("Aster")],
            }],
        };

        let bytes = bincode::serialize(&roster).expect("serialize");
        let restored: RosterSnapshot = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, roster);
    }
}
