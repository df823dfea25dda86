//! Face directions and direction bitsets for 6-connected section traversal.

use glam::IVec3;

/// One of the six face directions of a section.
///
/// Discriminants are stable: they index the [`FaceVisibility`] matrix and
/// the bits of a [`DirectionSet`].
///
/// [`FaceVisibility`]: crate::section::FaceVisibility
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum Direction {
  Down = 0,
  Up = 1,
  North = 2,
  South = 3,
  West = 4,
  East = 5,
}

impl Direction {
  /// All six directions, in discriminant order. Traversal iterates this
  /// array so BFS results are deterministic.
  pub const ALL: [Direction; 6] = [
    Direction::Down,
    Direction::Up,
    Direction::North,
    Direction::South,
    Direction::West,
    Direction::East,
  ];

  /// Number of face directions.
  pub const COUNT: usize = 6;

  /// Matrix/bit index of this direction.
  #[inline]
  pub fn index(self) -> usize {
    self as usize
  }

  /// The opposing face direction.
  #[inline]
  pub fn opposite(self) -> Direction {
    match self {
      Direction::Down => Direction::Up,
      Direction::Up => Direction::Down,
      Direction::North => Direction::South,
      Direction::South => Direction::North,
      Direction::West => Direction::East,
      Direction::East => Direction::West,
    }
  }

  /// Unit offset on the section grid.
  #[inline]
  pub fn offset(self) -> IVec3 {
    match self {
      Direction::Down => IVec3::new(0, -1, 0),
      Direction::Up => IVec3::new(0, 1, 0),
      Direction::North => IVec3::new(0, 0, -1),
      Direction::South => IVec3::new(0, 0, 1),
      Direction::West => IVec3::new(-1, 0, 0),
      Direction::East => IVec3::new(1, 0, 0),
    }
  }
}

/// Set of face directions packed into the low six bits of a byte.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct DirectionSet(u8);

impl DirectionSet {
  /// The empty set.
  pub const EMPTY: DirectionSet = DirectionSet(0);

  /// All six directions.
  pub const ALL: DirectionSet = DirectionSet(0b11_1111);

  /// Add a direction in place.
  #[inline]
  pub fn insert(&mut self, dir: Direction) {
    self.0 |= 1 << dir.index();
  }

  /// Copy of this set with `dir` added.
  #[inline]
  pub fn with(self, dir: Direction) -> DirectionSet {
    DirectionSet(self.0 | (1 << dir.index()))
  }

  /// Membership test.
  #[inline]
  pub fn contains(self, dir: Direction) -> bool {
    self.0 & (1 << dir.index()) != 0
  }

  #[inline]
  pub fn is_empty(self) -> bool {
    self.0 == 0
  }

  /// Number of directions in the set.
  #[inline]
  pub fn len(self) -> usize {
    self.0.count_ones() as usize
  }

  /// Iterate the members in discriminant order.
  pub fn iter(self) -> impl Iterator<Item = Direction> {
    Direction::ALL.into_iter().filter(move |d| self.contains(*d))
  }
}

impl std::ops::BitOr for DirectionSet {
  type Output = DirectionSet;

  #[inline]
  fn bitor(self, rhs: DirectionSet) -> DirectionSet {
    DirectionSet(self.0 | rhs.0)
  }
}

impl std::ops::BitOrAssign for DirectionSet {
  #[inline]
  fn bitor_assign(&mut self, rhs: DirectionSet) {
    self.0 |= rhs.0;
  }
}

#[cfg(test)]
#[path = "direction_test.rs"]
mod direction_test;
