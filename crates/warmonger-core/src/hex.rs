//! Hexagon direction and axis algebra.
//!
//! A map node has six sides. Directions are listed clockwise starting from
//! West, matching the layout of a pointy-top hexagon:
//!
//! ```text
//!   NW  /\  NE
//!     /    \
//!  W |      | E
//!    |      |
//!     \    /
//!   SW  \/  SE
//! ```
//!
//! Opposite directions are grouped into three axes. Everything here is a pure
//! function over the enums; there is no shared state.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors raised when converting strings into hex enums.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum HexError {
    /// The string does not name any variant of the enum.
    #[error("invalid value `{value}` for {kind}")]
    InvalidEnumValue { kind: &'static str, value: String },
}

/// One of the six sides of a hexagon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    West,
    NorthWest,
    NorthEast,
    East,
    SouthEast,
    SouthWest,
}

impl Direction {
    /// All directions in clockwise declaration order.
    pub const ALL: [Direction; 6] = [
        Direction::West,
        Direction::NorthWest,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    /// Position of this direction in [`Direction::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Direction at the given clockwise position (wraps around).
    #[inline]
    pub const fn from_index(index: usize) -> Direction {
        Self::ALL[index % 6]
    }

    /// The direction pointing the other way.
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::West => Direction::East,
            Direction::NorthWest => Direction::SouthEast,
            Direction::NorthEast => Direction::SouthWest,
            Direction::East => Direction::West,
            Direction::SouthEast => Direction::NorthWest,
            Direction::SouthWest => Direction::NorthEast,
        }
    }

    /// Check whether `other` points the other way.
    pub const fn is_opposite(self, other: Direction) -> bool {
        self.opposite() as usize == other as usize
    }

    /// The axis this direction lies on.
    pub const fn axis(self) -> Axis {
        match self {
            Direction::West | Direction::East => Axis::WestEast,
            Direction::SouthWest | Direction::NorthEast => Axis::SouthWestNorthEast,
            Direction::NorthWest | Direction::SouthEast => Axis::NorthWestSouthEast,
        }
    }

    /// Next direction going clockwise.
    #[inline]
    pub const fn clockwise(self) -> Direction {
        Self::from_index(self.index() + 1)
    }

    /// Next direction going counter-clockwise.
    #[inline]
    pub const fn counter_clockwise(self) -> Direction {
        Self::from_index(self.index() + 5)
    }

    /// The two directions sharing a hexagon corner with this one.
    ///
    /// Returned as (counter-clockwise, clockwise), e.g. West gives
    /// (SouthWest, NorthWest).
    pub const fn neighbour_directions(self) -> (Direction, Direction) {
        (self.counter_clockwise(), self.clockwise())
    }

    /// Direction leading from the neighbour at `self` to the neighbour at
    /// `other`, both taken relative to the same node.
    ///
    /// Only adjacent directions share a corner, so `None` is returned for any
    /// other pair.
    pub const fn connecting_direction(self, other: Direction) -> Option<Direction> {
        if other as usize == self.clockwise() as usize {
            Some(Self::from_index(self.index() + 2))
        } else if other as usize == self.counter_clockwise() as usize {
            Some(Self::from_index(self.index() + 4))
        } else {
            None
        }
    }

    /// Canonical name, as used in saved maps.
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::West => "West",
            Direction::NorthWest => "NorthWest",
            Direction::NorthEast => "NorthEast",
            Direction::East => "East",
            Direction::SouthEast => "SouthEast",
            Direction::SouthWest => "SouthWest",
        }
    }
}

impl FromStr for Direction {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Direction::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| HexError::InvalidEnumValue {
                kind: "Direction",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pair of opposite directions.
///
/// Used to describe an edge between two nodes without caring which end it is
/// looked at from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    WestEast,
    SouthWestNorthEast,
    NorthWestSouthEast,
}

impl Axis {
    pub const ALL: [Axis; 3] = [
        Axis::WestEast,
        Axis::SouthWestNorthEast,
        Axis::NorthWestSouthEast,
    ];

    /// The two directions on this axis.
    ///
    /// The first one is the forward direction: a connection `(a, b, axis)`
    /// means `b` is the neighbour of `a` in the forward direction.
    pub const fn directions(self) -> (Direction, Direction) {
        match self {
            Axis::WestEast => (Direction::West, Direction::East),
            Axis::SouthWestNorthEast => (Direction::SouthWest, Direction::NorthEast),
            Axis::NorthWestSouthEast => (Direction::NorthWest, Direction::SouthEast),
        }
    }

    /// Forward direction of this axis.
    #[inline]
    pub const fn forward(self) -> Direction {
        self.directions().0
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Axis::WestEast => "WestEast",
            Axis::SouthWestNorthEast => "SouthWestNorthEast",
            Axis::NorthWestSouthEast => "NorthWestSouthEast",
        }
    }
}

impl FromStr for Axis {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Axis::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| HexError::InvalidEnumValue {
                kind: "Axis",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_is_involution() {
        for d in Direction::ALL {
            assert_eq!(d.opposite().opposite(), d);
            assert_ne!(d.opposite(), d);
            assert!(d.is_opposite(d.opposite()));
        }
    }

    #[test]
    fn test_opposite_shares_axis() {
        for d in Direction::ALL {
            assert_eq!(d.axis(), d.opposite().axis());
        }
    }

    #[test]
    fn test_axis_directions_inverse_of_axis() {
        for axis in Axis::ALL {
            let (forward, backward) = axis.directions();
            assert_eq!(forward.axis(), axis);
            assert_eq!(backward.axis(), axis);
            assert_eq!(forward.opposite(), backward);
            assert_eq!(axis.forward(), forward);
        }
    }

    #[test]
    fn test_direction_string_roundtrip() {
        for d in Direction::ALL {
            assert_eq!(d.as_str().parse::<Direction>(), Ok(d));
            assert_eq!(d.to_string(), d.as_str());
        }
    }

    #[test]
    fn test_axis_string_roundtrip() {
        for a in Axis::ALL {
            assert_eq!(a.as_str().parse::<Axis>(), Ok(a));
        }
    }

    #[test]
    fn test_invalid_strings() {
        assert_eq!(
            "North".parse::<Direction>(),
            Err(HexError::InvalidEnumValue {
                kind: "Direction",
                value: "North".to_string(),
            })
        );
        assert!("west".parse::<Direction>().is_err());
        assert!("".parse::<Axis>().is_err());
        assert!("West".parse::<Axis>().is_err());
    }

    #[test]
    fn test_rotation() {
        assert_eq!(Direction::West.clockwise(), Direction::NorthWest);
        assert_eq!(Direction::SouthWest.clockwise(), Direction::West);
        assert_eq!(Direction::West.counter_clockwise(), Direction::SouthWest);
        for d in Direction::ALL {
            assert_eq!(d.clockwise().counter_clockwise(), d);
        }
    }

    #[test]
    fn test_neighbour_directions() {
        assert_eq!(
            Direction::West.neighbour_directions(),
            (Direction::SouthWest, Direction::NorthWest)
        );
        assert_eq!(
            Direction::East.neighbour_directions(),
            (Direction::NorthEast, Direction::SouthEast)
        );
    }

    #[test]
    fn test_connecting_direction() {
        let expected = [
            (Direction::West, Direction::NorthWest, Direction::NorthEast),
            (Direction::NorthWest, Direction::NorthEast, Direction::East),
            (Direction::NorthEast, Direction::East, Direction::SouthEast),
            (Direction::East, Direction::SouthEast, Direction::SouthWest),
            (Direction::SouthEast, Direction::SouthWest, Direction::West),
            (Direction::SouthWest, Direction::West, Direction::NorthWest),
        ];
        for (d1, d2, connecting) in expected {
            assert_eq!(d1.connecting_direction(d2), Some(connecting));
            // Walking back goes the opposite way
            assert_eq!(d2.connecting_direction(d1), Some(connecting.opposite()));
        }
    }

    #[test]
    fn test_connecting_direction_requires_adjacency() {
        assert_eq!(Direction::West.connecting_direction(Direction::East), None);
        assert_eq!(Direction::West.connecting_direction(Direction::West), None);
        assert_eq!(
            Direction::West.connecting_direction(Direction::NorthEast),
            None
        );
    }
}
