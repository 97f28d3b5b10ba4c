use crate::error::{Direction, TapeBoundsError};

/// Number of cells on a tape unless configured otherwise.
pub const DEFAULT_TAPE_SIZE: usize = 30_000;

/// Largest tape that will be allocated (256 Mi cells).
pub const MAX_TAPE_SIZE: usize = 1 << 28;

/// A fixed-capacity, zero-initialised strip of 8-bit cells plus the data pointer.
///
/// Cell arithmetic wraps modulo 256. The pointer never leaves `[0, len)`: a move
/// that would take it outside is refused and reported, leaving the tape as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<u8>,
    cursor: usize,
}

impl Tape {
    /// Allocate `capacity` zeroed cells, clamped to `1..=MAX_TAPE_SIZE` so the
    /// current cell always exists.
    pub fn new(capacity: usize) -> Self {
        Self {
            cells: vec![0; capacity.clamp(1, MAX_TAPE_SIZE)],
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; kept for parity with `len`.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Value of the current cell.
    pub fn get(&self) -> u8 {
        self.cells[self.cursor]
    }

    pub fn set(&mut self, value: u8) {
        self.cells[self.cursor] = value;
    }

    /// Wrapping `+`. Returns the new value.
    pub fn increment(&mut self) -> u8 {
        let after = self.get().wrapping_add(1);
        self.set(after);
        after
    }

    /// Wrapping `-`. Returns the new value.
    pub fn decrement(&mut self) -> u8 {
        let after = self.get().wrapping_sub(1);
        self.set(after);
        after
    }

    /// Move the data pointer one cell. Returns the new position.
    pub fn shift(&mut self, direction: Direction) -> Result<usize, TapeBoundsError> {
        let next = match direction {
            Direction::Left => self.cursor.checked_sub(1),
            Direction::Right => Some(self.cursor + 1).filter(|&i| i < self.cells.len()),
        };

        let Some(next) = next else {
            let index = match direction {
                Direction::Left => self.cursor as isize - 1,
                Direction::Right => self.cursor as isize + 1,
            };
            return Err(TapeBoundsError {
                direction,
                index,
                capacity: self.cells.len(),
            });
        };

        self.cursor = next;
        Ok(next)
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self::new(DEFAULT_TAPE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_tape_is_zeroed_with_cursor_at_origin() {
        let tape = Tape::default();
        assert_eq!(tape.len(), DEFAULT_TAPE_SIZE);
        assert_eq!(tape.cursor(), 0);
        assert!(tape.cells().iter().all(|&c| c == 0));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let tape = Tape::new(0);
        assert_eq!(tape.len(), 1);
        assert!(!tape.is_empty());
    }

    #[test]
    fn huge_capacity_is_clamped() {
        let tape = Tape::new(usize::MAX);
        assert_eq!(tape.len(), MAX_TAPE_SIZE);
    }

    #[test]
    fn left_of_origin_is_refused() {
        let mut tape = Tape::new(4);
        let err = tape.shift(Direction::Left).unwrap_err();
        assert_eq!(err.direction, Direction::Left);
        assert_eq!(err.index, -1);
        assert_eq!(err.capacity, 4);
        assert_eq!(tape.cursor(), 0);
    }

    #[test]
    fn right_of_last_cell_is_refused() {
        let mut tape = Tape::new(2);
        assert_eq!(tape.shift(Direction::Right), Ok(1));
        let err = tape.shift(Direction::Right).unwrap_err();
        assert_eq!(err.direction, Direction::Right);
        assert_eq!(err.index, 2);
        assert_eq!(tape.cursor(), 1);
    }

    #[test]
    fn decrement_wraps_to_max() {
        let mut tape = Tape::new(1);
        assert_eq!(tape.decrement(), 255);
        assert_eq!(tape.increment(), 0);
    }

    proptest! {
        #[test]
        fn full_cycle_of_increments_is_identity(start in any::<u8>()) {
            let mut tape = Tape::new(1);
            tape.set(start);
            for _ in 0..256 {
                tape.increment();
            }
            prop_assert_eq!(tape.get(), start);
        }

        #[test]
        fn cursor_stays_in_bounds(
            capacity in 1usize..64,
            moves in prop::collection::vec(any::<bool>(), 0..256)
        ) {
            let mut tape = Tape::new(capacity);
            for right in moves {
                let dir = if right { Direction::Right } else { Direction::Left };
                let _ = tape.shift(dir);
                prop_assert!(tape.cursor() < tape.len());
            }
        }
    }
}
