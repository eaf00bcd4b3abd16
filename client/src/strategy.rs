use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use shared::{Color, StateFrame};

/// Picks a random color that no player currently holds
pub struct RandomStrategy {
    rng: StdRng,
}

impl RandomStrategy {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic strategy for reproducible runs
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Chooses uniformly among the unused colors. When every color is taken
    /// the player keeps the color of its own origin cell.
    pub fn choose(&mut self, frame: &StateFrame) -> Color {
        let unused = frame.unused_colors();
        match unused.choose(&mut self.rng) {
            Some(color) => *color,
            None => frame
                .board
                .color_at(frame.origin.0, frame.origin.1)
                .unwrap_or(1),
        }
    }
}

impl Default for RandomStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{encode_state, Board};

    fn frame(num_colors: Color, colors: &[Color]) -> StateFrame {
        let board = Board::from_rows(num_colors, &[vec![1, 2], vec![2, 1]]).unwrap();
        StateFrame::decode(&encode_state(&board, (1, 0), colors)).unwrap()
    }

    #[test]
    fn test_choice_is_unused() {
        let mut strategy = RandomStrategy::seeded(7);
        let frame = frame(5, &[1, 2, 4]);

        for _ in 0..100 {
            let color = strategy.choose(&frame);
            assert!(color == 3 || color == 5, "picked {}", color);
        }
    }

    #[test]
    fn test_all_unused_colors_get_picked() {
        let mut strategy = RandomStrategy::seeded(11);
        let frame = frame(6, &[1]);

        let mut seen = [false; 7];
        for _ in 0..500 {
            seen[strategy.choose(&frame) as usize] = true;
        }
        assert_eq!(seen, [false, false, true, true, true, true, true]);
    }

    #[test]
    fn test_falls_back_to_origin_color() {
        let mut strategy = RandomStrategy::seeded(3);
        // Origin (1, 0) holds color 2
        let frame = frame(2, &[1, 2]);

        assert_eq!(strategy.choose(&frame), 2);
    }
}
