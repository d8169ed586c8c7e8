use serde::{Deserialize, Serialize};

/// Number of start lamps on the gantry
pub const LAMP_COUNT: usize = 5;

/// The five start lamps. Lamps only ever light as a prefix: lamp `i` lit
/// implies every lamp below `i` is lit too.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LampBank([bool; LAMP_COUNT]);

impl LampBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lights lamps `0..=index`. Out of range indices are ignored.
    pub fn light_through(&mut self, index: usize) {
        if index >= LAMP_COUNT {
            return;
        }
        for lamp in &mut self.0[..=index] {
            *lamp = true;
        }
    }

    /// Extinguishes every lamp at once
    pub fn extinguish(&mut self) {
        self.0 = [false; LAMP_COUNT];
    }

    pub fn is_lit(&self, index: usize) -> bool {
        self.0.get(index).copied().unwrap_or(false)
    }

    pub fn lit_count(&self) -> usize {
        self.0.iter().filter(|lit| **lit).count()
    }

    pub fn all_lit(&self) -> bool {
        self.lit_count() == LAMP_COUNT
    }

    pub fn all_dark(&self) -> bool {
        self.lit_count() == 0
    }

    pub fn states(&self) -> [bool; LAMP_COUNT] {
        self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().copied()
    }
}
