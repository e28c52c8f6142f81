//! Quantity schedules driven by how many birds a row already exposes.

/// Eggs paid to place a bird into a row that already holds `exposed` birds.
pub fn egg_cost(exposed: usize) -> u32 {
    exposed.div_ceil(2) as u32
}

/// Cards drawn by the wetland action.
pub fn cards_to_draw(exposed: usize) -> u32 {
    1 + (exposed / 2) as u32
}

/// Food gained by the forest action.
pub fn food_to_gain(exposed: usize) -> u32 {
    1 + (exposed / 2) as u32
}

/// Eggs laid by the grassland action.
pub fn eggs_to_lay(exposed: usize) -> u32 {
    2 + (exposed / 2) as u32
}

/// Turns each player takes in the 0-based `round`. Never below one.
pub fn turns_for_round(max_turns: u32, round: u32) -> u32 {
    max_turns.saturating_sub(round).max(1)
}
