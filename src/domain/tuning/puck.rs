/// Gameplay tuning for pucks.
///
/// Keep this separate from runtime/server configuration (tick rates, buffer sizes, etc.).

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PuckTuning {
    /// Full width in pixels at scale 1.
    pub base_width: f64,

    /// Full height in pixels at scale 1.
    pub base_height: f64,

    /// Spawn speed in pixels per second before jitter is applied.
    pub base_speed: f64,

    /// Fraction of `base_speed` a spawn may deviate by, in either direction.
    pub speed_jitter: f64,

    /// Upper bound accepted by `Puck::set_speed`.
    pub max_speed: f64,

    /// Upper bound accepted by `Puck::set_scale`.
    pub max_scale: f64,

    /// Shrink applied to the shared scale per additional puck on the board.
    pub population_falloff: f64,

    /// Fraction of each arena dimension kept clear around spawn positions.
    pub spawn_margin: f64,
}

impl Default for PuckTuning {
    fn default() -> Self {
        Self {
            base_width: 300.0,
            base_height: 200.0,
            base_speed: 250.0,
            speed_jitter: 0.2,
            max_speed: 1000.0,
            max_scale: 100.0,
            population_falloff: 0.1,
            spawn_margin: 0.05,
        }
    }
}

impl PuckTuning {
    /// Shared scale for a board holding `population` pucks.
    ///
    /// A lone puck is full size; each extra puck shrinks everyone so board density stays
    /// roughly bounded.
    pub fn scale_for_population(&self, population: usize) -> f64 {
        let others = population.saturating_sub(1) as f64;
        1.0 / (1.0 + self.population_falloff * others)
    }
}
