//! Search parameters.

/// Whose point of view a rollout result is credited from during backpropagation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Perspective {
    /// Every node on the path receives the unchanged result, which is
    /// always scored for the first player.
    #[default]
    Absolute,

    /// Each node receives the result as seen by the player whose move led
    /// into it, so selection maximises for whoever is choosing.
    Mover,
}

/// MCTS configuration parameters.
#[derive(Clone, Debug)]
pub struct MctsConfig {
    /// Number of select/expand/simulate/backpropagate passes per search.
    pub iterations: usize,

    /// Exploration constant `c` of the UCT score. √2 is the textbook value.
    pub exploration_constant: f64,

    pub perspective: Perspective,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            exploration_constant: 1.41,
            perspective: Perspective::Absolute,
        }
    }
}

impl MctsConfig {
    pub fn with_iterations(iterations: usize) -> Self {
        Self {
            iterations,
            ..Default::default()
        }
    }

    pub fn with_exploration_constant(mut self, exploration_constant: f64) -> Self {
        self.exploration_constant = exploration_constant;
        self
    }

    pub fn with_perspective(mut self, perspective: Perspective) -> Self {
        self.perspective = perspective;
        self
    }
}
