//! Fixed-topology feed-forward brain: inputs → one tanh hidden layer → tanh
//! outputs.
//!
//! There is no learning here. Offspring inherit a mutated [`Brain::clone`],
//! and the engine only relies on the numeric ranges of the outputs, never on
//! behaviour improving over time.

use crate::math::fast_tanh;
use rand::Rng;
use serde::{Deserialize, Serialize};

const INPUT_LABELS: [&str; 16] = [
    "Energy", "Health", "PosX", "PosY", "PosZ", "Food", "Threat", "Ally", "Enemy", "Age", "Size",
    "Attacking", "Eating", "Harshness", "DayPhase", "YearPhase",
];

const OUTPUT_LABELS: [&str; 17] = [
    "MoveX",
    "MoveY",
    "MoveZ",
    "Speed",
    "Eat",
    "Attack",
    "Build",
    "BuildKind",
    "BuildDistance",
    "Message",
    "SymbolA",
    "SymbolB",
    "Reproduce",
    "Flee",
    "Gather",
    "Share",
    "Recruit",
];

pub const BRAIN_INPUTS: usize = INPUT_LABELS.len();
pub const BRAIN_OUTPUTS: usize = OUTPUT_LABELS.len();
/// Upper bound on hidden width so inference can run on a stack buffer.
pub const MAX_HIDDEN: usize = 32;

/// Input vector slots.
pub mod input {
    pub const ENERGY: usize = 0;
    pub const HEALTH: usize = 1;
    pub const POS_X: usize = 2;
    pub const POS_Y: usize = 3;
    pub const POS_Z: usize = 4;
    pub const FOOD: usize = 5;
    pub const THREAT: usize = 6;
    pub const ALLY: usize = 7;
    pub const ENEMY: usize = 8;
    pub const AGE: usize = 9;
    pub const SIZE: usize = 10;
    pub const ATTACKING: usize = 11;
    pub const EATING: usize = 12;
    pub const HARSHNESS: usize = 13;
    pub const DAY_PHASE: usize = 14;
    pub const YEAR_PHASE: usize = 15;
}

/// Output vector slots. Every value is in `[-1, 1]`.
pub mod output {
    pub const MOVE_X: usize = 0;
    pub const MOVE_Y: usize = 1;
    pub const MOVE_Z: usize = 2;
    pub const SPEED: usize = 3;
    pub const EAT: usize = 4;
    pub const ATTACK: usize = 5;
    pub const BUILD: usize = 6;
    pub const BUILD_KIND: usize = 7;
    pub const BUILD_DISTANCE: usize = 8;
    pub const MESSAGE: usize = 9;
    pub const SYMBOL_A: usize = 10;
    pub const SYMBOL_B: usize = 11;
    pub const REPRODUCE: usize = 12;
    pub const FLEE: usize = 13;
    pub const GATHER: usize = 14;
    pub const SHARE: usize = 15;
    pub const RECRUIT: usize = 16;
}

pub type BrainInputs = [f32; BRAIN_INPUTS];
pub type BrainOutputs = [f32; BRAIN_OUTPUTS];

const WEIGHT_LIMIT: f32 = 4.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brain {
    hidden: usize,
    /// Row-major `hidden × BRAIN_INPUTS`.
    w_in: Vec<f32>,
    b_hidden: Vec<f32>,
    /// Row-major `BRAIN_OUTPUTS × hidden`.
    w_out: Vec<f32>,
    b_out: Vec<f32>,
}

impl Brain {
    /// Random brain with Xavier-uniform weights, so first-generation agents
    /// already respond to their inputs.
    pub fn new_random<R: Rng>(hidden: usize, rng: &mut R) -> Self {
        let hidden = hidden.clamp(1, MAX_HIDDEN);
        let limit_in = (6.0 / (BRAIN_INPUTS + hidden) as f32).sqrt();
        let limit_out = (6.0 / (hidden + BRAIN_OUTPUTS) as f32).sqrt();

        let w_in = (0..hidden * BRAIN_INPUTS)
            .map(|_| rng.gen_range(-limit_in..limit_in))
            .collect();
        let b_hidden = (0..hidden).map(|_| rng.gen_range(-0.5..0.5)).collect();
        let w_out = (0..BRAIN_OUTPUTS * hidden)
            .map(|_| rng.gen_range(-limit_out..limit_out))
            .collect();
        let b_out = (0..BRAIN_OUTPUTS).map(|_| rng.gen_range(-0.5..0.5)).collect();

        Self {
            hidden,
            w_in,
            b_hidden,
            w_out,
            b_out,
        }
    }

    /// Brain whose every weight and bias is `value`. Handy for scripted
    /// behaviour in tests and tools.
    #[must_use]
    pub fn uniform(hidden: usize, value: f32) -> Self {
        let hidden = hidden.clamp(1, MAX_HIDDEN);
        Self {
            hidden,
            w_in: vec![value; hidden * BRAIN_INPUTS],
            b_hidden: vec![value; hidden],
            w_out: vec![value; BRAIN_OUTPUTS * hidden],
            b_out: vec![value; BRAIN_OUTPUTS],
        }
    }

    /// Overrides the output biases and zeroes the output weights, turning the
    /// brain into a constant policy emitting `tanh(bias)`.
    pub fn set_output_bias(&mut self, biases: &BrainOutputs) {
        self.w_out.iter_mut().for_each(|w| *w = 0.0);
        self.b_out.copy_from_slice(biases);
    }

    #[must_use]
    pub fn hidden_width(&self) -> usize {
        self.hidden
    }

    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.w_in.len() + self.b_hidden.len() + self.w_out.len() + self.b_out.len()
    }

    /// Forward pass. Pure: reads weights only, allocates nothing.
    #[must_use]
    pub fn predict(&self, inputs: &BrainInputs) -> BrainOutputs {
        let mut hidden = [0.0f32; MAX_HIDDEN];
        for (h, value) in hidden.iter_mut().enumerate().take(self.hidden) {
            let row = &self.w_in[h * BRAIN_INPUTS..(h + 1) * BRAIN_INPUTS];
            let sum: f32 = row.iter().zip(inputs.iter()).map(|(w, x)| w * x).sum();
            *value = fast_tanh(sum + self.b_hidden[h]);
        }

        let mut outputs = [0.0f32; BRAIN_OUTPUTS];
        for (o, value) in outputs.iter_mut().enumerate() {
            let row = &self.w_out[o * self.hidden..(o + 1) * self.hidden];
            let sum: f32 = row
                .iter()
                .zip(hidden[..self.hidden].iter())
                .map(|(w, h)| w * h)
                .sum();
            *value = fast_tanh(sum + self.b_out[o]);
        }
        outputs
    }

    /// Perturbs each weight and bias with probability `rate` by up to
    /// `±amount`, clamped to `±WEIGHT_LIMIT`. Returns how many changed.
    pub fn mutate<R: Rng>(&mut self, rate: f32, amount: f32, rng: &mut R) -> usize {
        if rate <= 0.0 || amount <= 0.0 {
            return 0;
        }
        let mut mutated = 0;
        for param in self
            .w_in
            .iter_mut()
            .chain(self.b_hidden.iter_mut())
            .chain(self.w_out.iter_mut())
            .chain(self.b_out.iter_mut())
        {
            if rng.gen::<f32>() < rate {
                *param = (*param + rng.gen_range(-amount..amount)).clamp(-WEIGHT_LIMIT, WEIGHT_LIMIT);
                mutated += 1;
            }
        }
        mutated
    }

    #[must_use]
    pub fn input_label(index: usize) -> Option<&'static str> {
        INPUT_LABELS.get(index).copied()
    }

    #[must_use]
    pub fn output_label(index: usize) -> Option<&'static str> {
        OUTPUT_LABELS.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::XorShiftRng;

    #[test]
    fn test_predict_is_pure() {
        let mut rng = XorShiftRng::new(1);
        let brain = Brain::new_random(12, &mut rng);
        let before = brain.clone();
        let inputs = [0.3; BRAIN_INPUTS];
        let a = brain.predict(&inputs);
        let b = brain.predict(&inputs);
        assert_eq!(a, b);
        assert_eq!(brain, before);
    }

    #[test]
    fn test_outputs_bounded() {
        let mut rng = XorShiftRng::new(2);
        let brain = Brain::new_random(8, &mut rng);
        let outputs = brain.predict(&[5.0; BRAIN_INPUTS]);
        assert!(outputs.iter().all(|o| (-1.0..=1.0).contains(o)));
    }

    #[test]
    fn test_random_brains_differ_in_behaviour() {
        let mut rng = XorShiftRng::new(3);
        let a = Brain::new_random(12, &mut rng);
        let b = Brain::new_random(12, &mut rng);
        let inputs = [0.5; BRAIN_INPUTS];
        assert_ne!(a.predict(&inputs), b.predict(&inputs));
    }

    #[test]
    fn test_hidden_width_is_clamped() {
        let mut rng = XorShiftRng::new(4);
        assert_eq!(Brain::new_random(500, &mut rng).hidden_width(), MAX_HIDDEN);
        assert_eq!(Brain::new_random(0, &mut rng).hidden_width(), 1);
    }

    #[test]
    fn test_zero_rate_mutation_is_noop() {
        let mut rng = XorShiftRng::new(5);
        let mut brain = Brain::new_random(6, &mut rng);
        let before = brain.clone();
        assert_eq!(brain.mutate(0.0, 1.0, &mut rng), 0);
        assert_eq!(brain, before);
    }

    #[test]
    fn test_full_rate_mutation_stays_clamped() {
        let mut rng = XorShiftRng::new(6);
        let mut brain = Brain::uniform(4, 3.9);
        let changed = brain.mutate(1.0, 2.0, &mut rng);
        assert_eq!(changed, brain.parameter_count());
        assert!(brain
            .w_in
            .iter()
            .chain(brain.w_out.iter())
            .all(|w| w.abs() <= WEIGHT_LIMIT));
    }

    #[test]
    fn test_output_bias_policy() {
        let mut brain = Brain::uniform(4, 0.0);
        let mut biases = [0.0; BRAIN_OUTPUTS];
        biases[output::EAT] = 3.0;
        brain.set_output_bias(&biases);
        let out = brain.predict(&[1.0; BRAIN_INPUTS]);
        assert_eq!(out[output::EAT], 1.0);
        assert_eq!(out[output::ATTACK], 0.0);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Brain::input_label(input::YEAR_PHASE), Some("YearPhase"));
        assert_eq!(Brain::output_label(output::RECRUIT), Some("Recruit"));
        assert_eq!(Brain::output_label(BRAIN_OUTPUTS), None);
    }
}
