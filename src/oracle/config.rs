//! Lattice oracle configuration and annealing schedules.

use crate::error::{Error, Result};

/// Cooling schedule for temperature reduction.
///
/// # References
///
/// - Geometric: standard textbook approach
/// - Linear: fixed-duration cooling
/// - LundyMees: Lundy & Mees (1986), with convergence proof
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CoolingSchedule {
    /// Geometric (exponential) cooling: `T_{k+1} = alpha * T_k`.
    Geometric {
        /// Cooling factor in (0, 1). Higher = slower cooling.
        alpha: f64,
    },

    /// Linear cooling from `T_0` down to `T_min` over
    /// [`AnnealConfig::cooling_steps`] levels.
    Linear,

    /// Lundy-Mees cooling: `T_{k+1} = T_k / (1 + beta * T_k)`.
    ///
    /// One move per temperature step.
    LundyMees {
        /// Cooling parameter, typically `(T_0 - T_min) / (max_iter * T_0 * T_min)`.
        beta: f64,
    },
}

impl Default for CoolingSchedule {
    fn default() -> Self {
        CoolingSchedule::Geometric { alpha: 0.99 }
    }
}

/// Settings for the annealing search used on lattices too large to scan.
///
/// The cost being annealed is the total constraint violation of a bias
/// assignment (feasible configurations above ground plus infeasible
/// configurations short of the requested gap), so a run stops as soon as it
/// reaches zero.
///
/// # Examples
///
/// ```
/// use u_stitch::oracle::{AnnealConfig, CoolingSchedule};
///
/// let config = AnnealConfig::default()
///     .with_initial_temperature(8.0)
///     .with_cooling(CoolingSchedule::Geometric { alpha: 0.98 })
///     .with_restarts(2)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnealConfig {
    /// Initial temperature, in energy units.
    pub initial_temperature: f64,

    /// The run stops when the temperature drops below this.
    pub min_temperature: f64,

    /// Cooling schedule.
    pub cooling: CoolingSchedule,

    /// Moves tried at each temperature level (ignored by `LundyMees`).
    pub iterations_per_temperature: usize,

    /// Hard budget of moves per restart. 0 = no limit.
    pub max_iterations: usize,

    /// Independent runs, each from a fresh random lattice point.
    pub restarts: usize,

    /// Random seed. Restart `r` uses `seed + r`; `None` means 42, so the
    /// search is always reproducible.
    pub seed: Option<u64>,
}

/// Temperature levels of a linear schedule without a move budget.
const LINEAR_COOLING_STEPS: usize = 500;

impl Default for AnnealConfig {
    /// Sized for gates of up to five variables on graphs of up to eight nodes.
    fn default() -> Self {
        Self {
            initial_temperature: 1.0,
            min_temperature: 0.01,
            cooling: CoolingSchedule::default(),
            iterations_per_temperature: 500,
            max_iterations: 0,
            restarts: 8,
            seed: None,
        }
    }
}

impl AnnealConfig {
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_min_temperature(mut self, t: f64) -> Self {
        self.min_temperature = t;
        self
    }

    pub fn with_cooling(mut self, cooling: CoolingSchedule) -> Self {
        self.cooling = cooling;
        self
    }

    pub fn with_iterations_per_temperature(mut self, n: usize) -> Self {
        self.iterations_per_temperature = n;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_restarts(mut self, n: usize) -> Self {
        self.restarts = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Moves tried before the temperature drops.
    pub fn moves_per_temperature(&self) -> usize {
        match self.cooling {
            CoolingSchedule::LundyMees { .. } => 1,
            _ => self.iterations_per_temperature,
        }
    }

    /// Number of temperature levels a linear schedule spreads the descent
    /// over: the move budget split into levels, or a fixed count when the
    /// budget is unlimited.
    pub fn cooling_steps(&self) -> usize {
        if self.max_iterations == 0 {
            return LINEAR_COOLING_STEPS;
        }
        self.max_iterations
            .div_ceil(self.moves_per_temperature().max(1))
            .max(1)
    }

    /// Temperature after level `step` (counting from 0) at `temperature`.
    pub fn next_temperature(&self, temperature: f64, step: usize) -> f64 {
        match self.cooling {
            CoolingSchedule::Geometric { alpha } => temperature * alpha,
            CoolingSchedule::Linear => {
                let steps = self.cooling_steps();
                if step + 1 >= steps {
                    return self.min_temperature;
                }
                let done = (step + 1) as f64 / steps as f64;
                self.initial_temperature - done * (self.initial_temperature - self.min_temperature)
            }
            CoolingSchedule::LundyMees { beta } => temperature / (1.0 + beta * temperature),
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.initial_temperature <= 0.0 {
            return Err(Error::InvalidConfig("initial_temperature must be positive".into()));
        }
        if self.min_temperature <= 0.0 {
            return Err(Error::InvalidConfig("min_temperature must be positive".into()));
        }
        if self.min_temperature >= self.initial_temperature {
            return Err(Error::InvalidConfig(
                "min_temperature must be less than initial_temperature".into(),
            ));
        }
        match self.cooling {
            CoolingSchedule::Geometric { alpha } => {
                if alpha <= 0.0 || alpha >= 1.0 {
                    return Err(Error::InvalidConfig(format!(
                        "geometric alpha must be in (0, 1), got {alpha}"
                    )));
                }
            }
            CoolingSchedule::LundyMees { beta } => {
                if beta <= 0.0 {
                    return Err(Error::InvalidConfig(format!(
                        "lundy-mees beta must be positive, got {beta}"
                    )));
                }
            }
            CoolingSchedule::Linear => {}
        }
        Ok(())
    }
}

/// Configuration of the [`LatticeOracle`](super::LatticeOracle).
///
/// Biases are searched on the lattice `low, low + step, ..., high` of each
/// range, in SPIN form. The default ranges are the usual hardware ranges
/// `h ∈ [-2, 2]`, `J ∈ [-1, 1]`.
///
/// # Examples
///
/// ```
/// use u_stitch::oracle::LatticeConfig;
///
/// let config = LatticeConfig::default()
///     .with_step(0.25)
///     .with_exhaustive_limit(50_000);
/// assert_eq!(config.linear_levels(), 17);
/// assert_eq!(config.quadratic_levels(), 9);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LatticeConfig {
    /// Inclusive range of linear biases.
    pub linear_range: (f64, f64),

    /// Inclusive range of quadratic biases.
    pub quadratic_range: (f64, f64),

    /// Lattice spacing.
    pub step: f64,

    /// Largest number of lattice points scanned exhaustively; larger
    /// lattices are annealed.
    pub exhaustive_limit: u64,

    /// Annealing settings for large lattices.
    pub anneal: AnnealConfig,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            linear_range: (-2.0, 2.0),
            quadratic_range: (-1.0, 1.0),
            step: 0.5,
            exhaustive_limit: 1_000_000,
            anneal: AnnealConfig::default(),
        }
    }
}

impl LatticeConfig {
    pub fn with_linear_range(mut self, low: f64, high: f64) -> Self {
        self.linear_range = (low, high);
        self
    }

    pub fn with_quadratic_range(mut self, low: f64, high: f64) -> Self {
        self.quadratic_range = (low, high);
        self
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    pub fn with_exhaustive_limit(mut self, limit: u64) -> Self {
        self.exhaustive_limit = limit;
        self
    }

    pub fn with_anneal(mut self, anneal: AnnealConfig) -> Self {
        self.anneal = anneal;
        self
    }

    /// Number of lattice values for a linear bias.
    pub fn linear_levels(&self) -> usize {
        levels(self.linear_range, self.step)
    }

    /// Number of lattice values for a quadratic bias.
    pub fn quadratic_levels(&self) -> usize {
        levels(self.quadratic_range, self.step)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.step > 0.0 && self.step.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "lattice step must be positive, got {}",
                self.step
            )));
        }
        for (name, (low, high)) in [
            ("linear_range", self.linear_range),
            ("quadratic_range", self.quadratic_range),
        ] {
            if !(low.is_finite() && high.is_finite()) || low > high {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be a finite range with low <= high, got ({low}, {high})"
                )));
            }
        }
        self.anneal.validate()
    }
}

fn levels((low, high): (f64, f64), step: f64) -> usize {
    ((high - low) / step + 1e-9).floor() as usize + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LatticeConfig::default();
        assert_eq!(config.linear_levels(), 9);
        assert_eq!(config.quadratic_levels(), 5);
        assert_eq!(config.exhaustive_limit, 1_000_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bad_step() {
        assert!(LatticeConfig::default().with_step(0.0).validate().is_err());
        assert!(LatticeConfig::default().with_step(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_validate_bad_range() {
        let config = LatticeConfig::default().with_linear_range(1.0, -1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bad_temperature() {
        let anneal = AnnealConfig::default().with_initial_temperature(-1.0);
        assert!(anneal.validate().is_err());

        let anneal = AnnealConfig::default()
            .with_initial_temperature(1.0)
            .with_min_temperature(2.0);
        assert!(LatticeConfig::default().with_anneal(anneal).validate().is_err());
    }

    #[test]
    fn test_default_anneal_schedule() {
        let config = AnnealConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.moves_per_temperature(), 500);

        let mut t = config.initial_temperature;
        let mut levels = 0;
        while t > config.min_temperature {
            t = config.next_temperature(t, levels);
            levels += 1;
        }
        // ln(100) / -ln(0.99)
        assert_eq!(levels, 459);
    }

    #[test]
    fn test_linear_cooling_reaches_floor() {
        let config = AnnealConfig::default()
            .with_cooling(CoolingSchedule::Linear)
            .with_max_iterations(1000)
            .with_iterations_per_temperature(100);
        assert_eq!(config.cooling_steps(), 10);

        let halfway = config.next_temperature(config.initial_temperature, 4);
        assert!((halfway - 0.505).abs() < 1e-12);
        let last = config.next_temperature(halfway, 9);
        assert_eq!(last, config.min_temperature);

        let unbounded = AnnealConfig::default().with_cooling(CoolingSchedule::Linear);
        assert_eq!(unbounded.cooling_steps(), LINEAR_COOLING_STEPS);
    }

    #[test]
    fn test_lundy_mees_single_move_levels() {
        let config = AnnealConfig::default()
            .with_initial_temperature(4.0)
            .with_cooling(CoolingSchedule::LundyMees { beta: 0.5 })
            .with_max_iterations(30);
        assert_eq!(config.moves_per_temperature(), 1);
        assert_eq!(config.cooling_steps(), 30);
        // 4 / (1 + 0.5 * 4)
        let t = config.next_temperature(4.0, 0);
        assert!((t - 4.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_validate_bad_cooling() {
        let alpha = AnnealConfig::default().with_cooling(CoolingSchedule::Geometric { alpha: 1.5 });
        assert!(alpha.validate().is_err());

        let beta = AnnealConfig::default().with_cooling(CoolingSchedule::LundyMees { beta: -1.0 });
        assert!(beta.validate().is_err());
    }
}
