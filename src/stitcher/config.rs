//! Stitching configuration.

use crate::error::{Error, Result};

/// Configuration for compiling a CSP into an energy model.
///
/// # Examples
///
/// ```
/// use u_stitch::stitcher::StitchConfig;
///
/// let config = StitchConfig::default()
///     .with_min_classical_gap(4.0)
///     .with_max_graph_size(6);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StitchConfig {
    /// Minimum energy a violated constraint adds above ground.
    pub min_classical_gap: f64,

    /// Most nodes (variables plus auxiliaries) one constraint may use.
    pub max_graph_size: usize,

    /// Prefix of auxiliary variable labels (`aux0`, `aux1`, ...).
    pub aux_prefix: String,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            min_classical_gap: 2.0,
            max_graph_size: 8,
            aux_prefix: "aux".to_string(),
        }
    }
}

impl StitchConfig {
    pub fn with_min_classical_gap(mut self, gap: f64) -> Self {
        self.min_classical_gap = gap;
        self
    }

    pub fn with_max_graph_size(mut self, n: usize) -> Self {
        self.max_graph_size = n;
        self
    }

    pub fn with_aux_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.aux_prefix = prefix.into();
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.min_classical_gap > 0.0 && self.min_classical_gap.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "min_classical_gap must be positive and finite, got {}",
                self.min_classical_gap
            )));
        }
        if self.aux_prefix.is_empty() {
            return Err(Error::InvalidConfig("aux_prefix must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StitchConfig::default();
        assert_eq!(config.min_classical_gap, 2.0);
        assert_eq!(config.max_graph_size, 8);
        assert_eq!(config.aux_prefix, "aux");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(StitchConfig::default().with_min_classical_gap(0.0).validate().is_err());
        assert!(StitchConfig::default()
            .with_min_classical_gap(f64::INFINITY)
            .validate()
            .is_err());
        assert!(StitchConfig::default().with_aux_prefix("").validate().is_err());
    }
}
