// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Mapping from a loaded [`CritterConfig`] onto engine settings

use critter_config::{ConfigError, ConfigResult, CritterConfig, CritterSceneConfig};
use critter_engine::{NetworkSettings, SimulatorConfig};
use critter_neural::{NeuronType, PopulationParams, SolverParams};

/// Tuning defaults applied to every population of a topology
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleDefaults {
    pub neuron_type: NeuronType,
    pub max_rates: (f64, f64),
    pub intercepts: (f64, f64),
}

impl Default for EnsembleDefaults {
    fn default() -> Self {
        let params = PopulationParams::new("", 1, 1);
        Self {
            neuron_type: params.neuron_type,
            max_rates: params.max_rates,
            intercepts: params.intercepts,
        }
    }
}

impl EnsembleDefaults {
    /// A population with these defaults; radius stays at 1
    pub fn population(&self, label: &str, n_neurons: usize, dimensions: usize) -> PopulationParams {
        PopulationParams::new(label, n_neurons, dimensions)
            .neuron_type(self.neuron_type)
            .max_rates(self.max_rates.0, self.max_rates.1)
            .intercepts(self.intercepts.0, self.intercepts.1)
    }
}

/// Everything a run needs, resolved from configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub network: NetworkSettings,
    pub simulator: SimulatorConfig,
    pub ensemble: EnsembleDefaults,
    /// Simulated seconds
    pub duration: f64,
    pub scene: CritterSceneConfig,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            network: NetworkSettings::default(),
            simulator: SimulatorConfig::default(),
            ensemble: EnsembleDefaults::default(),
            duration: 10.0,
            scene: CritterSceneConfig::default(),
        }
    }
}

impl RunSettings {
    /// Resolve engine settings from a configuration
    ///
    /// Parallel decoder solving additionally requires the `parallel-solve`
    /// feature.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidValue` for an unknown neuron type
    pub fn from_config(config: &CritterConfig) -> ConfigResult<Self> {
        let neuron_type: NeuronType = config
            .ensemble
            .neuron_type
            .parse()
            .map_err(ConfigError::InvalidValue)?;

        Ok(Self {
            network: NetworkSettings {
                seed: config.simulation.seed,
                solver: SolverParams {
                    regularization: config.decoder.regularization,
                },
                eval_points_per_neuron: config.decoder.eval_points_per_neuron,
                min_eval_points: config.decoder.min_eval_points,
            },
            simulator: SimulatorConfig {
                dt: config.simulation.dt,
                parallel_decoder_solve: config.simulation.parallel_decoder_solve
                    && cfg!(feature = "parallel-solve"),
            },
            ensemble: EnsembleDefaults {
                neuron_type,
                max_rates: (config.ensemble.max_rate_low, config.ensemble.max_rate_high),
                intercepts: (config.ensemble.intercept_low, config.ensemble.intercept_high),
            },
            duration: config.simulation.duration,
            scene: config.critter.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_engine_defaults() {
        let settings = RunSettings::from_config(&CritterConfig::default()).unwrap();
        assert_eq!(settings.network, NetworkSettings::default());
        assert_eq!(settings.simulator.dt, SimulatorConfig::default().dt);
        assert_eq!(settings.ensemble, EnsembleDefaults::default());
        assert_eq!(settings.duration, 10.0);
    }

    #[test]
    fn test_overrides_flow_through() {
        let mut config = CritterConfig::default();
        config.simulation.seed = 99;
        config.simulation.dt = 0.002;
        config.decoder.regularization = 0.05;
        config.ensemble.neuron_type = "relu".to_string();
        config.ensemble.intercept_low = -0.5;
        config.ensemble.intercept_high = 0.5;

        let settings = RunSettings::from_config(&config).unwrap();
        assert_eq!(settings.network.seed, 99);
        assert_eq!(settings.simulator.dt, 0.002);
        assert_eq!(settings.network.solver.regularization, 0.05);
        assert_eq!(settings.ensemble.neuron_type.to_string(), "rectified_linear");

        let params = settings.ensemble.population("p", 10, 2);
        assert_eq!(params.intercepts, (-0.5, 0.5));
        assert_eq!(params.radius, 1.0);
    }

    #[test]
    fn test_unknown_neuron_type() {
        let mut config = CritterConfig::default();
        config.ensemble.neuron_type = "izhikevich".to_string();
        assert!(matches!(
            RunSettings::from_config(&config),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[cfg(not(feature = "parallel-solve"))]
    #[test]
    fn test_parallel_solve_needs_feature() {
        let settings = RunSettings::from_config(&CritterConfig::default()).unwrap();
        assert!(!settings.simulator.parallel_decoder_solve);
    }
}
