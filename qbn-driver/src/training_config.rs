// SPDX-License-Identifier: Apache-2.0

//! The `[training]` table of a `qbn.toml` file and the helpers that resolve
//! each training option from the command line first, then the config, then
//! the library default.

use std::str::FromStr;

use anyhow::anyhow;
use clap::ArgMatches;
use qbn::{RandomGateOptions, TrainOptions, TrialOptions};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TrainingConfig {
    /// Accuracy at which training stops.
    pub goal: Option<f64>,
    pub max_iterations: Option<usize>,
    pub changes_per_iteration: Option<usize>,
    pub seed: Option<u64>,
    /// Number of independent trials run in parallel.
    pub trials: Option<usize>,
    /// Gates per layer, e.g. `[4, 4]`.
    pub layers: Option<Vec<usize>>,
    /// Let random gate selection pick FALSE and TRUE.
    pub allow_constant_gates: Option<bool>,
    /// Let random gate selection pick gates that ignore an input.
    pub allow_unary_gates: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QbnConfig {
    #[serde(default)]
    pub training: TrainingConfig,
}

/// Parses the string value of flag `name`, if given.
fn parse_flag<T>(matches: &ArgMatches, name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match matches.get_one::<String>(name) {
        Some(s) => s
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow!("invalid value {:?} for --{}: {}", s, name, e)),
        None => Ok(None),
    }
}

fn parse_bool_flag(matches: &ArgMatches, name: &str) -> Option<bool> {
    matches.get_one::<String>(name).map(|s| s == "true")
}

/// Parses a comma separated list of layer widths such as `4,4`.
pub fn parse_layer_sizes(s: &str) -> anyhow::Result<Vec<usize>> {
    let sizes = s
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<usize>()
                .map_err(|e| anyhow!("invalid layer size {:?}: {}", part, e))
        })
        .collect::<anyhow::Result<Vec<usize>>>()?;
    if sizes.is_empty() || sizes.contains(&0) {
        return Err(anyhow!("layer sizes must be positive; got {:?}", s));
    }
    Ok(sizes)
}

/// Layer widths from `--layers` or the config; `None` if neither gives any.
pub fn get_layer_sizes(
    matches: &ArgMatches,
    config: &Option<TrainingConfig>,
) -> anyhow::Result<Option<Vec<usize>>> {
    if let Some(layers) = matches.get_one::<String>("layers") {
        return parse_layer_sizes(layers).map(Some);
    }
    match config.as_ref().and_then(|c| c.layers.clone()) {
        Some(layers) if layers.is_empty() || layers.contains(&0) => Err(anyhow!(
            "config layer sizes must be positive; got {:?}",
            layers
        )),
        layers => Ok(layers),
    }
}

pub fn get_seed(matches: &ArgMatches, config: &Option<TrainingConfig>) -> anyhow::Result<u64> {
    let default = TrainOptions::default().seed;
    Ok(parse_flag(matches, "seed")?
        .or_else(|| config.as_ref().and_then(|c| c.seed))
        .unwrap_or(default))
}

/// Resolves every training option, flag over config over default.
pub fn get_trial_options(
    matches: &ArgMatches,
    config: &Option<TrainingConfig>,
) -> anyhow::Result<TrialOptions> {
    let defaults = TrainOptions::default();
    let gate_defaults = RandomGateOptions::default();
    let config_value = |f: fn(&TrainingConfig) -> Option<bool>| config.as_ref().and_then(f);

    let goal = parse_flag::<f64>(matches, "goal")?
        .or_else(|| config.as_ref().and_then(|c| c.goal))
        .unwrap_or(defaults.goal);
    if !(0.0..=1.0).contains(&goal) {
        return Err(anyhow!("goal must be in [0, 1]; got {}", goal));
    }
    let allow_constant = parse_bool_flag(matches, "allow_constant_gates")
        .or_else(|| config_value(|c| c.allow_constant_gates))
        .unwrap_or(!gate_defaults.exclude_constants);
    let allow_unary = parse_bool_flag(matches, "allow_unary_gates")
        .or_else(|| config_value(|c| c.allow_unary_gates))
        .unwrap_or(!gate_defaults.exclude_unary);

    let train = TrainOptions {
        goal,
        changes_per_iteration: parse_flag(matches, "changes_per_iteration")?
            .or_else(|| config.as_ref().and_then(|c| c.changes_per_iteration))
            .unwrap_or(defaults.changes_per_iteration),
        max_iterations: parse_flag(matches, "max_iterations")?
            .or_else(|| config.as_ref().and_then(|c| c.max_iterations))
            .unwrap_or(defaults.max_iterations),
        seed: get_seed(matches, config)?,
        gate_options: RandomGateOptions {
            exclude_constants: !allow_constant,
            exclude_unary: !allow_unary,
        },
    };
    let trials = parse_flag(matches, "trials")?
        .or_else(|| config.as_ref().and_then(|c| c.trials))
        .unwrap_or(TrialOptions::default().trials);
    if trials == 0 {
        return Err(anyhow!("trials must be at least 1"));
    }
    Ok(TrialOptions { trials, train })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, ArgAction, Command};
    use pretty_assertions::assert_eq;

    fn command() -> Command {
        let mut command = Command::new("test");
        for name in [
            "goal",
            "max_iterations",
            "changes_per_iteration",
            "seed",
            "trials",
            "layers",
            "allow_constant_gates",
            "allow_unary_gates",
        ] {
            command = command.arg(Arg::new(name).long(name).action(ArgAction::Set));
        }
        command
    }

    fn config(text: &str) -> Option<TrainingConfig> {
        Some(toml::from_str::<QbnConfig>(text).unwrap().training)
    }

    #[test]
    fn test_defaults_without_flags_or_config() {
        let matches = command().get_matches_from(["test"]);
        let options = get_trial_options(&matches, &None).unwrap();
        assert_eq!(options, TrialOptions::default());
        assert_eq!(get_layer_sizes(&matches, &None).unwrap(), None);
    }

    #[test]
    fn test_flag_overrides_config_overrides_default() {
        let config = config(
            "[training]\ngoal = 0.8\nseed = 7\ntrials = 3\nlayers = [2, 2]\nallow_unary_gates = true\n",
        );
        let matches = command().get_matches_from(["test", "--seed", "11", "--layers", "5"]);
        let options = get_trial_options(&matches, &config).unwrap();
        assert_eq!(options.train.goal, 0.8);
        assert_eq!(options.train.seed, 11);
        assert_eq!(options.trials, 3);
        assert_eq!(options.train.max_iterations, 10000);
        assert!(!options.train.gate_options.exclude_unary);
        assert!(options.train.gate_options.exclude_constants);
        assert_eq!(get_layer_sizes(&matches, &config).unwrap(), Some(vec![5]));

        let matches = command().get_matches_from(["test"]);
        assert_eq!(
            get_layer_sizes(&matches, &config).unwrap(),
            Some(vec![2, 2])
        );
    }

    #[test]
    fn test_empty_config_table_is_allowed() {
        assert_eq!(config(""), Some(TrainingConfig::default()));
        assert!(toml::from_str::<QbnConfig>("[training]\nbogus = 1\n").is_err());
    }

    #[test]
    fn test_bad_values_are_reported() {
        let matches = command().get_matches_from(["test", "--goal", "1.5"]);
        assert!(get_trial_options(&matches, &None).is_err());
        let matches = command().get_matches_from(["test", "--trials", "zero"]);
        assert!(get_trial_options(&matches, &None).is_err());
        assert!(parse_layer_sizes("4,,4").is_err());
        assert!(parse_layer_sizes("4,0").is_err());
        assert_eq!(parse_layer_sizes("4, 3").unwrap(), vec![4, 3]);
    }
}
