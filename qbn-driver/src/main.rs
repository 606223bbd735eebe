// SPDX-License-Identifier: Apache-2.0

//! Command line driver for training and inspecting boolean circuit network
//! classifiers.
//!
//! Commands are given like:
//!
//! ```text
//! qbn-driver <global-options> <command> <command-args-and-options>
//! ```
//!
//! Commands are:
//!
//! - train: Trains a network against a dataset and optionally saves it.
//! - score: Scores a saved network against a dataset.
//! - classify: Classifies one input bit string with a saved, trained network.
//! - stats: Prints structural statistics of a saved network as JSON.
//! - version: Prints the driver version.
//!
//! Sample usage:
//!
//! ```shell
//! $ cargo run -- train sample://left_vs_right:6 --layers 6,6 --goal 0.9 \
//!     --trials 4 --output /tmp/net.json
//! $ cargo run -- score /tmp/net.json sample://left_vs_right:6
//! $ cargo run -- classify /tmp/net.json 110000
//! $ cargo run -- --config qbn.toml stats /tmp/net.json
//! ```

mod classify;
mod common;
mod network_stats;
mod report_cli_error;
mod score;
mod train;
mod training_config;

use clap::{Arg, ArgAction};
use report_cli_error::{exit_on_error, report_cli_error_and_exit};

use crate::training_config::{QbnConfig, TrainingConfig};

const CWD_CONFIG_NAME: &str = "qbn.toml";

trait AppExt {
    fn add_bool_arg(self, long: &'static str, help: &'static str) -> Self;
    fn add_value_arg(self, long: &'static str, value_name: &'static str, help: &'static str)
        -> Self;
    fn add_training_args(self) -> Self;
    fn add_network_arg(self) -> Self;
}

impl AppExt for clap::Command {
    fn add_bool_arg(self, long: &'static str, help: &'static str) -> Self {
        (self as clap::Command).arg(
            Arg::new(long)
                .long(long)
                .value_name("BOOL")
                .action(ArgAction::Set)
                .value_parser(["true", "false"])
                .num_args(1)
                .help(help),
        )
    }

    fn add_value_arg(
        self,
        long: &'static str,
        value_name: &'static str,
        help: &'static str,
    ) -> Self {
        (self as clap::Command).arg(
            Arg::new(long)
                .long(long)
                .value_name(value_name)
                .help(help)
                .action(ArgAction::Set),
        )
    }

    fn add_training_args(self) -> Self {
        (self as clap::Command)
            .add_value_arg(
                "layers",
                "LAYERS",
                "Comma separated gates per layer, e.g. 4,4 (default: one layer as wide as the input)",
            )
            .add_value_arg("goal", "GOAL", "Accuracy in [0, 1] at which training stops")
            .add_value_arg(
                "max_iterations",
                "MAX_ITERATIONS",
                "Maximum number of training iterations",
            )
            .add_value_arg(
                "changes_per_iteration",
                "CHANGES",
                "Gate mutations applied to each candidate",
            )
            .add_value_arg("seed", "SEED", "Seed for sample generation and training")
            .add_value_arg(
                "trials",
                "TRIALS",
                "Independent trials run in parallel; the best one is kept",
            )
            .add_bool_arg(
                "allow_constant_gates",
                "Let mutations pick the constant FALSE and TRUE gates",
            )
            .add_bool_arg(
                "allow_unary_gates",
                "Let mutations pick gates that ignore one of their inputs",
            )
    }

    fn add_network_arg(self) -> Self {
        (self as clap::Command).arg(
            Arg::new("network")
                .value_name("NETWORK")
                .help("Saved network (.json or bincode)")
                .required(true)
                .index(1),
        )
    }
}

/// Reads the `--config` file, or `qbn.toml` from the working directory if
/// present.
fn load_training_config(config_flag: Option<&String>) -> Option<TrainingConfig> {
    let mut toml_path: Option<std::path::PathBuf> = config_flag.map(std::path::PathBuf::from);

    if toml_path.is_none() {
        if let Ok(cwd) = std::env::current_dir() {
            let cwd_toml_path = cwd.join(CWD_CONFIG_NAME);
            if cwd_toml_path.exists() {
                log::info!(
                    "Using {} in current directory: {}",
                    CWD_CONFIG_NAME,
                    cwd_toml_path.display()
                );
                toml_path = Some(cwd_toml_path);
            }
        }
    }

    toml_path.map(|path| {
        let path_str = path.display().to_string();
        let toml_str = match std::fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => report_cli_error_and_exit(
                "could not read config file",
                None,
                vec![("path", &path_str), ("error", &e.to_string())],
            ),
        };
        match toml::from_str::<QbnConfig>(&toml_str) {
            Ok(config) => config.training,
            Err(e) => report_cli_error_and_exit(
                "could not parse config file",
                None,
                vec![("path", &path_str), ("error", &e.to_string())],
            ),
        }
    })
}

fn main() {
    let _ = env_logger::try_init();

    log::info!("qbn-driver starting; version: {}", env!("CARGO_PKG_VERSION"));

    let matches = clap::Command::new("qbn-driver")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Command line driver for boolean circuit network classifiers")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("CONFIG")
                .help("Path to a qbn.toml file with a [training] table")
                .action(ArgAction::Set),
        )
        .subcommand(clap::Command::new("version").about("Prints the version of the driver"))
        .subcommand(
            clap::Command::new("train")
                .about("Trains a network against a dataset")
                .arg(
                    Arg::new("dataset")
                        .value_name("DATASET")
                        .help("sample://left_vs_right:<width>, a .json file or a text file")
                        .required(true)
                        .index(1),
                )
                .add_training_args()
                .add_value_arg("output", "OUTPUT", "Where to save the trained network")
                .add_value_arg(
                    "trajectory",
                    "TRAJECTORY",
                    "Where to write the per-iteration accuracies as JSON",
                ),
        )
        .subcommand(
            clap::Command::new("score")
                .about("Scores a saved network against a dataset")
                .add_network_arg()
                .arg(
                    Arg::new("dataset")
                        .value_name("DATASET")
                        .help("sample://left_vs_right:<width>, a .json file or a text file")
                        .required(true)
                        .index(2),
                )
                .add_value_arg("seed", "SEED", "Seed for sample generation"),
        )
        .subcommand(
            clap::Command::new("classify")
                .about("Classifies one input with a saved, trained network")
                .add_network_arg()
                .arg(
                    Arg::new("bits")
                        .value_name("BITS")
                        .help("Input bit string, e.g. 1001")
                        .required(true)
                        .index(2),
                ),
        )
        .subcommand(
            clap::Command::new("stats")
                .about("Prints structural statistics of a saved network as JSON")
                .add_network_arg(),
        )
        .get_matches();

    let config = load_training_config(matches.get_one::<String>("config"));

    if let Some(matches) = matches.subcommand_matches("train") {
        exit_on_error("train", train::handle_train(matches, &config));
    } else if let Some(matches) = matches.subcommand_matches("score") {
        exit_on_error("score", score::handle_score(matches, &config));
    } else if let Some(matches) = matches.subcommand_matches("classify") {
        exit_on_error("classify", classify::handle_classify(matches));
    } else if let Some(matches) = matches.subcommand_matches("stats") {
        exit_on_error("stats", network_stats::handle_stats(matches));
    } else if let Some(_matches) = matches.subcommand_matches("version") {
        println!("{} (qbn {})", env!("CARGO_PKG_VERSION"), qbn::qbn_version());
    } else {
        report_cli_error_and_exit("No valid subcommand provided.", None, vec![]);
    }
}
