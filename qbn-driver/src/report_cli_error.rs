// SPDX-License-Identifier: Apache-2.0

use colored::Colorize;

/// Prints `message` in bold red, followed by indented `key: value` details,
/// and exits with status 1.
pub fn report_cli_error_and_exit(
    message: &str,
    subcommand: Option<&str>,
    details: Vec<(&str, &str)>,
) -> ! {
    let prefix = match subcommand {
        Some(subcommand) => format!("{}: ", subcommand),
        None => String::new(),
    };
    eprintln!("qbn-driver: {}{}", prefix, message.red().bold());
    for (key, value) in details {
        eprintln!("  {}: {}", key.dimmed(), value);
    }
    std::process::exit(1);
}

/// Exits through `report_cli_error_and_exit` if a command handler failed,
/// listing the error's causes as details.
pub fn exit_on_error(subcommand: &str, result: anyhow::Result<()>) {
    if let Err(e) = result {
        let causes: Vec<String> = e.chain().skip(1).map(|cause| cause.to_string()).collect();
        let details = causes.iter().map(|cause| ("caused by", cause.as_str())).collect();
        report_cli_error_and_exit(&e.to_string(), Some(subcommand), details);
    }
}
