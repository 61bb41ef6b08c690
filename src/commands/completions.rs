// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Completions command - shell completion scripts

use anyhow::Result;
use clap_complete::Shell;
use std::io::{self, Write};

/// Write the completion script for `shell` to `out`
pub fn generate(shell: Shell, cli: &mut clap::Command, out: &mut dyn Write) {
    let name = cli.get_name().to_string();
    clap_complete::generate(shell, cli, name, out);
}

/// Run the completions command, printing to stdout
pub fn run(shell: Shell, mut cli: clap::Command) -> Result<()> {
    let mut stdout = io::stdout();
    generate(shell, &mut cli, &mut stdout);
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bash_completion_names_subcommands() {
        let mut cli = clap::Command::new("forgeyard")
            .subcommand(clap::Command::new("list-repos"))
            .subcommand(clap::Command::new("scan-ci"));
        let mut out = Vec::new();
        generate(Shell::Bash, &mut cli, &mut out);

        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("forgeyard"));
        assert!(script.contains("list-repos"));
    }
}
