use clap::CommandFactory;
use clap_complete::generate;

use crate::cli::{Cli, CompletionsArgs, Shell};

pub(crate) fn handle(args: &CompletionsArgs) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    let shell = match args.shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Elvish => clap_complete::Shell::Elvish,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::Powershell => clap_complete::Shell::PowerShell,
        Shell::Zsh => clap_complete::Shell::Zsh,
    };
    generate(shell, &mut cmd, name, &mut std::io::stdout());
}
