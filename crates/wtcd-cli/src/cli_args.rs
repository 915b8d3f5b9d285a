use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "wtcd-player")]
#[command(about = "WTCD interactive fiction player and agent CLI")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    Agent(AgentArgs),
    Play(PlayArgs),
}

#[derive(Debug, Args)]
pub(crate) struct AgentArgs {
    #[command(subcommand)]
    pub(crate) command: AgentCommand,
}

#[derive(Debug, Subcommand)]
pub(crate) enum AgentCommand {
    Start(StartArgs),
    Choose(ChooseArgs),
}

#[derive(Debug, Args)]
pub(crate) struct StartArgs {
    /// A `.wtcd` file, or a directory holding `<entry>.wtcd`.
    #[arg(long = "source")]
    pub(crate) source: String,
    #[arg(long = "entry")]
    pub(crate) entry: Option<String>,
    #[arg(long = "state-out")]
    pub(crate) state_out: String,
    #[arg(long = "seed")]
    pub(crate) seed: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct ChooseArgs {
    #[arg(long = "state-in")]
    pub(crate) state_in: String,
    #[arg(long = "choice")]
    pub(crate) choice: usize,
    #[arg(long = "state-out")]
    pub(crate) state_out: String,
}

#[derive(Debug, Args)]
pub(crate) struct PlayArgs {
    #[arg(long = "source")]
    pub(crate) source: String,
    #[arg(long = "entry")]
    pub(crate) entry: Option<String>,
    #[arg(long = "state-file")]
    pub(crate) state_file: Option<String>,
    #[arg(long = "seed")]
    pub(crate) seed: Option<String>,
    /// Full-screen terminal player; falls back to line mode without a TTY.
    #[arg(long = "rich")]
    pub(crate) rich: bool,
}
