use clap::Parser;
use clap_derive::{Args, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommands,
}

impl Cli {
    /// shlex so quoted input names ("Apple TV") survive
    pub fn parse(cmd_str: &str) -> Result<Self, clap::error::Error> {
        let argv = shlex::split(cmd_str)
            .unwrap_or_else(|| cmd_str.split_whitespace().map(str::to_string).collect());
        let res = Self::try_parse_from(std::iter::once("crossbar".to_string()).chain(argv))?;
        Ok(res)
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommands {
    /// Route an input to a select entity's output
    #[command(alias = "sel")]
    Select(SelectArgs),
    /// List various items
    #[command(alias = "ls")]
    List(ListArgs),
    /// Show the last polled matrix status
    Status,
    /// Poll the matrix outside the regular interval
    Refresh,
    /// Display version information
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct SelectArgs {
    /// entity id (select.living_room_tv_input)
    pub entity: String,
    /// input name to route
    pub option: String,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[command(subcommand)]
    pub item: ListItems,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ListItems {
    /// List select entities
    #[command(alias = "ents")]
    Entities,
    /// List input names
    #[command(alias = "ins")]
    Inputs,
    /// List dashboard cards
    Cards,
}
