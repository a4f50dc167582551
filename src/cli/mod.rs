pub mod args;
pub mod commands;

pub use args::{ApplyArgs, ProfilesArgs};
use clap::{Parser, Subcommand};

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
COMMANDS:\n{subcommands}\n";

#[derive(Parser, Debug)]
#[command(name = "ctm-promote")]
#[command(version = crate::VERSION)]
#[command(about = "Promote Control-M job definitions between environments")]
#[command(help_template = HELP_TEMPLATE)]
#[command(
    after_long_help = "Typical flow: inspect the profiles, dry-run an apply against the next environment, then apply for real."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(
        about = "Rewrite a job definition file for a target environment",
        long_about = "Apply runs the requested steps (activate, promote, resources, notifications) in order over a copy of the input. The output is written only when every step succeeds.",
        after_help = "Example:\n    ctm-promote apply --input jobs_dev.xml --output jobs_preprod.xml --target-env preprod --steps activate promote resources notifications"
    )]
    Apply(ApplyArgs),
    #[command(
        about = "Show the environment profile table",
        long_about = "Profiles prints the notification, resource, and naming parameters used for each environment.",
        after_help = "Example:\n    ctm-promote profiles --format json"
    )]
    Profiles(ProfilesArgs),
}

pub fn run(args: Args) -> crate::Result<()> {
    match args.command {
        Command::Apply(apply_args) => commands::apply(apply_args),
        Command::Profiles(profiles_args) => commands::profiles(profiles_args),
    }
}
