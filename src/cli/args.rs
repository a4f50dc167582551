use crate::core::environment::Environment;
use crate::core::types::OutputFormat;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct ApplyArgs {
    /// Control-M job definition XML to read
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Where to write the rewritten document (parent directories are created)
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Environment the document is being prepared for
    #[arg(short, long, value_name = "ENV", value_enum)]
    pub target_env: Environment,

    /// Steps to run, in order (default: pipeline.default_steps from config)
    #[arg(
        short,
        long,
        value_name = "STEP",
        num_args = 1..,
        help_heading = "Pipeline"
    )]
    pub steps: Vec<String>,

    /// Run the pipeline and print the report without writing the output file
    #[arg(long, help_heading = "Pipeline")]
    pub dry_run: bool,

    /// Emit either terminal-friendly text or machine-readable JSON
    #[arg(long, default_value = "text", value_name = "FORMAT", help_heading = "Output Options")]
    pub report: OutputFormat,

    /// Path to custom config file (default: ./ctm-promote.toml)
    #[arg(long, value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ProfilesArgs {
    /// Emit either terminal-friendly text or machine-readable JSON
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,
}
