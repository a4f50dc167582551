use crate::{
    cli::args::{ApplyArgs, ProfilesArgs},
    core::{
        document::xml,
        environment::{ProfileSummary, ProfileTable},
        AppError, ConfigLoader, ErrorCategory, OutputFormat, PipelineReport, PipelineRunner,
        PromoteConfig, StepRegistry,
    },
    Result,
};
use anyhow::Context;
use std::env;

/// Rewrite `--input` for `--target-env` and write `--output` when every step succeeds.
pub fn apply(args: ApplyArgs) -> Result<()> {
    let workspace = env::current_dir().context("failed to resolve working directory")?;
    let config = ConfigLoader::load(&workspace, args.config.as_deref())?;
    let steps = resolve_steps(&args, &config)?;

    tracing::info!("loading XML from {}", args.input.display());
    let input = xml::parse_file(&args.input).map_err(AppError::from)?;

    let runner = PipelineRunner::new(StepRegistry::with_defaults()?);
    let run = runner.run(&input, &steps, args.target_env);
    print_report(&run.report, args.report)?;

    let document = run.into_document()?;
    if args.dry_run {
        tracing::info!("dry run: not writing {}", args.output.display());
        return Ok(());
    }
    xml::write_file(&args.output, &document, config.output.indent_width)
        .map_err(AppError::from)?;
    if args.report == OutputFormat::Text {
        println!("Wrote {}", args.output.display());
    }
    Ok(())
}

/// Print the environment profile table.
pub fn profiles(args: ProfilesArgs) -> Result<()> {
    let table = ProfileTable::standard()?;
    let summaries = table.summaries();
    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&summaries)
                .context("failed to serialize profile table")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            for summary in &summaries {
                print!("{}", render_profile(summary));
            }
        }
    }
    Ok(())
}

fn resolve_steps(args: &ApplyArgs, config: &PromoteConfig) -> Result<Vec<String>> {
    let steps = if args.steps.is_empty() {
        config.pipeline.default_steps.clone()
    } else {
        args.steps.clone()
    };
    if steps.is_empty() {
        return Err(AppError::new(
            ErrorCategory::ValidationError,
            "no steps requested; pass --steps or set pipeline.default_steps",
        )
        .with_code("PIPELINE-002")
        .into());
    }
    Ok(steps)
}

fn print_report(report: &PipelineReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", report.render_text()),
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(report).context("failed to serialize report")?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn render_profile(summary: &ProfileSummary) -> String {
    let or_none = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    let or_empty = |value: &str| {
        if value.is_empty() {
            "-".to_string()
        } else {
            value.to_string()
        }
    };
    format!(
        "[{}]\n  notification_dest:      {}\n  remedy_urgency:         {}\n  resources:              ADF={} DW={} ADB={}\n  env_tag_pattern:        {}\n  env_tag_replacement:    {}\n  user_suffix:            {}\n  node_env_id:            {}\n  datacenter_pattern:     {}\n  datacenter_replacement: {}\n  job_suffix_to_add:      {}\n  job_suffix_to_remove:   {}\n",
        summary.environment,
        summary.notification_dest,
        summary.remedy_urgency,
        summary.resources.adf,
        summary.resources.dw,
        summary.resources.adb,
        or_none(&summary.env_tag_pattern),
        or_none(&summary.env_tag_replacement),
        or_empty(&summary.user_suffix),
        or_empty(&summary.node_env_id),
        or_none(&summary.datacenter_pattern),
        or_none(&summary.datacenter_replacement),
        or_empty(&summary.job_suffix_to_add),
        or_empty(&summary.job_suffix_to_remove),
    )
}
