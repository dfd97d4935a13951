//! fnstack Synth - render the file-service deployment template

use clap::Parser;
use fnstack_infra::{build, synthesize, ConfigResolver, DeployContext, TemplateSynthesizer};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "fnstack-synth")]
#[command(about = "Resolve configuration, build the resource graph and write the template")]
#[command(version)]
struct Args {
    /// JSON configuration file
    #[arg(long, env = "FNSTACK_CONFIG")]
    config: Option<PathBuf>,

    /// Raw JSON configuration layered over the file
    #[arg(long)]
    json: Option<String>,

    /// Deployment context entry, e.g. `-c zip=target/lambda/bootstrap.zip`
    #[arg(short = 'c', long = "context", value_name = "KEY=VALUE")]
    context: Vec<String>,

    /// Directory the template is written to
    #[arg(short, long, default_value = "synth.out")]
    out_dir: PathBuf,

    /// Default `project` tag
    #[arg(long, default_value = "fnstack")]
    project: String,

    /// Default `environment` tag
    #[arg(long, default_value = "dev")]
    environment: String,

    /// Default `application` tag
    #[arg(long, default_value = "file-service")]
    application: String,

    /// Enable debug logging
    #[arg(short, long, env = "FNSTACK_DEBUG")]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("fnstack_infra={log_level},fnstack_synth={log_level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut resolver = ConfigResolver::new();
    if let Some(path) = &args.config {
        resolver = resolver.with_file(path);
    }
    if let Some(raw) = &args.json {
        resolver = resolver.with_json(raw.as_str());
    }
    let mut config = resolver.resolve()?;

    // Explicitly configured tags win over the command-line defaults
    for (key, value) in [
        ("project", args.project),
        ("environment", args.environment),
        ("application", args.application),
    ] {
        config.tags.entry(key.to_string()).or_insert(value);
    }

    let context = DeployContext::from_pairs(&args.context)?;
    let stack = build(&config, &context)?;

    let synthesizer = TemplateSynthesizer::new(&args.out_dir);
    let template = synthesize(&stack, &synthesizer)?;

    println!("{}", synthesizer.template_path(&template.stack_id).display());
    for output in &template.outputs {
        println!("{}.{} = {}", output.scope, output.key, output.value);
    }

    Ok(())
}
