use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use segment_inspect::{load_snapshot, render_snapshot, replay_snapshot};
use segment_view::{logging, EnvConfig, ImageOutput, ViewOptions};

fn parse_image_output(value: &str) -> Result<ImageOutput, String> {
    ImageOutput::parse(value).ok_or_else(|| format!("expected 'markdown' or 'url', got '{value}'"))
}

#[derive(Debug, Parser)]
#[command(
    name = "segment-inspect",
    about = "Render recorded agent messages into display segments",
    version
)]
struct Cli {
    #[arg(help = "Snapshot JSON file: a message, an array of messages, or {messages, maps}")]
    path: PathBuf,

    #[arg(long, help = "Only print the message with this id")]
    message: Option<String>,

    #[arg(long, help = "Replay each message part by part and report prefix stability")]
    stream: bool,

    #[arg(long, requires = "stream", help = "Fail when a replayed prefix rewrites earlier segments")]
    check: bool,

    #[arg(long, value_parser = parse_image_output, help = "Image placeholder output: markdown or url")]
    image_output: Option<ImageOutput>,

    #[arg(long, help = "Keep unresolved placeholders instead of removing them")]
    keep_unresolved: bool,

    #[arg(long, help = "Drop repeated text segments and identical repeated tool calls")]
    suppress_repeats: bool,

    #[arg(long, help = "Resolve placeholders inside fenced code blocks")]
    resolve_in_code: bool,
}

impl Cli {
    fn apply(&self, config: &mut EnvConfig) {
        if let Some(image_output) = self.image_output {
            config.image_output = image_output;
        }
        config.keep_unresolved |= self.keep_unresolved;
        config.suppress_repeats |= self.suppress_repeats;
        config.resolve_in_code |= self.resolve_in_code;
    }

    fn selects(&self, id: &str) -> bool {
        self.message.as_deref().map_or(true, |wanted| wanted == id)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = EnvConfig::from_env();
    cli.apply(&mut config);
    logging::init(&config).context("failed to initialize logging")?;
    let options = ViewOptions::from(&config);

    let snapshot = load_snapshot(&cli.path)?;
    if let Some(id) = cli.message.as_deref() {
        if snapshot.message(id).is_none() {
            bail!("message '{id}' not found in {}", cli.path.display());
        }
    }

    let output = if cli.stream {
        let replays: Vec<_> = replay_snapshot(&snapshot, &options)
            .into_iter()
            .filter(|replay| cli.selects(&replay.id))
            .collect();
        if cli.check {
            let unstable: Vec<&str> = replays
                .iter()
                .filter(|replay| !replay.is_stable())
                .map(|replay| replay.id.as_str())
                .collect();
            if !unstable.is_empty() {
                bail!("unstable streamed prefixes in: {}", unstable.join(", "));
            }
        }
        serde_json::to_string_pretty(&replays)?
    } else {
        let views: Vec<_> = render_snapshot(&snapshot, &options)
            .into_iter()
            .filter(|view| cli.selects(&view.id))
            .collect();
        serde_json::to_string_pretty(&views)?
    };

    println!("{output}");
    Ok(())
}
