use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use console::style;
use dialoguer::Confirm;
use dialoguer::theme::ColorfulTheme;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use tweet_reach::config::ReachConfig;
use tweet_reach::reach::{Importer, ReachProgress, ReachStatus};
use tweet_reach::upstream::{TwitterClient, UpstreamConfig};

#[derive(Parser, Debug)]
#[command(name = "compute_reach", about = "Compute the reach of a Tweet.")]
struct Args {
    /// Single Tweet URL.
    url: String,

    /// Skip the confirmation prompt.
    #[arg(long, short = 'y')]
    yes: bool,
}

/// Terminal progress bar fed by the importer while resharers are fetched.
struct ProgressBarObserver {
    bar: ProgressBar,
}

impl ProgressBarObserver {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::hidden();
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg:.green}\n{pos}/{len} [{bar:40.cyan/blue}]")?
                .progress_chars("#>-"),
        );
        Ok(Self { bar })
    }
}

impl ReachProgress for ProgressBarObserver {
    fn on_start(&self, total: u64) {
        self.bar.set_draw_target(ProgressDrawTarget::stderr());
        self.bar.set_length(total);
        self.bar.set_position(0);
    }

    fn on_advance(&self) {
        self.bar.inc(1);
    }

    fn on_message(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    fn on_finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn print_title(title: &str) {
    let line = "*".repeat(title.len() + 20);

    println!();
    println!("{}", style(&line).green());
    println!("{}", style(format!("*         {}         *", title.to_uppercase())).green());
    println!("{}", style(&line).green());
    println!();
}

fn print_error(message: &str) {
    eprintln!("{}", style(message).red());
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(code) => code,
        Err(err) => {
            log::error!("reach computation failed: {}", err);
            print_error(&err.to_string());
            ExitCode::from(1)
        }
    }
}

async fn run(args: Args) -> Result<ExitCode, Box<dyn std::error::Error>> {
    print_title("Tweet reach computation.");

    if !args.yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Do you want to compute the reach of the Tweet you provided?")
            .default(true)
            .interact()?;
        if !confirmed {
            return Ok(ExitCode::SUCCESS);
        }
    }

    let started = Instant::now();

    let client = TwitterClient::new(UpstreamConfig::from_env())?;
    let importer = Importer::new(Arc::new(client), ReachConfig::from_env());
    let progress = ProgressBarObserver::new()?;

    let result = importer
        .compute_reach_with_progress(args.url.trim(), &progress)
        .await?;

    match result.status() {
        status @ (ReachStatus::InvalidUrl | ReachStatus::InvalidId) => {
            print_error(status.rejection_message().unwrap_or_default());
            Ok(ExitCode::from(1))
        }
        ReachStatus::NoReposts => {
            println!(
                "{}",
                style("The Tweet URL you provided was never retweeted. Bye.").yellow()
            );
            Ok(ExitCode::SUCCESS)
        }
        ReachStatus::Done => {
            println!("{}", style(result.reach_description()).green());
            println!(
                "{}",
                style(format!(
                    "Computing this took a total of {:.1} seconds.",
                    started.elapsed().as_secs_f64()
                ))
                .yellow()
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}
