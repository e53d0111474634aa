use crate::console::{run_assess, run_chat, run_classify, AssessArgs, ChatArgs, ClassifyArgs};
use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use mindcare::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "MindCare",
    about = "Run the MindCare support companion or try its triage engines from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Classify a single message and print the companion's reply
    Classify(ClassifyArgs),
    /// Score questionnaire answers, or print the questionnaire when none are given
    Assess(AssessArgs),
    /// Chat with the companion on stdin; `/quit` exits
    Chat(ChatArgs),
    /// Run a scripted chat and assessment walk-through
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Classify(args) => run_classify(args),
        Command::Assess(args) => run_assess(args),
        Command::Chat(args) => run_chat(args).await,
        Command::Demo(args) => run_demo(args),
    }
}
