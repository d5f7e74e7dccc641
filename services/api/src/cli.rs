use crate::demo::{
    run_demo, run_student_transfer, run_teacher_transfer, DemoArgs, StudentTransferArgs,
    TeacherTransferArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use classdesk::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "classdesk",
    about = "Resolve class transfer options for a tutoring center from the command line",
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
    /// Evaluate a transfer against a class export without starting the service
    Transfer {
        #[command(subcommand)]
        command: TransferCommand,
    },
    /// Walk through a student move and a teacher handover on a sample campus
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum TransferCommand {
    /// List ranked destination classes for moving students out of a class
    Students(StudentTransferArgs),
    /// Check whether a teacher can take over a class
    Teacher(TeacherTransferArgs),
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
        Command::Transfer {
            command: TransferCommand::Students(args),
        } => run_student_transfer(args),
        Command::Transfer {
            command: TransferCommand::Teacher(args),
        } => run_teacher_transfer(args),
        Command::Demo(args) => run_demo(args),
    }
}
