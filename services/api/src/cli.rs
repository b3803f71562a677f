use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use hiretrack::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "HireTrack",
    about = "Track job applications, export them as CSV and send daily follow-up reminders",
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
    /// Seed an in-memory tracker and walk through listings, export and reminders
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
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["hiretrack-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_serve_overrides_and_demo_flags() {
        let cli = Cli::try_parse_from(["hiretrack-api", "serve", "--host", "0.0.0.0", "--port", "8080"])
            .expect("parses");
        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
                assert_eq!(args.port, Some(8080));
            }
            other => panic!("expected serve command, got {other:?}"),
        }

        let cli = Cli::try_parse_from(["hiretrack-api", "demo", "--remind", "--today", "2024-06-03"])
            .expect("parses");
        match cli.command {
            Some(Command::Demo(args)) => {
                assert!(args.remind);
                assert!(args.today.is_some());
            }
            other => panic!("expected demo command, got {other:?}"),
        }
    }

    #[test]
    fn rejects_out_of_range_port() {
        assert!(Cli::try_parse_from(["hiretrack-api", "serve", "--port", "70000"]).is_err());
    }
}
