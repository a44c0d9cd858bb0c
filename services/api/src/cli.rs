use crate::demo::{run_criteria, run_demo, CriteriaArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use kyg::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Know-Your-Grantee Dashboard",
    about = "Serve or demonstrate the Know-Your-Grantee due-diligence dashboard",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP dashboard (default command)
    Serve(ServeArgs),
    /// Run one retrieval headlessly and print the resulting dashboard
    Demo(DemoArgs),
    /// Print the configured assessment criteria
    Criteria(CriteriaArgs),
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
        Command::Demo(args) => run_demo(args).await,
        Command::Criteria(args) => run_criteria(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["kyg-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn demo_accepts_timing_overrides() {
        let cli = Cli::try_parse_from([
            "kyg-api",
            "demo",
            "--charity",
            "ABC Charity",
            "--latency-ms",
            "50",
            "--timeout-ms",
            "20",
            "--html",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Demo(args)) => {
                assert_eq!(args.charity, "ABC Charity");
                assert_eq!(args.latency_ms, Some(50));
                assert_eq!(args.timeout_ms, Some(20));
                assert!(args.html);
            }
            other => panic!("expected demo command, got {other:?}"),
        }
    }

    #[test]
    fn demo_requires_a_charity() {
        assert!(Cli::try_parse_from(["kyg-api", "demo"]).is_err());
    }

    #[test]
    fn demo_rejects_a_zero_timeout() {
        let parsed = Cli::try_parse_from([
            "kyg-api", "demo", "--charity", "ABC Charity", "--timeout-ms", "0",
        ]);
        let err = parsed.expect_err("zero timeout refused");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
