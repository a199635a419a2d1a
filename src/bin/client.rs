//! Smoke-test client: sends its arguments as one line to `localhost:8888`
//! and prints the first chunk of the reply.

use clap::Parser;
use linecache::client;
use std::ffi::OsString;
use tracing_subscriber::EnvFilter;

/// Every argument is a message word; there are no flags.
#[derive(Parser, Debug)]
#[command(name = "linecache-client")]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct ClientArgs {
    #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
    words: Vec<String>,
}

impl ClientArgs {
    /// Parse a full argv with an end-of-options marker placed after the
    /// program name, so a literal `--` among the words is kept.
    fn from_argv<I, T>(argv: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut argv = argv.into_iter().map(Into::into);
        let program = argv
            .next()
            .unwrap_or_else(|| OsString::from("linecache-client"));
        Self::try_parse_from(
            std::iter::once(program)
                .chain(std::iter::once(OsString::from("--")))
                .chain(argv),
        )
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = ClientArgs::from_argv(std::env::args_os()).unwrap_or_else(|e| e.exit());

    // Diagnostics go to stderr; stdout carries only the reply
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let response = client::run(&args.words)?;
    println!("{}", response);
    Ok(())
}
