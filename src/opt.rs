use clap::{ArgAction, Parser};

/// Serve the sampha API and the embedded web client
#[derive(Parser, Debug)]
#[clap(version, about)]
pub struct Options {
    /// Logging verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Port to listen on (overrides the PORT environment variable, which defaults to 8080)
    #[arg(short, long)]
    pub port: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Options::command().debug_assert();
    }

    #[test]
    fn parses_port_and_verbosity() {
        let opt = Options::parse_from(["sampha", "-vv", "--port", "3000"]);
        assert_eq!(opt.verbose, 2);
        assert_eq!(opt.port, Some(3000));

        let opt = Options::parse_from(["sampha"]);
        assert_eq!(opt.verbose, 0);
        assert_eq!(opt.port, None);
    }
}
