use clap::Parser;

/// Pull ChargePoint stations and charging sessions into a SQLite database.
#[derive(Debug, Clone, Parser)]
#[command(name = "chargepoint_import", version, about)]
pub struct Cli {
    /// Also collect fifteen-minute interval samples for every session.
    #[arg(short = 'r', long = "record15min")]
    pub record_fifteen_min: bool,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Cli;

    #[test]
    fn fine_grained_collection_is_off_by_default() {
        let cli = Cli::try_parse_from(["chargepoint_import"]).expect("args should parse");
        assert!(!cli.record_fifteen_min);
    }

    #[test]
    fn accepts_short_and_long_flag() {
        for flag in ["-r", "--record15min"] {
            let cli = Cli::try_parse_from(["chargepoint_import", flag]).expect("args should parse");
            assert!(cli.record_fifteen_min);
        }
    }

    #[test]
    fn rejects_unknown_arguments() {
        assert!(Cli::try_parse_from(["chargepoint_import", "--bogus"]).is_err());
    }
}
