use anyhow::Result;
use clap::{Arg, ArgAction, Command};

use hostwatch::commands;

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .value_name("PATH")
        .help("Config file to use instead of the user config")
}

fn geoip_arg() -> Arg {
    Arg::new("geoip")
        .long("geoip")
        .value_name("PATH")
        .help("MaxMind City database for country/city enrichment")
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .help("Print JSON instead of a summary")
        .action(ArgAction::SetTrue)
}

fn profile_arg() -> Arg {
    Arg::new("profile")
        .long("profile")
        .value_name("PROFILE")
        .help("Engine profile")
        .value_parser(["minimal", "extended"])
}

fn sampling_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("interval-ms")
                .long("interval-ms")
                .value_name("MS")
                .help("Sampling period in milliseconds")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("cpu-threshold")
                .long("cpu-threshold")
                .value_name("PERCENT")
                .help("CPU usage above which a warning is raised")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("mem-threshold")
                .long("mem-threshold")
                .value_name("PERCENT")
                .help("Memory usage above which a warning is raised")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(geoip_arg())
        .arg(profile_arg())
        .arg(config_arg())
}

fn main() -> Result<()> {
    hostwatch::init_logging();

    let matches = Command::new("hostwatch")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Host metrics sampler and LAN discovery")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            sampling_args(
                Command::new("watch")
                    .about("Sample host metrics and print every snapshot")
                    .arg(
                        Arg::new("cycles")
                            .short('n')
                            .long("cycles")
                            .value_name("N")
                            .help("Stop after N snapshots (default: run until Ctrl-C)")
                            .value_parser(clap::value_parser!(u64).range(1..)),
                    )
                    .arg(json_arg()),
            ),
        )
        .subcommand(
            sampling_args(
                Command::new("alerts")
                    .about("Sample a few cycles, then page through the alert history")
                    .arg(
                        Arg::new("cycles")
                            .short('n')
                            .long("cycles")
                            .value_name("N")
                            .help("Cycles to sample first")
                            .value_parser(clap::value_parser!(u64).range(1..))
                            .default_value("10"),
                    )
                    .arg(
                        Arg::new("limit")
                            .long("limit")
                            .value_name("N")
                            .help("Page size (non-positive or invalid means 20)"),
                    )
                    .arg(
                        Arg::new("offset")
                            .long("offset")
                            .value_name("N")
                            .help("Records to skip (clamped to the history length)"),
                    )
                    .arg(json_arg()),
            ),
        )
        .subcommand(
            Command::new("scan")
                .about("Discover reachable hosts on the local /24")
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .value_name("PORT")
                        .help("TCP port that marks a host as running the monitor")
                        .value_parser(clap::value_parser!(u16)),
                )
                .arg(
                    Arg::new("subnet")
                        .long("subnet")
                        .value_name("CIDR")
                        .help("Scan this subnet instead of the local segment"),
                )
                .arg(json_arg())
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("conns")
                .about("Audit established connections to public addresses")
                .arg(geoip_arg())
                .arg(json_arg())
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("config")
                .about("Inspect or create the configuration file")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(
                    sampling_args(Command::new("show").about("Print the effective configuration")),
                )
                .subcommand(Command::new("path").about("Print the user config file path"))
                .subcommand(
                    Command::new("init")
                        .about("Write a default config file")
                        .arg(
                            Arg::new("path")
                                .help("Destination (defaults to the user config path)")
                                .index(1),
                        )
                        .arg(profile_arg())
                        .arg(
                            Arg::new("force")
                                .short('f')
                                .long("force")
                                .help("Overwrite an existing file")
                                .action(ArgAction::SetTrue),
                        ),
                ),
        )
        .subcommand(Command::new("version").about("Shows version information"))
        .get_matches();

    match matches.subcommand() {
        Some(("watch", sub_matches)) => commands::watch::execute(sub_matches)?,
        Some(("alerts", sub_matches)) => commands::alerts::execute(sub_matches)?,
        Some(("scan", sub_matches)) => commands::scan::execute(sub_matches)?,
        Some(("conns", sub_matches)) => commands::conns::execute(sub_matches)?,
        Some(("config", sub_matches)) => commands::config::execute(sub_matches)?,
        Some(("version", _)) => commands::version::execute()?,
        _ => {
            println!("Use 'hostwatch --help' for more information.");
        }
    }

    Ok(())
}
