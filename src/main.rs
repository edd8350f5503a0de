use clap::Parser;

/// Runs the HDMI-CEC driver conformance suites
#[derive(Parser, Debug)]
#[command(name = "hdmicec-vts")]
#[command(author = "bigbro")]
#[command(about = "HDMI-CEC driver conformance suites", long_about = None)]
struct Args {
    #[arg(long = "dump_configuration")]
    #[arg(help = "dump the configuration to file and exit")]
    #[arg(value_name = "OUT_FILE")]
    dump_configuration: Option<String>,

    #[arg(short)]
    #[arg(long)]
    #[arg(help = "path to the device profile and driver configuration")]
    #[arg(value_name = "FILE")]
    configuration: Option<String>,

    #[arg(short)]
    #[arg(long)]
    #[arg(help = "only run the suite with this name (L1, L2 or L3)")]
    #[arg(value_name = "NAME")]
    suite: Option<String>,

    #[arg(short)]
    #[arg(long)]
    #[arg(help = "only run the scenarios whose name matches this regex")]
    #[arg(value_name = "REGEX")]
    test: Option<String>,

    #[arg(long)]
    #[arg(help = "list the selected scenarios and exit")]
    list: bool,
}

fn get_configuration(path: &Option<String>) -> hdmicec::configuration::SuiteConfiguration {
    match path {
        Some(path) => hdmicec::configuration::SuiteConfiguration::from_file(path)
            .expect("Invalid configuration file"),
        None => hdmicec::configuration::SuiteConfiguration::default(),
    }
}

fn dump_configuration(path: &str, configuration: hdmicec::configuration::SuiteConfiguration) {
    println!("Dumping configuration to {}", path);
    std::fs::write(
        path,
        serde_json::to_string_pretty(&configuration).expect("Failed to serialize configuration"),
    )
    .expect("Failed to write configuration");
}

fn setup_logging(configuration: &hdmicec::configuration::LoggingConfiguration) {
    let level = if configuration.enabled {
        configuration.level
    } else {
        log::LevelFilter::Off
    };
    let target = match &configuration.path {
        Some(path) => env_logger::Target::Pipe(Box::new(
            std::fs::File::create(path).expect("Failed to create the log file"),
        )),
        None => env_logger::Target::Stdout,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .target(target)
        .init();
    log::info!("Logger initialized with level {:?}", level);
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let configuration = get_configuration(&args.configuration);

    setup_logging(&configuration.logging);

    if let &Some(path) = &args.dump_configuration.as_deref() {
        dump_configuration(path, configuration);
        return;
    }

    let filter = hdmicec::get_filter(args.suite.as_deref(), args.test.as_deref())
        .expect("Invalid scenario selection");

    if args.list {
        for name in hdmicec::list_scenarios(&configuration, filter.as_ref()) {
            println!("{}", name);
        }
        return;
    }

    let reports = hdmicec::run_conformance(&configuration, filter.as_ref()).await;
    if reports.is_empty() {
        log::error!("No scenario matches the selection");
        eprintln!("No scenario matches the selection, see --list");
    }
    for report in reports.iter() {
        println!(
            "{}: {} passed, {} failed, {} skipped",
            report.suite,
            report.passed(),
            report.failed(),
            report.skipped()
        );
    }

    if !hdmicec::all_passed(&reports) {
        std::process::exit(1);
    }
}
