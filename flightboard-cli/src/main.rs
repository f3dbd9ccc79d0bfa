//! flightboard: poll live flights near an observer and inspect the
//! metadata store.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table};
use log::info;

use flightboard_core::config::load_config;
use flightboard_core::enrich::Enricher;
use flightboard_core::source::create_source;
use flightboard_core::store::MetadataStore;
use flightboard_core::types::Flight;

#[derive(Parser)]
#[command(name = "flightboard", version, about = "Live flight board data engine")]
struct Cli {
    /// Config file path
    #[arg(long, default_value = "config.yaml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the configured source and print nearby flights
    Poll {
        /// Use the built-in mock source regardless of config
        #[arg(long)]
        mock: bool,

        /// Use the FR24 sandbox endpoint
        #[arg(long)]
        sandbox: bool,

        /// Poll once and exit instead of looping
        #[arg(long)]
        once: bool,
    },

    /// Show metadata store statistics
    Stats,

    /// Look up a stored aircraft by hex code
    Lookup {
        /// ICAO 24-bit address, e.g. 4ca7b4
        hex: String,
    },

    /// Look up a cached route by callsign
    Route {
        /// Flight callsign, e.g. RYR4421
        callsign: String,
    },

    /// Import an aircraft registry CSV (icao24-keyed) into the store
    Import {
        /// Path to the CSV file
        file: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Poll { mock, sandbox, once } => cmd_poll(&cli.config, mock, sandbox, once),
        Commands::Stats => cmd_stats(&cli.config),
        Commands::Lookup { hex } => cmd_lookup(&cli.config, &hex),
        Commands::Route { callsign } => cmd_route(&cli.config, &callsign),
        Commands::Import { file } => cmd_import(&cli.config, &file),
    }
}

// ---------------------------------------------------------------------------
// Poll
// ---------------------------------------------------------------------------

fn cmd_poll(config_path: &PathBuf, mock: bool, sandbox: bool, once: bool) {
    let mut config = load_config(config_path);
    config.use_mock = mock;
    config.use_sandbox = sandbox;

    let mut source = create_source(&config);
    let mut enricher = if config.enrichment.enabled {
        Some(Enricher::new(&config.enrichment))
    } else {
        None
    };

    info!(
        "Observer {:.4},{:.4} radius {:.0} nm",
        config.location.latitude, config.location.longitude, config.radius_nm
    );

    loop {
        let mut flights = source.fetch_flights();
        if let Some(enricher) = enricher.as_mut() {
            for flight in &mut flights {
                enricher.enrich(flight);
            }
            info!("Session API calls: {}", enricher.api_calls());
        }

        print_flights(&flights);

        if once {
            break;
        }
        thread::sleep(Duration::from_secs(config.poll_interval_seconds));
    }
}

fn print_flights(flights: &[Flight]) {
    if flights.is_empty() {
        println!("No aircraft overhead");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Callsign", "Airline", "Type", "Reg", "From", "To", "Alt (ft)", "Speed", "Dist (nm)",
    ]);

    let dash = |s: &str| {
        if s.is_empty() {
            "-".to_string()
        } else {
            s.to_string()
        }
    };

    for f in flights {
        table.add_row(vec![
            Cell::new(dash(&f.callsign)),
            Cell::new(dash(&f.airline)),
            Cell::new(dash(&f.aircraft_type)),
            Cell::new(dash(&f.registration)),
            Cell::new(dash(&f.origin_iata)),
            Cell::new(dash(&f.destination_iata)),
            Cell::new(f.altitude),
            Cell::new(f.ground_speed),
            Cell::new(format!("{:.1}", f.distance_nm)),
        ]);
    }

    println!("{table}");
}

// ---------------------------------------------------------------------------
// Store inspection
// ---------------------------------------------------------------------------

fn open_store(config_path: &PathBuf) -> MetadataStore {
    let config = load_config(config_path);
    MetadataStore::open(&config.enrichment.database).unwrap_or_else(|e| {
        eprintln!(
            "Error opening database {}: {e}",
            config.enrichment.database
        );
        std::process::exit(1);
    })
}

fn cmd_stats(config_path: &PathBuf) {
    let store = open_store(config_path);
    let stats = store.stats();

    println!();
    println!("  Aircraft:           {}", stats.total_aircraft);
    println!("    with type:        {}", stats.with_typecode);
    println!("    with reg:         {}", stats.with_registration);
    println!("  Routes cached:      {}", stats.routes_cached);
    println!("    with data:        {}", stats.routes_with_data);
    println!("  Airports cached:    {}", stats.airports_cached);
    println!();
}

fn cmd_lookup(config_path: &PathBuf, hex: &str) {
    let store = open_store(config_path);
    match store.get_aircraft(hex) {
        Some(rec) => {
            println!();
            println!("  Hex:          {}", rec.hex);
            println!("  Registration: {}", rec.registration);
            println!("  Type:         {}", rec.typecode);
            println!("  Model:        {}", rec.model);
            println!("  Operator:     {}", rec.operator);
            println!("  Owner:        {}", rec.owner);
            println!("  Source:       {}", rec.source);
            println!();
        }
        None => println!("No aircraft record for {hex}"),
    }
}

fn cmd_route(config_path: &PathBuf, callsign: &str) {
    let store = open_store(config_path);
    match store.get_route(callsign) {
        Some(route) if route.has_data() => {
            println!();
            println!("  Callsign: {}", route.callsign);
            println!(
                "  From:     {} {}",
                route.dep_iata, route.dep_name
            );
            println!(
                "  To:       {} {}",
                route.arr_iata, route.arr_name
            );
            println!("  Airline:  {}", route.airline_name);
            println!("  Aircraft: {}", route.aircraft_icao);
            println!("  Source:   {}", route.source);
            println!();
        }
        Some(_) => println!("Cached negative entry for {callsign} (no route known)"),
        None => println!("No fresh route for {callsign}"),
    }
}

fn cmd_import(config_path: &PathBuf, file: &PathBuf) {
    let config = load_config(config_path);
    let mut store = MetadataStore::open(&config.enrichment.database).unwrap_or_else(|e| {
        eprintln!(
            "Error opening database {}: {e}",
            config.enrichment.database
        );
        std::process::exit(1);
    });

    match store.import_registry_csv(file) {
        Ok(count) => println!("Imported {count} rows from {}", file.display()),
        Err(e) => {
            eprintln!("Import failed: {e}");
            std::process::exit(1);
        }
    }
}
