use clap::Parser;
use ladm_seeder::config::AppConfig;
use ladm_seeder::seed::{run_seed, Flavor, SeedPlan, SeedReport};
use ladm_seeder::store::{MemoryStore, PostgresStore};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Seed the LADM-based property tax DB with realistic data.
#[derive(Parser, Debug)]
#[command(name = "ladm-seeder", version, about, long_about = None)]
struct Cli {
    /// Number of LA_Party records
    #[arg(long = "num_parties", default_value_t = 50)]
    num_parties: usize,

    /// Number of BAUnits (and SpatialUnits)
    #[arg(long = "num_parcels", default_value_t = 100)]
    num_parcels: usize,

    /// Number of TaxBills to create
    #[arg(long = "num_bills", default_value_t = 500)]
    num_bills: usize,

    /// Vocabulary for generated names and addresses
    #[arg(long, value_enum, default_value_t = Flavor::Generic)]
    flavor: Flavor,

    /// Generate into an in-memory store instead of PostgreSQL
    #[arg(long)]
    dry_run: bool,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    ladm_seeder::init_logging();

    let cli = Cli::parse();
    let plan = SeedPlan::new(cli.num_parties, cli.num_parcels, cli.num_bills, cli.flavor)?;
    let mut rng = StdRng::from_entropy();

    println!("=== Seeding Start ===");

    let report = if cli.dry_run {
        log::info!("Dry run: writing to an in-memory store");
        run_seed(&MemoryStore::new(), &plan, &mut rng).await?
    } else {
        let config = AppConfig::load()?;
        let database_url = config.database_url()?;

        println!("Connecting to PostgreSQL...");
        let store = PostgresStore::connect(&config.database, &database_url).await?;

        let result = run_seed(&store, &plan, &mut rng).await;
        store.close().await;
        result?
    };

    println!("=== Seeding Completed Successfully! ===");
    print_report(&report, cli.json)?;

    Ok(())
}

fn print_report(report: &SeedReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", report);
    }
    Ok(())
}
