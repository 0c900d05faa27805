use clap::{Parser, Subcommand};
use comfy_table::Table;
use configuration::AppEnvironment;
use core_types::{GradeRecord, PASSING_THRESHOLD};
use database::{connect, run_migrations, DbRepository, GradeRepository};
use rust_decimal::Decimal;

/// The main entry point for the grades service.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Settings come from defaults, config.toml, .env and the environment.
    let mut settings = configuration::load_settings()?;
    let _log_guard = configuration::init_tracing(&settings.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Serve(args) => {
            if let Some(port) = args.port {
                settings.server.port = port;
            }
            if let Some(environment) = args.env {
                settings.environment = environment;
            }
            web_server::run_server(settings).await?;
        }
        Commands::Migrate => {
            let pool = connect(&settings.database).await?;
            run_migrations(&pool).await?;
            println!("Schema is up to date.");
        }
        Commands::List => {
            let repo = open_repository(&settings.database).await?;
            let records = repo.list_all().await?;
            print_records(&records);
        }
        Commands::Count => {
            let repo = open_repository(&settings.database).await?;
            println!("{}", repo.count().await?);
        }
        Commands::ByAverage(args) => {
            let range = validation::validate_average_range(args.min, args.max)?;
            let repo = open_repository(&settings.database).await?;
            let records = repo.find_by_average_range(range).await?;
            println!("Students with an average between {} and {}:", range.min, range.max);
            print_records(&records);
        }
    }

    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Student grades service: HTTP API and maintenance commands.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Create or upgrade the database schema.
    Migrate,
    /// List every student, ordered by name.
    List,
    /// Print how many students are registered.
    Count,
    /// List students whose average falls within a range, best first.
    ByAverage(ByAverageArgs),
}

#[derive(Parser)]
struct ServeArgs {
    /// Port to listen on (overrides PORT).
    #[arg(long)]
    port: Option<u16>,

    /// Deployment environment (overrides APP_ENV).
    #[arg(long, value_enum)]
    env: Option<AppEnvironment>,
}

#[derive(Parser)]
struct ByAverageArgs {
    /// Lowest average to include (default 0).
    #[arg(long)]
    min: Option<Decimal>,

    /// Highest average to include (default 10).
    #[arg(long)]
    max: Option<Decimal>,
}

// ==============================================================================
// Command helpers
// ==============================================================================

async fn open_repository(
    settings: &configuration::DatabaseSettings,
) -> anyhow::Result<DbRepository> {
    let pool = connect(settings).await?;
    run_migrations(&pool).await?;
    Ok(DbRepository::new(pool))
}

fn print_records(records: &[GradeRecord]) {
    if records.is_empty() {
        println!("No students found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Name", "Grade 1", "Grade 2", "Grade 3", "Average", "Status", "Updated"]);
    for record in records {
        let status = if record.is_passing(PASSING_THRESHOLD) { "passing" } else { "failing" };
        table.add_row(vec![
            record.name.clone(),
            record.grade1.to_string(),
            record.grade2.to_string(),
            record.grade3.to_string(),
            record.average.to_string(),
            status.to_string(),
            record.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }
    println!("{table}");
    println!("{} student(s).", records.len());
}
