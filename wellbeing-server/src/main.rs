use clap::Parser;
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};
use wellbeing_core::{SurveyStore, WellbeingConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "wellbeing.toml")]
    config: String,

    /// Check the database connection and exit
    #[arg(long)]
    health: bool,

    /// Create the database tables and exit
    #[arg(long)]
    init_db: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience — production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load config
    let config = match WellbeingConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // Init logging; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.service.log_level));
    fmt().with_env_filter(filter).init();

    // Connect to DB
    let pool = match wellbeing_core::db::create_pool(&config.database).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to open database {}: {}", config.database.url, e);
            std::process::exit(1);
        }
    };

    if args.init_db {
        wellbeing_core::db::init_schema(&pool).await?;
        println!("Initialized the database.");
        return Ok(());
    }

    if args.health {
        match wellbeing_core::db::health_check(&pool).await {
            Ok(v) => println!("✅ SQLite connected: {}", v),
            Err(e) => {
                println!("❌ SQLite connection failed: {}", e);
                std::process::exit(1);
            }
        }

        match SurveyStore::new(pool.clone()).count().await {
            Ok(n) => println!("✅ survey_responses: {} rows", n),
            Err(e) => {
                println!("❌ survey_responses unavailable (run --init-db?): {}", e);
                std::process::exit(1);
            }
        }

        println!("✅ Wellbeing DB health check passed");
        return Ok(());
    }

    wellbeing_core::db::init_schema(&pool).await?;
    let store = SurveyStore::new(pool);

    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    wellbeing_server::http::start_http_server(store, config, tx.subscribe()).await?;

    tracing::info!("Wellbeing server stopped");
    Ok(())
}
