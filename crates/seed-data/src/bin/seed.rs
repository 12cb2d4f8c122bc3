//! Default seed script - fills the selected backend with social test data
//!
//! Run with:
//! ```
//! SEED_BACKEND=postgres DATABASE_URL=postgres://... cargo run -p seed-data --bin seed
//! ```

use rand::SeedableRng;
use rand::rngs::StdRng;
use seed_data::builders::ScenarioBuilder;
use seed_data::config::SeedConfig;
use seed_data::db::Backend;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let backend = Backend::from_env()?;
    tracing::info!("Seeding backend: {:?}", backend);
    let services = backend.connect().await?;

    let config = SeedConfig::default();
    let mut rng = StdRng::seed_from_u64(config.seed); // Reproducible data

    let result = ScenarioBuilder::from_config(&config)
        .with_metrics(true)
        .build(&services, &mut rng)
        .await;

    // Summary output
    let summary = result.summary();
    tracing::info!("Seed completed!");
    tracing::info!("  Users: {}", summary.users);
    tracing::info!("  Posts: {}", summary.posts);
    tracing::info!("  Comments: {}", summary.comments);
    tracing::info!("  Likes: {}", summary.likes);
    tracing::info!("  Circles: {}", summary.circles);
    tracing::info!("  Memberships: {}", summary.memberships);
    tracing::info!("  Help posts: {}", summary.help_posts);
    tracing::info!("  Help comments: {}", summary.help_comments);

    if let Some(metrics) = &result.metrics {
        tracing::info!("  Elapsed: {} ms", metrics.total_time_ms);
    }

    if !result.failures.is_empty() {
        tracing::warn!("{} units failed:", result.failures.len());
        for failure in &result.failures {
            tracing::warn!("  {}", failure);
        }
    }

    Ok(())
}
