mod config;
mod db;
mod entities;
mod error;
mod models;
mod normalize;
mod pipeline;
mod reader;
mod reports;
mod resolver;
mod store;
#[cfg(test)]
mod testutil;

use sea_orm::DatabaseConnection;
use tracing::info;

use crate::{config::Config, reader::RowReader, store::SqlStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,movies_etl=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Config::from_env()?;

    let db = db::connect_and_migrate(&config.database_url).await?;
    let store = SqlStore::new(db);
    let reader = RowReader::new(&config.csv_path);

    let summary = pipeline::run(&reader, &store, config.max_actors).await?;
    info!(
        read = summary.read,
        skipped = summary.skipped,
        failed = summary.failed,
        loaded = summary.loaded,
        "run summary"
    );

    if config.print_reports {
        print_reports(store.db(), &config).await?;
    }

    Ok(())
}

async fn print_reports(db: &DatabaseConnection, config: &Config) -> anyhow::Result<()> {
    let titles = reports::distinct_title_count(db).await?;
    info!(distinct_titles = titles, "report: title count");

    for row in reports::actor_filmography(db, &config.report_actor).await? {
        info!(
            actor = %config.report_actor,
            title = %row.title,
            year = ?row.year_start,
            rating = ?row.rating,
            "report: filmography"
        );
    }

    for row in reports::director_gross(db).await? {
        info!(
            director = %row.name,
            total_gross = ?row.total_gross,
            movies = row.movie_count,
            "report: director gross"
        );
    }

    for row in reports::top_by_genre(db, &config.report_genre, config.report_top_n).await? {
        info!(
            genre = %config.report_genre,
            title = %row.title,
            gross = ?row.gross,
            "report: top by genre"
        );
    }

    for row in
        reports::actor_director_collabs(db, &config.report_actor, &config.report_director).await?
    {
        info!(
            actor = %config.report_actor,
            director = %config.report_director,
            title = %row.title,
            year = ?row.year_start,
            gross = ?row.gross,
            "report: collaborations"
        );
    }

    Ok(())
}
