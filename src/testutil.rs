use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::{
    models::{MovieLinks, NormalizedMovie},
    normalize,
    resolver::EntityResolver,
};

/// Fresh in-memory SQLite with the full schema. One connection only, so
/// the pool cannot silently hand out a second empty :memory: database.
pub async fn mem_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options).await.expect("in-memory sqlite");
    Migrator::up(&db, None).await.expect("migrations");
    db
}

pub fn movie_with(
    title: &str,
    year_start: Option<i32>,
    gross: Option<f64>,
    directors: &[&str],
    actors: &[&str],
    genres: &[&str],
) -> (NormalizedMovie, MovieLinks) {
    let movie = NormalizedMovie {
        movie_id: normalize::derive_movie_id(title, year_start),
        title: title.to_string(),
        year_start,
        year_end: None,
        rating: Some(7.5),
        gross,
        runtime_min: Some(110),
        description: None,
        raw_row: serde_json::json!({ "movies": title }),
        directors: directors.iter().map(|s| s.to_string()).collect(),
        actors: actors.iter().map(|s| s.to_string()).collect(),
        genres: genres.iter().map(|s| s.to_string()).collect(),
    };
    let links = EntityResolver::new().resolve_movie(&movie);
    (movie, links)
}

pub fn sample_movie(title: &str, year_start: Option<i32>) -> (NormalizedMovie, MovieLinks) {
    movie_with(
        title,
        year_start,
        Some(67.4),
        &["Michael Mann"],
        &["Al Pacino", "Robert De Niro"],
        &["Crime", "Thriller"],
    )
}
