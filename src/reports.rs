use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, FromQueryResult, Statement};

use crate::error::AppResult;

// The five canned reports. Each also exists as a view with the reference
// dataset's names baked in (see the report-views migration); the functions
// here take the names as parameters. Name matching is case-insensitive
// exact match, and null gross always sorts last.

#[derive(Debug, FromQueryResult, PartialEq)]
pub struct FilmographyRow {
    pub title: String,
    pub year_start: Option<i32>,
    pub rating: Option<f64>,
}

#[derive(Debug, FromQueryResult, PartialEq)]
pub struct DirectorGrossRow {
    pub name: String,
    pub total_gross: Option<f64>,
    pub movie_count: i64,
}

#[derive(Debug, FromQueryResult, PartialEq)]
pub struct GrossedTitleRow {
    pub title: String,
    pub gross: Option<f64>,
}

#[derive(Debug, FromQueryResult, PartialEq)]
pub struct CollabRow {
    pub title: String,
    pub year_start: Option<i32>,
    pub gross: Option<f64>,
}

/// Report 1: how many distinct titles the store holds.
pub async fn distinct_title_count(db: &DatabaseConnection) -> AppResult<i64> {
    let stmt = Statement::from_string(
        DbBackend::Sqlite,
        "SELECT COUNT(DISTINCT lower(title)) AS title_count FROM movie",
    );
    let row = db.query_one(stmt).await?;
    Ok(match row {
        Some(row) => row.try_get("", "title_count")?,
        None => 0,
    })
}

/// Report 2: every movie featuring the named actor.
pub async fn actor_filmography(
    db: &DatabaseConnection,
    actor: &str,
) -> AppResult<Vec<FilmographyRow>> {
    let stmt = Statement::from_sql_and_values(
        DbBackend::Sqlite,
        "SELECT m.title, m.year_start, m.rating \
         FROM movie m \
         JOIN movie_actor ma ON ma.movie_id = m.movie_id \
         JOIN actor a ON a.actor_id = ma.actor_id \
         WHERE lower(a.name) = lower(?) \
         ORDER BY (m.year_start IS NULL), m.year_start, m.title",
        [actor.into()],
    );
    Ok(FilmographyRow::find_by_statement(stmt).all(db).await?)
}

/// Report 3: total gross per director, highest first.
pub async fn director_gross(db: &DatabaseConnection) -> AppResult<Vec<DirectorGrossRow>> {
    let stmt = Statement::from_string(
        DbBackend::Sqlite,
        "SELECT d.name, SUM(m.gross) AS total_gross, COUNT(*) AS movie_count \
         FROM director d \
         JOIN movie_director md ON md.director_id = d.director_id \
         JOIN movie m ON m.movie_id = md.movie_id \
         GROUP BY d.director_id, d.name \
         ORDER BY (total_gross IS NULL), total_gross DESC, d.name",
    );
    Ok(DirectorGrossRow::find_by_statement(stmt).all(db).await?)
}

/// Report 4: top-N movies of the named genre by gross.
pub async fn top_by_genre(
    db: &DatabaseConnection,
    genre: &str,
    limit: u64,
) -> AppResult<Vec<GrossedTitleRow>> {
    let stmt = Statement::from_sql_and_values(
        DbBackend::Sqlite,
        "SELECT m.title, m.gross \
         FROM movie m \
         JOIN movie_genre mg ON mg.movie_id = m.movie_id \
         JOIN genre g ON g.genre_id = mg.genre_id \
         WHERE lower(g.name) = lower(?) \
         ORDER BY (m.gross IS NULL), m.gross DESC, m.title \
         LIMIT ?",
        [genre.into(), (limit as i64).into()],
    );
    Ok(GrossedTitleRow::find_by_statement(stmt).all(db).await?)
}

/// Report 5: movies where the named actor worked under the named director.
pub async fn actor_director_collabs(
    db: &DatabaseConnection,
    actor: &str,
    director: &str,
) -> AppResult<Vec<CollabRow>> {
    let stmt = Statement::from_sql_and_values(
        DbBackend::Sqlite,
        "SELECT m.title, m.year_start, m.gross \
         FROM movie m \
         JOIN movie_actor ma ON ma.movie_id = m.movie_id \
         JOIN actor a ON a.actor_id = ma.actor_id \
         JOIN movie_director md ON md.movie_id = m.movie_id \
         JOIN director d ON d.director_id = md.director_id \
         WHERE lower(a.name) = lower(?) AND lower(d.name) = lower(?) \
         ORDER BY (m.gross IS NULL), m.gross DESC, m.title",
        [actor.into(), director.into()],
    );
    Ok(CollabRow::find_by_statement(stmt).all(db).await?)
}
