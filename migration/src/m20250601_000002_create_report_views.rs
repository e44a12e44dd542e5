use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// Reusable views for the five canned reports. The names baked into the
// filtered views match the reference dataset; the Rust report functions in
// the main crate take the names as parameters instead.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared(
            "CREATE VIEW IF NOT EXISTS report_title_count AS \
             SELECT COUNT(DISTINCT lower(title)) AS title_count FROM movie",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE VIEW IF NOT EXISTS report_actor_filmography AS \
             SELECT m.title, m.year_start, m.rating \
             FROM movie m \
             JOIN movie_actor ma ON ma.movie_id = m.movie_id \
             JOIN actor a ON a.actor_id = ma.actor_id \
             WHERE lower(a.name) = lower('Robert De Niro') \
             ORDER BY (m.year_start IS NULL), m.year_start, m.title",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE VIEW IF NOT EXISTS report_director_gross AS \
             SELECT d.name, SUM(m.gross) AS total_gross, COUNT(*) AS movie_count \
             FROM director d \
             JOIN movie_director md ON md.director_id = d.director_id \
             JOIN movie m ON m.movie_id = md.movie_id \
             GROUP BY d.director_id, d.name \
             ORDER BY (total_gross IS NULL), total_gross DESC, d.name",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE VIEW IF NOT EXISTS report_top_comedy_gross AS \
             SELECT m.title, m.gross \
             FROM movie m \
             JOIN movie_genre mg ON mg.movie_id = m.movie_id \
             JOIN genre g ON g.genre_id = mg.genre_id \
             WHERE lower(g.name) = lower('Comedy') \
             ORDER BY (m.gross IS NULL), m.gross DESC, m.title \
             LIMIT 5",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE VIEW IF NOT EXISTS report_actor_director_collab AS \
             SELECT m.title, m.year_start, m.gross \
             FROM movie m \
             JOIN movie_actor ma ON ma.movie_id = m.movie_id \
             JOIN actor a ON a.actor_id = ma.actor_id \
             JOIN movie_director md ON md.movie_id = m.movie_id \
             JOIN director d ON d.director_id = md.director_id \
             WHERE lower(a.name) = lower('Robert De Niro') \
               AND lower(d.name) = lower('Martin Scorsese') \
             ORDER BY (m.gross IS NULL), m.gross DESC, m.title",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        for view in [
            "report_actor_director_collab",
            "report_top_comedy_gross",
            "report_director_gross",
            "report_actor_filmography",
            "report_title_count",
        ] {
            conn.execute_unprepared(&format!("DROP VIEW IF EXISTS {view}")).await?;
        }
        Ok(())
    }
}
