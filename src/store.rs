use async_trait::async_trait;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Set, TransactionTrait,
    sea_query::OnConflict,
};

use crate::{
    entities::{actor, director, genre, movie, movie_actor, movie_director, movie_genre},
    error::AppResult,
    models::{EntityKind, MovieLinks, NormalizedMovie, ResolvedEntity},
};

/// Storage port for the pipeline. The SQL backend is the real store; tests
/// run the pipeline against an in-memory fake of this trait.
#[async_trait]
pub trait MovieStore {
    async fn upsert_movie(&self, movie: &NormalizedMovie, created_at: i64) -> AppResult<()>;

    /// Insert-if-absent by unique name; returns the entity id either way.
    async fn get_or_create_entity(
        &self,
        kind: EntityKind,
        entity: &ResolvedEntity,
    ) -> AppResult<String>;

    /// Insert-if-absent for one association pair.
    async fn link_association(
        &self,
        movie_id: &str,
        kind: EntityKind,
        entity_id: &str,
        billing_order: Option<i32>,
    ) -> AppResult<()>;

    /// One movie's complete write. Backends that can should make this
    /// atomic so a mid-write failure leaves no orphaned association.
    async fn store_movie(
        &self,
        movie: &NormalizedMovie,
        links: &MovieLinks,
        created_at: i64,
    ) -> AppResult<()> {
        self.upsert_movie(movie, created_at).await?;
        for entity in &links.directors {
            let id = self.get_or_create_entity(EntityKind::Director, entity).await?;
            self.link_association(&movie.movie_id, EntityKind::Director, &id, None).await?;
        }
        for (i, entity) in links.actors.iter().enumerate() {
            let id = self.get_or_create_entity(EntityKind::Actor, entity).await?;
            self.link_association(&movie.movie_id, EntityKind::Actor, &id, Some(i as i32 + 1))
                .await?;
        }
        for entity in &links.genres {
            let id = self.get_or_create_entity(EntityKind::Genre, entity).await?;
            self.link_association(&movie.movie_id, EntityKind::Genre, &id, None).await?;
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct SqlStore {
    db: DatabaseConnection,
}

impl SqlStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl MovieStore for SqlStore {
    async fn upsert_movie(&self, movie: &NormalizedMovie, created_at: i64) -> AppResult<()> {
        Ok(upsert_movie_on(&self.db, movie, created_at).await?)
    }

    async fn get_or_create_entity(
        &self,
        kind: EntityKind,
        entity: &ResolvedEntity,
    ) -> AppResult<String> {
        insert_entity_on(&self.db, kind, entity).await?;
        Ok(entity.id.clone())
    }

    async fn link_association(
        &self,
        movie_id: &str,
        kind: EntityKind,
        entity_id: &str,
        billing_order: Option<i32>,
    ) -> AppResult<()> {
        Ok(link_on(&self.db, movie_id, kind, entity_id, billing_order).await?)
    }

    async fn store_movie(
        &self,
        movie: &NormalizedMovie,
        links: &MovieLinks,
        created_at: i64,
    ) -> AppResult<()> {
        let txn = self.db.begin().await?;

        upsert_movie_on(&txn, movie, created_at).await?;
        for entity in &links.directors {
            insert_entity_on(&txn, EntityKind::Director, entity).await?;
            link_on(&txn, &movie.movie_id, EntityKind::Director, &entity.id, None).await?;
        }
        for (i, entity) in links.actors.iter().enumerate() {
            insert_entity_on(&txn, EntityKind::Actor, entity).await?;
            link_on(&txn, &movie.movie_id, EntityKind::Actor, &entity.id, Some(i as i32 + 1))
                .await?;
        }
        for entity in &links.genres {
            insert_entity_on(&txn, EntityKind::Genre, entity).await?;
            link_on(&txn, &movie.movie_id, EntityKind::Genre, &entity.id, None).await?;
        }

        txn.commit().await?;
        Ok(())
    }
}

async fn upsert_movie_on<C: ConnectionTrait>(
    conn: &C,
    m: &NormalizedMovie,
    created_at: i64,
) -> Result<(), DbErr> {
    let model = movie::ActiveModel {
        movie_id: Set(m.movie_id.clone()),
        title: Set(m.title.clone()),
        year_start: Set(m.year_start),
        year_end: Set(m.year_end),
        rating: Set(m.rating),
        gross: Set(m.gross),
        runtime_min: Set(m.runtime_min),
        description: Set(m.description.clone()),
        raw_row: Set(m.raw_row.to_string()),
        created_at: Set(created_at),
    };

    // raw_row and created_at are write-once snapshots, so the conflict
    // clause updates only the typed columns.
    movie::Entity::insert(model)
        .on_conflict(
            OnConflict::column(movie::Column::MovieId)
                .update_columns([
                    movie::Column::Title,
                    movie::Column::YearStart,
                    movie::Column::YearEnd,
                    movie::Column::Rating,
                    movie::Column::Gross,
                    movie::Column::RuntimeMin,
                    movie::Column::Description,
                ])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

// Insert-or-ignore keeps this conflict-safe even if two ingestion runs
// race on first sighting of a name.
async fn insert_entity_on<C: ConnectionTrait>(
    conn: &C,
    kind: EntityKind,
    entity: &ResolvedEntity,
) -> Result<(), DbErr> {
    match kind {
        EntityKind::Director => {
            let model = director::ActiveModel {
                director_id: Set(entity.id.clone()),
                name: Set(entity.name.clone()),
            };
            director::Entity::insert(model)
                .on_conflict(
                    OnConflict::column(director::Column::DirectorId).do_nothing().to_owned(),
                )
                .exec_without_returning(conn)
                .await?;
        }
        EntityKind::Actor => {
            let model = actor::ActiveModel {
                actor_id: Set(entity.id.clone()),
                name: Set(entity.name.clone()),
            };
            actor::Entity::insert(model)
                .on_conflict(OnConflict::column(actor::Column::ActorId).do_nothing().to_owned())
                .exec_without_returning(conn)
                .await?;
        }
        EntityKind::Genre => {
            let model = genre::ActiveModel {
                genre_id: Set(entity.id.clone()),
                name: Set(entity.name.clone()),
            };
            genre::Entity::insert(model)
                .on_conflict(OnConflict::column(genre::Column::GenreId).do_nothing().to_owned())
                .exec_without_returning(conn)
                .await?;
        }
    }
    Ok(())
}

async fn link_on<C: ConnectionTrait>(
    conn: &C,
    movie_id: &str,
    kind: EntityKind,
    entity_id: &str,
    billing_order: Option<i32>,
) -> Result<(), DbErr> {
    match kind {
        EntityKind::Director => {
            let model = movie_director::ActiveModel {
                movie_id: Set(movie_id.to_string()),
                director_id: Set(entity_id.to_string()),
            };
            movie_director::Entity::insert(model)
                .on_conflict(
                    OnConflict::columns([
                        movie_director::Column::MovieId,
                        movie_director::Column::DirectorId,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(conn)
                .await?;
        }
        EntityKind::Actor => {
            let model = movie_actor::ActiveModel {
                movie_id: Set(movie_id.to_string()),
                actor_id: Set(entity_id.to_string()),
                billing_order: Set(billing_order),
            };
            movie_actor::Entity::insert(model)
                .on_conflict(
                    OnConflict::columns([
                        movie_actor::Column::MovieId,
                        movie_actor::Column::ActorId,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(conn)
                .await?;
        }
        EntityKind::Genre => {
            let model = movie_genre::ActiveModel {
                movie_id: Set(movie_id.to_string()),
                genre_id: Set(entity_id.to_string()),
            };
            movie_genre::Entity::insert(model)
                .on_conflict(
                    OnConflict::columns([
                        movie_genre::Column::MovieId,
                        movie_genre::Column::GenreId,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(conn)
                .await?;
        }
    }
    Ok(())
}

pub fn now_sec() -> i64 {
    jiff::Timestamp::now().as_second()
}
