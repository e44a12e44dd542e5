use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    models::{EntityKind, MovieLinks, NormalizedMovie, ResolvedEntity},
    normalize::collapse_whitespace,
};

/// Maps variably-cased name strings onto one canonical identifier per
/// entity. Identifiers are derived from the normalized name, so they are
/// stable across movies and across ingestion runs; the first-seen casing
/// is kept as the display name.
#[derive(Debug, Default)]
pub struct EntityResolver {
    seen: HashMap<(EntityKind, String), ResolvedEntity>,
}

impl EntityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, kind: EntityKind, raw_name: &str) -> Option<ResolvedEntity> {
        let display = collapse_whitespace(raw_name);
        if display.is_empty() {
            return None;
        }
        let key = display.to_lowercase();
        let entry = self
            .seen
            .entry((kind, key.clone()))
            .or_insert_with(|| ResolvedEntity { id: entity_id(kind, &key), name: display });
        Some(entry.clone())
    }

    /// Resolves all of a movie's entity references, deduplicating within
    /// the movie. Actor order is preserved for billing.
    pub fn resolve_movie(&mut self, movie: &NormalizedMovie) -> MovieLinks {
        MovieLinks {
            directors: self.resolve_all(EntityKind::Director, &movie.directors),
            actors: self.resolve_all(EntityKind::Actor, &movie.actors),
            genres: self.resolve_all(EntityKind::Genre, &movie.genres),
        }
    }

    fn resolve_all(&mut self, kind: EntityKind, names: &[String]) -> Vec<ResolvedEntity> {
        let mut out: Vec<ResolvedEntity> = Vec::new();
        for name in names {
            if let Some(entity) = self.resolve(kind, name) {
                if !out.iter().any(|e| e.id == entity.id) {
                    out.push(entity);
                }
            }
        }
        out
    }
}

fn entity_id(kind: EntityKind, normalized_name: &str) -> String {
    let key = format!("{}:{}", kind.as_str(), normalized_name);
    Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_variants_share_one_identity() {
        let mut resolver = EntityResolver::new();
        let first = resolver.resolve(EntityKind::Actor, "Lena Headey").unwrap();
        let second = resolver.resolve(EntityKind::Actor, "LENA   HEADEY").unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.name, "Lena Headey");
    }

    #[test]
    fn identity_is_stable_across_resolver_instances() {
        let a = EntityResolver::new().resolve(EntityKind::Genre, "Comedy").unwrap();
        let b = EntityResolver::new().resolve(EntityKind::Genre, "comedy").unwrap();
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn kinds_do_not_collide() {
        let mut resolver = EntityResolver::new();
        let director = resolver.resolve(EntityKind::Director, "Jordan Peele").unwrap();
        let actor = resolver.resolve(EntityKind::Actor, "Jordan Peele").unwrap();
        assert_ne!(director.id, actor.id);
    }

    #[test]
    fn movie_links_dedupe_and_keep_billing_order() {
        let mut resolver = EntityResolver::new();
        let movie = NormalizedMovie {
            movie_id: "m".into(),
            title: "t".into(),
            year_start: None,
            year_end: None,
            rating: None,
            gross: None,
            runtime_min: None,
            description: None,
            raw_row: serde_json::Value::Null,
            directors: vec![],
            actors: vec![
                "Robert De Niro".into(),
                "Al Pacino".into(),
                "robert de niro".into(),
            ],
            genres: vec!["Crime".into(), "crime".into()],
        };
        let links = resolver.resolve_movie(&movie);
        assert_eq!(links.actors.len(), 2);
        assert_eq!(links.actors[0].name, "Robert De Niro");
        assert_eq!(links.actors[1].name, "Al Pacino");
        assert_eq!(links.genres.len(), 1);
    }

    #[test]
    fn blank_names_resolve_to_nothing() {
        let mut resolver = EntityResolver::new();
        assert!(resolver.resolve(EntityKind::Genre, "   ").is_none());
    }
}
