use tracing::{debug, info, warn};

use crate::{
    error::AppResult,
    models::RunSummary,
    normalize,
    reader::RowReader,
    resolver::EntityResolver,
    store::{self, MovieStore},
};

/// Single-pass batch run: reader -> normalizer -> resolver -> store.
/// Parse trouble nulls fields, decode trouble skips rows, store trouble
/// skips movies; only an unreadable source or store aborts the run.
pub async fn run<S: MovieStore + Sync>(
    reader: &RowReader,
    store: &S,
    max_actors: usize,
) -> AppResult<RunSummary> {
    info!(path = %reader.path().display(), "starting ingestion run");

    let mut summary = RunSummary::default();
    let mut resolver = EntityResolver::new();

    let mut records = reader.records()?;
    for record in records.by_ref() {
        summary.read += 1;

        let Some(movie) = normalize::normalize_record(&record, max_actors) else {
            warn!(line = record.line, "row rejected: no usable title");
            summary.skipped += 1;
            continue;
        };

        let links = resolver.resolve_movie(&movie);
        match store.store_movie(&movie, &links, store::now_sec()).await {
            Ok(()) => {
                debug!(title = %movie.title, "loaded movie");
                summary.loaded += 1;
            }
            Err(err) => {
                warn!(title = %movie.title, error = %err, "failed to load movie");
                summary.failed += 1;
            }
        }
    }

    let undecodable = records.skipped();
    summary.read += undecodable;
    summary.skipped += undecodable;

    info!(
        read = summary.read,
        skipped = summary.skipped,
        failed = summary.failed,
        loaded = summary.loaded,
        "ingestion run complete"
    );
    Ok(summary)
}
