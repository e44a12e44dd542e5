use tracing::warn;
use uuid::Uuid;

use crate::models::{NormalizedMovie, RawFields, RawRecord};

/// Converts one raw record into a typed movie plus raw entity-name lists.
/// Returns `None` when the row has no usable title; every other field
/// failure degrades to null with the raw value kept in the snapshot.
pub fn normalize_record(raw: &RawRecord, max_actors: usize) -> Option<NormalizedMovie> {
    let fields = &raw.fields;

    let title = field(fields, "movies");
    let title = if title.is_empty() { field(fields, "title") } else { title };
    let title = title.trim();
    if title.is_empty() || title.eq_ignore_ascii_case("nan") {
        return None;
    }

    let (year_start, year_end) = parse_year_span(field(fields, "year"));
    if let (Some(start), Some(end)) = (year_start, year_end) {
        debug_assert!(end >= start);
    }

    let (_votes, runtime_raw, gross_raw) = repair_column_shift(
        field(fields, "votes"),
        field(fields, "runtime"),
        field(fields, "gross"),
    );

    let rating_raw = field(fields, "rating");
    let rating = parse_rating(rating_raw);
    if rating.is_none() && !rating_raw.is_empty() && !rating_raw.eq_ignore_ascii_case("nan") {
        warn!(line = raw.line, rating = %rating_raw, "unparseable rating, storing null");
    }

    let gross = clean_numeric(&gross_raw);
    let runtime_min = clean_numeric(&runtime_raw).map(|v| v as i32);

    let description = fields
        .get("one-line")
        .or_else(|| fields.get("description"))
        .map(|s| collapse_whitespace(s))
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("nan"));

    let (director_part, stars_part) = split_credits(field(fields, "stars"));
    let directors_src = match fields.get("director") {
        Some(col) if !col.is_empty() => Some(col.clone()),
        _ => director_part,
    };
    let directors = directors_src.map(|s| split_multi_value(&s)).unwrap_or_default();
    let mut actors = stars_part.map(|s| split_multi_value(&s)).unwrap_or_default();
    actors.truncate(max_actors);

    let genres = split_multi_value(&field(fields, "genre").replace('\n', ""));

    Some(NormalizedMovie {
        movie_id: derive_movie_id(title, year_start),
        title: title.to_string(),
        year_start,
        year_end,
        rating,
        gross,
        runtime_min,
        description,
        raw_row: serde_json::to_value(fields).unwrap_or_default(),
        directors,
        actors,
        genres,
    })
}

fn field<'a>(fields: &'a RawFields, name: &str) -> &'a str {
    fields.get(name).map(String::as_str).unwrap_or("")
}

/// First 4-digit run is the start year, a second one is the end year.
/// An open range (`(2013– )`) has no second run, so the end stays null.
/// An end before the start is a source typo and is discarded.
pub fn parse_year_span(raw: &str) -> (Option<i32>, Option<i32>) {
    let mut runs = four_digit_runs(raw).into_iter();
    let start = runs.next();
    let end = runs.next().filter(|e| match start {
        Some(s) => *e >= s,
        None => true,
    });
    (start, end)
}

fn four_digit_runs(raw: &str) -> Vec<i32> {
    let mut runs = Vec::new();
    let mut digits = String::new();
    for c in raw.chars().chain(std::iter::once(' ')) {
        if c.is_ascii_digit() {
            digits.push(c);
        } else {
            if digits.len() == 4 {
                if let Ok(year) = digits.parse() {
                    runs.push(year);
                }
            }
            digits.clear();
        }
    }
    runs
}

/// Strips currency symbols, thousands separators and unit suffixes, then
/// parses what remains. An empty result is null, never an error.
pub fn clean_numeric(raw: &str) -> Option<f64> {
    let cleaned: String =
        raw.chars().filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-').collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    cleaned.parse().ok()
}

/// Ratings outside the 0..=10 scale are treated as unparseable.
pub fn parse_rating(raw: &str) -> Option<f64> {
    clean_numeric(raw).filter(|r| (0.0..=10.0).contains(r))
}

/// Splits a multi-value cell on `;`, `|` or `,`, dropping empties and the
/// source's `nan`/`Unknown` placeholders.
pub fn split_multi_value(raw: &str) -> Vec<String> {
    raw.split([';', '|', ','])
        .map(str::trim)
        .filter(|p| {
            !p.is_empty() && !p.eq_ignore_ascii_case("nan") && !p.eq_ignore_ascii_case("unknown")
        })
        .map(str::to_string)
        .collect()
}

/// The source `stars` column interleaves credits:
/// `Director: X | Stars: A, B`. Either segment may be missing; with no
/// markers at all the whole field is the cast list.
pub fn split_credits(raw: &str) -> (Option<String>, Option<String>) {
    let collapsed = collapse_whitespace(raw);
    if collapsed.is_empty() || collapsed.eq_ignore_ascii_case("nan") {
        return (None, None);
    }
    let lower = collapsed.to_ascii_lowercase();

    let director_marker = find_marker(&lower, &["directors:", "director:"]);
    let stars_marker = find_marker(&lower, &["stars:", "star:"]);

    let directors = director_marker.map(|(pos, len)| {
        let tail = &collapsed[pos + len..];
        let tail = match stars_marker {
            Some((spos, _)) if spos > pos => &collapsed[pos + len..spos],
            _ => tail,
        };
        tail.trim().trim_end_matches('|').trim().to_string()
    });

    let stars = match stars_marker {
        Some((pos, len)) => Some(collapsed[pos + len..].trim().to_string()),
        None if director_marker.is_none() => Some(collapsed),
        None => None,
    };

    (directors.filter(|s| !s.is_empty()), stars.filter(|s| !s.is_empty()))
}

fn find_marker(haystack: &str, markers: &[&str]) -> Option<(usize, usize)> {
    markers.iter().find_map(|m| haystack.find(m).map(|pos| (pos, m.len())))
}

/// Some source rows shift one column left: the votes cell holds
/// `votes,runtime` and the runtime cell holds the gross. The currency
/// marker in the runtime cell is the tell.
pub fn repair_column_shift(votes: &str, runtime: &str, gross: &str) -> (String, String, String) {
    let shifted = runtime.contains('$') && gross.trim().is_empty();
    if !shifted {
        return (votes.to_string(), runtime.to_string(), gross.to_string());
    }
    let cleaned: String = votes.chars().filter(|c| c.is_ascii_digit() || *c == ',').collect();
    match cleaned.split_once(',') {
        Some((v, r)) if !r.is_empty() && !r.contains(',') => {
            (v.to_string(), r.to_string(), runtime.to_string())
        }
        _ => (cleaned, String::new(), runtime.to_string()),
    }
}

/// Deterministic movie identity: same title and start year always map to
/// the same id, which is what makes re-ingestion an upsert.
pub fn derive_movie_id(title: &str, year_start: Option<i32>) -> String {
    let key = match year_start {
        Some(year) => format!("movie:{}|{}", title.trim().to_lowercase(), year),
        None => format!("movie:{}", title.trim().to_lowercase()),
    };
    Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()).to_string()
}

pub fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> RawRecord {
        RawRecord {
            line: 2,
            fields: pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    #[test]
    fn single_year() {
        assert_eq!(parse_year_span("(2013)"), (Some(2013), None));
        assert_eq!(parse_year_span("2013"), (Some(2013), None));
    }

    #[test]
    fn closed_range_with_en_dash_or_hyphen() {
        assert_eq!(parse_year_span("(2010\u{2013}2022)"), (Some(2010), Some(2022)));
        assert_eq!(parse_year_span("(2010-2022)"), (Some(2010), Some(2022)));
    }

    #[test]
    fn open_range_has_null_end() {
        assert_eq!(parse_year_span("(2013\u{2013} )"), (Some(2013), None));
        assert_eq!(parse_year_span("(2013- )"), (Some(2013), None));
    }

    #[test]
    fn no_year_is_accepted_as_null() {
        assert_eq!(parse_year_span(""), (None, None));
        assert_eq!(parse_year_span("TBA"), (None, None));
    }

    #[test]
    fn inverted_range_drops_the_end() {
        assert_eq!(parse_year_span("(2022\u{2013}2010)"), (Some(2022), None));
    }

    #[test]
    fn five_digit_runs_are_not_years() {
        assert_eq!(parse_year_span("(20134)"), (None, None));
    }

    #[test]
    fn currency_and_separators_strip_cleanly() {
        assert_eq!(clean_numeric("$1,234.50"), Some(1234.50));
        assert_eq!(clean_numeric("142 min"), Some(142.0));
        assert_eq!(clean_numeric("$75.47M"), Some(75.47));
        assert_eq!(clean_numeric(""), None);
        assert_eq!(clean_numeric("$,"), None);
    }

    #[test]
    fn rating_out_of_scale_is_null() {
        assert_eq!(parse_rating("8.2"), Some(8.2));
        assert_eq!(parse_rating("82"), None);
        assert_eq!(parse_rating("not rated"), None);
    }

    #[test]
    fn multi_value_split_handles_all_delimiters() {
        assert_eq!(
            split_multi_value("Action; Drama|Comedy, nan"),
            vec!["Action", "Drama", "Comedy"]
        );
        assert!(split_multi_value("Unknown").is_empty());
    }

    #[test]
    fn credits_split_out_director_and_cast() {
        let (d, s) = split_credits("Director: Frank Darabont | Stars: Andrew Lincoln, Lena Headey");
        assert_eq!(d.as_deref(), Some("Frank Darabont"));
        assert_eq!(s.as_deref(), Some("Andrew Lincoln, Lena Headey"));
    }

    #[test]
    fn credits_without_markers_are_all_cast() {
        let (d, s) = split_credits("Andrew Lincoln, Norman Reedus");
        assert_eq!(d, None);
        assert_eq!(s.as_deref(), Some("Andrew Lincoln, Norman Reedus"));
    }

    #[test]
    fn credits_with_director_only() {
        let (d, s) = split_credits("Director: Greta Gerwig");
        assert_eq!(d.as_deref(), Some("Greta Gerwig"));
        assert_eq!(s, None);
    }

    #[test]
    fn column_shift_moves_gross_back() {
        let (votes, runtime, gross) = repair_column_shift("1024,55", "$75.47M", "");
        assert_eq!(votes, "1024");
        assert_eq!(runtime, "55");
        assert_eq!(gross, "$75.47M");
    }

    #[test]
    fn unshifted_columns_pass_through() {
        let (votes, runtime, gross) = repair_column_shift("1,024", "55 min", "$75.47M");
        assert_eq!(votes, "1,024");
        assert_eq!(runtime, "55 min");
        assert_eq!(gross, "$75.47M");
    }

    #[test]
    fn movie_id_is_deterministic_and_case_insensitive() {
        assert_eq!(derive_movie_id("The Father", Some(2020)), derive_movie_id("the father", Some(2020)));
        assert_ne!(derive_movie_id("The Father", Some(2020)), derive_movie_id("The Father", Some(2021)));
    }

    #[test]
    fn normalizes_a_full_row() {
        let raw = record(&[
            ("movies", "The Walking Dead"),
            ("year", "(2010\u{2013}2022)"),
            ("genre", "Drama, Horror,\nThriller"),
            ("rating", "8.1"),
            ("one-line", "Sheriff Deputy Rick Grimes wakes up\nfrom a coma."),
            ("stars", "Director: Frank Darabont | Stars: Andrew Lincoln, Lena Headey"),
            ("votes", "885,805"),
            ("runtime", "44"),
            ("gross", "$1,234.50"),
        ]);

        let movie = normalize_record(&raw, 20).unwrap();
        assert_eq!(movie.title, "The Walking Dead");
        assert_eq!(movie.year_start, Some(2010));
        assert_eq!(movie.year_end, Some(2022));
        assert_eq!(movie.rating, Some(8.1));
        assert_eq!(movie.gross, Some(1234.50));
        assert_eq!(movie.runtime_min, Some(44));
        assert_eq!(movie.genres, vec!["Drama", "Horror", "Thriller"]);
        assert_eq!(movie.directors, vec!["Frank Darabont"]);
        assert_eq!(movie.actors, vec!["Andrew Lincoln", "Lena Headey"]);
        assert_eq!(
            movie.description.as_deref(),
            Some("Sheriff Deputy Rick Grimes wakes up from a coma.")
        );
        assert_eq!(movie.raw_row["gross"], "$1,234.50");
    }

    #[test]
    fn titleless_row_is_rejected() {
        assert!(normalize_record(&record(&[("year", "2010")]), 20).is_none());
        assert!(normalize_record(&record(&[("movies", "nan")]), 20).is_none());
    }

    #[test]
    fn cast_cap_applies() {
        let names = (1..=30).map(|i| format!("Actor {i}")).collect::<Vec<_>>().join(", ");
        let raw = record(&[("movies", "Crowded"), ("stars", &names)]);
        let movie = normalize_record(&raw, 20).unwrap();
        assert_eq!(movie.actors.len(), 20);
        assert_eq!(movie.actors[0], "Actor 1");
    }
}
