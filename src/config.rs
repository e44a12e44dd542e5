use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub csv_path: PathBuf,
    pub max_actors: usize,
    pub print_reports: bool,
    pub report_actor: String,
    pub report_director: String,
    pub report_genre: String,
    pub report_top_n: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://movies.db?mode=rwc".to_string());

        let csv_path =
            std::env::var("MOVIES_CSV").unwrap_or_else(|_| "data/movies.csv".to_string());

        let max_actors: usize =
            std::env::var("MAX_ACTORS").ok().and_then(|s| s.parse().ok()).unwrap_or(20);

        let print_reports = std::env::var("PRINT_REPORTS")
            .map(|s| s == "1" || s.eq_ignore_ascii_case("true"))
            .unwrap_or(true);

        let report_actor =
            std::env::var("REPORT_ACTOR").unwrap_or_else(|_| "Robert De Niro".to_string());
        let report_director =
            std::env::var("REPORT_DIRECTOR").unwrap_or_else(|_| "Martin Scorsese".to_string());
        let report_genre = std::env::var("REPORT_GENRE").unwrap_or_else(|_| "Comedy".to_string());
        let report_top_n: u64 =
            std::env::var("REPORT_TOP_N").ok().and_then(|s| s.parse().ok()).unwrap_or(5);

        Ok(Self {
            database_url,
            csv_path: PathBuf::from(csv_path),
            max_actors,
            print_reports,
            report_actor,
            report_director,
            report_genre,
            report_top_n,
        })
    }
}
