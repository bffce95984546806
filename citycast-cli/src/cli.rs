use anyhow::{Context, bail};
use citycast_core::{Config, LatestOnly, LookupError, OpenMeteoClient, WeatherLookup, WeatherRecord};
use clap::{Parser, Subcommand};
use inquire::{CustomType, InquireError, Select, Text};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{sync::mpsc, task::JoinSet};

use crate::render::Report;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "citycast", version, about = "Current weather for a city")]
pub struct Cli {
    /// Use this config file instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current weather for a city.
    Show {
        /// City name; prompted for if absent.
        city: Option<String>,

        /// Print the record and theme as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Pick one of the configured quick cities.
    Quick {
        #[arg(long)]
        json: bool,
    },

    /// Keep prompting for cities; only the latest search is shown.
    Interactive,

    /// Edit and save the configuration.
    Configure,

    /// Print the config file location.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config_path = match self.config {
            Some(path) => path,
            None => Config::config_file_path()?,
        };

        match self.command {
            Command::Show { city, json } => {
                let config = Config::load_from(&config_path)?;
                let city = match city {
                    Some(c) => c,
                    None => Text::new("City:").prompt()?,
                };
                show(&config, &city, json).await
            }
            Command::Quick { json } => {
                let config = Config::load_from(&config_path)?;
                if config.quick_cities.is_empty() {
                    bail!("No quick cities configured.\nHint: run `citycast configure` to add some.");
                }
                let city = Select::new("City:", config.quick_cities.clone()).prompt()?;
                show(&config, &city, json).await
            }
            Command::Interactive => {
                let config = Config::load_from(&config_path)?;
                interactive(&config).await
            }
            Command::Configure => configure(load_for_edit(&config_path), &config_path),
            Command::ConfigPath => {
                println!("{}", config_path.display());
                Ok(())
            }
        }
    }
}

async fn show(config: &Config, city: &str, json: bool) -> anyhow::Result<()> {
    let client = OpenMeteoClient::from_config(config)?;
    let record = client.lookup(city).await?;

    print_record(&record, json)
}

fn print_record(record: &WeatherRecord, json: bool) -> anyhow::Result<()> {
    let report = Report::new(record);
    if json {
        println!("{}", report.to_json().context("Failed to serialize report")?);
    } else {
        println!("{}", report.to_text());
    }
    Ok(())
}

/// Each search runs in the background; a newer search makes older ones stale,
/// and stale results are dropped instead of printed.
async fn interactive(config: &Config) -> anyhow::Result<()> {
    let client = Arc::new(OpenMeteoClient::from_config(config)?);
    let (tx, rx) = mpsc::channel(8);

    let prompter = tokio::task::spawn_blocking(move || read_cities(&tx));
    run_searches(client, rx, print_outcome).await?;
    prompter.await?
}

/// Prompt until an empty line, Esc or Ctrl-C.
fn read_cities(tx: &mpsc::Sender<String>) -> anyhow::Result<()> {
    loop {
        match Text::new("City (empty to quit):").prompt_skippable() {
            Ok(Some(city)) if !city.trim().is_empty() => {
                if tx.blocking_send(city).is_err() {
                    return Ok(());
                }
            }
            Ok(_) | Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn print_outcome(outcome: Result<WeatherRecord, LookupError>) {
    match outcome {
        Ok(record) => println!("{}", Report::new(&record).to_text()),
        Err(e) => eprintln!("{}", e.user_message()),
    }
}

/// Look up every city received on `cities`, reporting only results whose
/// search is still the latest one started. Returns once `cities` is closed
/// and every search has finished.
async fn run_searches<L, F>(
    lookup: Arc<L>,
    mut cities: mpsc::Receiver<String>,
    report: F,
) -> anyhow::Result<()>
where
    L: WeatherLookup + 'static,
    F: Fn(Result<WeatherRecord, LookupError>) + Send + Sync + 'static,
{
    let guard = LatestOnly::new();
    let report = Arc::new(report);
    let mut searches = JoinSet::new();

    while let Some(city) = cities.recv().await {
        let ticket = guard.start();
        let lookup = Arc::clone(&lookup);
        let guard = guard.clone();
        let report = Arc::clone(&report);

        searches.spawn(async move {
            let result = lookup.lookup(&city).await;
            if let Some(outcome) = guard.accept(&ticket, result) {
                report(outcome);
            }
        });
    }

    while let Some(done) = searches.join_next().await {
        done.context("search task failed")?;
    }

    Ok(())
}

/// Config to start `configure` from. A file that fails to load is reported
/// and replaced by defaults, so `configure` can repair it.
fn load_for_edit(path: &Path) -> Config {
    Config::load_from(path).unwrap_or_else(|err| {
        tracing::warn!("{err:#}");
        eprintln!("Ignoring unusable config, starting from defaults: {err:#}");
        Config::default()
    })
}

fn configure(mut config: Config, path: &Path) -> anyhow::Result<()> {
    config.geocoding_url = Text::new("Geocoding endpoint:")
        .with_default(&config.geocoding_url)
        .prompt()?;
    config.weather_url = Text::new("Weather endpoint:")
        .with_default(&config.weather_url)
        .prompt()?;

    let mut timeout = CustomType::<u64>::new("Request timeout in seconds (Esc to keep):")
        .with_error_message("Please type a whole number of seconds");
    if let Some(secs) = config.timeout_secs {
        timeout = timeout.with_default(secs);
    }
    config.timeout_secs = keep_if_skipped(config.timeout_secs, timeout.prompt_skippable()?);

    let cities = Text::new("Quick cities (comma separated):")
        .with_default(&config.quick_cities.join(", "))
        .prompt()?;
    config.quick_cities = parse_city_list(&cities);

    config.validate()?;
    config.save_to(path)?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

fn keep_if_skipped<T>(current: Option<T>, answer: Option<T>) -> Option<T> {
    answer.or(current)
}

fn parse_city_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect()
}

/// Exit status for a failed lookup, so scripts can tell failures apart.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<LookupError>() {
        Some(LookupError::EmptyInput) => 2,
        Some(LookupError::CityNotFound(_)) => 3,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::{sync::Mutex, time::Duration};

    #[derive(Debug)]
    struct FakeLookup;

    #[async_trait]
    impl WeatherLookup for FakeLookup {
        async fn lookup(&self, city: &str) -> Result<WeatherRecord, LookupError> {
            match city {
                "boom" => panic!("lookup blew up"),
                "Nowhere" => Err(LookupError::CityNotFound(city.to_string())),
                _ => {
                    if city == "Slow" {
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                    Ok(record(city))
                }
            }
        }
    }

    fn record(city: &str) -> WeatherRecord {
        WeatherRecord {
            city: city.to_string(),
            temperature: 18,
            description: "Partly cloudy".to_string(),
        }
    }

    type Outcomes = Arc<Mutex<Vec<Result<WeatherRecord, LookupError>>>>;

    async fn search_all(cities: &[&str]) -> (anyhow::Result<()>, Outcomes) {
        let (tx, rx) = mpsc::channel(cities.len().max(1));
        for city in cities {
            tx.send(city.to_string()).await.unwrap();
        }
        drop(tx);

        let outcomes: Outcomes = Arc::default();
        let sink = Arc::clone(&outcomes);
        let result = run_searches(Arc::new(FakeLookup), rx, move |outcome| {
            sink.lock().unwrap().push(outcome);
        })
        .await;

        (result, outcomes)
    }

    #[tokio::test]
    async fn last_search_is_reported_before_returning() {
        let (result, outcomes) = search_all(&["Paris"]).await;

        result.unwrap();
        assert_eq!(*outcomes.lock().unwrap(), vec![Ok(record("Paris"))]);
    }

    #[tokio::test]
    async fn slower_older_search_is_dropped() {
        let (result, outcomes) = search_all(&["Slow", "Fast"]).await;

        result.unwrap();
        assert_eq!(*outcomes.lock().unwrap(), vec![Ok(record("Fast"))]);
    }

    #[tokio::test]
    async fn failed_search_is_reported() {
        let (result, outcomes) = search_all(&["Nowhere"]).await;

        result.unwrap();
        assert_eq!(
            *outcomes.lock().unwrap(),
            vec![Err(LookupError::CityNotFound("Nowhere".into()))]
        );
    }

    #[tokio::test]
    async fn panicking_search_surfaces_as_error() {
        let (result, outcomes) = search_all(&["boom"]).await;

        assert!(result.unwrap_err().to_string().contains("search task failed"));
        assert!(outcomes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn no_input_means_no_searches() {
        let (result, outcomes) = search_all(&[]).await;

        result.unwrap();
        assert!(outcomes.lock().unwrap().is_empty());
    }

    fn invalid_config() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "weather_url = \"forecast\"\n").unwrap();
        (dir, path)
    }

    #[tokio::test]
    async fn config_path_works_with_invalid_config() {
        let (_dir, path) = invalid_config();
        let cli = Cli::try_parse_from(["citycast", "--config", path.to_str().unwrap(), "config-path"])
            .unwrap();

        cli.run().await.unwrap();
    }

    #[tokio::test]
    async fn lookups_still_reject_invalid_config() {
        let (_dir, path) = invalid_config();
        let cli = Cli::try_parse_from(["citycast", "--config", path.to_str().unwrap(), "show", "Paris"])
            .unwrap();

        let err = cli.run().await.unwrap_err();
        assert!(format!("{err:#}").contains("weather_url is not a valid URL"));
    }

    #[test]
    fn configure_starts_from_defaults_when_config_is_invalid() {
        let (_dir, path) = invalid_config();
        assert_eq!(load_for_edit(&path), Config::default());
    }

    #[test]
    fn configure_starts_from_saved_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let saved = Config { timeout_secs: Some(7), ..Config::default() };
        saved.save_to(&path).unwrap();

        assert_eq!(load_for_edit(&path), saved);
    }

    #[test]
    fn skipped_timeout_keeps_current_value() {
        assert_eq!(keep_if_skipped(Some(10), None), Some(10));
        assert_eq!(keep_if_skipped(Some(10), Some(3)), Some(3));
        assert_eq!(keep_if_skipped(None::<u64>, None), None);
    }

    #[test]
    fn city_list_is_trimmed_and_skips_blanks() {
        assert_eq!(
            parse_city_list(" London, ,New York,Tokyo ,"),
            vec!["London", "New York", "Tokyo"]
        );
        assert!(parse_city_list("").is_empty());
    }

    #[test]
    fn show_parses_city_and_json_flag() {
        let cli = Cli::try_parse_from(["citycast", "show", "Paris", "--json"]).unwrap();
        match cli.command {
            Command::Show { city, json } => {
                assert_eq!(city.as_deref(), Some("Paris"));
                assert!(json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["citycast", "config-path", "--config", "/tmp/c.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
    }

    #[test]
    fn exit_codes_distinguish_lookup_failures() {
        assert_eq!(exit_code(&LookupError::EmptyInput.into()), 2);
        assert_eq!(exit_code(&LookupError::CityNotFound("x".into()).into()), 3);
        assert_eq!(exit_code(&LookupError::NetworkError("x".into()).into()), 1);
        assert_eq!(exit_code(&anyhow::anyhow!("other")), 1);
    }
}
