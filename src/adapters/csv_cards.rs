use std::collections::VecDeque;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::core::expiration::parse_expiration;
use crate::domain::model::Card;
use crate::domain::ports::CardSource;
use crate::utils::error::{PayError, Result};

/// Where the batch file comes from, in precedence order: explicit CLI flag,
/// then the `CARDS_CSV` setting, then `cards.csv` in the working directory.
pub fn resolve_cards_path(cli_path: Option<&Path>, configured: Option<&Path>) -> PathBuf {
    cli_path
        .or(configured)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("cards.csv"))
}

/// Intermediate row shape covering both accepted column sets; the `csv`
/// crate fills in `None` for headers the file doesn't have.
#[derive(Debug, Deserialize)]
struct CardRow {
    number: String,
    #[serde(rename = "expMonth")]
    exp_month: Option<String>,
    #[serde(rename = "expYear")]
    exp_year: Option<String>,
    expiration: Option<String>,
    exp: Option<String>,
    #[serde(rename = "expirationDate")]
    expiration_date: Option<String>,
    cvv: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExpirationColumns {
    /// `expMonth`/`expYear` are separate columns; values pass through verbatim.
    Split,
    /// A single combined column whose value goes through the expiration parser.
    Combined,
}

/// A finite card batch loaded eagerly from a CSV file. Any bad row fails the
/// whole load; a partially-usable batch is never returned. Cards come back in
/// file order with the run's billing zip attached to each.
pub struct CsvCardSource {
    cards: VecDeque<Card>,
}

impl CsvCardSource {
    pub fn load(path: &Path, zip: &str) -> Result<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => PayError::CardsFileNotFound {
                path: path.to_path_buf(),
            },
            _ => PayError::Io(e),
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers = reader.headers()?.clone();
        let has_column = |name: &str| headers.iter().any(|h| h == name);
        let columns = if has_column("expMonth") && has_column("expYear") {
            ExpirationColumns::Split
        } else if ["expiration", "exp", "expirationDate"]
            .iter()
            .any(|name| has_column(name))
        {
            ExpirationColumns::Combined
        } else {
            return Err(PayError::MissingExpirationColumns);
        };

        let mut cards = VecDeque::new();
        for row in reader.deserialize::<CardRow>() {
            let row = row?;
            let (exp_month, exp_year) = match columns {
                ExpirationColumns::Split => (
                    row.exp_month.unwrap_or_default(),
                    row.exp_year.unwrap_or_default(),
                ),
                ExpirationColumns::Combined => {
                    let raw = row
                        .expiration
                        .or(row.exp)
                        .or(row.expiration_date)
                        .unwrap_or_default();
                    parse_expiration(&raw)?
                }
            };
            cards.push_back(Card {
                number: row.number,
                exp_month,
                exp_year,
                cvv: row.cvv,
                zip: zip.to_string(),
            });
        }

        info!("loaded {} cards from {}", cards.len(), path.display());
        Ok(Self { cards })
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[async_trait]
impl CardSource for CsvCardSource {
    async fn next_card(&mut self) -> Result<Option<Card>> {
        Ok(self.cards.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    async fn drain(source: &mut CsvCardSource) -> Vec<Card> {
        let mut cards = Vec::new();
        while let Some(card) = source.next_card().await.unwrap() {
            cards.push(card);
        }
        cards
    }

    #[tokio::test]
    async fn split_columns_pass_through_verbatim() {
        let file = csv_file(
            "number,expMonth,expYear,cvv\n\
             4111111111111111,3,23,123\n\
             4222222222222222,12,27,456\n\
             4333333333333333,07,24,789\n",
        );
        let mut source = CsvCardSource::load(file.path(), "94720").unwrap();
        assert_eq!(source.len(), 3);

        let cards = drain(&mut source).await;
        assert_eq!(cards[0].number, "4111111111111111");
        // single-digit month stays unpadded until submission
        assert_eq!(cards[0].exp_month, "3");
        assert_eq!(cards[0].exp_year, "23");
        assert_eq!(cards[1].cvv, "456");
        assert_eq!(cards[2].number, "4333333333333333");
        assert!(cards.iter().all(|c| c.zip == "94720"));
    }

    #[tokio::test]
    async fn combined_column_goes_through_the_parser() {
        let file = csv_file(
            "number,expiration,cvv\n\
             4111111111111111,03/23,123\n\
             4222222222222222,3/23,456\n",
        );
        let mut source = CsvCardSource::load(file.path(), "94720").unwrap();
        let cards = drain(&mut source).await;
        assert_eq!(cards[0].exp_month, "03");
        assert_eq!(cards[0].exp_year, "23");
        assert_eq!(cards[1].exp_month, "3");
    }

    #[tokio::test]
    async fn exp_and_expiration_date_are_accepted_aliases() {
        for header in ["exp", "expirationDate"] {
            let file = csv_file(&format!(
                "number,{header},cvv\n4111111111111111,1227,123\n"
            ));
            let mut source = CsvCardSource::load(file.path(), "94720").unwrap();
            let cards = drain(&mut source).await;
            assert_eq!(cards[0].exp_month, "12", "header {header}");
            assert_eq!(cards[0].exp_year, "27", "header {header}");
        }
    }

    #[test]
    fn one_bad_expiration_fails_the_whole_load() {
        let file = csv_file(
            "number,expiration,cvv\n\
             4111111111111111,03/23,123\n\
             4222222222222222,12345,456\n\
             4333333333333333,04/24,789\n",
        );
        match CsvCardSource::load(file.path(), "94720") {
            Err(PayError::InvalidExpiration(raw)) => assert_eq!(raw, "12345"),
            other => panic!("expected InvalidExpiration, got {other:?}"),
        }
    }

    #[test]
    fn missing_expiration_columns_are_rejected() {
        let file = csv_file("number,cvv\n4111111111111111,123\n");
        assert!(matches!(
            CsvCardSource::load(file.path(), "94720"),
            Err(PayError::MissingExpirationColumns)
        ));
    }

    #[test]
    fn missing_file_reports_the_path() {
        let path = Path::new("definitely/not/here.csv");
        match CsvCardSource::load(path, "94720") {
            Err(PayError::CardsFileNotFound { path: p }) => {
                assert_eq!(p, path.to_path_buf());
            }
            other => panic!("expected CardsFileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn load_failures_allow_the_manual_fallback() {
        let err = CsvCardSource::load(Path::new("absent.csv"), "94720").unwrap_err();
        assert!(err.is_recoverable_load());
    }

    #[test]
    fn path_resolution_prefers_the_cli_argument() {
        let cli = PathBuf::from("from-cli.csv");
        let configured = PathBuf::from("from-env.csv");
        assert_eq!(
            resolve_cards_path(Some(&cli), Some(&configured)),
            PathBuf::from("from-cli.csv")
        );
        assert_eq!(
            resolve_cards_path(None, Some(&configured)),
            PathBuf::from("from-env.csv")
        );
        assert_eq!(resolve_cards_path(None, None), PathBuf::from("cards.csv"));
    }

    #[tokio::test]
    async fn empty_file_with_valid_headers_loads_an_empty_batch() {
        let file = csv_file("number,expMonth,expYear,cvv\n");
        let source = CsvCardSource::load(file.path(), "94720").unwrap();
        assert!(source.is_empty());
    }
}
