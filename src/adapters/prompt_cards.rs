use std::io::{self, Write};

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};

use crate::core::expiration::parse_expiration;
use crate::domain::model::Card;
use crate::domain::ports::CardSource;
use crate::utils::error::{PayError, Result};

const DONE_SENTINEL: &str = "done";

/// Interactive card entry: one card per round of prompts, produced lazily as
/// the orchestrator asks for them. Entry ends at the `done` sentinel
/// (case-insensitive) or EOF on the card-number prompt; EOF in the middle of
/// a card is an error. Each prompt consumes its line of input exactly once,
/// so the source is not restartable.
pub struct PromptCardSource<R> {
    input: R,
    zip: String,
    finished: bool,
}

impl PromptCardSource<BufReader<Stdin>> {
    pub fn stdin(zip: String) -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), zip)
    }
}

impl<R: AsyncBufRead + Unpin + Send> PromptCardSource<R> {
    pub fn new(input: R, zip: String) -> Self {
        Self {
            input,
            zip,
            finished: false,
        }
    }

    /// Prints the prompt and reads one trimmed line; `None` means EOF.
    async fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        print!("{text}");
        io::stdout().flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    async fn prompt_required(&mut self, text: &str) -> Result<String> {
        self.prompt(text).await?.ok_or_else(|| {
            PayError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input ended in the middle of a card",
            ))
        })
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> CardSource for PromptCardSource<R> {
    async fn next_card(&mut self) -> Result<Option<Card>> {
        if self.finished {
            return Ok(None);
        }

        let number = match self.prompt("Card Number (or \"done\" to finish): ").await? {
            // EOF on the number prompt counts as done
            None => {
                self.finished = true;
                return Ok(None);
            }
            Some(entry) if entry.eq_ignore_ascii_case(DONE_SENTINEL) => {
                self.finished = true;
                return Ok(None);
            }
            Some(entry) => entry,
        };

        let raw_expiration = self
            .prompt_required("Expiration Date (MM/YY or MMYY): ")
            .await?;
        let (exp_month, exp_year) = parse_expiration(&raw_expiration)?;
        let cvv = self.prompt_required("CVV: ").await?;

        Ok(Some(Card {
            number,
            exp_month,
            exp_year,
            cvv,
            zip: self.zip.clone(),
        }))
    }
}
