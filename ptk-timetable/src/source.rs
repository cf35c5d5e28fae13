use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use reqwest::{Client, Url};
use tracing::info;

use crate::schedule::IDENTITY_COLUMNS;

/// Where the exported timetable is read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
  File(PathBuf),
  Url(Url),
}

impl FromStr for Source {
  type Err = anyhow::Error;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    let value = value.trim();
    if value.is_empty() {
      return Err(anyhow!("data source must not be empty"));
    }

    if value.starts_with("http://") || value.starts_with("https://") {
      return Ok(Self::Url(Url::parse(value)?));
    }

    Ok(Self::File(PathBuf::from(value)))
  }
}

impl Display for Source {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::File(path) => write!(f, "{}", path.display()),
      Self::Url(url) => write!(f, "{}", url),
    }
  }
}

impl Source {
  pub async fn fetch(&self, client: &Client) -> anyhow::Result<String> {
    let text = match self {
      Self::File(path) => tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("unable to read {}", path.display()))?,
      Self::Url(url) => client
        .get(url.clone())
        .send()
        .await?
        .error_for_status()?
        .text()
        .await
        .with_context(|| format!("unable to download {}", url))?,
    };

    info!("Fetched {} bytes from {}", text.len(), self);

    Ok(text)
  }
}

/// One line of the exported file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
  headers: Arc<[String]>,
  values: Vec<String>,
}

impl Row {
  pub fn new(headers: Arc<[String]>, values: Vec<String>) -> Self {
    Self { headers, values }
  }

  /// Builds a row from `(column, value)` pairs.
  pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
    let (headers, values): (Vec<String>, Vec<String>) = pairs
      .into_iter()
      .map(|(column, value)| (column.to_string(), value.to_string()))
      .unzip();

    Self {
      headers: headers.into(),
      values,
    }
  }

  /// Value of a column, `None` if the column is missing or empty.
  pub fn get(&self, column: &str) -> Option<&str> {
    let index = self.headers.iter().position(|header| header == column)?;
    self
      .values
      .get(index)
      .map(String::as_str)
      .filter(|value| !value.is_empty())
  }

  /// First non-empty value of the given columns.
  pub fn first_of(&self, columns: &[&str]) -> Option<&str> {
    columns.iter().find_map(|column| self.get(column))
  }

  pub fn columns(&self) -> impl Iterator<Item = (&str, &str)> {
    self
      .headers
      .iter()
      .zip(&self.values)
      .map(|(header, value)| (header.as_str(), value.as_str()))
  }
}

/// Parses comma separated text with a header line into rows.
pub fn parse_rows(text: &str) -> anyhow::Result<Vec<Row>> {
  let text = text.strip_prefix('\u{feff}').unwrap_or(text);

  let mut reader = csv::ReaderBuilder::new()
    .has_headers(true)
    .flexible(true)
    .from_reader(text.as_bytes());

  let headers: Arc<[String]> = reader
    .headers()
    .context("unable to read header line")?
    .iter()
    .map(|header| header.trim().to_string())
    .collect::<Vec<String>>()
    .into();

  if !IDENTITY_COLUMNS
    .iter()
    .any(|column| headers.iter().any(|header| header == column))
  {
    return Err(anyhow!(
      "header line is missing a class column ({})",
      IDENTITY_COLUMNS.join(" or ")
    ));
  }

  let mut rows = Vec::new();
  for (index, record) in reader.records().enumerate() {
    let record = record.with_context(|| format!("malformed record {}", index + 1))?;

    if record.iter().all(|value| value.trim().is_empty()) {
      continue;
    }

    rows.push(Row::new(
      headers.clone(),
      record.iter().map(str::to_string).collect(),
    ));
  }

  Ok(rows)
}
