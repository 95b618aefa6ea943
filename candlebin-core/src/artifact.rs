//! Delimited result artifacts.
//!
//! An artifact is the `Date,open,high,low,close,volume` table produced for one
//! (symbol, interval) pair. Consumers such as charting clients depend on the
//! exact column names and order.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::interval::Granularity;
use crate::{CandleSeries, CandlebinError, Symbol};

/// Header of every artifact, in order.
pub const ARTIFACT_COLUMNS: [&str; 6] = ["Date", "open", "high", "low", "close", "volume"];

const DAILY_DATE_FORMAT: &str = "%Y-%m-%d";
const SUBDAY_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// File name of the artifact for a (symbol, interval) pair, e.g. `AAPL-15.csv`.
#[must_use]
pub fn artifact_name(symbol: &Symbol, requested_minutes: i64) -> String {
    format!("{symbol}-{requested_minutes}.csv")
}

/// Location of a produced artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactHandle {
    /// File name, e.g. `AAPL-15.csv`.
    pub name: String,
    /// Path handed to clients, e.g. `data/AAPL-15.csv`.
    pub public_path: String,
    /// Location on the local filesystem.
    pub path: PathBuf,
}

/// One parsed artifact row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRow {
    /// Bucket start as written in the `Date` column.
    pub date: String,
    /// Open price.
    pub open: Decimal,
    /// High price.
    pub high: Decimal,
    /// Low price.
    pub low: Decimal,
    /// Close price.
    pub close: Decimal,
    /// Summed volume.
    pub volume: Decimal,
}

/// Render a bucket start for the `Date` column.
///
/// Daily series are written date-only; sub-day series include the time of day.
#[must_use]
pub fn format_date(ts: NaiveDateTime, source: Granularity) -> String {
    match source {
        Granularity::Daily => ts.format(DAILY_DATE_FORMAT).to_string(),
        Granularity::SubDay => ts.format(SUBDAY_DATE_FORMAT).to_string(),
    }
}

fn csv_err(e: csv::Error) -> CandlebinError {
    CandlebinError::Artifact(e.to_string())
}

/// Serialize a candle series as an artifact table.
///
/// # Errors
/// Returns `Artifact` if the CSV writer fails.
pub fn encode_csv(series: &CandleSeries) -> Result<Vec<u8>, CandlebinError> {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record(ARTIFACT_COLUMNS).map_err(csv_err)?;
    for c in &series.candles {
        w.write_record([
            format_date(c.bucket_start, series.spec.source),
            c.open.normalize().to_string(),
            c.high.normalize().to_string(),
            c.low.normalize().to_string(),
            c.close.normalize().to_string(),
            c.volume.normalize().to_string(),
        ])
        .map_err(csv_err)?;
    }
    w.into_inner()
        .map_err(|e| CandlebinError::Artifact(e.to_string()))
}

/// Parse an artifact table, checking the header.
///
/// # Errors
/// Returns `Artifact` on a header mismatch, a malformed row or an unparsable number.
pub fn decode_csv(bytes: &[u8]) -> Result<Vec<ArtifactRow>, CandlebinError> {
    let mut r = csv::Reader::from_reader(bytes);
    let headers = r.headers().map_err(csv_err)?;
    if !headers.iter().eq(ARTIFACT_COLUMNS.iter().copied()) {
        return Err(CandlebinError::Artifact(format!(
            "unexpected header: {}",
            headers.iter().collect::<Vec<_>>().join(",")
        )));
    }
    let num = |field: Option<&str>, line: usize| -> Result<Decimal, CandlebinError> {
        let s = field.ok_or_else(|| CandlebinError::Artifact(format!("row {line}: missing column")))?;
        Decimal::from_str(s)
            .map_err(|e| CandlebinError::Artifact(format!("row {line}: {s:?}: {e}")))
    };
    let mut out = Vec::new();
    for (i, rec) in r.records().enumerate() {
        let rec = rec.map_err(csv_err)?;
        let line = i + 2;
        out.push(ArtifactRow {
            date: rec
                .get(0)
                .ok_or_else(|| CandlebinError::Artifact(format!("row {line}: missing Date")))?
                .to_string(),
            open: num(rec.get(1), line)?,
            high: num(rec.get(2), line)?,
            low: num(rec.get(3), line)?,
            close: num(rec.get(4), line)?,
            volume: num(rec.get(5), line)?,
        });
    }
    Ok(out)
}

/// Read and parse an artifact from disk.
///
/// # Errors
/// Returns `Artifact` if the file cannot be read or parsed.
pub async fn read_artifact(path: &Path) -> Result<Vec<ArtifactRow>, CandlebinError> {
    let bytes = tokio::fs::read(path).await?;
    decode_csv(&bytes)
}

/// Destination for produced artifacts.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Return the handle of an already-produced artifact, if any.
    async fn locate(&self, name: &str) -> Result<Option<ArtifactHandle>, CandlebinError>;

    /// Write `series` under `name`, replacing any previous content.
    async fn write(
        &self,
        name: &str,
        series: &CandleSeries,
    ) -> Result<ArtifactHandle, CandlebinError>;
}

/// Artifact store backed by a local directory.
///
/// Writes go to a hidden temporary file that is renamed into place, so a
/// concurrent reader sees either no artifact or a complete one.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    dir: PathBuf,
    public_prefix: String,
}

impl FsArtifactStore {
    /// Store artifacts in `dir`, exposed to clients under `data/`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            public_prefix: "data".to_string(),
        }
    }

    /// Override the prefix of `ArtifactHandle::public_path`.
    #[must_use]
    pub fn with_public_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.public_prefix = prefix.into().trim_end_matches('/').to_string();
        self
    }

    /// Directory artifacts are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn handle(&self, name: &str) -> ArtifactHandle {
        let public_path = if self.public_prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{name}", self.public_prefix)
        };
        ArtifactHandle {
            name: name.to_string(),
            public_path,
            path: self.dir.join(name),
        }
    }
}

fn check_name(name: &str) -> Result<(), CandlebinError> {
    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
        return Err(CandlebinError::InvalidArg(format!(
            "invalid artifact name {name:?}"
        )));
    }
    Ok(())
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn locate(&self, name: &str) -> Result<Option<ArtifactHandle>, CandlebinError> {
        check_name(name)?;
        let handle = self.handle(name);
        if tokio::fs::try_exists(&handle.path).await? {
            Ok(Some(handle))
        } else {
            Ok(None)
        }
    }

    async fn write(
        &self,
        name: &str,
        series: &CandleSeries,
    ) -> Result<ArtifactHandle, CandlebinError> {
        check_name(name)?;
        let bytes = encode_csv(series)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let handle = self.handle(name);
        let tmp = self.dir.join(format!(
            ".{name}.{}.{}.tmp",
            std::process::id(),
            TMP_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        tokio::fs::write(&tmp, &bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &handle.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(artifact = %handle.path.display(), rows = series.len(), "wrote artifact");

        Ok(handle)
    }
}
