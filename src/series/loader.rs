use crate::series::error::SeriesError;
use crate::series::parser::parse_series;
use crate::types::temperature_series::TemperatureSeries;
use bon::bon;
use log::{info, warn};
use polars::prelude::*;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::NamedTempFile;
use tokio::{fs, task};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CacheState {
    Fresh,
    Stale,
    Missing,
}

/// Downloads the anomaly table and keeps the parsed series as a Parquet file in the cache dir.
pub struct SeriesLoader {
    cache_dir: PathBuf,
    download_client: Client,
    comment_marker: char,
    fetch_retries: u32,
    cache_expiry_hours: u64,
}

#[bon]
impl SeriesLoader {
    /// Creates a loader caching into `cache_dir`.
    ///
    /// * `comment_marker` - Defaults to `%`.
    /// * `fetch_retries` - Extra attempts after a failed download. Defaults to `0`.
    /// * `cache_expiry_hours` - Cached series older than this are refreshed. `0`, the default, never expires.
    #[builder]
    pub fn new(
        cache_dir: &Path,
        #[builder(default = '%')] comment_marker: char,
        #[builder(default)] fetch_retries: u32,
        #[builder(default)] cache_expiry_hours: u64,
    ) -> SeriesLoader {
        SeriesLoader {
            cache_dir: cache_dir.to_path_buf(),
            download_client: Client::new(),
            comment_marker,
            fetch_retries,
            cache_expiry_hours,
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the series for `url`, from the cache when it is fresh.
    ///
    /// An expired cache is refreshed; if that download fails the expired copy is
    /// used instead. Without any cached copy a failed download is an error.
    pub async fn load(&self, url: &str) -> Result<TemperatureSeries, SeriesError> {
        let cache_path = self.cache_dir.join(cache_file_name(url));
        let state = self.cache_state(&cache_path).await?;

        match state {
            CacheState::Fresh => {
                info!("Cache hit for {} at {:?}", url, cache_path);
                return Self::read_cache(&cache_path).await;
            }
            CacheState::Stale => info!("Cached series for {} expired, refreshing", url),
            CacheState::Missing => warn!(
                "Cache miss for {}. Downloading and processing.",
                url
            ),
        }

        let series = match self.fetch(url).await {
            Ok(series) => series,
            Err(e) if state == CacheState::Stale => {
                warn!("Refreshing {} failed ({}), using expired cache", url, e);
                return Self::read_cache(&cache_path).await;
            }
            Err(e) => return Err(e),
        };

        fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| SeriesError::CacheDirCreation(self.cache_dir.clone(), e))?;
        Self::cache_series(&series, &cache_path).await?;
        info!("Cached {} rows from {} to {:?}", series.len(), url, cache_path);

        Ok(series)
    }

    /// Downloads and parses the table, bypassing the cache.
    pub async fn fetch(&self, url: &str) -> Result<TemperatureSeries, SeriesError> {
        let text = self.download_with_retries(url).await?;
        let series = parse_series(&text, self.comment_marker);
        if series.is_empty() {
            return Err(SeriesError::EmptyDataset(url.to_string()));
        }
        info!("Parsed {} rows from {}", series.len(), url);
        Ok(series)
    }

    async fn download_with_retries(&self, url: &str) -> Result<String, SeriesError> {
        let mut attempt = 0;
        loop {
            match self.download(url).await {
                Ok(text) => return Ok(text),
                Err(e) if attempt < self.fetch_retries && is_retryable(&e) => {
                    let delay = RETRY_BASE_DELAY * 2u32.saturating_pow(attempt);
                    warn!(
                        "Download of {} failed (attempt {}/{}): {}. Retrying in {:?}",
                        url,
                        attempt + 1,
                        self.fetch_retries + 1,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn download(&self, url: &str) -> Result<String, SeriesError> {
        info!("Downloading data from {}", url);

        let response = self
            .download_client
            .get(url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| SeriesError::NetworkRequest(url.to_string(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    SeriesError::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    }
                } else {
                    SeriesError::NetworkRequest(url.to_string(), e)
                });
            }
        };

        let text = response
            .text()
            .await
            .map_err(|e| SeriesError::NetworkRequest(url.to_string(), e))?;
        info!("Downloaded {} bytes from {}", text.len(), url);
        Ok(text)
    }

    async fn cache_state(&self, path: &Path) -> Result<CacheState, SeriesError> {
        let metadata = match fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(CacheState::Missing),
            Err(e) => return Err(SeriesError::CacheMetadataRead(path.to_path_buf(), e)),
        };
        if self.cache_expiry_hours == 0 {
            return Ok(CacheState::Fresh);
        }
        let modified = metadata
            .modified()
            .map_err(|e| SeriesError::CacheMetadataRead(path.to_path_buf(), e))?;
        let age = SystemTime::now()
            .duration_since(modified)
            .map_err(|e| SeriesError::SystemTimeCalculation(path.to_path_buf(), e))?;
        if age > Duration::from_secs(self.cache_expiry_hours * 3600) {
            Ok(CacheState::Stale)
        } else {
            Ok(CacheState::Fresh)
        }
    }

    async fn read_cache(path: &Path) -> Result<TemperatureSeries, SeriesError> {
        let path_buf = path.to_path_buf();
        task::spawn_blocking(move || {
            let df = LazyFrame::scan_parquet(&path_buf, Default::default())
                .map_err(|e| SeriesError::ParquetScan(path_buf.clone(), e))?
                .collect()?;
            Ok::<TemperatureSeries, SeriesError>(TemperatureSeries::from_dataframe(&df)?)
        })
        .await?
    }

    /// Writes to a temp file in the cache dir, then renames it over `path`.
    async fn cache_series(series: &TemperatureSeries, path: &Path) -> Result<(), SeriesError> {
        let mut df = series.to_dataframe()?;
        let path_buf = path.to_path_buf();
        task::spawn_blocking(move || {
            let dir = path_buf.parent().unwrap_or_else(|| Path::new("."));
            let mut temp_file = NamedTempFile::new_in(dir)
                .map_err(|e| SeriesError::ParquetWriteIo(path_buf.clone(), e))?;
            ParquetWriter::new(temp_file.as_file_mut())
                .with_compression(ParquetCompression::Snappy)
                .finish(&mut df)
                .map_err(|e| SeriesError::ParquetWritePolars(path_buf.clone(), e))?;
            temp_file
                .persist(&path_buf)
                .map_err(|e| SeriesError::ParquetWriteIo(path_buf.clone(), e.error))?;
            Ok::<(), SeriesError>(())
        })
        .await??;
        Ok(())
    }
}

fn is_retryable(error: &SeriesError) -> bool {
    match error {
        SeriesError::NetworkRequest(..) => true,
        SeriesError::HttpStatus { status, .. } => status.is_server_error(),
        _ => false,
    }
}

/// Cache file for a URL, named after its last path segment.
pub(crate) fn cache_file_name(url: &str) -> String {
    let segment = url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    let stem = segment.split(['?', '#']).next().unwrap_or_default();
    let stem = stem.rsplit_once('.').map(|(s, _)| s).unwrap_or(stem);
    let sanitized: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if sanitized.is_empty() {
        "series-data.parquet".to_string()
    } else {
        format!("series-{}.parquet", sanitized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::temperature_series::AnomalyPoint;
    use crate::DEFAULT_DATA_URL;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    // Nothing listens on the discard port, so connecting fails immediately.
    const UNREACHABLE_URL: &str = "http://127.0.0.1:9/Complete_TAVG_summary.txt";

    const SUMMARY_BODY: &str = "\
% Berkeley Earth global land and ocean summary
% Year, Annual Anomaly, Annual Unc.
 1850      -0.418       0.171
 1851      -0.233       0.183
 1852      -0.229       0.193
";

    /// Answers every request on a local port with the same response and counts
    /// the requests served.
    async fn serve(
        status: &'static str,
        body: &'static str,
    ) -> std::io::Result<(String, Arc<AtomicUsize>)> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let url = format!("http://{}/Complete_TAVG_summary.txt", listener.local_addr()?);
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                counter.fetch_add(1, Ordering::SeqCst);
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });
        Ok((url, hits))
    }

    fn sample_series() -> TemperatureSeries {
        (1850..=1860)
            .map(|y| AnomalyPoint::new(y, (y - 1850) as f64 * 0.05 - 0.4))
            .collect()
    }

    #[test]
    fn test_cache_file_name() {
        assert_eq!(
            cache_file_name(DEFAULT_DATA_URL),
            "series-Complete_TAVG_summary.parquet"
        );
        assert_eq!(
            cache_file_name("https://example.org/a/b-c.txt?v=2"),
            "series-b_c.parquet"
        );
        assert_eq!(cache_file_name(""), "series-data.parquet");
    }

    #[tokio::test]
    async fn test_load_served_from_fresh_cache() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let loader = SeriesLoader::builder().cache_dir(dir.path()).build();
        let path = dir.path().join(cache_file_name(UNREACHABLE_URL));
        SeriesLoader::cache_series(&sample_series(), &path).await?;

        let series = loader.load(UNREACHABLE_URL).await?;
        assert_eq!(series, sample_series());
        Ok(())
    }

    #[tokio::test]
    async fn test_transport_error_without_cache() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let loader = SeriesLoader::builder().cache_dir(dir.path()).build();

        let result = loader.load(UNREACHABLE_URL).await;
        assert!(
            matches!(
                result,
                Err(SeriesError::NetworkRequest(..)) | Err(SeriesError::HttpStatus { .. })
            ),
            "unexpected result: {:?}",
            result
        );
        assert!(!dir.path().join(cache_file_name(UNREACHABLE_URL)).exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_expired_cache_used_when_refresh_fails() -> Result<(), Box<dyn std::error::Error>>
    {
        let dir = tempfile::tempdir()?;
        let loader = SeriesLoader::builder()
            .cache_dir(dir.path())
            .cache_expiry_hours(1)
            .build();
        let path = dir.path().join(cache_file_name(UNREACHABLE_URL));
        SeriesLoader::cache_series(&sample_series(), &path).await?;
        std::fs::File::options()
            .write(true)
            .open(&path)?
            .set_modified(SystemTime::now() - Duration::from_secs(3 * 3600))?;

        assert_eq!(loader.cache_state(&path).await?, CacheState::Stale);
        let series = loader.load(UNREACHABLE_URL).await?;
        assert_eq!(series, sample_series());
        Ok(())
    }

    #[tokio::test]
    async fn test_download_is_parsed_and_cached() -> Result<(), Box<dyn std::error::Error>> {
        let (url, hits) = serve("200 OK", SUMMARY_BODY).await?;
        let dir = tempfile::tempdir()?;
        let loader = SeriesLoader::builder()
            .cache_dir(dir.path())
            .fetch_retries(2)
            .build();

        let series = loader.load(&url).await?;
        assert_eq!(
            series.points(),
            [
                AnomalyPoint::new(1850, -0.418),
                AnomalyPoint::new(1851, -0.233),
                AnomalyPoint::new(1852, -0.229),
            ]
        );
        assert!(dir.path().join(cache_file_name(&url)).exists());
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        // Second load comes from the cache.
        assert_eq!(loader.load(&url).await?, series);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_comment_only_body_is_empty_dataset() -> Result<(), Box<dyn std::error::Error>> {
        let (url, hits) = serve("200 OK", "% header\n% Year Anomaly\n\n").await?;
        let dir = tempfile::tempdir()?;
        let loader = SeriesLoader::builder().cache_dir(dir.path()).build();

        let result = loader.load(&url).await;
        assert!(matches!(&result, Err(SeriesError::EmptyDataset(u)) if *u == url));
        assert!(!dir.path().join(cache_file_name(&url)).exists());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() -> Result<(), Box<dyn std::error::Error>> {
        let (url, hits) = serve("404 Not Found", "missing").await?;
        let dir = tempfile::tempdir()?;
        let loader = SeriesLoader::builder()
            .cache_dir(dir.path())
            .fetch_retries(2)
            .build();

        let result = loader.fetch(&url).await;
        assert!(matches!(
            result,
            Err(SeriesError::HttpStatus { status, .. }) if status == reqwest::StatusCode::NOT_FOUND
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_retries_are_bounded() -> Result<(), Box<dyn std::error::Error>> {
        let (url, hits) = serve("503 Service Unavailable", "busy").await?;
        let dir = tempfile::tempdir()?;
        let loader = SeriesLoader::builder()
            .cache_dir(dir.path())
            .fetch_retries(2)
            .build();

        let started = std::time::Instant::now();
        let result = loader.fetch(&url).await;
        assert!(matches!(
            result,
            Err(SeriesError::HttpStatus { status, .. })
                if status == reqwest::StatusCode::SERVICE_UNAVAILABLE
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert!(started.elapsed() >= RETRY_BASE_DELAY * 3);
        Ok(())
    }

    #[tokio::test]
    #[ignore = "downloads the Berkeley Earth dataset"]
    async fn test_fetch_berkeley_earth() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let loader = SeriesLoader::builder().cache_dir(dir.path()).build();

        let series = loader.load(DEFAULT_DATA_URL).await?;
        assert_eq!(series.first_year(), Some(1850));
        assert!(series.len() > 170);
        assert!(series.points().windows(2).all(|w| w[0].year < w[1].year));

        // Second load comes from the cache.
        assert_eq!(loader.load(DEFAULT_DATA_URL).await?, series);
        Ok(())
    }
}
