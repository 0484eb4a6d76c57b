//! Where asset bytes come from.
//!
//! Native builds read from an assets directory on disk, the web build fetches
//! relative to the page origin, and [`MemoryStore`] serves bundled or test data.

use std::{collections::HashMap, sync::Mutex};

use anyhow::{Context, anyhow};

#[allow(async_fn_in_trait)]
pub trait AssetStore {
    async fn load_string(&self, name: &str) -> anyhow::Result<String>;
    async fn load_binary(&self, name: &str) -> anyhow::Result<Vec<u8>>;
}

/// Reads assets below a root directory.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone, Debug)]
pub struct FileStore {
    root: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl AssetStore for FileStore {
    async fn load_string(&self, name: &str) -> anyhow::Result<String> {
        let path = self.root.join(name);
        tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("could not read {}", path.display()))
    }

    async fn load_binary(&self, name: &str) -> anyhow::Result<Vec<u8>> {
        let path = self.root.join(name);
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("could not read {}", path.display()))
    }
}

/// Fetches assets from `<origin>/assets/` of the hosting page.
#[cfg(target_arch = "wasm32")]
#[derive(Clone, Debug, Default)]
pub struct HttpStore;

#[cfg(target_arch = "wasm32")]
impl HttpStore {
    fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
        let window = web_sys::window().context("no window")?;
        let origin = window
            .location()
            .origin()
            .map_err(|_| anyhow!("the page has no origin"))?;
        let base = reqwest::Url::parse(&format!("{}/assets/", origin))?;
        Ok(base.join(file_name)?)
    }
}

#[cfg(target_arch = "wasm32")]
impl AssetStore for HttpStore {
    async fn load_string(&self, name: &str) -> anyhow::Result<String> {
        let url = Self::format_url(name)?;
        Ok(reqwest::get(url).await?.error_for_status()?.text().await?)
    }

    async fn load_binary(&self, name: &str) -> anyhow::Result<Vec<u8>> {
        let url = Self::format_url(name)?;
        Ok(reqwest::get(url)
            .await?
            .error_for_status()?
            .bytes()
            .await?
            .to_vec())
    }
}

/// In-memory assets. Records every request it receives.
#[derive(Debug, Default)]
pub struct MemoryStore {
    assets: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(name, bytes);
        self
    }

    pub fn insert(&mut self, name: &str, bytes: impl Into<Vec<u8>>) {
        self.assets.insert(name.to_string(), bytes.into());
    }

    /// Asset names in the order they were requested.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl AssetStore for MemoryStore {
    async fn load_string(&self, name: &str) -> anyhow::Result<String> {
        let bytes = self.load_binary(name).await?;
        String::from_utf8(bytes).with_context(|| format!("{name} is not valid UTF-8"))
    }

    async fn load_binary(&self, name: &str) -> anyhow::Result<Vec<u8>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(name.to_string());
        }
        self.assets
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("asset {name} not found"))
    }
}
