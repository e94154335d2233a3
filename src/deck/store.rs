use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use log::debug;

use super::error::{DeckError, Result};
use super::model::DeckMap;

/// JSON ファイル1つにデッキ全件を保存するストア
///
/// 読み書きは常にファイル全体が対象。書き込みは一時ファイルに書いてから
/// rename で置き換えるので、途中で落ちても元のファイルは壊れない。
#[derive(Debug, Clone)]
pub struct DeckStore {
    path: PathBuf,
}

impl DeckStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// ストアを読み込む。ファイルがなければ空
    pub fn load_all(&self) -> Result<DeckMap> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("store {} does not exist, starting empty", self.path.display());
                return Ok(DeckMap::new());
            }
            Err(source) => return Err(self.read_failed(source)),
        };

        let mut content = String::new();
        BufReader::new(file)
            .read_to_string(&mut content)
            .map_err(|source| self.read_failed(source))?;

        if content.trim().is_empty() {
            debug!("store {} is empty", self.path.display());
            return Ok(DeckMap::new());
        }

        let decks: DeckMap =
            serde_json::from_str(&content).map_err(|source| DeckError::StoreCorrupt {
                path: self.path.clone(),
                source,
            })?;

        debug!("loaded {} decks from {}", decks.len(), self.path.display());
        Ok(decks)
    }

    /// 全件を書き出してファイルを置き換える
    pub fn save_all(&self, decks: &DeckMap) -> Result<()> {
        let temp_path = self.temp_path();

        if let Err(source) = self.write_to(&temp_path, decks) {
            let _ = fs::remove_file(&temp_path);
            return Err(self.write_failed(source));
        }

        if let Err(source) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(self.write_failed(source));
        }

        debug!("saved {} decks to {}", decks.len(), self.path.display());
        Ok(())
    }

    fn write_to(&self, temp_path: &Path, decks: &DeckMap) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(temp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, decks)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "decks.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn read_failed(&self, source: io::Error) -> DeckError {
        DeckError::StoreReadFailed {
            path: self.path.clone(),
            source,
        }
    }

    fn write_failed(&self, source: io::Error) -> DeckError {
        DeckError::StoreWriteFailed {
            path: self.path.clone(),
            source,
        }
    }
}
