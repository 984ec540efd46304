use std::fs;
use std::path::{Path, PathBuf};

use kmake_core::board::Board;
use thiserror::Error;
use tracing::debug;

/// 板文件快照的默认扩展名。
pub const SNAPSHOT_EXTENSION: &str = "json";

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file {path:?}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid board snapshot {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode board snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

pub trait BoardLoader {
    fn load(&self, path: &Path) -> Result<Board, IoError>;
}

pub trait BoardSaver {
    fn save(&self, board: &Board, path: &Path) -> Result<(), IoError>;
}

/// 以 JSON 快照读写已解析的板文档。
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBoardFacade {
    pretty: bool,
}

impl JsonBoardFacade {
    pub fn new() -> Self {
        Self::default()
    }

    /// 输出带缩进的 JSON，便于在版本库中比较差异。
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    pub fn encode(&self, board: &Board) -> Result<String, IoError> {
        let text = if self.pretty {
            serde_json::to_string_pretty(board)?
        } else {
            serde_json::to_string(board)?
        };
        Ok(text)
    }
}

impl BoardLoader for JsonBoardFacade {
    fn load(&self, path: &Path) -> Result<Board, IoError> {
        let data = fs::read_to_string(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let mut board: Board = serde_json::from_str(&data).map_err(|source| IoError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        board.restore_item_counter();
        debug!(
            path = %path.display(),
            footprints = board.footprints().count(),
            graphics = board.graphics().count(),
            "已加载板文件"
        );
        Ok(board)
    }
}

impl BoardSaver for JsonBoardFacade {
    fn save(&self, board: &Board, path: &Path) -> Result<(), IoError> {
        let text = self.encode(board)?;
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| IoError::WriteError {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, text).map_err(|source| IoError::WriteError {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "已写出板文件");
        Ok(())
    }
}

/// 去掉快照扩展名与 `.kicad_pcb` 后缀得到的文件名主干，用于派生输出文件名。
pub fn board_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = name
        .strip_suffix(&format!(".{SNAPSHOT_EXTENSION}"))
        .unwrap_or(&name);
    name.strip_suffix(".kicad_pcb").unwrap_or(name).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_strips_known_suffixes() {
        assert_eq!(board_stem(Path::new("hw/demo.kicad_pcb.json")), "demo");
        assert_eq!(board_stem(Path::new("demo.json")), "demo");
        assert_eq!(board_stem(Path::new("demo.kicad_pcb")), "demo");
        assert_eq!(board_stem(Path::new("demo")), "demo");
    }

    #[test]
    fn compact_output_is_single_line() {
        let text = JsonBoardFacade::new().encode(&Board::new()).unwrap();
        assert!(!text.contains('\n'));
        let pretty = JsonBoardFacade::pretty().encode(&Board::new()).unwrap();
        assert!(pretty.contains('\n'));
    }
}
