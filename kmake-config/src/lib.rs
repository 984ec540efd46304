use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use kmake_core::geometry::{DEFAULT_DIMENSION_OFFSET, DEFAULT_FRAME_MARGIN};
use serde::Deserialize;
use thiserror::Error;

/// 指定配置文件路径的环境变量。
pub const CONFIG_ENV_VAR: &str = "KMAKE_CONFIG";

/// 应用配置的根结构。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub geometry: GeometryConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl AppConfig {
    /// 从显式路径加载配置。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 自动发现配置文件：优先读取环境变量 `KMAKE_CONFIG`，否则寻找 `./config/default.toml`。
    /// 若文件缺失，则返回默认配置。
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os(CONFIG_ENV_VAR) {
            return Self::from_file(PathBuf::from(path));
        }

        let default_path = env::current_dir()
            .map(|dir| dir.join("config").join("default.toml"))
            .map_err(|source| ConfigError::Context {
                message: "获取当前工作目录失败".to_string(),
                source,
            })?;
        Self::from_file_or_default(default_path)
    }

    /// 文件存在时加载，否则返回默认配置。
    pub fn from_file_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }
}

/// 日志配置，支持设置默认等级。
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// 几何参数，单位毫米。
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GeometryConfig {
    /// 外框相对板框向外扩展的距离。
    #[serde(default = "GeometryConfig::default_frame_margin")]
    pub frame_margin: f64,
    /// 重建尺寸标注时尺寸线与板框的距离。
    #[serde(default = "GeometryConfig::default_dimension_offset")]
    pub dimension_offset: f64,
}

impl GeometryConfig {
    fn default_frame_margin() -> f64 {
        DEFAULT_FRAME_MARGIN
    }

    fn default_dimension_offset() -> f64 {
        DEFAULT_DIMENSION_OFFSET
    }
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            frame_margin: Self::default_frame_margin(),
            dimension_offset: Self::default_dimension_offset(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// `pcb-filter` 未指定输出时使用的文件名。
    #[serde(default = "OutputConfig::default_filter_outfile")]
    pub filter_outfile: PathBuf,
    #[serde(default = "OutputConfig::default_wireframe_dir")]
    pub wireframe_dir: PathBuf,
}

impl OutputConfig {
    fn default_filter_outfile() -> PathBuf {
        PathBuf::from("filtred.kicad_pcb.json")
    }

    fn default_wireframe_dir() -> PathBuf {
        PathBuf::from("fab").join("wireframe")
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            filter_outfile: Self::default_filter_outfile(),
            wireframe_dir: Self::default_wireframe_dir(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件 {path:?} 失败: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
}
