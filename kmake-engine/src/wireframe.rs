//! 线框图预设：每个预设展开为若干面的 [`FilterConfig`]，供导出正反面轮廓图使用。

use std::fmt;
use std::str::FromStr;

use kmake_core::board::Board;
use tracing::{debug, info};

use crate::errors::EngineError;
use crate::pipeline::{FilterConfig, Side};

/// 旧版线框轮廓所在层，复位时统一迁移到 [`WIREFRAME_LAYER`]。
pub const LEGACY_WIREFRAME_LAYER: &str = "User.8";
pub const WIREFRAME_LAYER: &str = "User.9";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireframePreset {
    Simple,
    Dimensions,
    Descriptions,
    /// 未指定预设：仅板框与线框层，附加外框。
    #[default]
    Outline,
}

/// 预设展开后的单个视图。`side` 为空表示不区分正反面。
#[derive(Debug, Clone, PartialEq)]
pub struct WireframeView {
    pub name: String,
    pub side: Option<Side>,
    pub config: FilterConfig,
}

impl WireframePreset {
    pub fn as_str(self) -> &'static str {
        match self {
            WireframePreset::Simple => "simple",
            WireframePreset::Dimensions => "dimensions",
            WireframePreset::Descriptions => "descriptions",
            WireframePreset::Outline => "outline",
        }
    }

    /// 导出图层列表，逗号分隔。
    pub fn layers(self) -> &'static str {
        match self {
            WireframePreset::Simple | WireframePreset::Outline => "User.9,Edge.Cuts",
            WireframePreset::Dimensions => "User.9,Edge.Cuts,User.Comments",
            WireframePreset::Descriptions => "User.9,Edge.Cuts,User.Drawings",
        }
    }

    fn sides(self) -> &'static [Option<Side>] {
        match self {
            WireframePreset::Dimensions => &[Some(Side::Top), Some(Side::Bottom), None],
            _ => &[Some(Side::Top), Some(Side::Bottom)],
        }
    }

    /// 不含面选择的基础配置。
    pub fn base_config(self) -> FilterConfig {
        let layers = Some(FilterConfig::parse_layers(self.layers()));
        let annotated = FilterConfig {
            remove_stackup: true,
            hide_references: true,
            hide_values: true,
            allowed_layers: layers.clone(),
            mirror_on_bottom: true,
            ..FilterConfig::default()
        };
        match self {
            WireframePreset::Simple => FilterConfig {
                remove_dimensions: true,
                ref_filter: Some("-M-A".into()),
                ..annotated
            },
            WireframePreset::Dimensions => FilterConfig {
                ref_filter: Some("+J+MH+H+MP".into()),
                ref_filter_other: Some("+MH+H+MP".into()),
                standardize_dimensions: true,
                ..annotated
            },
            WireframePreset::Descriptions => FilterConfig {
                ref_filter: Some("+J+MH+H+MP+SW+TP+D+S".into()),
                ..annotated
            },
            WireframePreset::Outline => FilterConfig {
                allowed_layers: layers,
                mirror_on_bottom: true,
                generate_frame: true,
                ..FilterConfig::default()
            },
        }
    }

    /// 展开为各面视图。`stem` 为输出文件名前缀；默认预设以输入文件名加 `_wireframe` 命名。
    pub fn views(self, stem: &str) -> Vec<WireframeView> {
        let prefix = match self {
            WireframePreset::Outline => format!("{stem}_wireframe"),
            preset => preset.as_str().to_string(),
        };
        self.sides()
            .iter()
            .map(|&side| WireframeView {
                name: match side {
                    Some(side) => format!("{prefix}_{side}"),
                    None => prefix.clone(),
                },
                side,
                config: FilterConfig {
                    side,
                    ..self.base_config()
                },
            })
            .collect()
    }

    /// 以给定的外框边距与标注偏移覆盖默认几何参数。
    pub fn views_with_geometry(
        self,
        stem: &str,
        frame_margin: f64,
        dimension_offset: f64,
    ) -> Vec<WireframeView> {
        let mut views = self.views(stem);
        for view in &mut views {
            view.config.frame_margin = frame_margin;
            view.config.dimension_offset = dimension_offset;
        }
        views
    }
}

impl fmt::Display for WireframePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WireframePreset {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(WireframePreset::Simple),
            "dimensions" => Ok(WireframePreset::Dimensions),
            "descriptions" => Ok(WireframePreset::Descriptions),
            "outline" | "default" => Ok(WireframePreset::Outline),
            _ => Err(EngineError::UnknownPreset(s.to_string())),
        }
    }
}

/// 将封装中位于旧线框层或线框层的图形统一迁移到线框层，返回被改动的图形数量。
pub fn reset_wireframe_layers(board: &mut Board) -> usize {
    let mut moved = 0;
    for footprint in board.footprints_mut() {
        let reference = footprint.reference().to_string();
        for shape in &mut footprint.shapes {
            if shape.layer_name() == LEGACY_WIREFRAME_LAYER {
                shape.set_layer(WIREFRAME_LAYER);
                moved += 1;
                debug!(%reference, "线框图形迁移到 User.9");
            }
        }
    }
    board.ensure_layer(WIREFRAME_LAYER);
    info!(moved, "线框层复位完成");
    moved
}
