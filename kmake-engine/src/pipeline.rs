//! 电路板变换流水线：按固定顺序对板文档做面选择、位号过滤、图层裁剪、批量删除、
//! 背面镜像、尺寸标注重建与外框生成。
//!
//! 流水线在输入文档的副本上执行，过滤表达式在任何修改之前编译，
//! 因此出错时调用方的文档保持原样。

use std::collections::HashSet;
use std::fmt;

use kmake_core::board::{
    BACK_COPPER_LAYER, Board, Dimension, DimensionKind, DimensionOrientation, EDGE_CUTS_LAYER,
    FRONT_COPPER_LAYER, Footprint, HorizontalJustify, Justify, REFERENCE_PROPERTY, Shape, Text,
    VALUE_PROPERTY,
};
pub use kmake_core::geometry::{DEFAULT_DIMENSION_OFFSET, DEFAULT_FRAME_MARGIN};
use kmake_core::geometry::{Extents, Point2};
use tracing::{debug, info};

use crate::errors::EngineError;
use crate::outline::{OutlineScope, outline_extents};
use crate::references::{ReferenceFilter, matches_optional};

/// 层叠表分组名称。
pub const STACKUP_GROUP_NAME: &str = "group-boardStackUp";

/// 宽松图层过滤时始终保留以此前缀开头的文字（版本哈希标签）。
pub const REVISION_MARKER_PREFIX: &str = "SHA";

/// 重建尺寸标注的默认图层（找不到旧标注时使用），即 `User.Comments`。
pub const DIMENSION_LAYER: &str = "Cmts.User";

/// 外框矩形所在的注释层。
pub const FRAME_LAYER: &str = "Margin";

const LAYER_ALIASES: [(&str, &str); 4] = [
    ("User.Comments", "Cmts.User"),
    ("User.Drawings", "Dwgs.User"),
    ("User.Eco1", "Eco1.User"),
    ("User.Eco2", "Eco2.User"),
];

/// 把旧式 / 用户可见的图层名换成规范名，未知名称原样返回。
pub fn canonical_layer_name(name: &str) -> &str {
    LAYER_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Bottom,
}

impl Side {
    pub fn copper_layer(self) -> &'static str {
        match self {
            Side::Top => FRONT_COPPER_LAYER,
            Side::Bottom => BACK_COPPER_LAYER,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Bottom => "bottom",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 流水线配置，每次调用构造一次，执行期间只读。
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    /// 主视面；为空时所有封装都按主面处理。
    pub side: Option<Side>,
    /// 主面封装使用的位号过滤表达式，为空表示全部保留。
    pub ref_filter: Option<String>,
    /// 另一面封装使用的过滤表达式，为空表示另一面封装全部删除。
    pub ref_filter_other: Option<String>,
    pub remove_stackup: bool,
    pub hide_references: bool,
    pub hide_values: bool,
    pub allowed_layers: Option<Vec<String>>,
    /// 严格模式下反白文字与版本标签也按图层删除。
    pub allowed_layers_strict: bool,
    pub remove_dimensions: bool,
    pub remove_zones: bool,
    pub remove_tracks: bool,
    pub remove_vias: bool,
    pub mirror_on_bottom: bool,
    pub standardize_dimensions: bool,
    pub generate_frame: bool,
    pub frame_margin: f64,
    pub dimension_offset: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            side: None,
            ref_filter: None,
            ref_filter_other: None,
            remove_stackup: false,
            hide_references: false,
            hide_values: false,
            allowed_layers: None,
            allowed_layers_strict: false,
            remove_dimensions: false,
            remove_zones: false,
            remove_tracks: false,
            remove_vias: false,
            mirror_on_bottom: false,
            standardize_dimensions: false,
            generate_frame: false,
            frame_margin: DEFAULT_FRAME_MARGIN,
            dimension_offset: DEFAULT_DIMENSION_OFFSET,
        }
    }
}

impl FilterConfig {
    /// 解析逗号分隔的图层列表，例如 `User.9,Edge.Cuts`。
    pub fn parse_layers(list: &str) -> Vec<String> {
        list.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// 板框层在图层裁剪后是否仍然保留，外框生成只在此时执行。
    pub fn keeps_outline_layer(&self) -> bool {
        self.allowed_layers.as_ref().is_none_or(|layers| {
            layers
                .iter()
                .any(|layer| canonical_layer_name(layer.trim()) == EDGE_CUTS_LAYER)
        })
    }
}

struct CompiledFilters {
    primary: Option<ReferenceFilter>,
    other: Option<ReferenceFilter>,
}

impl CompiledFilters {
    fn compile(config: &FilterConfig) -> Result<Self, EngineError> {
        Ok(Self {
            primary: config
                .ref_filter
                .as_deref()
                .map(ReferenceFilter::compile)
                .transpose()?,
            other: config
                .ref_filter_other
                .as_deref()
                .map(ReferenceFilter::compile)
                .transpose()?,
        })
    }
}

/// 对 `board` 的副本执行全部已启用的阶段并返回结果。
pub fn filter_board(board: &Board, config: &FilterConfig) -> Result<Board, EngineError> {
    let filters = CompiledFilters::compile(config)?;
    let mut board = board.clone();

    filter_footprints(&mut board, config.side, &filters);

    if config.remove_stackup {
        match board.remove_group_with_members(STACKUP_GROUP_NAME) {
            Some(group) => debug!(members = group.members.len(), "已删除层叠表"),
            None => debug!("未找到层叠表分组"),
        }
    }

    if config.hide_references || config.hide_values {
        hide_properties(&mut board, config.hide_references, config.hide_values);
    }

    if let Some(layers) = &config.allowed_layers {
        restrict_layers(&mut board, layers, config.allowed_layers_strict);
    }

    if config.remove_dimensions {
        board.clear_dimensions();
    }
    if config.remove_zones {
        board.clear_zones();
    }
    if config.remove_tracks {
        board.retain_tracks(|track| track.is_via());
    }
    if config.remove_vias {
        board.retain_tracks(|track| !track.is_via());
    }

    if config.mirror_on_bottom && config.side == Some(Side::Bottom) {
        mirror_texts(&mut board);
    }

    if config.standardize_dimensions {
        standardize_dimensions(&mut board, config.side, config.dimension_offset)?;
    }

    if config.generate_frame {
        if config.keeps_outline_layer() {
            generate_frame(&mut board, config.frame_margin)?;
        } else {
            debug!("图层裁剪已移除板框层，跳过外框生成");
        }
    }

    info!(
        footprints = board.footprints().count(),
        graphics = board.graphics().count(),
        dimensions = board.dimensions().count(),
        tracks = board.tracks().count(),
        "板文件过滤完成"
    );
    Ok(board)
}

fn is_primary_side(footprint: &Footprint, side: Option<Side>) -> bool {
    match side {
        None => true,
        Some(side) => footprint.layer == side.copper_layer() || footprint.straddles_copper(),
    }
}

fn filter_footprints(board: &mut Board, side: Option<Side>, filters: &CompiledFilters) {
    let before = board.footprints().count();
    board.retain_footprints(|footprint| {
        let reference = footprint.reference();
        if is_primary_side(footprint, side) {
            matches_optional(filters.primary.as_ref(), reference)
        } else {
            filters
                .other
                .as_ref()
                .is_some_and(|filter| filter.matches(reference))
        }
    });
    debug!(
        before,
        after = board.footprints().count(),
        side = side.map(Side::as_str),
        "封装过滤"
    );
}

fn hide_properties(board: &mut Board, references: bool, values: bool) {
    for footprint in board.footprints_mut() {
        if references {
            if let Some(property) = footprint.property_mut(REFERENCE_PROPERTY) {
                property.hidden = true;
            }
        }
        if values {
            if let Some(property) = footprint.property_mut(VALUE_PROPERTY) {
                property.hidden = true;
            }
        }
    }
}

fn restrict_layers(board: &mut Board, layers: &[String], strict: bool) {
    let allowed: HashSet<&str> = layers
        .iter()
        .map(|layer| canonical_layer_name(layer.trim()))
        .filter(|layer| !layer.is_empty())
        .collect();

    let before = board.graphics().count();
    board.retain_graphics(|_, shape| shape_allowed(shape, &allowed, strict));

    for footprint in board.footprints_mut() {
        footprint
            .shapes
            .retain(|shape| shape_allowed(shape, &allowed, strict));
        for property in &mut footprint.properties {
            if !allowed.contains(canonical_layer_name(&property.layer)) {
                property.hidden = true;
            }
        }
    }
    debug!(
        before,
        after = board.graphics().count(),
        strict,
        "图层裁剪"
    );
}

fn shape_allowed(shape: &Shape, allowed: &HashSet<&str>, strict: bool) -> bool {
    if allowed.contains(canonical_layer_name(shape.layer_name())) {
        return true;
    }
    if strict {
        return false;
    }
    shape
        .as_text()
        .is_some_and(|text| text.knockout || text.text.starts_with(REVISION_MARKER_PREFIX))
}

fn mirror_texts(board: &mut Board) {
    for footprint in board.footprints_mut() {
        for property in &mut footprint.properties {
            property.justify.mirror_horizontal();
        }
        for text in footprint.shapes.iter_mut().filter_map(Shape::as_text_mut) {
            text.justify.mirror_horizontal();
        }
    }
    for text in board.graphics_mut().filter_map(Shape::as_text_mut) {
        text.justify.mirror_horizontal();
    }
    for dimension in board.dimensions_mut() {
        dimension.text.justify.mirror_horizontal();
    }
}

/// 删除现有最长的水平与竖直线性标注，再依据板框重新生成两条正交标注。
fn standardize_dimensions(
    board: &mut Board,
    side: Option<Side>,
    offset: f64,
) -> Result<(), EngineError> {
    let extents = outline_extents(board, OutlineScope::BoardOnly)?;

    let mut layer: Option<String> = None;
    for orientation in [
        DimensionOrientation::Horizontal,
        DimensionOrientation::Vertical,
    ] {
        let longest = board
            .dimensions()
            .filter(|(_, dimension)| dimension.orientation() == Some(orientation))
            .max_by(|(_, a), (_, b)| a.measured_length().total_cmp(&b.measured_length()))
            .map(|(id, _)| *id);
        if let Some(removed) = longest.and_then(|id| board.remove_dimension(id)) {
            debug!(?orientation, length = removed.measured_length(), "删除旧尺寸标注");
            if layer.is_none() {
                layer = Some(removed.layer);
            }
        }
    }

    let layer = layer.unwrap_or_else(|| DIMENSION_LAYER.to_string());
    let mirrored = side == Some(Side::Bottom);
    board.add_dimension(horizontal_dimension(&extents, offset, &layer, mirrored));
    board.add_dimension(vertical_dimension(&extents, offset, &layer, mirrored));
    Ok(())
}

/// 水平标注放在板框上方，两端取左右边界最靠上的点。
fn horizontal_dimension(extents: &Extents, offset: f64, layer: &str, mirrored: bool) -> Dimension {
    let start = Point2::new(extents.min_x.main, extents.min_x.aux_min);
    let end = Point2::new(extents.max_x.main, extents.max_x.aux_min);
    let line_y = extents.min_y.main - offset;
    let label = Point2::new((start.x() + end.x()) * 0.5, line_y);
    Dimension {
        kind: DimensionKind::Orthogonal(DimensionOrientation::Horizontal),
        layer: layer.to_string(),
        start,
        end,
        height: line_y - start.y(),
        text: dimension_text(end.x() - start.x(), label, layer, mirrored),
    }
}

/// 竖直标注顶视时放在左侧；底视时板面左右翻转，因此放在右侧。
fn vertical_dimension(extents: &Extents, offset: f64, layer: &str, mirrored: bool) -> Dimension {
    let (start_x, end_x, line_x) = if mirrored {
        (
            extents.min_y.aux_max,
            extents.max_y.aux_max,
            extents.max_x.main + offset,
        )
    } else {
        (
            extents.min_y.aux_min,
            extents.max_y.aux_min,
            extents.min_x.main - offset,
        )
    };
    let start = Point2::new(start_x, extents.min_y.main);
    let end = Point2::new(end_x, extents.max_y.main);
    let label = Point2::new(line_x, (start.y() + end.y()) * 0.5);
    Dimension {
        kind: DimensionKind::Orthogonal(DimensionOrientation::Vertical),
        layer: layer.to_string(),
        start,
        end,
        height: line_x - start.x(),
        text: dimension_text(end.y() - start.y(), label, layer, mirrored),
    }
}

fn dimension_text(length: f64, position: Point2, layer: &str, mirrored: bool) -> Text {
    let mut text = Text::new(format!("{length:.2}"), position, layer);
    text.justify = Justify {
        horizontal: HorizontalJustify::Center,
        mirror: false,
    };
    if mirrored {
        text.justify.mirror_horizontal();
    }
    text
}

fn generate_frame(board: &mut Board, margin: f64) -> Result<(), EngineError> {
    let bounds = outline_extents(board, OutlineScope::BoardOnly)?
        .bounds()
        .expanded(margin);
    let id = board.add_shape(Shape::polygon(bounds.corners(), FRAME_LAYER));
    debug!(id = id.get(), margin, "已生成外框");
    Ok(())
}
