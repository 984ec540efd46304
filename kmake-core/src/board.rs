//! 已解析的电路板文档模型。
//!
//! 文档由外部格式适配器构建，本模块只描述内存结构以及流水线需要的基本查询。

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::geometry::{GeometryError, Placement, Point2, arc_extrema};

pub const EDGE_CUTS_LAYER: &str = "Edge.Cuts";
pub const FRONT_COPPER_LAYER: &str = "F.Cu";
pub const BACK_COPPER_LAYER: &str = "B.Cu";
pub const REFERENCE_PROPERTY: &str = "Reference";
pub const VALUE_PROPERTY: &str = "Value";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(u64);

impl ItemId {
    #[inline]
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// 提供原始数值，便于序列化或日志输出。
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

impl Layer {
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            user_name: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalJustify {
    Left,
    #[default]
    Center,
    Right,
}

/// 文字对齐方式。`mirror` 表示从板背面观察时文字已镜像。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Justify {
    #[serde(default)]
    pub horizontal: HorizontalJustify,
    #[serde(default)]
    pub mirror: bool,
}

impl Justify {
    /// 左右对齐互换并置镜像标记，居中保持不变。
    pub fn mirror_horizontal(&mut self) {
        self.horizontal = match self.horizontal {
            HorizontalJustify::Left => HorizontalJustify::Right,
            HorizontalJustify::Right => HorizontalJustify::Left,
            HorizontalJustify::Center => HorizontalJustify::Center,
        };
        self.mirror = true;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point2,
    pub end: Point2,
    pub layer: String,
}

/// 三点圆弧：`mid` 为起止点之间弧上任意一点，用于确定走向与重建圆。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arc {
    pub start: Point2,
    pub mid: Point2,
    pub end: Point2,
    pub layer: String,
}

/// 圆：`edge` 为圆周上任意一点，半径为其到圆心的距离。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point2,
    pub edge: Point2,
    pub layer: String,
}

impl Circle {
    #[inline]
    pub fn radius(&self) -> f64 {
        self.center.distance(self.edge)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<Point2>,
    pub layer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub position: Point2,
    pub layer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub text: String,
    pub position: Point2,
    pub layer: String,
    #[serde(default)]
    pub justify: Justify,
    /// 反白（带背景填充）的丝印文字。
    #[serde(default)]
    pub knockout: bool,
    #[serde(default)]
    pub hidden: bool,
}

impl Text {
    pub fn new(text: impl Into<String>, position: Point2, layer: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            position,
            layer: layer.into(),
            justify: Justify::default(),
            knockout: false,
            hidden: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Segment(Segment),
    Arc(Arc),
    Circle(Circle),
    Polygon(Polygon),
    Point(Marker),
    Text(Text),
}

impl Shape {
    pub fn segment(start: Point2, end: Point2, layer: impl Into<String>) -> Self {
        Shape::Segment(Segment {
            start,
            end,
            layer: layer.into(),
        })
    }

    pub fn arc(start: Point2, mid: Point2, end: Point2, layer: impl Into<String>) -> Self {
        Shape::Arc(Arc {
            start,
            mid,
            end,
            layer: layer.into(),
        })
    }

    pub fn circle(center: Point2, edge: Point2, layer: impl Into<String>) -> Self {
        Shape::Circle(Circle {
            center,
            edge,
            layer: layer.into(),
        })
    }

    pub fn polygon<I>(points: I, layer: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = Point2>,
    {
        Shape::Polygon(Polygon {
            points: points.into_iter().collect(),
            layer: layer.into(),
        })
    }

    pub fn text(text: impl Into<String>, position: Point2, layer: impl Into<String>) -> Self {
        Shape::Text(Text::new(text, position, layer))
    }

    #[inline]
    pub fn layer_name(&self) -> &str {
        match self {
            Shape::Segment(segment) => &segment.layer,
            Shape::Arc(arc) => &arc.layer,
            Shape::Circle(circle) => &circle.layer,
            Shape::Polygon(polygon) => &polygon.layer,
            Shape::Point(marker) => &marker.layer,
            Shape::Text(text) => &text.layer,
        }
    }

    pub fn set_layer(&mut self, layer: impl Into<String>) {
        let layer = layer.into();
        match self {
            Shape::Segment(segment) => segment.layer = layer,
            Shape::Arc(arc) => arc.layer = layer,
            Shape::Circle(circle) => circle.layer = layer,
            Shape::Polygon(polygon) => polygon.layer = layer,
            Shape::Point(marker) => marker.layer = layer,
            Shape::Text(text) => text.layer = layer,
        }
    }

    #[inline]
    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Shape::Text(text) => Some(text),
            _ => None,
        }
    }

    #[inline]
    pub fn as_text_mut(&mut self) -> Option<&mut Text> {
        match self {
            Shape::Text(text) => Some(text),
            _ => None,
        }
    }

    /// 几何极值点集，圆弧为精确结果，圆退化为外切正方形的两个对角点，文字退化为插入点。
    pub fn extrema(&self) -> Result<Vec<Point2>, GeometryError> {
        match self {
            Shape::Segment(segment) => Ok(vec![segment.start, segment.end]),
            Shape::Arc(arc) => arc_extrema(arc.start, arc.mid, arc.end),
            Shape::Circle(circle) => {
                let radius = circle.radius();
                let center = circle.center;
                Ok(vec![
                    Point2::new(center.x() - radius, center.y() - radius),
                    Point2::new(center.x() + radius, center.y() + radius),
                ])
            }
            Shape::Polygon(polygon) => Ok(polygon.points.clone()),
            Shape::Point(marker) => Ok(vec![marker.position]),
            Shape::Text(text) => Ok(vec![text.position]),
        }
    }

    /// 将封装局部坐标下的图形换算到板坐标。圆的边缘点随圆心一并变换，半径不变。
    pub fn to_board(&self, placement: &Placement) -> Shape {
        let map = |point: Point2| placement.to_board(point);
        match self {
            Shape::Segment(segment) => Shape::Segment(Segment {
                start: map(segment.start),
                end: map(segment.end),
                layer: segment.layer.clone(),
            }),
            Shape::Arc(arc) => Shape::Arc(Arc {
                start: map(arc.start),
                mid: map(arc.mid),
                end: map(arc.end),
                layer: arc.layer.clone(),
            }),
            Shape::Circle(circle) => Shape::Circle(Circle {
                center: map(circle.center),
                edge: map(circle.edge),
                layer: circle.layer.clone(),
            }),
            Shape::Polygon(polygon) => Shape::Polygon(Polygon {
                points: polygon.points.iter().copied().map(map).collect(),
                layer: polygon.layer.clone(),
            }),
            Shape::Point(marker) => Shape::Point(Marker {
                position: map(marker.position),
                layer: marker.layer.clone(),
            }),
            Shape::Text(text) => Shape::Text(Text {
                position: map(text.position),
                ..text.clone()
            }),
        }
    }
}

/// 封装属性（Reference、Value 等），隐藏时保留属性本身。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub key: String,
    pub value: String,
    pub position: Point2,
    pub layer: String,
    #[serde(default)]
    pub justify: Justify,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pad {
    pub number: String,
    pub layers: Vec<String>,
}

impl Pad {
    pub fn new<I, S>(number: impl Into<String>, layers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            number: number.into(),
            layers: layers.into_iter().map(Into::into).collect(),
        }
    }

    /// 通配层 `*.Cu` 同时覆盖正反两面铜层。
    pub fn is_on_layer(&self, layer: &str) -> bool {
        self.layers
            .iter()
            .any(|candidate| candidate == layer || (candidate == "*.Cu" && layer.ends_with(".Cu")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FootprintType {
    Smd,
    ThroughHole,
    Virtual,
    BoardOnly,
    #[default]
    Unspecified,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub library_link: String,
    /// 放置面所在的铜层（`F.Cu` 或 `B.Cu`）。
    pub layer: String,
    pub placement: Placement,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub shapes: Vec<Shape>,
    #[serde(default)]
    pub pads: Vec<Pad>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub footprint_type: FootprintType,
}

impl Footprint {
    /// 创建封装并附带 Reference / Value 两个属性，属性层按放置面取对应丝印与装配层。
    pub fn new(
        library_link: impl Into<String>,
        reference: impl Into<String>,
        value: impl Into<String>,
        layer: impl Into<String>,
        placement: Placement,
    ) -> Self {
        let layer = layer.into();
        let (silk, fab) = if layer == BACK_COPPER_LAYER {
            ("B.SilkS", "B.Fab")
        } else {
            ("F.SilkS", "F.Fab")
        };
        let property = |key: &str, value: String, layer: &str| Property {
            key: key.to_string(),
            value,
            position: placement.position,
            layer: layer.to_string(),
            justify: Justify::default(),
            hidden: false,
        };
        Self {
            library_link: library_link.into(),
            properties: vec![
                property(REFERENCE_PROPERTY, reference.into(), silk),
                property(VALUE_PROPERTY, value.into(), fab),
            ],
            layer,
            placement,
            shapes: Vec::new(),
            pads: Vec::new(),
            locked: false,
            footprint_type: FootprintType::default(),
        }
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shapes.push(shape);
        self
    }

    pub fn with_pad(mut self, pad: Pad) -> Self {
        self.pads.push(pad);
        self
    }

    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties.iter().find(|property| property.key == key)
    }

    pub fn property_mut(&mut self, key: &str) -> Option<&mut Property> {
        self.properties
            .iter_mut()
            .find(|property| property.key == key)
    }

    /// 位号；缺失 Reference 属性时返回空串。
    pub fn reference(&self) -> &str {
        self.property(REFERENCE_PROPERTY)
            .map(|property| property.value.as_str())
            .unwrap_or("")
    }

    pub fn value(&self) -> &str {
        self.property(VALUE_PROPERTY)
            .map(|property| property.value.as_str())
            .unwrap_or("")
    }

    pub fn has_pads_on(&self, layer: &str) -> bool {
        self.pads.iter().any(|pad| pad.is_on_layer(layer))
    }

    /// 同时在正反两面铜层上有焊盘（通孔件、板边连接器等）。
    pub fn straddles_copper(&self) -> bool {
        self.has_pads_on(FRONT_COPPER_LAYER) && self.has_pads_on(BACK_COPPER_LAYER)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionOrientation {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "orientation", rename_all = "snake_case")]
pub enum DimensionKind {
    Aligned,
    Orthogonal(DimensionOrientation),
    Leader,
    Center,
    Radial,
}

/// 尺寸标注。正交标注的 `height` 为尺寸线相对 `start` 的偏移：
/// 水平标注沿 y 轴、竖直标注沿 x 轴；对齐标注沿起止连线的法向。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub kind: DimensionKind,
    pub layer: String,
    pub start: Point2,
    pub end: Point2,
    pub height: f64,
    pub text: Text,
}

impl Dimension {
    /// 线性标注的方向；对齐标注仅在起止点水平或竖直时才有方向。
    pub fn orientation(&self) -> Option<DimensionOrientation> {
        const AXIS_EPSILON: f64 = 1e-6;
        match self.kind {
            DimensionKind::Orthogonal(orientation) => Some(orientation),
            DimensionKind::Aligned => {
                let delta = self.start.vector_to(self.end);
                if delta.y().abs() <= AXIS_EPSILON && delta.x().abs() > AXIS_EPSILON {
                    Some(DimensionOrientation::Horizontal)
                } else if delta.x().abs() <= AXIS_EPSILON && delta.y().abs() > AXIS_EPSILON {
                    Some(DimensionOrientation::Vertical)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    pub fn measured_length(&self) -> f64 {
        let delta = self.start.vector_to(self.end);
        match self.orientation() {
            Some(DimensionOrientation::Horizontal) => delta.x().abs(),
            Some(DimensionOrientation::Vertical) => delta.y().abs(),
            None => delta.length(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    Copper,
    Keepout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub kind: ZoneKind,
    pub layers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_name: Option<String>,
    pub outline: Vec<Point2>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSegment {
    pub start: Point2,
    pub end: Point2,
    pub width: f64,
    pub layer: String,
    #[serde(default)]
    pub net: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackArc {
    pub start: Point2,
    pub mid: Point2,
    pub end: Point2,
    pub width: f64,
    pub layer: String,
    #[serde(default)]
    pub net: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Via {
    pub position: Point2,
    pub size: f64,
    pub drill: f64,
    pub layers: Vec<String>,
    #[serde(default)]
    pub net: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrackItem {
    Segment(TrackSegment),
    Arc(TrackArc),
    Via(Via),
}

impl TrackItem {
    #[inline]
    pub fn is_via(&self) -> bool {
        matches!(self, TrackItem::Via(_))
    }
}

/// 具名分组，成员为板上图元的标识。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub members: Vec<ItemId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Setup {
    /// 钻孔 / 贴片坐标文件使用的辅助原点。
    pub aux_axis_origin: Point2,
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            aux_axis_origin: Point2::new(0.0, 0.0),
        }
    }
}

/// 文档根节点。所有集合按插入顺序保存，每个图元以 [`ItemId`] 标识。
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    #[serde(default)]
    layers: Vec<Layer>,
    #[serde(default)]
    setup: Setup,
    #[serde(default)]
    footprints: Vec<(ItemId, Footprint)>,
    #[serde(default)]
    graphics: Vec<(ItemId, Shape)>,
    #[serde(default)]
    dimensions: Vec<(ItemId, Dimension)>,
    #[serde(default)]
    zones: Vec<(ItemId, Zone)>,
    #[serde(default)]
    tracks: Vec<(ItemId, TrackItem)>,
    #[serde(default)]
    groups: Vec<Group>,
    #[serde(default)]
    next_item_id: u64,
}

impl Board {
    pub fn new() -> Self {
        let mut board = Self::default();
        for name in [
            FRONT_COPPER_LAYER,
            BACK_COPPER_LAYER,
            "F.SilkS",
            "B.SilkS",
            "F.Fab",
            "B.Fab",
            EDGE_CUTS_LAYER,
        ] {
            board.ensure_layer(name);
        }
        board
    }

    pub fn ensure_layer(&mut self, name: impl AsRef<str>) {
        let key = name.as_ref();
        if !self.layers.iter().any(|layer| layer.name == key) {
            self.layers.push(Layer::new(key));
        }
    }

    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    #[inline]
    pub fn aux_axis_origin(&self) -> Point2 {
        self.setup.aux_axis_origin
    }

    pub fn set_aux_axis_origin(&mut self, origin: Point2) {
        self.setup.aux_axis_origin = origin;
    }

    pub fn add_shape(&mut self, shape: Shape) -> ItemId {
        self.ensure_layer(shape.layer_name());
        let id = self.next_id();
        self.graphics.push((id, shape));
        id
    }

    pub fn add_footprint(&mut self, footprint: Footprint) -> ItemId {
        self.ensure_layer(&footprint.layer);
        for shape in &footprint.shapes {
            self.ensure_layer(shape.layer_name());
        }
        let id = self.next_id();
        self.footprints.push((id, footprint));
        id
    }

    pub fn add_dimension(&mut self, dimension: Dimension) -> ItemId {
        self.ensure_layer(&dimension.layer);
        let id = self.next_id();
        self.dimensions.push((id, dimension));
        id
    }

    pub fn add_zone(&mut self, zone: Zone) -> ItemId {
        let id = self.next_id();
        self.zones.push((id, zone));
        id
    }

    pub fn add_track(&mut self, track: TrackItem) -> ItemId {
        let id = self.next_id();
        self.tracks.push((id, track));
        id
    }

    pub fn add_group(&mut self, name: impl Into<String>, members: Vec<ItemId>) {
        self.groups.push(Group {
            name: name.into(),
            members,
        });
    }

    pub fn footprints(&self) -> impl Iterator<Item = &(ItemId, Footprint)> {
        self.footprints.iter()
    }

    pub fn footprints_mut(&mut self) -> impl Iterator<Item = &mut Footprint> {
        self.footprints.iter_mut().map(|(_, footprint)| footprint)
    }

    pub fn retain_footprints<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Footprint) -> bool,
    {
        self.footprints.retain(|(_, footprint)| keep(footprint));
    }

    pub fn graphics(&self) -> impl Iterator<Item = &(ItemId, Shape)> {
        self.graphics.iter()
    }

    pub fn graphics_mut(&mut self) -> impl Iterator<Item = &mut Shape> {
        self.graphics.iter_mut().map(|(_, shape)| shape)
    }

    pub fn retain_graphics<F>(&mut self, mut keep: F)
    where
        F: FnMut(ItemId, &Shape) -> bool,
    {
        self.graphics.retain(|(id, shape)| keep(*id, shape));
    }

    pub fn dimensions(&self) -> impl Iterator<Item = &(ItemId, Dimension)> {
        self.dimensions.iter()
    }

    pub fn dimensions_mut(&mut self) -> impl Iterator<Item = &mut Dimension> {
        self.dimensions.iter_mut().map(|(_, dimension)| dimension)
    }

    pub fn remove_dimension(&mut self, id: ItemId) -> Option<Dimension> {
        let index = self.dimensions.iter().position(|(item, _)| *item == id)?;
        Some(self.dimensions.remove(index).1)
    }

    pub fn clear_dimensions(&mut self) {
        self.dimensions.clear();
    }

    pub fn zones(&self) -> impl Iterator<Item = &(ItemId, Zone)> {
        self.zones.iter()
    }

    pub fn clear_zones(&mut self) {
        self.zones.clear();
    }

    pub fn tracks(&self) -> impl Iterator<Item = &(ItemId, TrackItem)> {
        self.tracks.iter()
    }

    pub fn retain_tracks<F>(&mut self, mut keep: F)
    where
        F: FnMut(&TrackItem) -> bool,
    {
        self.tracks.retain(|(_, track)| keep(track));
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|group| group.name == name)
    }

    /// 删除指定名称的分组及其成员图元，返回被删除的分组；分组不存在时返回 None。
    pub fn remove_group_with_members(&mut self, name: &str) -> Option<Group> {
        let index = self.groups.iter().position(|group| group.name == name)?;
        let group = self.groups.remove(index);
        let members: HashSet<ItemId> = group.members.iter().copied().collect();
        self.graphics.retain(|(id, _)| !members.contains(id));
        Some(group)
    }

    /// 外部载入的文档可能缺少或落后于计数器，将其推进到已有最大标识之后。
    pub fn restore_item_counter(&mut self) {
        let highest = self
            .footprints
            .iter()
            .map(|(id, _)| *id)
            .chain(self.graphics.iter().map(|(id, _)| *id))
            .chain(self.dimensions.iter().map(|(id, _)| *id))
            .chain(self.zones.iter().map(|(id, _)| *id))
            .chain(self.tracks.iter().map(|(id, _)| *id))
            .chain(self.groups.iter().flat_map(|group| group.members.iter().copied()))
            .map(ItemId::get)
            .max()
            .unwrap_or(0);
        self.next_item_id = self.next_item_id.max(highest);
    }

    fn next_id(&mut self) -> ItemId {
        self.next_item_id += 1;
        ItemId::new(self.next_item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_assigns_sequential_ids_and_layers() {
        let mut board = Board::new();
        let first = board.add_shape(Shape::segment(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            "User.9",
        ));
        let second = board.add_shape(Shape::text("SHA 1234", Point2::new(0.0, 0.0), "F.SilkS"));
        assert_eq!(first.get() + 1, second.get());
        assert!(board.layers().any(|layer| layer.name == "User.9"));
        assert_eq!(board.graphics().count(), 2);
    }

    #[test]
    fn restored_counter_skips_existing_ids() {
        let mut board = Board::new();
        for x in [0.0, 1.0, 2.0] {
            board.add_shape(Shape::segment(
                Point2::new(x, 0.0),
                Point2::new(x, 1.0),
                EDGE_CUTS_LAYER,
            ));
        }
        board.next_item_id = 0;
        board.restore_item_counter();
        let fresh = board.add_shape(Shape::text("R1", Point2::new(0.0, 0.0), "F.SilkS"));
        assert_eq!(fresh.get(), 4);
        assert_eq!(
            board.graphics().filter(|(id, _)| *id == fresh).count(),
            1
        );
    }

    #[test]
    fn footprint_exposes_reference_and_value() {
        let footprint = Footprint::new(
            "Connector:USB_C",
            "J3",
            "USB_C",
            BACK_COPPER_LAYER,
            Placement::at(5.0, 5.0),
        );
        assert_eq!(footprint.reference(), "J3");
        assert_eq!(footprint.value(), "USB_C");
        assert_eq!(
            footprint.property(REFERENCE_PROPERTY).map(|p| p.layer.as_str()),
            Some("B.SilkS")
        );
    }

    #[test]
    fn wildcard_pads_straddle_both_sides() {
        let smd = Footprint::new("R", "R1", "10k", FRONT_COPPER_LAYER, Placement::default())
            .with_pad(Pad::new("1", ["F.Cu", "F.Mask"]));
        let tht = Footprint::new("J", "J1", "HDR", FRONT_COPPER_LAYER, Placement::default())
            .with_pad(Pad::new("1", ["*.Cu", "*.Mask"]));
        assert!(!smd.straddles_copper());
        assert!(tht.straddles_copper());
    }

    #[test]
    fn circle_extrema_form_circumscribed_square() {
        let circle = Shape::circle(Point2::new(3.0, -2.0), Point2::new(3.0, 2.0), EDGE_CUTS_LAYER);
        let points = circle.extrema().unwrap();
        assert_eq!(points, vec![Point2::new(-1.0, -6.0), Point2::new(7.0, 2.0)]);
    }

    #[test]
    fn removing_group_drops_member_graphics() {
        let mut board = Board::new();
        let table = board.add_shape(Shape::text("Layer", Point2::new(0.0, 0.0), "Cmts.User"));
        let keep = board.add_shape(Shape::text("Title", Point2::new(0.0, 5.0), "Cmts.User"));
        board.add_group("group-boardStackUp", vec![table]);

        let removed = board.remove_group_with_members("group-boardStackUp");
        assert!(removed.is_some());
        assert!(board.group("group-boardStackUp").is_none());
        let ids: Vec<ItemId> = board.graphics().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![keep]);
        assert!(board.remove_group_with_members("group-boardStackUp").is_none());
    }

    #[test]
    fn aligned_dimension_orientation_follows_geometry() {
        let dimension = Dimension {
            kind: DimensionKind::Aligned,
            layer: "Dwgs.User".into(),
            start: Point2::new(0.0, 4.0),
            end: Point2::new(0.0, 12.0),
            height: 3.0,
            text: Text::new("8.00", Point2::new(3.0, 8.0), "Dwgs.User"),
        };
        assert_eq!(dimension.orientation(), Some(DimensionOrientation::Vertical));
        assert!((dimension.measured_length() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn justify_mirror_swaps_sides() {
        let mut justify = Justify {
            horizontal: HorizontalJustify::Left,
            mirror: false,
        };
        justify.mirror_horizontal();
        assert_eq!(justify.horizontal, HorizontalJustify::Right);
        assert!(justify.mirror);
    }
}
