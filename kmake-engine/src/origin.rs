//! 辅助原点（钻孔 / 贴片坐标原点）选择。

use std::fmt;
use std::str::FromStr;

use kmake_core::board::Board;
use kmake_core::geometry::Point2;
use tracing::info;

use crate::errors::EngineError;
use crate::outline::{OutlineScope, outline_extents};

/// 板框包围盒的四个角。板坐标 y 轴向下，因此上边取最小 y。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    #[inline]
    pub fn is_top(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::TopRight)
    }

    #[inline]
    pub fn is_right(self) -> bool {
        matches!(self, Corner::TopRight | Corner::BottomRight)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Corner::TopLeft => "tl",
            Corner::TopRight => "tr",
            Corner::BottomLeft => "bl",
            Corner::BottomRight => "br",
        }
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Corner {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "tl" | "top-left" => Ok(Corner::TopLeft),
            "tr" | "top-right" => Ok(Corner::TopRight),
            "bl" | "bottom-left" => Ok(Corner::BottomLeft),
            "br" | "bottom-right" => Ok(Corner::BottomRight),
            _ => Err(EngineError::UnknownCorner(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OriginRequest {
    /// 恢复到 (0, 0)。
    Reset,
    Absolute(Point2),
    Corner(Corner),
}

/// 取板框（含封装自带的板框图形）包围盒的指定角点。
pub fn select_corner(board: &Board, corner: Corner) -> Result<Point2, EngineError> {
    let bounds = outline_extents(board, OutlineScope::WithFootprints)?.bounds();
    let x = if corner.is_right() {
        bounds.max().x()
    } else {
        bounds.min().x()
    };
    let y = if corner.is_top() {
        bounds.min().y()
    } else {
        bounds.max().y()
    };
    Ok(Point2::new(x, y))
}

#[inline]
pub fn absolute(x: f64, y: f64) -> Point2 {
    Point2::new(x, y)
}

/// 解析请求并写入 `setup.aux_axis_origin`，返回最终原点。出错时文档不变。
pub fn apply_origin(board: &mut Board, request: OriginRequest) -> Result<Point2, EngineError> {
    let origin = match request {
        OriginRequest::Reset => absolute(0.0, 0.0),
        OriginRequest::Absolute(point) => point,
        OriginRequest::Corner(corner) => select_corner(board, corner)?,
    };
    info!(x = origin.x(), y = origin.y(), "设置辅助原点");
    board.set_aux_axis_origin(origin);
    Ok(origin)
}

#[cfg(test)]
mod tests {
    use kmake_core::board::{EDGE_CUTS_LAYER, Shape};

    use super::*;

    fn rectangle(width: f64, height: f64) -> Board {
        let mut board = Board::new();
        board.add_shape(Shape::polygon(
            [
                Point2::new(0.0, 0.0),
                Point2::new(width, 0.0),
                Point2::new(width, height),
                Point2::new(0.0, height),
            ],
            EDGE_CUTS_LAYER,
        ));
        board
    }

    #[test]
    fn corner_names() {
        assert_eq!("tl".parse::<Corner>().unwrap(), Corner::TopLeft);
        assert_eq!("Bottom-Right".parse::<Corner>().unwrap(), Corner::BottomRight);
        assert_eq!("top_right".parse::<Corner>().unwrap(), Corner::TopRight);
        assert!(matches!(
            "middle".parse::<Corner>(),
            Err(EngineError::UnknownCorner(_))
        ));
    }

    #[test]
    fn corners_follow_downward_y_axis() {
        let board = rectangle(10.0, 20.0);
        assert_eq!(
            select_corner(&board, Corner::TopLeft).unwrap(),
            Point2::new(0.0, 0.0)
        );
        assert_eq!(
            select_corner(&board, Corner::BottomRight).unwrap(),
            Point2::new(10.0, 20.0)
        );
    }

    #[test]
    fn circular_board_uses_circumscribed_square() {
        let mut board = Board::new();
        board.add_shape(Shape::circle(
            Point2::new(50.0, 50.0),
            Point2::new(53.0, 54.0),
            EDGE_CUTS_LAYER,
        ));
        let origin = select_corner(&board, Corner::BottomLeft).unwrap();
        assert!((origin.x() - 45.0).abs() < 1e-9);
        assert!((origin.y() - 55.0).abs() < 1e-9);
    }

    #[test]
    fn near_tied_edges_pick_same_corner_in_any_order() {
        let inner = Shape::segment(
            Point2::new(0.08, 0.0),
            Point2::new(0.08, 20.0),
            EDGE_CUTS_LAYER,
        );
        let outer = Shape::segment(Point2::new(0.0, 0.0), Point2::new(0.0, 20.0), EDGE_CUTS_LAYER);
        let mut corners = Vec::new();
        for shapes in [[inner.clone(), outer.clone()], [outer, inner]] {
            let mut board = Board::new();
            for shape in shapes {
                board.add_shape(shape);
            }
            corners.push(select_corner(&board, Corner::BottomLeft).unwrap());
        }
        assert_eq!(corners[0], Point2::new(0.0, 20.0));
        assert_eq!(corners[0], corners[1]);
    }

    #[test]
    fn apply_writes_setup() {
        let mut board = rectangle(10.0, 20.0);
        apply_origin(&mut board, OriginRequest::Corner(Corner::BottomLeft)).unwrap();
        assert_eq!(board.aux_axis_origin(), Point2::new(0.0, 20.0));

        apply_origin(&mut board, OriginRequest::Absolute(absolute(3.5, -1.0))).unwrap();
        assert_eq!(board.aux_axis_origin(), Point2::new(3.5, -1.0));

        apply_origin(&mut board, OriginRequest::Reset).unwrap();
        assert_eq!(board.aux_axis_origin(), Point2::new(0.0, 0.0));
    }

    #[test]
    fn missing_outline_leaves_origin_untouched() {
        let mut board = Board::new();
        board.set_aux_axis_origin(Point2::new(7.0, 7.0));
        let err = apply_origin(&mut board, OriginRequest::Corner(Corner::TopLeft)).unwrap_err();
        assert!(matches!(err, EngineError::EmptyGeometry { .. }));
        assert_eq!(board.aux_axis_origin(), Point2::new(7.0, 7.0));
    }
}
