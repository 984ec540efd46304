use kmake_core::board::{Board, EDGE_CUTS_LAYER, Shape};
use kmake_core::geometry::{DirectionalBounds, Extents};
use tracing::{debug, warn};

use crate::errors::EngineError;

/// 外形极值的统计范围：是否纳入封装自带的板框图形。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlineScope {
    BoardOnly,
    WithFootprints,
}

/// 计算板框层（`Edge.Cuts`）的方向包围盒。
///
/// 退化圆弧记录警告后跳过；若没有任何可用的板框图形则返回 `EmptyGeometry`，
/// 不提供默认值，避免后续原点与尺寸标注被悄悄污染。
pub fn outline_extents(board: &Board, scope: OutlineScope) -> Result<Extents, EngineError> {
    let mut bounds = DirectionalBounds::new();
    let mut used = 0usize;
    let mut skipped = 0usize;

    for (id, shape) in board.graphics() {
        if shape.layer_name() != EDGE_CUTS_LAYER {
            continue;
        }
        if include_shape(&mut bounds, shape, &format!("#{}", id.get())) {
            used += 1;
        } else {
            skipped += 1;
        }
    }

    if scope == OutlineScope::WithFootprints {
        for (_, footprint) in board.footprints() {
            for shape in &footprint.shapes {
                if shape.layer_name() != EDGE_CUTS_LAYER {
                    continue;
                }
                let global = shape.to_board(&footprint.placement);
                if include_shape(&mut bounds, &global, footprint.reference()) {
                    used += 1;
                } else {
                    skipped += 1;
                }
            }
        }
    }

    debug!(used, skipped, ?scope, "板框图形统计");
    bounds.extents().ok_or_else(|| EngineError::EmptyGeometry {
        layer: EDGE_CUTS_LAYER.to_string(),
    })
}

fn include_shape(bounds: &mut DirectionalBounds, shape: &Shape, owner: &str) -> bool {
    match shape.extrema() {
        Ok(points) => {
            bounds.include_points(points);
            true
        }
        Err(err) => {
            warn!(owner, error = %err, "板框存在退化圆弧，已跳过");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use kmake_core::board::{FRONT_COPPER_LAYER, Footprint};
    use kmake_core::geometry::{Placement, Point2};

    use super::*;

    fn rectangle_board(width: f64, height: f64) -> Board {
        let mut board = Board::new();
        let corners = [
            Point2::new(0.0, 0.0),
            Point2::new(width, 0.0),
            Point2::new(width, height),
            Point2::new(0.0, height),
        ];
        for index in 0..4 {
            board.add_shape(Shape::segment(
                corners[index],
                corners[(index + 1) % 4],
                EDGE_CUTS_LAYER,
            ));
        }
        board
    }

    #[test]
    fn rectangle_outline_extents() {
        let board = rectangle_board(10.0, 20.0);
        let extents = outline_extents(&board, OutlineScope::BoardOnly).unwrap();
        let bounds = extents.bounds();
        assert_eq!(bounds.min(), Point2::new(0.0, 0.0));
        assert_eq!(bounds.max(), Point2::new(10.0, 20.0));
        assert!((extents.max_x.aux_max - 20.0).abs() < 1e-9);
    }

    #[test]
    fn other_layers_are_ignored() {
        let mut board = rectangle_board(10.0, 20.0);
        board.add_shape(Shape::segment(
            Point2::new(-50.0, -50.0),
            Point2::new(50.0, 50.0),
            "F.SilkS",
        ));
        let bounds = outline_extents(&board, OutlineScope::BoardOnly)
            .unwrap()
            .bounds();
        assert_eq!(bounds.min(), Point2::new(0.0, 0.0));
    }

    #[test]
    fn degenerate_arc_is_skipped() {
        let mut board = rectangle_board(10.0, 20.0);
        board.add_shape(Shape::arc(
            Point2::new(0.0, 0.0),
            Point2::new(20.0, 20.0),
            Point2::new(40.0, 40.0),
            EDGE_CUTS_LAYER,
        ));
        let bounds = outline_extents(&board, OutlineScope::BoardOnly)
            .unwrap()
            .bounds();
        assert_eq!(bounds.max(), Point2::new(10.0, 20.0));
    }

    #[test]
    fn rounded_corner_arc_extends_to_its_compass_point() {
        let mut board = Board::new();
        // 以 (5,5) 为圆心、半径 5 的左上角圆角
        let diagonal = 5.0 - 5.0 * std::f64::consts::FRAC_1_SQRT_2;
        board.add_shape(Shape::arc(
            Point2::new(0.0, 5.0),
            Point2::new(diagonal, diagonal),
            Point2::new(5.0, 0.0),
            EDGE_CUTS_LAYER,
        ));
        let bounds = outline_extents(&board, OutlineScope::BoardOnly)
            .unwrap()
            .bounds();
        assert!((bounds.min().x() - 0.0).abs() < 1e-9);
        assert!((bounds.min().y() - 0.0).abs() < 1e-9);
        assert!((bounds.max().x() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn missing_outline_is_an_error() {
        let mut board = Board::new();
        board.add_shape(Shape::segment(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            "Dwgs.User",
        ));
        let err = outline_extents(&board, OutlineScope::BoardOnly).unwrap_err();
        assert!(matches!(err, EngineError::EmptyGeometry { .. }));
    }

    #[test]
    fn footprint_outline_only_counts_with_footprint_scope() {
        let mut board = rectangle_board(10.0, 20.0);
        let tab = Footprint::new(
            "Board:Tab",
            "MB1",
            "Tab",
            FRONT_COPPER_LAYER,
            Placement::new(Point2::new(10.0, 10.0), Some(90.0)),
        )
        .with_shape(Shape::segment(
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 5.0),
            EDGE_CUTS_LAYER,
        ));
        board.add_footprint(tab);

        let board_only = outline_extents(&board, OutlineScope::BoardOnly)
            .unwrap()
            .bounds();
        assert!((board_only.max().x() - 10.0).abs() < 1e-9);

        // 局部 (0,5) 旋转 90° 后落在板坐标 (15,10)
        let with_tabs = outline_extents(&board, OutlineScope::WithFootprints)
            .unwrap()
            .bounds();
        assert!((with_tabs.max().x() - 15.0).abs() < 1e-9);
    }
}
