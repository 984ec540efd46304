pub mod geometry {
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    use glam::DVec2;
    use serde::{Deserialize, Serialize};
    use thiserror::Error;

    /// 包围盒累加器的并列容差（板单位，毫米）。经验值，用于吸收圆弧与亚微米建模噪声。
    pub const BBOX_TOLERANCE: f64 = 0.1;

    /// 三点共线判定阈值，作用于三点行列式。
    pub const COLLINEAR_EPSILON: f64 = 1e-9;

    /// 外框相对板框的默认外扩距离。
    pub const DEFAULT_FRAME_MARGIN: f64 = 1.0;

    /// 重建尺寸标注相对板框的默认偏移。
    pub const DEFAULT_DIMENSION_OFFSET: f64 = 5.0;

    /// 二维点，内部以 `glam::DVec2` 表示，坐标单位为毫米。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Point2(pub DVec2);

    impl Point2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn from_vec(vec: DVec2) -> Self {
            Self(vec)
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn vector_to(self, other: Point2) -> Vector2 {
            Vector2(other.0 - self.0)
        }

        #[inline]
        pub fn distance(self, other: Point2) -> f64 {
            self.0.distance(other.0)
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Vector2(pub DVec2);

    impl Vector2 {
        #[inline]
        pub fn length(self) -> f64 {
            self.0.length()
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }
    }

    /// 轴对齐边界框，用于外框生成等只关心极值的场合。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Bounds2D {
        min: Point2,
        max: Point2,
    }

    impl Bounds2D {
        #[inline]
        pub fn new(min: Point2, max: Point2) -> Self {
            Self { min, max }
        }

        #[inline]
        pub fn min(&self) -> Point2 {
            self.min
        }

        #[inline]
        pub fn max(&self) -> Point2 {
            self.max
        }

        /// 四边各向外扩展 `margin`。
        pub fn expanded(&self, margin: f64) -> Bounds2D {
            let offset = DVec2::splat(margin);
            Bounds2D::new(
                Point2::from_vec(self.min.as_vec2() - offset),
                Point2::from_vec(self.max.as_vec2() + offset),
            )
        }

        /// 按 左上、右上、右下、左下 顺序返回四个角点（板坐标 y 轴向下）。
        pub fn corners(&self) -> [Point2; 4] {
            [
                self.min,
                Point2::new(self.max.x(), self.min.y()),
                self.max,
                Point2::new(self.min.x(), self.max.y()),
            ]
        }

        #[inline]
        pub fn width(&self) -> f64 {
            self.max.x() - self.min.x()
        }

        #[inline]
        pub fn height(&self) -> f64 {
            self.max.y() - self.min.y()
        }
    }

    /// 封装（footprint）的放置变换：平移 + 可选旋转角（单位为度）。
    ///
    /// 板文件的 y 轴向下，逆时针放置角在数学坐标系中对应负角度，
    /// 因此局部坐标换算到板坐标时对角度取反：`board = position + rotate(local, -angle)`。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Placement {
        pub position: Point2,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub rotation: Option<f64>,
    }

    impl Placement {
        #[inline]
        pub fn new(position: Point2, rotation: Option<f64>) -> Self {
            Self { position, rotation }
        }

        #[inline]
        pub fn at(x: f64, y: f64) -> Self {
            Self::new(Point2::new(x, y), None)
        }

        pub fn to_board(&self, local: Point2) -> Point2 {
            let angle = self.rotation.unwrap_or(0.0);
            if angle == 0.0 {
                return Point2::from_vec(self.position.as_vec2() + local.as_vec2());
            }
            let rotor = DVec2::from_angle(-angle.to_radians());
            Point2::from_vec(self.position.as_vec2() + rotor.rotate(local.as_vec2()))
        }
    }

    impl Default for Placement {
        fn default() -> Self {
            Self::at(0.0, 0.0)
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Error)]
    pub enum GeometryError {
        #[error(
            "arc points are collinear: start=({:.4}, {:.4}) mid=({:.4}, {:.4}) end=({:.4}, {:.4})",
            .start.x(), .start.y(), .mid.x(), .mid.y(), .end.x(), .end.y()
        )]
        DegenerateArc {
            start: Point2,
            mid: Point2,
            end: Point2,
        },
    }

    /// 由三点重建的外接圆。
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct ArcCircle {
        pub center: Point2,
        pub radius: f64,
    }

    impl ArcCircle {
        /// 以垂直平分线交点求外接圆圆心；三点共线时返回 `DegenerateArc`。
        pub fn from_three_points(
            start: Point2,
            mid: Point2,
            end: Point2,
        ) -> Result<Self, GeometryError> {
            let b = mid.as_vec2() - start.as_vec2();
            let c = end.as_vec2() - start.as_vec2();
            let det = b.x * c.y - c.x * b.y;
            if det.abs() <= COLLINEAR_EPSILON {
                return Err(GeometryError::DegenerateArc { start, mid, end });
            }
            let b_len = b.length_squared();
            let c_len = c.length_squared();
            let d = 2.0 * det;
            let offset = DVec2::new(
                (c.y * b_len - b.y * c_len) / d,
                (b.x * c_len - c.x * b_len) / d,
            );
            let center = Point2::from_vec(start.as_vec2() + offset);
            Ok(Self {
                center,
                radius: start.distance(center),
            })
        }

        /// 点相对圆心的极角，归一化到 `[0, 2π)`。
        pub fn angle_of(&self, point: Point2) -> f64 {
            normalize_angle((point.y() - self.center.y()).atan2(point.x() - self.center.x()))
        }

        /// 圆上指定角度处的点，四个轴向角使用精确偏移避免三角函数舍入。
        pub fn point_at(&self, angle: f64) -> Point2 {
            let (cx, cy, r) = (self.center.x(), self.center.y(), self.radius);
            if angle == 0.0 {
                Point2::new(cx + r, cy)
            } else if angle == FRAC_PI_2 {
                Point2::new(cx, cy + r)
            } else if angle == PI {
                Point2::new(cx - r, cy)
            } else if angle == FRAC_PI_2 * 3.0 {
                Point2::new(cx, cy - r)
            } else {
                Point2::new(cx + r * angle.cos(), cy + r * angle.sin())
            }
        }
    }

    pub fn normalize_angle(angle: f64) -> f64 {
        let wrapped = angle.rem_euclid(TAU);
        if wrapped >= TAU { 0.0 } else { wrapped }
    }

    /// 判断 `theta` 是否落在由 `start` 逆时针转到 `end` 的闭区间内（允许跨越 2π）。
    pub fn angle_in_ccw_range(theta: f64, start: f64, end: f64) -> bool {
        if start <= end {
            theta >= start && theta <= end
        } else {
            theta >= start || theta <= end
        }
    }

    /// 圆弧的精确极值点集：三个定义点加上落在弧上的四个轴向点。
    ///
    /// 中点决定走向：若中点不在 start→end 的逆时针区间内，则圆弧实际沿顺时针走，
    /// 等价于 end→start 的逆时针区间。
    pub fn arc_extrema(
        start: Point2,
        mid: Point2,
        end: Point2,
    ) -> Result<Vec<Point2>, GeometryError> {
        let circle = ArcCircle::from_three_points(start, mid, end)?;
        let start_angle = circle.angle_of(start);
        let mid_angle = circle.angle_of(mid);
        let end_angle = circle.angle_of(end);
        let (from, to) = if angle_in_ccw_range(mid_angle, start_angle, end_angle) {
            (start_angle, end_angle)
        } else {
            (end_angle, start_angle)
        };

        let mut points = vec![start, mid, end];
        const COMPASS: [f64; 4] = [0.0, FRAC_PI_2, PI, FRAC_PI_2 * 3.0];
        for candidate in COMPASS {
            if angle_in_ccw_range(candidate, from, to) {
                points.push(circle.point_at(candidate));
            }
        }
        Ok(points)
    }

    /// 极值方向：最小或最大。
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Extreme {
        Min,
        Max,
    }

    /// 单一方向上的极值记录：`main` 为极值坐标，`aux_min..=aux_max` 为
    /// 在容差内达到该极值的点在垂直轴上覆盖的范围。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct BBoxPoint {
        pub main: f64,
        pub aux_min: f64,
        pub aux_max: f64,
    }

    impl BBoxPoint {
        #[inline]
        pub fn new(main: f64, aux: f64) -> Self {
            Self {
                main,
                aux_min: aux,
                aux_max: aux,
            }
        }

        pub fn update(&mut self, extreme: Extreme, main: f64, aux: f64) {
            let advance = match extreme {
                Extreme::Min => self.main - main,
                Extreme::Max => main - self.main,
            };
            if advance > BBOX_TOLERANCE {
                *self = Self::new(main, aux);
            } else if advance >= -BBOX_TOLERANCE {
                // 并列时 main 仍取更极端的值，结果与输入顺序无关
                if advance > 0.0 {
                    self.main = main;
                }
                self.aux_min = self.aux_min.min(aux);
                self.aux_max = self.aux_max.max(aux);
            }
        }

    }

    /// 增量式方向包围盒，四个方向各维护一个 [`BBoxPoint`]。
    #[derive(Debug, Clone, Copy, Default, PartialEq)]
    pub struct DirectionalBounds {
        min_x: Option<BBoxPoint>,
        max_x: Option<BBoxPoint>,
        min_y: Option<BBoxPoint>,
        max_y: Option<BBoxPoint>,
    }

    impl DirectionalBounds {
        #[inline]
        pub fn new() -> Self {
            Self::default()
        }

        pub fn include_point(&mut self, point: Point2) {
            fold(&mut self.min_x, Extreme::Min, point.x(), point.y());
            fold(&mut self.max_x, Extreme::Max, point.x(), point.y());
            fold(&mut self.min_y, Extreme::Min, point.y(), point.x());
            fold(&mut self.max_y, Extreme::Max, point.y(), point.x());
        }

        pub fn include_points<I>(&mut self, points: I)
        where
            I: IntoIterator<Item = Point2>,
        {
            for point in points {
                self.include_point(point);
            }
        }

        /// 至少纳入过一个点时返回完整的四向极值。
        pub fn extents(&self) -> Option<Extents> {
            Some(Extents {
                min_x: self.min_x?,
                max_x: self.max_x?,
                min_y: self.min_y?,
                max_y: self.max_y?,
            })
        }
    }

    fn fold(slot: &mut Option<BBoxPoint>, extreme: Extreme, main: f64, aux: f64) {
        match slot {
            Some(current) => current.update(extreme, main, aux),
            None => *slot = Some(BBoxPoint::new(main, aux)),
        }
    }

    /// 非空的四向极值结果。x 方向的辅助轴为 y，y 方向的辅助轴为 x。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Extents {
        pub min_x: BBoxPoint,
        pub max_x: BBoxPoint,
        pub min_y: BBoxPoint,
        pub max_y: BBoxPoint,
    }

    impl Extents {
        pub fn bounds(&self) -> Bounds2D {
            Bounds2D::new(
                Point2::new(self.min_x.main, self.min_y.main),
                Point2::new(self.max_x.main, self.max_y.main),
            )
        }
    }

}

pub mod board;
