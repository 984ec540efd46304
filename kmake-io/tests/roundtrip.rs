use kmake_core::board::{
    Board, Dimension, DimensionKind, DimensionOrientation, EDGE_CUTS_LAYER, FRONT_COPPER_LAYER,
    Footprint, Pad, Shape, Text, TrackItem, Via,
};
use kmake_core::geometry::{Placement, Point2};
use kmake_io::{BoardLoader, BoardSaver, IoError, JsonBoardFacade};

fn sample_board() -> Board {
    let mut board = Board::new();
    board.add_shape(Shape::arc(
        Point2::new(0.0, 5.0),
        Point2::new(1.5, 1.5),
        Point2::new(5.0, 0.0),
        EDGE_CUTS_LAYER,
    ));
    board.add_shape(Shape::text("SHA 0badf00d", Point2::new(2.0, 2.0), "F.SilkS"));
    board.add_footprint(
        Footprint::new(
            "Connector:Header",
            "J1",
            "HDR",
            FRONT_COPPER_LAYER,
            Placement::new(Point2::new(10.0, 4.0), Some(90.0)),
        )
        .with_pad(Pad::new("1", ["*.Cu"]))
        .with_shape(Shape::circle(
            Point2::new(0.0, 0.0),
            Point2::new(0.5, 0.0),
            "User.9",
        )),
    );
    board.add_dimension(Dimension {
        kind: DimensionKind::Orthogonal(DimensionOrientation::Horizontal),
        layer: "Cmts.User".into(),
        start: Point2::new(0.0, 0.0),
        end: Point2::new(5.0, 0.0),
        height: -3.0,
        text: Text::new("5.00", Point2::new(2.5, -3.0), "Cmts.User"),
    });
    board.add_track(TrackItem::Via(Via {
        position: Point2::new(3.0, 3.0),
        size: 0.6,
        drill: 0.3,
        layers: vec!["F.Cu".into(), "B.Cu".into()],
        net: 2,
    }));
    board.set_aux_axis_origin(Point2::new(0.0, 5.0));
    board
}

#[test]
fn board_survives_save_and_load() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("nested").join("demo.kicad_pcb.json");
    let facade = JsonBoardFacade::pretty();
    let board = sample_board();

    facade.save(&board, &path).expect("写出快照");
    let loaded = facade.load(&path).expect("读取快照");
    assert_eq!(loaded, board);
}

#[test]
fn missing_file_is_read_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let err = JsonBoardFacade::new()
        .load(&dir.path().join("absent.json"))
        .unwrap_err();
    assert!(matches!(err, IoError::ReadError { .. }));
}

#[test]
fn malformed_snapshot_is_decode_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{\"layers\": 3}").expect("write fixture");
    let err = JsonBoardFacade::new().load(&path).unwrap_err();
    assert!(matches!(err, IoError::Decode { .. }));
}

#[test]
fn hand_written_snapshot_gets_fresh_ids() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("external.json");
    std::fs::write(
        &path,
        r#"{
            "graphics": [
                [7, {"kind": "segment", "start": [0.0, 0.0], "end": [10.0, 0.0], "layer": "Edge.Cuts"}],
                [3, {"kind": "segment", "start": [10.0, 0.0], "end": [10.0, 20.0], "layer": "Edge.Cuts"}]
            ]
        }"#,
    )
    .expect("write fixture");

    let mut board = JsonBoardFacade::new().load(&path).expect("读取快照");
    assert_eq!(board.layers().count(), 0);
    let fresh = board.add_shape(Shape::segment(
        Point2::new(0.0, 20.0),
        Point2::new(0.0, 0.0),
        EDGE_CUTS_LAYER,
    ));
    assert_eq!(fresh.get(), 8);
    assert_eq!(board.graphics().count(), 3);
}
