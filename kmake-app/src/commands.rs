use std::path::PathBuf;

use kmake_config::AppConfig;
use kmake_core::board::Board;
use kmake_engine::origin::apply_origin;
use kmake_engine::wireframe::reset_wireframe_layers;
use kmake_engine::{EngineError, filter_board};
use kmake_io::{BoardLoader, BoardSaver, IoError, JsonBoardFacade, SNAPSHOT_EXTENSION, board_stem};
use thiserror::Error;
use tracing::info;

use crate::cli::{AuxOriginArgs, Commands, PcbFilterArgs, WireframeArgs};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Io(#[from] IoError),
}

pub fn run(command: Commands, config: &AppConfig) -> Result<(), AppError> {
    match command {
        Commands::PcbFilter(args) => pcb_filter(&args, config),
        Commands::AuxOrigin(args) => aux_origin(&args),
        Commands::Wireframe(args) => wireframe(&args, config),
    }
}

fn pcb_filter(args: &PcbFilterArgs, config: &AppConfig) -> Result<(), AppError> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| config.output.filter_outfile.clone());
    let input = if args.cascade && output.exists() {
        info!(path = %output.display(), "级联模式：以已有输出作为输入");
        output.clone()
    } else {
        args.input.clone()
    };

    let facade = JsonBoardFacade::pretty();
    let board = facade.load(&input)?;
    let filtered = filter_board(&board, &args.filter_config(&config.geometry))?;
    facade.save(&filtered, &output)?;
    log_summary(&filtered, &output);
    Ok(())
}

fn aux_origin(args: &AuxOriginArgs) -> Result<(), AppError> {
    let facade = JsonBoardFacade::pretty();
    let mut board = facade.load(&args.input)?;
    apply_origin(&mut board, args.target.request())?;
    let output = args.output.as_ref().unwrap_or(&args.input);
    facade.save(&board, output)?;
    log_summary(&board, output);
    Ok(())
}

fn wireframe(args: &WireframeArgs, config: &AppConfig) -> Result<(), AppError> {
    let facade = JsonBoardFacade::pretty();
    let mut board = facade.load(&args.input)?;

    if args.reset {
        reset_wireframe_layers(&mut board);
        facade.save(&board, &args.input)?;
        log_summary(&board, &args.input);
        return Ok(());
    }

    let preset = args.preset.unwrap_or_default();
    let dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.output.wireframe_dir.clone());
    let views = preset.views_with_geometry(
        &board_stem(&args.input),
        config.geometry.frame_margin,
        config.geometry.dimension_offset,
    );

    // 全部视图成功后再写盘
    let mut outputs: Vec<(PathBuf, Board)> = Vec::with_capacity(views.len());
    for view in &views {
        let filtered = filter_board(&board, &view.config)?;
        outputs.push((dir.join(format!("{}.{SNAPSHOT_EXTENSION}", view.name)), filtered));
    }
    for (path, filtered) in &outputs {
        facade.save(filtered, path)?;
        info!(
            preset = %preset,
            path = %path.display(),
            layers = preset.layers(),
            "已导出线框视图"
        );
    }
    Ok(())
}

fn log_summary(board: &Board, path: &std::path::Path) {
    info!(
        path = %path.display(),
        footprints = board.footprints().count(),
        graphics = board.graphics().count(),
        dimensions = board.dimensions().count(),
        tracks = board.tracks().count(),
        origin_x = board.aux_axis_origin().x(),
        origin_y = board.aux_axis_origin().y(),
        "板文件已写出"
    );
}
