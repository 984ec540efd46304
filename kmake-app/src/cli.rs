use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use kmake_config::GeometryConfig;
use kmake_engine::origin::absolute;
use kmake_engine::wireframe::WireframePreset;
use kmake_engine::{Corner, FilterConfig, OriginRequest, Side};

#[derive(Parser, Debug)]
#[command(name = "kmake", version, about = "KiCad board filtering and fabrication helpers")]
pub struct Cli {
    #[arg(long, global = true, help = "Configuration file (overrides KMAKE_CONFIG)")]
    pub config: Option<PathBuf>,
    #[arg(short, long, global = true, help = "Enable debug logging")]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a reduced copy of a board
    PcbFilter(PcbFilterArgs),
    /// Set the drill / pick-and-place origin
    AuxOrigin(AuxOriginArgs),
    /// Export per-side outline views, or reset wireframe layers
    Wireframe(WireframeArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideArg {
    Top,
    Bottom,
}

impl From<SideArg> for Side {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::Top => Side::Top,
            SideArg::Bottom => Side::Bottom,
        }
    }
}

#[derive(Args, Debug)]
pub struct PcbFilterArgs {
    #[arg(short, long, help = "Input board snapshot")]
    pub input: PathBuf,
    #[arg(short, long, help = "Output file (defaults to output.filter_outfile)")]
    pub output: Option<PathBuf>,
    #[arg(short, long, help = "Use the output file as input when it already exists")]
    pub cascade: bool,
    #[arg(
        short = 'x',
        long,
        conflicts_with_all = ["allow", "exclude"],
        help = "Reference filter, e.g. `+J+MH-J1`"
    )]
    pub filter: Option<String>,
    #[arg(short, long, num_args = 1.., conflicts_with = "exclude", help = "Keep only these type codes or designators")]
    pub allow: Vec<String>,
    #[arg(short, long, num_args = 1.., help = "Remove these type codes or designators")]
    pub exclude: Vec<String>,
    #[arg(long, conflicts_with = "allow_other", help = "Reference filter for the opposite side")]
    pub filter_other: Option<String>,
    #[arg(long, num_args = 1.., help = "`--allow` applied to the opposite side")]
    pub allow_other: Vec<String>,
    #[arg(short, long, value_enum, help = "Keep only footprints of this side")]
    pub side: Option<SideArg>,
    #[arg(long, help = "Remove the stackup table")]
    pub stackup: bool,
    #[arg(short, long, help = "Remove dimensions")]
    pub dimensions: bool,
    #[arg(short, long, help = "Remove tracks")]
    pub tracks: bool,
    #[arg(short, long, help = "Remove copper and keepout zones")]
    pub zones: bool,
    #[arg(long, help = "Remove vias")]
    pub vias: bool,
    #[arg(short, long, help = "Hide footprint references")]
    pub references: bool,
    #[arg(long, help = "Hide footprint values")]
    pub values: bool,
    #[arg(
        short = 'l',
        long,
        conflicts_with = "allowed_layers_full",
        help = "Keep only these comma separated layers (knockout and SHA text survive)"
    )]
    pub allowed_layers: Option<String>,
    #[arg(long, help = "Keep only these comma separated layers, without exceptions")]
    pub allowed_layers_full: Option<String>,
    #[arg(long, help = "Mirror text when --side bottom is selected")]
    pub mirror: bool,
    #[arg(long, help = "Replace the longest dimensions with outline dimensions")]
    pub standardize_dimensions: bool,
    #[arg(long, help = "Add a rectangular frame around the outline")]
    pub frame: bool,
}

impl PcbFilterArgs {
    pub fn filter_config(&self, geometry: &GeometryConfig) -> FilterConfig {
        let ref_filter = self
            .filter
            .clone()
            .or_else(|| token_pattern('+', &self.allow))
            .or_else(|| token_pattern('-', &self.exclude));
        // 排除列表同样作用于另一面保留下来的封装
        let ref_filter_other = self
            .filter_other
            .clone()
            .or_else(|| token_pattern('+', &self.allow_other))
            .map(|pattern| match token_pattern('-', &self.exclude) {
                Some(exclude) => pattern + &exclude,
                None => pattern,
            });
        let (allowed_layers, allowed_layers_strict) =
            match (&self.allowed_layers, &self.allowed_layers_full) {
                (_, Some(layers)) => (Some(FilterConfig::parse_layers(layers)), true),
                (Some(layers), None) => (Some(FilterConfig::parse_layers(layers)), false),
                (None, None) => (None, false),
            };

        FilterConfig {
            side: self.side.map(Side::from),
            ref_filter,
            ref_filter_other,
            remove_stackup: self.stackup,
            hide_references: self.references,
            hide_values: self.values,
            allowed_layers,
            allowed_layers_strict,
            remove_dimensions: self.dimensions,
            remove_zones: self.zones,
            remove_tracks: self.tracks,
            remove_vias: self.vias,
            mirror_on_bottom: self.mirror,
            standardize_dimensions: self.standardize_dimensions,
            generate_frame: self.frame,
            frame_margin: geometry.frame_margin,
            dimension_offset: geometry.dimension_offset,
        }
    }
}

/// `["J", "MH"]` 与 `+` 组合为 `+J+MH`；列表为空时不生成表达式。
fn token_pattern(sign: char, tokens: &[String]) -> Option<String> {
    if tokens.is_empty() {
        return None;
    }
    Some(tokens.iter().map(|token| format!("{sign}{token}")).collect())
}

#[derive(Args, Debug)]
pub struct AuxOriginArgs {
    #[arg(short, long, help = "Board snapshot to update")]
    pub input: PathBuf,
    #[arg(short, long, help = "Write the result here instead of updating the input")]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub target: OriginTarget,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct OriginTarget {
    #[arg(short, long, help = "Reset the origin to (0, 0)")]
    pub reset: bool,
    #[arg(short, long, help = "Outline corner: tl, tr, bl or br")]
    pub side: Option<Corner>,
    #[arg(
        short,
        long,
        num_args = 2,
        value_names = ["X", "Y"],
        allow_negative_numbers = true,
        help = "Absolute origin position"
    )]
    pub position: Option<Vec<f64>>,
}

impl OriginTarget {
    pub fn request(&self) -> OriginRequest {
        if self.reset {
            return OriginRequest::Reset;
        }
        if let Some(corner) = self.side {
            return OriginRequest::Corner(corner);
        }
        match self.position.as_deref() {
            Some(&[x, y]) => OriginRequest::Absolute(absolute(x, y)),
            _ => OriginRequest::Corner(Corner::BottomLeft),
        }
    }
}

#[derive(Args, Debug)]
pub struct WireframeArgs {
    #[arg(short, long, help = "Input board snapshot")]
    pub input: PathBuf,
    #[arg(short, long, help = "simple, dimensions or descriptions (outline only when omitted)")]
    pub preset: Option<WireframePreset>,
    #[arg(short, long, conflicts_with = "preset", help = "Move footprint outline items to User.9 in place")]
    pub reset: bool,
    #[arg(short, long, help = "Output directory (defaults to output.wireframe_dir)")]
    pub output_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use kmake_core::geometry::Point2;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("kmake").chain(args.iter().copied()))
            .expect("参数应当合法")
    }

    #[test]
    fn allow_list_becomes_additive_pattern() {
        let cli = parse(&["pcb-filter", "-i", "in.json", "-a", "J", "MH", "-s", "top"]);
        let Commands::PcbFilter(args) = cli.command else {
            panic!("expected pcb-filter");
        };
        let config = args.filter_config(&GeometryConfig::default());
        assert_eq!(config.ref_filter.as_deref(), Some("+J+MH"));
        assert_eq!(config.side, Some(Side::Top));
        assert!(config.ref_filter_other.is_none());
    }

    #[test]
    fn exclude_list_also_applies_to_other_side() {
        let cli = parse(&[
            "pcb-filter",
            "-i",
            "in.json",
            "-s",
            "top",
            "--allow-other",
            "J",
            "-e",
            "J2",
        ]);
        let Commands::PcbFilter(args) = cli.command else {
            panic!("expected pcb-filter");
        };
        let config = args.filter_config(&GeometryConfig::default());
        assert_eq!(config.ref_filter.as_deref(), Some("-J2"));
        assert_eq!(config.ref_filter_other.as_deref(), Some("+J-J2"));
    }

    #[test]
    fn full_layer_list_is_strict() {
        let cli = parse(&[
            "pcb-filter",
            "-i",
            "in.json",
            "--allowed-layers-full",
            "Edge.Cuts,User.9",
        ]);
        let Commands::PcbFilter(args) = cli.command else {
            panic!("expected pcb-filter");
        };
        let config = args.filter_config(&GeometryConfig::default());
        assert!(config.allowed_layers_strict);
        assert_eq!(config.allowed_layers.map(|layers| layers.len()), Some(2));
    }

    #[test]
    fn origin_target_is_exclusive_and_required() {
        assert!(Cli::try_parse_from(["kmake", "aux-origin", "-i", "b.json"]).is_err());
        assert!(
            Cli::try_parse_from(["kmake", "aux-origin", "-i", "b.json", "-r", "-s", "tl"]).is_err()
        );

        let cli = parse(&["aux-origin", "-i", "b.json", "-p", "1.5", "-2"]);
        let Commands::AuxOrigin(args) = cli.command else {
            panic!("expected aux-origin");
        };
        assert_eq!(
            args.target.request(),
            OriginRequest::Absolute(Point2::new(1.5, -2.0))
        );
    }

    #[test]
    fn corner_names_parse_through_engine() {
        let cli = parse(&["aux-origin", "-i", "b.json", "--side", "tr"]);
        let Commands::AuxOrigin(args) = cli.command else {
            panic!("expected aux-origin");
        };
        assert_eq!(args.target.request(), OriginRequest::Corner(Corner::TopRight));
        assert!(Cli::try_parse_from(["kmake", "aux-origin", "-i", "b.json", "-s", "mid"]).is_err());
    }
}
