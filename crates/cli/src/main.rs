use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use mountform::canon::{canonicalize, CanonCfg, CanonReport, WiderEnd};
use mountform::contour::{
    calibrate, relative_epsilon, simplify_closed, symmetrize, to_units, Reference, SymmetrizeCfg,
    SymmetrizeReport,
};
use mountform::io::{stl, svg};
use mountform::pose::HullStablePoses;
use mountform::GeomCfg;
use serde::Serialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;
use tracing_subscriber::EnvFilter;

mod provenance;

use provenance::{write_sidecar, Payload};

#[derive(Parser)]
#[command(name = "mountform", version)]
#[command(about = "Canonical print poses for scanned parts and symmetric mounting templates")]
struct Cmd {
    /// Log filter used when RUST_LOG is unset (e.g. `debug`, `mountform=trace`)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Put an STL mesh into its canonical print pose
    Orient(OrientArgs),
    /// Symmetrize a traced outline (SVG path) left/right
    Refine(RefineArgs),
    /// Convert a pixel-space outline to physical units and simplify it
    Trace(TraceArgs),
    /// Print a small provenance JSON block
    Report,
}

#[derive(Args, Serialize)]
struct OrientArgs {
    input: PathBuf,
    #[arg(long)]
    out: PathBuf,
    /// Turn the part over after pose selection
    #[arg(long)]
    flip: bool,
    /// Fraction of the Y range compared by the top-width check
    #[arg(long, default_value_t = 0.1)]
    slice_fraction: f64,
    /// Which Y end should carry the wider slice
    #[arg(long, value_enum, default_value_t = End::Top)]
    wider_end: End,
    /// Write `<out>.provenance.json` next to the output
    #[arg(long)]
    #[serde(skip)]
    provenance: bool,
}

#[derive(Clone, Copy, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
enum End {
    Top,
    Bottom,
}

impl From<End> for WiderEnd {
    fn from(end: End) -> Self {
        match end {
            End::Top => WiderEnd::Top,
            End::Bottom => WiderEnd::Bottom,
        }
    }
}

#[derive(Args, Serialize)]
struct RefineArgs {
    input: PathBuf,
    #[arg(long)]
    out: PathBuf,
    /// Number of scan levels across the outline height
    #[arg(long, default_value_t = 200)]
    slices: usize,
    /// viewBox padding around the result, in output units
    #[arg(long, default_value_t = svg::DEFAULT_MARGIN)]
    margin: f64,
    #[arg(long)]
    #[serde(skip)]
    provenance: bool,
}

#[derive(Args, Serialize)]
struct TraceArgs {
    input: PathBuf,
    #[arg(long)]
    out: PathBuf,
    /// Outline of an ID-1 card photographed with the part
    #[arg(long, conflicts_with = "ppu")]
    reference: Option<PathBuf>,
    /// Pixels per millimetre, when known
    #[arg(long)]
    ppu: Option<f64>,
    /// Douglas-Peucker tolerance as a fraction of the perimeter (0 disables)
    #[arg(long, default_value_t = 0.001)]
    simplify: f64,
    #[arg(long, default_value_t = svg::DEFAULT_MARGIN)]
    margin: f64,
    #[arg(long)]
    #[serde(skip)]
    provenance: bool,
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    init_logging(&cmd.log_level);
    match cmd.action {
        Action::Orient(args) => orient(&args).map(|_| ()),
        Action::Refine(args) => refine(&args).map(|_| ()),
        Action::Trace(args) => trace(&args).map(|_| ()),
        Action::Report => report(),
    }
}

fn init_logging(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    SubscriberBuilder::default()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn orient(args: &OrientArgs) -> Result<CanonReport> {
    tracing::info!(input = %args.input.display(), out = %args.out.display(), "orient");
    let mesh =
        stl::load(&args.input).with_context(|| format!("reading {}", args.input.display()))?;
    let cfg = CanonCfg {
        flip: args.flip,
        slice_fraction: args.slice_fraction,
        wider_end: args.wider_end.into(),
        ..CanonCfg::default()
    };
    let canonical = canonicalize(mesh, &cfg, &HullStablePoses::default())
        .with_context(|| format!("canonicalizing {}", args.input.display()))?;
    if !canonical.report.is_canonical() {
        tracing::warn!("no stable pose; output keeps the input orientation");
    }
    ensure_parent(&args.out)?;
    stl::save(&args.out, &canonical.mesh)
        .with_context(|| format!("writing {}", args.out.display()))?;
    if args.provenance {
        let payload = Payload::new("orient", serde_json::to_value(args)?)
            .with_report(canon_report_json(&canonical.report));
        write_sidecar(&args.out, payload)?;
    }
    Ok(canonical.report)
}

fn refine(args: &RefineArgs) -> Result<SymmetrizeReport> {
    tracing::info!(input = %args.input.display(), out = %args.out.display(), "refine");
    let contour = svg::read_contour(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let cfg = SymmetrizeCfg { slices: args.slices };
    let refined = symmetrize(contour, &cfg)
        .with_context(|| format!("symmetrizing {}", args.input.display()))?;
    ensure_parent(&args.out)?;
    svg::write_contour(&args.out, &refined.contour, args.margin)
        .with_context(|| format!("writing {}", args.out.display()))?;
    if args.provenance {
        let report = json!({
            "centroid": [refined.report.centroid.x, refined.report.centroid.y],
            "levels": refined.report.levels,
            "kept": refined.report.kept,
            "skipped": refined.report.skipped,
            "points": refined.contour.len(),
        });
        let payload = Payload::new("refine", serde_json::to_value(args)?).with_report(report);
        write_sidecar(&args.out, payload)?;
    }
    Ok(refined.report)
}

fn trace(args: &TraceArgs) -> Result<usize> {
    tracing::info!(input = %args.input.display(), out = %args.out.display(), "trace");
    let raw = svg::read_contour(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let (ppu, short_ppu) = match (&args.reference, args.ppu) {
        (Some(path), _) => {
            let card = svg::read_contour(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let cal = calibrate(&card, Reference::ID1_CARD, GeomCfg::default())
                .with_context(|| format!("calibrating from {}", path.display()))?;
            (cal.pixels_per_unit, Some(cal.short_side_ppu))
        }
        (None, Some(ppu)) => (ppu, None),
        (None, None) => {
            tracing::warn!("no --reference or --ppu given; keeping pixel units");
            (1.0, None)
        }
    };
    let mut contour = to_units(&raw, ppu)?;
    if args.simplify > 0.0 {
        contour = simplify_closed(&contour, relative_epsilon(&contour, args.simplify));
    }
    tracing::info!(ppu, before = raw.len(), after = contour.len(), "trace converted");
    ensure_parent(&args.out)?;
    svg::write_contour(&args.out, &contour, args.margin)
        .with_context(|| format!("writing {}", args.out.display()))?;
    if args.provenance {
        let report = json!({
            "pixels_per_unit": ppu,
            "short_side_ppu": short_ppu,
            "points_in": raw.len(),
            "points_out": contour.len(),
        });
        let payload = Payload::new("trace", serde_json::to_value(args)?).with_report(report);
        write_sidecar(&args.out, payload)?;
    }
    Ok(contour.len())
}

fn report() -> Result<()> {
    let obj = json!({
        "code_rev": provenance::current_git_rev(),
        "version": mountform::VERSION,
        "params": {},
        "outputs": []
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

fn canon_report_json(r: &CanonReport) -> Value {
    json!({
        "pose_probability": r.pose_probability,
        "flipped": r.flipped,
        "align_angle_deg": r.align_angle.to_degrees(),
        "min_rect_area": r.min_rect_area,
        "landscape_turned": r.landscape_turned,
        "top_width": r.top_width,
        "bottom_width": r.bottom_width,
        "half_turned": r.half_turned,
        "base_shift": r.base_shift,
    })
}

fn ensure_parent(out: &Path) -> Result<()> {
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mountform::contour::Contour;
    use mountform::mesh::special;
    use mountform::{Vector2, Vector3};
    use tempfile::tempdir;

    fn parse(argv: &[&str]) -> Cmd {
        Cmd::try_parse_from(argv).unwrap()
    }

    #[test]
    fn parses_orient_flags() {
        let cmd = parse(&[
            "mountform",
            "--log-level",
            "debug",
            "orient",
            "in.stl",
            "--out",
            "out/part.stl",
            "--flip",
            "--wider-end",
            "bottom",
        ]);
        assert_eq!(cmd.log_level, "debug");
        let Action::Orient(args) = cmd.action else {
            panic!("expected orient");
        };
        assert!(args.flip);
        assert!(matches!(args.wider_end, End::Bottom));
        assert_eq!(args.slice_fraction, 0.1);
        assert!(!args.provenance);
    }

    #[test]
    fn trace_rejects_reference_and_ppu_together() {
        let res = Cmd::try_parse_from([
            "mountform",
            "trace",
            "a.svg",
            "--out",
            "b.svg",
            "--reference",
            "card.svg",
            "--ppu",
            "3",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn orient_writes_level_landscape_stl_and_sidecar() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("part.stl");
        let mut mesh = special::cuboid(2.0, 6.0, 1.0);
        mesh.translate(Vector3::new(3.0, 4.0, 5.0));
        stl::save(&input, &mesh).unwrap();

        let args = OrientArgs {
            input,
            out: dir.path().join("out").join("part.stl"),
            flip: false,
            slice_fraction: 0.1,
            wider_end: End::Top,
            provenance: true,
        };
        let report = orient(&args).unwrap();
        assert!(report.is_canonical());
        let back = stl::load(&args.out).unwrap();
        let e = back.extents();
        assert!((e - Vector3::new(6.0, 2.0, 1.0)).norm() < 1e-4, "extents {e:?}");
        assert!(back.bounds().unwrap().0.z.abs() < 1e-4);

        let sidecar = dir.path().join("out").join("part.provenance.json");
        let parsed: Value = serde_json::from_slice(&std::fs::read(sidecar).unwrap()).unwrap();
        assert_eq!(parsed["command"], "orient");
        assert_eq!(parsed["params"]["wider_end"], "top");
        assert_eq!(parsed["report"]["flipped"], false);
    }

    #[test]
    fn refine_then_trace_round_trip_through_files() {
        let dir = tempdir().unwrap();
        let raw = dir.path().join("raw.svg");
        let blob = Contour::new(vec![
            Vector2::new(100.0, 50.0),
            Vector2::new(140.0, 52.0),
            Vector2::new(150.0, 90.0),
            Vector2::new(120.0, 110.0),
            Vector2::new(95.0, 80.0),
        ]);
        svg::write_contour(&raw, &blob, 5.0).unwrap();

        let refined = RefineArgs {
            input: raw.clone(),
            out: dir.path().join("trace.svg"),
            slices: 40,
            margin: 5.0,
            provenance: false,
        };
        let report = refine(&refined).unwrap();
        assert_eq!(report.levels, 40);
        assert!(report.kept > 30);
        let sym = svg::read_contour(&refined.out).unwrap();
        assert!(sym.len() >= 2 * report.kept - 1);

        let traced = TraceArgs {
            input: raw,
            out: dir.path().join("mm.svg"),
            reference: None,
            ppu: Some(10.0),
            simplify: 0.0,
            margin: 5.0,
            provenance: false,
        };
        assert_eq!(trace(&traced).unwrap(), 5);
        let mm = svg::read_contour(&traced.out).unwrap();
        assert!((mm.points[0] - Vector2::new(10.0, 5.0)).norm() < 1e-3);
    }

    #[test]
    fn refine_without_path_fails_with_context() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("empty.svg");
        std::fs::write(&input, "<svg><rect width=\"1\" height=\"1\"/></svg>").unwrap();
        let args = RefineArgs {
            input,
            out: dir.path().join("never.svg"),
            slices: 10,
            margin: 5.0,
            provenance: false,
        };
        let err = refine(&args).unwrap_err();
        assert!(format!("{err:#}").contains("no path data"));
        assert!(!args.out.exists());
    }
}
