use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use timeline_core::sim::{Scenario, Simulation, StepReport};

#[derive(Parser, Debug)]
#[command(
    name = "timeline-cli",
    about = "Mô phỏng cuộn qua một timeline và in tiến trình, mục hiện tại, các mục is-stuck."
)]
struct Args {
    /// File JSON mô tả kịch bản; khi có, các tham số kích thước bị bỏ qua.
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    #[arg(long, default_value_t = 2000.0)]
    wrapper_height: f64,

    #[arg(long, default_value_t = 800.0)]
    viewport_height: f64,

    /// Số mục cách đều trong wrapper.
    #[arg(long, default_value_t = 4)]
    items: usize,

    /// Khoảng cuộn giữa hai lần đo (px).
    #[arg(long, default_value_t = 100.0)]
    step: f64,

    /// In mỗi bước dạng một dòng JSON.
    #[arg(long)]
    json: bool,
}

fn load_scenario(args: &Args) -> anyhow::Result<Scenario> {
    let Some(path) = &args.scenario else {
        return Ok(Scenario::evenly_spaced(
            args.viewport_height,
            args.wrapper_height,
            args.items,
            args.step,
        ));
    };
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Không đọc được file {:?}", path))?;
    serde_json::from_str(&data).with_context(|| format!("Kịch bản không hợp lệ trong {:?}", path))
}

fn print_report(report: &StepReport) {
    let current = report
        .current
        .map(|index| index.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "scroll {:>7.1}  {}  target {:.4}  progress {:.4}  frames {:>3}  current {:>2}  stuck {:?}",
        report.scroll_y,
        if report.visible { "visible" } else { "hidden " },
        report.target,
        report.progress,
        report.frames,
        current,
        report.stuck
    );
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let scenario = load_scenario(&args)?;
    let mut simulation = Simulation::new(scenario).context("Không khởi tạo được mô phỏng")?;

    for report in simulation.run() {
        if args.json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            print_report(&report);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_build_evenly_spaced_scenario() {
        let args = Args::parse_from([
            "timeline-cli",
            "--wrapper-height",
            "1000",
            "--items",
            "3",
            "--step",
            "40",
        ]);
        let scenario = load_scenario(&args).unwrap();
        assert_eq!(scenario.wrapper_height, 1000.0);
        assert_eq!(scenario.viewport_height, 800.0);
        assert_eq!(scenario.mark_offsets, vec![250.0, 500.0, 750.0]);
        assert_eq!(scenario.scroll_step, 40.0);
    }

    #[test]
    fn missing_scenario_file_reports_path() {
        let args = Args::parse_from(["timeline-cli", "--scenario", "/nonexistent/scenario.json"]);
        let err = load_scenario(&args).unwrap_err();
        assert!(format!("{err}").contains("scenario.json"));
    }
}
