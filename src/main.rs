use std::process::ExitCode;

use vscurves::configuration::CurveConfiguration;
use vscurves::math::curve::curveerror::CurveResult;
use vscurves::math::curve::vectorspacecurve::VectorSpaceCurve;

const SAMPLES_PER_SEGMENT: usize = 4;

fn run(config_path: &str) -> CurveResult<()> {
    let configuration = CurveConfiguration::from_reader(config_path)?;
    let curve = configuration.build()?;
    print!("{}", curve);

    let times: Vec<f64> = curve.all_coefficients().iter().map(|s| s.time()).collect();
    for window in times.windows(2) {
        let dt = (window[1] - window[0]) / SAMPLES_PER_SEGMENT as f64;
        for i in 0..SAMPLES_PER_SEGMENT {
            let t = window[0] + dt * i as f64;
            let value = curve.evaluate(t)?;
            let entries: Vec<String> = value.iter().map(|v| format!("{:.6}", v)).collect();
            println!("{:.6}, {}", t, entries.join(", "));
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let Some(config_path) = std::env::args().nth(1) else {
        eprintln!("usage: vscurves <curve.json>");
        return ExitCode::FAILURE;
    };
    match run(&config_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {}", error);
            ExitCode::FAILURE
        }
    }
}
