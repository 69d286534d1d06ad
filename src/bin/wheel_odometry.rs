// Wheel odometry + EKF localization demo
//
// Runs one seeded simulation of the rectangular trajectory, saves a
// trajectory scatter plot as SVG, renders the error curves with gnuplot and
// prints an error summary.

use gnuplot::{AxesCommon, Caption, Color, Figure};
use itertools::Itertools;
use plotlib::page::Page;
use plotlib::repr::Plot;
use plotlib::style::PointStyle;
use plotlib::view::ContinuousView;

use wheel_odometry::analysis::{error_series, ErrorSummary};
use wheel_odometry::{SimulationConfig, SimulationEngine};

fn main() {
    let config = SimulationConfig::default();
    let mut engine = SimulationEngine::new(config).expect("default configuration is valid");
    engine.reset(42);
    while engine.step().is_ok() {}

    std::fs::create_dir_all("./img").unwrap();

    // Trajectory scatter: truth, dead reckoning, EKF, landmarks
    let htrue = engine
        .history()
        .map(|s| (s.true_pose.x, s.true_pose.y))
        .collect_vec();
    let hdr = engine
        .history()
        .map(|s| (s.odometry_pose.x, s.odometry_pose.y))
        .collect_vec();
    let hest = engine
        .history()
        .map(|s| (s.ekf_pose.x, s.ekf_pose.y))
        .collect_vec();
    let hlm = engine
        .landmarks()
        .iter()
        .map(|lm| (lm.x, lm.y))
        .collect_vec();

    let s0: Plot = Plot::new(htrue).point_style(PointStyle::new().colour("#0000ff").size(2.));
    let s1: Plot = Plot::new(hdr).point_style(PointStyle::new().colour("#FFFF00").size(2.));
    let s2: Plot = Plot::new(hest).point_style(PointStyle::new().colour("#35C788").size(2.));
    let s3: Plot = Plot::new(hlm).point_style(PointStyle::new().colour("#DD3355").size(4.));

    let v = ContinuousView::new()
        .add(s0)
        .add(s1)
        .add(s2)
        .add(s3)
        .x_range(-2., 12.)
        .y_range(-2., 10.)
        .x_label("x")
        .y_label("y");

    Page::single(&v).save("./img/wheel_odometry.svg").unwrap();

    // Error curves over time
    let samples = error_series(engine.history()).collect_vec();
    let t = samples.iter().map(|s| s.t).collect_vec();
    let odom_pos = samples.iter().map(|s| s.odometry_position).collect_vec();
    let ekf_pos = samples.iter().map(|s| s.ekf_position).collect_vec();
    let odom_heading = samples
        .iter()
        .map(|s| s.odometry_heading.to_degrees())
        .collect_vec();
    let ekf_heading = samples
        .iter()
        .map(|s| s.ekf_heading.to_degrees())
        .collect_vec();

    let mut fg = Figure::new();
    fg.axes2d()
        .set_title("Position error", &[])
        .set_x_label("time [s]", &[])
        .set_y_label("error [m]", &[])
        .lines(&t, &odom_pos, &[Caption("Dead reckoning"), Color("#FF0000")])
        .lines(&t, &ekf_pos, &[Caption("EKF"), Color("#35C788")]);
    fg.save_to_png("./img/wheel_odometry_position_error.png", 800, 600)
        .unwrap();

    let mut fg = Figure::new();
    fg.axes2d()
        .set_title("Heading error", &[])
        .set_x_label("time [s]", &[])
        .set_y_label("error [deg]", &[])
        .lines(&t, &odom_heading, &[Caption("Dead reckoning"), Color("#FF0000")])
        .lines(&t, &ekf_heading, &[Caption("EKF"), Color("#35C788")]);
    fg.save_to_png("./img/wheel_odometry_heading_error.png", 800, 600)
        .unwrap();

    let odom = ErrorSummary::odometry(engine.history()).expect("non-empty history");
    let ekf = ErrorSummary::ekf(engine.history()).expect("non-empty history");
    println!("steps: {}", odom.samples);
    println!(
        "dead reckoning: final {:.3} m, mean {:.3} m, max {:.3} m",
        odom.final_position, odom.mean_position, odom.max_position
    );
    println!(
        "ekf:            final {:.3} m, mean {:.3} m, max {:.3} m",
        ekf.final_position, ekf.mean_position, ekf.max_position
    );
}
