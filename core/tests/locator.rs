use std::sync::Arc;

use approx::assert_abs_diff_eq;
use rlancore::math::interest_map::ImPoint;
use rlancore::{LocatorConfig, MomentFields, RayProps, RlanLocator, MISSING_VAL};

fn run(locator: &mut RlanLocator, n_gates: usize, fields: &MomentFields) {
    locator.set_ray_props(RayProps::new(n_gates, None));
    locator.set_fields(fields).unwrap();
    locator.locate();
}

fn constant_fields(n_gates: usize, ncp: f64) -> MomentFields {
    MomentFields::default()
        .with_snr(vec![10.0; n_gates])
        .with_vel(vec![0.0; n_gates])
        .with_ncp(vec![ncp; n_gates])
        .with_zdr(vec![0.5; n_gates])
}

fn alternating(n_gates: usize, low: f64, high: f64) -> Vec<f64> {
    (0..n_gates)
        .map(|gate| if gate % 2 == 0 { low } else { high })
        .collect()
}

#[test]
fn steady_echo_is_not_flagged() {
    let mut locator = RlanLocator::new();
    run(&mut locator, 20, &constant_fields(20, 0.9));

    assert!(locator.kernel_applied());
    assert!(locator.rlan_flag().iter().all(|&flag| !flag));
    for gate in 0..20 {
        assert_abs_diff_eq!(locator.phase_change_error()[gate], 0.0, epsilon = 1e-12);
        assert_eq!(locator.snr_sdev()[gate], 0.0);
        assert_abs_diff_eq!(locator.ncp_mean()[gate], 0.9, epsilon = 1e-12);
        assert_abs_diff_eq!(locator.interest()[gate], 1.002 / 3.0, epsilon = 1e-9);
    }
}

#[test]
fn single_saturated_criterion_does_not_flag() {
    let fields = MomentFields::default()
        .with_snr(alternating(20, 10.0, 12.0))
        .with_vel(vec![0.0; 20])
        .with_ncp(vec![0.05; 20]);
    let mut locator = RlanLocator::new();
    run(&mut locator, 20, &fields);

    for gate in 0..20 {
        assert!(locator.snr_sdev()[gate] > 0.75);
        assert_abs_diff_eq!(locator.ncp_mean()[gate], 0.05, epsilon = 1e-12);
        assert_abs_diff_eq!(locator.interest()[gate], 1.002 / 3.0, epsilon = 1e-9);
    }
    assert_eq!(locator.n_flagged(), 0);
}

#[test]
fn two_saturated_criteria_flag_every_gate() {
    let mut locator = RlanLocator::new();
    run(&mut locator, 20, &constant_fields(20, 0.05));

    for gate in 0..20 {
        assert_abs_diff_eq!(locator.interest()[gate], 2.001 / 3.0, epsilon = 1e-9);
    }
    assert!(locator.rlan_flag().iter().all(|&flag| flag));
}

#[test]
fn every_output_has_one_value_per_gate() {
    let mut locator = RlanLocator::new();
    for n_gates in [9usize, 20, 157] {
        run(&mut locator, n_gates, &constant_fields(n_gates, 0.9));
        assert_eq!(locator.rlan_flag().len(), n_gates);
        assert_eq!(locator.phase().len(), n_gates);
        assert_eq!(locator.phase_change_error().len(), n_gates);
        assert_eq!(locator.snr_sdev().len(), n_gates);
        assert_eq!(locator.zdr_sdev().len(), n_gates);
        assert_eq!(locator.ncp_mean().len(), n_gates);
        assert_eq!(locator.snr_mode().len(), n_gates);
        assert_eq!(locator.zdr_dmode().len(), n_gates);
        assert_eq!(locator.interest().len(), n_gates);
        for window in locator.kernel_windows() {
            assert_eq!(window.end_gate - window.start_gate + 1, 9);
            assert!(window.end_gate < n_gates);
        }
    }
}

#[test]
fn ray_one_gate_short_of_kernel_stays_at_defaults() {
    let mut locator = RlanLocator::new();
    run(&mut locator, 8, &constant_fields(8, 0.05));

    assert!(!locator.kernel_applied());
    assert!(locator.rlan_flag().iter().all(|&flag| !flag));
    for metric in [
        locator.phase(),
        locator.phase_change_error(),
        locator.snr_sdev(),
        locator.zdr_sdev(),
        locator.ncp_mean(),
        locator.interest(),
    ] {
        assert_eq!(metric.len(), 8);
        assert!(metric.iter().all(|&val| val == MISSING_VAL));
    }
}

#[test]
fn repeated_locate_is_idempotent() {
    let fields = MomentFields::default()
        .with_snr(alternating(40, 3.0, 9.0))
        .with_vel((0..40).map(|gate| ((gate * 7) % 11) as f64 - 5.0).collect())
        .with_ncp(alternating(40, 0.1, 0.3));
    let mut locator = RlanLocator::new();
    run(&mut locator, 40, &fields);
    let first = locator.output();
    locator.locate();
    assert_eq!(locator.output(), first);
    run(&mut locator, 40, &fields);
    assert_eq!(locator.output(), first);
}

#[test]
fn interference_segment_is_located() {
    // steady weather with a ramped velocity, interference in gates 20..40
    let n_gates = 60;
    let mut snr = alternating(n_gates, 10.0, 14.0);
    let mut ncp = vec![0.9; n_gates];
    for gate in 20..40 {
        snr[gate] = 3.0;
        ncp[gate] = 0.05;
    }
    let vel: Vec<f64> = (0..n_gates).map(|gate| gate as f64 * 0.2).collect();
    let fields = MomentFields::default()
        .with_snr(snr)
        .with_vel(vel)
        .with_ncp(ncp);

    let mut locator = RlanLocator::new();
    locator.set_ray_props(RayProps::new(n_gates, Some(25.0)));
    locator.set_fields(&fields).unwrap();
    locator.locate();

    for (gate, &flag) in locator.rlan_flag().iter().enumerate() {
        assert_eq!(flag, (24..=35).contains(&gate), "gate {}", gate);
    }
    assert_eq!(locator.nyquist_used(), Some(25.0));
}

#[test]
fn erratic_velocity_raises_phase_change_error() {
    let n_gates = 60;
    let vel: Vec<f64> = (0..n_gates)
        .map(|gate| {
            if (20..40).contains(&gate) {
                [20.0, -9.0, 3.0, -22.0, 14.0, -1.0, 24.0][gate % 7]
            } else {
                gate as f64 * 0.2
            }
        })
        .collect();
    let fields = MomentFields::default().with_vel(vel);
    let mut locator = RlanLocator::new();
    locator.set_ray_props(RayProps::new(n_gates, Some(25.0)));
    locator.set_fields(&fields).unwrap();
    locator.locate();

    let pce = locator.phase_change_error();
    let weather = pce[..12].iter().chain(&pce[48..]).fold(0.0_f64, |a, &b| a.max(b));
    let interference = pce[24..36].iter().sum::<f64>() / 12.0;
    assert!(weather < 1e-6);
    assert!(interference > 20.0);
}

#[test]
fn missing_moments_follow_the_configured_fusion_policy() {
    // velocity only: missing SNR and NCP metrics feed their maps as is
    let fields = MomentFields::default().with_vel(vec![0.0; 20]);
    let mut locator = RlanLocator::new();
    run(&mut locator, 20, &fields);
    assert!(locator.snr_sdev().iter().all(|&v| v == MISSING_VAL));
    assert_eq!(locator.n_flagged(), 20);

    let config = LocatorConfig {
        renormalize_missing_criteria: true,
        ..Default::default()
    };
    let mut locator = RlanLocator::with_config(Arc::new(config)).unwrap();
    run(&mut locator, 20, &fields);
    assert_eq!(locator.n_flagged(), 0);
    for &interest in locator.interest() {
        assert_abs_diff_eq!(interest, 0.001, epsilon = 1e-12);
    }
}

#[test]
fn absent_velocity_leaves_phase_missing() {
    let fields = MomentFields::default()
        .with_snr(vec![10.0; 20])
        .with_ncp(vec![0.05; 20]);

    let mut locator = RlanLocator::new();
    run(&mut locator, 20, &fields);
    assert!(locator.phase().iter().all(|&p| p == MISSING_VAL));
    assert!(locator.phase_change_error().iter().all(|&e| e == 0.0));
    assert_eq!(locator.n_flagged(), 20);

    locator.set_renormalize_missing_criteria(true).unwrap();
    run(&mut locator, 20, &fields);
    assert!(locator.phase_change_error().iter().all(|&e| e == MISSING_VAL));
    for &interest in locator.interest() {
        assert_abs_diff_eq!(interest, 1.0, epsilon = 1e-12);
    }
}

#[test]
fn phase_input_takes_precedence_over_velocity() {
    let fields = MomentFields::default()
        .with_vel(vec![0.0; 12])
        .with_phase((0..12).map(|gate| gate as f64 * 10.0).collect());
    let mut locator = RlanLocator::new();
    run(&mut locator, 12, &fields);
    assert_abs_diff_eq!(locator.phase()[11], 110.0, epsilon = 1e-9);
    assert_eq!(locator.nyquist_used(), None);
}

#[test]
fn replaced_interest_map_changes_classification() {
    let mut locator = RlanLocator::new();
    run(&mut locator, 20, &constant_fields(20, 0.9));
    assert_eq!(locator.n_flagged(), 0);

    locator
        .set_interest_map_ncp_mean(vec![ImPoint::new(0.5, 0.0), ImPoint::new(0.8, 1.0)], 1.0)
        .unwrap();
    run(&mut locator, 20, &constant_fields(20, 0.9));
    assert_eq!(locator.n_flagged(), 20);
    let mut dump = Vec::new();
    locator.print_params(&mut dump).unwrap();
    assert!(String::from_utf8(dump).unwrap().contains("x, y: 0.8, 1"));
}

#[test]
fn mode_diagnostics_and_passthrough() {
    let mut locator = RlanLocator::new();
    run(&mut locator, 20, &constant_fields(20, 0.9));
    assert_eq!(locator.snr(), Some(&[10.0; 20][..]));
    assert_abs_diff_eq!(locator.snr_mode()[5], 10.5, epsilon = 1e-9);
    assert_abs_diff_eq!(locator.snr_dmode()[5], -0.5, epsilon = 1e-9);
    assert_eq!(locator.zdr_sdev()[3], 0.0);
}

#[test]
fn output_serializes_to_json() {
    let mut locator = RlanLocator::new();
    run(&mut locator, 20, &constant_fields(20, 0.05));
    let output = locator.output();
    assert_eq!(output.n_flagged(), 20);
    let json = output.to_json().unwrap();
    assert!(json.contains("\"rlan_flag\""));
}

#[test]
fn overflowing_snr_leaves_sdev_missing() {
    let fields = MomentFields::default()
        .with_snr(vec![1.0e200; 20])
        .with_vel(vec![0.0; 20])
        .with_ncp(vec![0.9; 20]);
    let mut locator = RlanLocator::new();
    run(&mut locator, 20, &fields);

    assert!(locator.snr_sdev().iter().all(|&v| v == MISSING_VAL));
    assert!(locator.interest().iter().all(|v| v.is_finite()));
    assert_eq!(locator.n_flagged(), 0);
}

#[test]
fn tiny_nyquist_gives_flat_phase() {
    let fields = constant_fields(20, 0.9).with_vel(vec![1.0; 20]);
    let mut locator = RlanLocator::new();
    locator.set_ray_props(RayProps::new(20, Some(1.0e-310)));
    locator.set_fields(&fields).unwrap();
    locator.locate();

    assert!(locator.phase().iter().all(|&p| p == 0.0));
    assert!(locator.phase_change_error().iter().all(|&e| e == 0.0));
    assert_eq!(locator.n_flagged(), 0);
}

#[test]
fn ray_missing_marker_stays_on_input_side() {
    const RAY_MISSING: f64 = -32768.0;
    let n_gates = 20;
    let mut snr = vec![10.0; n_gates];
    for gate in [3, 10, 15] {
        snr[gate] = RAY_MISSING;
    }
    let mut vel: Vec<f64> = (0..n_gates).map(|gate| gate as f64 * 0.2).collect();
    vel[5] = RAY_MISSING;
    vel[6] = RAY_MISSING;
    let fields = MomentFields::new(RAY_MISSING)
        .with_snr(snr)
        .with_vel(vel)
        .with_ncp(vec![RAY_MISSING; n_gates]);

    let mut locator = RlanLocator::new();
    locator.set_ray_props(RayProps::new(n_gates, Some(25.0)));
    locator.set_fields(&fields).unwrap();
    locator.locate();

    // 0.2 m/s per gate at a 25 m/s Nyquist is 1.44 deg per gate
    let phase = locator.phase();
    assert_abs_diff_eq!(phase[4], 4.0 * 1.44, epsilon = 1e-9);
    assert_eq!(phase[5], phase[4]);
    assert_eq!(phase[6], phase[4]);
    assert_abs_diff_eq!(phase[7], 7.0 * 1.44, epsilon = 1e-9);

    // the marker never enters a window statistic
    assert!(locator.snr_sdev().iter().all(|&v| v == 0.0));
    for &mode in locator.snr_mode() {
        assert_abs_diff_eq!(mode, 10.5, epsilon = 1e-12);
    }
    assert!(locator.ncp_mean().iter().all(|&v| v == MISSING_VAL));
    assert_eq!(locator.snr_dmode()[3], MISSING_VAL);

    for metric in [
        locator.phase(),
        locator.phase_change_error(),
        locator.snr_sdev(),
        locator.ncp_mean(),
        locator.interest(),
    ] {
        assert!(metric.iter().all(|&v| v != RAY_MISSING));
    }
    assert_eq!(locator.n_flagged(), 0);
}
