#![cfg(feature = "simulation")]

use vitalwave::config::VitalSignsConfig;
use vitalwave::constants::{
    BPM_PER_BIN, FRAMES_PER_CYCLE, NUM_VIRTUAL_ANTENNAS, TARGET_LOSS_FRAMES, WARMUP_CYCLES,
};
use vitalwave::cube::RadarCubeSlice;
use vitalwave::output::VitalSignsResult;
use vitalwave::pipeline::VitalSignsPipeline;
use vitalwave::simulation::VitalsScenario;

const NUM_BINS: usize = 64;
const HINT_BIN: u16 = 24;

fn feed_frames(
    pipeline: &mut VitalSignsPipeline,
    scenario: &VitalsScenario,
    start_frame: usize,
    count: usize,
    target_lost: bool,
) {
    for frame_index in start_frame..start_frame + count {
        pipeline.handle_target_loss(target_lost);
        let data = scenario.generate_frame(frame_index);
        let cube = RadarCubeSlice::new(&data, NUM_BINS, 1, NUM_VIRTUAL_ANTENNAS).unwrap();
        pipeline.process_frame(&cube, HINT_BIN).unwrap();
    }
}

#[test]
fn test_target_loss_suppresses_and_recovers() {
    let mut pipeline = VitalSignsPipeline::new(VitalSignsConfig::default()).unwrap();
    let scenario = VitalsScenario::breathing_only(17);

    // Establish a valid measurement
    feed_frames(&mut pipeline, &scenario, 0, 20 * FRAMES_PER_CYCLE, false);
    let healthy = pipeline.output();
    assert!(healthy.valid);
    assert!(
        (healthy.breathing_rate - 17.0 * BPM_PER_BIN).abs() <= BPM_PER_BIN + 1e-3,
        "breathing rate {:.2} not detected before target loss",
        healthy.breathing_rate
    );

    // Loss must persist for TARGET_LOSS_FRAMES before latching
    let mut frame_index = 20 * FRAMES_PER_CYCLE;
    feed_frames(
        &mut pipeline,
        &scenario,
        frame_index,
        TARGET_LOSS_FRAMES as usize - 1,
        true,
    );
    frame_index += TARGET_LOSS_FRAMES as usize - 1;
    assert!(!pipeline.state().no_target, "no-target must not latch early");

    // After the persistence threshold plus one refresh, everything zeroes
    feed_frames(&mut pipeline, &scenario, frame_index, FRAMES_PER_CYCLE, true);
    frame_index += FRAMES_PER_CYCLE;
    assert!(pipeline.state().no_target);
    assert_eq!(pipeline.output(), VitalSignsResult::default());
    assert!(!pipeline.is_output_ready());

    // Reacquisition clears the latch and valid output returns within the
    // warm-up budget
    feed_frames(
        &mut pipeline,
        &scenario,
        frame_index,
        WARMUP_CYCLES as usize * FRAMES_PER_CYCLE,
        false,
    );
    assert!(!pipeline.state().no_target);
    let recovered = pipeline.output();
    assert!(recovered.valid, "valid output should return after reacquisition");
    assert!(recovered.breathing_rate > 0.0);
}
