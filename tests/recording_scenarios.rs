use std::sync::Arc;

use arc_swap::ArcSwap;
use crossbeam::channel::{bounded, Receiver};
use lem::engine::{
    command_queue, post_production, CommandSender, CycleStatus, Handoff, LoopProcessor,
    RecorderState, RecordingCommand, SharedTrackSet,
};
use lem::sequencing::BeatGrid;
use lem::track::{Frame, PlayingTrack, RecordedTrack, SILENCE};

/// Processor plus the control-side ends of its channels
struct Rig {
    processor: LoopProcessor,
    commands: CommandSender,
    handoffs: Receiver<Handoff>,
    tracks: SharedTrackSet,
    grid: BeatGrid,
    block: usize,
}

impl Rig {
    fn new(len_beat: usize, block: usize) -> Self {
        let grid = BeatGrid::new(len_beat);
        let (commands, receiver) = command_queue(8);
        let (finished, handoffs) = bounded(8);
        let tracks: SharedTrackSet = Arc::new(ArcSwap::from_pointee(Vec::new()));
        let processor = LoopProcessor::new(grid, receiver, finished, tracks.clone(), 0);
        Self {
            processor,
            commands,
            handoffs,
            tracks,
            grid,
            block,
        }
    }

    /// One cycle with input from `source`, returning the output
    fn cycle(&mut self, source: impl Fn(u64) -> Frame) -> Vec<Frame> {
        let start = self.processor.current_frame();
        let input: Vec<Frame> = (0..self.block as u64).map(|i| source(start + i)).collect();
        let mut output = vec![SILENCE; self.block];
        self.processor
            .process(&input, &mut output, CycleStatus::default())
            .unwrap();
        output
    }

    fn run_until(&mut self, frame: u64, source: impl Fn(u64) -> Frame + Copy) {
        while self.processor.current_frame() < frame {
            self.cycle(source);
        }
        assert_eq!(self.processor.current_frame(), frame);
    }

    /// Queue `command` so it is applied exactly at `frame`
    fn command_at(&mut self, frame: u64, command: RecordingCommand, source: impl Fn(u64) -> Frame + Copy) {
        self.run_until(frame, source);
        self.commands.push(command).unwrap();
        self.cycle(source);
    }

    fn finished(&self) -> RecordedTrack {
        match self.handoffs.try_recv() {
            Ok(Handoff::Finished(track)) => track,
            other => panic!("expected a finished take, got {:?}", other),
        }
    }
}

fn constant(value: i16) -> impl Fn(u64) -> Frame + Copy {
    move |_| [value, value]
}

fn ramp(frame: u64) -> Frame {
    let s = (frame % 1_000) as i16;
    [s, -s]
}

#[test]
fn test_first_half_stop_at_120_bpm() {
    let grid = BeatGrid::from_bpm(120, 44_100).unwrap();
    assert_eq!(grid.len_beat(), 22_050);

    let mut rig = Rig::new(grid.len_beat(), 50);
    rig.command_at(0, RecordingCommand::Start, constant(7));
    rig.command_at(22_050 + 5_000, RecordingCommand::Stop, constant(7));

    assert_eq!(rig.processor.recorder_state(), RecorderState::Idle);
    let take = rig.finished();
    assert_eq!(take.first_frame_time, Some(0));
    assert_eq!(take.start_rec_time, Some(0));
    assert_eq!(take.stop_rec_time, Some(27_050));
    assert_eq!(take.len(), 27_050 + 17_050);
    assert!(take.data()[..27_050].iter().all(|f| *f == [7, 7]));
    assert!(take.data()[27_050..].iter().all(|f| *f == SILENCE));

    // Stop was early in beat 2, so that beat is dropped
    let playing = post_production(take, &rig.grid).unwrap().unwrap();
    assert_eq!(playing.loop_len(), 22_050);
    assert_eq!(playing.playing_from_frame(), 0);
}

#[test]
fn test_second_half_stop_drains_to_boundary() {
    let mut rig = Rig::new(100, 10);
    rig.command_at(0, RecordingCommand::Start, ramp);
    rig.command_at(160, RecordingCommand::Stop, ramp);
    assert_eq!(rig.processor.recorder_state(), RecorderState::Draining);
    assert!(rig.handoffs.try_recv().is_err());

    rig.run_until(200, ramp);
    assert_eq!(rig.processor.recorder_state(), RecorderState::Idle);

    let take = rig.finished();
    assert_eq!(take.len(), 200);
    assert_eq!(take.stop_rec_time, Some(160));
    let expected: Vec<Frame> = (0..200).map(ramp).collect();
    assert_eq!(take.data(), &expected[..]);

    let playing = post_production(take, &rig.grid).unwrap().unwrap();
    assert_eq!(playing.loop_len(), 200);
}

#[test]
fn test_start_while_draining_discards_old_take() {
    let mut rig = Rig::new(100, 10);
    rig.command_at(0, RecordingCommand::Start, constant(1));
    rig.command_at(160, RecordingCommand::Stop, constant(1));
    assert_eq!(rig.processor.recorder_state(), RecorderState::Draining);

    rig.command_at(170, RecordingCommand::Start, constant(2));
    assert!(matches!(rig.handoffs.try_recv(), Ok(Handoff::Discarded)));
    assert_eq!(rig.processor.recorder_state(), RecorderState::Recording);

    // Past the boundary where the old take would have finished
    rig.run_until(210, constant(2));
    assert!(rig.handoffs.try_recv().is_err());

    rig.command_at(220, RecordingCommand::Stop, constant(2));
    let take = rig.finished();
    assert_eq!(take.first_frame_time, Some(100));
    assert_eq!(take.start_rec_time, Some(170));
    assert_eq!(take.stop_rec_time, Some(220));
    assert_eq!(take.len(), 200);
    // Pre-roll of the new Start, then only new input, then padding
    assert!(take.data()[..60].iter().all(|f| *f == [1, 1]));
    assert!(take.data()[70..120].iter().all(|f| *f == [2, 2]));
    assert!(take.data()[120..].iter().all(|f| *f == SILENCE));
}

#[test]
fn test_underflow_cycle_is_silent_and_inert() {
    let mut rig = Rig::new(100, 10);
    rig.run_until(30, constant(5));
    rig.commands.push(RecordingCommand::Start).unwrap();

    let input = [[5, 5]; 10];
    let mut output = [[9, 9]; 10];
    rig.processor
        .process(&input, &mut output, CycleStatus { output_underflow: true })
        .unwrap();

    assert_eq!(output, [SILENCE; 10]);
    assert_eq!(rig.processor.current_frame(), 30);
    assert_eq!(rig.processor.recorder_state(), RecorderState::Idle);

    // The command is still queued for the next healthy cycle
    rig.cycle(constant(5));
    assert_eq!(rig.processor.recorder_state(), RecorderState::Recording);
}

#[test]
fn test_queued_commands_apply_one_per_cycle_in_order() {
    let mut rig = Rig::new(100, 10);
    rig.commands.push(RecordingCommand::Start).unwrap();
    rig.commands.push(RecordingCommand::Stop).unwrap();
    rig.commands.push(RecordingCommand::Stop).unwrap();

    rig.cycle(constant(3));
    assert_eq!(rig.processor.recorder_state(), RecorderState::Recording);

    rig.cycle(constant(3));
    let take = rig.finished();
    assert_eq!(take.start_rec_time, Some(0));
    assert_eq!(take.stop_rec_time, Some(10));

    rig.cycle(constant(3));
    assert!(matches!(rig.handoffs.try_recv(), Ok(Handoff::NothingRecorded)));
}

#[test]
fn test_tiny_take_quantizes_to_nothing() {
    let mut rig = Rig::new(100, 10);
    rig.command_at(10, RecordingCommand::Start, constant(4));
    rig.command_at(20, RecordingCommand::Stop, constant(4));

    let take = rig.finished();
    assert!(take.is_complete());
    assert!(post_production(take, &rig.grid).unwrap().is_none());
}

#[test]
fn test_result_independent_of_block_size() {
    let results: Vec<PlayingTrack> = [1usize, 5, 25]
        .into_iter()
        .map(|block| {
            let mut rig = Rig::new(100, block);
            rig.command_at(125, RecordingCommand::Start, ramp);
            rig.command_at(375, RecordingCommand::Stop, ramp);
            rig.run_until(400, ramp);
            post_production(rig.finished(), &rig.grid).unwrap().unwrap()
        })
        .collect();

    assert_eq!(results[0].loop_len(), 300);
    assert_eq!(results[0].playing_from_frame(), 100);
    assert_eq!(results[0], results[1]);
    assert_eq!(results[1], results[2]);
}

#[test]
fn test_committed_take_plays_in_phase() {
    let mut rig = Rig::new(100, 10);
    rig.command_at(100, RecordingCommand::Start, ramp);
    rig.command_at(300, RecordingCommand::Stop, ramp);
    let playing = post_production(rig.finished(), &rig.grid).unwrap().unwrap();
    assert_eq!(playing.playing_from_frame(), 100);
    assert_eq!(playing.loop_len(), 200);

    rig.tracks.store(Arc::new(vec![playing]));
    rig.run_until(500, constant(0));

    // Frame 500 lines up with frame 100 of the take, mean with silent input
    let output = rig.cycle(constant(0));
    let expected: Vec<Frame> = (100..110u64)
        .map(|f| {
            let [l, r] = ramp(f);
            [l / 2, r / 2]
        })
        .collect();
    assert_eq!(output, expected);
}
