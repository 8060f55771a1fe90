use w3d_ir::TimelineChange;

use crate::bind::{ActionListId, BoundTimeline, TimelineId};

/// Playback state of one timeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimelineInstance {
    pub running: bool,
    /// Seconds since the current run started, excluding stopped time.
    pub elapsed: f64,
    /// Index of the next entry to fire.
    pub cursor: usize,
    /// Incremented on every start; lists queued by an older run are stale.
    pub run: u64,
    /// Whether the current run has been polled at least once. An unpolled
    /// run fires its due entries without advancing.
    polled: bool,
    started: bool,
}

/// A list fired by a timeline, tagged with the run that fired it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineFiring {
    pub timeline: TimelineId,
    pub run: u64,
    pub list: ActionListId,
}

/// Runs every timeline of a project side by side.
#[derive(Debug, Clone, Default)]
pub struct TimelineScheduler {
    instances: Vec<TimelineInstance>,
}

impl TimelineScheduler {
    pub fn new(count: usize) -> Self {
        Self {
            instances: vec![TimelineInstance::default(); count],
        }
    }

    pub fn instance(&self, id: TimelineId) -> &TimelineInstance {
        &self.instances[id.index()]
    }

    pub fn is_running(&self, id: TimelineId) -> bool {
        self.instances[id.index()].running
    }

    /// Whether lists from `run` of `timeline` may still be dispatched.
    pub fn is_current(&self, timeline: TimelineId, run: u64) -> bool {
        let instance = &self.instances[timeline.index()];
        instance.running && instance.run == run
    }

    /// Stop everything and forget positions.
    pub fn reset(&mut self) {
        for instance in &mut self.instances {
            let run = instance.run;
            *instance = TimelineInstance {
                run: run + 1,
                ..TimelineInstance::default()
            };
        }
    }

    pub fn start(&mut self, id: TimelineId) {
        let instance = &mut self.instances[id.index()];
        instance.running = true;
        instance.elapsed = 0.0;
        instance.cursor = 0;
        instance.run += 1;
        instance.polled = false;
        instance.started = true;
    }

    pub fn stop(&mut self, id: TimelineId) {
        self.instances[id.index()].running = false;
    }

    /// Apply a timeline action. Returns whether the timeline's state changed.
    pub fn apply(&mut self, id: TimelineId, change: TimelineChange) -> bool {
        let instance = &mut self.instances[id.index()];
        match change {
            TimelineChange::Start => {
                self.start(id);
                true
            }
            TimelineChange::Stop => {
                let was = instance.running;
                self.stop(id);
                was
            }
            TimelineChange::Continue => {
                if instance.running {
                    false
                } else if instance.started {
                    instance.running = true;
                    instance.polled = false;
                    true
                } else {
                    self.start(id);
                    true
                }
            }
            TimelineChange::StartIfNotStarted => {
                if instance.running {
                    false
                } else {
                    self.start(id);
                    true
                }
            }
        }
    }

    /// Advance every running timeline that has already been polled by `dt`
    /// and collect due lists, in timeline declaration order.
    pub fn advance(
        &mut self,
        timelines: &[BoundTimeline],
        dt: f64,
        epsilon: f64,
    ) -> Vec<TimelineFiring> {
        let mut fired = Vec::new();
        for (index, instance) in self.instances.iter_mut().enumerate() {
            if !instance.running {
                continue;
            }
            if instance.polled {
                instance.elapsed += dt;
            }
            instance.polled = true;
            collect_due(
                TimelineId::from_index(index),
                instance,
                &timelines[index],
                epsilon,
                &mut fired,
            );
        }
        fired
    }

    /// Collect due lists of runs started (or resumed) since the last poll,
    /// without advancing them.
    pub fn poll_started(
        &mut self,
        timelines: &[BoundTimeline],
        epsilon: f64,
    ) -> Vec<TimelineFiring> {
        let mut fired = Vec::new();
        for (index, instance) in self.instances.iter_mut().enumerate() {
            if instance.running && !instance.polled {
                instance.polled = true;
                collect_due(
                    TimelineId::from_index(index),
                    instance,
                    &timelines[index],
                    epsilon,
                    &mut fired,
                );
            }
        }
        fired
    }
}

fn collect_due(
    id: TimelineId,
    instance: &mut TimelineInstance,
    timeline: &BoundTimeline,
    epsilon: f64,
    fired: &mut Vec<TimelineFiring>,
) {
    while let Some(&(offset, list)) = timeline.entries.get(instance.cursor) {
        if instance.elapsed + epsilon < offset {
            break;
        }
        instance.cursor += 1;
        fired.push(TimelineFiring {
            timeline: id,
            run: instance.run,
            list,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline(offsets: &[f64]) -> BoundTimeline {
        BoundTimeline {
            name: "t".into(),
            start_immediately: false,
            entries: offsets
                .iter()
                .enumerate()
                .map(|(i, o)| (*o, ActionListId::from_index(i)))
                .collect(),
        }
    }

    fn lists(fired: &[TimelineFiring]) -> Vec<usize> {
        fired.iter().map(|f| f.list.index()).collect()
    }

    #[test]
    fn test_start_fires_zero_offset_without_advancing() {
        let timelines = vec![timeline(&[0.0, 1.0])];
        let mut scheduler = TimelineScheduler::new(1);
        let id = TimelineId::from_index(0);
        scheduler.start(id);
        let fired = scheduler.poll_started(&timelines, 1e-9);
        assert_eq!(lists(&fired), vec![0]);
        assert_eq!(scheduler.instance(id).elapsed, 0.0);
        assert!(scheduler.poll_started(&timelines, 1e-9).is_empty());
    }

    #[test]
    fn test_offsets_fire_once_in_order() {
        let timelines = vec![timeline(&[0.5, 0.5, 1.0, 3.0])];
        let mut scheduler = TimelineScheduler::new(1);
        scheduler.start(TimelineId::from_index(0));
        scheduler.poll_started(&timelines, 1e-9);
        assert_eq!(lists(&scheduler.advance(&timelines, 0.5, 1e-9)), vec![0, 1]);
        assert_eq!(lists(&scheduler.advance(&timelines, 0.5, 1e-9)), vec![2]);
        assert!(scheduler.advance(&timelines, 0.5, 1e-9).is_empty());
        // Past the last offset the timeline keeps running.
        assert_eq!(lists(&scheduler.advance(&timelines, 5.0, 1e-9)), vec![3]);
        assert!(scheduler.is_running(TimelineId::from_index(0)));
    }

    #[test]
    fn test_stop_and_continue_keep_position() {
        let timelines = vec![timeline(&[0.0, 1.0, 2.0])];
        let id = TimelineId::from_index(0);
        let mut scheduler = TimelineScheduler::new(1);
        scheduler.start(id);
        scheduler.poll_started(&timelines, 1e-9);
        scheduler.advance(&timelines, 1.0, 1e-9);
        assert!(scheduler.apply(id, TimelineChange::Stop));
        assert!(scheduler.advance(&timelines, 5.0, 1e-9).is_empty());
        assert!(scheduler.apply(id, TimelineChange::Continue));
        assert!(scheduler.poll_started(&timelines, 1e-9).is_empty());
        assert!((scheduler.instance(id).elapsed - 1.0).abs() < 1e-12);
        assert_eq!(lists(&scheduler.advance(&timelines, 1.0, 1e-9)), vec![2]);
    }

    #[test]
    fn test_continue_on_never_started_starts() {
        let timelines = vec![timeline(&[0.0])];
        let id = TimelineId::from_index(0);
        let mut scheduler = TimelineScheduler::new(1);
        assert!(scheduler.apply(id, TimelineChange::Continue));
        assert_eq!(lists(&scheduler.poll_started(&timelines, 1e-9)), vec![0]);
    }

    #[test]
    fn test_start_if_not_started() {
        let id = TimelineId::from_index(0);
        let mut scheduler = TimelineScheduler::new(1);
        assert!(scheduler.apply(id, TimelineChange::StartIfNotStarted));
        let run = scheduler.instance(id).run;
        assert!(!scheduler.apply(id, TimelineChange::StartIfNotStarted));
        assert_eq!(scheduler.instance(id).run, run);
        assert!(scheduler.apply(id, TimelineChange::Start));
        assert_eq!(scheduler.instance(id).run, run + 1);
    }

    #[test]
    fn test_restart_makes_old_run_stale() {
        let id = TimelineId::from_index(0);
        let mut scheduler = TimelineScheduler::new(1);
        scheduler.start(id);
        let old = scheduler.instance(id).run;
        assert!(scheduler.is_current(id, old));
        scheduler.start(id);
        assert!(!scheduler.is_current(id, old));
        scheduler.stop(id);
        assert!(!scheduler.is_current(id, old + 1));
    }
}
