//! Frame-sheet animation timer polled once per tick.

use std::time::Duration;

use grid_siege_core::AnimationClip;

/// Source rectangle of the active frame inside its sheet, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameRect {
    /// Left edge of the frame.
    pub x: u32,
    /// Top edge of the frame.
    pub y: u32,
    /// Width of the frame.
    pub width: u32,
    /// Height of the frame.
    pub height: u32,
}

/// Playback state of a single [`AnimationClip`].
///
/// Looping animations wrap back to the first frame forever. Non-looping
/// animations hold their final frame and report [`Animation::is_finished`]
/// once every frame has been shown for its full duration.
#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    clip: AnimationClip,
    looping: bool,
    elapsed: Duration,
    frame: u32,
    finished: bool,
}

impl Animation {
    /// Starts playback of `clip` from its first frame.
    #[must_use]
    pub fn new(clip: AnimationClip, looping: bool) -> Self {
        Self {
            clip,
            looping,
            elapsed: Duration::ZERO,
            frame: 0,
            finished: false,
        }
    }

    /// Advances playback by `dt`.
    pub fn update(&mut self, dt: Duration) {
        if self.finished {
            return;
        }

        let frame_count = self.clip.frame_count;
        let frame_duration = self.clip.frame_duration;
        if frame_count == 0 || frame_duration.is_zero() {
            if !self.looping {
                self.frame = frame_count.saturating_sub(1);
                self.finished = true;
            }
            return;
        }

        self.elapsed = self.elapsed.saturating_add(dt);
        let step = frame_duration.as_nanos();
        let steps = self.elapsed.as_nanos() / step;
        if steps == 0 {
            return;
        }

        let count = u128::from(frame_count);
        let target = u128::from(self.frame) + steps;
        if self.looping {
            self.frame = u32::try_from(target % count).unwrap_or_default();
            self.elapsed = nanos_to_duration(self.elapsed.as_nanos() % step);
        } else if target >= count {
            self.frame = frame_count - 1;
            self.elapsed = Duration::ZERO;
            self.finished = true;
        } else {
            self.frame = u32::try_from(target).unwrap_or(frame_count - 1);
            self.elapsed = nanos_to_duration(self.elapsed.as_nanos() % step);
        }
    }

    /// Index of the frame currently on screen.
    #[must_use]
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Reports whether a non-looping animation has played to the end.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Reports whether the animation wraps around.
    #[must_use]
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Clip backing the animation.
    #[must_use]
    pub fn clip(&self) -> &AnimationClip {
        &self.clip
    }

    /// Source rectangle of the current frame.
    #[must_use]
    pub fn frame_rect(&self) -> FrameRect {
        FrameRect {
            x: self.frame.saturating_mul(self.clip.frame_width),
            y: 0,
            width: self.clip.frame_width,
            height: self.clip.frame_height,
        }
    }
}

fn nanos_to_duration(nanos: u128) -> Duration {
    const NANOS_PER_SEC: u128 = 1_000_000_000;
    let secs = u64::try_from(nanos / NANOS_PER_SEC).unwrap_or(u64::MAX);
    let subsec = u32::try_from(nanos % NANOS_PER_SEC).unwrap_or_default();
    Duration::new(secs, subsec)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(frames: u32) -> AnimationClip {
        AnimationClip::new(frames, Duration::from_millis(100), 32, 48)
    }

    #[test]
    fn looping_animation_wraps() {
        let mut animation = Animation::new(clip(3), true);
        animation.update(Duration::from_millis(250));
        assert_eq!(animation.frame(), 2);
        animation.update(Duration::from_millis(100));
        assert_eq!(animation.frame(), 0);
        assert!(!animation.is_finished());
    }

    #[test]
    fn one_shot_animation_holds_last_frame() {
        let mut animation = Animation::new(clip(3), false);
        animation.update(Duration::from_millis(299));
        assert!(!animation.is_finished());
        assert_eq!(animation.frame(), 2);

        animation.update(Duration::from_millis(1));
        assert!(animation.is_finished());
        assert_eq!(animation.frame(), 2);

        animation.update(Duration::from_secs(5));
        assert_eq!(animation.frame(), 2);
    }

    #[test]
    fn frame_rect_steps_across_sheet() {
        let mut animation = Animation::new(clip(4), true);
        animation.update(Duration::from_millis(200));
        assert_eq!(
            animation.frame_rect(),
            FrameRect {
                x: 64,
                y: 0,
                width: 32,
                height: 48,
            }
        );
    }

    #[test]
    fn empty_one_shot_clip_finishes_on_first_update() {
        let mut animation = Animation::new(clip(0), false);
        assert!(!animation.is_finished());
        animation.update(Duration::ZERO);
        assert!(animation.is_finished());
    }

    #[test]
    fn tiny_frames_advance_in_one_step() {
        let nanosecond = Duration::from_nanos(1);
        let mut looping = Animation::new(AnimationClip::new(8, nanosecond, 1, 1), true);
        looping.update(Duration::from_nanos(16_000_003));
        assert_eq!(looping.frame(), 3);
        assert!(!looping.is_finished());

        let mut one_shot = Animation::new(AnimationClip::new(8, nanosecond, 1, 1), false);
        one_shot.update(Duration::from_millis(16));
        assert!(one_shot.is_finished());
        assert_eq!(one_shot.frame(), 7);
    }

    #[test]
    fn partial_frame_time_carries_over() {
        let mut animation = Animation::new(clip(5), true);
        animation.update(Duration::from_millis(150));
        assert_eq!(animation.frame(), 1);
        animation.update(Duration::from_millis(50));
        assert_eq!(animation.frame(), 2);
    }
}
