use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameListError {
    #[error("frame list must contain at least one frame")]
    Empty,
    #[error("repeat_from {repeat_from} is out of range for {len} frames")]
    RepeatFromOutOfRange { repeat_from: usize, len: usize },
}

/// Frame indices played in order, with the tail from `repeat_from` replayed
/// `repeat` more times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameList {
    frames: Vec<u32>,
    repeat: u32,
    repeat_from: usize,
}

impl FrameList {
    pub fn new(frames: Vec<u32>, repeat: u32, repeat_from: usize) -> Result<Self, FrameListError> {
        if frames.is_empty() {
            return Err(FrameListError::Empty);
        }
        let repeat_from = if repeat == 0 { 0 } else { repeat_from };
        if repeat_from >= frames.len() {
            return Err(FrameListError::RepeatFromOutOfRange {
                repeat_from,
                len: frames.len(),
            });
        }
        Ok(Self {
            frames,
            repeat,
            repeat_from,
        })
    }

    pub fn single(frame: u32) -> Self {
        Self {
            frames: vec![frame],
            repeat: 0,
            repeat_from: 0,
        }
    }

    pub fn frames(&self) -> &[u32] {
        &self.frames
    }

    pub fn repeat(&self) -> u32 {
        self.repeat
    }

    pub fn repeat_from(&self) -> usize {
        self.repeat_from
    }

    pub fn size(&self) -> usize {
        let tail = self.frames.len() - self.repeat_from;
        self.frames.len() + tail * self.repeat as usize
    }

    pub fn frame(&self, index: usize) -> u32 {
        let index = index.min(self.size() - 1);
        let len = self.frames.len();
        let slot = if index < len {
            index
        } else {
            let tail = len - self.repeat_from;
            self.repeat_from + (index - len) % tail
        };
        self.frames[slot]
    }

    /// Same frames with a different repeat count; `repeat_from` is kept when
    /// the list still repeats.
    pub fn with_repeat(&self, repeat: u32) -> Self {
        Self {
            frames: self.frames.clone(),
            repeat,
            repeat_from: if repeat == 0 { 0 } else { self.repeat_from },
        }
    }

    pub fn iter(&self) -> FrameIter<'_> {
        FrameIter {
            list: self,
            next: 0,
        }
    }
}

impl<'a> IntoIterator for &'a FrameList {
    type Item = u32;
    type IntoIter = FrameIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct FrameIter<'a> {
    list: &'a FrameList,
    next: usize,
}

impl Iterator for FrameIter<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.next >= self.list.size() {
            return None;
        }
        let frame = self.list.frame(self.next);
        self.next += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.list.size().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FrameIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_law_holds() {
        for n in 1..=5usize {
            for repeat in 0..=4u32 {
                for repeat_from in 0..n {
                    let frames = (0..n as u32).map(|f| f + 10).collect::<Vec<_>>();
                    let list = FrameList::new(frames, repeat, repeat_from).expect("valid list");
                    let effective_from = if repeat == 0 { 0 } else { repeat_from };
                    assert_eq!(
                        list.size(),
                        n + (n - effective_from) * repeat as usize,
                        "n={n} repeat={repeat} from={repeat_from}"
                    );
                    if repeat > 0 {
                        assert_eq!(list.frame(list.size() - 1), 10 + n as u32 - 1);
                    }
                }
            }
        }
    }

    #[test]
    fn tail_repeats_cyclically() {
        let list = FrameList::new(vec![1, 2, 3, 4], 2, 2).expect("valid");
        let played = list.iter().collect::<Vec<_>>();
        assert_eq!(played, vec![1, 2, 3, 4, 3, 4, 3, 4]);
        assert_eq!(list.iter().len(), 8);
    }

    #[test]
    fn out_of_range_index_clamps() {
        let list = FrameList::new(vec![5, 6], 1, 1).expect("valid");
        assert_eq!(list.size(), 3);
        assert_eq!(list.frame(2), 6);
        assert_eq!(list.frame(999), 6);
    }

    #[test]
    fn repeat_from_forced_to_zero_without_repeat() {
        let list = FrameList::new(vec![7, 8], 0, 9).expect("repeat_from ignored");
        assert_eq!(list.repeat_from(), 0);
        assert_eq!(list.size(), 2);
    }

    #[test]
    fn rejects_invalid_lists() {
        assert_eq!(FrameList::new(Vec::new(), 0, 0), Err(FrameListError::Empty));
        assert_eq!(
            FrameList::new(vec![1, 2], 3, 2),
            Err(FrameListError::RepeatFromOutOfRange {
                repeat_from: 2,
                len: 2
            })
        );
    }

    #[test]
    fn iteration_is_restartable() {
        let list = FrameList::new(vec![1, 2], 1, 0).expect("valid");
        let first = (&list).into_iter().collect::<Vec<_>>();
        let second = list.iter().collect::<Vec<_>>();
        assert_eq!(first, second);
        assert_eq!(first, vec![1, 2, 1, 2]);
    }

    #[test]
    fn with_repeat_rescales_size() {
        let list = FrameList::new(vec![1, 2, 3], 4, 1).expect("valid");
        assert_eq!(list.with_repeat(1).size(), 5);
        assert_eq!(list.with_repeat(0).repeat_from(), 0);
    }
}
