use crate::{error::Error, pose::Snapshot};
use serde::Deserialize;
use std::io::{BufRead, Lines};

/// One line of detector output.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub frame_index: Option<usize>,
    #[serde(default)]
    pub landmarks: Snapshot,
}

/// Reads newline-delimited JSON frames, skipping blank lines.
pub struct FrameReader<R> {
    lines: Lines<R>,
    line: usize,
}

impl<R> FrameReader<R>
where
    R: BufRead,
{
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }
}

impl<R> Iterator for FrameReader<R>
where
    R: BufRead,
{
    type Item = Result<Frame, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let text = self.lines.next()?;
            self.line += 1;
            let line = self.line;
            let text = match text {
                Ok(text) => text,
                Err(source) => return Some(Err(Error::ReadFrame { line, source })),
            };
            if text.trim().is_empty() {
                continue;
            }
            return Some(
                serde_json::from_str(&text).map_err(|source| Error::ParseFrame { line, source }),
            );
        }
    }
}
