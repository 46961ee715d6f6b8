use std::borrow::Cow;
use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// diskpart在每次输出的末尾打印的提示符
pub const PROMPT: &[u8] = b"DISKPART>";

/// 一个状态内累积的输出
#[derive(Debug, Default)]
pub struct Transcript {
    buffer: Vec<u8>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the tool's output until [`PROMPT`] is seen.
    ///
    /// Bytes past the prompt stay in `reader`. Fails once the buffer holds `cap`
    /// bytes without a prompt, or when the pipe closes first.
    pub async fn read_prompt<R>(&mut self, reader: &mut R, cap: usize) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin + ?Sized,
    {
        loop {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "pipe closed before the prompt",
                ));
            }

            let mut taken = 0;
            let mut prompted = false;
            for &byte in available {
                if self.buffer.len() >= cap {
                    break;
                }
                self.buffer.push(byte);
                taken += 1;
                if self.buffer.ends_with(PROMPT) {
                    prompted = true;
                    break;
                }
            }
            reader.consume(taken);

            if prompted {
                return Ok(());
            }
            if self.buffer.len() >= cap {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("no prompt within {cap} bytes"),
                ));
            }
        }
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.buffer)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
