/*++

Licensed under the Apache-2.0 license.

File Name:

    output.rs

Abstract:

    File contains the captured output sink of the simulated target.

--*/

/// Byte sink the simulated target prints into. Output accumulates across
/// reboots; `take_captured` drains it for assertion.
#[derive(Default)]
pub struct Output {
    captured: Vec<u8>,
}

impl Output {
    pub fn new() -> Output {
        Output::default()
    }

    pub fn push(&mut self, byte: u8) {
        self.captured.push(byte);
    }

    /// Everything captured so far, lossily decoded.
    pub fn peek(&self) -> String {
        String::from_utf8_lossy(&self.captured).into_owned()
    }

    pub fn take_captured(&mut self) -> String {
        let captured = core::mem::take(&mut self.captured);
        String::from_utf8_lossy(&captured).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_and_drain() {
        let mut output = Output::new();
        for byte in b"hello" {
            output.push(*byte);
        }
        assert_eq!(output.peek(), "hello");
        assert_eq!(output.take_captured(), "hello");
        assert_eq!(output.peek(), "");
    }
}
